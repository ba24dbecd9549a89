use crate::scheduler::order::{Order, OrderId, OrderStatus, Priority};

/// Ordered collection of orders. Sequence order is dispatch and display
/// priority: expedited orders are inserted ahead of standard ones, so the
/// first queued order in sequence is always the next to assign.
#[derive(Debug, Default)]
pub struct OrderQueue {
    orders: Vec<Order>,
}

impl OrderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an order at its priority position.
    ///
    /// Standard orders append at the end. Expedited orders land immediately
    /// after the last *queued* expedited order, ahead of every queued
    /// standard order. Orders that are in progress or done do not count
    /// toward the insertion point, so two expedited orders submitted
    /// back-to-back keep submission order.
    pub fn insert(&mut self, order: Order) {
        match order.priority {
            Priority::Standard => self.orders.push(order),
            Priority::Expedited => {
                let at = self
                    .orders
                    .iter()
                    .rposition(|o| o.is_queued() && o.priority == Priority::Expedited)
                    .map(|i| i + 1)
                    .or_else(|| self.orders.iter().position(|o| o.is_queued()))
                    .unwrap_or(self.orders.len());
                self.orders.insert(at, order);
            }
        }
    }

    /// First order in sequence order that is still queued, if any.
    /// Insertion order already encodes class priority, so no per-call
    /// priority scan is needed.
    pub fn next_assignable(&mut self) -> Option<&mut Order> {
        self.orders.iter_mut().find(|o| o.is_queued())
    }

    /// Get an order by ID
    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    /// Get a mutable reference to an order by ID
    pub fn get_mut(&mut self, id: OrderId) -> Option<&mut Order> {
        self.orders.iter_mut().find(|o| o.id == id)
    }

    /// Stable re-partition of the queued set: every queued expedited order
    /// is moved ahead of every queued standard order, with submission order
    /// preserved within each class. In-progress and done orders keep their
    /// slots, so their position relative to the queued set is unchanged.
    ///
    /// Invoked after a worker removal returns an order to the queue; the
    /// returned order re-sorts with everything else rather than being
    /// re-inserted at a single position.
    pub fn repartition_queued(&mut self) {
        let slots: Vec<usize> = self
            .orders
            .iter()
            .enumerate()
            .filter(|(_, o)| o.is_queued())
            .map(|(i, _)| i)
            .collect();

        let mut expedited = Vec::new();
        let mut standard = Vec::new();
        for &i in &slots {
            let order = self.orders[i].clone();
            match order.priority {
                Priority::Expedited => expedited.push(order),
                Priority::Standard => standard.push(order),
            }
        }

        for (slot, order) in slots.into_iter().zip(expedited.into_iter().chain(standard)) {
            self.orders[slot] = order;
        }
    }

    /// All orders in sequence order
    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    /// Orders still awaiting completion (queued or in progress), in
    /// sequence order
    pub fn pending(&self) -> Vec<&Order> {
        self.orders
            .iter()
            .filter(|o| o.status != OrderStatus::Done)
            .collect()
    }

    /// Finished orders, most recently completed first
    pub fn completed(&self) -> Vec<&Order> {
        let mut done: Vec<&Order> = self
            .orders
            .iter()
            .filter(|o| o.status == OrderStatus::Done)
            .collect();
        done.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        done
    }

    /// Returns the current number of orders, across all states
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Returns true if no orders have been submitted
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
