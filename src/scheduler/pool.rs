use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::scheduler::order::{OrderId, WorkerId};

/// A processing unit that handles exactly one order at a time.
///
/// Invariant: `order` and `started_at` are both set (bound) or both
/// unset (idle). `started_at` is engine time, monotonic since start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worker {
    pub id: WorkerId,
    pub order: Option<OrderId>,
    pub started_at: Option<Duration>,
}

impl Worker {
    pub fn new(id: WorkerId) -> Self {
        Self {
            id,
            order: None,
            started_at: None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.order.is_none()
    }

    /// Bind this worker to an order, marking the processing start time
    pub fn bind(&mut self, order: OrderId, now: Duration) {
        debug_assert!(self.is_idle(), "worker {} is already bound", self.id);
        self.order = Some(order);
        self.started_at = Some(now);
    }

    /// Release the current binding, returning the worker to idle
    pub fn release(&mut self) {
        self.order = None;
        self.started_at = None;
    }
}

/// Collection of workers, insertion-ordered by ID. Workers are only ever
/// appended at the back and removed from the back, so insertion order and
/// ID order coincide.
#[derive(Debug, Default)]
pub struct WorkerPool {
    workers: Vec<Worker>,
}

impl WorkerPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new idle worker with the given ID. No upper bound on count.
    pub fn add(&mut self, id: WorkerId) {
        debug_assert!(
            self.workers.last().map_or(true, |w| w.id < id),
            "worker ids must be appended in increasing order"
        );
        self.workers.push(Worker::new(id));
    }

    /// Remove and return the most recently added worker, or `None` if the
    /// pool is empty. The caller is responsible for requeueing any order
    /// the removed worker still holds.
    pub fn remove_last(&mut self) -> Option<Worker> {
        self.workers.pop()
    }

    /// Get a worker by ID
    pub fn get(&self, id: WorkerId) -> Option<&Worker> {
        self.workers.iter().find(|w| w.id == id)
    }

    /// All workers in ID order
    pub fn iter(&self) -> impl Iterator<Item = &Worker> {
        self.workers.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Worker> {
        self.workers.iter_mut()
    }

    /// Workers with no order bound
    pub fn idle(&self) -> Vec<&Worker> {
        self.workers.iter().filter(|w| w.is_idle()).collect()
    }

    /// Workers currently processing an order
    pub fn active(&self) -> Vec<&Worker> {
        self.workers.iter().filter(|w| !w.is_idle()).collect()
    }

    /// Returns the current number of workers
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    /// Returns true if the pool has no workers
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}
