//! The dispatch engine facade.
//!
//! [`DispatchEngine`] is the single owner of the order queue and the worker
//! pool; every mutation goes through its four operations (submit, add
//! worker, remove worker, tick). The presentation layer only ever holds a
//! read-only [`EngineSnapshot`].

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::EngineConfig;
use crate::error::{DispatchError, Result};
use crate::scheduler::{
    Order, OrderId, OrderQueue, OrderStatus, Priority, Worker, WorkerId, WorkerPool,
};

/// The four-operation dispatch facade.
///
/// Single-threaded by design: each call is one atomic state transition and
/// there is no interior parallelism, so no locking is needed. Time only
/// advances through [`DispatchEngine::tick`], which takes a monotonic
/// timestamp measured from engine start.
#[derive(Debug)]
pub struct DispatchEngine {
    config: EngineConfig,
    queue: OrderQueue,
    pool: WorkerPool,
    next_order_id: OrderId,
    next_worker_id: WorkerId,
    last_tick: Duration,
}

impl Default for DispatchEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl DispatchEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            queue: OrderQueue::new(),
            pool: WorkerPool::new(),
            next_order_id: 1,
            next_worker_id: 1,
            last_tick: Duration::ZERO,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Submit a new order. It enters the queue at its priority position and
    /// stays there until a tick assigns it to an idle worker.
    pub fn submit_order(&mut self, priority: Priority) -> OrderId {
        let id = self.next_order_id;
        self.next_order_id += 1;
        self.queue.insert(Order::new(id, priority));
        tracing::info!(order_id = id, %priority, "Order submitted");
        id
    }

    /// Add an idle worker to the pool. It picks up work on the next tick.
    pub fn add_worker(&mut self) -> WorkerId {
        let id = self.next_worker_id;
        self.next_worker_id += 1;
        self.pool.add(id);
        tracing::info!(worker_id = id, "Worker added");
        id
    }

    /// Remove the most recently added worker. Returns false if the pool is
    /// empty (a no-op, not an error).
    ///
    /// If the removed worker was mid-order, the order reverts to queued and
    /// the whole queued set is re-partitioned so expedited orders again
    /// precede standard ones, submission order preserved within each class.
    pub fn remove_worker(&mut self) -> bool {
        let Some(worker) = self.pool.remove_last() else {
            tracing::debug!("Remove requested on empty worker pool, nothing to do");
            return false;
        };

        match worker.order {
            Some(order_id) => {
                if let Some(order) = self.queue.get_mut(order_id) {
                    order.status = OrderStatus::Queued;
                    order.assigned_worker = None;
                } else {
                    debug_assert!(false, "worker {} bound to unknown order {}", worker.id, order_id);
                }
                self.queue.repartition_queued();
                tracing::info!(
                    worker_id = worker.id,
                    order_id,
                    "Worker removed, order requeued"
                );
            }
            None => tracing::info!(worker_id = worker.id, "Idle worker removed"),
        }

        self.debug_check_bindings();
        true
    }

    /// Advance engine time to `now` and run one scheduling round: first
    /// detect completions, then hand queued orders to idle workers. Returns
    /// true iff any order or worker changed, so a quiescent tick is
    /// observable as a no-op and triggers no spurious render.
    ///
    /// Completion is a threshold check (`elapsed >= processing_duration`),
    /// detected on the first tick at or after the deadline, never before.
    /// A timestamp earlier than the last accepted one is clamped to it
    /// rather than rejected, so elapsed-time arithmetic never goes
    /// backwards; callers feeding a proper monotonic clock never hit this.
    pub fn tick(&mut self, now: Duration) -> bool {
        let now = if now < self.last_tick {
            tracing::warn!(
                now_ms = now.as_millis() as u64,
                last_tick_ms = self.last_tick.as_millis() as u64,
                "Non-monotonic tick timestamp, clamping to last tick"
            );
            self.last_tick
        } else {
            now
        };
        self.last_tick = now;

        let mut changed = false;

        // Completion pass. Runs before assignment so a worker freed here
        // can pick up new work within the same tick.
        for worker in self.pool.iter_mut() {
            let (Some(order_id), Some(started_at)) = (worker.order, worker.started_at) else {
                continue;
            };
            if now.saturating_sub(started_at) < self.config.processing_duration {
                continue;
            }
            if let Some(order) = self.queue.get_mut(order_id) {
                order.status = OrderStatus::Done;
                order.assigned_worker = None;
                order.completed_at = Some(now);
            } else {
                debug_assert!(false, "worker {} bound to unknown order {}", worker.id, order_id);
            }
            worker.release();
            changed = true;
            tracing::info!(
                worker_id = worker.id,
                order_id,
                completed_at_ms = now.as_millis() as u64,
                "Order completed"
            );
        }

        // Assignment pass: idle workers in ID order, one order each. The
        // order flips to in-progress as it is taken, so a later worker in
        // the same pass can never double-bind it.
        for worker in self.pool.iter_mut() {
            if !worker.is_idle() {
                continue;
            }
            let Some(order) = self.queue.next_assignable() else {
                break;
            };
            order.status = OrderStatus::InProgress;
            order.assigned_worker = Some(worker.id);
            worker.bind(order.id, now);
            changed = true;
            tracing::info!(worker_id = worker.id, order_id = order.id, "Order assigned");
        }

        self.debug_check_bindings();
        changed
    }

    /// Orders in queue order (read-only)
    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.queue.iter()
    }

    /// Workers in ID order (read-only)
    pub fn workers(&self) -> impl Iterator<Item = &Worker> {
        self.pool.iter()
    }

    pub fn order(&self, id: OrderId) -> Result<&Order> {
        self.queue.get(id).ok_or(DispatchError::OrderNotFound(id))
    }

    pub fn worker(&self, id: WorkerId) -> Result<&Worker> {
        self.pool.get(id).ok_or(DispatchError::WorkerNotFound(id))
    }

    /// Take a read-only snapshot for the presentation layer.
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            orders: self.queue.iter().map(OrderView::from).collect(),
            workers: self.pool.iter().map(WorkerView::from).collect(),
        }
    }

    /// Binding consistency is an internal invariant: every in-progress
    /// order is held by exactly one worker and vice versa. A violation is a
    /// programming defect, so this fails loudly in debug builds instead of
    /// being tolerated.
    fn debug_check_bindings(&self) {
        if cfg!(debug_assertions) {
            let in_progress = self
                .queue
                .iter()
                .filter(|o| o.status == OrderStatus::InProgress)
                .count();
            let bound = self.pool.active().len();
            debug_assert_eq!(in_progress, bound, "in-progress orders and bound workers diverge");
            for worker in self.pool.active() {
                let order = worker.order.and_then(|id| self.queue.get(id));
                debug_assert!(
                    order.is_some_and(|o| o.assigned_worker == Some(worker.id)
                        && o.status == OrderStatus::InProgress),
                    "worker {} binding is inconsistent",
                    worker.id
                );
            }
        }
    }
}

// =============================================================================
// Read-only snapshot
// =============================================================================

/// Point-in-time view of an order, timestamps flattened to milliseconds of
/// engine time for display and serialization.
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    pub id: OrderId,
    pub priority: Priority,
    pub status: OrderStatus,
    pub assigned_worker: Option<WorkerId>,
    pub completed_at_ms: Option<u64>,
    pub created_at: DateTime<Utc>,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            priority: order.priority,
            status: order.status,
            assigned_worker: order.assigned_worker,
            completed_at_ms: order.completed_at.map(|d| d.as_millis() as u64),
            created_at: order.created_at,
        }
    }
}

/// Point-in-time view of a worker.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerView {
    pub id: WorkerId,
    pub order: Option<OrderId>,
    pub started_at_ms: Option<u64>,
}

impl From<&Worker> for WorkerView {
    fn from(worker: &Worker) -> Self {
        Self {
            id: worker.id,
            order: worker.order,
            started_at_ms: worker.started_at.map(|d| d.as_millis() as u64),
        }
    }
}

impl WorkerView {
    /// Fraction of the processing window this worker has burned through at
    /// `now`, clamped to 1.0, or `None` while idle. Purely derived display
    /// state; never feeds back into the engine.
    pub fn progress(&self, now: Duration, processing_duration: Duration) -> Option<f64> {
        let started_ms = self.started_at_ms?;
        let elapsed = (now.as_millis() as u64).saturating_sub(started_ms);
        let total = processing_duration.as_millis() as u64;
        if total == 0 {
            return Some(1.0);
        }
        Some((elapsed as f64 / total as f64).min(1.0))
    }
}

/// Immutable state snapshot handed to the presentation layer once per
/// render. The derived views below are queries over the snapshot; the
/// engine does not maintain them.
#[derive(Debug, Clone, Serialize)]
pub struct EngineSnapshot {
    pub orders: Vec<OrderView>,
    pub workers: Vec<WorkerView>,
}

impl EngineSnapshot {
    /// Orders awaiting completion, in engine order (expedited first, then
    /// submission order — the engine's internal order already encodes this)
    pub fn pending(&self) -> Vec<&OrderView> {
        self.orders
            .iter()
            .filter(|o| o.status != OrderStatus::Done)
            .collect()
    }

    /// Finished orders, most recently completed first
    pub fn completed(&self) -> Vec<&OrderView> {
        let mut done: Vec<&OrderView> = self
            .orders
            .iter()
            .filter(|o| o.status == OrderStatus::Done)
            .collect();
        done.sort_by(|a, b| b.completed_at_ms.cmp(&a.completed_at_ms));
        done
    }

    /// True once every submitted order is done
    pub fn all_done(&self) -> bool {
        self.orders.iter().all(|o| o.status == OrderStatus::Done)
    }
}
