use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique, monotonically assigned order identifier. Never reused.
pub type OrderId = u64;

/// Unique, monotonically assigned worker identifier. Never reused.
pub type WorkerId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    Standard,
    Expedited,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Standard => write!(f, "standard"),
            Priority::Expedited => write!(f, "expedited"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Queued,
    InProgress,
    Done,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Queued => write!(f, "queued"),
            OrderStatus::InProgress => write!(f, "in_progress"),
            OrderStatus::Done => write!(f, "done"),
        }
    }
}

/// A unit of work moving through the dispatch pipeline.
///
/// Invariants: `assigned_worker` is set iff `status == InProgress`;
/// `completed_at` is set iff `status == Done`. `completed_at` is engine
/// time (monotonic, since engine start); `created_at` is wall clock and
/// informational only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub priority: Priority,
    pub status: OrderStatus,
    pub assigned_worker: Option<WorkerId>,
    pub completed_at: Option<Duration>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn new(id: OrderId, priority: Priority) -> Self {
        Self {
            id,
            priority,
            status: OrderStatus::Queued,
            assigned_worker: None,
            completed_at: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_queued(&self) -> bool {
        self.status == OrderStatus::Queued
    }
}
