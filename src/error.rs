use thiserror::Error;

use crate::scheduler::{OrderId, WorkerId};

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    #[error("Worker not found: {0}")]
    WorkerNotFound(WorkerId),
}

pub type Result<T> = std::result::Result<T, DispatchError>;
