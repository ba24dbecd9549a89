pub mod order;
pub mod pool;
pub mod queue;

pub use order::{Order, OrderId, OrderStatus, Priority, WorkerId};
pub use pool::{Worker, WorkerPool};
pub use queue::OrderQueue;
