pub mod config;
pub mod engine;
pub mod error;
pub mod scheduler;
pub mod shutdown;
