//! Native thread pool for executing independent units of work.
pub mod threaded;

pub use threaded::{TaskHandle, ThreadedExecutor};
