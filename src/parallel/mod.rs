pub mod batch;
pub mod pool;

pub use batch::attempt_chunks;
pub use pool::WorkerPool;
