pub mod backend;
pub mod storage;

pub use backend::RestBackend;
pub use storage::{FileStorage, MemoryStorage};
