pub mod dispatcher;
pub mod pool;
pub mod table;
pub mod task;

pub use dispatcher::Dispatcher;
pub use pool::{Worker, WorkerPool, WorkerStatus};
pub use table::TaskTable;
pub use task::{Priority, Task, TaskKind, TaskStatus};
