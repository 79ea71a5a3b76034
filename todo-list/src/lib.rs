//! Single-user to-do list with whole-file JSON persistence.
pub mod config;
pub mod error;
pub mod manager;
pub mod store;
pub mod task;

pub use error::{Error, ValidationError};
pub use manager::TaskManager;
pub use store::{JsonFileStore, TaskList, TaskStore};
pub use task::{NewTask, Priority, Status, Task, TaskId};
