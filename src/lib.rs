// todolist - a line-numbered todo list backed by a text file or SQLite

pub mod app;
pub mod config;
pub mod error;
pub mod file_store;
pub mod render;
pub mod sqlite_store;
pub mod store;
pub mod task;

// Re-export main types for convenience
pub use app::{Command, execute, run};
pub use config::{Backend, Config, RewriteMode};
pub use error::{Result, TodoError};
pub use file_store::{FileOptions, FileStore};
pub use render::{DisplayConfig, OutputFormat, render};
pub use sqlite_store::SqliteStore;
pub use store::{TodoStore, open_store};
pub use task::{RemoveSpec, Task};
