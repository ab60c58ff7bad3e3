//! Dispatch pipeline: collaborators, per-file task, batch dispatcher, per-file errors.

pub mod context;
pub mod dispatcher;
pub mod error_handler;
pub mod file_task;

pub use context::{Collaborators, CompletionHandler, DispatchContext};
pub use dispatcher::BatchDispatcher;
pub use error_handler::{FileError, log_dropped_files};
pub use file_task::process_file;
