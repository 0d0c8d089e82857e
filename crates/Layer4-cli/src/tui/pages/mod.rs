//! TUI pages

mod tasks;

pub use tasks::{PageAction, TasksPage};
