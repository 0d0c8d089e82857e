//! Reusable TUI components

pub mod dialog;
pub mod filter_bar;
pub mod input;
pub mod task_table;
pub mod toast;

pub use dialog::{DialogEditor, DialogOutcome};
pub use input::{InputBox, InputOutcome};
pub use toast::Toast;
