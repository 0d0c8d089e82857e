//! # castdesk-console
//!
//! Task list page logic for castdesk, independent of any renderer.
//! Handles page state, dialogs, mutations and background polling.

pub mod controller;
pub mod dialog;
pub mod notify;
pub mod poller;
pub mod reconcile;
pub mod state;

pub use controller::{ControllerOptions, PollOutcome, TaskListController, COPY_FAILURE, COPY_SUCCESS};
pub use dialog::{CreateForm, DeleteConfirm, Dialog, EditForm};
pub use notify::{
    ChannelNotifier, Notification, NotificationKind, Notifier, RecordingNotifier,
};
pub use poller::PollerHandle;
pub use reconcile::{reconcile, Reconciliation};
pub use state::PageState;
