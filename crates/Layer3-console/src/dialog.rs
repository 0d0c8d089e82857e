//! Dialog state for create / edit / delete
//!
//! At most one dialog is open at a time. A dialog stays open until its
//! mutation succeeds or the user cancels it.

use castdesk_api::{CreateTaskRequest, Task, UpdateTaskRequest};

/// Create form; a fresh form is an empty URL and private visibility
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateForm {
    pub url: String,
    pub is_public: bool,
    pub submitting: bool,
}

impl CreateForm {
    pub fn to_request(&self) -> CreateTaskRequest {
        CreateTaskRequest::new(self.url.trim(), self.is_public)
    }
}

/// Edit form, prefilled from the task being edited
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditForm {
    pub task_id: String,
    pub title: String,
    pub is_public: bool,
    pub submitting: bool,
}

impl EditForm {
    pub fn for_task(task: &Task) -> Self {
        Self {
            task_id: task.id.clone(),
            title: task.title.clone().unwrap_or_default(),
            is_public: task.is_public,
            submitting: false,
        }
    }

    pub fn to_request(&self) -> UpdateTaskRequest {
        UpdateTaskRequest::new(self.title.clone(), self.is_public)
    }
}

/// Delete confirmation bound to one task
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteConfirm {
    pub task_id: String,
    /// Title, else source URL, for the prompt
    pub label: String,
    pub submitting: bool,
}

impl DeleteConfirm {
    pub fn for_task(task: &Task) -> Self {
        let label = match task.title.as_deref() {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => task.url.clone(),
        };
        Self {
            task_id: task.id.clone(),
            label,
            submitting: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    Create(CreateForm),
    Edit(EditForm),
    Delete(DeleteConfirm),
}

impl Dialog {
    pub fn title(&self) -> &'static str {
        match self {
            Dialog::Create(_) => "Create Task",
            Dialog::Edit(_) => "Edit Task",
            Dialog::Delete(_) => "Delete Task",
        }
    }

    pub fn is_submitting(&self) -> bool {
        match self {
            Dialog::Create(f) => f.submitting,
            Dialog::Edit(f) => f.submitting,
            Dialog::Delete(f) => f.submitting,
        }
    }

    pub(crate) fn set_submitting(&mut self, value: bool) {
        match self {
            Dialog::Create(f) => f.submitting = value,
            Dialog::Edit(f) => f.submitting = value,
            Dialog::Delete(f) => f.submitting = value,
        }
    }
}
