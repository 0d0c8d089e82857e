//! Page state owned by the task list controller

use crate::dialog::Dialog;
use castdesk_api::{Task, TaskFilter, TaskPage, TaskQuery};
use chrono::{DateTime, Utc};

/// Everything the task list page renders
///
/// `tasks` is a cache of one backend page: replaced wholesale by a successful
/// query and patched in place by the poller.
#[derive(Debug, Clone, PartialEq)]
pub struct PageState {
    pub filter: TaskFilter,
    /// Zero-based page index
    pub page: u32,
    pub rows_per_page: u32,
    pub tasks: Vec<Task>,
    /// Backend count across all pages
    pub total: u64,
    pub loading: bool,
    /// Dismissible banner message
    pub error: Option<String>,
    pub dialog: Option<Dialog>,
    /// Bumped when a query starts; stale results compare against it
    pub generation: u64,
    pub last_refreshed: Option<DateTime<Utc>>,
}

impl PageState {
    pub fn new(filter: TaskFilter, rows_per_page: u32) -> Self {
        Self {
            filter,
            page: 0,
            rows_per_page: rows_per_page.max(1),
            tasks: Vec::new(),
            total: 0,
            loading: false,
            error: None,
            dialog: None,
            generation: 0,
            last_refreshed: None,
        }
    }

    /// List request for the current filter and page
    pub fn query(&self) -> TaskQuery {
        TaskQuery::page(self.filter.clone(), self.page, self.rows_per_page)
    }

    /// Replace the cached page with a fresh response
    pub fn apply_page(&mut self, page: TaskPage) {
        self.tasks = page.items;
        self.total = page.total;
        self.error = None;
        self.last_refreshed = Some(Utc::now());
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    /// Ids the poller should refresh
    pub fn non_terminal_ids(&self) -> Vec<String> {
        self.tasks
            .iter()
            .filter(|t| !t.is_terminal())
            .map(|t| t.id.clone())
            .collect()
    }

    pub fn page_count(&self) -> u32 {
        let rows = u64::from(self.rows_per_page.max(1));
        let pages = self.total.div_ceil(rows).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn has_next_page(&self) -> bool {
        self.page + 1 < self.page_count()
    }

    pub fn has_prev_page(&self) -> bool {
        self.page > 0
    }

    /// "11-20 of 42"
    pub fn range_label(&self) -> String {
        if self.total == 0 {
            return "0 of 0".to_string();
        }
        let first = u64::from(self.page) * u64::from(self.rows_per_page) + 1;
        let last = (first + self.tasks.len() as u64).saturating_sub(1).max(first);
        format!("{}-{} of {}", first, last.min(self.total), self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use castdesk_api::TaskStatus;

    fn task(id: &str, status: TaskStatus) -> Task {
        Task {
            status,
            ..Task::new(id, format!("http://example.com/{}", id))
        }
    }

    #[test]
    fn test_non_terminal_ids() {
        let mut state = PageState::new(TaskFilter::default(), 10);
        state.tasks = vec![
            task("a", TaskStatus::Pending),
            task("b", TaskStatus::Completed),
            task("c", TaskStatus::Processing),
            task("d", TaskStatus::Failed),
            task("e", TaskStatus::Unknown("queued".into())),
        ];
        assert_eq!(state.non_terminal_ids(), vec!["a", "c", "e"]);
    }

    #[test]
    fn test_pagination_bounds() {
        let mut state = PageState::new(TaskFilter::default(), 10);
        assert_eq!(state.page_count(), 1);
        assert!(!state.has_next_page());

        state.total = 42;
        assert_eq!(state.page_count(), 5);
        assert!(state.has_next_page());

        state.page = 4;
        assert!(!state.has_next_page());
        assert!(state.has_prev_page());
        assert_eq!(state.query().offset, 40);
    }

    #[test]
    fn test_range_label() {
        let mut state = PageState::new(TaskFilter::default(), 10);
        assert_eq!(state.range_label(), "0 of 0");

        state.total = 12;
        state.page = 1;
        state.tasks = vec![task("a", TaskStatus::Pending), task("b", TaskStatus::Pending)];
        assert_eq!(state.range_label(), "11-12 of 12");
    }

    #[test]
    fn test_apply_page_clears_error() {
        let mut state = PageState::new(TaskFilter::default(), 10);
        state.error = Some("Failed to fetch task list".into());

        state.apply_page(TaskPage {
            items: vec![task("a", TaskStatus::Pending)],
            total: 1,
        });
        assert!(state.error.is_none());
        assert_eq!(state.total, 1);
        assert!(state.last_refreshed.is_some());
    }
}
