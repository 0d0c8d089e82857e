//! List query model: filter criteria, pagination and the response page

use crate::task::{Task, TaskStatus};
use chrono::{DateTime, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// Filters
// ============================================================================

/// Status filter; `All` sends no status parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Processing,
    Completed,
    Failed,
}

impl StatusFilter {
    pub const ALL: [StatusFilter; 5] = [
        StatusFilter::All,
        StatusFilter::Pending,
        StatusFilter::Processing,
        StatusFilter::Completed,
        StatusFilter::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Pending => "pending",
            StatusFilter::Processing => "processing",
            StatusFilter::Completed => "completed",
            StatusFilter::Failed => "failed",
        }
    }

    /// Value of the `status` query parameter
    pub fn as_param(&self) -> Option<&'static str> {
        match self {
            StatusFilter::All => None,
            other => Some(other.as_str()),
        }
    }

    /// Does `status` pass this filter
    pub fn matches(&self, status: &TaskStatus) -> bool {
        match self.as_param() {
            None => true,
            Some(wanted) => status.as_str() == wanted,
        }
    }

    /// Next value, wrapping around (filter bar cycling)
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown status filter '{}'", s))
    }
}

/// Visibility filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    All,
    Public,
    Private,
}

impl Visibility {
    pub const ALL: [Visibility; 3] = [Visibility::All, Visibility::Public, Visibility::Private];

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::All => "all",
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }

    /// Value of the `is_public` query parameter
    pub fn as_param(&self) -> Option<bool> {
        match self {
            Visibility::All => None,
            Visibility::Public => Some(true),
            Visibility::Private => Some(false),
        }
    }

    pub fn matches(&self, is_public: bool) -> bool {
        self.as_param().map_or(true, |wanted| wanted == is_public)
    }

    pub fn next(self) -> Self {
        match self {
            Visibility::All => Visibility::Public,
            Visibility::Public => Visibility::Private,
            Visibility::Private => Visibility::All,
        }
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown visibility '{}'", s))
    }
}

/// Filter criteria for the task list
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskFilter {
    pub status: StatusFilter,
    pub visibility: Visibility,
    pub title_keyword: String,
    pub url_keyword: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl TaskFilter {
    /// Filter with the default creation-time window ending today in `now`'s zone
    pub fn with_default_range<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        let (start, end) = default_date_range(now);
        Self {
            start_date: Some(start),
            end_date: Some(end),
            ..Default::default()
        }
    }
}

/// Default creation-time window: one calendar month before today at
/// 00:00:00.000 through today 23:59:59.999, both in `now`'s time zone.
pub fn default_date_range<Tz: TimeZone>(now: &DateTime<Tz>) -> (DateTime<Utc>, DateTime<Utc>) {
    let tz = now.timezone();
    let today = now.date_naive();
    let month_ago = today.checked_sub_months(Months::new(1)).unwrap_or(today);

    (day_start(&tz, month_ago), day_end(&tz, today))
}

/// `date` at 00:00:00.000 in `tz`
pub fn day_start<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    to_utc(tz, date.and_time(NaiveTime::MIN))
}

/// `date` at 23:59:59.999 in `tz`
pub fn day_end<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let end = date
        .and_hms_milli_opt(23, 59, 59, 999)
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN));
    to_utc(tz, end)
}

// Local times that fall in a DST gap are read as UTC.
fn to_utc<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

// ============================================================================
// Query
// ============================================================================

/// One list request: filter plus offset/limit window
#[derive(Debug, Clone, PartialEq)]
pub struct TaskQuery {
    pub filter: TaskFilter,
    pub offset: u32,
    pub limit: u32,
}

impl TaskQuery {
    pub fn new(filter: TaskFilter, offset: u32, limit: u32) -> Self {
        Self {
            filter,
            offset,
            limit,
        }
    }

    /// Query for a zero-based page
    pub fn page(filter: TaskFilter, page: u32, rows_per_page: u32) -> Self {
        Self::new(filter, page.saturating_mul(rows_per_page), rows_per_page)
    }

    /// Query-string parameters for `GET /api/get_tasks`
    ///
    /// Keywords are always sent, dates only when set (epoch millis), status
    /// and visibility only when narrowed.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let f = &self.filter;
        let mut params = vec![
            ("offset", self.offset.to_string()),
            ("limit", self.limit.to_string()),
            ("title_keyword", f.title_keyword.clone()),
            ("url_keyword", f.url_keyword.clone()),
        ];
        if let Some(start) = f.start_date {
            params.push(("start_date", start.timestamp_millis().to_string()));
        }
        if let Some(end) = f.end_date {
            params.push(("end_date", end.timestamp_millis().to_string()));
        }
        if let Some(status) = f.status.as_param() {
            params.push(("status", status.to_string()));
        }
        if let Some(is_public) = f.visibility.as_param() {
            params.push(("is_public", is_public.to_string()));
        }
        params
    }
}

/// One page of results as returned by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPage {
    #[serde(default)]
    pub items: Vec<Task>,
    #[serde(default)]
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Timelike};

    fn param<'a>(params: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_unfiltered_params() {
        let params = TaskQuery::page(TaskFilter::default(), 0, 10).to_params();

        assert_eq!(param(&params, "offset"), Some("0"));
        assert_eq!(param(&params, "limit"), Some("10"));
        assert_eq!(param(&params, "title_keyword"), Some(""));
        assert_eq!(param(&params, "url_keyword"), Some(""));
        assert_eq!(param(&params, "status"), None);
        assert_eq!(param(&params, "is_public"), None);
        assert_eq!(param(&params, "start_date"), None);
    }

    #[test]
    fn test_narrowed_params() {
        let start = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        let filter = TaskFilter {
            status: StatusFilter::Failed,
            visibility: Visibility::Private,
            title_keyword: "ep".into(),
            start_date: Some(start),
            ..Default::default()
        };
        let params = TaskQuery::page(filter, 2, 25).to_params();

        assert_eq!(param(&params, "offset"), Some("50"));
        assert_eq!(param(&params, "limit"), Some("25"));
        assert_eq!(param(&params, "status"), Some("failed"));
        assert_eq!(param(&params, "is_public"), Some("false"));
        assert_eq!(param(&params, "title_keyword"), Some("ep"));
        assert_eq!(param(&params, "start_date"), Some("1700000000000"));
        assert_eq!(param(&params, "end_date"), None);
    }

    #[test]
    fn test_default_date_range() {
        let tz = FixedOffset::east_opt(8 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2024, 3, 31, 15, 20, 0).unwrap();

        let (start, end) = default_date_range(&now);
        let start_local = start.with_timezone(&tz);
        let end_local = end.with_timezone(&tz);

        assert_eq!(start_local.date_naive().to_string(), "2024-02-29");
        assert_eq!(start_local.time(), NaiveTime::MIN);
        assert_eq!(end_local.date_naive().to_string(), "2024-03-31");
        assert_eq!(end_local.hour(), 23);
        assert_eq!(end_local.nanosecond(), 999_000_000);
    }

    #[test]
    fn test_day_bounds() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let start = day_start(&Utc, date);
        let end = day_end(&Utc, date);
        assert_eq!(start.timestamp_millis() + 86_400_000 - 1, end.timestamp_millis());
    }

    #[test]
    fn test_filter_cycling_and_parsing() {
        assert_eq!(StatusFilter::Failed.next(), StatusFilter::All);
        assert_eq!(Visibility::Private.next(), Visibility::All);
        assert_eq!("Processing".parse::<StatusFilter>(), Ok(StatusFilter::Processing));
        assert!("archived".parse::<StatusFilter>().is_err());
        assert_eq!("public".parse::<Visibility>(), Ok(Visibility::Public));
    }

    #[test]
    fn test_filter_matches() {
        assert!(StatusFilter::All.matches(&TaskStatus::Unknown("x".into())));
        assert!(StatusFilter::Failed.matches(&TaskStatus::Failed));
        assert!(!StatusFilter::Failed.matches(&TaskStatus::Pending));
        assert!(Visibility::All.matches(true));
        assert!(!Visibility::Public.matches(false));
    }

    #[test]
    fn test_page_decoding_defaults() {
        let page: TaskPage = serde_json::from_str(r#"{"items":[]}"#).unwrap();
        assert_eq!(page.total, 0);
    }
}
