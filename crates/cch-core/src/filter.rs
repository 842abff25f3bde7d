//! Scan filters: project path, session date range, session budget.

use chrono::{DateTime, Utc};

/// Keeps projects whose decoded path contains one of the patterns.
///
/// An empty filter keeps everything. Matching is plain substring containment.
#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    patterns: Vec<String>,
}

impl ProjectFilter {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        self.patterns.is_empty() || self.patterns.iter().any(|p| path.contains(p.as_str()))
    }
}

/// Inclusive bounds on a session's end time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub const fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// Whether a session ending at `end_time` falls within the range.
    ///
    /// A missing end time sorts before every instant: it fails a start bound
    /// and passes an end bound.
    pub fn contains_end(&self, end_time: Option<DateTime<Utc>>) -> bool {
        let Some(ts) = end_time else {
            return self.start.is_none();
        };
        self.start.is_none_or(|start| ts >= start) && self.end.is_none_or(|end| ts <= end)
    }
}

/// Global cap on retained sessions. A limit of zero means unlimited.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionBudget {
    limit: usize,
    used: usize,
}

impl SessionBudget {
    pub const fn new(limit: usize) -> Self {
        Self { limit, used: 0 }
    }

    /// Record one retained session.
    pub const fn consume(&mut self) {
        self.used += 1;
    }

    pub const fn is_exhausted(&self) -> bool {
        self.limit > 0 && self.used >= self.limit
    }

    pub const fn used(&self) -> usize {
        self.used
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_project_filter_substring() {
        let filter = ProjectFilter::new(["/Users/test"]);
        assert!(filter.matches("/Users/test/app"));
        assert!(filter.matches("/Users/testing"));
        assert!(!filter.matches("/home/test"));

        assert!(ProjectFilter::default().matches("/anything"));

        let filter = ProjectFilter::new(vec!["api".to_string(), "web".to_string()]);
        assert!(filter.matches("/src/web"));
        assert!(!filter.matches("/src/cli"));
    }

    #[test]
    fn test_date_range_inclusive_on_end_time() {
        let range = DateRange::new(Some(day(10)), Some(day(20)));
        assert!(range.contains_end(Some(day(10))));
        assert!(range.contains_end(Some(day(15))));
        assert!(range.contains_end(Some(day(20))));
        assert!(!range.contains_end(Some(day(9))));
        assert!(!range.contains_end(Some(day(21))));
    }

    #[test]
    fn test_date_range_open_ends() {
        assert!(DateRange::new(Some(day(10)), None).contains_end(Some(day(30))));
        assert!(DateRange::new(None, Some(day(10))).contains_end(Some(day(1))));
        assert!(DateRange::default().contains_end(Some(day(1))));
    }

    #[test]
    fn test_date_range_without_end_time() {
        assert!(DateRange::default().contains_end(None));
        assert!(!DateRange::new(Some(day(1)), None).contains_end(None));
        assert!(DateRange::new(None, Some(day(1))).contains_end(None));
    }

    #[test]
    fn test_session_budget() {
        let mut unlimited = SessionBudget::new(0);
        for _ in 0..100 {
            unlimited.consume();
        }
        assert!(!unlimited.is_exhausted());

        let mut budget = SessionBudget::new(2);
        budget.consume();
        assert!(!budget.is_exhausted());
        budget.consume();
        assert!(budget.is_exhausted());
        assert_eq!(budget.used(), 2);
    }
}
