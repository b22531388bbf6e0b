//! Narrows a listing by description text, category and month.

use crate::model::ListedRecord;
use serde::{Deserialize, Serialize};

/// The active listing filter. Empty fields match everything.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// Case-insensitive substring of the description.
    pub query: String,
    /// Exact category name.
    pub category: Option<String>,
    /// `YYYY-MM` prefix of the record date.
    pub month: Option<String>,
}

impl Filter {
    pub fn new(
        query: impl Into<String>,
        category: Option<impl Into<String>>,
        month: Option<impl Into<String>>,
    ) -> Self {
        Self {
            query: query.into(),
            category: category.map(Into::into).filter(|c: &String| !c.is_empty()),
            month: month.map(Into::into).filter(|m: &String| !m.is_empty()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_empty() && self.category.is_none() && self.month.is_none()
    }

    pub fn matches(&self, record: &ListedRecord) -> bool {
        let query = self.query.to_lowercase();
        matches_query(record, &query)
            && matches_category(record, self.category.as_deref())
            && matches_month(record, self.month.as_deref())
    }

    /// Returns the matching records in their original order.
    pub fn apply(&self, records: &[ListedRecord]) -> Vec<ListedRecord> {
        filter(
            records,
            &self.query,
            self.category.as_deref(),
            self.month.as_deref(),
        )
    }
}

/// Returns the records whose description contains `query` (ignoring case), whose category equals
/// `category` and whose date starts with `month`. Empty or absent criteria match everything.
pub fn filter(
    records: &[ListedRecord],
    query: &str,
    category: Option<&str>,
    month: Option<&str>,
) -> Vec<ListedRecord> {
    let query = query.to_lowercase();
    records
        .iter()
        .filter(|r| matches_query(r, &query) && matches_category(r, category) && matches_month(r, month))
        .cloned()
        .collect()
}

/// Sorts by date, newest first. Listed dates are zero-padded so text order is date order.
pub fn sort_newest_first(records: &mut [ListedRecord]) {
    records.sort_by(|a, b| b.date.cmp(&a.date));
}

fn matches_query(record: &ListedRecord, lowercase_query: &str) -> bool {
    lowercase_query.is_empty() || record.description.to_lowercase().contains(lowercase_query)
}

fn matches_category(record: &ListedRecord, category: Option<&str>) -> bool {
    match category {
        None | Some("") => true,
        Some(c) => record.category == c,
    }
}

fn matches_month(record: &ListedRecord, month: Option<&str>) -> bool {
    match month {
        None | Some("") => true,
        Some(m) => record.date.starts_with(m),
    }
}
