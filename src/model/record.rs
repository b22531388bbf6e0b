use crate::model::Category;
use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

/// The date format the single-record endpoint accepts.
pub const NEW_RECORD_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A row that has passed every validation step and is eligible for submission. This is also the
/// wire format of one element of the bulk-create request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    /// Normalized date-time, always `YYYY-MM-DDT00:00`.
    pub date: String,
    pub category: Category,
    pub description: String,
    /// Strictly positive and finite.
    pub amount: f64,
}

/// A record entered by hand, sent on its own to the create endpoint. Unlike `CandidateRecord` it
/// carries a time of day down to the second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecord {
    pub amount: f64,
    pub category: Category,
    pub description: String,
    /// `YYYY-MM-DDTHH:MM:SS`
    pub date: String,
}

impl NewRecord {
    pub fn new(
        amount: f64,
        category: Category,
        description: impl Into<String>,
        date: NaiveDateTime,
    ) -> Self {
        Self {
            amount,
            category,
            description: description.into(),
            date: date.format(NEW_RECORD_DATE_FORMAT).to_string(),
        }
    }
}

/// One record as returned by the listing and bulk-create endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListedRecord {
    pub id: i64,
    pub amount: f64,
    pub category: String,
    /// The server stores `NULL` for records created without a description.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    /// Server-local time formatted as `YYYY-MM-DD HH:MM:SS`.
    pub date: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}
