//! The shapes the tally server is expected to answer with, and how a response is turned into either
//! a typed value or an error that can be shown to the user.

use crate::error::{ErrorType, IntoResult};
use crate::model::ListedRecord;
use crate::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt::{Display, Formatter};

/// Body of a successful bulk-create call. The record list is keyed `expenses` or `incomes`
/// depending on the endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkCreated {
    pub message: String,
    #[serde(alias = "expenses", alias = "incomes")]
    pub records: Vec<ListedRecord>,
}

/// Body of a successful single create. The record is keyed `expense` or `income`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Created {
    pub message: String,
    #[serde(alias = "expense", alias = "income")]
    pub record: ListedRecord,
}

/// Body of a successful delete or bulk delete.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Deleted {
    pub message: String,
}

/// Body of a failed call, when the server bothered to explain itself.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// The server answered with a non-success status.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ServerRejection {
    pub status: u16,
    /// The `error` field of the response body, if there was one.
    pub message: Option<String>,
}

impl Display for ServerRejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.message {
            Some(message) => write!(f, "the server rejected the request ({}): {message}", self.status),
            None => write!(f, "the server rejected the request ({})", self.status),
        }
    }
}

impl StdError for ServerRejection {}

/// The server answered with a success status but the body did not have the expected shape.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct UnexpectedResponse {
    pub endpoint: String,
    pub detail: String,
}

impl Display for UnexpectedResponse {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unexpected response from {}: {}", self.endpoint, self.detail)
    }
}

impl StdError for UnexpectedResponse {}

/// Checks the status and decodes `body` as `T`.
pub(crate) fn decode<T>(endpoint: &str, status: u16, body: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    if !(200..300).contains(&status) {
        return Err(rejection(status, body)).pub_result(ErrorType::Server);
    }
    serde_json::from_str(body)
        .map_err(|e| UnexpectedResponse {
            endpoint: endpoint.to_string(),
            detail: e.to_string(),
        })
        .pub_result(ErrorType::Server)
}

fn rejection(status: u16, body: &str) -> ServerRejection {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|b| b.error)
        .filter(|m| !m.is_empty());
    ServerRejection { status, message }
}

/// The text to show a user for a failed server call: the server's own message, the description of
/// a malformed response, or `fallback`.
pub fn failure_message(e: &crate::Error, fallback: &str) -> String {
    if let Some(ServerRejection {
        message: Some(message),
        ..
    }) = e.downcast_ref::<ServerRejection>()
    {
        return message.clone();
    }
    if let Some(unexpected) = e.downcast_ref::<UnexpectedResponse>() {
        return unexpected.to_string();
    }
    fallback.to_string()
}
