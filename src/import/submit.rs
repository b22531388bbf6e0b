//! Sends an accepted batch to the bulk-create endpoint.

use crate::api::{failure_message, BulkCreated, Server};
use crate::import::ImportBatch;
use crate::model::Domain;
use serde::Serialize;
use tracing::{info, warn};

pub const UPLOAD_SUCCESSFUL: &str = "Upload successful!";

/// What happened to a batch after it was handed to `submit`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum Submission {
    /// The server stored every record.
    Uploaded { created: BulkCreated },
    /// Not sent: at least one row is invalid. Holds the `Upload failed:` message.
    Rejected { message: String },
    /// Not sent: the file had no data rows.
    Empty { message: String },
    /// Sent, but the server could not be reached or refused it.
    Failed { message: String },
}

impl Submission {
    pub fn is_uploaded(&self) -> bool {
        matches!(self, Submission::Uploaded { .. })
    }

    /// The message a user sees for this outcome.
    pub fn message(&self) -> &str {
        match self {
            Submission::Uploaded { .. } => UPLOAD_SUCCESSFUL,
            Submission::Rejected { message }
            | Submission::Empty { message }
            | Submission::Failed { message } => message,
        }
    }
}

/// Submits `batch` if it was accepted. Rejected and empty batches never reach the server. Nothing
/// is retried.
pub async fn submit(server: &mut dyn Server, domain: Domain, batch: &ImportBatch) -> Submission {
    let records = match batch {
        ImportBatch::Accepted(records) => records,
        ImportBatch::Rejected(_) => {
            return Submission::Rejected {
                message: batch.user_message().unwrap_or_default(),
            }
        }
        ImportBatch::Empty => {
            return Submission::Empty {
                message: batch.user_message().unwrap_or_default(),
            }
        }
    };
    match server.bulk_create(domain, records).await {
        Ok(created) => {
            info!("Uploaded {} {domain}", created.records.len());
            Submission::Uploaded { created }
        }
        Err(e) => {
            warn!("Uploading {} {domain} failed: {e:#}", records.len());
            Submission::Failed {
                message: failure_message(&e, &domain.upload_fallback_message()),
            }
        }
    }
}
