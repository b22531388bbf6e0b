//! The seam between the import pipeline and the tally server.
//!
//! `Server` is implemented over HTTP by `HttpServer` and in memory by `TestServer`. Which one the
//! CLI uses is decided by `Mode`.

mod http;
mod schema;
mod test_server;

use crate::model::{CandidateRecord, Domain, ListedRecord, NewRecord};
use crate::{Config, Result};
use tracing::debug;

pub use http::HttpServer;
pub use schema::{
    failure_message, BulkCreated, Created, Deleted, ErrorBody, ServerRejection, UnexpectedResponse,
};
pub use test_server::TestServer;

/// When this environment variable is set and non-empty the CLI talks to a `TestServer`.
pub const TEST_MODE_VAR: &str = "TALLY_IN_TEST_MODE";

/// The operations the expense and income pages need from the tally server.
#[async_trait::async_trait]
pub trait Server: Send {
    /// Fetches every record of `domain`, newest first.
    async fn list(&mut self, domain: Domain) -> Result<Vec<ListedRecord>>;

    /// Creates all of `records` in a single request. The server either stores all of them or none.
    async fn bulk_create(
        &mut self,
        domain: Domain,
        records: &[CandidateRecord],
    ) -> Result<BulkCreated>;

    /// Creates a single record entered by hand.
    async fn create(&mut self, domain: Domain, record: &NewRecord) -> Result<Created>;

    /// Deletes the record with `id`.
    async fn delete(&mut self, domain: Domain, id: i64) -> Result<Deleted>;

    /// Deletes every record in `ids` that exists. Fails if none of them do.
    async fn bulk_delete(&mut self, domain: Domain, ids: &[i64]) -> Result<Deleted>;
}

/// Selects the `Server` implementation.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    #[default]
    Http,
    Test,
}

impl Mode {
    /// Returns `Mode::Test` if `TALLY_IN_TEST_MODE` is set to a non-empty value.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_VAR) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Http,
        }
    }
}

/// Creates the `Server` for `mode`.
pub fn server(config: &Config, mode: Mode) -> Result<Box<dyn Server>> {
    debug!("Using the {mode:?} server");
    match mode {
        Mode::Http => Ok(Box::new(HttpServer::new(config)?)),
        Mode::Test => Ok(Box::new(TestServer::default())),
    }
}
