//! The expense or income page: a store owned by one page that holds the current listing, the active
//! filter and the file picked for upload, driven by explicit commands.

use crate::api::{failure_message, Server};
use crate::filter::{sort_newest_first, Filter};
use crate::import::{submit, ImportBatch, SpreadsheetReader, Submission};
use crate::model::{Domain, ListedRecord, NewRecord};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Everything the page reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Fetch the listing again.
    Reload,
    /// Replace the active filter.
    Filter(Filter),
    ClearFilter,
    /// Read, validate and submit a spreadsheet, then reload on success.
    Upload(PathBuf),
    /// Create one record, then reload on success.
    Add(NewRecord),
    Delete(i64),
    /// Delete every listed id in one request.
    DeleteSelected(Vec<i64>),
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Success,
    Warning,
    Error,
}

serde_plain::derive_display_from_serialize!(Level);

/// A message raised while handling a command.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Notice {
    pub level: Level,
    pub message: String,
}

impl Notice {
    fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// What the page shows after a command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    pub domain: Domain,
    /// The filtered listing, newest first.
    pub rows: Vec<ListedRecord>,
    /// Number of records before filtering.
    pub total: usize,
    pub filter: Filter,
    /// The file picked for upload. Cleared after a successful upload.
    pub selected_file: Option<PathBuf>,
    /// Notices raised by the command that produced this view.
    pub notices: Vec<Notice>,
}

pub struct Page {
    domain: Domain,
    listing: Vec<ListedRecord>,
    filter: Filter,
    selected_file: Option<PathBuf>,
    reader: Box<dyn SpreadsheetReader>,
    server: Box<dyn Server>,
}

impl Page {
    pub fn new(
        domain: Domain,
        reader: Box<dyn SpreadsheetReader>,
        server: Box<dyn Server>,
    ) -> Self {
        Self {
            domain,
            listing: Vec::new(),
            filter: Filter::default(),
            selected_file: None,
            reader,
            server,
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Handles one command and renders the result.
    pub async fn handle(&mut self, command: Command) -> View {
        debug!("Handling {command:?} for {}", self.domain);
        let mut notices = Vec::new();
        match command {
            Command::Reload => self.reload(&mut notices).await,
            Command::Filter(filter) => self.filter = filter,
            Command::ClearFilter => self.filter = Filter::default(),
            Command::Upload(path) => self.upload(path, &mut notices).await,
            Command::Add(record) => self.add(record, &mut notices).await,
            Command::Delete(id) => self.delete(&[id], &mut notices).await,
            Command::DeleteSelected(ids) => self.delete(&ids, &mut notices).await,
        }
        self.render(notices)
    }

    /// A failed reload leaves the previous listing in place.
    async fn reload(&mut self, notices: &mut Vec<Notice>) {
        match self.server.list(self.domain).await {
            Ok(mut records) => {
                sort_newest_first(&mut records);
                self.listing = records;
            }
            Err(e) => {
                warn!("Unable to load {}: {e:#}", self.domain);
                let message = failure_message(&e, &self.domain.load_fallback_message());
                notices.push(Notice::new(Level::Error, message));
            }
        }
    }

    async fn upload(&mut self, path: PathBuf, notices: &mut Vec<Notice>) {
        self.selected_file = Some(path.clone());
        let grid = match self.reader.read(&path).await {
            Ok(grid) => grid,
            Err(e) => {
                warn!("Unable to read {}: {e:#}", path.display());
                notices.push(Notice::new(
                    Level::Error,
                    format!("Unable to read the spreadsheet: {e:#}"),
                ));
                return;
            }
        };
        let batch = ImportBatch::validate(&grid);
        let submission = submit(self.server.as_mut(), self.domain, &batch).await;
        let level = match &submission {
            Submission::Uploaded { .. } => Level::Success,
            Submission::Empty { .. } => Level::Warning,
            Submission::Rejected { .. } | Submission::Failed { .. } => Level::Error,
        };
        notices.push(Notice::new(level, submission.message()));
        if submission.is_uploaded() {
            self.selected_file = None;
            self.reload(notices).await;
        }
    }

    async fn add(&mut self, record: NewRecord, notices: &mut Vec<Notice>) {
        match self.server.create(self.domain, &record).await {
            Ok(created) => {
                debug!("Created {} {}", self.domain.singular(), created.record.id);
                notices.push(Notice::new(Level::Success, created.message));
                self.selected_file = None;
                self.reload(notices).await;
            }
            Err(e) => {
                warn!("Unable to add {}: {e:#}", self.domain.singular());
                let message = failure_message(&e, &self.domain.add_fallback_message());
                notices.push(Notice::new(Level::Error, message));
            }
        }
    }

    /// One id goes to the single delete endpoint and several to the bulk one.
    async fn delete(&mut self, ids: &[i64], notices: &mut Vec<Notice>) {
        let (result, fallback) = match ids {
            [] => {
                notices.push(Notice::new(
                    Level::Warning,
                    self.domain.none_selected_message(),
                ));
                return;
            }
            [id] => (
                self.server.delete(self.domain, *id).await,
                self.domain.delete_fallback_message(),
            ),
            _ => (
                self.server.bulk_delete(self.domain, ids).await,
                self.domain.bulk_delete_fallback_message(),
            ),
        };
        match result {
            Ok(deleted) => {
                notices.push(Notice::new(Level::Success, deleted.message));
                self.reload(notices).await;
            }
            Err(e) => {
                warn!("Unable to delete {ids:?} from {}: {e:#}", self.domain);
                notices.push(Notice::new(Level::Error, failure_message(&e, &fallback)));
            }
        }
    }

    fn render(&self, notices: Vec<Notice>) -> View {
        View {
            domain: self.domain,
            rows: self.filter.apply(&self.listing),
            total: self.listing.len(),
            filter: self.filter.clone(),
            selected_file: self.selected_file.clone(),
            notices,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ServerRejection, TestServer};
    use crate::import::GridReader;
    use crate::model::{Category, Cell, Grid};
    use chrono::NaiveDate;

    fn header() -> Vec<Cell> {
        vec!["Date".into(), "Category".into(), "Description".into(), "Amount".into()]
    }

    fn good_grid() -> Grid {
        vec![
            header(),
            vec!["2024-04-01".into(), "Food".into(), "Tacos".into(), 9.5.into()],
            vec!["2024/4/2".into(), "Bills".into(), Cell::Empty, 30i64.into()],
        ]
    }

    fn bad_grid() -> Grid {
        vec![
            header(),
            vec!["2024-04-01".into(), "Travel".into(), "Train".into(), 9.5.into()],
            vec!["2024-04-02".into(), "Food".into(), "Snack".into(), "-5".into()],
        ]
    }

    fn reader() -> GridReader {
        GridReader::default()
            .with("good.xlsx", good_grid())
            .with("bad.xlsx", bad_grid())
            .with("header.xlsx", vec![header()])
    }

    fn page(server: TestServer) -> Page {
        Page::new(Domain::Expenses, Box::new(reader()), Box::new(server))
    }

    #[tokio::test]
    async fn test_reload_sorts_newest_first() {
        let mut page = page(TestServer::default());
        let view = page.handle(Command::Reload).await;
        assert_eq!(view.total, 4);
        let dates: Vec<&str> = view.rows.iter().map(|r| r.date.as_str()).collect();
        let mut sorted = dates.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(dates, sorted);
        assert!(view.notices.is_empty());
    }

    #[tokio::test]
    async fn test_upload_success_reloads() {
        let mut page = page(TestServer::empty());
        let view = page.handle(Command::Upload("good.xlsx".into())).await;
        assert_eq!(
            view.notices,
            vec![Notice::new(Level::Success, "Upload successful!")]
        );
        assert_eq!(view.total, 2);
        assert_eq!(view.rows[0].date, "2024-04-02 00:00:00");
        assert_eq!(view.rows[1].description, "Tacos");
        assert!(view.selected_file.is_none());
    }

    #[tokio::test]
    async fn test_upload_rejected_sends_nothing() {
        let mut page = page(TestServer::empty());
        let view = page.handle(Command::Upload("bad.xlsx".into())).await;
        assert_eq!(view.notices.len(), 1);
        assert_eq!(view.notices[0].level, Level::Error);
        assert_eq!(
            view.notices[0].message,
            "Upload failed:\n\
             Row 2: Invalid category \"Travel\". Allowed categories: Food, Entertainment, Shopping, Bills, Other.\n\
             Row 3: Invalid amount \"-5\". Must be a positive number."
        );
        assert_eq!(view.total, 0);
        assert_eq!(view.selected_file, Some(PathBuf::from("bad.xlsx")));
        let view = page.handle(Command::Reload).await;
        assert_eq!(view.total, 0);
    }

    #[tokio::test]
    async fn test_upload_header_only_warns() {
        let mut page = page(TestServer::empty());
        let view = page.handle(Command::Upload("header.xlsx".into())).await;
        assert_eq!(
            view.notices,
            vec![Notice::new(Level::Warning, "No valid data found in the file.")]
        );
    }

    #[tokio::test]
    async fn test_upload_unreadable_file() {
        let mut page = page(TestServer::empty());
        let view = page.handle(Command::Upload("missing.xlsx".into())).await;
        assert_eq!(view.notices[0].level, Level::Error);
        assert!(view.notices[0]
            .message
            .starts_with("Unable to read the spreadsheet: "));
    }

    #[tokio::test]
    async fn test_upload_failure_keeps_listing() {
        let server = TestServer::default().reject_with(ServerRejection {
            status: 400,
            message: Some("Date cannot be in the future".to_string()),
        });
        let mut page = page(server);
        page.handle(Command::Reload).await;
        let view = page.handle(Command::Upload("good.xlsx".into())).await;
        assert_eq!(
            view.notices,
            vec![Notice::new(Level::Error, "Date cannot be in the future")]
        );
        assert_eq!(view.total, 4);
    }

    #[tokio::test]
    async fn test_filter_and_clear() {
        let mut page = page(TestServer::default());
        page.handle(Command::Reload).await;
        let view = page
            .handle(Command::Filter(Filter::new("", Some("Bills"), None::<String>)))
            .await;
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.total, 4);
        assert!(view.notices.is_empty());
        let view = page.handle(Command::ClearFilter).await;
        assert_eq!(view.rows.len(), 4);
        assert!(view.filter.is_empty());
    }

    fn lamp() -> NewRecord {
        let date = NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(18, 30, 0)
            .unwrap();
        NewRecord::new(35.0, Category::Shopping, "Lamp", date)
    }

    #[tokio::test]
    async fn test_add_reloads_and_clears_selected_file() {
        let mut page = page(TestServer::default());
        page.handle(Command::Upload("bad.xlsx".into())).await;
        let view = page.handle(Command::Add(lamp())).await;
        assert_eq!(
            view.notices,
            vec![Notice::new(Level::Success, "Expense added successfully")]
        );
        assert_eq!(view.total, 5);
        assert_eq!(view.rows[0].date, "2024-03-10 18:30:00");
        assert!(view.selected_file.is_none());
    }

    #[tokio::test]
    async fn test_add_failure_shows_server_message() {
        let server = TestServer::default().reject_with(ServerRejection {
            status: 400,
            message: Some("Invalid date format".to_string()),
        });
        let mut page = page(server);
        let view = page.handle(Command::Add(lamp())).await;
        assert_eq!(
            view.notices,
            vec![Notice::new(Level::Error, "Invalid date format")]
        );
        assert_eq!(view.total, 0);
    }

    #[tokio::test]
    async fn test_delete_one() {
        let mut page = page(TestServer::default());
        page.handle(Command::Reload).await;
        let view = page.handle(Command::Delete(3)).await;
        assert_eq!(
            view.notices,
            vec![Notice::new(Level::Success, "Expense deleted successfully")]
        );
        assert_eq!(view.total, 3);
        assert!(view.rows.iter().all(|r| r.id != 3));

        let view = page.handle(Command::Delete(3)).await;
        assert_eq!(
            view.notices,
            vec![Notice::new(Level::Error, "Expense not found")]
        );
        assert_eq!(view.total, 3);
    }

    #[tokio::test]
    async fn test_delete_selected() {
        let mut page = page(TestServer::default());
        let view = page.handle(Command::DeleteSelected(Vec::new())).await;
        assert_eq!(
            view.notices,
            vec![Notice::new(Level::Warning, "No expenses selected")]
        );

        let view = page.handle(Command::DeleteSelected(vec![1, 2])).await;
        assert_eq!(
            view.notices,
            vec![Notice::new(
                Level::Success,
                "Selected expenses deleted successfully"
            )]
        );
        assert_eq!(view.total, 2);
    }
}
