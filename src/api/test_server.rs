//! Implements the `Server` trait using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that the whole CLI can
//! be run, top-to-bottom, without a tally server.

use crate::api::{BulkCreated, Created, Deleted, ServerRejection, Server};
use crate::error::{ErrorType, IntoResult};
use crate::model::{CandidateRecord, Domain, ListedRecord, NewRecord, NEW_RECORD_DATE_FORMAT};
use crate::Result;
use chrono::{Local, NaiveDateTime};
use std::collections::HashMap;

const CANDIDATE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M";
const LISTED_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Stores records per domain and assigns ids the way the real server does.
#[derive(Debug, Clone)]
pub struct TestServer {
    records: HashMap<Domain, Vec<ListedRecord>>,
    next_id: i64,
    rejection: Option<ServerRejection>,
}

impl TestServer {
    /// Create a new `TestServer` holding `expenses` and `incomes`.
    pub fn new(expenses: Vec<ListedRecord>, incomes: Vec<ListedRecord>) -> Self {
        let next_id = expenses
            .iter()
            .chain(incomes.iter())
            .map(|r| r.id)
            .max()
            .unwrap_or(0)
            + 1;
        let mut records = HashMap::new();
        records.insert(Domain::Expenses, expenses);
        records.insert(Domain::Incomes, incomes);
        Self {
            records,
            next_id,
            rejection: None,
        }
    }

    /// A server with no records.
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    /// Makes every subsequent create or delete fail with `rejection`.
    pub fn reject_with(mut self, rejection: ServerRejection) -> Self {
        self.rejection = Some(rejection);
        self
    }

    /// The stored records of `domain`, in insertion order.
    pub fn records(&self, domain: Domain) -> &[ListedRecord] {
        self.records.get(&domain).map(Vec::as_slice).unwrap_or(&[])
    }

    fn check_rejection(&self) -> Result<()> {
        match &self.rejection {
            Some(rejection) => Err(rejection.clone()).pub_result(ErrorType::Server),
            None => Ok(()),
        }
    }

    fn listed(&self, candidate: &CandidateRecord, id: i64) -> Result<ListedRecord> {
        // The real server fails without an explanation when it cannot parse a date.
        let date = NaiveDateTime::parse_from_str(&candidate.date, CANDIDATE_DATE_FORMAT)
            .map_err(|_| ServerRejection {
                status: 500,
                message: None,
            })
            .pub_result(ErrorType::Server)?;
        Ok(ListedRecord {
            id,
            amount: candidate.amount,
            category: candidate.category.to_string(),
            description: candidate.description.clone(),
            date: date.format(LISTED_DATE_FORMAT).to_string(),
        })
    }
}

#[async_trait::async_trait]
impl Server for TestServer {
    async fn list(&mut self, domain: Domain) -> Result<Vec<ListedRecord>> {
        let mut records = self.records(domain).to_vec();
        records.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(records)
    }

    async fn bulk_create(
        &mut self,
        domain: Domain,
        records: &[CandidateRecord],
    ) -> Result<BulkCreated> {
        self.check_rejection()?;
        let mut created = Vec::with_capacity(records.len());
        for (ix, candidate) in records.iter().enumerate() {
            created.push(self.listed(candidate, self.next_id + ix as i64)?);
        }
        self.next_id += created.len() as i64;
        self.records
            .entry(domain)
            .or_default()
            .extend(created.iter().cloned());
        Ok(BulkCreated {
            message: format!("{} added successfully", capitalized(domain)),
            records: created,
        })
    }

    async fn create(&mut self, domain: Domain, record: &NewRecord) -> Result<Created> {
        self.check_rejection()?;
        let date = NaiveDateTime::parse_from_str(&record.date, NEW_RECORD_DATE_FORMAT)
            .map_err(|_| bad_request(400, "Invalid date format"))
            .pub_result(ErrorType::Server)?;
        if date > Local::now().naive_local() {
            return Err(bad_request(400, "Date cannot be in the future"))
                .pub_result(ErrorType::Server);
        }
        let listed = ListedRecord {
            id: self.next_id,
            amount: record.amount,
            category: record.category.to_string(),
            description: record.description.clone(),
            date: date.format(LISTED_DATE_FORMAT).to_string(),
        };
        self.next_id += 1;
        self.records.entry(domain).or_default().push(listed.clone());
        Ok(Created {
            message: format!("{} added successfully", capitalized_singular(domain)),
            record: listed,
        })
    }

    async fn delete(&mut self, domain: Domain, id: i64) -> Result<Deleted> {
        self.check_rejection()?;
        let records = self.records.entry(domain).or_default();
        let Some(ix) = records.iter().position(|r| r.id == id) else {
            let message = format!("{} not found", capitalized_singular(domain));
            return Err(bad_request(404, message)).pub_result(ErrorType::Server);
        };
        records.remove(ix);
        Ok(Deleted {
            message: format!("{} deleted successfully", capitalized_singular(domain)),
        })
    }

    async fn bulk_delete(&mut self, domain: Domain, ids: &[i64]) -> Result<Deleted> {
        self.check_rejection()?;
        if ids.is_empty() {
            let message = format!("No {} IDs provided", domain.singular());
            return Err(bad_request(400, message)).pub_result(ErrorType::Server);
        }
        let records = self.records.entry(domain).or_default();
        let before = records.len();
        records.retain(|r| !ids.contains(&r.id));
        if records.len() == before {
            let message = format!("No matching {domain} found");
            return Err(bad_request(404, message)).pub_result(ErrorType::Server);
        }
        Ok(Deleted {
            message: format!("Selected {domain} deleted successfully"),
        })
    }
}

impl Default for TestServer {
    /// Seeds the server with a few records.
    fn default() -> Self {
        Self::new(seed_expenses(), seed_incomes())
    }
}

fn capitalized(domain: Domain) -> &'static str {
    match domain {
        Domain::Expenses => "Expenses",
        Domain::Incomes => "Incomes",
    }
}

fn capitalized_singular(domain: Domain) -> &'static str {
    match domain {
        Domain::Expenses => "Expense",
        Domain::Incomes => "Income",
    }
}

fn bad_request(status: u16, message: impl Into<String>) -> ServerRejection {
    ServerRejection {
        status,
        message: Some(message.into()),
    }
}

fn seed(id: i64, amount: f64, category: &str, description: &str, date: &str) -> ListedRecord {
    ListedRecord {
        id,
        amount,
        category: category.to_string(),
        description: description.to_string(),
        date: date.to_string(),
    }
}

fn seed_expenses() -> Vec<ListedRecord> {
    vec![
        seed(1, 42.18, "Food", "Groceries", "2024-03-02 00:00:00"),
        seed(2, 15.0, "Entertainment", "Movie night", "2024-03-09 00:00:00"),
        seed(3, 120.4, "Bills", "Electricity", "2024-02-27 00:00:00"),
        seed(4, 64.99, "Shopping", "Running shoes", "2024-02-14 00:00:00"),
    ]
}

fn seed_incomes() -> Vec<ListedRecord> {
    vec![
        seed(5, 3200.0, "Other", "Salary", "2024-02-29 00:00:00"),
        seed(6, 150.0, "Other", "Side project", "2024-03-05 00:00:00"),
    ]
}
