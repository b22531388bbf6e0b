//! These structs provide the CLI interface for the tally CLI.

use crate::model::{Category, Domain, NewRecord};
use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// tally: bulk-import expenses and incomes from a spreadsheet into a tally server.
///
/// Download a template with `tally template`, fill it in with one row per record, check it with
/// `tally validate` and send it with `tally upload`. A file is uploaded in full or not at all: if
/// any row is invalid nothing is sent and every problem is listed.
///
/// Accepted formats are xlsx, xlsm, xlsb, xls, ods and csv. Only the first sheet is read and its
/// first row is treated as the header.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the tally home directory and its config.json.
    ///
    /// This is the first command you should run. It records which server to talk to and,
    /// optionally, the access token to send with every request. The token can also be supplied
    /// later through TALLY_ACCESS_TOKEN.
    Init(InitArgs),
    /// Write the import template spreadsheet.
    Template(TemplateArgs),
    /// Check a spreadsheet without uploading it.
    Validate(ValidateArgs),
    /// Validate a spreadsheet and, if every row is valid, upload all of it.
    Upload(UploadArgs),
    /// Show the records stored on the server, newest first.
    List(ListArgs),
    /// Add a single record by hand.
    Add(AddArgs),
    /// Delete records by id. One id uses the single delete endpoint, several are deleted together.
    Delete(DeleteArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where tally configuration is held. Defaults to ~/tally
    #[arg(long, env = "TALLY_HOME", default_value_t = default_tally_home())]
    tally_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, tally_home: PathBuf) -> Self {
        Self {
            log_level,
            tally_home: tally_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn tally_home(&self) -> &DisplayPath {
        &self.tally_home
    }
}

/// (Not shown): Args for the `tally init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The base URL of your tally server, e.g. http://localhost:5000
    #[arg(long)]
    server_url: String,

    /// A bearer token to send with every request.
    #[arg(long)]
    access_token: Option<String>,
}

impl InitArgs {
    pub fn new(server_url: impl Into<String>, access_token: Option<String>) -> Self {
        Self {
            server_url: server_url.into(),
            access_token,
        }
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }
}

/// (Not shown): Args for the `tally template` command.
#[derive(Debug, Parser, Clone)]
pub struct TemplateArgs {
    /// Which listing the template is for. Only changes the default file name.
    #[arg(long, value_enum, default_value_t = Domain::Expenses)]
    domain: Domain,

    /// Where to write the template. Defaults to expense_template.xlsx or income_template.xlsx in
    /// the current directory.
    #[arg(long)]
    output: Option<PathBuf>,
}

impl TemplateArgs {
    pub fn new(domain: Domain, output: Option<PathBuf>) -> Self {
        Self { domain, output }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// The output path, falling back to the domain's template file name.
    pub fn output(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.domain.template_file_name()))
    }
}

/// (Not shown): Args for the `tally validate` command.
#[derive(Debug, Parser, Clone)]
pub struct ValidateArgs {
    /// The spreadsheet to check.
    file: PathBuf,
}

impl ValidateArgs {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self { file: file.into() }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }
}

/// (Not shown): Args for the `tally upload` command.
#[derive(Debug, Parser, Clone)]
pub struct UploadArgs {
    /// The spreadsheet to upload.
    file: PathBuf,

    /// Upload as expenses or incomes.
    #[arg(long, value_enum)]
    domain: Domain,
}

impl UploadArgs {
    pub fn new(file: impl Into<PathBuf>, domain: Domain) -> Self {
        Self {
            file: file.into(),
            domain,
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }
}

/// (Not shown): Args for the `tally list` command.
#[derive(Debug, Parser, Clone)]
pub struct ListArgs {
    /// List expenses or incomes.
    #[arg(long, value_enum)]
    domain: Domain,

    /// Only show records whose description contains this text, ignoring case.
    #[arg(long)]
    query: Option<String>,

    /// Only show records in this category.
    #[arg(long, value_enum)]
    category: Option<Category>,

    /// Only show records from this month, written YYYY-MM.
    #[arg(long, value_parser = parse_month)]
    month: Option<String>,
}

impl ListArgs {
    pub fn new(
        domain: Domain,
        query: Option<String>,
        category: Option<Category>,
        month: Option<String>,
    ) -> Self {
        Self {
            domain,
            query,
            category,
            month,
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn category(&self) -> Option<Category> {
        self.category
    }

    pub fn month(&self) -> Option<&str> {
        self.month.as_deref()
    }
}

/// (Not shown): Args for the `tally add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// Add an expense or an income.
    #[arg(long, value_enum)]
    domain: Domain,

    /// A positive amount.
    #[arg(long, value_parser = parse_positive_amount)]
    amount: f64,

    #[arg(long, value_enum)]
    category: Category,

    #[arg(long, default_value = "")]
    description: String,

    /// When it happened, written YYYY-MM-DD, YYYY-MM-DDTHH:MM or YYYY-MM-DDTHH:MM:SS. Defaults to
    /// now. The server refuses dates in the future.
    #[arg(long, value_parser = parse_date_time)]
    date: Option<NaiveDateTime>,
}

impl AddArgs {
    pub fn new(
        domain: Domain,
        amount: f64,
        category: Category,
        description: impl Into<String>,
        date: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            domain,
            amount,
            category,
            description: description.into(),
            date,
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// The record to send, dated now if no date was given.
    pub fn record(&self) -> NewRecord {
        let date = self.date.unwrap_or_else(|| Local::now().naive_local());
        NewRecord::new(self.amount, self.category, self.description.clone(), date)
    }
}

/// (Not shown): Args for the `tally delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// Delete expenses or incomes.
    #[arg(long, value_enum)]
    domain: Domain,

    /// The ids to delete, as shown by `tally list`.
    #[arg(required = true)]
    ids: Vec<i64>,
}

impl DeleteArgs {
    pub fn new(domain: Domain, ids: Vec<i64>) -> Self {
        Self { domain, ids }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn ids(&self) -> &[i64] {
        &self.ids
    }
}

fn parse_positive_amount(s: &str) -> std::result::Result<f64, String> {
    match s.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount > 0.0 => Ok(amount),
        _ => Err(format!("'{s}' is not a positive number")),
    }
}

fn parse_date_time(s: &str) -> std::result::Result<NaiveDateTime, String> {
    const FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];
    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| format!("'{s}' is not a date, expected YYYY-MM-DD[THH:MM[:SS]]"))
}

/// Listed dates are zero-padded, so only the padded `YYYY-MM` form can match them.
fn parse_month(s: &str) -> std::result::Result<String, String> {
    let valid = s.len() == 7
        && NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d").is_ok();
    if valid {
        Ok(s.to_string())
    } else {
        Err(format!("'{s}' is not a month, expected YYYY-MM"))
    }
}

fn default_tally_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("tally"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --tally-home or TALLY_HOME instead of relying on the default \
                tally home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("tally")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
