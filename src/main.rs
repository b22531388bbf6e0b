use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use tally_import::args::{Args, Command};
use tally_import::controller::Page;
use tally_import::filter::Filter;
use tally_import::import::FileReader;
use tally_import::model::Domain;
use tally_import::{api, commands, Config, Mode, Result};
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().tally_home().path();

    // This allows for running the program without a tally server. When TALLY_IN_TEST_MODE is set
    // and non-zero in length, then the mode will be Mode::Test, otherwise it will be Mode::Http.
    let mode = Mode::from_env();

    let _: () = match args.command() {
        Command::Init(init_args) => {
            commands::init(home, init_args.server_url(), init_args.access_token())
                .await?
                .print()
        }

        Command::Template(template_args) => {
            commands::template(template_args.domain(), &template_args.output())
                .await?
                .print()
        }

        Command::Validate(validate_args) => commands::validate(&FileReader, validate_args.file())
            .await?
            .print(),

        Command::Upload(upload_args) => {
            let mut page = page(home, mode, upload_args.domain()).await?;
            commands::upload(&mut page, upload_args.file())
                .await?
                .print()
        }

        Command::List(list_args) => {
            let mut page = page(home, mode, list_args.domain()).await?;
            let filter = Filter::new(
                list_args.query().unwrap_or_default(),
                list_args.category().map(|c| c.to_string()),
                list_args.month(),
            );
            commands::list(&mut page, filter).await?.print()
        }

        Command::Add(add_args) => {
            let mut page = page(home, mode, add_args.domain()).await?;
            commands::add(&mut page, add_args.record()).await?.print()
        }

        Command::Delete(delete_args) => {
            let mut page = page(home, mode, delete_args.domain()).await?;
            commands::delete(&mut page, delete_args.ids()).await?.print()
        }
    };
    Ok(())
}

async fn page(home: &Path, mode: Mode, domain: Domain) -> Result<Page> {
    let config = Config::load(home).await?;
    let server = api::server(&config, mode)?;
    Ok(Page::new(domain, Box::new(FileReader), server))
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this package only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
