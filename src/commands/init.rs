use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the tally home directory and an initial `config.json` pointing at `server_url`.
///
/// # Errors
/// - Returns an error if `server_url` is not an http(s) URL or if any file operations fail.
pub async fn init(
    tally_home: &Path,
    server_url: &str,
    access_token: Option<&str>,
) -> Result<Out<()>> {
    let config = Config::create(tally_home, server_url, access_token)
        .await
        .context("Unable to create the tally home directory and config")
        .pub_result(ErrorType::Config)?;
    Ok(format!(
        "Successfully created the tally config at {}",
        config.config_path().display()
    )
    .into())
}
