//! Configuration file handling for tally.
//!
//! The configuration file is stored at `$TALLY_HOME/config.json` and says which tally server to
//! talk to and how to authenticate with it.

use crate::error::{ErrorType, IntoResult};
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const APP_NAME: &str = "tally";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";

/// Overrides `access_token` from the config file when set and non-empty.
pub const ACCESS_TOKEN_VAR: &str = "TALLY_ACCESS_TOKEN";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$TALLY_HOME` and from there it loads `$TALLY_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    server_url: Url,
    access_token: Option<String>,
}

impl Config {
    /// Creates the tally home directory and an initial `config.json` in it.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the tally home, e.g. `$HOME/tally`
    /// - `server_url` - The base URL of the tally server, e.g. `http://localhost:5000`
    /// - `access_token` - The bearer token to send with every request, if the server needs one
    ///
    /// # Errors
    /// - Returns an error if `server_url` is not a URL or if any file operations fail.
    pub async fn create(
        dir: impl Into<PathBuf>,
        server_url: &str,
        access_token: Option<&str>,
    ) -> Result<Self> {
        let server_url = parse_server_url(server_url)?;

        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the tally home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;
        let config_path = root.join(CONFIG_JSON);

        let config_file = ConfigFile {
            server_url: server_url.to_string(),
            access_token: access_token.map(String::from),
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            config_path,
            access_token: config_file.access_token.clone(),
            config_file,
            server_url,
        })
    }

    /// This will
    /// - validate that `tally_home` and its config file exist
    /// - load and validate the config file
    /// - apply the `TALLY_ACCESS_TOKEN` override
    pub async fn load(tally_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = tally_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Tally home is missing, run 'tally init' first")
            .pub_result(ErrorType::Config)?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            return Err(anyhow::anyhow!(
                "The config file is missing '{}'",
                config_path.display()
            ))
            .pub_result(ErrorType::Config);
        }
        let config_file = ConfigFile::load(&config_path)
            .await
            .pub_result(ErrorType::Config)?;
        let server_url = parse_server_url(&config_file.server_url)?;
        let access_token = token_override(
            config_file.access_token.as_deref(),
            std::env::var(ACCESS_TOKEN_VAR).ok(),
        );

        Ok(Self {
            root,
            config_path,
            config_file,
            server_url,
            access_token,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn server_url(&self) -> &Url {
        &self.server_url
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// The timeout applied to each request. `None` waits indefinitely.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.config_file
            .request_timeout_secs
            .map(Duration::from_secs)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "tally",
///   "config_version": 1,
///   "server_url": "http://localhost:5000",
///   "access_token": "eyJhbGciOiJIUzI1NiIs...",
///   "request_timeout_secs": 30
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "tally"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Base URL of the tally server
    server_url: String,

    /// Bearer token sent with every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    request_timeout_secs: Option<u64>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            server_url: String::new(),
            access_token: None,
            request_timeout_secs: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if `app_name` is wrong.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        if config.config_version != CONFIG_VERSION {
            bail!(
                "Unsupported config_version {} in {}, expected {CONFIG_VERSION}",
                config.config_version,
                path.display()
            );
        }

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}

fn parse_server_url(s: &str) -> Result<Url> {
    let url = Url::parse(s)
        .with_context(|| format!("Invalid server_url '{s}'"))
        .pub_result(ErrorType::Config)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(anyhow::anyhow!(
            "The server_url must be http or https, got '{s}'"
        ))
        .pub_result(ErrorType::Config);
    }
    Ok(url)
}

/// A non-empty `env_value` wins over the token stored in the config file.
fn token_override(from_file: Option<&str>, env_value: Option<String>) -> Option<String> {
    env_value
        .filter(|v| !v.is_empty())
        .or_else(|| from_file.map(String::from))
}
