pub mod api;
pub mod args;
pub mod commands;
mod config;
pub mod controller;
mod error;
pub mod filter;
pub mod import;
pub mod model;
pub mod template;
mod utils;


pub use api::Mode;
pub use config::Config;
pub use error::{error_type, Error, ErrorType, IntoResult, Result};
