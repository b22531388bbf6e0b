//! Add command handler.

use crate::commands::{split_notices, Out};
use crate::controller::{Command, Page, View};
use crate::error::{ErrorType, IntoResult};
use crate::model::NewRecord;
use crate::Result;
use anyhow::anyhow;
use tracing::warn;

/// Creates one record through the page. The listing in the returned view includes it.
pub async fn add(page: &mut Page, record: NewRecord) -> Result<Out<View>> {
    let view = page.handle(Command::Add(record)).await;
    let (successes, failures) = split_notices(&view);
    if successes.is_empty() {
        return Err(anyhow!(failures.join("\n"))).pub_result(ErrorType::Server);
    }
    for failure in &failures {
        warn!("{failure}");
    }
    Ok(Out::new(successes.join("\n"), view))
}
