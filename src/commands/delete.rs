//! Delete command handler.

use crate::commands::{split_notices, Out};
use crate::controller::{Command, Page, View};
use crate::error::{ErrorType, IntoResult};
use crate::Result;
use anyhow::anyhow;
use tracing::warn;

/// Deletes `ids` through the page. A single id uses the single delete endpoint. Several ids are
/// deleted in one request, and ids that do not exist are ignored as long as one does.
pub async fn delete(page: &mut Page, ids: &[i64]) -> Result<Out<View>> {
    let command = match ids {
        [id] => Command::Delete(*id),
        _ => Command::DeleteSelected(ids.to_vec()),
    };
    let view = page.handle(command).await;
    let (successes, failures) = split_notices(&view);
    if successes.is_empty() {
        return Err(anyhow!(failures.join("\n"))).pub_result(ErrorType::Server);
    }
    for failure in &failures {
        warn!("{failure}");
    }
    Ok(Out::new(successes.join("\n"), view))
}
