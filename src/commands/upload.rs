use crate::commands::{split_notices, Out};
use crate::controller::{Command, Page, View};
use crate::error::{ErrorType, IntoResult};
use crate::Result;
use anyhow::anyhow;
use std::path::Path;
use tracing::{debug, warn};

/// Uploads `file` through the import page. Anything short of a successful upload is an error.
pub async fn upload(page: &mut Page, file: &Path) -> Result<Out<View>> {
    let view = page.handle(Command::Upload(file.to_path_buf())).await;
    let (successes, failures) = split_notices(&view);
    if successes.is_empty() {
        return Err(anyhow!(failures.join("\n"))).pub_result(ErrorType::Upload);
    }
    // The upload went through even if the follow-up reload did not.
    for failure in &failures {
        warn!("{failure}");
    }
    debug!("{} now has {} records", page.domain(), view.total);
    Ok(Out::new(successes.join("\n"), view))
}
