use crate::commands::Out;
use crate::controller::{Command, Level, Page, View};
use crate::error::{ErrorType, IntoResult};
use crate::filter::Filter;
use crate::model::ListedRecord;
use crate::Result;
use anyhow::anyhow;

/// Loads the listing and applies `filter`. The message is a table of the matching rows.
pub async fn list(page: &mut Page, filter: Filter) -> Result<Out<View>> {
    let loaded = page.handle(Command::Reload).await;
    if let Some(notice) = loaded.notices.iter().find(|n| n.level == Level::Error) {
        return Err(anyhow!(notice.message.clone())).pub_result(ErrorType::Server);
    }
    let view = page.handle(Command::Filter(filter)).await;
    let message = if view.rows.is_empty() {
        format!("No {} match ({} in total)", view.domain, view.total)
    } else {
        format!(
            "Showing {} of {} {}\n\n{}",
            view.rows.len(),
            view.total,
            view.domain,
            table(&view.rows)
        )
    };
    Ok(Out::new(message, view))
}

/// Renders records as a markdown table.
fn table(records: &[ListedRecord]) -> String {
    let mut lines = vec![
        "| Id | Date | Category | Description | Amount |".to_string(),
        "|---:|------|----------|-------------|-------:|".to_string(),
    ];
    for record in records {
        let date = record.date.split(' ').next().unwrap_or(&record.date);
        lines.push(format!(
            "| {} | {date} | {} | {} | {} |",
            record.id,
            record.category,
            record.description.replace('|', "\\|"),
            format_num::format_num!(",.2", record.amount)
        ));
    }
    lines.join("\n")
}
