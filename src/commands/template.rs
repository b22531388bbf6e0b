use crate::commands::Out;
use crate::model::Domain;
use crate::{template, Result};
use std::path::{Path, PathBuf};

/// Writes the import template to `output`.
pub async fn template(domain: Domain, output: &Path) -> Result<Out<PathBuf>> {
    template::write_template(output).await?;
    Ok(Out::new(
        format!("Wrote the {domain} template to {}", output.display()),
        output.to_path_buf(),
    ))
}
