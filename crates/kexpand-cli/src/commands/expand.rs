//! Template expansion command.

use anyhow::{Context, Result};
use kexpand_core::{ValueSources, expand, read_template};
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

/// Resolve values, expand the template and write it to `stdout` in one write.
pub fn run(
    sources: &ValueSources,
    template: Option<&Path>,
    stdin: impl Read,
    mut stdout: impl Write,
) -> Result<()> {
    let table = sources
        .resolve()
        .context("Failed to resolve substitution values")?;
    info!(keys = table.len(), "Resolved substitution values");

    let src = read_template(template, stdin).context("Failed to read template")?;

    let expanded = expand(&src, &table)
        .into_result()
        .context("Failed to expand template")?;

    stdout
        .write_all(&expanded)
        .and_then(|_| stdout.flush())
        .context("error writing to stdout")?;

    Ok(())
}
