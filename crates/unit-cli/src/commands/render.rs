//! Render and changelog command implementations
//!
//! Both commands produce one document and hand it to [`emit`]: stdout by
//! default, an atomic write with `--out`, or a drift check against the
//! existing file with `--out --check`.

use std::collections::BTreeSet;
use std::path::Path;

use colored::Colorize;
use similar::TextDiff;
use unit_fs::{NormalizedPath, compute_content_checksum, compute_file_checksum, io};
use unit_reference::{GeoConfig, render_changelog};
use unit_template::{Parameters, SchemaTemplate};

use crate::context::AppContext;
use crate::error::{CliError, Result};

/// Run the render command on an arbitrary template file.
pub fn run_render(
    template: &Path,
    params: &[(String, String)],
    disabled: &[String],
    out: Option<&Path>,
    check: bool,
) -> Result<()> {
    let template = SchemaTemplate::load(&NormalizedPath::new(template))?;
    let parameters: Parameters = params.iter().cloned().collect();
    let disabled: BTreeSet<String> = disabled.iter().cloned().collect();

    let rendered = template.render(&parameters, &disabled)?;
    emit(&rendered, out, check)
}

/// Run the changelog command for the geo unit in `namespace`.
pub fn run_changelog(
    context: &AppContext,
    namespace: Option<&str>,
    changeset: &str,
    out: Option<&Path>,
    check: bool,
) -> Result<()> {
    let entry = context.geo_entry(namespace)?;
    let config = GeoConfig::new(entry.settings.clone());
    let rendered = render_changelog(&config, context.author(), changeset)?;
    emit(&rendered, out, check)
}

fn emit(rendered: &str, out: Option<&Path>, check: bool) -> Result<()> {
    let Some(out) = out else {
        print!("{}", rendered);
        return Ok(());
    };
    let path = NormalizedPath::new(out);
    let checksum = compute_content_checksum(rendered);

    if check {
        let (existing, found) = if path.exists() {
            (io::read_text(&path)?, compute_file_checksum(&path.to_native())?)
        } else {
            (String::new(), "missing".to_string())
        };
        if existing == rendered {
            println!("{} {} is up to date ({})", "OK".green().bold(), path.as_str().cyan(), checksum.dimmed());
            return Ok(());
        }

        let diff = TextDiff::from_lines(existing.as_str(), rendered);
        print!(
            "{}",
            diff.unified_diff()
                .context_radius(3)
                .header(path.as_str(), "rendered")
        );
        return Err(CliError::user(format!(
            "{} is out of date ({} on disk, {} rendered); run without --check to regenerate",
            path, found, checksum
        )));
    }

    io::write_text(&path, rendered)?;
    println!("{} Wrote {} ({})", "OK".green().bold(), path.as_str().cyan(), checksum.dimmed());
    Ok(())
}
