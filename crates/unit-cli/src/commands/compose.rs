//! Compose command implementation

use colored::Colorize;
use serde_json::json;
use unit_core::ComposeOptions;

use crate::context::AppContext;
use crate::error::Result;

/// Compose every manifest unit and print what each contributed.
pub fn run_compose(context: &AppContext, sequential: bool, json: bool) -> Result<()> {
    let options = if sequential {
        ComposeOptions::sequential()
    } else {
        ComposeOptions::default()
    };
    let (registry, reports) = context.compose(&options)?;

    if json {
        let output = json!({
            "app": context.manifest().app.name,
            "units": reports,
            "artifacts": registry.len(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "{} Composed {} ({} units, {} artifacts)",
        "OK".green().bold(),
        context.manifest().app.name.cyan(),
        reports.len(),
        registry.len()
    );
    for report in &reports {
        println!();
        println!("{}", report.unit.to_string().bold());
        for key in &report.inserted {
            println!("   {} {:<14} {}", "+".green(), key.kind.to_string().dimmed(), key.name);
        }
        for key in &report.skipped {
            println!("   {} {:<14} {}", "-".yellow(), key.kind.to_string().dimmed(), key.name.dimmed());
        }
    }
    Ok(())
}
