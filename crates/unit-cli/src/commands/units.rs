//! List the units shipped with this binary

use colored::Colorize;
use unit_core::UnitCatalog;

use crate::error::Result;

pub fn run_units(catalog: &UnitCatalog) -> Result<()> {
    println!("{}", "Available Units".bold());
    println!();

    let mut count = 0;
    for factory in catalog.iter() {
        let id = factory.id();
        println!(
            "  {:<20} {} {}",
            format!("{}:{}", id.group, id.artifact).green(),
            id.version.cyan(),
            factory.description().dimmed()
        );
        count += 1;
    }

    println!();
    println!(
        "{} {} units available. List them under {} in the manifest.",
        "Total:".dimmed(),
        count,
        "[[units]]".cyan()
    );
    Ok(())
}
