//! Single-file validation command.

use std::path::Path;

use console::style;

use crate::ingest::{read_match_file, validate};

/// Parse one match file and check the innings limits without touching the store.
pub fn cmd_validate(file: &Path) -> anyhow::Result<()> {
    let deliveries = read_match_file(file)?;

    let Some(first) = deliveries.first() else {
        println!(
            "{} {} contains no deliveries",
            style("!").yellow(),
            file.display()
        );
        return Ok(());
    };

    println!(
        "{} Match {} ({}, {})",
        style("→").cyan(),
        first.match_id,
        first.season,
        first.venue
    );

    match validate(&deliveries) {
        Ok(innings) => {
            for summary in &innings {
                println!(
                    "  Innings {}: {}/{} from {} legal balls",
                    summary.innings, summary.runs, summary.wickets, summary.legal_balls
                );
            }
            println!(
                "{} {} deliveries valid",
                style("✓").green(),
                deliveries.len()
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", style("✗").red(), e);
            Err(e.into())
        }
    }
}
