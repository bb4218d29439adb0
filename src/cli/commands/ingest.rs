//! Season ingestion command.

use std::path::Path;

use console::style;

use crate::config::Settings;
use crate::ingest::{ingest_season, IngestOptions};

/// Ingest every match file of one season from a folder.
pub async fn cmd_ingest(
    settings: &Settings,
    folder: &Path,
    season: &str,
    progress: bool,
) -> anyhow::Result<()> {
    if !folder.is_dir() {
        anyhow::bail!("{} is not a directory", folder.display());
    }

    settings.ensure_directories()?;
    let ctx = settings.create_db_context()?;
    ctx.init_schema().await?;

    println!(
        "{} Ingesting season {} from {}",
        style("→").cyan(),
        style(season).bold(),
        folder.display()
    );

    let summary = ingest_season(&ctx, folder, season, IngestOptions { progress }).await;
    ctx.close();
    let summary = summary?;

    println!(
        "  {} {} of {} files ingested ({} deliveries, {} new players)",
        style("✓").green(),
        summary.ingested,
        summary.files,
        summary.deliveries_added,
        summary.players_added
    );
    if summary.skipped > 0 {
        println!(
            "  {} {} files skipped (empty or other season)",
            style("-").dim(),
            summary.skipped
        );
    }

    if summary.failed > 0 {
        eprintln!(
            "  {} {} files failed; run with -v for details",
            style("✗").red(),
            summary.failed
        );
        anyhow::bail!("{} of {} match files failed to ingest", summary.failed, summary.files);
    }

    if summary.ingested == 0 {
        println!(
            "{} No matches found for season {}",
            style("!").yellow(),
            season
        );
    }

    Ok(())
}
