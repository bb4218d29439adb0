use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use super::parse::read_match_file;
use super::validate::validate;
use super::{IngestError, IngestSummary};
use crate::repository::{DbContext, StoredMatch};

#[derive(Debug, Clone, Copy, Default)]
pub struct IngestOptions {
    /// Draw a progress bar on stderr.
    pub progress: bool,
}

enum FileOutcome {
    Ingested(StoredMatch),
    OtherSeason(String),
    Empty,
}

/// Ingest every `*.json` match file in `folder` whose season equals `season`.
///
/// Files are handled one at a time in path order and each is its own unit of
/// work: a file that fails to parse, breaks an innings limit or hits a store
/// error is logged and counted, and the run moves on to the next file.
pub async fn ingest_season(
    ctx: &DbContext,
    folder: &Path,
    season: &str,
    options: IngestOptions,
) -> Result<IngestSummary, IngestError> {
    let files = match_files(folder)?;
    if files.is_empty() {
        return Err(IngestError::NoMatchFiles(folder.to_path_buf()));
    }

    info!(
        "Found {} match files in {}; ingesting season {}",
        files.len(),
        folder.display(),
        season
    );

    let pb = if options.progress {
        let pb = ProgressBar::new(files.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut summary = IngestSummary {
        files: files.len(),
        ..Default::default()
    };

    for path in &files {
        pb.set_message(file_label(path));
        match ingest_file(ctx, path, season).await {
            Ok(FileOutcome::Ingested(stored)) => {
                summary.ingested += 1;
                summary.deliveries_added += stored.deliveries_added;
                summary.players_added += stored.players_added;
                info!(
                    "Ingested {} ({} deliveries, {} new players)",
                    file_label(path),
                    stored.deliveries_added,
                    stored.players_added
                );
            }
            Ok(FileOutcome::OtherSeason(found)) => {
                summary.skipped += 1;
                debug!("Skipping {}: season {}", file_label(path), found);
            }
            Ok(FileOutcome::Empty) => {
                summary.skipped += 1;
                warn!("Skipping {}: no deliveries", file_label(path));
            }
            Err(e) => {
                summary.failed += 1;
                warn!("Failed to ingest {}: {}", file_label(path), e);
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    if summary.ingested > 0 {
        refresh_cache(ctx).await;
    }

    info!(
        "Season {}: {} ingested, {} skipped, {} failed",
        season, summary.ingested, summary.skipped, summary.failed
    );
    Ok(summary)
}

/// Rebuild the aggregate cache if one exists. Matches are already committed,
/// so a failure here is logged and the run still reports its summary.
async fn refresh_cache(ctx: &DbContext) {
    match ctx.aggregates().exists().await {
        Ok(true) => match ctx.refresh_aggregates().await {
            Ok(rows) => info!("Refreshed batter season aggregates ({} rows)", rows),
            Err(e) => warn!(
                "Failed to refresh batter season aggregates; run 'ipl db refresh-aggregates': {}",
                e
            ),
        },
        Ok(false) => {}
        Err(e) => warn!("Could not check the aggregate cache: {}", e),
    }
}

async fn ingest_file(
    ctx: &DbContext,
    path: &Path,
    season: &str,
) -> Result<FileOutcome, IngestError> {
    let deliveries = read_match_file(path)?;
    let Some(first) = deliveries.first() else {
        return Ok(FileOutcome::Empty);
    };
    if first.season != season {
        return Ok(FileOutcome::OtherSeason(first.season.clone()));
    }

    validate(&deliveries)?;
    let stored = ctx.deliveries().store_match(&deliveries).await?;
    Ok(FileOutcome::Ingested(stored))
}

fn match_files(folder: &Path) -> Result<Vec<PathBuf>, IngestError> {
    let io_err = |source| IngestError::Io {
        path: folder.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(folder).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
