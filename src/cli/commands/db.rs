//! Database management commands.

use std::time::Duration;

use console::style;
use indicatif::ProgressBar;

use crate::config::Settings;
use crate::repository::DbContext;

/// Open an existing store. SQLite files are not created here.
async fn open_store(settings: &Settings) -> anyhow::Result<DbContext> {
    if !settings.database_exists() {
        anyhow::bail!(
            "No database at {}. Run 'ipl init' first.",
            settings.database_path().display()
        );
    }
    Ok(settings.create_db_context_validated().await?)
}

/// Rebuild the batter season aggregate cache.
pub async fn cmd_refresh_aggregates(settings: &Settings) -> anyhow::Result<()> {
    let ctx = open_store(settings).await?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_message("Rebuilding batter season aggregates...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = ctx.refresh_aggregates().await;
    spinner.finish_and_clear();
    ctx.close();

    let rows = result?;
    println!(
        "{} Refreshed aggregates ({} batter seasons)",
        style("✓").green(),
        rows
    );
    Ok(())
}

/// Drop the aggregate cache; reads fall back to live aggregation.
pub async fn cmd_drop_aggregates(settings: &Settings) -> anyhow::Result<()> {
    let ctx = open_store(settings).await?;
    let result = ctx.drop_aggregates().await;
    ctx.close();
    result?;

    println!("{} Dropped aggregate cache", style("✓").green());
    Ok(())
}

/// Show store row counts.
pub async fn cmd_stats(settings: &Settings) -> anyhow::Result<()> {
    let ctx = open_store(settings).await?;
    let counts = ctx.deliveries().counts().await;
    let cached = ctx.aggregates().exists().await;
    ctx.close();
    let counts = counts?;
    let cached = cached?;

    println!("{} Delivery store", style("→").cyan());
    println!("  Database:   {}", settings.display_database_url());
    println!("  Players:    {}", counts.players);
    println!("  Matches:    {}", counts.matches);
    println!("  Deliveries: {}", counts.deliveries);
    println!(
        "  Aggregates: {}",
        if cached {
            style("cached").green()
        } else {
            style("live").yellow()
        }
    );
    Ok(())
}
