//! Initialize command.

use console::style;

use crate::config::Settings;

/// Initialize the data directory and database.
pub async fn cmd_init(settings: &Settings) -> anyhow::Result<()> {
    settings.ensure_directories()?;

    let ctx = settings.create_db_context()?;
    ctx.init_schema().await?;

    println!(
        "{} Initialized delivery store at {}",
        style("✓").green(),
        settings.display_database_url()
    );
    println!(
        "  Next: {} <folder> --season <season>",
        style("ipl ingest").cyan()
    );

    ctx.close();
    Ok(())
}
