//! Web server command.

use console::style;

use crate::config::Settings;

const DEFAULT_PORT: u16 = 8000;

/// Start the web server.
pub async fn cmd_serve(settings: &Settings, bind: &str, no_migrate: bool) -> anyhow::Result<()> {
    let (host, port) = parse_bind_address(bind)?;
    let addr = tokio::net::lookup_host((host.as_str(), port))
        .await?
        .next()
        .ok_or_else(|| anyhow::anyhow!("Could not resolve bind address {}", bind))?;

    let ctx = settings.create_db_context()?;

    if no_migrate {
        ctx.test_connection().await?;
    } else {
        println!("{} Preparing database schema...", style("→").cyan());
        if let Err(e) = ctx.init_schema().await {
            eprintln!("  {} Schema setup failed: {}", style("✗").red(), e);
            return Err(anyhow::anyhow!("Database schema setup failed: {}", e));
        }
        println!("  {} Database ready", style("✓").green());
    }

    println!(
        "{} Starting IPL analytics API at http://{}{}",
        style("→").cyan(),
        addr,
        settings.api_prefix
    );
    println!("  Press Ctrl+C to stop");

    crate::server::serve(ctx, settings, addr).await
}

/// Parse a bind address that can be:
/// - Just a port: "8000" -> 127.0.0.1:8000
/// - Just a host: "0.0.0.0" -> 0.0.0.0:8000
/// - Host and port: "0.0.0.0:8000" -> 0.0.0.0:8000
fn parse_bind_address(bind: &str) -> anyhow::Result<(String, u16)> {
    let bind = bind.trim();
    if bind.is_empty() {
        anyhow::bail!("Bind address is empty");
    }

    if let Ok(port) = bind.parse::<u16>() {
        return Ok(("127.0.0.1".to_string(), port));
    }

    if let Some((host, port_str)) = bind.rsplit_once(':') {
        if let Ok(port) = port_str.parse::<u16>() {
            let host = host.trim_start_matches('[').trim_end_matches(']');
            return Ok((host.to_string(), port));
        }
    }

    Ok((bind.to_string(), DEFAULT_PORT))
}
