mod collect;

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "newspulse")]
#[command(about = "Periodic news collection for the analysis pipeline")]
struct Cli {
    /// Hours between collection cycles.
    #[arg(long, default_value_t = 1.0)]
    interval_hours: f64,

    /// Run a single collection cycle and exit.
    #[arg(long)]
    once: bool,

    /// Restrict the run to a single source by name.
    #[arg(long)]
    source: Option<String>,

    /// Collect without persisting; print articles as JSON lines.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = newspulse_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = newspulse_db::PoolConfig::from_app_config(&config);
    let pool = newspulse_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = newspulse_db::run_migrations(&pool).await?;
    if applied > 0 {
        tracing::info!(applied, "applied pending migrations");
    }

    let mut sources = newspulse_scraper::build_sources(&config);
    if let Some(name) = &cli.source {
        sources.retain(|s| s.name() == name);
        if sources.is_empty() {
            anyhow::bail!("no source named '{name}'");
        }
    }
    if sources.is_empty() {
        anyhow::bail!("no sources available");
    }

    if cli.once {
        collect::run_cycle(&pool, &sources, cli.dry_run).await;
        return Ok(());
    }

    let interval = interval_duration(cli.interval_hours)?;
    tracing::info!(
        interval_hours = cli.interval_hours,
        sources = sources.len(),
        "starting periodic collection"
    );

    // Shutdown is honored between cycles only; an in-flight cycle always
    // runs to completion.
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        collect::run_cycle(&pool, &sources, cli.dry_run).await;
        tracing::info!(
            interval_hours = cli.interval_hours,
            "cycle complete — waiting for next run"
        );
        tokio::select! {
            () = tokio::time::sleep(interval) => {}
            () = &mut shutdown => {
                tracing::info!("stopping between cycles");
                break;
            }
        }
    }

    Ok(())
}

fn interval_duration(hours: f64) -> anyhow::Result<Duration> {
    if !hours.is_finite() || hours <= 0.0 {
        anyhow::bail!("--interval-hours must be a positive number, got {hours}");
    }
    Duration::try_from_secs_f64(hours * 3600.0)
        .map_err(|e| anyhow::anyhow!("--interval-hours out of range: {e}"))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["newspulse"]);
        assert!((cli.interval_hours - 1.0).abs() < f64::EPSILON);
        assert!(!cli.once);
        assert!(!cli.dry_run);
        assert!(cli.source.is_none());
    }

    #[test]
    fn cli_accepts_once_with_source_filter() {
        let cli = Cli::parse_from(["newspulse", "--once", "--source", "ria", "--dry-run"]);
        assert!(cli.once);
        assert!(cli.dry_run);
        assert_eq!(cli.source.as_deref(), Some("ria"));
    }

    #[test]
    fn interval_duration_converts_hours() {
        let interval = interval_duration(1.0).expect("valid interval");
        assert_eq!(interval, Duration::from_secs(3600));
        let half = interval_duration(0.5).expect("valid interval");
        assert_eq!(half, Duration::from_secs(1800));
    }

    #[test]
    fn interval_duration_rejects_non_positive_values() {
        assert!(interval_duration(0.0).is_err());
        assert!(interval_duration(-1.0).is_err());
        assert!(interval_duration(f64::NAN).is_err());
    }
}
