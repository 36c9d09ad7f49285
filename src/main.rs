use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use surfboard_scraper::{
    config::{Args, Config},
    exporter::{Exporter, Pass},
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    // stdout carries the pass dump, so logs go to stderr
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    // ─── 2) configuration ────────────────────────────────────────────
    let config = Config::from_args(Args::parse()).context("invalid configuration")?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        timeout_ms = config.timeout.as_millis() as u64,
        "starting surfboard scraper"
    );
    let exporter = Exporter::new(config.page_source()?);
    info!(source = %exporter.source().describe(), "reading status page from");

    if config.once {
        let pass = exporter.collect().await;
        emit(&pass)?;
        return Ok(());
    }

    // ─── 3) collection loop ──────────────────────────────────────────
    // one listener for the whole run, so a Ctrl-C mid-pass is not lost
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };
    exporter
        .run_until(config.interval, shutdown, |pass| {
            if let Err(e) = emit(pass) {
                warn!("failed to write pass: {:#}", e);
            }
        })
        .await;
    Ok(())
}

/// One JSON object per pass on stdout.
fn emit(pass: &Pass) -> Result<()> {
    let line = serde_json::to_string(pass).context("serializing pass")?;
    let mut out = std::io::stdout().lock();
    writeln!(out, "{}", line)?;
    out.flush()?;
    Ok(())
}
