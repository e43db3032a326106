//! Evaluates one authorization query against a JSON unit fixture.
//!
//! Usage: `warden-check <input.json>`. Prints `allow` or `deny`; exits with
//! status 1 on deny and 2 on error.

use std::process::ExitCode;

use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};
use warden_core::config::load_config;
use warden_service::Warden;
use warden_service::fixture::CheckInput;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(true) => {
            println!("allow");
            ExitCode::SUCCESS
        }
        Ok(false) => {
            println!("deny");
            ExitCode::from(1)
        }
        Err(err) => {
            eprintln!("warden-check: {err:#}");
            ExitCode::from(2)
        }
    }
}

async fn run() -> anyhow::Result<bool> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    let config = load_config()?;

    tracing::info!(config = ?config, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping debug");
    }

    let path = std::env::args()
        .nth(1)
        .context("usage: warden-check <input.json>")?;
    let raw = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("reading {path}"))?;
    let input: CheckInput =
        serde_json::from_str(&raw).with_context(|| format!("parsing {path}"))?;

    let warden = Warden::from_settings(&config).await?;
    input.fixture.install(&warden).await?;
    let result = input.query.evaluate(&warden).await?;

    tracing::info!(
        operation = %input.query.operation,
        target = %input.query.target,
        allowed = result.is_allowed(),
        "Query evaluated"
    );
    Ok(result.is_allowed())
}
