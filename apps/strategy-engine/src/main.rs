//! Strategy Engine Binary
//!
//! Loads a universe, runs one search and writes the ranked strategies as JSON.
//!
//! # Usage
//!
//! ```bash
//! STRATEGY_ENGINE_UNIVERSE=universe.json cargo run --bin strategy-engine
//! ```
//!
//! # Environment Variables
//!
//! ## Required
//! - `STRATEGY_ENGINE_UNIVERSE`: Path to the universe JSON file
//!
//! ## Optional
//! - `STRATEGY_ENGINE_CONFIG`: Path to the YAML config (default: config.yaml)
//! - `STRATEGY_ENGINE_OUTPUT`: Result path (default: stdout)
//! - `RUST_LOG`: Log filter (default: `strategy_engine=<logging.level>`)
//!
//! Ctrl-C raises the stop flag; the search then ends with a cancelled error.

use std::sync::Arc;

use anyhow::{Context, Result};
use strategy_engine::config::load_config;
use strategy_engine::observability::init_metrics;
use strategy_engine::telemetry::init_tracing;
use strategy_engine::{EngineSession, UniverseInput};
use tokio::signal;

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();

    let config_path =
        std::env::var("STRATEGY_ENGINE_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());
    let config = load_config(Some(&config_path))
        .with_context(|| format!("loading config from {config_path}"))?;

    init_tracing(&config.observability.logging)?;
    tracing::info!(config = %config_path, "Starting strategy engine");

    if config.observability.metrics.enabled {
        init_metrics(&config.observability.metrics)?;
    }

    let universe_path = std::env::var("STRATEGY_ENGINE_UNIVERSE")
        .context("STRATEGY_ENGINE_UNIVERSE must point to a universe JSON file")?;
    let raw = tokio::fs::read_to_string(&universe_path)
        .await
        .with_context(|| format!("reading universe from {universe_path}"))?;
    let universe: UniverseInput =
        serde_json::from_str(&raw).with_context(|| format!("parsing universe {universe_path}"))?;

    let session = Arc::new(EngineSession::with_parallel(config.parallel.clone()));
    session.init(universe).context("loading universe")?;

    let request = config
        .search
        .to_request(config.scoring.weight_sets.clone());
    let worker = Arc::clone(&session);
    let mut search = tokio::task::spawn_blocking(move || worker.search(&request));

    let response = tokio::select! {
        joined = &mut search => joined,
        _ = signal::ctrl_c() => {
            tracing::warn!("Interrupt received, stopping search");
            session.request_stop();
            search.await
        }
    }
    .context("search task panicked")??;

    let json = serde_json::to_string_pretty(&response)?;
    match std::env::var("STRATEGY_ENGINE_OUTPUT") {
        Ok(path) => {
            tokio::fs::write(&path, json)
                .await
                .with_context(|| format!("writing results to {path}"))?;
            tracing::info!(path = %path, "Results written");
        }
        Err(_) => println!("{json}"),
    }

    tracing::info!(
        candidates = response.n_candidates,
        elapsed_ms = response.elapsed_ms,
        "Strategy engine finished"
    );
    Ok(())
}

/// Load .env file from current or ancestor directories.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}
