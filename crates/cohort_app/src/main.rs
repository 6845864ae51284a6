//! # cohort_app
//!
//! Demo driver for the cohort engine. Spawns a small population, runs the
//! tick loop and logs how the cached views evolve.
//!
//! ```text
//! cohort_app [config.json]
//! ```
//!
//! Set `RUST_LOG=cohort_app=debug,cohort_world=debug` to see per-tick view
//! traffic.

mod components;
mod config;
mod tick;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use tick::TickLoop;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("cohort_app=info".parse()?))
        .init();

    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            AppConfig::load(&path)?
        }
        None => AppConfig {
            tick: tick::TickConfig {
                max_ticks: 120,
                ..tick::TickConfig::default()
            },
            ..AppConfig::default()
        },
    };

    let mut tick_loop = TickLoop::new(config).context("failed to build simulation")?;
    tick_loop.run().context("simulation aborted")?;

    for (name, size) in tick_loop.watched_sizes() {
        info!(view = name, size, "watched view");
    }
    for view in tick_loop.registry().views() {
        info!(
            view = view.id().index(),
            include = ?view.filter().include(),
            exclude = ?view.filter().exclude(),
            size = view.len(),
            "final view"
        );
    }
    Ok(())
}
