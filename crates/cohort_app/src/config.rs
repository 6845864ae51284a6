//! Scenario configuration, loaded from JSON.
//!
//! Every field has a default, so an empty object (or no file at all) runs
//! the built-in scenario.
//!
//! ```json
//! {
//!   "tick": { "tick_rate": 30.0, "max_ticks": 120 },
//!   "spawn": { "movers": 64, "ignite_every": 10 },
//!   "registry": { "entity_capacity": 256 },
//!   "watch": [
//!     { "name": "stationary", "contains": ["Position"], "excludes": ["Velocity"] }
//!   ]
//! }
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use cohort_component::{ComponentTypeId, QueryDescriptor};
use cohort_world::RegistryConfig;
use serde::Deserialize;

use crate::tick::TickConfig;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Tick rate and run length.
    pub tick: TickConfig,
    /// Initial population and event pacing.
    pub spawn: SpawnConfig,
    /// Component capacity and entity capacity hint.
    pub registry: RegistryConfig,
    /// Extra views whose sizes are logged every tick.
    pub watch: Vec<WatchConfig>,
}

impl AppConfig {
    /// Read and validate a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Parse and validate a config.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.tick.tick_duration().context("invalid tick config")?;
        Ok(config)
    }
}

/// Initial population and event pacing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Entities spawned with position, velocity and health.
    pub movers: usize,
    /// Entities spawned with position and health only.
    pub statues: usize,
    /// A mover stops and catches fire every this many ticks (0 = never).
    pub ignite_every: u64,
    /// Starting (and maximum) health of every spawned entity.
    pub max_health: f32,
    /// Health lost per second while burning.
    pub burn_rate: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            movers: 32,
            statues: 8,
            ignite_every: 5,
            max_health: 10.0,
            burn_rate: 40.0,
        }
    }
}

/// A named view described by component names.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WatchConfig {
    /// Label used when logging the view's size.
    pub name: String,
    /// Component names the view requires.
    #[serde(default)]
    pub contains: Vec<String>,
    /// Component names the view forbids.
    #[serde(default)]
    pub excludes: Vec<String>,
}

impl WatchConfig {
    /// Resolve component names to ids with the same hash the `Component`
    /// trait uses.
    #[must_use]
    pub fn descriptor(&self) -> QueryDescriptor {
        let descriptor = self
            .contains
            .iter()
            .fold(QueryDescriptor::new(), |d, name| {
                d.with_type(ComponentTypeId::from_name(name))
            });
        self.excludes.iter().fold(descriptor, |d, name| {
            d.without_type(ComponentTypeId::from_name(name))
        })
    }
}
