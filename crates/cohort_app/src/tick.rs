//! Fixed-timestep simulation loop.
//!
//! Each tick runs the demo systems against cached views, then calls
//! [`Registry::update`] exactly once:
//!
//! 1. Movement: integrate `Position += Velocity * dt` over `[Position, Velocity]`.
//! 2. Ignition: every `ignite_every` ticks one mover stops and starts burning.
//! 3. Burn: damage `[Health, Burning]`, destroying entities that run out.
//! 4. Update: purge, synchronize views, reset tracking.
//!
//! Systems iterate a snapshot of each view's members, since the view itself
//! only changes inside `update()`.

use std::time::{Duration, Instant};

use anyhow::{Result, ensure};
use cohort_component::{Entity, QueryDescriptor};
use cohort_world::{Registry, RegistryError, UpdateReport, ViewId};
use glam::Vec3;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::components::{Burning, Health, Position, Velocity};
use crate::config::{AppConfig, SpawnConfig};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    /// Target ticks per second.
    pub tick_rate: f64,
    /// Ticks to run before stopping (0 = unlimited).
    pub max_ticks: u64,
}

impl TickConfig {
    /// Wall-clock budget of one tick. Fails unless `tick_rate` is a finite,
    /// positive number of ticks per second.
    pub fn tick_duration(&self) -> Result<Duration> {
        ensure!(
            self.tick_rate.is_finite() && self.tick_rate > 0.0,
            "tick_rate must be a positive number of ticks per second, got {}",
            self.tick_rate
        );
        Ok(Duration::try_from_secs_f64(1.0 / self.tick_rate)?)
    }
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            max_ticks: 0,
        }
    }
}

/// The demo's simulation state and the views its systems run over.
#[derive(Debug)]
pub struct TickLoop {
    /// Ticks completed so far.
    tick_id: u64,
    /// Tick configuration.
    config: TickConfig,
    /// Validated budget of one tick.
    tick_duration: Duration,
    /// Population and event pacing.
    spawn: SpawnConfig,
    /// All entities, components and views.
    registry: Registry,
    /// `[Position, Velocity]`, driven by the movement system.
    movers: ViewId,
    /// `[Health, Burning]`, driven by the burn system.
    burning: ViewId,
    /// Views requested by the config, by name.
    watched: Vec<(String, ViewId)>,
}

impl TickLoop {
    /// Build the registry, spawn the initial population and register every
    /// view the loop and the config need.
    pub fn new(config: AppConfig) -> Result<Self> {
        let tick_duration = config.tick.tick_duration()?;
        let mut registry = Registry::with_config(config.registry);

        let movers = registry.query(&QueryDescriptor::new().with::<Position>().with::<Velocity>())?;
        let burning = registry.query(&QueryDescriptor::new().with::<Health>().with::<Burning>())?;
        let watched = config
            .watch
            .iter()
            .map(|watch| Ok((watch.name.clone(), registry.query(&watch.descriptor())?)))
            .collect::<Result<Vec<_>, RegistryError>>()?;

        let spawn = config.spawn;
        for i in 0..spawn.movers {
            let heading = Vec3::new((i as f32).cos(), (i as f32).sin(), 0.0);
            registry.create_with((
                Position(Vec3::ZERO),
                Velocity(heading),
                Health::full(spawn.max_health),
            ))?;
        }
        for i in 0..spawn.statues {
            registry.create_with((
                Position(Vec3::new(i as f32, 0.0, 0.0)),
                Health::full(spawn.max_health),
            ))?;
        }
        let report = registry.update();
        info!(
            entities = registry.alive_count(),
            views = registry.views().len(),
            seeded = report.added,
            "population spawned"
        );

        Ok(Self {
            tick_id: 0,
            config: config.tick,
            tick_duration,
            spawn,
            registry,
            movers,
            burning,
            watched,
        })
    }

    /// Number of ticks run so far.
    #[must_use]
    pub fn tick_id(&self) -> u64 {
        self.tick_id
    }

    /// The registry, for inspecting entities and views.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Config name and current size of every watched view.
    #[must_use]
    pub fn watched_sizes(&self) -> Vec<(&str, usize)> {
        self.watched
            .iter()
            .filter_map(|(name, id)| Some((name.as_str(), self.registry.view(*id)?.len())))
            .collect()
    }

    fn members(&self, id: ViewId) -> Vec<Entity> {
        self.registry
            .view(id)
            .map(|view| view.entities().to_vec())
            .unwrap_or_default()
    }

    fn movement(&mut self, dt: f32) {
        for entity in self.members(self.movers) {
            let Some(velocity) = self.registry.get::<Velocity>(entity).copied() else {
                continue;
            };
            if let Some(position) = self.registry.get_mut::<Position>(entity) {
                position.0 += velocity.0 * dt;
            }
        }
    }

    /// Stop the lowest-numbered mover and set it on fire.
    fn ignite(&mut self) -> Result<(), RegistryError> {
        let Some(entity) = self.members(self.movers).into_iter().min() else {
            return Ok(());
        };
        self.registry.remove::<Velocity>(entity);
        self.registry.insert(
            entity,
            Burning {
                damage_per_second: self.spawn.burn_rate,
            },
        )?;
        debug!(tick_id = self.tick_id, %entity, "ignited");
        Ok(())
    }

    fn burn(&mut self, dt: f32) {
        for entity in self.members(self.burning) {
            let Some(rate) = self
                .registry
                .get::<Burning>(entity)
                .map(|burning| burning.damage_per_second)
            else {
                continue;
            };
            let depleted = self
                .registry
                .get_mut::<Health>(entity)
                .is_some_and(|health| health.damage(rate * dt));
            if depleted && self.registry.destroy(entity) {
                debug!(tick_id = self.tick_id, %entity, "burned out");
            }
        }
    }

    /// Run one tick of `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> Result<UpdateReport, RegistryError> {
        self.tick_id += 1;

        self.movement(dt);
        if self.spawn.ignite_every > 0 && self.tick_id % self.spawn.ignite_every == 0 {
            self.ignite()?;
        }
        self.burn(dt);

        let report = self.registry.update();
        debug!(
            tick_id = self.tick_id,
            purged = report.purged,
            dirty = report.dirty,
            added = report.added,
            removed = report.removed,
            alive = self.registry.alive_count(),
            "tick complete"
        );
        for (name, id) in &self.watched {
            if let Some(view) = self.registry.view(*id) {
                debug!(tick_id = self.tick_id, view = %name, size = view.len(), "watched view");
            }
        }
        Ok(report)
    }

    /// Run for the configured number of ticks, or indefinitely, sleeping
    /// out the rest of each tick's budget.
    pub fn run(&mut self) -> Result<(), RegistryError> {
        let tick_duration = self.tick_duration;
        let mut tick_count = 0u64;

        info!(
            tick_rate = self.config.tick_rate,
            max_ticks = self.config.max_ticks,
            "starting tick loop"
        );

        loop {
            let start = Instant::now();
            self.tick(tick_duration.as_secs_f32())?;

            tick_count += 1;
            if self.config.max_ticks > 0 && tick_count >= self.config.max_ticks {
                info!(
                    ticks = tick_count,
                    alive = self.registry.alive_count(),
                    "tick loop complete"
                );
                return Ok(());
            }

            let elapsed = start.elapsed();
            if elapsed < tick_duration {
                std::thread::sleep(tick_duration - elapsed);
            } else {
                warn!(
                    tick_id = self.tick_id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    budget_ms = tick_duration.as_millis() as u64,
                    "tick exceeded time budget"
                );
            }
        }
    }
}
