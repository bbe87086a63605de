//! Simulation world: config, bodies, grid and RNG
//!
//! Everything a tick needs is owned here and handed to each stage by
//! reference; there is no process-wide state.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::body::{BodyHandle, BodyStore};
use super::grid::SpatialGrid;
use super::placement;
use crate::config::{ConfigError, SimConfig};
use crate::consts::{INITIAL_BODY_COUNT, MAX_PLACEMENT_RETRIES};

/// Imperative commands from the control panel, applied between ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Place this many new bodies (each may fail independently)
    AddBodies(u32),
    /// Remove the first body in store order
    RemoveOneBody,
    /// Remove every body
    RemoveAllBodies,
}

/// Which fields an accepted config change touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfigChange {
    pub arena_changed: bool,
    pub radius_changed: bool,
    pub speed_changed: bool,
    pub render_changed: bool,
}

impl ConfigChange {
    fn between(old: &SimConfig, new: &SimConfig) -> Self {
        Self {
            arena_changed: old.arena_half_extent != new.arena_half_extent,
            radius_changed: old.body_radius != new.body_radius,
            speed_changed: old.body_speed != new.body_speed,
            render_changed: old.render_enabled != new.render_enabled,
        }
    }

    pub fn any(&self) -> bool {
        self.arena_changed || self.radius_changed || self.speed_changed || self.render_changed
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct World {
    /// Run seed for reproducibility
    seed: u64,
    pub(crate) config: SimConfig,
    pub(crate) bodies: BodyStore,
    pub(crate) grid: SpatialGrid,
    pub(crate) rng: Pcg32,
    /// Ticks advanced so far
    pub(crate) time_ticks: u64,
}

impl World {
    /// Create an empty world; the config must already satisfy its invariants
    pub fn new(config: SimConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            seed,
            config,
            bodies: BodyStore::new(),
            grid: SpatialGrid::new(config.cell_size()),
            rng: Pcg32::seed_from_u64(seed),
            time_ticks: 0,
        })
    }

    /// Seed the world RNG started from
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn bodies(&self) -> &BodyStore {
        &self.bodies
    }

    /// Direct store access, for callers that stage bodies by hand
    pub fn bodies_mut(&mut self) -> &mut BodyStore {
        &mut self.bodies
    }

    /// Grid as left by the last rebuild
    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Place one body; logs and returns `None` if no free spot turned up
    pub fn spawn_body(&mut self) -> Option<BodyHandle> {
        match placement::make_body(&self.bodies, &self.config, &mut self.rng) {
            Some(body) => {
                let handle = self.bodies.insert(body);
                log::info!("Created body {:?}", handle);
                Some(handle)
            }
            None => {
                log::warn!(
                    "Failed to find a valid position for new body after {} retries",
                    MAX_PLACEMENT_RETRIES
                );
                None
            }
        }
    }

    /// Spawn the startup population
    pub fn populate_initial(&mut self) -> usize {
        self.add_bodies(INITIAL_BODY_COUNT)
    }

    /// Spawn up to `count` bodies; returns how many were placed
    pub fn add_bodies(&mut self, count: u32) -> usize {
        (0..count).filter_map(|_| self.spawn_body()).count()
    }

    /// Remove a specific body; `false` if the handle is already stale
    pub fn remove_body(&mut self, handle: BodyHandle) -> bool {
        let removed = self.bodies.remove(handle).is_some();
        if removed {
            log::info!("Deleting body {:?}", handle);
        }
        removed
    }

    pub fn remove_one_body(&mut self) -> Option<BodyHandle> {
        let (handle, _) = self.bodies.remove_first()?;
        log::info!("Deleting body {:?}", handle);
        Some(handle)
    }

    pub fn remove_all_bodies(&mut self) -> usize {
        let count = self.bodies.clear();
        log::info!("Removing all bodies ({})", count);
        count
    }

    /// Apply a panel command; returns how many bodies were added or removed
    pub fn execute(&mut self, command: Command) -> usize {
        match command {
            Command::AddBodies(count) => self.add_bodies(count),
            Command::RemoveOneBody => usize::from(self.remove_one_body().is_some()),
            Command::RemoveAllBodies => self.remove_all_bodies(),
        }
    }

    /// Swap in a new config, reacting synchronously to what changed
    ///
    /// A speed change rescales every velocity to the new magnitude, keeping
    /// its direction. A rejected config leaves the world untouched.
    pub fn apply_config_change(&mut self, new: SimConfig) -> Result<ConfigChange, ConfigError> {
        if let Err(err) = new.validate() {
            log::warn!("Rejected config change: {}", err);
            return Err(err);
        }

        let change = ConfigChange::between(&self.config, &new);
        self.config = new;
        if change.speed_changed {
            self.renormalize_speeds();
        }
        if change.any() {
            log::debug!("Config changed: {:?}", change);
        }
        Ok(change)
    }

    /// Rescale every velocity to the configured speed
    ///
    /// A stationary body has no direction to keep, so it gets a fresh one.
    fn renormalize_speeds(&mut self) {
        let speed = self.config.body_speed;
        for body in self.bodies.bodies_mut() {
            let mut heading = body.velocity.normalize_or_zero();
            if heading == glam::Vec3::ZERO && speed > 0.0 {
                heading = placement::random_heading(&mut self.rng);
            }
            body.velocity = heading * speed;
        }
    }
}
