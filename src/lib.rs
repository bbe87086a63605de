//! Ballpit - a bounded 2D arena of bouncing, colliding circular bodies
//!
//! Core modules:
//! - `sim`: Deterministic collision kernel (grid, detection, response, pipeline)
//! - `config`: Simulation parameters with validation and clamping
//! - `render`: Per-body instance extraction for an external renderer

pub mod config;
pub mod render;
pub mod sim;

pub use config::{ConfigError, SimConfig};
pub use render::{BodyInstance, extract_instances};
pub use sim::{BodyHandle, Command, TickReport, World, tick};

/// Simulation constants
pub mod consts {
    /// Upper bound on the physical step of one tick (seconds)
    pub const MAX_TICK_DT: f32 = 0.33;
    /// Placement attempts before a new body is abandoned
    pub const MAX_PLACEMENT_RETRIES: u32 = 100;
    /// Bodies spawned by `World::populate_initial`
    pub const INITIAL_BODY_COUNT: u32 = 10;

    /// Config defaults
    pub const DEFAULT_ARENA_HALF_EXTENT: f32 = 250.0;
    pub const DEFAULT_BODY_RADIUS: f32 = 10.0;
    pub const DEFAULT_BODY_SPEED: f32 = 1500.0;

    /// Ranges exposed to the config panel
    pub const ARENA_HALF_EXTENT_RANGE: (f32, f32) = (100.0, 1000.0);
    pub const BODY_RADIUS_RANGE: (f32, f32) = (0.01, 100.0);
    pub const BODY_SPEED_RANGE: (f32, f32) = (0.0, 5000.0);

    /// Smallest grid cell edge, whatever the body radius
    pub const MIN_CELL_SIZE: f32 = 1.0;

    /// Random color channels are drawn from this inclusive range (alpha is opaque)
    pub const COLOR_CHANNEL_MIN: u8 = 50;
    pub const COLOR_CHANNEL_MAX: u8 = 255;
}
