//! Deterministic collision kernel
//!
//! All simulation logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (store order, handles as tie-break)
//! - Detection records deltas; only the applier writes body state
//! - No rendering or platform dependencies

pub mod body;
pub mod collision;
pub mod grid;
pub mod placement;
pub mod response;
pub mod tick;
pub mod world;

pub use body::{Body, BodyHandle, BodyStore, Color, PendingResponse};
pub use collision::{Contact, PairContact, circle_contact, reflect_velocity};
pub use grid::{CellCoord, CellKey, SpatialGrid};
pub use tick::{TickReport, integrate, rebuild_grid, resolve_collisions, tick};
pub use world::{Command, ConfigChange, World};
