//! Bodies and the store that owns them
//!
//! The store is the only owner of body state. Everything else (the grid, the
//! contact list) refers to bodies through generation-checked handles, so a
//! handle kept past a removal resolves to `None` instead of a different body.

use glam::Vec3;
use rand::Rng;
use slotmap::SlotMap;

use crate::consts::{COLOR_CHANNEL_MAX, COLOR_CHANNEL_MIN};
use crate::sim::grid::CellCoord;

slotmap::new_key_type! {
    /// Stable handle to a body; ordered, so it doubles as the pair tie-break
    pub struct BodyHandle;
}

/// 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color with each channel drawn from the bright end of the range
    pub fn random(rng: &mut impl Rng) -> Self {
        let range = COLOR_CHANNEL_MIN..=COLOR_CHANNEL_MAX;
        Self {
            r: rng.random_range(range.clone()),
            g: rng.random_range(range.clone()),
            b: rng.random_range(range),
            a: 255,
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Corrections proposed during detection, committed once by the applier
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PendingResponse {
    pub pos_delta: Vec3,
    pub vel_delta: Vec3,
    pub has_collision: bool,
}

impl PendingResponse {
    pub const NONE: Self = Self {
        pos_delta: Vec3::ZERO,
        vel_delta: Vec3::ZERO,
        has_collision: false,
    };

    /// Add a correction on top of whatever is already pending
    #[inline]
    pub fn accumulate(&mut self, pos_delta: Vec3, vel_delta: Vec3) {
        self.pos_delta += pos_delta;
        self.vel_delta += vel_delta;
        self.has_collision = true;
    }

    /// Take the pending correction, leaving the accumulator zeroed
    #[inline]
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}

/// A simulated circular body
#[derive(Debug, Clone)]
pub struct Body {
    /// Center; z stays 0 in this simulation
    pub position: Vec3,
    pub velocity: Vec3,
    pub color: Color,
    /// Grid cell assigned during the last rebuild
    pub cell: CellCoord,
    pub pending: PendingResponse,
}

impl Body {
    pub fn new(position: Vec3, velocity: Vec3, color: Color) -> Self {
        Self {
            position,
            velocity,
            color,
            cell: CellCoord::default(),
            pending: PendingResponse::NONE,
        }
    }

    /// Position once the pending correction is committed
    #[inline]
    pub fn effective_position(&self) -> Vec3 {
        self.position + self.pending.pos_delta
    }

    /// Velocity once the pending correction is committed
    #[inline]
    pub fn effective_velocity(&self) -> Vec3 {
        self.velocity + self.pending.vel_delta
    }
}

/// Owner of every live body (dense slots + generation-checked handles)
#[derive(Debug, Clone, Default)]
pub struct BodyStore {
    bodies: SlotMap<BodyHandle, Body>,
}

impl BodyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, body: Body) -> BodyHandle {
        self.bodies.insert(body)
    }

    pub fn remove(&mut self, handle: BodyHandle) -> Option<Body> {
        self.bodies.remove(handle)
    }

    /// Remove the first body in store order
    pub fn remove_first(&mut self) -> Option<(BodyHandle, Body)> {
        let handle = self.bodies.keys().next()?;
        self.bodies.remove(handle).map(|body| (handle, body))
    }

    /// Remove everything, returning how many bodies were dropped
    pub fn clear(&mut self) -> usize {
        let count = self.bodies.len();
        self.bodies.clear();
        count
    }

    pub fn get(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle)
    }

    pub fn get_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(handle)
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains_key(handle)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Iterate in store order
    pub fn iter(&self) -> impl Iterator<Item = (BodyHandle, &Body)> + '_ {
        self.bodies.iter()
    }

    pub fn handles(&self) -> impl Iterator<Item = BodyHandle> + '_ {
        self.bodies.keys()
    }

    pub fn bodies(&self) -> impl Iterator<Item = &Body> + '_ {
        self.bodies.values()
    }

    pub fn bodies_mut(&mut self) -> impl Iterator<Item = &mut Body> + '_ {
        self.bodies.values_mut()
    }
}
