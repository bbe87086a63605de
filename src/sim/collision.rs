//! Collision detection for circles in a square arena
//!
//! Detection never touches primary body state. Entity pairs are found first
//! as a list of `PairContact`s (read-only, so it can be split across threads),
//! then folded into each body's `PendingResponse`. Wall checks write only the
//! accumulator of the body being checked.

use glam::Vec3;

use super::body::{Body, BodyHandle, BodyStore};
use super::grid::SpatialGrid;
use crate::config::SimConfig;

/// Narrowphase result for two overlapping circles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit vector from the second center toward the first
    pub direction: Vec3,
    /// How far the circles interpenetrate
    pub overlap: f32,
}

/// An overlapping pair, recorded once with `first < second`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairContact {
    pub first: BodyHandle,
    pub second: BodyHandle,
    pub contact: Contact,
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec3, normal: Vec3) -> Vec3 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Check two circles of equal radius for overlap
///
/// Exactly coincident centers have no defined separation axis; +X is used.
pub fn circle_contact(p1: Vec3, p2: Vec3, radius: f32) -> Option<Contact> {
    let required = radius * 2.0;
    let distance = p1.distance(p2);
    if distance >= required {
        return None;
    }

    let direction = if distance > 0.0 {
        (p1 - p2) / distance
    } else {
        Vec3::X
    };
    Some(Contact {
        direction,
        overlap: required - distance,
    })
}

/// Overlapping pairs involving `handle` as the lower handle
fn contacts_for(
    handle: BodyHandle,
    body: &Body,
    bodies: &BodyStore,
    grid: &SpatialGrid,
    radius: f32,
    out: &mut Vec<PairContact>,
) {
    for other in grid.neighbors(body.cell) {
        // Skip self and keep each unordered pair to a single visit
        if handle >= other {
            continue;
        }
        let Some(other_body) = bodies.get(other) else {
            continue;
        };
        if let Some(contact) = circle_contact(body.position, other_body.position, radius) {
            out.push(PairContact {
                first: handle,
                second: other,
                contact,
            });
        }
    }
}

/// Broadphase + narrowphase over the whole store
pub fn find_pair_contacts(
    bodies: &BodyStore,
    grid: &SpatialGrid,
    config: &SimConfig,
) -> Vec<PairContact> {
    let mut contacts = Vec::new();
    for (handle, body) in bodies.iter() {
        contacts_for(handle, body, bodies, grid, config.body_radius, &mut contacts);
    }
    contacts
}

/// Same result as `find_pair_contacts`, with the scan split per body
///
/// Workers only read the store and the grid. Each body's contacts come back
/// in store order, so the merged list matches the serial one.
#[cfg(feature = "parallel")]
pub fn find_pair_contacts_par(
    bodies: &BodyStore,
    grid: &SpatialGrid,
    config: &SimConfig,
) -> Vec<PairContact> {
    use rayon::prelude::*;

    let handles: Vec<BodyHandle> = bodies.handles().collect();
    handles
        .par_iter()
        .flat_map_iter(|&handle| {
            let mut local = Vec::new();
            if let Some(body) = bodies.get(handle) {
                contacts_for(handle, body, bodies, grid, config.body_radius, &mut local);
            }
            local
        })
        .collect()
}

/// Fold pair contacts into both bodies' accumulators
///
/// Each body is pushed half the overlap along the separation axis, and its
/// velocity delta is the change reflection would make to its current velocity.
/// Several contacts on one body add up.
pub fn record_pair_contacts(bodies: &mut BodyStore, contacts: &[PairContact]) {
    for pair in contacts {
        let Contact { direction, overlap } = pair.contact;
        let push = direction * (overlap * 0.5);

        // Both velocities are read before either accumulator is written
        let (Some(v1), Some(v2)) = (
            bodies.get(pair.first).map(|b| b.velocity),
            bodies.get(pair.second).map(|b| b.velocity),
        ) else {
            continue;
        };

        if let Some(b1) = bodies.get_mut(pair.first) {
            b1.pending
                .accumulate(push, reflect_velocity(v1, direction) - v1);
        }
        if let Some(b2) = bodies.get_mut(pair.second) {
            b2.pending
                .accumulate(-push, reflect_velocity(v2, -direction) - v2);
        }
    }
}

/// Wall test for a single body, writing only that body's accumulator
///
/// Works on the effective state (primary + pending), so a body already turned
/// around by a neighbor this tick is not reflected a second time. A breached
/// wall always snaps the body back inside; it only contributes to the bounce
/// normal while the body is still moving toward it. Simultaneous breaches
/// (corners) share one reflection about the normalized sum of their normals.
///
/// Returns whether anything was recorded.
pub fn detect_wall_contact(body: &mut Body, config: &SimConfig) -> bool {
    let limit = config.inner_limit();
    let position = body.effective_position();
    let velocity = body.effective_velocity();

    let mut correction = Vec3::ZERO;
    let mut normal_sum = Vec3::ZERO;

    // (axis, sign of the wall's coordinate)
    for (axis, side) in [(0usize, -1.0f32), (0, 1.0), (1, -1.0), (1, 1.0)] {
        let wall = side * limit;
        let breached = if side < 0.0 {
            position[axis] <= wall
        } else {
            position[axis] >= wall
        };
        if !breached {
            continue;
        }

        correction[axis] += wall - position[axis];
        // Inward normal points against the wall side
        if velocity[axis] * side > 0.0 {
            normal_sum[axis] -= side;
        }
    }

    let mut vel_delta = Vec3::ZERO;
    if normal_sum != Vec3::ZERO {
        let normal = normal_sum.normalize();
        vel_delta = reflect_velocity(velocity, normal) - velocity;
    }

    if correction == Vec3::ZERO && vel_delta == Vec3::ZERO {
        return false;
    }
    body.pending.accumulate(correction, vel_delta);
    true
}

/// Run the wall test over every body; returns how many recorded a response
pub fn detect_wall_contacts(bodies: &mut BodyStore, config: &SimConfig) -> usize {
    bodies
        .bodies_mut()
        .map(|body| detect_wall_contact(body, config))
        .filter(|&hit| hit)
        .count()
}

/// Parallel `detect_wall_contacts`; each worker writes only its own body
#[cfg(feature = "parallel")]
pub fn detect_wall_contacts_par(bodies: &mut BodyStore, config: &SimConfig) -> usize {
    use rayon::prelude::*;

    bodies
        .bodies_mut()
        .par_bridge()
        .map(|body| detect_wall_contact(body, config))
        .filter(|&hit| hit)
        .count()
}
