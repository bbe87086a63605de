//! Per-tick simulation pipeline
//!
//! Stage order is fixed:
//! clear grid → rebuild grid → detect pairs → detect walls → apply → integrate

use glam::Vec3;

use super::body::{Body, BodyStore};
use super::collision;
use super::grid::{CellCoord, SpatialGrid};
use super::response;
use super::world::World;
use crate::config::SimConfig;
use crate::consts::MAX_TICK_DT;

/// What happened during one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// Tick counter after this tick
    pub tick: u64,
    /// Overlapping body pairs found
    pub pair_contacts: usize,
    /// Bodies that recorded a wall response
    pub wall_contacts: usize,
    /// Bodies whose accumulated response was committed
    pub responses_applied: usize,
}

/// Physical step actually taken for a frame of `dt` seconds
#[inline]
pub fn clamp_dt(dt: f32) -> f32 {
    dt.clamp(0.0, MAX_TICK_DT)
}

/// Assign every body its cell and fill the grid's buckets
///
/// Cells are computed per body (in parallel when enabled); bucket insertion
/// is always a single serial pass.
pub fn rebuild_grid(bodies: &mut BodyStore, grid: &mut SpatialGrid, config: &SimConfig) {
    grid.clear(config.cell_size());
    let cell_size = grid.cell_size();

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        bodies
            .bodies_mut()
            .par_bridge()
            .for_each(|body| body.cell = CellCoord::containing(body.position, cell_size));
    }
    #[cfg(not(feature = "parallel"))]
    for body in bodies.bodies_mut() {
        body.cell = CellCoord::containing(body.position, cell_size);
    }

    for (handle, body) in bodies.iter() {
        grid.insert(handle, body.cell);
    }
}

/// Advance every body along its velocity
///
/// Centers are held to `±arena_half_extent` on x and y. A body that ends up
/// past its inner limit is snapped back and reflected by the next wall pass.
pub fn integrate(bodies: &mut BodyStore, dt: f32, config: &SimConfig) {
    let step = clamp_dt(dt);
    let bound = config.arena_half_extent;
    let advance = |body: &mut Body| {
        let next = body.position + body.velocity * step;
        body.position = Vec3::new(
            next.x.clamp(-bound, bound),
            next.y.clamp(-bound, bound),
            next.z,
        );
    };

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        bodies.bodies_mut().par_bridge().for_each(advance);
    }
    #[cfg(not(feature = "parallel"))]
    bodies.bodies_mut().for_each(advance);
}

/// Collision half of a tick: grid, detection and response, without moving
pub fn resolve_collisions(world: &mut World) -> TickReport {
    let World {
        config,
        bodies,
        grid,
        rng,
        ..
    } = world;

    rebuild_grid(bodies, grid, config);

    #[cfg(feature = "parallel")]
    let contacts = collision::find_pair_contacts_par(bodies, grid, config);
    #[cfg(not(feature = "parallel"))]
    let contacts = collision::find_pair_contacts(bodies, grid, config);
    collision::record_pair_contacts(bodies, &contacts);

    #[cfg(feature = "parallel")]
    let wall_contacts = collision::detect_wall_contacts_par(bodies, config);
    #[cfg(not(feature = "parallel"))]
    let wall_contacts = collision::detect_wall_contacts(bodies, config);

    // Serial: recolors draw from the world's RNG in store order
    let responses_applied = response::apply_responses(bodies, rng);

    TickReport {
        tick: world.time_ticks,
        pair_contacts: contacts.len(),
        wall_contacts,
        responses_applied,
    }
}

/// Advance the world by one frame of `dt` seconds
pub fn tick(world: &mut World, dt: f32) -> TickReport {
    world.time_ticks += 1;
    let report = resolve_collisions(world);
    integrate(&mut world.bodies, dt, &world.config);

    if report.pair_contacts > 0 || report.wall_contacts > 0 {
        log::trace!(
            "Tick {}: {} pair contacts, {} wall contacts",
            report.tick,
            report.pair_contacts,
            report.wall_contacts
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::body::Color;

    const EPS: f32 = 1e-3;
    const FRAME_DT: f32 = 1.0 / 60.0;

    fn world_with(config: SimConfig, seed: u64) -> World {
        World::new(config, seed).expect("config is valid")
    }

    #[test]
    fn test_dt_is_clamped() {
        assert_eq!(clamp_dt(0.01), 0.01);
        assert_eq!(clamp_dt(2.0), MAX_TICK_DT);
        assert_eq!(clamp_dt(-1.0), 0.0);

        let mut bodies = BodyStore::new();
        let handle = bodies.insert(Body::new(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), Color::WHITE));
        integrate(&mut bodies, 5.0, &SimConfig::default());
        let x = bodies.get(handle).map(|b| b.position.x).unwrap_or_default();
        assert!((x - 3.3).abs() < EPS);
    }

    #[test]
    fn test_converging_pair() {
        let config = SimConfig {
            arena_half_extent: 250.0,
            body_radius: 10.0,
            body_speed: 1500.0,
            render_enabled: true,
        };
        let mut world = world_with(config, 0);
        let a = world
            .bodies_mut()
            .insert(Body::new(Vec3::ZERO, Vec3::new(1500.0, 0.0, 0.0), Color::WHITE));
        let b = world.bodies_mut().insert(Body::new(
            Vec3::new(15.0, 0.0, 0.0),
            Vec3::new(-1500.0, 0.0, 0.0),
            Color::WHITE,
        ));

        let report = resolve_collisions(&mut world);
        assert_eq!(report.pair_contacts, 1);
        assert_eq!(report.responses_applied, 2);

        let body_a = world.bodies().get(a).expect("a is alive");
        let body_b = world.bodies().get(b).expect("b is alive");
        assert!(body_a.position.distance(body_b.position) >= 20.0 - EPS);
        assert!(body_a.velocity.x < 0.0);
        assert!(body_b.velocity.x > 0.0);
        assert_ne!(body_a.color, Color::WHITE);
        assert!(!body_a.pending.has_collision && !body_b.pending.has_collision);
    }

    #[test]
    fn test_grid_tracks_bodies_each_tick() {
        let mut world = world_with(SimConfig::default(), 2);
        world.populate_initial();
        tick(&mut world, FRAME_DT);

        // Cells were assigned before the bodies moved
        let cell_size = world.grid().cell_size();
        assert_eq!(cell_size, world.config().cell_size());
        for (handle, body) in world.bodies().iter() {
            assert!(world.grid().bucket(body.cell).contains(&handle));
        }
    }

    #[test]
    fn test_stays_inside_arena() {
        // Per-tick travel of 2 units stays well under the 10 unit radius
        let config = SimConfig {
            arena_half_extent: 200.0,
            body_radius: 10.0,
            body_speed: 480.0,
            render_enabled: false,
        };
        let mut world = world_with(config, 77);
        world.add_bodies(40);
        assert!(world.body_count() > 0);

        let limit = config.arena_half_extent + EPS;
        for _ in 0..2000 {
            tick(&mut world, FRAME_DT / 4.0);
            for body in world.bodies().bodies() {
                assert!(body.position.x.abs() <= limit, "x escaped: {}", body.position.x);
                assert!(body.position.y.abs() <= limit, "y escaped: {}", body.position.y);
                assert!(!body.pending.has_collision);
            }
        }
    }

    #[test]
    fn test_fast_body_near_wall_stays_inside() {
        // Defaults: 25 units of travel per frame against a 10 unit radius
        let config = SimConfig::default();
        let mut world = world_with(config, 0);
        let handle = world.bodies_mut().insert(Body::new(
            Vec3::new(239.0, 0.0, 0.0),
            Vec3::new(1500.0, 0.0, 0.0),
            Color::WHITE,
        ));

        tick(&mut world, FRAME_DT);
        let body = world.bodies().get(handle).expect("body is alive");
        assert_eq!(body.position.x, config.arena_half_extent);

        // Next tick the wall pass snaps it inside and turns it around
        tick(&mut world, FRAME_DT);
        let body = world.bodies().get(handle).expect("body is alive");
        assert!(body.velocity.x < 0.0);
        assert!(body.position.x <= config.inner_limit());
    }

    #[test]
    fn test_default_config_stays_inside_arena() {
        let config = SimConfig::default();
        let mut world = world_with(config, 91);
        world.add_bodies(40);
        assert!(world.body_count() > 0);

        let limit = config.arena_half_extent;
        for frame in 0..1500 {
            // Include frames long enough to hit the step clamp
            let dt = if frame % 100 == 0 { 1.0 } else { FRAME_DT };
            tick(&mut world, dt);
            for body in world.bodies().bodies() {
                assert!(body.position.x.abs() <= limit, "x escaped: {}", body.position.x);
                assert!(body.position.y.abs() <= limit, "y escaped: {}", body.position.y);
            }
        }
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut first = world_with(SimConfig::default(), 1234);
        let mut second = world_with(SimConfig::default(), 1234);
        first.add_bodies(30);
        second.add_bodies(30);

        for _ in 0..200 {
            let r1 = tick(&mut first, FRAME_DT);
            let r2 = tick(&mut second, FRAME_DT);
            assert_eq!(r1, r2);
        }

        assert_eq!(first.time_ticks(), 200);
        for (a, b) in first.bodies().bodies().zip(second.bodies().bodies()) {
            assert_eq!(a.position, b.position);
            assert_eq!(a.velocity, b.velocity);
            assert_eq!(a.color, b.color);
        }
    }

    #[test]
    fn test_empty_world_ticks() {
        let mut world = world_with(SimConfig::default(), 0);
        let report = tick(&mut world, FRAME_DT);
        assert_eq!(report, TickReport { tick: 1, ..Default::default() });
        assert!(world.grid().is_empty());
    }
}
