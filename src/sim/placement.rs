//! Rejection-sampling placement for new bodies

use glam::Vec3;
use rand::Rng;

use super::body::{Body, BodyStore, Color};
use crate::config::SimConfig;
use crate::consts::MAX_PLACEMENT_RETRIES;

/// Uniform candidate position with the whole body inside the arena
pub fn sample_position(config: &SimConfig, rng: &mut impl Rng) -> Vec3 {
    let limit = config.inner_limit();
    Vec3::new(
        rng.random_range(-limit..=limit),
        rng.random_range(-limit..=limit),
        0.0,
    )
}

/// Whether `candidate` keeps clear of every existing body
///
/// Full scan; the grid only describes the store during a tick.
pub fn is_clear(candidate: Vec3, bodies: &BodyStore, config: &SimConfig) -> bool {
    let required = config.contact_distance();
    bodies
        .bodies()
        .all(|body| candidate.distance(body.position) >= required)
}

/// Try up to `MAX_PLACEMENT_RETRIES` candidates; `None` if all overlap
pub fn find_free_position(
    bodies: &BodyStore,
    config: &SimConfig,
    rng: &mut impl Rng,
) -> Option<Vec3> {
    (0..MAX_PLACEMENT_RETRIES)
        .map(|_| sample_position(config, rng))
        .find(|&candidate| is_clear(candidate, bodies, config))
}

/// Unit vector in the xy-plane with a uniformly random heading
pub fn random_heading(rng: &mut impl Rng) -> Vec3 {
    let angle = rng.random_range(0.0..std::f32::consts::TAU);
    Vec3::new(angle.cos(), angle.sin(), 0.0)
}

/// Build a body at a free position, moving at the configured speed
pub fn make_body(bodies: &BodyStore, config: &SimConfig, rng: &mut impl Rng) -> Option<Body> {
    let position = find_free_position(bodies, config, rng)?;
    let velocity = random_heading(rng) * config.body_speed;
    Some(Body::new(position, velocity, Color::random(rng)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn config() -> SimConfig {
        SimConfig {
            arena_half_extent: 250.0,
            body_radius: 10.0,
            body_speed: 1500.0,
            render_enabled: true,
        }
    }

    #[test]
    fn test_samples_stay_inside_arena() {
        let config = config();
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..1000 {
            let p = sample_position(&config, &mut rng);
            assert!(p.x.abs() <= 240.0 && p.y.abs() <= 240.0);
            assert_eq!(p.z, 0.0);
        }
    }

    #[test]
    fn test_never_overlaps_existing_body() {
        let config = config();
        let mut bodies = BodyStore::new();
        bodies.insert(Body::new(Vec3::ZERO, Vec3::ZERO, Color::WHITE));

        for seed in 0..500 {
            let mut rng = Pcg32::seed_from_u64(seed);
            let body = make_body(&bodies, &config, &mut rng).expect("arena is nearly empty");
            assert!(body.position.distance(Vec3::ZERO) >= 20.0);
            assert!((body.velocity.length() - 1500.0).abs() < 0.5);
            assert!(!body.pending.has_collision);
        }
    }

    #[test]
    fn test_gives_up_when_arena_is_full() {
        // Radius close to the half-extent leaves room for a single body
        let config = SimConfig {
            arena_half_extent: 100.0,
            body_radius: 90.0,
            ..config()
        };
        let mut rng = Pcg32::seed_from_u64(5);
        let mut bodies = BodyStore::new();
        bodies.insert(Body::new(Vec3::ZERO, Vec3::ZERO, Color::WHITE));

        assert!(find_free_position(&bodies, &config, &mut rng).is_none());
        assert!(make_body(&bodies, &config, &mut rng).is_none());
    }

    #[test]
    fn test_random_heading_is_unit() {
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..100 {
            let heading = random_heading(&mut rng);
            assert!((heading.length() - 1.0).abs() < 1e-5);
            assert_eq!(heading.z, 0.0);
        }
    }
}
