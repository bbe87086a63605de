//! Commit of accumulated collision responses
//!
//! The only stage that writes position, velocity and color on behalf of the
//! detectors. Runs once per tick, after every detection pass.

use rand::Rng;

use super::body::{Body, BodyStore, Color};

/// Commit one body's pending correction and reset its accumulator
///
/// Returns whether the body had recorded a collision.
pub fn apply_response(body: &mut Body, rng: &mut impl Rng) -> bool {
    let pending = body.pending.take();
    if !pending.has_collision {
        return false;
    }
    body.position += pending.pos_delta;
    body.velocity += pending.vel_delta;
    body.color = Color::random(rng);
    true
}

/// Commit every pending response; returns how many bodies changed
pub fn apply_responses(bodies: &mut BodyStore, rng: &mut impl Rng) -> usize {
    bodies
        .bodies_mut()
        .map(|body| apply_response(body, rng))
        .filter(|&applied| applied)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::body::PendingResponse;
    use glam::Vec3;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_untouched_without_collision() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut body = Body::new(Vec3::new(1.0, 2.0, 0.0), Vec3::X, Color::WHITE);
        assert!(!apply_response(&mut body, &mut rng));
        assert_eq!(body.position, Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(body.velocity, Vec3::X);
        assert_eq!(body.color, Color::WHITE);
    }

    #[test]
    fn test_commits_deltas_and_recolors() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut body = Body::new(Vec3::ZERO, Vec3::X, Color::rgba(0, 0, 0, 255));
        body.pending.accumulate(Vec3::new(2.0, 0.0, 0.0), Vec3::new(-2.0, 0.0, 0.0));

        assert!(apply_response(&mut body, &mut rng));
        assert_eq!(body.position, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(body.velocity, Vec3::new(-1.0, 0.0, 0.0));
        // Black is outside the random palette, so the color must have changed
        assert_ne!(body.color, Color::rgba(0, 0, 0, 255));
        assert_eq!(body.pending, PendingResponse::NONE);
    }

    proptest! {
        #[test]
        fn proptest_accumulators_always_reset(
            deltas in proptest::collection::vec(
                (any::<bool>(), -50.0f32..50.0, -50.0f32..50.0),
                1..40,
            ),
        ) {
            let mut rng = Pcg32::seed_from_u64(9);
            let mut bodies = BodyStore::new();
            let mut expected = 0;
            for (hit, dx, dv) in deltas {
                let mut body = Body::new(Vec3::ZERO, Vec3::ZERO, Color::WHITE);
                if hit {
                    body.pending.accumulate(Vec3::new(dx, 0.0, 0.0), Vec3::new(0.0, dv, 0.0));
                    expected += 1;
                } else {
                    // Stray deltas without the flag are discarded too
                    body.pending.pos_delta = Vec3::new(dx, 0.0, 0.0);
                }
                bodies.insert(body);
            }

            prop_assert_eq!(apply_responses(&mut bodies, &mut rng), expected);
            for body in bodies.bodies() {
                prop_assert_eq!(body.pending, PendingResponse::NONE);
            }
        }
    }
}
