//! Instance data handed to the renderer
//!
//! One instance per live body, laid out for direct upload into an instance
//! buffer.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat};

use crate::sim::{Body, World};

/// Per-body transform and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct BodyInstance {
    /// Column-major model matrix: unit sphere scaled to the body radius, then
    /// moved to the body position
    pub transform: [[f32; 4]; 4],
    pub color: [u8; 4],
}

impl BodyInstance {
    pub fn new(body: &Body, radius: f32) -> Self {
        let transform = Mat4::from_scale_rotation_translation(
            glam::Vec3::splat(radius),
            Quat::IDENTITY,
            body.position,
        );
        Self {
            transform: transform.to_cols_array_2d(),
            color: body.color.to_array(),
        }
    }
}

/// Instances for every body, or none when rendering is switched off
pub fn extract_instances(world: &World) -> Vec<BodyInstance> {
    let config = world.config();
    if !config.render_enabled {
        return Vec::new();
    }
    world
        .bodies()
        .bodies()
        .map(|body| BodyInstance::new(body, config.body_radius))
        .collect()
}
