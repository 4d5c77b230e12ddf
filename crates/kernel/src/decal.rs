//! Procedural contact-shadow decal that follows the sphere.

use glam::Vec3;
use umbra_common::{Transform, clamp01};

use crate::scene::{Geometry, MaterialId, Renderable};

/// Height of the decal above the ground plane; keeps it out of depth-fighting range.
pub const DECAL_OFFSET: f32 = 0.01;

/// Opacity of the decal when the sphere touches the ground.
pub const DECAL_BASE_ALPHA: f32 = 0.3;

/// Decal opacity for a sphere at height `sphere_y`.
///
/// Non-increasing in `sphere_y` and always within `[0, DECAL_BASE_ALPHA]`.
pub fn decal_opacity(sphere_y: f32) -> f32 {
    clamp01(1.0 - sphere_y) * DECAL_BASE_ALPHA
}

/// Flat, alpha-blended quad lying on the ground plane under the sphere.
///
/// Its opacity is derived state: the only way to change it is [`ShadowDecal::sync`].
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowDecal {
    renderable: Renderable,
    opacity: f32,
}

impl ShadowDecal {
    /// Create a decal resting on a plane at `plane_y`, fully opaque (sphere grounded).
    pub fn new(size: f32, material: MaterialId, plane_y: f32) -> Self {
        let transform = Transform::from_position(Vec3::new(0.0, plane_y + DECAL_OFFSET, 0.0))
            .with_euler(-std::f32::consts::FRAC_PI_2, 0.0, 0.0);
        Self {
            renderable: Renderable {
                geometry: Geometry::Plane {
                    width: size,
                    height: size,
                },
                material,
                transform,
                casts_shadow: false,
                receives_shadow: false,
            },
            opacity: DECAL_BASE_ALPHA,
        }
    }

    /// Snap the decal under `sphere` and recompute its opacity.
    pub fn sync(&mut self, sphere: Vec3, plane_y: f32) {
        let position = &mut self.renderable.transform.position;
        position.x = sphere.x;
        position.z = sphere.z;
        position.y = plane_y + DECAL_OFFSET;
        self.opacity = decal_opacity(sphere.y);
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn position(&self) -> Vec3 {
        self.renderable.transform.position
    }

    pub fn renderable(&self) -> &Renderable {
        &self.renderable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLANE_Y: f32 = -0.5;

    fn decal() -> ShadowDecal {
        ShadowDecal::new(1.5, MaterialId(1), PLANE_Y)
    }

    #[test]
    fn follows_sphere_exactly() {
        let mut d = decal();
        for p in [
            Vec3::new(1.5, 0.0, 0.0),
            Vec3::new(-0.123_456_7, 0.7, 1.234_567_9),
            Vec3::new(1e-7, 5.0, -1e7),
        ] {
            d.sync(p, PLANE_Y);
            assert_eq!(d.position().x, p.x);
            assert_eq!(d.position().z, p.z);
            assert_eq!(d.position().y, PLANE_Y + DECAL_OFFSET);
        }
    }

    #[test]
    fn opacity_is_clamped() {
        for y in [-10.0, -1.0, 0.0, 0.3, 1.0, 1.5, 100.0, f32::INFINITY, f32::NAN] {
            let a = decal_opacity(y);
            assert!((0.0..=DECAL_BASE_ALPHA).contains(&a), "y={y} a={a}");
        }
    }

    #[test]
    fn opacity_weakens_as_sphere_rises() {
        let mut prev = decal_opacity(0.0);
        for i in 1..=1000 {
            let a = decal_opacity(i as f32 / 1000.0);
            assert!(a <= prev);
            prev = a;
        }
    }

    #[test]
    fn grounded_sphere_gives_full_opacity() {
        let mut d = decal();
        d.sync(Vec3::new(1.5, 0.0, 0.0), PLANE_Y);
        assert_eq!(d.opacity(), DECAL_BASE_ALPHA);
    }

    #[test]
    fn sphere_above_unit_height_hides_decal() {
        let mut d = decal();
        d.sync(Vec3::new(0.0, 1.0, 1.5), PLANE_Y);
        assert_eq!(d.opacity(), 0.0);
        d.sync(Vec3::new(0.0, 3.0, 1.5), PLANE_Y);
        assert_eq!(d.opacity(), 0.0);
    }

    #[test]
    fn decal_neither_casts_nor_receives() {
        let d = decal();
        assert!(!d.renderable().casts_shadow);
        assert!(!d.renderable().receives_shadow);
    }
}
