use glam::Vec3;
use serde::{Deserialize, Serialize};
use umbra_common::{Color, Transform};

use crate::animation::sphere_position;
use crate::config::SceneConfig;
use crate::decal::ShadowDecal;
use crate::lights::LightRig;

/// Index into [`Scene::materials`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialId(pub usize);

/// Procedural geometry description; the renderer tessellates it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Geometry {
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    /// Quad in the local XY plane, facing +Z.
    Plane { width: f32, height: f32 },
}

/// Surface description consumed by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Material {
    /// Lit, shadow-aware surface.
    Standard {
        color: Color,
        roughness: f32,
        metalness: f32,
    },
    /// Unlit, alpha-blended radial blob. Opacity comes from the decal.
    Shadow { color: Color },
}

/// A drawable object. Owns exactly one transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Renderable {
    pub geometry: Geometry,
    pub material: MaterialId,
    pub transform: Transform,
    pub casts_shadow: bool,
    pub receives_shadow: bool,
}

/// Which scene slot a renderable occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectKind {
    Plane,
    Sphere,
    Decal,
}

/// The whole mutable scene: renderables, materials, lights.
///
/// Everything is created once by [`Scene::from_config`] and mutated in place
/// afterwards; nothing is spawned or destroyed while the scene runs.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub plane: Renderable,
    pub sphere: Renderable,
    decal: ShadowDecal,
    pub lights: LightRig,
    materials: Vec<Material>,
}

impl Scene {
    pub fn from_config(config: &SceneConfig) -> Self {
        let standard = MaterialId(0);
        let shadow = MaterialId(1);
        let materials = vec![
            Material::Standard {
                color: config.material.color,
                roughness: config.material.roughness,
                metalness: config.material.metalness,
            },
            Material::Shadow {
                color: Color::BLACK,
            },
        ];

        let plane_y = config.ground.y;
        let plane = Renderable {
            geometry: Geometry::Plane {
                width: config.ground.size,
                height: config.ground.size,
            },
            material: standard,
            transform: Transform::from_position(Vec3::new(0.0, plane_y, 0.0)).with_euler(
                -std::f32::consts::FRAC_PI_2,
                0.0,
                0.0,
            ),
            casts_shadow: false,
            receives_shadow: true,
        };
        let sphere = Renderable {
            geometry: Geometry::Sphere {
                radius: config.sphere.radius,
                width_segments: config.sphere.segments,
                height_segments: config.sphere.segments,
            },
            material: standard,
            transform: Transform::default(),
            casts_shadow: true,
            receives_shadow: false,
        };

        let mut scene = Self {
            plane,
            sphere,
            decal: ShadowDecal::new(config.decal_size, shadow, plane_y),
            lights: config.lights.clone(),
            materials,
        };
        scene.advance(0.0);
        tracing::debug!(
            lights = scene.lights.len(),
            materials = scene.materials.len(),
            "scene built"
        );
        scene
    }

    /// Ground plane height.
    pub fn plane_y(&self) -> f32 {
        self.plane.transform.position.y
    }

    /// Pose the sphere for `elapsed_time` and resynchronise the decal.
    ///
    /// Depends only on `elapsed_time` and the plane height; calling it twice
    /// with the same time leaves identical state.
    pub fn advance(&mut self, elapsed_time: f32) -> Vec3 {
        let position = sphere_position(elapsed_time);
        self.sphere.transform.position = position;
        let plane_y = self.plane_y();
        self.decal.sync(position, plane_y);
        position
    }

    pub fn sphere_position(&self) -> Vec3 {
        self.sphere.transform.position
    }

    pub fn decal(&self) -> &ShadowDecal {
        &self.decal
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0)
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// Replace a material as a whole value. Returns false for an unknown id.
    pub fn set_material(&mut self, id: MaterialId, material: Material) -> bool {
        match self.materials.get_mut(id.0) {
            Some(slot) => {
                *slot = material;
                true
            }
            None => false,
        }
    }

    /// Material shared by the plane and the sphere.
    pub fn standard_material_id(&self) -> MaterialId {
        self.sphere.material
    }

    /// All renderables in draw order: opaque first, the blended decal last.
    pub fn renderables(&self) -> impl Iterator<Item = (ObjectKind, &Renderable)> {
        [
            (ObjectKind::Plane, &self.plane),
            (ObjectKind::Sphere, &self.sphere),
            (ObjectKind::Decal, self.decal.renderable()),
        ]
        .into_iter()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::from_config(&SceneConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decal::{DECAL_BASE_ALPHA, DECAL_OFFSET};
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn shadow_flags_match_roles() {
        let scene = Scene::default();
        assert!(scene.plane.receives_shadow && !scene.plane.casts_shadow);
        assert!(scene.sphere.casts_shadow && !scene.sphere.receives_shadow);
        let decal = scene.decal().renderable();
        assert!(!decal.casts_shadow && !decal.receives_shadow);
    }

    #[test]
    fn renderables_traverse_all_three_decal_last() {
        let scene = Scene::default();
        let kinds: Vec<ObjectKind> = scene.renderables().map(|(k, _)| k).collect();
        assert_eq!(
            kinds,
            vec![ObjectKind::Plane, ObjectKind::Sphere, ObjectKind::Decal]
        );
    }

    #[test]
    fn advance_at_zero() {
        let mut scene = Scene::default();
        let p = scene.advance(0.0);
        assert_eq!(p, Vec3::new(1.5, 0.0, 0.0));
        assert_eq!(scene.decal().opacity(), DECAL_BASE_ALPHA);
        assert_eq!(scene.decal().position().y, scene.plane_y() + DECAL_OFFSET);
    }

    #[test]
    fn advance_at_quarter_turn() {
        let mut scene = Scene::default();
        let p = scene.advance(FRAC_PI_2);
        assert!((p - Vec3::new(0.0, 1.0, 1.5)).length() < 1e-5);
        assert!(scene.decal().opacity() < 1e-5);
    }

    #[test]
    fn advance_is_idempotent() {
        let mut a = Scene::default();
        let mut b = Scene::default();
        a.advance(2.345);
        b.advance(2.345);
        b.advance(2.345);
        assert_eq!(a, b);
    }

    #[test]
    fn decal_tracks_sphere_every_step() {
        let mut scene = Scene::default();
        for i in 0..500 {
            let p = scene.advance(i as f32 * 0.031);
            let d = scene.decal().position();
            assert_eq!(d.x, p.x);
            assert_eq!(d.z, p.z);
        }
    }

    #[test]
    fn plane_and_sphere_share_standard_material() {
        let scene = Scene::default();
        assert_eq!(scene.plane.material, scene.sphere.material);
        match scene.material(scene.standard_material_id()) {
            Some(Material::Standard { roughness, .. }) => assert_eq!(*roughness, 0.7),
            other => panic!("unexpected material {other:?}"),
        }
    }

    #[test]
    fn set_material_replaces_and_rejects_unknown() {
        let mut scene = Scene::default();
        let id = scene.standard_material_id();
        let edited = Material::Standard {
            color: Color::WHITE,
            roughness: 0.1,
            metalness: 0.9,
        };
        assert!(scene.set_material(id, edited));
        assert_eq!(scene.material(id), Some(&edited));
        assert!(!scene.set_material(MaterialId(99), edited));
    }

    #[test]
    fn ground_plane_faces_up() {
        let scene = Scene::default();
        let normal = scene.plane.transform.rotation * Vec3::Z;
        assert!((normal - Vec3::Y).length() < 1e-5);
        assert_eq!(scene.plane_y(), -0.5);
    }
}
