//! CPU-side layouts of the uniform blocks declared in the WGSL shaders.
//!
//! Every member is a `vec4` or a `mat4x4`, so the Rust `repr(C)` layout and
//! the WGSL uniform layout agree without padding fields.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use umbra_kernel::{LightKind, LightSource, Material, Renderable, Scene};
use umbra_render::{LightShadow, POINT_SHADOW_FACES, RenderFrame, ShadowPlan};

/// PCF kernels larger than this many texels either side are clamped.
pub(crate) const MAX_PCF_RADIUS: f32 = 3.0;

/// Slot of each shadow-capable light in [`SceneUniforms::lights`].
pub(crate) const DIRECTIONAL_SLOT: usize = 0;
pub(crate) const SPOT_SLOT: usize = 1;
pub(crate) const POINT_SLOT: usize = 2;

type Mat = [[f32; 4]; 4];

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct LightUniform {
    /// xyz position, w intensity (zero when the light is absent).
    pub position: [f32; 4],
    /// xyz unit direction the light travels, w cosine of the cone half-angle.
    pub direction: [f32; 4],
    /// rgb color, w range (zero means unbounded).
    pub color: [f32; 4],
    /// x enabled, y depth bias, z PCF radius in texels, w texel size.
    pub shadow: [f32; 4],
    /// x decay exponent, y cosine where the penumbra ends.
    pub attenuation: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct SceneUniforms {
    pub view_proj: Mat,
    pub camera_pos: [f32; 4],
    /// rgb ambient radiance.
    pub ambient: [f32; 4],
    pub lights: [LightUniform; 3],
    pub directional_vp: Mat,
    pub spot_vp: Mat,
    pub point_vp: [Mat; POINT_SHADOW_FACES],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct ObjectUniforms {
    pub model: Mat,
    /// rgb color, w opacity.
    pub color: [f32; 4],
    /// x roughness, y metalness, z receives shadow.
    pub material: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct ShadowPassUniforms {
    pub view_proj: Mat,
}

fn flag(on: bool) -> f32 {
    if on { 1.0 } else { 0.0 }
}

fn shadow_params(shadow: Option<&LightShadow>) -> [f32; 4] {
    match shadow {
        Some(s) if s.is_active() => {
            let texel = 1.0 / s.camera.map_size[0].max(s.camera.map_size[1]) as f32;
            [
                1.0,
                s.camera.bias,
                s.camera.radius.clamp(0.0, MAX_PCF_RADIUS),
                texel,
            ]
        }
        _ => [0.0; 4],
    }
}

fn light_uniform(scene: &Scene, shadows: &ShadowPlan, kind: LightKind) -> LightUniform {
    let Some(light) = scene.lights.get(kind) else {
        return LightUniform::zeroed();
    };
    let position = light.position();
    let toward = |target: Vec3| (target - position).normalize_or_zero();
    let (direction, cos_cutoff, range, decay, cos_inner) = match light.source {
        LightSource::Directional { target, .. } => (toward(target), -1.0, 0.0, 0.0, -1.0),
        LightSource::Spot {
            target,
            angle,
            distance,
            penumbra,
            decay,
            ..
        } => (
            toward(target),
            angle.cos(),
            distance,
            decay,
            (angle * (1.0 - penumbra.clamp(0.0, 1.0))).cos(),
        ),
        LightSource::Point {
            distance, decay, ..
        } => (Vec3::ZERO, -1.0, distance, decay, -1.0),
        LightSource::Ambient => (Vec3::ZERO, -1.0, 0.0, 0.0, -1.0),
    };
    let [r, g, b] = light.color.to_array();
    LightUniform {
        position: position.extend(light.intensity).to_array(),
        direction: direction.extend(cos_cutoff).to_array(),
        color: [r, g, b, range],
        shadow: shadow_params(shadows.get(kind)),
        attenuation: [decay, cos_inner, 0.0, 0.0],
    }
}

fn first_matrix(shadows: &ShadowPlan, kind: LightKind) -> Mat {
    shadows
        .get(kind)
        .and_then(|s| s.view_projections.first())
        .unwrap_or(&Mat4::IDENTITY)
        .to_cols_array_2d()
}

impl SceneUniforms {
    pub fn from_frame(frame: &RenderFrame<'_>) -> Self {
        let scene = frame.scene;
        let shadows = frame.shadows;
        let ambient = scene
            .lights
            .get(LightKind::Ambient)
            .map(|l| l.color.scaled(l.intensity))
            .unwrap_or([0.0; 3]);

        let mut point_vp = [Mat4::IDENTITY.to_cols_array_2d(); POINT_SHADOW_FACES];
        if let Some(point) = shadows.get(LightKind::Point) {
            for (slot, vp) in point_vp.iter_mut().zip(&point.view_projections) {
                *slot = vp.to_cols_array_2d();
            }
        }

        let mut lights = [LightUniform::zeroed(); 3];
        lights[DIRECTIONAL_SLOT] = light_uniform(scene, shadows, LightKind::Directional);
        lights[SPOT_SLOT] = light_uniform(scene, shadows, LightKind::Spot);
        lights[POINT_SLOT] = light_uniform(scene, shadows, LightKind::Point);

        Self {
            view_proj: frame.view.view_projection().to_cols_array_2d(),
            camera_pos: frame.view.eye.extend(1.0).to_array(),
            ambient: [ambient[0], ambient[1], ambient[2], 0.0],
            lights,
            directional_vp: first_matrix(shadows, LightKind::Directional),
            spot_vp: first_matrix(shadows, LightKind::Spot),
            point_vp,
        }
    }
}

impl ObjectUniforms {
    /// Uniforms of one renderable. `opacity` only affects blended materials.
    pub fn new(scene: &Scene, renderable: &Renderable, opacity: f32) -> Self {
        let (color, material) = match scene.material(renderable.material) {
            Some(Material::Standard {
                color,
                roughness,
                metalness,
            }) => (
                color.to_array(),
                [*roughness, *metalness, flag(renderable.receives_shadow), 0.0],
            ),
            Some(Material::Shadow { color }) => (color.to_array(), [1.0, 0.0, 0.0, 0.0]),
            None => {
                tracing::warn!(id = renderable.material.0, "unknown material, drawing magenta");
                ([1.0, 0.0, 1.0], [1.0, 0.0, 0.0, 0.0])
            }
        };
        Self {
            model: renderable.transform.matrix().to_cols_array_2d(),
            color: [color[0], color[1], color[2], opacity],
            material,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use umbra_render::RenderView;

    fn uniforms(scene: &Scene) -> SceneUniforms {
        let view = RenderView::default();
        let shadows = ShadowPlan::from_rig(&scene.lights);
        SceneUniforms::from_frame(&RenderFrame {
            scene,
            view: &view,
            shadows: &shadows,
            index: 0,
            elapsed_time: 0.0,
        })
    }

    #[test]
    fn layouts_are_vec4_aligned() {
        assert_eq!(std::mem::size_of::<LightUniform>(), 5 * 16);
        assert_eq!(std::mem::size_of::<ObjectUniforms>(), 64 + 2 * 16);
        assert_eq!(
            std::mem::size_of::<SceneUniforms>(),
            64 + 16 + 16 + 3 * 80 + 64 + 64 + 6 * 64
        );
        assert_eq!(std::mem::size_of::<SceneUniforms>() % 16, 0);
    }

    #[test]
    fn default_rig_packs_every_light() {
        let u = uniforms(&Scene::default());
        assert!((u.ambient[0] - 0.3).abs() < 1e-6);

        let dir = u.lights[DIRECTIONAL_SLOT];
        assert_eq!(&dir.position[..3], &[2.0, 2.0, -1.0]);
        assert!((dir.position[3] - 0.3).abs() < 1e-6);
        let d = Vec3::new(dir.direction[0], dir.direction[1], dir.direction[2]);
        assert!((d - Vec3::new(-2.0, -2.0, 1.0).normalize()).length() < 1e-5);
        assert_eq!(dir.shadow[0], 1.0);
        assert!((dir.shadow[3] - 1.0 / 1024.0).abs() < 1e-9);

        let spot = u.lights[SPOT_SLOT];
        assert!((spot.direction[3] - (std::f32::consts::PI * 0.3).cos()).abs() < 1e-6);
        assert_eq!(spot.color[3], 10.0);

        let point = u.lights[POINT_SLOT];
        assert_eq!(&point.position[..3], &[-1.0, 1.0, 0.0]);
        assert_eq!(point.shadow[0], 1.0);
        assert_ne!(u.point_vp[5], Mat4::IDENTITY.to_cols_array_2d());
    }

    #[test]
    fn disabled_shadow_is_flagged_off() {
        let mut scene = Scene::default();
        scene.lights.update(LightKind::Spot, |l| {
            let s = l.shadow_mut().unwrap();
            s.near = 5.0;
            s.far = 1.0;
        });
        let u = uniforms(&scene);
        assert_eq!(u.lights[SPOT_SLOT].shadow, [0.0; 4]);
        assert_eq!(u.spot_vp, Mat4::IDENTITY.to_cols_array_2d());
        assert_eq!(u.lights[DIRECTIONAL_SLOT].shadow[0], 1.0);
    }

    #[test]
    fn pcf_radius_is_clamped() {
        let mut scene = Scene::default();
        scene.lights.update(LightKind::Directional, |l| {
            l.shadow_mut().unwrap().radius = 40.0;
        });
        let u = uniforms(&scene);
        assert_eq!(u.lights[DIRECTIONAL_SLOT].shadow[2], MAX_PCF_RADIUS);
    }

    #[test]
    fn object_uniforms_carry_material_and_flags() {
        let scene = Scene::default();
        let plane = ObjectUniforms::new(&scene, &scene.plane, 1.0);
        assert_eq!(plane.material, [0.7, 0.0, 1.0, 0.0]);
        assert_eq!(plane.color[3], 1.0);

        let sphere = ObjectUniforms::new(&scene, &scene.sphere, 1.0);
        assert_eq!(sphere.material[2], 0.0);
        assert_eq!(sphere.model[3][0], 1.5);

        let decal = scene.decal();
        let blob = ObjectUniforms::new(&scene, decal.renderable(), decal.opacity());
        assert_eq!(&blob.color[..3], &[0.0, 0.0, 0.0]);
        assert!((blob.color[3] - 0.3).abs() < 1e-6);
    }
}
