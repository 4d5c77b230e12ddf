//! Per-frame shadow projections derived from the light rig.

use glam::{Mat4, Vec3, Vec4};
use umbra_kernel::{FrustumDefect, Light, LightKind, LightRig, ShadowCamera, ShadowProjection};

/// Number of cube faces rendered for a point light.
pub const POINT_SHADOW_FACES: usize = 6;

/// Why a light renders no shadow this frame.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ShadowDefect {
    #[error(transparent)]
    Frustum(#[from] FrustumDefect),
    #[error("light position coincides with its target")]
    ZeroLengthDirection,
}

/// Shadow projection state of one shadow-casting light.
#[derive(Debug, Clone, PartialEq)]
pub struct LightShadow {
    pub kind: LightKind,
    pub camera: ShadowCamera,
    /// World-to-light clip matrices: one for directional and spot lights,
    /// [`POINT_SHADOW_FACES`] for point lights. Empty when disabled.
    pub view_projections: Vec<Mat4>,
    pub defect: Option<ShadowDefect>,
}

impl LightShadow {
    fn for_light(light: &Light, camera: &ShadowCamera) -> Self {
        let kind = light.kind();
        match build_matrices(light, camera) {
            Ok(view_projections) => Self {
                kind,
                camera: *camera,
                view_projections,
                defect: None,
            },
            Err(defect) => {
                tracing::trace!(light = %kind, "no shadow map this frame: {defect}");
                Self {
                    kind,
                    camera: *camera,
                    view_projections: Vec::new(),
                    defect: Some(defect),
                }
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.defect.is_none() && !self.view_projections.is_empty()
    }

    /// Frustum wireframe as line segments, one box per projection.
    pub fn helper_segments(&self) -> Vec<[Vec3; 2]> {
        const EDGES: [(usize, usize); 12] = [
            (0, 1),
            (1, 3),
            (3, 2),
            (2, 0),
            (4, 5),
            (5, 7),
            (7, 6),
            (6, 4),
            (0, 4),
            (1, 5),
            (2, 6),
            (3, 7),
        ];
        let mut segments = Vec::new();
        for vp in &self.view_projections {
            let Some(corners) = frustum_corners(vp) else {
                continue;
            };
            segments.extend(EDGES.iter().map(|&(a, b)| [corners[a], corners[b]]));
        }
        segments
    }
}

/// Shadow projections for every shadow-casting light in the rig.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShadowPlan {
    pub shadows: Vec<LightShadow>,
}

impl ShadowPlan {
    pub fn from_rig(rig: &LightRig) -> Self {
        Self {
            shadows: rig
                .shadow_casters()
                .map(|(light, camera)| LightShadow::for_light(light, camera))
                .collect(),
        }
    }

    pub fn get(&self, kind: LightKind) -> Option<&LightShadow> {
        self.shadows.iter().find(|s| s.kind == kind)
    }

    pub fn active(&self) -> impl Iterator<Item = &LightShadow> {
        self.shadows.iter().filter(|s| s.is_active())
    }

    pub fn disabled(&self) -> impl Iterator<Item = &LightShadow> {
        self.shadows.iter().filter(|s| !s.is_active())
    }
}

/// Up vector that is not parallel to `dir`.
fn up_for(dir: Vec3) -> Vec3 {
    if dir.dot(Vec3::Y).abs() > 0.99 {
        Vec3::Z
    } else {
        Vec3::Y
    }
}

fn projection(camera: &ShadowCamera, aspect: f32) -> Mat4 {
    match camera.projection {
        ShadowProjection::Orthographic {
            left,
            right,
            top,
            bottom,
        } => Mat4::orthographic_rh(left, right, bottom, top, camera.near, camera.far),
        ShadowProjection::Perspective { fov_degrees } => {
            Mat4::perspective_rh(fov_degrees.to_radians(), aspect, camera.near, camera.far)
        }
    }
}

fn aimed(light: &Light, target: Vec3, camera: &ShadowCamera) -> Result<Vec<Mat4>, ShadowDefect> {
    let eye = light.position();
    let dir = (target - eye).normalize_or_zero();
    if dir == Vec3::ZERO {
        return Err(ShadowDefect::ZeroLengthDirection);
    }
    let view = Mat4::look_at_rh(eye, target, up_for(dir));
    Ok(vec![projection(camera, camera.aspect()) * view])
}

fn cube_faces(light: &Light, camera: &ShadowCamera) -> Vec<Mat4> {
    const DIRS: [Vec3; POINT_SHADOW_FACES] = [
        Vec3::X,
        Vec3::NEG_X,
        Vec3::Y,
        Vec3::NEG_Y,
        Vec3::Z,
        Vec3::NEG_Z,
    ];
    let eye = light.position();
    let proj = Mat4::perspective_rh(
        std::f32::consts::FRAC_PI_2,
        1.0,
        camera.near,
        camera.far,
    );
    DIRS.iter()
        .map(|&dir| proj * Mat4::look_at_rh(eye, eye + dir, up_for(dir)))
        .collect()
}

fn build_matrices(light: &Light, camera: &ShadowCamera) -> Result<Vec<Mat4>, ShadowDefect> {
    camera.validate()?;
    if !light.position().is_finite() {
        return Err(FrustumDefect::NonFinite.into());
    }
    match light.kind() {
        LightKind::Point => Ok(cube_faces(light, camera)),
        LightKind::Directional | LightKind::Spot => {
            let target = light.target().unwrap_or(Vec3::ZERO);
            aimed(light, target, camera)
        }
        LightKind::Ambient => Ok(Vec::new()),
    }
}

/// World-space corners of the clip volume of `view_proj` (wgpu depth range 0..1).
///
/// Index bits: 1 = +x, 2 = +y, 4 = far plane.
fn frustum_corners(view_proj: &Mat4) -> Option<[Vec3; 8]> {
    let inv = view_proj.inverse();
    let mut corners = [Vec3::ZERO; 8];
    for (i, corner) in corners.iter_mut().enumerate() {
        let x = if i & 1 != 0 { 1.0 } else { -1.0 };
        let y = if i & 2 != 0 { 1.0 } else { -1.0 };
        let z = if i & 4 != 0 { 1.0 } else { 0.0 };
        let world = inv * Vec4::new(x, y, z, 1.0);
        if world.w.abs() < f32::EPSILON {
            return None;
        }
        *corner = world.truncate() / world.w;
    }
    corners.iter().all(|c| c.is_finite()).then_some(corners)
}
