//! Light rig: four independently configurable lights with static shadow frusta.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use umbra_common::{Color, Transform};

/// Discriminant of a [`LightSource`], used to address lights in the rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightKind {
    Ambient,
    Directional,
    Spot,
    Point,
}

impl LightKind {
    pub const ALL: [LightKind; 4] = [
        LightKind::Ambient,
        LightKind::Directional,
        LightKind::Spot,
        LightKind::Point,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LightKind::Ambient => "ambient",
            LightKind::Directional => "directional",
            LightKind::Spot => "spot",
            LightKind::Point => "point",
        }
    }
}

impl std::fmt::Display for LightKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.name())
    }
}

/// Projection used to rasterize a shadow map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShadowProjection {
    Orthographic {
        left: f32,
        right: f32,
        top: f32,
        bottom: f32,
    },
    Perspective {
        fov_degrees: f32,
    },
}

/// Why a shadow frustum cannot produce a usable depth map.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum FrustumDefect {
    #[error("near plane {near} must be positive")]
    NearNotPositive { near: f32 },
    #[error("near plane {near} is not in front of far plane {far}")]
    NearBeyondFar { near: f32, far: f32 },
    #[error("frustum parameters are not finite")]
    NonFinite,
    #[error("orthographic extent is empty")]
    EmptyExtent,
    #[error("field of view {fov_degrees} is outside (0, 180)")]
    FovOutOfRange { fov_degrees: f32 },
    #[error("shadow map size {width}x{height} is empty")]
    EmptyMap { width: u32, height: u32 },
}

/// Shadow camera of a shadow-casting light.
///
/// Static configuration: it is never fitted to scene content, so casters
/// outside the frustum are silently clipped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShadowCamera {
    pub near: f32,
    pub far: f32,
    pub projection: ShadowProjection,
    /// Depth map resolution, width then height.
    pub map_size: [u32; 2],
    /// PCF filter radius in texels.
    pub radius: f32,
    /// Depth offset applied when comparing against the map.
    pub bias: f32,
    /// Whether the frustum wireframe is drawn.
    pub helper_visible: bool,
}

impl ShadowCamera {
    pub const DEFAULT_MAP_SIZE: u32 = 1024;

    pub fn orthographic(extent: f32, near: f32, far: f32) -> Self {
        Self {
            near,
            far,
            projection: ShadowProjection::Orthographic {
                left: -extent,
                right: extent,
                top: extent,
                bottom: -extent,
            },
            map_size: [Self::DEFAULT_MAP_SIZE; 2],
            radius: 1.0,
            bias: 0.0,
            helper_visible: false,
        }
    }

    pub fn perspective(fov_degrees: f32, near: f32, far: f32) -> Self {
        Self {
            near,
            far,
            projection: ShadowProjection::Perspective { fov_degrees },
            map_size: [Self::DEFAULT_MAP_SIZE; 2],
            radius: 1.0,
            bias: 0.0,
            helper_visible: false,
        }
    }

    /// Check the frustum invariants. A defect means an empty shadow map, not a failure.
    pub fn validate(&self) -> Result<(), FrustumDefect> {
        if !self.near.is_finite() || !self.far.is_finite() {
            return Err(FrustumDefect::NonFinite);
        }
        if self.near <= 0.0 {
            return Err(FrustumDefect::NearNotPositive { near: self.near });
        }
        if self.near >= self.far {
            return Err(FrustumDefect::NearBeyondFar {
                near: self.near,
                far: self.far,
            });
        }
        if self.map_size[0] == 0 || self.map_size[1] == 0 {
            return Err(FrustumDefect::EmptyMap {
                width: self.map_size[0],
                height: self.map_size[1],
            });
        }
        match self.projection {
            ShadowProjection::Orthographic {
                left,
                right,
                top,
                bottom,
            } => {
                if ![left, right, top, bottom].iter().all(|v| v.is_finite()) {
                    return Err(FrustumDefect::NonFinite);
                }
                if left >= right || bottom >= top {
                    return Err(FrustumDefect::EmptyExtent);
                }
            }
            ShadowProjection::Perspective { fov_degrees } => {
                if !(fov_degrees > 0.0 && fov_degrees < 180.0) {
                    return Err(FrustumDefect::FovOutOfRange { fov_degrees });
                }
            }
        }
        Ok(())
    }

    pub fn aspect(&self) -> f32 {
        self.map_size[0].max(1) as f32 / self.map_size[1].max(1) as f32
    }
}

/// Per-kind light payload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LightSource {
    Ambient,
    /// Parallel rays travelling from the light's position towards `target`.
    Directional { target: Vec3, shadow: ShadowCamera },
    Spot {
        target: Vec3,
        /// Cone half-angle in radians.
        angle: f32,
        /// Range; zero means unbounded.
        distance: f32,
        penumbra: f32,
        decay: f32,
        shadow: ShadowCamera,
    },
    Point {
        /// Range; zero means unbounded.
        distance: f32,
        decay: f32,
        shadow: ShadowCamera,
    },
}

/// A light in the rig. Intensity is nominally in `[0, 1]` but not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub color: Color,
    pub intensity: f32,
    pub transform: Transform,
    pub source: LightSource,
}

impl Light {
    pub fn ambient(color: Color, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            transform: Transform::default(),
            source: LightSource::Ambient,
        }
    }

    pub fn directional(color: Color, intensity: f32, position: Vec3, shadow: ShadowCamera) -> Self {
        Self {
            color,
            intensity,
            transform: Transform::from_position(position),
            source: LightSource::Directional {
                target: Vec3::ZERO,
                shadow,
            },
        }
    }

    pub fn spot(
        color: Color,
        intensity: f32,
        distance: f32,
        angle: f32,
        position: Vec3,
        shadow: ShadowCamera,
    ) -> Self {
        Self {
            color,
            intensity,
            transform: Transform::from_position(position),
            source: LightSource::Spot {
                target: Vec3::ZERO,
                angle,
                distance,
                penumbra: 0.0,
                decay: 2.0,
                shadow,
            },
        }
    }

    pub fn point(color: Color, intensity: f32, position: Vec3, shadow: ShadowCamera) -> Self {
        Self {
            color,
            intensity,
            transform: Transform::from_position(position),
            source: LightSource::Point {
                distance: 0.0,
                decay: 2.0,
                shadow,
            },
        }
    }

    pub fn kind(&self) -> LightKind {
        match self.source {
            LightSource::Ambient => LightKind::Ambient,
            LightSource::Directional { .. } => LightKind::Directional,
            LightSource::Spot { .. } => LightKind::Spot,
            LightSource::Point { .. } => LightKind::Point,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Aim point for directional and spot lights.
    pub fn target(&self) -> Option<Vec3> {
        match self.source {
            LightSource::Directional { target, .. } | LightSource::Spot { target, .. } => {
                Some(target)
            }
            _ => None,
        }
    }

    pub fn shadow(&self) -> Option<&ShadowCamera> {
        match &self.source {
            LightSource::Ambient => None,
            LightSource::Directional { shadow, .. }
            | LightSource::Spot { shadow, .. }
            | LightSource::Point { shadow, .. } => Some(shadow),
        }
    }

    pub fn shadow_mut(&mut self) -> Option<&mut ShadowCamera> {
        match &mut self.source {
            LightSource::Ambient => None,
            LightSource::Directional { shadow, .. }
            | LightSource::Spot { shadow, .. }
            | LightSource::Point { shadow, .. } => Some(shadow),
        }
    }

    pub fn casts_shadow(&self) -> bool {
        self.shadow().is_some()
    }
}

/// The scene's lights, at most one per [`LightKind`], kept in kind order.
///
/// Writers replace a light as a whole value so readers never observe a
/// half-applied edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Light>", into = "Vec<Light>")]
pub struct LightRig {
    lights: Vec<Light>,
}

impl LightRig {
    pub fn new(lights: impl IntoIterator<Item = Light>) -> Self {
        let mut rig = Self { lights: Vec::new() };
        for light in lights {
            rig.set(light);
        }
        rig
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Light> {
        self.lights.iter()
    }

    pub fn get(&self, kind: LightKind) -> Option<&Light> {
        self.lights.iter().find(|l| l.kind() == kind)
    }

    /// Insert or replace the light of the same kind.
    pub fn set(&mut self, light: Light) {
        let kind = light.kind();
        match self.lights.iter().position(|l| l.kind() == kind) {
            Some(idx) => self.lights[idx] = light,
            None => {
                self.lights.push(light);
                self.lights.sort_by_key(Light::kind);
            }
        }
    }

    /// Edit a copy of the light of `kind` and write it back in one step.
    ///
    /// Returns false when the rig has no such light. The closure must keep
    /// the light's kind; a kind change is rejected.
    pub fn update(&mut self, kind: LightKind, edit: impl FnOnce(&mut Light)) -> bool {
        let Some(idx) = self.lights.iter().position(|l| l.kind() == kind) else {
            return false;
        };
        let mut light = self.lights[idx];
        edit(&mut light);
        if light.kind() != kind {
            tracing::warn!(%kind, "light edit changed kind; discarded");
            return false;
        }
        self.lights[idx] = light;
        true
    }

    /// Lights that own a shadow camera.
    pub fn shadow_casters(&self) -> impl Iterator<Item = (&Light, &ShadowCamera)> {
        self.lights
            .iter()
            .filter_map(|l| l.shadow().map(|shadow| (l, shadow)))
    }

    /// Show or hide every shadow helper at once.
    pub fn set_helpers_visible(&mut self, visible: bool) {
        for light in &mut self.lights {
            if let Some(shadow) = light.shadow_mut() {
                shadow.helper_visible = visible;
            }
        }
    }
}

impl From<Vec<Light>> for LightRig {
    fn from(lights: Vec<Light>) -> Self {
        Self::new(lights)
    }
}

impl From<LightRig> for Vec<Light> {
    fn from(rig: LightRig) -> Self {
        rig.lights
    }
}

impl Default for LightRig {
    /// The four lights of the demo scene, all white at intensity 0.3.
    fn default() -> Self {
        let mut directional_shadow = ShadowCamera::orthographic(2.0, 1.0, 6.0);
        directional_shadow.radius = 10.0;

        Self::new([
            Light::ambient(Color::WHITE, 0.3),
            Light::directional(
                Color::WHITE,
                0.3,
                Vec3::new(2.0, 2.0, -1.0),
                directional_shadow,
            ),
            Light::spot(
                Color::WHITE,
                0.3,
                10.0,
                std::f32::consts::PI * 0.3,
                Vec3::new(0.0, 2.0, 2.0),
                ShadowCamera::perspective(30.0, 1.0, 6.0),
            ),
            Light::point(
                Color::WHITE,
                0.3,
                Vec3::new(-1.0, 1.0, 0.0),
                ShadowCamera::perspective(90.0, 0.1, 5.0),
            ),
        ])
    }
}
