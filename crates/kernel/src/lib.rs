//! Scene kernel: the state the frame loop mutates and the renderer reads.
//!
//! # Invariants
//! - The sphere pose is a pure function of elapsed simulated time.
//! - The shadow decal's x/z equal the sphere's x/z after every `Scene::advance`.
//! - Decal opacity stays within `[0, DECAL_BASE_ALPHA]` for any sphere height.
//! - Shadow frustum anomalies never fail; they only disable that light's shadow.

pub mod animation;
pub mod clock;
pub mod config;
pub mod decal;
pub mod lights;
pub mod scene;

pub use animation::sphere_position;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, SceneConfig};
pub use decal::{DECAL_BASE_ALPHA, DECAL_OFFSET, ShadowDecal, decal_opacity};
pub use lights::{
    FrustumDefect, Light, LightKind, LightRig, LightSource, ShadowCamera, ShadowProjection,
};
pub use scene::{Geometry, Material, MaterialId, ObjectKind, Renderable, Scene};
