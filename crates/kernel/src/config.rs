//! Scene configuration, loadable from JSON.
//!
//! Every field has a default reproducing the demo scene, so a config file
//! only needs to name what it changes.

use serde::{Deserialize, Serialize};
use std::path::Path;
use umbra_common::Color;

use crate::lights::LightRig;

/// Errors from loading or validating a [`SceneConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialConfig {
    pub color: Color,
    pub roughness: f32,
    pub metalness: f32,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            roughness: 0.7,
            metalness: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundConfig {
    pub y: f32,
    pub size: f32,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self { y: -0.5, size: 5.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SphereConfig {
    pub radius: f32,
    pub segments: u32,
}

impl Default for SphereConfig {
    fn default() -> Self {
        Self {
            radius: 0.5,
            segments: 32,
        }
    }
}

/// Initial viewer placement handed to the camera controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub damping: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [1.0, 1.0, 2.0],
            target: [0.0, 0.0, 0.0],
            fov_degrees: 75.0,
            near: 0.1,
            far: 100.0,
            damping: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub lights: LightRig,
    pub material: MaterialConfig,
    pub ground: GroundConfig,
    pub sphere: SphereConfig,
    pub camera: CameraConfig,
    /// Edge length of the square contact-shadow decal.
    pub decal_size: f32,
    pub clear_color: Color,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            lights: LightRig::default(),
            material: MaterialConfig::default(),
            ground: GroundConfig::default(),
            sphere: SphereConfig::default(),
            camera: CameraConfig::default(),
            decal_size: 1.5,
            clear_color: Color::BLACK,
        }
    }
}

impl SceneConfig {
    /// Load a config from a JSON file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        tracing::info!(path = %path.display(), "scene config loaded");
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the scene cannot be built from.
    ///
    /// Shadow frustum anomalies are not checked here: they only
    /// disable the affected shadow map at render time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sphere.radius.is_finite() && self.sphere.radius > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "sphere radius must be positive, got {}",
                self.sphere.radius
            )));
        }
        if self.sphere.segments < 3 {
            return Err(ConfigError::Invalid(format!(
                "sphere needs at least 3 segments, got {}",
                self.sphere.segments
            )));
        }
        if !(self.ground.size.is_finite() && self.ground.size > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "ground size must be positive, got {}",
                self.ground.size
            )));
        }
        if !self.ground.y.is_finite() {
            return Err(ConfigError::Invalid("ground height is not finite".into()));
        }
        if !(self.decal_size.is_finite() && self.decal_size > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "decal size must be positive, got {}",
                self.decal_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lights::LightKind;
    use std::io::Write;

    #[test]
    fn default_matches_demo_scene() {
        let c = SceneConfig::default();
        assert_eq!(c.ground.y, -0.5);
        assert_eq!(c.material.roughness, 0.7);
        assert_eq!(c.camera.fov_degrees, 75.0);
        assert_eq!(c.lights.len(), 4);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn save_and_load() {
        let mut config = SceneConfig::default();
        config.lights.update(LightKind::Ambient, |l| l.intensity = 0.8);
        config.material.metalness = 0.4;

        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(config.to_json().unwrap().as_bytes()).unwrap();

        let loaded = SceneConfig::load(tmp.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(br#"{ "material": { "metalness": 1.0 } }"#)
            .unwrap();

        let loaded = SceneConfig::load(tmp.path()).unwrap();
        assert_eq!(loaded.material.metalness, 1.0);
        assert_eq!(loaded.material.roughness, 0.7);
        assert_eq!(loaded.lights, LightRig::default());
    }

    #[test]
    fn inverted_frustum_is_accepted() {
        let mut config = SceneConfig::default();
        config.lights.update(LightKind::Directional, |l| {
            let s = l.shadow_mut().unwrap();
            s.near = 5.0;
            s.far = 1.0;
        });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invalid_sphere_rejected() {
        let mut config = SceneConfig::default();
        config.sphere.radius = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = SceneConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn malformed_json_is_json_error() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"{ not json").unwrap();
        let err = SceneConfig::load(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
