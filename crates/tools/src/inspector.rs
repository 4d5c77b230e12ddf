use glam::Vec3;
use std::fmt;
use umbra_kernel::{LightKind, Scene};
use umbra_render::ShadowPlan;

/// Scene inspector for developer tooling.
///
/// Provides read-only queries against the scene state for debugging and the
/// development UI.
pub struct SceneInspector;

impl SceneInspector {
    /// Produce a summary of the scene at `elapsed_time`.
    pub fn summary(scene: &Scene, elapsed_time: f32) -> SceneSummary {
        let plan = ShadowPlan::from_rig(&scene.lights);
        SceneSummary {
            elapsed_time,
            sphere: scene.sphere_position(),
            decal_position: scene.decal().position(),
            decal_opacity: scene.decal().opacity(),
            lights: scene
                .lights
                .iter()
                .filter_map(|l| Self::describe(l.kind(), scene, &plan))
                .collect(),
        }
    }

    /// Details of one light, if the rig has it.
    pub fn inspect_light(scene: &Scene, kind: LightKind) -> Option<LightInfo> {
        Self::describe(kind, scene, &ShadowPlan::from_rig(&scene.lights))
    }

    fn describe(kind: LightKind, scene: &Scene, plan: &ShadowPlan) -> Option<LightInfo> {
        let light = scene.lights.get(kind)?;
        let shadow = match plan.get(kind) {
            None => ShadowStatus::None,
            Some(s) => match &s.defect {
                Some(defect) => ShadowStatus::Disabled(defect.to_string()),
                None => ShadowStatus::Active {
                    map_size: s.camera.map_size,
                    maps: s.view_projections.len(),
                    helper_visible: s.camera.helper_visible,
                },
            },
        };
        Some(LightInfo {
            kind,
            intensity: light.intensity,
            position: light.position(),
            shadow,
        })
    }
}

/// Shadow state of a light.
#[derive(Debug, Clone, PartialEq)]
pub enum ShadowStatus {
    /// The light casts no shadow.
    None,
    Active {
        map_size: [u32; 2],
        maps: usize,
        helper_visible: bool,
    },
    /// Degenerate frustum; carries the reason.
    Disabled(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LightInfo {
    pub kind: LightKind,
    pub intensity: f32,
    pub position: Vec3,
    pub shadow: ShadowStatus,
}

impl fmt::Display for LightInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<11} intensity={:.2}", self.kind, self.intensity)?;
        if self.kind != LightKind::Ambient {
            let p = self.position;
            write!(f, " pos=({:.2}, {:.2}, {:.2})", p.x, p.y, p.z)?;
        }
        match &self.shadow {
            ShadowStatus::None => Ok(()),
            ShadowStatus::Active {
                map_size,
                maps,
                helper_visible,
            } => {
                write!(f, " shadow={}x{}x{}", map_size[0], map_size[1], maps)?;
                if *helper_visible {
                    f.write_str(" helper")?;
                }
                Ok(())
            }
            ShadowStatus::Disabled(reason) => write!(f, " shadow=off ({reason})"),
        }
    }
}

/// Summary of scene state for the inspector.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSummary {
    pub elapsed_time: f32,
    pub sphere: Vec3,
    pub decal_position: Vec3,
    pub decal_opacity: f32,
    pub lights: Vec<LightInfo>,
}

impl SceneSummary {
    pub fn active_shadows(&self) -> usize {
        self.lights
            .iter()
            .filter(|l| matches!(l.shadow, ShadowStatus::Active { .. }))
            .count()
    }

    pub fn disabled_shadows(&self) -> usize {
        self.lights
            .iter()
            .filter(|l| matches!(l.shadow, ShadowStatus::Disabled(_)))
            .count()
    }
}

impl fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Scene: t={:.3}s sphere=({:.3}, {:.3}, {:.3}) decal_opacity={:.3} shadows={}/{}",
            self.elapsed_time,
            self.sphere.x,
            self.sphere.y,
            self.sphere.z,
            self.decal_opacity,
            self.active_shadows(),
            self.active_shadows() + self.disabled_shadows(),
        )?;
        for light in &self.lights {
            writeln!(f, "  {light}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_default_scene() {
        let scene = Scene::default();
        let summary = SceneInspector::summary(&scene, 0.0);
        assert_eq!(summary.sphere, Vec3::new(1.5, 0.0, 0.0));
        assert_eq!(summary.decal_opacity, 0.3);
        assert_eq!(summary.lights.len(), 4);
        assert_eq!(summary.active_shadows(), 3);
        assert_eq!(summary.disabled_shadows(), 0);
    }

    #[test]
    fn summary_tracks_advanced_scene() {
        let mut scene = Scene::default();
        scene.advance(std::f32::consts::FRAC_PI_2);
        let summary = SceneInspector::summary(&scene, std::f32::consts::FRAC_PI_2);
        assert!((summary.sphere.y - 1.0).abs() < 1e-5);
        assert_eq!(summary.decal_position.x, summary.sphere.x);
        assert_eq!(summary.decal_position.z, summary.sphere.z);
        assert!(summary.decal_opacity < 1e-5);
    }

    #[test]
    fn inspect_light_reports_disabled_shadow() {
        let mut scene = Scene::default();
        scene.lights.update(LightKind::Spot, |l| {
            let s = l.shadow_mut().unwrap();
            s.near = 5.0;
            s.far = 1.0;
        });
        let info = SceneInspector::inspect_light(&scene, LightKind::Spot).unwrap();
        assert!(matches!(info.shadow, ShadowStatus::Disabled(_)));
        assert!(info.to_string().contains("shadow=off"));
    }

    #[test]
    fn ambient_has_no_shadow() {
        let scene = Scene::default();
        let info = SceneInspector::inspect_light(&scene, LightKind::Ambient).unwrap();
        assert_eq!(info.shadow, ShadowStatus::None);
        assert!(!info.to_string().contains("pos="));
    }

    #[test]
    fn point_light_reports_six_maps() {
        let scene = Scene::default();
        let info = SceneInspector::inspect_light(&scene, LightKind::Point).unwrap();
        assert!(matches!(info.shadow, ShadowStatus::Active { maps: 6, .. }));
    }

    #[test]
    fn summary_display() {
        let summary = SceneInspector::summary(&Scene::default(), 0.0);
        let s = format!("{summary}");
        assert!(s.contains("t=0.000s"));
        assert!(s.contains("shadows=3/3"));
        assert!(s.contains("directional"));
    }
}
