use std::fmt::Write;
use umbra_kernel::{LightSource, Scene};

use crate::camera::RenderView;
use crate::shadow::ShadowPlan;

/// Everything a renderer consumes for one frame. Read-only.
#[derive(Debug, Clone, Copy)]
pub struct RenderFrame<'a> {
    pub scene: &'a Scene,
    pub view: &'a RenderView,
    pub shadows: &'a ShadowPlan,
    /// Zero-based frame counter of the frame loop.
    pub index: u64,
    pub elapsed_time: f32,
}

/// Failures of the render collaborator. All of them end the frame loop.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("rendering context lost: {0}")]
    ContextLost(String),
    #[error("out of GPU memory")]
    OutOfMemory,
    #[error("surface error: {0}")]
    Surface(String),
    #[error("no compatible GPU adapter found")]
    NoAdapter,
    #[error("device request failed: {0}")]
    Device(String),
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the scene, camera and shadow projections and produces
/// output. It never mutates the scene.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame.
    fn render(&mut self, frame: &RenderFrame<'_>) -> Result<Self::Output, RenderError>;
}

/// Headless renderer producing a human-readable description of each frame.
///
/// Used by the CLI, logging and tests of the frame loop.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    frames: u64,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&mut self, frame: &RenderFrame<'_>) -> Result<String, RenderError> {
        self.frames += 1;
        let scene = frame.scene;
        let view = frame.view;
        let sphere = scene.sphere_position();
        let decal = scene.decal();

        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(
            out,
            "=== Frame {} (t={:.3}s) ===",
            frame.index, frame.elapsed_time
        );
        let _ = writeln!(
            out,
            "Camera: eye=({:.2}, {:.2}, {:.2}) target=({:.2}, {:.2}, {:.2}) fov={:.0}",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.target.x,
            view.target.y,
            view.target.z,
            view.fov_degrees
        );
        let _ = writeln!(
            out,
            "  sphere pos=({:.3}, {:.3}, {:.3})",
            sphere.x, sphere.y, sphere.z
        );
        let d = decal.position();
        let _ = writeln!(
            out,
            "  decal  pos=({:.3}, {:.3}, {:.3}) opacity={:.3}",
            d.x,
            d.y,
            d.z,
            decal.opacity()
        );

        for light in scene.lights.iter() {
            let _ = write!(out, "  light {:<11} intensity={:.3}", light.kind(), light.intensity);
            if !matches!(light.source, LightSource::Ambient) {
                let p = light.position();
                let _ = write!(out, " pos=({:.2}, {:.2}, {:.2})", p.x, p.y, p.z);
            }
            if let Some(shadow) = frame.shadows.get(light.kind()) {
                match &shadow.defect {
                    None => {
                        let _ = write!(
                            out,
                            " shadow={}x{} maps={}",
                            shadow.camera.map_size[0],
                            shadow.camera.map_size[1],
                            shadow.view_projections.len()
                        );
                    }
                    Some(defect) => {
                        let _ = write!(out, " shadow=off ({defect})");
                    }
                }
            }
            out.push('\n');
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use umbra_kernel::LightKind;

    fn render(scene: &Scene) -> String {
        let view = RenderView::default();
        let shadows = ShadowPlan::from_rig(&scene.lights);
        let mut renderer = DebugTextRenderer::new();
        renderer
            .render(&RenderFrame {
                scene,
                view: &view,
                shadows: &shadows,
                index: 0,
                elapsed_time: 0.0,
            })
            .unwrap()
    }

    #[test]
    fn describes_default_scene() {
        let scene = Scene::default();
        let output = render(&scene);
        assert!(output.contains("Frame 0"));
        assert!(output.contains("sphere pos=(1.500, 0.000, 0.000)"));
        assert!(output.contains("opacity=0.300"));
        assert!(output.contains("light ambient"));
        assert!(output.contains("shadow=1024x1024 maps=6"));
    }

    #[test]
    fn reports_disabled_shadow() {
        let mut scene = Scene::default();
        scene.lights.update(LightKind::Point, |l| {
            let s = l.shadow_mut().unwrap();
            s.near = 5.0;
            s.far = 1.0;
        });
        let output = render(&scene);
        assert!(output.contains("shadow=off"));
    }

    #[test]
    fn counts_frames() {
        let scene = Scene::default();
        let view = RenderView::default();
        let shadows = ShadowPlan::from_rig(&scene.lights);
        let mut renderer = DebugTextRenderer::new();
        for index in 0..3 {
            let frame = RenderFrame {
                scene: &scene,
                view: &view,
                shadows: &shadows,
                index,
                elapsed_time: 0.0,
            };
            renderer.render(&frame).unwrap();
        }
        assert_eq!(renderer.frames(), 3);
    }
}
