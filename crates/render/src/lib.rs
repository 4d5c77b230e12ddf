//! Rendering Adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers read the scene; they never mutate it.
//! - Shadow projections are re-derived from the light rig every frame.
//! - A light whose frustum is unusable gets an empty shadow, never an error.
//!
//! The GPU backend lives in `umbra-render-wgpu`; [`DebugTextRenderer`] is the
//! headless implementation used by the CLI and by tests.

mod camera;
mod renderer;
mod shadow;

pub use camera::{CameraControls, OrbitCamera, RenderView};
pub use renderer::{DebugTextRenderer, RenderError, RenderFrame, Renderer};
pub use shadow::{LightShadow, POINT_SHADOW_FACES, ShadowDefect, ShadowPlan};

pub fn crate_info() -> &'static str {
    "umbra-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
