//! wgpu render backend for the shadow demo.
//!
//! Renders depth maps for the directional, spot and point lights (the point
//! light as six faces of a 2D array), then the lit plane and sphere, optional
//! shadow frustum helpers and the alpha-blended shadow decal.
//!
//! # Invariants
//! - Renderer never mutates scene state.
//! - A light whose shadow frustum is degenerate renders without a shadow;
//!   nothing here fails because of scene parameters.
//! - Surface loss is recovered by reconfiguring; device loss is reported as
//!   [`umbra_render::RenderError::ContextLost`].

mod context;
mod gpu;
mod mesh;
mod shaders;
mod shadow_maps;
mod uniforms;

pub use context::{GpuContext, SurfaceRecovery, recovery_for};
pub use gpu::WgpuRenderer;
