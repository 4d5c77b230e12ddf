//! Developer tooling: read-only scene inspection for the debug panel and CLI.
//!
//! # Invariants
//! - Tools never mutate the scene.

mod inspector;

pub use inspector::{LightInfo, SceneInspector, SceneSummary, ShadowStatus};
