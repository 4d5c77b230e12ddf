use serde::{Deserialize, Serialize};

/// Upper bound applied to the device pixel ratio when sizing the render target.
pub const MAX_PIXEL_RATIO: f32 = 2.0;

/// Output surface size as reported by the window collaborator.
///
/// `width`/`height` are logical (device-independent) pixels. The render
/// resolution is derived from them and a capped pixel ratio; it is recomputed
/// on resize, never per frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub device_pixel_ratio: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            device_pixel_ratio: 1.0,
        }
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32, device_pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio,
        }
    }

    /// Build from a physical window size and the window's scale factor.
    pub fn from_physical(width: u32, height: u32, scale_factor: f64) -> Self {
        let dpr = if scale_factor.is_finite() && scale_factor > 0.0 {
            scale_factor as f32
        } else {
            1.0
        };
        Self::new(width as f32 / dpr, height as f32 / dpr, dpr)
    }

    /// Camera aspect ratio. A collapsed (minimised) window yields 1.0.
    pub fn aspect(&self) -> f32 {
        if self.width > 0.0 && self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    pub fn pixel_ratio(&self) -> f32 {
        if self.device_pixel_ratio.is_finite() && self.device_pixel_ratio > 0.0 {
            self.device_pixel_ratio.min(MAX_PIXEL_RATIO)
        } else {
            1.0
        }
    }

    /// Render target size in physical pixels, never zero.
    pub fn render_size(&self) -> (u32, u32) {
        let ratio = self.pixel_ratio();
        let w = (self.width.max(0.0) * ratio).round() as u32;
        let h = (self.height.max(0.0) * ratio).round() as u32;
        (w.max(1), h.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_of_default_viewport() {
        let vp = Viewport::default();
        assert!((vp.aspect() - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn collapsed_viewport_is_safe() {
        let vp = Viewport::new(0.0, 0.0, 1.0);
        assert_eq!(vp.aspect(), 1.0);
        assert_eq!(vp.render_size(), (1, 1));
    }

    #[test]
    fn pixel_ratio_is_capped() {
        let vp = Viewport::new(800.0, 600.0, 3.0);
        assert_eq!(vp.pixel_ratio(), 2.0);
        assert_eq!(vp.render_size(), (1600, 1200));
    }

    #[test]
    fn from_physical_recovers_logical_size() {
        let vp = Viewport::from_physical(2400, 1800, 3.0);
        assert!((vp.width - 800.0).abs() < 1e-3);
        assert!((vp.height - 600.0).abs() < 1e-3);
        assert_eq!(vp.render_size(), (1600, 1200));
    }
}
