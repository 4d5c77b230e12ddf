use glam::{Mat4, Vec3};
use umbra_kernel::config::CameraConfig;

/// Camera state handed to a renderer for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default(), 16.0 / 9.0)
    }
}

impl RenderView {
    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        Self {
            eye: Vec3::from_array(config.position),
            target: Vec3::from_array(config.target),
            fov_degrees: config.fov_degrees,
            aspect,
            near: config.near,
            far: config.far,
        }
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.eye).normalize_or_zero()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            self.aspect.max(1e-4),
            self.near,
            self.far,
        )
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// Camera collaborator driven once per frame by the frame loop.
pub trait CameraControls {
    /// Integrate pending input (damping, clamping).
    fn update(&mut self);

    /// Current camera state.
    fn view(&self) -> RenderView;

    /// Keep the projection in step with the viewport; called on resize only.
    fn set_aspect(&mut self, aspect: f32);
}

/// Orbit camera with damped rotation and dolly around a fixed target.
///
/// Input only queues deltas; [`CameraControls::update`] applies a `damping`
/// fraction of the pending delta each frame and decays the rest, so motion
/// eases out over several frames.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub radius: f32,
    /// Azimuth around +Y, measured from +Z towards +X.
    pub theta: f32,
    /// Polar angle from +Y.
    pub phi: f32,
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// Fraction of pending motion applied per update; 1.0 disables damping.
    pub damping: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pending_theta: f32,
    pending_phi: f32,
    pending_scale: f32,
}

const MIN_POLAR: f32 = 1e-6;

impl OrbitCamera {
    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        let target = Vec3::from_array(config.target);
        let offset = Vec3::from_array(config.position) - target;
        let radius = offset.length();
        let (theta, phi) = if radius > 0.0 {
            (
                offset.x.atan2(offset.z),
                (offset.y / radius).clamp(-1.0, 1.0).acos(),
            )
        } else {
            (0.0, std::f32::consts::FRAC_PI_2)
        };
        let damping = if config.damping.is_finite() {
            config.damping.clamp(0.0, 1.0)
        } else {
            1.0
        };

        Self {
            target,
            radius: radius.max(1e-3),
            theta,
            phi,
            fov_degrees: config.fov_degrees,
            aspect,
            near: config.near,
            far: config.far,
            damping,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            pending_theta: 0.0,
            pending_phi: 0.0,
            pending_scale: 1.0,
        }
    }

    /// Queue a rotation from a pointer drag of `dx`/`dy` pixels over a
    /// viewport `viewport_height` pixels tall.
    pub fn rotate(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let height = viewport_height.max(1.0);
        let tau = std::f32::consts::TAU;
        self.pending_theta -= tau * dx / height * self.rotate_speed;
        self.pending_phi -= tau * dy / height * self.rotate_speed;
    }

    /// Queue a dolly; positive steps move towards the target.
    pub fn zoom(&mut self, steps: f32) {
        if steps.is_finite() {
            self.pending_scale *= 0.95_f32.powf(self.zoom_speed * steps);
        }
    }

    pub fn eye(&self) -> Vec3 {
        let sin_phi = self.phi.sin();
        self.target
            + self.radius
                * Vec3::new(
                    sin_phi * self.theta.sin(),
                    self.phi.cos(),
                    sin_phi * self.theta.cos(),
                )
    }

    /// True while queued rotation is still being applied.
    pub fn is_moving(&self) -> bool {
        self.pending_theta.abs() > 1e-6 || self.pending_phi.abs() > 1e-6
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default(), 16.0 / 9.0)
    }
}

impl CameraControls for OrbitCamera {
    fn update(&mut self) {
        let step = if self.damping > 0.0 { self.damping } else { 1.0 };
        self.theta += self.pending_theta * step;
        self.phi = (self.phi + self.pending_phi * step)
            .clamp(MIN_POLAR, std::f32::consts::PI - MIN_POLAR);
        self.radius = (self.radius * self.pending_scale).clamp(
            self.min_distance.max(1e-3),
            self.max_distance.max(1e-3),
        );
        self.pending_scale = 1.0;

        if self.damping > 0.0 && self.damping < 1.0 {
            self.pending_theta *= 1.0 - self.damping;
            self.pending_phi *= 1.0 - self.damping;
        } else {
            self.pending_theta = 0.0;
            self.pending_phi = 0.0;
        }
    }

    fn view(&self) -> RenderView {
        RenderView {
            eye: self.eye(),
            target: self.target,
            fov_degrees: self.fov_degrees,
            aspect: self.aspect,
            near: self.near,
            far: self.far,
        }
    }

    fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_view_is_valid() {
        let view = RenderView::default();
        assert_eq!(view.fov_degrees, 75.0);
        let vp = view.view_projection();
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn orbit_starts_at_configured_eye() {
        let cam = OrbitCamera::default();
        assert!((cam.eye() - Vec3::new(1.0, 1.0, 2.0)).length() < 1e-5);
        assert_eq!(cam.view().target, Vec3::ZERO);
    }

    #[test]
    fn update_without_input_is_stable() {
        let mut cam = OrbitCamera::default();
        let start = cam.eye();
        for _ in 0..100 {
            cam.update();
        }
        assert!((cam.eye() - start).length() < 1e-5);
    }

    #[test]
    fn damped_rotation_eases_towards_full_angle() {
        let mut cam = OrbitCamera::default();
        let start = cam.theta;
        cam.rotate(-100.0, 0.0, 720.0);
        let expected = std::f32::consts::TAU * 100.0 / 720.0;

        cam.update();
        let first = cam.theta - start;
        assert!(first > 0.0 && first < expected * 0.1);

        for _ in 0..1000 {
            cam.update();
        }
        assert!((cam.theta - start - expected).abs() < 1e-3);
        assert!(!cam.is_moving());
    }

    #[test]
    fn polar_angle_is_clamped() {
        let mut cam = OrbitCamera::default();
        cam.damping = 1.0;
        cam.rotate(0.0, 100_000.0, 100.0);
        cam.update();
        assert!(cam.phi >= MIN_POLAR);
        cam.rotate(0.0, -100_000.0, 100.0);
        cam.update();
        assert!(cam.phi <= std::f32::consts::PI);
        assert!(!cam.eye().is_nan());
    }

    #[test]
    fn zoom_moves_towards_target_and_respects_limits() {
        let mut cam = OrbitCamera::default();
        let start = cam.radius;
        cam.zoom(1.0);
        cam.update();
        assert!(cam.radius < start);

        cam.min_distance = 1.0;
        cam.zoom(1_000.0);
        cam.update();
        assert!((cam.radius - 1.0).abs() < 1e-6);
    }

    #[test]
    fn set_aspect_ignores_degenerate_values() {
        let mut cam = OrbitCamera::default();
        cam.set_aspect(2.0);
        assert_eq!(cam.view().aspect, 2.0);
        cam.set_aspect(0.0);
        cam.set_aspect(f32::NAN);
        assert_eq!(cam.view().aspect, 2.0);
    }
}
