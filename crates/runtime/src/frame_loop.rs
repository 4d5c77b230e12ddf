use glam::Vec3;
use std::collections::BTreeSet;
use umbra_kernel::{Clock, LightKind, Scene};
use umbra_render::{CameraControls, RenderError, RenderFrame, Renderer, ShadowPlan};

/// Host hook that re-arms the loop for the next display refresh.
pub trait FrameScheduler {
    fn schedule_next(&mut self);
}

/// Lifecycle of a [`FrameLoop`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopState {
    Running,
    /// Torn down by the host.
    Cancelled,
    /// Stopped after the renderer failed; carries the failure message.
    Failed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("frame loop was cancelled")]
    Cancelled,
    #[error("frame loop stopped after a render failure: {0}")]
    Stopped(String),
    #[error("render failed: {0}")]
    Render(#[from] RenderError),
}

/// What one frame produced.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport<O> {
    pub index: u64,
    pub elapsed_time: f32,
    pub sphere: Vec3,
    pub decal_opacity: f32,
    pub output: O,
}

/// Coordinates one iteration per display refresh.
///
/// The loop owns the simulated clock. Scene, camera controls, renderer and
/// scheduler are passed in per call so each step can be exercised in isolation.
#[derive(Debug)]
pub struct FrameLoop<C> {
    clock: C,
    state: LoopState,
    frames: u64,
    /// Lights whose disabled shadow has already been reported.
    reported: BTreeSet<LightKind>,
}

impl<C: Clock> FrameLoop<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            state: LoopState::Running,
            frames: 0,
            reported: BTreeSet::new(),
        }
    }

    pub fn state(&self) -> &LoopState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Frames rendered successfully.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Stop the loop at teardown. Later ticks do nothing.
    pub fn cancel(&mut self) {
        if self.state == LoopState::Running {
            tracing::info!(frames = self.frames, "frame loop cancelled");
            self.state = LoopState::Cancelled;
        }
    }

    /// Run one frame.
    ///
    /// On success the next frame has been scheduled. On a render failure the
    /// loop moves to [`LoopState::Failed`] and schedules nothing; every later
    /// call returns an error without touching the scene or the renderer.
    pub fn tick<K, R, S>(
        &mut self,
        scene: &mut Scene,
        controls: &mut K,
        renderer: &mut R,
        scheduler: &mut S,
    ) -> Result<FrameReport<R::Output>, FrameError>
    where
        K: CameraControls + ?Sized,
        R: Renderer + ?Sized,
        S: FrameScheduler + ?Sized,
    {
        match &self.state {
            LoopState::Running => {}
            LoopState::Cancelled => return Err(FrameError::Cancelled),
            LoopState::Failed(reason) => return Err(FrameError::Stopped(reason.clone())),
        }

        let elapsed_time = self.clock.elapsed_time();
        // Sphere pose, then the decal from that same pose.
        let sphere = scene.advance(elapsed_time);
        controls.update();

        let view = controls.view();
        let shadows = ShadowPlan::from_rig(&scene.lights);
        self.report_shadow_changes(&shadows);

        let frame = RenderFrame {
            scene,
            view: &view,
            shadows: &shadows,
            index: self.frames,
            elapsed_time,
        };
        let output = match renderer.render(&frame) {
            Ok(output) => output,
            Err(e) => {
                tracing::error!(frame = self.frames, "render failed, stopping frame loop: {e}");
                self.state = LoopState::Failed(e.to_string());
                return Err(e.into());
            }
        };

        let report = FrameReport {
            index: self.frames,
            elapsed_time,
            sphere,
            decal_opacity: scene.decal().opacity(),
            output,
        };
        self.frames += 1;
        scheduler.schedule_next();
        tracing::trace!(frame = report.index, t = elapsed_time, "frame done");
        Ok(report)
    }

    fn report_shadow_changes(&mut self, shadows: &ShadowPlan) {
        for shadow in &shadows.shadows {
            match &shadow.defect {
                Some(defect) => {
                    if self.reported.insert(shadow.kind) {
                        tracing::warn!(light = %shadow.kind, "shadow map disabled: {defect}");
                    }
                }
                None => {
                    if self.reported.remove(&shadow.kind) {
                        tracing::info!(light = %shadow.kind, "shadow map restored");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::f32::consts::FRAC_PI_2;
    use std::rc::Rc;
    use umbra_kernel::{DECAL_BASE_ALPHA, ManualClock, sphere_position};
    use umbra_render::{DebugTextRenderer, OrbitCamera, RenderView};

    #[derive(Default)]
    struct CountingScheduler {
        scheduled: u32,
    }

    impl FrameScheduler for CountingScheduler {
        fn schedule_next(&mut self) {
            self.scheduled += 1;
        }
    }

    /// Renderer that fails once `fail_at` frames have been drawn.
    struct FlakyRenderer {
        drawn: u64,
        fail_at: u64,
    }

    impl Renderer for FlakyRenderer {
        type Output = ();

        fn render(&mut self, _frame: &RenderFrame<'_>) -> Result<(), RenderError> {
            if self.drawn == self.fail_at {
                return Err(RenderError::ContextLost("device removed".into()));
            }
            self.drawn += 1;
            Ok(())
        }
    }

    type Log = Rc<RefCell<Vec<String>>>;

    struct LoggingControls {
        log: Log,
        inner: OrbitCamera,
    }

    impl CameraControls for LoggingControls {
        fn update(&mut self) {
            self.log.borrow_mut().push("controls".into());
            self.inner.update();
        }

        fn view(&self) -> RenderView {
            self.inner.view()
        }

        fn set_aspect(&mut self, aspect: f32) {
            self.inner.set_aspect(aspect);
        }
    }

    struct LoggingRenderer {
        log: Log,
    }

    impl Renderer for LoggingRenderer {
        type Output = ();

        fn render(&mut self, frame: &RenderFrame<'_>) -> Result<(), RenderError> {
            let expected = sphere_position(frame.elapsed_time);
            assert_eq!(frame.scene.sphere_position(), expected);
            assert_eq!(frame.scene.decal().position().x, expected.x);
            assert_eq!(frame.scene.decal().position().z, expected.z);
            self.log.borrow_mut().push("render".into());
            Ok(())
        }
    }

    struct LoggingScheduler {
        log: Log,
    }

    impl FrameScheduler for LoggingScheduler {
        fn schedule_next(&mut self) {
            self.log.borrow_mut().push("schedule".into());
        }
    }

    #[test]
    fn steps_run_in_order() {
        let log: Log = Rc::default();
        let mut frame_loop = FrameLoop::new(ManualClock::starting_at(0.7));
        let mut scene = Scene::default();
        let mut controls = LoggingControls {
            log: log.clone(),
            inner: OrbitCamera::default(),
        };
        let mut renderer = LoggingRenderer { log: log.clone() };
        let mut scheduler = LoggingScheduler { log: log.clone() };

        frame_loop
            .tick(&mut scene, &mut controls, &mut renderer, &mut scheduler)
            .unwrap();
        assert_eq!(*log.borrow(), vec!["controls", "render", "schedule"]);
    }

    #[test]
    fn first_frame_at_time_zero() {
        let mut frame_loop = FrameLoop::new(ManualClock::new());
        let mut scene = Scene::default();
        let report = frame_loop
            .tick(
                &mut scene,
                &mut OrbitCamera::default(),
                &mut DebugTextRenderer::new(),
                &mut CountingScheduler::default(),
            )
            .unwrap();
        assert_eq!(report.index, 0);
        assert_eq!(report.sphere, Vec3::new(1.5, 0.0, 0.0));
        assert_eq!(report.decal_opacity, DECAL_BASE_ALPHA);
        assert!(report.output.contains("Frame 0"));
    }

    #[test]
    fn quarter_turn_frame() {
        let mut frame_loop = FrameLoop::new(ManualClock::starting_at(FRAC_PI_2));
        let mut scene = Scene::default();
        let report = frame_loop
            .tick(
                &mut scene,
                &mut OrbitCamera::default(),
                &mut DebugTextRenderer::new(),
                &mut CountingScheduler::default(),
            )
            .unwrap();
        assert!((report.sphere - Vec3::new(0.0, 1.0, 1.5)).length() < 1e-5);
        assert!(report.decal_opacity < 1e-5);
    }

    #[test]
    fn same_time_gives_same_state() {
        let mut frame_loop = FrameLoop::new(ManualClock::starting_at(1.234));
        let mut scene = Scene::default();
        let mut controls = OrbitCamera::default();
        let mut renderer = DebugTextRenderer::new();
        let mut scheduler = CountingScheduler::default();

        let a = frame_loop
            .tick(&mut scene, &mut controls, &mut renderer, &mut scheduler)
            .unwrap();
        let snapshot = scene.clone();
        let b = frame_loop
            .tick(&mut scene, &mut controls, &mut renderer, &mut scheduler)
            .unwrap();

        assert_eq!(a.sphere, b.sphere);
        assert_eq!(a.decal_opacity, b.decal_opacity);
        assert_eq!(scene, snapshot);
    }

    #[test]
    fn inverted_frustum_survives_a_hundred_frames() {
        let mut scene = Scene::default();
        for kind in [LightKind::Directional, LightKind::Spot, LightKind::Point] {
            scene.lights.update(kind, |l| {
                let s = l.shadow_mut().unwrap();
                s.near = 5.0;
                s.far = 1.0;
            });
        }
        let mut frame_loop = FrameLoop::new(ManualClock::new());
        let mut controls = OrbitCamera::default();
        let mut renderer = DebugTextRenderer::new();
        let mut scheduler = CountingScheduler::default();

        for _ in 0..100 {
            frame_loop.clock_mut().advance(1.0 / 60.0);
            let report = frame_loop
                .tick(&mut scene, &mut controls, &mut renderer, &mut scheduler)
                .unwrap();
            assert!(report.output.contains("shadow=off"));
        }
        assert!(frame_loop.is_running());
        assert_eq!(frame_loop.frames(), 100);
        assert_eq!(scheduler.scheduled, 100);
    }

    #[test]
    fn render_failure_stops_scheduling() {
        let mut frame_loop = FrameLoop::new(ManualClock::new());
        let mut scene = Scene::default();
        let mut controls = OrbitCamera::default();
        let mut renderer = FlakyRenderer {
            drawn: 0,
            fail_at: 2,
        };
        let mut scheduler = CountingScheduler::default();

        for _ in 0..2 {
            frame_loop
                .tick(&mut scene, &mut controls, &mut renderer, &mut scheduler)
                .unwrap();
        }
        let err = frame_loop
            .tick(&mut scene, &mut controls, &mut renderer, &mut scheduler)
            .unwrap_err();
        assert!(matches!(err, FrameError::Render(RenderError::ContextLost(_))));
        assert!(matches!(frame_loop.state(), LoopState::Failed(_)));
        assert_eq!(scheduler.scheduled, 2);

        // No further draw calls once stopped.
        renderer.fail_at = u64::MAX;
        let err = frame_loop
            .tick(&mut scene, &mut controls, &mut renderer, &mut scheduler)
            .unwrap_err();
        assert!(matches!(err, FrameError::Stopped(_)));
        assert_eq!(renderer.drawn, 2);
        assert_eq!(scheduler.scheduled, 2);
    }

    #[test]
    fn cancelled_loop_does_nothing() {
        let mut frame_loop = FrameLoop::new(ManualClock::starting_at(0.5));
        let mut scene = Scene::default();
        let before = scene.clone();
        let mut renderer = DebugTextRenderer::new();
        let mut scheduler = CountingScheduler::default();

        frame_loop.cancel();
        let err = frame_loop
            .tick(
                &mut scene,
                &mut OrbitCamera::default(),
                &mut renderer,
                &mut scheduler,
            )
            .unwrap_err();
        assert!(matches!(err, FrameError::Cancelled));
        assert_eq!(scene, before);
        assert_eq!(renderer.frames(), 0);
        assert_eq!(scheduler.scheduled, 0);
    }

    #[test]
    fn panel_edits_are_read_fresh_each_frame() {
        let mut frame_loop = FrameLoop::new(ManualClock::new());
        let mut scene = Scene::default();
        let mut controls = OrbitCamera::default();
        let mut renderer = DebugTextRenderer::new();
        let mut scheduler = CountingScheduler::default();

        let first = frame_loop
            .tick(&mut scene, &mut controls, &mut renderer, &mut scheduler)
            .unwrap();
        assert!(!first.output.contains("shadow=off"));

        scene.lights.update(LightKind::Spot, |l| {
            l.shadow_mut().unwrap().far = 0.5;
        });
        let second = frame_loop
            .tick(&mut scene, &mut controls, &mut renderer, &mut scheduler)
            .unwrap();
        assert!(second.output.contains("shadow=off"));

        scene.lights.update(LightKind::Spot, |l| {
            l.shadow_mut().unwrap().far = 6.0;
        });
        let third = frame_loop
            .tick(&mut scene, &mut controls, &mut renderer, &mut scheduler)
            .unwrap();
        assert!(!third.output.contains("shadow=off"));
    }
}
