mod panel;
mod presenter;

use anyhow::Result;
use clap::Parser;
use egui::Context as EguiContext;
use panel::PanelState;
use presenter::{Overlay, Presenter, RedrawScheduler};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use umbra_common::Viewport;
use umbra_kernel::{Scene, SceneConfig, SystemClock};
use umbra_render::{CameraControls, OrbitCamera};
use umbra_render_wgpu::{GpuContext, WgpuRenderer};
use umbra_runtime::{FrameError, FrameLoop};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "umbra-desktop", about = "Animated shadow-mapped sphere scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene config (JSON); defaults to the built-in scene
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start with every shadow frustum helper visible
    #[arg(long)]
    show_helpers: bool,
}

/// Scene-side application state.
struct AppState {
    config: SceneConfig,
    scene: Scene,
    camera: OrbitCamera,
    frame_loop: FrameLoop<SystemClock>,
    viewport: Viewport,
    panel: PanelState,
    dragging: bool,
    last_cursor: Option<(f64, f64)>,
}

impl AppState {
    fn new(config: SceneConfig, show_helpers: bool) -> Self {
        let mut scene = Scene::from_config(&config);
        if show_helpers {
            scene.lights.set_helpers_visible(true);
        }
        let viewport = Viewport::default();
        let camera = OrbitCamera::from_config(&config.camera, viewport.aspect());
        Self {
            config,
            scene,
            camera,
            frame_loop: FrameLoop::new(SystemClock::new()),
            viewport,
            panel: PanelState {
                visible: true,
                ..PanelState::default()
            },
            dragging: false,
            last_cursor: None,
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::F1 => self.panel.visible = !self.panel.visible,
            KeyCode::KeyH => {
                let visible = !self
                    .scene
                    .lights
                    .shadow_casters()
                    .any(|(_, shadow)| shadow.helper_visible);
                self.scene.lights.set_helpers_visible(visible);
            }
            _ => {}
        }
    }

    fn handle_cursor(&mut self, x: f64, y: f64, window_height: u32) {
        if let (true, Some((lx, ly))) = (self.dragging, self.last_cursor) {
            self.camera
                .rotate((x - lx) as f32, (y - ly) as f32, window_height as f32);
        }
        self.last_cursor = Some((x, y));
    }
}

/// GPU resources, created once the window exists.
struct GpuState {
    window: Arc<Window>,
    context: GpuContext,
    renderer: WgpuRenderer,
    overlay: Overlay,
    egui_winit: egui_winit::State,
}

struct DesktopApp {
    state: AppState,
    gpu: Option<GpuState>,
    egui_ctx: EguiContext,
    fatal: Option<anyhow::Error>,
}

impl DesktopApp {
    fn new(config: SceneConfig, show_helpers: bool) -> Self {
        Self {
            state: AppState::new(config, show_helpers),
            gpu: None,
            egui_ctx: EguiContext::default(),
            fatal: None,
        }
    }

    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> Result<GpuState> {
        let attrs = Window::default_attributes()
            .with_title("Umbra")
            .with_inner_size(LogicalSize::new(1280.0, 720.0));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let size = window.inner_size();
        self.state.viewport = Viewport::from_physical(size.width, size.height, window.scale_factor());
        let (width, height) = self.state.viewport.render_size();

        let context = GpuContext::new(window.clone(), width, height)?;
        let renderer = WgpuRenderer::new(
            &context.device,
            context.format(),
            width,
            height,
            &self.state.scene,
            self.state.config.clear_color,
        );
        let overlay = Overlay::new(&context.device, context.format());
        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        self.state.camera.set_aspect(self.state.viewport.aspect());
        tracing::info!(
            width,
            height,
            pixel_ratio = self.state.viewport.pixel_ratio(),
            "window ready"
        );

        Ok(GpuState {
            window,
            context,
            renderer,
            overlay,
            egui_winit,
        })
    }

    fn resize(&mut self, width: u32, height: u32, scale_factor: f64) {
        self.state.viewport = Viewport::from_physical(width, height, scale_factor);
        self.state.camera.set_aspect(self.state.viewport.aspect());
        let (w, h) = self.state.viewport.render_size();
        if let Some(gpu) = &mut self.gpu {
            gpu.context.resize(w, h);
            gpu.renderer.resize(&gpu.context.device, w, h);
        }
        tracing::debug!(w, h, "resized");
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };
        let state = &mut self.state;

        // UI first so panel edits land in this frame.
        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            panel::draw(ctx, &state.panel, &mut state.scene, &state.camera);
        });
        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);
        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        gpu.overlay.prepare(
            &gpu.context,
            paint_jobs,
            full_output.textures_delta,
            state.viewport.pixel_ratio(),
        );

        let mut presenter = Presenter {
            gpu: &mut gpu.context,
            scene_renderer: &mut gpu.renderer,
            overlay: &mut gpu.overlay,
        };
        let mut scheduler = RedrawScheduler(&gpu.window);
        match state.frame_loop.tick(
            &mut state.scene,
            &mut state.camera,
            &mut presenter,
            &mut scheduler,
        ) {
            Ok(report) => {
                state.panel.elapsed_time = report.elapsed_time;
                state.panel.frames = report.index + 1;
            }
            Err(FrameError::Cancelled) => {}
            Err(e) => {
                tracing::error!("frame loop stopped: {e}");
                self.fatal = Some(e.into());
                event_loop.exit();
            }
        }
    }
}

impl ApplicationHandler for DesktopApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match self.init_gpu(event_loop) {
            Ok(gpu) => {
                gpu.window.request_redraw();
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("failed to initialise rendering: {e:#}");
                self.fatal = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                self.state.frame_loop.cancel();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                let scale = self
                    .gpu
                    .as_ref()
                    .map(|gpu| gpu.window.scale_factor())
                    .unwrap_or(1.0);
                self.resize(size.width, size.height, scale);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(size) = self.gpu.as_ref().map(|gpu| gpu.window.inner_size()) {
                    self.resize(size.width, size.height, scale_factor);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                self.state.handle_key(key);
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: btn_state,
                ..
            } => {
                self.state.dragging = btn_state == ElementState::Pressed;
            }
            WindowEvent::CursorMoved { position, .. } => {
                let height = self
                    .gpu
                    .as_ref()
                    .map(|gpu| gpu.window.inner_size().height)
                    .unwrap_or(1);
                self.state.handle_cursor(position.x, position.y, height);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => (p.y / 50.0) as f32,
                };
                self.state.camera.zoom(steps);
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("umbra-desktop starting");

    let config = match &cli.config {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::default(),
    };

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = DesktopApp::new(config, cli.show_helpers);
    event_loop.run_app(&mut app)?;

    match app.fatal.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
