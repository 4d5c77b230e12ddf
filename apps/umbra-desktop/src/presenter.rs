use umbra_render::{RenderError, RenderFrame, Renderer};
use umbra_render_wgpu::{GpuContext, WgpuRenderer};
use umbra_runtime::FrameScheduler;
use winit::window::Window;

/// egui paint state carried from the UI pass to the next present.
pub struct Overlay {
    renderer: egui_wgpu::Renderer,
    paint_jobs: Vec<egui::ClippedPrimitive>,
    screen: Option<egui_wgpu::ScreenDescriptor>,
    pending_free: Vec<egui::TextureId>,
}

impl Overlay {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        Self {
            renderer: egui_wgpu::Renderer::new(device, format, None, 1, false),
            paint_jobs: Vec::new(),
            screen: None,
            pending_free: Vec::new(),
        }
    }

    /// Upload texture changes now and keep the primitives for [`Overlay::paint`].
    ///
    /// Textures are uploaded even if the frame is later skipped, so egui's
    /// atlas never falls out of step.
    pub fn prepare(
        &mut self,
        gpu: &GpuContext,
        paint_jobs: Vec<egui::ClippedPrimitive>,
        textures_delta: egui::TexturesDelta,
        pixels_per_point: f32,
    ) {
        for id in self.pending_free.drain(..) {
            self.renderer.free_texture(&id);
        }
        for (id, image_delta) in &textures_delta.set {
            self.renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        self.pending_free = textures_delta.free;
        let (width, height) = gpu.size();
        self.screen = Some(egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point,
        });
        self.paint_jobs = paint_jobs;
    }

    fn paint(&mut self, gpu: &GpuContext, view: &wgpu::TextureView) {
        let Some(screen) = self.screen.take() else {
            return;
        };
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &self.paint_jobs,
            &screen,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.renderer.render(&mut pass, &self.paint_jobs, &screen);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        self.paint_jobs.clear();
    }
}

/// Render collaborator of the desktop frame loop: scene, overlay, present.
pub struct Presenter<'a> {
    pub gpu: &'a mut GpuContext,
    pub scene_renderer: &'a mut WgpuRenderer,
    pub overlay: &'a mut Overlay,
}

impl Renderer for Presenter<'_> {
    /// Whether a frame reached the screen.
    type Output = bool;

    fn render(&mut self, frame: &RenderFrame<'_>) -> Result<bool, RenderError> {
        let Some(output) = self.gpu.acquire()? else {
            return Ok(false);
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.scene_renderer
            .draw(&self.gpu.device, &self.gpu.queue, &view, frame);
        self.overlay.paint(&*self.gpu, &view);
        output.present();
        // Device loss is reported asynchronously; surface it on the frame it happened.
        self.gpu.check_lost()?;
        Ok(true)
    }
}

/// Re-arms the loop for the next display refresh.
pub struct RedrawScheduler<'a>(pub &'a Window);

impl FrameScheduler for RedrawScheduler<'_> {
    fn schedule_next(&mut self) {
        self.0.request_redraw();
    }
}
