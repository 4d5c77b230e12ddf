use std::sync::{Arc, Mutex};
use umbra_render::RenderError;

/// What to do after the surface refused to hand out a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceRecovery {
    /// Configure the surface again and skip this frame.
    Reconfigure,
    /// Skip this frame only.
    Skip,
}

/// Classify a surface error. Unrecoverable errors come back as `Err`.
pub fn recovery_for(error: &wgpu::SurfaceError) -> Result<SurfaceRecovery, RenderError> {
    match error {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => Ok(SurfaceRecovery::Reconfigure),
        wgpu::SurfaceError::Timeout => Ok(SurfaceRecovery::Skip),
        wgpu::SurfaceError::OutOfMemory => Err(RenderError::OutOfMemory),
        other => Err(RenderError::Surface(other.to_string())),
    }
}

/// Surface, device and queue of one window.
pub struct GpuContext {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    adapter_info: wgpu::AdapterInfo,
    lost: Arc<Mutex<Option<String>>>,
}

impl GpuContext {
    /// Create a context drawing into `target`, sized in physical pixels.
    pub fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<Self, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(target)
            .map_err(|e| RenderError::Surface(e.to_string()))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or(RenderError::NoAdapter)?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("umbra_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .map_err(|e| RenderError::Device(e.to_string()))?;

        let lost = Arc::new(Mutex::new(None));
        let flag = Arc::clone(&lost);
        device.set_device_lost_callback(move |reason, message| {
            tracing::error!(?reason, "GPU device lost: {message}");
            if let Ok(mut slot) = flag.lock() {
                slot.get_or_insert(format!("{reason:?}: {message}"));
            }
        });
        device.on_uncaptured_error(Box::new(|e| {
            tracing::error!("wgpu error: {e}");
        }));

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| RenderError::Surface("surface reports no formats".into()))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let adapter_info = adapter.get_info();
        tracing::info!(
            backend = adapter_info.backend.to_str(),
            adapter = %adapter_info.name,
            format = ?surface_format,
            "GPU initialized"
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            adapter_info,
            lost,
        })
    }

    pub fn adapter_info(&self) -> &wgpu::AdapterInfo {
        &self.adapter_info
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Reconfigure the surface for a new physical size. Zero sizes are raised to 1.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
    }

    /// Error if the device has been lost since creation.
    pub fn check_lost(&self) -> Result<(), RenderError> {
        let reason = self.lost.lock().ok().and_then(|slot| slot.clone());
        match reason {
            Some(reason) => Err(RenderError::ContextLost(reason)),
            None => Ok(()),
        }
    }

    /// Next swapchain texture, or `None` when this frame should be skipped.
    pub fn acquire(&mut self) -> Result<Option<wgpu::SurfaceTexture>, RenderError> {
        self.check_lost()?;
        match self.surface.get_current_texture() {
            Ok(frame) => Ok(Some(frame)),
            Err(e) => match recovery_for(&e)? {
                SurfaceRecovery::Reconfigure => {
                    tracing::debug!("surface {e}; reconfiguring");
                    self.surface.configure(&self.device, &self.config);
                    Ok(None)
                }
                SurfaceRecovery::Skip => {
                    tracing::warn!("surface {e}; skipping frame");
                    Ok(None)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_surfaces_are_reconfigured() {
        assert_eq!(
            recovery_for(&wgpu::SurfaceError::Lost).unwrap(),
            SurfaceRecovery::Reconfigure
        );
        assert_eq!(
            recovery_for(&wgpu::SurfaceError::Outdated).unwrap(),
            SurfaceRecovery::Reconfigure
        );
    }

    #[test]
    fn timeout_skips_the_frame() {
        assert_eq!(
            recovery_for(&wgpu::SurfaceError::Timeout).unwrap(),
            SurfaceRecovery::Skip
        );
    }

    #[test]
    fn out_of_memory_is_fatal() {
        assert!(matches!(
            recovery_for(&wgpu::SurfaceError::OutOfMemory),
            Err(RenderError::OutOfMemory)
        ));
    }
}
