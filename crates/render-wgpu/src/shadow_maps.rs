use crate::uniforms::ShadowPassUniforms;
use bytemuck::Zeroable;
use umbra_kernel::LightKind;
use umbra_render::{POINT_SHADOW_FACES, ShadowPlan};
use wgpu::util::DeviceExt;

pub(crate) const SHADOW_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Layers rendered per frame: directional, spot, then the point light's faces.
pub(crate) const SHADOW_LAYERS: usize = 2 + POINT_SHADOW_FACES;

/// First entry in [`ShadowMaps::layers`] for a light kind.
pub(crate) fn first_layer(kind: LightKind) -> Option<usize> {
    match kind {
        LightKind::Directional => Some(0),
        LightKind::Spot => Some(1),
        LightKind::Point => Some(2),
        LightKind::Ambient => None,
    }
}

/// Map size actually allocated: at least 1 texel, at most the device limit.
pub(crate) fn allocated_size(requested: [u32; 2], max_dimension: u32) -> [u32; 2] {
    requested.map(|v| v.clamp(1, max_dimension.max(1)))
}

/// Depth texture backing one light.
pub(crate) struct ShadowTarget {
    size: [u32; 2],
    /// Whole-texture view for sampling (2D, or 2D array for the point light).
    pub sample_view: wgpu::TextureView,
    /// One attachment view per layer.
    pub layer_views: Vec<wgpu::TextureView>,
}

impl ShadowTarget {
    fn new(device: &wgpu::Device, label: &str, size: [u32; 2], layers: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size[0],
                height: size[1],
                depth_or_array_layers: layers,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SHADOW_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let sample_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(label),
            dimension: Some(if layers > 1 {
                wgpu::TextureViewDimension::D2Array
            } else {
                wgpu::TextureViewDimension::D2
            }),
            array_layer_count: Some(layers),
            ..Default::default()
        });
        let layer_views = (0..layers)
            .map(|layer| {
                texture.create_view(&wgpu::TextureViewDescriptor {
                    label: Some(label),
                    dimension: Some(wgpu::TextureViewDimension::D2),
                    base_array_layer: layer,
                    array_layer_count: Some(1),
                    ..Default::default()
                })
            })
            .collect();
        Self {
            size,
            sample_view,
            layer_views,
        }
    }
}

/// Uniform buffer and bind group of one shadow layer.
pub(crate) struct ShadowLayer {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

/// Shadow depth textures of the three shadow-casting lights.
pub(crate) struct ShadowMaps {
    pub directional: ShadowTarget,
    pub spot: ShadowTarget,
    pub point: ShadowTarget,
    pub sampler: wgpu::Sampler,
    pub layer_layout: wgpu::BindGroupLayout,
    pub layers: Vec<ShadowLayer>,
    max_dimension: u32,
}

impl ShadowMaps {
    pub fn new(device: &wgpu::Device, plan: &ShadowPlan) -> Self {
        let max_dimension = device.limits().max_texture_dimension_2d;
        let size_for = |kind: LightKind| {
            let requested = plan
                .get(kind)
                .map(|s| s.camera.map_size)
                .unwrap_or([1, 1]);
            allocated_size(requested, max_dimension)
        };

        let layer_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("shadow_layer_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let layers = (0..SHADOW_LAYERS)
            .map(|_| {
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("shadow_layer_buffer"),
                    contents: bytemuck::bytes_of(&ShadowPassUniforms::zeroed()),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("shadow_layer_bind_group"),
                    layout: &layer_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    }],
                });
                ShadowLayer { buffer, bind_group }
            })
            .collect();

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("shadow_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        Self {
            directional: ShadowTarget::new(
                device,
                "directional_shadow_map",
                size_for(LightKind::Directional),
                1,
            ),
            spot: ShadowTarget::new(device, "spot_shadow_map", size_for(LightKind::Spot), 1),
            point: ShadowTarget::new(
                device,
                "point_shadow_map",
                size_for(LightKind::Point),
                POINT_SHADOW_FACES as u32,
            ),
            sampler,
            layer_layout,
            layers,
            max_dimension,
        }
    }

    pub fn target(&self, kind: LightKind) -> Option<&ShadowTarget> {
        match kind {
            LightKind::Directional => Some(&self.directional),
            LightKind::Spot => Some(&self.spot),
            LightKind::Point => Some(&self.point),
            LightKind::Ambient => None,
        }
    }

    /// Reallocate maps whose configured size changed. Returns true when any
    /// texture was replaced, so sampling bind groups must be rebuilt.
    pub fn sync_sizes(&mut self, device: &wgpu::Device, plan: &ShadowPlan) -> bool {
        let mut changed = false;
        for shadow in plan.active() {
            let size = allocated_size(shadow.camera.map_size, self.max_dimension);
            if size != shadow.camera.map_size {
                tracing::warn!(
                    light = %shadow.kind,
                    requested = ?shadow.camera.map_size,
                    allocated = ?size,
                    "shadow map size clamped to device limit"
                );
            }
            let (slot, label, layers) = match shadow.kind {
                LightKind::Directional => (&mut self.directional, "directional_shadow_map", 1),
                LightKind::Spot => (&mut self.spot, "spot_shadow_map", 1),
                LightKind::Point => (
                    &mut self.point,
                    "point_shadow_map",
                    POINT_SHADOW_FACES as u32,
                ),
                LightKind::Ambient => continue,
            };
            if slot.size != size {
                tracing::debug!(light = %shadow.kind, ?size, "reallocating shadow map");
                *slot = ShadowTarget::new(device, label, size, layers);
                changed = true;
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layers_are_disjoint_per_light() {
        assert_eq!(first_layer(LightKind::Directional), Some(0));
        assert_eq!(first_layer(LightKind::Spot), Some(1));
        let point = first_layer(LightKind::Point).unwrap();
        assert_eq!(point + POINT_SHADOW_FACES, SHADOW_LAYERS);
        assert_eq!(first_layer(LightKind::Ambient), None);
    }

    #[test]
    fn allocation_respects_device_limit() {
        assert_eq!(allocated_size([1024, 1024], 8192), [1024, 1024]);
        assert_eq!(allocated_size([16384, 512], 8192), [8192, 512]);
        assert_eq!(allocated_size([0, 0], 8192), [1, 1]);
    }
}
