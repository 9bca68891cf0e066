//! wgpu resource factory.
//!
//! Textures are created inside error scopes so that an out-of-memory
//! condition comes back as a [`BackendError`] instead of an uncaptured error
//! on the device.

mod conversion;

use std::sync::Arc;

use self::conversion::{convert_texture_aspect, convert_texture_format, convert_texture_usage};
use super::{BackendError, ImageRequest, ResourceFactory};

/// A pooled wgpu texture with its default view.
#[derive(Debug)]
pub struct WgpuImage {
    /// The texture.
    pub texture: wgpu::Texture,
    /// View over the descriptor's aspects.
    pub view: wgpu::TextureView,
}

/// Creates pooled textures on a wgpu device.
pub struct WgpuImageFactory {
    device: Arc<wgpu::Device>,
}

impl std::fmt::Debug for WgpuImageFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WgpuImageFactory").finish_non_exhaustive()
    }
}

impl WgpuImageFactory {
    /// Create a factory on `device`.
    pub fn new(device: Arc<wgpu::Device>) -> Self {
        Self { device }
    }

    /// Get the backend name.
    pub fn name(&self) -> &'static str {
        "wgpu Backend"
    }
}

impl ResourceFactory for WgpuImageFactory {
    type Image = WgpuImage;

    fn create_image(&mut self, request: &ImageRequest) -> Result<WgpuImage, BackendError> {
        let descriptor = &request.descriptor;
        let (dimension, view_dimension) = if request.extent.depth > 1 {
            (wgpu::TextureDimension::D3, wgpu::TextureViewDimension::D3)
        } else {
            (wgpu::TextureDimension::D2, wgpu::TextureViewDimension::D2)
        };

        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(request.label.as_str()),
            size: wgpu::Extent3d {
                width: request.extent.width,
                height: request.extent.height,
                depth_or_array_layers: request.extent.depth.max(1),
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension,
            format: convert_texture_format(descriptor.format),
            usage: convert_texture_usage(descriptor.usage),
            view_formats: &[],
        });

        let validation = pollster::block_on(self.device.pop_error_scope());
        let out_of_memory = pollster::block_on(self.device.pop_error_scope());

        if let Some(error) = out_of_memory {
            log::warn!("wgpu: out of memory creating {:?}: {}", request.label, error);
            texture.destroy();
            return Err(BackendError::OutOfMemory);
        }
        if let Some(error) = validation {
            texture.destroy();
            return Err(BackendError::ResourceCreationFailed(error.to_string()));
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(request.label.as_str()),
            dimension: Some(view_dimension),
            aspect: convert_texture_aspect(descriptor.aspect),
            ..Default::default()
        });

        log::trace!(
            "wgpu: created texture {:?} ({}x{}x{}, frame {})",
            request.label,
            request.extent.width,
            request.extent.height,
            request.extent.depth,
            request.frame_index
        );

        Ok(WgpuImage { texture, view })
    }

    fn destroy_image(&mut self, image: WgpuImage) {
        log::trace!("wgpu: destroying texture");
        image.texture.destroy();
    }
}
