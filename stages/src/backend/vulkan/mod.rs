//! Vulkan resource factory using ash.
//!
//! Images are created with optimal tiling in device-local memory handed out
//! by `gpu-allocator`. Each image gets a view covering all its aspects.
//!
//! The factory does not own the device or the allocator: the engine creates
//! both and shares them with the rest of the renderer.

mod conversion;

use std::sync::Arc;

use ash::vk;
use gpu_allocator::AllocationError;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme, Allocator};
use parking_lot::Mutex;

use self::conversion::{
    convert_result, convert_texture_aspect, convert_texture_format, convert_texture_usage,
};
use super::{BackendError, ImageRequest, ResourceFactory};

/// A pooled Vulkan image.
pub struct VulkanImage {
    /// Image handle.
    pub image: vk::Image,
    /// View over every aspect of the image.
    pub view: vk::ImageView,
    /// Native format.
    pub format: vk::Format,
    /// Native extent.
    pub extent: vk::Extent3D,
    allocation: Option<Allocation>,
}

impl std::fmt::Debug for VulkanImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VulkanImage")
            .field("image", &self.image)
            .field("view", &self.view)
            .field("format", &self.format)
            .field("extent", &self.extent)
            .finish_non_exhaustive()
    }
}

/// Creates pooled images on a Vulkan device.
pub struct VulkanImageFactory {
    device: ash::Device,
    allocator: Arc<Mutex<Allocator>>,
}

impl VulkanImageFactory {
    /// Create a factory for `device`, allocating from `allocator`.
    pub fn new(device: ash::Device, allocator: Arc<Mutex<Allocator>>) -> Self {
        Self { device, allocator }
    }

    /// Get the backend name.
    pub fn name(&self) -> &'static str {
        "Vulkan Backend"
    }

    fn free_allocation(&self, allocation: Allocation) {
        if let Err(e) = self.allocator.lock().free(allocation) {
            log::error!("Failed to free image memory: {}", e);
        }
    }
}

impl ResourceFactory for VulkanImageFactory {
    type Image = VulkanImage;

    fn create_image(&mut self, request: &ImageRequest) -> Result<VulkanImage, BackendError> {
        let descriptor = &request.descriptor;
        let format = convert_texture_format(descriptor.format);
        let usage = convert_texture_usage(descriptor.usage, descriptor.format);

        let (image_type, view_type) = if request.extent.depth > 1 {
            (vk::ImageType::TYPE_3D, vk::ImageViewType::TYPE_3D)
        } else {
            (vk::ImageType::TYPE_2D, vk::ImageViewType::TYPE_2D)
        };
        let extent = vk::Extent3D {
            width: request.extent.width,
            height: request.extent.height,
            depth: request.extent.depth.max(1),
        };

        let image_info = vk::ImageCreateInfo::default()
            .image_type(image_type)
            .format(format)
            .extent(extent)
            .mip_levels(1)
            .array_layers(1)
            .samples(vk::SampleCountFlags::TYPE_1)
            .tiling(vk::ImageTiling::OPTIMAL)
            .usage(usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .initial_layout(vk::ImageLayout::UNDEFINED);

        let image = unsafe { self.device.create_image(&image_info, None) }
            .map_err(|e| convert_result(e, "failed to create image"))?;

        let mem_requirements = unsafe { self.device.get_image_memory_requirements(image) };

        let allocation = self
            .allocator
            .lock()
            .allocate(&AllocationCreateDesc {
                name: &request.label,
                requirements: mem_requirements,
                location: gpu_allocator::MemoryLocation::GpuOnly,
                linear: false,
                allocation_scheme: AllocationScheme::GpuAllocatorManaged,
            })
            .map_err(|e| match e {
                AllocationError::OutOfMemory => BackendError::OutOfMemory,
                other => BackendError::ResourceCreationFailed(format!(
                    "failed to allocate image memory: {}",
                    other
                )),
            });
        let allocation = match allocation {
            Ok(allocation) => allocation,
            Err(e) => {
                unsafe { self.device.destroy_image(image, None) };
                return Err(e);
            }
        };

        if let Err(e) = unsafe {
            self.device
                .bind_image_memory(image, allocation.memory(), allocation.offset())
        } {
            unsafe { self.device.destroy_image(image, None) };
            self.free_allocation(allocation);
            return Err(convert_result(e, "failed to bind image memory"));
        }

        let view_info = vk::ImageViewCreateInfo::default()
            .image(image)
            .view_type(view_type)
            .format(format)
            .components(vk::ComponentMapping::default())
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask: convert_texture_aspect(descriptor.aspect),
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count: 1,
            });

        let view = match unsafe { self.device.create_image_view(&view_info, None) } {
            Ok(view) => view,
            Err(e) => {
                unsafe { self.device.destroy_image(image, None) };
                self.free_allocation(allocation);
                return Err(convert_result(e, "failed to create image view"));
            }
        };

        log::trace!(
            "Vulkan: created image {:?} {:?} ({}x{}x{}, frame {})",
            request.label,
            format,
            extent.width,
            extent.height,
            extent.depth,
            request.frame_index
        );

        Ok(VulkanImage {
            image,
            view,
            format,
            extent,
            allocation: Some(allocation),
        })
    }

    fn destroy_image(&mut self, mut image: VulkanImage) {
        log::trace!("Vulkan: destroying image {:?}", image.image);
        unsafe {
            self.device.destroy_image_view(image.view, None);
            self.device.destroy_image(image.image, None);
        }
        if let Some(allocation) = image.allocation.take() {
            self.free_allocation(allocation);
        }
    }
}
