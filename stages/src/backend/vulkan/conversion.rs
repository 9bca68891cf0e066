//! Type conversions between scheduler types and Vulkan types.

use ash::vk;

use crate::backend::BackendError;
use crate::types::{TextureAspect, TextureFormat, TextureUsage};

/// Convert TextureFormat to Vulkan format.
pub fn convert_texture_format(format: TextureFormat) -> vk::Format {
    match format {
        // 8-bit formats
        TextureFormat::R8Unorm => vk::Format::R8_UNORM,
        TextureFormat::R8Snorm => vk::Format::R8_SNORM,
        TextureFormat::R8Uint => vk::Format::R8_UINT,
        TextureFormat::R8Sint => vk::Format::R8_SINT,

        // 16-bit formats
        TextureFormat::R16Unorm => vk::Format::R16_UNORM,
        TextureFormat::R16Float => vk::Format::R16_SFLOAT,
        TextureFormat::Rg8Unorm => vk::Format::R8G8_UNORM,

        // 32-bit formats
        TextureFormat::R32Float => vk::Format::R32_SFLOAT,
        TextureFormat::R32Uint => vk::Format::R32_UINT,
        TextureFormat::Rg16Float => vk::Format::R16G16_SFLOAT,
        TextureFormat::Rgba8Unorm => vk::Format::R8G8B8A8_UNORM,
        TextureFormat::Rgba8UnormSrgb => vk::Format::R8G8B8A8_SRGB,
        TextureFormat::Bgra8Unorm => vk::Format::B8G8R8A8_UNORM,
        TextureFormat::Bgra8UnormSrgb => vk::Format::B8G8R8A8_SRGB,

        // 64-bit formats
        TextureFormat::Rgba16Float => vk::Format::R16G16B16A16_SFLOAT,
        TextureFormat::Rg32Float => vk::Format::R32G32_SFLOAT,

        // 128-bit formats
        TextureFormat::Rgba32Float => vk::Format::R32G32B32A32_SFLOAT,

        // Depth/stencil formats
        TextureFormat::Depth16Unorm => vk::Format::D16_UNORM,
        TextureFormat::Depth24Plus => vk::Format::D32_SFLOAT, // Vulkan doesn't have D24, use D32
        TextureFormat::Depth24PlusStencil8 => vk::Format::D24_UNORM_S8_UINT,
        TextureFormat::Depth32Float => vk::Format::D32_SFLOAT,
        TextureFormat::Depth32FloatStencil8 => vk::Format::D32_SFLOAT_S8_UINT,
    }
}

/// Convert TextureUsage flags to Vulkan image usage flags.
///
/// The format is needed to determine whether RENDER_ATTACHMENT should map to
/// COLOR_ATTACHMENT or DEPTH_STENCIL_ATTACHMENT.
pub fn convert_texture_usage(usage: TextureUsage, format: TextureFormat) -> vk::ImageUsageFlags {
    let mut result = vk::ImageUsageFlags::empty();

    if usage.contains(TextureUsage::COPY_SRC) {
        result |= vk::ImageUsageFlags::TRANSFER_SRC;
    }
    if usage.contains(TextureUsage::COPY_DST) {
        result |= vk::ImageUsageFlags::TRANSFER_DST;
    }
    if usage.contains(TextureUsage::TEXTURE_BINDING) {
        result |= vk::ImageUsageFlags::SAMPLED;
    }
    if usage.contains(TextureUsage::STORAGE_BINDING) {
        result |= vk::ImageUsageFlags::STORAGE;
    }
    if usage.contains(TextureUsage::RENDER_ATTACHMENT) {
        // Use the appropriate attachment type based on format
        if format.is_depth_stencil() {
            result |= vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT;
        } else {
            result |= vk::ImageUsageFlags::COLOR_ATTACHMENT;
        }
    }

    result
}

/// Convert TextureAspect flags to Vulkan image aspect flags.
pub fn convert_texture_aspect(aspect: TextureAspect) -> vk::ImageAspectFlags {
    let mut result = vk::ImageAspectFlags::empty();

    if aspect.contains(TextureAspect::COLOR) {
        result |= vk::ImageAspectFlags::COLOR;
    }
    if aspect.contains(TextureAspect::DEPTH) {
        result |= vk::ImageAspectFlags::DEPTH;
    }
    if aspect.contains(TextureAspect::STENCIL) {
        result |= vk::ImageAspectFlags::STENCIL;
    }

    result
}

/// Map a Vulkan result from image creation to a backend error.
pub fn convert_result(result: vk::Result, what: &str) -> BackendError {
    match result {
        vk::Result::ERROR_OUT_OF_DEVICE_MEMORY | vk::Result::ERROR_OUT_OF_HOST_MEMORY => {
            BackendError::OutOfMemory
        }
        vk::Result::ERROR_DEVICE_LOST => BackendError::DeviceLost,
        other => BackendError::ResourceCreationFailed(format!("{what}: {other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_attachment_usage_depends_on_format() {
        assert_eq!(
            convert_texture_usage(TextureUsage::RENDER_ATTACHMENT, TextureFormat::Rgba16Float),
            vk::ImageUsageFlags::COLOR_ATTACHMENT
        );
        assert_eq!(
            convert_texture_usage(TextureUsage::RENDER_ATTACHMENT, TextureFormat::Depth32Float),
            vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT
        );
    }

    #[test]
    fn test_aspect_conversion() {
        assert_eq!(
            convert_texture_aspect(TextureAspect::DEPTH | TextureAspect::STENCIL),
            vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL
        );
    }

    #[test]
    fn test_result_conversion() {
        assert_eq!(
            convert_result(vk::Result::ERROR_OUT_OF_DEVICE_MEMORY, "create image"),
            BackendError::OutOfMemory
        );
        assert!(matches!(
            convert_result(vk::Result::ERROR_FORMAT_NOT_SUPPORTED, "create image"),
            BackendError::ResourceCreationFailed(_)
        ));
    }
}
