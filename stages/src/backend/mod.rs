//! Physical image creation.
//!
//! The scheduler never talks to a graphics API directly. It asks a
//! [`ResourceFactory`] for one image per pool slot and in-flight frame, and
//! hands the images back when the pool is rebuilt or cleaned up.
//!
//! # Available Backends
//!
//! - `dummy` (always available): no GPU, hands out numbered images for tests
//! - `wgpu-backend`: textures created through wgpu
//! - `vulkan-backend`: images created with ash and backed by gpu-allocator

mod error;

pub mod dummy;

#[cfg(feature = "vulkan-backend")]
pub mod vulkan;

#[cfg(feature = "wgpu-backend")]
pub mod wgpu_backend;

pub use dummy::{DummyBackend, DummyImage};
pub use error::BackendError;

use crate::resource::ResourceDescriptor;
use crate::types::Extent3d;

/// Everything a factory needs to create one pooled image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    /// Debug label.
    pub label: String,
    /// Shape of the image.
    pub descriptor: ResourceDescriptor,
    /// Resolved size; for relative descriptors this follows the output.
    pub extent: Extent3d,
    /// In-flight frame replica the image belongs to.
    pub frame_index: usize,
}

/// Creates and destroys physical images on behalf of the scheduler.
///
/// Implementations own the device; the scheduler owns the returned images
/// until it passes them back to [`destroy_image`](Self::destroy_image).
pub trait ResourceFactory {
    /// Physical image handle.
    type Image;

    /// Create one image matching `request`.
    ///
    /// Failure is reported as an error, typically
    /// [`BackendError::OutOfMemory`].
    fn create_image(&mut self, request: &ImageRequest) -> Result<Self::Image, BackendError>;

    /// Destroy an image previously returned by [`create_image`](Self::create_image).
    fn destroy_image(&mut self, image: Self::Image);
}
