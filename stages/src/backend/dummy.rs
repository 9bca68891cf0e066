//! Dummy resource factory for testing and development.
//!
//! This backend doesn't touch a GPU. It hands out numbered images and keeps
//! track of which ones are alive, so tests can check that pool rebuilds
//! neither leak nor double-free.

use rustc_hash::FxHashSet;

use super::{BackendError, ImageRequest, ResourceFactory};
use crate::types::{Extent3d, TextureFormat};

/// An image created by [`DummyBackend`].
///
/// Ids are unique for the lifetime of the backend, so comparing ids tells
/// whether two lookups return the same physical image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DummyImage {
    /// Unique, monotonically increasing id.
    pub id: u64,
    /// Size the image was created with.
    pub extent: Extent3d,
    /// Pixel format.
    pub format: TextureFormat,
    /// In-flight frame replica the image was created for.
    pub frame_index: usize,
}

/// Dummy resource factory.
#[derive(Debug, Default)]
pub struct DummyBackend {
    next_id: u64,
    live: FxHashSet<u64>,
    destroyed: Vec<u64>,
    created_total: usize,
    fail_after: Option<usize>,
}

impl DummyBackend {
    /// Create a new dummy backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the backend name.
    pub fn name(&self) -> &'static str {
        "Dummy Backend"
    }

    /// Make creation fail with [`BackendError::OutOfMemory`] once `count`
    /// more images have been created.
    pub fn fail_after(&mut self, count: usize) {
        self.fail_after = Some(count);
    }

    /// Stop injecting failures.
    pub fn clear_failure(&mut self) {
        self.fail_after = None;
    }

    /// Number of images created and not yet destroyed.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Check if the image with `id` is alive.
    pub fn is_live(&self, id: u64) -> bool {
        self.live.contains(&id)
    }

    /// Ids of destroyed images, in destruction order.
    pub fn destroyed(&self) -> &[u64] {
        &self.destroyed
    }

    /// Number of images ever created.
    pub fn created_total(&self) -> usize {
        self.created_total
    }
}

impl ResourceFactory for DummyBackend {
    type Image = DummyImage;

    fn create_image(&mut self, request: &ImageRequest) -> Result<DummyImage, BackendError> {
        if let Some(remaining) = self.fail_after.as_mut() {
            if *remaining == 0 {
                log::trace!("DummyBackend: refusing to create {:?}", request.label);
                return Err(BackendError::OutOfMemory);
            }
            *remaining -= 1;
        }

        let image = DummyImage {
            id: self.next_id,
            extent: request.extent,
            format: request.descriptor.format,
            frame_index: request.frame_index,
        };
        self.next_id += 1;
        self.created_total += 1;
        self.live.insert(image.id);

        log::trace!(
            "DummyBackend: creating image {} {:?} ({}x{}x{}, frame {})",
            image.id,
            request.label,
            request.extent.width,
            request.extent.height,
            request.extent.depth,
            request.frame_index
        );
        Ok(image)
    }

    fn destroy_image(&mut self, image: DummyImage) {
        log::trace!("DummyBackend: destroying image {}", image.id);
        if !self.live.remove(&image.id) {
            log::warn!("DummyBackend: image {} destroyed twice", image.id);
        }
        self.destroyed.push(image.id);
    }
}
