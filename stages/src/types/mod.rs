//! Value types shared by resource descriptors and backends.
//!
//! Formats, usage flags and extents are backend-agnostic; each resource
//! factory converts them to its native representation.

mod common;
mod texture;

pub use common::{Extent2d, Extent3d};
pub use texture::{TextureAspect, TextureFormat, TextureUsage};
