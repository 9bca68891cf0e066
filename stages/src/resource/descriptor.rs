//! Shape descriptions for transient stage images.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

use crate::types::{Extent2d, Extent3d, TextureAspect, TextureFormat, TextureUsage};

/// How the size of a transient image is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SizePolicy {
    /// Follows the render output; recreated on every resize.
    #[default]
    RelativeToOutput,
    /// Fixed size in pixels, independent of the output.
    Fixed(Extent3d),
}

impl SizePolicy {
    /// Resolve the concrete image extent for the given output extent.
    ///
    /// A zero output dimension resolves to 1 so that a minimized window
    /// never produces an invalid image request.
    pub fn resolve(&self, output: Extent2d) -> Extent3d {
        match self {
            Self::RelativeToOutput => Extent3d::new_2d(output.width.max(1), output.height.max(1)),
            Self::Fixed(extent) => *extent,
        }
    }

    /// Returns true if the resolved extent depends on the output extent.
    pub fn is_relative(&self) -> bool {
        matches!(self, Self::RelativeToOutput)
    }
}

/// Immutable description of a transient image's shape.
///
/// Two descriptors with the same [`requirements_hash`](Self::requirements_hash)
/// are interchangeable for pooling: they may be backed by the same physical
/// image at non-overlapping stage indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceDescriptor {
    /// Size policy.
    pub size_policy: SizePolicy,
    /// Pixel format.
    pub format: TextureFormat,
    /// Usage flags.
    pub usage: TextureUsage,
    /// Aspects accessed through the image view.
    pub aspect: TextureAspect,
}

impl ResourceDescriptor {
    /// Create a descriptor for an image sized like the render output.
    pub fn relative(format: TextureFormat, usage: TextureUsage) -> Self {
        Self {
            size_policy: SizePolicy::RelativeToOutput,
            format,
            usage,
            aspect: TextureAspect::for_format(format),
        }
    }

    /// Create a descriptor for an image with a fixed extent.
    pub fn fixed(extent: Extent3d, format: TextureFormat, usage: TextureUsage) -> Self {
        Self {
            size_policy: SizePolicy::Fixed(extent),
            format,
            usage,
            aspect: TextureAspect::for_format(format),
        }
    }

    /// Override the aspect flags.
    pub fn with_aspect(mut self, aspect: TextureAspect) -> Self {
        self.aspect = aspect;
        self
    }

    /// Deterministic structural hash used for aliasing decisions.
    ///
    /// Covers the size policy (including a fixed extent), format, usage and
    /// aspect. The output extent is not part of it, so relative descriptors
    /// keep their hash across resizes.
    pub fn requirements_hash(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.hash(&mut hasher);
        hasher.finish()
    }

    /// Resolve the concrete image extent for the given output extent.
    pub fn resolve_extent(&self, output: Extent2d) -> Extent3d {
        self.size_policy.resolve(output)
    }
}
