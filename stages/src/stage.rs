//! Stage capability interface.
//!
//! The scheduler only needs to know what a stage produces and what it reads.
//! Concrete stages (rasterization, ray tracing, post-processing, UI) live in
//! the engine and implement [`Stage`]; the scheduler never calls into their
//! rendering code and never owns them.

use crate::resource::{ResourceDescriptor, ResourceReference};

/// A unit of per-frame GPU work, as seen by the scheduler.
pub trait Stage {
    /// Display name used in diagnostics.
    fn name(&self) -> &str;

    /// Resources this stage creates each frame.
    fn provides(&self) -> &[ResourceReference];

    /// Resources this stage reads, either from the current frame
    /// ([`Depends`](crate::ReferenceKind::Depends)) or from the previous one
    /// ([`DependsPrevious`](crate::ReferenceKind::DependsPrevious)).
    fn depends(&self) -> &[ResourceReference];
}

/// Broad category of a stage, for diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StageKind {
    /// Rasterization pass (G-buffer, forward, shadows).
    #[default]
    Raster,
    /// Ray tracing dispatch.
    RayTracing,
    /// Generic compute work (denoising, culling).
    Compute,
    /// Full-screen post-processing.
    PostProcess,
    /// UI overlay.
    Ui,
    /// Copy of the final image to the swapchain.
    Present,
}

/// A stage described purely by data.
///
/// Useful for engines that configure their stage list declaratively, and
/// for tests and benchmarks.
///
/// # Example
///
/// ```
/// use redlilium_stages::{DeclaredStage, ResourceDescriptor, StageKind, TextureFormat, TextureUsage};
///
/// let color = ResourceDescriptor::relative(TextureFormat::Rgba16Float, TextureUsage::STORAGE_BINDING);
/// let raytrace = DeclaredStage::new("raytrace".into(), StageKind::RayTracing)
///     .with_depends("gbuffer.normal")
///     .with_depends_previous("raytrace.accumulation")
///     .with_provides("raytrace.accumulation", color);
/// assert_eq!(raytrace.kind(), StageKind::RayTracing);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DeclaredStage {
    name: String,
    kind: StageKind,
    provides: Vec<ResourceReference>,
    depends: Vec<ResourceReference>,
}

impl DeclaredStage {
    /// Create a new stage without any resource references.
    pub fn new(name: String, kind: StageKind) -> Self {
        Self {
            name,
            kind,
            provides: Vec::new(),
            depends: Vec::new(),
        }
    }

    /// Declare a resource this stage produces.
    pub fn with_provides(
        mut self,
        name: impl Into<String>,
        descriptor: ResourceDescriptor,
    ) -> Self {
        self.provides
            .push(ResourceReference::provides(name, descriptor));
        self
    }

    /// Declare a same-frame dependency.
    pub fn with_depends(mut self, name: impl Into<String>) -> Self {
        self.depends.push(ResourceReference::depends(name));
        self
    }

    /// Declare a dependency on the previous frame's value.
    pub fn with_depends_previous(mut self, name: impl Into<String>) -> Self {
        self.depends
            .push(ResourceReference::depends_previous(name));
        self
    }

    /// Get the stage kind.
    pub fn kind(&self) -> StageKind {
        self.kind
    }
}

impl Stage for DeclaredStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn provides(&self) -> &[ResourceReference] {
        &self.provides
    }

    fn depends(&self) -> &[ResourceReference] {
        &self.depends
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ReferenceKind;
    use crate::types::{TextureFormat, TextureUsage};

    #[test]
    fn test_declared_stage_references() {
        let desc = ResourceDescriptor::relative(TextureFormat::Rgba8Unorm, TextureUsage::RENDER_ATTACHMENT);
        let stage = DeclaredStage::new("tonemap".into(), StageKind::PostProcess)
            .with_depends("hdr")
            .with_depends_previous("exposure")
            .with_provides("ldr", desc);

        assert_eq!(stage.name(), "tonemap");
        assert_eq!(stage.kind(), StageKind::PostProcess);
        assert_eq!(stage.provides().len(), 1);
        assert_eq!(stage.provides()[0].name(), "ldr");

        let kinds: Vec<_> = stage.depends().iter().map(|r| r.kind()).collect();
        assert_eq!(kinds, vec![ReferenceKind::Depends, ReferenceKind::DependsPrevious]);
    }

    #[test]
    fn test_stage_as_trait_object() {
        let stage = DeclaredStage::new("ui".into(), StageKind::Ui);
        let dyn_stage: &dyn Stage = &stage;
        assert_eq!(dyn_stage.name(), "ui");
        assert!(dyn_stage.provides().is_empty());
        assert!(dyn_stage.depends().is_empty());
    }
}
