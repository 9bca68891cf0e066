//! References stages make to named transient resources.

use super::ResourceDescriptor;

/// How a stage refers to a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// The stage creates the resource this frame.
    Provides,
    /// The stage reads the value produced earlier in the same frame.
    Depends,
    /// The stage reads the value produced in the previous frame
    /// (temporal feedback such as motion history or denoiser accumulation).
    DependsPrevious,
}

impl ReferenceKind {
    /// Check if this kind consumes a value.
    pub fn reads(&self) -> bool {
        matches!(self, Self::Depends | Self::DependsPrevious)
    }

    /// Check if this kind produces a value.
    pub fn writes(&self) -> bool {
        matches!(self, Self::Provides)
    }
}

/// A typed reference from a stage to a named resource.
///
/// Producers carry the descriptor of the image they create. Consumers
/// usually don't: the scheduler always takes the shape from the producer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceReference {
    name: String,
    kind: ReferenceKind,
    descriptor: Option<ResourceDescriptor>,
}

impl ResourceReference {
    /// Declare a resource produced by the stage.
    pub fn provides(name: impl Into<String>, descriptor: ResourceDescriptor) -> Self {
        Self {
            name: name.into(),
            kind: ReferenceKind::Provides,
            descriptor: Some(descriptor),
        }
    }

    /// Declare a dependency on a resource produced earlier in the same frame.
    pub fn depends(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ReferenceKind::Depends,
            descriptor: None,
        }
    }

    /// Declare a dependency on the value a resource had in the previous frame.
    pub fn depends_previous(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ReferenceKind::DependsPrevious,
            descriptor: None,
        }
    }

    /// Attach the expected descriptor to a consumer reference.
    ///
    /// Informational only; pooling always uses the producer's descriptor.
    pub fn with_descriptor(mut self, descriptor: ResourceDescriptor) -> Self {
        self.descriptor = Some(descriptor);
        self
    }

    /// Resource name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reference kind.
    pub fn kind(&self) -> ReferenceKind {
        self.kind
    }

    /// Descriptor, if the reference carries one.
    pub fn descriptor(&self) -> Option<&ResourceDescriptor> {
        self.descriptor.as_ref()
    }
}
