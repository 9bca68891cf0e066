//! # RedLilium Stages
//!
//! Render-stage scheduler and transient image pool for RedLilium.
//!
//! ## Overview
//!
//! Once at startup and again after every resize, the engine hands its stage
//! list to a [`StageDirector`], which:
//! - orders the stages by their resource dependencies ([`compiler::resolve`])
//! - computes how long every transient image must stay valid ([`compiler::analyze`])
//! - sizes a pool of physical images by peak concurrent demand ([`pool::size`])
//! - binds each resource name to a pool slot and creates the slots once per
//!   in-flight frame through a [`ResourceFactory`]
//!
//! The resulting [`Schedule`] tells each stage which image to bind for the
//! current frame.
//!
//! ## Example
//!
//! ```
//! use redlilium_stages::{
//!     DeclaredStage, DummyBackend, Extent2d, ResourceDescriptor, SchedulerConfig, Stage,
//!     StageDirector, StageKind, TextureFormat, TextureUsage,
//! };
//!
//! let color = ResourceDescriptor::relative(TextureFormat::Rgba16Float, TextureUsage::RENDER_ATTACHMENT);
//! let raster = DeclaredStage::new("raster".into(), StageKind::Raster).with_provides("color", color);
//! let ui = DeclaredStage::new("ui".into(), StageKind::Ui).with_depends("color");
//!
//! let mut backend = DummyBackend::new();
//! let mut director = StageDirector::new(SchedulerConfig::default());
//! director
//!     .initialize_or_update(&[&raster as &dyn Stage, &ui], Extent2d::new(1920, 1080), &mut backend)
//!     .unwrap();
//! director.cleanup(&mut backend);
//! ```

pub mod backend;
pub mod compiler;
pub mod director;
pub mod error;
pub mod pool;
pub mod profiling;
pub mod resource;
pub mod stage;
pub mod types;

// Re-export main types for convenience
pub use backend::{BackendError, DummyBackend, DummyImage, ImageRequest, ResourceFactory};
pub use compiler::{ScheduleBinding, StageOrder};
pub use director::{DEFAULT_FRAMES_IN_FLIGHT, Schedule, SchedulerConfig, StageDirector};
pub use error::{Result, StageError};
pub use pool::{PoolRequirement, PoolTable, SlotIndex};
pub use resource::{ReferenceKind, ResourceDescriptor, ResourceReference, SizePolicy};
pub use stage::{DeclaredStage, Stage, StageKind};
pub use types::{Extent2d, Extent3d, TextureAspect, TextureFormat, TextureUsage};

/// Stage scheduler library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the stage scheduler.
///
/// Only logs the version; schedulers themselves are created explicitly.
pub fn init() {
    log::info!("RedLilium Stages v{} initialized", VERSION);
}
