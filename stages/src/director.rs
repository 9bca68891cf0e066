//! Composite entry point tying resolution, liveness and pooling together.
//!
//! The engine owns one [`StageDirector`] per render context and calls
//! [`StageDirector::initialize_or_update`] at startup and after every
//! resize. Steady-state frames only read the installed [`Schedule`].
//!
//! # Example
//!
//! ```
//! use redlilium_stages::{
//!     DeclaredStage, DummyBackend, Extent2d, ResourceDescriptor, SchedulerConfig, Stage,
//!     StageDirector, StageKind, TextureFormat, TextureUsage,
//! };
//!
//! let hdr = ResourceDescriptor::relative(TextureFormat::Rgba16Float, TextureUsage::RENDER_ATTACHMENT);
//! let lighting = DeclaredStage::new("lighting".into(), StageKind::Raster).with_provides("hdr", hdr);
//! let tonemap = DeclaredStage::new("tonemap".into(), StageKind::PostProcess).with_depends("hdr");
//! let stages: [&dyn Stage; 2] = [&lighting, &tonemap];
//!
//! let mut backend = DummyBackend::new();
//! let mut director = StageDirector::new(SchedulerConfig::default());
//! let schedule = director
//!     .initialize_or_update(&stages, Extent2d::new(1280, 720), &mut backend)
//!     .unwrap();
//! assert!(schedule.image(1, "hdr", 0).is_some());
//!
//! director.cleanup(&mut backend);
//! assert_eq!(backend.live_count(), 0);
//! ```

use rustc_hash::FxHashMap;

use crate::backend::ResourceFactory;
use crate::compiler::{ScheduleBinding, StageOrder, analyze, resolve};
use crate::error::{Result, StageError};
use crate::pool::{
    BuildParams, PoolRequirement, PoolTable, SlotAssignment, SlotIndex, assign_slots, size,
};
use crate::profiling::profile_function;
use crate::resource::ReferenceKind;
use crate::stage::Stage;
use crate::types::Extent2d;

/// Default number of frames the CPU may record ahead of the GPU.
pub const DEFAULT_FRAMES_IN_FLIGHT: usize = 2;

/// Scheduler configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Number of replicas of every pooled image.
    pub frames_in_flight: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            frames_in_flight: DEFAULT_FRAMES_IN_FLIGHT,
        }
    }
}

impl SchedulerConfig {
    /// Set the number of frames in flight.
    pub fn with_frames_in_flight(mut self, frames_in_flight: usize) -> Self {
        self.frames_in_flight = frames_in_flight;
        self
    }

    /// Check the configuration against a stage graph.
    ///
    /// Reading last frame's value needs a second replica: with a single one
    /// the value would be overwritten by aliasing before it is read.
    pub fn validate(&self, reads_previous_frame: bool) -> Result<()> {
        if self.frames_in_flight == 0 {
            return Err(StageError::InvalidConfiguration(
                "frames_in_flight must be at least 1".into(),
            ));
        }
        if reads_previous_frame && self.frames_in_flight < 2 {
            return Err(StageError::InvalidConfiguration(format!(
                "reading the previous frame needs at least 2 frames in flight, got {}",
                self.frames_in_flight
            )));
        }
        Ok(())
    }
}

/// A resolved stage list with its bound image pool.
#[derive(Debug)]
pub struct Schedule<I> {
    order: StageOrder,
    stage_names: Vec<String>,
    stage_references: Vec<Vec<(String, ReferenceKind)>>,
    bindings: Vec<ScheduleBinding>,
    binding_index: FxHashMap<String, usize>,
    requirements: Vec<PoolRequirement>,
    slots: SlotAssignment,
    pool: PoolTable<I>,
    output_extent: Extent2d,
}

impl<I> Schedule<I> {
    /// Execution order as indices into the stage list.
    pub fn order(&self) -> &StageOrder {
        &self.order
    }

    /// Number of scheduled stages.
    pub fn stage_count(&self) -> usize {
        self.order.len()
    }

    /// Display name of the stage at an execution position.
    pub fn stage_name(&self, stage_position: usize) -> Option<&str> {
        self.stage_names.get(stage_position).map(String::as_str)
    }

    /// Display names in execution order.
    pub fn stage_names(&self) -> impl Iterator<Item = &str> {
        self.stage_names.iter().map(String::as_str)
    }

    /// Bindings in provide order.
    pub fn bindings(&self) -> &[ScheduleBinding] {
        &self.bindings
    }

    /// Binding of a resource name.
    pub fn binding(&self, name: &str) -> Option<&ScheduleBinding> {
        self.binding_index.get(name).map(|&i| &self.bindings[i])
    }

    /// Pool requirements the table was built from.
    pub fn requirements(&self) -> &[PoolRequirement] {
        &self.requirements
    }

    /// Pool slot bound to a resource name.
    pub fn slot_of(&self, name: &str) -> Option<SlotIndex> {
        self.slots.get(*self.binding_index.get(name)?)
    }

    /// The physical image pool.
    pub fn pool(&self) -> &PoolTable<I> {
        &self.pool
    }

    /// Total number of physical images.
    pub fn pool_image_count(&self) -> usize {
        self.pool.image_count()
    }

    /// Output extent the pool was built for.
    pub fn output_extent(&self) -> Extent2d {
        self.output_extent
    }

    /// Image to bind for `name` while recording the stage at
    /// `stage_position` into in-flight frame `frame_index`.
    ///
    /// Returns `None` if the stage doesn't reference `name`. A
    /// `DependsPrevious` reference yields the previous frame's replica. A
    /// stage that both provides a name and reads its previous value gets the
    /// current replica here; the history is available from
    /// [`previous_image`](Self::previous_image).
    pub fn image(&self, stage_position: usize, name: &str, frame_index: usize) -> Option<&I> {
        let references = self.stage_references.get(stage_position)?;
        let kind = references
            .iter()
            .find(|(n, kind)| n == name && *kind != ReferenceKind::DependsPrevious)
            .or_else(|| references.iter().find(|(n, _)| n == name))
            .map(|(_, kind)| *kind)?;

        match kind {
            ReferenceKind::DependsPrevious => self.previous_image(name, frame_index),
            _ => self.current_image(name, frame_index),
        }
    }

    /// Every image the stage at `stage_position` references, with the
    /// reference kind, in declaration order (provided names first).
    pub fn stage_images(
        &self,
        stage_position: usize,
        frame_index: usize,
    ) -> impl Iterator<Item = (&str, ReferenceKind, &I)> {
        self.stage_references
            .get(stage_position)
            .into_iter()
            .flatten()
            .filter_map(move |(name, kind)| {
                let image = match kind {
                    ReferenceKind::DependsPrevious => self.previous_image(name, frame_index),
                    _ => self.current_image(name, frame_index),
                }?;
                Some((name.as_str(), *kind, image))
            })
    }

    /// Image holding `name` in in-flight frame `frame_index`.
    pub fn current_image(&self, name: &str, frame_index: usize) -> Option<&I> {
        if frame_index >= self.pool.frames_in_flight() {
            return None;
        }
        let slot = self.slot_of(name)?;
        self.pool.image(slot.entry, slot.slot, frame_index)
    }

    /// Image holding last frame's value of `name`, seen from in-flight frame
    /// `frame_index`.
    pub fn previous_image(&self, name: &str, frame_index: usize) -> Option<&I> {
        let frames = self.pool.frames_in_flight();
        if frame_index >= frames {
            return None;
        }
        self.current_image(name, (frame_index + frames - 1) % frames)
    }
}

/// Owns the installed [`Schedule`] and the in-flight frame counter.
///
/// Single-threaded: the engine calls it from the thread driving the render
/// loop and never concurrently.
#[derive(Debug)]
pub struct StageDirector<I> {
    config: SchedulerConfig,
    schedule: Option<Schedule<I>>,
    frame_number: u64,
}

impl<I> StageDirector<I> {
    /// Create a director with no schedule installed.
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            schedule: None,
            frame_number: 0,
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Resolve `stages`, size the pool and (re)create its images.
    ///
    /// On success the new schedule replaces the installed one; images of the
    /// old pool that were not carried over are destroyed after the new pool
    /// is complete. On any error the installed schedule is left as it was.
    pub fn initialize_or_update<F>(
        &mut self,
        stages: &[&dyn Stage],
        output_extent: Extent2d,
        factory: &mut F,
    ) -> Result<&Schedule<I>>
    where
        F: ResourceFactory<Image = I>,
    {
        profile_function!();

        if output_extent.is_empty() {
            log::debug!(
                "Output extent {}x{} is empty; relative images are clamped to 1 pixel",
                output_extent.width,
                output_extent.height
            );
        }

        let order = resolve(stages)?;
        let bindings = analyze(stages, &order);
        self.config
            .validate(bindings.iter().any(|b| b.survives_frame_boundary))?;

        let requirements = size(&bindings, order.len());
        let slots = assign_slots(&bindings, &requirements)?;

        let params = BuildParams {
            output_extent,
            frames_in_flight: self.config.frames_in_flight,
        };
        let previous = self.schedule.as_mut().map(|s| &mut s.pool);
        let pool = PoolTable::build(&requirements, factory, &params, previous)?;

        let stage_names = order
            .indices()
            .iter()
            .map(|&i| stages[i].name().to_owned())
            .collect();
        let stage_references = order
            .indices()
            .iter()
            .map(|&i| {
                let stage = stages[i];
                stage
                    .provides()
                    .iter()
                    .map(|r| (r.name().to_owned(), ReferenceKind::Provides))
                    .chain(stage.depends().iter().map(|r| (r.name().to_owned(), r.kind())))
                    .collect()
            })
            .collect();
        let binding_index = bindings
            .iter()
            .enumerate()
            .map(|(i, b)| (b.name().to_owned(), i))
            .collect();

        log::info!(
            "Stage schedule ready: {} stage(s), {} binding(s), {} pooled image(s) at {}x{}",
            order.len(),
            bindings.len(),
            pool.image_count(),
            output_extent.width,
            output_extent.height
        );

        Ok(self.schedule.insert(Schedule {
            order,
            stage_names,
            stage_references,
            bindings,
            binding_index,
            requirements,
            slots,
            pool,
            output_extent,
        }))
    }

    /// The installed schedule, if any.
    pub fn schedule(&self) -> Option<&Schedule<I>> {
        self.schedule.as_ref()
    }

    /// Destroy the installed schedule's images.
    pub fn cleanup<F>(&mut self, factory: &mut F)
    where
        F: ResourceFactory<Image = I>,
    {
        if let Some(mut schedule) = self.schedule.take() {
            log::debug!("Destroying {} pooled image(s)", schedule.pool.image_count());
            schedule.pool.destroy(factory);
        }
    }

    /// Move on to the next frame.
    pub fn advance_frame(&mut self) {
        self.frame_number += 1;
    }

    /// Number of frames advanced so far.
    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    /// In-flight replica used by the current frame.
    pub fn frame_index(&self) -> usize {
        (self.frame_number % self.config.frames_in_flight.max(1) as u64) as usize
    }
}
