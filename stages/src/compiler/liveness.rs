//! Liveness analysis of transient resources.

use rustc_hash::FxHashMap;

use super::StageOrder;
use crate::profiling::profile_function;
use crate::resource::{ReferenceKind, ResourceDescriptor, ResourceReference};
use crate::stage::Stage;

/// Scheduling data derived for one provided resource name.
///
/// Recomputed from scratch on every resolve; never updated incrementally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleBinding {
    /// The producer's reference.
    pub reference: ResourceReference,
    /// Producer's shape, copied out of `reference`.
    pub descriptor: ResourceDescriptor,
    /// Position of the producing stage in the execution order.
    pub provided_index: usize,
    /// Last position at which the image must still hold its value.
    pub last_used_index: usize,
    /// Some consumer reads this resource in the next frame.
    pub survives_frame_boundary: bool,
    /// [`ResourceDescriptor::requirements_hash`] of `descriptor`.
    pub descriptor_hash: u64,
}

impl ScheduleBinding {
    /// Create a binding that is live only at its producer.
    pub fn new(
        reference: ResourceReference,
        descriptor: ResourceDescriptor,
        provided_index: usize,
    ) -> Self {
        Self {
            reference,
            descriptor,
            provided_index,
            last_used_index: provided_index,
            survives_frame_boundary: false,
            descriptor_hash: descriptor.requirements_hash(),
        }
    }

    /// Resource name.
    pub fn name(&self) -> &str {
        self.reference.name()
    }

    /// Check if the image must hold its value at stage position `index`.
    pub fn is_live_at(&self, index: usize) -> bool {
        self.provided_index <= index && index <= self.last_used_index
    }

    /// Check if the liveness intervals of two bindings intersect.
    pub fn overlaps(&self, other: &ScheduleBinding) -> bool {
        self.provided_index <= other.last_used_index && other.provided_index <= self.last_used_index
    }
}

/// Compute one [`ScheduleBinding`] per provided name.
///
/// Bindings are returned in provide order: by the producer's position, then
/// by declaration order within the producer. `stages` must be the slice
/// `order` was resolved from.
///
/// `last_used_index` starts at the producer and is raised to every consumer.
/// A single `DependsPrevious` consumer extends it to the last stage, since
/// the value has to survive until the next frame reads it.
pub fn analyze(stages: &[&dyn Stage], order: &StageOrder) -> Vec<ScheduleBinding> {
    profile_function!();

    let mut bindings = Vec::new();
    let mut by_name: FxHashMap<&str, usize> = FxHashMap::default();

    for (position, &input) in order.indices().iter().enumerate() {
        for reference in stages[input].provides() {
            let Some(descriptor) = reference.descriptor() else {
                continue;
            };
            by_name.insert(reference.name(), bindings.len());
            bindings.push(ScheduleBinding::new(reference.clone(), *descriptor, position));
        }
    }

    for (position, &input) in order.indices().iter().enumerate() {
        for reference in stages[input].depends() {
            let Some(&index) = by_name.get(reference.name()) else {
                continue;
            };
            let binding = &mut bindings[index];
            binding.last_used_index = binding.last_used_index.max(position);
            if reference.kind() == ReferenceKind::DependsPrevious {
                binding.survives_frame_boundary = true;
            }
        }
    }

    let last = order.len().saturating_sub(1);
    for binding in bindings.iter_mut().filter(|b| b.survives_frame_boundary) {
        binding.last_used_index = last;
    }

    for binding in &bindings {
        log::trace!(
            "Binding \"{}\": live [{}, {}]{}",
            binding.name(),
            binding.provided_index,
            binding.last_used_index,
            if binding.survives_frame_boundary { ", survives frame" } else { "" }
        );
    }

    bindings
}
