//! Peak-concurrency pool sizing.

use rustc_hash::FxHashMap;

use crate::compiler::ScheduleBinding;
use crate::profiling::{profile_function, profile_plot};
use crate::resource::ResourceDescriptor;

/// Number of physical images needed for one descriptor shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolRequirement {
    /// Shared [`ResourceDescriptor::requirements_hash`].
    pub descriptor_hash: u64,
    /// Descriptor of the first binding with this hash.
    pub descriptor: ResourceDescriptor,
    /// Peak number of simultaneously live bindings.
    pub count: usize,
}

/// Compute the pool size for every descriptor hash in `bindings`.
///
/// Sweeps the stage positions once per hash: the counter goes up at a
/// binding's `provided_index` and down right after its `last_used_index`.
/// The peak of the running counter is the required size, so three images
/// live at `[0, 3]`, `[2, 5]` and `[4, 6]` need two slots, not three.
///
/// Requirements are ordered by first appearance of their hash.
pub fn size(bindings: &[ScheduleBinding], stage_count: usize) -> Vec<PoolRequirement> {
    profile_function!();

    let span = bindings
        .iter()
        .map(|b| b.last_used_index + 1)
        .max()
        .unwrap_or(0)
        .max(stage_count);

    let mut requirements: Vec<PoolRequirement> = Vec::new();
    let mut deltas: Vec<Vec<isize>> = Vec::new();
    let mut by_hash: FxHashMap<u64, usize> = FxHashMap::default();

    for binding in bindings {
        let index = *by_hash.entry(binding.descriptor_hash).or_insert_with(|| {
            requirements.push(PoolRequirement {
                descriptor_hash: binding.descriptor_hash,
                descriptor: binding.descriptor,
                count: 0,
            });
            deltas.push(vec![0; span + 1]);
            requirements.len() - 1
        });

        let delta = &mut deltas[index];
        delta[binding.provided_index] += 1;
        delta[binding.last_used_index + 1] -= 1;
    }

    for (requirement, delta) in requirements.iter_mut().zip(&deltas) {
        let mut live = 0isize;
        let mut peak = 0isize;
        for change in delta {
            live += change;
            peak = peak.max(live);
        }
        requirement.count = peak.max(0) as usize;

        log::debug!(
            "Pool {:016x} ({:?}): {} slot(s)",
            requirement.descriptor_hash,
            requirement.descriptor.format,
            requirement.count
        );
    }

    profile_plot!(
        "stage_pool_slots",
        requirements.iter().map(|r| r.count).sum::<usize>() as f64
    );

    requirements
}
