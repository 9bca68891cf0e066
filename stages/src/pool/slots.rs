//! Binding of resource names to pool slots.

use rustc_hash::FxHashMap;

use super::PoolRequirement;
use crate::compiler::ScheduleBinding;
use crate::error::{Result, StageError};

/// Location of a pooled image: which requirement, which slot within it.
///
/// The same slot is used in every in-flight frame replica.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotIndex {
    /// Index into the requirement list (and the pool table's entries).
    pub entry: usize,
    /// Slot within the entry.
    pub slot: usize,
}

/// Slot chosen for each binding, parallel to the binding list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotAssignment {
    slots: Vec<SlotIndex>,
}

impl SlotAssignment {
    /// Slot of the binding at `binding_index`.
    pub fn get(&self, binding_index: usize) -> Option<SlotIndex> {
        self.slots.get(binding_index).copied()
    }

    /// Slots in binding order.
    pub fn as_slice(&self) -> &[SlotIndex] {
        &self.slots
    }

    /// Number of assigned bindings.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if nothing was assigned.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Assign every binding to the first free slot of its pool.
///
/// Bindings are visited by `provided_index`. A slot is free for a binding
/// when the slot's last occupant was last used strictly before the binding
/// is produced. Visiting intervals by their start and taking the first free
/// slot never needs more slots than the peak computed by [`size`](super::size).
///
/// # Errors
///
/// [`StageError::InvalidConfiguration`] if `requirements` was not computed
/// from `bindings`.
pub fn assign_slots(
    bindings: &[ScheduleBinding],
    requirements: &[PoolRequirement],
) -> Result<SlotAssignment> {
    let entries: FxHashMap<u64, usize> = requirements
        .iter()
        .enumerate()
        .map(|(index, r)| (r.descriptor_hash, index))
        .collect();

    let mut visit: Vec<usize> = (0..bindings.len()).collect();
    visit.sort_by_key(|&i| bindings[i].provided_index);

    // Per entry: last_used_index of each slot's current occupant.
    let mut occupied_until: Vec<Vec<usize>> = vec![Vec::new(); requirements.len()];
    let mut slots = vec![SlotIndex { entry: 0, slot: 0 }; bindings.len()];

    for index in visit {
        let binding = &bindings[index];
        let Some(&entry) = entries.get(&binding.descriptor_hash) else {
            return Err(StageError::InvalidConfiguration(format!(
                "no pool requirement for \"{}\" ({:016x})",
                binding.name(),
                binding.descriptor_hash
            )));
        };

        let occupants = &mut occupied_until[entry];
        let slot = match occupants.iter().position(|&last| last < binding.provided_index) {
            Some(slot) => {
                occupants[slot] = binding.last_used_index;
                slot
            }
            None => {
                occupants.push(binding.last_used_index);
                occupants.len() - 1
            }
        };

        if slot >= requirements[entry].count {
            return Err(StageError::InvalidConfiguration(format!(
                "\"{}\" needs slot {} but pool {:016x} has {}",
                binding.name(),
                slot,
                binding.descriptor_hash,
                requirements[entry].count
            )));
        }

        log::trace!("Binding \"{}\" -> pool {} slot {}", binding.name(), entry, slot);
        slots[index] = SlotIndex { entry, slot };
    }

    Ok(SlotAssignment { slots })
}
