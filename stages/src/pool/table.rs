//! Physical image pool.

use super::PoolRequirement;
use crate::backend::{ImageRequest, ResourceFactory};
use crate::error::Result;
use crate::profiling::{profile_function, profile_plot, profile_scope};
use crate::resource::ResourceDescriptor;
use crate::types::{Extent2d, Extent3d};

/// Parameters shared by every image of one pool build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildParams {
    /// Current render output size.
    pub output_extent: Extent2d,
    /// Replicas per slot.
    pub frames_in_flight: usize,
}

/// One pool slot, replicated per in-flight frame.
#[derive(Debug)]
pub struct PooledSlot<I> {
    /// One image per in-flight frame.
    pub frames: Vec<I>,
}

impl<I> PooledSlot<I> {
    /// Image for the given in-flight frame.
    pub fn frame(&self, frame_index: usize) -> Option<&I> {
        self.frames.get(frame_index)
    }
}

/// All slots of one descriptor shape.
#[derive(Debug)]
pub struct PoolEntry<I> {
    /// Shared requirements hash.
    pub descriptor_hash: u64,
    /// Shape the images were created with.
    pub descriptor: ResourceDescriptor,
    /// Resolved size of every image in the entry.
    pub extent: Extent3d,
    /// Slots in assignment order.
    pub slots: Vec<PooledSlot<I>>,
}

impl<I> PoolEntry<I> {
    /// Approximate memory held by the entry, all replicas included.
    pub fn estimated_bytes(&self) -> u64 {
        let texels =
            self.extent.width as u64 * self.extent.height as u64 * self.extent.depth as u64;
        let images: usize = self.slots.iter().map(|s| s.frames.len()).sum();
        texels * self.descriptor.format.block_size() as u64 * images as u64
    }
}

/// Where an entry of a new table takes its first slots from.
struct EntryPlan {
    extent: Extent3d,
    reuse_from: Option<usize>,
    reused_slots: usize,
}

/// Physical images for every pool requirement.
///
/// Entries are parallel to the requirement list the table was built from.
/// Images are handed back to the factory by [`destroy`](Self::destroy); a
/// table dropped with images still inside leaks them.
#[derive(Debug)]
pub struct PoolTable<I> {
    entries: Vec<PoolEntry<I>>,
    frames_in_flight: usize,
}

impl<I> PoolTable<I> {
    /// Create all images for `requirements`.
    ///
    /// With a `previous` table, slots whose hash and resolved extent did not
    /// change are moved over instead of recreated; fixed-size images thus
    /// keep their identity across resizes. Once the new table is complete,
    /// whatever is left in `previous` is destroyed and `previous` is empty.
    ///
    /// If the factory fails, every image created by this call is destroyed
    /// again, `previous` is untouched and the error is returned.
    pub fn build<F>(
        requirements: &[PoolRequirement],
        factory: &mut F,
        params: &BuildParams,
        mut previous: Option<&mut PoolTable<I>>,
    ) -> Result<Self>
    where
        F: ResourceFactory<Image = I>,
    {
        profile_function!();

        let frames = params.frames_in_flight;
        let plans: Vec<EntryPlan> = requirements
            .iter()
            .map(|requirement| {
                let extent = requirement.descriptor.resolve_extent(params.output_extent);
                let reuse = previous.as_deref().and_then(|table| {
                    table.find_reusable(requirement.descriptor_hash, extent, frames)
                });
                EntryPlan {
                    extent,
                    reuse_from: reuse.map(|(entry, _)| entry),
                    reused_slots: reuse.map_or(0, |(_, slots)| slots.min(requirement.count)),
                }
            })
            .collect();

        let fresh = {
            profile_scope!("create_pool_images");
            Self::create_slots(requirements, &plans, factory, frames)?
        };

        let mut fresh = fresh.into_iter();
        let mut entries = Vec::with_capacity(requirements.len());
        let mut reused = 0;

        for (requirement, plan) in requirements.iter().zip(&plans) {
            let mut slots = Vec::with_capacity(requirement.count);
            if let (Some(source), Some(table)) = (plan.reuse_from, previous.as_deref_mut()) {
                slots.extend(table.entries[source].slots.drain(..plan.reused_slots));
                reused += plan.reused_slots;
            }
            slots.extend(fresh.by_ref().take(requirement.count - plan.reused_slots));

            entries.push(PoolEntry {
                descriptor_hash: requirement.descriptor_hash,
                descriptor: requirement.descriptor,
                extent: plan.extent,
                slots,
            });
        }

        let table = Self {
            entries,
            frames_in_flight: frames,
        };

        if let Some(old) = previous {
            let retired = old.image_count();
            old.destroy(factory);
            log::debug!(
                "Pool rebuilt: {} image(s), {} slot(s) reused, {} image(s) retired",
                table.image_count(),
                reused,
                retired
            );
        } else {
            log::debug!("Pool built: {} image(s)", table.image_count());
        }
        profile_plot!("stage_pool_bytes", table.estimated_bytes() as f64);

        Ok(table)
    }

    /// Create every slot the plans don't reuse, in entry then slot order.
    fn create_slots<F>(
        requirements: &[PoolRequirement],
        plans: &[EntryPlan],
        factory: &mut F,
        frames: usize,
    ) -> Result<Vec<PooledSlot<I>>>
    where
        F: ResourceFactory<Image = I>,
    {
        let mut created: Vec<PooledSlot<I>> = Vec::new();

        for (requirement, plan) in requirements.iter().zip(plans) {
            for slot in plan.reused_slots..requirement.count {
                let mut images = Vec::with_capacity(frames);
                for frame_index in 0..frames {
                    let request = ImageRequest {
                        label: format!(
                            "stage_pool.{:016x}.{}.{}",
                            requirement.descriptor_hash, slot, frame_index
                        ),
                        descriptor: requirement.descriptor,
                        extent: plan.extent,
                        frame_index,
                    };

                    match factory.create_image(&request) {
                        Ok(image) => images.push(image),
                        Err(e) => {
                            let rolled_back = images.len() + created.len() * frames;
                            log::warn!(
                                "Failed to create {}: {}; rolling back {} image(s)",
                                request.label,
                                e,
                                rolled_back
                            );
                            for image in images {
                                factory.destroy_image(image);
                            }
                            for slot in created {
                                for image in slot.frames {
                                    factory.destroy_image(image);
                                }
                            }
                            return Err(e.into());
                        }
                    }
                }
                created.push(PooledSlot { frames: images });
            }
        }

        Ok(created)
    }

    /// Entry with matching hash and extent, and how many slots it still holds.
    fn find_reusable(
        &self,
        descriptor_hash: u64,
        extent: Extent3d,
        frames: usize,
    ) -> Option<(usize, usize)> {
        if self.frames_in_flight != frames {
            return None;
        }
        self.entries
            .iter()
            .position(|e| e.descriptor_hash == descriptor_hash && e.extent == extent)
            .map(|index| (index, self.entries[index].slots.len()))
    }

    /// Hand every image back to `factory`, leaving the table empty.
    pub fn destroy<F>(&mut self, factory: &mut F)
    where
        F: ResourceFactory<Image = I>,
    {
        for entry in self.entries.drain(..) {
            for slot in entry.slots {
                for image in slot.frames {
                    factory.destroy_image(image);
                }
            }
        }
    }

    /// Entries, parallel to the requirement list.
    pub fn entries(&self) -> &[PoolEntry<I>] {
        &self.entries
    }

    /// Entry for a descriptor hash.
    pub fn entry(&self, descriptor_hash: u64) -> Option<&PoolEntry<I>> {
        self.entries.iter().find(|e| e.descriptor_hash == descriptor_hash)
    }

    /// Image at `slot` of `entry` for the given in-flight frame.
    pub fn image(&self, entry: usize, slot: usize, frame_index: usize) -> Option<&I> {
        self.entries.get(entry)?.slots.get(slot)?.frame(frame_index)
    }

    /// Replicas per slot.
    pub fn frames_in_flight(&self) -> usize {
        self.frames_in_flight
    }

    /// Total number of physical images.
    pub fn image_count(&self) -> usize {
        self.entries
            .iter()
            .flat_map(|e| &e.slots)
            .map(|s| s.frames.len())
            .sum()
    }

    /// Approximate memory held by the whole pool.
    pub fn estimated_bytes(&self) -> u64 {
        self.entries.iter().map(PoolEntry::estimated_bytes).sum()
    }

    /// Check if the table holds no images.
    pub fn is_empty(&self) -> bool {
        self.image_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendError, DummyBackend, DummyImage};
    use crate::error::StageError;
    use crate::types::{TextureFormat, TextureUsage};

    fn relative() -> ResourceDescriptor {
        ResourceDescriptor::relative(TextureFormat::Rgba16Float, TextureUsage::RENDER_ATTACHMENT)
    }

    fn fixed() -> ResourceDescriptor {
        ResourceDescriptor::fixed(
            Extent3d::new_2d(256, 256),
            TextureFormat::R16Float,
            TextureUsage::STORAGE_BINDING,
        )
    }

    fn requirement(descriptor: ResourceDescriptor, count: usize) -> PoolRequirement {
        PoolRequirement {
            descriptor_hash: descriptor.requirements_hash(),
            descriptor,
            count,
        }
    }

    fn params(width: u32, height: u32) -> BuildParams {
        BuildParams {
            output_extent: Extent2d::new(width, height),
            frames_in_flight: 2,
        }
    }

    fn ids(table: &PoolTable<DummyImage>, entry: usize) -> Vec<u64> {
        table.entries()[entry]
            .slots
            .iter()
            .flat_map(|s| s.frames.iter().map(|i| i.id))
            .collect()
    }

    #[test]
    fn test_build_creates_slots_times_frames() {
        let mut backend = DummyBackend::new();
        let requirements = [requirement(relative(), 2), requirement(fixed(), 1)];
        let table = PoolTable::build(&requirements, &mut backend, &params(800, 600), None).unwrap();

        assert_eq!(table.image_count(), 6);
        assert_eq!(backend.live_count(), 6);
        assert_eq!(table.frames_in_flight(), 2);

        let image = table.image(0, 1, 1).unwrap();
        assert_eq!(image.extent, Extent3d::new_2d(800, 600));
        assert_eq!(image.frame_index, 1);
        assert_eq!(table.image(1, 0, 0).unwrap().extent, Extent3d::new_2d(256, 256));
        assert!(table.image(1, 1, 0).is_none());
        assert!(table.image(0, 0, 2).is_none());
        assert_eq!(table.entry(fixed().requirements_hash()).unwrap().slots.len(), 1);

        // Rgba16Float is 8 bytes, R16Float 2 bytes per texel.
        assert_eq!(table.entries()[0].estimated_bytes(), 800 * 600 * 8 * 4);
        assert_eq!(table.estimated_bytes(), 800 * 600 * 8 * 4 + 256 * 256 * 2 * 2);
    }

    #[test]
    fn test_rebuild_after_resize() {
        let mut backend = DummyBackend::new();
        let requirements = [requirement(relative(), 1), requirement(fixed(), 1)];
        let mut old = PoolTable::build(&requirements, &mut backend, &params(800, 600), None).unwrap();
        let old_relative = ids(&old, 0);
        let old_fixed = ids(&old, 1);

        let new = PoolTable::build(&requirements, &mut backend, &params(1024, 768), Some(&mut old)).unwrap();

        assert!(old.is_empty());
        assert_eq!(ids(&new, 1), old_fixed);
        assert!(ids(&new, 0).iter().all(|id| !old_relative.contains(id)));
        assert!(old_relative.iter().all(|&id| !backend.is_live(id)));
        assert_eq!(new.image(0, 0, 0).unwrap().extent, Extent3d::new_2d(1024, 768));
        assert_eq!(backend.live_count(), new.image_count());
    }

    #[test]
    fn test_rebuild_with_fewer_slots_retires_extra() {
        let mut backend = DummyBackend::new();
        let mut old =
            PoolTable::build(&[requirement(fixed(), 3)], &mut backend, &params(800, 600), None).unwrap();
        let old_ids = ids(&old, 0);

        let new = PoolTable::build(&[requirement(fixed(), 1)], &mut backend, &params(800, 600), Some(&mut old))
            .unwrap();

        assert_eq!(ids(&new, 0), old_ids[..2].to_vec());
        assert_eq!(backend.live_count(), 2);
        assert_eq!(backend.destroyed().len(), 4);
    }

    #[test]
    fn test_failure_rolls_back_and_keeps_previous() {
        let mut backend = DummyBackend::new();
        let requirements = [requirement(relative(), 2)];
        let mut old = PoolTable::build(&requirements, &mut backend, &params(800, 600), None).unwrap();
        let old_ids = ids(&old, 0);

        backend.fail_after(3);
        let result = PoolTable::build(&requirements, &mut backend, &params(640, 480), Some(&mut old));

        assert_eq!(result.unwrap_err(), StageError::AllocationFailure(BackendError::OutOfMemory));
        assert_eq!(ids(&old, 0), old_ids);
        assert!(old_ids.iter().all(|&id| backend.is_live(id)));
        assert_eq!(backend.live_count(), old_ids.len());
    }

    #[test]
    fn test_destroy_empties_table() {
        let mut backend = DummyBackend::new();
        let mut table =
            PoolTable::build(&[requirement(relative(), 1)], &mut backend, &params(8, 8), None).unwrap();
        table.destroy(&mut backend);
        assert!(table.is_empty());
        assert_eq!(backend.live_count(), 0);
    }
}
