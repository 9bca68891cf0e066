//! Transient image pooling.
//!
//! Same-shaped images whose liveness intervals never overlap share one
//! physical image. Pooling runs in three steps:
//!
//! 1. [`size`] counts the peak number of simultaneously live bindings per
//!    descriptor hash.
//! 2. [`assign_slots`] binds every resource name to one slot of its pool.
//! 3. [`PoolTable::build`] creates each slot once per in-flight frame
//!    through a [`ResourceFactory`](crate::backend::ResourceFactory).

mod sizer;
mod slots;
mod table;

pub use sizer::{PoolRequirement, size};
pub use slots::{SlotAssignment, SlotIndex, assign_slots};
pub use table::{BuildParams, PoolEntry, PoolTable, PooledSlot};
