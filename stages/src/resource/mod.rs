//! Transient resource descriptions.
//!
//! A [`ResourceDescriptor`] describes the shape of an image; a
//! [`ResourceReference`] is how a stage names that image and says whether it
//! produces it, reads it this frame, or reads last frame's value.

mod descriptor;
mod reference;

pub use descriptor::{ResourceDescriptor, SizePolicy};
pub use reference::{ReferenceKind, ResourceReference};
