//! Stage graph compilation.
//!
//! Turns the engine's stage list into an execution order and per-resource
//! liveness intervals.
//!
//! The resolver performs a repeated, stable first-fit linear scan: on every
//! pass it places the first not-yet-placed stage whose dependencies are all
//! satisfied. Ties are broken by input order, so the same stage list always
//! resolves to the same order. The scan is O(stages²), which is fine for the
//! tens of stages a frame typically has.
//!
//! # Example
//!
//! ```
//! use redlilium_stages::{DeclaredStage, ResourceDescriptor, Stage, StageKind, TextureFormat, TextureUsage};
//! use redlilium_stages::compiler::resolve;
//!
//! let color = ResourceDescriptor::relative(TextureFormat::Rgba8Unorm, TextureUsage::RENDER_ATTACHMENT);
//! let tonemap = DeclaredStage::new("tonemap".into(), StageKind::PostProcess)
//!     .with_depends("hdr")
//!     .with_provides("ldr", color);
//! let lighting = DeclaredStage::new("lighting".into(), StageKind::Raster)
//!     .with_provides("hdr", color);
//!
//! let stages: [&dyn Stage; 2] = [&tonemap, &lighting];
//! let order = resolve(&stages).unwrap();
//! assert_eq!(order.indices(), &[1, 0]);
//! ```

mod liveness;

pub use liveness::{ScheduleBinding, analyze};

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{Result, StageError};
use crate::profiling::profile_function;
use crate::resource::ReferenceKind;
use crate::stage::Stage;

/// A resolved stage execution order.
///
/// Stores indices into the stage slice passed to [`resolve`], never the
/// stages themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageOrder {
    indices: Vec<usize>,
}

impl StageOrder {
    /// Create an order from input indices.
    #[cfg(test)]
    pub(crate) fn new(indices: Vec<usize>) -> Self {
        Self { indices }
    }

    /// Input indices in execution order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Number of ordered stages.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Check if the order is empty.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Execution position of the stage at `input_index`.
    pub fn position_of(&self, input_index: usize) -> Option<usize> {
        self.indices.iter().position(|&i| i == input_index)
    }
}

/// Resolve a valid execution order for `stages`.
///
/// A `Depends` reference is satisfied once an already placed stage provides
/// the name. A `DependsPrevious` reference reads last frame's value and is
/// satisfied as soon as any stage in the graph provides the name.
///
/// # Errors
///
/// * [`StageError::DuplicateResourceName`] if two stages provide the same
///   name, regardless of their order in `stages`.
/// * [`StageError::UnsatisfiableDependency`] if a scan places nothing, which
///   covers both cycles and names nobody provides.
/// * [`StageError::InvalidConfiguration`] if a provided reference carries no
///   descriptor.
pub fn resolve(stages: &[&dyn Stage]) -> Result<StageOrder> {
    profile_function!();

    let producers = collect_producers(stages)?;

    let n = stages.len();
    let mut placed = vec![false; n];
    let mut provided: FxHashSet<&str> = FxHashSet::default();
    let mut indices = Vec::with_capacity(n);

    while indices.len() < n {
        let next = (0..n).find(|&i| {
            !placed[i] && first_unmet_dependency(stages[i], &provided, &producers).is_none()
        });

        let Some(index) = next else {
            return Err(unsatisfiable(stages, &placed, &provided, &producers));
        };

        placed[index] = true;
        indices.push(index);
        provided.extend(stages[index].provides().iter().map(|r| r.name()));
    }

    if log::log_enabled!(log::Level::Debug) {
        let names: Vec<&str> = indices.iter().map(|&i| stages[i].name()).collect();
        log::debug!("Resolved stage order: {:?}", names);
    }

    Ok(StageOrder { indices })
}

/// Map every provided name to the input index of its producer.
fn collect_producers<'a>(stages: &[&'a dyn Stage]) -> Result<FxHashMap<&'a str, usize>> {
    let mut producers: FxHashMap<&'a str, usize> = FxHashMap::default();

    for (index, stage) in stages.iter().enumerate() {
        for reference in stage.provides() {
            if reference.descriptor().is_none() {
                return Err(StageError::InvalidConfiguration(format!(
                    "stage \"{}\" provides \"{}\" without a descriptor",
                    stage.name(),
                    reference.name()
                )));
            }
            if let Some(&first) = producers.get(reference.name()) {
                return Err(StageError::DuplicateResourceName {
                    name: reference.name().to_owned(),
                    first: stages[first].name().to_owned(),
                    second: stage.name().to_owned(),
                });
            }
            producers.insert(reference.name(), index);
        }
    }

    Ok(producers)
}

fn first_unmet_dependency<'a>(
    stage: &'a dyn Stage,
    provided: &FxHashSet<&str>,
    producers: &FxHashMap<&str, usize>,
) -> Option<&'a str> {
    stage
        .depends()
        .iter()
        .find(|reference| match reference.kind() {
            ReferenceKind::DependsPrevious => !producers.contains_key(reference.name()),
            _ => !provided.contains(reference.name()),
        })
        .map(|reference| reference.name())
}

fn unsatisfiable(
    stages: &[&dyn Stage],
    placed: &[bool],
    provided: &FxHashSet<&str>,
    producers: &FxHashMap<&str, usize>,
) -> StageError {
    let remaining: Vec<usize> = (0..stages.len()).filter(|&i| !placed[i]).collect();
    let missing = remaining
        .first()
        .and_then(|&i| first_unmet_dependency(stages[i], provided, producers))
        .unwrap_or_default()
        .to_owned();

    StageError::UnsatisfiableDependency {
        remaining: remaining.iter().map(|&i| stages[i].name().to_owned()).collect(),
        missing,
    }
}
