//! Shared fixtures for the scheduler integration tests.

#![allow(dead_code)]

use redlilium_stages::{
    DeclaredStage, Extent3d, ResourceDescriptor, Stage, StageKind, TextureFormat, TextureUsage,
};

/// Route `log` output through the test harness.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Relative HDR color target.
pub fn hdr() -> ResourceDescriptor {
    ResourceDescriptor::relative(
        TextureFormat::Rgba16Float,
        TextureUsage::RENDER_ATTACHMENT | TextureUsage::TEXTURE_BINDING,
    )
}

/// Relative depth buffer.
pub fn depth() -> ResourceDescriptor {
    ResourceDescriptor::relative(
        TextureFormat::Depth32Float,
        TextureUsage::RENDER_ATTACHMENT | TextureUsage::TEXTURE_BINDING,
    )
}

/// Fixed-size lookup table that must survive resizes.
pub fn lut() -> ResourceDescriptor {
    ResourceDescriptor::fixed(
        Extent3d::new_3d(32, 32, 32),
        TextureFormat::Rgba8Unorm,
        TextureUsage::STORAGE_BINDING | TextureUsage::TEXTURE_BINDING,
    )
}

/// A deferred frame with ray-traced reflections and temporal accumulation,
/// declared out of execution order.
pub fn deferred_frame() -> Vec<DeclaredStage> {
    vec![
        DeclaredStage::new("ui".into(), StageKind::Ui)
            .with_depends("ldr")
            .with_provides("final", hdr()),
        DeclaredStage::new("tonemap".into(), StageKind::PostProcess)
            .with_depends("lit")
            .with_depends("grading_lut")
            .with_provides("ldr", hdr()),
        DeclaredStage::new("gbuffer".into(), StageKind::Raster)
            .with_provides("albedo", hdr())
            .with_provides("normal", hdr())
            .with_provides("depth", depth()),
        DeclaredStage::new("lut_bake".into(), StageKind::Compute).with_provides("grading_lut", lut()),
        DeclaredStage::new("reflections".into(), StageKind::RayTracing)
            .with_depends("normal")
            .with_depends("depth")
            .with_depends_previous("accumulation")
            .with_provides("accumulation", hdr()),
        DeclaredStage::new("lighting".into(), StageKind::Raster)
            .with_depends("albedo")
            .with_depends("normal")
            .with_depends("accumulation")
            .with_provides("lit", hdr()),
    ]
}

/// Borrow declared stages as trait objects.
pub fn as_dyn(stages: &[DeclaredStage]) -> Vec<&dyn Stage> {
    stages.iter().map(|s| s as &dyn Stage).collect()
}

/// A linear chain of `count` stages, each reading its predecessor's output.
pub fn chain(count: usize) -> Vec<DeclaredStage> {
    (0..count)
        .map(|i| {
            let stage = DeclaredStage::new(format!("stage_{i}"), StageKind::Compute)
                .with_provides(format!("image_{i}"), hdr());
            if i == 0 {
                stage
            } else {
                stage.with_depends(format!("image_{}", i - 1))
            }
        })
        .collect()
}
