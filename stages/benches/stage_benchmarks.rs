use criterion::{Criterion, black_box, criterion_group, criterion_main};

use redlilium_stages::compiler::{analyze, resolve};
use redlilium_stages::pool::{assign_slots, size};
use redlilium_stages::{
    DeclaredStage, DummyBackend, Extent2d, ResourceDescriptor, SchedulerConfig, Stage,
    StageDirector, StageKind, TextureFormat, TextureUsage,
};

fn color() -> ResourceDescriptor {
    ResourceDescriptor::relative(TextureFormat::Rgba16Float, TextureUsage::RENDER_ATTACHMENT)
}

/// Chain of `count` stages declared in reverse, the worst case for the
/// first-fit scan.
fn reversed_chain(count: usize) -> Vec<DeclaredStage> {
    (0..count)
        .rev()
        .map(|i| {
            let stage = DeclaredStage::new(format!("stage_{i}"), StageKind::Compute)
                .with_provides(format!("image_{i}"), color());
            if i == 0 {
                stage
            } else {
                stage.with_depends(format!("image_{}", i - 1))
            }
        })
        .collect()
}

/// A typical frame: 4 producers feeding a post-processing chain, with a
/// temporal accumulation resource.
fn typical_frame() -> Vec<DeclaredStage> {
    let mut stages = vec![
        DeclaredStage::new("shadow".into(), StageKind::Raster).with_provides("shadow_map", color()),
        DeclaredStage::new("gbuffer".into(), StageKind::Raster)
            .with_provides("albedo", color())
            .with_provides("normal", color()),
        DeclaredStage::new("raytrace".into(), StageKind::RayTracing)
            .with_depends("normal")
            .with_depends_previous("accum")
            .with_provides("accum", color()),
        DeclaredStage::new("lighting".into(), StageKind::Raster)
            .with_depends("albedo")
            .with_depends("shadow_map")
            .with_depends("accum")
            .with_provides("post_0", color()),
    ];
    for i in 1..8 {
        stages.push(
            DeclaredStage::new(format!("post_{i}"), StageKind::PostProcess)
                .with_depends(format!("post_{}", i - 1))
                .with_provides(format!("post_{i}"), color()),
        );
    }
    stages
}

fn as_dyn(stages: &[DeclaredStage]) -> Vec<&dyn Stage> {
    stages.iter().map(|s| s as &dyn Stage).collect()
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

fn bench_resolve_typical(c: &mut Criterion) {
    let stages = typical_frame();
    let stages = as_dyn(&stages);
    c.bench_function("resolve_typical_frame", |b| {
        b.iter(|| black_box(resolve(black_box(&stages)).unwrap()));
    });
}

fn bench_resolve_reversed_chain(c: &mut Criterion) {
    let stages = reversed_chain(64);
    let stages = as_dyn(&stages);
    c.bench_function("resolve_64_stages_reversed_chain", |b| {
        b.iter(|| black_box(resolve(black_box(&stages)).unwrap()));
    });
}

// ---------------------------------------------------------------------------
// Liveness and pooling
// ---------------------------------------------------------------------------

fn bench_analyze_and_size(c: &mut Criterion) {
    let stages = typical_frame();
    let stages = as_dyn(&stages);
    let order = resolve(&stages).unwrap();
    c.bench_function("analyze_size_assign_typical_frame", |b| {
        b.iter(|| {
            let bindings = analyze(&stages, &order);
            let requirements = size(&bindings, order.len());
            black_box(assign_slots(&bindings, &requirements).unwrap());
        });
    });
}

fn bench_initialize_dummy(c: &mut Criterion) {
    let stages = typical_frame();
    let stages = as_dyn(&stages);
    c.bench_function("initialize_typical_frame_dummy", |b| {
        b.iter_with_setup(
            || (DummyBackend::new(), StageDirector::new(SchedulerConfig::default())),
            |(mut backend, mut director)| {
                director
                    .initialize_or_update(&stages, Extent2d::new(1920, 1080), &mut backend)
                    .unwrap();
                director.cleanup(&mut backend);
            },
        );
    });
}

fn bench_resize_dummy(c: &mut Criterion) {
    let stages = typical_frame();
    let stages = as_dyn(&stages);
    let mut backend = DummyBackend::new();
    let mut director = StageDirector::new(SchedulerConfig::default());
    let mut width = 1280;
    c.bench_function("resize_typical_frame_dummy", |b| {
        b.iter(|| {
            width = if width == 1280 { 1920 } else { 1280 };
            black_box(
                director
                    .initialize_or_update(&stages, Extent2d::new(width, 720), &mut backend)
                    .unwrap()
                    .pool_image_count(),
            );
        });
    });
    director.cleanup(&mut backend);
}

criterion_group!(
    benches,
    bench_resolve_typical,
    bench_resolve_reversed_chain,
    bench_analyze_and_size,
    bench_initialize_dummy,
    bench_resize_dummy,
);
criterion_main!(benches);
