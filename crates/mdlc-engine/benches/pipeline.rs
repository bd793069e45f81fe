use criterion::{Criterion, criterion_group, criterion_main};
use mdlc_engine::placeholder::resolve_placeholders;
use mdlc_engine::{PulldownRenderer, render_markdown, render_preview};
mod common;

fn bench_preview_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(10);

    let blocks = common::generate_blocks(50);
    let images = common::generate_images(4);
    let note = common::generate_note(200, 50);

    group.bench_function("resolve_placeholders", |b| {
        b.iter(|| {
            let resolved = resolve_placeholders(std::hint::black_box(&note), &blocks, &images);
            std::hint::black_box(resolved);
        });
    });

    let resolved = resolve_placeholders(&note, &blocks, &images);
    group.bench_function("render_markdown", |b| {
        let renderer = PulldownRenderer::new();
        b.iter(|| {
            let html = render_markdown(&renderer, std::hint::black_box(&resolved));
            std::hint::black_box(html);
        });
    });

    group.bench_function("render_preview", |b| {
        b.iter(|| {
            let html = render_preview(std::hint::black_box(&note), &blocks, &images);
            std::hint::black_box(html);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_preview_pipeline);
criterion_main!(benches);
