// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the papercut-engine scan pipeline: corner
// detection, rectification, and enhancement on synthetic photos.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, GrayImage, Luma};

use papercut_core::Quad;
use papercut_engine::{CornerDetector, ScanEnhancer, rectify};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A light page on a dark desk, roughly the size of a phone photo's working
/// copy after one halving.
fn synthetic_photo() -> DynamicImage {
    let (width, height) = (800u32, 1000u32);
    let mut img = GrayImage::from_pixel(width, height, Luma([30u8]));
    for y in 120..880 {
        for x in 100..700 {
            img.put_pixel(x, y, Luma([235u8]));
        }
    }
    DynamicImage::ImageLuma8(img)
}

fn page_quad() -> Quad {
    Quad::from_tuples([(100.0, 120.0), (699.0, 120.0), (699.0, 879.0), (100.0, 879.0)])
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_detect(c: &mut Criterion) {
    let photo = synthetic_photo();
    let detector = CornerDetector::default();

    c.bench_function("detect (800x1000)", |b| {
        b.iter(|| black_box(detector.detect(black_box(&photo))));
    });
}

/// Uniform input: no contour qualifies, so this measures the full pipeline
/// ending in the fallback path.
fn bench_detect_fallback(c: &mut Criterion) {
    let blank = DynamicImage::ImageLuma8(GrayImage::from_pixel(800, 1000, Luma([128u8])));
    let detector = CornerDetector::default();

    c.bench_function("detect_fallback (800x1000)", |b| {
        b.iter(|| black_box(detector.detect(black_box(&blank))));
    });
}

fn bench_rectify(c: &mut Criterion) {
    let photo = synthetic_photo();
    let quad = page_quad();

    c.bench_function("rectify (600x760 out)", |b| {
        b.iter(|| black_box(rectify(black_box(&photo), black_box(&quad))));
    });
}

fn bench_enhance(c: &mut Criterion) {
    let photo = synthetic_photo();
    let enhancer = ScanEnhancer::default();

    c.bench_function("enhance (800x1000)", |b| {
        b.iter(|| black_box(enhancer.enhance(black_box(&photo))));
    });
}

criterion_group!(
    benches,
    bench_detect,
    bench_detect_fallback,
    bench_rectify,
    bench_enhance
);
criterion_main!(benches);
