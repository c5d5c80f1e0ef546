// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective rectification — warps the quadrilateral outlined by four
// corners onto an upright rectangle sized from the quad's own edges.

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use papercut_core::{PapercutError, Quad, Result};
use tracing::{debug, info, instrument};

use crate::codec::ensure_non_empty;
use crate::geometry::{destination_rectangle, distinct_points, order_points, shoelace_area};

/// Smallest output side the rectifier will produce. Below this the
/// destination corners collapse onto each other.
pub const MIN_OUTPUT_SIDE: u32 = 2;

/// Points closer than this (px) are treated as the same corner.
const COINCIDENT_TOLERANCE: f32 = 1e-3;

/// Minimum enclosed area (px²) of an acceptable quad.
const MIN_QUAD_AREA: f32 = 1.0;

/// Warp the region bounded by `quad` into a top-down image.
///
/// `quad` must be in the same coordinate space as `image` (original space);
/// corner order does not matter. Grayscale input stays grayscale, input with
/// alpha keeps its alpha, everything else is produced as RGB.
///
/// Fails with [`PapercutError::InvalidGeometry`] for non-finite corners,
/// coincident corners, zero-area (collinear) quads, or an output side shorter
/// than [`MIN_OUTPUT_SIDE`].
#[instrument(skip_all, fields(width = image.width(), height = image.height()))]
pub fn rectify(image: &DynamicImage, quad: &Quad) -> Result<DynamicImage> {
    ensure_non_empty(image)?;
    validate_corners(quad)?;

    let ordered = order_points(quad);
    let (out_w, out_h) = destination_rectangle(&ordered);
    debug!(
        top_left = ?ordered.points()[0],
        top_right = ?ordered.points()[1],
        bottom_right = ?ordered.points()[2],
        bottom_left = ?ordered.points()[3],
        out_w,
        out_h,
        "Corners ordered"
    );

    if out_w < MIN_OUTPUT_SIDE || out_h < MIN_OUTPUT_SIDE {
        return Err(PapercutError::InvalidGeometry(format!(
            "quad measures {out_w}x{out_h} px; both sides must be at least {MIN_OUTPUT_SIDE} px"
        )));
    }

    let right = (out_w - 1) as f32;
    let bottom = (out_h - 1) as f32;
    let dest: [(f32, f32); 4] = [
        (0.0, 0.0),      // top-left
        (right, 0.0),    // top-right
        (right, bottom), // bottom-right
        (0.0, bottom),   // bottom-left
    ];

    // from_control_points maps source corners onto `dest`; warp_into inverts
    // it so only positions inside the quad are sampled.
    let projection = Projection::from_control_points(ordered.to_tuples(), dest).ok_or_else(|| {
        PapercutError::InvalidGeometry("no projective transform maps these corners".into())
    })?;

    let output = match image {
        DynamicImage::ImageLuma8(gray) => {
            let mut out = GrayImage::new(out_w, out_h);
            warp_into(gray, &projection, Interpolation::Bilinear, Luma([0u8]), &mut out);
            DynamicImage::ImageLuma8(out)
        }
        other if other.color().has_alpha() => {
            let src = other.to_rgba8();
            let mut out = RgbaImage::new(out_w, out_h);
            warp_into(&src, &projection, Interpolation::Bilinear, Rgba([0u8, 0, 0, 0]), &mut out);
            DynamicImage::ImageRgba8(out)
        }
        other => {
            let src = other.to_rgb8();
            let mut out = RgbImage::new(out_w, out_h);
            warp_into(&src, &projection, Interpolation::Bilinear, Rgb([0u8, 0, 0]), &mut out);
            DynamicImage::ImageRgb8(out)
        }
    };

    info!(out_w, out_h, "Perspective rectification applied");
    Ok(output)
}

fn validate_corners(quad: &Quad) -> Result<()> {
    let points = quad.points();
    if let Some(bad) = points.iter().find(|p| !p.is_finite()) {
        return Err(PapercutError::InvalidGeometry(format!(
            "corner ({}, {}) is not a finite coordinate",
            bad.x, bad.y
        )));
    }

    let distinct = distinct_points(points, COINCIDENT_TOLERANCE);
    if distinct < 4 {
        return Err(PapercutError::InvalidGeometry(format!(
            "only {distinct} distinct corners supplied"
        )));
    }

    let area = shoelace_area(order_points(quad).points());
    if area < MIN_QUAD_AREA {
        return Err(PapercutError::InvalidGeometry(format!(
            "corners enclose {area:.3} px², the quad is degenerate"
        )));
    }
    Ok(())
}
