// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Corner preview — overlays a quad's edges and corner dots on a copy of the
// image so detections can be inspected by eye.

use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut, draw_line_segment_mut};
use papercut_core::Quad;

const EDGE_COLOUR: Rgb<u8> = Rgb([0, 255, 0]);
const OUTLINE_COLOUR: Rgb<u8> = Rgb([255, 255, 255]);

/// Draw `quad` (in `image`'s coordinate space) in index order.
///
/// Edges are green with a white centre line; corners are green dots with a
/// white ring. Sizes scale with the image so the overlay stays visible on
/// large photos.
pub fn draw_quad(image: &DynamicImage, quad: &Quad) -> RgbImage {
    let mut canvas = image.to_rgb8();
    let shorter = canvas.width().min(canvas.height()) as f32;
    let half_width = (shorter / 300.0).round().max(1.0) as i32;
    let dot_radius = (shorter / 80.0).round().max(3.0) as i32;

    let points = quad.points();
    for i in 0..4 {
        let start = points[i];
        let end = points[(i + 1) % 4];
        for offset in -half_width..=half_width {
            let o = offset as f32;
            draw_line_segment_mut(&mut canvas, (start.x + o, start.y), (end.x + o, end.y), EDGE_COLOUR);
            draw_line_segment_mut(&mut canvas, (start.x, start.y + o), (end.x, end.y + o), EDGE_COLOUR);
        }
        draw_line_segment_mut(&mut canvas, (start.x, start.y), (end.x, end.y), OUTLINE_COLOUR);
    }

    for p in points {
        let centre = (p.x.round() as i32, p.y.round() as i32);
        draw_filled_circle_mut(&mut canvas, centre, dot_radius, EDGE_COLOUR);
        draw_hollow_circle_mut(&mut canvas, centre, dot_radius + 2, OUTLINE_COLOUR);
    }

    canvas
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_are_marked_and_size_is_kept() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(200, 150, Rgb([10, 10, 10])));
        let quad = Quad::from_tuples([(20.0, 20.0), (180.0, 20.0), (180.0, 130.0), (20.0, 130.0)]);
        let out = draw_quad(&img, &quad);

        assert_eq!(out.dimensions(), (200, 150));
        assert_eq!(out.get_pixel(20, 20), &EDGE_COLOUR);
        assert_eq!(out.get_pixel(100, 100), &Rgb([10, 10, 10]));
    }

    #[test]
    fn off_canvas_corners_do_not_panic() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(50, 50));
        let quad = Quad::from_tuples([(-10.0, -10.0), (80.0, -5.0), (70.0, 90.0), (-20.0, 60.0)]);
        let out = draw_quad(&img, &quad);
        assert_eq!(out.dimensions(), (50, 50));
    }
}
