// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Quadrilateral geometry — corner ordering, output sizing, areas, and the
// crossing test used to constrain interactive corner drags.

use std::cmp::Ordering;

use papercut_core::{Point, Quad};

/// Order four points as `[top_left, top_right, bottom_right, bottom_left]`.
///
/// The two smallest-x points form the left pair and are split by y. The right
/// pair is split by distance from the top-left corner: the farther point is
/// the bottom-right (the diagonal is the longest span of a near-rectangle).
///
/// Points sharing an x coordinate are not separately disambiguated; the
/// stable sort keeps their input order.
pub fn order_points(quad: &Quad) -> Quad {
    let mut by_x = *quad.points();
    by_x.sort_by(|a, b| a.x.total_cmp(&b.x));

    let (top_left, bottom_left) = match by_x[0].y.total_cmp(&by_x[1].y) {
        Ordering::Greater => (by_x[1], by_x[0]),
        _ => (by_x[0], by_x[1]),
    };

    let (right_a, right_b) = (by_x[2], by_x[3]);
    let (top_right, bottom_right) =
        if top_left.distance(&right_a) > top_left.distance(&right_b) {
            (right_b, right_a)
        } else {
            (right_a, right_b)
        };

    Quad::new([top_left, top_right, bottom_right, bottom_left])
}

/// Size of the upright rectangle an ordered quad is warped onto.
///
/// Uses the longer of each pair of opposite edges so that foreshortened
/// content is not cropped. Each side is floored to whole pixels.
pub fn destination_rectangle(ordered: &Quad) -> (u32, u32) {
    let [tl, tr, br, bl] = *ordered.points();

    let width = bl.distance(&br).max(tl.distance(&tr));
    let height = tl.distance(&bl).max(tr.distance(&br));

    (floor_to_u32(width), floor_to_u32(height))
}

fn floor_to_u32(value: f32) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.floor() as u32
    } else {
        0
    }
}

/// Signed polygon area (shoelace). Positive for clockwise order in image
/// coordinates (y grows downward).
pub fn signed_area(points: &[Point]) -> f32 {
    let n = points.len();
    let mut twice = 0.0f32;
    for i in 0..n {
        let j = (i + 1) % n;
        twice += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    twice / 2.0
}

/// Unsigned polygon area.
pub fn shoelace_area(points: &[Point]) -> f32 {
    signed_area(points).abs()
}

/// Number of pairwise-distinct points (closer than `tolerance` counts as equal).
pub fn distinct_points(points: &[Point], tolerance: f32) -> usize {
    let mut distinct: Vec<Point> = Vec::with_capacity(points.len());
    for p in points {
        if distinct.iter().all(|q| q.distance(p) > tolerance) {
            distinct.push(*p);
        }
    }
    distinct.len()
}

/// True when the quad, taken in index order, is a simple polygon (no two
/// edges cross) with non-negligible area.
pub fn is_simple_quad(points: &[Point; 4]) -> bool {
    if shoelace_area(points) < f32::EPSILON {
        return false;
    }
    // Only opposite edges can properly cross in a quadrilateral.
    !segments_cross(points[0], points[1], points[2], points[3])
        && !segments_cross(points[1], points[2], points[3], points[0])
}

fn cross(o: Point, a: Point, b: Point) -> f32 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn segments_cross(p1: Point, p2: Point, q1: Point, q2: Point) -> bool {
    let d1 = cross(q1, q2, p1);
    let d2 = cross(q1, q2, p2);
    let d3 = cross(p1, p2, q1);
    let d4 = cross(p1, p2, q2);
    straddles(d1, d2) && straddles(d3, d4)
}

fn straddles(a: f32, b: f32) -> bool {
    (a > 0.0 && b < 0.0) || (a < 0.0 && b > 0.0)
}
