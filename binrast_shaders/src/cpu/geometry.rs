// Copyright 2026 the Binrast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conservative triangle against bin classification.
//!
//! Both the triangle and the bin are reduced to axis-aligned rectangles in NDC.
//! Triangles whose rectangle touches a bin edge are assigned to every bin
//! sharing that edge.

use binrast_encoding::math::axis_ndc_from_screen;
use binrast_encoding::{Bin, ScreenDimension};

/// Axis-aligned rectangle, bounds inclusive.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        self.x0 <= x && x <= self.x1 && self.y0 <= y && y <= self.y1
    }

    fn has_corner_in(&self, bounds: &Self) -> bool {
        bounds.contains(self.x0, self.y0)
            || bounds.contains(self.x0, self.y1)
            || bounds.contains(self.x1, self.y0)
            || bounds.contains(self.x1, self.y1)
    }

    // A horizontal span inside `other`'s and a vertical span around it: the two
    // rectangles form a cross and no corner of either lies in the other.
    fn crosses(&self, other: &Self) -> bool {
        other.x0 <= self.x0
            && self.x1 <= other.x1
            && self.y0 <= other.y0
            && other.y1 <= self.y1
    }
}

fn min3(a: f32, b: f32, c: f32) -> f32 {
    a.min(b.min(c))
}

fn max3(a: f32, b: f32, c: f32) -> f32 {
    a.max(b.max(c))
}

pub fn triangle_bounds(x: [f32; 3], y: [f32; 3]) -> Rect {
    Rect {
        x0: min3(x[0], x[1], x[2]),
        y0: min3(y[0], y[1], y[2]),
        x1: max3(x[0], x[1], x[2]),
        y1: max3(y[0], y[1], y[2]),
    }
}

/// The pixel rectangle of `bin`, expressed in NDC.
pub fn bin_bounds(bin: &Bin, dim: ScreenDimension) -> Rect {
    Rect {
        x0: axis_ndc_from_screen(bin.x, dim.width),
        y0: axis_ndc_from_screen(bin.y, dim.height),
        x1: axis_ndc_from_screen(bin.x1(), dim.width),
        y1: axis_ndc_from_screen(bin.y1(), dim.height),
    }
}

/// Inclusive rectangle overlap.
///
/// Corner containment is checked in both directions, since a rectangle can hold
/// another without any of its own corners lying inside it.
pub fn rects_intersect(a: &Rect, b: &Rect) -> bool {
    a.has_corner_in(b) || b.has_corner_in(a) || a.crosses(b) || b.crosses(a)
}

/// Returns true if the triangle with vertex coordinates `x`, `y` may cover `bin`.
pub fn is_triangle_in_bin(x: [f32; 3], y: [f32; 3], bin: &Bin, dim: ScreenDimension) -> bool {
    rects_intersect(&triangle_bounds(x, y), &bin_bounds(bin, dim))
}
