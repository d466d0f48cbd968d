// Copyright 2026 the Binrast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Triangle scenes for the demos and tests, all generated from a fixed seed.

// LINEBENDER LINT SET - lib.rs - v2
// See https://linebender.org/wiki/canonical-lints/
// These lints aren't included in Cargo.toml because they
// shouldn't apply to examples and tests
#![warn(unused_crate_dependencies)]
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET

use binrast::Triangles;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// `count` triangles with vertices anywhere in `[-extent, extent]`, in
/// `render_dimension` dimensions with random depth and extra axes.
pub fn random_triangles(seed: u64, count: usize, render_dimension: u32, extent: f32) -> Triangles {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut data = Vec::with_capacity(count * 3 * render_dimension as usize);
    for _ in 0..count * 3 {
        data.push(rng.gen_range(-extent..=extent));
        data.push(rng.gen_range(-extent..=extent));
        for _ in 2..render_dimension {
            data.push(rng.gen_range(0.0..1.0));
        }
    }
    Triangles::from_flat(render_dimension, data)
}

/// `count` triangles no wider than `size` in NDC, centered anywhere on the screen.
///
/// Axes past x and y are zero.
pub fn small_triangles(seed: u64, count: usize, render_dimension: u32, size: f32) -> Triangles {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut triangles = Triangles::new(render_dimension);
    for _ in 0..count {
        let cx: f32 = rng.gen_range(-1.0..1.0);
        let cy: f32 = rng.gen_range(-1.0..1.0);
        let mut vertex = || {
            [
                cx + rng.gen_range(-size..=size) / 2.0,
                cy + rng.gen_range(-size..=size) / 2.0,
            ]
        };
        let points = [vertex(), vertex(), vertex()];
        triangles.push_ndc(points);
    }
    triangles
}

/// `count` copies of a triangle whose bounding box is the whole screen.
pub fn full_screen(count: usize) -> Triangles {
    let mut triangles = Triangles::default();
    for _ in 0..count {
        triangles.push_ndc([[-1.0, -1.0], [1.0, -1.0], [-1.0, 1.0]]);
    }
    triangles
}

/// One tiny triangle at the center of every cell of a `columns` x `rows` grid
/// over NDC, row-major.
pub fn grid(columns: u32, rows: u32) -> Triangles {
    let mut triangles = Triangles::default();
    let cell_w = 2.0 / columns as f32;
    let cell_h = 2.0 / rows as f32;
    for row in 0..rows {
        for column in 0..columns {
            let cx = -1.0 + (column as f32 + 0.5) * cell_w;
            let cy = -1.0 + (row as f32 + 0.5) * cell_h;
            let (dx, dy) = (cell_w * 0.1, cell_h * 0.1);
            triangles.push_ndc([[cx - dx, cy - dy], [cx + dx, cy - dy], [cx, cy + dy]]);
        }
    }
    triangles
}
