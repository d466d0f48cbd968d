// Copyright 2026 the Binrast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Brute-force reference binning.

use binrast::math::axis_ndc_from_screen;
use binrast::{Bin, BinQueueConfig, Triangles};

use crate::TestParams;

/// Inclusive overlap of the bounding rectangle of `vertices` with the NDC extent of `bin`.
pub fn overlaps(vertices: [[f32; 2]; 3], bin: &Bin, params: &TestParams) -> bool {
    let xs = vertices.map(|[x, _]| x);
    let ys = vertices.map(|[_, y]| y);
    let min = |v: [f32; 3]| v[0].min(v[1]).min(v[2]);
    let max = |v: [f32; 3]| v[0].max(v[1]).max(v[2]);

    let bx0 = axis_ndc_from_screen(bin.x, params.width);
    let bx1 = axis_ndc_from_screen(bin.x1(), params.width);
    let by0 = axis_ndc_from_screen(bin.y, params.height);
    let by1 = axis_ndc_from_screen(bin.y1(), params.height);

    min(xs) <= bx1 && bx0 <= max(xs) && min(ys) <= by1 && by0 <= max(ys)
}

/// For every bin in row-major order, the ascending indices of the triangles
/// overlapping it.
pub fn expected_bins(triangles: &Triangles, params: &TestParams) -> Vec<Vec<u32>> {
    let config = BinQueueConfig::new(params.bin_width, params.bin_height, params.queue_size);
    let mut bins = Vec::new();
    for y in 0..params.bins_y() {
        for x in 0..params.bins_x() {
            let bin = Bin::from_grid(params.screen(), &config, x, y);
            let hits = (0..triangles.len())
                .filter(|&ix| overlaps(triangles.ndc_vertices(ix), &bin, params))
                .map(|ix| ix as u32)
                .collect();
            bins.push(hits);
        }
    }
    bins
}
