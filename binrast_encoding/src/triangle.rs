// Copyright 2026 the Binrast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

pub const VERTICES_PER_TRIANGLE: usize = 3;

/// Points must carry at least x, y and depth.
pub const MIN_RENDER_DIMENSION: u32 = 3;

pub const DEFAULT_RENDER_DIMENSION: u32 = 3;

/// Flat buffer of projected triangles.
///
/// Each triangle is three points of `render_dimension` floats, stored point-major:
/// `data[(triangle * 3 + vertex) * render_dimension + axis]`. The first two axes are
/// the NDC x and y coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Triangles {
    render_dimension: u32,
    data: Vec<f32>,
}

impl Default for Triangles {
    fn default() -> Self {
        Self::new(DEFAULT_RENDER_DIMENSION)
    }
}

impl Triangles {
    pub fn new(render_dimension: u32) -> Self {
        Self {
            render_dimension,
            data: Vec::new(),
        }
    }

    /// Wraps an existing flat buffer.
    ///
    /// The buffer is taken as is; the host checks that its length is a whole
    /// number of triangles before dispatching.
    pub fn from_flat(render_dimension: u32, data: Vec<f32>) -> Self {
        Self {
            render_dimension,
            data,
        }
    }

    /// Appends a triangle given as three full points.
    pub fn push<const N: usize>(&mut self, points: [[f32; N]; 3]) {
        assert_eq!(
            N, self.render_dimension as usize,
            "point dimension does not match the render dimension"
        );
        for point in points {
            self.data.extend_from_slice(&point);
        }
    }

    /// Appends a triangle from its NDC (x, y) pairs; the remaining axes are zero.
    pub fn push_ndc(&mut self, points: [[f32; 2]; 3]) {
        let dimension = self.render_dimension as usize;
        for [x, y] in points {
            self.data.push(x);
            self.data.push(y);
            self.data
                .extend(std::iter::repeat(0.0).take(dimension.saturating_sub(2)));
        }
    }

    pub fn render_dimension(&self) -> u32 {
        self.render_dimension
    }

    /// Number of floats in one triangle.
    pub fn triangle_stride(&self) -> usize {
        VERTICES_PER_TRIANGLE * self.render_dimension as usize
    }

    /// Number of complete triangles in the buffer.
    pub fn len(&self) -> usize {
        match self.triangle_stride() {
            0 => 0,
            stride => self.data.len() / stride,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the buffer ends on a triangle boundary.
    pub fn is_well_formed(&self) -> bool {
        let stride = self.triangle_stride();
        stride != 0 && self.data.len() % stride == 0
    }

    /// Returns the (x, y) coordinates of the vertices of triangle `ix`.
    pub fn ndc_vertices(&self, ix: usize) -> [[f32; 2]; 3] {
        let dimension = self.render_dimension as usize;
        let base = ix * self.triangle_stride();
        std::array::from_fn(|vertex| {
            let offset = base + vertex * dimension;
            [self.data[offset], self.data[offset + 1]]
        })
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }
}
