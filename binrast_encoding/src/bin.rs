// Copyright 2026 the Binrast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use bytemuck::{Pod, Zeroable};

/// Size of the render target in pixels.
#[derive(Copy, Clone, Pod, Zeroable, Debug, Default, PartialEq, Eq)]
#[repr(C)]
pub struct ScreenDimension {
    pub width: u32,
    pub height: u32,
}

impl ScreenDimension {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns true if the screen covers no pixels.
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Bin size and per-bin queue capacity.
#[derive(Copy, Clone, Pod, Zeroable, Debug, Default, PartialEq, Eq)]
#[repr(C)]
pub struct BinQueueConfig {
    pub bin_width: u32,
    pub bin_height: u32,
    /// Maximum number of triangle indices a single bin queue can hold.
    pub queue_size: u32,
}

impl BinQueueConfig {
    pub const fn new(bin_width: u32, bin_height: u32, queue_size: u32) -> Self {
        Self {
            bin_width,
            bin_height,
            queue_size,
        }
    }

    /// Number of bins needed to cover the screen horizontally.
    pub const fn bins_x(&self, dim: ScreenDimension) -> u32 {
        dim.width.div_ceil(self.bin_width)
    }

    /// Number of bins needed to cover the screen vertically.
    pub const fn bins_y(&self, dim: ScreenDimension) -> u32 {
        dim.height.div_ceil(self.bin_height)
    }

    /// Number of `u32` slots a single queue occupies, including its empty flag.
    pub const fn queue_stride(&self) -> u32 {
        self.queue_size + 1
    }
}

/// A rectangular region of the screen, in pixels.
///
/// Bins on the right and bottom edges of the screen are clipped, so they may be
/// smaller than the configured bin size.
#[derive(Copy, Clone, Pod, Zeroable, Debug, Default, PartialEq, Eq)]
#[repr(C)]
pub struct Bin {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Bin {
    /// Computes the bin at grid position (`index_x`, `index_y`).
    pub fn from_grid(dim: ScreenDimension, config: &BinQueueConfig, index_x: u32, index_y: u32) -> Self {
        let x = index_x * config.bin_width;
        let y = index_y * config.bin_height;
        Self {
            x,
            y,
            width: dim.width.saturating_sub(x).min(config.bin_width),
            height: dim.height.saturating_sub(y).min(config.bin_height),
        }
    }

    /// Exclusive right edge.
    pub const fn x1(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub const fn y1(&self) -> u32 {
        self.y + self.height
    }

    pub const fn contains(&self, x: u32, y: u32) -> bool {
        self.x <= x && x < self.x1() && self.y <= y && y < self.y1()
    }
}

#[cfg(test)]
mod tests {
    use super::{Bin, BinQueueConfig, ScreenDimension};

    #[test]
    fn grid_rounds_up() {
        let config = BinQueueConfig::new(32, 32, 4);
        let dim = ScreenDimension::new(100, 64);
        assert_eq!(config.bins_x(dim), 4);
        assert_eq!(config.bins_y(dim), 2);
    }

    #[test]
    fn edge_bins_are_clipped() {
        let config = BinQueueConfig::new(32, 24, 4);
        let dim = ScreenDimension::new(100, 50);
        let last = Bin::from_grid(dim, &config, config.bins_x(dim) - 1, config.bins_y(dim) - 1);
        assert_eq!(last, Bin { x: 96, y: 48, width: 4, height: 2 });
        assert_eq!(last.x1(), dim.width);
        assert_eq!(last.y1(), dim.height);

        let interior = Bin::from_grid(dim, &config, 1, 1);
        assert_eq!(interior, Bin { x: 32, y: 24, width: 32, height: 24 });
    }

    #[test]
    fn contains_is_half_open() {
        let bin = Bin { x: 32, y: 0, width: 32, height: 32 };
        assert!(bin.contains(32, 0));
        assert!(bin.contains(63, 31));
        assert!(!bin.contains(64, 0));
        assert!(!bin.contains(31, 0));
    }
}
