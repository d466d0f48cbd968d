// Copyright 2026 the Binrast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use bytemuck::{Pod, Zeroable};

use crate::{BinQueueConfig, QueueLayout, ScreenDimension, VERTICES_PER_TRIANGLE};

/// Uniform configuration block read by every invocation of `bin_rasterize`.
#[derive(Clone, Copy, Debug, Default, Zeroable, Pod)]
#[repr(C)]
pub struct BinningUniform {
    /// Size of the render target in pixels.
    pub screen: ScreenDimension,
    /// Bin size and queue capacity.
    pub queues: BinQueueConfig,
    /// Number of triangles in the triangle buffer.
    pub triangle_count: u32,
    /// Number of floats per point.
    pub render_dimension: u32,
    /// Width of the screen in bins.
    pub bins_x: u32,
    /// Height of the screen in bins.
    pub bins_y: u32,
}

impl BinningUniform {
    pub fn new(
        screen: ScreenDimension,
        queues: BinQueueConfig,
        triangle_count: u32,
        render_dimension: u32,
    ) -> Self {
        Self {
            screen,
            queues,
            triangle_count,
            render_dimension,
            bins_x: queues.bins_x(screen),
            bins_y: queues.bins_y(screen),
        }
    }

    pub fn bins_per_layer(&self) -> u32 {
        self.bins_x * self.bins_y
    }
}

/// CPU side setup and configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct RasterConfig {
    /// Kernel side configuration.
    pub gpu: BinningUniform,
    /// Workgroup counts and sizes of the dispatch.
    pub workgroup_counts: WorkgroupCounts,
    /// Sizes of all buffer resources.
    pub buffer_sizes: BufferSizes,
}

impl RasterConfig {
    pub fn new(gpu: BinningUniform, workgroups: (u32, u32)) -> Self {
        let workgroup_counts = WorkgroupCounts::new(&gpu, workgroups);
        let buffer_sizes = BufferSizes::new(&gpu, &workgroup_counts);
        Self {
            gpu,
            workgroup_counts,
            buffer_sizes,
        }
    }

    pub fn queue_layout(&self) -> QueueLayout {
        QueueLayout {
            queue_size: self.gpu.queues.queue_size,
            bins_x: self.gpu.bins_x,
            bins_y: self.gpu.bins_y,
            layers: self.workgroup_counts.layers(),
        }
    }
}

/// Type alias for a workgroup size.
pub type WorkgroupSize = (u32, u32, u32);

/// Shape of the `bin_rasterize` dispatch.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkgroupCounts {
    /// Number of workgroups along each axis.
    pub bin_rasterize: WorkgroupSize,
    /// Invocations per workgroup, one per bin.
    pub bin_rasterize_local: WorkgroupSize,
}

impl WorkgroupCounts {
    pub fn new(gpu: &BinningUniform, workgroups: (u32, u32)) -> Self {
        Self {
            bin_rasterize: (workgroups.0, workgroups.1, 1),
            bin_rasterize_local: (gpu.bins_x, gpu.bins_y, 1),
        }
    }

    /// Number of workgroups, which is also the number of queue layers.
    pub fn layers(&self) -> u32 {
        let (x, y, z) = self.bin_rasterize;
        x * y * z
    }

    pub fn workgroup_invocations(&self) -> u32 {
        let (x, y, z) = self.bin_rasterize_local;
        x * y * z
    }

    /// Total number of invocations in the dispatch.
    pub fn invocations(&self) -> usize {
        self.layers() as usize * self.workgroup_invocations() as usize
    }
}

/// Typed buffer size primitive.
#[derive(Copy, Clone, Eq, Default, Debug)]
pub struct BufferSize<T: Sized> {
    len: u32,
    _phantom: std::marker::PhantomData<T>,
}

impl<T: Sized> BufferSize<T> {
    /// Creates a new buffer size from number of elements.
    ///
    /// Every binding holds at least one element.
    pub const fn new(len: u32) -> Self {
        Self {
            len: if len > 0 { len } else { 1 },
            _phantom: std::marker::PhantomData,
        }
    }

    /// Returns the number of elements.
    #[expect(clippy::len_without_is_empty, reason = "The buffer can never be empty")]
    pub const fn len(self) -> u32 {
        self.len
    }

    /// Returns the size in bytes.
    pub const fn size_in_bytes(self) -> u32 {
        size_of::<T>() as u32 * self.len
    }
}

impl<T: Sized> PartialEq for BufferSize<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len
    }
}

/// Computed sizes for all buffers bound to `bin_rasterize`.
#[derive(Copy, Clone, Debug, Default)]
pub struct BufferSizes {
    pub config: BufferSize<BinningUniform>,
    pub triangles: BufferSize<f32>,
    pub overflow: BufferSize<u32>,
    pub bin_queues: BufferSize<u32>,
}

impl BufferSizes {
    pub fn new(gpu: &BinningUniform, workgroups: &WorkgroupCounts) -> Self {
        let triangle_floats =
            gpu.triangle_count * VERTICES_PER_TRIANGLE as u32 * gpu.render_dimension;
        let bin_queues =
            gpu.queues.queue_stride() * gpu.bins_per_layer() * workgroups.layers();
        Self {
            config: BufferSize::new(1),
            triangles: BufferSize::new(triangle_floats),
            overflow: BufferSize::new(1),
            bin_queues: BufferSize::new(bin_queues),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_follow_the_bin_grid() {
        let gpu = BinningUniform::new(
            ScreenDimension::new(100, 64),
            BinQueueConfig::new(32, 32, 7),
            10,
            4,
        );
        assert_eq!((gpu.bins_x, gpu.bins_y), (4, 2));
        let config = RasterConfig::new(gpu, (2, 1));
        assert_eq!(config.workgroup_counts.bin_rasterize_local, (4, 2, 1));
        assert_eq!(config.workgroup_counts.invocations(), 16);
        assert_eq!(config.buffer_sizes.triangles.len(), 10 * 3 * 4);
        assert_eq!(config.buffer_sizes.bin_queues.len(), 8 * 8 * 2);
        assert_eq!(config.queue_layout().len(), 8 * 8 * 2);
    }

    #[test]
    fn empty_buffers_keep_one_element() {
        let gpu = BinningUniform::new(
            ScreenDimension::new(16, 16),
            BinQueueConfig::new(16, 16, 1),
            0,
            3,
        );
        let sizes = RasterConfig::new(gpu, (1, 1)).buffer_sizes;
        assert_eq!(sizes.triangles.len(), 1);
        assert_eq!(sizes.config.size_in_bytes(), 36);
    }
}
