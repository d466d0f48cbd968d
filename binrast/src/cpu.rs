// Copyright 2026 the Binrast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use binrast_encoding::{BufferSize, RasterConfig};
use binrast_shaders::cpu::bin_rasterize_main;
use rayon::ThreadPool;

#[derive(Default)]
pub(crate) struct Buffer<T: bytemuck::Zeroable + bytemuck::NoUninit> {
    inner: Vec<T>,
}

impl<T: bytemuck::Zeroable + bytemuck::NoUninit> Buffer<T> {
    fn to_fit(&mut self, size: BufferSize<T>) -> &mut [T] {
        self.inner.resize_with(size.len() as usize, T::zeroed);
        &mut self.inner
    }

    pub(crate) fn as_slice(&self) -> &[T] {
        &self.inner
    }
}

/// Output buffers of the binning dispatch, reused across calls.
#[derive(Default)]
pub(crate) struct BinningBuffers {
    overflow: Buffer<u32>,
    pub(crate) bin_queues: Buffer<u32>,
}

/// Runs `bin_rasterize` on `pool`, returning whether any queue overflowed.
///
/// Queues that are still in the buffers from a previous run are overwritten, the
/// kernel seeds every queue it owns.
pub(crate) fn bin_rasterize_cpu(
    pool: &ThreadPool,
    config: &RasterConfig,
    triangles: &[f32],
    buffers: &mut BinningBuffers,
) -> bool {
    let sizes = &config.buffer_sizes;
    let overflow_buf = buffers.overflow.to_fit(sizes.overflow);
    let bin_queues_buf = buffers.bin_queues.to_fit(sizes.bin_queues);
    bin_rasterize_main(
        pool,
        &config.workgroup_counts,
        &config.gpu,
        triangles,
        &mut overflow_buf[0],
        bin_queues_buf,
    );
    overflow_buf[0] != 0
}
