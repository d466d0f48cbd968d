// Copyright 2026 the Binrast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Staging of triangle batches into workgroup-local memory.
//!
//! Only the x and y coordinates of each vertex are needed for binning, so a batch
//! is reduced to two dense channels before it is tested against the bins.

use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use binrast_encoding::VERTICES_PER_TRIANGLE;

use super::WorkgroupContext;
use crate::BATCH_COUNT;

/// Completion handle of one or more workgroup copies.
///
/// The destination buffers must not be read before the event has been waited on
/// with [`wait_group_events`].
#[must_use = "copies are only visible after waiting on their event"]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CopyEvent {
    pending: u32,
}

impl CopyEvent {
    /// Number of copies this event tracks.
    pub fn pending(&self) -> u32 {
        self.pending
    }
}

/// Copies `count` elements of `src`, taking every `stride`th one, into `dst`.
///
/// Issued by every invocation of the workgroup with identical arguments, and
/// performed once on behalf of all of them. `event` is chained into the returned
/// handle, so several copies can be waited on together.
pub fn async_work_group_strided_copy<S>(
    ctx: &WorkgroupContext<'_, S>,
    dst: &RwLock<Vec<f32>>,
    src: &[f32],
    count: usize,
    stride: usize,
    event: CopyEvent,
) -> CopyEvent {
    if ctx.invocation().is_workgroup_leader() {
        let mut dst = dst.write().unwrap_or_else(PoisonError::into_inner);
        dst.clear();
        dst.extend(src.iter().step_by(stride).take(count));
    }
    CopyEvent {
        pending: event.pending + 1,
    }
}

/// Waits until the copies tracked by `event` are visible to the whole workgroup.
pub fn wait_group_events<S>(ctx: &WorkgroupContext<'_, S>, event: CopyEvent) {
    if event.pending > 0 {
        ctx.workgroup_barrier();
    }
}

/// The `local_x` and `local_y` buffers of a workgroup.
#[derive(Debug)]
pub struct StagingBuffers {
    x: RwLock<Vec<f32>>,
    y: RwLock<Vec<f32>>,
}

impl Default for StagingBuffers {
    fn default() -> Self {
        let capacity = BATCH_COUNT as usize * VERTICES_PER_TRIANGLE;
        Self {
            x: RwLock::new(Vec::with_capacity(capacity)),
            y: RwLock::new(Vec::with_capacity(capacity)),
        }
    }
}

impl StagingBuffers {
    /// Read access to the staged batch.
    ///
    /// The returned guard must be dropped before the next batch is staged.
    pub fn read(&self) -> StagedBatch<'_> {
        StagedBatch {
            x: self.x.read().unwrap_or_else(PoisonError::into_inner),
            y: self.y.read().unwrap_or_else(PoisonError::into_inner),
        }
    }
}

/// A staged batch, three x and three y coordinates per triangle.
pub struct StagedBatch<'a> {
    x: RwLockReadGuard<'a, Vec<f32>>,
    y: RwLockReadGuard<'a, Vec<f32>>,
}

impl StagedBatch<'_> {
    /// Number of staged triangles.
    pub fn len(&self) -> usize {
        self.x.len() / VERTICES_PER_TRIANGLE
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The x and y coordinates of the vertices of the `ix`th triangle of the batch.
    pub fn triangle(&self, ix: usize) -> ([f32; 3], [f32; 3]) {
        let base = ix * VERTICES_PER_TRIANGLE;
        (
            [self.x[base], self.x[base + 1], self.x[base + 2]],
            [self.y[base], self.y[base + 1], self.y[base + 2]],
        )
    }
}

/// Issues the copies of the x and y channels of `batch_size` triangles starting at
/// triangle `start` into `buffers`.
pub fn stage_batch<S>(
    ctx: &WorkgroupContext<'_, S>,
    buffers: &StagingBuffers,
    triangles: &[f32],
    render_dimension: u32,
    start: u32,
    batch_size: u32,
) -> CopyEvent {
    let stride = render_dimension as usize;
    let base = start as usize * VERTICES_PER_TRIANGLE * stride;
    let count = batch_size as usize * VERTICES_PER_TRIANGLE;
    let src = &triangles[base..];
    let event =
        async_work_group_strided_copy(ctx, &buffers.x, src, count, stride, CopyEvent::default());
    async_work_group_strided_copy(ctx, &buffers.y, &src[1..], count, stride, event)
}

#[cfg(test)]
mod tests {
    use binrast_encoding::{Triangles, WorkgroupCounts};
    use rayon::ThreadPoolBuilder;

    use super::{stage_batch, wait_group_events, StagingBuffers};
    use crate::cpu::dispatch;

    // Three 4-dimensional triangles, every float encodes (triangle, vertex, axis).
    fn triangles() -> Triangles {
        let mut triangles = Triangles::new(4);
        for t in 0..3 {
            let point = |v: usize| -> [f32; 4] {
                std::array::from_fn(|axis| (t * 100 + v * 10 + axis) as f32)
            };
            triangles.push([point(0), point(1), point(2)]);
        }
        triangles
    }

    fn stage(start: u32, batch_size: u32, size: (u32, u32)) -> Vec<(Vec<f32>, Vec<f32>)> {
        let counts = WorkgroupCounts {
            bin_rasterize: (1, 1, 1),
            bin_rasterize_local: (size.0, size.1, 1),
        };
        let pool = ThreadPoolBuilder::new()
            .num_threads(counts.invocations())
            .build()
            .unwrap();
        let triangles = triangles();
        let mut seen = vec![(Vec::new(), Vec::new()); counts.invocations()];
        let slots: Vec<_> = seen.iter_mut().collect();
        dispatch(&pool, &counts, StagingBuffers::default, slots, |ctx, out| {
            let triangles = triangles.as_slice();
            let event = stage_batch(ctx, ctx.shared(), triangles, 4, start, batch_size);
            assert_eq!(event.pending(), 2);
            wait_group_events(ctx, event);
            let staged = ctx.shared().read();
            let (mut xs, mut ys) = (Vec::new(), Vec::new());
            for ix in 0..staged.len() {
                let (x, y) = staged.triangle(ix);
                xs.extend(x);
                ys.extend(y);
            }
            **out = (xs, ys);
        });
        seen
    }

    #[test]
    fn copies_x_and_y_channels() {
        let seen = stage(0, 3, (1, 1));
        let (x, y) = &seen[0];
        assert_eq!(x, &[0., 10., 20., 100., 110., 120., 200., 210., 220.]);
        assert_eq!(y, &[1., 11., 21., 101., 111., 121., 201., 211., 221.]);
    }

    #[test]
    fn copies_from_offset() {
        let seen = stage(1, 2, (1, 1));
        let (x, y) = &seen[0];
        assert_eq!(x, &[100., 110., 120., 200., 210., 220.]);
        assert_eq!(y, &[101., 111., 121., 201., 211., 221.]);
    }

    #[test]
    fn every_invocation_sees_the_batch() {
        let seen = stage(2, 1, (2, 2));
        for (x, y) in &seen {
            assert_eq!(x, &[200., 210., 220.]);
            assert_eq!(y, &[201., 211., 221.]);
        }
    }
}
