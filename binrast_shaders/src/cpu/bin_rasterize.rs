// Copyright 2026 the Binrast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bins triangles into per-bin queues.
//!
//! Each workgroup covers the whole screen, one invocation per bin, and owns one
//! layer of queues. Workgroups pull batches of [`BATCH_COUNT`] triangles from a
//! shared cursor until the triangles run out, so every triangle is tested against
//! every bin by exactly one workgroup.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use binrast_encoding::{Bin, BinningUniform, QueueLayout, WorkgroupCounts};
use rayon::ThreadPool;

use super::{
    check_bindings, dispatch, is_triangle_in_bin, stage_batch, wait_group_events, BinQueueWriter,
    CpuBinding, OverflowFlag, StagingBuffers, WorkgroupContext,
};
use crate::{BATCH_COUNT, BIN_RASTERIZE};

#[derive(Default)]
struct WorkgroupMemory {
    staging: StagingBuffers,
    batch_start: AtomicU32,
    // Sampled by the leader together with the batch, so the whole workgroup
    // takes the same exit.
    overflow_seen: AtomicBool,
}

impl WorkgroupMemory {
    // Accesses are ordered by the workgroup barriers around them.
    fn publish(&self, batch_start: u32, overflow_seen: bool) {
        self.batch_start.store(batch_start, Ordering::Relaxed);
        self.overflow_seen.store(overflow_seen, Ordering::Relaxed);
    }

    fn batch(&self) -> (u32, bool) {
        (
            self.batch_start.load(Ordering::Relaxed),
            self.overflow_seen.load(Ordering::Relaxed),
        )
    }
}

fn bin_rasterize_invocation(
    ctx: &WorkgroupContext<'_, WorkgroupMemory>,
    config: &BinningUniform,
    triangles: &[f32],
    batch_cursor: &AtomicU32,
    overflow: &OverflowFlag,
    queue: &mut BinQueueWriter<'_>,
) {
    let invocation = ctx.invocation();
    let (index_x, index_y) = invocation.local_id;
    let bin = Bin::from_grid(config.screen, &config.queues, index_x, index_y);

    if invocation.is_dispatch_leader() {
        batch_cursor.store(0, Ordering::SeqCst);
        overflow.clear();
    }
    if invocation.is_workgroup_leader() {
        ctx.shared().publish(0, false);
    }
    // Local initialization, then global initialization.
    ctx.workgroup_barrier();
    ctx.device_barrier();

    queue.seed();

    loop {
        ctx.workgroup_barrier();
        if invocation.is_workgroup_leader() {
            let batch_start = batch_cursor.fetch_add(BATCH_COUNT, Ordering::SeqCst);
            ctx.shared().publish(batch_start, overflow.is_raised());
        }
        ctx.workgroup_barrier();

        let (batch_start, overflow_seen) = ctx.shared().batch();
        if overflow_seen {
            return;
        }
        if batch_start >= config.triangle_count {
            return;
        }
        let batch_size = BATCH_COUNT.min(config.triangle_count - batch_start);

        let event = stage_batch(
            ctx,
            &ctx.shared().staging,
            triangles,
            config.render_dimension,
            batch_start,
            batch_size,
        );
        wait_group_events(ctx, event);

        let batch = ctx.shared().staging.read();
        for i in 0..batch_size as usize {
            let (x, y) = batch.triangle(i);
            if is_triangle_in_bin(x, y, &bin, config.screen)
                && queue.push(batch_start + i as u32, overflow).is_err()
            {
                log::trace!(
                    "bin ({index_x}, {index_y}) of workgroup {} overflowed at triangle {}",
                    invocation.workgroup_linear_id(),
                    batch_start + i as u32
                );
                break;
            }
        }
        drop(batch);

        queue.terminate();
    }
}

/// Runs the binning kernel over `counts.layers()` workgroups.
///
/// `bin_queues` receives one layer of queues per workgroup and `overflow` is set
/// to 1 if any queue ran out of space, in which case the queues must be discarded.
/// `pool` must have one thread per invocation of the dispatch.
pub fn bin_rasterize_main(
    pool: &ThreadPool,
    counts: &WorkgroupCounts,
    config: &BinningUniform,
    triangles: &[f32],
    overflow: &mut u32,
    bin_queues: &mut [u32],
) {
    let layout = QueueLayout {
        queue_size: config.queues.queue_size,
        bins_x: config.bins_x,
        bins_y: config.bins_y,
        layers: counts.layers(),
    };
    assert_eq!(counts.bin_rasterize_local, (config.bins_x, config.bins_y, 1));
    assert!(bin_queues.len() >= layout.len());
    log::debug!(
        "bin_rasterize: {} triangles, {} workgroups of {}x{} bins",
        config.triangle_count,
        layout.layers,
        layout.bins_x,
        layout.bins_y
    );

    // Dispatch order matches queue order, so invocation `i` owns the `i`th region.
    let queues: Vec<BinQueueWriter<'_>> = bin_queues[..layout.len()]
        .chunks_mut(layout.stride())
        .map(BinQueueWriter::new)
        .collect();
    let batch_cursor = AtomicU32::new(0);
    let has_overflow = OverflowFlag::new();

    dispatch(pool, counts, WorkgroupMemory::default, queues, |ctx, queue| {
        let invocation = ctx.invocation();
        debug_assert_eq!(
            layout.base(
                invocation.workgroup_linear_id(),
                invocation.local_id.0,
                invocation.local_id.1
            ),
            invocation.linear_id() * layout.stride()
        );
        bin_rasterize_invocation(ctx, config, triangles, &batch_cursor, &has_overflow, queue);
    });

    *overflow = u32::from(has_overflow.is_raised());
}

/// Entry point with the bindings of [`BIN_RASTERIZE`]: the uniform, the triangle
/// buffer, the overflow flag and the bin queues.
pub fn bin_rasterize(pool: &ThreadPool, workgroups: (u32, u32), resources: &[CpuBinding<'_>]) {
    check_bindings(&BIN_RASTERIZE, resources);
    let config = resources[0].as_typed::<BinningUniform>();
    let triangles = resources[1].as_slice::<f32>();
    let mut overflow = resources[2].as_typed_mut::<u32>();
    let mut bin_queues = resources[3].as_slice_mut::<u32>();
    let counts = WorkgroupCounts::new(config, workgroups);
    bin_rasterize_main(
        pool,
        &counts,
        config,
        triangles,
        &mut overflow,
        &mut bin_queues,
    );
}
