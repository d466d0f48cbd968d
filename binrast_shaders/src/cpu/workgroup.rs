// Copyright 2026 the Binrast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated compute dispatch.
//!
//! A dispatch is a 2D grid of workgroups, each a 2D grid of invocations. Every
//! invocation runs on its own thread of the pool, which lets invocations block in
//! barriers the way they would on a GPU. The pool must therefore have exactly one
//! thread per invocation.

use std::sync::{Barrier, Mutex, PoisonError};

use binrast_encoding::WorkgroupCounts;
use rayon::ThreadPool;

/// Built-in ids of a single invocation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub global_id: (u32, u32),
    pub local_id: (u32, u32),
    pub workgroup_id: (u32, u32),
    pub num_workgroups: (u32, u32),
    pub workgroup_size: (u32, u32),
}

impl Invocation {
    /// Ids of the invocation at `ix` in dispatch order: workgroup major, then
    /// row-major within the workgroup.
    pub fn from_linear(ix: usize, counts: &WorkgroupCounts) -> Self {
        let num_workgroups = (counts.bin_rasterize.0, counts.bin_rasterize.1);
        let workgroup_size = (counts.bin_rasterize_local.0, counts.bin_rasterize_local.1);
        let per_workgroup = counts.workgroup_invocations() as usize;
        let workgroup_ix = (ix / per_workgroup) as u32;
        let local_ix = (ix % per_workgroup) as u32;
        let workgroup_id = (
            workgroup_ix % num_workgroups.0,
            workgroup_ix / num_workgroups.0,
        );
        let local_id = (local_ix % workgroup_size.0, local_ix / workgroup_size.0);
        Self {
            global_id: (
                workgroup_id.0 * workgroup_size.0 + local_id.0,
                workgroup_id.1 * workgroup_size.1 + local_id.1,
            ),
            local_id,
            workgroup_id,
            num_workgroups,
            workgroup_size,
        }
    }

    pub fn workgroup_linear_id(&self) -> u32 {
        self.workgroup_id.1 * self.num_workgroups.0 + self.workgroup_id.0
    }

    pub fn local_linear_id(&self) -> u32 {
        self.local_id.1 * self.workgroup_size.0 + self.local_id.0
    }

    /// Position of the invocation in dispatch order.
    pub fn linear_id(&self) -> usize {
        let per_workgroup = self.workgroup_size.0 as usize * self.workgroup_size.1 as usize;
        self.workgroup_linear_id() as usize * per_workgroup + self.local_linear_id() as usize
    }

    /// The invocation at local position (0, 0) acts for its workgroup.
    pub fn is_workgroup_leader(&self) -> bool {
        self.local_id == (0, 0)
    }

    /// The invocation at global position (0, 0) acts for the whole dispatch.
    pub fn is_dispatch_leader(&self) -> bool {
        self.global_id == (0, 0)
    }
}

/// What an invocation can see of its surroundings.
pub struct WorkgroupContext<'a, S> {
    invocation: Invocation,
    shared: &'a S,
    workgroup_barrier: &'a Barrier,
    device_barrier: &'a Barrier,
}

impl<S> WorkgroupContext<'_, S> {
    pub fn invocation(&self) -> &Invocation {
        &self.invocation
    }

    /// Workgroup-shared memory.
    pub fn shared(&self) -> &S {
        self.shared
    }

    /// Blocks until every invocation of this workgroup has arrived.
    pub fn workgroup_barrier(&self) {
        self.workgroup_barrier.wait();
    }

    /// Blocks until every invocation of the dispatch has arrived.
    ///
    /// Every invocation must reach each device barrier, including invocations of
    /// workgroups that have no more work.
    pub fn device_barrier(&self) {
        self.device_barrier.wait();
    }
}

/// Runs `kernel` once for every invocation of the dispatch described by `counts`.
///
/// `make_shared` is called once per workgroup to create its shared memory.
/// `per_invocation` holds state owned by exactly one invocation each, in dispatch
/// order (see [`Invocation::from_linear`]).
pub fn dispatch<S, T, F>(
    pool: &ThreadPool,
    counts: &WorkgroupCounts,
    make_shared: impl Fn() -> S,
    per_invocation: Vec<T>,
    kernel: F,
) where
    S: Sync,
    T: Send,
    F: Fn(&WorkgroupContext<'_, S>, &mut T) + Sync,
{
    let invocations = counts.invocations();
    assert_eq!(
        pool.current_num_threads(),
        invocations,
        "the pool needs one thread per invocation"
    );
    assert_eq!(per_invocation.len(), invocations);

    let layers = counts.layers() as usize;
    let shared: Vec<S> = (0..layers).map(|_| make_shared()).collect();
    let workgroup_barriers: Vec<Barrier> = (0..layers)
        .map(|_| Barrier::new(counts.workgroup_invocations() as usize))
        .collect();
    let device_barrier = Barrier::new(invocations);
    let owned: Vec<Mutex<T>> = per_invocation.into_iter().map(Mutex::new).collect();

    pool.broadcast(|ctx| {
        let invocation = Invocation::from_linear(ctx.index(), counts);
        let workgroup = invocation.workgroup_linear_id() as usize;
        let context = WorkgroupContext {
            invocation,
            shared: &shared[workgroup],
            workgroup_barrier: &workgroup_barriers[workgroup],
            device_barrier: &device_barrier,
        };
        // Uncontended: each slot belongs to a single invocation.
        let mut state = owned[ctx.index()]
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        kernel(&context, &mut state);
    });
}
