// Copyright 2026 the Binrast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! CPU implementations of the compute kernels.
//!
//! Kernels are written against a simulated compute dispatch: every invocation of
//! every workgroup runs on its own thread of a rayon pool, so workgroup and device
//! barriers behave as they do on a GPU.

// Allow un-idiomatic Rust to more closely match compute kernels
#![allow(
    clippy::needless_range_loop,
    reason = "Keeps code easily comparable to compute kernels"
)]

mod bin_queue;
mod bin_rasterize;
mod geometry;
mod staging;
mod workgroup;

pub use bin_queue::{BinQueueWriter, OverflowFlag, QueueOverflow};
pub use bin_rasterize::{bin_rasterize, bin_rasterize_main};
pub use geometry::{bin_bounds, is_triangle_in_bin, rects_intersect, triangle_bounds, Rect};
pub use staging::{
    async_work_group_strided_copy, stage_batch, wait_group_events, CopyEvent, StagedBatch,
    StagingBuffers,
};
pub use workgroup::{dispatch, Invocation, WorkgroupContext};

use std::cell::{RefCell, RefMut};

use bytemuck::Pod;

use crate::{BindType, ComputeShader};

/// A resource bound to one slot of a kernel.
///
/// Uniform and read-only slots take plain bytes. Writable slots take a buffer the
/// kernel borrows mutably while it runs.
#[derive(Clone, Copy, Debug)]
pub enum CpuBinding<'a> {
    Buffer(&'a [u8]),
    BufferRW(&'a RefCell<Vec<u8>>),
}

impl<'a> CpuBinding<'a> {
    /// Whether this resource can be bound to a slot of type `ty`.
    pub fn fits(&self, ty: BindType) -> bool {
        ty.is_mutable() == matches!(self, CpuBinding::BufferRW(_))
    }

    pub fn as_typed<T: Pod>(&self) -> &'a T {
        bytemuck::from_bytes(self.bytes())
    }

    pub fn as_slice<T: Pod>(&self) -> &'a [T] {
        bytemuck::cast_slice(self.bytes())
    }

    pub fn as_typed_mut<T: Pod>(&self) -> RefMut<'a, T> {
        RefMut::map(self.bytes_mut(), |buf| bytemuck::from_bytes_mut(buf))
    }

    pub fn as_slice_mut<T: Pod>(&self) -> RefMut<'a, [T]> {
        RefMut::map(self.bytes_mut(), |buf| bytemuck::cast_slice_mut(buf))
    }

    fn bytes(&self) -> &'a [u8] {
        match *self {
            CpuBinding::Buffer(bytes) => bytes,
            CpuBinding::BufferRW(_) => panic!("writable binding read as a read-only buffer"),
        }
    }

    fn bytes_mut(&self) -> RefMut<'a, Vec<u8>> {
        match *self {
            CpuBinding::BufferRW(buf) => buf.borrow_mut(),
            CpuBinding::Buffer(_) => panic!("can't borrow external buffer mutably"),
        }
    }
}

/// Panics if `resources` does not match the bindings declared by `shader`.
fn check_bindings(shader: &ComputeShader<'_>, resources: &[CpuBinding<'_>]) {
    assert_eq!(
        resources.len(),
        shader.bindings.len(),
        "{} expects {} bindings",
        shader.name,
        shader.bindings.len()
    );
    for (ix, (resource, &ty)) in resources.iter().zip(shader.bindings.iter()).enumerate() {
        let access = if ty.is_mutable() { "writable" } else { "read-only" };
        assert!(
            resource.fits(ty),
            "{} binding {ix} must be {access}",
            shader.name
        );
    }
}
