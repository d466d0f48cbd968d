// Copyright 2026 the Binrast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compute kernels of the Binrast binning stage.
//!
//! Each kernel is described by a [`ComputeShader`], the metadata a host needs to
//! bind its resources on any compute API. With the `cpu` feature, the [`cpu`]
//! module provides implementations of the kernels that run on a simulated grid of
//! workgroups, with real workgroup and device barriers backed by OS threads.

// LINEBENDER LINT SET - lib.rs - v2
// See https://linebender.org/wiki/canonical-lints/
// These lints aren't included in Cargo.toml because they
// shouldn't apply to examples and tests
#![warn(unused_crate_dependencies)]
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs, reason = "We have many as-yet undocumented items.")]
#![allow(
    clippy::cast_possible_truncation,
    clippy::missing_assert_message,
    reason = "Deferred, only apply in some feature sets so not expect"
)]

mod types;

#[cfg(feature = "cpu")]
pub mod cpu;

pub use types::BindType;

use std::borrow::Cow;

/// Number of triangles a workgroup claims at once.
///
/// The kernels size their workgroup-local staging buffers from this; it is not a
/// tuning knob.
pub const BATCH_COUNT: u32 = 256;

#[derive(Clone, Debug)]
pub struct ComputeShader<'a> {
    pub name: Cow<'a, str>,
    pub bindings: Cow<'a, [BindType]>,
}

/// Bins triangles into per-bin queues.
///
/// Bindings: the `BinningUniform`, the triangle buffer, the overflow flag and the
/// bin queue buffer. The workgroup size is the bin grid of the screen, so it is
/// chosen per dispatch. Workgroup memory holds the staged x and y coordinates of
/// one batch.
pub const BIN_RASTERIZE: ComputeShader<'static> = ComputeShader {
    name: Cow::Borrowed("bin_rasterize"),
    bindings: Cow::Borrowed(&[
        BindType::Uniform,
        BindType::BufReadOnly,
        BindType::Buffer,
        BindType::Buffer,
    ]),
};
