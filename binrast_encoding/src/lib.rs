// Copyright 2026 the Binrast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw binning encoding.
//!
//! Plain data shared by the host and the `bin_rasterize` kernel: screen and bin
//! geometry, the triangle buffer layout, the uniform configuration block, and the
//! layout of the per-bin output queues together with a reader for them.

// LINEBENDER LINT SET - lib.rs - v2
// See https://linebender.org/wiki/canonical-lints/
// These lints aren't included in Cargo.toml because they
// shouldn't apply to examples and tests
#![warn(unused_crate_dependencies)]
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![allow(missing_docs, reason = "We have many as-yet undocumented items.")]
#![allow(
    clippy::cast_possible_truncation,
    clippy::missing_assert_message,
    clippy::missing_panics_doc,
    reason = "Deferred, only apply in some feature sets so not expect"
)]

mod bin;
mod config;
pub mod math;
mod queue;
mod triangle;

pub use bin::{Bin, BinQueueConfig, ScreenDimension};
pub use config::{
    BinningUniform, BufferSize, BufferSizes, RasterConfig, WorkgroupCounts, WorkgroupSize,
};
pub use math::{NdcPosition, ScreenPosition, SignedScreenPosition};
pub use queue::{
    BinQueue, BinQueueIter, BinQueues, QueueLayout, QUEUE_EMPTY, QUEUE_NOT_EMPTY, QUEUE_SENTINEL,
};
pub use triangle::{
    Triangles, DEFAULT_RENDER_DIMENSION, MIN_RENDER_DIMENSION, VERTICES_PER_TRIANGLE,
};
