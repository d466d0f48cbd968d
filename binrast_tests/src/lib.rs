// Copyright 2026 the Binrast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Binrast tests.

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
// The following lints are part of the Linebender standard set,
// but resolving them has been deferred for now.
#![allow(
    missing_debug_implementations,
    unreachable_pub,
    missing_docs,
    clippy::missing_assert_message
)]

mod oracle;

pub use scenes;

pub use oracle::{expected_bins, overlaps};

use anyhow::{bail, Result};
use binrast::{
    BinQueueConfig, BinRasterizer, BinningParams, OverflowPolicy, RasterizerOptions,
    ScreenDimension, Triangles,
};

pub struct TestParams {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub bin_width: u32,
    pub bin_height: u32,
    pub queue_size: u32,
    pub workgroups: (u32, u32),
    pub overflow_policy: OverflowPolicy,
}

impl TestParams {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            bin_width: 32,
            bin_height: 32,
            queue_size: 64,
            workgroups: (1, 1),
            overflow_policy: OverflowPolicy::Report,
        }
    }

    pub fn screen(&self) -> ScreenDimension {
        ScreenDimension::new(self.width, self.height)
    }

    pub fn binning_params(&self) -> BinningParams {
        BinningParams {
            screen_dimension: self.screen(),
            bin_queue_config: BinQueueConfig::new(self.bin_width, self.bin_height, self.queue_size),
        }
    }

    pub fn options(&self) -> RasterizerOptions {
        RasterizerOptions {
            workgroups: self.workgroups,
            overflow_policy: self.overflow_policy,
        }
    }

    pub fn bins_x(&self) -> u32 {
        self.width.div_ceil(self.bin_width)
    }

    pub fn bins_y(&self) -> u32 {
        self.height.div_ceil(self.bin_height)
    }
}

/// Per-bin triangle lists of one binning pass, row-major over the bin grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinLists {
    pub bins_x: u32,
    pub bins_y: u32,
    pub has_overflow: bool,
    pub bins: Vec<Vec<u32>>,
}

impl BinLists {
    pub fn bin(&self, bin_x: u32, bin_y: u32) -> &[u32] {
        &self.bins[(bin_y * self.bins_x + bin_x) as usize]
    }
}

/// Bins `triangles` once with a fresh rasterizer and collects every bin's list.
pub fn bin_once(triangles: &Triangles, params: &TestParams) -> Result<BinLists> {
    let mut rasterizer = BinRasterizer::new(params.options())?;
    let binned = rasterizer.bin(triangles, &params.binning_params())?;
    let layout = *binned.queues().layout();
    let bins = (0..layout.bins_y)
        .flat_map(|y| (0..layout.bins_x).map(move |x| (x, y)))
        .map(|(x, y)| binned.bin_triangles(x, y))
        .collect();
    Ok(BinLists {
        bins_x: layout.bins_x,
        bins_y: layout.bins_y,
        has_overflow: binned.has_overflow(),
        bins,
    })
}

/// Bins `triangles` and checks the result against [`expected_bins`].
pub fn bin_and_compare(triangles: &Triangles, params: &TestParams) -> Result<BinLists> {
    let lists = bin_once(triangles, params)?;
    if lists.has_overflow {
        bail!("{}: bin queues overflowed", params.name);
    }
    let expected = expected_bins(triangles, params);
    for (ix, (got, want)) in lists.bins.iter().zip(&expected).enumerate() {
        if got != want {
            let (x, y) = (ix as u32 % lists.bins_x, ix as u32 / lists.bins_x);
            bail!(
                "{}: bin ({x}, {y}) holds {got:?}, expected {want:?}",
                params.name
            );
        }
    }
    Ok(lists)
}
