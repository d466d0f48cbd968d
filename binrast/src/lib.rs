// Copyright 2026 the Binrast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Binrast is the binning stage of a tile-based triangle rasterizer.
//!
//! The screen is divided into rectangular bins. Given a buffer of projected
//! triangles, Binrast records for every bin the indices of the triangles that may
//! cover it, so that a later per-pixel stage only has to consider those. The test
//! is conservative: a triangle is assigned to every bin its bounding rectangle
//! touches.
//!
//! The work runs as a compute dispatch: a grid of workgroups, each with one
//! invocation per bin, dynamically pulling batches of triangles from a shared
//! cursor. This crate runs that dispatch on the CPU, with every invocation on its
//! own thread.
//!
//! ```no_run
//! use binrast::{BinQueueConfig, BinRasterizer, BinningParams, ScreenDimension, Triangles};
//!
//! let mut rasterizer = BinRasterizer::new(Default::default())?;
//! let mut triangles = Triangles::default();
//! triangles.push_ndc([[-0.9, -0.9], [-0.5, -0.5], [-0.9, -0.5]]);
//! let params = BinningParams {
//!     screen_dimension: ScreenDimension::new(64, 64),
//!     bin_queue_config: BinQueueConfig::new(32, 32, 4),
//! };
//! let binned = rasterizer.bin(&triangles, &params)?;
//! assert!(!binned.has_overflow());
//! assert_eq!(binned.bin_triangles(0, 0), [0]);
//! # Ok::<(), binrast::Error>(())
//! ```
//!
//! A queue holds at most `queue_size` triangles. If any bin needs more, the whole
//! result is flagged as overflowed and must be discarded; see
//! [`BinRasterizer::bin_with_retry`] and [`OverflowPolicy`] for recovering from that.

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
#![allow(
    clippy::cast_possible_truncation,
    reason = "Deferred, only apply in some feature sets so not expect"
)]

mod cpu;

pub use binrast_encoding::{
    math, Bin, BinQueue, BinQueueConfig, BinQueueIter, BinQueues, BinningUniform, QueueLayout,
    RasterConfig, ScreenDimension, Triangles, MIN_RENDER_DIMENSION,
};
pub use binrast_shaders::BATCH_COUNT;

use rayon::{ThreadPool, ThreadPoolBuilder};
use thiserror::Error;

use cpu::{bin_rasterize_cpu, BinningBuffers};

/// Largest number of bins a screen may be divided into.
///
/// Every bin is one invocation of a workgroup, and this is the workgroup size
/// limit of the dispatch.
pub const MAX_WORKGROUP_INVOCATIONS: u32 = 1024;

/// Largest number of invocations a dispatch may have across all workgroups.
///
/// Every invocation runs on its own thread of the invocation pool.
pub const MAX_DISPATCH_INVOCATIONS: u32 = 4096;

/// Errors that can occur in Binrast.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The screen covers no pixels.
    #[error("Screen dimension {width}x{height} is empty")]
    InvalidScreenDimension { width: u32, height: u32 },
    /// Bins must be at least one pixel in each direction.
    #[error("Bin size {bin_width}x{bin_height} is empty")]
    InvalidBinSize { bin_width: u32, bin_height: u32 },
    /// Queues must be able to hold at least one triangle.
    #[error("Bin queue size must not be zero")]
    ZeroQueueSize,
    /// Points need at least x, y and depth.
    #[error("Render dimension {0} is too small, points need at least 3 axes")]
    RenderDimensionTooSmall(u32),
    /// The triangle buffer does not hold a whole number of triangles.
    #[error(
        "Triangle buffer of {len} floats is not a whole number of {dimension}-dimensional triangles"
    )]
    TriangleBufferLength { len: usize, dimension: u32 },
    /// The triangle count does not fit the kernel's 32-bit batch cursor.
    #[error("Too many triangles: {0}")]
    TooManyTriangles(usize),
    /// The bin grid is larger than a workgroup can be.
    #[error("Screen needs {bins} bins, at most {max} are supported")]
    WorkgroupTooLarge { bins: u64, max: u32 },
    /// The workgroups and bins together need more threads than are supported.
    #[error("Dispatch needs {invocations} invocations, at most {max} are supported")]
    TooManyInvocations { invocations: u64, max: u32 },
    /// The bin queue buffer would not be addressable with 32-bit indices.
    #[error("Bin queue buffer of {slots} slots is too large")]
    QueueBufferTooLarge { slots: u64 },
    /// The dispatch needs at least one workgroup.
    #[error("Workgroup count must not be zero")]
    InvalidWorkgroupCount,
    /// Failed to create the thread pool running the invocations.
    /// See [`rayon::ThreadPoolBuildError`] for more information.
    #[error("Couldn't build the invocation thread pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    /// A bin still needed more than `queue_size` entries after applying the
    /// [`OverflowPolicy`].
    #[error("Bin queues overflowed with a queue size of {queue_size}")]
    QueueOverflow { queue_size: u32 },
}

pub(crate) type Result<T, E = Error> = std::result::Result<T, E>;

/// What [`BinRasterizer::bin_with_retry`] does when a queue overflows.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Fail with [`Error::QueueOverflow`].
    #[default]
    Report,
    /// Double the queue size and bin again, up to `max_queue_size`.
    GrowQueue { max_queue_size: u32 },
}

/// Options which are set at rasterizer creation time, used in [`BinRasterizer::new`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RasterizerOptions {
    /// Number of workgroups along each axis.
    ///
    /// Each workgroup fills its own layer of queues, so the output grows with the
    /// workgroup count.
    pub workgroups: (u32, u32),
    /// Applied by [`BinRasterizer::bin_with_retry`].
    pub overflow_policy: OverflowPolicy,
}

impl Default for RasterizerOptions {
    fn default() -> Self {
        Self {
            workgroups: (1, 1),
            overflow_policy: OverflowPolicy::Report,
        }
    }
}

/// Parameters of a single binning pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BinningParams {
    /// Dimensions of the rasterization target.
    pub screen_dimension: ScreenDimension,
    /// Bin size and queue capacity.
    pub bin_queue_config: BinQueueConfig,
}

/// Bins triangles on the CPU.
///
/// Owns the thread pool running the invocations and the output buffers, both of
/// which are reused across calls.
pub struct BinRasterizer {
    options: RasterizerOptions,
    pool: Option<ThreadPool>,
    buffers: BinningBuffers,
}

static_assertions::assert_impl_all!(BinRasterizer: Send);

impl BinRasterizer {
    pub fn new(options: RasterizerOptions) -> Result<Self> {
        let (x, y) = options.workgroups;
        if x == 0 || y == 0 {
            return Err(Error::InvalidWorkgroupCount);
        }
        if options.overflow_policy == (OverflowPolicy::GrowQueue { max_queue_size: 0 }) {
            return Err(Error::ZeroQueueSize);
        }
        Ok(Self {
            options,
            pool: None,
            buffers: BinningBuffers::default(),
        })
    }

    pub fn options(&self) -> &RasterizerOptions {
        &self.options
    }

    /// Checks the inputs and derives the dispatch configuration.
    pub fn configure(&self, triangles: &Triangles, params: &BinningParams) -> Result<RasterConfig> {
        let screen = params.screen_dimension;
        let queues = params.bin_queue_config;
        if screen.is_empty() {
            return Err(Error::InvalidScreenDimension {
                width: screen.width,
                height: screen.height,
            });
        }
        if queues.bin_width == 0 || queues.bin_height == 0 {
            return Err(Error::InvalidBinSize {
                bin_width: queues.bin_width,
                bin_height: queues.bin_height,
            });
        }
        if queues.queue_size == 0 {
            return Err(Error::ZeroQueueSize);
        }
        let dimension = triangles.render_dimension();
        if dimension < MIN_RENDER_DIMENSION {
            return Err(Error::RenderDimensionTooSmall(dimension));
        }
        if !triangles.is_well_formed() {
            return Err(Error::TriangleBufferLength {
                len: triangles.as_slice().len(),
                dimension,
            });
        }

        let layers = u64::from(self.options.workgroups.0) * u64::from(self.options.workgroups.1);
        // Every batch is claimed once, and every workgroup makes one more claim
        // that finds the cursor past the end.
        let count = triangles.len();
        let claims = (count as u64).div_ceil(u64::from(BATCH_COUNT)) + layers;
        if claims * u64::from(BATCH_COUNT) > u64::from(u32::MAX)
            || triangles.as_slice().len() as u64 > u64::from(u32::MAX)
        {
            return Err(Error::TooManyTriangles(count));
        }

        let bins = u64::from(queues.bins_x(screen)) * u64::from(queues.bins_y(screen));
        if bins > u64::from(MAX_WORKGROUP_INVOCATIONS) {
            return Err(Error::WorkgroupTooLarge {
                bins,
                max: MAX_WORKGROUP_INVOCATIONS,
            });
        }
        let invocations = bins * layers;
        if invocations > u64::from(MAX_DISPATCH_INVOCATIONS) {
            return Err(Error::TooManyInvocations {
                invocations,
                max: MAX_DISPATCH_INVOCATIONS,
            });
        }
        let slots = (u64::from(queues.queue_size) + 1) * bins * layers;
        if slots > u64::from(u32::MAX) {
            return Err(Error::QueueBufferTooLarge { slots });
        }

        let gpu = BinningUniform::new(screen, queues, count as u32, dimension);
        Ok(RasterConfig::new(gpu, self.options.workgroups))
    }

    /// Bins `triangles` in a single dispatch.
    ///
    /// Overflow is not an error here: check [`BinnedTriangles::has_overflow`]
    /// before reading the queues.
    pub fn bin(
        &mut self,
        triangles: &Triangles,
        params: &BinningParams,
    ) -> Result<BinnedTriangles<'_>> {
        let config = self.configure(triangles, params)?;
        let has_overflow = self.dispatch(triangles, &config)?;
        if has_overflow {
            log::warn!(
                "Bin queues overflowed with a queue size of {}",
                config.gpu.queues.queue_size
            );
        }
        Ok(self.binned(config, has_overflow))
    }

    /// Bins `triangles`, applying the [`OverflowPolicy`] until no queue overflows.
    ///
    /// The returned result never has overflow.
    pub fn bin_with_retry(
        &mut self,
        triangles: &Triangles,
        params: &BinningParams,
    ) -> Result<BinnedTriangles<'_>> {
        let mut params = *params;
        loop {
            let config = self.configure(triangles, &params)?;
            if !self.dispatch(triangles, &config)? {
                return Ok(self.binned(config, false));
            }
            let queue_size = params.bin_queue_config.queue_size;
            let OverflowPolicy::GrowQueue { max_queue_size } = self.options.overflow_policy else {
                log::warn!("Bin queues overflowed with a queue size of {queue_size}");
                return Err(Error::QueueOverflow { queue_size });
            };
            if queue_size >= max_queue_size {
                log::warn!(
                    "Bin queues overflowed at the maximum queue size of {max_queue_size}"
                );
                return Err(Error::QueueOverflow { queue_size });
            }
            let grown = queue_size.saturating_mul(2).min(max_queue_size);
            log::warn!(
                "Bin queues overflowed with a queue size of {queue_size}, retrying with {grown}"
            );
            params.bin_queue_config.queue_size = grown;
        }
    }

    fn dispatch(&mut self, triangles: &Triangles, config: &RasterConfig) -> Result<bool> {
        log::debug!(
            "Binning {} triangles into {}x{} bins of {}x{} on {:?} workgroups",
            config.gpu.triangle_count,
            config.gpu.bins_x,
            config.gpu.bins_y,
            config.gpu.queues.bin_width,
            config.gpu.queues.bin_height,
            self.options.workgroups
        );
        let pool = invocation_pool(&mut self.pool, config.workgroup_counts.invocations())?;
        Ok(bin_rasterize_cpu(
            pool,
            config,
            triangles.as_slice(),
            &mut self.buffers,
        ))
    }

    fn binned(&self, config: RasterConfig, has_overflow: bool) -> BinnedTriangles<'_> {
        let len = config.queue_layout().len();
        BinnedTriangles {
            config,
            has_overflow,
            data: &self.buffers.bin_queues.as_slice()[..len],
        }
    }
}

/// Returns the pool in `slot`, rebuilding it if it doesn't have exactly `threads`
/// threads.
fn invocation_pool(slot: &mut Option<ThreadPool>, threads: usize) -> Result<&ThreadPool> {
    let pool = match slot.take() {
        Some(pool) if pool.current_num_threads() == threads => pool,
        _ => {
            log::info!("Building an invocation thread pool with {threads} threads");
            ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|ix| format!("binrast-invocation-{ix}"))
                .build()?
        }
    };
    let pool: &ThreadPool = slot.insert(pool);
    Ok(pool)
}

/// The result of a binning pass, borrowed from the [`BinRasterizer`].
#[derive(Copy, Clone, Debug)]
pub struct BinnedTriangles<'a> {
    config: RasterConfig,
    has_overflow: bool,
    data: &'a [u32],
}

impl<'a> BinnedTriangles<'a> {
    /// Returns true if any queue ran out of space.
    ///
    /// The queues are incomplete in that case and must not be used.
    pub fn has_overflow(&self) -> bool {
        self.has_overflow
    }

    pub fn config(&self) -> &RasterConfig {
        &self.config
    }

    /// The raw queue buffer, laid out as described by [`QueueLayout`].
    pub fn as_slice(&self) -> &'a [u32] {
        self.data
    }

    pub fn queues(&self) -> BinQueues<'a> {
        BinQueues::new(self.data, self.config.queue_layout())
    }

    /// Indices of the triangles that may cover bin (`bin_x`, `bin_y`), ascending.
    pub fn bin_triangles(&self, bin_x: u32, bin_y: u32) -> Vec<u32> {
        self.queues().bin_triangles(bin_x, bin_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(width: u32, height: u32, queues: BinQueueConfig) -> BinningParams {
        BinningParams {
            screen_dimension: ScreenDimension::new(width, height),
            bin_queue_config: queues,
        }
    }

    fn one_triangle() -> Triangles {
        let mut triangles = Triangles::default();
        triangles.push_ndc([[-0.9, -0.9], [-0.5, -0.5], [-0.9, -0.5]]);
        triangles
    }

    #[test]
    fn rejects_invalid_options() {
        let options = RasterizerOptions {
            workgroups: (0, 1),
            ..Default::default()
        };
        assert!(matches!(
            BinRasterizer::new(options),
            Err(Error::InvalidWorkgroupCount)
        ));
        let options = RasterizerOptions {
            overflow_policy: OverflowPolicy::GrowQueue { max_queue_size: 0 },
            ..Default::default()
        };
        assert!(matches!(
            BinRasterizer::new(options),
            Err(Error::ZeroQueueSize)
        ));
    }

    #[test]
    fn rejects_invalid_params() {
        let rasterizer = BinRasterizer::new(RasterizerOptions::default()).unwrap();
        let triangles = one_triangle();
        let valid = BinQueueConfig::new(32, 32, 4);

        let err = rasterizer.configure(&triangles, &params(0, 64, valid));
        assert!(matches!(
            err,
            Err(Error::InvalidScreenDimension {
                width: 0,
                height: 64
            })
        ));
        let err = rasterizer.configure(&triangles, &params(64, 64, BinQueueConfig::new(32, 0, 4)));
        assert!(matches!(err, Err(Error::InvalidBinSize { .. })));
        let err = rasterizer.configure(&triangles, &params(64, 64, BinQueueConfig::new(32, 32, 0)));
        assert!(matches!(err, Err(Error::ZeroQueueSize)));
        let err = rasterizer.configure(&triangles, &params(4096, 4096, BinQueueConfig::new(8, 8, 4)));
        assert!(matches!(
            err,
            Err(Error::WorkgroupTooLarge {
                bins: 262_144,
                max: MAX_WORKGROUP_INVOCATIONS
            })
        ));
        let err = rasterizer.configure(
            &triangles,
            &params(64, 64, BinQueueConfig::new(32, 32, u32::MAX)),
        );
        assert!(matches!(err, Err(Error::QueueBufferTooLarge { .. })));
    }

    #[test]
    fn rejects_dispatches_needing_too_many_threads() {
        let triangles = one_triangle();
        let screen = params(1024, 1024, BinQueueConfig::new(32, 32, 4));
        let options = RasterizerOptions {
            workgroups: (64, 64),
            ..Default::default()
        };
        let rasterizer = BinRasterizer::new(options).unwrap();
        assert!(matches!(
            rasterizer.configure(&triangles, &screen),
            Err(Error::TooManyInvocations {
                invocations: 4_194_304,
                max: MAX_DISPATCH_INVOCATIONS
            })
        ));

        // 1024 bins in each of 4 workgroups is exactly the limit.
        let options = RasterizerOptions {
            workgroups: (2, 2),
            ..Default::default()
        };
        let rasterizer = BinRasterizer::new(options).unwrap();
        let config = rasterizer.configure(&triangles, &screen).unwrap();
        assert_eq!(
            config.workgroup_counts.invocations(),
            MAX_DISPATCH_INVOCATIONS as usize
        );
        let options = RasterizerOptions {
            workgroups: (5, 1),
            ..Default::default()
        };
        let rasterizer = BinRasterizer::new(options).unwrap();
        assert!(matches!(
            rasterizer.configure(&triangles, &screen),
            Err(Error::TooManyInvocations {
                invocations: 5120,
                ..
            })
        ));
    }

    #[test]
    fn rejects_malformed_triangles() {
        let rasterizer = BinRasterizer::new(RasterizerOptions::default()).unwrap();
        let params = params(64, 64, BinQueueConfig::new(32, 32, 4));

        let short = Triangles::from_flat(3, vec![0.0; 8]);
        assert!(matches!(
            rasterizer.configure(&short, &params),
            Err(Error::TriangleBufferLength {
                len: 8,
                dimension: 3
            })
        ));
        let flat = Triangles::from_flat(2, vec![0.0; 6]);
        assert!(matches!(
            rasterizer.configure(&flat, &params),
            Err(Error::RenderDimensionTooSmall(2))
        ));
    }

    #[test]
    fn configures_dispatch() {
        let options = RasterizerOptions {
            workgroups: (2, 3),
            ..Default::default()
        };
        let rasterizer = BinRasterizer::new(options).unwrap();
        let config = rasterizer
            .configure(&one_triangle(), &params(100, 50, BinQueueConfig::new(32, 32, 4)))
            .unwrap();
        assert_eq!(config.gpu.triangle_count, 1);
        assert_eq!((config.gpu.bins_x, config.gpu.bins_y), (4, 2));
        assert_eq!(config.workgroup_counts.bin_rasterize, (2, 3, 1));
        assert_eq!(config.queue_layout().len(), 5 * 8 * 6);
    }

    #[test]
    fn reuses_pool_until_the_grid_changes() {
        let mut rasterizer = BinRasterizer::new(RasterizerOptions::default()).unwrap();
        let triangles = one_triangle();
        let small = params(64, 64, BinQueueConfig::new(32, 32, 4));
        rasterizer.bin(&triangles, &small).unwrap();
        assert_eq!(rasterizer.pool.as_ref().unwrap().current_num_threads(), 4);
        rasterizer.bin(&triangles, &small).unwrap();
        assert_eq!(rasterizer.pool.as_ref().unwrap().current_num_threads(), 4);
        let large = params(64, 64, BinQueueConfig::new(16, 16, 4));
        let binned = rasterizer.bin(&triangles, &large).unwrap();
        assert!(!binned.has_overflow());
        assert_eq!(binned.bin_triangles(0, 0), [0]);
        assert_eq!(rasterizer.pool.as_ref().unwrap().current_num_threads(), 16);
    }

    #[test]
    fn report_policy_fails_on_overflow() {
        let mut rasterizer = BinRasterizer::new(RasterizerOptions::default()).unwrap();
        let mut triangles = Triangles::default();
        for _ in 0..3 {
            triangles.push_ndc([[-0.9, -0.9], [-0.5, -0.5], [-0.9, -0.5]]);
        }
        let params = params(64, 64, BinQueueConfig::new(32, 32, 2));
        assert!(rasterizer.bin(&triangles, &params).unwrap().has_overflow());
        assert!(matches!(
            rasterizer.bin_with_retry(&triangles, &params),
            Err(Error::QueueOverflow { queue_size: 2 })
        ));
    }
}
