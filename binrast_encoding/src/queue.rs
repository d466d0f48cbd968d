// Copyright 2026 the Binrast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout of the per-bin triangle queues.
//!
//! Each queue is `queue_size + 1` consecutive `u32` slots. Slot 0 is the empty
//! flag, the remaining slots hold triangle indices in ascending order. A queue that
//! is not full is terminated by a [`QUEUE_SENTINEL`] slot. Because entries are
//! strictly ascending, only the first entry can be index 0, so the sentinel is
//! unambiguous from the second entry on.
//!
//! The output buffer holds one layer of queues per workgroup of the dispatch,
//! each layer covering every bin of the screen.

use std::ops::Range;

use crate::{BinQueueConfig, ScreenDimension};

/// Value of the empty flag of a queue without entries.
pub const QUEUE_EMPTY: u32 = 1;
/// Value of the empty flag once an entry has been written.
pub const QUEUE_NOT_EMPTY: u32 = 0;
/// Terminates a queue that has free slots left.
pub const QUEUE_SENTINEL: u32 = 0;

/// Addressing of queue regions within the output buffer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct QueueLayout {
    pub queue_size: u32,
    pub bins_x: u32,
    pub bins_y: u32,
    /// Number of independent sets of queues, one per workgroup.
    pub layers: u32,
}

impl QueueLayout {
    pub fn new(dim: ScreenDimension, config: &BinQueueConfig, layers: u32) -> Self {
        Self {
            queue_size: config.queue_size,
            bins_x: config.bins_x(dim),
            bins_y: config.bins_y(dim),
            layers,
        }
    }

    /// Slots per queue, including the empty flag.
    pub fn stride(&self) -> usize {
        self.queue_size as usize + 1
    }

    pub fn bins_per_layer(&self) -> usize {
        self.bins_x as usize * self.bins_y as usize
    }

    /// Total number of `u32` slots in the output buffer.
    pub fn len(&self) -> usize {
        self.stride() * self.bins_per_layer() * self.layers as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Offset of the empty flag of the queue for bin (`bin_x`, `bin_y`) in `layer`.
    pub fn base(&self, layer: u32, bin_x: u32, bin_y: u32) -> usize {
        let bin_ix = self.bins_x as usize * bin_y as usize + bin_x as usize;
        self.stride() * (self.bins_per_layer() * layer as usize + bin_ix)
    }

    pub fn region(&self, layer: u32, bin_x: u32, bin_y: u32) -> Range<usize> {
        let base = self.base(layer, bin_x, bin_y);
        base..base + self.stride()
    }
}

/// Read access to a binning result.
///
/// Only meaningful if the dispatch did not overflow.
#[derive(Copy, Clone, Debug)]
pub struct BinQueues<'a> {
    data: &'a [u32],
    layout: QueueLayout,
}

impl<'a> BinQueues<'a> {
    pub fn new(data: &'a [u32], layout: QueueLayout) -> Self {
        assert!(
            data.len() >= layout.len(),
            "bin queue buffer is smaller than its layout"
        );
        Self { data, layout }
    }

    pub fn layout(&self) -> &QueueLayout {
        &self.layout
    }

    pub fn queue(&self, layer: u32, bin_x: u32, bin_y: u32) -> BinQueue<'a> {
        BinQueue {
            slots: &self.data[self.layout.region(layer, bin_x, bin_y)],
        }
    }

    /// All triangles recorded for a bin across every layer, in ascending order.
    pub fn bin_triangles(&self, bin_x: u32, bin_y: u32) -> Vec<u32> {
        let mut triangles: Vec<u32> = (0..self.layout.layers)
            .flat_map(|layer| self.queue(layer, bin_x, bin_y).iter())
            .collect();
        // Batches are disjoint across layers, so sorting is enough to merge.
        triangles.sort_unstable();
        triangles
    }
}

/// A single bin's queue.
#[derive(Copy, Clone, Debug)]
pub struct BinQueue<'a> {
    slots: &'a [u32],
}

impl<'a> BinQueue<'a> {
    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.slots.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.slots[0] == QUEUE_EMPTY
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// A full queue has no sentinel slot.
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }

    pub fn iter(&self) -> BinQueueIter<'a> {
        BinQueueIter {
            entries: &self.slots[1..],
            ix: 0,
            done: self.is_empty(),
        }
    }
}

impl<'a> IntoIterator for BinQueue<'a> {
    type Item = u32;
    type IntoIter = BinQueueIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the triangle indices of a [`BinQueue`].
#[derive(Clone, Debug)]
pub struct BinQueueIter<'a> {
    entries: &'a [u32],
    ix: usize,
    done: bool,
}

impl Iterator for BinQueueIter<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.done {
            return None;
        }
        let Some(&entry) = self.entries.get(self.ix) else {
            self.done = true;
            return None;
        };
        if self.ix > 0 && entry == QUEUE_SENTINEL {
            self.done = true;
            return None;
        }
        self.ix += 1;
        Some(entry)
    }
}
