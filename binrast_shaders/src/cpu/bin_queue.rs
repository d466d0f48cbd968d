// Copyright 2026 the Binrast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::atomic::{AtomicBool, Ordering};

use binrast_encoding::{QUEUE_EMPTY, QUEUE_NOT_EMPTY, QUEUE_SENTINEL};

/// Dispatch-wide overflow flag.
///
/// Only ever set to true while a dispatch runs, so concurrent writers need no
/// coordination beyond the atomic store.
#[derive(Debug, Default)]
pub struct OverflowFlag(AtomicBool);

impl OverflowFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub(crate) fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Returned by [`BinQueueWriter::push`] when the queue has no room left.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct QueueOverflow;

/// Appends triangle indices to the queue region owned by one invocation.
///
/// `region` is the whole queue: the empty flag followed by `queue_size` slots.
#[derive(Debug)]
pub struct BinQueueWriter<'a> {
    region: &'a mut [u32],
    cursor: usize,
}

impl<'a> BinQueueWriter<'a> {
    pub fn new(region: &'a mut [u32]) -> Self {
        debug_assert!(!region.is_empty(), "a queue region holds at least its flag");
        Self { region, cursor: 1 }
    }

    /// Marks the queue as empty.
    pub fn seed(&mut self) {
        self.region[0] = QUEUE_EMPTY;
        self.cursor = 1;
    }

    pub fn len(&self) -> usize {
        self.cursor - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.cursor == self.region.len()
    }

    /// Records `triangle_ix`, or raises `overflow` if the queue is already full.
    ///
    /// A full queue is left untouched.
    pub fn push(
        &mut self,
        triangle_ix: u32,
        overflow: &OverflowFlag,
    ) -> Result<(), QueueOverflow> {
        if self.is_full() {
            overflow.raise();
            return Err(QueueOverflow);
        }
        self.region[self.cursor] = triangle_ix;
        self.cursor += 1;
        self.region[0] = QUEUE_NOT_EMPTY;
        Ok(())
    }

    /// Writes the sentinel after the last entry, if there is a slot left for it.
    pub fn terminate(&mut self) {
        if !self.is_full() {
            self.region[self.cursor] = QUEUE_SENTINEL;
        }
    }
}
