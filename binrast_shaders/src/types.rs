// Copyright 2026 the Binrast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Types describing the resources of a kernel.

/// The type of resource that will be bound to a slot in a kernel.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum BindType {
    /// A storage buffer with read/write access.
    Buffer,
    /// A storage buffer with read only access.
    BufReadOnly,
    /// A small storage buffer to be used as uniforms.
    Uniform,
}

impl BindType {
    pub fn is_mutable(self) -> bool {
        matches!(self, Self::Buffer)
    }
}
