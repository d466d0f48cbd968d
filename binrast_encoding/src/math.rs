// Copyright 2026 the Binrast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conversions between normalized device coordinates and pixel space.
//!
//! NDC spans `[-1, 1]` on both axes. Screen coordinates are unsigned pixel
//! positions in `[0, length)`, and signed screen coordinates are the same pixels
//! re-centered so the middle of the screen is the origin.

use bytemuck::{Pod, Zeroable};

use crate::ScreenDimension;

/// A point in normalized device coordinates.
#[derive(Copy, Clone, Pod, Zeroable, Debug, Default, PartialEq)]
#[repr(C)]
pub struct NdcPosition {
    pub x: f32,
    pub y: f32,
}

impl NdcPosition {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A pixel position, origin at the top left corner.
#[derive(Copy, Clone, Pod, Zeroable, Debug, Default, PartialEq, Eq)]
#[repr(C)]
pub struct ScreenPosition {
    pub x: u32,
    pub y: u32,
}

/// A pixel position, origin at the center of the screen.
#[derive(Copy, Clone, Pod, Zeroable, Debug, Default, PartialEq, Eq)]
#[repr(C)]
pub struct SignedScreenPosition {
    pub x: i32,
    pub y: i32,
}

/// Maps an NDC coordinate onto an axis of `length` pixels.
///
/// Coordinates left of -1 saturate to pixel 0.
pub fn axis_screen_from_ndc(pos: f32, length: u32) -> u32 {
    ((pos + 1.0) * length.saturating_sub(1) as f32 / 2.0).floor() as u32
}

pub fn axis_signed_from_ndc(pos: f32, length: u32) -> i32 {
    axis_screen_from_ndc(pos, length) as i32 - (length / 2) as i32
}

/// Inverse of [`axis_screen_from_ndc`] for pixel boundaries.
///
/// A one pixel axis has no extent in NDC; every pixel maps to -1 there.
pub fn axis_ndc_from_screen(pos: u32, length: u32) -> f32 {
    let span = length.saturating_sub(1).max(1) as f32;
    2.0 * pos as f32 / span - 1.0
}

pub fn screen_from_ndc(ndc: NdcPosition, dim: ScreenDimension) -> ScreenPosition {
    ScreenPosition {
        x: axis_screen_from_ndc(ndc.x, dim.width),
        y: axis_screen_from_ndc(ndc.y, dim.height),
    }
}

pub fn signed_from_ndc(ndc: NdcPosition, dim: ScreenDimension) -> SignedScreenPosition {
    SignedScreenPosition {
        x: axis_signed_from_ndc(ndc.x, dim.width),
        y: axis_signed_from_ndc(ndc.y, dim.height),
    }
}

/// Positions left of or above the screen saturate to 0.
pub fn screen_from_signed(pos: SignedScreenPosition, dim: ScreenDimension) -> ScreenPosition {
    ScreenPosition {
        x: (pos.x + (dim.width / 2) as i32).max(0) as u32,
        y: (pos.y + (dim.height / 2) as i32).max(0) as u32,
    }
}

pub fn ndc_from_screen(pos: ScreenPosition, dim: ScreenDimension) -> NdcPosition {
    NdcPosition {
        x: axis_ndc_from_screen(pos.x, dim.width),
        y: axis_ndc_from_screen(pos.y, dim.height),
    }
}

/// Row-major index of a pixel.
pub fn index_from_screen(pos: ScreenPosition, dim: ScreenDimension) -> u32 {
    pos.y * dim.width + pos.x
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIM: ScreenDimension = ScreenDimension::new(64, 32);

    #[test]
    fn ndc_corners_map_to_screen_corners() {
        let top_left = screen_from_ndc(NdcPosition::new(-1.0, -1.0), DIM);
        assert_eq!(top_left, ScreenPosition { x: 0, y: 0 });
        let bottom_right = screen_from_ndc(NdcPosition::new(1.0, 1.0), DIM);
        assert_eq!(bottom_right, ScreenPosition { x: 63, y: 31 });
        let center = screen_from_ndc(NdcPosition::new(0.0, 0.0), DIM);
        assert_eq!(center, ScreenPosition { x: 31, y: 15 });
    }

    #[test]
    fn signed_is_centered() {
        let center = signed_from_ndc(NdcPosition::new(0.0, 0.0), DIM);
        assert_eq!(center, SignedScreenPosition { x: -1, y: -1 });
        let origin = signed_from_ndc(NdcPosition::new(-1.0, -1.0), DIM);
        assert_eq!(origin, SignedScreenPosition { x: -32, y: -16 });
    }

    #[test]
    fn signed_round_trips_to_screen() {
        for ndc in [-1.0, -0.5, 0.0, 0.25, 1.0] {
            let pos = NdcPosition::new(ndc, ndc);
            let direct = screen_from_ndc(pos, DIM);
            let via_signed = screen_from_signed(signed_from_ndc(pos, DIM), DIM);
            assert_eq!(direct, via_signed, "ndc {ndc}");
        }
    }

    #[test]
    fn ndc_from_screen_inverts_pixel_boundaries() {
        assert_eq!(axis_ndc_from_screen(0, 64), -1.0);
        assert_eq!(axis_ndc_from_screen(63, 64), 1.0);
        for px in [0, 1, 17, 32, 63] {
            let ndc = axis_ndc_from_screen(px, 64);
            // Nudge towards the pixel center to stay clear of float rounding.
            assert_eq!(axis_screen_from_ndc(ndc + 1e-4, 64), px);
        }
    }

    #[test]
    fn single_pixel_axis_is_finite() {
        assert_eq!(axis_ndc_from_screen(0, 1), -1.0);
        assert_eq!(axis_ndc_from_screen(1, 1), 1.0);
        assert_eq!(axis_screen_from_ndc(0.3, 1), 0);
    }

    #[test]
    fn pixel_index_is_row_major() {
        let pos = ScreenPosition { x: 3, y: 2 };
        assert_eq!(index_from_screen(pos, DIM), 2 * 64 + 3);
    }
}
