// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conversions between scroll positions and pixel offsets along one axis.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// Pixel offset of the grid origin for a scroll `position` and `fraction`.
///
/// Equals `-(position + fraction) * cell_extent + delta`. With `delta = 0`
/// this is where cell `0` is drawn when cell `position` sits at the origin,
/// shifted by `fraction` of a cell.
pub fn coordinate_pixel_position(position: i32, fraction: f64, cell_extent: f64, delta: f64) -> f64 {
    -(f64::from(position) + fraction) * cell_extent + delta
}

/// Real-valued scroll position after moving by `delta` pixels.
///
/// Inverse of [`coordinate_pixel_position`]: equals
/// `position + fraction - delta / cell_extent`.
pub fn coordinate_position(position: i32, fraction: f64, cell_extent: f64, delta: f64) -> f64 {
    -coordinate_pixel_position(position, fraction, cell_extent, delta) / cell_extent
}

/// Splits a real position into an integer cell and a fraction in `[0, 1)`.
pub(crate) fn split_position(real: f64) -> (i32, f64) {
    debug_assert!(real.is_finite(), "scroll position must be finite");
    let whole = real.floor();
    #[allow(
        clippy::cast_possible_truncation,
        reason = "positions beyond the i32 range saturate at the edge of the grid"
    )]
    let mut position = whole as i32;
    let mut fraction = real - whole;
    // Rounding can land a tiny negative value on exactly 1.0.
    if fraction >= 1.0 {
        position = position.saturating_add(1);
        fraction = 0.0;
    }
    (position, fraction)
}

#[cfg(test)]
mod tests {
    use super::{coordinate_pixel_position, coordinate_position, split_position};

    #[test]
    fn pixel_position_is_negated_scaled_position() {
        assert_eq!(coordinate_pixel_position(0, 0.0, 200.0, 0.0), 0.0);
        assert_eq!(coordinate_pixel_position(3, 0.5, 200.0, 0.0), -700.0);
        assert_eq!(coordinate_pixel_position(-1, 0.25, 100.0, 10.0), 85.0);
    }

    #[test]
    fn position_moves_against_the_drag() {
        // Dragging left by one cell moves one cell forward.
        assert_eq!(coordinate_position(2, 0.0, 50.0, -50.0), 3.0);
        assert_eq!(coordinate_position(2, 0.5, 50.0, 25.0), 2.0);
    }

    #[test]
    fn split_keeps_fraction_in_unit_interval() {
        assert_eq!(split_position(2.25), (2, 0.25));
        assert_eq!(split_position(-0.25), (-1, 0.75));
        assert_eq!(split_position(-3.0), (-3, 0.0));
        let (position, fraction) = split_position(-1e-17);
        assert!((0.0..1.0).contains(&fraction));
        assert!(position == -1 || position == 0);
    }
}
