//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Value types shared by grids, pyramids and tiles

use crate::error::{Result, TmxError};
use std::convert::TryFrom;
use std::fmt;

/// Number of decimals coordinates and sizes are rounded to.
pub const ROUND: i32 = 20;

/// Allowed difference between bounds ratio and shape ratio.
pub const DELTA: f64 = 1e-6;

/// Round `value` to `digits` decimals.
///
/// Values which can't be represented more precisely than their current
/// binary form at this scale are returned unchanged.
pub fn round_to(value: f64, digits: i32) -> f64 {
    // 2^52: beyond this every f64 is an integer already
    const EXACT_LIMIT: f64 = 4_503_599_627_370_496.0;
    let factor = 10f64.powi(digits);
    let scaled = value * factor;
    if !scaled.is_finite() || scaled.abs() >= EXACT_LIMIT {
        value
    } else {
        scaled.round() / factor
    }
}

/// Rectangle in grid CRS units
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct Bounds {
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
}

impl Bounds {
    pub fn new(left: f64, bottom: f64, right: f64, top: f64) -> Bounds {
        Bounds {
            left,
            bottom,
            right,
            top,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    /// Both edges of each axis are ordered
    pub fn is_ordered(&self) -> bool {
        self.left <= self.right && self.bottom <= self.top
    }

    /// Overlapping part of both rectangles, `None` if they are disjoint.
    /// Rectangles sharing only an edge intersect in a degenerate rectangle.
    pub fn intersection(&self, other: &Bounds) -> Option<Bounds> {
        let clipped = Bounds {
            left: self.left.max(other.left),
            bottom: self.bottom.max(other.bottom),
            right: self.right.min(other.right),
            top: self.top.min(other.top),
        };
        if clipped.is_ordered() {
            Some(clipped)
        } else {
            None
        }
    }

    pub fn intersects(&self, other: &Bounds) -> bool {
        self.intersection(other).is_some()
    }

    /// Point lies inside or on the border
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right && y >= self.bottom && y <= self.top
    }

    /// `(left, bottom, right, top)`
    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.left, self.bottom, self.right, self.top)
    }

    pub(crate) fn hash_bits(&self) -> [u64; 4] {
        // -0.0 + 0.0 == 0.0, equal bounds hash equally
        [
            (self.left + 0.0).to_bits(),
            (self.bottom + 0.0).to_bits(),
            (self.right + 0.0).to_bits(),
            (self.top + 0.0).to_bits(),
        ]
    }
}

impl From<(f64, f64, f64, f64)> for Bounds {
    fn from(bounds: (f64, f64, f64, f64)) -> Bounds {
        Bounds::new(bounds.0, bounds.1, bounds.2, bounds.3)
    }
}

impl From<[f64; 4]> for Bounds {
    fn from(bounds: [f64; 4]) -> Bounds {
        Bounds::new(bounds[0], bounds[1], bounds[2], bounds[3])
    }
}

impl TryFrom<&[f64]> for Bounds {
    type Error = TmxError;

    fn try_from(values: &[f64]) -> Result<Bounds> {
        if values.len() != 4 {
            return Err(TmxError::InvalidArgument(format!(
                "bounds must be 4 values of left, bottom, right, top, got {}",
                values.len()
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(TmxError::InvalidArgument(format!(
                "bounds must be finite numbers, got {:?}",
                values
            )));
        }
        Ok(Bounds::new(values[0], values[1], values[2], values[3]))
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.left, self.bottom, self.right, self.top
        )
    }
}

/// Number of rows and columns (or pixels)
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct Shape {
    pub height: u32,
    pub width: u32,
}

impl Shape {
    pub fn new(height: u32, width: u32) -> Shape {
        Shape { height, width }
    }
}

impl From<(u32, u32)> for Shape {
    fn from(shape: (u32, u32)) -> Shape {
        Shape::new(shape.0, shape.1)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.height, self.width)
    }
}

/// Tile address within a pyramid
#[derive(PartialEq, Eq, Hash, PartialOrd, Ord, Clone, Copy, Debug)]
pub struct TileIndex {
    pub zoom: u8,
    pub row: u64,
    pub col: u64,
}

impl TileIndex {
    pub fn new(zoom: u8, row: u64, col: u64) -> TileIndex {
        TileIndex { zoom, row, col }
    }
}

impl From<(u8, u64, u64)> for TileIndex {
    fn from(index: (u8, u64, u64)) -> TileIndex {
        TileIndex::new(index.0, index.1, index.2)
    }
}

impl fmt::Display for TileIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.zoom, self.row, self.col)
    }
}
