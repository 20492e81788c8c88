//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Tile iterators

use crate::error::{Result, TmxError};
use crate::pyramid::{TileMatrix, TilePyramid};
use crate::tile::Tile;
use crate::types::{Bounds, TileIndex};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Tile to pick when a point lies exactly on a tile border
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum EdgeUse {
    /// left bottom
    Lb,
    /// right bottom
    Rb,
    /// right top
    Rt,
    /// left top
    Lt,
}

impl EdgeUse {
    fn is_left(&self) -> bool {
        matches!(self, EdgeUse::Lb | EdgeUse::Lt)
    }
    fn is_top(&self) -> bool {
        matches!(self, EdgeUse::Rt | EdgeUse::Lt)
    }
}

impl Default for EdgeUse {
    fn default() -> Self {
        EdgeUse::Rb
    }
}

impl FromStr for EdgeUse {
    type Err = TmxError;

    fn from_str(s: &str) -> Result<EdgeUse> {
        match s {
            "lb" => Ok(EdgeUse::Lb),
            "rb" => Ok(EdgeUse::Rb),
            "rt" => Ok(EdgeUse::Rt),
            "lt" => Ok(EdgeUse::Lt),
            _ => Err(TmxError::InvalidArgument(format!(
                "on_edge_use must be one of lb, rb, rt or lt, got '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for EdgeUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EdgeUse::Lb => "lb",
            EdgeUse::Rb => "rb",
            EdgeUse::Rt => "rt",
            EdgeUse::Lt => "lt",
        })
    }
}

// Tolerance for points on a tile border, in tiles
const EPSILON: f64 = 0.0000001;

/// Tile index along one axis, counted from `origin` in direction `sign`.
///
/// Coordinates within a tolerance of a tile border snap to it. `before_edge`
/// then selects the tile before the border instead of the one after it.
fn axis_index(origin: f64, sign: f64, coord: f64, size: f64, before_edge: bool) -> i128 {
    let position = sign * (coord - origin) / size;
    let nearest = position.round();
    // same arithmetic as the tile borders
    let edge = origin + sign * nearest * size;
    let tolerance = EPSILON * size + 4.0 * f64::EPSILON * coord.abs().max(edge.abs());
    if (coord - edge).abs() <= tolerance {
        nearest as i128 - before_edge as i128
    } else {
        position.floor() as i128
    }
}

/// Unclamped `(row, col)` of the tile covering a point
fn raw_index(
    pyramid: &TilePyramid,
    matrix: &TileMatrix,
    x: f64,
    y: f64,
    on_edge_use: EdgeUse,
) -> (i128, i128) {
    let row = axis_index(
        pyramid.top(),
        -1.0,
        y,
        matrix.tile_y_size,
        on_edge_use.is_top(),
    );
    let col = axis_index(
        pyramid.left(),
        1.0,
        x,
        matrix.tile_x_size,
        on_edge_use.is_left(),
    );
    (row, col)
}

fn clamp(value: i128, size: u64) -> u64 {
    value.max(0).min(size as i128 - 1) as u64
}

/// Tile covering a point within the pyramid bounds.
///
/// Columns wrap around the antimeridian on global grids. Points on the
/// outer grid border fall back to the border tile.
pub(crate) fn tile_from_xy(
    pyramid: &TilePyramid,
    x: f64,
    y: f64,
    zoom: u8,
    on_edge_use: EdgeUse,
) -> Result<Tile<'_>> {
    let matrix = pyramid.tile_matrix(zoom)?;
    let (row, col) = raw_index(pyramid, &matrix, x, y, on_edge_use);
    let width = matrix.matrix_width as i128;
    let col = if pyramid.is_global() && (col < 0 || col >= width) {
        col.rem_euclid(width) as u64
    } else {
        clamp(col, matrix.matrix_width)
    };
    let row = clamp(row, matrix.matrix_height);
    trace!(
        "({}, {}) -> tile {} {} {} ({})",
        x,
        y,
        zoom,
        row,
        col,
        on_edge_use
    );
    Ok(Tile::new(pyramid, matrix, row, col))
}

/// Inclusive `(minrow, maxrow, mincol, maxcol)` of the tiles intersecting
/// with bounds within the pyramid.
///
/// Tiles only touching the bounds are excluded. A degenerate axis, or one
/// collapsing onto a tile border, keeps the index of the lower left corner.
fn index_limits(
    pyramid: &TilePyramid,
    matrix: &TileMatrix,
    bounds: &Bounds,
) -> (u64, u64, u64, u64) {
    let (bottom_row, left_col) =
        raw_index(pyramid, matrix, bounds.left, bounds.bottom, EdgeUse::Rt);
    let (top_row, right_col) = raw_index(pyramid, matrix, bounds.right, bounds.top, EdgeUse::Lb);
    let top_row = if bounds.bottom == bounds.top || top_row > bottom_row {
        bottom_row
    } else {
        top_row
    };
    let right_col = if bounds.left == bounds.right || right_col < left_col {
        left_col
    } else {
        right_col
    };
    (
        clamp(top_row, matrix.matrix_height),
        clamp(bottom_row, matrix.matrix_height),
        clamp(left_col, matrix.matrix_width),
        clamp(right_col, matrix.matrix_width),
    )
}

/// Rectangular block of tiles, iterated row by row
#[derive(Clone, Debug)]
pub struct TileRange<'a> {
    pyramid: &'a TilePyramid,
    matrix: TileMatrix,
    limits: (u64, u64, u64, u64),
    row: u64,
    col: u64,
    finished: bool,
}

impl<'a> TileRange<'a> {
    /// Tiles intersecting with bounds, which must lie within the pyramid.
    fn new(pyramid: &'a TilePyramid, matrix: TileMatrix, bounds: &Bounds) -> TileRange<'a> {
        let limits = index_limits(pyramid, &matrix, bounds);
        TileRange {
            pyramid,
            matrix,
            limits,
            row: limits.0,
            col: limits.2,
            finished: false,
        }
    }

    /// Inclusive `(minrow, maxrow, mincol, maxcol)`
    pub fn limits(&self) -> (u64, u64, u64, u64) {
        self.limits
    }
}

impl<'a> Iterator for TileRange<'a> {
    type Item = Tile<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let (_, maxrow, mincol, maxcol) = self.limits;
        let current = Tile::new(self.pyramid, self.matrix, self.row, self.col);
        if self.col < maxcol {
            self.col += 1;
        } else if self.row < maxrow {
            self.row += 1;
            self.col = mincol;
        } else {
            self.finished = true;
        }
        Some(current)
    }
}

/// Tiles intersecting with bounds.
///
/// The iterator holds no shared state: clone it to iterate the same query
/// again.
#[derive(Clone, Debug)]
pub struct TilesFromBounds<'a> {
    ranges: Vec<TileRange<'a>>,
    current: usize,
    // only needed if ranges can overlap
    seen: Option<HashSet<TileIndex>>,
}

impl<'a> TilesFromBounds<'a> {
    pub(crate) fn empty() -> TilesFromBounds<'a> {
        TilesFromBounds {
            ranges: Vec::new(),
            current: 0,
            seen: None,
        }
    }

    fn from_ranges(ranges: Vec<TileRange<'a>>) -> TilesFromBounds<'a> {
        let seen = if ranges.len() > 1 {
            Some(HashSet::new())
        } else {
            None
        };
        TilesFromBounds {
            ranges,
            current: 0,
            seen,
        }
    }
}

impl<'a> Iterator for TilesFromBounds<'a> {
    type Item = Tile<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(range) = self.ranges.get_mut(self.current) {
            match range.next() {
                Some(tile) => match self.seen {
                    Some(ref mut seen) => {
                        if seen.insert(tile.id()) {
                            return Some(tile);
                        }
                    }
                    None => return Some(tile),
                },
                None => self.current += 1,
            }
        }
        None
    }
}

/// Tiles intersecting with bounds, clipped to the pyramid bounds.
pub(crate) fn tiles_from_cleaned_bounds(
    pyramid: &TilePyramid,
    bounds: Bounds,
    zoom: u8,
) -> Result<TilesFromBounds<'_>> {
    let matrix = pyramid.tile_matrix(zoom)?;
    match bounds.intersection(&pyramid.bounds()) {
        Some(clipped) => {
            debug!("tiles from bounds {} at zoom {}", clipped, zoom);
            Ok(TilesFromBounds::from_ranges(vec![TileRange::new(
                pyramid, matrix, &clipped,
            )]))
        }
        None => {
            debug!("bounds {} outside of {}", bounds, pyramid.bounds());
            Ok(TilesFromBounds::empty())
        }
    }
}

/// Tiles intersecting with bounds which may cross the antimeridian.
///
/// Bounds with `left > right` are read as crossing the eastern border.
pub(crate) fn global_tiles_from_bounds(
    pyramid: &TilePyramid,
    bounds: Bounds,
    zoom: u8,
) -> Result<TilesFromBounds<'_>> {
    let matrix = pyramid.tile_matrix(zoom)?;
    let grid = pyramid.bounds();
    let x_size = pyramid.x_size();
    let top = bounds.top.min(grid.top);
    let bottom = bounds.bottom.max(grid.bottom);
    let left = bounds.left;
    let right = if bounds.left > bounds.right {
        bounds.right + x_size
    } else {
        bounds.right
    };

    let mut segments = Vec::new();
    if left >= grid.left && right <= grid.right {
        segments.push((left, right));
    }
    // western side of the antimeridian
    if left < grid.left {
        segments.push((left + x_size, grid.right));
        segments.push((grid.left, right));
    }
    // eastern side of the antimeridian
    if right > grid.right {
        segments.push((left, grid.right));
        segments.push((grid.left, right - x_size));
    }
    debug!(
        "tiles from global bounds {} at zoom {} in {} segment(s)",
        bounds,
        zoom,
        segments.len()
    );
    let ranges = segments
        .into_iter()
        // no border-only segments from the antimeridian split
        .filter(|&(segment_left, segment_right)| segment_left < segment_right || left == right)
        .filter_map(|(left, right)| Bounds::new(left, bottom, right, top).intersection(&grid))
        .map(|segment| TileRange::new(pyramid, matrix, &segment))
        .collect();
    Ok(TilesFromBounds::from_ranges(ranges))
}

/// Bounds of the block of tiles covering `bounds`.
pub fn snap_bounds(
    bounds: Bounds,
    pyramid: &TilePyramid,
    zoom: u8,
    pixelbuffer: u32,
) -> Result<Bounds> {
    let matrix = pyramid.tile_matrix(zoom)?;
    let clipped = bounds.intersection(&pyramid.bounds()).ok_or_else(|| {
        TmxError::InvalidArgument(format!(
            "bounds {} do not intersect with pyramid bounds {}",
            bounds,
            pyramid.bounds()
        ))
    })?;
    let (minrow, maxrow, mincol, maxcol) = index_limits(pyramid, &matrix, &clipped);
    let lb = Tile::new(pyramid, matrix, maxrow, mincol).bounds(pixelbuffer);
    let rt = Tile::new(pyramid, matrix, minrow, maxcol).bounds(pixelbuffer);
    Ok(Bounds::new(lb.left, lb.bottom, rt.right, rt.top))
}
