//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Tile pyramids

use crate::config::{Config, PyramidCfg};
use crate::error::{Result, TmxError};
use crate::geometry::{self, Geometry, TilesFromGeom};
use crate::grid::{Crs, GridDefinition};
use crate::intersect::tile_intersecting_tilepyramid;
use crate::tile::Tile;
use crate::tile_iterator::{self, EdgeUse, TilesFromBounds};
use crate::types::{round_to, Bounds, ROUND};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Highest supported zoom level
pub const MAX_ZOOM: u8 = 32;

/// Allowed metatiling factors
pub const METATILING_FACTORS: [u32; 5] = [1, 2, 4, 8, 16];

/// Check a zoom level coming from user input
pub fn validate_zoom(zoom: i64) -> Result<u8> {
    if zoom < 0 || zoom > MAX_ZOOM as i64 {
        Err(TmxError::InvalidZoom {
            zoom,
            max: MAX_ZOOM,
        })
    } else {
        Ok(zoom as u8)
    }
}

fn check_zoom(zoom: u8) -> Result<()> {
    validate_zoom(zoom as i64).map(|_| ())
}

/// Tile matrix of one zoom level
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct TileMatrix {
    pub zoom: u8,
    /// Number of columns
    pub matrix_width: u64,
    /// Number of rows
    pub matrix_height: u64,
    /// Tile width in pixels
    pub tile_width: u32,
    /// Tile height in pixels
    pub tile_height: u32,
    /// Tile width in CRS units
    pub tile_x_size: f64,
    /// Tile height in CRS units
    pub tile_y_size: f64,
    pub pixel_x_size: f64,
    pub pixel_y_size: f64,
}

impl TileMatrix {
    /// Row and column lie within the matrix
    pub fn contains(&self, row: u64, col: u64) -> bool {
        row < self.matrix_height && col < self.matrix_width
    }
}

/// A collection of tile matrices, one per zoom level.
///
/// Each zoom level is a 2D tile matrix, thus every tile is defined by its
/// zoom level and the row and column within the matrix. Rows grow southwards
/// from the top edge of the grid, columns eastwards from the left edge.
///
/// `metatiling` groups `metatiling x metatiling` tiles of `tile_size` pixels
/// into one metatile, reducing the matrix dimensions by that factor.
#[derive(Clone, Debug)]
pub struct TilePyramid {
    grid: GridDefinition,
    tile_size: u32,
    metatiling: u32,
    metatile_size: u32,
    x_size: f64,
    y_size: f64,
}

impl TilePyramid {
    pub fn new(grid: GridDefinition, tile_size: u32, metatiling: u32) -> Result<TilePyramid> {
        if !METATILING_FACTORS.contains(&metatiling) {
            return Err(TmxError::Construction(format!(
                "metatiling must be one of 1, 2, 4, 8, 16, got {}",
                metatiling
            )));
        }
        if tile_size == 0 {
            return Err(TmxError::Construction(
                "tile_size must be greater than 0".to_string(),
            ));
        }
        if tile_size.checked_mul(metatiling).is_none() {
            return Err(TmxError::Construction(format!(
                "tile_size {} too large for metatiling {}",
                tile_size, metatiling
            )));
        }
        Ok(TilePyramid::from_parts(grid, tile_size, metatiling))
    }

    fn from_parts(grid: GridDefinition, tile_size: u32, metatiling: u32) -> TilePyramid {
        let x_size = round_to(grid.right() - grid.left(), ROUND);
        let y_size = round_to(grid.top() - grid.bottom(), ROUND);
        TilePyramid {
            grid,
            tile_size,
            metatiling,
            metatile_size: tile_size * metatiling,
            x_size,
            y_size,
        }
    }

    /// Geodetic pyramid with 256 pixel tiles
    pub fn geodetic() -> TilePyramid {
        TilePyramid::from_parts(GridDefinition::geodetic(), 256, 1)
    }

    /// Web Mercator pyramid with 256 pixel tiles
    pub fn mercator() -> TilePyramid {
        TilePyramid::from_parts(GridDefinition::mercator(), 256, 1)
    }

    pub fn grid(&self) -> &GridDefinition {
        &self.grid
    }
    pub fn crs(&self) -> &Crs {
        &self.grid.crs
    }
    pub fn bounds(&self) -> Bounds {
        self.grid.bounds
    }
    pub fn left(&self) -> f64 {
        self.grid.left()
    }
    pub fn bottom(&self) -> f64 {
        self.grid.bottom()
    }
    pub fn right(&self) -> f64 {
        self.grid.right()
    }
    pub fn top(&self) -> f64 {
        self.grid.top()
    }
    pub fn is_global(&self) -> bool {
        self.grid.is_global
    }
    /// Tile size in pixels
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }
    pub fn metatiling(&self) -> u32 {
        self.metatiling
    }
    /// Metatile size in pixels
    pub fn metatile_size(&self) -> u32 {
        self.metatile_size
    }
    /// Grid width in CRS units
    pub fn x_size(&self) -> f64 {
        self.x_size
    }
    /// Grid height in CRS units
    pub fn y_size(&self) -> f64 {
        self.y_size
    }

    /// Tile of this pyramid.
    ///
    /// Only the zoom level is validated, row and column may lie outside of
    /// the tile matrix (see [`Tile::is_valid`]).
    pub fn tile(&self, zoom: u8, row: u64, col: u64) -> Result<Tile<'_>> {
        Ok(Tile::new(self, self.tile_matrix(zoom)?, row, col))
    }

    /// Dimensions and tile sizes of the tile matrix at zoom level
    pub fn tile_matrix(&self, zoom: u8) -> Result<TileMatrix> {
        Ok(TileMatrix {
            zoom,
            matrix_width: self.matrix_width(zoom)?,
            matrix_height: self.matrix_height(zoom)?,
            tile_width: self.tile_width(zoom)?,
            tile_height: self.tile_height(zoom)?,
            tile_x_size: self.tile_x_size(zoom)?,
            tile_y_size: self.tile_y_size(zoom)?,
            pixel_x_size: self.pixel_x_size(zoom)?,
            pixel_y_size: self.pixel_y_size(zoom)?,
        })
    }

    fn matrix_cells(&self, base: u32, zoom: u8) -> Result<u64> {
        check_zoom(zoom)?;
        let cells = (base as u64).saturating_mul(1u64 << zoom);
        let metatiling = self.metatiling as u64;
        let width = cells / metatiling + if cells % metatiling > 0 { 1 } else { 0 };
        Ok(std::cmp::max(1, width))
    }

    /// Number of columns at zoom level
    pub fn matrix_width(&self, zoom: u8) -> Result<u64> {
        self.matrix_cells(self.grid.shape.width, zoom)
    }

    /// Number of rows at zoom level
    pub fn matrix_height(&self, zoom: u8) -> Result<u64> {
        self.matrix_cells(self.grid.shape.height, zoom)
    }

    // A metatile can't be larger than the whole matrix
    fn tile_pixels(&self, base: u32, zoom: u8) -> Result<u32> {
        check_zoom(zoom)?;
        let matrix_pixel = (1u64 << zoom)
            .saturating_mul(self.tile_size as u64)
            .saturating_mul(base as u64);
        Ok(std::cmp::min(self.metatile_size as u64, matrix_pixel) as u32)
    }

    /// Tile width in pixels at zoom level
    pub fn tile_width(&self, zoom: u8) -> Result<u32> {
        self.tile_pixels(self.grid.shape.width, zoom)
    }

    /// Tile height in pixels at zoom level
    pub fn tile_height(&self, zoom: u8) -> Result<u32> {
        self.tile_pixels(self.grid.shape.height, zoom)
    }

    fn pixel_size(&self, extent: f64, base: u32, zoom: u8) -> Result<f64> {
        check_zoom(zoom)?;
        let matrix_pixel = base as f64 * 2f64.powi(zoom as i32) * self.tile_size as f64;
        Ok(round_to(extent / matrix_pixel, ROUND))
    }

    /// Width of a pixel in CRS units at zoom level
    pub fn pixel_x_size(&self, zoom: u8) -> Result<f64> {
        self.pixel_size(self.x_size, self.grid.shape.width, zoom)
    }

    /// Height of a pixel in CRS units at zoom level
    pub fn pixel_y_size(&self, zoom: u8) -> Result<f64> {
        self.pixel_size(self.y_size, self.grid.shape.height, zoom)
    }

    /// Width of a tile in CRS units at zoom level
    pub fn tile_x_size(&self, zoom: u8) -> Result<f64> {
        Ok(round_to(
            self.pixel_x_size(zoom)? * self.tile_width(zoom)? as f64,
            ROUND,
        ))
    }

    /// Height of a tile in CRS units at zoom level
    pub fn tile_y_size(&self, zoom: u8) -> Result<f64> {
        Ok(round_to(
            self.pixel_y_size(zoom)? * self.tile_height(zoom)? as f64,
            ROUND,
        ))
    }

    /// All tiles intersecting with bounds.
    ///
    /// On global grids, bounds crossing the antimeridian yield tiles from
    /// both sides. Bounds outside the grid are clipped.
    pub fn tiles_from_bounds(&self, bounds: Bounds, zoom: u8) -> Result<TilesFromBounds<'_>> {
        check_zoom(zoom)?;
        let finite = [bounds.left, bounds.bottom, bounds.right, bounds.top]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(TmxError::InvalidArgument(format!(
                "bounds must be 4 finite values of left, bottom, right, top, got {}",
                bounds
            )));
        }
        if self.is_global() {
            tile_iterator::global_tiles_from_bounds(self, bounds, zoom)
        } else {
            tile_iterator::tiles_from_cleaned_bounds(self, bounds, zoom)
        }
    }

    /// All tiles intersecting with the bounding box of a geometry.
    pub fn tiles_from_bbox<G: Geometry>(
        &self,
        geometry: &G,
        zoom: u8,
    ) -> Result<TilesFromBounds<'_>> {
        check_zoom(zoom)?;
        match geometry.bounds() {
            Some(bounds) => self.tiles_from_bounds(bounds, zoom),
            None => Ok(TilesFromBounds::empty()),
        }
    }

    /// All tiles intersecting with a geometry.
    pub fn tiles_from_geom<G: Geometry>(
        &self,
        geometry: &G,
        zoom: u8,
    ) -> Result<TilesFromGeom<'_, G::Prepared>> {
        check_zoom(zoom)?;
        geometry::tiles_from_geom(self, geometry, zoom)
    }

    /// Tile covering a point.
    ///
    /// `on_edge_use` picks the tile if the point lies on a tile border.
    pub fn tile_from_xy(&self, x: f64, y: f64, zoom: u8, on_edge_use: EdgeUse) -> Result<Tile<'_>> {
        check_zoom(zoom)?;
        if !self.bounds().contains(x, y) {
            return Err(TmxError::OutOfBounds { x, y });
        }
        tile_iterator::tile_from_xy(self, x, y, zoom, on_edge_use)
    }

    /// All tiles of this pyramid intersecting with a tile of another pyramid.
    pub fn intersecting(&self, tile: &Tile<'_>) -> Result<Vec<Tile<'_>>> {
        tile_intersecting_tilepyramid(tile, self)
    }

    /// Configuration representation of the pyramid parameters
    pub fn to_dict(&self) -> PyramidCfg {
        self.to_config()
    }

    /// Pyramid from its configuration representation
    pub fn from_dict(config: &PyramidCfg) -> Result<TilePyramid> {
        TilePyramid::from_config(config)
    }
}

impl PartialEq for TilePyramid {
    fn eq(&self, other: &TilePyramid) -> bool {
        self.grid == other.grid
            && self.tile_size == other.tile_size
            && self.metatiling == other.metatiling
    }
}

impl Eq for TilePyramid {}

impl Hash for TilePyramid {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.grid.hash(state);
        self.tile_size.hash(state);
        self.metatiling.hash(state);
    }
}

impl fmt::Display for TilePyramid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TilePyramid({}, tile_size={}, metatiling={})",
            self.grid, self.tile_size, self.metatiling
        )
    }
}
