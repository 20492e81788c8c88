//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Tiles

use crate::error::Result;
use crate::intersect::tile_intersecting_tilepyramid;
use crate::pyramid::{TileMatrix, TilePyramid, MAX_ZOOM};
use crate::types::{round_to, Bounds, Shape, TileIndex, ROUND};
use geo::{coord, Polygon, Rect};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Neighborhood used by [`Tile::get_neighbors`]
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Connectedness {
    /// Tiles sharing an edge
    Four,
    /// Tiles sharing an edge or a corner
    Eight,
}

impl Default for Connectedness {
    fn default() -> Self {
        Connectedness::Eight
    }
}

/// A tile is a cell of the tile matrix of one zoom level.
///
/// Some functions accept a buffer in pixels (`pixelbuffer`). A pixelbuffer
/// of e.g. 1 extends the tile boundaries by one pixel on each side.
#[derive(Clone, Copy, Debug)]
pub struct Tile<'a> {
    pyramid: &'a TilePyramid,
    matrix: TileMatrix,
    row: u64,
    col: u64,
}

impl<'a> Tile<'a> {
    pub(crate) fn new(pyramid: &'a TilePyramid, matrix: TileMatrix, row: u64, col: u64) -> Tile<'a> {
        Tile {
            pyramid,
            matrix,
            row,
            col,
        }
    }

    pub fn pyramid(&self) -> &'a TilePyramid {
        self.pyramid
    }
    pub fn zoom(&self) -> u8 {
        self.matrix.zoom
    }
    pub fn row(&self) -> u64 {
        self.row
    }
    pub fn col(&self) -> u64 {
        self.col
    }
    /// `(zoom, row, col)`
    pub fn id(&self) -> TileIndex {
        TileIndex::new(self.matrix.zoom, self.row, self.col)
    }
    pub fn index(&self) -> TileIndex {
        self.id()
    }
    /// Tile matrix of the tile's zoom level
    pub fn matrix(&self) -> &TileMatrix {
        &self.matrix
    }

    /// Width of tile in CRS units
    pub fn x_size(&self) -> f64 {
        self.matrix.tile_x_size
    }
    /// Height of tile in CRS units
    pub fn y_size(&self) -> f64 {
        self.matrix.tile_y_size
    }
    /// Tile width in pixels
    pub fn width(&self) -> u32 {
        self.matrix.tile_width
    }
    /// Tile height in pixels
    pub fn height(&self) -> u32 {
        self.matrix.tile_height
    }
    pub fn pixel_x_size(&self) -> f64 {
        self.matrix.pixel_x_size
    }
    pub fn pixel_y_size(&self) -> f64 {
        self.matrix.pixel_y_size
    }

    /// Tile is part of the tile matrix
    pub fn is_valid(&self) -> bool {
        self.matrix.contains(self.row, self.col)
    }

    pub fn left(&self) -> f64 {
        round_to(
            self.pyramid.left() + self.col as f64 * self.x_size(),
            ROUND,
        )
    }

    pub fn top(&self) -> f64 {
        round_to(self.pyramid.top() - self.row as f64 * self.y_size(), ROUND)
    }

    /// The last column ends at the grid border, even if incomplete
    pub fn right(&self) -> f64 {
        if self.col + 1 >= self.matrix.matrix_width {
            self.pyramid.right()
        } else {
            round_to(
                self.pyramid.left() + (self.col + 1) as f64 * self.x_size(),
                ROUND,
            )
        }
    }

    /// The last row ends at the grid border, even if incomplete
    pub fn bottom(&self) -> f64 {
        if self.row + 1 >= self.matrix.matrix_height {
            self.pyramid.bottom()
        } else {
            round_to(
                self.pyramid.top() - (self.row + 1) as f64 * self.y_size(),
                ROUND,
            )
        }
    }

    /// Tile boundaries
    ///
    /// Buffered bounds are clipped to the top and bottom of global grids and
    /// to all sides of non-global grids.
    pub fn bounds(&self, pixelbuffer: u32) -> Bounds {
        let mut bounds = Bounds::new(self.left(), self.bottom(), self.right(), self.top());
        if pixelbuffer > 0 {
            let x_offset = self.pixel_x_size() * pixelbuffer as f64;
            let y_offset = self.pixel_y_size() * pixelbuffer as f64;
            bounds.left -= x_offset;
            bounds.bottom -= y_offset;
            bounds.right += x_offset;
            bounds.top += y_offset;
            let grid = self.pyramid.bounds();
            bounds.top = bounds.top.min(grid.top);
            bounds.bottom = bounds.bottom.max(grid.bottom);
            if !self.pyramid.is_global() {
                bounds.left = bounds.left.max(grid.left);
                bounds.right = bounds.right.min(grid.right);
            }
        }
        bounds
    }

    /// Tile bounding box
    pub fn bbox(&self, pixelbuffer: u32) -> Polygon<f64> {
        let bounds = self.bounds(pixelbuffer);
        Rect::new(
            coord! { x: bounds.left, y: bounds.bottom },
            coord! { x: bounds.right, y: bounds.top },
        )
        .to_polygon()
    }

    /// GDAL style geotransform of the tile raster
    pub fn affine(&self, pixelbuffer: u32) -> [f64; 6] {
        let bounds = self.bounds(pixelbuffer);
        [
            bounds.left,
            self.pixel_x_size(),
            0.0,
            bounds.top,
            0.0,
            -self.pixel_y_size(),
        ]
    }

    fn pixels(extent: f64, pixel_size: f64) -> u32 {
        (extent / pixel_size).round() as u32
    }

    /// Tile raster `(height, width)` in pixels
    pub fn shape(&self, pixelbuffer: u32) -> Shape {
        let base = Shape::new(
            Tile::pixels(self.top() - self.bottom(), self.pixel_y_size()),
            Tile::pixels(self.right() - self.left(), self.pixel_x_size()),
        );
        if pixelbuffer == 0 {
            return base;
        }
        if self.pyramid.is_global() {
            // no buffer beyond the northern and southern grid border
            let matrix_height = self.matrix.matrix_height;
            let height = if matrix_height == 1 {
                base.height
            } else if self.row == 0 || self.row == matrix_height - 1 {
                base.height.saturating_add(pixelbuffer)
            } else {
                base.height.saturating_add(pixelbuffer.saturating_mul(2))
            };
            Shape::new(
                height,
                base.width.saturating_add(pixelbuffer.saturating_mul(2)),
            )
        } else {
            let bounds = self.bounds(pixelbuffer);
            Shape::new(
                Tile::pixels(bounds.height(), self.pixel_y_size()),
                Tile::pixels(bounds.width(), self.pixel_x_size()),
            )
        }
    }

    /// Tile of the previous zoom level containing this tile
    pub fn get_parent(&self) -> Option<Tile<'a>> {
        if self.zoom() == 0 {
            return None;
        }
        self.pyramid
            .tile(self.zoom() - 1, self.row / 2, self.col / 2)
            .ok()
    }

    /// Tiles of the next zoom level within this tile
    pub fn get_children(&self) -> Vec<Tile<'a>> {
        if self.zoom() >= MAX_ZOOM {
            return Vec::new();
        }
        let matrix = match self.pyramid.tile_matrix(self.zoom() + 1) {
            Ok(matrix) => matrix,
            Err(_) => return Vec::new(),
        };
        let (row, col) = (self.row * 2, self.col * 2);
        [(row, col), (row + 1, col), (row, col + 1), (row + 1, col + 1)]
            .iter()
            .filter(|(row, col)| matrix.contains(*row, *col))
            .map(|(row, col)| Tile::new(self.pyramid, matrix, *row, *col))
            .collect()
    }

    /// Neighbor tiles
    ///
    /// ```text
    /// -------------
    /// | 8 | 1 | 5 |
    /// -------------
    /// | 4 | x | 2 |
    /// -------------
    /// | 7 | 3 | 6 |
    /// -------------
    /// ```
    ///
    /// Neighbors outside of the tile matrix are dropped, except on global
    /// grids where columns wrap around the antimeridian.
    pub fn get_neighbors(&self, connectedness: Connectedness) -> Vec<Tile<'a>> {
        const EDGE: [(i64, i64); 4] = [(-1, 0), (0, 1), (1, 0), (0, -1)];
        const CORNER: [(i64, i64); 4] = [(-1, 1), (1, 1), (1, -1), (-1, -1)];
        let offsets: Vec<(i64, i64)> = match connectedness {
            Connectedness::Four => EDGE.to_vec(),
            Connectedness::Eight => EDGE.iter().chain(CORNER.iter()).cloned().collect(),
        };
        let mut neighbors: Vec<Tile<'a>> = Vec::with_capacity(offsets.len());
        for (row_offset, col_offset) in offsets {
            if let Some(neighbor) = self.clean_neighbor(row_offset, col_offset) {
                if neighbor.id() != self.id() && !neighbors.iter().any(|n| n.id() == neighbor.id())
                {
                    neighbors.push(neighbor);
                }
            }
        }
        neighbors
    }

    fn clean_neighbor(&self, row_offset: i64, col_offset: i64) -> Option<Tile<'a>> {
        let height = self.matrix.matrix_height as i128;
        let width = self.matrix.matrix_width as i128;
        let row = self.row as i128 + row_offset as i128;
        let mut col = self.col as i128 + col_offset as i128;
        if row < 0 || row >= height {
            return None;
        }
        if self.pyramid.is_global() {
            col = col.rem_euclid(width);
        } else if col < 0 || col >= width {
            return None;
        }
        Some(Tile::new(self.pyramid, self.matrix, row as u64, col as u64))
    }

    /// All tiles of another pyramid intersecting with this tile.
    pub fn intersecting<'b>(&self, pyramid: &'b TilePyramid) -> Result<Vec<Tile<'b>>> {
        tile_intersecting_tilepyramid(self, pyramid)
    }
}

impl<'a> PartialEq for Tile<'a> {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id() && self.pyramid == other.pyramid
    }
}

impl<'a> Eq for Tile<'a> {}

impl<'a> Hash for Tile<'a> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
        self.pyramid.hash(state);
    }
}

impl<'a> fmt::Display for Tile<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tile({}, {}, {}, {})",
            self.zoom(),
            self.row,
            self.col,
            self.pyramid
        )
    }
}
