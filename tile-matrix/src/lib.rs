//! A library for tile pyramid and tile matrix calculations
//!
//! ## Predefined pyramids
//!
//! ```rust
//! use tile_matrix::{Bounds, TilePyramid};
//!
//! let pyramid = TilePyramid::geodetic();
//! let tile = pyramid.tile(0, 0, 0).unwrap();
//! assert_eq!(tile.bounds(0), Bounds::new(-180.0, -90.0, 0.0, 90.0));
//! ```
//!
//! ## Tile iterators
//!
//! ```rust
//! use tile_matrix::TilePyramid;
//!
//! let pyramid = TilePyramid::mercator();
//! let tiles = pyramid.tiles_from_bounds(pyramid.bounds(), 1).unwrap();
//! for tile in tiles.clone() {
//!     println!("Tile {}", tile.id());
//! }
//! assert_eq!(tiles.count(), 4);
//! ```
//!
//! ## Custom grids
//!
//! ```rust
//! use tile_matrix::{Bounds, Crs, GridDefinition, Shape, TilePyramid};
//!
//! let grid = GridDefinition::new(
//!     Crs::Epsg(3035),
//!     Bounds::new(2426378.0132, 1528101.2618, 6293974.6215, 5395697.8701),
//!     Shape::new(1, 1),
//!     false,
//! )
//! .unwrap();
//! let pyramid = TilePyramid::new(grid, 256, 1).unwrap();
//! assert_eq!(pyramid.tile(0, 0, 0).unwrap().bounds(0), pyramid.bounds());
//! ```
//!
//! ## Geometries
//!
//! ```rust
//! use geo::{point, Geometry};
//! use tile_matrix::{TileIndex, TilePyramid};
//!
//! let pyramid = TilePyramid::geodetic();
//! let point = Geometry::Point(point!(x: 16.364693096743736, y: 48.20196113681686));
//! let ids: Vec<TileIndex> = pyramid
//!     .tiles_from_geom(&point, 6)
//!     .unwrap()
//!     .map(|tile| tile.id())
//!     .collect();
//! assert_eq!(ids, vec![TileIndex::new(6, 14, 69)]);
//! ```

#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

mod config;
mod error;
mod geometry;
mod grid;
mod intersect;
mod pyramid;
mod tile;
mod tile_iterator;
mod types;

#[cfg(test)]
mod pyramid_test;
#[cfg(test)]
mod tile_test;

pub use config::{
    parse_config, read_config, Config, GridCfg, PyramidCfg, SrsCfg, UserGridCfg,
};
pub use error::{Result, TmxError};
pub use geometry::{
    clip_geometry_to_srs_bounds, Geometry, GeometryKind, PreparedGeoGeometry, PreparedGeometry,
    TilesFromGeom,
};
pub use grid::{Crs, GridDefinition, GridType};
pub use pyramid::{validate_zoom, TileMatrix, TilePyramid, MAX_ZOOM, METATILING_FACTORS};
pub use tile::{Connectedness, Tile};
pub use tile_iterator::{snap_bounds, EdgeUse, TileRange, TilesFromBounds};
pub use types::{round_to, Bounds, Shape, TileIndex, DELTA, ROUND};
