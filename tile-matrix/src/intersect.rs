//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::error::{Result, TmxError};
use crate::pyramid::{TilePyramid, MAX_ZOOM};
use crate::tile::Tile;

/// Zoom level of `pyramid` with the pixel size closest to `pixel_size`.
/// Ties go to the lower zoom level.
fn equivalent_zoom(pyramid: &TilePyramid, pixel_size: f64) -> Result<u8> {
    let mut best = (0, std::f64::INFINITY);
    for zoom in 0..=MAX_ZOOM {
        let distance = (pyramid.pixel_x_size(zoom)? / pixel_size).ln().abs();
        if distance < best.1 {
            best = (zoom, distance);
        }
    }
    Ok(best.0)
}

/// Tiles of `pyramid` intersecting with a tile of another pyramid sharing
/// the same grid.
pub(crate) fn tile_intersecting_tilepyramid<'b>(
    tile: &Tile<'_>,
    pyramid: &'b TilePyramid,
) -> Result<Vec<Tile<'b>>> {
    let source = tile.pyramid();
    if source.crs() != pyramid.crs() || source.bounds() != pyramid.bounds() {
        return Err(TmxError::InvalidArgument(format!(
            "{} and {} do not share the same grid",
            source.grid(),
            pyramid.grid()
        )));
    }
    let zoom = equivalent_zoom(pyramid, tile.pixel_x_size())?;
    debug!(
        "tile {} matches zoom {} with metatiling {}",
        tile.id(),
        zoom,
        pyramid.metatiling()
    );
    Ok(pyramid.tiles_from_bounds(tile.bounds(0), zoom)?.collect())
}
