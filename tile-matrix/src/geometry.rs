//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Tiles covering geometries

use crate::error::{Result, TmxError};
use crate::pyramid::TilePyramid;
use crate::tile::Tile;
use crate::tile_iterator::{EdgeUse, TilesFromBounds};
use crate::types::Bounds;
use geo::{
    BoundingRect, GeometryCollection, HasDimensions, Intersects, Polygon, Rect, Translate,
    Validation,
};
use std::fmt;

/// Geometry type
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum GeometryKind {
    Point,
    MultiPoint,
    LineString,
    MultiLineString,
    Polygon,
    MultiPolygon,
    GeometryCollection,
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Geometry operations needed to find covering tiles.
///
/// Coordinates are expected in the CRS of the tile pyramid.
pub trait Geometry {
    type Prepared: PreparedGeometry;

    /// Bounding box, `None` for empty geometries
    fn bounds(&self) -> Option<Bounds>;
    fn is_empty(&self) -> bool;
    fn is_valid(&self) -> bool;
    fn kind(&self) -> GeometryKind;
    /// Coordinates of a point or of all points of a multipoint, in order
    fn points(&self) -> Vec<(f64, f64)>;
    /// Geometry ready to be tested against the tiles of `pyramid`.
    ///
    /// On global pyramids parts beyond the antimeridian are wrapped into the
    /// pyramid bounds. Otherwise the geometry is returned unchanged, as parts
    /// outside the grid intersect no tile anyway.
    fn clip_to_extent(&self, pyramid: &TilePyramid) -> Self
    where
        Self: Sized;
    /// Geometry prepared for repeated intersection tests
    fn prepare(self) -> Self::Prepared
    where
        Self: Sized;
}

pub trait PreparedGeometry {
    fn intersects(&self, bbox: &Polygon<f64>) -> bool;
}

impl Geometry for geo::Geometry<f64> {
    type Prepared = PreparedGeoGeometry;

    fn bounds(&self) -> Option<Bounds> {
        self.bounding_rect()
            .map(|rect| Bounds::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y))
    }

    fn is_empty(&self) -> bool {
        HasDimensions::is_empty(self)
    }

    fn is_valid(&self) -> bool {
        Validation::is_valid(self)
    }

    fn kind(&self) -> GeometryKind {
        match self {
            geo::Geometry::Point(_) => GeometryKind::Point,
            geo::Geometry::MultiPoint(_) => GeometryKind::MultiPoint,
            geo::Geometry::Line(_) | geo::Geometry::LineString(_) => GeometryKind::LineString,
            geo::Geometry::MultiLineString(_) => GeometryKind::MultiLineString,
            geo::Geometry::Polygon(_) | geo::Geometry::Rect(_) | geo::Geometry::Triangle(_) => {
                GeometryKind::Polygon
            }
            geo::Geometry::MultiPolygon(_) => GeometryKind::MultiPolygon,
            geo::Geometry::GeometryCollection(_) => GeometryKind::GeometryCollection,
        }
    }

    fn points(&self) -> Vec<(f64, f64)> {
        match self {
            geo::Geometry::Point(point) => vec![(point.x(), point.y())],
            geo::Geometry::MultiPoint(points) => {
                points.iter().map(|point| (point.x(), point.y())).collect()
            }
            _ => Vec::new(),
        }
    }

    fn clip_to_extent(&self, pyramid: &TilePyramid) -> Self {
        let grid = pyramid.bounds();
        let crosses = self
            .bounds()
            .map_or(false, |bounds| bounds.left < grid.left || bounds.right > grid.right);
        if !pyramid.is_global() || !crosses {
            return self.clone();
        }
        // Copies shifted by one grid width cover the parts wrapping around
        let x_size = pyramid.x_size();
        geo::Geometry::GeometryCollection(GeometryCollection::from(vec![
            self.clone(),
            self.translate(x_size, 0.0),
            self.translate(-x_size, 0.0),
        ]))
    }

    fn prepare(self) -> PreparedGeoGeometry {
        let mut parts = Vec::new();
        flatten(self, &mut parts);
        PreparedGeoGeometry { parts }
    }
}

/// Geometry split into single parts with their envelopes
#[derive(Clone, Debug)]
pub struct PreparedGeoGeometry {
    parts: Vec<(Rect<f64>, geo::Geometry<f64>)>,
}

fn flatten(geometry: geo::Geometry<f64>, parts: &mut Vec<(Rect<f64>, geo::Geometry<f64>)>) {
    match geometry {
        geo::Geometry::GeometryCollection(collection) => {
            for geometry in collection {
                flatten(geometry, parts);
            }
        }
        geo::Geometry::MultiPolygon(polygons) => {
            for polygon in polygons {
                flatten(geo::Geometry::Polygon(polygon), parts);
            }
        }
        geo::Geometry::MultiLineString(lines) => {
            for line in lines {
                flatten(geo::Geometry::LineString(line), parts);
            }
        }
        geo::Geometry::MultiPoint(points) => {
            for point in points {
                flatten(geo::Geometry::Point(point), parts);
            }
        }
        single => {
            if let Some(envelope) = single.bounding_rect() {
                parts.push((envelope, single));
            }
        }
    }
}

impl PreparedGeometry for PreparedGeoGeometry {
    fn intersects(&self, bbox: &Polygon<f64>) -> bool {
        let envelope = match bbox.bounding_rect() {
            Some(envelope) => envelope,
            None => return false,
        };
        self.parts
            .iter()
            .any(|(part_envelope, part)| part_envelope.intersects(&envelope) && part.intersects(bbox))
    }
}

/// Geometry moved into the bounds of a global pyramid, unchanged otherwise.
pub fn clip_geometry_to_srs_bounds<G: Geometry>(geometry: &G, pyramid: &TilePyramid) -> Result<G> {
    if !geometry.is_valid() {
        return Err(TmxError::InvalidGeometry(geometry.kind().to_string()));
    }
    Ok(geometry.clip_to_extent(pyramid))
}

#[derive(Clone, Debug)]
enum GeomTiles<'a, P> {
    Points(std::vec::IntoIter<Tile<'a>>),
    Area {
        prepared: P,
        candidates: TilesFromBounds<'a>,
    },
}

/// Tiles intersecting with a geometry.
///
/// Points resolve to exactly one tile each, other geometries yield the
/// intersecting tiles of their bounding box in row-major order.
#[derive(Clone, Debug)]
pub struct TilesFromGeom<'a, P> {
    inner: GeomTiles<'a, P>,
}

impl<'a, P: PreparedGeometry> Iterator for TilesFromGeom<'a, P> {
    type Item = Tile<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.inner {
            GeomTiles::Points(ref mut tiles) => tiles.next(),
            GeomTiles::Area {
                ref prepared,
                ref mut candidates,
            } => candidates.find(|tile| prepared.intersects(&tile.bbox(0))),
        }
    }
}

pub(crate) fn tiles_from_geom<'a, G: Geometry>(
    pyramid: &'a TilePyramid,
    geometry: &G,
    zoom: u8,
) -> Result<TilesFromGeom<'a, G::Prepared>> {
    if geometry.is_empty() {
        return Ok(TilesFromGeom {
            inner: GeomTiles::Points(Vec::new().into_iter()),
        });
    }
    if !geometry.is_valid() {
        return Err(TmxError::InvalidGeometry(geometry.kind().to_string()));
    }
    let kind = geometry.kind();
    debug!("tiles from {} at zoom {}", kind, zoom);
    let inner = match kind {
        GeometryKind::Point | GeometryKind::MultiPoint => {
            let tiles = geometry
                .points()
                .into_iter()
                .map(|(x, y)| pyramid.tile_from_xy(x, y, zoom, EdgeUse::default()))
                .collect::<Result<Vec<_>>>()?;
            GeomTiles::Points(tiles.into_iter())
        }
        _ => GeomTiles::Area {
            prepared: geometry.clip_to_extent(pyramid).prepare(),
            candidates: pyramid.tiles_from_bbox(geometry, zoom)?,
        },
    };
    Ok(TilesFromGeom { inner })
}
