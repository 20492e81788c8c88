//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Grid definitions

use crate::error::{Result, TmxError};
use crate::types::{Bounds, Shape, DELTA};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Coordinate reference system identifier
///
/// The identifier is opaque: it is compared, printed and serialized but never
/// interpreted.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub enum Crs {
    Epsg(u32),
    Proj(String),
    Wkt(String),
}

impl Crs {
    /// Proj string with normalized whitespace
    pub fn proj(definition: &str) -> Crs {
        Crs::Proj(definition.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    pub fn epsg(&self) -> Option<u32> {
        match self {
            Crs::Epsg(code) => Some(*code),
            _ => None,
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Crs::Epsg(code) => write!(f, "EPSG:{}", code),
            Crs::Proj(proj) => write!(f, "{}", proj),
            Crs::Wkt(wkt) => write!(f, "{}", wkt),
        }
    }
}

/// Grid type
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum GridType {
    Geodetic,
    Mercator,
    Custom,
}

impl GridType {
    pub fn name(&self) -> &'static str {
        match self {
            GridType::Geodetic => "geodetic",
            GridType::Mercator => "mercator",
            GridType::Custom => "custom",
        }
    }
}

impl fmt::Display for GridType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const MERCATOR_BOUND: f64 = 20037508.3427892;

// UTM stripes: 1310720 wide, 10485760 high, i.e. exactly 10m pixels at zoom 9
const UTM_STRIPE_SHAPE: (u32, u32) = (8, 1);
const UTM_STRIPE_NORTH_BOUNDS: [f64; 4] = [166021.4431, 0.0, 1476741.4431, 10485760.0];
const UTM_STRIPE_SOUTH_BOUNDS: [f64; 4] = [441867.78, -485760.0, 1752587.78, 10000000.0];

/// Grid definition
///
/// Describes the extent of a tile grid in CRS units and the number of tile
/// rows and columns at zoom level 0.
#[derive(Clone, Debug)]
pub struct GridDefinition {
    /// Spatial reference system
    pub crs: Crs,
    /// Grid extent. The top left corner is the origin of the tile matrix.
    pub bounds: Bounds,
    /// Tile rows and columns at zoom level 0
    pub shape: Shape,
    /// Grid wraps around the antimeridian
    pub is_global: bool,
    pub grid_type: GridType,
}

impl GridDefinition {
    /// Custom grid
    pub fn new(crs: Crs, bounds: Bounds, shape: Shape, is_global: bool) -> Result<GridDefinition> {
        GridDefinition::with_type(GridType::Custom, crs, bounds, shape, is_global)
    }

    fn with_type(
        grid_type: GridType,
        crs: Crs,
        bounds: Bounds,
        shape: Shape,
        is_global: bool,
    ) -> Result<GridDefinition> {
        if shape.height == 0 || shape.width == 0 {
            return Err(TmxError::Construction(format!(
                "shape {} must have at least one row and one column",
                shape
            )));
        }
        let finite = [bounds.left, bounds.bottom, bounds.right, bounds.top]
            .iter()
            .all(|v| v.is_finite());
        if !finite || bounds.left >= bounds.right || bounds.bottom >= bounds.top {
            return Err(TmxError::Construction(format!(
                "bounds {} must be finite with left < right and bottom < top",
                bounds
            )));
        }
        verify_shape_bounds(&shape, &bounds)?;
        Ok(GridDefinition {
            crs,
            bounds,
            shape,
            is_global,
            grid_type,
        })
    }

    /// Global WGS84 grid with two tiles at zoom level 0
    pub fn geodetic() -> GridDefinition {
        GridDefinition {
            crs: Crs::Epsg(4326),
            bounds: Bounds::new(-180.0, -90.0, 180.0, 90.0),
            shape: Shape::new(1, 2),
            is_global: true,
            grid_type: GridType::Geodetic,
        }
    }

    /// Global Web Mercator grid with one tile at zoom level 0
    pub fn mercator() -> GridDefinition {
        GridDefinition {
            crs: Crs::Epsg(3857),
            bounds: Bounds::new(
                -MERCATOR_BOUND,
                -MERCATOR_BOUND,
                MERCATOR_BOUND,
                MERCATOR_BOUND,
            ),
            shape: Shape::new(1, 1),
            is_global: true,
            grid_type: GridType::Mercator,
        }
    }

    /// Grid covering one UTM stripe (EPSG 32601-32660 north, 32701-32760 south)
    pub fn utm(epsg: u32) -> Result<GridDefinition> {
        let bounds = match epsg {
            32601..=32660 => UTM_STRIPE_NORTH_BOUNDS,
            32701..=32760 => UTM_STRIPE_SOUTH_BOUNDS,
            _ => {
                return Err(TmxError::Construction(format!(
                    "EPSG:{} is not a WGS84 UTM zone",
                    epsg
                )))
            }
        };
        GridDefinition::new(
            Crs::Epsg(epsg),
            Bounds::from(bounds),
            Shape::from(UTM_STRIPE_SHAPE),
            false,
        )
    }

    /// Predefined grid by name
    pub fn from_name(name: &str) -> Result<GridDefinition> {
        match name {
            "geodetic" => Ok(GridDefinition::geodetic()),
            "mercator" => Ok(GridDefinition::mercator()),
            _ => Err(TmxError::Construction(format!(
                "Unknown grid '{}', use one of geodetic, mercator",
                name
            ))),
        }
    }

    pub fn left(&self) -> f64 {
        self.bounds.left
    }
    pub fn bottom(&self) -> f64 {
        self.bounds.bottom
    }
    pub fn right(&self) -> f64 {
        self.bounds.right
    }
    pub fn top(&self) -> f64 {
        self.bounds.top
    }
}

/// Bounds aspect ratio has to match the shape aspect ratio
fn verify_shape_bounds(shape: &Shape, bounds: &Bounds) -> Result<()> {
    let shape_ratio = shape.width as f64 / shape.height as f64;
    let bounds_ratio = bounds.width() / bounds.height();
    if (shape_ratio - bounds_ratio).abs() > DELTA {
        let min_length = (bounds.width() / shape.width as f64)
            .min(bounds.height() / shape.height as f64);
        let proposed = Bounds::new(
            bounds.left,
            bounds.bottom,
            bounds.left + shape.width as f64 * min_length,
            bounds.bottom + shape.height as f64 * min_length,
        );
        return Err(TmxError::Construction(format!(
            "shape ratio ({}) must equal bounds ratio ({}); try {}",
            shape_ratio, bounds_ratio, proposed
        )));
    }
    Ok(())
}

impl PartialEq for GridDefinition {
    fn eq(&self, other: &GridDefinition) -> bool {
        self.crs == other.crs
            && self.bounds == other.bounds
            && self.shape == other.shape
            && self.is_global == other.is_global
    }
}

// bounds are validated to be finite
impl Eq for GridDefinition {}

impl Hash for GridDefinition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.crs.hash(state);
        self.bounds.hash_bits().hash(state);
        self.shape.hash(state);
        self.is_global.hash(state);
    }
}

impl fmt::Display for GridDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GridDefinition({}, crs={}, shape={}, bounds={}, is_global={})",
            self.grid_type, self.crs, self.shape, self.bounds, self.is_global
        )
    }
}
