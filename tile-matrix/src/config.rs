//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Configuration ("dictionary") representation of grids and pyramids

use crate::error::{Result, TmxError};
use crate::grid::{Crs, GridDefinition, GridType};
use crate::pyramid::TilePyramid;
use crate::types::{Bounds, Shape};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs;
use toml::Value;

pub trait Config<'a, C: Deserialize<'a>>
where
    Self: std::marker::Sized,
{
    /// Read configuration
    fn from_config(config: &C) -> Result<Self>;
    /// Configuration representing self
    fn to_config(&self) -> C;
    /// Generate configuration template
    fn gen_config() -> String;
}

#[derive(Deserialize, Serialize, PartialEq, Clone, Debug)]
pub struct PyramidCfg {
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,
    #[serde(default = "default_metatiling")]
    pub metatiling: u32,
    // tables have to follow plain values in TOML
    pub grid: GridCfg,
}

pub fn default_tile_size() -> u32 {
    256
}

pub fn default_metatiling() -> u32 {
    1
}

#[derive(Deserialize, Serialize, PartialEq, Clone, Debug)]
pub struct GridCfg {
    /// `geodetic` or `mercator`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predefined: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserGridCfg>,
}

#[derive(Deserialize, Serialize, PartialEq, Clone, Debug)]
pub struct UserGridCfg {
    /// Tile rows and columns at zoom level 0
    pub shape: [u32; 2],
    /// left, bottom, right, top
    pub bounds: [f64; 4],
    #[serde(default)]
    pub is_global: bool,
    pub srs: SrsCfg,
}

/// Spatial reference system. Exactly one entry has to be set.
#[derive(Deserialize, Serialize, PartialEq, Clone, Debug, Default)]
pub struct SrsCfg {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epsg: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proj: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wkt: Option<String>,
}

impl<'a> Config<'a, SrsCfg> for Crs {
    fn from_config(srs_cfg: &SrsCfg) -> Result<Self> {
        match (&srs_cfg.epsg, &srs_cfg.proj, &srs_cfg.wkt) {
            (Some(epsg), None, None) => Ok(Crs::Epsg(*epsg)),
            (None, Some(proj), None) => Ok(Crs::proj(proj)),
            (None, None, Some(wkt)) => Ok(Crs::Wkt(wkt.clone())),
            _ => Err(TmxError::Config(
                "srs needs exactly one of epsg, proj or wkt".to_string(),
            )),
        }
    }
    fn to_config(&self) -> SrsCfg {
        match self {
            Crs::Epsg(epsg) => SrsCfg {
                epsg: Some(*epsg),
                ..Default::default()
            },
            Crs::Proj(proj) => SrsCfg {
                proj: Some(proj.clone()),
                ..Default::default()
            },
            Crs::Wkt(wkt) => SrsCfg {
                wkt: Some(wkt.clone()),
                ..Default::default()
            },
        }
    }
    fn gen_config() -> String {
        let toml = r#"
srs = { epsg = 3035 }
"#;
        toml.to_string()
    }
}

impl<'a> Config<'a, GridCfg> for GridDefinition {
    fn from_config(grid_cfg: &GridCfg) -> Result<Self> {
        if let Some(ref gridname) = grid_cfg.predefined {
            GridDefinition::from_name(gridname)
        } else if let Some(ref usergrid) = grid_cfg.user {
            GridDefinition::new(
                Crs::from_config(&usergrid.srs)?,
                Bounds::from(usergrid.bounds),
                Shape::new(usergrid.shape[0], usergrid.shape[1]),
                usergrid.is_global,
            )
        } else {
            Err(TmxError::Config("Invalid grid definition".to_string()))
        }
    }
    fn to_config(&self) -> GridCfg {
        match self.grid_type {
            GridType::Geodetic | GridType::Mercator => GridCfg {
                predefined: Some(self.grid_type.name().to_string()),
                user: None,
            },
            GridType::Custom => GridCfg {
                predefined: None,
                user: Some(UserGridCfg {
                    shape: [self.shape.height, self.shape.width],
                    bounds: [
                        self.bounds.left,
                        self.bounds.bottom,
                        self.bounds.right,
                        self.bounds.top,
                    ],
                    is_global: self.is_global,
                    srs: self.crs.to_config(),
                }),
            },
        }
    }
    fn gen_config() -> String {
        let toml = r#"
[grid]
# Predefined grids: geodetic, mercator
predefined = "geodetic"
#[grid.user]
#shape = [1, 1]
#bounds = [2426378.0132, 1528101.2618, 6293974.6215, 5395697.8701]
#is_global = false
#srs = { epsg = 3035 }
"#;
        toml.to_string()
    }
}

impl<'a> Config<'a, PyramidCfg> for TilePyramid {
    fn from_config(pyramid_cfg: &PyramidCfg) -> Result<Self> {
        TilePyramid::new(
            GridDefinition::from_config(&pyramid_cfg.grid)?,
            pyramid_cfg.tile_size,
            pyramid_cfg.metatiling,
        )
    }
    fn to_config(&self) -> PyramidCfg {
        PyramidCfg {
            tile_size: self.tile_size(),
            metatiling: self.metatiling(),
            grid: self.grid().to_config(),
        }
    }
    fn gen_config() -> String {
        let toml = r#"
tile_size = 256
# One of 1, 2, 4, 8, 16
metatiling = 1
"#;
        format!("{}{}", toml, GridDefinition::gen_config())
    }
}

/// Load and parse the config file into a config struct.
pub fn read_config<T: DeserializeOwned>(path: &str) -> Result<T> {
    let config_toml = fs::read_to_string(path).map_err(|err| {
        TmxError::Config(format!("Error while reading config {}: [{}]", path, err))
    })?;
    parse_config(&config_toml, path)
}

/// Parse the configuration into a config struct.
pub fn parse_config<T: DeserializeOwned>(config_toml: &str, path: &str) -> Result<T> {
    config_toml
        .parse::<Value>()
        .and_then(|cfg| cfg.try_into::<T>())
        .map_err(|err| TmxError::Config(format!("{} - {}", path, err)))
}
