//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use thiserror::Error;

/// Errors raised by grid, pyramid and tile operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TmxError {
    /// Invalid grid or pyramid parameters.
    #[error("invalid grid definition: {0}")]
    Construction(String),

    #[error("invalid zoom level {zoom}: must be an integer between 0 and {max}")]
    InvalidZoom { zoom: i64, max: u8 },

    #[error("{0}")]
    InvalidArgument(String),

    /// Point outside of the pyramid extent.
    #[error("x ({x}) or y ({y}) are outside of grid bounds")]
    OutOfBounds { x: f64, y: f64 },

    #[error("no valid geometry: {0}")]
    InvalidGeometry(String),

    /// Configuration could not be read or parsed.
    #[error("{0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TmxError>;
