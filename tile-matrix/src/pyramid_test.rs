//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::{
    validate_zoom, Bounds, Crs, EdgeUse, GridDefinition, Shape, TilePyramid, TmxError, MAX_ZOOM,
};
use rstest::rstest;
use std::collections::HashSet;

/// Irregular grid with 10m pixels at zoom level 0
pub(crate) fn irregular_grid() -> GridDefinition {
    GridDefinition::new(
        Crs::Epsg(32632),
        Bounds::new(141920.0, 50240.0, 948320.0, 462400.0),
        Shape::new(161, 315),
        false,
    )
    .unwrap()
}

#[test]
fn test_geodetic() {
    let pyramid = TilePyramid::geodetic();
    assert_eq!(pyramid.tile_size(), 256);
    assert_eq!(pyramid.metatiling(), 1);
    assert_eq!(pyramid.x_size(), 360.0);
    assert_eq!(pyramid.y_size(), 180.0);
    assert_eq!(pyramid.matrix_width(0).unwrap(), 2);
    assert_eq!(pyramid.matrix_height(0).unwrap(), 1);
    assert_eq!(pyramid.matrix_width(5).unwrap(), 64);
    assert_eq!(pyramid.matrix_height(5).unwrap(), 32);
    assert_eq!(pyramid.pixel_x_size(0).unwrap(), 0.703125);
    assert_eq!(pyramid.pixel_y_size(0).unwrap(), 0.703125);
    assert_eq!(pyramid.tile_x_size(0).unwrap(), 180.0);
    assert_eq!(pyramid.tile_x_size(5).unwrap(), 5.625);
    assert_eq!(pyramid.tile_y_size(5).unwrap(), 5.625);
    assert_eq!(pyramid.tile_width(5).unwrap(), 256);
}

#[test]
fn test_metatiling() {
    let pyramid = TilePyramid::new(GridDefinition::geodetic(), 256, 2).unwrap();
    assert_eq!(pyramid.metatile_size(), 512);
    assert_eq!(pyramid.matrix_width(0).unwrap(), 1);
    assert_eq!(pyramid.matrix_height(0).unwrap(), 1);
    // metatiles are cut at the grid border
    assert_eq!(pyramid.tile_width(0).unwrap(), 512);
    assert_eq!(pyramid.tile_height(0).unwrap(), 256);
    assert_eq!(pyramid.tile_x_size(0).unwrap(), 360.0);
    assert_eq!(pyramid.tile_y_size(0).unwrap(), 180.0);
    assert_eq!(pyramid.matrix_width(1).unwrap(), 2);
    assert_eq!(pyramid.matrix_height(1).unwrap(), 1);
    assert_eq!(pyramid.tile_x_size(1).unwrap(), 180.0);

    let pyramid = TilePyramid::new(GridDefinition::mercator(), 256, 16).unwrap();
    assert_eq!(pyramid.matrix_width(0).unwrap(), 1);
    assert_eq!(pyramid.tile_width(0).unwrap(), 256);
    assert_eq!(pyramid.matrix_width(4).unwrap(), 1);
    assert_eq!(pyramid.matrix_width(5).unwrap(), 2);
    assert_eq!(pyramid.tile_width(5).unwrap(), 4096);
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(4)]
#[case(8)]
#[case(16)]
fn test_matrix_floor(#[case] metatiling: u32) {
    for grid in vec![GridDefinition::geodetic(), GridDefinition::mercator(), irregular_grid()] {
        let pyramid = TilePyramid::new(grid, 256, metatiling).unwrap();
        for zoom in 0..=MAX_ZOOM {
            let matrix = pyramid.tile_matrix(zoom).unwrap();
            assert!(matrix.matrix_width >= 1);
            assert!(matrix.matrix_height >= 1);
            assert!(matrix.tile_width <= pyramid.metatile_size());
        }
    }
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(4)]
#[case(8)]
fn test_irregular_grid(#[case] metatiling: u32) {
    let pyramid = TilePyramid::new(irregular_grid(), 256, metatiling).unwrap();
    let m = metatiling as u64;
    assert_eq!(pyramid.matrix_height(0).unwrap(), (161 + m - 1) / m);
    assert_eq!(pyramid.matrix_width(0).unwrap(), (315 + m - 1) / m);
    assert_eq!(pyramid.pixel_x_size(0).unwrap(), 10.0);
    assert_eq!(pyramid.pixel_y_size(0).unwrap(), 10.0);
    assert_eq!(pyramid.tile_x_size(0).unwrap(), 2560.0 * metatiling as f64);
    assert_eq!(pyramid.tile_y_size(0).unwrap(), 2560.0 * metatiling as f64);
    let last = pyramid
        .tile(
            0,
            pyramid.matrix_height(0).unwrap() - 1,
            pyramid.matrix_width(0).unwrap() - 1,
        )
        .unwrap();
    assert_eq!(last.right(), pyramid.right());
    assert_eq!(last.bottom(), pyramid.bottom());
}

#[test]
fn test_invalid_pyramid() {
    assert!(matches!(
        TilePyramid::new(GridDefinition::geodetic(), 256, 3),
        Err(TmxError::Construction(_))
    ));
    assert!(matches!(
        TilePyramid::new(GridDefinition::geodetic(), 0, 1),
        Err(TmxError::Construction(_))
    ));
    assert!(matches!(
        TilePyramid::new(GridDefinition::geodetic(), std::u32::MAX, 2),
        Err(TmxError::Construction(_))
    ));
}

#[test]
fn test_zoom() {
    assert_eq!(validate_zoom(0).unwrap(), 0);
    assert_eq!(validate_zoom(32).unwrap(), 32);
    assert_eq!(
        validate_zoom(-1),
        Err(TmxError::InvalidZoom { zoom: -1, max: 32 })
    );
    let pyramid = TilePyramid::geodetic();
    assert!(matches!(
        pyramid.tile(33, 0, 0),
        Err(TmxError::InvalidZoom { zoom: 33, .. })
    ));
    assert!(pyramid.matrix_width(33).is_err());
    // deep zoom levels saturate instead of overflowing
    assert_eq!(pyramid.matrix_width(32).unwrap(), 2 << 32);
}

#[test]
fn test_tile_from_xy() {
    let pyramid = TilePyramid::geodetic();
    let id = |x, y, zoom, on_edge_use| {
        pyramid
            .tile_from_xy(x, y, zoom, on_edge_use)
            .map(|tile| (tile.zoom(), tile.row(), tile.col()))
            .unwrap()
    };
    assert_eq!(id(0.0, 0.0, 1, EdgeUse::Rb), (1, 1, 2));
    assert_eq!(id(0.0, 0.0, 1, EdgeUse::Lb), (1, 1, 1));
    assert_eq!(id(0.0, 0.0, 1, EdgeUse::Rt), (1, 0, 2));
    assert_eq!(id(0.0, 0.0, 1, EdgeUse::Lt), (1, 0, 1));
    assert_eq!(
        id(16.364693096743736, 48.20196113681686, 6, EdgeUse::Rb),
        (6, 14, 69)
    );
    // grid corners resolve to the border tiles
    assert_eq!(id(-180.0, -90.0, 0, EdgeUse::Rb), (0, 0, 0));
    // left of the western border wraps around the antimeridian
    assert_eq!(id(-180.0, 90.0, 2, EdgeUse::Lt), (2, 0, 7));

    assert_eq!(
        pyramid.tile_from_xy(200.0, 0.0, 3, EdgeUse::Rb),
        Err(TmxError::OutOfBounds { x: 200.0, y: 0.0 })
    );
}

#[test]
fn test_equality() {
    let a = TilePyramid::geodetic();
    let b = TilePyramid::new(GridDefinition::geodetic(), 256, 1).unwrap();
    let c = TilePyramid::new(GridDefinition::geodetic(), 256, 2).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_ne!(a, TilePyramid::mercator());
    let set: HashSet<TilePyramid> = vec![a, b, c].into_iter().collect();
    assert_eq!(set.len(), 2);
    assert_eq!(
        TilePyramid::mercator().to_string(),
        format!(
            "TilePyramid({}, tile_size=256, metatiling=1)",
            GridDefinition::mercator()
        )
    );
}

#[test]
fn test_dict() {
    for pyramid in vec![
        TilePyramid::geodetic(),
        TilePyramid::new(GridDefinition::mercator(), 512, 4).unwrap(),
        TilePyramid::new(irregular_grid(), 256, 2).unwrap(),
    ] {
        let config = pyramid.to_dict();
        assert_eq!(TilePyramid::from_dict(&config).unwrap(), pyramid);
    }
}
