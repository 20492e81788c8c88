//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::pyramid_test::irregular_grid;
use crate::{
    Bounds, Connectedness, Crs, GridDefinition, Shape, Tile, TileIndex, TilePyramid, TmxError,
};
use geo::{coord, Rect};
use std::collections::HashSet;

fn ids(tiles: &[Tile<'_>]) -> Vec<(u8, u64, u64)> {
    tiles.iter().map(|t| (t.zoom(), t.row(), t.col())).collect()
}

fn epsg3035() -> TilePyramid {
    let grid = GridDefinition::new(
        Crs::Epsg(3035),
        Bounds::new(2426378.0132, 1528101.2618, 6293974.6215, 5395697.8701),
        Shape::new(1, 1),
        false,
    )
    .unwrap();
    TilePyramid::new(grid, 256, 1).unwrap()
}

#[test]
fn test_tile_bounds() {
    let pyramid = TilePyramid::geodetic();
    let tile = pyramid.tile(5, 3, 3).unwrap();
    assert_eq!(tile.left(), -163.125);
    assert_eq!(tile.top(), 73.125);
    assert_eq!(tile.bounds(0), Bounds::new(-163.125, 67.5, -157.5, 73.125));
    assert_eq!(
        tile.bounds(1),
        Bounds::new(
            -163.14697265625,
            67.47802734375,
            -157.47802734375,
            73.14697265625
        )
    );
    assert_eq!(
        tile.bbox(0),
        Rect::new(
            coord! { x: -163.125, y: 67.5 },
            coord! { x: -157.5, y: 73.125 }
        )
        .to_polygon()
    );
    assert_eq!(
        tile.affine(0),
        [-163.125, 0.02197265625, 0.0, 73.125, 0.0, -0.02197265625]
    );

    // buffer is clipped at the poles only
    let tile = pyramid.tile(1, 0, 0).unwrap();
    assert_eq!(tile.bounds(2).top, 90.0);
    assert_eq!(tile.bounds(2).left, -180.0 - 2.0 * 0.3515625);
}

#[test]
fn test_tile_shape() {
    let pyramid = TilePyramid::geodetic();
    let tile = pyramid.tile(5, 3, 3).unwrap();
    assert_eq!(tile.shape(0), Shape::new(256, 256));
    assert_eq!(tile.shape(1), Shape::new(258, 258));
    assert_eq!(pyramid.tile(5, 0, 3).unwrap().shape(1), Shape::new(257, 258));
    assert_eq!(pyramid.tile(5, 31, 3).unwrap().shape(1), Shape::new(257, 258));
    assert_eq!(pyramid.tile(0, 0, 0).unwrap().shape(1), Shape::new(256, 258));
    assert_eq!(tile.width(), 256);
    assert_eq!(tile.height(), 256);

    // saturates instead of overflowing
    assert_eq!(tile.shape(u32::MAX), Shape::new(u32::MAX, u32::MAX));
    assert_eq!(
        pyramid.tile(5, 0, 3).unwrap().shape(u32::MAX),
        Shape::new(u32::MAX, u32::MAX)
    );
}

#[test]
fn test_full_grid_tile() {
    let pyramid = epsg3035();
    let tile = pyramid.tile(0, 0, 0).unwrap();
    assert_eq!(tile.bounds(0), pyramid.bounds());
    // buffer is clipped on all sides
    assert_eq!(tile.bounds(5), pyramid.bounds());
    assert_eq!(tile.shape(0), tile.shape(1));
}

#[test]
fn test_buffered_shape_irregular() {
    let pyramid = TilePyramid::new(irregular_grid(), 256, 1).unwrap();
    let height = pyramid.matrix_height(0).unwrap();
    let width = pyramid.matrix_width(0).unwrap();
    for (row, col) in vec![(0, 0), (10, 0), (height - 1, width - 1)] {
        let tile = pyramid.tile(0, row, col).unwrap();
        assert_ne!(tile.shape(10), tile.shape(0));
    }
    assert_eq!(pyramid.tile(0, 0, 0).unwrap().shape(10), Shape::new(266, 266));
}

#[test]
fn test_is_valid() {
    let pyramid = TilePyramid::geodetic();
    assert!(pyramid.tile(0, 0, 1).unwrap().is_valid());
    assert!(!pyramid.tile(0, 0, 2).unwrap().is_valid());
    assert!(!pyramid.tile(0, 1, 0).unwrap().is_valid());
}

#[test]
fn test_parent_children() {
    let pyramid = TilePyramid::geodetic();
    let tile = pyramid.tile(5, 3, 3).unwrap();
    let parent = tile.get_parent().unwrap();
    assert_eq!(parent.id(), TileIndex::new(4, 1, 1));
    assert!(pyramid.tile(0, 0, 0).unwrap().get_parent().is_none());

    let children = pyramid.tile(0, 0, 0).unwrap().get_children();
    let children: HashSet<_> = ids(&children).into_iter().collect();
    let expected: HashSet<_> = vec![(1, 0, 0), (1, 0, 1), (1, 1, 0), (1, 1, 1)]
        .into_iter()
        .collect();
    assert_eq!(children, expected);
    assert!(pyramid.tile(32, 0, 0).unwrap().get_children().is_empty());

    // children outside of the metatile matrix are dropped
    let pyramid = TilePyramid::new(GridDefinition::geodetic(), 256, 2).unwrap();
    let children = pyramid.tile(0, 0, 0).unwrap().get_children();
    assert_eq!(ids(&children), vec![(1, 0, 0), (1, 0, 1)]);
}

#[test]
fn test_neighbors() {
    let pyramid = TilePyramid::geodetic();
    let tile = pyramid.tile(1, 0, 0).unwrap();
    assert_eq!(
        ids(&tile.get_neighbors(Connectedness::Eight)),
        vec![(1, 0, 1), (1, 1, 0), (1, 0, 3), (1, 1, 1), (1, 1, 3)]
    );
    assert_eq!(
        ids(&tile.get_neighbors(Connectedness::Four)),
        vec![(1, 0, 1), (1, 1, 0), (1, 0, 3)]
    );
    assert_eq!(Connectedness::default(), Connectedness::Eight);

    // wrapped neighbors are unique and never the tile itself
    let tile = pyramid.tile(0, 0, 0).unwrap();
    assert_eq!(ids(&tile.get_neighbors(Connectedness::Eight)), vec![(0, 0, 1)]);
    let mercator = TilePyramid::mercator();
    let tile = mercator.tile(0, 0, 0).unwrap();
    assert!(tile.get_neighbors(Connectedness::Eight).is_empty());

    let pyramid = epsg3035();
    let tile = pyramid.tile(1, 0, 0).unwrap();
    let neighbors: HashSet<_> = ids(&tile.get_neighbors(Connectedness::Eight))
        .into_iter()
        .collect();
    let expected: HashSet<_> = vec![(1, 1, 0), (1, 0, 1), (1, 1, 1)].into_iter().collect();
    assert_eq!(neighbors, expected);
}

#[test]
fn test_equality() {
    let a = TilePyramid::geodetic();
    let b = TilePyramid::new(GridDefinition::geodetic(), 256, 1).unwrap();
    let c = TilePyramid::new(GridDefinition::geodetic(), 256, 2).unwrap();
    assert_eq!(a.tile(3, 1, 2).unwrap(), b.tile(3, 1, 2).unwrap());
    assert_ne!(a.tile(3, 1, 2).unwrap(), a.tile(3, 1, 3).unwrap());
    assert_ne!(a.tile(3, 1, 2).unwrap(), c.tile(3, 1, 2).unwrap());
    let set: HashSet<Tile<'_>> = vec![
        a.tile(3, 1, 2).unwrap(),
        b.tile(3, 1, 2).unwrap(),
        c.tile(3, 1, 2).unwrap(),
    ]
    .into_iter()
    .collect();
    assert_eq!(set.len(), 2);
    assert_eq!(
        a.tile(5, 3, 3).unwrap().to_string(),
        format!("Tile(5, 3, 3, {})", a)
    );
}

#[test]
fn test_intersecting() {
    let tiles = TilePyramid::geodetic();
    let metatiles = TilePyramid::new(GridDefinition::geodetic(), 256, 2).unwrap();

    let tile = tiles.tile(1, 0, 0).unwrap();
    assert_eq!(ids(&tile.intersecting(&metatiles).unwrap()), vec![(1, 0, 0)]);

    let metatile = metatiles.tile(1, 0, 0).unwrap();
    assert_eq!(
        ids(&metatile.intersecting(&tiles).unwrap()),
        vec![(1, 0, 0), (1, 0, 1), (1, 1, 0), (1, 1, 1)]
    );
    assert_eq!(
        ids(&tiles.intersecting(&metatile).unwrap()),
        vec![(1, 0, 0), (1, 0, 1), (1, 1, 0), (1, 1, 1)]
    );

    assert!(matches!(
        tile.intersecting(&TilePyramid::mercator()),
        Err(TmxError::InvalidArgument(_))
    ));
}

#[test]
fn test_intersecting_metatiles() {
    for grid in vec![GridDefinition::mercator(), epsg3035().grid().clone()] {
        let tiles = TilePyramid::new(grid.clone(), 256, 1).unwrap();
        let metatiles = TilePyramid::new(grid, 256, 2).unwrap();
        for zoom in 3..=5 {
            for metatile in metatiles.tiles_from_bounds(metatiles.bounds(), zoom).unwrap() {
                let row = metatile.row() * 2;
                let col = metatile.col() * 2;
                let children = metatile.intersecting(&tiles).unwrap();
                assert_eq!(
                    ids(&children),
                    vec![
                        (zoom, row, col),
                        (zoom, row, col + 1),
                        (zoom, row + 1, col),
                        (zoom, row + 1, col + 1)
                    ],
                    "{}",
                    metatile
                );
                for tile in children {
                    assert_eq!(tile.intersecting(&metatiles).unwrap(), vec![metatile]);
                }
            }
        }
    }
}
