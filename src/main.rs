//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

#[macro_use]
extern crate clap;
#[macro_use]
extern crate log;

use clap::{App, AppSettings, ArgMatches, SubCommand};
use dotenv::dotenv;
use env_logger::Builder;
use log::Record;
use serde_json::{json, Value};
use std::env;
use std::io::Write;
use std::process;
use std::str::FromStr;
use tile_matrix::{
    read_config, snap_bounds, validate_zoom, Bounds, Config, EdgeUse, GridDefinition, PyramidCfg,
    Tile, TilePyramid,
};
use time;

fn init_logger(args: &ArgMatches<'_>) {
    let mut builder = Builder::new();
    builder.format(|buf, record: &Record<'_>| {
        let t = time::now();
        writeln!(
            buf,
            "{}.{:03} {} {}",
            time::strftime("%Y-%m-%d %H:%M:%S", &t).unwrap_or_default(),
            t.tm_nsec / 1000_000,
            record.level(),
            record.args()
        )
    });

    let rust_log_env = env::var("RUST_LOG");
    let rust_log = match (args.value_of("loglevel"), rust_log_env.as_ref()) {
        (None, Ok(rust_log)) => rust_log.as_str(),
        (loglevel, _) => loglevel.unwrap_or("warn"),
    };
    builder.parse_filters(rust_log);

    builder.init();
}

#[derive(PartialEq, Clone, Copy, Debug)]
enum OutputFormat {
    Tile,
    Wkt,
    GeoJson,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<OutputFormat, String> {
        match s {
            "Tile" => Ok(OutputFormat::Tile),
            "WKT" => Ok(OutputFormat::Wkt),
            "GeoJSON" => Ok(OutputFormat::GeoJson),
            _ => Err(format!("Unexpected output format '{}'", s)),
        }
    }
}

fn parse_arg<T: FromStr>(args: &ArgMatches<'_>, name: &str) -> Result<T, String> {
    let value = args
        .value_of(name)
        .ok_or_else(|| format!("Missing argument '{}'", name))?;
    value
        .parse::<T>()
        .map_err(|_| format!("Error parsing '{}' value '{}'", name, value))
}

fn parse_opt<T: FromStr>(args: &ArgMatches<'_>, name: &str, default: T) -> Result<T, String> {
    if args.is_present(name) {
        parse_arg(args, name)
    } else {
        Ok(default)
    }
}

fn parse_zoom(args: &ArgMatches<'_>) -> Result<u8, String> {
    validate_zoom(parse_arg::<i64>(args, "ZOOM")?).map_err(|e| e.to_string())
}

fn parse_bounds(args: &ArgMatches<'_>) -> Result<Bounds, String> {
    Ok(Bounds::new(
        parse_arg(args, "LEFT")?,
        parse_arg(args, "BOTTOM")?,
        parse_arg(args, "RIGHT")?,
        parse_arg(args, "TOP")?,
    ))
}

fn pyramid_from_args(args: &ArgMatches<'_>) -> Result<TilePyramid, String> {
    let mut config = match args.value_of("config") {
        Some(path) => read_config::<PyramidCfg>(path).map_err(|e| e.to_string())?,
        None => {
            let grid = GridDefinition::from_name(args.value_of("grid").unwrap_or("geodetic"))
                .map_err(|e| e.to_string())?;
            TilePyramid::new(grid, 256, 1)
                .map_err(|e| e.to_string())?
                .to_config()
        }
    };
    config.tile_size = parse_opt(args, "tile_size", config.tile_size)?;
    config.metatiling = parse_opt(args, "metatiling", config.metatiling)?;
    TilePyramid::from_config(&config).map_err(|e| e.to_string())
}

fn bounds_wkt(bounds: &Bounds) -> String {
    format!(
        "POLYGON (({l} {b}, {r} {b}, {r} {t}, {l} {t}, {l} {b}))",
        l = bounds.left,
        b = bounds.bottom,
        r = bounds.right,
        t = bounds.top
    )
}

fn bounds_geojson(bounds: &Bounds) -> Value {
    json!({
        "type": "Polygon",
        "coordinates": [[
            [bounds.left, bounds.bottom],
            [bounds.right, bounds.bottom],
            [bounds.right, bounds.top],
            [bounds.left, bounds.top],
            [bounds.left, bounds.bottom]
        ]]
    })
}

fn tile_feature(tile: &Tile<'_>, pixelbuffer: u32) -> Value {
    json!({
        "type": "Feature",
        "geometry": bounds_geojson(&tile.bounds(pixelbuffer)),
        "properties": {
            "zoom": tile.zoom(),
            "row": tile.row(),
            "col": tile.col()
        }
    })
}

fn format_bounds(bounds: &Bounds) -> String {
    format!(
        "{} {} {} {}",
        bounds.left, bounds.bottom, bounds.right, bounds.top
    )
}

fn format_bbox(bounds: &Bounds, output_format: OutputFormat) -> String {
    match output_format {
        OutputFormat::GeoJson => bounds_geojson(bounds).to_string(),
        OutputFormat::Tile | OutputFormat::Wkt => bounds_wkt(bounds),
    }
}

fn format_tile(tile: &Tile<'_>, pixelbuffer: u32, output_format: OutputFormat) -> String {
    match output_format {
        OutputFormat::Tile => tile.id().to_string(),
        OutputFormat::Wkt => bounds_wkt(&tile.bounds(pixelbuffer)),
        OutputFormat::GeoJson => tile_feature(tile, pixelbuffer).to_string(),
    }
}

fn format_tiles(tiles: &[Tile<'_>], pixelbuffer: u32, output_format: OutputFormat) -> String {
    match output_format {
        OutputFormat::GeoJson => json!({
            "type": "FeatureCollection",
            "features": tiles
                .iter()
                .map(|tile| tile_feature(tile, pixelbuffer))
                .collect::<Vec<_>>()
        })
        .to_string(),
        _ => tiles
            .iter()
            .map(|tile| format_tile(tile, pixelbuffer, output_format))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn run(args: &ArgMatches<'_>, command: &str, sub_m: &ArgMatches<'_>) -> Result<String, String> {
    if command == "genconfig" {
        return Ok(TilePyramid::gen_config());
    }
    let pyramid = pyramid_from_args(args)?;
    let pixelbuffer = parse_opt(args, "pixelbuffer", 0u32)?;
    let output_format = parse_opt(args, "output_format", OutputFormat::Tile)?;
    debug!("{}", pyramid);
    let zoom = parse_zoom(sub_m)?;
    match command {
        "bounds" | "bbox" => {
            let tile = pyramid
                .tile(zoom, parse_arg(sub_m, "ROW")?, parse_arg(sub_m, "COL")?)
                .map_err(|e| e.to_string())?;
            if !tile.is_valid() {
                return Err(format!("{} is not part of the tile matrix", tile.id()));
            }
            let bounds = tile.bounds(pixelbuffer);
            if command == "bounds" {
                Ok(format_bounds(&bounds))
            } else {
                Ok(format_bbox(&bounds, output_format))
            }
        }
        "tile" => {
            let tile = pyramid
                .tile_from_xy(
                    parse_arg(sub_m, "X")?,
                    parse_arg(sub_m, "Y")?,
                    zoom,
                    EdgeUse::default(),
                )
                .map_err(|e| e.to_string())?;
            Ok(format_tile(&tile, pixelbuffer, output_format))
        }
        "tiles" => {
            let tiles = pyramid
                .tiles_from_bounds(parse_bounds(sub_m)?, zoom)
                .map_err(|e| e.to_string())?
                .collect::<Vec<_>>();
            info!("{} tiles at zoom {}", tiles.len(), zoom);
            Ok(format_tiles(&tiles, pixelbuffer, output_format))
        }
        "snap-bounds" | "snap-bbox" => {
            let bounds = snap_bounds(parse_bounds(sub_m)?, &pyramid, zoom, pixelbuffer)
                .map_err(|e| e.to_string())?;
            if command == "snap-bounds" {
                Ok(format_bounds(&bounds))
            } else {
                Ok(format_bbox(&bounds, output_format))
            }
        }
        _ => Err(format!("Unknown command '{}'", command)),
    }
}

fn main() {
    dotenv().ok();
    // http://kbknapp.github.io/clap-rs/clap/
    let mut app = App::new("tmx")
        .version(crate_version!())
        .author("Pirmin Kalberer <pka@sourcepole.ch>")
        .about("Tile pyramid and tile matrix calculations")
        .args_from_usage("--grid=[geodetic|mercator] 'Predefined grid (Default: geodetic)'
                          -c, --config=[FILE] 'Load pyramid from config file'
                          --metatiling=[1|2|4|8|16] 'Metatile size (Default: 1)'
                          --tile_size=[PIXELS] 'Tile size in pixels (Default: 256)'
                          --pixelbuffer=[PIXELS] 'Tile buffer in pixels (Default: 0)'
                          --output_format=[Tile|WKT|GeoJSON] 'Output format (Default: Tile)'
                          --loglevel=[error|warn|info|debug|trace] 'Log level (Default: warn)'")
        .subcommand(SubCommand::with_name("bounds")
                        .args_from_usage("<ZOOM> 'Zoom level'
                                          <ROW> 'Tile row'
                                          <COL> 'Tile column'")
                        .about("Print tile bounds"))
        .subcommand(SubCommand::with_name("bbox")
                        .args_from_usage("<ZOOM> 'Zoom level'
                                          <ROW> 'Tile row'
                                          <COL> 'Tile column'")
                        .about("Print tile bounding box as geometry"))
        .subcommand(SubCommand::with_name("tile")
                        .setting(AppSettings::AllowLeadingHyphen)
                        .args_from_usage("<ZOOM> 'Zoom level'
                                          <X> 'Point x coordinate'
                                          <Y> 'Point y coordinate'")
                        .about("Print tile covering point"))
        .subcommand(SubCommand::with_name("tiles")
                        .setting(AppSettings::AllowLeadingHyphen)
                        .args_from_usage("<ZOOM> 'Zoom level'
                                          <LEFT> 'Left bound'
                                          <BOTTOM> 'Bottom bound'
                                          <RIGHT> 'Right bound'
                                          <TOP> 'Top bound'")
                        .about("Print tiles intersecting with bounds"))
        .subcommand(SubCommand::with_name("snap-bounds")
                        .setting(AppSettings::AllowLeadingHyphen)
                        .args_from_usage("<ZOOM> 'Zoom level'
                                          <LEFT> 'Left bound'
                                          <BOTTOM> 'Bottom bound'
                                          <RIGHT> 'Right bound'
                                          <TOP> 'Top bound'")
                        .about("Print bounds snapped to tile grid"))
        .subcommand(SubCommand::with_name("snap-bbox")
                        .setting(AppSettings::AllowLeadingHyphen)
                        .args_from_usage("<ZOOM> 'Zoom level'
                                          <LEFT> 'Left bound'
                                          <BOTTOM> 'Bottom bound'
                                          <RIGHT> 'Right bound'
                                          <TOP> 'Top bound'")
                        .about("Print bounding box snapped to tile grid"))
        .subcommand(SubCommand::with_name("genconfig")
                        .about("Generate configuration template"));

    match app.get_matches_from_safe_borrow(env::args()) {
        //app.get_matches() prohibits later call of app.print_help()
        Result::Err(e) => {
            println!("{}", e);
        }
        Result::Ok(matches) => {
            init_logger(&matches);
            match matches.subcommand() {
                (command, Some(sub_m)) => match run(&matches, command, sub_m) {
                    Ok(output) => println!("{}", output),
                    Err(e) => {
                        error!("{}", e);
                        process::exit(1);
                    }
                },
                _ => {
                    let _ = app.print_help();
                    println!("");
                }
            }
        }
    }
}
