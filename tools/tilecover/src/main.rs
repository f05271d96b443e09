use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use comfy_table::Table;
use env_logger::{Env, TimestampPrecision};
use futures::StreamExt;
use geo_types::{LineString, Polygon};
use tiling::{
    BBox, CoverageOptions, Footprint, GeoHasher, TileOrigin, TileRange, TileRanger,
    tile_batch_stream,
    tilecount::{FootprintFeature, footprint_tile_count},
    tilegrid::MAX_RESOLUTION_ZOOM,
};

pub type Error = inf::Error;
pub type Result<T = ()> = inf::Result<T>;

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum Origin {
    #[default]
    Ll,
    Ul,
}

impl From<Origin> for TileOrigin {
    fn from(origin: Origin) -> Self {
        match origin {
            Origin::Ll => TileOrigin::LowerLeft,
            Origin::Ul => TileOrigin::UpperLeft,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum Output {
    #[default]
    Ranges,
    Tiles,
    Batches,
    Count,
    Geohash,
}

#[derive(Parser, Debug)]
#[clap(name = "tilecover", about = "Cover a bounding box or polygon with tiles")]
pub struct Opt {
    /// minLon,minLat,maxLon,maxLat
    #[clap(long = "bbox", conflicts_with_all = ["polygon", "polygon_file"], allow_hyphen_values = true)]
    pub bbox: Option<String>,

    /// Polygon ring as "lon lat, lon lat, ..."
    #[clap(long = "polygon", conflicts_with = "polygon_file", allow_hyphen_values = true)]
    pub polygon: Option<String>,

    #[clap(long = "polygon-file")]
    pub polygon_file: Option<PathBuf>,

    #[clap(long = "zoom", short = 'z')]
    pub zoom: u8,

    #[clap(long = "min-zoom", default_value = "0")]
    pub min_zoom: u8,

    #[clap(long = "batch-size", default_value = "256")]
    pub batch_size: u64,

    #[clap(long = "origin", value_enum, default_value_t = Origin::Ll)]
    pub origin: Origin,

    #[clap(long = "output", short = 'o', value_enum, default_value_t = Output::Ranges)]
    pub output: Output,
}

fn parse_bbox(bbox: &str) -> Result<BBox> {
    let values = bbox.split(',').map(|v| v.trim().parse::<f64>()).collect::<std::result::Result<Vec<_>, _>>()?;
    match values[..] {
        [min_lon, min_lat, max_lon, max_lat] => Ok(BBox::new(min_lon, min_lat, max_lon, max_lat).normalized()),
        _ => Err(Error::InvalidArgument(format!(
            "Invalid bbox format '{bbox}', expected minLon,minLat,maxLon,maxLat"
        ))),
    }
}

fn parse_ring(ring: &str) -> Result<Polygon<f64>> {
    let mut points = Vec::new();
    for point in ring.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let coords = point.split_whitespace().collect::<Vec<_>>();
        if coords.len() != 2 {
            return Err(Error::InvalidArgument(format!("Invalid coordinate format '{point}', expected 'lon lat'")));
        }

        points.push((coords[0].parse::<f64>()?, coords[1].parse::<f64>()?));
    }

    if points.len() < 3 {
        return Err(Error::InvalidArgument(format!(
            "A polygon ring needs at least 3 points, got {}",
            points.len()
        )));
    }

    Ok(Polygon::new(LineString::from(points), vec![]))
}

fn footprint_from_opt(opt: &Opt) -> Result<Footprint> {
    if let Some(bbox) = &opt.bbox {
        return Ok(Footprint::from(parse_bbox(bbox)?));
    }

    if let Some(ring) = &opt.polygon {
        return Ok(Footprint::from(parse_ring(ring)?));
    }

    if let Some(path) = &opt.polygon_file {
        let ring = std::fs::read_to_string(path)?;
        return Ok(Footprint::from(parse_ring(&ring)?));
    }

    Err(Error::InvalidArgument(
        "No area provided, use --bbox, --polygon or --polygon-file".to_string(),
    ))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| Error::Runtime(format!("Failed to serialize output: {e}")))
}

fn print_counts(ranger: &TileRanger, footprint: &Footprint, min_zoom: u8, max_zoom: u8) -> Result {
    if min_zoom > max_zoom {
        return Err(Error::InvalidArgument(format!(
            "min zoom {min_zoom} is larger than zoom {max_zoom}"
        )));
    }

    let mut table = Table::new();
    table.set_header(vec!["Zoom", "Ranges", "Tiles"]);

    let mut total = 0;
    for zoom in min_zoom..=max_zoom {
        let (ranges, tiles) = ranger
            .cover_footprint(footprint.clone(), zoom)?
            .fold((0_u64, 0_u64), |(ranges, tiles), range| (ranges + 1, tiles + range.tile_count()));

        total += tiles;
        table.add_row(vec![zoom.to_string(), ranges.to_string(), tiles.to_string()]);
    }

    table.add_row(vec!["Total".to_string(), String::new(), total.to_string()]);
    println!("{table}");

    if max_zoom <= MAX_RESOLUTION_ZOOM {
        let estimate = footprint_tile_count(
            &FootprintFeature::new(footprint.clone()),
            min_zoom..=max_zoom,
            ranger.options().zoom_strategy,
        )?;
        println!("Bounding box estimate: {estimate}");
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let opt = Opt::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .format_timestamp(Some(TimestampPrecision::Millis))
        .init();

    let footprint = footprint_from_opt(&opt)?;
    let options = CoverageOptions::builder().origin(opt.origin.into()).build();
    let ranger = TileRanger::with_options(options);
    log::info!("Covering {:?} at zoom {}", footprint.bbox(), opt.zoom);

    match opt.output {
        Output::Ranges => {
            for range in ranger.cover_footprint(footprint, opt.zoom)? {
                println!("{}", to_json(&range)?);
            }
        }
        Output::Tiles => {
            for tile in ranger.generate_tiles(footprint, opt.zoom)? {
                println!("{tile}");
            }
        }
        Output::Batches => {
            let ranges = futures::stream::iter(ranger.cover_footprint(footprint, opt.zoom)?);
            let mut batches = std::pin::pin!(tile_batch_stream(opt.batch_size, ranges)?);
            while let Some(batch) = batches.next().await {
                println!("{}", to_json::<Vec<TileRange>>(&batch)?);
            }
        }
        Output::Count => print_counts(&ranger, &footprint, opt.min_zoom, opt.zoom)?,
        Output::Geohash => {
            for hash in GeoHasher::with_options(options).cover(footprint, opt.zoom)? {
                println!("{}", hash?);
            }
        }
    }

    Ok(())
}
