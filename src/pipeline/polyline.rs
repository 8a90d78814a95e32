use geo_types::{Coord, LineString};

use crate::types::activity::Coordinate;

const PRECISION: u32 = 5;

/// Decodes a Google encoded polyline. Anything undecodable yields an empty list.
pub fn decode(encoded: &str) -> Vec<Coordinate> {
    if encoded.is_empty() {
        return Vec::new();
    }

    let line = match ::polyline::decode_polyline(encoded, PRECISION) {
        Ok(line) => line,
        Err(err) => {
            tracing::debug!("Discarding undecodable polyline: {}", err);
            return Vec::new();
        }
    };

    let points: Vec<Coordinate> = line
        .coords()
        .map(|c| Coordinate::new(c.y, c.x))
        .collect();

    if points.iter().any(|p| !is_valid(p)) {
        tracing::debug!("Discarding polyline with out-of-range coordinates");
        return Vec::new();
    }

    points
}

pub fn encode(points: &[Coordinate]) -> String {
    let line: LineString<f64> = points
        .iter()
        .map(|p| Coord { x: p.lon, y: p.lat })
        .collect();

    ::polyline::encode_coordinates(line, PRECISION).unwrap_or_default()
}

fn is_valid(point: &Coordinate) -> bool {
    point.lat.is_finite()
        && point.lon.is_finite()
        && (-90.0..=90.0).contains(&point.lat)
        && (-180.0..=180.0).contains(&point.lon)
}
