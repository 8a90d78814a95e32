mod fit;
mod gpx;

use std::path::Path;

use crate::error::ParseError;
use crate::pipeline::{polyline, process};
use crate::types::activity::{Activity, Coordinate, FileFormat, ParsedActivity, Provider};

pub trait Parser {
    fn parse(&self, bytes: &[u8]) -> Result<ParsedActivity, ParseError>;
}

pub fn parse(bytes: &[u8], format: FileFormat) -> Result<ParsedActivity, ParseError> {
    match format {
        FileFormat::Gpx => gpx::GpxParser.parse(bytes),
        FileFormat::Fit => fit::FitParser.parse(bytes),
    }
}

/// Builds an activity from a parsed export. Export timestamps are UTC and are
/// used as the start time as-is. The id is the start time in epoch seconds.
pub fn to_activity(parsed: &ParsedActivity, fallback_name: &str) -> Result<Activity, ParseError> {
    let first_time = parsed
        .points
        .iter()
        .find_map(|p| p.time)
        .ok_or(ParseError::MissingTimestamps)?;

    let coordinates: Vec<Coordinate> = parsed
        .points
        .iter()
        .map(|p| Coordinate::new(p.lat, p.lon))
        .collect();
    let encoded = polyline::encode(&coordinates);

    let (activity_type, subtype) =
        map_vendor_type(parsed.sport.as_deref(), parsed.sub_sport.as_deref());
    let summary = process::summarize(&parsed.points);

    Ok(Activity {
        id: first_time.timestamp().max(0) as u64,
        name: parsed
            .name
            .clone()
            .unwrap_or_else(|| fallback_name.to_string()),
        provider: Provider::Garmin,
        activity_type,
        subtype,
        start: first_time.naive_utc(),
        distance_km: summary.distance_km,
        elevation_gain_m: summary.elevation_gain_m,
        moving_time_s: summary.moving_time_s,
        avg_speed_kmh: summary.avg_speed_kmh,
        max_speed_kmh: summary.max_speed_kmh,
        avg_watts: summary.avg_watts,
        max_watts: summary.max_watts,
        gear_id: None,
        polyline: (!encoded.is_empty()).then_some(encoded),
    })
}

pub async fn load_export(path: &Path) -> Result<Activity, ParseError> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    let format = FileFormat::from_filename(file_name)
        .ok_or_else(|| ParseError::UnsupportedFile(file_name.to_string()))?;

    let bytes = tokio::fs::read(path).await?;
    let parsed = parse(&bytes, format)?;
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(file_name);
    to_activity(&parsed, stem)
}

/// Loads every GPX and FIT file in `dir`, sorted by file name. Unreadable files are skipped.
pub async fn load_dir(dir: &Path) -> Result<Vec<Activity>, ParseError> {
    let mut paths = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let supported = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(FileFormat::from_filename)
            .is_some();
        if supported {
            paths.push(path);
        }
    }
    paths.sort();

    let mut activities = Vec::with_capacity(paths.len());
    for path in paths {
        match load_export(&path).await {
            Ok(activity) => activities.push(activity),
            Err(err) => tracing::warn!("Skipping export {}: {}", path.display(), err),
        }
    }

    tracing::info!("Loaded {} activities from {}", activities.len(), dir.display());
    Ok(activities)
}

/// Maps a vendor sport / sub-sport onto (type, subtype) of the category table.
/// Unknown sports pass through unchanged.
pub fn map_vendor_type(sport: Option<&str>, sub_sport: Option<&str>) -> (String, String) {
    let normalized = |value: &str| value.trim().to_lowercase().replace('_', " ");
    let sport = sport.map(normalized).unwrap_or_default();
    let sub_sport = sub_sport.map(normalized).unwrap_or_default();

    let pair = |t: &str, s: &str| (t.to_string(), s.to_string());
    match (sport.as_str(), sub_sport.as_str()) {
        ("cycling" | "road cycling" | "road biking" | "biking", "gravel cycling" | "gravel") => {
            pair("Ride", "GravelRide")
        }
        ("cycling" | "road cycling" | "road biking" | "biking", "mountain" | "mountain biking") => {
            pair("Ride", "MountainBikeRide")
        }
        ("cycling", "virtual activity" | "indoor cycling") | ("virtual ride", _) => {
            pair("VirtualRide", "VirtualRide")
        }
        ("cycling" | "road cycling" | "road biking" | "biking", _) => pair("Ride", "Ride"),
        ("gravel cycling", _) => pair("Ride", "GravelRide"),
        ("mountain biking", _) => pair("Ride", "MountainBikeRide"),
        ("running", _) => pair("Run", "Run"),
        ("hiking", _) => pair("Hike", "Hike"),
        ("walking", _) => pair("Walk", "Walk"),
        ("swimming", _) => pair("Swim", "Swim"),
        ("cross country skiing", _) => pair("NordicSki", "NordicSki"),
        ("alpine skiing", _) => pair("Ski", "Ski"),
        _ => {
            let raw = if sport.is_empty() { "Unknown" } else { sport.as_str() };
            pair(raw, raw)
        }
    }
}
