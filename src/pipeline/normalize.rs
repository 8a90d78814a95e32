use std::collections::HashSet;

use chrono::{DateTime, NaiveDateTime};
use serde_json::{Map, Value};

use crate::error::NormalizeError;
use crate::types::activity::{Activity, Provider};

const POLYLINE_KEYS: [&str; 2] = ["map.summary_polyline", "map.polyline"];

/// Flattens nested objects into dotted keys (`map.summary_polyline`).
/// Keys that already contain dots are kept as they are.
pub fn flatten(record: &Value) -> Map<String, Value> {
    let mut flat = Map::new();
    if let Value::Object(fields) = record {
        flatten_into(&mut flat, None, fields);
    }
    flat
}

fn flatten_into(flat: &mut Map<String, Value>, prefix: Option<&str>, fields: &Map<String, Value>) {
    for (key, value) in fields {
        let full_key = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(nested) if !nested.is_empty() => {
                flatten_into(flat, Some(&full_key), nested)
            }
            _ => {
                flat.insert(full_key, value.clone());
            }
        }
    }
}

pub fn normalize_record(record: &Value) -> Result<Activity, NormalizeError> {
    if !record.is_object() {
        return Err(NormalizeError::NotAnObject);
    }
    let flat = flatten(record);

    let id = field_u64(&flat, "id").ok_or(NormalizeError::MissingField("id"))?;
    let raw_start = field_str(&flat, "start_date_local")
        .or_else(|| field_str(&flat, "start_date"))
        .ok_or(NormalizeError::MissingField("start_date_local"))?;
    let start = parse_local_timestamp(raw_start)
        .ok_or_else(|| NormalizeError::InvalidTimestamp(raw_start.to_string()))?;

    let activity_type = field_str(&flat, "type")
        .ok_or(NormalizeError::MissingField("type"))?
        .to_string();
    let subtype = field_str(&flat, "sport_type")
        .map(str::to_string)
        .unwrap_or_else(|| activity_type.clone());

    let polyline = POLYLINE_KEYS
        .iter()
        .find_map(|key| field_str(&flat, key))
        .filter(|encoded| !encoded.is_empty())
        .map(str::to_string);

    Ok(Activity {
        id,
        name: field_str(&flat, "name").unwrap_or_default().to_string(),
        provider: Provider::Strava,
        activity_type,
        subtype,
        start,
        distance_km: field_f64(&flat, "distance").unwrap_or(0.0) / 1000.0,
        elevation_gain_m: field_f64(&flat, "total_elevation_gain").unwrap_or(0.0),
        moving_time_s: field_f64(&flat, "moving_time").unwrap_or(0.0).max(0.0) as u64,
        avg_speed_kmh: field_f64(&flat, "average_speed").unwrap_or(0.0) * 3.6,
        max_speed_kmh: field_f64(&flat, "max_speed").unwrap_or(0.0) * 3.6,
        avg_watts: field_f64(&flat, "average_watts").unwrap_or(0.0),
        max_watts: field_f64(&flat, "max_watts").unwrap_or(0.0),
        gear_id: field_str(&flat, "gear_id")
            .filter(|gear| !gear.is_empty())
            .map(str::to_string),
        polyline,
    })
}

/// Every well-formed record, route or not, in input order.
pub fn normalize_all(records: &[Value]) -> Vec<Activity> {
    records
        .iter()
        .filter_map(|record| match normalize_record(record) {
            Ok(activity) => Some(activity),
            Err(err) => {
                tracing::warn!("Dropping activity record: {}", err);
                None
            }
        })
        .collect()
}

/// Well-formed records that carry route geometry, in input order.
pub fn normalize(records: &[Value]) -> Vec<Activity> {
    normalize_all(records)
        .into_iter()
        .filter(|activity| {
            let keep = activity.has_geometry();
            if !keep {
                tracing::info!("{}: dropping, no route geometry", activity.describe());
            }
            keep
        })
        .collect()
}

/// Union keyed by provider and id. A fresh record replaces the cached one with the
/// same key. Fresh records come first in fetch order, then cached-only records in cached order.
pub fn merge(cached: Vec<Activity>, fresh: Vec<Activity>) -> Vec<Activity> {
    let mut seen = HashSet::with_capacity(cached.len() + fresh.len());
    let mut merged = Vec::with_capacity(cached.len() + fresh.len());

    for activity in fresh.into_iter().chain(cached) {
        if seen.insert((activity.provider, activity.id)) {
            merged.push(activity);
        }
    }

    merged
}

pub fn parse_local_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.naive_local());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}

fn field_str<'a>(flat: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    flat.get(key).and_then(Value::as_str)
}

fn field_f64(flat: &Map<String, Value>, key: &str) -> Option<f64> {
    let value = match flat.get(key)? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.parse().ok(),
        _ => None,
    };
    value.filter(|value: &f64| value.is_finite())
}

fn field_u64(flat: &Map<String, Value>, key: &str) -> Option<u64> {
    match flat.get(key)? {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.parse().ok(),
        _ => None,
    }
}
