#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use routemap_rs::error::{ElevationError, SourceError};
use routemap_rs::sources::{ElevationSource, GearLookup};
use routemap_rs::types::activity::{Activity, Coordinate, Provider};

/// Fails `failures` times with `error`, then answers with a flat 100 m per point.
pub struct ScriptedElevation {
    failures: u32,
    error: fn() -> ElevationError,
    calls: AtomicU32,
}

impl ScriptedElevation {
    pub fn failing(failures: u32, error: fn() -> ElevationError) -> Self {
        Self {
            failures,
            error,
            calls: AtomicU32::new(0),
        }
    }

    pub fn healthy() -> Self {
        Self::failing(0, transport_error)
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ElevationSource for ScriptedElevation {
    async fn lookup(&self, points: &[Coordinate]) -> Result<Vec<f64>, ElevationError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.failures {
            return Err((self.error)());
        }
        Ok(points.iter().enumerate().map(|(idx, _)| 100.0 + idx as f64 * 3.0).collect())
    }
}

pub fn transport_error() -> ElevationError {
    ElevationError::Transport("connection reset".to_string())
}

#[derive(Default)]
pub struct FakeGear {
    names: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl FakeGear {
    pub fn with(entries: &[(&str, &str)]) -> Self {
        Self {
            names: entries
                .iter()
                .map(|(id, name)| (id.to_string(), name.to_string()))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl GearLookup for FakeGear {
    async fn nickname(&self, gear_id: &str) -> Result<String, SourceError> {
        self.calls.lock().expect("calls lock").push(gear_id.to_string());
        self.names
            .get(gear_id)
            .cloned()
            .ok_or_else(|| SourceError::Status {
                status: 404,
                body: "Record Not Found".to_string(),
            })
    }
}

// (38.5, -120.2), (40.7, -120.95), (43.252, -126.453)
pub const THREE_POINT_POLYLINE: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

pub fn at(raw: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").expect("timestamp")
}

pub fn activity(id: u64, subtype: &str, start: &str) -> Activity {
    Activity {
        id,
        name: format!("Activity {id}"),
        provider: Provider::Strava,
        activity_type: "Ride".to_string(),
        subtype: subtype.to_string(),
        start: at(start),
        distance_km: 10.0,
        elevation_gain_m: 100.0,
        moving_time_s: 1800,
        avg_speed_kmh: 20.0,
        max_speed_kmh: 40.0,
        avg_watts: 0.0,
        max_watts: 0.0,
        gear_id: None,
        polyline: Some(THREE_POINT_POLYLINE.to_string()),
    }
}
