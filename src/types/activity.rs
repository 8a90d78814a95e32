use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::category::CategoryStyle;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackPoint {
    pub lat: f64,
    pub lon: f64,
    pub elevation: Option<f64>,
    pub time: Option<DateTime<Utc>>,
    pub power: Option<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileFormat {
    Gpx,
    Fit,
}

impl FileFormat {
    pub fn from_filename(filename: &str) -> Option<Self> {
        let ext = filename.rsplit('.').next()?.to_lowercase();
        match ext.as_str() {
            "gpx" => Some(FileFormat::Gpx),
            "fit" => Some(FileFormat::Fit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParsedActivity {
    pub points: Vec<TrackPoint>,
    pub file_format: FileFormat,
    pub name: Option<String>,
    pub sport: Option<String>,
    pub sub_sport: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    Strava,
    Garmin,
}

/// One recorded session, already converted to display units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: u64,
    pub name: String,
    pub provider: Provider,
    pub activity_type: String,
    pub subtype: String,
    /// Local wall-clock start, no timezone attached.
    pub start: NaiveDateTime,
    pub distance_km: f64,
    pub elevation_gain_m: f64,
    pub moving_time_s: u64,
    pub avg_speed_kmh: f64,
    pub max_speed_kmh: f64,
    pub avg_watts: f64,
    pub max_watts: f64,
    pub gear_id: Option<String>,
    pub polyline: Option<String>,
}

impl Activity {
    pub fn year(&self) -> i32 {
        self.start.year()
    }

    pub fn month(&self) -> u32 {
        self.start.month()
    }

    pub fn has_geometry(&self) -> bool {
        self.polyline.as_deref().is_some_and(|p| !p.is_empty())
    }

    pub fn moving_time_pretty(&self) -> String {
        let hours = self.moving_time_s / 3600;
        let minutes = (self.moving_time_s % 3600) / 60;
        let seconds = self.moving_time_s % 60;
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    }

    pub fn link(&self) -> Option<String> {
        match self.provider {
            Provider::Strava => Some(format!("https://www.strava.com/activities/{}", self.id)),
            Provider::Garmin => None,
        }
    }

    pub fn describe(&self) -> String {
        format!("{} {} {}", self.id, self.name, self.activity_type)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Ordered, non-empty list of coordinates in travel order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Route(Vec<Coordinate>);

impl Route {
    pub fn new(points: Vec<Coordinate>) -> Option<Self> {
        if points.is_empty() {
            None
        } else {
            Some(Self(points))
        }
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Marker anchor: the element at `len / 2`, not the geometric centre.
    pub fn halfway(&self) -> Coordinate {
        self.0[self.0.len() / 2]
    }
}

/// Smoothed elevation samples aligned with the route; empty when the lookup failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ElevationProfile {
    pub samples: Vec<Option<f64>>,
}

impl ElevationProfile {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrichedActivity {
    pub activity: Activity,
    pub route: Route,
    pub elevation: ElevationProfile,
    pub marker: Coordinate,
    pub style: CategoryStyle,
    pub link: Option<String>,
    pub moving_time: String,
}
