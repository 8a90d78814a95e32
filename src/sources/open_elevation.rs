use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ElevationError;
use crate::sources::ElevationSource;
use crate::types::activity::Coordinate;

pub const DEFAULT_LOOKUP_URL: &str = "https://api.open-elevation.com/api/v1/lookup";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct LookupRequest {
    locations: Vec<Location>,
}

#[derive(Serialize)]
struct Location {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct LookupResponse {
    results: Option<Vec<LookupResult>>,
}

#[derive(Deserialize)]
struct LookupResult {
    elevation: f64,
}

#[derive(Clone)]
pub struct OpenElevationClient {
    client: reqwest::Client,
    lookup_url: String,
}

impl OpenElevationClient {
    /// A lookup that outlives `timeout` fails as a transport error.
    pub fn new(lookup_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: super::http_client(timeout),
            lookup_url: lookup_url.into(),
        }
    }
}

#[async_trait]
impl ElevationSource for OpenElevationClient {
    async fn lookup(&self, points: &[Coordinate]) -> Result<Vec<f64>, ElevationError> {
        let request = LookupRequest {
            locations: points
                .iter()
                .map(|p| Location {
                    latitude: p.lat,
                    longitude: p.lon,
                })
                .collect(),
        };

        let response = self
            .client
            .post(&self.lookup_url)
            .header("Accept", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|err| ElevationError::Transport(err.to_string()))?;

        if !response.status().is_success() {
            return Err(ElevationError::Status(response.status().as_u16()));
        }

        let payload: LookupResponse = response
            .json()
            .await
            .map_err(|err| ElevationError::Malformed(err.to_string()))?;

        let results = payload
            .results
            .ok_or_else(|| ElevationError::Malformed("response has no results".to_string()))?;

        Ok(results.into_iter().map(|r| r.elevation).collect())
    }
}
