pub mod open_elevation;
pub mod strava;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{ElevationError, SourceError};
use crate::types::activity::Coordinate;

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// One page of raw activity records. An empty page means there is no more data.
    async fn fetch_page(&self, page: u32, per_page: u32) -> Result<Vec<Value>, SourceError>;
}

#[async_trait]
pub trait ElevationSource: Send + Sync {
    /// Elevation in meters, positionally aligned with `points`.
    async fn lookup(&self, points: &[Coordinate]) -> Result<Vec<f64>, ElevationError>;
}

#[async_trait]
pub trait GearLookup: Send + Sync {
    async fn nickname(&self, gear_id: &str) -> Result<String, SourceError>;
}

pub async fn fetch_all(fetcher: &dyn PageFetcher, per_page: u32) -> Result<Vec<Value>, SourceError> {
    let mut records = Vec::new();
    let mut page = 1;

    loop {
        let page_data = fetcher.fetch_page(page, per_page).await?;
        if page_data.is_empty() {
            break;
        }
        tracing::debug!("Fetched page {} with {} records", page, page_data.len());
        records.extend(page_data);
        page += 1;
    }

    tracing::info!("Number of activities downloaded: {}", records.len());
    Ok(records)
}

fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|err| {
            tracing::warn!("Failed to build HTTP client with timeout, using defaults: {}", err);
            reqwest::Client::new()
        })
}
