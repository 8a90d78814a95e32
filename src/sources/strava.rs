use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::Credentials;
use crate::error::SourceError;
use crate::sources::{GearLookup, PageFetcher};

pub const DEFAULT_API_BASE: &str = "https://www.strava.com/api/v3";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct StravaClient {
    client: reqwest::Client,
    api_base: String,
    credentials: Credentials,
}

impl StravaClient {
    pub fn new(api_base: impl Into<String>, credentials: Credentials, timeout: Duration) -> Self {
        Self {
            client: super::http_client(timeout),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            credentials,
        }
    }

    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, SourceError> {
        let access_token = self
            .credentials
            .access_token()
            .ok_or(SourceError::MissingToken)?;

        let response = self
            .client
            .get(url)
            .query(query)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|err| SourceError::Request(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status { status, body });
        }

        response
            .json()
            .await
            .map_err(|err| SourceError::InvalidResponse(err.to_string()))
    }
}

#[async_trait]
impl PageFetcher for StravaClient {
    async fn fetch_page(&self, page: u32, per_page: u32) -> Result<Vec<Value>, SourceError> {
        let url = format!("{}/athlete/activities", self.api_base);
        let payload = self
            .get_json(
                &url,
                &[("per_page", per_page.to_string()), ("page", page.to_string())],
            )
            .await?;

        match payload {
            Value::Array(records) => Ok(records),
            other => Err(SourceError::InvalidResponse(format!(
                "expected an array of activities, got {}",
                other
            ))),
        }
    }
}

#[async_trait]
impl GearLookup for StravaClient {
    async fn nickname(&self, gear_id: &str) -> Result<String, SourceError> {
        let url = format!("{}/gear/{}", self.api_base, gear_id);
        let payload = self.get_json(&url, &[]).await?;

        payload
            .get("nickname")
            .and_then(Value::as_str)
            .filter(|nickname| !nickname.is_empty())
            .or_else(|| payload.get("name").and_then(Value::as_str))
            .map(str::to_string)
            .ok_or_else(|| {
                SourceError::InvalidResponse(format!("gear {} has no nickname", gear_id))
            })
    }
}
