use std::time::Duration;

use crate::error::ElevationError;
use crate::sources::ElevationSource;
use crate::types::activity::{Coordinate, ElevationProfile, Route};

const SMOOTH_WINDOW: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            delay: Duration::from_secs(5),
        }
    }
}

pub struct ElevationResolver<'a> {
    source: &'a dyn ElevationSource,
    policy: RetryPolicy,
}

impl<'a> ElevationResolver<'a> {
    pub fn new(source: &'a dyn ElevationSource, policy: RetryPolicy) -> Self {
        Self { source, policy }
    }

    pub async fn resolve(&self, route: &Route) -> ElevationProfile {
        match self.lookup_with_retry(route.points()).await {
            Some(raw) => ElevationProfile {
                samples: smooth(&raw),
            },
            None => ElevationProfile::empty(),
        }
    }

    /// Runs the bulk lookup under the retry policy. `None` once the policy gives up.
    pub async fn lookup_with_retry(&self, points: &[Coordinate]) -> Option<Vec<f64>> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let err = match self.source.lookup(points).await {
                Ok(elevations) if elevations.len() == points.len() => return Some(elevations),
                Ok(elevations) => ElevationError::LengthMismatch {
                    expected: points.len(),
                    got: elevations.len(),
                },
                Err(err) => err,
            };

            if !err.is_retryable() {
                tracing::warn!("Elevation lookup failed permanently: {}", err);
                return None;
            }
            if attempt >= max_attempts {
                tracing::warn!(
                    "Elevation lookup gave up after {} attempts: {}",
                    attempt,
                    err
                );
                return None;
            }

            tracing::info!(
                "Elevation lookup failed ({}), retry {}/{} in {:?}",
                err,
                attempt,
                max_attempts - 1,
                self.policy.delay
            );
            tokio::time::sleep(self.policy.delay).await;
        }
    }
}

/// Trailing moving average over the raw samples. The first `SMOOTH_WINDOW - 1`
/// outputs have no full window and are `None`, keeping the output aligned with the input.
pub fn smooth(raw: &[f64]) -> Vec<Option<f64>> {
    trailing_mean(raw, SMOOTH_WINDOW)
}

pub fn trailing_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|idx| {
            if idx + 1 < window {
                return None;
            }
            let slice = &values[idx + 1 - window..=idx];
            Some(slice.iter().sum::<f64>() / window as f64)
        })
        .collect()
}
