use std::path::Path;
use std::time::Duration;

use crate::cache::ActivityCache;
use crate::config::Config;
use crate::error::AppError;
use crate::pipeline::aggregate::GearLedger;
use crate::pipeline::elevation::{ElevationResolver, RetryPolicy};
use crate::pipeline::enrich::RouteEnricher;
use crate::pipeline::filter::ActivityFilter;
use crate::pipeline::{normalize, parse, report};
use crate::sources::open_elevation::OpenElevationClient;
use crate::sources::strava::StravaClient;
use crate::sources::{fetch_all, ElevationSource, GearLookup, PageFetcher};
use crate::state::GearNames;
use crate::types::activity::{Activity, EnrichedActivity};
use crate::types::category::CategoryTable;
use crate::types::gear::Gear;

#[derive(Debug)]
pub struct RunOutput {
    pub enriched: Vec<EnrichedActivity>,
    pub ledger: GearLedger,
    pub gears: Vec<Gear>,
    pub report: String,
}

pub struct Pipeline<'a> {
    pub elevation: &'a dyn ElevationSource,
    pub gear_lookup: &'a dyn GearLookup,
    pub categories: &'a CategoryTable,
    pub retry: RetryPolicy,
    pub request_spacing: Duration,
    pub gear_names: GearNames,
}

impl Pipeline<'_> {
    /// Filters, enriches in order, then resolves gear names and renders the report.
    pub async fn run(&self, activities: Vec<Activity>, filter: &ActivityFilter) -> RunOutput {
        let filtered = filter.apply(activities);

        let resolver = ElevationResolver::new(self.elevation, self.retry);
        let mut enricher = RouteEnricher::new(resolver, self.categories, self.request_spacing);
        let enriched = enricher.enrich_all(filtered).await;
        let ledger = enricher.into_ledger();

        let gears = self.gear_names.resolve_all(&ledger, self.gear_lookup).await;
        let report = report::render(&ledger, &gears);

        RunOutput {
            enriched,
            ledger,
            gears,
            report,
        }
    }
}

/// Cached activities unless a refresh is forced or nothing is cached; otherwise
/// fetches every page, merges it over the cache and stores the result.
pub async fn load_activities(
    config: &Config,
    fetcher: &dyn PageFetcher,
    cache: &ActivityCache,
) -> Result<Vec<Activity>, AppError> {
    let cached = cache.load().await?;
    if let (Some(cached), false) = (&cached, config.refresh) {
        return Ok(cached.clone());
    }

    tracing::info!("Downloading activities from Strava");
    let records = fetch_all(fetcher, config.per_page).await?;
    let fresh = normalize::normalize_all(&records);
    let merged = normalize::merge(cached.unwrap_or_default(), fresh);
    cache.store(&merged).await?;
    Ok(merged)
}

pub async fn run(config: &Config) -> Result<RunOutput, AppError> {
    let strava = StravaClient::new(
        config.strava_api_base.clone(),
        config.credentials.clone(),
        config.strava_timeout,
    );
    let elevation = OpenElevationClient::new(config.elevation_url.clone(), config.elevation_timeout);
    let cache = ActivityCache::new(config.cache_path.clone());

    let mut activities = load_activities(config, &strava, &cache).await?;
    if let Some(dir) = config.export_dir.as_deref() {
        let exported = parse::load_dir(dir).await?;
        activities = normalize::merge(exported, activities);
    }

    let categories = CategoryTable::default().with_processing_disabled(&config.skip_types);
    let known = categories.subtypes();
    for requested in &config.filter.types {
        if !known.iter().any(|subtype| subtype == requested) {
            tracing::warn!("Filter type {} is not in the category table", requested);
        }
    }

    let pipeline = Pipeline {
        elevation: &elevation,
        gear_lookup: &strava,
        categories: &categories,
        retry: config.retry,
        request_spacing: config.request_spacing,
        gear_names: GearNames::new(),
    };
    let output = pipeline.run(activities, &config.filter).await;

    let routes = serde_json::to_vec_pretty(&output.enriched).map_err(|err| AppError::Output {
        path: config.output_path.display().to_string(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, err),
    })?;
    write_output(&config.output_path, &routes).await?;
    write_output(&config.report_path, output.report.as_bytes()).await?;

    tracing::info!(
        "Wrote {} routes to {} and gear report to {}",
        output.enriched.len(),
        config.output_path.display(),
        config.report_path.display()
    );
    Ok(output)
}

async fn write_output(path: &Path, bytes: &[u8]) -> Result<(), AppError> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|source| AppError::Output {
            path: path.display().to_string(),
            source,
        })
}
