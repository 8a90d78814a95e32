mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use common::{FakeGear, ScriptedElevation};
use routemap_rs::error::ElevationError;
use routemap_rs::pipeline::elevation::{ElevationResolver, RetryPolicy};
use routemap_rs::pipeline::enrich::{Enrichment, RouteEnricher, SkipReason};
use routemap_rs::pipeline::filter::ActivityFilter;
use routemap_rs::pipeline::normalize::normalize_all;
use routemap_rs::runner::Pipeline;
use routemap_rs::state::GearNames;
use routemap_rs::types::activity::Coordinate;
use routemap_rs::types::category::CategoryTable;
use routemap_rs::types::gear::Totals;
use serde_json::json;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

fn spacing() -> Duration {
    Duration::from_millis(200)
}

#[tokio::test(start_paused = true)]
async fn gear_totals_include_activities_without_a_route() {
    let records = vec![
        json!({
            "id": 101,
            "name": "Lunch Ride",
            "type": "Ride",
            "sport_type": "Ride",
            "start_date_local": "2024-04-10T12:00:00Z",
            "distance": 30000.0,
            "total_elevation_gain": 250.0,
            "gear_id": "bike-1",
            "map": { "summary_polyline": common::THREE_POINT_POLYLINE }
        }),
        json!({
            "id": 102,
            "name": "Trainer",
            "type": "Ride",
            "sport_type": "Ride",
            "start_date_local": "2024-04-11T18:00:00Z",
            "distance": 20000.0,
            "total_elevation_gain": 0.0,
            "gear_id": "bike-1",
            "map": { "summary_polyline": null }
        }),
    ];

    let source = ScriptedElevation::healthy();
    let categories = CategoryTable::default();
    let resolver = ElevationResolver::new(&source, RetryPolicy::default());
    let mut enricher = RouteEnricher::new(resolver, &categories, spacing());

    let enriched = enricher.enrich_all(normalize_all(&records)).await;
    let ledger = enricher.into_ledger();

    assert_eq!(enriched.len(), 1);
    let ride = &enriched[0];
    assert_eq!(ride.activity.id, 101);
    assert_eq!(ride.route.len(), 3);
    assert_eq!(ride.elevation.samples.len(), 3);
    assert_eq!(ride.style.color, "red");
    assert_eq!(ride.style.dash, 0);
    assert_eq!(ride.link.as_deref(), Some("https://www.strava.com/activities/101"));

    assert_eq!(ledger.get("bike-1", 2024, 4), Some(Totals::new(50.0, 250.0)));
}

#[tokio::test(start_paused = true)]
async fn marker_is_the_halfway_element() {
    let source = ScriptedElevation::healthy();
    let categories = CategoryTable::default();
    let resolver = ElevationResolver::new(&source, RetryPolicy::default());
    let mut enricher = RouteEnricher::new(resolver, &categories, spacing());

    let outcome = enricher
        .enrich(common::activity(1, "GravelRide", "2024-04-10 12:00:00"))
        .await;

    let Enrichment::Done(record) = outcome else {
        panic!("expected an enriched record");
    };
    let expected = Coordinate::new(40.7, -120.95);
    assert!((record.marker.lat - expected.lat).abs() < 1e-5);
    assert!((record.marker.lon - expected.lon).abs() < 1e-5);
    assert_eq!(record.style.dash, 10);
    assert_eq!(record.moving_time, "00:30:00");
}

#[tokio::test(start_paused = true)]
async fn skipped_activities_report_their_reason() {
    let source = ScriptedElevation::healthy();
    let categories = CategoryTable::default().with_processing_disabled(["Swim"]);
    let resolver = ElevationResolver::new(&source, RetryPolicy::default());
    let mut enricher = RouteEnricher::new(resolver, &categories, spacing());

    let mut unknown = common::activity(1, "Kitesurf", "2024-04-10 12:00:00");
    unknown.activity_type = "Kitesurf".to_string();
    let mut swim = common::activity(2, "Swim", "2024-04-10 12:00:00");
    swim.activity_type = "Swim".to_string();
    swim.gear_id = Some("goggles".to_string());
    let mut broken = common::activity(3, "Ride", "2024-04-10 12:00:00");
    broken.polyline = Some("!!!!".to_string());

    let mut reasons = Vec::new();
    for activity in [unknown, swim, broken] {
        match enricher.enrich(activity).await {
            Enrichment::Skipped { id, reason } => reasons.push((id, reason)),
            Enrichment::Done(record) => panic!("{} should be skipped", record.activity.id),
        }
    }

    assert_eq!(
        reasons,
        vec![
            (1, SkipReason::UnknownType),
            (2, SkipReason::ExcludedType),
            (3, SkipReason::EmptyRoute),
        ]
    );
    assert_eq!(source.calls(), 0);
    // excluded types still count towards gear totals
    assert_eq!(
        enricher.ledger().get("goggles", 2024, 4),
        Some(Totals::new(10.0, 100.0))
    );
}

#[tokio::test(start_paused = true)]
async fn elevation_failure_keeps_the_activity_with_an_empty_profile() {
    let source = ScriptedElevation::failing(u32::MAX, common::transport_error);
    let categories = CategoryTable::default();
    let resolver = ElevationResolver::new(&source, RetryPolicy::default());
    let mut enricher = RouteEnricher::new(resolver, &categories, spacing());

    let enriched = enricher
        .enrich_all(vec![common::activity(1, "Ride", "2024-04-10 12:00:00")])
        .await;

    assert_eq!(enriched.len(), 1);
    assert!(enriched[0].elevation.is_empty());
    assert_eq!(source.calls(), 10);
}

#[tokio::test(start_paused = true)]
async fn pipeline_filters_enriches_and_reports() {
    let source = ScriptedElevation::healthy();
    let lookup = FakeGear::with(&[("bike-1", "Canyon")]);
    let categories = CategoryTable::default();
    let pipeline = Pipeline {
        elevation: &source,
        gear_lookup: &lookup,
        categories: &categories,
        retry: RetryPolicy::default(),
        request_spacing: spacing(),
        gear_names: GearNames::new(),
    };

    let mut in_range = common::activity(1, "Ride", "2024-04-10 12:00:00");
    in_range.gear_id = Some("bike-1".to_string());
    let mut out_of_range = common::activity(2, "Ride", "2023-04-10 12:00:00");
    out_of_range.gear_id = Some("bike-1".to_string());

    let filter = ActivityFilter {
        since: chrono::NaiveDate::from_ymd_opt(2024, 1, 1),
        ..ActivityFilter::default()
    };
    let output = pipeline.run(vec![in_range, out_of_range], &filter).await;

    assert_eq!(output.enriched.len(), 1);
    assert_eq!(output.ledger.yearly("bike-1"), vec![(2024, Totals::new(10.0, 100.0))]);
    assert_eq!(output.gears.len(), 1);
    assert!(output.report.contains("For Canyon:"));
    assert_eq!(lookup.calls(), vec!["bike-1".to_string()]);
}

struct WarnCounter(Arc<AtomicUsize>);

impl<S: tracing::Subscriber> Layer<S> for WarnCounter {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == tracing::Level::WARN {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[tokio::test]
async fn elevation_failure_is_warned_about_once() {
    let warnings = Arc::new(AtomicUsize::new(0));
    let _guard = tracing_subscriber::registry()
        .with(WarnCounter(warnings.clone()))
        .set_default();

    let source = ScriptedElevation::failing(u32::MAX, || {
        ElevationError::Malformed("no results".to_string())
    });
    let categories = CategoryTable::default();
    let resolver = ElevationResolver::new(&source, RetryPolicy::default());
    let mut enricher = RouteEnricher::new(resolver, &categories, Duration::ZERO);

    let enriched = enricher
        .enrich_all(vec![common::activity(1, "Ride", "2024-04-10 12:00:00")])
        .await;

    assert!(enriched[0].elevation.is_empty());
    assert_eq!(source.calls(), 1);
    assert_eq!(warnings.load(Ordering::SeqCst), 1);
}
