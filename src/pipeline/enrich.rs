use std::fmt;
use std::time::Duration;

use crate::pipeline::aggregate::GearLedger;
use crate::pipeline::elevation::ElevationResolver;
use crate::pipeline::polyline;
use crate::types::activity::{Activity, EnrichedActivity, Route};
use crate::types::category::CategoryTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptyRoute,
    UnknownType,
    ExcludedType,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::EmptyRoute => write!(f, "route is empty"),
            SkipReason::UnknownType => write!(f, "type is not in the category table"),
            SkipReason::ExcludedType => write!(f, "type is configured not to be processed"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Enrichment {
    Done(Box<EnrichedActivity>),
    Skipped { id: u64, reason: SkipReason },
}

pub struct RouteEnricher<'a> {
    elevation: ElevationResolver<'a>,
    categories: &'a CategoryTable,
    request_spacing: Duration,
    ledger: GearLedger,
}

impl<'a> RouteEnricher<'a> {
    pub fn new(
        elevation: ElevationResolver<'a>,
        categories: &'a CategoryTable,
        request_spacing: Duration,
    ) -> Self {
        Self {
            elevation,
            categories,
            request_spacing,
            ledger: GearLedger::new(),
        }
    }

    /// Aggregate, decode, check the type, then resolve elevation. Gear totals are
    /// recorded before any skip, so they count activities that are never drawn.
    pub async fn enrich(&mut self, activity: Activity) -> Enrichment {
        self.ledger.accumulate(&activity);

        let decoded = activity
            .polyline
            .as_deref()
            .map(polyline::decode)
            .unwrap_or_default();
        let Some(route) = Route::new(decoded) else {
            return skip(&activity, SkipReason::EmptyRoute);
        };

        let Some(category) = self.categories.get(&activity.activity_type) else {
            return skip(&activity, SkipReason::UnknownType);
        };
        if !category.process {
            return skip(&activity, SkipReason::ExcludedType);
        }
        let style = category.style_for(&activity.subtype);

        let elevation = self.elevation.resolve(&route).await;
        if elevation.is_empty() {
            tracing::debug!("{}: no elevation profile", activity.describe());
        }
        tokio::time::sleep(self.request_spacing).await;

        Enrichment::Done(Box::new(EnrichedActivity {
            marker: route.halfway(),
            link: activity.link(),
            moving_time: activity.moving_time_pretty(),
            activity,
            route,
            elevation,
            style,
        }))
    }

    /// Enriches in input order, one activity at a time.
    pub async fn enrich_all(&mut self, activities: Vec<Activity>) -> Vec<EnrichedActivity> {
        let total = activities.len();
        let mut enriched = Vec::with_capacity(total);

        for (idx, activity) in activities.into_iter().enumerate() {
            tracing::debug!("Enriching {}/{}: {}", idx + 1, total, activity.describe());
            if let Enrichment::Done(record) = self.enrich(activity).await {
                enriched.push(*record);
            }
        }

        tracing::info!("Enriched {} of {} activities", enriched.len(), total);
        enriched
    }

    pub fn ledger(&self) -> &GearLedger {
        &self.ledger
    }

    pub fn into_ledger(self) -> GearLedger {
        self.ledger
    }
}

fn skip(activity: &Activity, reason: SkipReason) -> Enrichment {
    tracing::info!("{}: skipping, {}", activity.describe(), reason);
    Enrichment::Skipped {
        id: activity.id,
        reason,
    }
}
