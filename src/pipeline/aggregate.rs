use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::activity::Activity;
use crate::types::gear::Totals;

pub type MonthTotals = BTreeMap<u32, Totals>;
pub type YearTotals = BTreeMap<i32, MonthTotals>;

/// Distance and elevation per gear, year and month.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GearLedger {
    gears: BTreeMap<String, YearTotals>,
}

impl GearLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the activity under its gear. Not idempotent: each activity must be added once.
    pub fn accumulate(&mut self, activity: &Activity) -> bool {
        let Some(gear_id) = activity.gear_id.as_deref() else {
            return false;
        };

        *self
            .gears
            .entry(gear_id.to_string())
            .or_default()
            .entry(activity.year())
            .or_default()
            .entry(activity.month())
            .or_default() += Totals::new(activity.distance_km, activity.elevation_gain_m);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.gears.is_empty()
    }

    pub fn gear_ids(&self) -> impl Iterator<Item = &str> {
        self.gears.keys().map(String::as_str)
    }

    pub fn get(&self, gear_id: &str, year: i32, month: u32) -> Option<Totals> {
        self.gears.get(gear_id)?.get(&year)?.get(&month).copied()
    }

    pub fn years(&self, gear_id: &str) -> Option<&YearTotals> {
        self.gears.get(gear_id)
    }

    /// Per-year sums across months, ascending by year.
    pub fn yearly(&self, gear_id: &str) -> Vec<(i32, Totals)> {
        self.gears
            .get(gear_id)
            .map(|years| {
                years
                    .iter()
                    .map(|(year, months)| {
                        let mut total = Totals::default();
                        for month_total in months.values() {
                            total += *month_total;
                        }
                        (*year, total)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every (year, month) bucket, ascending.
    pub fn monthly(&self, gear_id: &str) -> Vec<(i32, u32, Totals)> {
        self.gears
            .get(gear_id)
            .map(|years| {
                years
                    .iter()
                    .flat_map(|(year, months)| {
                        months
                            .iter()
                            .map(move |(month, totals)| (*year, *month, *totals))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}
