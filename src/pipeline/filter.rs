use chrono::{NaiveDate, NaiveDateTime};

use crate::types::activity::Activity;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityFilter {
    pub since: Option<NaiveDate>,
    /// Inclusive: the whole day up to 23:59:59 is kept.
    pub until: Option<NaiveDate>,
    /// Subtypes to keep. Empty keeps every subtype.
    pub types: Vec<String>,
}

impl ActivityFilter {
    pub fn is_unrestricted(&self) -> bool {
        self.since.is_none() && self.until.is_none() && self.types.is_empty()
    }

    pub fn matches(&self, activity: &Activity) -> bool {
        self.within_range(&activity.start)
            && (self.types.is_empty() || self.types.iter().any(|t| *t == activity.subtype))
    }

    pub fn apply(&self, activities: Vec<Activity>) -> Vec<Activity> {
        if self.is_unrestricted() {
            return activities;
        }

        let before = activities.len();
        let kept: Vec<Activity> = activities.into_iter().filter(|a| self.matches(a)).collect();
        tracing::info!(
            "Filter since={:?} until={:?} types={:?} kept {} of {} activities",
            self.since,
            self.until,
            self.types,
            kept.len(),
            before
        );
        kept
    }

    fn within_range(&self, start: &NaiveDateTime) -> bool {
        let after_since = self
            .since
            .and_then(|since| since.and_hms_opt(0, 0, 0))
            .map_or(true, |lower| *start >= lower);
        let before_until = self
            .until
            .and_then(|until| until.and_hms_opt(23, 59, 59))
            .map_or(true, |upper| *start <= upper);
        after_since && before_until
    }
}
