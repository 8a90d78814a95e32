mod common;

use chrono::NaiveDate;
use common::activity;
use routemap_rs::pipeline::filter::ActivityFilter;

fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("date")
}

fn ids(filter: &ActivityFilter, activities: Vec<routemap_rs::types::activity::Activity>) -> Vec<u64> {
    filter.apply(activities).iter().map(|a| a.id).collect()
}

#[test]
fn unrestricted_filter_returns_input_unchanged() {
    let activities = vec![
        activity(3, "Ride", "2024-03-01 09:00:00"),
        activity(1, "Run", "2020-01-01 09:00:00"),
        activity(2, "GravelRide", "2030-12-31 23:00:00"),
    ];

    let filter = ActivityFilter::default();
    assert!(filter.is_unrestricted());
    assert_eq!(filter.apply(activities.clone()), activities);
}

#[test]
fn until_includes_the_whole_day() {
    let filter = ActivityFilter {
        until: Some(date("2024-06-30")),
        ..ActivityFilter::default()
    };

    let kept = ids(
        &filter,
        vec![
            activity(1, "Ride", "2024-06-30 23:59:59"),
            activity(2, "Ride", "2024-07-01 00:00:00"),
            activity(3, "Ride", "2024-06-30 00:00:00"),
        ],
    );
    assert_eq!(kept, vec![1, 3]);
}

#[test]
fn since_starts_at_midnight() {
    let filter = ActivityFilter {
        since: Some(date("2024-06-01")),
        ..ActivityFilter::default()
    };

    let kept = ids(
        &filter,
        vec![
            activity(1, "Ride", "2024-05-31 23:59:59"),
            activity(2, "Ride", "2024-06-01 00:00:00"),
        ],
    );
    assert_eq!(kept, vec![2]);
}

#[test]
fn type_and_date_predicates_are_conjunctive() {
    let filter = ActivityFilter {
        since: Some(date("2024-01-01")),
        until: Some(date("2024-12-31")),
        types: vec!["GravelRide".to_string(), "MountainBikeRide".to_string()],
    };

    let kept = ids(
        &filter,
        vec![
            activity(1, "GravelRide", "2024-04-01 10:00:00"),
            activity(2, "Ride", "2024-04-02 10:00:00"),
            activity(3, "MountainBikeRide", "2023-04-02 10:00:00"),
            activity(4, "MountainBikeRide", "2024-08-02 10:00:00"),
        ],
    );
    assert_eq!(kept, vec![1, 4]);
}

#[test]
fn empty_type_list_means_no_type_restriction() {
    let filter = ActivityFilter {
        since: Some(date("2024-01-01")),
        types: Vec::new(),
        ..ActivityFilter::default()
    };

    let kept = ids(
        &filter,
        vec![
            activity(1, "Run", "2024-02-01 10:00:00"),
            activity(2, "Swim", "2024-02-02 10:00:00"),
        ],
    );
    assert_eq!(kept, vec![1, 2]);
}
