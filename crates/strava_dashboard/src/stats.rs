//! Totals, per-type counts and weekly mileage for the dashboard view.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use strava_client::Activity;

/// Divisor used for every metres → miles conversion shown to the user.
pub const METERS_PER_MILE: f64 = 1609.0;
/// Rows in the recent activities table.
pub const RECENT_LIMIT: usize = 20;

pub fn meters_to_miles(meters: f64) -> f64 {
    meters / METERS_PER_MILE
}

/// The `YYYY-MM-DD` prefix of `start_date_local`, parsed.
pub fn local_date(activity: &Activity) -> Option<NaiveDate> {
    let raw = activity.start_date_local.as_deref()?;
    crate::calendar::date_key(raw)
}

/// `YYYY-Www` using the ISO week-numbering year.
pub fn iso_week_label(date: NaiveDate) -> String {
    let week = date.iso_week();
    format!("{}-W{:02}", week.year(), week.week())
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct WeeklyMileage {
    pub label: String,
    pub miles: f64,
}

/// Sum miles per ISO week for activities of `kind`, oldest week first.
pub fn weekly_mileage(activities: &[Activity], kind: &str) -> Vec<WeeklyMileage> {
    let mut weeks: BTreeMap<String, f64> = BTreeMap::new();
    for a in activities.iter().filter(|a| a.kind == kind) {
        let Some(date) = local_date(a) else {
            continue;
        };
        *weeks.entry(iso_week_label(date)).or_default() += meters_to_miles(a.distance);
    }
    weeks
        .into_iter()
        .map(|(label, miles)| WeeklyMileage { label, miles })
        .collect()
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct RecentActivityRow {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub miles: f64,
    pub date: Option<String>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct DashboardSummary {
    pub total_miles: f64,
    pub run_count: usize,
    pub ride_count: usize,
    pub swim_count: usize,
    pub weekly_running: Vec<WeeklyMileage>,
    pub recent: Vec<RecentActivityRow>,
}

pub fn summarize(activities: &[Activity]) -> DashboardSummary {
    let count = |kind: &str| activities.iter().filter(|a| a.kind == kind).count();
    let total_meters: f64 = activities.iter().map(|a| a.distance).sum();

    let recent = activities
        .iter()
        .take(RECENT_LIMIT)
        .map(|a| RecentActivityRow {
            id: a.id,
            name: a.name.clone(),
            kind: a.kind.clone(),
            miles: meters_to_miles(a.distance),
            date: a
                .start_date_local
                .as_deref()
                .map(|d| d.chars().take(10).collect()),
        })
        .collect();

    DashboardSummary {
        total_miles: meters_to_miles(total_meters),
        run_count: count("Run"),
        ride_count: count("Ride"),
        swim_count: count("Swim"),
        weekly_running: weekly_mileage(activities, "Run"),
        recent,
    }
}
