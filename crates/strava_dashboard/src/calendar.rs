//! Calendar view: activities bucketed by their local start date.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use strava_client::Activity;

use crate::map::route_color;
use crate::stats::meters_to_miles;

/// Parse the `YYYY-MM-DD` prefix of a local timestamp.
pub fn date_key(start_date_local: &str) -> Option<NaiveDate> {
    let prefix = start_date_local.get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CalendarEntry {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub miles: f64,
    pub color: &'static str,
}

impl From<&Activity> for CalendarEntry {
    fn from(a: &Activity) -> Self {
        Self {
            id: a.id,
            name: a.name.clone(),
            kind: a.kind.clone(),
            miles: meters_to_miles(a.distance),
            color: route_color(&a.kind),
        }
    }
}

pub type DateBuckets = BTreeMap<NaiveDate, Vec<CalendarEntry>>;

/// Group by local date. Within a day, entries keep the API's order.
pub fn bucket_by_date(activities: &[Activity]) -> DateBuckets {
    let mut buckets = DateBuckets::new();
    for a in activities {
        let Some(date) = a.start_date_local.as_deref().and_then(date_key) else {
            tracing::warn!(id = a.id, "activity has no usable start_date_local");
            continue;
        };
        buckets.entry(date).or_default().push(CalendarEntry::from(a));
    }
    buckets
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub day: u32,
    pub entries: Vec<CalendarEntry>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    pub label: String,
    /// Monday-first rows; `None` pads days outside the month.
    pub weeks: Vec<[Option<CalendarDay>; 7]>,
    pub previous: String,
    pub next: String,
}

/// Lay out one month as a Monday-first grid. Returns `None` for an invalid month.
pub fn month_view(year: i32, month: u32, buckets: &DateBuckets) -> Option<MonthView> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let next_first = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    let previous_first = first.pred_opt()?.with_day(1)?;

    let mut weeks = Vec::new();
    let mut row: [Option<CalendarDay>; 7] = Default::default();
    let mut col = first.weekday().num_days_from_monday() as usize;
    let mut date = first;
    while date < next_first {
        row[col] = Some(CalendarDay {
            date,
            day: date.day(),
            entries: buckets.get(&date).cloned().unwrap_or_default(),
        });
        col += 1;
        if col == 7 {
            weeks.push(std::mem::take(&mut row));
            col = 0;
        }
        date = date.succ_opt()?;
    }
    if col != 0 {
        weeks.push(row);
    }

    Some(MonthView {
        year,
        month,
        label: first.format("%B %Y").to_string(),
        weeks,
        previous: previous_first.format("%Y-%m").to_string(),
        next: next_first.format("%Y-%m").to_string(),
    })
}

/// Month of the newest bucketed activity, else the month containing `today`.
pub fn default_month(buckets: &DateBuckets, today: NaiveDate) -> (i32, u32) {
    let anchor = buckets.keys().next_back().copied().unwrap_or(today);
    (anchor.year(), anchor.month())
}

/// Parse a `YYYY-MM` query value.
pub fn parse_month(raw: &str) -> Option<(i32, u32)> {
    let date = NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d").ok()?;
    Some((date.year(), date.month()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn activity(id: u64, kind: &str, local: Option<&str>) -> Activity {
        serde_json::from_value(json!({
            "id": id,
            "name": "x",
            "type": kind,
            "distance": 1609.0,
            "start_date_local": local,
        }))
        .expect("activity")
    }

    #[test]
    fn date_key_takes_local_prefix() {
        assert_eq!(
            date_key("2025-03-04T23:30:00Z"),
            NaiveDate::from_ymd_opt(2025, 3, 4)
        );
        assert_eq!(date_key("2025-03-04"), NaiveDate::from_ymd_opt(2025, 3, 4));
        assert_eq!(date_key("2025-03"), None);
        assert_eq!(date_key("not a date at all"), None);
    }

    #[test]
    fn buckets_by_local_date_prefix() {
        let acts = vec![
            activity(1, "Run", Some("2025-03-04T06:00:00Z")),
            activity(2, "Ride", Some("2025-03-04T23:59:00Z")),
            activity(3, "Walk", Some("2025-03-05T00:01:00Z")),
            activity(4, "Run", None),
        ];
        let buckets = bucket_by_date(&acts);
        assert_eq!(buckets.len(), 2);
        let day = &buckets[&NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()];
        assert_eq!(day.iter().map(|e| e.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(day[1].color, "red");
    }

    #[test]
    fn month_view_is_monday_first() {
        // March 2025 starts on a Saturday.
        let view = month_view(2025, 3, &DateBuckets::new()).unwrap();
        assert_eq!(view.label, "March 2025");
        assert!(view.weeks[0][..5].iter().all(Option::is_none));
        assert_eq!(view.weeks[0][5].as_ref().map(|d| d.day), Some(1));
        let days: usize = view
            .weeks
            .iter()
            .map(|w| w.iter().filter(|d| d.is_some()).count())
            .sum();
        assert_eq!(days, 31);
        assert_eq!(view.previous, "2025-02");
        assert_eq!(view.next, "2025-04");
    }

    #[test]
    fn month_view_places_entries_on_their_day() {
        let buckets = bucket_by_date(&[activity(9, "Run", Some("2024-12-31T10:00:00Z"))]);
        let view = month_view(2024, 12, &buckets).unwrap();
        let day = view
            .weeks
            .iter()
            .flatten()
            .flatten()
            .find(|d| d.day == 31)
            .unwrap();
        assert_eq!(day.entries[0].id, 9);
        assert_eq!(view.next, "2025-01");
    }

    #[test]
    fn invalid_month_has_no_view() {
        assert!(month_view(2025, 13, &DateBuckets::new()).is_none());
    }

    #[test]
    fn default_month_follows_newest_activity() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        assert_eq!(default_month(&DateBuckets::new(), today), (2026, 1));
        let buckets = bucket_by_date(&[
            activity(1, "Run", Some("2025-03-04T06:00:00Z")),
            activity(2, "Run", Some("2025-05-01T06:00:00Z")),
        ]);
        assert_eq!(default_month(&buckets, today), (2025, 5));
    }

    #[test]
    fn parse_month_accepts_year_month() {
        assert_eq!(parse_month("2025-03"), Some((2025, 3)));
        assert_eq!(parse_month("2025-13"), None);
        assert_eq!(parse_month("march"), None);
    }
}
