//! Server-rendered HTML for the landing page and the three views.

use crate::calendar::MonthView;
use crate::map::MapView;
use crate::stats::{DashboardSummary, WeeklyMileage};

pub const LOAD_FAILED: &str = "Failed to load activities";

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; color: #1f2937; }
nav { background: #fc4c02; padding: 12px 24px; display: flex; gap: 20px; }
nav a { color: #fff; text-decoration: none; font-weight: 600; }
main { padding: 24px; }
.stats { display: flex; gap: 32px; margin-bottom: 24px; }
table { width: 100%; border-collapse: collapse; }
th { border-bottom: 1px solid #ccc; text-align: left; }
td { padding: 4px 6px; vertical-align: top; }
.calendar td { border: 1px solid #e5e7eb; height: 90px; width: 14%; }
.calendar .day { font-size: 0.8em; color: #6b7280; }
.calendar .entry { font-size: 0.8em; margin-top: 2px; }
footer { background: #f3f4f6; color: #6b7280; text-align: center; padding: 16px; }
"#;

/// Escape text for use in element content and quoted attributes.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, head_extra: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title} | Personal Strava Stats</title>
    <style>{STYLE}</style>
    {head_extra}
</head>
<body>
<nav>
    <a href="/">Home</a>
    <a href="/dashboard">Dashboard</a>
    <a href="/calendar">Calendar</a>
    <a href="/activitymap">Map</a>
</nav>
{body}
</body>
</html>"#,
        title = escape(title),
    )
}

pub fn render_home(year: i32) -> String {
    let body = format!(
        r#"<main style="text-align:center; padding:64px 24px;">
    <h1>Welcome to Your Strava Stats!</h1>
    <p>This site lets you view your latest Strava activity stats, charts, and more. Use the navigation bar above to access your dashboard and explore your data.</p>
    <p><a href="/dashboard">Go to Dashboard</a></p>
</main>
<footer>&copy; {year} Personal Strava Stats</footer>"#
    );
    layout("Home", "", &body)
}

pub fn render_error(message: &str) -> String {
    layout(
        "Error",
        "",
        &format!("<main><div>{}</div></main>", escape(message)),
    )
}

const CHART_WIDTH: f64 = 800.0;
const CHART_HEIGHT: f64 = 320.0;
const CHART_PAD: f64 = 48.0;

/// Bar chart of miles per week as inline SVG.
pub fn render_weekly_chart(weeks: &[WeeklyMileage]) -> String {
    if weeks.is_empty() {
        return "<p>No runs to chart yet.</p>".to_string();
    }
    let plot_w = CHART_WIDTH - 2.0 * CHART_PAD;
    let plot_h = CHART_HEIGHT - 2.0 * CHART_PAD;
    let max = weeks.iter().map(|w| w.miles).fold(0.0_f64, f64::max).max(1.0);
    let slot = plot_w / weeks.len() as f64;
    let bar_w = (slot * 0.8).max(1.0);
    let baseline = CHART_PAD + plot_h;

    let mut bars = String::new();
    for (i, w) in weeks.iter().enumerate() {
        let h = w.miles / max * plot_h;
        let x = CHART_PAD + i as f64 * slot + (slot - bar_w) / 2.0;
        let label_x = x + bar_w / 2.0;
        bars.push_str(&format!(
            r##"<rect x="{x:.1}" y="{y:.1}" width="{bar_w:.1}" height="{h:.1}" fill="#36a2eb"><title>{label}: {miles:.2} mi</title></rect>
<text x="{label_x:.1}" y="{ty:.1}" font-size="10" text-anchor="end" transform="rotate(-45 {label_x:.1} {ty:.1})">{label}</text>
"##,
            y = baseline - h,
            ty = baseline + 12.0,
            label = escape(&w.label),
            miles = w.miles,
        ));
    }

    format!(
        r##"<svg viewBox="0 0 {CHART_WIDTH} {CHART_HEIGHT}" width="100%" role="img" aria-label="Weekly Running Mileage">
<text x="{mid}" y="20" text-anchor="middle" font-weight="bold">Weekly Running Mileage</text>
<line x1="{CHART_PAD}" y1="{baseline}" x2="{right}" y2="{baseline}" stroke="#999"/>
<line x1="{CHART_PAD}" y1="{CHART_PAD}" x2="{CHART_PAD}" y2="{baseline}" stroke="#999"/>
<text x="{ylabel_x}" y="{CHART_PAD}" font-size="10" text-anchor="end">{max:.1}</text>
<text x="{ylabel_x}" y="{baseline}" font-size="10" text-anchor="end">0</text>
<text x="12" y="{ymid}" font-size="11" transform="rotate(-90 12 {ymid})" text-anchor="middle">Miles</text>
<text x="{mid}" y="{xlabel_y}" font-size="11" text-anchor="middle">Week</text>
{bars}</svg>"##,
        mid = CHART_WIDTH / 2.0,
        right = CHART_PAD + plot_w,
        ylabel_x = CHART_PAD - 4.0,
        ymid = CHART_PAD + plot_h / 2.0,
        xlabel_y = CHART_HEIGHT - 4.0,
    )
}

pub fn render_dashboard(summary: &DashboardSummary) -> String {
    let rows: String = summary
        .recent
        .iter()
        .map(|r| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{:.2}</td><td>{}</td></tr>\n",
                escape(&r.name),
                escape(&r.kind),
                r.miles,
                escape(r.date.as_deref().unwrap_or("")),
            )
        })
        .collect();

    let body = format!(
        r#"<main>
<h1>Strava Dashboard</h1>
<div style="margin-bottom:24px"><strong>Total Distance:</strong> {total:.2} miles</div>
<div class="stats">
    <div><h2>Runs</h2><p>Count: {runs}</p></div>
    <div><h2>Rides</h2><p>Count: {rides}</p></div>
    <div><h2>Swims</h2><p>Count: {swims}</p></div>
</div>
<section style="margin-top:40px">
<h2>Weekly Running Mileage</h2>
{chart}
</section>
<section style="margin-top:40px">
<h2>Recent Activities</h2>
<table>
<thead><tr><th>Name</th><th>Type</th><th>Distance (mi)</th><th>Date</th></tr></thead>
<tbody>
{rows}</tbody>
</table>
</section>
</main>"#,
        total = summary.total_miles,
        runs = summary.run_count,
        rides = summary.ride_count,
        swims = summary.swim_count,
        chart = render_weekly_chart(&summary.weekly_running),
    );
    layout("Dashboard", "", &body)
}

pub fn render_calendar(view: &MonthView) -> String {
    let mut grid = String::new();
    for week in &view.weeks {
        grid.push_str("<tr>");
        for cell in week {
            match cell {
                None => grid.push_str("<td></td>"),
                Some(day) => {
                    grid.push_str(&format!(r#"<td><div class="day">{}</div>"#, day.day));
                    for e in &day.entries {
                        grid.push_str(&format!(
                            r#"<div class="entry" style="border-left:4px solid {color}; padding-left:4px">{name} <small>{kind} {miles:.2} mi</small></div>"#,
                            color = e.color,
                            name = escape(&e.name),
                            kind = escape(&e.kind),
                            miles = e.miles,
                        ));
                    }
                    grid.push_str("</td>");
                }
            }
        }
        grid.push_str("</tr>\n");
    }

    let body = format!(
        r#"<main>
<h1>{label}</h1>
<p><a href="/calendar?month={prev}">&larr; {prev}</a> | <a href="/calendar?month={next}">{next} &rarr;</a></p>
<table class="calendar">
<thead><tr><th>Mon</th><th>Tue</th><th>Wed</th><th>Thu</th><th>Fri</th><th>Sat</th><th>Sun</th></tr></thead>
<tbody>
{grid}</tbody>
</table>
</main>"#,
        label = escape(&view.label),
        prev = view.previous,
        next = view.next,
    );
    layout("Calendar", "", &body)
}

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";

/// Map page; decoded routes are embedded as JSON and drawn by Leaflet.
pub fn render_map(view: &MapView) -> Result<String, serde_json::Error> {
    // A route name containing "</script>" must not end the script block.
    let data = serde_json::to_string(view)?.replace("</", "<\\/");
    let head = format!(r#"<link rel="stylesheet" href="{LEAFLET_CSS}">"#);
    let body = format!(
        r#"<main>
<h1>Activity Map</h1>
<div id="map" style="height:600px; width:100%"></div>
</main>
<script src="{LEAFLET_JS}"></script>
<script>
const view = {data};
const map = L.map("map").setView(view.center, view.zoom);
L.tileLayer("https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png", {{
    attribution: "&copy; OpenStreetMap contributors"
}}).addTo(map);
for (const route of view.routes) {{
    L.polyline(route.coordinates, {{ color: route.color, weight: view.weight, opacity: view.opacity }})
        .bindTooltip(route.name)
        .addTo(map);
}}
</script>"#
    );
    Ok(layout("Activity Map", &head, &body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{DateBuckets, month_view};
    use crate::map::{LatLng, RouteLayer};
    use crate::stats::RecentActivityRow;

    #[test]
    fn escape_html_special_characters() {
        assert_eq!(
            escape(r#"<b>"Tom & Jerry's"</b>"#),
            "&lt;b&gt;&quot;Tom &amp; Jerry&#39;s&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn dashboard_renders_totals_and_escaped_rows() {
        let summary = DashboardSummary {
            total_miles: 12.5,
            run_count: 2,
            ride_count: 1,
            swim_count: 0,
            weekly_running: vec![WeeklyMileage {
                label: "2025-W10".into(),
                miles: 6.0,
            }],
            recent: vec![RecentActivityRow {
                id: 1,
                name: "<script>".into(),
                kind: "Run".into(),
                miles: 3.0,
                date: Some("2025-03-04".into()),
            }],
        };
        let html = render_dashboard(&summary);
        assert!(html.contains("12.50 miles"));
        assert!(html.contains("Count: 2"));
        assert!(html.contains("2025-W10"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<td><script>"));
    }

    #[test]
    fn chart_has_one_bar_per_week() {
        let weeks = vec![
            WeeklyMileage {
                label: "2025-W09".into(),
                miles: 2.0,
            },
            WeeklyMileage {
                label: "2025-W10".into(),
                miles: 4.0,
            },
        ];
        let svg = render_weekly_chart(&weeks);
        assert_eq!(svg.matches("<rect").count(), 2);
        assert!(render_weekly_chart(&[]).contains("No runs"));
    }

    #[test]
    fn calendar_renders_month_navigation() {
        let view = month_view(2025, 3, &DateBuckets::new()).unwrap();
        let html = render_calendar(&view);
        assert!(html.contains("March 2025"));
        assert!(html.contains("/calendar?month=2025-02"));
        assert!(html.contains("/calendar?month=2025-04"));
    }

    #[test]
    fn map_embeds_routes_without_closing_script() {
        let view = MapView {
            center: LatLng(1.0, 2.0),
            zoom: 5,
            weight: 4,
            opacity: 0.5,
            routes: vec![RouteLayer {
                id: 7,
                name: "</script><b>".into(),
                kind: "Run".into(),
                color: "blue",
                coordinates: vec![LatLng(1.0, 2.0)],
            }],
        };
        let html = render_map(&view).unwrap();
        assert!(html.contains(r#""center":[1.0,2.0]"#));
        assert!(html.contains("<\\/script><b>"));
        assert!(html.contains("https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png"));
    }
}
