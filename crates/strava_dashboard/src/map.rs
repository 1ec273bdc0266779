//! Route map: encoded polyline decoding, per-type colours and centring.

use serde::Serialize;
use strava_client::Activity;
use thiserror::Error;

const PRECISION: f64 = 1e5;
pub const DEFAULT_ZOOM: u8 = 5;
pub const ROUTE_WEIGHT: u8 = 4;
pub const ROUTE_OPACITY: f64 = 0.5;
/// Fallback centre when there is nothing to draw (continental US).
pub const DEFAULT_CENTER: LatLng = LatLng(39.0, -98.0);

/// `(latitude, longitude)`; serialises as a two-element array, which is what Leaflet expects.
#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct LatLng(pub f64, pub f64);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolylineError {
    #[error("invalid polyline byte {byte:#04x} at position {position}")]
    InvalidByte { position: usize, byte: u8 },
    #[error("polyline ends inside a value at position {position}")]
    Truncated { position: usize },
    #[error("polyline value starting at position {position} is too long")]
    Overflow { position: usize },
}

/// Read one zig-zag varint starting at `*pos`.
fn next_value(bytes: &[u8], pos: &mut usize) -> Result<i64, PolylineError> {
    let start = *pos;
    let mut result: i64 = 0;
    let mut shift = 0u32;
    loop {
        let Some(&byte) = bytes.get(*pos) else {
            return Err(PolylineError::Truncated { position: *pos });
        };
        if !(63..=126).contains(&byte) {
            return Err(PolylineError::InvalidByte {
                position: *pos,
                byte,
            });
        }
        let chunk = i64::from(byte - 63);
        // Only the low two bits of a seventh chunk fit in 32 bits.
        if shift > 30 || (shift == 30 && (chunk & 0x1f) > 0x3) {
            return Err(PolylineError::Overflow { position: start });
        }
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        *pos += 1;
        if chunk < 0x20 {
            break;
        }
    }
    Ok(if result & 1 == 1 {
        !(result >> 1)
    } else {
        result >> 1
    })
}

/// Decode an encoded polyline (precision 5) into coordinates.
pub fn decode_polyline(encoded: &str) -> Result<Vec<LatLng>, PolylineError> {
    let bytes = encoded.as_bytes();
    let mut pos = 0;
    let (mut lat, mut lng) = (0i64, 0i64);
    let mut coords = Vec::new();
    while pos < bytes.len() {
        lat += next_value(bytes, &mut pos)?;
        lng += next_value(bytes, &mut pos)?;
        coords.push(LatLng(lat as f64 / PRECISION, lng as f64 / PRECISION));
    }
    Ok(coords)
}

pub fn route_color(kind: &str) -> &'static str {
    match kind {
        "Ride" => "red",
        "Run" => "blue",
        "Walk" => "purple",
        _ => "gray",
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct RouteLayer {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub color: &'static str,
    pub coordinates: Vec<LatLng>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct MapView {
    pub center: LatLng,
    pub zoom: u8,
    pub weight: u8,
    pub opacity: f64,
    pub routes: Vec<RouteLayer>,
}

/// Mean of all points, or [`DEFAULT_CENTER`] when there are none.
pub fn center_of<'a>(points: impl IntoIterator<Item = &'a LatLng>) -> LatLng {
    let (mut lat, mut lng, mut n) = (0.0, 0.0, 0usize);
    for p in points {
        lat += p.0;
        lng += p.1;
        n += 1;
    }
    if n == 0 {
        DEFAULT_CENTER
    } else {
        LatLng(lat / n as f64, lng / n as f64)
    }
}

pub fn build_map(activities: &[Activity]) -> MapView {
    let routes: Vec<RouteLayer> = activities
        .iter()
        .filter_map(|a| {
            let encoded = a.summary_polyline()?;
            match decode_polyline(encoded) {
                Ok(coordinates) => Some(RouteLayer {
                    id: a.id,
                    name: a.name.clone(),
                    kind: a.kind.clone(),
                    color: route_color(&a.kind),
                    coordinates,
                }),
                Err(e) => {
                    tracing::warn!(id = a.id, error = %e, "skipping undecodable route");
                    None
                }
            }
        })
        .collect();

    MapView {
        center: center_of(routes.iter().flat_map(|r| r.coordinates.iter())),
        zoom: DEFAULT_ZOOM,
        weight: ROUTE_WEIGHT,
        opacity: ROUTE_OPACITY,
        routes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const REFERENCE: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

    fn assert_close(actual: &[LatLng], expected: &[(f64, f64)]) {
        assert_eq!(actual.len(), expected.len());
        for (a, (lat, lng)) in actual.iter().zip(expected) {
            assert!((a.0 - lat).abs() < 1e-9, "{a:?} vs ({lat}, {lng})");
            assert!((a.1 - lng).abs() < 1e-9, "{a:?} vs ({lat}, {lng})");
        }
    }

    #[test]
    fn decodes_reference_polyline() {
        let coords = decode_polyline(REFERENCE).unwrap();
        assert_close(
            &coords,
            &[(38.5, -120.2), (40.7, -120.95), (43.252, -126.453)],
        );
    }

    #[test]
    fn empty_polyline_has_no_points() {
        assert!(decode_polyline("").unwrap().is_empty());
    }

    #[test]
    fn truncated_polyline_is_rejected() {
        // Latitude only, no longitude.
        assert_eq!(
            decode_polyline("_p~iF"),
            Err(PolylineError::Truncated { position: 5 })
        );
        // Continuation bit set on the last byte.
        assert!(matches!(
            decode_polyline("_p~"),
            Err(PolylineError::Truncated { .. })
        ));
    }

    #[test]
    fn bytes_outside_alphabet_are_rejected() {
        assert_eq!(
            decode_polyline("_p iF"),
            Err(PolylineError::InvalidByte {
                position: 2,
                byte: b' '
            })
        );
    }

    #[test]
    fn overlong_values_are_rejected() {
        assert!(matches!(
            decode_polyline(&"~".repeat(20)),
            Err(PolylineError::Overflow { position: 0 })
        ));
    }

    #[test]
    fn seventh_chunk_wider_than_32_bits_is_rejected() {
        assert_eq!(
            decode_polyline("~~~~~~^?"),
            Err(PolylineError::Overflow { position: 0 })
        );
    }

    #[test]
    fn seventh_chunk_within_32_bits_decodes() {
        let coords = decode_polyline("~~~~~~B?").unwrap();
        assert_close(&coords, &[(-21474.83648, 0.0)]);
    }

    #[test]
    fn route_colors_by_type() {
        assert_eq!(route_color("Ride"), "red");
        assert_eq!(route_color("Run"), "blue");
        assert_eq!(route_color("Walk"), "purple");
        assert_eq!(route_color("Swim"), "gray");
    }

    #[test]
    fn center_defaults_when_empty() {
        assert_eq!(center_of(&[]), DEFAULT_CENTER);
    }

    #[test]
    fn build_map_centres_on_mean_and_skips_bad_routes() {
        let acts: Vec<Activity> = serde_json::from_value(json!([
            {"id": 1, "type": "Ride", "map": {"summary_polyline": REFERENCE}},
            {"id": 2, "type": "Run", "map": {"summary_polyline": "_p~"}},
            {"id": 3, "type": "Swim", "map": {"summary_polyline": null}},
            {"id": 4, "type": "Run"}
        ]))
        .unwrap();
        let view = build_map(&acts);
        assert_eq!(view.routes.len(), 1);
        assert_eq!(view.routes[0].color, "red");
        assert!((view.center.0 - (38.5 + 40.7 + 43.252) / 3.0).abs() < 1e-9);
        assert!((view.center.1 - (-120.2 - 120.95 - 126.453) / 3.0).abs() < 1e-9);
        assert_eq!(view.zoom, 5);
    }

    #[test]
    fn build_map_without_routes_uses_fallback_centre() {
        let view = build_map(&[]);
        assert!(view.routes.is_empty());
        assert_eq!(view.center, LatLng(39.0, -98.0));
    }
}
