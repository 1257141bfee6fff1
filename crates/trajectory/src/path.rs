//! Stylized trajectory arcs.
//!
//! Destinations and colors are not physical: they are derived from the
//! launch timestamp so the same launch always draws the same arc.

use std::fmt;

use chrono::{DateTime, Utc};
use common::LaunchRecord;
use serde::Serialize;

use crate::activation::ActivationTracker;

/// Seed for the derived destination and color.
pub fn date_seed(record: &LaunchRecord) -> i64 {
    record.date_unix
}

/// Destination `(lat, lng)` for an arc starting at `(start_lat, start_lng)`.
///
/// Latitude shifts by -40..+40 degrees, longitude by +120..+180 degrees.
/// Neither is wrapped; the interpolator handles out-of-range values.
pub fn destination(start_lat: f64, start_lng: f64, seed: i64) -> (f64, f64) {
    let dest_lat = start_lat + ((seed % 100) as f64 / 100.0 * 80.0 - 40.0);
    let dest_lng = start_lng + 120.0 + ((seed % 50) as f64 / 50.0 * 60.0);
    (dest_lat, dest_lng)
}

/// CSS `hsla()` color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hsla {
    pub hue: i64,
    pub saturation: u8,
    pub lightness: u8,
    pub alpha: f64,
}

impl Hsla {
    /// Arc color: hue from the seed, fixed saturation, lightness and alpha.
    pub fn from_seed(seed: i64) -> Self {
        Self {
            hue: seed % 360,
            saturation: 80,
            lightness: 60,
            alpha: 0.6,
        }
    }
}

impl fmt::Display for Hsla {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hsla({}, {}%, {}%, {})",
            self.hue, self.saturation, self.lightness, self.alpha
        )
    }
}

/// Great-circle interpolation between two geographic points.
///
/// Points are `(lng, lat)` in degrees, matching d3's `geoInterpolate`.
/// Output longitudes are normalized to `(-180, 180]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoInterpolator {
    start: (f64, f64),
    k0: [f64; 3],
    k1: [f64; 3],
    distance: f64,
    sin_distance: f64,
}

impl GeoInterpolator {
    pub fn new(start: (f64, f64), end: (f64, f64)) -> Self {
        let (x0, y0) = (start.0.to_radians(), start.1.to_radians());
        let (x1, y1) = (end.0.to_radians(), end.1.to_radians());
        let (cy0, sy0) = (y0.cos(), y0.sin());
        let (cy1, sy1) = (y1.cos(), y1.sin());

        let distance =
            2.0 * (haversin(y1 - y0) + cy0 * cy1 * haversin(x1 - x0)).sqrt().asin();

        Self {
            start,
            k0: [cy0 * x0.cos(), cy0 * x0.sin(), sy0],
            k1: [cy1 * x1.cos(), cy1 * x1.sin(), sy1],
            distance,
            sin_distance: distance.sin(),
        }
    }

    /// Angular distance between the endpoints (radians).
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Point at `t` along the arc, returned as `(lng, lat)`.
    pub fn at(&self, t: f64) -> (f64, f64) {
        if self.distance == 0.0 || self.sin_distance == 0.0 {
            return self.start;
        }
        let t = t * self.distance;
        let b = t.sin() / self.sin_distance;
        let a = (self.distance - t).sin() / self.sin_distance;

        let x = a * self.k0[0] + b * self.k1[0];
        let y = a * self.k0[1] + b * self.k1[1];
        let z = a * self.k0[2] + b * self.k1[2];

        (
            y.atan2(x).to_degrees(),
            z.atan2((x * x + y * y).sqrt()).to_degrees(),
        )
    }
}

fn haversin(x: f64) -> f64 {
    let s = (x / 2.0).sin();
    s * s
}

/// Arc for one selected launch. Derived on demand, never persisted.
#[derive(Debug, Clone)]
pub struct TrajectoryPath {
    pub id: String,
    pub name: String,
    pub start_lat: f64,
    pub start_lng: f64,
    pub dest_lat: f64,
    pub dest_lng: f64,
    pub interpolator: GeoInterpolator,
    pub color: Hsla,
    pub activated_at: DateTime<Utc>,
}

impl TrajectoryPath {
    /// `None` when the launch has no mappable pad coordinates.
    pub fn from_record(record: &LaunchRecord, activated_at: DateTime<Utc>) -> Option<Self> {
        if !record.has_valid_coordinates() {
            return None;
        }
        let seed = date_seed(record);
        let start_lat = record.launchpad.latitude;
        let start_lng = record.launchpad.longitude;
        let (dest_lat, dest_lng) = destination(start_lat, start_lng, seed);

        Some(Self {
            id: record.id.clone(),
            name: record.name.clone(),
            start_lat,
            start_lng,
            dest_lat,
            dest_lng,
            interpolator: GeoInterpolator::new((start_lng, start_lat), (dest_lng, dest_lat)),
            color: Hsla::from_seed(seed),
            activated_at,
        })
    }
}

/// Paths for the current selection.
///
/// Syncs the tracker first, so newly selected launches start at `now` and
/// deselected ones are forgotten.
pub fn build_paths(
    selected: &[LaunchRecord],
    tracker: &mut ActivationTracker,
    now: DateTime<Utc>,
) -> Vec<TrajectoryPath> {
    tracker.sync(selected.iter().map(|l| l.id.as_str()), now);

    selected
        .iter()
        .filter_map(|record| {
            let activated_at = tracker.activated_at(&record.id).unwrap_or(now);
            TrajectoryPath::from_record(record, activated_at)
        })
        .collect()
}
