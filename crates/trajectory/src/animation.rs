//! Per-frame marker state for the globe renderer.
//!
//! The sampler is pure apart from the exhaust flicker, which is drawn from
//! the caller's RNG and is cosmetic only.

use chrono::{DateTime, Utc};
use common::config::AnimationConfig;
use common::Error;
use rand::Rng;
use serde::Serialize;

use crate::path::TrajectoryPath;

/// Globe radius in renderer units.
pub const GLOBE_RADIUS: f64 = 100.0;

/// Direction steps shorter than this do not produce a heading.
const MIN_HEADING_STEP: f64 = 0.0001;

const LABEL_OFFSET: Vec3 = Vec3 {
    x: 5.0,
    y: 3.0,
    z: 0.0,
};

/// Animation speed multiplier, 1..=8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Speed(u8);

impl Speed {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 8;

    pub fn new(value: u8) -> Result<Self, Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::Config(format!(
                "speed must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                value
            )))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Speed {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl TryFrom<u8> for Speed {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Fraction of the arc covered at `now`, clamped to `[0, 1]`.
///
/// At speed 1 the full arc takes `duration_secs`; speed `n` takes `1/n` of that.
pub fn progress(
    now: DateTime<Utc>,
    activated_at: DateTime<Utc>,
    speed: Speed,
    duration_secs: f64,
) -> f64 {
    let duration_ms = duration_secs * 1000.0 / f64::from(speed.get());
    if duration_ms <= 0.0 {
        return 1.0;
    }
    let elapsed_ms = (now - activated_at).num_milliseconds() as f64;
    (elapsed_ms / duration_ms).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    fn sub(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }

    fn add(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }

    fn scale(self, k: f64) -> Vec3 {
        Vec3 {
            x: self.x * k,
            y: self.y * k,
            z: self.z * k,
        }
    }
}

/// Cartesian renderer coordinates for a geographic point `altitude` globe
/// radii above the surface. `y` points to the north pole.
pub fn globe_coords(lat: f64, lng: f64, altitude: f64) -> Vec3 {
    let phi = (90.0 - lat).to_radians();
    let theta = (90.0 - lng).to_radians();
    let r = GLOBE_RADIUS * (1.0 + altitude);
    Vec3 {
        x: r * phi.sin() * theta.cos(),
        y: r * phi.cos(),
        z: r * phi.sin() * theta.sin(),
    }
}

/// Label sprite scale `(x, y)` that keeps labels a constant on-screen size.
pub fn label_scale(camera_distance: f64) -> (f64, f64) {
    let base = camera_distance * 0.08;
    (base * 4.0, base * 0.5)
}

/// Exhaust flame scale for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExhaustFlicker {
    /// Horizontal scale, 0.85..1.15.
    pub scale_xz: f64,
    /// Vertical scale, 1.0..1.4.
    pub scale_y: f64,
}

impl ExhaustFlicker {
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            scale_xz: 1.0 + (rng.gen::<f64>() - 0.5) * 0.3,
            scale_y: 1.0 + rng.gen::<f64>() * 0.4,
        }
    }
}

/// Everything the renderer needs to draw one marker.
#[derive(Debug, Clone, Serialize)]
pub struct FrameState {
    pub id: String,
    pub progress: f64,
    pub lat: f64,
    pub lng: f64,
    pub altitude: f64,
    pub position: Vec3,
    /// Unit vector toward the look-ahead point. `None` once the arc is done.
    pub heading: Option<Vec3>,
    pub label_position: Vec3,
    pub exhaust: ExhaustFlicker,
}

#[derive(Debug, Clone)]
pub struct FrameSampler {
    duration_secs: f64,
    arc_altitude: f64,
    look_ahead: f64,
}

impl FrameSampler {
    pub fn new(config: &AnimationConfig) -> Self {
        Self {
            duration_secs: config.duration_secs,
            arc_altitude: config.arc_altitude,
            look_ahead: config.look_ahead,
        }
    }

    pub fn altitude(&self, t: f64) -> f64 {
        self.arc_altitude * (t * std::f64::consts::PI).sin()
    }

    fn point(&self, path: &TrajectoryPath, t: f64) -> (f64, f64, f64, Vec3) {
        let (lng, lat) = path.interpolator.at(t);
        let altitude = self.altitude(t);
        (lat, lng, altitude, globe_coords(lat, lng, altitude))
    }

    pub fn sample<R: Rng + ?Sized>(
        &self,
        path: &TrajectoryPath,
        now: DateTime<Utc>,
        speed: Speed,
        rng: &mut R,
    ) -> FrameState {
        let t = progress(now, path.activated_at, speed, self.duration_secs);
        let (lat, lng, altitude, position) = self.point(path, t);

        let heading = if t < 1.0 {
            let next_t = (t + self.look_ahead).min(1.0);
            let (_, _, _, next) = self.point(path, next_t);
            let direction = next.sub(position);
            let distance = direction.length();
            (distance > MIN_HEADING_STEP).then(|| direction.scale(1.0 / distance))
        } else {
            None
        };

        FrameState {
            id: path.id.clone(),
            progress: t,
            lat,
            lng,
            altitude,
            position,
            heading,
            label_position: position.add(LABEL_OFFSET),
            exhaust: ExhaustFlicker::sample(rng),
        }
    }
}

impl Default for FrameSampler {
    fn default() -> Self {
        Self::new(&AnimationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{GeoInterpolator, Hsla};
    use chrono::Duration;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn t0() -> DateTime<Utc> {
        "2025-12-18T12:00:00Z".parse().expect("valid timestamp")
    }

    fn path() -> TrajectoryPath {
        TrajectoryPath {
            id: "a".into(),
            name: "Falcon 9 | Test".into(),
            start_lat: 28.5,
            start_lng: -80.5,
            dest_lat: -11.5,
            dest_lng: 39.5,
            interpolator: GeoInterpolator::new((-80.5, 28.5), (39.5, -11.5)),
            color: Hsla::from_seed(0),
            activated_at: t0(),
        }
    }

    #[test]
    fn test_speed_bounds() {
        assert!(Speed::new(0).is_err());
        assert!(Speed::new(9).is_err());
        assert_eq!(Speed::try_from(8).map(Speed::get).ok(), Some(8));
        assert_eq!(Speed::default().get(), 1);
    }

    #[test]
    fn test_progress_scales_with_speed() {
        let speed1 = Speed::new(1).expect("speed");
        let speed4 = Speed::new(4).expect("speed");
        let now = t0() + Duration::seconds(45);

        assert!((progress(now, t0(), speed1, 180.0) - 0.25).abs() < 1e-9);
        assert!((progress(now, t0(), speed4, 180.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_progress_is_clamped() {
        let speed = Speed::default();
        assert_eq!(progress(t0() - Duration::seconds(5), t0(), speed, 180.0), 0.0);
        assert_eq!(progress(t0() + Duration::hours(1), t0(), speed, 180.0), 1.0);
    }

    #[test]
    fn test_sample_at_start() {
        let sampler = FrameSampler::default();
        let mut rng = StdRng::seed_from_u64(7);
        let frame = sampler.sample(&path(), t0(), Speed::default(), &mut rng);

        assert_eq!(frame.progress, 0.0);
        assert!((frame.lat - 28.5).abs() < 1e-6);
        assert!((frame.lng + 80.5).abs() < 1e-6);
        assert!(frame.altitude.abs() < 1e-12);
        assert!((frame.position.length() - GLOBE_RADIUS).abs() < 1e-9);
        let heading = frame.heading.expect("heading before arrival");
        assert!((heading.length() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_sample_midway_peaks_altitude() {
        let sampler = FrameSampler::default();
        let mut rng = StdRng::seed_from_u64(7);
        let frame = sampler.sample(&path(), t0() + Duration::seconds(90), Speed::default(), &mut rng);

        assert!((frame.progress - 0.5).abs() < 1e-9);
        assert!((frame.altitude - 0.5).abs() < 1e-9);
        assert!((frame.position.length() - GLOBE_RADIUS * 1.5).abs() < 1e-6);
        assert!((frame.label_position.x - frame.position.x - 5.0).abs() < 1e-9);
        assert!((frame.label_position.y - frame.position.y - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_heading_after_arrival() {
        let sampler = FrameSampler::default();
        let mut rng = StdRng::seed_from_u64(7);
        let frame = sampler.sample(&path(), t0() + Duration::minutes(10), Speed::default(), &mut rng);
        assert_eq!(frame.progress, 1.0);
        assert!(frame.heading.is_none());
    }

    #[test]
    fn test_no_heading_for_degenerate_arc() {
        let mut still = path();
        still.interpolator = GeoInterpolator::new((-80.5, 28.5), (-80.5, 28.5));
        let sampler = FrameSampler::new(&AnimationConfig {
            arc_altitude: 0.0,
            ..AnimationConfig::default()
        });
        let mut rng = StdRng::seed_from_u64(7);
        let frame = sampler.sample(&still, t0() + Duration::seconds(10), Speed::default(), &mut rng);
        assert!(frame.heading.is_none());
    }

    #[test]
    fn test_exhaust_flicker_ranges() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let flicker = ExhaustFlicker::sample(&mut rng);
            assert!((0.85..=1.15).contains(&flicker.scale_xz));
            assert!((1.0..=1.4).contains(&flicker.scale_y));
        }
    }

    #[test]
    fn test_globe_coords_axes() {
        let north = globe_coords(90.0, 0.0, 0.0);
        assert!((north.y - GLOBE_RADIUS).abs() < 1e-9);
        let origin = globe_coords(0.0, 0.0, 0.0);
        assert!((origin.z - GLOBE_RADIUS).abs() < 1e-9);
        let (sx, sy) = label_scale(100.0);
        assert!((sx - 32.0).abs() < 1e-9 && (sy - 4.0).abs() < 1e-9);
    }
}
