//! Domain types shared across the workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Launch Types ──────────────────────────────────────────────────────

/// A normalized launch record, as handed to the globe and list views.
///
/// This is also the cache format: the JSON field names are stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchRecord {
    pub id: String,
    /// Free text, usually `"<rocket variant> | <mission>"`.
    pub name: String,
    pub date_utc: DateTime<Utc>,
    /// Seconds since the epoch; seeds the trajectory model.
    pub date_unix: i64,
    pub success: bool,
    pub launchpad: Launchpad,
    pub rocket: Rocket,
    #[serde(default)]
    pub payloads: Vec<Payload>,
    #[serde(default)]
    pub links: LaunchLinks,
}

impl LaunchRecord {
    /// A record can be placed on the globe only with finite pad coordinates.
    pub fn has_valid_coordinates(&self) -> bool {
        self.launchpad.latitude.is_finite() && self.launchpad.longitude.is_finite()
    }

    /// Mission part of the name (after the last `|`), or the whole name.
    pub fn mission_name(&self) -> &str {
        match self.name.rsplit_once('|') {
            Some((_, mission)) => mission.trim(),
            None => self.name.trim(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Launchpad {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rocket {
    pub name: String,
    /// Configuration variant, or the family when no variant is published.
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default = "default_orbit")]
    pub orbit: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaunchLinks {
    #[serde(default)]
    pub patch: PatchLinks,
    #[serde(default)]
    pub flickr: FlickrLinks,
    #[serde(default)]
    pub youtube_ids: Vec<String>,
    #[serde(default)]
    pub webcast: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatchLinks {
    #[serde(default)]
    pub small: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlickrLinks {
    #[serde(default)]
    pub original: Vec<String>,
}

fn default_orbit() -> String {
    "Unknown".into()
}

// ── Mission Metadata ──────────────────────────────────────────────────

/// Supplementary per-mission data, keyed by clean mission name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trajectory_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub official_website: Option<String>,
}

impl MissionMetadata {
    pub fn is_empty(&self) -> bool {
        self.video_url.is_none() && self.trajectory_image.is_none() && self.official_website.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> LaunchRecord {
        LaunchRecord {
            id: "crs-31".into(),
            name: "Falcon 9 | CRS-31".into(),
            date_utc: "2024-11-04T02:29:00Z".parse().expect("valid timestamp"),
            date_unix: 1_730_687_340,
            success: true,
            launchpad: Launchpad {
                name: "LC-39A".into(),
                latitude: 28.608,
                longitude: -80.604,
                region: "Kennedy Space Center, FL".into(),
                full_name: "LC-39A".into(),
            },
            rocket: Rocket {
                name: "Falcon 9".into(),
                kind: "Falcon 9".into(),
            },
            payloads: vec![],
            links: LaunchLinks::default(),
        }
    }

    #[test]
    fn test_mission_name_splits_on_pipe() {
        let record = sample_record();
        assert_eq!(record.mission_name(), "CRS-31");
    }

    #[test]
    fn test_nan_coordinates_are_invalid() {
        let mut record = sample_record();
        assert!(record.has_valid_coordinates());
        record.launchpad.latitude = f64::NAN;
        assert!(!record.has_valid_coordinates());
    }

    #[test]
    fn test_record_json_uses_stable_field_names() {
        let json = serde_json::to_value(sample_record()).expect("serializes");
        assert_eq!(json["rocket"]["type"], "Falcon 9");
        assert!(json["links"]["youtube_ids"].is_array());
        assert!(json["links"]["patch"]["small"].is_null());
    }

    #[test]
    fn test_payload_orbit_defaults_to_unknown() {
        let payload: Payload =
            serde_json::from_str(r#"{"name": "Cargo Dragon"}"#).expect("deserializes");
        assert_eq!(payload.orbit, "Unknown");
    }

    #[test]
    fn test_metadata_camel_case_keys() {
        let meta: MissionMetadata = serde_json::from_str(
            r#"{"videoUrl": "https://www.youtube.com/watch?v=abc", "officialWebsite": "https://www.spacex.com/launches/x"}"#,
        )
        .expect("deserializes");
        assert!(meta.trajectory_image.is_none());
        assert!(!meta.is_empty());
    }
}
