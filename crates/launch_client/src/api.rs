//! The Space Devs launch library client.
//!
//! Fetches `GET /launch/previous/` and converts raw launches to the shared
//! `LaunchRecord` format.

use std::error::Error as StdError;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::config::ApiConfig;
use common::media::youtube_id;
use common::{
    Error, FlickrLinks, LaunchLinks, LaunchRecord, Launchpad, PatchLinks, Payload, Rocket,
};
use serde::{Deserialize, Deserializer};
use tracing::debug;

/// Status id the API uses for "Launch Successful".
pub const STATUS_SUCCESS: i64 = 3;

/// Anything that can hand back raw launches, newest first.
#[async_trait]
pub trait LaunchSource: Send + Sync {
    async fn fetch_previous(&self, limit: u32) -> Result<Vec<RawLaunch>, Error>;
}

// ── Space Devs response types ─────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LaunchListResponse {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub results: Vec<RawLaunch>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawLaunch {
    pub id: String,
    pub name: String,
    /// "No earlier than", the launch time.
    pub net: DateTime<Utc>,
    pub status: RawStatus,
    pub pad: RawPad,
    pub rocket: RawRocket,
    #[serde(default)]
    pub mission: Option<RawMission>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub mission_patches: Vec<RawMissionPatch>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub vid_urls: Vec<RawVideo>,
}

/// Lists may be published as `null`; treat that as empty.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawStatus {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPad {
    #[serde(default)]
    pub name: Option<String>,
    /// Published as a decimal string; sometimes a number or null.
    #[serde(default)]
    pub latitude: serde_json::Value,
    #[serde(default)]
    pub longitude: serde_json::Value,
    #[serde(default)]
    pub location: Option<RawLocation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawLocation {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRocket {
    pub configuration: RawRocketConfiguration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRocketConfiguration {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub variant: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMission {
    #[serde(default)]
    pub id: serde_json::Value,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub orbit: Option<RawOrbit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawOrbit {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMissionPatch {
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawVideo {
    #[serde(default)]
    pub url: Option<String>,
}

// ── Transform ─────────────────────────────────────────────────────────

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

/// Parse a coordinate that may be a string or a number. Anything else is NaN.
fn parse_coordinate(value: &serde_json::Value) -> f64 {
    match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        serde_json::Value::String(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

fn value_to_id(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Convert one raw launch into a `LaunchRecord`.
///
/// The result may carry NaN coordinates; callers filter with
/// [`LaunchRecord::has_valid_coordinates`].
pub fn transform_launch(raw: RawLaunch) -> LaunchRecord {
    let rocket_kind = non_empty(raw.rocket.configuration.variant.as_deref())
        .or(non_empty(raw.rocket.configuration.family.as_deref()))
        .unwrap_or_default()
        .to_string();

    let payloads = raw
        .mission
        .as_ref()
        .map(|mission| {
            vec![Payload {
                id: value_to_id(&mission.id),
                name: mission.name.clone().unwrap_or_default(),
                kind: mission.kind.clone().unwrap_or_default(),
                orbit: mission
                    .orbit
                    .as_ref()
                    .and_then(|o| non_empty(o.name.as_deref()))
                    .unwrap_or("Unknown")
                    .to_string(),
            }]
        })
        .unwrap_or_default();

    let image = non_empty(raw.image.as_deref()).map(str::to_string);
    let patch = image.clone().or_else(|| {
        raw.mission_patches
            .first()
            .and_then(|p| non_empty(p.image_url.as_deref()))
            .map(str::to_string)
    });

    let youtube_ids = raw
        .vid_urls
        .iter()
        .filter_map(|v| v.url.as_deref().and_then(youtube_id))
        .map(str::to_string)
        .collect();

    let pad_name = raw.pad.name.unwrap_or_default();

    LaunchRecord {
        id: raw.id,
        name: raw.name,
        date_utc: raw.net,
        date_unix: raw.net.timestamp(),
        success: raw.status.id == STATUS_SUCCESS,
        launchpad: Launchpad {
            latitude: parse_coordinate(&raw.pad.latitude),
            longitude: parse_coordinate(&raw.pad.longitude),
            region: raw.pad.location.and_then(|l| l.name).unwrap_or_default(),
            full_name: pad_name.clone(),
            name: pad_name,
        },
        rocket: Rocket {
            name: raw.rocket.configuration.name.unwrap_or_default(),
            kind: rocket_kind,
        },
        payloads,
        links: LaunchLinks {
            patch: PatchLinks { small: patch },
            flickr: FlickrLinks {
                original: image.into_iter().collect(),
            },
            youtube_ids,
            webcast: raw.vid_urls.first().and_then(|v| v.url.clone()),
        },
    }
}

/// Decode a `/launch/previous/` body. Payload problems surface as
/// [`Error::Json`], distinct from transport failures.
pub fn parse_launch_list(body: &str) -> Result<LaunchListResponse, Error> {
    Ok(serde_json::from_str(body)?)
}

// ── HTTP client ───────────────────────────────────────────────────────

pub fn format_reqwest_error(err: &reqwest::Error) -> String {
    // Keep chained causes so network failures (DNS/TLS/socket) are visible.
    let mut message = err.to_string();
    let mut source = err.source();

    while let Some(cause) = source {
        let cause_msg = cause.to_string();
        if !cause_msg.is_empty() && !message.contains(&cause_msg) {
            message.push_str(": ");
            message.push_str(&cause_msg);
        }
        source = cause.source();
    }

    message
}

/// HTTP client for the Space Devs launch library.
#[derive(Debug, Clone)]
pub struct SpaceDevsApi {
    client: reqwest::Client,
    base_url: String,
    provider: String,
}

impl SpaceDevsApi {
    pub fn new(config: &ApiConfig) -> Result<Self, Error> {
        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .pool_max_idle_per_host(4);
        if config.timeout_secs > 0 {
            builder = builder.timeout(std::time::Duration::from_secs(config.timeout_secs));
        }
        let client = builder
            .build()
            .map_err(|e| Error::Http(format!("failed to build launch API client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
            provider: config.provider.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl LaunchSource for SpaceDevsApi {
    async fn fetch_previous(&self, limit: u32) -> Result<Vec<RawLaunch>, Error> {
        let url = format!("{}/launch/previous/", self.base_url);
        let query = [
            ("limit", limit.to_string()),
            ("lsp__name", self.provider.clone()),
            ("ordering", "-net".to_string()),
        ];

        debug!("Fetching previous launches: {} limit={} provider={}", url, limit, self.provider);

        let resp = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| Error::Http(format_reqwest_error(&e)))?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body = resp.text().await.unwrap_or_default();
            // The API reports throttling as {"detail": "..."}.
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
                .unwrap_or_else(|| body.chars().take(500).collect());
            return Err(Error::Api { status, message });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| Error::Http(format_reqwest_error(&e)))?;
        let payload = parse_launch_list(&body)?;

        debug!(
            "Got {} launches (count={:?})",
            payload.results.len(),
            payload.count
        );

        Ok(payload.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_response() -> &'static str {
        r#"{
            "count": 2,
            "results": [
                {
                    "id": "e3df2ecd-c239-472f-95e4-2b89b4f75800",
                    "name": "Falcon 9 Block 5 | Starlink Group 10-17",
                    "net": "2025-12-10T04:12:00Z",
                    "status": {"id": 3, "name": "Launch Successful"},
                    "pad": {
                        "name": "Space Launch Complex 40",
                        "latitude": "28.56194122",
                        "longitude": "-80.57735736",
                        "location": {"name": "Cape Canaveral SFS, FL, USA"}
                    },
                    "rocket": {"configuration": {"name": "Falcon 9", "variant": "Block 5", "family": "Falcon"}},
                    "mission": {"id": 7012, "name": "Starlink Group 10-17", "type": "Communications", "orbit": {"name": "Low Earth Orbit"}},
                    "image": "https://example.test/images/falcon_9_image.jpg",
                    "vid_urls": [
                        {"url": "https://www.youtube.com/watch?v=abc123&feature=share"},
                        {"url": "https://x.com/SpaceX/status/1"},
                        {"url": "https://youtu.be/def456"}
                    ]
                },
                {
                    "id": "b2",
                    "name": "Falcon 9 Block 5 | Transporter 15",
                    "net": "2025-11-28T18:44:00Z",
                    "status": {"id": 4, "name": "Launch Failure"},
                    "pad": {
                        "name": "Space Launch Complex 4E",
                        "latitude": null,
                        "longitude": "-120.611",
                        "location": {"name": "Vandenberg SFB, CA, USA"}
                    },
                    "rocket": {"configuration": {"name": "Falcon 9", "variant": "", "family": "Falcon"}},
                    "mission": null,
                    "image": null,
                    "mission_patches": [{"image_url": "https://example.test/transporter_patch.png"}],
                    "vid_urls": []
                }
            ]
        }"#
    }

    fn parsed() -> Vec<RawLaunch> {
        let payload: LaunchListResponse =
            serde_json::from_str(sample_response()).expect("response should deserialize");
        payload.results
    }

    #[test]
    fn test_success_follows_status_code() {
        let records: Vec<_> = parsed().into_iter().map(transform_launch).collect();
        assert!(records[0].success);
        assert!(!records[1].success);
    }

    #[test]
    fn test_string_coordinates_are_parsed() {
        let record = transform_launch(parsed().remove(0));
        assert!((record.launchpad.latitude - 28.56194122).abs() < 1e-9);
        assert!((record.launchpad.longitude + 80.57735736).abs() < 1e-9);
        assert!(record.has_valid_coordinates());
        assert_eq!(record.launchpad.region, "Cape Canaveral SFS, FL, USA");
    }

    #[test]
    fn test_null_coordinate_is_unmappable() {
        let record = transform_launch(parsed().remove(1));
        assert!(record.launchpad.latitude.is_nan());
        assert!(!record.has_valid_coordinates());
    }

    #[test]
    fn test_media_links() {
        let record = transform_launch(parsed().remove(0));
        assert_eq!(record.links.youtube_ids, vec!["abc123", "def456"]);
        assert_eq!(
            record.links.webcast.as_deref(),
            Some("https://www.youtube.com/watch?v=abc123&feature=share")
        );
        assert_eq!(record.links.flickr.original.len(), 1);
        assert_eq!(
            record.links.patch.small.as_deref(),
            Some("https://example.test/images/falcon_9_image.jpg")
        );
    }

    #[test]
    fn test_patch_falls_back_to_mission_patches() {
        let record = transform_launch(parsed().remove(1));
        assert_eq!(
            record.links.patch.small.as_deref(),
            Some("https://example.test/transporter_patch.png")
        );
        assert!(record.links.flickr.original.is_empty());
        assert!(record.links.webcast.is_none());
    }

    #[test]
    fn test_rocket_kind_prefers_variant_then_family() {
        let records: Vec<_> = parsed().into_iter().map(transform_launch).collect();
        assert_eq!(records[0].rocket.kind, "Block 5");
        assert_eq!(records[1].rocket.kind, "Falcon");
    }

    #[test]
    fn test_payloads_from_mission() {
        let records: Vec<_> = parsed().into_iter().map(transform_launch).collect();
        assert_eq!(records[0].payloads.len(), 1);
        assert_eq!(records[0].payloads[0].id, "7012");
        assert_eq!(records[0].payloads[0].orbit, "Low Earth Orbit");
        assert!(records[1].payloads.is_empty());
    }

    #[test]
    fn test_date_unix_is_seconds() {
        let record = transform_launch(parsed().remove(0));
        assert_eq!(record.date_unix, record.date_utc.timestamp());
    }

    #[test]
    fn test_malformed_body_is_a_json_error() {
        let err = parse_launch_list(r#"{"results": [{"id": 1"#).expect_err("truncated body");
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_null_names_and_lists_are_tolerated() {
        let payload = parse_launch_list(
            r#"{"results": [{
                "id": "x",
                "name": "Falcon 9 | Bandwagon-4",
                "net": "2025-11-02T22:09:00Z",
                "status": {"id": 3},
                "pad": {"name": null, "latitude": "28.6", "longitude": "-80.6", "location": null},
                "rocket": {"configuration": {"name": null, "family": "Falcon"}},
                "mission": {"name": null, "type": "Dedicated Rideshare"},
                "mission_patches": null,
                "vid_urls": null
            }]}"#,
        )
        .expect("lenient parse");

        let record = transform_launch(payload.results.into_iter().next().expect("one launch"));
        assert_eq!(record.launchpad.name, "");
        assert_eq!(record.launchpad.region, "");
        assert_eq!(record.rocket.name, "");
        assert_eq!(record.rocket.kind, "Falcon");
        assert_eq!(record.payloads[0].name, "");
        assert_eq!(record.payloads[0].kind, "Dedicated Rideshare");
        assert!(record.links.youtube_ids.is_empty());
        assert!(record.links.patch.small.is_none());
    }
}
