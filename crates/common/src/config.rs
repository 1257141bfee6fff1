//! Application configuration types.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote launch API parameters.
    #[serde(default)]
    pub api: ApiConfig,

    /// Launch cache parameters.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Trajectory animation parameters.
    #[serde(default)]
    pub animation: AnimationConfig,

    /// Mission metadata and patch lookup parameters.
    #[serde(default)]
    pub metadata: MetadataConfig,

    /// Offline enrichment tool parameters.
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
}

/// Remote launch API (The Space Devs).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Launch service provider filter (`lsp__name`).
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Number of most-recent launches to request.
    #[serde(default = "default_limit")]
    pub limit: u32,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout. Zero leaves the client default in place.
    #[serde(default)]
    pub timeout_secs: u64,
}

/// Persisted launch cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// JSON file backing the cache store.
    #[serde(default = "default_cache_path")]
    pub path: String,

    /// Freshness window (seconds).
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

/// Trajectory animation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Seconds for a marker to travel the full arc at speed 1.
    #[serde(default = "default_duration")]
    pub duration_secs: f64,

    /// Speed multiplier, 1..=8.
    #[serde(default = "default_speed")]
    pub speed: u8,

    /// Peak arc altitude in globe radii.
    #[serde(default = "default_arc_altitude")]
    pub arc_altitude: f64,

    /// Look-ahead step used to derive the marker heading.
    #[serde(default = "default_look_ahead")]
    pub look_ahead: f64,

    /// Frame interval for the terminal simulation (milliseconds).
    #[serde(default = "default_frame_interval")]
    pub frame_interval_ms: u64,
}

/// Mission metadata lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// Base URL patch file names are resolved against.
    #[serde(default = "default_patch_base_url")]
    pub patch_base_url: String,

    /// Rocket-variant prefixes stripped to obtain the clean name.
    #[serde(default = "default_name_prefixes")]
    pub name_prefixes: Vec<String>,

    /// An API image counts as a patch if its URL contains one of these
    /// (case-insensitive) ...
    #[serde(default = "default_patch_keywords")]
    pub patch_keywords: Vec<String>,

    /// ... and none of these (case-sensitive).
    #[serde(default = "default_non_patch_keywords")]
    pub non_patch_keywords: Vec<String>,
}

/// Offline enrichment tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Google Custom Search API key.
    #[serde(default)]
    pub google_api_key: String,

    /// Google Programmable Search Engine id (`cx`).
    #[serde(default)]
    pub search_engine_id: String,

    /// Launches to pull when building search batches.
    #[serde(default = "default_enrichment_limit")]
    pub launch_limit: u32,

    /// Delay between image search calls (milliseconds).
    #[serde(default = "default_search_delay")]
    pub search_delay_ms: u64,

    /// Delay between CDN probe batches (milliseconds).
    #[serde(default = "default_probe_delay")]
    pub probe_delay_ms: u64,

    /// Timeout for a single HEAD probe (seconds).
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,

    /// CDN directory probed for trajectory images.
    #[serde(default = "default_cdn_base_url")]
    pub cdn_base_url: String,

    /// Image hosts ranked ahead of everything else.
    #[serde(default = "default_preferred_domains")]
    pub preferred_domains: Vec<String>,

    /// Website values that are placeholders rather than real mission pages.
    #[serde(default = "default_ignored_websites")]
    pub ignored_websites: Vec<String>,
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_base_url() -> String {
    "https://ll.thespacedevs.com/2.2.0".into()
}
fn default_provider() -> String {
    "SpaceX".into()
}
fn default_limit() -> u32 {
    20
}
fn default_user_agent() -> String {
    "launch-globe/0.1".into()
}

fn default_cache_path() -> String {
    ".cache/launches.json".into()
}
fn default_cache_ttl() -> u64 {
    600
}

fn default_duration() -> f64 {
    180.0
}
fn default_speed() -> u8 {
    1
}
fn default_arc_altitude() -> f64 {
    0.5
}
fn default_look_ahead() -> f64 {
    0.01
}
fn default_frame_interval() -> u64 {
    1000
}

fn default_patch_base_url() -> String {
    "https://www.elonx.net/wp-content/uploads".into()
}
fn default_name_prefixes() -> Vec<String> {
    vec![
        "Falcon 9 Block 5 | ".into(),
        "Falcon 9 | ".into(),
        "Falcon Heavy | ".into(),
        "Starship | ".into(),
    ]
}

fn default_enrichment_limit() -> u32 {
    50
}
fn default_search_delay() -> u64 {
    1000
}
fn default_probe_delay() -> u64 {
    500
}
fn default_probe_timeout() -> u64 {
    5
}
fn default_cdn_base_url() -> String {
    "https://sxcontent9668.azureedge.us/cms-assets/assets".into()
}
fn default_preferred_domains() -> Vec<String> {
    vec!["sxcontent".into(), "spacex.com".into()]
}
fn default_patch_keywords() -> Vec<String> {
    vec!["patch".into(), "mission_patch".into(), "mission-patch".into()]
}
fn default_non_patch_keywords() -> Vec<String> {
    vec!["falcon".into(), "rocket".into(), "slc_image".into()]
}
fn default_ignored_websites() -> Vec<String> {
    vec!["https://spacexpatchlist.space".into()]
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            provider: default_provider(),
            limit: default_limit(),
            user_agent: default_user_agent(),
            timeout_secs: 0,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
            ttl_secs: default_cache_ttl(),
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration_secs: default_duration(),
            speed: default_speed(),
            arc_altitude: default_arc_altitude(),
            look_ahead: default_look_ahead(),
            frame_interval_ms: default_frame_interval(),
        }
    }
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            patch_base_url: default_patch_base_url(),
            name_prefixes: default_name_prefixes(),
            patch_keywords: default_patch_keywords(),
            non_patch_keywords: default_non_patch_keywords(),
        }
    }
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            google_api_key: String::new(),
            search_engine_id: String::new(),
            launch_limit: default_enrichment_limit(),
            search_delay_ms: default_search_delay(),
            probe_delay_ms: default_probe_delay(),
            probe_timeout_secs: default_probe_timeout(),
            cdn_base_url: default_cdn_base_url(),
            preferred_domains: default_preferred_domains(),
            ignored_websites: default_ignored_websites(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_section_uses_defaults() {
        let cfg: AppConfig = serde_json::from_str(r#"{"cache": {}}"#).expect("parses");
        assert_eq!(cfg.cache.ttl_secs, 600);
        assert_eq!(cfg.api.provider, "SpaceX");
        assert_eq!(cfg.metadata.name_prefixes.len(), 4);
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let cfg: AppConfig =
            serde_json::from_str(r#"{"animation": {"speed": 4}}"#).expect("parses");
        assert_eq!(cfg.animation.speed, 4);
        assert!((cfg.animation.duration_secs - 180.0).abs() < f64::EPSILON);
    }
}
