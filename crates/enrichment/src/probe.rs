//! Search queries and CDN URL probing.

use std::time::Duration;

use async_trait::async_trait;
use common::config::EnrichmentConfig;
use common::Error;
use tracing::debug;

pub fn patch_query(clean_name: &str) -> String {
    format!("SpaceX {clean_name} mission patch")
}

pub fn trajectory_query(clean_name: &str) -> String {
    format!("SpaceX {clean_name} trajectory flight path")
}

/// Query used for records that were not searched (CSV import, CDN probe).
pub fn trajectory_label_query(clean_name: &str) -> String {
    format!("SpaceX {clean_name} trajectory")
}

/// `"Starlink Group 10-17"` -> `"STARLINK_GROUP_10_17"`.
pub fn cdn_file_stem(clean_name: &str) -> String {
    let mut stem = String::with_capacity(clean_name.len());
    for c in clean_name.chars() {
        let c = if c.is_ascii_alphanumeric() { c } else { '_' };
        if c == '_' && stem.ends_with('_') {
            continue;
        }
        stem.push(c.to_ascii_uppercase());
    }
    stem
}

/// Guessed CDN asset URLs for a mission, most specific first.
pub fn cdn_candidates(base_url: &str, clean_name: &str) -> Vec<String> {
    let base = base_url.trim_end_matches('/');
    let f = cdn_file_stem(clean_name);
    [
        format!("F9_{f}_DESKTOP"),
        format!("F9_{f}_TRAJECTORY"),
        format!("F9_{f}"),
        format!("{f}_DESKTOP"),
        format!("{f}_TRAJECTORY"),
    ]
    .into_iter()
    .map(|pattern| format!("{base}/{pattern}.webp"))
    .collect()
}

/// Checks whether a URL resolves.
#[async_trait]
pub trait UrlProbe: Send + Sync {
    async fn exists(&self, url: &str) -> bool;
}

/// HEAD request; only a 200 counts.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new(config: &EnrichmentConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.probe_timeout_secs))
            .build()
            .map_err(|e| Error::Http(format!("failed to build probe client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl UrlProbe for HttpProbe {
    async fn exists(&self, url: &str) -> bool {
        match self.client.head(url).send().await {
            Ok(resp) => resp.status().as_u16() == 200,
            Err(e) => {
                debug!("Probe failed for {}: {}", url, e);
                false
            }
        }
    }
}

/// First candidate the probe accepts.
pub async fn first_existing<P: UrlProbe + ?Sized>(probe: &P, candidates: &[String]) -> Option<String> {
    for url in candidates {
        if probe.exists(url).await {
            return Some(url.clone());
        }
    }
    None
}
