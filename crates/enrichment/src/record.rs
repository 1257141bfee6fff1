//! Enrichment result records and their JSON files.

use std::fs;
use std::path::Path;

use common::Error;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::probe::trajectory_label_query;
use crate::search::{manual_search_url, ImageCandidate};

/// One mission's search or probe result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentRecord {
    pub mission_name: String,
    pub clean_name: String,
    pub search_query: String,
    pub search_url: String,
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_width: Option<u32>,
    #[serde(default)]
    pub image_height: Option<u32>,
    #[serde(default)]
    pub image_size: Option<u64>,
    #[serde(rename = "isSpaceXCDN", default)]
    pub is_spacex_cdn: bool,
    #[serde(default)]
    pub all_images: Vec<ImageCandidate>,
}

impl EnrichmentRecord {
    /// Record from ranked search results; the first image is the pick.
    pub fn from_search(
        mission_name: &str,
        clean_name: &str,
        search_query: String,
        search_url: String,
        ranked: Vec<ImageCandidate>,
    ) -> Self {
        let best = ranked.first();
        Self {
            mission_name: mission_name.to_string(),
            clean_name: clean_name.to_string(),
            search_query,
            search_url,
            image_url: best.map(|i| i.url.clone()),
            image_width: best.and_then(|i| i.width),
            image_height: best.and_then(|i| i.height),
            image_size: best.and_then(|i| i.size),
            is_spacex_cdn: best.is_some_and(|i| i.is_spacex_cdn),
            all_images: ranked,
        }
    }

    /// Trajectory record for a known (or missing) image URL.
    pub fn trajectory(mission_name: &str, clean_name: &str, image_url: Option<String>, is_cdn: bool) -> Self {
        let search_query = trajectory_label_query(clean_name);
        Self {
            mission_name: mission_name.to_string(),
            clean_name: clean_name.to_string(),
            search_url: manual_search_url(&search_query),
            search_query,
            image_url,
            image_width: None,
            image_height: None,
            image_size: None,
            is_spacex_cdn: is_cdn,
            all_images: Vec::new(),
        }
    }
}

pub fn read_records(path: &Path) -> Result<Vec<EnrichmentRecord>, Error> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Pretty-printed JSON array.
pub fn write_records(path: &Path, records: &[EnrichmentRecord]) -> Result<(), Error> {
    write_json(path, &serde_json::to_string_pretty(records)?)?;
    let found = records.iter().filter(|r| r.image_url.is_some()).count();
    info!(
        "Wrote {} records to {} ({} with images, {} need manual search)",
        records.len(),
        path.display(),
        found,
        records.len() - found
    );
    Ok(())
}

/// Write `contents` to `path`, creating parent directories.
pub fn write_json(path: &Path, contents: &str) -> Result<(), Error> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}
