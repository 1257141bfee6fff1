//! Curated mission CSV.
//!
//! Columns, by position: mission name, patch URL, image URL, video URL,
//! official website, trajectory image. The header row is skipped and its
//! labels are not checked. Rows with fewer than six columns are dropped.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use common::Error;
use mission_meta::NameCleaner;
use tracing::{debug, info};

use crate::record::EnrichmentRecord;

const COLUMNS: usize = 6;
const CDN_HOST: &str = "sxcontent9668.azureedge.us";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CuratedMission {
    pub name: String,
    pub patch: String,
    pub image: String,
    pub video: String,
    pub website: String,
    pub trajectory: String,
}

pub fn parse_curated<R: Read>(reader: R) -> Result<Vec<CuratedMission>, Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut missions = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| Error::Csv(format!("row {}: {e}", line + 2)))?;
        if record.len() < COLUMNS || record.iter().all(str::is_empty) {
            debug!("Skipping short CSV row {}", line + 2);
            continue;
        }
        let field = |i: usize| record.get(i).unwrap_or_default().to_string();
        missions.push(CuratedMission {
            name: field(0),
            patch: field(1),
            image: field(2),
            video: field(3),
            website: field(4),
            trajectory: field(5),
        });
    }
    Ok(missions)
}

pub fn load_curated(path: &Path) -> Result<Vec<CuratedMission>, Error> {
    let missions = parse_curated(File::open(path)?)?;
    info!("Loaded {} curated missions from {}", missions.len(), path.display());
    Ok(missions)
}

/// Trajectory records for every curated row, image or not.
pub fn trajectory_records(missions: &[CuratedMission], cleaner: &NameCleaner) -> Vec<EnrichmentRecord> {
    missions
        .iter()
        .map(|mission| {
            let clean = cleaner.clean(&mission.name);
            let image = (!mission.trajectory.is_empty()).then(|| mission.trajectory.clone());
            EnrichmentRecord::trajectory(
                &mission.name,
                &clean,
                image,
                mission.trajectory.contains(CDN_HOST),
            )
        })
        .collect()
}

/// Filters placeholder and asset URLs out of the website column.
#[derive(Debug, Clone)]
pub struct WebsiteFilter {
    ignored: Vec<String>,
}

impl WebsiteFilter {
    pub fn new(ignored: Vec<String>) -> Self {
        Self { ignored }
    }

    /// The website if it looks like a real mission page.
    pub fn accept<'a>(&self, website: &'a str) -> Option<&'a str> {
        let website = website.trim();
        let rejected = website.is_empty()
            || self.ignored.iter().any(|i| i == website)
            || website.contains(CDN_HOST)
            || website.contains(".webp");
        (!rejected).then_some(website)
    }
}

impl Default for WebsiteFilter {
    fn default() -> Self {
        Self::new(common::config::EnrichmentConfig::default().ignored_websites)
    }
}

/// Of two websites for the same mission, keep the spacex.com one; otherwise
/// keep the first.
pub fn prefer_website<'a>(current: &'a str, candidate: &'a str) -> &'a str {
    if !current.contains("spacex.com") && candidate.contains("spacex.com") {
        candidate
    } else {
        current
    }
}
