//! Mission name → metadata resolution.
//!
//! Matching order, first hit wins:
//! 1. exact lookup of the clean name
//! 2. case-insensitive containment in either direction, table order
//! 3. `Starlink Group <a>-<b>` and `NROL-<n>` normalized keys
//!
//! Containment is a heuristic: when several keys overlap the query, the
//! earliest table entry wins.

use common::media::youtube_id;
use common::{Error, MissionMetadata};
use tracing::debug;

use crate::names::{code_number, starlink_group, NameCleaner};
use crate::table::MissionTable;

#[derive(Debug, Clone)]
pub struct MetadataResolver {
    table: MissionTable,
    cleaner: NameCleaner,
}

impl MetadataResolver {
    pub fn new(table: MissionTable, cleaner: NameCleaner) -> Self {
        Self { table, cleaner }
    }

    /// Resolver over the bundled table with the default prefixes.
    pub fn bundled() -> Result<Self, Error> {
        Ok(Self::new(MissionTable::bundled()?, NameCleaner::default()))
    }

    pub fn table(&self) -> &MissionTable {
        &self.table
    }

    pub fn clean_name(&self, mission_name: &str) -> String {
        self.cleaner.clean(mission_name)
    }

    /// Metadata for a launch name. Misses come back with every field `None`.
    pub fn resolve(&self, mission_name: &str) -> MissionMetadata {
        if mission_name.trim().is_empty() {
            return MissionMetadata::default();
        }
        let clean = self.cleaner.clean(mission_name);
        match self.lookup(&clean) {
            Some(metadata) => metadata.clone(),
            None => {
                debug!("No mission metadata for {:?}", clean);
                MissionMetadata::default()
            }
        }
    }

    pub fn video_id(&self, mission_name: &str) -> Option<String> {
        let metadata = self.resolve(mission_name);
        metadata
            .video_url
            .as_deref()
            .and_then(youtube_id)
            .map(str::to_string)
    }

    pub fn trajectory_image(&self, mission_name: &str) -> Option<String> {
        self.resolve(mission_name).trajectory_image
    }

    pub fn official_website(&self, mission_name: &str) -> Option<String> {
        self.resolve(mission_name).official_website
    }

    /// An empty clean name skips containment, which would otherwise match
    /// the first table entry, so it resolves to nothing.
    fn lookup(&self, clean: &str) -> Option<&MissionMetadata> {
        if let Some(hit) = self.table.get(clean) {
            return Some(hit);
        }

        let clean_lower = clean.to_lowercase();
        if !clean_lower.is_empty() {
            let hit = self.table.iter().find(|entry| {
                let key_lower = entry.name.to_lowercase();
                clean_lower.contains(&key_lower) || key_lower.contains(&clean_lower)
            });
            if let Some(entry) = hit {
                debug!("Matched {:?} to {:?} by containment", clean, entry.name);
                return Some(&entry.metadata);
            }
        }

        if let Some((group, batch)) = starlink_group(clean) {
            if let Some(hit) = self.table.get(&format!("Starlink Group {group}-{batch}")) {
                return Some(hit);
            }
        }

        if let Some(number) = code_number(clean, "nrol") {
            if let Some(hit) = self.table.get(&format!("NROL-{number}")) {
                return Some(hit);
            }
        }

        None
    }
}
