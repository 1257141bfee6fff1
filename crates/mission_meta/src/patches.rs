//! Mission patch lookup.
//!
//! Patches come from two places: the image the launch API attaches to a
//! launch (often a rocket photo rather than a patch) and a static table of
//! patch files. Starlink batches share one generic badge tinted per group.

use std::collections::HashMap;

use common::config::MetadataConfig;
use common::{Error, LaunchRecord};
use serde::{Deserialize, Serialize};

use crate::names::{code_number, digit_runs, NameCleaner};

const BUNDLED_PATCHES: &str = include_str!("../data/patches.json");
const STARLINK_BADGE: &str = "Starlink.png";

/// Badge colors for a Starlink group, as CSS `hsl()` strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StarlinkColors {
    pub primary: String,
    pub secondary: String,
}

impl StarlinkColors {
    /// Hue from the sum of every number in the name, times 37.
    pub fn for_name(name: &str) -> Self {
        let seed: u64 = digit_runs(name)
            .map(|run| run.parse::<u64>().unwrap_or(0))
            .fold(0u64, u64::wrapping_add);
        if seed == 0 && digit_runs(name).next().is_none() {
            return Self {
                primary: "#3b82f6".into(),
                secondary: "#1d4ed8".into(),
            };
        }
        let hue = seed.wrapping_mul(37) % 360;
        Self {
            primary: format!("hsl({hue}, 70%, 60%)"),
            secondary: format!("hsl({hue}, 80%, 40%)"),
        }
    }
}

/// Result of a patch lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PatchInfo {
    pub url: Option<String>,
    pub is_starlink: bool,
    pub colors: Option<StarlinkColors>,
}

impl PatchInfo {
    fn table(url: String) -> Self {
        Self {
            url: Some(url),
            ..Default::default()
        }
    }
}

/// Decides whether an API-supplied image URL is really a mission patch.
///
/// Keyword lists are a best guess at the API's file naming, not a rule.
#[derive(Debug, Clone)]
pub struct PatchPredicates {
    include_any: Vec<String>,
    exclude_any: Vec<String>,
}

impl PatchPredicates {
    pub fn new(include_any: Vec<String>, exclude_any: Vec<String>) -> Self {
        Self {
            include_any: include_any.into_iter().map(|k| k.to_lowercase()).collect(),
            exclude_any,
        }
    }

    pub fn from_config(config: &MetadataConfig) -> Self {
        Self::new(config.patch_keywords.clone(), config.non_patch_keywords.clone())
    }

    pub fn is_real_patch(&self, url: &str) -> bool {
        let lower = url.to_lowercase();
        self.include_any.iter().any(|k| lower.contains(k.as_str()))
            && !self.exclude_any.iter().any(|k| url.contains(k.as_str()))
    }
}

impl Default for PatchPredicates {
    fn default() -> Self {
        Self::from_config(&MetadataConfig::default())
    }
}

/// One row of the patch table: a mission name and a file name or full URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchEntry {
    pub name: String,
    pub file: String,
}

/// Ordered patch table with an exact-name index.
#[derive(Debug, Clone, Default)]
pub struct PatchTable {
    entries: Vec<PatchEntry>,
    index: HashMap<String, usize>,
}

impl PatchTable {
    pub fn bundled() -> Result<Self, Error> {
        Self::from_json(BUNDLED_PATCHES)
    }

    pub fn from_json(raw: &str) -> Result<Self, Error> {
        let entries: Vec<PatchEntry> = serde_json::from_str(raw)?;
        let mut table = Self::default();
        for entry in entries {
            table.upsert(entry.name, entry.file);
        }
        Ok(table)
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.index.get(name).map(|&i| self.entries[i].file.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &PatchEntry> {
        self.entries.iter()
    }

    pub fn upsert(&mut self, name: String, file: String) {
        match self.index.get(&name) {
            Some(&i) => self.entries[i].file = file,
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push(PatchEntry { name, file });
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct PatchResolver {
    table: PatchTable,
    cleaner: NameCleaner,
    base_url: String,
    predicates: PatchPredicates,
}

impl PatchResolver {
    pub fn new(table: PatchTable, config: &MetadataConfig) -> Self {
        Self {
            table,
            cleaner: NameCleaner::from_config(config),
            base_url: config.patch_base_url.trim_end_matches('/').to_string(),
            predicates: PatchPredicates::from_config(config),
        }
    }

    pub fn bundled(config: &MetadataConfig) -> Result<Self, Error> {
        Ok(Self::new(PatchTable::bundled()?, config))
    }

    pub fn predicates(&self) -> &PatchPredicates {
        &self.predicates
    }

    fn url_for(&self, file: &str) -> String {
        if file.starts_with("http://") || file.starts_with("https://") {
            file.to_string()
        } else {
            format!("{}/{}", self.base_url, file)
        }
    }

    /// Patch for a launch name.
    pub fn patch_for(&self, mission_name: &str) -> PatchInfo {
        if mission_name.trim().is_empty() {
            return PatchInfo::default();
        }
        let clean = self.cleaner.clean(mission_name);
        let clean_lower = clean.to_lowercase();

        if clean_lower.contains("starlink group") || clean_lower.contains("starlink-") {
            return PatchInfo {
                url: Some(self.url_for(STARLINK_BADGE)),
                is_starlink: true,
                colors: Some(StarlinkColors::for_name(&clean)),
            };
        }

        if let Some(file) = self.table.get(&clean) {
            return PatchInfo::table(self.url_for(file));
        }

        if !clean_lower.is_empty() {
            let hit = self.table.iter().find(|entry| {
                let key_lower = entry.name.to_lowercase();
                clean_lower.contains(&key_lower) || key_lower.contains(&clean_lower)
            });
            if let Some(entry) = hit {
                return PatchInfo::table(self.url_for(&entry.file));
            }
        }

        if let Some(n) = code_number(&clean, "crs") {
            return PatchInfo::table(self.url_for(&format!("CRS-{n}.png")));
        }

        if let Some(n) = code_number(&clean, "crew") {
            return PatchInfo::table(self.url_for(&format!("Crew-{n}_SpaceX.png")));
        }

        if let Some(n) = code_number(&clean, "nrol") {
            let file = self
                .table
                .get(&format!("NROL-{n}"))
                .map(str::to_string)
                .unwrap_or_else(|| format!("NROL-{n}.png"));
            return PatchInfo::table(self.url_for(&file));
        }

        PatchInfo::default()
    }

    /// The API image, when it is a real patch.
    pub fn api_patch<'a>(&self, record: &'a LaunchRecord) -> Option<&'a str> {
        record
            .links
            .patch
            .small
            .as_deref()
            .filter(|url| self.predicates.is_real_patch(url))
    }

    /// Patch to show for a launch: a real API patch first, then the table.
    pub fn display_patch(&self, record: &LaunchRecord) -> Option<String> {
        self.api_patch(record)
            .map(str::to_string)
            .or_else(|| self.patch_for(&record.name).url)
    }

    /// Whether the launch list should flag this launch as having a patch.
    /// Starlink batches only have the generic badge, so they are never flagged.
    pub fn has_distinct_patch(&self, record: &LaunchRecord) -> bool {
        let info = self.patch_for(&record.name);
        !info.is_starlink && (self.api_patch(record).is_some() || info.url.is_some())
    }
}
