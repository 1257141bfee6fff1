//! The static mission metadata table.
//!
//! Stored as a JSON array so insertion order survives a round trip; the
//! containment fallback in the resolver depends on that order.

use std::collections::HashMap;

use common::{Error, MissionMetadata};
use serde::{Deserialize, Serialize};

const BUNDLED_MISSIONS: &str = include_str!("../data/missions.json");

/// One row of the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionEntry {
    /// Clean mission name.
    pub name: String,
    #[serde(flatten)]
    pub metadata: MissionMetadata,
}

/// Ordered mission table with an exact-name index.
#[derive(Debug, Clone, Default)]
pub struct MissionTable {
    entries: Vec<MissionEntry>,
    index: HashMap<String, usize>,
}

impl MissionTable {
    /// The table shipped with the crate.
    pub fn bundled() -> Result<Self, Error> {
        Self::from_json(BUNDLED_MISSIONS)
    }

    pub fn from_json(raw: &str) -> Result<Self, Error> {
        let entries: Vec<MissionEntry> = serde_json::from_str(raw)?;
        Ok(Self::from_entries(entries))
    }

    /// Later duplicates overwrite earlier ones in place.
    pub fn from_entries(entries: impl IntoIterator<Item = MissionEntry>) -> Self {
        let mut table = Self::default();
        for entry in entries {
            table.upsert(entry.name, entry.metadata);
        }
        table
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

    pub fn get(&self, name: &str) -> Option<&MissionMetadata> {
        self.index.get(name).map(|&i| &self.entries[i].metadata)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut MissionMetadata> {
        let i = *self.index.get(name)?;
        Some(&mut self.entries[i].metadata)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &MissionEntry> {
        self.entries.iter()
    }

    /// Insert a new entry at the end, or replace an existing one in place.
    pub fn upsert(&mut self, name: String, metadata: MissionMetadata) {
        match self.index.get(&name) {
            Some(&i) => self.entries[i].metadata = metadata,
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push(MissionEntry { name, metadata });
            }
        }
    }
}
