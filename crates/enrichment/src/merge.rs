//! Folding enrichment results back into the static tables.

use std::collections::HashMap;
use std::path::Path;

use common::{Error, MissionMetadata};
use mission_meta::{MissionTable, NameCleaner, PatchTable};
use tracing::{debug, info};

use crate::curated::{prefer_website, CuratedMission, WebsiteFilter};
use crate::record::{write_json, EnrichmentRecord};

/// What a merge changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub updated: usize,
    pub added: usize,
    /// Clean names with usable data but no table entry to attach it to.
    pub unmatched: Vec<String>,
}

/// Set `officialWebsite` on existing mission entries from curated rows.
///
/// Only exact clean-name matches are updated. When several rows name the
/// same mission, a spacex.com page wins over other hosts.
pub fn merge_websites(
    table: &mut MissionTable,
    missions: &[CuratedMission],
    cleaner: &NameCleaner,
    filter: &WebsiteFilter,
) -> MergeReport {
    let mut chosen: Vec<(String, String)> = Vec::new();
    let mut slot: HashMap<String, usize> = HashMap::new();

    for mission in missions {
        let Some(website) = filter.accept(&mission.website) else {
            continue;
        };
        let clean = cleaner.clean(&mission.name);
        match slot.get(&clean) {
            Some(&i) => {
                let kept = prefer_website(&chosen[i].1, website).to_string();
                chosen[i].1 = kept;
            }
            None => {
                slot.insert(clean.clone(), chosen.len());
                chosen.push((clean, website.to_string()));
            }
        }
    }

    let mut report = MergeReport::default();
    for (clean, website) in chosen {
        match table.get_mut(&clean) {
            Some(metadata) => {
                if metadata.official_website.as_deref() != Some(website.as_str()) {
                    debug!("Website for {}: {}", clean, website);
                    metadata.official_website = Some(website);
                    report.updated += 1;
                }
            }
            None => report.unmatched.push(clean),
        }
    }
    info!(
        "Website merge: {} updated, {} unmatched",
        report.updated,
        report.unmatched.len()
    );
    report
}

/// Set `trajectoryImage` from records that found an image, adding entries
/// for missions the table does not know yet.
pub fn merge_trajectories(table: &mut MissionTable, records: &[EnrichmentRecord]) -> MergeReport {
    let mut report = MergeReport::default();
    for record in records {
        let Some(url) = record.image_url.as_ref() else {
            continue;
        };
        match table.get_mut(&record.clean_name) {
            Some(metadata) => {
                if metadata.trajectory_image.as_ref() != Some(url) {
                    metadata.trajectory_image = Some(url.clone());
                    report.updated += 1;
                }
            }
            None => {
                table.upsert(
                    record.clean_name.clone(),
                    MissionMetadata {
                        trajectory_image: Some(url.clone()),
                        ..Default::default()
                    },
                );
                report.added += 1;
            }
        }
    }
    info!(
        "Trajectory merge: {} updated, {} added",
        report.updated, report.added
    );
    report
}

/// Add patch image URLs from search records. Existing entries are replaced.
pub fn merge_patches(table: &mut PatchTable, records: &[EnrichmentRecord]) -> MergeReport {
    let mut report = MergeReport::default();
    for record in records {
        let Some(url) = record.image_url.as_ref() else {
            continue;
        };
        match table.get(&record.clean_name) {
            Some(existing) if existing == url.as_str() => continue,
            Some(_) => report.updated += 1,
            None => report.added += 1,
        }
        table.upsert(record.clean_name.clone(), url.clone());
    }
    info!(
        "Patch merge: {} updated, {} added",
        report.updated, report.added
    );
    report
}

pub fn load_mission_table(path: &Path) -> Result<MissionTable, Error> {
    MissionTable::from_json(&std::fs::read_to_string(path)?)
}

pub fn save_mission_table(path: &Path, table: &MissionTable) -> Result<(), Error> {
    write_json(path, &table.to_json()?)
}

pub fn load_patch_table(path: &Path) -> Result<PatchTable, Error> {
    PatchTable::from_json(&std::fs::read_to_string(path)?)
}

pub fn save_patch_table(path: &Path, table: &PatchTable) -> Result<(), Error> {
    write_json(path, &table.to_json()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curated(name: &str, website: &str) -> CuratedMission {
        CuratedMission {
            name: name.into(),
            website: website.into(),
            ..Default::default()
        }
    }

    fn table() -> MissionTable {
        MissionTable::from_json(
            r#"[
                {"name": "CRS-31", "trajectoryImage": "https://cdn.test/crs31.webp"},
                {"name": "Flight 11", "officialWebsite": "https://old.test/flight-11"}
            ]"#,
        )
        .expect("parses")
    }

    fn found(clean: &str, url: Option<&str>) -> EnrichmentRecord {
        EnrichmentRecord::trajectory(clean, clean, url.map(str::to_string), false)
    }

    #[test]
    fn test_merge_websites_exact_only() {
        let mut table = table();
        let report = merge_websites(
            &mut table,
            &[
                curated("Falcon 9 | CRS-31", "https://www.spacex.com/launches/crs-31"),
                curated("Falcon 9 | Unknown Mission", "https://www.spacex.com/launches/unknown"),
                curated("Falcon 9 | CRS-31 extra", ""),
            ],
            &NameCleaner::default(),
            &WebsiteFilter::default(),
        );

        assert_eq!(report.updated, 1);
        assert_eq!(report.unmatched, vec!["Unknown Mission".to_string()]);
        assert_eq!(
            table.get("CRS-31").and_then(|m| m.official_website.as_deref()),
            Some("https://www.spacex.com/launches/crs-31")
        );
        // Existing fields survive.
        assert!(table.get("CRS-31").and_then(|m| m.trajectory_image.as_ref()).is_some());
    }

    #[test]
    fn test_merge_websites_collision_prefers_spacex() {
        let mut table = table();
        merge_websites(
            &mut table,
            &[
                curated("Starship | Flight 11", "https://www.nasa.gov/flight-11"),
                curated("Starship | Flight 11", "https://www.spacex.com/launches/starship-flight-11"),
                curated("Starship | Flight 11", "https://esa.test/flight-11"),
            ],
            &NameCleaner::default(),
            &WebsiteFilter::default(),
        );
        assert_eq!(
            table.get("Flight 11").and_then(|m| m.official_website.as_deref()),
            Some("https://www.spacex.com/launches/starship-flight-11")
        );
    }

    #[test]
    fn test_merge_trajectories_updates_and_adds() {
        let mut table = table();
        let report = merge_trajectories(
            &mut table,
            &[
                found("CRS-31", Some("https://cdn.test/F9_CRS_31.webp")),
                found("Bandwagon-4", Some("https://cdn.test/BANDWAGON_4.webp")),
                found("Nothing", None),
            ],
        );

        assert_eq!(report.updated, 1);
        assert_eq!(report.added, 1);
        assert_eq!(table.len(), 3);
        assert_eq!(table.iter().last().map(|e| e.name.as_str()), Some("Bandwagon-4"));
    }

    #[test]
    fn test_merge_patches_and_save() {
        let mut patches = PatchTable::from_json(r#"[{"name": "CRS-31", "file": "CRS-31.png"}]"#)
            .expect("parses");
        let report = merge_patches(
            &mut patches,
            &[
                found("CRS-31", Some("CRS-31.png")),
                found("Ax-9", Some("https://images.test/ax9.png")),
            ],
        );
        assert_eq!(report, MergeReport { updated: 0, added: 1, unmatched: vec![] });

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("patches.json");
        save_patch_table(&path, &patches).expect("save");
        let again = load_patch_table(&path).expect("load");
        assert_eq!(again.get("Ax-9"), Some("https://images.test/ax9.png"));
        assert_eq!(again.len(), 2);
    }

    #[test]
    fn test_mission_table_file_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missions.json");
        save_mission_table(&path, &table()).expect("save");
        let again = load_mission_table(&path).expect("load");
        assert_eq!(again.len(), 2);
        assert!(again.get("Flight 11").is_some());
    }
}
