//! Offline data enrichment for the mission tables.
//!
//! Searches and probes for patch and trajectory images, imports the curated
//! mission CSV, and merges the results into the JSON tables shipped with
//! `mission_meta`.

pub mod curated;
pub mod merge;
pub mod probe;
pub mod rank;
pub mod record;
pub mod runner;
pub mod search;

pub use curated::{load_curated, parse_curated, trajectory_records, CuratedMission, WebsiteFilter};
pub use merge::{
    load_mission_table, load_patch_table, merge_patches, merge_trajectories, merge_websites,
    save_mission_table, save_patch_table, MergeReport,
};
pub use probe::{cdn_candidates, patch_query, trajectory_query, HttpProbe, UrlProbe};
pub use rank::{rank_images, ImageRanking};
pub use record::{read_records, write_records, EnrichmentRecord};
pub use runner::Enricher;
pub use search::{CustomSearchClient, ImageCandidate, ImageSearch, SearchOutcome};
