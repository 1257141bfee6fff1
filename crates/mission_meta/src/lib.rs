//! Mission metadata and patch lookup.
//!
//! Maps a free-text launch name to supplementary data (video, trajectory
//! image, official website, patch image) using static tables and a chain of
//! best-effort matching heuristics.

pub mod names;
pub mod patches;
pub mod resolver;
pub mod table;

pub use names::NameCleaner;
pub use patches::{PatchEntry, PatchInfo, PatchPredicates, PatchResolver, PatchTable, StarlinkColors};
pub use resolver::MetadataResolver;
pub use table::{MissionEntry, MissionTable};
