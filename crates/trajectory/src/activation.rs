//! Per-launch activation timestamps.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::debug;

/// Remembers when each selected launch started animating.
///
/// A launch keeps its timestamp while it stays selected. Deselecting drops
/// it, so selecting it again restarts the animation from the beginning.
#[derive(Debug, Clone, Default)]
pub struct ActivationTracker {
    started: HashMap<String, DateTime<Utc>>,
}

impl ActivationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sync<'a>(&mut self, selected: impl IntoIterator<Item = &'a str>, now: DateTime<Utc>) {
        let selected: HashSet<&str> = selected.into_iter().collect();

        self.started.retain(|id, _| selected.contains(id.as_str()));

        for id in selected {
            if !self.started.contains_key(id) {
                debug!("Activating trajectory for {}", id);
                self.started.insert(id.to_string(), now);
            }
        }
    }

    pub fn activated_at(&self, id: &str) -> Option<DateTime<Utc>> {
        self.started.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.started.len()
    }

    pub fn is_empty(&self) -> bool {
        self.started.is_empty()
    }
}
