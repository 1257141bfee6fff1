//! Sequential enrichment runs over a launch list.
//!
//! Every external call is awaited one at a time with a fixed pause between
//! missions, so a run of 50 launches stays well under API quotas.

use std::time::Duration;

use common::config::{EnrichmentConfig, MetadataConfig};
use common::LaunchRecord;
use mission_meta::{NameCleaner, PatchPredicates};
use tracing::{info, warn};

use crate::probe::{cdn_candidates, first_existing, patch_query, trajectory_query, UrlProbe};
use crate::rank::{rank_images, ImageRanking};
use crate::record::EnrichmentRecord;
use crate::search::{manual_search_url, ImageSearch};

pub struct Enricher<S, P> {
    search: S,
    probe: P,
    cleaner: NameCleaner,
    predicates: PatchPredicates,
    ranking: ImageRanking,
    cdn_base_url: String,
    search_delay: Duration,
    probe_delay: Duration,
}

impl<S: ImageSearch, P: UrlProbe> Enricher<S, P> {
    pub fn new(search: S, probe: P, metadata: &MetadataConfig, config: &EnrichmentConfig) -> Self {
        Self {
            search,
            probe,
            cleaner: NameCleaner::from_config(metadata),
            predicates: PatchPredicates::from_config(metadata),
            ranking: ImageRanking::from_config(config),
            cdn_base_url: config.cdn_base_url.clone(),
            search_delay: Duration::from_millis(config.search_delay_ms),
            probe_delay: Duration::from_millis(config.probe_delay_ms),
        }
    }

    /// Search patch images for launches whose API image is not a real patch.
    pub async fn search_patches(&self, launches: &[LaunchRecord]) -> Vec<EnrichmentRecord> {
        let missing: Vec<&LaunchRecord> = launches
            .iter()
            .filter(|launch| {
                !launch
                    .links
                    .patch
                    .small
                    .as_deref()
                    .is_some_and(|url| self.predicates.is_real_patch(url))
            })
            .collect();
        info!(
            "{} of {} launches have no usable patch",
            missing.len(),
            launches.len()
        );

        self.search_each(&missing, patch_query, &ImageRanking::by_size())
            .await
    }

    /// Search trajectory images for every launch, preferring the SpaceX CDN.
    pub async fn search_trajectories(&self, launches: &[LaunchRecord]) -> Vec<EnrichmentRecord> {
        let all: Vec<&LaunchRecord> = launches.iter().collect();
        self.search_each(&all, trajectory_query, &self.ranking).await
    }

    async fn search_each(
        &self,
        launches: &[&LaunchRecord],
        query_for: fn(&str) -> String,
        ranking: &ImageRanking,
    ) -> Vec<EnrichmentRecord> {
        let mut records = Vec::with_capacity(launches.len());

        for (i, launch) in launches.iter().enumerate() {
            let clean = self.cleaner.clean(&launch.name);
            let query = query_for(&clean);
            info!("[{}/{}] {}", i + 1, launches.len(), clean);

            let (search_url, images) = match self.search.search(&query).await {
                Ok(outcome) => (outcome.search_url, outcome.images),
                Err(e) => {
                    warn!("Image search failed for {}: {}", clean, e);
                    (manual_search_url(&query), Vec::new())
                }
            };

            records.push(EnrichmentRecord::from_search(
                &launch.name,
                &clean,
                query,
                search_url,
                rank_images(images, ranking),
            ));

            if self.search.is_remote() && i + 1 < launches.len() {
                tokio::time::sleep(self.search_delay).await;
            }
        }

        records
    }

    /// Probe guessed CDN URLs for each launch's trajectory image.
    pub async fn probe_trajectories(&self, launches: &[LaunchRecord]) -> Vec<EnrichmentRecord> {
        let mut records = Vec::with_capacity(launches.len());

        for (i, launch) in launches.iter().enumerate() {
            let clean = self.cleaner.clean(&launch.name);
            let candidates = cdn_candidates(&self.cdn_base_url, &clean);
            let found = first_existing(&self.probe, &candidates).await;

            match &found {
                Some(url) => info!("[{}/{}] {}: found {}", i + 1, launches.len(), clean, url),
                None => info!("[{}/{}] {}: no CDN image", i + 1, launches.len(), clean),
            }

            let is_cdn = found.is_some();
            records.push(EnrichmentRecord::trajectory(&launch.name, &clean, found, is_cdn));

            if i + 1 < launches.len() {
                tokio::time::sleep(self.probe_delay).await;
            }
        }

        records
    }
}
