//! Launch data client.
//!
//! Serves the most recent launches with a time-boxed cache in front of the
//! remote API and two fallbacks behind it: the stale cache, then a static
//! list. [`LaunchClient::fetch_recent_launches`] never fails.

pub mod api;
pub mod cache;
pub mod fallback;

use std::time::Duration;

use common::{Error, LaunchRecord};
use tracing::{debug, info, warn};

pub use api::{
    format_reqwest_error, parse_launch_list, transform_launch, LaunchSource, RawLaunch,
    SpaceDevsApi, STATUS_SUCCESS,
};
pub use cache::{
    CacheStore, Clock, FileCacheStore, LaunchCache, ManualClock, MemoryCacheStore, SystemClock,
    DEFAULT_TTL,
};
pub use fallback::fallback_launches;

/// Where a launch list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOrigin {
    FreshCache,
    Network,
    StaleCache,
    Static,
}

impl LaunchOrigin {
    pub fn label(&self) -> &'static str {
        match self {
            Self::FreshCache => "cache",
            Self::Network => "network",
            Self::StaleCache => "stale cache",
            Self::Static => "static fallback",
        }
    }
}

/// A launch list plus where it was served from.
#[derive(Debug, Clone)]
pub struct LaunchBatch {
    pub launches: Vec<LaunchRecord>,
    pub origin: LaunchOrigin,
}

pub struct LaunchClient<L, S, C> {
    source: L,
    cache: LaunchCache<S, C>,
}

impl<L: LaunchSource, S: CacheStore, C: Clock> LaunchClient<L, S, C> {
    pub fn new(source: L, store: S, clock: C) -> Self {
        Self::with_ttl(source, store, clock, DEFAULT_TTL)
    }

    pub fn with_ttl(source: L, store: S, clock: C, ttl: Duration) -> Self {
        Self {
            source,
            cache: LaunchCache::new(store, clock, ttl),
        }
    }

    pub fn cache(&self) -> &LaunchCache<S, C> {
        &self.cache
    }

    pub fn source(&self) -> &L {
        &self.source
    }

    /// The `limit` most recent launches with mappable coordinates.
    pub async fn fetch_recent_launches(&self, limit: u32) -> Vec<LaunchRecord> {
        self.fetch_with_origin(limit).await.launches
    }

    /// Same as [`Self::fetch_recent_launches`], reporting the data origin.
    pub async fn fetch_with_origin(&self, limit: u32) -> LaunchBatch {
        match self.cache.load_fresh() {
            Ok(Some(launches)) => {
                debug!("Using cached launch data ({} launches)", launches.len());
                return LaunchBatch {
                    launches,
                    origin: LaunchOrigin::FreshCache,
                };
            }
            Ok(None) => {}
            Err(e) => warn!("Error reading launch cache: {}", e),
        }

        match self.fetch_from_source(limit).await {
            Ok(launches) => {
                info!("Fetched {} launches", launches.len());
                if let Err(e) = self.cache.save(&launches) {
                    warn!("Error saving launch cache: {}", e);
                }
                LaunchBatch {
                    launches,
                    origin: LaunchOrigin::Network,
                }
            }
            Err(e) => {
                warn!("Launch fetch failed: {}", e);
                self.fallback()
            }
        }
    }

    async fn fetch_from_source(&self, limit: u32) -> Result<Vec<LaunchRecord>, Error> {
        let raw = self.source.fetch_previous(limit).await?;
        let total = raw.len();

        let launches: Vec<LaunchRecord> = raw
            .into_iter()
            .map(transform_launch)
            .filter(LaunchRecord::has_valid_coordinates)
            .collect();

        if launches.len() < total {
            debug!(
                "Dropped {} launches without valid pad coordinates",
                total - launches.len()
            );
        }
        if launches.is_empty() {
            return Err(Error::Other(format!(
                "no mappable launches in response ({total} raw)"
            )));
        }

        Ok(launches)
    }

    fn fallback(&self) -> LaunchBatch {
        match self.cache.load_any() {
            Ok(Some(launches)) if !launches.is_empty() => {
                info!("Using expired launch cache as fallback");
                return LaunchBatch {
                    launches,
                    origin: LaunchOrigin::StaleCache,
                };
            }
            Ok(_) => {}
            Err(e) => warn!("Error reading expired launch cache: {}", e),
        }

        info!("No launch data available, using static fallback");
        LaunchBatch {
            launches: fallback_launches(),
            origin: LaunchOrigin::Static,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Scripted launch source that counts calls.
    struct FakeSource {
        responses: Mutex<Vec<Result<Vec<RawLaunch>, Error>>>,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn new(responses: Vec<Result<Vec<RawLaunch>, Error>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LaunchSource for FakeSource {
        async fn fetch_previous(&self, _limit: u32) -> Result<Vec<RawLaunch>, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut responses = self.responses.lock().expect("lock");
            if responses.is_empty() {
                return Err(Error::Http("no scripted response".into()));
            }
            responses.remove(0)
        }
    }

    fn raw(id: &str, status: i64, lat: serde_json::Value) -> RawLaunch {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": format!("Falcon 9 Block 5 | Mission {id}"),
            "net": "2025-12-01T00:00:00Z",
            "status": {"id": status},
            "pad": {
                "name": "SLC-40",
                "latitude": lat,
                "longitude": "-80.577",
                "location": {"name": "Cape Canaveral, FL"}
            },
            "rocket": {"configuration": {"name": "Falcon 9", "variant": "Block 5"}}
        }))
        .expect("raw launch")
    }

    fn start() -> DateTime<Utc> {
        "2025-12-18T12:00:00Z".parse().expect("valid timestamp")
    }

    fn client(
        responses: Vec<Result<Vec<RawLaunch>, Error>>,
    ) -> LaunchClient<FakeSource, MemoryCacheStore, ManualClock> {
        LaunchClient::new(
            FakeSource::new(responses),
            MemoryCacheStore::new(),
            ManualClock::new(start()),
        )
    }

    #[tokio::test]
    async fn test_success_flag_from_status_code() {
        let client = client(vec![Ok(vec![
            raw("a", 3, "28.5".into()),
            raw("b", 4, "28.5".into()),
            raw("c", 7, "28.5".into()),
        ])]);
        let launches = client.fetch_recent_launches(10).await;
        let flags: Vec<bool> = launches.iter().map(|l| l.success).collect();
        assert_eq!(flags, vec![true, false, false]);
    }

    #[tokio::test]
    async fn test_unmappable_launches_are_excluded() {
        let client = client(vec![Ok(vec![
            raw("good", 3, "28.5".into()),
            raw("text", 3, "north-ish".into()),
            raw("null", 3, serde_json::Value::Null),
        ])]);
        let launches = client.fetch_recent_launches(10).await;
        assert_eq!(launches.len(), 1);
        assert_eq!(launches[0].id, "good");
    }

    #[tokio::test]
    async fn test_second_call_within_window_hits_cache() {
        let client = client(vec![Ok(vec![raw("a", 3, "28.5".into())])]);

        let first = client.fetch_with_origin(10).await;
        client.cache().clock().advance(Duration::from_secs(5 * 60));
        let second = client.fetch_with_origin(10).await;

        assert_eq!(client.source().calls(), 1);
        assert_eq!(first.origin, LaunchOrigin::Network);
        assert_eq!(second.origin, LaunchOrigin::FreshCache);
        assert_eq!(first.launches, second.launches);
    }

    #[tokio::test]
    async fn test_refetches_after_window() {
        let client = client(vec![
            Ok(vec![raw("a", 3, "28.5".into())]),
            Ok(vec![raw("b", 3, "28.5".into())]),
        ]);

        client.fetch_recent_launches(10).await;
        client.cache().clock().advance(Duration::from_secs(10 * 60));
        let launches = client.fetch_recent_launches(10).await;

        assert_eq!(client.source().calls(), 2);
        assert_eq!(launches[0].id, "b");
    }

    #[tokio::test]
    async fn test_failure_serves_expired_cache() {
        let client = client(vec![
            Ok(vec![raw("a", 3, "28.5".into())]),
            Err(Error::Api {
                status: 429,
                message: "Request was throttled".into(),
            }),
        ]);

        client.fetch_recent_launches(10).await;
        client.cache().clock().advance(Duration::from_secs(60 * 60));
        let batch = client.fetch_with_origin(10).await;

        assert_eq!(batch.origin, LaunchOrigin::StaleCache);
        assert_eq!(batch.launches[0].id, "a");
    }

    #[tokio::test]
    async fn test_empty_response_without_cache_serves_static_list() {
        let client = client(vec![Ok(vec![])]);
        let batch = client.fetch_with_origin(10).await;

        assert_eq!(batch.origin, LaunchOrigin::Static);
        assert_eq!(batch.launches.len(), 5);
        assert!(batch.launches.iter().all(LaunchRecord::has_valid_coordinates));
    }

    #[tokio::test]
    async fn test_corrupt_cache_degrades_to_static_list() {
        let client = client(vec![Err(Error::Http("connection refused".into()))]);
        client
            .cache()
            .store()
            .set(cache::CACHE_KEY, "not json")
            .expect("set");

        let batch = client.fetch_with_origin(10).await;
        assert_eq!(batch.origin, LaunchOrigin::Static);
    }

    #[tokio::test]
    async fn test_failed_fetch_does_not_overwrite_cache() {
        let client = client(vec![Err(Error::Http("timeout".into()))]);
        client.fetch_recent_launches(10).await;
        assert!(client.cache().load_any().expect("load").is_none());
    }

    /// Store where every operation fails, like a read-only disk.
    struct BrokenStore;

    impl CacheStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, Error> {
            Err(Error::Cache("store unavailable".into()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), Error> {
            Err(Error::Cache("store unavailable".into()))
        }

        fn remove(&self, _key: &str) -> Result<(), Error> {
            Err(Error::Cache("store unavailable".into()))
        }
    }

    #[tokio::test]
    async fn test_storage_failure_still_returns_network_data() {
        let client = LaunchClient::new(
            FakeSource::new(vec![Ok(vec![raw("live", 3, "28.5".into())])]),
            BrokenStore,
            ManualClock::new(start()),
        );

        let batch = client.fetch_with_origin(10).await;

        assert_eq!(batch.origin, LaunchOrigin::Network);
        assert_eq!(batch.launches.len(), 1);
        assert_eq!(batch.launches[0].id, "live");
        assert_eq!(client.source().calls(), 1);
    }

    #[tokio::test]
    async fn test_null_video_url_keeps_the_whole_page() {
        let body = r#"{
            "results": [
                {
                    "id": "first",
                    "name": "Falcon 9 Block 5 | CRS-33",
                    "net": "2025-08-24T06:45:00Z",
                    "status": {"id": 3},
                    "pad": {"name": "SLC-40", "latitude": "28.56", "longitude": "-80.57", "location": {"name": "Cape Canaveral"}},
                    "rocket": {"configuration": {"name": "Falcon 9", "variant": "Block 5"}},
                    "vid_urls": [{"url": "https://youtu.be/crs33"}]
                },
                {
                    "id": "second",
                    "name": "Falcon 9 Block 5 | Starlink Group 10-20",
                    "net": "2025-08-20T01:00:00Z",
                    "status": {"id": 3},
                    "pad": {"name": "SLC-40", "latitude": "28.56", "longitude": "-80.57", "location": {"name": "Cape Canaveral"}},
                    "rocket": {"configuration": {"name": "Falcon 9", "variant": "Block 5"}},
                    "mission": {"id": 1, "name": null, "orbit": null},
                    "vid_urls": [{"url": null}]
                }
            ]
        }"#;
        let page = parse_launch_list(body).expect("lenient parse").results;
        let client = client(vec![Ok(page)]);

        let batch = client.fetch_with_origin(10).await;

        assert_eq!(batch.origin, LaunchOrigin::Network);
        let ids: Vec<&str> = batch.launches.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second"]);
        assert_eq!(batch.launches[0].links.youtube_ids, vec!["crs33"]);
        assert!(batch.launches[1].links.webcast.is_none());
        assert!(batch.launches[1].links.youtube_ids.is_empty());
        assert_eq!(batch.launches[1].payloads[0].orbit, "Unknown");
    }
}
