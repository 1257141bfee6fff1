//! Picking the "best" image out of a search result.

use common::config::EnrichmentConfig;

use crate::search::ImageCandidate;

/// Ranking rule: images from a preferred host first, then largest area.
///
/// An empty preferred list ranks by area alone.
#[derive(Debug, Clone, Default)]
pub struct ImageRanking {
    preferred_domains: Vec<String>,
}

impl ImageRanking {
    pub fn new(preferred_domains: Vec<String>) -> Self {
        Self { preferred_domains }
    }

    pub fn from_config(config: &EnrichmentConfig) -> Self {
        Self::new(config.preferred_domains.clone())
    }

    /// Area only.
    pub fn by_size() -> Self {
        Self::default()
    }

    pub fn is_preferred(&self, url: &str) -> bool {
        self.preferred_domains.iter().any(|d| url.contains(d.as_str()))
    }
}

/// Sort images best-first and flag the preferred ones. Stable for ties.
pub fn rank_images(mut images: Vec<ImageCandidate>, ranking: &ImageRanking) -> Vec<ImageCandidate> {
    for image in &mut images {
        image.is_spacex_cdn = ranking.is_preferred(&image.url);
    }
    images.sort_by(|a, b| {
        b.is_spacex_cdn
            .cmp(&a.is_spacex_cdn)
            .then_with(|| b.size.unwrap_or(0).cmp(&a.size.unwrap_or(0)))
    });
    images
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(url: &str, w: u32, h: u32) -> ImageCandidate {
        ImageCandidate::new(url.into(), Some(w), Some(h))
    }

    #[test]
    fn test_preferred_domain_beats_size() {
        let ranking = ImageRanking::from_config(&EnrichmentConfig::default());
        let ranked = rank_images(
            vec![
                image("https://big.test/huge.jpg", 4000, 3000),
                image("https://sxcontent9668.azureedge.us/a.webp", 800, 600),
                image("https://www.spacex.com/b.jpg", 1600, 900),
            ],
            &ranking,
        );
        let urls: Vec<_> = ranked.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://www.spacex.com/b.jpg",
                "https://sxcontent9668.azureedge.us/a.webp",
                "https://big.test/huge.jpg",
            ]
        );
        assert!(ranked[0].is_spacex_cdn);
        assert!(!ranked[2].is_spacex_cdn);
    }

    #[test]
    fn test_by_size_ignores_domain() {
        let ranked = rank_images(
            vec![
                image("https://www.spacex.com/small.jpg", 10, 10),
                ImageCandidate::new("https://x.test/unknown.jpg".into(), None, None),
                image("https://x.test/large.jpg", 100, 100),
            ],
            &ImageRanking::by_size(),
        );
        let urls: Vec<_> = ranked.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://x.test/large.jpg",
                "https://www.spacex.com/small.jpg",
                "https://x.test/unknown.jpg",
            ]
        );
    }
}
