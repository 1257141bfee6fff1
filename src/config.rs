//! Configuration loader: merges env vars, .env file, and config.toml.

use common::config::AppConfig;
use common::Error;
use std::path::Path;

fn parse_positive_u64(raw: &str, env_name: &str) -> Result<u64, Error> {
    let parsed = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer > 0")))?;
    if parsed == 0 {
        return Err(Error::Config(format!("{env_name} must be an integer > 0")));
    }
    Ok(parsed)
}

fn validate_config(config: &AppConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    if config.api.base_url.trim().is_empty() {
        issues.push("api.base_url must not be empty".into());
    }
    if config.api.limit == 0 {
        issues.push("api.limit must be > 0".into());
    }

    if config.cache.ttl_secs == 0 {
        issues.push("cache.ttl_secs must be > 0".into());
    }
    if config.cache.path.trim().is_empty() {
        issues.push("cache.path must not be empty".into());
    }

    if !(1..=8).contains(&config.animation.speed) {
        issues.push("animation.speed must be in [1,8]".into());
    }
    if config.animation.duration_secs <= 0.0 {
        issues.push("animation.duration_secs must be > 0".into());
    }
    if config.animation.arc_altitude < 0.0 {
        issues.push("animation.arc_altitude must be >= 0".into());
    }
    if config.animation.look_ahead <= 0.0 || config.animation.look_ahead > 1.0 {
        issues.push("animation.look_ahead must be in (0,1]".into());
    }
    if config.animation.frame_interval_ms == 0 {
        issues.push("animation.frame_interval_ms must be > 0".into());
    }

    if config.metadata.patch_base_url.trim().is_empty() {
        issues.push("metadata.patch_base_url must not be empty".into());
    }

    if config.enrichment.launch_limit == 0 {
        issues.push("enrichment.launch_limit must be > 0".into());
    }
    if config.enrichment.probe_timeout_secs == 0 {
        issues.push("enrichment.probe_timeout_secs must be > 0".into());
    }
    if config.enrichment.google_api_key.trim().is_empty()
        != config.enrichment.search_engine_id.trim().is_empty()
    {
        issues.push(
            "GOOGLE_API_KEY and GOOGLE_SEARCH_ENGINE_ID must be set together".into(),
        );
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid config:\n - {}",
            issues.join("\n - ")
        )))
    }
}

/// Apply environment overrides. `lookup` is `std::env::var` outside tests.
fn apply_env_overrides(
    config: &mut AppConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), Error> {
    if let Some(url) = lookup("LAUNCH_API_BASE_URL") {
        config.api.base_url = url.trim().to_string();
    }
    if let Some(limit) = lookup("LAUNCH_LIMIT") {
        let parsed = parse_positive_u64(&limit, "LAUNCH_LIMIT")?;
        config.api.limit = u32::try_from(parsed)
            .map_err(|_| Error::Config("LAUNCH_LIMIT is too large".into()))?;
    }
    if let Some(path) = lookup("LAUNCH_CACHE_PATH") {
        config.cache.path = path.trim().to_string();
    }
    if let Some(ttl) = lookup("LAUNCH_CACHE_TTL_SECS") {
        config.cache.ttl_secs = parse_positive_u64(&ttl, "LAUNCH_CACHE_TTL_SECS")?;
    }
    if let Some(speed) = lookup("LAUNCH_SPEED") {
        config.animation.speed = speed
            .trim()
            .parse::<u8>()
            .map_err(|_| Error::Config("LAUNCH_SPEED must be an integer in [1,8]".into()))?;
    }
    if let Some(key) = lookup("GOOGLE_API_KEY") {
        config.enrichment.google_api_key = key;
    }
    if let Some(cx) = lookup("GOOGLE_SEARCH_ENGINE_ID") {
        config.enrichment.search_engine_id = cx;
    }
    Ok(())
}

/// Load configuration from environment and optional config file.
pub fn load_config() -> Result<AppConfig, Error> {
    // 1. Load .env file from project root or parent directories.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 2. Start with defaults.
    let mut config = AppConfig::default();

    // 3. Try loading config.toml if it exists.
    let config_path = Path::new("config.toml");
    if config_path.exists() {
        let contents = std::fs::read_to_string(config_path)
            .map_err(|e| Error::Config(format!("Failed to read config.toml: {}", e)))?;
        config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config.toml: {}", e)))?;
    }

    // 4. Override with environment variables (highest priority).
    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;

    validate_config(&config)?;
    Ok(config)
}
