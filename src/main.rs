//! launch-globe: recent launch data, trajectory arcs, and mission details
//! for a 3D globe renderer.
//!
//! Single-binary Tokio application that:
//! 1. Fetches recent launches (cached, with offline fallbacks)
//! 2. Resolves mission metadata and patches
//! 3. Derives trajectory arcs and samples per-frame marker state
//! 4. Runs offline enrichment jobs for the mission tables

mod config;

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{error, info, warn};

use common::{AppConfig, Error, LaunchRecord};
use enrichment::{CustomSearchClient, Enricher, HttpProbe, WebsiteFilter};
use launch_client::{
    transform_launch, FileCacheStore, LaunchClient, LaunchSource, SpaceDevsApi, SystemClock,
};
use mission_meta::{MetadataResolver, MissionTable, NameCleaner, PatchResolver};
use trajectory::{build_paths, ActivationTracker, FrameSampler, Speed};

/// Launch globe backend
#[derive(Parser)]
#[command(name = "launch-globe", about = "Recent launches, trajectory arcs and mission details")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List recent launches.
    Launches {
        /// Number of launches to request (defaults to api.limit).
        #[arg(long)]
        limit: Option<u32>,
        /// Drop the cache before fetching.
        #[arg(long)]
        refresh: bool,
        /// Print records as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Resolve mission metadata and patch for a launch name.
    Resolve { name: String },
    /// Print the trajectory arcs for the recent launches.
    Paths {
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Drive the render loop sampler on a timer and print marker state.
    Simulate {
        #[arg(long)]
        limit: Option<u32>,
        /// Speed multiplier 1..=8 (defaults to animation.speed).
        #[arg(long)]
        speed: Option<u8>,
        /// Stop after this many frames.
        #[arg(long, default_value_t = 10)]
        frames: u32,
    },
    /// Offline enrichment jobs for the mission tables.
    #[command(subcommand)]
    Enrich(EnrichCommand),
}

#[derive(Subcommand)]
enum EnrichCommand {
    /// Search patch images for launches without a usable API patch.
    Patches {
        #[arg(long, default_value = "googleImageSearchResults.json")]
        out: PathBuf,
    },
    /// Search trajectory images for recent launches.
    Trajectories {
        #[arg(long, default_value = "trajectoryImageSearchResults.json")]
        out: PathBuf,
    },
    /// Probe guessed CDN URLs for trajectory images.
    Probe {
        #[arg(long, default_value = "trajectoryImageSearchResults.json")]
        out: PathBuf,
    },
    /// Convert the curated CSV into trajectory records.
    Csv {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = "trajectoryImageSearchResults.json")]
        out: PathBuf,
    },
    /// Set official websites in the mission table from the curated CSV.
    MergeWebsites {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value = "crates/mission_meta/data/missions.json")]
        table: PathBuf,
    },
    /// Set trajectory images in the mission table from a results file.
    MergeTrajectories {
        #[arg(long)]
        results: PathBuf,
        #[arg(long, default_value = "crates/mission_meta/data/missions.json")]
        table: PathBuf,
    },
    /// Add patch images to the patch table from a results file.
    MergePatches {
        #[arg(long)]
        results: PathBuf,
        #[arg(long, default_value = "crates/mission_meta/data/patches.json")]
        table: PathBuf,
    },
}

type Client = LaunchClient<SpaceDevsApi, FileCacheStore, SystemClock>;

fn build_client(cfg: &AppConfig) -> Result<Client, Error> {
    Ok(LaunchClient::with_ttl(
        SpaceDevsApi::new(&cfg.api)?,
        FileCacheStore::new(&cfg.cache.path),
        SystemClock,
        Duration::from_secs(cfg.cache.ttl_secs),
    ))
}

#[tokio::main]
async fn main() {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "launch_globe=info,launch_client=info,mission_meta=info,trajectory=info,enrichment=info"
                    .into()
            }),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    let cfg = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Launches {
            limit,
            refresh,
            json,
        } => run_launches(&cfg, limit, refresh, json).await,
        Command::Resolve { name } => run_resolve(&cfg, &name),
        Command::Paths { limit } => run_paths(&cfg, limit).await,
        Command::Simulate {
            limit,
            speed,
            frames,
        } => run_simulate(&cfg, limit, speed, frames).await,
        Command::Enrich(cmd) => run_enrich(&cfg, cmd).await,
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run_launches(
    cfg: &AppConfig,
    limit: Option<u32>,
    refresh: bool,
    as_json: bool,
) -> Result<(), Error> {
    let client = build_client(cfg)?;
    if refresh {
        client.cache().clear()?;
    }
    let batch = client
        .fetch_with_origin(limit.unwrap_or(cfg.api.limit))
        .await;
    info!(
        "{} launches from {}",
        batch.launches.len(),
        batch.origin.label()
    );

    if as_json {
        println!("{}", serde_json::to_string_pretty(&batch.launches)?);
        return Ok(());
    }

    let patches = PatchResolver::bundled(&cfg.metadata)?;
    for launch in &batch.launches {
        println!(
            "{}  {:<7}  {}{}",
            launch.date_utc.format("%Y-%m-%d %H:%M"),
            if launch.success { "success" } else { "failure" },
            launch.name,
            if patches.has_distinct_patch(launch) { "  [patch]" } else { "" }
        );
    }
    Ok(())
}

fn run_resolve(cfg: &AppConfig, name: &str) -> Result<(), Error> {
    let resolver = MetadataResolver::new(
        MissionTable::bundled()?,
        NameCleaner::from_config(&cfg.metadata),
    );
    let patches = PatchResolver::bundled(&cfg.metadata)?;

    let metadata = resolver.resolve(name);
    let out = json!({
        "cleanName": resolver.clean_name(name),
        "metadata": metadata,
        "videoId": resolver.video_id(name),
        "patch": patches.patch_for(name),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

async fn run_paths(cfg: &AppConfig, limit: Option<u32>) -> Result<(), Error> {
    let launches = build_client(cfg)?
        .fetch_recent_launches(limit.unwrap_or(cfg.api.limit))
        .await;

    let mut tracker = ActivationTracker::new();
    for path in build_paths(&launches, &mut tracker, Utc::now()) {
        println!(
            "{:<40} ({:>8.3}, {:>9.3}) -> ({:>8.3}, {:>9.3})  {}",
            path.name, path.start_lat, path.start_lng, path.dest_lat, path.dest_lng, path.color
        );
    }
    Ok(())
}

async fn run_simulate(
    cfg: &AppConfig,
    limit: Option<u32>,
    speed: Option<u8>,
    frames: u32,
) -> Result<(), Error> {
    let speed = Speed::new(speed.unwrap_or(cfg.animation.speed))?;
    let launches = build_client(cfg)?
        .fetch_recent_launches(limit.unwrap_or(cfg.api.limit))
        .await;
    if launches.is_empty() {
        warn!("No launches to simulate");
        return Ok(());
    }

    let sampler = FrameSampler::new(&cfg.animation);
    let mut tracker = ActivationTracker::new();
    let mut rng = rand::thread_rng();
    let mut interval =
        tokio::time::interval(Duration::from_millis(cfg.animation.frame_interval_ms));

    info!(
        "Simulating {} trajectories at speed {} for {} frames",
        launches.len(),
        speed.get(),
        frames
    );

    for frame in 0..frames {
        interval.tick().await;
        let now = Utc::now();
        let paths = build_paths(&launches, &mut tracker, now);
        for path in &paths {
            let state = sampler.sample(path, now, speed, &mut rng);
            println!(
                "frame {:>3}  {:<32} t={:.3} lat={:>8.3} lng={:>9.3} alt={:.3}",
                frame, path.name, state.progress, state.lat, state.lng, state.altitude
            );
        }
    }
    Ok(())
}

async fn fetch_for_enrichment(cfg: &AppConfig) -> Result<Vec<LaunchRecord>, Error> {
    let api = SpaceDevsApi::new(&cfg.api)?;
    let raw = api.fetch_previous(cfg.enrichment.launch_limit).await?;
    info!("Processing {} launches", raw.len());
    Ok(raw.into_iter().map(transform_launch).collect())
}

fn enricher(cfg: &AppConfig) -> Result<Enricher<CustomSearchClient, HttpProbe>, Error> {
    Ok(Enricher::new(
        CustomSearchClient::new(&cfg.enrichment)?,
        HttpProbe::new(&cfg.enrichment)?,
        &cfg.metadata,
        &cfg.enrichment,
    ))
}

async fn run_enrich(cfg: &AppConfig, cmd: EnrichCommand) -> Result<(), Error> {
    match cmd {
        EnrichCommand::Patches { out } => {
            let launches = fetch_for_enrichment(cfg).await?;
            let records = enricher(cfg)?.search_patches(&launches).await;
            enrichment::write_records(&out, &records)
        }
        EnrichCommand::Trajectories { out } => {
            let launches = fetch_for_enrichment(cfg).await?;
            let records = enricher(cfg)?.search_trajectories(&launches).await;
            enrichment::write_records(&out, &records)
        }
        EnrichCommand::Probe { out } => {
            let launches = fetch_for_enrichment(cfg).await?;
            let records = enricher(cfg)?.probe_trajectories(&launches).await;
            enrichment::write_records(&out, &records)
        }
        EnrichCommand::Csv { input, out } => {
            let missions = enrichment::load_curated(&input)?;
            let records = enrichment::trajectory_records(
                &missions,
                &NameCleaner::from_config(&cfg.metadata),
            );
            enrichment::write_records(&out, &records)
        }
        EnrichCommand::MergeWebsites { csv, table } => {
            let missions = enrichment::load_curated(&csv)?;
            let mut missions_table = enrichment::load_mission_table(&table)?;
            let report = enrichment::merge_websites(
                &mut missions_table,
                &missions,
                &NameCleaner::from_config(&cfg.metadata),
                &WebsiteFilter::new(cfg.enrichment.ignored_websites.clone()),
            );
            for name in &report.unmatched {
                warn!("No mission entry for {}", name);
            }
            save_if_changed(&table, report.updated + report.added, || {
                enrichment::save_mission_table(&table, &missions_table)
            })
        }
        EnrichCommand::MergeTrajectories { results, table } => {
            let records = enrichment::read_records(&results)?;
            let mut missions_table = enrichment::load_mission_table(&table)?;
            let report = enrichment::merge_trajectories(&mut missions_table, &records);
            save_if_changed(&table, report.updated + report.added, || {
                enrichment::save_mission_table(&table, &missions_table)
            })
        }
        EnrichCommand::MergePatches { results, table } => {
            let records = enrichment::read_records(&results)?;
            let mut patch_table = enrichment::load_patch_table(&table)?;
            let report = enrichment::merge_patches(&mut patch_table, &records);
            save_if_changed(&table, report.updated + report.added, || {
                enrichment::save_patch_table(&table, &patch_table)
            })
        }
    }
}

fn save_if_changed(
    path: &Path,
    changes: usize,
    save: impl FnOnce() -> Result<(), Error>,
) -> Result<(), Error> {
    if changes == 0 {
        info!("No changes for {}", path.display());
        return Ok(());
    }
    save()?;
    info!("Wrote {} changes to {}", changes, path.display());
    Ok(())
}
