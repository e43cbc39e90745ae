//! Headless Plague Session Runner
//!
//! Generates a synthetic tile, runs the plague simulation for a number of
//! simulated hours, performs a warning from the tile centre and prints a summary.

use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

use plague_city::actions::PlayerStats;
use plague_city::city::{BuildingMetadata, BuildingType};
use plague_city::core::error::Result;
use plague_city::core::rng::{DeterministicRng, RandomSource};
use plague_city::core::types::{BuildingId, Vec3};
use plague_city::core::SimulationConfig;
use plague_city::entity::npc::Gender;
use plague_city::entity::plague::HealthState;
use plague_city::simulation::population::tile_origin;
use plague_city::simulation::Simulation;

/// Headless plague session - seeded tile, timed run, JSON or text summary
#[derive(Parser, Debug)]
#[command(name = "plague_sim")]
#[command(about = "Run a seeded plague session on a synthetic tile")]
struct Args {
    /// Tile seed
    #[arg(long, default_value_t = 1348)]
    seed: u32,

    /// District name (market, wealthy, hovels, desert, civic, christian_quarter)
    #[arg(long, default_value = "market")]
    district: String,

    /// Number of synthetic buildings
    #[arg(long, default_value_t = 16)]
    buildings: u32,

    /// Simulated hours to run
    #[arg(long, default_value_t = 72.0)]
    hours: f64,

    /// Frame step in clock seconds
    #[arg(long, default_value_t = 0.25)]
    dt: f64,

    /// Optional TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format: json or text
    #[arg(long, default_value = "text")]
    format: String,
}

#[derive(Serialize)]
struct SessionSummary {
    seed: u32,
    district: String,
    sim_hours: f64,
    npcs: usize,
    healthy: usize,
    infected: usize,
    deceased: usize,
    recovered: usize,
    infected_buildings: Vec<String>,
    deaths_during_run: usize,
    warn_success: bool,
    warn_affected: usize,
    warn_message: String,
}

const BUILDING_MIX: &[BuildingType] = &[
    BuildingType::Residential,
    BuildingType::Residential,
    BuildingType::Residential,
    BuildingType::Commercial,
    BuildingType::Commercial,
    BuildingType::Religious,
    BuildingType::Civic,
    BuildingType::School,
    BuildingType::Medical,
];

const OWNER_NAMES: &[&str] = &[
    "Yusuf al-Halabi",
    "Maryam bint Khalil",
    "Ibrahim ibn Dawud",
    "Hanna al-Suryani",
    "Umar ibn Salih",
    "Sitt al-Mulk",
];

fn owner_profession(kind: BuildingType) -> &'static str {
    match kind {
        BuildingType::Residential => "Weaver",
        BuildingType::Commercial => "Spice Merchant",
        BuildingType::Religious => "Imam",
        BuildingType::Civic => "Scribe",
        BuildingType::School => "Teacher",
        BuildingType::Medical => "Physician",
    }
}

fn synthetic_buildings(seed: u32, count: u32) -> Vec<BuildingMetadata> {
    let mut rng = DeterministicRng::new(seed).fork(1);
    let columns = (count as f64).sqrt().ceil().max(1.0) as u32;

    (0..count)
        .map(|i| {
            let kind = rng.pick(BUILDING_MIX).copied().unwrap_or(BuildingType::Residential);
            let owner = rng.pick(OWNER_NAMES).copied().unwrap_or("Unknown");
            let gender = if rng.chance(0.8) { Gender::Male } else { Gender::Female };
            let x = (i % columns) as f32 * 14.0 + rng.range(-2.0, 2.0) as f32;
            let z = (i / columns) as f32 * 14.0 + rng.range(-2.0, 2.0) as f32;
            BuildingMetadata {
                id: BuildingId::new(format!("tile{}-b{}", seed, i)),
                position: Vec3::new(x, 0.0, z),
                building_type: kind,
                owner_name: owner.to_string(),
                owner_profession: owner_profession(kind).to_string(),
                owner_gender: gender,
                story_count: rng.range_int(1, 3) as u8,
                size_scale: rng.range(0.8, 1.6) as f32,
            }
        })
        .collect()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "plague_city=debug".into()),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SimulationConfig::from_file(path)?,
        None => SimulationConfig::default(),
    };
    let seconds_per_hour = config.seconds_per_sim_hour;

    let buildings = synthetic_buildings(args.seed, args.buildings);
    let mut sim = Simulation::new(config)?;
    sim.load_tile(&buildings, &args.district, args.seed)?;

    let total_secs = (args.hours.max(0.0) * seconds_per_hour).max(0.0);
    let dt = if args.dt > 0.0 { args.dt } else { 0.25 };
    let mut deaths = 0;
    while sim.clock().seconds() < total_secs {
        deaths += sim.tick(dt).deaths();
    }

    let origin = tile_origin(&buildings);
    let centre = Vec3::new(origin.x, 0.0, origin.y);
    let warn = sim.perform_action("warn", centre, &PlayerStats::default());

    let registry = sim.registry();
    let summary = SessionSummary {
        seed: args.seed,
        district: args.district.clone(),
        sim_hours: sim.clock().hours(),
        npcs: registry.len(),
        healthy: registry.count_in_state(HealthState::Healthy),
        infected: registry.count_in_state(HealthState::Infected),
        deceased: registry.count_in_state(HealthState::Deceased),
        recovered: registry.count_in_state(HealthState::Recovered),
        infected_buildings: registry
            .infected_buildings()
            .iter()
            .map(|id| id.to_string())
            .collect(),
        deaths_during_run: deaths,
        warn_success: warn.success,
        warn_affected: warn.affected_ids.len(),
        warn_message: warn.message,
    };

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
        _ => {
            println!("=== PLAGUE SESSION ===");
            println!("Tile {} ({}) after {:.1}h", summary.seed, summary.district, summary.sim_hours);
            println!(
                "NPCs: {}  healthy {}  infected {}  deceased {}  recovered {}",
                summary.npcs, summary.healthy, summary.infected, summary.deceased, summary.recovered
            );
            println!("Deaths during run: {}", summary.deaths_during_run);
            println!("Infected buildings: {}", summary.infected_buildings.join(", "));
            println!("Warn: {}", summary.warn_message);
        }
    }

    Ok(())
}
