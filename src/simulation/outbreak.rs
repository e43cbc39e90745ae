//! Initial outbreak seeding at session start
//!
//! Uses its own stream derived from the tile seed so the outbreak does not
//! correlate with the draws that created the people. Every count is a seeded
//! draw: the same tile seed always yields the same outbreak topology.

use crate::core::rng::{DeterministicRng, RandomSource};
use crate::core::types::SimHours;
use crate::entity::npc::NpcLocation;
use crate::entity::plague::PlagueMeta;
use crate::simulation::registry::NpcRegistry;

/// Unbiased in-place Fisher-Yates (given a uniform source)
pub fn shuffle<T, R: RandomSource + ?Sized>(rng: &mut R, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = ((rng.next_f64() * (i + 1) as f64).floor() as usize).min(i);
        items.swap(i, j);
    }
}

/// Alternate between the two shuffled partitions until both are drained
fn interleave(a: &[usize], b: &[usize]) -> Vec<usize> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut ia, mut ib) = (a.iter(), b.iter());
    loop {
        match (ia.next(), ib.next()) {
            (None, None) => break,
            (x, y) => out.extend(x.into_iter().chain(y).copied()),
        }
    }
    out
}

/// Summary of what was seeded, for logging and tests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutbreakReport {
    pub near_death: Option<usize>,
    pub infected: Vec<usize>,
    pub incubating: Vec<usize>,
}

pub fn seed_outbreak(registry: &mut NpcRegistry, now: SimHours, tile_seed: u32) -> OutbreakReport {
    let config = registry.plague_config().clone();
    let mut rng = DeterministicRng::new(tile_seed).fork(config.seeding_stream_offset);
    let mut report = OutbreakReport::default();

    let (mut residents, mut street): (Vec<usize>, Vec<usize>) = (0..registry.len())
        .filter(|&slot| registry.records()[slot].is_alive())
        .partition(|&slot| !registry.records()[slot].is_street());

    shuffle(&mut rng, &mut residents);
    shuffle(&mut rng, &mut street);

    // At least one building starts visibly infected
    if let Some((&first, rest)) = residents.split_first() {
        let plague_type = PlagueMeta::roll_type(&mut rng, &config);
        let meta = PlagueMeta::seed_near_death(now, plague_type, &mut rng, &config);
        if let Some(record) = registry.record_at_mut(first) {
            record.set_plague(meta);
            record.location = NpcLocation::Interior;
            report.near_death = Some(first);
        }
        residents = rest.to_vec();
    }

    let pool = interleave(&residents, &street);
    let extra = rng.range_int(config.extra_infected.0 as i64, config.extra_infected.1 as i64) as usize;
    let incubating = rng.range_int(config.incubating.0 as i64, config.incubating.1 as i64) as usize;

    let mut pool = pool.into_iter();
    for slot in pool.by_ref().take(extra) {
        let plague_type = PlagueMeta::roll_type(&mut rng, &config);
        let meta = PlagueMeta::seed_infected(now, plague_type, &mut rng, &config);
        if let Some(record) = registry.record_at_mut(slot) {
            record.set_plague(meta);
            report.infected.push(slot);
        }
    }
    for slot in pool.take(incubating) {
        let plague_type = PlagueMeta::roll_type(&mut rng, &config);
        let meta = PlagueMeta::seed_incubating(now, plague_type, &mut rng, &config);
        if let Some(record) = registry.record_at_mut(slot) {
            record.set_plague(meta);
            report.incubating.push(slot);
        }
    }

    tracing::info!(
        "Seeded outbreak on tile {}: near-death {:?}, {} infected, {} incubating",
        tile_seed,
        report.near_death.map(|slot| registry.records()[slot].id.to_string()),
        report.infected.len(),
        report.incubating.len()
    );

    report
}
