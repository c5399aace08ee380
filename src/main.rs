use std::{path::PathBuf, thread, time::Duration};

use anyhow::Result;
use clap::Parser;
use uuid::Uuid;

use crate::{
    model::RunStats,
    output::{FileSink, ScriptSink, SeededZone, Sink, SupabaseSink},
};

mod dedupe;
mod model;
mod normalize;
mod output;
mod overpass;
mod utils;
mod zones;

/// Overpass asks for at most one request per second from a given client.
const FETCH_PAUSE: Duration = Duration::from_millis(1200);

/// Seed the station directory from OpenStreetMap, one Overpass query per
/// city zone. By default the SQL goes to stdout.
#[derive(Debug, Parser)]
struct Cli {
    /// Only process the zone with this code (e.g. BAQ)
    #[arg(long)]
    city: Option<String>,

    /// Write the generated SQL to this file instead of stdout
    #[arg(long, conflicts_with = "supabase")]
    out: Option<PathBuf>,

    /// Upsert directly into Supabase instead of generating SQL
    #[arg(long)]
    supabase: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let target = zones::matching(cli.city.as_deref())?;

    // Resolve the sink up front: a missing credential has to fail the run
    // before the first network call, not after twenty minutes of fetching.
    let sink: Box<dyn Sink> = if cli.supabase {
        Box::new(SupabaseSink::from_env()?)
    } else if let Some(path) = cli.out {
        Box::new(FileSink { path })
    } else {
        Box::new(ScriptSink)
    };

    eprintln!("Seeding {} zones from Overpass...", target.len());

    let seeded: Vec<_> = target
        .into_iter()
        .map(|zone| SeededZone {
            zone,
            id: Uuid::new_v4(),
        })
        .collect();

    let mut stats = RunStats::default();
    let mut accumulator = Vec::new();

    for (i, z) in seeded.iter().enumerate() {
        if i > 0 {
            thread::sleep(FETCH_PAUSE);
        }

        eprintln!("Fetching {} ({})...", z.zone.name, z.zone.code);
        let elements = match overpass::fetch(z.zone) {
            Ok(x) => x,
            Err(e) => {
                eprintln!("  {}: {e}", z.zone.name);
                stats.failed_zones.push(z.zone.code);
                continue;
            }
        };

        let zone_count = absorb(&elements, z, &mut stats, &mut accumulator);
        eprintln!("  {}: {zone_count} stations", z.zone.name);
    }

    let stations = dedupe::dedupe(accumulator);
    stats.duplicates = stats.fetched - stations.len();
    stats.inserted = stations.len();
    stats.report();

    sink.write(&seeded, &stations)
}

/// Normalize one zone's elements into the run accumulator. Returns the
/// zone's survivor count; elements without a position only bump `skipped`.
fn absorb(
    elements: &[overpass::OsmElement],
    z: &SeededZone,
    stats: &mut RunStats,
    accumulator: &mut Vec<model::Station>,
) -> usize {
    let mut zone_count = 0;
    for elem in elements {
        match normalize::normalize(elem, z.zone, z.id) {
            Some(station) => {
                accumulator.push(station);
                zone_count += 1;
            }
            None => stats.skipped += 1,
        }
    }
    stats.fetched += zone_count;
    zone_count
}
