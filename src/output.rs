use std::{env, fs, path::PathBuf};

use anyhow::{bail, Result};
use chrono::Utc;
use itertools::Itertools;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    model::Station,
    normalize::clean_text,
    utils::progress_bar,
    zones::Zone,
};

/// Rows per INSERT statement in generated SQL.
const SQL_CHUNK: usize = 500;
/// Rows per PostgREST upsert request in direct mode.
const UPSERT_BATCH: usize = 100;

/// A catalog zone paired with the primary key assigned to it for this run.
pub struct SeededZone {
    pub zone: &'static Zone,
    pub id: Uuid,
}

#[derive(Serialize)]
struct ZoneRow<'a> {
    id: Uuid,
    name: &'a str,
    city: &'a str,
    dept: &'a str,
    code: &'a str,
    lat: f64,
    lng: f64,
}

impl SeededZone {
    fn row(&self) -> ZoneRow<'_> {
        ZoneRow {
            id: self.id,
            name: self.zone.name,
            city: self.zone.city,
            dept: self.zone.dept,
            code: self.zone.code,
            lat: self.zone.lat,
            lng: self.zone.lng,
        }
    }
}

pub trait Sink {
    fn write(&self, zones: &[SeededZone], stations: &[Station]) -> Result<()>;
}

/// Prints the generated SQL to stdout (status lines go to stderr, so the
/// output can be piped straight into psql).
pub struct ScriptSink;

impl Sink for ScriptSink {
    fn write(&self, zones: &[SeededZone], stations: &[Station]) -> Result<()> {
        print!("{}", render_sql(zones, stations));
        Ok(())
    }
}

pub struct FileSink {
    pub path: PathBuf,
}

impl Sink for FileSink {
    fn write(&self, zones: &[SeededZone], stations: &[Station]) -> Result<()> {
        fs::write(&self.path, render_sql(zones, stations))?;
        eprintln!("SQL saved to {}", self.path.display());
        Ok(())
    }
}

fn render_sql(zones: &[SeededZone], stations: &[Station]) -> String {
    let mut sql = format!(
        "-- Fuel station seed, generated {}\n\
         -- Source: OpenStreetMap via Overpass API (© OpenStreetMap contributors, ODbL)\n\
         -- {} zones, {} stations\n\
         --\n\
         -- Usage: psql $DATABASE_URL < seed.sql\n\n\
         ALTER TABLE stations ADD COLUMN IF NOT EXISTS osm_id TEXT UNIQUE;\n\
         ALTER TABLE zones    ADD COLUMN IF NOT EXISTS city  TEXT;\n\
         ALTER TABLE zones    ADD COLUMN IF NOT EXISTS dept  TEXT;\n\
         ALTER TABLE zones    ADD COLUMN IF NOT EXISTS code  TEXT;\n\n",
        Utc::now().to_rfc3339(),
        zones.len(),
        stations.len(),
    );

    sql.push_str(&render_zone_sql(zones));
    for chunk in stations.chunks(SQL_CHUNK) {
        sql.push('\n');
        sql.push_str(&render_station_chunk(chunk));
    }
    sql
}

/// Zone attributes are authoritative once seeded (manual corrections must
/// survive later runs), hence DO NOTHING rather than an update.
fn render_zone_sql(zones: &[SeededZone]) -> String {
    let rows = zones
        .iter()
        .map(|z| {
            format!(
                "  ('{}', '{}', '{}', '{}', '{}', {}, {})",
                z.id,
                clean_text(z.zone.name),
                clean_text(z.zone.city),
                clean_text(z.zone.dept),
                z.zone.code,
                z.zone.lat,
                z.zone.lng,
            )
        })
        .join(",\n");

    format!(
        "INSERT INTO zones (id, name, city, dept, code, lat, lng) VALUES\n\
         {rows}\n\
         ON CONFLICT (id) DO NOTHING;\n"
    )
}

/// Station upserts overwrite display fields only; price and report relations
/// hang off the station row and are never touched here.
fn render_station_chunk(stations: &[Station]) -> String {
    let rows = stations
        .iter()
        .map(|s| {
            format!(
                "  ('{}', '{}', '{}', '{}', {}, {}, '{}', '{}')",
                s.id, s.name, s.brand, s.address, s.lat, s.lng, s.zone_id, s.osm_id,
            )
        })
        .join(",\n");

    format!(
        "INSERT INTO stations (id, name, brand, address, lat, lng, zone_id, osm_id) VALUES\n\
         {rows}\n\
         ON CONFLICT (osm_id) DO UPDATE SET\n  \
         name    = EXCLUDED.name,\n  \
         brand   = EXCLUDED.brand,\n  \
         address = EXCLUDED.address,\n  \
         lat     = EXCLUDED.lat,\n  \
         lng     = EXCLUDED.lng;\n"
    )
}

/// Direct mode: upserts over Supabase's PostgREST endpoint.
#[derive(Debug)]
pub struct SupabaseSink {
    url: String,
    key: String,
}

impl SupabaseSink {
    pub fn from_env() -> Result<Self> {
        Self::from_parts(
            env_first(&["SUPABASE_URL", "VITE_SUPABASE_URL"]),
            env_first(&["SUPABASE_SERVICE_KEY", "VITE_SUPABASE_ANON_KEY"]),
        )
    }

    fn from_parts(url: Option<String>, key: Option<String>) -> Result<Self> {
        let (Some(url), Some(key)) = (url, key) else {
            bail!(
                "direct mode needs SUPABASE_URL and SUPABASE_SERVICE_KEY set, e.g.\n  \
                 SUPABASE_URL=... SUPABASE_SERVICE_KEY=... seeder --supabase"
            );
        };
        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            key,
        })
    }

    fn upsert<T: Serialize>(
        &self,
        table: &str,
        on_conflict: &str,
        resolution: &str,
        rows: &[T],
    ) -> Result<()> {
        let url = format!("{}/rest/v1/{table}?on_conflict={on_conflict}", self.url);
        let request = ureq::post(&url)
            .set("apikey", &self.key)
            .set("Authorization", &format!("Bearer {}", self.key))
            .set("Prefer", &format!("resolution={resolution}"));

        match request.send_json(rows) {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(code, response)) => {
                let body = response.into_string().unwrap_or_default();
                bail!("{table} upsert failed ({code}): {body}");
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl Sink for SupabaseSink {
    fn write(&self, zones: &[SeededZone], stations: &[Station]) -> Result<()> {
        eprintln!("Upserting {} zones...", zones.len());
        let rows: Vec<_> = zones.iter().map(SeededZone::row).collect();
        // ignore-duplicates keeps previously seeded zone attributes intact
        if let Err(e) = self.upsert("zones", "id", "ignore-duplicates", &rows) {
            eprintln!("  {e}");
        }

        eprintln!("Upserting {} stations...", stations.len());
        let bar = progress_bar(stations.chunks(UPSERT_BATCH).len() as u64);
        let mut inserted = 0;
        for batch in stations.chunks(UPSERT_BATCH) {
            // a failed batch is logged; the rest still go through
            match self.upsert("stations", "osm_id", "merge-duplicates", batch) {
                Ok(()) => inserted += batch.len(),
                Err(e) => eprintln!("  {e}"),
            }
            bar.inc(1);
        }
        bar.finish();
        eprintln!("{inserted} stations upserted");

        Ok(())
    }
}

fn env_first(names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| env::var(name).ok().filter(|x| !x.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OsmId;

    fn seeded(zone: &'static Zone) -> SeededZone {
        SeededZone {
            zone,
            id: Uuid::new_v4(),
        }
    }

    fn stations(n: usize, zone_id: Uuid) -> Vec<Station> {
        (0..n)
            .map(|i| Station {
                id: Uuid::new_v4(),
                osm_id: OsmId::Node(i as u64),
                name: format!("Estación {i}"),
                brand: "Terpel".to_string(),
                address: "Barranquilla".to_string(),
                lat: 10.99,
                lng: -74.78,
                zone_id,
            })
            .collect()
    }

    #[test]
    fn zone_insert_ignores_conflicts() {
        let zones: Vec<_> = crate::zones::ZONES.iter().map(seeded).collect();
        let sql = render_zone_sql(&zones);
        assert!(sql.starts_with("INSERT INTO zones (id, name, city, dept, code, lat, lng)"));
        assert!(sql.ends_with("ON CONFLICT (id) DO NOTHING;\n"));
        assert!(sql.contains("'BAQ', 10.9878, -74.7889"));
    }

    #[test]
    fn station_upsert_overwrites_display_fields_only() {
        let zone_id = Uuid::new_v4();
        let sql = render_station_chunk(&stations(1, zone_id));
        assert!(sql.contains("ON CONFLICT (osm_id) DO UPDATE SET"));
        assert!(sql.contains("name    = EXCLUDED.name"));
        assert!(sql.contains("lng     = EXCLUDED.lng"));
        assert!(!sql.contains("zone_id = EXCLUDED"));
        assert!(!sql.contains("id      = EXCLUDED"));
    }

    #[test]
    fn chunking_is_lossless_and_ordered() {
        let zones = vec![seeded(&crate::zones::ZONES[0])];
        let all = stations(1001, zones[0].id);
        let sql = render_sql(&zones, &all);

        // ceil(1001 / 500) statements
        assert_eq!(sql.matches("INSERT INTO stations").count(), 3);
        // every station appears exactly once, order preserved
        for s in &all {
            assert_eq!(sql.matches(&format!("'{}'", s.osm_id)).count(), 1);
        }
        let first = sql.find("'node/0'").expect("first station");
        let middle = sql.find("'node/500'").expect("chunk boundary");
        let last = sql.find("'node/1000'").expect("last station");
        assert!(first < middle && middle < last);
    }

    #[test]
    fn empty_run_still_renders_zone_statements() {
        let zones = vec![seeded(&crate::zones::ZONES[0])];
        let sql = render_sql(&zones, &[]);
        assert!(sql.contains("INSERT INTO zones"));
        assert!(!sql.contains("INSERT INTO stations"));
    }

    #[test]
    fn direct_mode_without_credentials_is_a_config_error() {
        let err = SupabaseSink::from_parts(None, None).unwrap_err().to_string();
        assert!(err.contains("SUPABASE_URL"));
        assert!(err.contains("SUPABASE_SERVICE_KEY"));

        assert!(SupabaseSink::from_parts(Some("https://x.supabase.co".into()), None).is_err());
        let sink = SupabaseSink::from_parts(
            Some("https://x.supabase.co/".into()),
            Some("service-key".into()),
        )
        .expect("both present");
        assert_eq!(sink.url, "https://x.supabase.co");
    }
}
