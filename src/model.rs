use core::fmt;

use serde::{Serialize, Serializer};
use uuid::Uuid;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OsmId {
    Node(u64),
    Way(u64),
    Relation(u64),
}

impl fmt::Display for OsmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(x) => write!(f, "node/{x}"),
            Self::Way(x) => write!(f, "way/{x}"),
            Self::Relation(x) => write!(f, "relation/{x}"),
        }
    }
}

// Stored as the "kind/id" column value, so serialize the same string
// that the SQL generator embeds.
impl Serialize for OsmId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// One row of the stations table, ready for either SQL rendering or a
/// PostgREST upsert body.
#[derive(Clone, Debug, Serialize)]
pub struct Station {
    pub id: Uuid,
    pub osm_id: OsmId,
    pub name: String,
    pub brand: String,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub zone_id: Uuid,
}

#[derive(Default)]
pub struct RunStats {
    pub fetched: usize,
    pub skipped: usize,
    pub duplicates: usize,
    pub inserted: usize,
    pub failed_zones: Vec<&'static str>,
}

impl RunStats {
    pub fn report(&self) {
        eprintln!();
        eprintln!("Summary:");
        eprintln!("  fetched:             {}", self.fetched);
        eprintln!("  skipped (no coords): {}", self.skipped);
        eprintln!("  duplicates removed:  {}", self.duplicates);
        eprintln!("  ready to insert:     {}", self.inserted);
        if !self.failed_zones.is_empty() {
            eprintln!("  failed zones:        {}", self.failed_zones.join(", "));
        }
    }
}
