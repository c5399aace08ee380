use std::{collections::BTreeMap, time::Duration};

use anyhow::{bail, Result};
use geo::Point;
use serde::Deserialize;

use crate::{model::OsmId, zones::Zone};

const ENDPOINT: &str = "https://overpass-api.de/api/interpreter";

fn agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .user_agent(concat!("seeder/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(90))
        .build()
}

/// All fuel amenities inside the zone's bbox, across the three geometry
/// kinds. `out center` makes ways/relations report a computed centroid.
fn bbox_query(zone: &Zone) -> String {
    let [s, w, n, e] = zone.bbox;
    format!(
        "(\n  \
         node[\"amenity\"=\"fuel\"]({s},{w},{n},{e});\n  \
         way[\"amenity\"=\"fuel\"]({s},{w},{n},{e});\n  \
         relation[\"amenity\"=\"fuel\"]({s},{w},{n},{e});\n\
         );\nout center tags;"
    )
}

/// One POST per call; pacing between calls is the caller's responsibility.
pub fn fetch(zone: &Zone) -> Result<Vec<OsmElement>> {
    let payload = format!("[out:json][timeout:60]; {}", bbox_query(zone));
    let response = match agent().post(ENDPOINT).send_form(&[("data", &payload)]) {
        Ok(x) => x,
        Err(ureq::Error::Status(code, response)) => {
            let body = response.into_string().unwrap_or_default();
            bail!("Overpass error {code}: {body}");
        }
        Err(e) => return Err(e.into()),
    };
    let response: OverpassResponse = response.into_json()?;

    Ok(response
        .elements
        .into_iter()
        .map(|x| x.simplify())
        .collect())
}

#[derive(Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<RawElement>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RawElement {
    Node {
        id: u64,
        #[serde(flatten)]
        center: Option<RawPosition>,
        #[serde(default)]
        tags: BTreeMap<String, String>,
    },
    Way {
        id: u64,
        center: Option<RawPosition>,
        #[serde(default)]
        tags: BTreeMap<String, String>,
    },
    Relation {
        id: u64,
        center: Option<RawPosition>,
        #[serde(default)]
        tags: BTreeMap<String, String>,
    },
}

impl RawElement {
    fn simplify(self) -> OsmElement {
        match self {
            Self::Node { id, center, tags } => OsmElement {
                id: OsmId::Node(id),
                point: center.map(RawPosition::simplify),
                tags,
            },
            Self::Way { id, center, tags } => OsmElement {
                id: OsmId::Way(id),
                point: center.map(RawPosition::simplify),
                tags,
            },
            Self::Relation { id, center, tags } => OsmElement {
                id: OsmId::Relation(id),
                point: center.map(RawPosition::simplify),
                tags,
            },
        }
    }
}

#[derive(Deserialize)]
pub struct RawPosition {
    lat: f64,
    lon: f64,
}

impl RawPosition {
    fn simplify(self) -> Point {
        Point::new(self.lat, self.lon)
    }
}

pub struct OsmElement {
    pub id: OsmId,
    pub point: Option<Point>,
    pub tags: BTreeMap<String, String>,
}
