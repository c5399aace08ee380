use std::collections::HashSet;

use crate::model::Station;

/// Overlapping zone bboxes fetch border stations twice, once per zone. Keep
/// the first occurrence of each external id; the zone whose fetch came first
/// owns the station.
pub fn dedupe(stations: Vec<Station>) -> Vec<Station> {
    let mut seen = HashSet::new();
    stations
        .into_iter()
        .filter(|s| seen.insert(s.osm_id))
        .collect()
}
