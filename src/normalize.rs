use uuid::Uuid;

use crate::{
    model::Station,
    overpass::OsmElement,
    zones::Zone,
};

/// Brand applied when an element carries no brand/operator/name text at all.
pub const INDEPENDENT: &str = "Independiente";

/// Ordered keyword table; first case-insensitive substring match wins.
const BRANDS: &[(&str, &str)] = &[
    ("terpel", "Terpel"),
    ("biomax", "Biomax"),
    ("primax", "Primax"),
    ("texaco", "Texaco"),
    ("shell", "Shell"),
    ("chevron", "Chevron"),
    ("mobil", "Mobil"),
    ("bp", "BP"),
    ("puma", "Puma"),
    ("esso", "Esso"),
    ("zeuss", "Zeuss"),
    ("petrobras", "Petrobras"),
    ("gulf", "Gulf"),
    ("galp", "Galp"),
    ("brio", "Brio"),
];

const MAX_TEXT: usize = 200;

/// Map one raw element into a station row, or `None` when it has no usable
/// position (nodes missing lat/lon, ways/relations missing a centroid).
pub fn normalize(elem: &OsmElement, zone: &Zone, zone_id: Uuid) -> Option<Station> {
    let point = elem.point?;
    let tag = |key: &str| elem.tags.get(key).map(String::as_str).unwrap_or("");

    let brand_raw = [tag("brand"), tag("operator"), tag("name")]
        .into_iter()
        .find(|x| !x.is_empty())
        .unwrap_or("");
    let brand = normalize_brand(brand_raw);

    let placeholder;
    let name = match [tag("name"), tag("brand:es"), tag("brand")]
        .into_iter()
        .find(|x| !x.is_empty())
    {
        Some(x) => x,
        None => {
            placeholder = format!("Gasolinera {}", zone.city);
            &placeholder
        }
    };

    Some(Station {
        id: Uuid::new_v4(),
        osm_id: elem.id,
        name: clean_text(name),
        brand,
        address: build_address(elem, zone),
        lat: round6(point.x()),
        lng: round6(point.y()),
        zone_id,
    })
}

fn normalize_brand(raw: &str) -> String {
    let lower = raw.to_lowercase();
    for (keyword, canonical) in BRANDS {
        if lower.contains(keyword) {
            return canonical.to_string();
        }
    }
    if raw.is_empty() {
        INDEPENDENT.to_string()
    } else {
        clean_text(raw)
    }
}

fn build_address(elem: &OsmElement, zone: &Zone) -> String {
    if let Some(street) = elem.tags.get("addr:street") {
        let mut address = street.clone();
        if let Some(number) = elem.tags.get("addr:housenumber") {
            address.push_str(" #");
            address.push_str(number);
        }
        return clean_text(&address);
    }
    if let Some(full) = elem.tags.get("addr:full") {
        return clean_text(full);
    }
    zone.city.to_string()
}

/// Uniform sanitization for embedded text: trim, double single quotes so the
/// value is safe inside a SQL literal, cap the length. The cap counts chars
/// after escaping, so a doubled quote straddling the 200-char boundary loses
/// its second half.
pub fn clean_text(s: &str) -> String {
    s.trim().replace('\'', "''").chars().take(MAX_TEXT).collect()
}

fn round6(x: f64) -> f64 {
    (x * 1e6).round() / 1e6
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use geo::Point;

    use super::*;
    use crate::{model::OsmId, zones};

    fn baq() -> &'static Zone {
        zones::matching(Some("BAQ")).expect("BAQ exists")[0]
    }

    fn element(id: OsmId, point: Option<Point>, tags: &[(&str, &str)]) -> OsmElement {
        OsmElement {
            id,
            point,
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn node_with_brand_tag_normalizes() {
        let elem = element(
            OsmId::Node(111),
            Some(Point::new(10.99, -74.78)),
            &[("brand", "TERPEL MASTER"), ("name", "Terpel Norte")],
        );
        let zone_id = Uuid::new_v4();
        let station = normalize(&elem, baq(), zone_id).expect("has coords");
        assert_eq!(station.osm_id, OsmId::Node(111));
        assert_eq!(station.name, "Terpel Norte");
        assert_eq!(station.brand, "Terpel");
        assert_eq!(station.lat, 10.99);
        assert_eq!(station.lng, -74.78);
        assert_eq!(station.zone_id, zone_id);
    }

    #[test]
    fn element_without_position_is_skipped() {
        let elem = element(OsmId::Way(222), None, &[]);
        assert!(normalize(&elem, baq(), Uuid::new_v4()).is_none());
    }

    #[test]
    fn brand_keyword_match_is_case_insensitive_and_ordered() {
        assert_eq!(normalize_brand("Estación TERPEL La 72"), "Terpel");
        assert_eq!(normalize_brand("biomax energía"), "Biomax");
        assert_eq!(normalize_brand("Royal Dutch Shell"), "Shell");
    }

    #[test]
    fn brand_is_deterministic() {
        assert_eq!(normalize_brand("Primax Colombia"), normalize_brand("Primax Colombia"));
    }

    #[test]
    fn unmatched_nonempty_brand_text_is_kept_cleaned() {
        assert_eq!(normalize_brand("  Estación Don Pedro  "), "Estación Don Pedro");
    }

    #[test]
    fn independiente_only_when_source_text_is_empty() {
        assert_eq!(normalize_brand(""), INDEPENDENT);
        assert_ne!(normalize_brand("Don Pedro"), INDEPENDENT);
    }

    #[test]
    fn brand_falls_back_operator_then_name() {
        let elem = element(
            OsmId::Node(1),
            Some(Point::new(10.9, -74.8)),
            &[("operator", "Primax SA")],
        );
        let station = normalize(&elem, baq(), Uuid::new_v4()).expect("coords");
        assert_eq!(station.brand, "Primax");
        // no name tag, no brand:es, no brand: name comes from the placeholder
        assert_eq!(station.name, "Gasolinera Barranquilla");
    }

    #[test]
    fn brandless_tagless_station_is_independent() {
        let elem = element(OsmId::Node(2), Some(Point::new(10.9, -74.8)), &[]);
        let station = normalize(&elem, baq(), Uuid::new_v4()).expect("coords");
        assert_eq!(station.brand, INDEPENDENT);
        assert_eq!(station.address, "Barranquilla");
    }

    #[test]
    fn street_and_housenumber_compose() {
        let elem = element(
            OsmId::Node(3),
            Some(Point::new(10.9, -74.8)),
            &[("addr:street", "Calle 72"), ("addr:housenumber", "45-12")],
        );
        let station = normalize(&elem, baq(), Uuid::new_v4()).expect("coords");
        assert_eq!(station.address, "Calle 72 #45-12");
    }

    #[test]
    fn street_without_housenumber() {
        let elem = element(
            OsmId::Node(4),
            Some(Point::new(10.9, -74.8)),
            &[("addr:street", "Carrera 46")],
        );
        let station = normalize(&elem, baq(), Uuid::new_v4()).expect("coords");
        assert_eq!(station.address, "Carrera 46");
    }

    #[test]
    fn full_address_used_when_no_street() {
        let elem = element(
            OsmId::Node(5),
            Some(Point::new(10.9, -74.8)),
            &[("addr:full", "Cl 30 #1-50, Barranquilla")],
        );
        let station = normalize(&elem, baq(), Uuid::new_v4()).expect("coords");
        assert_eq!(station.address, "Cl 30 #1-50, Barranquilla");
    }

    #[test]
    fn coordinates_round_to_six_decimals() {
        let elem = element(
            OsmId::Node(6),
            Some(Point::new(10.123456789, -74.987654321)),
            &[],
        );
        let station = normalize(&elem, baq(), Uuid::new_v4()).expect("coords");
        assert_eq!(station.lat, 10.123457);
        assert_eq!(station.lng, -74.987654);
    }

    #[test]
    fn clean_text_escapes_and_caps() {
        assert_eq!(clean_text("  D'Angelo  "), "D''Angelo");
        let long = "x".repeat(300);
        assert_eq!(clean_text(&long).chars().count(), 200);
    }

    #[test]
    fn clean_text_cap_counts_escaped_chars() {
        // a quote at position 200 doubles to '' and the cap cuts the pair
        let mut s = "x".repeat(199);
        s.push('\'');
        s.push_str("tail");
        let cleaned = clean_text(&s);
        assert_eq!(cleaned.chars().count(), 200);
        assert!(cleaned.ends_with("x'"));
    }
}
