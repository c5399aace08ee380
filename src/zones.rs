use anyhow::{bail, Result};

/// A city-scale query region. `bbox` is [south, west, north, east]; boxes of
/// adjacent zones overlap on purpose so border stations are never missed by
/// either query (the dedup pass settles who owns them).
#[derive(Debug)]
pub struct Zone {
    pub code: &'static str,
    pub name: &'static str,
    pub city: &'static str,
    pub dept: &'static str,
    pub lat: f64,
    pub lng: f64,
    pub bbox: [f64; 4],
}

#[rustfmt::skip]
pub const ZONES: &[Zone] = &[
    // Caribe
    Zone { code: "BAQ",  name: "Barranquilla",      city: "Barranquilla",   dept: "Atlántico",          lat: 10.9878, lng: -74.7889, bbox: [10.85, -74.95, 11.12, -74.63] },
    Zone { code: "CTG",  name: "Cartagena",         city: "Cartagena",      dept: "Bolívar",            lat: 10.3910, lng: -75.4794, bbox: [10.20, -75.65, 10.55, -75.30] },
    Zone { code: "SMR",  name: "Santa Marta",       city: "Santa Marta",    dept: "Magdalena",          lat: 11.2408, lng: -74.2110, bbox: [11.10, -74.32, 11.38, -74.06] },
    Zone { code: "MTC",  name: "Montería",          city: "Montería",       dept: "Córdoba",            lat:  8.7479, lng: -75.8814, bbox: [ 8.60, -76.05,  8.90, -75.70] },
    Zone { code: "VAL",  name: "Valledupar",        city: "Valledupar",     dept: "Cesar",              lat: 10.4769, lng: -73.2538, bbox: [10.35, -73.40, 10.62, -73.14] },
    Zone { code: "RHC",  name: "Riohacha",          city: "Riohacha",       dept: "La Guajira",         lat: 11.5444, lng: -72.9072, bbox: [11.43, -73.03, 11.68, -72.77] },
    Zone { code: "SNS",  name: "Sincelejo",         city: "Sincelejo",      dept: "Sucre",              lat:  9.3047, lng: -75.3978, bbox: [ 9.18, -75.54,  9.44, -75.26] },
    // Andina
    Zone { code: "BOG",  name: "Bogotá Norte",      city: "Bogotá",         dept: "Cundinamarca",       lat:  4.7110, lng: -74.0721, bbox: [ 4.60, -74.22,  4.83, -73.99] },
    Zone { code: "BOGS", name: "Bogotá Sur",        city: "Bogotá",         dept: "Cundinamarca",       lat:  4.5200, lng: -74.1200, bbox: [ 4.36, -74.23,  4.62, -73.99] },
    Zone { code: "MED",  name: "Medellín",          city: "Medellín",       dept: "Antioquia",          lat:  6.2442, lng: -75.5812, bbox: [ 6.10, -75.72,  6.38, -75.44] },
    Zone { code: "MEDN", name: "Norte Antioquia",   city: "Bello",          dept: "Antioquia",          lat:  6.3350, lng: -75.5550, bbox: [ 6.28, -75.63,  6.45, -75.48] },
    Zone { code: "CLO",  name: "Cali",              city: "Cali",           dept: "Valle del Cauca",    lat:  3.4516, lng: -76.5320, bbox: [ 3.28, -76.67,  3.58, -76.39] },
    Zone { code: "BUC",  name: "Bucaramanga",       city: "Bucaramanga",    dept: "Santander",          lat:  7.1254, lng: -73.1198, bbox: [ 6.98, -73.26,  7.26, -73.00] },
    Zone { code: "PEI",  name: "Pereira",           city: "Pereira",        dept: "Risaralda",          lat:  4.8133, lng: -75.6961, bbox: [ 4.70, -75.85,  4.93, -75.56] },
    Zone { code: "MAN",  name: "Manizales",         city: "Manizales",      dept: "Caldas",             lat:  5.0700, lng: -75.5130, bbox: [ 4.95, -75.64,  5.19, -75.38] },
    Zone { code: "IBG",  name: "Ibagué",            city: "Ibagué",         dept: "Tolima",             lat:  4.4389, lng: -75.2322, bbox: [ 4.33, -75.38,  4.56, -75.10] },
    Zone { code: "NEI",  name: "Neiva",             city: "Neiva",          dept: "Huila",              lat:  2.9273, lng: -75.2819, bbox: [ 2.80, -75.43,  3.07, -75.14] },
    Zone { code: "TUN",  name: "Tunja",             city: "Tunja",          dept: "Boyacá",             lat:  5.5353, lng: -73.3678, bbox: [ 5.45, -73.48,  5.63, -73.25] },
    Zone { code: "CUC",  name: "Cúcuta",            city: "Cúcuta",         dept: "Norte de Santander", lat:  7.8891, lng: -72.4967, bbox: [ 7.78, -72.62,  7.99, -72.38] },
    Zone { code: "ARM",  name: "Armenia",           city: "Armenia",        dept: "Quindío",            lat:  4.5339, lng: -75.6811, bbox: [ 4.44, -75.79,  4.63, -75.58] },
    Zone { code: "PAS",  name: "Pasto",             city: "Pasto",          dept: "Nariño",             lat:  1.2136, lng: -77.2811, bbox: [ 1.10, -77.40,  1.33, -77.16] },
    Zone { code: "VIL",  name: "Villavicencio",     city: "Villavicencio",  dept: "Meta",               lat:  4.1533, lng: -73.6345, bbox: [ 4.02, -73.77,  4.29, -73.49] },
    Zone { code: "POP",  name: "Popayán",           city: "Popayán",        dept: "Cauca",              lat:  2.4448, lng: -76.6147, bbox: [ 2.33, -76.73,  2.56, -76.50] },
    // Pacífico
    Zone { code: "BTV",  name: "Buenaventura",      city: "Buenaventura",   dept: "Valle del Cauca",    lat:  3.8801, lng: -77.0311, bbox: [ 3.74, -77.17,  3.99, -76.89] },
    // Orinoquía
    Zone { code: "YOP",  name: "Yopal",             city: "Yopal",          dept: "Casanare",           lat:  5.3378, lng: -72.3956, bbox: [ 5.24, -72.53,  5.46, -72.27] },
    // Eje Cafetero
    Zone { code: "CAL",  name: "Caldas (Antioquia)", city: "Caldas",        dept: "Antioquia",          lat:  6.0930, lng: -75.6380, bbox: [ 5.98, -75.74,  6.18, -75.54] },
];

/// Resolve the target zone set. An unknown code is a configuration error; the
/// message lists every valid code so the operator can fix the invocation.
pub fn matching(code: Option<&str>) -> Result<Vec<&'static Zone>> {
    let Some(code) = code else {
        return Ok(ZONES.iter().collect());
    };

    let code = code.to_uppercase();
    let zones: Vec<_> = ZONES.iter().filter(|z| z.code == code).collect();
    if zones.is_empty() {
        let known = ZONES
            .iter()
            .map(|z| format!("  {} -> {}", z.code, z.name))
            .collect::<Vec<_>>()
            .join("\n");
        bail!("zone \"{code}\" not found; valid codes:\n{known}");
    }

    Ok(zones)
}
