//! Chart fixtures for unit tests. Ayanamsa is zero so tropical == sidereal.

use chrono::{DateTime, TimeZone, Utc};
use std::collections::BTreeMap;

use crate::ephemeris::adapter::julian_day;
use crate::ephemeris::types::{CelestialSnapshot, GeoLocation, HouseSystem, SnapshotBody};
use crate::vedic::chart::{build_natal_chart, NatalChart};
use crate::vedic::zodiac::{normalize_degrees, Body};

// Sun, Moon, Mercury, Venus, Mars, Jupiter, Saturn, Rahu
const DEFAULT_LONGITUDES: [(Body, f64); 8] = [
    (Body::Sun, 280.0),
    (Body::Moon, 5.0),
    (Body::Mercury, 265.0),
    (Body::Venus, 300.0),
    (Body::Mars, 230.0),
    (Body::Jupiter, 95.0),
    (Body::Saturn, 290.0),
    (Body::Rahu, 310.0),
];

pub(crate) fn birth() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap()
}

/// Snapshot with the default layout, overridden by `bodies`. Ketu follows Rahu.
pub(crate) fn snapshot(ascendant: f64, bodies: &[(Body, f64)], retrograde: &[Body]) -> CelestialSnapshot {
    let mut longitudes: BTreeMap<Body, f64> = DEFAULT_LONGITUDES.iter().copied().collect();
    for (body, lon) in bodies {
        longitudes.insert(*body, *lon);
    }
    longitudes.insert(Body::Ketu, normalize_degrees(longitudes[&Body::Rahu] + 180.0));

    let bodies = longitudes
        .into_iter()
        .map(|(body, lon)| {
            let retro = retrograde.contains(&body) || body.is_node();
            (
                body,
                SnapshotBody {
                    lon,
                    lat: 0.0,
                    speed_lon: if retro { -0.1 } else { 1.0 },
                    retrograde: retro,
                },
            )
        })
        .collect();

    let instant = birth();
    CelestialSnapshot {
        instant,
        julian_day: julian_day(instant),
        location: GeoLocation { lat: 28.6, lon: 77.2 },
        house_system: HouseSystem::WholeSign,
        bodies,
        ascendant,
        midheaven: normalize_degrees(ascendant + 270.0),
        cusps: std::array::from_fn(|i| normalize_degrees(ascendant + 30.0 * i as f64)),
    }
}

pub(crate) fn chart(ascendant: f64, bodies: &[(Body, f64)]) -> NatalChart {
    build_natal_chart(&snapshot(ascendant, bodies, &[]), 0.0).unwrap()
}
