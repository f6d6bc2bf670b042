#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use kundli::ephemeris::{julian_day, BodyPosition, EphemerisFrame, FrameEphemeris, HouseAngles};
use kundli::Body;
use std::collections::BTreeMap;

pub const AYANAMSA: f64 = 23.7;

pub fn birth() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap()
}

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
}

/// Tropical frame; sidereal positions are these minus `AYANAMSA`.
pub fn frame(instant: DateTime<Utc>, ascendant: f64, longitudes: &[(Body, f64)]) -> EphemerisFrame {
    let bodies: BTreeMap<Body, BodyPosition> = longitudes
        .iter()
        .map(|(body, lon)| {
            let speed_lon = if *body == Body::Rahu { -0.053 } else { 1.0 };
            (*body, BodyPosition { lon: *lon, lat: 0.0, speed_lon })
        })
        .collect();
    EphemerisFrame {
        julian_day: julian_day(instant),
        ayanamsa: AYANAMSA,
        bodies,
        angles: HouseAngles {
            ascendant,
            midheaven: (ascendant + 270.0) % 360.0,
            cusps: std::array::from_fn(|i| (ascendant + 30.0 * i as f64) % 360.0),
        },
    }
}

pub fn natal_longitudes() -> Vec<(Body, f64)> {
    vec![
        (Body::Sun, 304.0),
        (Body::Moon, 28.7),
        (Body::Mercury, 289.0),
        (Body::Venus, 324.0),
        (Body::Mars, 254.0),
        (Body::Jupiter, 119.0),
        (Body::Saturn, 314.0),
        (Body::Rahu, 334.0),
    ]
}

pub fn transit_longitudes() -> Vec<(Body, f64)> {
    vec![
        (Body::Sun, 71.0),
        (Body::Moon, 200.0),
        (Body::Mercury, 60.0),
        (Body::Venus, 75.0),
        (Body::Mars, 20.0),
        (Body::Jupiter, 63.0),
        (Body::Saturn, 343.0),
        (Body::Rahu, 15.0),
    ]
}

pub fn ephemeris() -> FrameEphemeris {
    FrameEphemeris::new(vec![
        frame(birth(), 23.7, &natal_longitudes()),
        frame(now(), 120.0, &transit_longitudes()),
    ])
}
