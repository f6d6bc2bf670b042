//! Sidereal transform and natal chart assembly.

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ephemeris::types::{CelestialSnapshot, GeoLocation, HouseSystem};
use crate::error::{KundliError, Result};
use crate::vedic::nakshatra::nakshatra_for_longitude;
use crate::vedic::vargas::{build_varga_chart, HouseChart, Varga};
use crate::vedic::zodiac::{normalize_degrees, Body, Nakshatra, Sign, SIGN_SPAN};

pub const AYANAMSA_NAME: &str = "Lahiri";

/// A body (or the ascendant) after the sidereal transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SiderealBody {
    pub longitude: f64,
    pub latitude: f64,
    pub speed: f64,
    pub retrograde: bool,
    pub sign: Sign,
    #[serde(rename = "signLord")]
    pub sign_lord: Body,
    /// Degree within the sign, fractional.
    #[serde(rename = "degreeInSign")]
    pub degree_in_sign: f64,
    pub degree: u8,
    pub minute: u8,
    pub second: u8,
    pub nakshatra: Nakshatra,
    #[serde(rename = "nakshatraLord")]
    pub nakshatra_lord: Body,
    pub pada: u8,
}

impl SiderealBody {
    /// Transform a tropical longitude into its sidereal placement.
    pub fn from_tropical(
        tropical: f64,
        latitude: f64,
        speed: f64,
        retrograde: bool,
        ayanamsa: f64,
    ) -> Self {
        let longitude = normalize_degrees(tropical - ayanamsa);
        let sign = Sign::from_longitude(longitude);
        let degree_in_sign = longitude % SIGN_SPAN;
        let minutes_total = degree_in_sign.fract() * 60.0;
        let seconds_total = minutes_total.fract() * 60.0;
        let placement = nakshatra_for_longitude(longitude);

        SiderealBody {
            longitude,
            latitude,
            speed,
            retrograde,
            sign,
            sign_lord: sign.lord(),
            degree_in_sign,
            degree: degree_in_sign as u8,
            minute: (minutes_total as u8).min(59),
            second: (seconds_total as u8).min(59),
            nakshatra: placement.nakshatra,
            nakshatra_lord: placement.lord,
            pada: placement.pada,
        }
    }

    /// The ascendant and other angles are zero-speed, direct pseudo-bodies.
    pub fn angle(tropical: f64, ayanamsa: f64) -> Self {
        Self::from_tropical(tropical, 0.0, 0.0, false, ayanamsa)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NatalChart {
    pub birth: DateTime<Utc>,
    #[serde(rename = "julianDay")]
    pub julian_day: f64,
    pub location: GeoLocation,
    pub ayanamsa: f64,
    #[serde(rename = "ayanamsaName")]
    pub ayanamsa_name: String,
    #[serde(rename = "houseSystem")]
    pub house_system: HouseSystem,
    pub planets: BTreeMap<Body, SiderealBody>,
    pub ascendant: SiderealBody,
    pub midheaven: f64,
    #[serde(rename = "houseCusps")]
    pub house_cusps: [f64; 12],
    pub d1: HouseChart,
    pub d9: HouseChart,
    pub d10: HouseChart,
}

impl NatalChart {
    pub fn planet(&self, body: Body) -> Option<&SiderealBody> {
        self.planets.get(&body)
    }

    pub fn lagna_sign(&self) -> Sign {
        self.ascendant.sign
    }

    pub fn lagna_lord(&self) -> Body {
        self.ascendant.sign.lord()
    }

    pub fn moon_sign(&self) -> Option<Sign> {
        self.planet(Body::Moon).map(|moon| moon.sign)
    }

    pub fn moon_longitude(&self) -> Option<f64> {
        self.planet(Body::Moon).map(|moon| moon.longitude)
    }

    pub fn chart(&self, varga: Varga) -> &HouseChart {
        match varga {
            Varga::D1 => &self.d1,
            Varga::D9 => &self.d9,
            Varga::D10 => &self.d10,
        }
    }
}

/// Apply the ayanamsa to every body in the snapshot and lay out D1, D9 and D10.
pub fn build_natal_chart(snapshot: &CelestialSnapshot, ayanamsa: f64) -> Result<NatalChart> {
    let mut planets = BTreeMap::new();
    for body in Body::ALL {
        let raw = snapshot.body(body).ok_or_else(|| {
            KundliError::upstream("ephemeris", format!("snapshot is missing {}", body))
        })?;
        planets.insert(
            body,
            SiderealBody::from_tropical(raw.lon, raw.lat, raw.speed_lon, raw.retrograde, ayanamsa),
        );
    }

    let ascendant = SiderealBody::angle(snapshot.ascendant, ayanamsa);
    let longitudes: Vec<(Body, f64)> = planets.iter().map(|(b, p)| (*b, p.longitude)).collect();
    let d1 = build_varga_chart(Varga::D1, ascendant.longitude, longitudes.iter().copied());
    let d9 = build_varga_chart(Varga::D9, ascendant.longitude, longitudes.iter().copied());
    let d10 = build_varga_chart(Varga::D10, ascendant.longitude, longitudes.iter().copied());

    debug!(
        "Natal chart: lagna {} ({:.2}°), ayanamsa {:.4}",
        ascendant.sign, ascendant.degree_in_sign, ayanamsa
    );

    Ok(NatalChart {
        birth: snapshot.instant,
        julian_day: snapshot.julian_day,
        location: snapshot.location,
        ayanamsa,
        ayanamsa_name: AYANAMSA_NAME.to_string(),
        house_system: snapshot.house_system,
        planets,
        ascendant,
        midheaven: normalize_degrees(snapshot.midheaven - ayanamsa),
        house_cusps: snapshot.cusps.map(|cusp| normalize_degrees(cusp - ayanamsa)),
        d1,
        d9,
        d10,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sidereal_transform_wraps() {
        let body = SiderealBody::from_tropical(10.0, 0.0, 1.0, false, 24.0);
        assert!((body.longitude - 346.0).abs() < 1e-9);
        assert_eq!(body.sign, Sign::Pisces);
        assert_eq!(body.sign_lord, Body::Jupiter);
        assert_eq!(body.degree, 16);
        assert_eq!(body.nakshatra, Nakshatra::UttaraBhadrapada);
        assert_eq!(body.nakshatra_lord, Body::Saturn);
    }

    #[test]
    fn test_degree_minute_second() {
        // 15.5125° into Leo -> 15° 30' 45"
        let body = SiderealBody::from_tropical(135.5125 + 23.0, 0.0, 0.0, false, 23.0);
        assert_eq!(body.sign, Sign::Leo);
        assert_eq!(body.degree, 15);
        assert_eq!(body.minute, 30);
        assert!(body.second == 44 || body.second == 45);
        assert_eq!(body.nakshatra, Nakshatra::PurvaPhalguni);
    }

    #[test]
    fn test_angle_is_direct_and_still() {
        let asc = SiderealBody::angle(100.0, 24.0);
        assert!(!asc.retrograde);
        assert_eq!(asc.speed, 0.0);
        assert_eq!(asc.sign, Sign::Gemini);
    }
}
