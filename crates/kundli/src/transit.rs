//! Transit (gochar) engine: where the grahas are now, relative to a natal chart.

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ephemeris::adapter::{julian_day, resolve_bodies, EphemerisAdapter};
use crate::ephemeris::types::SnapshotBody;
use crate::error::{KundliError, Result};
use crate::vedic::chart::NatalChart;
use crate::vedic::zodiac::{angular_distance, house_from, normalize_degrees, Body, Sign};

/// Conjunction orb in degrees.
pub const CONJUNCTION_ORB: f64 = 10.0;
/// Opposition window is 180° ± this orb.
pub const OPPOSITION_ORB: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitRecord {
    pub body: Body,
    /// Sidereal longitude at the query instant.
    pub longitude: f64,
    #[serde(rename = "houseFromMoon")]
    pub house_from_moon: u8,
    #[serde(rename = "houseFromLagna")]
    pub house_from_lagna: u8,
    #[serde(rename = "currentSign")]
    pub current_sign: Sign,
    pub retrograde: bool,
    #[serde(rename = "aspectsNatal")]
    pub aspects_natal: Vec<Body>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SadeSatiPhase {
    Rising,
    Peak,
    Setting,
    NotActive,
}

impl SadeSatiPhase {
    pub fn name(self) -> &'static str {
        match self {
            SadeSatiPhase::Rising => "rising",
            SadeSatiPhase::Peak => "peak",
            SadeSatiPhase::Setting => "setting",
            SadeSatiPhase::NotActive => "not_active",
        }
    }
}

/// Saturn's 7.5-year passage over the natal Moon sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SadeSati {
    pub phase: SadeSatiPhase,
    #[serde(rename = "houseFromMoon")]
    pub house_from_moon: u8,
    #[serde(rename = "saturnSign")]
    pub saturn_sign: Sign,
}

impl SadeSati {
    pub fn from_saturn_sign(natal_moon_sign: Sign, saturn_sign: Sign) -> Self {
        let house_from_moon = house_from(natal_moon_sign, saturn_sign);
        let phase = match house_from_moon {
            12 => SadeSatiPhase::Rising,
            1 => SadeSatiPhase::Peak,
            2 => SadeSatiPhase::Setting,
            _ => SadeSatiPhase::NotActive,
        };
        SadeSati { phase, house_from_moon, saturn_sign }
    }

    /// Read Saturn off already computed transit records; no ephemeris query.
    pub fn from_transits(natal: &NatalChart, records: &[TransitRecord]) -> Result<Self> {
        let moon_sign = natal_moon_sign(natal)?;
        let saturn = records
            .iter()
            .find(|r| r.body == Body::Saturn)
            .ok_or_else(|| KundliError::upstream("ephemeris", "no Saturn position for sade sati"))?;
        Ok(SadeSati::from_saturn_sign(moon_sign, saturn.current_sign))
    }

    pub fn is_active(&self) -> bool {
        self.phase != SadeSatiPhase::NotActive
    }
}

/// Natal bodies within the conjunction or opposition window of `longitude`.
pub fn natal_aspects(natal: &NatalChart, longitude: f64) -> Vec<Body> {
    natal
        .planets
        .iter()
        .filter(|(_, planet)| {
            let distance = angular_distance(longitude, planet.longitude);
            distance <= CONJUNCTION_ORB || distance >= 180.0 - OPPOSITION_ORB
        })
        .map(|(body, _)| *body)
        .collect()
}

pub struct TransitEngine<'a> {
    adapter: &'a dyn EphemerisAdapter,
}

impl<'a> TransitEngine<'a> {
    pub fn new(adapter: &'a dyn EphemerisAdapter) -> Self {
        Self { adapter }
    }

    /// Sidereal positions at `instant`, using that instant's own ayanamsa.
    fn sidereal_positions(&self, instant: DateTime<Utc>) -> Result<BTreeMap<Body, SnapshotBody>> {
        let jd = julian_day(instant);
        let ayanamsa = self.adapter.ayanamsa(jd)?;
        let mut bodies = resolve_bodies(&self.adapter.positions(jd)?, jd)?;
        for body in bodies.values_mut() {
            body.lon = normalize_degrees(body.lon - ayanamsa);
        }
        debug!("Transit positions at JD {:.5} (ayanamsa {:.4})", jd, ayanamsa);
        Ok(bodies)
    }

    /// One record per graha, in canonical order.
    pub fn transits(&self, natal: &NatalChart, instant: DateTime<Utc>) -> Result<Vec<TransitRecord>> {
        let moon_sign = natal_moon_sign(natal)?;
        let lagna_sign = natal.lagna_sign();
        let positions = self.sidereal_positions(instant)?;

        Ok(positions
            .into_iter()
            .map(|(body, pos)| {
                let current_sign = Sign::from_longitude(pos.lon);
                TransitRecord {
                    body,
                    longitude: pos.lon,
                    house_from_moon: house_from(moon_sign, current_sign),
                    house_from_lagna: house_from(lagna_sign, current_sign),
                    current_sign,
                    retrograde: pos.retrograde,
                    aspects_natal: natal_aspects(natal, pos.lon),
                }
            })
            .collect())
    }

    pub fn sade_sati(&self, natal: &NatalChart, instant: DateTime<Utc>) -> Result<SadeSati> {
        SadeSati::from_transits(natal, &self.transits(natal, instant)?)
    }
}

fn natal_moon_sign(natal: &NatalChart) -> Result<Sign> {
    natal
        .moon_sign()
        .ok_or_else(|| KundliError::ComputationInconsistency("natal chart has no Moon".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::chart;

    #[test]
    fn test_sade_sati_phases() {
        let moon = Sign::Cancer;
        assert_eq!(SadeSati::from_saturn_sign(moon, Sign::Gemini).phase, SadeSatiPhase::Rising);
        assert_eq!(SadeSati::from_saturn_sign(moon, Sign::Cancer).phase, SadeSatiPhase::Peak);
        assert_eq!(SadeSati::from_saturn_sign(moon, Sign::Leo).phase, SadeSatiPhase::Setting);
        let off = SadeSati::from_saturn_sign(moon, Sign::Virgo);
        assert_eq!(off.phase, SadeSatiPhase::NotActive);
        assert_eq!(off.house_from_moon, 3);
        assert!(!off.is_active());
        // wraps across Pisces/Aries
        assert_eq!(SadeSati::from_saturn_sign(Sign::Aries, Sign::Pisces).phase, SadeSatiPhase::Rising);
    }

    #[test]
    fn test_natal_aspects_conjunction_and_opposition() {
        // Moon at 5°, Mars at 230°, Jupiter at 95°
        let natal = chart(0.0, &[]);
        let hits = natal_aspects(&natal, 12.0);
        assert!(hits.contains(&Body::Moon));
        let opposite = natal_aspects(&natal, 188.0);
        assert!(opposite.contains(&Body::Moon));
        let none = natal_aspects(&natal, 160.0);
        assert!(!none.contains(&Body::Moon));
        assert!(natal_aspects(&natal, 275.0).contains(&Body::Jupiter));
    }

    fn record(body: Body, longitude: f64) -> TransitRecord {
        let current_sign = Sign::from_longitude(longitude);
        TransitRecord {
            body,
            longitude,
            house_from_moon: 1,
            house_from_lagna: 1,
            current_sign,
            retrograde: false,
            aspects_natal: Vec::new(),
        }
    }

    #[test]
    fn test_sade_sati_from_transit_records() {
        // Natal Moon at 5° Aries
        let natal = chart(0.0, &[]);
        let records = vec![record(Body::Sun, 100.0), record(Body::Saturn, 350.0)];
        let sati = SadeSati::from_transits(&natal, &records).unwrap();
        assert_eq!(sati.phase, SadeSatiPhase::Rising);
        assert_eq!(sati.saturn_sign, Sign::Pisces);
        assert_eq!(sati.house_from_moon, 12);

        let err = SadeSati::from_transits(&natal, &records[..1]).unwrap_err();
        assert!(matches!(err, KundliError::UpstreamUnavailable { .. }));
    }
}
