use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::KundliError;
use crate::vedic::zodiac::Body;

/// Geographic location coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub lat: f64,
    pub lon: f64,
}

/// Tropical position of one body as reported by the ephemeris
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyPosition {
    /// Longitude in degrees (0-360)
    pub lon: f64,
    /// Latitude in degrees
    pub lat: f64,
    /// Speed in longitude (degrees per day)
    pub speed_lon: f64,
}

impl BodyPosition {
    pub fn is_retrograde(&self) -> bool {
        self.speed_lon < 0.0
    }
}

/// Ascendant, midheaven and the twelve house cusps, all tropical
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HouseAngles {
    pub ascendant: f64,
    pub midheaven: f64,
    pub cusps: [f64; 12],
}

/// One body inside a snapshot, with the retrograde flag resolved
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapshotBody {
    pub lon: f64,
    pub lat: f64,
    pub speed_lon: f64,
    pub retrograde: bool,
}

/// Everything the ephemeris says about one (instant, location) pair.
/// Ketu is always present and always Rahu + 180°.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CelestialSnapshot {
    pub instant: DateTime<Utc>,
    #[serde(rename = "julianDay")]
    pub julian_day: f64,
    pub location: GeoLocation,
    #[serde(rename = "houseSystem")]
    pub house_system: HouseSystem,
    pub bodies: BTreeMap<Body, SnapshotBody>,
    pub ascendant: f64,
    pub midheaven: f64,
    pub cusps: [f64; 12],
}

impl CelestialSnapshot {
    pub fn body(&self, body: Body) -> Option<&SnapshotBody> {
        self.bodies.get(&body)
    }
}

/// House system understood by the ephemeris adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HouseSystem {
    Placidus,
    WholeSign,
    Koch,
    Equal,
    Regiomontanus,
    Campanus,
    Alcabitius,
    Morinus,
}

/// House system mapping: (name, single-letter code)
const HOUSE_SYSTEMS: &[(HouseSystem, &str, u8)] = &[
    (HouseSystem::Placidus, "placidus", b'P'),
    (HouseSystem::WholeSign, "whole_sign", b'W'),
    (HouseSystem::Koch, "koch", b'K'),
    (HouseSystem::Equal, "equal", b'E'),
    (HouseSystem::Regiomontanus, "regiomontanus", b'R'),
    (HouseSystem::Campanus, "campanus", b'C'),
    (HouseSystem::Alcabitius, "alcabitius", b'A'),
    (HouseSystem::Morinus, "morinus", b'M'),
];

impl HouseSystem {
    pub fn name(self) -> &'static str {
        HOUSE_SYSTEMS
            .iter()
            .find(|(system, _, _)| *system == self)
            .map(|(_, name, _)| *name)
            .unwrap_or("placidus")
    }

    /// Single-letter code conventionally used by ephemeris libraries.
    pub fn code(self) -> u8 {
        HOUSE_SYSTEMS
            .iter()
            .find(|(system, _, _)| *system == self)
            .map(|(_, _, code)| *code)
            .unwrap_or(b'P')
    }
}

impl Default for HouseSystem {
    fn default() -> Self {
        HouseSystem::Placidus
    }
}

impl fmt::Display for HouseSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HouseSystem {
    type Err = KundliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        HOUSE_SYSTEMS
            .iter()
            .find(|(_, name, _)| *name == wanted)
            .map(|(system, _, _)| *system)
            .ok_or_else(|| {
                KundliError::Configuration(format!(
                    "Invalid house system: {}. Valid systems: {:?}",
                    s,
                    HOUSE_SYSTEMS.iter().map(|(_, name, _)| *name).collect::<Vec<_>>()
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_house_system_round_trip() {
        assert_eq!("Whole_Sign".parse::<HouseSystem>().unwrap(), HouseSystem::WholeSign);
        assert_eq!(HouseSystem::Koch.code(), b'K');
        assert_eq!(HouseSystem::default().name(), "placidus");
    }

    #[test]
    fn test_unknown_house_system_is_configuration_error() {
        match "topocentric".parse::<HouseSystem>() {
            Err(KundliError::Configuration(msg)) => assert!(msg.contains("topocentric")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
