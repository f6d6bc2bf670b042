//! Divisional chart (varga) helpers for Vedic astrology.
//!
//! Vargas are derived charts that divide each sign into multiple parts.
//! Only D1 (Rashi), D9 (Navamsa) and D10 (Dashamsa) are produced. The D9 and D10
//! start-sign rules are the simplified conventions the rule weights were tuned
//! against; keep the arithmetic as is.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::vedic::zodiac::{house_from, normalize_degrees, Body, Modality, Sign, SIGN_SPAN};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Varga {
    D1,
    D9,
    D10,
}

pub struct VargaSpec {
    pub label: &'static str,
    pub division: u8,
}

pub const SUPPORTED_VARGAS: &[(Varga, VargaSpec)] = &[
    (Varga::D1, VargaSpec { label: "Rashi", division: 1 }),
    (Varga::D9, VargaSpec { label: "Navamsa", division: 9 }),
    (Varga::D10, VargaSpec { label: "Dashamsa", division: 10 }),
];

// Sign offset at which the navamsa count starts, by modality
const NAVAMSA_OFFSETS: [usize; 3] = [
    0, // movable -> same sign
    8, // fixed -> 9th from it
    4, // dual -> 5th from it
];

impl Varga {
    pub fn spec(self) -> &'static VargaSpec {
        SUPPORTED_VARGAS
            .iter()
            .find(|(varga, _)| *varga == self)
            .map(|(_, spec)| spec)
            .unwrap_or(&SUPPORTED_VARGAS[0].1)
    }

    /// The sign a sidereal longitude occupies in this divisional chart.
    pub fn sign_for(self, longitude: f64) -> Sign {
        match self {
            Varga::D1 => Sign::from_longitude(longitude),
            Varga::D9 => navamsa_sign(longitude),
            Varga::D10 => dashamsa_sign(longitude),
        }
    }
}

fn segment_index(longitude: f64, division: u8) -> usize {
    let degree_in_sign = normalize_degrees(longitude) % SIGN_SPAN;
    let width = SIGN_SPAN / division as f64;
    ((degree_in_sign / width) as usize).min(division as usize - 1)
}

/// Navamsa sign: movable signs count from themselves, fixed from the 9th,
/// dual from the 5th, in 3°20' steps.
pub fn navamsa_sign(longitude: f64) -> Sign {
    let sign = Sign::from_longitude(longitude);
    let offset = match sign.modality() {
        Modality::Movable => NAVAMSA_OFFSETS[0],
        Modality::Fixed => NAVAMSA_OFFSETS[1],
        Modality::Dual => NAVAMSA_OFFSETS[2],
    };
    Sign::from_index(sign.index() + offset + segment_index(longitude, 9))
}

/// Dashamsa sign: odd signs count from themselves, even signs from the 9th, in 3° steps.
pub fn dashamsa_sign(longitude: f64) -> Sign {
    let sign = Sign::from_longitude(longitude);
    let start = if sign.is_odd() { sign.index() } else { sign.index() + 8 };
    Sign::from_index(start + segment_index(longitude, 10))
}

/// House number (1-12) -> bodies placed there. Every house key is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseChart {
    pub lagna: Sign,
    pub houses: BTreeMap<u8, Vec<Body>>,
}

impl HouseChart {
    pub fn new(lagna: Sign) -> Self {
        Self {
            lagna,
            houses: (1..=12).map(|house| (house, Vec::new())).collect(),
        }
    }

    pub fn place(&mut self, body: Body, sign: Sign) -> u8 {
        let house = house_from(self.lagna, sign);
        self.houses.entry(house).or_default().push(body);
        house
    }

    pub fn house_of(&self, body: Body) -> Option<u8> {
        self.houses
            .iter()
            .find(|(_, bodies)| bodies.contains(&body))
            .map(|(house, _)| *house)
    }

    pub fn bodies_in(&self, house: u8) -> &[Body] {
        self.houses.get(&house).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Build the house chart of a varga from the ascendant and body longitudes (all sidereal).
pub fn build_varga_chart<I>(varga: Varga, ascendant: f64, bodies: I) -> HouseChart
where
    I: IntoIterator<Item = (Body, f64)>,
{
    let mut chart = HouseChart::new(varga.sign_for(ascendant));
    for (body, longitude) in bodies {
        chart.place(body, varga.sign_for(longitude));
    }
    chart
}
