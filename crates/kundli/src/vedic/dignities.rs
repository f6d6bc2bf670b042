//! Dignity, combustion and strength scoring for the seven visible grahas.
//!
//! Rahu and Ketu carry no dignity; they still receive a strength score from
//! their house placement and motion.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::vedic::zodiac::{angular_distance, Body, Sign};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dignity {
    Exalted,
    Debilitated,
    Mooltrikona,
    Own,
    Neutral,
}

impl Dignity {
    pub fn name(self) -> &'static str {
        match self {
            Dignity::Exalted => "Exalted",
            Dignity::Debilitated => "Debilitated",
            Dignity::Mooltrikona => "Mooltrikona",
            Dignity::Own => "Own",
            Dignity::Neutral => "Neutral",
        }
    }

    /// Contribution to the strength score.
    pub fn bonus(self) -> f64 {
        match self {
            Dignity::Exalted => 0.3,
            Dignity::Mooltrikona => 0.2,
            Dignity::Own => 0.15,
            Dignity::Debilitated => -0.3,
            Dignity::Neutral => 0.0,
        }
    }
}

impl fmt::Display for Dignity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const EXALTATION: &[(Body, Sign)] = &[
    (Body::Sun, Sign::Aries),
    (Body::Moon, Sign::Taurus),
    (Body::Mars, Sign::Capricorn),
    (Body::Mercury, Sign::Virgo),
    (Body::Jupiter, Sign::Cancer),
    (Body::Venus, Sign::Pisces),
    (Body::Saturn, Sign::Libra),
];

const DEBILITATION: &[(Body, Sign)] = &[
    (Body::Sun, Sign::Libra),
    (Body::Moon, Sign::Scorpio),
    (Body::Mars, Sign::Cancer),
    (Body::Mercury, Sign::Pisces),
    (Body::Jupiter, Sign::Capricorn),
    (Body::Venus, Sign::Virgo),
    (Body::Saturn, Sign::Aries),
];

// The Moon has no entry here
const MOOLTRIKONA: &[(Body, Sign)] = &[
    (Body::Sun, Sign::Leo),
    (Body::Mars, Sign::Aries),
    (Body::Mercury, Sign::Virgo),
    (Body::Jupiter, Sign::Sagittarius),
    (Body::Venus, Sign::Libra),
    (Body::Saturn, Sign::Aquarius),
];

/// Combustion orbs in degrees from the Sun
const COMBUSTION_ORBS: &[(Body, f64)] = &[
    (Body::Mercury, 12.0),
    (Body::Venus, 10.0),
    (Body::Mars, 17.0),
    (Body::Jupiter, 11.0),
    (Body::Saturn, 15.0),
];

/// Houses from Lagna that add to strength: kendras, trikonas and the 11th.
const STRONG_HOUSES: [u8; 7] = [1, 4, 5, 7, 9, 10, 11];

fn table_sign(table: &[(Body, Sign)], body: Body) -> Option<Sign> {
    table.iter().find(|(b, _)| *b == body).map(|(_, sign)| *sign)
}

/// Classify a body in a sign. `None` for the lunar nodes.
pub fn dignity(body: Body, sign: Sign) -> Option<Dignity> {
    if body.is_node() {
        return None;
    }
    let classified = if table_sign(EXALTATION, body) == Some(sign) {
        Dignity::Exalted
    } else if table_sign(DEBILITATION, body) == Some(sign) {
        Dignity::Debilitated
    } else if table_sign(MOOLTRIKONA, body) == Some(sign) {
        Dignity::Mooltrikona
    } else if sign.lord() == body {
        Dignity::Own
    } else {
        Dignity::Neutral
    };
    Some(classified)
}

/// Exaltation sign of a visible graha.
pub fn exaltation_sign(body: Body) -> Option<Sign> {
    table_sign(EXALTATION, body)
}

pub fn combustion_orb(body: Body) -> Option<f64> {
    COMBUSTION_ORBS
        .iter()
        .find(|(b, _)| *b == body)
        .map(|(_, orb)| *orb)
}

/// Whether a body is combust. `None` for bodies without a combustion orb.
pub fn is_combust(body: Body, longitude: f64, sun_longitude: f64) -> Option<bool> {
    combustion_orb(body).map(|orb| angular_distance(longitude, sun_longitude) <= orb)
}

/// Composite strength in [0, 1].
pub fn strength_score(
    dignity: Option<Dignity>,
    house_from_lagna: u8,
    retrograde: bool,
    combust: bool,
) -> f64 {
    let mut score = 0.5 + dignity.map(Dignity::bonus).unwrap_or(0.0);
    if STRONG_HOUSES.contains(&house_from_lagna) {
        score += 0.1;
    }
    if retrograde {
        score -= 0.05;
    }
    if combust {
        score -= 0.1;
    }
    score.clamp(0.0, 1.0)
}
