//! Signs, grahas and nakshatras with their fixed lookup tables.
//!
//! All tables here are read-only constants; nothing in this module holds state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::KundliError;

pub const SIGN_SPAN: f64 = 30.0;

/// Normalize degrees to [0, 360).
pub fn normalize_degrees(value: f64) -> f64 {
    let normalized = value.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// Shortest arc between two longitudes, in [0, 180].
pub fn angular_distance(lon1: f64, lon2: f64) -> f64 {
    let diff = (normalize_degrees(lon1) - normalize_degrees(lon2)).abs();
    diff.min(360.0 - diff)
}

/// House number (1-12) of `target` counted from `reference`, whole-sign.
pub fn house_from(reference: Sign, target: Sign) -> u8 {
    ((target.index() + 12 - reference.index()) % 12) as u8 + 1
}

/// Advance a house number by `offset` houses, wrapping within 1-12.
pub fn advance_house(house: u8, offset: u8) -> u8 {
    ((house as usize - 1 + offset as usize) % 12) as u8 + 1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Movable,
    Fixed,
    Dual,
}

const SIGN_NAMES: [&str; 12] = [
    "Aries", "Taurus", "Gemini", "Cancer",
    "Leo", "Virgo", "Libra", "Scorpio",
    "Sagittarius", "Capricorn", "Aquarius", "Pisces",
];

const SIGN_LORDS: [Body; 12] = [
    Body::Mars,    // Aries
    Body::Venus,   // Taurus
    Body::Mercury, // Gemini
    Body::Moon,    // Cancer
    Body::Sun,     // Leo
    Body::Mercury, // Virgo
    Body::Venus,   // Libra
    Body::Mars,    // Scorpio
    Body::Jupiter, // Sagittarius
    Body::Saturn,  // Capricorn
    Body::Saturn,  // Aquarius
    Body::Jupiter, // Pisces
];

impl Sign {
    pub const ALL: [Sign; 12] = [
        Sign::Aries,
        Sign::Taurus,
        Sign::Gemini,
        Sign::Cancer,
        Sign::Leo,
        Sign::Virgo,
        Sign::Libra,
        Sign::Scorpio,
        Sign::Sagittarius,
        Sign::Capricorn,
        Sign::Aquarius,
        Sign::Pisces,
    ];

    /// 0 = Aries ... 11 = Pisces.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Sign {
        Sign::ALL[index % 12]
    }

    pub fn from_longitude(longitude: f64) -> Sign {
        Sign::from_index((normalize_degrees(longitude) / SIGN_SPAN) as usize)
    }

    pub fn name(self) -> &'static str {
        SIGN_NAMES[self.index()]
    }

    /// Traditional (seven-graha) ruler.
    pub fn lord(self) -> Body {
        SIGN_LORDS[self.index()]
    }

    pub fn modality(self) -> Modality {
        match self.index() % 3 {
            0 => Modality::Movable,
            1 => Modality::Fixed,
            _ => Modality::Dual,
        }
    }

    /// Odd signs in the 1-based count (Aries, Gemini, Leo...), i.e. even 0-based indices.
    pub fn is_odd(self) -> bool {
        self.index() % 2 == 0
    }

    /// The sign `count` places on, where count 1 is the sign itself.
    pub fn nth_from(self, count: usize) -> Sign {
        Sign::from_index(self.index() + count - 1)
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Sign {
    type Err = KundliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sign::ALL
            .iter()
            .copied()
            .find(|sign| sign.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| KundliError::input(format!("Unknown sign: {}", s)))
    }
}

/// The nine grahas, in chart order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Rahu,
    Ketu,
}

impl Body {
    pub const ALL: [Body; 9] = [
        Body::Sun,
        Body::Moon,
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Rahu,
        Body::Ketu,
    ];

    /// Bodies the ephemeris must supply; Ketu is always derived from Rahu.
    pub const EPHEMERIS: [Body; 8] = [
        Body::Sun,
        Body::Moon,
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Rahu,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Body::Sun => "Sun",
            Body::Moon => "Moon",
            Body::Mercury => "Mercury",
            Body::Venus => "Venus",
            Body::Mars => "Mars",
            Body::Jupiter => "Jupiter",
            Body::Saturn => "Saturn",
            Body::Rahu => "Rahu",
            Body::Ketu => "Ketu",
        }
    }

    pub fn is_node(self) -> bool {
        matches!(self, Body::Rahu | Body::Ketu)
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Body {
    type Err = KundliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Body::ALL
            .iter()
            .copied()
            .find(|body| body.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| KundliError::input(format!("Unknown body: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Nakshatra {
    Ashwini,
    Bharani,
    Krittika,
    Rohini,
    Mrigashira,
    Ardra,
    Punarvasu,
    Pushya,
    Ashlesha,
    Magha,
    PurvaPhalguni,
    UttaraPhalguni,
    Hasta,
    Chitra,
    Swati,
    Vishakha,
    Anuradha,
    Jyeshtha,
    Mula,
    PurvaAshadha,
    UttaraAshadha,
    Shravana,
    Dhanishta,
    Shatabhisha,
    PurvaBhadrapada,
    UttaraBhadrapada,
    Revati,
}

// (nakshatra, display name, lord). The lords run through the dasha order three times.
const NAKSHATRA_TABLE: [(Nakshatra, &str, Body); 27] = [
    (Nakshatra::Ashwini, "Ashwini", Body::Ketu),
    (Nakshatra::Bharani, "Bharani", Body::Venus),
    (Nakshatra::Krittika, "Krittika", Body::Sun),
    (Nakshatra::Rohini, "Rohini", Body::Moon),
    (Nakshatra::Mrigashira, "Mrigashira", Body::Mars),
    (Nakshatra::Ardra, "Ardra", Body::Rahu),
    (Nakshatra::Punarvasu, "Punarvasu", Body::Jupiter),
    (Nakshatra::Pushya, "Pushya", Body::Saturn),
    (Nakshatra::Ashlesha, "Ashlesha", Body::Mercury),
    (Nakshatra::Magha, "Magha", Body::Ketu),
    (Nakshatra::PurvaPhalguni, "Purva Phalguni", Body::Venus),
    (Nakshatra::UttaraPhalguni, "Uttara Phalguni", Body::Sun),
    (Nakshatra::Hasta, "Hasta", Body::Moon),
    (Nakshatra::Chitra, "Chitra", Body::Mars),
    (Nakshatra::Swati, "Swati", Body::Rahu),
    (Nakshatra::Vishakha, "Vishakha", Body::Jupiter),
    (Nakshatra::Anuradha, "Anuradha", Body::Saturn),
    (Nakshatra::Jyeshtha, "Jyeshtha", Body::Mercury),
    (Nakshatra::Mula, "Mula", Body::Ketu),
    (Nakshatra::PurvaAshadha, "Purva Ashadha", Body::Venus),
    (Nakshatra::UttaraAshadha, "Uttara Ashadha", Body::Sun),
    (Nakshatra::Shravana, "Shravana", Body::Moon),
    (Nakshatra::Dhanishta, "Dhanishta", Body::Mars),
    (Nakshatra::Shatabhisha, "Shatabhisha", Body::Rahu),
    (Nakshatra::PurvaBhadrapada, "Purva Bhadrapada", Body::Jupiter),
    (Nakshatra::UttaraBhadrapada, "Uttara Bhadrapada", Body::Saturn),
    (Nakshatra::Revati, "Revati", Body::Mercury),
];

impl Nakshatra {
    pub fn from_index(index: usize) -> Nakshatra {
        NAKSHATRA_TABLE[index % 27].0
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        NAKSHATRA_TABLE[self.index()].1
    }

    /// Vimshottari ruler of the nakshatra.
    pub fn lord(self) -> Body {
        NAKSHATRA_TABLE[self.index()].2
    }
}

impl fmt::Display for Nakshatra {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
