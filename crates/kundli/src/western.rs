//! Tropical (western) layer: placements, major aspects and exaltation dignity.
//!
//! Everything here is read back from a [`NatalChart`] by adding its ayanamsa,
//! so no second ephemeris query is needed.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::vedic::chart::NatalChart;
use crate::vedic::dignities::{exaltation_sign, Dignity};
use crate::vedic::zodiac::{angular_distance, normalize_degrees, Body, Sign, SIGN_SPAN};

/// Forward step, in days, used to tell applying from separating aspects.
const APPLYING_STEP_DAYS: f64 = 0.1;
/// Relative speeds below this (deg/day) are treated as standing still.
const MIN_RELATIVE_SPEED: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectKind {
    Conjunction,
    Opposition,
    Trine,
    Square,
    Sextile,
}

impl AspectKind {
    pub const ALL: [AspectKind; 5] = [
        AspectKind::Conjunction,
        AspectKind::Opposition,
        AspectKind::Trine,
        AspectKind::Square,
        AspectKind::Sextile,
    ];

    pub fn exact_angle(self) -> f64 {
        match self {
            AspectKind::Conjunction => 0.0,
            AspectKind::Opposition => 180.0,
            AspectKind::Trine => 120.0,
            AspectKind::Square => 90.0,
            AspectKind::Sextile => 60.0,
        }
    }

    pub fn orb(self) -> f64 {
        match self {
            AspectKind::Sextile => 6.0,
            _ => 8.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AspectKind::Conjunction => "conjunction",
            AspectKind::Opposition => "opposition",
            AspectKind::Trine => "trine",
            AspectKind::Square => "square",
            AspectKind::Sextile => "sextile",
        }
    }
}

/// A body or angle on the tropical zodiac.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TropicalPosition {
    pub longitude: f64,
    pub speed: f64,
    pub retrograde: bool,
    pub sign: Sign,
    pub degree: u8,
    pub minute: u8,
}

impl TropicalPosition {
    pub fn new(longitude: f64, speed: f64, retrograde: bool) -> Self {
        let longitude = normalize_degrees(longitude);
        let degree_in_sign = longitude % SIGN_SPAN;
        TropicalPosition {
            longitude,
            speed,
            retrograde,
            sign: Sign::from_longitude(longitude),
            degree: degree_in_sign as u8,
            minute: ((degree_in_sign.fract() * 60.0) as u8).min(59),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WesternAspect {
    pub from: Body,
    pub to: Body,
    pub kind: AspectKind,
    /// Actual separation, 0..=180.
    pub angle: f64,
    /// Deviation from the exact angle.
    pub orb: f64,
    pub applying: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WesternChart {
    pub planets: BTreeMap<Body, TropicalPosition>,
    pub ascendant: TropicalPosition,
    pub midheaven: TropicalPosition,
    pub aspects: Vec<WesternAspect>,
    /// Exalted or Neutral for the seven visible grahas.
    pub dignities: BTreeMap<Body, Dignity>,
}

/// Whether the separation is closing on `exact` over the next short step.
fn is_applying(lon1: f64, lon2: f64, speed1: f64, speed2: f64, exact: f64, angle: f64) -> bool {
    let relative_speed = speed1 - speed2;
    if relative_speed.abs() < MIN_RELATIVE_SPEED {
        return angle < exact + 0.5;
    }
    let future = angular_distance(lon1 + relative_speed * APPLYING_STEP_DAYS, lon2);
    (future - exact).abs() < (angle - exact).abs()
}

/// The first major aspect (conjunction, opposition, trine, square, sextile)
/// whose orb contains the separation of the two longitudes.
pub fn aspect_between(
    from: (Body, f64, f64),
    to: (Body, f64, f64),
) -> Option<WesternAspect> {
    let (from_body, lon1, speed1) = from;
    let (to_body, lon2, speed2) = to;
    let angle = angular_distance(lon1, lon2);

    AspectKind::ALL.iter().find_map(|kind| {
        let orb = (angle - kind.exact_angle()).abs();
        (orb <= kind.orb()).then(|| WesternAspect {
            from: from_body,
            to: to_body,
            kind: *kind,
            angle,
            orb,
            applying: is_applying(lon1, lon2, speed1, speed2, kind.exact_angle(), angle),
        })
    })
}

/// Exalted in the tropical exaltation sign, Neutral elsewhere. `None` for the nodes.
pub fn western_dignity(body: Body, sign: Sign) -> Option<Dignity> {
    let exaltation = exaltation_sign(body)?;
    Some(if exaltation == sign {
        Dignity::Exalted
    } else {
        Dignity::Neutral
    })
}

/// Every pair of the ephemeris bodies, each pair once in canonical order.
pub fn find_aspects(planets: &BTreeMap<Body, TropicalPosition>) -> Vec<WesternAspect> {
    let bodies: Vec<(&Body, &TropicalPosition)> = planets.iter().collect();
    let mut aspects = Vec::new();
    for (i, (b1, p1)) in bodies.iter().enumerate() {
        for (b2, p2) in &bodies[i + 1..] {
            if let Some(aspect) =
                aspect_between((**b1, p1.longitude, p1.speed), (**b2, p2.longitude, p2.speed))
            {
                aspects.push(aspect);
            }
        }
    }
    aspects
}

pub fn build_western_chart(natal: &NatalChart) -> WesternChart {
    // Ketu always opposes Rahu; it is left out of the pairwise scan
    let planets: BTreeMap<Body, TropicalPosition> = Body::EPHEMERIS
        .iter()
        .filter_map(|body| {
            let p = natal.planet(*body)?;
            Some((
                *body,
                TropicalPosition::new(p.longitude + natal.ayanamsa, p.speed, p.retrograde),
            ))
        })
        .collect();

    let dignities = planets
        .iter()
        .filter_map(|(body, p)| western_dignity(*body, p.sign).map(|d| (*body, d)))
        .collect();
    let aspects = find_aspects(&planets);
    debug!("Western layer: {} aspects among {} bodies", aspects.len(), planets.len());

    WesternChart {
        ascendant: TropicalPosition::new(natal.ascendant.longitude + natal.ayanamsa, 0.0, false),
        midheaven: TropicalPosition::new(natal.midheaven + natal.ayanamsa, 0.0, false),
        planets,
        aspects,
        dignities,
    }
}
