//! Nakshatra utilities for Vedic astrology.
//!
//! Nakshatras are 27 lunar mansions, each spanning 13°20' (360/27 degrees).
//! Each nakshatra is divided into 4 padas (quarters).

use serde::{Deserialize, Serialize};

use crate::vedic::zodiac::{normalize_degrees, Body, Nakshatra};

pub const NAKSHATRA_SEGMENT_SIZE: f64 = 360.0 / 27.0;
pub const PADA_SIZE: f64 = NAKSHATRA_SEGMENT_SIZE / 4.0;

/// Where a sidereal longitude falls within the nakshatra wheel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NakshatraPlacement {
    pub nakshatra: Nakshatra,
    pub lord: Body,
    /// Degrees elapsed since the start of the nakshatra.
    pub offset: f64,
    /// Fraction of the nakshatra already traversed, in [0, 1).
    pub progress: f64,
    pub pada: u8,
    #[serde(rename = "padaFraction")]
    pub pada_fraction: f64,
}

impl NakshatraPlacement {
    pub fn start_degree(&self) -> f64 {
        self.nakshatra.index() as f64 * NAKSHATRA_SEGMENT_SIZE
    }

    pub fn end_degree(&self) -> f64 {
        self.start_degree() + NAKSHATRA_SEGMENT_SIZE
    }
}

/// Return the nakshatra, lord, pada and progress for a sidereal longitude.
pub fn nakshatra_for_longitude(longitude: f64) -> NakshatraPlacement {
    let lon = normalize_degrees(longitude);
    let index = (lon / NAKSHATRA_SEGMENT_SIZE) as usize % 27;
    let nakshatra = Nakshatra::from_index(index);

    let offset = (lon - index as f64 * NAKSHATRA_SEGMENT_SIZE).max(0.0);
    // floating error at a segment edge must not produce a fifth pada
    let pada_index = ((offset / PADA_SIZE) as u8).min(3);
    let pada_offset = offset - pada_index as f64 * PADA_SIZE;

    NakshatraPlacement {
        nakshatra,
        lord: nakshatra.lord(),
        offset,
        progress: (offset / NAKSHATRA_SEGMENT_SIZE).min(1.0),
        pada: pada_index + 1,
        pada_fraction: (pada_offset / PADA_SIZE).min(1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nakshatra_for_longitude() {
        let meta = nakshatra_for_longitude(0.0);
        assert_eq!(meta.nakshatra, Nakshatra::Ashwini);
        assert_eq!(meta.lord, Body::Ketu);
        assert_eq!(meta.pada, 1);

        let meta2 = nakshatra_for_longitude(13.33);
        assert_eq!(meta2.nakshatra, Nakshatra::Ashwini);
        assert_eq!(meta2.pada, 4);

        let meta3 = nakshatra_for_longitude(13.34);
        assert_eq!(meta3.nakshatra, Nakshatra::Bharani);
        assert_eq!(meta3.lord, Body::Venus);
    }

    #[test]
    fn test_progress_matches_offset() {
        let meta = nakshatra_for_longitude(5.0);
        assert!((meta.progress - 0.375).abs() < 1e-9);
        assert_eq!(meta.pada, 2);
        assert!((meta.start_degree() - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_pada_stays_in_range_across_the_wheel() {
        let mut lon = 0.0;
        while lon < 360.0 {
            let meta = nakshatra_for_longitude(lon);
            assert!((1..=4).contains(&meta.pada), "pada {} at {}", meta.pada, lon);
            lon += 0.0917;
        }
        let last = nakshatra_for_longitude(359.999_999_999);
        assert_eq!(last.nakshatra, Nakshatra::Revati);
        assert_eq!(last.pada, 4);
    }
}
