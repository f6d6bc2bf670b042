//! Vimshottari dasha calculations for Vedic astrology.
//!
//! Dashas are time periods ruled by planets, calculated based on the Moon's nakshatra.
//! Mahadashas cover the whole 120-year cycle from birth; Antardashas are expanded
//! only for the current Mahadasha and the first two in sequence.

use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{KundliError, Result};
use crate::vedic::nakshatra::nakshatra_for_longitude;
use crate::vedic::zodiac::{Body, Nakshatra};

pub const VIMSHOTTARI_TOTAL_YEARS: f64 = 120.0;
pub const VIMSHOTTARI_YEAR_DAYS: f64 = 365.25;
const MILLIS_PER_YEAR: f64 = VIMSHOTTARI_YEAR_DAYS * 86_400_000.0;

/// Mahadashas always expanded regardless of currency
const EXPANDED_LEADING_PERIODS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashaLevel {
    Mahadasha,
    Antardasha,
}

const VIMSHOTTARI_SEQUENCE: [(Body, f64); 9] = [
    (Body::Ketu, 7.0),
    (Body::Venus, 20.0),
    (Body::Sun, 6.0),
    (Body::Moon, 10.0),
    (Body::Mars, 7.0),
    (Body::Rahu, 18.0),
    (Body::Jupiter, 16.0),
    (Body::Saturn, 19.0),
    (Body::Mercury, 17.0),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashaPeriod {
    #[serde(rename = "mahaLord")]
    pub maha_lord: Body,
    #[serde(rename = "antarLord", skip_serializing_if = "Option::is_none", default)]
    pub antar_lord: Option<Body>,
    pub level: DashaLevel,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(rename = "durationYears")]
    pub duration_years: f64,
    #[serde(rename = "isCurrent")]
    pub is_current: bool,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<DashaPeriod>,
}

impl DashaPeriod {
    /// The ruling body of this node: the Antar lord for sub-periods.
    pub fn lord(&self) -> Body {
        self.antar_lord.unwrap_or(self.maha_lord)
    }

    /// "Jupiter" for a Mahadasha, "Jupiter/Saturn" for an Antardasha.
    pub fn label(&self) -> String {
        match self.antar_lord {
            Some(antar) => format!("{}/{}", self.maha_lord, antar),
            None => self.maha_lord.to_string(),
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VimshottariDasha {
    pub birth: DateTime<Utc>,
    #[serde(rename = "birthNakshatra")]
    pub birth_nakshatra: Nakshatra,
    #[serde(rename = "birthLord")]
    pub birth_lord: Body,
    #[serde(rename = "balanceYears")]
    pub balance_years: f64,
    pub periods: Vec<DashaPeriod>,
}

impl VimshottariDasha {
    pub fn current_maha(&self) -> Option<&DashaPeriod> {
        self.periods.iter().find(|p| p.is_current)
    }

    pub fn current_antar(&self) -> Option<&DashaPeriod> {
        self.current_maha()
            .and_then(|maha| maha.children.iter().find(|p| p.is_current))
    }

    /// False when "now" lies outside the cycle; callers treat that as insufficient data.
    pub fn has_current(&self) -> bool {
        self.current_maha().is_some()
    }

    /// Every node in chronological order, each Mahadasha followed by its children.
    pub fn flatten(&self) -> Vec<&DashaPeriod> {
        let mut nodes = Vec::new();
        for maha in &self.periods {
            nodes.push(maha);
            nodes.extend(maha.children.iter());
        }
        nodes
    }
}

/// Full allotment of a lord in the 120-year cycle.
pub fn dasha_years(lord: Body) -> f64 {
    VIMSHOTTARI_SEQUENCE
        .iter()
        .find(|(body, _)| *body == lord)
        .map(|(_, years)| *years)
        .unwrap_or(0.0)
}

fn find_sequence_index(lord: Body) -> usize {
    VIMSHOTTARI_SEQUENCE
        .iter()
        .position(|(body, _)| *body == lord)
        .unwrap_or(0)
}

/// The dasha order rotated to begin at `lord`.
pub fn sequence_starting_at(lord: Body) -> [Body; 9] {
    let start = find_sequence_index(lord);
    let mut sequence = [Body::Ketu; 9];
    for (offset, slot) in sequence.iter_mut().enumerate() {
        *slot = VIMSHOTTARI_SEQUENCE[(start + offset) % 9].0;
    }
    sequence
}

/// Parse a body name and return the dasha order starting at it.
pub fn sequence_from(lord: &str) -> Result<[Body; 9]> {
    let body: Body = lord
        .parse()
        .map_err(|_| KundliError::input(format!("Unknown dasha lord: {}", lord)))?;
    Ok(sequence_starting_at(body))
}

fn add_millis(start: DateTime<Utc>, millis: i64) -> Result<DateTime<Utc>> {
    start
        .checked_add_signed(Duration::milliseconds(millis))
        .ok_or_else(|| {
            KundliError::ComputationInconsistency(format!(
                "dasha boundary overflows calendar ({} + {}ms)",
                start, millis
            ))
        })
}

/// Compute the Vimshottari Mahadashas from the Moon's sidereal longitude at birth.
pub fn compute_vimshottari(
    moon_longitude: f64,
    birth: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<VimshottariDasha> {
    let moon_meta = nakshatra_for_longitude(moon_longitude);
    let birth_lord = moon_meta.lord;
    let balance_years = dasha_years(birth_lord) * (1.0 - moon_meta.progress);

    let mut current_start = birth;
    let mut periods: Vec<DashaPeriod> = Vec::with_capacity(9);

    for (offset, lord) in sequence_starting_at(birth_lord).into_iter().enumerate() {
        // First period is partial depending on Moon's position within the nakshatra
        let years = if offset == 0 { balance_years } else { dasha_years(lord) };
        let end = add_millis(current_start, (years * MILLIS_PER_YEAR).round() as i64)?;

        let mut period = DashaPeriod {
            maha_lord: lord,
            antar_lord: None,
            level: DashaLevel::Mahadasha,
            start: current_start,
            end,
            duration_years: years,
            is_current: false,
            children: Vec::new(),
        };
        period.is_current = period.contains(now);

        if period.is_current || offset < EXPANDED_LEADING_PERIODS {
            period.children = expand_antardashas(&period, now)?;
        }

        current_start = period.end;
        periods.push(period);
    }

    debug!(
        "Vimshottari from {} ({}): balance {:.3}y, current {:?}",
        moon_meta.nakshatra,
        birth_lord,
        balance_years,
        periods.iter().find(|p| p.is_current).map(|p| p.maha_lord)
    );

    Ok(VimshottariDasha {
        birth,
        birth_nakshatra: moon_meta.nakshatra,
        birth_lord,
        balance_years,
        periods,
    })
}

/// Split a Mahadasha into nine contiguous sub-periods in proportion to each lord's years.
fn expand_antardashas(maha: &DashaPeriod, now: DateTime<Utc>) -> Result<Vec<DashaPeriod>> {
    let span_millis = (maha.end - maha.start).num_milliseconds();
    if span_millis <= 0 {
        warn!(
            "Mahadasha {} has zero span ({}); antardashas not expanded",
            maha.maha_lord, maha.start
        );
        return Ok(Vec::new());
    }

    let sequence = sequence_starting_at(maha.maha_lord);
    let mut children = Vec::with_capacity(9);
    let mut child_start = maha.start;

    for (offset, antar) in sequence.into_iter().enumerate() {
        let end = if offset == sequence.len() - 1 {
            // pinned so the children tile the parent exactly
            maha.end
        } else {
            let share = span_millis as f64 * dasha_years(antar) / VIMSHOTTARI_TOTAL_YEARS;
            add_millis(child_start, share.round() as i64)?
        };
        let child_millis = (end - child_start).num_milliseconds();

        let mut child = DashaPeriod {
            maha_lord: maha.maha_lord,
            antar_lord: Some(antar),
            level: DashaLevel::Antardasha,
            start: child_start,
            end,
            duration_years: child_millis as f64 / MILLIS_PER_YEAR,
            is_current: false,
            children: Vec::new(),
        };
        child.is_current = child.contains(now);
        child_start = end;
        children.push(child);
    }

    Ok(children)
}
