//! Yoga detection helpers for Vedic astrology.
//!
//! Yogas are planetary combinations that indicate specific life outcomes. Raja, Dhana
//! and Vipareeta-Raja are simplified placement proxies rather than lordship checks.

use serde::{Deserialize, Serialize};

use crate::vedic::chart::NatalChart;
use crate::vedic::zodiac::Body;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum YogaKind {
    Gajakesari,
    BudhaAditya,
    ChandraMangal,
    RajaYoga,
    DhanaYoga,
    VipareetaRaja,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Yoga {
    pub kind: YogaKind,
    #[serde(rename = "type")]
    pub yoga_type: String, // "benefic", "malefic", "mixed"
    pub description: String,
    pub present: bool,
}

const KENDRAS: [u8; 4] = [1, 4, 7, 10];
const DUSTHANAS: [u8; 3] = [6, 8, 12];

impl YogaKind {
    pub const ALL: [YogaKind; 6] = [
        YogaKind::Gajakesari,
        YogaKind::BudhaAditya,
        YogaKind::ChandraMangal,
        YogaKind::RajaYoga,
        YogaKind::DhanaYoga,
        YogaKind::VipareetaRaja,
    ];

    /// Signal key, e.g. "Gajakesari".
    pub fn name(self) -> &'static str {
        match self {
            YogaKind::Gajakesari => "Gajakesari",
            YogaKind::BudhaAditya => "BudhaAditya",
            YogaKind::ChandraMangal => "ChandraMangal",
            YogaKind::RajaYoga => "RajaYoga",
            YogaKind::DhanaYoga => "DhanaYoga",
            YogaKind::VipareetaRaja => "VipareetaRaja",
        }
    }

    fn describe(self) -> (&'static str, &'static str) {
        match self {
            YogaKind::Gajakesari => ("benefic", "Moon and Jupiter both in kendras from Lagna"),
            YogaKind::BudhaAditya => ("benefic", "Sun and Mercury share a sign"),
            YogaKind::ChandraMangal => ("mixed", "Moon and Mars share a sign"),
            YogaKind::RajaYoga => ("benefic", "Jupiter in 5th or 9th with the Sun in the 10th"),
            YogaKind::DhanaYoga => ("benefic", "Jupiter or Venus in the 2nd or 11th"),
            YogaKind::VipareetaRaja => ("mixed", "Saturn and Mars both in dusthanas"),
        }
    }
}

fn house(chart: &NatalChart, body: Body) -> Option<u8> {
    chart.d1.house_of(body)
}

fn house_in(chart: &NatalChart, body: Body, houses: &[u8]) -> bool {
    house(chart, body).map_or(false, |h| houses.contains(&h))
}

fn same_sign(chart: &NatalChart, a: Body, b: Body) -> bool {
    match (chart.planet(a), chart.planet(b)) {
        (Some(pa), Some(pb)) => pa.sign == pb.sign,
        _ => false,
    }
}

fn is_present(kind: YogaKind, chart: &NatalChart) -> bool {
    match kind {
        YogaKind::Gajakesari => {
            house_in(chart, Body::Moon, &KENDRAS) && house_in(chart, Body::Jupiter, &KENDRAS)
        }
        YogaKind::BudhaAditya => same_sign(chart, Body::Sun, Body::Mercury),
        YogaKind::ChandraMangal => same_sign(chart, Body::Moon, Body::Mars),
        YogaKind::RajaYoga => {
            house_in(chart, Body::Jupiter, &[5, 9]) && house(chart, Body::Sun) == Some(10)
        }
        YogaKind::DhanaYoga => {
            house_in(chart, Body::Jupiter, &[2, 11]) || house_in(chart, Body::Venus, &[2, 11])
        }
        YogaKind::VipareetaRaja => {
            house_in(chart, Body::Saturn, &DUSTHANAS) && house_in(chart, Body::Mars, &DUSTHANAS)
        }
    }
}

/// Evaluate every known yoga; absent ones are reported with `present: false`.
pub fn identify_yogas(chart: &NatalChart) -> Vec<Yoga> {
    YogaKind::ALL
        .iter()
        .map(|kind| {
            let (yoga_type, description) = kind.describe();
            Yoga {
                kind: *kind,
                yoga_type: yoga_type.to_string(),
                description: description.to_string(),
                present: is_present(*kind, chart),
            }
        })
        .collect()
}
