//! Theme insights for the running Mahadasha and Antardasha.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::vedic::chart::NatalChart;
use crate::vedic::dashas::{DashaPeriod, VimshottariDasha};
use crate::vedic::zodiac::Body;

fn maha_themes(lord: Body) -> &'static [&'static str] {
    match lord {
        Body::Ketu => &[
            "Detachment, simplification and inner inquiry",
            "Research and quiet background work go well",
            "Cut distractions and keep routines tight",
        ],
        Body::Venus => &[
            "Relationships, comfort, art and harmony",
            "Money matters and creative partnerships are favoured",
            "Look for arrangements where both sides gain",
        ],
        Body::Sun => &[
            "Leadership, visibility and responsibility",
            "Recognition follows consistent performance",
            "Own your decisions and lead fairly",
        ],
        Body::Moon => &[
            "Home, feelings, care and wellbeing",
            "Supportive and caregiving roles prosper",
            "Steady your habits and protect your rest",
        ],
        Body::Mars => &[
            "Drive, courage, technical work and competition",
            "Plenty of energy for decisive progress",
            "Direct the effort and sidestep needless conflict",
        ],
        Body::Rahu => &[
            "Ambition, technology, foreign links and innovation",
            "Unusual paths and bold strategies open up",
            "Keep ethics and checks in place while growing",
        ],
        Body::Jupiter => &[
            "Growth, study, counsel and mentorship",
            "Expansion through sound judgement",
            "Share what you know and stay realistic",
        ],
        Body::Saturn => &[
            "Structure, discipline, duty and foundations",
            "Slow progress that builds for the long term",
            "Work at a sustainable pace within your limits",
        ],
        Body::Mercury => &[
            "Communication, analysis, trade and teaching",
            "Careful improvements and good documentation",
            "Put agreements in writing and iterate",
        ],
    }
}

fn antar_modifier(lord: Body) -> &'static str {
    match lord {
        Body::Ketu => "Trim down to what matters",
        Body::Venus => "Lean on harmony and alliances",
        Body::Sun => "Take the lead and be seen",
        Body::Moon => "Watch your moods and gather support",
        Body::Mars => "Act decisively and channel the energy",
        Body::Rahu => "Innovate, but test your assumptions",
        Body::Jupiter => "Learn, mentor and expand with care",
        Body::Saturn => "Build structure and keep at it",
        Body::Mercury => "Speak plainly and polish the details",
    }
}

fn house_theme(house: u8) -> Option<&'static str> {
    let theme = match house {
        1 => "Self, vitality and direction",
        2 => "Money, speech and values",
        3 => "Skills, messages and initiative",
        4 => "Home, roots and emotional footing",
        5 => "Creativity, study and self-expression",
        6 => "Service, routines and health",
        7 => "Partnerships and agreements",
        8 => "Change, research and shared resources",
        9 => "Higher learning, travel and beliefs",
        10 => "Career, standing and responsibility",
        11 => "Gains, networks and goals",
        12 => "Rest, retreat and spending",
        _ => return None,
    };
    Some(theme)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodInsight {
    pub planet: Body,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// "Name (Pada n)" of the lord's natal nakshatra.
    pub nakshatra: Option<String>,
    pub house: Option<u8>,
    pub themes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashaInsights {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mahadasha: Option<PeriodInsight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub antardasha: Option<PeriodInsight>,
}

fn insight_for(natal: &NatalChart, period: &DashaPeriod, mut themes: Vec<String>) -> PeriodInsight {
    let lord = period.lord();
    let house = natal.d1.house_of(lord);
    if let Some((h, theme)) = house.and_then(|h| house_theme(h).map(|t| (h, t))) {
        themes.push(format!("House {}: {}", h, theme));
    }
    PeriodInsight {
        planet: lord,
        start: period.start,
        end: period.end,
        nakshatra: natal
            .planet(lord)
            .map(|p| format!("{} (Pada {})", p.nakshatra, p.pada)),
        house,
        themes,
    }
}

/// Themes for the running periods. Falls back to the first Mahadasha when none is current.
pub fn dasha_insights(natal: &NatalChart, dasha: &VimshottariDasha) -> DashaInsights {
    let current = dasha.current_maha();
    let Some(maha) = current.or_else(|| dasha.periods.first()) else {
        return DashaInsights::default();
    };

    let maha_lines = maha_themes(maha.maha_lord).iter().map(|s| s.to_string()).collect();
    let antardasha = current
        .and_then(|m| m.children.iter().find(|p| p.is_current))
        .map(|antar| {
            let lines = vec![antar_modifier(antar.lord()).to_string()];
            insight_for(natal, antar, lines)
        });

    DashaInsights {
        mahadasha: Some(insight_for(natal, maha, maha_lines)),
        antardasha,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{birth, chart};
    use crate::vedic::dashas::compute_vimshottari;
    use chrono::TimeZone;

    #[test]
    fn test_current_periods_get_house_themes() {
        let natal = chart(0.0, &[]);
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let dasha = compute_vimshottari(5.0, birth(), now).unwrap();
        let insights = dasha_insights(&natal, &dasha);

        let maha = insights.mahadasha.unwrap();
        assert_eq!(maha.planet, Body::Moon);
        assert_eq!(maha.house, Some(1));
        assert_eq!(maha.nakshatra.as_deref(), Some("Ashwini (Pada 2)"));
        assert_eq!(maha.themes.len(), 4);
        assert!(maha.themes[3].starts_with("House 1: "));
        assert!(insights.antardasha.is_some());
    }

    #[test]
    fn test_falls_back_to_first_mahadasha() {
        let natal = chart(0.0, &[]);
        let before_birth = Utc.with_ymd_and_hms(1980, 1, 1, 0, 0, 0).unwrap();
        let dasha = compute_vimshottari(5.0, birth(), before_birth).unwrap();
        let insights = dasha_insights(&natal, &dasha);
        assert_eq!(insights.mahadasha.unwrap().planet, Body::Ketu);
        assert!(insights.antardasha.is_none());
    }
}
