//! Per-timeframe executive summaries.

use serde::{Deserialize, Serialize};

use crate::predictions::engine::Prediction;

const THEME_MARKERS: [&str; 3] = ["Jupiter", "10th", "kendra"];
const FLAG_MARKERS: [&str; 6] = ["Rahu", "Ketu", "Saturn", "Mars", "dusthana", "combust"];
const MAX_THEMES: usize = 5;
const MAX_FLAGS: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeframeSummary {
    pub executive: Vec<String>,
    pub activated_themes: Vec<String>,
    pub caution_flags: Vec<String>,
}

/// Occurrence counter that remembers first-seen order.
#[derive(Default)]
struct Tally {
    entries: Vec<(String, usize)>,
}

impl Tally {
    fn add(&mut self, line: &str) {
        match self.entries.iter_mut().find(|(key, _)| key == line) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((line.to_string(), 1)),
        }
    }

    /// Most frequent first; the stable sort keeps first-seen order among ties.
    fn top(mut self, limit: usize) -> Vec<String> {
        self.entries.sort_by(|a, b| b.1.cmp(&a.1));
        self.entries.into_iter().take(limit).map(|(key, _)| key).collect()
    }
}

/// Summarize the leading `window` predictions of an already sorted bucket.
pub fn summarize(predictions: &[Prediction], window: usize) -> TimeframeSummary {
    let mut executive = Vec::new();
    let mut themes = Tally::default();
    let mut flags = Tally::default();

    for prediction in predictions.iter().take(window) {
        executive.push(format!(
            "{}: {} ({}%)",
            prediction.domain,
            prediction.headline,
            (prediction.confidence_score * 100.0) as i64
        ));
        for line in prediction.evidence.iter().flat_map(|ev| ev.triggered_conditions.iter()) {
            if THEME_MARKERS.iter().any(|m| line.contains(m)) {
                themes.add(line);
            }
            if FLAG_MARKERS.iter().any(|m| line.contains(m)) {
                flags.add(line);
            }
        }
    }

    TimeframeSummary {
        executive,
        activated_themes: themes.top(MAX_THEMES),
        caution_flags: flags.top(MAX_FLAGS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictions::engine::PredictionEvidence;
    use crate::predictions::rules::{Timeframe, Tone};

    fn prediction(domain: &str, confidence: f64, why: &[&str]) -> Prediction {
        Prediction {
            id: format!("pred_{}_now", domain),
            domain: domain.to_string(),
            system: "vedic".to_string(),
            tone: Tone::default(),
            headline: format!("{} headline", domain),
            description: String::new(),
            what_this_means: Vec::new(),
            timeframe: Timeframe::Now,
            do_suggestions: Vec::new(),
            dont_suggestions: Vec::new(),
            evidence: vec![PredictionEvidence {
                rule_id: domain.to_string(),
                triggered_conditions: why.iter().map(|s| s.to_string()).collect(),
                weight: confidence,
                confidence,
            }],
            confidence_score: confidence,
        }
    }

    #[test]
    fn test_executive_lines_use_window_and_truncate_percent() {
        let bucket: Vec<Prediction> = (0..8)
            .map(|i| prediction(&format!("d{}", i), 0.999 - i as f64 * 0.1, &[]))
            .collect();
        let summary = summarize(&bucket, 6);
        assert_eq!(summary.executive.len(), 6);
        assert_eq!(summary.executive[0], "d0: d0 headline (99%)");
        assert_eq!(summary.executive[5], "d5: d5 headline (49%)");

        assert_eq!(summarize(&bucket[..2], 6).executive.len(), 2);
        assert!(summarize(&bucket, 0).executive.is_empty());
    }

    #[test]
    fn test_lines_outside_window_are_not_tallied() {
        let mut bucket: Vec<Prediction> = (0..6).map(|i| prediction(&format!("d{}", i), 0.8, &[])).collect();
        bucket.push(prediction("late", 0.7, &["Jupiter in 10th", "Saturn over Moon"]));
        let summary = summarize(&bucket, 6);
        assert!(summary.activated_themes.is_empty());
        assert!(summary.caution_flags.is_empty());
    }

    #[test]
    fn test_theme_and_flag_markers() {
        let bucket = vec![prediction(
            "career",
            0.8,
            &[
                "Jupiter aspects the Lagna",
                "Sun in 10th from Lagna",
                "Lord in a kendra",
                "Rahu in 8th",
                "Mercury is combust",
                "Lord of 6th in a dusthana",
                "Venus in own sign",
            ],
        )];
        let summary = summarize(&bucket, 6);
        assert_eq!(
            summary.activated_themes,
            vec!["Jupiter aspects the Lagna", "Sun in 10th from Lagna", "Lord in a kendra"]
        );
        assert_eq!(
            summary.caution_flags,
            vec!["Rahu in 8th", "Mercury is combust", "Lord of 6th in a dusthana"]
        );
    }

    #[test]
    fn test_line_matching_both_marker_sets_lands_in_both() {
        let bucket = vec![prediction("mixed", 0.8, &["Saturn aspects Jupiter"])];
        let summary = summarize(&bucket, 6);
        assert_eq!(summary.activated_themes, vec!["Saturn aspects Jupiter"]);
        assert_eq!(summary.caution_flags, vec!["Saturn aspects Jupiter"]);
    }

    #[test]
    fn test_counts_rank_and_ties_keep_first_seen_order() {
        let bucket = vec![
            prediction("a", 0.9, &["Jupiter A", "Jupiter B", "Saturn A", "Mars A"]),
            prediction("b", 0.8, &["Jupiter C", "Jupiter B", "Ketu A", "Mars A"]),
            prediction("c", 0.7, &["Jupiter D", "Jupiter E", "Jupiter F", "Rahu A"]),
        ];
        let summary = summarize(&bucket, 6);
        // B seen twice leads; the rest tie at one and keep arrival order, capped at five
        assert_eq!(
            summary.activated_themes,
            vec!["Jupiter B", "Jupiter A", "Jupiter C", "Jupiter D", "Jupiter E"]
        );
        assert_eq!(summary.activated_themes.len(), MAX_THEMES);
        assert_eq!(summary.caution_flags, vec!["Mars A", "Saturn A", "Ketu A"]);
        assert_eq!(summary.caution_flags.len(), MAX_FLAGS);
    }

    #[test]
    fn test_empty_bucket() {
        assert_eq!(summarize(&[], 6), TimeframeSummary::default());
    }
}
