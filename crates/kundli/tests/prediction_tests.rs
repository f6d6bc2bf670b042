mod common;

use kundli::predictions::{PredictionEngine, RuleSet, Timeframe};
use kundli::{ChartPipeline, GeoLocation, HoroscopeReport, StaticGeocoder};
use std::collections::BTreeSet;
use std::io::Write;

const GENERIC_LINES: [&str; 3] = ["Avoid overspending", "Communicate calmly", "Stay in comfort zone"];

fn report(engine: &PredictionEngine) -> HoroscopeReport {
    let eph = common::ephemeris();
    let geo = StaticGeocoder::new();
    let chart = ChartPipeline::new(&eph, &geo)
        .chart_at(common::birth(), GeoLocation { lat: 28.6, lon: 77.2 })
        .unwrap();
    HoroscopeReport::compose(&chart, &eph, engine, common::now()).unwrap()
}

#[test]
fn test_builtin_rules_parse() {
    let rules = RuleSet::builtin();
    assert!(rules.len() >= 10);
    let ids: BTreeSet<&str> = rules.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids.len(), rules.len());
}

#[test]
fn test_buckets_are_ranked_and_capped() {
    let report = report(&PredictionEngine::new(RuleSet::builtin()));
    let predictions = &report.predictions;
    assert_eq!(predictions.predictions.len(), 3);
    assert_eq!(predictions.summary.len(), 3);
    assert!(predictions.total() > 0);

    let mut ids = BTreeSet::new();
    for timeframe in Timeframe::ALL {
        let bucket = predictions.bucket(timeframe);
        assert!(bucket.len() <= 10);
        for pair in bucket.windows(2) {
            assert!(pair[0].confidence_score >= pair[1].confidence_score);
        }
        for p in bucket {
            assert!(ids.insert(p.id.clone()));
            assert_eq!(p.timeframe, timeframe);
            assert!((0.0..=1.0).contains(&p.confidence_score));
            assert!(p.evidence[0].triggered_conditions.len() >= 2);
            for line in p.do_suggestions.iter().chain(&p.dont_suggestions).chain(&p.what_this_means) {
                assert!(!GENERIC_LINES.contains(&line.as_str()));
            }
            assert!(!p.headline.contains('{'));
        }
    }
}

#[test]
fn test_sun_in_tenth_rule_fires() {
    let report = report(&PredictionEngine::new(RuleSet::builtin()));
    let bucket = report.predictions.bucket(Timeframe::Next12Months);
    let sun = bucket
        .iter()
        .find(|p| p.id == "pred_career_sun_10th_next_12_months")
        .unwrap();
    assert_eq!(sun.domain, "career");
    assert_eq!(sun.evidence[0].triggered_conditions[0], "Sun in the 10th from Lagna");

    let summary = &report.predictions.summary[&Timeframe::Next12Months];
    assert!(summary.executive.len() <= 6);
    assert!(summary.executive.iter().any(|l| l.starts_with("career: Authority and public role")));
    assert!(summary.activated_themes.iter().any(|l| l.contains("10th")));
}

#[test]
fn test_limits_are_configurable() {
    let engine = PredictionEngine::new(RuleSet::builtin()).with_limits(1, 1);
    let report = report(&engine);
    for timeframe in Timeframe::ALL {
        assert!(report.predictions.bucket(timeframe).len() <= 1);
        assert!(report.predictions.summary[&timeframe].executive.len() <= 1);
    }
}

#[test]
fn test_missing_rule_file_degrades_to_empty() {
    let rules = RuleSet::load("/nonexistent/kundli/rules.json");
    assert!(rules.is_empty());
    let report = report(&PredictionEngine::new(rules));
    assert_eq!(report.predictions.total(), 0);
    assert!(report.insights.mahadasha.is_some());
}

#[test]
fn test_rule_file_is_loaded() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(
        br#"[{"id":"lagna_aries","domain":"self","headline":"Fiery start",
            "conditions":{"all":[
                {"path":"natal.lagna.sign","value":"Aries","why_format":"Aries rising"},
                {"path":"natal.lagna.lord","value":"Mars","why_format":"Mars rules the Lagna"}]}}]"#,
    )
    .unwrap();
    file.flush().unwrap();
    let rules = RuleSet::load(file.path());
    assert_eq!(rules.len(), 1);

    let report = report(&PredictionEngine::new(rules));
    let p = &report.predictions.bucket(Timeframe::Next12Months)[0];
    assert_eq!(p.id, "pred_lagna_aries_next_12_months");
    assert_eq!(p.system, "vedic");
    assert!((p.confidence_score - 0.7).abs() < 1e-9);
}
