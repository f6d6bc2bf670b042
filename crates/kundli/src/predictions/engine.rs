//! Rule evaluation over a signal set.

use log::{debug, warn};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::predictions::rules::{Operator, Predicate, Rule, RuleSet, Timeframe, Tone};
use crate::predictions::summary::{summarize, TimeframeSummary};
use crate::signals::{SignalSet, SignalValue};

pub const MAX_PER_TIMEFRAME: usize = 10;
pub const SUMMARY_WINDOW: usize = 6;
/// Why-lines a rule must produce before it may yield a prediction.
pub const MIN_WHY_LINES: usize = 2;
pub const MAX_ANY_WHY_LINES: usize = 2;
pub const CONFIDENCE_PER_TRIGGER: f64 = 0.05;

/// Suggestion lines too generic to show.
const DENY_LIST: [&str; 3] = ["Avoid overspending", "Communicate calmly", "Stay in comfort zone"];

const TEMPLATE_TOKEN: &str = r"\{([A-Za-z0-9_]+(?:\.[A-Za-z0-9_]+)+)\}";

lazy_static::lazy_static! {
    static ref TEMPLATE_PATTERN: Option<Regex> = Regex::new(TEMPLATE_TOKEN).ok();
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionEvidence {
    pub rule_id: String,
    pub triggered_conditions: Vec<String>,
    pub weight: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub domain: String,
    pub system: String,
    pub tone: Tone,
    pub headline: String,
    pub description: String,
    pub what_this_means: Vec<String>,
    pub timeframe: Timeframe,
    pub do_suggestions: Vec<String>,
    pub dont_suggestions: Vec<String>,
    pub evidence: Vec<PredictionEvidence>,
    pub confidence_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    pub predictions: BTreeMap<Timeframe, Vec<Prediction>>,
    pub summary: BTreeMap<Timeframe, TimeframeSummary>,
}

impl PredictionReport {
    pub fn bucket(&self, timeframe: Timeframe) -> &[Prediction] {
        self.predictions
            .get(&timeframe)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn total(&self) -> usize {
        self.predictions.values().map(Vec::len).sum()
    }
}

/// Outcome of a rule that passed every check.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleMatch {
    pub why: Vec<String>,
    pub confidence: f64,
}

fn check_operator(op: Operator, current: &SignalValue, expected: &SignalValue, path: &str) -> bool {
    match op {
        Operator::Eq => current.loosely_equals(expected),
        Operator::Ne => !current.loosely_equals(expected),
        Operator::In => match (expected, current) {
            (SignalValue::List(options), _) => options.iter().any(|o| o.loosely_equals(current)),
            (SignalValue::Text(haystack), SignalValue::Text(needle)) => haystack.contains(needle.as_str()),
            _ => {
                debug!("'in' on {} needs a list or text value", path);
                false
            }
        },
        Operator::Ge | Operator::Le => match (current.as_f64(), expected.as_f64()) {
            (Some(cur), Some(val)) => {
                if op == Operator::Ge {
                    cur >= val
                } else {
                    cur <= val
                }
            }
            _ => {
                warn!("Non-numeric comparison at {} ({} vs {})", path, current, expected);
                false
            }
        },
        Operator::Unknown => {
            warn!("Unknown operator on {}; predicate unsatisfied", path);
            false
        }
    }
}

/// Evaluate one predicate, returning its why-line when satisfied.
pub fn check_predicate(predicate: &Predicate, signals: &SignalSet) -> Option<String> {
    let Some(current) = signals.lookup(&predicate.path) else {
        debug!("Missing signal {}", predicate.path);
        return None;
    };
    let expected = SignalValue::from(&predicate.value);
    if !check_operator(predicate.op, current, &expected, &predicate.path) {
        return None;
    }
    Some(
        predicate
            .why_template()
            .replace("{path}", &predicate.path)
            .replace("{cur}", &current.to_string()),
    )
}

fn push_unique(lines: &mut Vec<String>, line: String) {
    if !lines.contains(&line) {
        lines.push(line);
    }
}

/// Apply the all/any groups, the evidentiary floor and the confidence formula.
pub fn evaluate_rule(rule: &Rule, signals: &SignalSet) -> Option<RuleMatch> {
    let mut why = Vec::new();
    for predicate in &rule.conditions.all {
        push_unique(&mut why, check_predicate(predicate, signals)?);
    }

    if !rule.conditions.any.is_empty() {
        let any_why: Vec<String> = rule
            .conditions
            .any
            .iter()
            .filter_map(|p| check_predicate(p, signals))
            .collect();
        if any_why.is_empty() {
            return None;
        }
        for line in any_why.into_iter().take(MAX_ANY_WHY_LINES) {
            push_unique(&mut why, line);
        }
    }

    if why.len() < MIN_WHY_LINES {
        debug!("Rule {} passed with only {} why-lines; dropped", rule.id, why.len());
        return None;
    }
    let confidence = (rule.weight + CONFIDENCE_PER_TRIGGER * why.len() as f64).clamp(0.0, 1.0);
    Some(RuleMatch { why, confidence })
}

fn filter_generic(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .filter(|line| !DENY_LIST.contains(&line.as_str()))
        .cloned()
        .collect()
}

/// Replace `{dotted.path}` tokens with signal values; unknown tokens stay verbatim.
fn render_template(template: &str, signals: &SignalSet) -> String {
    let Some(pattern) = TEMPLATE_PATTERN.as_ref() else {
        warn!("Template pattern rejected, templates left raw");
        return template.to_string();
    };
    pattern
        .replace_all(template, |caps: &Captures| match signals.lookup(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

pub struct PredictionEngine {
    rules: RuleSet,
    max_per_timeframe: usize,
    summary_window: usize,
}

impl PredictionEngine {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            max_per_timeframe: MAX_PER_TIMEFRAME,
            summary_window: SUMMARY_WINDOW,
        }
    }

    /// Buckets never hold more than [`MAX_PER_TIMEFRAME`] predictions; larger caps are clamped.
    pub fn with_limits(mut self, max_per_timeframe: usize, summary_window: usize) -> Self {
        if max_per_timeframe > MAX_PER_TIMEFRAME {
            warn!(
                "max_per_timeframe {} exceeds {}; clamped",
                max_per_timeframe, MAX_PER_TIMEFRAME
            );
        }
        self.max_per_timeframe = max_per_timeframe.min(MAX_PER_TIMEFRAME);
        self.summary_window = summary_window;
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn max_per_timeframe(&self) -> usize {
        self.max_per_timeframe
    }

    fn to_prediction(&self, rule: &Rule, matched: RuleMatch, signals: &SignalSet) -> Prediction {
        Prediction {
            id: format!("pred_{}_{}", rule.id, rule.timeframe),
            domain: rule.domain.clone(),
            system: rule.system.clone(),
            tone: rule.tone,
            headline: render_template(&rule.headline, signals),
            description: render_template(&rule.description, signals),
            what_this_means: filter_generic(&rule.what),
            timeframe: rule.timeframe,
            do_suggestions: filter_generic(&rule.do_lines),
            dont_suggestions: filter_generic(&rule.dont_lines),
            evidence: vec![PredictionEvidence {
                rule_id: rule.id.clone(),
                triggered_conditions: matched.why,
                weight: rule.weight,
                confidence: matched.confidence,
            }],
            confidence_score: matched.confidence,
        }
    }

    /// Run every rule and bucket, rank, cap and summarize the results.
    pub fn generate(&self, signals: &SignalSet) -> PredictionReport {
        let mut predictions: BTreeMap<Timeframe, Vec<Prediction>> =
            Timeframe::ALL.iter().map(|tf| (*tf, Vec::new())).collect();

        for rule in self.rules.iter() {
            if let Some(matched) = evaluate_rule(rule, signals) {
                let prediction = self.to_prediction(rule, matched, signals);
                predictions.entry(rule.timeframe).or_default().push(prediction);
            }
        }

        let mut summary = BTreeMap::new();
        for (timeframe, bucket) in predictions.iter_mut() {
            bucket.sort_by(|a, b| b.confidence_score.total_cmp(&a.confidence_score));
            bucket.truncate(self.max_per_timeframe.min(MAX_PER_TIMEFRAME));
            summary.insert(*timeframe, summarize(bucket, self.summary_window));
        }

        debug!(
            "Generated {} predictions from {} rules",
            predictions.values().map(Vec::len).sum::<usize>(),
            self.rules.len()
        );
        PredictionReport { predictions, summary }
    }
}
