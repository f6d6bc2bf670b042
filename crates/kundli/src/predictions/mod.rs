pub mod engine;
pub mod rules;
pub mod summary;

pub use engine::{
    check_predicate, evaluate_rule, Prediction, PredictionEngine, PredictionEvidence,
    PredictionReport, RuleMatch,
};
pub use rules::{Conditions, Operator, Predicate, Rule, RuleSet, Timeframe, Tone};
pub use summary::{summarize, TimeframeSummary};
