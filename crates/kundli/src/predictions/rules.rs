//! Declarative rule model and loader.

use log::{error, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{KundliError, Result};

const BUILTIN_RULES: &str = include_str!("../../rules/vedic.json");

pub const DEFAULT_WEIGHT: f64 = 0.6;
pub const DEFAULT_WHY_FORMAT: &str = "{path} -> {cur}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "now")]
    Now,
    #[serde(rename = "next_90_days")]
    Next90Days,
    #[serde(rename = "next_12_months")]
    Next12Months,
}

impl Timeframe {
    pub const ALL: [Timeframe; 3] = [Timeframe::Now, Timeframe::Next90Days, Timeframe::Next12Months];

    pub fn name(self) -> &'static str {
        match self {
            Timeframe::Now => "now",
            Timeframe::Next90Days => "next_90_days",
            Timeframe::Next12Months => "next_12_months",
        }
    }
}

impl Default for Timeframe {
    fn default() -> Self {
        Timeframe::Next12Months
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Positive,
    Neutral,
    Cautionary,
}

impl Default for Tone {
    fn default() -> Self {
        Tone::Neutral
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Eq,
    Ne,
    In,
    Ge,
    Le,
    /// Anything else in the rule file; never satisfied.
    #[serde(other)]
    Unknown,
}

impl Default for Operator {
    fn default() -> Self {
        Operator::Eq
    }
}

/// One atomic condition over a signal path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub path: String,
    #[serde(default)]
    pub op: Operator,
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub why_format: Option<String>,
}

impl Predicate {
    pub fn why_template(&self) -> &str {
        self.why_format.as_deref().unwrap_or(DEFAULT_WHY_FORMAT)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    #[serde(default)]
    pub all: Vec<Predicate>,
    #[serde(default)]
    pub any: Vec<Predicate>,
}

fn default_system() -> String {
    "vedic".to_string()
}

fn default_weight() -> f64 {
    DEFAULT_WEIGHT
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub domain: String,
    #[serde(default = "default_system")]
    pub system: String,
    #[serde(default)]
    pub tone: Tone,
    pub headline: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub timeframe: Timeframe,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub conditions: Conditions,
    #[serde(default)]
    pub what: Vec<String>,
    #[serde(default, rename = "do")]
    pub do_lines: Vec<String>,
    #[serde(default, rename = "dont")]
    pub dont_lines: Vec<String>,
}

/// Immutable, loaded-once list of rules. Empty is a valid (degraded) state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Strict parse of a JSON array of rules.
    pub fn from_json(json: &str) -> Result<Self> {
        let rules: Vec<Rule> = serde_json::from_str(json)
            .map_err(|e| KundliError::Configuration(format!("Invalid rule file: {}", e)))?;
        Ok(Self { rules })
    }

    /// The rule set compiled into the crate.
    pub fn builtin() -> Self {
        match Self::from_json(BUILTIN_RULES) {
            Ok(set) => set,
            Err(e) => {
                error!("Built-in rules unusable, continuing without rules: {}", e);
                Self::empty()
            }
        }
    }

    /// Load rules from disk, degrading to an empty set when the file is missing or malformed.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let loaded = std::fs::read_to_string(path)
            .map_err(|e| KundliError::Configuration(format!("{}: {}", path.display(), e)))
            .and_then(|text| Self::from_json(&text));
        match loaded {
            Ok(set) => {
                info!("Loaded {} rules from {}", set.len(), path.display());
                set
            }
            Err(e) => {
                error!("Rule load failed, continuing without rules: {}", e);
                Self::empty()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }
}
