use kundli::ephemeris::HouseSystem;
use kundli::predictions::engine::{MAX_PER_TIMEFRAME, SUMMARY_WINDOW};
use kundli::predictions::{PredictionEngine, RuleSet};
use kundli::vedic::AYANAMSA_NAME;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Relative locations tried for the settings file: repo root, then from a crate dir.
pub const CONFIG_PATHS: [&str; 2] = ["configs/kundli.toml", "../../configs/kundli.toml"];

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionSettings {
    pub max_per_timeframe: usize,
    pub summary_window: usize,
}

impl Default for PredictionSettings {
    fn default() -> Self {
        Self {
            max_per_timeframe: MAX_PER_TIMEFRAME,
            summary_window: SUMMARY_WINDOW,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KundliSettings {
    pub house_system: HouseSystem,
    /// External rule file; the embedded rule set is used when absent.
    pub rules_path: Option<PathBuf>,
    pub ayanamsa_name: String,
    pub prediction: PredictionSettings,
}

impl Default for KundliSettings {
    fn default() -> Self {
        Self {
            house_system: HouseSystem::default(),
            rules_path: None,
            ayanamsa_name: AYANAMSA_NAME.to_string(),
            prediction: PredictionSettings::default(),
        }
    }
}

impl KundliSettings {
    pub fn rules(&self) -> RuleSet {
        match &self.rules_path {
            Some(path) => RuleSet::load(path),
            None => RuleSet::builtin(),
        }
    }

    pub fn prediction_engine(&self) -> PredictionEngine {
        PredictionEngine::new(self.rules()).with_limits(
            self.prediction.max_per_timeframe,
            self.prediction.summary_window,
        )
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PredictionToml {
    #[serde(default)]
    max_per_timeframe: Option<usize>,
    #[serde(default)]
    summary_window: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RootConfigToml {
    #[serde(default)]
    house_system: Option<String>,
    #[serde(default)]
    rules_path: Option<PathBuf>,
    #[serde(default)]
    ayanamsa_name: Option<String>,
    #[serde(default)]
    prediction: Option<PredictionToml>,
}

pub fn parse_settings(text: &str) -> anyhow::Result<KundliSettings> {
    let root: RootConfigToml =
        toml::from_str(text).map_err(|e| anyhow::anyhow!("Failed to parse kundli.toml: {e}"))?;
    let defaults = KundliSettings::default();

    let house_system = match root.house_system {
        Some(name) => name
            .parse::<HouseSystem>()
            .map_err(|e| anyhow::anyhow!("Invalid house_system in kundli.toml: {e}"))?,
        None => defaults.house_system,
    };

    let ayanamsa_name = root.ayanamsa_name.unwrap_or(defaults.ayanamsa_name);
    if !ayanamsa_name.eq_ignore_ascii_case(AYANAMSA_NAME) {
        anyhow::bail!(
            "Unsupported ayanamsa_name {:?}; only {} is available",
            ayanamsa_name,
            AYANAMSA_NAME
        );
    }

    let prediction = root.prediction.unwrap_or_default();
    let prediction = PredictionSettings {
        max_per_timeframe: prediction
            .max_per_timeframe
            .unwrap_or(defaults.prediction.max_per_timeframe),
        summary_window: prediction
            .summary_window
            .unwrap_or(defaults.prediction.summary_window),
    };
    if prediction.max_per_timeframe == 0 || prediction.max_per_timeframe > MAX_PER_TIMEFRAME {
        anyhow::bail!(
            "prediction.max_per_timeframe must be between 1 and {}, got {}",
            MAX_PER_TIMEFRAME,
            prediction.max_per_timeframe
        );
    }

    Ok(KundliSettings {
        house_system,
        rules_path: root.rules_path,
        ayanamsa_name: AYANAMSA_NAME.to_string(),
        prediction,
    })
}

pub fn load_settings_from(path: &Path) -> anyhow::Result<KundliSettings> {
    let text = fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Could not read {}: {e}", path.display()))?;
    parse_settings(&text)
}

/// Load `configs/kundli.toml` from the usual relative paths. A missing file means defaults.
pub fn load_settings() -> anyhow::Result<KundliSettings> {
    for p in &CONFIG_PATHS {
        let path = Path::new(p);
        if path.exists() {
            log::info!("Loading settings from {}", path.display());
            return load_settings_from(path);
        }
    }
    log::debug!("No kundli.toml found in {:?}; using defaults", CONFIG_PATHS);
    Ok(KundliSettings::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let settings = parse_settings("").unwrap();
        assert_eq!(settings, KundliSettings::default());
        assert_eq!(settings.prediction.max_per_timeframe, 10);
        assert_eq!(settings.prediction.summary_window, 6);
        assert_eq!(settings.house_system, HouseSystem::Placidus);
    }

    #[test]
    fn test_overrides() {
        let settings = parse_settings(
            r#"
            house_system = "whole_sign"
            rules_path = "rules/custom.json"
            [prediction]
            summary_window = 3
            "#,
        )
        .unwrap();
        assert_eq!(settings.house_system, HouseSystem::WholeSign);
        assert_eq!(settings.rules_path, Some(PathBuf::from("rules/custom.json")));
        assert_eq!(settings.prediction.summary_window, 3);
        assert_eq!(settings.prediction.max_per_timeframe, 10);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(parse_settings(r#"house_system = "topocentric""#).is_err());
        assert!(parse_settings(r#"ayanamsa_name = "Raman""#).is_err());
        assert!(parse_settings("[prediction]\nmax_per_timeframe = 0").is_err());
        assert!(parse_settings("[prediction]\nmax_per_timeframe = 50").is_err());
        assert!(parse_settings("house_system = [").is_err());
    }

    #[test]
    fn test_prediction_cap_bounds() {
        let at_cap = parse_settings("[prediction]\nmax_per_timeframe = 10").unwrap();
        assert_eq!(at_cap.prediction_engine().max_per_timeframe(), MAX_PER_TIMEFRAME);
        let err = parse_settings("[prediction]\nmax_per_timeframe = 11").unwrap_err();
        assert!(err.to_string().contains("between 1 and 10"));
    }

    #[test]
    fn test_repo_config_parses() {
        let text = include_str!("../../../configs/kundli.toml");
        let settings = parse_settings(text).unwrap();
        assert!(settings.rules_path.is_none());
        assert!(!settings.rules().is_empty());
    }
}
