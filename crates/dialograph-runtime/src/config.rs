//! Runtime configuration.

use std::path::{Path, PathBuf};

use anyhow::Context;
use dialograph_core::{LevenshteinClassifier, NOT_UNDERSTOOD};
use serde::{Deserialize, Serialize};

/// Scenario document path override.
pub const ENV_SCENARIO: &str = "DIALOGRAPH_SCENARIO";
/// Path of a JSON config file.
pub const ENV_CONFIG: &str = "DIALOGRAPH_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// XML scenario document loaded for every request
    pub scenario_path: PathBuf,
    /// Reserved names of the first-turn state, tried in order
    pub start_state_names: Vec<String>,
    /// Answer for unresolved turns
    pub not_understood: String,
    pub classifier: ClassifierConfig,
    /// Tracing filter used when `RUST_LOG` is unset
    pub log_filter: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub threshold_divisor: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            scenario_path: PathBuf::from("./scenario.xml"),
            start_state_names: vec!["Старт".to_string(), "Start".to_string()],
            not_understood: NOT_UNDERSTOOD.to_string(),
            classifier: ClassifierConfig::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            threshold_divisor: LevenshteinClassifier::default().threshold_divisor,
        }
    }
}

impl ClassifierConfig {
    pub fn classifier(&self) -> LevenshteinClassifier {
        LevenshteinClassifier::new(self.threshold_divisor)
    }
}

impl RuntimeConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Config from `DIALOGRAPH_CONFIG` (or defaults), then the
    /// `DIALOGRAPH_SCENARIO` override.
    pub fn from_env() -> anyhow::Result<Self> {
        let config_path = std::env::var_os(ENV_CONFIG).map(PathBuf::from);
        let scenario_path = std::env::var_os(ENV_SCENARIO).map(PathBuf::from);
        Self::resolve(config_path.as_deref(), scenario_path)
    }

    pub fn resolve(config_path: Option<&Path>, scenario_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        if let Some(path) = scenario_path {
            config.scenario_path = path;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: RuntimeConfig =
            serde_json::from_str(r#"{ "not_understood": "Не понял", "classifier": {} }"#).unwrap();
        assert_eq!(config.not_understood, "Не понял");
        assert_eq!(config.classifier.threshold_divisor, 2);
        assert_eq!(config.start_state_names, ["Старт", "Start"]);
        assert_eq!(config.scenario_path, PathBuf::from("./scenario.xml"));
    }

    #[test]
    fn test_scenario_override_wins() {
        let config = RuntimeConfig::resolve(None, Some(PathBuf::from("/srv/skill.xml"))).unwrap();
        assert_eq!(config.scenario_path, PathBuf::from("/srv/skill.xml"));
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_zero_divisor_is_clamped() {
        let config = ClassifierConfig { threshold_divisor: 0 };
        assert_eq!(config.classifier().threshold_divisor, 1);
    }
}
