//! Content sources: the embedded defaults and an on-disk directory.
use serde::Serialize;
use std::hash::Hasher;
use std::path::{Path, PathBuf};
use twox_hash::XxHash64;

use crate::ContentLoader;
use crate::data::{
    BalanceConfig, GameConfig, InitialSettings, Safeguard, Scenario, ScenarioCatalog,
};
use crate::error::ContentError;

const DEFAULT_SCENARIOS: &str = include_str!("../assets/scenarios.json");
const DEFAULT_CONFIG: &str = include_str!("../assets/config.json");

pub const SCENARIOS_FILE: &str = "scenarios.json";
pub const CONFIG_FILE: &str = "config.json";

/// Immutable content a session plays against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentBundle {
    pub scenarios: ScenarioCatalog,
    pub config: GameConfig,
}

impl ContentBundle {
    /// Pair a catalog with a config, checking that every action's safeguard
    /// mitigation factor stays within `[0, 1]` under this balance.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::InvalidBalance`] naming the first offending action.
    pub fn new(scenarios: ScenarioCatalog, config: GameConfig) -> Result<Self, ContentError> {
        let max_quality = config.game_balance.max_safeguard_quality();
        for scenario in scenarios.iter() {
            for card in &scenario.action_cards {
                let worst = 1.0 - max_quality * card.safeguard_reduction;
                if !(0.0..=1.0).contains(&worst) {
                    return Err(ContentError::InvalidBalance(format!(
                        "action `{}` in scenario `{}` has a mitigation factor of {worst} \
                         with every safeguard; keep SAFEGUARD_QUALITY_PER_ITEM * {} * \
                         safeguard_reduction within 0..=1",
                        card.id,
                        scenario.id,
                        Safeguard::ALL.len()
                    )));
                }
            }
        }
        Ok(Self { scenarios, config })
    }

    /// Parse both documents.
    ///
    /// # Errors
    ///
    /// Returns an error if either document is malformed or the config fails
    /// validation.
    pub fn from_json(scenarios_json: &str, config_json: &str) -> Result<Self, ContentError> {
        Self::new(
            ScenarioCatalog::from_json(SCENARIOS_FILE, scenarios_json)?,
            GameConfig::from_json(CONFIG_FILE, config_json)?,
        )
    }

    /// Content compiled into the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded assets fail to parse.
    pub fn load_from_static() -> Result<Self, ContentError> {
        Self::from_json(DEFAULT_SCENARIOS, DEFAULT_CONFIG)
    }

    /// # Errors
    ///
    /// Returns [`ContentError::UnknownScenario`] if `id` is not loaded.
    pub fn scenario(&self, id: &str) -> Result<&Scenario, ContentError> {
        self.scenarios
            .get(id)
            .ok_or_else(|| ContentError::UnknownScenario(id.to_string()))
    }

    #[must_use]
    pub const fn balance(&self) -> &BalanceConfig {
        &self.config.game_balance
    }

    #[must_use]
    pub const fn settings(&self) -> &InitialSettings {
        &self.config.initial_settings
    }

    /// Stable hash of the loaded content, identifying a content revision.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let canonical = serde_json::to_vec(self).unwrap_or_default();
        let mut hasher = XxHash64::with_seed(0);
        hasher.write(&canonical);
        hasher.finish()
    }

    #[must_use]
    pub fn fingerprint_hex(&self) -> String {
        format!("{:016x}", self.fingerprint())
    }
}

/// Loader for the content embedded at build time.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticContent;

impl ContentLoader for StaticContent {
    type Error = ContentError;

    fn load_scenarios(&self) -> Result<ScenarioCatalog, Self::Error> {
        ScenarioCatalog::from_json(SCENARIOS_FILE, DEFAULT_SCENARIOS)
    }

    fn load_config(&self) -> Result<GameConfig, Self::Error> {
        GameConfig::from_json(CONFIG_FILE, DEFAULT_CONFIG)
    }
}

/// Loader reading `scenarios.json` and `config.json` from a directory, the
/// files the content editor writes.
#[derive(Debug, Clone)]
pub struct DirectoryContent {
    dir: PathBuf,
}

impl DirectoryContent {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read(&self, file_name: &str) -> Result<String, ContentError> {
        let path = self.dir.join(file_name);
        let source_name = path.display().to_string();
        std::fs::read_to_string(&path).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => ContentError::Missing(source_name),
            _ => ContentError::Unreadable {
                source_name,
                reason: err.to_string(),
            },
        })
    }
}

impl ContentLoader for DirectoryContent {
    type Error = ContentError;

    fn load_scenarios(&self) -> Result<ScenarioCatalog, Self::Error> {
        let json = self.read(SCENARIOS_FILE)?;
        ScenarioCatalog::from_json(SCENARIOS_FILE, &json)
    }

    fn load_config(&self) -> Result<GameConfig, Self::Error> {
        let json = self.read(CONFIG_FILE)?;
        GameConfig::from_json(CONFIG_FILE, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "crisis-content-{label}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn embedded_content_is_complete() {
        let bundle = ContentBundle::load_from_static().unwrap();
        assert!(bundle.scenarios.len() >= bundle.settings().max_crises);
        assert!(bundle.scenarios.excluded().is_empty());
        assert_eq!(bundle.balance(), &BalanceConfig::default());
    }

    #[test]
    fn fingerprint_tracks_content_changes() {
        let bundle = ContentBundle::load_from_static().unwrap();
        let mut edited = bundle.clone();
        assert_eq!(bundle.fingerprint(), edited.fingerprint());
        edited.config.initial_settings.budget += 1;
        assert_ne!(bundle.fingerprint(), edited.fingerprint());
        assert_eq!(bundle.fingerprint_hex().len(), 16);
    }

    #[test]
    fn directory_loader_reports_missing_files() {
        let dir = temp_dir("missing");
        let loader = DirectoryContent::new(&dir);
        assert!(matches!(
            loader.load_config(),
            Err(ContentError::Missing(_))
        ));
        fs::write(dir.join(CONFIG_FILE), DEFAULT_CONFIG).unwrap();
        assert!(loader.load_config().is_ok());
        fs::write(dir.join(SCENARIOS_FILE), "not json").unwrap();
        assert!(matches!(
            loader.load_scenarios(),
            Err(ContentError::Malformed { .. })
        ));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn oversized_safeguard_quality_is_rejected() {
        let bundle = ContentBundle::load_from_static().unwrap();
        let mut config = bundle.config.clone();
        config.game_balance.safeguard_quality_per_item = 1.0;
        let err = ContentBundle::new(bundle.scenarios.clone(), config).unwrap_err();
        assert!(matches!(err, ContentError::InvalidBalance(_)));
        assert!(err.to_string().contains("mitigation factor"));

        let mut config = bundle.config.clone();
        config.game_balance.safeguard_quality_per_item = 0.0;
        assert!(ContentBundle::new(bundle.scenarios.clone(), config).is_ok());
    }

    #[test]
    fn unknown_scenarios_are_content_errors() {
        let bundle = ContentBundle::load_from_static().unwrap();
        assert!(matches!(
            bundle.scenario("nope"),
            Err(ContentError::UnknownScenario(_))
        ));
    }
}
