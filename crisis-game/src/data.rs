//! Scenario content and balance configuration.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_SCENARIO_ICON, DEFAULT_SCENARIO_TITLE, MISSION_MARKERS, TEMPLATE_PLACEHOLDER,
};
use crate::error::ContentError;
use crate::metrics::{MetricKind, Metrics};
use crate::numbers::count_to_f64;

/// How quickly an action takes effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speed {
    Fast,
    Medium,
    Slow,
}

impl Speed {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Medium => "medium",
            Self::Slow => "slow",
        }
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How widely a measure is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Targeted,
    General,
}

impl Scope {
    pub const ALL: [Self; 2] = [Self::Targeted, Self::General];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Targeted => "targeted",
            Self::General => "general",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "targeted" => Ok(Self::Targeted),
            "general" => Ok(Self::General),
            _ => Err(()),
        }
    }
}

/// How long a measure stays in force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Duration {
    #[default]
    Short,
    Medium,
    Long,
}

impl Duration {
    pub const ALL: [Self; 3] = [Self::Short, Self::Medium, Self::Long];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Duration {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "short" => Ok(Self::Short),
            "medium" => Ok(Self::Medium),
            "long" => Ok(Self::Long),
            _ => Err(()),
        }
    }
}

/// Optional mitigation attached to a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Safeguard {
    Transparency,
    Appeal,
    Sunset,
}

impl Safeguard {
    pub const ALL: [Self; 3] = [Self::Transparency, Self::Appeal, Self::Sunset];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transparency => "transparency",
            Self::Appeal => "appeal",
            Self::Sunset => "sunset",
        }
    }
}

impl fmt::Display for Safeguard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Safeguard {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "transparency" => Ok(Self::Transparency),
            "appeal" => Ok(Self::Appeal),
            "sunset" => Ok(Self::Sunset),
            _ => Err(()),
        }
    }
}

/// A selectable policy response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionCard {
    pub id: String,
    pub name: String,
    pub cost: u32,
    pub hr_cost: u32,
    pub speed: Speed,
    pub security_effect: f64,
    pub freedom_cost: f64,
    pub side_effect_risk: f64,
    pub safeguard_reduction: f64,
    #[serde(default)]
    pub tooltip: String,
    /// Report text shown after this action; falls back to the generic
    /// proportionate-choice message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counter_factual: Option<String>,
    /// Security and resilience bonus applied once the dust settles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delayed_bonus: Option<f64>,
}

impl ActionCard {
    fn numbers_finite(&self) -> bool {
        [
            self.security_effect,
            self.freedom_cost,
            self.side_effect_risk,
            self.safeguard_reduction,
            self.delayed_bonus.unwrap_or(0.0),
        ]
        .iter()
        .all(|value| value.is_finite())
    }
}

/// An advisor's opinion shown before the decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisor {
    pub name: String,
    pub text: String,
}

/// Story text split at the mission marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryParts<'a> {
    pub report: &'a str,
    pub mission: &'a str,
}

/// One crisis encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub title: String,
    pub icon: String,
    pub story: String,
    pub advisors: Vec<Advisor>,
    pub action_cards: Vec<ActionCard>,
    pub immediate_text: String,
    pub delayed_text: String,
}

impl Scenario {
    #[must_use]
    pub fn action(&self, action_id: &str) -> Option<&ActionCard> {
        self.action_cards.iter().find(|card| card.id == action_id)
    }

    /// Split the story into report and mission; without a marker the whole
    /// story is the report.
    #[must_use]
    pub fn story_parts(&self) -> StoryParts<'_> {
        MISSION_MARKERS
            .iter()
            .find_map(|marker| self.story.split_once(marker))
            .map_or(
                StoryParts {
                    report: self.story.trim(),
                    mission: "",
                },
                |(report, mission)| StoryParts {
                    report: report.trim(),
                    mission: mission.trim(),
                },
            )
    }

    #[must_use]
    pub fn render_immediate(&self, action_name: &str) -> String {
        render_template(&self.immediate_text, action_name)
    }

    #[must_use]
    pub fn render_delayed(&self, action_name: &str) -> String {
        render_template(&self.delayed_text, action_name)
    }
}

/// Substitute the first placeholder with the action name.
#[must_use]
pub fn render_template(template: &str, action_name: &str) -> String {
    template.replacen(TEMPLATE_PLACEHOLDER, action_name, 1)
}

/// Raw scenario entry as authored; every field is optional so a single bad
/// entry can be excluded instead of failing the whole load.
#[derive(Debug, Clone, Deserialize)]
struct ScenarioRecord {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    story: String,
    #[serde(default)]
    advisors: Option<Vec<Advisor>>,
    #[serde(default)]
    action_cards: Option<Vec<ActionCard>>,
    #[serde(default)]
    immediate_text: String,
    #[serde(default)]
    delayed_text: String,
}

impl ScenarioRecord {
    fn into_scenario(self, id: &str) -> Result<Scenario, String> {
        let advisors = self.advisors.ok_or("missing `advisors`")?;
        let action_cards = self.action_cards.ok_or("missing `action_cards`")?;
        if advisors.is_empty() {
            return Err("`advisors` is empty".into());
        }
        if action_cards.is_empty() {
            return Err("`action_cards` is empty".into());
        }
        let mut seen = HashSet::new();
        for card in &action_cards {
            if !seen.insert(card.id.as_str()) {
                return Err(format!("duplicate action id `{}`", card.id));
            }
            if !card.numbers_finite() {
                return Err(format!("action `{}` has non-finite numbers", card.id));
            }
        }
        Ok(Scenario {
            id: id.to_string(),
            title: self
                .title
                .unwrap_or_else(|| DEFAULT_SCENARIO_TITLE.to_string()),
            icon: self.icon.unwrap_or_else(|| DEFAULT_SCENARIO_ICON.to_string()),
            story: self.story,
            advisors,
            action_cards,
            immediate_text: self.immediate_text,
            delayed_text: self.delayed_text,
        })
    }
}

/// A scenario entry left out of the catalog and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExcludedScenario {
    pub id: String,
    pub reason: String,
}

/// All playable scenarios keyed by id.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ScenarioCatalog {
    scenarios: BTreeMap<String, Scenario>,
    #[serde(skip)]
    excluded: Vec<ExcludedScenario>,
}

impl ScenarioCatalog {
    #[must_use]
    pub fn from_scenarios(scenarios: impl IntoIterator<Item = Scenario>) -> Self {
        Self {
            scenarios: scenarios
                .into_iter()
                .map(|scenario| (scenario.id.clone(), scenario))
                .collect(),
            excluded: Vec::new(),
        }
    }

    /// Parse a scenario mapping, excluding unusable entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON or is not an object
    /// of scenario entries.
    pub fn from_json(source_name: &str, json: &str) -> Result<Self, ContentError> {
        let raw: BTreeMap<String, serde_json::Value> =
            serde_json::from_str(json).map_err(|error| ContentError::Malformed {
                source_name: source_name.to_string(),
                error,
            })?;
        let mut catalog = Self::default();
        for (id, value) in raw {
            let parsed = serde_json::from_value::<ScenarioRecord>(value)
                .map_err(|err| err.to_string())
                .and_then(|record| record.into_scenario(&id));
            match parsed {
                Ok(scenario) => {
                    catalog.scenarios.insert(id, scenario);
                }
                Err(reason) => {
                    log::warn!("excluding scenario `{id}` from {source_name}: {reason}");
                    catalog.excluded.push(ExcludedScenario { id, reason });
                }
            }
        }
        Ok(catalog)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.get(id)
    }

    /// Scenario ids in stable (sorted) order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.scenarios.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scenario> {
        self.scenarios.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    #[must_use]
    pub fn excluded(&self) -> &[ExcludedScenario] {
        &self.excluded
    }
}

/// Per-scope multiplier table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScopeTable {
    pub targeted: f64,
    pub general: f64,
}

impl ScopeTable {
    #[must_use]
    pub const fn get(&self, scope: Scope) -> f64 {
        match scope {
            Scope::Targeted => self.targeted,
            Scope::General => self.general,
        }
    }
}

/// Per-duration multiplier table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DurationTable {
    pub short: f64,
    pub medium: f64,
    pub long: f64,
}

impl DurationTable {
    #[must_use]
    pub const fn get(&self, duration: Duration) -> f64 {
        match duration {
            Duration::Short => self.short,
            Duration::Medium => self.medium,
            Duration::Long => self.long,
        }
    }
}

/// Designer-tuned balance constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceConfig {
    #[serde(rename = "THREAT_SEVERITY")]
    pub threat_severity: f64,
    #[serde(rename = "RANDOM_FACTOR_RANGE")]
    pub random_factor_range: [f64; 2],
    #[serde(rename = "SCOPE_MULTIPLIERS")]
    pub scope_multipliers: ScopeTable,
    #[serde(rename = "DURATION_MULTIPLIERS")]
    pub duration_multipliers: DurationTable,
    #[serde(rename = "SAFEGUARD_QUALITY_PER_ITEM")]
    pub safeguard_quality_per_item: f64,
    #[serde(rename = "TRUST_BOOST_FOR_TRANSPARENCY")]
    pub trust_boost_for_transparency: f64,
    #[serde(rename = "FATIGUE_PER_DURATION")]
    pub fatigue_per_duration: ScopeTable,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            threat_severity: 80.0,
            random_factor_range: [0.5, 1.5],
            scope_multipliers: ScopeTable {
                targeted: 0.7,
                general: 1.3,
            },
            duration_multipliers: DurationTable {
                short: 0.5,
                medium: 1.0,
                long: 1.5,
            },
            safeguard_quality_per_item: 0.2,
            trust_boost_for_transparency: 10.0,
            fatigue_per_duration: ScopeTable {
                targeted: 2.0,
                general: 5.0,
            },
        }
    }
}

impl BalanceConfig {
    /// Safeguard quality with every safeguard selected.
    #[must_use]
    pub fn max_safeguard_quality(&self) -> f64 {
        count_to_f64(Safeguard::ALL.len()) * self.safeguard_quality_per_item
    }

    #[must_use]
    pub const fn random_min(&self) -> f64 {
        self.random_factor_range[0]
    }

    #[must_use]
    pub const fn random_max(&self) -> f64 {
        self.random_factor_range[1]
    }

    /// Check ranges so every later calculation is well defined.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::InvalidBalance`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ContentError> {
        let invalid = |msg: String| Err(ContentError::InvalidBalance(msg));
        if !(0.0..=100.0).contains(&self.threat_severity) {
            return invalid(format!(
                "THREAT_SEVERITY must be within 0..=100, got {}",
                self.threat_severity
            ));
        }
        let [min, max] = self.random_factor_range;
        if !min.is_finite() || !max.is_finite() || min > max {
            return invalid(format!(
                "RANDOM_FACTOR_RANGE must be a finite [min, max] with min <= max, got [{min}, {max}]"
            ));
        }
        let non_negative = [
            ("SCOPE_MULTIPLIERS.targeted", self.scope_multipliers.targeted),
            ("SCOPE_MULTIPLIERS.general", self.scope_multipliers.general),
            ("DURATION_MULTIPLIERS.short", self.duration_multipliers.short),
            ("DURATION_MULTIPLIERS.medium", self.duration_multipliers.medium),
            ("DURATION_MULTIPLIERS.long", self.duration_multipliers.long),
            ("SAFEGUARD_QUALITY_PER_ITEM", self.safeguard_quality_per_item),
            (
                "TRUST_BOOST_FOR_TRANSPARENCY",
                self.trust_boost_for_transparency,
            ),
            ("FATIGUE_PER_DURATION.targeted", self.fatigue_per_duration.targeted),
            ("FATIGUE_PER_DURATION.general", self.fatigue_per_duration.general),
        ];
        if let Some((key, value)) = non_negative
            .iter()
            .find(|(_, value)| !value.is_finite() || *value < 0.0)
        {
            return invalid(format!("{key} must be a non-negative number, got {value}"));
        }
        Ok(())
    }
}

/// Starting conditions for a new game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialSettings {
    pub metrics: Metrics,
    pub budget: u32,
    pub hr: u32,
    pub max_crises: usize,
}

impl Default for InitialSettings {
    fn default() -> Self {
        Self {
            metrics: Metrics::default(),
            budget: 100,
            hr: 50,
            max_crises: 3,
        }
    }
}

impl InitialSettings {
    /// # Errors
    ///
    /// Returns [`ContentError::InvalidSettings`] when a starting gauge is out
    /// of range or no crises would be played.
    pub fn validate(&self) -> Result<(), ContentError> {
        if let Some(kind) = MetricKind::ALL
            .iter()
            .find(|kind| !(0.0..=100.0).contains(&self.metrics.get(**kind)))
        {
            return Err(ContentError::InvalidSettings(format!(
                "initial {kind} must be within 0..=100, got {}",
                self.metrics.get(*kind)
            )));
        }
        if self.max_crises == 0 {
            return Err(ContentError::InvalidSettings(
                "max_crises must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Balance plus starting conditions, as stored in the config source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GameConfig {
    pub game_balance: BalanceConfig,
    pub initial_settings: InitialSettings,
}

impl GameConfig {
    /// Parse and validate a config document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed, a key is missing, or a value
    /// is out of range.
    pub fn from_json(source_name: &str, json: &str) -> Result<Self, ContentError> {
        let config: Self =
            serde_json::from_str(json).map_err(|error| ContentError::Malformed {
                source_name: source_name.to_string(),
                error,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns the first balance or settings violation.
    pub fn validate(&self) -> Result<(), ContentError> {
        self.game_balance.validate()?;
        self.initial_settings.validate()
    }
}
