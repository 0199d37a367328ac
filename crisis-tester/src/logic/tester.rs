use chrono::Utc;
use colored::Colorize;
use crisis_game::{ContentBundle, LeadershipStyle, ScoreTier};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::logic::policy::GameplayStrategy;
use crate::logic::seeds::SeedInfo;
use crate::logic::simulation::{GameOutcome, SimulationConfig, run_game};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyResult {
    pub strategy: String,
    pub seed: u64,
    pub run_code: String,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    pub average_score: f64,
    pub best_score: f64,
    pub worst_score: f64,
    pub tier_counts: BTreeMap<String, usize>,
    pub style_counts: BTreeMap<String, usize>,
    pub total_skips: usize,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
}

impl StrategyResult {
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} @ {}", self.strategy, self.run_code)
    }
}

/// Everything one CLI invocation produced, as written by the JSON report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub generated_at: String,
    pub content_fingerprint: String,
    pub scenario_count: usize,
    pub max_crises: usize,
    pub results: Vec<StrategyResult>,
}

impl RunReport {
    #[must_use]
    pub fn new(content: &ContentBundle, results: Vec<StrategyResult>) -> Self {
        Self {
            generated_at: Utc::now().format("%Y%m%dT%H%M%S").to_string(),
            content_fingerprint: content.fingerprint_hex(),
            scenario_count: content.scenarios.len(),
            max_crises: content.settings().max_crises,
            results,
        }
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.results.iter().all(|result| result.passed)
    }
}

pub struct LogicTester {
    content: Arc<ContentBundle>,
    verbose: bool,
}

impl LogicTester {
    #[must_use]
    pub const fn new(content: Arc<ContentBundle>, verbose: bool) -> Self {
        Self { content, verbose }
    }

    #[must_use]
    pub fn content(&self) -> &ContentBundle {
        &self.content
    }

    pub fn run_strategy(
        &self,
        strategy: GameplayStrategy,
        seeds: &[SeedInfo],
        iterations: usize,
    ) -> Vec<StrategyResult> {
        let mut results = Vec::new();

        for seed in seeds {
            if self.verbose {
                println!(
                    "🧪 Testing strategy: {} (seed {} / {})",
                    strategy.label().bright_white(),
                    seed.seed,
                    seed.run_code()
                );
            }
            results.push(self.run_single(strategy, seed, iterations));
        }

        results
    }

    fn run_single(
        &self,
        strategy: GameplayStrategy,
        seed: &SeedInfo,
        iterations: usize,
    ) -> StrategyResult {
        let mut outcomes = Vec::new();
        let mut failures = Vec::new();
        let mut performance_data = Vec::new();

        for i in 0..iterations {
            let start_time = Instant::now();
            let iteration_seed = seed.seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));
            let config = SimulationConfig::new(strategy, iteration_seed);

            match run_game(Arc::clone(&self.content), config) {
                Ok(outcome) if outcome.passed() => {
                    let duration = start_time.elapsed();
                    performance_data.push(duration);
                    if self.verbose {
                        println!(
                            "  ✅ Iteration {}/{} passed ({duration:?}) score:{:.1} style:{}",
                            i + 1,
                            iterations,
                            outcome.summary.display_score(),
                            outcome.summary.style.title()
                        );
                    }
                    outcomes.push(outcome);
                }
                Ok(outcome) => {
                    let message = format!(
                        "Iteration {} (seed {}, code {}, steps {}, crises {}): {} | {}",
                        i + 1,
                        outcome.seed,
                        outcome.run_code,
                        outcome.steps,
                        outcome.crisis_sequence.join(">"),
                        outcome.violations.join("; "),
                        summarize_decision_path(&outcome)
                    );
                    if self.verbose {
                        println!("  ❌ {}", message.clone().red());
                    }
                    failures.push(message);
                }
                Err(err) => {
                    let message = format!("Iteration {} (seed {iteration_seed}): {err}", i + 1);
                    if self.verbose {
                        println!("  ❌ {}", message.clone().red());
                    }
                    failures.push(message);
                }
            }
        }

        let average_duration = if performance_data.is_empty() {
            Duration::ZERO
        } else {
            performance_data.iter().sum::<Duration>()
                / u32::try_from(performance_data.len()).unwrap_or(1)
        };

        let stats = ScoreStats::collect(&outcomes);
        StrategyResult {
            strategy: strategy.key().to_string(),
            seed: seed.seed,
            run_code: seed.run_code(),
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: outcomes.len(),
            failures,
            average_score: stats.average,
            best_score: stats.best,
            worst_score: stats.worst,
            tier_counts: stats.tiers,
            style_counts: stats.styles,
            total_skips: outcomes.iter().map(GameOutcome::skips).sum(),
            average_duration,
            performance_data,
        }
    }
}

#[derive(Debug, Default)]
struct ScoreStats {
    average: f64,
    best: f64,
    worst: f64,
    tiers: BTreeMap<String, usize>,
    styles: BTreeMap<String, usize>,
}

impl ScoreStats {
    fn collect(outcomes: &[GameOutcome]) -> Self {
        let mut stats = Self::default();
        if outcomes.is_empty() {
            return stats;
        }
        for tier in [ScoreTier::Excellent, ScoreTier::Good, ScoreTier::Poor] {
            stats.tiers.insert(tier.as_str().to_string(), 0);
        }
        for style in LeadershipStyle::ALL {
            stats.styles.insert(style.key().to_string(), 0);
        }

        let scores: Vec<f64> = outcomes.iter().map(|o| o.summary.score).collect();
        #[allow(clippy::cast_precision_loss)]
        let count = scores.len() as f64;
        stats.average = scores.iter().sum::<f64>() / count;
        stats.best = scores.iter().copied().fold(f64::MIN, f64::max);
        stats.worst = scores.iter().copied().fold(f64::MAX, f64::min);

        for outcome in outcomes {
            *stats
                .tiers
                .entry(outcome.summary.tier.as_str().to_string())
                .or_default() += 1;
            *stats
                .styles
                .entry(outcome.summary.style.key().to_string())
                .or_default() += 1;
        }
        stats
    }
}

fn summarize_decision_path(outcome: &GameOutcome) -> String {
    if outcome.decisions.is_empty() {
        return "no decisions recorded".to_string();
    }

    outcome
        .decisions
        .iter()
        .map(|entry| {
            let rationale = entry
                .rationale
                .as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or("-");
            format!(
                "crisis {} ({}): {} [{}] reason {}",
                entry.crisis_number,
                entry.scenario_id,
                entry.action_id.as_deref().unwrap_or("skip"),
                entry.policy_name,
                rationale
            )
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis: Vec<u128> = durations.iter().map(Duration::as_millis).collect();
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis_vec = Vec::<u128>::deserialize(deserializer)?;
        Ok(millis_vec
            .into_iter()
            .map(|m| Duration::from_millis(u64::try_from(m).unwrap_or(0)))
            .collect())
    }
}
