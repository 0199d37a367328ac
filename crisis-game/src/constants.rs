//! Fixed rules of the crisis engine.
//!
//! Balance parameters that designers tune live in the content files and are
//! loaded into [`crate::data::BalanceConfig`]. The values here are part of the
//! game's rules rather than its tuning: headline thresholds, the penalty for an
//! unanswered crisis, and the scoring cut-offs.

// Metric bounds ------------------------------------------------------------
pub const METRIC_MIN: f64 = 0.0;
pub const METRIC_MAX: f64 = 100.0;

// Effect formula -----------------------------------------------------------
pub(crate) const SIDE_EFFECT_SCALE: f64 = 20.0;
pub(crate) const TRUST_LOSS_PER_FREEDOM: f64 = 0.5;
pub(crate) const FAST_RESPONSE_RESILIENCE: f64 = 5.0;

// News ticker --------------------------------------------------------------
pub const NEWS_TICKER_CAPACITY: usize = 5;
pub(crate) const SECURITY_HEADLINE_THRESHOLD: f64 = 15.0;
pub(crate) const FREEDOM_HEADLINE_THRESHOLD: f64 = 15.0;

// Skipped turn -------------------------------------------------------------
pub const SKIP_SECURITY_PENALTY: f64 = -25.0;
pub const SKIP_TRUST_PENALTY: f64 = -20.0;
pub const SKIP_RESILIENCE_PENALTY: f64 = -10.0;
pub const SKIP_FATIGUE_GAIN: f64 = 15.0;

// Delayed effects ----------------------------------------------------------
pub const DEFAULT_DELAYED_BONUS: f64 = 5.0;
pub(crate) const TRUST_EROSION_THRESHOLD: f64 = 0.7;
pub(crate) const TRUST_EROSION_AMOUNT: f64 = 3.0;

// Report analysis ----------------------------------------------------------
pub(crate) const SAFEGUARD_MITIGATION_PCT_PER_ITEM: u32 = 15;

// Scoring ------------------------------------------------------------------
pub(crate) const SCORE_EXCELLENT_ABOVE: f64 = 75.0;
pub(crate) const SCORE_GOOD_ABOVE: f64 = 55.0;
pub(crate) const STYLE_HIGH: f64 = 75.0;
pub(crate) const STYLE_LOW: f64 = 50.0;
pub(crate) const STYLE_TRUST_ABOVE: f64 = 70.0;
pub(crate) const STYLE_RESILIENCE_ABOVE: f64 = 60.0;

// Content ------------------------------------------------------------------
/// Tokens that split a scenario story into its report and mission parts.
pub(crate) const MISSION_MARKERS: [&str; 2] = ["**Mission**:", "**Görev**:"];
pub(crate) const TEMPLATE_PLACEHOLDER: &str = "{}";
pub(crate) const DEFAULT_SCENARIO_TITLE: &str = "Untitled Scenario";
pub(crate) const DEFAULT_SCENARIO_ICON: &str = "❓";

// Narrative text -----------------------------------------------------------
pub(crate) const PROPORTIONATE_COUNTER_FACTUAL: &str =
    "This was a proportionate choice; the safeguards made a difference.";
pub(crate) const SKIP_COUNTER_FACTUAL: &str = "Had you used your resources more efficiently, \
     you could have responded to this crisis and prevented greater harm.";
pub(crate) const SKIP_IMMEDIATE_TEXT: &str = "With no resources left, the government could not \
     respond to the crisis. Its effects deepened and anxiety spread through the public.";
pub(crate) const SKIP_DELAYED_TEXT: &str = "The long-term cost of inaction was heavy. Recovery \
     slowed and the country's resilience against future crises eroded.";
