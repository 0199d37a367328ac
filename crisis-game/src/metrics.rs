//! The five tracked gauges and their deltas.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::numbers::clamp_metric;

/// Identifies one of the five gauges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Security,
    Freedom,
    PublicTrust,
    Resilience,
    Fatigue,
}

impl MetricKind {
    pub const ALL: [Self; 5] = [
        Self::Security,
        Self::Freedom,
        Self::PublicTrust,
        Self::Resilience,
        Self::Fatigue,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Security => "security",
            Self::Freedom => "freedom",
            Self::PublicTrust => "public_trust",
            Self::Resilience => "resilience",
            Self::Fatigue => "fatigue",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Security => "Security",
            Self::Freedom => "Freedom",
            Self::PublicTrust => "Public Trust",
            Self::Resilience => "Resilience",
            Self::Fatigue => "Compliance Fatigue",
        }
    }

    /// Fatigue is the only gauge where a lower reading is the better outcome.
    #[must_use]
    pub const fn higher_is_better(self) -> bool {
        !matches!(self, Self::Fatigue)
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Snapshot of all five gauges, each kept within `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub security: f64,
    pub freedom: f64,
    pub public_trust: f64,
    pub resilience: f64,
    pub fatigue: f64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            security: 50.0,
            freedom: 50.0,
            public_trust: 50.0,
            resilience: 50.0,
            fatigue: 0.0,
        }
    }
}

impl Metrics {
    #[must_use]
    pub const fn get(&self, kind: MetricKind) -> f64 {
        match kind {
            MetricKind::Security => self.security,
            MetricKind::Freedom => self.freedom,
            MetricKind::PublicTrust => self.public_trust,
            MetricKind::Resilience => self.resilience,
            MetricKind::Fatigue => self.fatigue,
        }
    }

    pub const fn set(&mut self, kind: MetricKind, value: f64) {
        match kind {
            MetricKind::Security => self.security = value,
            MetricKind::Freedom => self.freedom = value,
            MetricKind::PublicTrust => self.public_trust = value,
            MetricKind::Resilience => self.resilience = value,
            MetricKind::Fatigue => self.fatigue = value,
        }
    }

    pub fn clamp(&mut self) {
        for kind in MetricKind::ALL {
            self.set(kind, clamp_metric(self.get(kind)));
        }
    }

    /// Apply deltas and clamp every gauge back into range.
    #[must_use]
    pub fn with_deltas(&self, deltas: &MetricDeltas) -> Self {
        let mut next = Self {
            security: self.security + deltas.security,
            freedom: self.freedom + deltas.freedom,
            public_trust: self.public_trust + deltas.public_trust,
            resilience: self.resilience + deltas.resilience,
            fatigue: self.fatigue + deltas.fatigue,
        };
        next.clamp();
        next
    }

    #[must_use]
    pub fn in_range(&self) -> bool {
        MetricKind::ALL
            .iter()
            .all(|kind| (0.0..=100.0).contains(&self.get(*kind)))
    }

    /// Per-gauge difference `self - earlier`.
    #[must_use]
    pub fn diff(&self, earlier: &Self) -> MetricDeltas {
        MetricDeltas {
            security: self.security - earlier.security,
            freedom: self.freedom - earlier.freedom,
            public_trust: self.public_trust - earlier.public_trust,
            resilience: self.resilience - earlier.resilience,
            fatigue: self.fatigue - earlier.fatigue,
        }
    }
}

/// Signed change to each gauge.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricDeltas {
    pub security: f64,
    pub freedom: f64,
    pub public_trust: f64,
    pub resilience: f64,
    pub fatigue: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deltas_clamp_into_range() {
        let start = Metrics::default();
        let next = start.with_deltas(&MetricDeltas {
            security: 80.0,
            freedom: -75.0,
            public_trust: 1.5,
            resilience: 0.0,
            fatigue: -10.0,
        });
        assert!((next.security - 100.0).abs() < f64::EPSILON);
        assert!((next.freedom - 0.0).abs() < f64::EPSILON);
        assert!((next.public_trust - 51.5).abs() < f64::EPSILON);
        assert!((next.fatigue - 0.0).abs() < f64::EPSILON);
        assert!(next.in_range());
    }

    #[test]
    fn diff_reports_signed_changes() {
        let before = Metrics::default();
        let mut after = before;
        after.set(MetricKind::PublicTrust, 42.0);
        let delta = after.diff(&before);
        assert!((delta.public_trust + 8.0).abs() < f64::EPSILON);
        assert!((delta.security - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn deserializes_from_snake_case_keys() {
        let metrics: Metrics = serde_json::from_str(
            r#"{"security":60,"freedom":70,"public_trust":55,"resilience":40,"fatigue":5}"#,
        )
        .unwrap();
        assert!((metrics.get(MetricKind::PublicTrust) - 55.0).abs() < f64::EPSILON);
        assert!(MetricKind::Fatigue.key() == "fatigue");
        assert!(!MetricKind::Fatigue.higher_is_better());
    }
}
