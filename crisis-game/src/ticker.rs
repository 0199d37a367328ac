//! Rolling news headlines.
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

use crate::constants::NEWS_TICKER_CAPACITY;

/// A narrative headline produced by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Headline {
    GameStarted,
    SecurityUp { action_name: String },
    FreedomDebate,
    TransparencyReport,
    ResourceShortfall,
}

impl Headline {
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::GameStarted => "news.game-started",
            Self::SecurityUp { .. } => "news.security-up",
            Self::FreedomDebate => "news.freedom-debate",
            Self::TransparencyReport => "news.transparency",
            Self::ResourceShortfall => "news.resource-shortfall",
        }
    }
}

impl fmt::Display for Headline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GameStarted => f.write_str("The game has begun. The country is stable."),
            Self::SecurityUp { action_name } => write!(
                f,
                "📈 SECURITY UP: Threat level falls after the '{action_name}' policy."
            ),
            Self::FreedomDebate => f.write_str(
                "📉 FREEDOM DEBATE: New restrictions draw backlash from civil society.",
            ),
            Self::TransparencyReport => f.write_str(
                "📰 TRANSPARENCY: The government publishes a detailed report on its measures.",
            ),
            Self::ResourceShortfall => f.write_str(
                "🚨 RESOURCES EXHAUSTED: The government could not respond to the crisis.",
            ),
        }
    }
}

/// Bounded, most-recent-first headline log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredTicker")]
pub struct NewsTicker {
    entries: VecDeque<Headline>,
}

/// Serialized ticker shape; loading drops anything past capacity.
#[derive(Deserialize)]
struct StoredTicker {
    entries: VecDeque<Headline>,
}

impl From<StoredTicker> for NewsTicker {
    fn from(stored: StoredTicker) -> Self {
        let mut entries = stored.entries;
        entries.truncate(NEWS_TICKER_CAPACITY);
        Self { entries }
    }
}

impl Default for NewsTicker {
    fn default() -> Self {
        Self::seeded()
    }
}

impl NewsTicker {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: VecDeque::with_capacity(NEWS_TICKER_CAPACITY + 1),
        }
    }

    /// Fresh ticker carrying the opening headline.
    #[must_use]
    pub fn seeded() -> Self {
        let mut ticker = Self::empty();
        ticker.push(Headline::GameStarted);
        ticker
    }

    /// Insert at the front, evicting the oldest entry beyond capacity.
    pub fn push(&mut self, headline: Headline) {
        self.entries.push_front(headline);
        self.entries.truncate(NEWS_TICKER_CAPACITY);
    }

    pub fn extend(&mut self, headlines: impl IntoIterator<Item = Headline>) {
        for headline in headlines {
            self.push(headline);
        }
    }

    #[must_use]
    pub fn latest(&self) -> Option<&Headline> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Headline> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticker_is_bounded_and_most_recent_first() {
        let mut ticker = NewsTicker::seeded();
        for idx in 0..8 {
            ticker.push(Headline::SecurityUp {
                action_name: format!("Policy {idx}"),
            });
            assert!(ticker.len() <= NEWS_TICKER_CAPACITY);
            assert_eq!(
                ticker.latest(),
                Some(&Headline::SecurityUp {
                    action_name: format!("Policy {idx}")
                })
            );
        }
        assert_eq!(ticker.len(), NEWS_TICKER_CAPACITY);
        assert!(!ticker.iter().any(|h| *h == Headline::GameStarted));
    }

    #[test]
    fn extend_keeps_insertion_order_semantics() {
        let mut ticker = NewsTicker::empty();
        ticker.extend([Headline::FreedomDebate, Headline::TransparencyReport]);
        let keys: Vec<&str> = ticker.iter().map(Headline::key).collect();
        assert_eq!(keys, vec!["news.transparency", "news.freedom-debate"]);
    }

    #[test]
    fn deserializing_keeps_only_the_newest_headlines() {
        let entries: Vec<serde_json::Value> = (0..8)
            .map(|idx| {
                serde_json::json!({"kind": "security_up", "action_name": format!("P{idx}")})
            })
            .collect();
        let ticker: NewsTicker =
            serde_json::from_value(serde_json::json!({ "entries": entries })).unwrap();
        assert_eq!(ticker.len(), NEWS_TICKER_CAPACITY);
        assert_eq!(
            ticker.latest(),
            Some(&Headline::SecurityUp {
                action_name: "P0".into()
            })
        );

        let round_trip: NewsTicker =
            serde_json::from_str(&serde_json::to_string(&NewsTicker::seeded()).unwrap()).unwrap();
        assert_eq!(round_trip, NewsTicker::seeded());
    }

    #[test]
    fn headlines_render_text() {
        let text = Headline::SecurityUp {
            action_name: "Curfew".into(),
        }
        .to_string();
        assert!(text.contains("'Curfew'"));
        assert!(NewsTicker::seeded().latest().is_some());
    }
}
