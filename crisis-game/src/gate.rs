//! Resource gating for action cards.
use crate::data::ActionCard;

#[must_use]
pub const fn can_afford(card: &ActionCard, budget: u32, human_resources: u32) -> bool {
    card.cost <= budget && card.hr_cost <= human_resources
}

/// Cards the player can pay for, in their authored order.
#[must_use]
pub fn affordable(cards: &[ActionCard], budget: u32, human_resources: u32) -> Vec<&ActionCard> {
    cards
        .iter()
        .filter(|card| can_afford(card, budget, human_resources))
        .collect()
}

/// True when nothing is affordable and the crisis must be skipped.
#[must_use]
pub fn is_blocked(cards: &[ActionCard], budget: u32, human_resources: u32) -> bool {
    !cards
        .iter()
        .any(|card| can_afford(card, budget, human_resources))
}
