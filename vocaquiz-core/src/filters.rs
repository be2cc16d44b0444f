use crate::{Card, CardId};
use chrono::{DateTime, Utc};

/// Cards whose scheduled review time has arrived. Never-scheduled cards are excluded.
pub fn filter_due(cards: &[Card], now: DateTime<Utc>) -> Vec<Card> {
    cards
        .iter()
        .filter(|c| c.schedule.is_due(now))
        .cloned()
        .collect()
}

pub fn filter_new(cards: &[Card]) -> Vec<Card> {
    cards.iter().filter(|c| c.schedule.is_new()).cloned().collect()
}

pub fn filter_review(cards: &[Card]) -> Vec<Card> {
    cards.iter().filter(|c| !c.schedule.is_new()).cloned().collect()
}

/// First card (other than `exclude`) sharing the same front or the same back.
pub fn find_duplicate<'a>(
    cards: &'a [Card],
    front: &str,
    back: &str,
    exclude: Option<CardId>,
) -> Option<&'a Card> {
    cards
        .iter()
        .filter(|c| Some(c.id) != exclude)
        .find(|c| c.front == front || c.back == back)
}
