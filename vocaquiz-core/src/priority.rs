use crate::Card;
use chrono::{DateTime, Duration, Utc};
use std::cmp::Ordering;

/// How far past its due time a card is; `None` for cards never scheduled.
fn overdue_by(card: &Card, now: DateTime<Utc>) -> Option<Duration> {
    card.schedule.next_review.map(|at| now - at)
}

/// Urgency order: most overdue first, unscheduled cards last, then lower
/// ease factor, then id.
pub fn priority_cmp(a: &Card, b: &Card, now: DateTime<Utc>) -> Ordering {
    let due = match (overdue_by(a, now), overdue_by(b, now)) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    due.then_with(|| a.schedule.ease_factor.total_cmp(&b.schedule.ease_factor))
        .then_with(|| a.id.cmp(&b.id))
}

pub fn order_by_priority(mut cards: Vec<Card>, now: DateTime<Utc>) -> Vec<Card> {
    cards.sort_by(|a, b| priority_cmp(a, b, now));
    cards
}
