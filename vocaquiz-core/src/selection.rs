use crate::{filter_due, filter_new, filter_review, order_by_priority, Card};
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    #[default]
    Due,
    New,
    Review,
    Random,
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionMode::Due => "due",
            SessionMode::New => "new",
            SessionMode::Review => "review",
            SessionMode::Random => "random",
        };
        f.write_str(s)
    }
}

/// Picks and orders the cards for one session, truncated to `limit`.
///
/// `due` and `review` are priority ordered, `new` keeps collection order and
/// `random` shuffles the whole collection with `rng`. An empty result is valid.
pub fn select_session<R>(
    cards: &[Card],
    mode: SessionMode,
    now: DateTime<Utc>,
    limit: usize,
    rng: &mut R,
) -> Vec<Card>
where
    R: Rng + ?Sized,
{
    let mut picked = match mode {
        SessionMode::Due => order_by_priority(filter_due(cards, now), now),
        SessionMode::New => filter_new(cards),
        SessionMode::Review => order_by_priority(filter_review(cards), now),
        SessionMode::Random => {
            let mut all = cards.to_vec();
            all.shuffle(rng);
            all
        }
    };
    picked.truncate(limit);
    tracing::debug!(%mode, limit, selected = picked.len(), "session cards selected");
    picked
}
