use crate::{Card, Quality};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Running totals for one session, updated once per rating.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub correct: u32,
    pub total: u32,
    pub streak: u32,
    pub max_streak: u32,
}

impl SessionStats {
    pub fn record(&mut self, q: Quality) {
        self.total += 1;
        if q.is_correct() {
            self.correct += 1;
            self.streak += 1;
            self.max_streak = self.max_streak.max(self.streak);
        } else {
            self.streak = 0;
        }
    }

    pub fn accuracy(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f32 / self.total as f32
        }
    }
}

/// Number of ratings given per quality value, index 0 holding quality 1.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct QualityCounts([u32; 5]);

impl QualityCounts {
    pub fn record(&mut self, q: Quality) {
        self.0[usize::from(q.value() - 1)] += 1;
    }

    pub fn get(&self, q: Quality) -> u32 {
        self.0[usize::from(q.value() - 1)]
    }

    /// `(quality, count)` pairs with a non-zero count.
    pub fn nonzero(&self) -> impl Iterator<Item = (u8, u32)> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, n)| **n > 0)
            .map(|(i, n)| (i as u8 + 1, *n))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CollectionStats {
    pub total: usize,
    pub learned: usize,
    pub due: usize,
    pub unlearned: usize,
}

pub fn collection_stats(cards: &[Card], now: DateTime<Utc>) -> CollectionStats {
    let learned = cards.iter().filter(|c| !c.schedule.is_new()).count();
    let due = cards.iter().filter(|c| c.schedule.is_due(now)).count();
    CollectionStats {
        total: cards.len(),
        learned,
        due,
        unlearned: cards.len() - learned,
    }
}
