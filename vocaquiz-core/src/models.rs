use crate::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub type CardId = Uuid;

pub const EF_MIN: f64 = 1.3;
pub const EF_DEFAULT: f64 = 2.5;
/// Upper bound on a review interval, roughly one hundred years.
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

/// Recall grade for a single attempt, 1 (blackout) through 5 (perfect).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quality(u8);

impl Quality {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;
    pub const PASSING: u8 = 3;

    pub fn new(value: u8) -> Result<Self, CoreError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(CoreError::InvalidQuality(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Ratings of 3 and above count as recalled; anything lower is a lapse.
    pub fn is_correct(self) -> bool {
        self.0 >= Self::PASSING
    }
}

impl TryFrom<u8> for Quality {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Quality::new(value)
    }
}

impl From<Quality> for u8 {
    fn from(q: Quality) -> u8 {
        q.0
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// SM-2 state carried by every card.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub ease_factor: f64,
    pub interval: u32,
    pub repetitions: u32,
    pub last_review: Option<DateTime<Utc>>,
    pub next_review: Option<DateTime<Utc>>,
    pub last_quality: Option<Quality>,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            ease_factor: EF_DEFAULT,
            interval: 1,
            repetitions: 0,
            last_review: None,
            next_review: None,
            last_quality: None,
        }
    }
}

impl Schedule {
    pub fn is_new(&self) -> bool {
        self.repetitions == 0
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review.is_some_and(|at| at <= now)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    SourceToTarget,
    TargetToSource,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Card {
    pub id: CardId,
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub schedule: Schedule,
    pub created_at: DateTime<Utc>,
}

impl Card {
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            front: front.into(),
            back: back.into(),
            tags: Vec::new(),
            notes: None,
            schedule: Schedule::default(),
            created_at: Utc::now(),
        }
    }

    /// Side shown as the question for the given direction.
    pub fn prompt(&self, direction: Direction) -> &str {
        match direction {
            Direction::SourceToTarget => &self.front,
            Direction::TargetToSource => &self.back,
        }
    }

    pub fn answer(&self, direction: Direction) -> &str {
        match direction {
            Direction::SourceToTarget => &self.back,
            Direction::TargetToSource => &self.front,
        }
    }

    /// Trims every editable field and rejects blank sides.
    pub fn normalized(mut self) -> Result<Self, CoreError> {
        let (front, back) = normalize_sides(&self.front, &self.back)?;
        self.front = front;
        self.back = back;
        self.tags = normalize_tags(self.tags);
        self.notes = normalize_notes(self.notes);
        Ok(self)
    }
}

/// Editable fields of a card that is about to be created.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NewCard {
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewCard {
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
            ..Self::default()
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn into_card(self) -> Result<Card, CoreError> {
        let mut card = Card::new(self.front, self.back);
        card.tags = self.tags;
        card.notes = self.notes;
        card.normalized()
    }
}

fn normalize_sides(front: &str, back: &str) -> Result<(String, String), CoreError> {
    let front = front.trim();
    let back = back.trim();
    if front.is_empty() {
        return Err(CoreError::Invalid("front must not be empty"));
    }
    if back.is_empty() {
        return Err(CoreError::Invalid("back must not be empty"));
    }
    Ok((front.to_string(), back.to_string()))
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for t in tags {
        let t = t.trim();
        if !t.is_empty() && !out.iter().any(|x| x == t) {
            out.push(t.to_string());
        }
    }
    out
}

fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}
