//! Quiz session state machine.
//!
//! A session walks an ordered card list one card at a time:
//! `Presenting(i)` -> `RevealingAnswer(i)` -> `AwaitingRating(i)` and then on to
//! `Presenting(i + 1)` or `Completed`. `EarlyExit` can be reached from any
//! non-terminal state. Repeat passes over wrong answers are ordinary sessions
//! built from [`QuizSession::wrong_answers`].

use crate::repo::ScheduleSink;
use crate::{
    apply_quality, Card, CardId, CoreError, Direction, DirectionMode, Quality, QualityCounts,
    Schedule, ScheduleUpdate, SessionStats,
};
use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::HashSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Presenting(usize),
    RevealingAnswer(usize),
    AwaitingRating(usize),
    Completed,
    EarlyExit,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Completed | SessionState::EarlyExit)
    }

    /// Index of the card in play, if any.
    pub fn index(self) -> Option<usize> {
        match self {
            SessionState::Presenting(i)
            | SessionState::RevealingAnswer(i)
            | SessionState::AwaitingRating(i) => Some(i),
            SessionState::Completed | SessionState::EarlyExit => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            SessionState::Presenting(_) => "presenting",
            SessionState::RevealingAnswer(_) => "revealing answer",
            SessionState::AwaitingRating(_) => "awaiting rating",
            SessionState::Completed => "completed",
            SessionState::EarlyExit => "exited",
        }
    }
}

/// One rated card. `card` carries the schedule produced by the rating.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionResult {
    pub card: Card,
    pub quality: Quality,
    pub direction: Direction,
}

pub struct QuizSession<R> {
    cards: Vec<Card>,
    withdrawn: HashSet<CardId>,
    direction_mode: DirectionMode,
    direction: Direction,
    repeat_pass: bool,
    state: SessionState,
    results: Vec<SessionResult>,
    stats: SessionStats,
    counts: QualityCounts,
    rng: R,
}

impl<R: Rng> QuizSession<R> {
    pub fn new(cards: Vec<Card>, direction_mode: DirectionMode, rng: R) -> Self {
        Self::build(cards, direction_mode, rng, false)
    }

    /// Session over the wrong answers of an earlier one. Ratings are scheduled
    /// exactly like a normal session; only `is_repeat_pass` differs.
    pub fn repeat_pass(cards: Vec<Card>, direction_mode: DirectionMode, rng: R) -> Self {
        Self::build(cards, direction_mode, rng, true)
    }

    fn build(cards: Vec<Card>, direction_mode: DirectionMode, rng: R, repeat_pass: bool) -> Self {
        tracing::debug!(
            cards = cards.len(),
            ?direction_mode,
            repeat_pass,
            "quiz session created"
        );
        let mut session = Self {
            cards,
            withdrawn: HashSet::new(),
            direction_mode,
            direction: Direction::SourceToTarget,
            repeat_pass,
            state: SessionState::Completed,
            results: Vec::new(),
            stats: SessionStats::default(),
            counts: QualityCounts::default(),
            rng,
        };
        session.enter(0);
        session
    }

    /// Moves to the first card at or after `from` that is still in the working
    /// set, or completes the session.
    fn enter(&mut self, from: usize) {
        let next = (from..self.cards.len()).find(|&i| !self.withdrawn.contains(&self.cards[i].id));
        match next {
            Some(i) => {
                self.direction = self.direction_mode.draw(&mut self.rng);
                self.state = SessionState::Presenting(i);
                tracing::debug!(index = i, direction = ?self.direction, "presenting card");
            }
            None => {
                self.state = SessionState::Completed;
                tracing::info!(
                    correct = self.stats.correct,
                    total = self.stats.total,
                    max_streak = self.stats.max_streak,
                    repeat_pass = self.repeat_pass,
                    "quiz session completed"
                );
            }
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_repeat_pass(&self) -> bool {
        self.repeat_pass
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Zero-based index of the card in play.
    pub fn position(&self) -> Option<usize> {
        self.state.index()
    }

    /// Cards still to be rated, counting the one in play.
    pub fn remaining(&self) -> usize {
        let Some(i) = self.state.index() else {
            return 0;
        };
        self.cards[i..]
            .iter()
            .filter(|c| !self.withdrawn.contains(&c.id))
            .count()
    }

    pub fn current_card(&self) -> Option<&Card> {
        self.state.index().map(|i| &self.cards[i])
    }

    pub fn prompt(&self) -> Option<&str> {
        self.current_card().map(|c| c.prompt(self.direction))
    }

    /// The answer side, once revealed.
    pub fn answer(&self) -> Option<&str> {
        match self.state {
            SessionState::RevealingAnswer(i) | SessionState::AwaitingRating(i) => {
                Some(self.cards[i].answer(self.direction))
            }
            _ => None,
        }
    }

    pub fn reveal(&mut self) -> Result<(), CoreError> {
        match self.state {
            SessionState::Presenting(i) => {
                self.state = SessionState::RevealingAnswer(i);
                Ok(())
            }
            SessionState::RevealingAnswer(_) | SessionState::AwaitingRating(_) => Ok(()),
            other => Err(invalid("reveal", other)),
        }
    }

    pub fn hide(&mut self) -> Result<(), CoreError> {
        match self.state {
            SessionState::RevealingAnswer(i) | SessionState::AwaitingRating(i) => {
                self.state = SessionState::Presenting(i);
                Ok(())
            }
            SessionState::Presenting(_) => Ok(()),
            other => Err(invalid("hide", other)),
        }
    }

    /// Rates the revealed card.
    ///
    /// The new schedule is applied in memory and issued to `sink` before the
    /// session advances. An out-of-range quality leaves the session waiting on
    /// the same card. A card withdrawn from the working set is skipped without
    /// scheduling and reported as [`CoreError::CardNotFound`].
    pub fn rate<S>(
        &mut self,
        quality: u8,
        now: DateTime<Utc>,
        sink: &mut S,
    ) -> Result<Schedule, CoreError>
    where
        S: ScheduleSink + ?Sized,
    {
        let i = match self.state {
            SessionState::RevealingAnswer(i) | SessionState::AwaitingRating(i) => i,
            other => return Err(invalid("rate", other)),
        };
        self.state = SessionState::AwaitingRating(i);

        let card_id = self.cards[i].id;
        if self.withdrawn.contains(&card_id) {
            tracing::warn!(%card_id, "rating for withdrawn card dropped");
            self.enter(i + 1);
            return Err(CoreError::CardNotFound(card_id));
        }

        let quality = Quality::new(quality)?;
        let schedule = apply_quality(&self.cards[i].schedule, quality, now);
        self.cards[i].schedule = schedule.clone();

        sink.issue(ScheduleUpdate {
            card_id,
            schedule: schedule.clone(),
        });

        self.results.push(SessionResult {
            card: self.cards[i].clone(),
            quality,
            direction: self.direction,
        });
        self.stats.record(quality);
        self.counts.record(quality);
        tracing::debug!(%card_id, %quality, interval = schedule.interval, "card rated");

        self.enter(i + 1);
        Ok(schedule)
    }

    /// Drops a not-yet-rated card from the working set. Returns `false` if the
    /// card is unknown, already rated, or the session is over.
    pub fn withdraw(&mut self, card_id: CardId) -> bool {
        let Some(current) = self.state.index() else {
            return false;
        };
        let pending = self.cards[current..].iter().any(|c| c.id == card_id);
        if pending {
            self.withdrawn.insert(card_id);
            tracing::debug!(%card_id, "card withdrawn from session");
        }
        pending
    }

    /// Abandons the session. Ratings already given stay applied.
    pub fn exit(&mut self) -> Result<(), CoreError> {
        if self.state.is_terminal() {
            return Err(invalid("exit", self.state));
        }
        tracing::info!(
            rated = self.results.len(),
            of = self.cards.len(),
            "quiz session exited early"
        );
        self.state = SessionState::EarlyExit;
        Ok(())
    }

    pub fn results(&self) -> &[SessionResult] {
        &self.results
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn quality_counts(&self) -> &QualityCounts {
        &self.counts
    }

    /// Cards rated below 3, in the order they were rated.
    pub fn wrong_answers(&self) -> Vec<Card> {
        self.results
            .iter()
            .filter(|r| !r.quality.is_correct())
            .map(|r| r.card.clone())
            .collect()
    }

    /// Builds the repeat pass for a completed session.
    pub fn spawn_repeat<R2: Rng>(&self, rng: R2) -> Result<QuizSession<R2>, CoreError> {
        if self.state != SessionState::Completed {
            return Err(invalid("repeat", self.state));
        }
        Ok(QuizSession::repeat_pass(
            self.wrong_answers(),
            self.direction_mode,
            rng,
        ))
    }
}

fn invalid(action: &'static str, state: SessionState) -> CoreError {
    CoreError::InvalidTransition {
        action,
        state: state.name(),
    }
}
