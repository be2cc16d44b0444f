use crate::Direction;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CARDS_PER_SESSION: usize = 20;

/// How the prompt side is chosen for each card of a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionMode {
    #[default]
    SourceToTarget,
    TargetToSource,
    Random,
}

impl DirectionMode {
    pub fn draw<R: Rng + ?Sized>(self, rng: &mut R) -> Direction {
        match self {
            DirectionMode::SourceToTarget => Direction::SourceToTarget,
            DirectionMode::TargetToSource => Direction::TargetToSource,
            DirectionMode::Random => {
                if rng.gen_bool(0.5) {
                    Direction::SourceToTarget
                } else {
                    Direction::TargetToSource
                }
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    pub cards_per_session: usize,
    pub direction: DirectionMode,
    pub seed: Option<u64>,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            cards_per_session: DEFAULT_CARDS_PER_SESSION,
            direction: DirectionMode::default(),
            seed: None,
        }
    }
}
