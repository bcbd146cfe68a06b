use serde::{Deserialize, Serialize};

use crate::errors::{EngineError, Result};

/// Which operations are legal right now
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    /// Players are added and removed; no match yet
    #[default]
    Setup,
    /// Wagers and choices may change
    Betting,
    /// Bets are locked; the result is drawn and settled
    Resolving,
    /// Settlement applied; results on display
    Settled,
}

impl GamePhase {
    pub fn can_transition(&self, to: GamePhase) -> bool {
        matches!(
            (self, to),
            (GamePhase::Setup, GamePhase::Betting)
                | (GamePhase::Betting, GamePhase::Resolving)
                | (GamePhase::Resolving, GamePhase::Settled)
                | (GamePhase::Settled, GamePhase::Betting)
        )
    }

    /// Validate and return the next phase
    pub fn transition(self, to: GamePhase) -> Result<GamePhase> {
        if !self.can_transition(to) {
            return Err(EngineError::IllegalTransition { from: self, to });
        }
        Ok(to)
    }

    /// Fail unless currently in `expected`
    pub fn require(self, expected: GamePhase, action: &'static str) -> Result<()> {
        if self != expected {
            return Err(EngineError::WrongPhase {
                action,
                phase: self,
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for GamePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GamePhase::Setup => write!(f, "SETUP"),
            GamePhase::Betting => write!(f, "BETTING"),
            GamePhase::Resolving => write!(f, "RESOLVING"),
            GamePhase::Settled => write!(f, "SETTLED"),
        }
    }
}
