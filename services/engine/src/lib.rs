//! Round-based football betting engine
//!
//! Players stake virtual balances on a generated match, a result is drawn
//! from the bookmaker odds, bets are settled in integer cents and every
//! player receives the round bonus before the next match opens.

pub mod config;
pub mod domain;
pub mod errors;
pub mod game;
pub mod generator;
pub mod ledger;
pub mod narrative;
pub mod odds;
pub mod outcome;
pub mod phase;
pub mod settlement;
pub mod validation;

pub use domain::{BetChoice, Match, Odds, OddsBounds, Outcome, Player, SettlementResult};
pub use errors::{EngineError, Result};
pub use game::{Game, GameSettings, RoundReport};
pub use phase::GamePhase;
