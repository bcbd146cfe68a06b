//! Advisory bet checks consulted before bets are locked in

use serde::{Deserialize, Serialize};
use shared::Cents;

use crate::domain::Player;
use crate::errors::{EngineError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BetValidation {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl BetValidation {
    pub fn into_result(self) -> Result<()> {
        if self.valid {
            Ok(())
        } else {
            Err(EngineError::ValidationFailure(self.errors))
        }
    }
}

/// Check every player independently; complaints accumulate across the batch.
pub fn validate_bets(players: &[Player]) -> BetValidation {
    let mut errors = Vec::new();

    for player in players {
        if player.wager.is_negative() {
            errors.push(format!("{}: bet cannot be negative", player.name));
        }
        if player.wager > player.balance {
            errors.push(format!("{}: insufficient balance", player.name));
        }
        if player.wager > Cents::ZERO && player.choice.is_skip() {
            errors.push(format!("{}: must select an outcome", player.name));
        }
    }

    if !errors.is_empty() {
        metrics::counter!("bets_rejected_total").increment(errors.len() as u64);
        tracing::info!(error_count = errors.len(), "Bet validation failed");
    }

    BetValidation {
        valid: errors.is_empty(),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BetChoice;
    use shared::PlayerId;

    fn player(name: &str, balance: i64, wager: i64, choice: BetChoice) -> Player {
        Player {
            id: PlayerId::new(),
            name: name.to_string(),
            balance: Cents::new(balance),
            wager: Cents::new(wager),
            choice,
        }
    }

    #[test]
    fn test_negative_wager_rejected() {
        let result = validate_bets(&[player("Alice", 10_000, -100, BetChoice::Team1)]);
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.contains("negative")));
    }

    #[test]
    fn test_over_balance_rejected() {
        let result = validate_bets(&[player("Alice", 5_000, 5_100, BetChoice::Team1)]);
        assert!(!result.valid);
        assert!(result
            .errors
            .iter()
            .any(|e| e.contains("insufficient balance")));
    }

    #[test]
    fn test_wager_without_choice_rejected() {
        let result = validate_bets(&[player("Alice", 5_000, 100, BetChoice::Skip)]);
        assert_eq!(result.errors, vec!["Alice: must select an outcome".to_string()]);
    }

    #[test]
    fn test_errors_accumulate_across_players() {
        let result = validate_bets(&[
            player("Alice", 5_000, 6_000, BetChoice::Skip),
            player("Bob", 5_000, 1_000, BetChoice::Draw),
            player("Carol", 5_000, -1, BetChoice::Team2),
        ]);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 3);
        assert!(result.errors[0].starts_with("Alice"));
        assert!(result.errors[1].starts_with("Alice"));
        assert!(result.errors[2].starts_with("Carol"));
    }

    #[test]
    fn test_valid_batch_and_skips_pass() {
        let result = validate_bets(&[
            player("Alice", 5_000, 5_000, BetChoice::Team1),
            player("Bob", 5_000, 0, BetChoice::Skip),
            player("Carol", 5_000, 0, BetChoice::Draw),
        ]);
        assert!(result.valid);
        assert!(result.errors.is_empty());
        assert!(result.into_result().is_ok());
    }

    #[test]
    fn test_into_result_carries_messages() {
        let result = validate_bets(&[player("Bob", 100, 200, BetChoice::Team2)]);
        match result.into_result() {
            Err(EngineError::ValidationFailure(errors)) => {
                assert_eq!(errors, vec!["Bob: insufficient balance".to_string()])
            }
            other => panic!("expected validation failure, got {:?}", other),
        }
    }
}
