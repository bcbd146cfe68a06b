//! Round settlement: price every bet against the drawn result, then credit
//! payouts plus the flat round bonus.
//!
//! These functions hold no state and do not guard against being run twice
//! for the same result; `Game` only calls them once per round.

use serde::{Deserialize, Serialize};
use shared::Cents;

use crate::domain::{Match, Player, SettlementResult};
use crate::errors::{EngineError, Result};
use crate::odds::payout;

/// Compute one settlement record per player, in ledger order.
pub fn settle_round(
    players: &[Player],
    game_match: &Match,
    round_bonus: Cents,
) -> Result<Vec<SettlementResult>> {
    let result = game_match.result.ok_or_else(|| {
        EngineError::invariant(format!(
            "settlement requested before {} vs {} was decided",
            game_match.team1, game_match.team2
        ))
    })?;
    if !game_match.odds.is_drawable() {
        return Err(EngineError::invariant(format!(
            "settlement requested with invalid odds {:?}",
            game_match.odds
        )));
    }
    if round_bonus.is_negative() {
        return Err(EngineError::invariant(format!(
            "round bonus cannot be negative: {}",
            round_bonus
        )));
    }

    players
        .iter()
        .map(|player| {
            check_locked_bet(player)?;

            let net = payout(player.wager, player.choice, result, &game_match.odds)?;
            let new_balance = player.balance.checked_add(net)?.checked_add(round_bonus)?;

            tracing::debug!(
                player_id = %player.id,
                wager = player.wager.as_i64(),
                choice = %player.choice,
                payout = net.as_i64(),
                new_balance = new_balance.as_i64(),
                "Bet settled"
            );

            Ok(SettlementResult {
                player_id: player.id,
                player_name: player.name.clone(),
                wager: player.wager,
                choice: player.choice,
                payout: net,
                new_balance,
            })
        })
        .collect()
}

/// Credit each player's payout and the round bonus.
///
/// Returns a fresh collection; every player must have exactly the record
/// `settle_round` produced for them.
pub fn apply_settlement(
    players: &[Player],
    results: &[SettlementResult],
    round_bonus: Cents,
) -> Result<Vec<Player>> {
    if results.len() != players.len() {
        return Err(EngineError::invariant(format!(
            "{} settlement records for {} players",
            results.len(),
            players.len()
        )));
    }

    players
        .iter()
        .map(|player| {
            let record = results
                .iter()
                .find(|r| r.player_id == player.id)
                .ok_or_else(|| {
                    EngineError::invariant(format!("no settlement record for {}", player.id))
                })?;

            let balance = player
                .balance
                .checked_add(record.payout)?
                .checked_add(round_bonus)?;
            if balance != record.new_balance || record.wager != player.wager {
                return Err(EngineError::invariant(format!(
                    "settlement record for {} does not match the ledger",
                    player.id
                )));
            }

            Ok(Player {
                balance,
                ..player.clone()
            })
        })
        .collect()
}

/// Round totals for the results screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub total_wagered: Cents,
    /// Sum of all net payouts (players' view)
    pub total_payout: Cents,
    /// What the house kept: the negation of `total_payout`
    pub house_net: Cents,
    pub winners: usize,
    pub losers: usize,
    pub skipped: usize,
}

impl RoundSummary {
    pub fn from_results(results: &[SettlementResult]) -> Result<Self> {
        let mut summary = RoundSummary::default();
        for r in results {
            summary.total_wagered = summary.total_wagered.checked_add(r.wager)?;
            summary.total_payout = summary.total_payout.checked_add(r.payout)?;
            if r.choice.is_skip() || r.wager.is_zero() {
                summary.skipped += 1;
            } else if r.payout.is_negative() {
                summary.losers += 1;
            } else {
                summary.winners += 1;
            }
        }
        summary.house_net = summary.total_payout.checked_neg()?;
        Ok(summary)
    }
}

fn check_locked_bet(player: &Player) -> Result<()> {
    if player.wager.is_negative() {
        return Err(EngineError::invariant(format!(
            "{} settled with negative wager {}",
            player.id, player.wager
        )));
    }
    if player.wager > player.balance {
        return Err(EngineError::invariant(format!(
            "{} settled with wager {} above balance {}",
            player.id, player.wager, player.balance
        )));
    }
    if player.wager > Cents::ZERO && player.choice.is_skip() {
        return Err(EngineError::invariant(format!(
            "{} settled with wager {} but no outcome",
            player.id, player.wager
        )));
    }
    Ok(())
}
