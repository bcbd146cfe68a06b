//! Odds and payout math
//!
//! Multipliers are fair odds (`1 / p`). Net payouts are computed on whole
//! cents: the gross return `wager / p` is rounded to the nearest cent once,
//! then the stake is subtracted, so repeated rounds never accumulate drift.

use shared::Cents;

use crate::domain::{BetChoice, Odds, Outcome};
use crate::errors::{EngineError, Result};

/// Payout factor for a probability; an unbacked (zero) outcome pays nothing
pub fn multiplier_from_probability(probability: f64) -> f64 {
    if probability == 0.0 {
        return 0.0;
    }
    1.0 / probability
}

/// Net win/loss for a single bet.
///
/// Balance moves by exactly this amount (the stake is not re-added separately).
/// A gross return that does not fit in whole cents is an invariant violation.
pub fn payout(wager: Cents, choice: BetChoice, result: Outcome, odds: &Odds) -> Result<Cents> {
    let Some(backed) = choice.outcome() else {
        return Ok(Cents::ZERO);
    };
    if wager.is_zero() {
        return Ok(Cents::ZERO);
    }
    if backed != result {
        return Ok(wager.checked_neg()?);
    }

    let multiplier = multiplier_from_probability(odds.probability(result));
    let gross = (wager.as_i64() as f64 * multiplier).round();
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
    if !gross.is_finite() || gross < i64::MIN as f64 || gross >= i64::MAX as f64 {
        return Err(EngineError::invariant(format!(
            "gross return for {} at probability {} does not fit in cents",
            wager,
            odds.probability(result)
        )));
    }
    let net = Cents::new(gross as i64).checked_sub(wager)?;

    tracing::trace!(
        wager = wager.as_i64(),
        %result,
        multiplier,
        net = net.as_i64(),
        "Winning bet priced"
    );

    Ok(net)
}

/// Decimal odds shown on the match card for one outcome
pub fn decimal_odds(odds: &Odds, outcome: Outcome) -> f64 {
    multiplier_from_probability(odds.probability(outcome))
}

/// Whole-percent chance shown next to the multiplier
pub fn implied_percentage(odds: &Odds, outcome: Outcome) -> u32 {
    (odds.probability(outcome) * 100.0).round().max(0.0) as u32
}

/// Decimal odds and implied percentage per outcome, in `Outcome::ALL` order
pub fn odds_board(odds: &Odds) -> [(f64, u32); 3] {
    Outcome::ALL.map(|outcome| (decimal_odds(odds, outcome), implied_percentage(odds, outcome)))
}
