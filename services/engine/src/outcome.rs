//! Weighted three-way draw of a match result

use rand::Rng;

use crate::domain::{Odds, Outcome};
use crate::errors::{EngineError, Result};

/// Draw a result with cumulative-probability banding.
///
/// `r` is uniform in `[0, sum)`, which is the same as renormalizing every
/// probability by the sum and drawing in `[0, 1)`. An overround therefore
/// scales all bands evenly instead of squeezing the last one, and the final
/// branch is unconditional so no draw is ever left without an outcome.
pub fn draw_result<R: Rng + ?Sized>(odds: &Odds, rng: &mut R) -> Result<Outcome> {
    if !odds.is_drawable() {
        return Err(EngineError::invariant(format!(
            "cannot draw from odds {:?}",
            odds
        )));
    }

    let r = rng.gen::<f64>() * odds.sum();
    let outcome = band(odds, r);

    tracing::debug!(r, sum = odds.sum(), %outcome, "Match result drawn");
    Ok(outcome)
}

fn band(odds: &Odds, r: f64) -> Outcome {
    if r < odds.team1_win {
        Outcome::Team1
    } else if r < odds.team1_win + odds.draw {
        Outcome::Draw
    } else {
        Outcome::Team2
    }
}
