//! Scorelines and narrative shape checks
//!
//! The scoreline is decided locally from the drawn result so that any
//! narrative, generated or scripted, has to land on the same final score.

use rand::Rng;
use shared::{MAX_GOALS_PER_TEAM, SCORELINE_MEAN_GOALS, SCORELINE_STD_DEV};

use crate::domain::{NarrativeAction, Outcome, Score};

/// Minimum highlights requested from a generator for low-scoring games
pub const MIN_HIGHLIGHTS: usize = 6;

/// Goals for one team from a rounded, clamped normal distribution
fn sample_goals<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    // Box-Muller; 1 - gen() keeps u1 in (0, 1] so ln never sees zero
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    let goals = (SCORELINE_MEAN_GOALS + SCORELINE_STD_DEV * z).round();
    goals.clamp(0.0, MAX_GOALS_PER_TEAM as f64) as u8
}

/// A realistic final score that agrees with `result` (1-0 / 0-1 most likely)
pub fn generate_scoreline<R: Rng + ?Sized>(result: Outcome, rng: &mut R) -> Score {
    match result {
        Outcome::Draw => {
            let goals = sample_goals(rng);
            Score::new(goals, goals)
        }
        Outcome::Team1 => {
            let (winner, loser) = winning_pair(rng);
            Score::new(winner, loser)
        }
        Outcome::Team2 => {
            let (winner, loser) = winning_pair(rng);
            Score::new(loser, winner)
        }
    }
}

fn winning_pair<R: Rng + ?Sized>(rng: &mut R) -> (u8, u8) {
    // loser first to bias toward narrow wins
    let loser = sample_goals(rng).min(MAX_GOALS_PER_TEAM - 1);
    let mut winner = sample_goals(rng);
    if winner <= loser {
        winner = loser + 1;
    }
    (winner.min(MAX_GOALS_PER_TEAM), loser)
}

/// How many highlights to ask a generator for
pub fn highlight_count(final_score: Score) -> usize {
    (final_score.total_goals() as usize * 2).max(MIN_HIGHLIGHTS)
}

/// Why a narrative was refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NarrativeError {
    #[error("narrative is empty")]
    Empty,

    #[error("highlight {index} has no text")]
    BlankText { index: usize },

    #[error("score goes backwards at highlight {index}: {previous} -> {current}")]
    ScoreRegressed {
        index: usize,
        previous: Score,
        current: Score,
    },

    #[error("narrative ends {actual}, expected {expected}")]
    WrongFinalScore { expected: Score, actual: Score },
}

/// Accept a narrative only if it is non-empty, its running score never
/// decreases, and it ends exactly on `final_score`.
pub fn validate_narrative(
    actions: &[NarrativeAction],
    final_score: Score,
) -> Result<(), NarrativeError> {
    let last = actions.last().ok_or(NarrativeError::Empty)?;

    let mut previous = Score::default();
    for (index, action) in actions.iter().enumerate() {
        if action.text.trim().is_empty() {
            return Err(NarrativeError::BlankText { index });
        }
        let current = action.score;
        if current.team1 < previous.team1 || current.team2 < previous.team2 {
            return Err(NarrativeError::ScoreRegressed {
                index,
                previous,
                current,
            });
        }
        previous = current;
    }

    if last.score != final_score {
        return Err(NarrativeError::WrongFinalScore {
            expected: final_score,
            actual: last.score,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn action(text: &str, team1: u8, team2: u8) -> NarrativeAction {
        NarrativeAction {
            text: text.to_string(),
            suspense: false,
            score: Score::new(team1, team2),
        }
    }

    #[test]
    fn test_scoreline_agrees_with_result() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..2_000 {
            for result in Outcome::ALL {
                let score = generate_scoreline(result, &mut rng);
                assert!(result.matches_score(score), "{} vs {}", result, score);
                assert!(score.team1 <= MAX_GOALS_PER_TEAM);
                assert!(score.team2 <= MAX_GOALS_PER_TEAM);
            }
        }
    }

    #[test]
    fn test_narrow_wins_are_common() {
        let mut rng = StdRng::seed_from_u64(3);
        let narrow = (0..1_000)
            .map(|_| generate_scoreline(Outcome::Team1, &mut rng))
            .filter(|s| s.team1 - s.team2 == 1)
            .count();
        assert!(narrow > 400, "only {} narrow wins", narrow);
    }

    #[test]
    fn test_highlight_count() {
        assert_eq!(highlight_count(Score::new(1, 0)), MIN_HIGHLIGHTS);
        assert_eq!(highlight_count(Score::new(3, 2)), 10);
    }

    #[test]
    fn test_validate_accepts_consistent_narrative() {
        let actions = vec![
            action("Kickoff", 0, 0),
            action("Goal!", 1, 0),
            action("Full time", 1, 0),
        ];
        assert!(validate_narrative(&actions, Score::new(1, 0)).is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_shapes() {
        assert_eq!(
            validate_narrative(&[], Score::new(0, 0)),
            Err(NarrativeError::Empty)
        );
        assert!(matches!(
            validate_narrative(&[action(" ", 0, 0)], Score::new(0, 0)),
            Err(NarrativeError::BlankText { index: 0 })
        ));
        assert!(matches!(
            validate_narrative(
                &[action("Goal", 1, 0), action("VAR overturns", 0, 0)],
                Score::new(0, 0)
            ),
            Err(NarrativeError::ScoreRegressed { index: 1, .. })
        ));
        assert!(matches!(
            validate_narrative(&[action("Full time", 2, 0)], Score::new(1, 0)),
            Err(NarrativeError::WrongFinalScore { .. })
        ));
    }
}
