//! Local generator used when no external provider is configured or the
//! provider fails. Deterministic for a given seed.

use anyhow::Result;
use async_trait::async_trait;
use rand::{rngs::StdRng, Rng, SeedableRng};
use shared::{FALLBACK_DRAW_MIN, FALLBACK_DRAW_SPAN, FALLBACK_TEAM1_MIN, FALLBACK_TEAM1_SPAN};
use tokio::sync::Mutex;

use super::MatchGenerator;
use crate::domain::{GeneratedMatch, NarrativeAction, Odds, Outcome, Score};

const FIXTURES: [(&str, &str); 10] = [
    ("Manchester United", "Liverpool"),
    ("Real Madrid", "Barcelona"),
    ("Bayern Munich", "Borussia Dortmund"),
    ("AC Milan", "Inter Milan"),
    ("Arsenal", "Chelsea"),
    ("PSG", "Lyon"),
    ("Ajax", "PSV"),
    ("Celtic", "Rangers"),
    ("The Thunderbolts", "The Lightning Strikers"),
    ("Dragon FC", "Phoenix United"),
];

pub struct FallbackGenerator {
    rng: Mutex<StdRng>,
}

impl FallbackGenerator {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }

    /// Pick a fixture and odds that sum to 1.00 (give or take rounding)
    pub async fn synthesize_match(&self) -> GeneratedMatch {
        let mut rng = self.rng.lock().await;
        let (team1, team2) = FIXTURES[rng.gen_range(0..FIXTURES.len())];

        let team1_win = FALLBACK_TEAM1_MIN + rng.gen::<f64>() * FALLBACK_TEAM1_SPAN;
        let draw = FALLBACK_DRAW_MIN + rng.gen::<f64>() * FALLBACK_DRAW_SPAN;
        let team2_win = 1.0 - team1_win - draw;

        GeneratedMatch {
            team1: team1.to_string(),
            team2: team2.to_string(),
            odds: Odds::new(round2(team1_win), round2(draw), round2(team2_win)),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Scripted highlights whose running score walks to `final_score`
pub fn scripted_narrative(
    team1: &str,
    team2: &str,
    result: Outcome,
    final_score: Score,
) -> Vec<NarrativeAction> {
    let mut actions = Vec::new();
    let mut score = Score::default();

    let opening = match result {
        Outcome::Team1 => format!("🏃 {} dominates possession in the opening minutes", team1),
        Outcome::Team2 => format!("🏃 {} starts aggressively, pressing high", team2),
        Outcome::Draw => "🏃 Both teams trading attacks in a fast-paced game".to_string(),
    };
    actions.push(action(format!("⚽ Kickoff! {} vs {} begins!", team1, team2), false, score));
    actions.push(action(opening, false, score));

    // alternate goals while both sides still have some to score
    let total = final_score.total_goals();
    let mut scored = 0u8;
    while score != final_score {
        let team1_left = final_score.team1 - score.team1;
        let team2_left = final_score.team2 - score.team2;
        let team1_scores = match (team1_left, team2_left) {
            (0, _) => false,
            (_, 0) => true,
            _ => scored % 2 == 0,
        };
        scored += 1;
        let is_last = scored == total;
        let text = if team1_scores {
            score.team1 += 1;
            goal_line(team1, team2, score.team1, score.team2)
        } else {
            score.team2 += 1;
            goal_line(team2, team1, score.team2, score.team1)
        };
        actions.push(action(text, is_last && total > 1, score));
        if !is_last {
            let pressing = if team1_scores { team2 } else { team1 };
            actions.push(action(
                format!("🛡️ {} pushes forward looking for a response", pressing),
                false,
                score,
            ));
        }
    }

    let closing = match result {
        Outcome::Team1 => format!("⏱️ Final whistle! {} wins!", team1),
        Outcome::Team2 => format!("⏱️ Game over! {} takes the victory!", team2),
        Outcome::Draw if total == 0 => {
            "⏱️ Final whistle! Neither side could break the deadlock!".to_string()
        }
        Outcome::Draw => "⏱️ Final whistle! It ends in a draw!".to_string(),
    };
    actions.push(action(closing, false, score));
    actions
}

fn goal_line(scorer: &str, other: &str, scorer_goals: u8, other_goals: u8) -> String {
    if scorer_goals == other_goals {
        format!("⚡ GOAL! {} equalizes!", scorer)
    } else if scorer_goals == 1 && other_goals == 0 {
        format!("⚡ GOAL! {} takes the lead!", scorer)
    } else {
        format!("🎯 GOAL! {} scores against {}!", scorer, other)
    }
}

fn action(text: String, suspense: bool, score: Score) -> NarrativeAction {
    NarrativeAction {
        text,
        suspense,
        score,
    }
}

#[async_trait]
impl MatchGenerator for FallbackGenerator {
    async fn generate_match(&self) -> Result<GeneratedMatch> {
        Ok(self.synthesize_match().await)
    }

    async fn generate_narrative(
        &self,
        team1: &str,
        team2: &str,
        result: Outcome,
        final_score: Score,
    ) -> Result<Vec<NarrativeAction>> {
        Ok(scripted_narrative(team1, team2, result, final_score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OddsBounds;
    use crate::narrative::validate_narrative;

    #[tokio::test]
    async fn test_synthesized_odds_stay_in_bounds() {
        let generator = FallbackGenerator::new(Some(5));
        let bounds = OddsBounds::default();
        for _ in 0..500 {
            let generated = generator.synthesize_match().await;
            assert!(generated.odds.within(&bounds), "{:?}", generated.odds);
            // the away side can round down to an unbacked 0.00
            assert!(generated.odds.team2_win >= 0.0);
            assert_ne!(generated.team1, generated.team2);
        }
    }

    #[test]
    fn test_same_seed_same_matches() {
        let a = FallbackGenerator::new(Some(9));
        let b = FallbackGenerator::new(Some(9));
        for _ in 0..10 {
            assert_eq!(
                tokio_test::block_on(a.synthesize_match()),
                tokio_test::block_on(b.synthesize_match())
            );
        }
    }

    #[test]
    fn test_scripted_narrative_lands_on_final_score() {
        let cases = [
            (Outcome::Team1, Score::new(1, 0)),
            (Outcome::Team1, Score::new(4, 3)),
            (Outcome::Team2, Score::new(0, 2)),
            (Outcome::Draw, Score::new(0, 0)),
            (Outcome::Draw, Score::new(3, 3)),
        ];
        for (result, final_score) in cases {
            let actions = scripted_narrative("Ajax", "PSV", result, final_score);
            assert!(validate_narrative(&actions, final_score).is_ok());
            assert!(actions.first().unwrap().text.contains("Kickoff"));
            assert!(actions.last().unwrap().text.contains("⏱️"));
        }
    }

    #[test]
    fn test_scripted_narrative_names_winner() {
        let actions = scripted_narrative("Celtic", "Rangers", Outcome::Team2, Score::new(1, 2));
        assert!(actions.last().unwrap().text.contains("Rangers"));
    }
}
