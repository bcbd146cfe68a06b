/// Shared fixtures for engine integration tests
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use engine::domain::{GeneratedMatch, NarrativeAction, Score};
use engine::generator::fallback::scripted_narrative;
use engine::generator::{FallbackGenerator, MatchGenerator, ResilientGenerator};
use engine::{Game, GameSettings, Odds, OddsBounds, Outcome};

pub const HOME: &str = "Scripted Town";
pub const AWAY: &str = "Test Athletic";

/// Always offers the same fixture with fixed odds
pub struct ScriptedGenerator {
    pub odds: Odds,
    pub match_calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new(odds: Odds) -> Self {
        Self {
            odds,
            match_calls: AtomicUsize::new(0),
        }
    }

    pub fn match_calls(&self) -> usize {
        self.match_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MatchGenerator for ScriptedGenerator {
    async fn generate_match(&self) -> anyhow::Result<GeneratedMatch> {
        self.match_calls.fetch_add(1, Ordering::SeqCst);
        Ok(GeneratedMatch {
            team1: HOME.to_string(),
            team2: AWAY.to_string(),
            odds: self.odds,
        })
    }

    async fn generate_narrative(
        &self,
        team1: &str,
        team2: &str,
        result: Outcome,
        final_score: Score,
    ) -> anyhow::Result<Vec<NarrativeAction>> {
        Ok(scripted_narrative(team1, team2, result, final_score))
    }
}

/// Game in setup wired to a scripted provider with the given odds
pub fn scripted_game(odds: Odds, seed: u64) -> (Game, Arc<ScriptedGenerator>) {
    let scripted = Arc::new(ScriptedGenerator::new(odds));
    let primary: Arc<dyn MatchGenerator> = scripted.clone();
    let generator = Arc::new(ResilientGenerator::new(
        Some(primary),
        FallbackGenerator::new(Some(seed)),
        OddsBounds::default(),
    ));
    let game = Game::new(
        generator,
        GameSettings {
            seed: Some(seed),
            ..GameSettings::default()
        },
    )
    .unwrap();
    (game, scripted)
}
