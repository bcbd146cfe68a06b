//! Round controller
//!
//! Owns the ledger, the current match and the phase. Every operation checks
//! the phase first, so a round can only be settled once and players can only
//! be added or removed before the first match.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use shared::{Cents, PlayerId, DEFAULT_ROUND_BONUS_CENTS};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::{BetChoice, GeneratedMatch, Match, NarrativeAction, Outcome, Player, SettlementResult};
use crate::errors::{EngineError, Result};
use crate::generator::ResilientGenerator;
use crate::ledger::{self, Ledger};
use crate::narrative::generate_scoreline;
use crate::odds::odds_board;
use crate::outcome::draw_result;
use crate::phase::GamePhase;
use crate::settlement::{apply_settlement, settle_round, RoundSummary};
use crate::validation::validate_bets;

#[derive(Debug, Clone, Copy)]
pub struct GameSettings {
    pub round_bonus: Cents,
    /// Fetch the next match while the current one is being narrated
    pub prefetch: bool,
    /// Seed for the result draw and scorelines; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            round_bonus: Cents::new(DEFAULT_ROUND_BONUS_CENTS),
            prefetch: true,
            seed: None,
        }
    }
}

/// Everything the results screen shows for one settled round
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundReport {
    pub round: u32,
    pub game_match: Match,
    pub results: Vec<SettlementResult>,
    pub summary: RoundSummary,
    pub round_bonus: Cents,
    pub settled_at: DateTime<Utc>,
}

pub struct Game {
    ledger: Ledger,
    phase: GamePhase,
    round: u32,
    round_bonus: Cents,
    current_match: Option<Match>,
    next_match: Option<JoinHandle<GeneratedMatch>>,
    generator: Arc<ResilientGenerator>,
    rng: StdRng,
    prefetch: bool,
    last_report: Option<RoundReport>,
}

impl Game {
    pub fn new(generator: Arc<ResilientGenerator>, settings: GameSettings) -> Result<Self> {
        if settings.round_bonus.is_negative() {
            return Err(EngineError::InvalidInput(format!(
                "round bonus cannot be negative: {}",
                settings.round_bonus
            )));
        }
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            ledger: Ledger::new(),
            phase: GamePhase::Setup,
            round: 0,
            round_bonus: settings.round_bonus,
            current_match: None,
            next_match: None,
            generator,
            rng,
            prefetch: settings.prefetch,
            last_report: None,
        })
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn round_bonus(&self) -> Cents {
        self.round_bonus
    }

    pub fn players(&self) -> &[Player] {
        self.ledger.players()
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.ledger.get(id)
    }

    pub fn current_match(&self) -> Option<&Match> {
        self.current_match.as_ref()
    }

    pub fn last_report(&self) -> Option<&RoundReport> {
        self.last_report.as_ref()
    }

    pub fn add_player(&mut self, name: &str, starting_balance: Cents) -> Result<PlayerId> {
        self.phase.require(GamePhase::Setup, "add players")?;
        let player = ledger::create_player(name, starting_balance)?;
        let id = player.id;
        info!(player_id = %id, name = %player.name, balance = starting_balance.as_i64(), "Player added");
        self.ledger.add(player);
        Ok(id)
    }

    pub fn remove_player(&mut self, id: PlayerId) -> Result<Player> {
        self.phase.require(GamePhase::Setup, "remove players")?;
        let removed = self.ledger.remove(id)?;
        info!(player_id = %id, "Player removed");
        Ok(removed)
    }

    pub fn set_round_bonus(&mut self, round_bonus: Cents) -> Result<()> {
        self.phase.require(GamePhase::Setup, "change the round bonus")?;
        if round_bonus.is_negative() {
            return Err(EngineError::InvalidInput(format!(
                "round bonus cannot be negative: {}",
                round_bonus
            )));
        }
        self.round_bonus = round_bonus;
        Ok(())
    }

    /// Setup → Betting with the first match
    pub async fn start(&mut self) -> Result<()> {
        self.phase.require(GamePhase::Setup, "start the game")?;
        let next = self.phase.transition(GamePhase::Betting)?;
        if self.ledger.is_empty() {
            return Err(EngineError::InvalidInput(
                "at least one player is required to start".to_string(),
            ));
        }

        let game_match = Match::from(self.take_next_match().await);
        self.round = 1;
        self.enter_betting(next, game_match);
        Ok(())
    }

    pub fn set_wager(&mut self, id: PlayerId, amount: f64) -> Result<Player> {
        self.phase.require(GamePhase::Betting, "change wagers")?;
        self.ledger.update(id, |p| ledger::set_wager(p, amount))
    }

    pub fn all_in(&mut self, id: PlayerId) -> Result<Player> {
        self.phase.require(GamePhase::Betting, "change wagers")?;
        self.ledger.update(id, ledger::all_in)
    }

    pub fn set_choice(&mut self, id: PlayerId, choice: BetChoice) -> Result<Player> {
        self.phase.require(GamePhase::Betting, "change choices")?;
        self.ledger.update(id, |p| ledger::set_choice(p, choice))
    }

    /// Betting → Resolving once every bet passes validation
    pub fn lock_bets(&mut self) -> Result<()> {
        let next = self.phase.transition(GamePhase::Resolving)?;
        validate_bets(self.ledger.players()).into_result()?;

        self.phase = next;
        info!(round = self.round, phase = %self.phase, "Bets locked");
        Ok(())
    }

    /// Draw the result and the scoreline behind it; at most once per round
    pub fn draw_outcome(&mut self) -> Result<Outcome> {
        self.phase.require(GamePhase::Resolving, "draw the outcome")?;
        let game_match = self
            .current_match
            .as_mut()
            .ok_or_else(|| EngineError::invariant("resolving without a match"))?;
        if game_match.result.is_some() {
            return Err(EngineError::InvalidInput(
                "outcome already drawn for this round".to_string(),
            ));
        }

        let outcome = draw_result(&game_match.odds, &mut self.rng)?;
        game_match.record_result(outcome)?;
        let final_score = generate_scoreline(outcome, &mut self.rng);
        game_match.final_score = Some(final_score);

        info!(
            round = self.round,
            outcome = %outcome,
            final_score = %final_score,
            "Outcome drawn"
        );

        self.spawn_prefetch();
        Ok(outcome)
    }

    /// Fetch the highlights for the drawn result and attach them to the match
    pub async fn narrate(&mut self) -> Result<&[NarrativeAction]> {
        self.phase.require(GamePhase::Resolving, "narrate the match")?;
        let (team1, team2, result, final_score) = {
            let game_match = self
                .current_match
                .as_ref()
                .ok_or_else(|| EngineError::invariant("resolving without a match"))?;
            match (game_match.result, game_match.final_score) {
                (Some(result), Some(score)) => (
                    game_match.team1.clone(),
                    game_match.team2.clone(),
                    result,
                    score,
                ),
                _ => {
                    return Err(EngineError::InvalidInput(
                        "outcome must be drawn before narration".to_string(),
                    ))
                }
            }
        };

        let actions = self
            .generator
            .narrative(&team1, &team2, result, final_score)
            .await;

        let game_match = self
            .current_match
            .as_mut()
            .ok_or_else(|| EngineError::invariant("match vanished during narration"))?;
        game_match.actions = actions;
        Ok(game_match.actions.as_slice())
    }

    /// Resolving → Settled. Applies payouts and the round bonus exactly once.
    pub fn settle(&mut self) -> Result<&RoundReport> {
        self.phase.require(GamePhase::Resolving, "settle the round")?;
        let game_match = self
            .current_match
            .as_ref()
            .ok_or_else(|| EngineError::invariant("resolving without a match"))?;
        if game_match.result.is_none() {
            return Err(EngineError::IllegalTransition {
                from: self.phase,
                to: GamePhase::Settled,
            });
        }
        let next = self.phase.transition(GamePhase::Settled)?;

        let results = settle_round(self.ledger.players(), game_match, self.round_bonus)?;
        let updated = apply_settlement(self.ledger.players(), &results, self.round_bonus)?;
        self.ledger.replace_all(updated)?;

        let summary = RoundSummary::from_results(&results)?;
        metrics::counter!("rounds_settled_total").increment(1);
        metrics::histogram!("settlement_house_net_cents").record(summary.house_net.as_i64() as f64);
        info!(
            round = self.round,
            players = results.len(),
            total_wagered = summary.total_wagered.as_i64(),
            house_net = summary.house_net.as_i64(),
            "Round settled"
        );

        self.phase = next;
        let report = RoundReport {
            round: self.round,
            game_match: game_match.clone(),
            results,
            summary,
            round_bonus: self.round_bonus,
            settled_at: Utc::now(),
        };
        Ok(self.last_report.insert(report))
    }

    /// Draw, narrate and settle in one go
    pub async fn resolve(&mut self) -> Result<RoundReport> {
        self.draw_outcome()?;
        self.narrate().await?;
        self.settle().cloned()
    }

    /// Settled → Betting with fresh bets and the next match
    pub async fn next_round(&mut self) -> Result<()> {
        self.phase.require(GamePhase::Settled, "start the next round")?;
        let next = self.phase.transition(GamePhase::Betting)?;
        let game_match = Match::from(self.take_next_match().await);

        self.ledger.update_all(ledger::reset_for_new_round);
        self.round += 1;
        self.enter_betting(next, game_match);
        Ok(())
    }

    fn enter_betting(&mut self, next: GamePhase, game_match: Match) {
        let [(team1_decimal, team1_pct), (draw_decimal, draw_pct), (team2_decimal, team2_pct)] =
            odds_board(&game_match.odds);
        info!(
            round = self.round,
            team1 = %game_match.team1,
            team2 = %game_match.team2,
            team1_decimal,
            team1_pct,
            draw_decimal,
            draw_pct,
            team2_decimal,
            team2_pct,
            odds_sum = game_match.odds.sum(),
            "Betting open"
        );
        self.current_match = Some(game_match);
        self.phase = next;
    }

    fn spawn_prefetch(&mut self) {
        if !self.prefetch || self.next_match.is_some() {
            return;
        }
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                debug!(round = self.round, "No runtime for prefetch, next match fetched on demand");
                return;
            }
        };
        let generator = Arc::clone(&self.generator);
        self.next_match = Some(runtime.spawn(async move { generator.next_match().await }));
    }

    async fn take_next_match(&mut self) -> GeneratedMatch {
        if let Some(handle) = self.next_match.take() {
            match handle.await {
                Ok(generated) => return generated,
                Err(e) => warn!(error = %e, "Prefetch task failed, fetching now"),
            }
        }
        self.generator.next_match().await
    }
}

impl Drop for Game {
    fn drop(&mut self) {
        if let Some(handle) = self.next_match.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OddsBounds;
    use crate::generator::FallbackGenerator;

    fn offline_game() -> Game {
        let generator = Arc::new(ResilientGenerator::offline(
            FallbackGenerator::new(Some(21)),
            OddsBounds::default(),
        ));
        Game::new(
            generator,
            GameSettings {
                seed: Some(21),
                ..GameSettings::default()
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_start_requires_players() {
        let mut game = offline_game();
        assert!(matches!(
            game.start().await,
            Err(EngineError::InvalidInput(_))
        ));
        assert_eq!(game.phase(), GamePhase::Setup);
    }

    #[tokio::test]
    async fn test_roster_frozen_after_start() {
        let mut game = offline_game();
        let id = game.add_player("Alice", Cents::new(10_000)).unwrap();
        game.start().await.unwrap();

        assert!(matches!(
            game.add_player("Bob", Cents::new(10_000)),
            Err(EngineError::WrongPhase { .. })
        ));
        assert!(matches!(
            game.remove_player(id),
            Err(EngineError::WrongPhase { .. })
        ));
        assert!(game.set_round_bonus(Cents::new(100)).is_err());
    }

    #[tokio::test]
    async fn test_invalid_bets_keep_betting_open() {
        let mut game = offline_game();
        let id = game.add_player("Alice", Cents::new(10_000)).unwrap();
        game.start().await.unwrap();
        game.set_wager(id, 20.0).unwrap();

        let err = game.lock_bets().unwrap_err();
        assert_eq!(err.to_string(), "Bets rejected: Alice: must select an outcome");
        assert_eq!(game.phase(), GamePhase::Betting);
    }

    #[tokio::test]
    async fn test_settle_before_draw_refused() {
        let mut game = offline_game();
        game.add_player("Alice", Cents::new(10_000)).unwrap();
        game.start().await.unwrap();
        game.lock_bets().unwrap();

        assert!(matches!(
            game.settle(),
            Err(EngineError::IllegalTransition { .. })
        ));
        assert!(game.narrate().await.is_err());
    }

    #[tokio::test]
    async fn test_draw_only_once() {
        let mut game = offline_game();
        game.add_player("Alice", Cents::new(10_000)).unwrap();
        game.start().await.unwrap();
        game.lock_bets().unwrap();
        let outcome = game.draw_outcome().unwrap();

        assert!(game.draw_outcome().is_err());
        assert_eq!(game.current_match().unwrap().result, Some(outcome));
    }

    #[tokio::test]
    async fn test_negative_bonus_rejected() {
        let mut game = offline_game();
        assert!(matches!(
            game.set_round_bonus(Cents::new(-1)),
            Err(EngineError::InvalidInput(_))
        ));
        game.set_round_bonus(Cents::ZERO).unwrap();
        assert_eq!(game.round_bonus(), Cents::ZERO);
    }

    #[test]
    fn test_negative_bonus_refused_at_construction() {
        let generator = Arc::new(ResilientGenerator::offline(
            FallbackGenerator::new(Some(3)),
            OddsBounds::default(),
        ));
        let settings = GameSettings {
            round_bonus: Cents::new(-500),
            ..GameSettings::default()
        };
        assert!(matches!(
            Game::new(generator, settings),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_draw_outside_runtime_skips_prefetch() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut game = offline_game();
        game.add_player("Alice", Cents::new(10_000)).unwrap();
        runtime.block_on(game.start()).unwrap();
        game.lock_bets().unwrap();

        let outcome = game.draw_outcome().unwrap();
        assert!(game.next_match.is_none());
        assert_eq!(game.current_match().unwrap().result, Some(outcome));

        runtime.block_on(game.narrate()).unwrap();
        game.settle().unwrap();
        runtime.block_on(game.next_round()).unwrap();
        assert_eq!(game.round(), 2);
        assert_eq!(game.phase(), GamePhase::Betting);
    }
}
