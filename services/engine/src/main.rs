use anyhow::Result;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use engine::config::Config;
use engine::generator::{FallbackGenerator, HttpMatchGenerator, MatchGenerator, ResilientGenerator};
use engine::{BetChoice, Game, Outcome, RoundReport};

/// Chance a bot sits a round out
const SKIP_PROBABILITY: f64 = 0.15;
/// Chance a bot stakes everything
const ALL_IN_PROBABILITY: f64 = 0.05;
/// Largest share of balance a bot stakes otherwise
const MAX_STAKE_SHARE: f64 = 0.5;
/// Lock-in attempts before the run is abandoned
const MAX_LOCK_ATTEMPTS: u32 = 3;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured logging with JSON formatting (configurable via env)
    let use_json = std::env::var("LOG_FORMAT")
        .unwrap_or_else(|_| "json".to_string())
        .eq_ignore_ascii_case("json");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "engine=info,round_runner=info".into());

    if use_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!(
        service = "round-runner",
        version = env!("CARGO_PKG_VERSION"),
        log_format = if use_json { "json" } else { "text" },
        "Starting round runner"
    );

    let config = Config::load()?;
    tracing::info!(
        rounds = config.runner.rounds,
        players = config.runner.players.len(),
        round_bonus = %config.game.round_bonus,
        external_generator = config.generator.api_url.is_some(),
        "Configuration loaded"
    );

    let generator = Arc::new(build_generator(&config)?);
    let mut game = Game::new(generator, config.game_settings())?;
    for name in &config.runner.players {
        game.add_player(name, config.game.starting_balance)?;
    }

    let mut bots = match config.game.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
        None => StdRng::from_entropy(),
    };

    tokio::select! {
        result = run_rounds(&mut game, &mut bots, config.runner.rounds) => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    for player in game.players() {
        info!(player_id = %player.id, name = %player.name, balance = %player.balance, "Final balance");
    }
    tracing::info!(rounds_played = game.round(), "Round runner stopped");

    Ok(())
}

fn build_generator(config: &Config) -> Result<ResilientGenerator> {
    let fallback = FallbackGenerator::new(config.game.rng_seed);
    let primary: Option<Arc<dyn MatchGenerator>> =
        match (&config.generator.api_url, &config.generator.api_key) {
            (Some(url), Some(key)) => {
                let http = HttpMatchGenerator::new(
                    url.clone(),
                    key.clone(),
                    config.generator.model.clone(),
                    Duration::from_secs(config.generator.timeout_seconds),
                )?;
                Some(Arc::new(http) as Arc<dyn MatchGenerator>)
            }
            (Some(_), None) => {
                warn!("GENERATOR_API_URL set without GENERATOR_API_KEY, using local matches");
                None
            }
            _ => None,
        };
    Ok(ResilientGenerator::new(
        primary,
        fallback,
        config.game.odds_bounds,
    ))
}

async fn run_rounds(game: &mut Game, bots: &mut StdRng, rounds: u32) -> Result<()> {
    for round in 1..=rounds {
        if round == 1 {
            game.start().await?;
        } else {
            game.next_round().await?;
        }

        lock_in(game, |game| place_bot_bets(game, bots))?;
        let report = game.resolve().await?;
        log_report(&report);
    }
    Ok(())
}

/// Place bets and lock them, placing again while the rejection is one players can fix
fn lock_in<F>(game: &mut Game, mut place_bets: F) -> Result<()>
where
    F: FnMut(&mut Game) -> Result<()>,
{
    let mut attempt = 1;
    loop {
        place_bets(game)?;
        let error = match game.lock_bets() {
            Ok(()) => return Ok(()),
            Err(e) => e.report(),
        };
        if !error.category.is_user_facing() || attempt >= MAX_LOCK_ATTEMPTS {
            return Err(error.into());
        }
        warn!(round = game.round(), attempt, "Bets rejected, placing again");
        attempt += 1;
    }
}

fn place_bot_bets(game: &mut Game, bots: &mut StdRng) -> Result<()> {
    let ids: Vec<_> = game.players().iter().map(|p| p.id).collect();
    for id in ids {
        if bots.gen_bool(SKIP_PROBABILITY) {
            continue;
        }
        let choice = BetChoice::from(Outcome::ALL[bots.gen_range(0..Outcome::ALL.len())]);
        game.set_choice(id, choice)?;

        let player = if bots.gen_bool(ALL_IN_PROBABILITY) {
            game.all_in(id)?
        } else {
            let balance = game
                .player(id)
                .map(|p| p.balance.to_dollars())
                .unwrap_or_default();
            game.set_wager(id, balance * bots.gen_range(0.0..MAX_STAKE_SHARE))?
        };
        info!(
            player_id = %player.id,
            name = %player.name,
            choice = %player.choice,
            wager = %player.wager,
            "Bet placed"
        );
    }
    Ok(())
}

fn log_report(report: &RoundReport) {
    let game_match = &report.game_match;
    for action in &game_match.actions {
        info!(round = report.round, score = %action.score, suspense = action.suspense, "{}", action.text);
    }
    for record in &report.results {
        info!(
            round = report.round,
            name = %record.player_name,
            backed = game_match.label(record.choice),
            wager = %record.wager,
            payout = %record.payout,
            new_balance = %record.new_balance,
            "Settlement"
        );
    }
    info!(
        round = report.round,
        team1 = %game_match.team1,
        team2 = %game_match.team2,
        result = ?game_match.result,
        final_score = ?game_match.final_score,
        house_net = %report.summary.house_net,
        "Round complete"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::{GamePhase, GameSettings, OddsBounds};
    use shared::Cents;

    fn offline_game() -> Game {
        let generator = Arc::new(ResilientGenerator::offline(
            FallbackGenerator::new(Some(5)),
            OddsBounds::default(),
        ));
        Game::new(
            generator,
            GameSettings {
                seed: Some(5),
                ..GameSettings::default()
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_rejected_bets_placed_again() {
        let mut game = offline_game();
        let id = game.add_player("Alice", Cents::new(10_000)).unwrap();
        game.start().await.unwrap();

        let mut attempts = 0;
        lock_in(&mut game, |game| {
            attempts += 1;
            if attempts > 1 {
                game.set_choice(id, BetChoice::Draw)?;
            }
            game.set_wager(id, 10.0)?;
            Ok(())
        })
        .unwrap();

        assert_eq!(attempts, 2);
        assert_eq!(game.phase(), GamePhase::Resolving);
    }

    #[tokio::test]
    async fn test_lock_in_gives_up_after_max_attempts() {
        let mut game = offline_game();
        let id = game.add_player("Alice", Cents::new(10_000)).unwrap();
        game.start().await.unwrap();

        let mut attempts = 0;
        let err = lock_in(&mut game, |game| {
            attempts += 1;
            game.set_wager(id, 10.0)?;
            Ok(())
        })
        .unwrap_err();

        assert_eq!(attempts, MAX_LOCK_ATTEMPTS);
        assert!(err.to_string().contains("VALIDATION_BETS_REJECTED"));
        assert_eq!(game.phase(), GamePhase::Betting);
    }

    #[tokio::test]
    async fn test_phase_error_not_retried() {
        let mut game = offline_game();
        game.add_player("Alice", Cents::new(10_000)).unwrap();

        let mut attempts = 0;
        let err = lock_in(&mut game, |_| {
            attempts += 1;
            Ok(())
        })
        .unwrap_err();

        assert_eq!(attempts, 1);
        assert!(err.to_string().contains("PHASE_ILLEGAL_TRANSITION"));
    }
}
