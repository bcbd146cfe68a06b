use serde::Deserialize;
use shared::{
    Cents, DEFAULT_ODDS_SUM_MAX, DEFAULT_ODDS_SUM_MIN, DEFAULT_ROUND_BONUS_CENTS,
    DEFAULT_STARTING_BALANCE_CENTS, GENERATOR_TIMEOUT_SECS,
};
use std::env;

use crate::domain::OddsBounds;
use crate::game::GameSettings;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub game: GameConfig,
    pub generator: GeneratorConfig,
    pub runner: RunnerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    pub round_bonus: Cents,
    pub starting_balance: Cents,
    pub odds_bounds: OddsBounds,
    pub prefetch_enabled: bool,
    pub rng_seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    /// OpenAI-compatible base URL; unset means local generation only
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunnerConfig {
    pub rounds: u32,
    pub players: Vec<String>,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let odds_bounds = OddsBounds::new(
            env::var("ODDS_SUM_MIN")
                .unwrap_or_else(|_| DEFAULT_ODDS_SUM_MIN.to_string())
                .parse()?,
            env::var("ODDS_SUM_MAX")
                .unwrap_or_else(|_| DEFAULT_ODDS_SUM_MAX.to_string())
                .parse()?,
        )?;

        let config = Config {
            game: GameConfig {
                round_bonus: Cents::from_dollars(
                    env::var("ROUND_BONUS")
                        .unwrap_or_else(|_| "5.00".to_string())
                        .parse()?,
                )?,
                starting_balance: Cents::from_dollars(
                    env::var("STARTING_BALANCE")
                        .unwrap_or_else(|_| "100.00".to_string())
                        .parse()?,
                )?,
                odds_bounds,
                prefetch_enabled: env::var("PREFETCH_ENABLED")
                    .unwrap_or_else(|_| "true".to_string())
                    .parse()?,
                rng_seed: env::var("RNG_SEED").ok().map(|s| s.parse()).transpose()?,
            },
            generator: GeneratorConfig {
                api_url: env::var("GENERATOR_API_URL").ok().filter(|s| !s.is_empty()),
                api_key: env::var("GENERATOR_API_KEY").ok().filter(|s| !s.is_empty()),
                model: env::var("GENERATOR_MODEL")
                    .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
                timeout_seconds: env::var("GENERATOR_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| GENERATOR_TIMEOUT_SECS.to_string())
                    .parse()?,
            },
            runner: RunnerConfig {
                rounds: env::var("RUNNER_ROUNDS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()?,
                players: parse_names(
                    &env::var("RUNNER_PLAYERS").unwrap_or_else(|_| "Alice,Bob,Carol".to_string()),
                ),
            },
        };
        config.game.check_amounts()?;
        Ok(config)
    }

    pub fn game_settings(&self) -> GameSettings {
        GameSettings {
            round_bonus: self.game.round_bonus,
            prefetch: self.game.prefetch_enabled,
            seed: self.game.rng_seed,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            game: GameConfig {
                round_bonus: Cents::new(DEFAULT_ROUND_BONUS_CENTS),
                starting_balance: Cents::new(DEFAULT_STARTING_BALANCE_CENTS),
                odds_bounds: OddsBounds::default(),
                prefetch_enabled: true,
                rng_seed: None,
            },
            generator: GeneratorConfig {
                api_url: None,
                api_key: None,
                model: "gpt-4o-mini".to_string(),
                timeout_seconds: GENERATOR_TIMEOUT_SECS,
            },
            runner: RunnerConfig {
                rounds: 5,
                players: vec!["Alice".to_string(), "Bob".to_string(), "Carol".to_string()],
            },
        }
    }
}

impl GameConfig {
    /// Negative money settings are refused rather than clamped
    pub fn check_amounts(&self) -> anyhow::Result<()> {
        if self.round_bonus.is_negative() {
            anyhow::bail!("ROUND_BONUS cannot be negative: {}", self.round_bonus);
        }
        if self.starting_balance.is_negative() {
            anyhow::bail!("STARTING_BALANCE cannot be negative: {}", self.starting_balance);
        }
        Ok(())
    }
}

fn parse_names(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
