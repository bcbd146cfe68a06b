/// Shared constants for the football betting game
///
/// This module centralizes all magic numbers and default settings
/// so the engine, the generators and the runner agree on them.

/// Cents per whole currency unit
pub const CENTS_PER_UNIT: i64 = 100;

/// Default flat bonus paid to every player after each round ($5.00)
pub const DEFAULT_ROUND_BONUS_CENTS: i64 = 500;

/// Default starting balance for a new player ($100.00)
pub const DEFAULT_STARTING_BALANCE_CENTS: i64 = 10_000;

/// Lowest accepted sum of an externally generated odds triple
///
/// Rationale: bookmaker odds carry a small overround. Anything far below
/// 1.0 means the generator produced nonsense probabilities.
pub const DEFAULT_ODDS_SUM_MIN: f64 = 0.95;

/// Highest accepted sum of an externally generated odds triple
pub const DEFAULT_ODDS_SUM_MAX: f64 = 1.20;

/// Fallback match: team-one win probability is drawn from
/// `[FALLBACK_TEAM1_MIN, FALLBACK_TEAM1_MIN + FALLBACK_TEAM1_SPAN)`
pub const FALLBACK_TEAM1_MIN: f64 = 0.20;
pub const FALLBACK_TEAM1_SPAN: f64 = 0.40;

/// Fallback match: draw probability range, same convention as above
pub const FALLBACK_DRAW_MIN: f64 = 0.15;
pub const FALLBACK_DRAW_SPAN: f64 = 0.25;

/// Most goals a single team can score in a synthesized scoreline
pub const MAX_GOALS_PER_TEAM: u8 = 7;

/// Mean goals per team for the scoreline bell curve (peaks at 1-0)
pub const SCORELINE_MEAN_GOALS: f64 = 0.9;

/// Standard deviation of goals per team for the scoreline bell curve
pub const SCORELINE_STD_DEV: f64 = 0.8;

/// Timeout for a single request to the external match generator
pub const GENERATOR_TIMEOUT_SECS: u64 = 10;
