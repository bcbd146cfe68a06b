use serde::{Deserialize, Serialize};
use shared::{Cents, PlayerId, DEFAULT_ODDS_SUM_MAX, DEFAULT_ODDS_SUM_MIN};

use crate::errors::{EngineError, Result};

/// Final result of a match
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Team1,
    Draw,
    Team2,
}

impl Outcome {
    pub const ALL: [Outcome; 3] = [Outcome::Team1, Outcome::Draw, Outcome::Team2];

    /// Whether a final score agrees with this outcome
    pub fn matches_score(&self, score: Score) -> bool {
        match self {
            Outcome::Team1 => score.team1 > score.team2,
            Outcome::Draw => score.team1 == score.team2,
            Outcome::Team2 => score.team2 > score.team1,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Team1 => write!(f, "TEAM1"),
            Outcome::Draw => write!(f, "DRAW"),
            Outcome::Team2 => write!(f, "TEAM2"),
        }
    }
}

/// What a player backs for the current round
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BetChoice {
    Team1,
    Draw,
    Team2,
    #[default]
    Skip,
}

impl BetChoice {
    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            BetChoice::Team1 => Some(Outcome::Team1),
            BetChoice::Draw => Some(Outcome::Draw),
            BetChoice::Team2 => Some(Outcome::Team2),
            BetChoice::Skip => None,
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, BetChoice::Skip)
    }
}

impl From<Outcome> for BetChoice {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Team1 => BetChoice::Team1,
            Outcome::Draw => BetChoice::Draw,
            Outcome::Team2 => BetChoice::Team2,
        }
    }
}

impl std::fmt::Display for BetChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.outcome() {
            Some(outcome) => write!(f, "{}", outcome),
            None => write!(f, "SKIP"),
        }
    }
}

/// Three-way odds triple: probability of each outcome, bookmaker margin included
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Odds {
    pub team1_win: f64,
    pub draw: f64,
    pub team2_win: f64,
}

impl Odds {
    pub fn new(team1_win: f64, draw: f64, team2_win: f64) -> Self {
        Self {
            team1_win,
            draw,
            team2_win,
        }
    }

    pub fn probability(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Team1 => self.team1_win,
            Outcome::Draw => self.draw,
            Outcome::Team2 => self.team2_win,
        }
    }

    pub fn sum(&self) -> f64 {
        self.team1_win + self.draw + self.team2_win
    }

    /// Amount by which the triple exceeds a fair book (negative when under)
    pub fn overround(&self) -> f64 {
        self.sum() - 1.0
    }

    /// All values finite and non-negative with a positive total
    pub fn is_drawable(&self) -> bool {
        let values = [self.team1_win, self.draw, self.team2_win];
        values.iter().all(|p| p.is_finite() && *p >= 0.0) && self.sum() > 0.0
    }

    pub fn within(&self, bounds: &OddsBounds) -> bool {
        self.is_drawable() && bounds.contains(self.sum())
    }
}

/// Accepted range for the sum of an externally generated odds triple
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OddsBounds {
    pub min_sum: f64,
    pub max_sum: f64,
}

impl OddsBounds {
    pub fn new(min_sum: f64, max_sum: f64) -> Result<Self> {
        if !(min_sum.is_finite() && max_sum.is_finite()) || min_sum <= 0.0 || min_sum > max_sum {
            return Err(EngineError::InvalidInput(format!(
                "odds bounds must satisfy 0 < min <= max, got [{}, {}]",
                min_sum, max_sum
            )));
        }
        Ok(Self { min_sum, max_sum })
    }

    pub fn contains(&self, sum: f64) -> bool {
        sum >= self.min_sum && sum <= self.max_sum
    }
}

impl Default for OddsBounds {
    fn default() -> Self {
        Self {
            min_sum: DEFAULT_ODDS_SUM_MIN,
            max_sum: DEFAULT_ODDS_SUM_MAX,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Score {
    pub team1: u8,
    pub team2: u8,
}

impl Score {
    pub fn new(team1: u8, team2: u8) -> Self {
        Self { team1, team2 }
    }

    pub fn total_goals(&self) -> u8 {
        self.team1.saturating_add(self.team2)
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.team1, self.team2)
    }
}

/// One highlight of the match narrative with the running score after it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NarrativeAction {
    pub text: String,
    #[serde(default)]
    pub suspense: bool,
    pub score: Score,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub balance: Cents,
    pub wager: Cents,
    pub choice: BetChoice,
}

impl Player {
    /// Whether this player has real money riding on the round
    pub fn has_active_bet(&self) -> bool {
        !self.choice.is_skip() && self.wager > Cents::ZERO
    }
}

/// Match as produced by a generator, before any result exists
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratedMatch {
    pub team1: String,
    pub team2: String,
    pub odds: Odds,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Match {
    pub team1: String,
    pub team2: String,
    pub odds: Odds,
    pub actions: Vec<NarrativeAction>,
    pub result: Option<Outcome>,
    pub final_score: Option<Score>,
}

impl Match {
    pub fn label(&self, choice: BetChoice) -> &str {
        match choice {
            BetChoice::Team1 => &self.team1,
            BetChoice::Team2 => &self.team2,
            BetChoice::Draw => "Draw",
            BetChoice::Skip => "Skip",
        }
    }

    /// Set the result; a match is decided exactly once
    pub fn record_result(&mut self, outcome: Outcome) -> Result<()> {
        if let Some(existing) = self.result {
            return Err(EngineError::invariant(format!(
                "result already recorded as {} for {} vs {}",
                existing, self.team1, self.team2
            )));
        }
        self.result = Some(outcome);
        Ok(())
    }
}

impl From<GeneratedMatch> for Match {
    fn from(generated: GeneratedMatch) -> Self {
        Self {
            team1: generated.team1,
            team2: generated.team2,
            odds: generated.odds,
            actions: Vec::new(),
            result: None,
            final_score: None,
        }
    }
}

/// Per-player settlement record for display and audit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SettlementResult {
    pub player_id: PlayerId,
    pub player_name: String,
    pub wager: Cents,
    pub choice: BetChoice,
    /// Net: positive on a win, `-wager` on a loss, zero on a skip
    pub payout: Cents,
    /// Balance after payout and round bonus
    pub new_balance: Cents,
}
