//! One attempt against the configured provider, then the local fallback.
//!
//! Output is validated here so nothing past this point ever sees an odds
//! triple outside the accepted bounds or a narrative that disagrees with
//! the drawn result.

use std::sync::Arc;

use tracing::{debug, warn};

use super::fallback::scripted_narrative;
use super::{FallbackGenerator, MatchGenerator};
use crate::domain::{GeneratedMatch, NarrativeAction, OddsBounds, Outcome, Score};
use crate::errors::EngineError;
use crate::narrative::validate_narrative;

pub struct ResilientGenerator {
    primary: Option<Arc<dyn MatchGenerator>>,
    fallback: FallbackGenerator,
    bounds: OddsBounds,
}

impl ResilientGenerator {
    pub fn new(
        primary: Option<Arc<dyn MatchGenerator>>,
        fallback: FallbackGenerator,
        bounds: OddsBounds,
    ) -> Self {
        Self {
            primary,
            fallback,
            bounds,
        }
    }

    /// Local generation only
    pub fn offline(fallback: FallbackGenerator, bounds: OddsBounds) -> Self {
        Self::new(None, fallback, bounds)
    }

    pub fn bounds(&self) -> OddsBounds {
        self.bounds
    }

    /// A match whose odds are guaranteed to be within bounds
    pub async fn next_match(&self) -> GeneratedMatch {
        if let Some(primary) = &self.primary {
            match primary.generate_match().await {
                Ok(generated) => match self.check_match(&generated) {
                    Ok(()) => {
                        debug!(
                            team1 = %generated.team1,
                            team2 = %generated.team2,
                            "Using generated match"
                        );
                        return generated;
                    }
                    Err(reason) => record_fallback("match", reason),
                },
                Err(e) => record_fallback("match", e),
            }
        }
        self.fallback.synthesize_match().await
    }

    /// Highlights that end exactly on `final_score`
    pub async fn narrative(
        &self,
        team1: &str,
        team2: &str,
        result: Outcome,
        final_score: Score,
    ) -> Vec<NarrativeAction> {
        if let Some(primary) = &self.primary {
            match primary
                .generate_narrative(team1, team2, result, final_score)
                .await
            {
                Ok(actions) => match validate_narrative(&actions, final_score) {
                    Ok(()) => return actions,
                    Err(e) => record_fallback("narrative", e),
                },
                Err(e) => record_fallback("narrative", e),
            }
        }
        scripted_narrative(team1, team2, result, final_score)
    }

    fn check_match(&self, generated: &GeneratedMatch) -> Result<(), String> {
        if generated.team1.trim().is_empty() || generated.team2.trim().is_empty() {
            return Err("missing team name".to_string());
        }
        if !generated.odds.within(&self.bounds) {
            return Err(format!(
                "odds sum {:.3} outside [{}, {}]",
                generated.odds.sum(),
                self.bounds.min_sum,
                self.bounds.max_sum
            ));
        }
        Ok(())
    }
}

/// Generation failures are logged and counted, never surfaced
fn record_fallback(kind: &'static str, detail: impl std::fmt::Display) {
    let failure = EngineError::Generation(detail.to_string());
    warn!(kind, error = %failure, "Using local fallback");
    metrics::counter!("generator_fallback_total", "kind" => kind).increment(1);
}
