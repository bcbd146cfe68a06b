//! Match and narrative generation
//!
//! The external generator is an opaque request/response collaborator.
//! Its output is checked once at this boundary and replaced wholesale by
//! the local fallback when it does not conform.

pub mod fallback;
pub mod http;
pub mod resilient;

pub use fallback::FallbackGenerator;
pub use http::HttpMatchGenerator;
pub use resilient::ResilientGenerator;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::{GeneratedMatch, NarrativeAction, Outcome, Score};

#[async_trait]
pub trait MatchGenerator: Send + Sync {
    /// Two teams and their odds triple
    async fn generate_match(&self) -> Result<GeneratedMatch>;

    /// Ordered highlights that end on `final_score`
    async fn generate_narrative(
        &self,
        team1: &str,
        team2: &str,
        result: Outcome,
        final_score: Score,
    ) -> Result<Vec<NarrativeAction>>;
}
