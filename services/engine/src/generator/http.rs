//! HTTP client for an OpenAI-compatible chat completions endpoint
//!
//! Requests JSON mode and parses the message content into the same serde
//! types the rest of the engine uses. Anything that does not parse is an
//! error; the caller decides what to fall back to.

use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::MatchGenerator;
use crate::domain::{GeneratedMatch, NarrativeAction, Outcome, Score};
use crate::narrative::highlight_count;

/// Share of narratives requested as a back-and-forth thriller
const THRILLER_PROBABILITY: f64 = 0.55;

#[derive(Clone)]
pub struct HttpMatchGenerator {
    http_client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NarrativeEnvelope {
    actions: Vec<NarrativeAction>,
}

impl HttpMatchGenerator {
    pub fn new(base_url: String, api_key: String, model: String, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        })
    }

    async fn complete(&self, system: &str, user: String) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
            temperature: 0.9,
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Generator API error {}: {}", status, body);
        }

        let data: ChatResponse = response
            .json()
            .await
            .context("Failed to parse response")?;

        extract_content(data)
    }
}

fn extract_content(data: ChatResponse) -> Result<String> {
    data.choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .context("Response contained no choices")
}

fn parse_match(content: &str) -> Result<GeneratedMatch> {
    serde_json::from_str(content).context("Match payload does not match the expected schema")
}

fn parse_narrative(content: &str) -> Result<Vec<NarrativeAction>> {
    let envelope: NarrativeEnvelope = serde_json::from_str(content)
        .context("Narrative payload does not match the expected schema")?;
    Ok(envelope.actions)
}

fn match_prompt() -> String {
    "Invent a football match between two teams, real or fictional. \
     Respond with JSON: {\"team1\": string, \"team2\": string, \
     \"odds\": {\"team1Win\": number, \"draw\": number, \"team2Win\": number}}. \
     Odds are probabilities between 0 and 1 that sum to about 1.05."
        .to_string()
}

fn narrative_prompt(
    team1: &str,
    team2: &str,
    result: Outcome,
    final_score: Score,
    thriller: bool,
) -> String {
    let ending = match result {
        Outcome::Team1 => format!("{} wins", team1),
        Outcome::Team2 => format!("{} wins", team2),
        Outcome::Draw => "the match ends in a draw".to_string(),
    };
    let style = if thriller {
        "Make it a thriller: lead changes, late drama, near misses."
    } else {
        "Keep it a tight, tactical contest."
    };
    format!(
        "Write {count} short highlights for {team1} vs {team2}, where {ending} {score}. \
         {style} Respond with JSON: {{\"actions\": [{{\"text\": string, \"suspense\": boolean, \
         \"score\": {{\"team1\": number, \"team2\": number}}}}]}}. \
         Each score is the running score after that highlight; it never goes down \
         and the last one is exactly {score}.",
        count = highlight_count(final_score),
        team1 = team1,
        team2 = team2,
        ending = ending,
        score = final_score,
        style = style,
    )
}

const SYSTEM_PROMPT: &str = "You are a football commentator. Reply with JSON only.";

#[async_trait]
impl MatchGenerator for HttpMatchGenerator {
    async fn generate_match(&self) -> Result<GeneratedMatch> {
        let content = self.complete(SYSTEM_PROMPT, match_prompt()).await?;
        let generated = parse_match(&content)?;
        debug!(
            team1 = %generated.team1,
            team2 = %generated.team2,
            odds_sum = generated.odds.sum(),
            "Generated match"
        );
        Ok(generated)
    }

    async fn generate_narrative(
        &self,
        team1: &str,
        team2: &str,
        result: Outcome,
        final_score: Score,
    ) -> Result<Vec<NarrativeAction>> {
        let thriller = rand::thread_rng().gen_bool(THRILLER_PROBABILITY);
        let prompt = narrative_prompt(team1, team2, result, final_score, thriller);
        let content = self.complete(SYSTEM_PROMPT, prompt).await?;
        let actions = parse_narrative(&content)?;
        debug!(
            highlights = actions.len(),
            thriller,
            final_score = %final_score,
            "Generated narrative"
        );
        Ok(actions)
    }
}
