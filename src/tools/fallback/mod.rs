//! Text-Model Fallback
//!
//! When a venue's pages are JavaScript shells the markup yields nothing.
//! A [`TextGenerator`] is then asked, once, to list the venue's current
//! and upcoming events as a JSON array.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::tools::clean::{clean, clean_title};
use crate::tools::dates::{parse_single_date_from, parse_time_span};
use crate::types::{EventDraft, EventType, Provenance, ScrapedEvent, VenueContext};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("generator not configured: {0}")]
    Config(String),
    #[error("generation request failed: {0}")]
    Request(String),
    #[error("unexpected generator response: {0}")]
    Response(String),
}

/// Something that turns a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

/// [`TextGenerator`] backed by an OpenAI-compatible chat-completions endpoint.
#[derive(Clone)]
pub struct OpenAiGenerator {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl OpenAiGenerator {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, GenerateError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GenerateError::Config(e.to_string()))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    /// Configure from `OPENAI_API_KEY`, `OPENAI_BASE_URL` and `VENUE_SCOUT_LLM_MODEL`.
    pub fn from_env() -> Result<Self, GenerateError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| GenerateError::Config("OPENAI_API_KEY is not set".into()))?;
        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model =
            std::env::var("VENUE_SCOUT_LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Self::new(api_key, base_url, model)
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "You list events at cultural venues. Reply with JSON only.",
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.0,
        };

        debug!(model = %self.model, prompt_length = prompt.len(), "calling text generator");
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerateError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerateError::Request(format!("status {status}")));
        }
        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerateError::Response(e.to_string()))?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| GenerateError::Response("no choices".into()))
    }
}

/// One item of the generator's JSON array. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GeneratedEvent {
    #[serde(alias = "name")]
    title: Option<String>,
    description: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
    location: Option<String>,
    #[serde(alias = "source_url")]
    url: Option<String>,
    image_url: Option<String>,
    #[serde(alias = "type")]
    event_type: Option<String>,
}

pub(crate) fn build_prompt(venue: &VenueContext) -> String {
    let name = if venue.name.is_empty() {
        venue.domain.0.as_str()
    } else {
        venue.name.as_str()
    };
    format!(
        "List the current and upcoming exhibitions, tours, talks, workshops and other events at \
         {name} ({url}) as of {today}.\n\
         Respond with a strict JSON array and nothing else. Each item is an object with the keys \
         \"title\", \"description\", \"start_date\" (YYYY-MM-DD), \"end_date\" (YYYY-MM-DD), \
         \"start_time\" (e.g. 7:00 PM), \"end_time\", \"location\", \"url\", \"image_url\" and \
         \"event_type\" (one of exhibition, tour, talk, workshop, event). Use null for unknown \
         values. Only include events you are confident take place at this venue. If you know of \
         none, respond with [].",
        url = venue.base_url,
        today = venue.today.format("%Y-%m-%d"),
    )
}

/// The first balanced JSON array in free text (code fences and prose tolerated).
pub(crate) fn first_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

fn draft_from_generated(item: GeneratedEvent, today: NaiveDate) -> Option<EventDraft> {
    let cleaned = clean_title(item.title.as_deref()?, today);
    let mut draft = EventDraft::new(cleaned.title, Provenance::LlmExtracted);

    draft.start_date = item
        .start_date
        .as_deref()
        .and_then(|d| parse_single_date_from(d, today));
    draft.end_date = item
        .end_date
        .as_deref()
        .and_then(|d| parse_single_date_from(d, today))
        .or(cleaned.end_date);
    if draft.end_date == draft.start_date {
        draft.end_date = None;
    }
    draft.start_time = item
        .start_time
        .as_deref()
        .and_then(parse_time_span)
        .map(|(start, _)| start);
    draft.end_time = item
        .end_time
        .as_deref()
        .and_then(parse_time_span)
        .map(|(end, _)| end);

    draft.description = item.description.map(|d| clean(&d)).filter(|d| !d.is_empty());
    draft.location = item.location.map(|l| clean(&l)).filter(|l| !l.is_empty());
    draft.link = item
        .url
        .filter(|u| u.starts_with("http://") || u.starts_with("https://"));
    draft.image_url = item
        .image_url
        .filter(|u| u.starts_with("http://") || u.starts_with("https://"));
    draft.event_type = item
        .event_type
        .as_deref()
        .and_then(|t| t.parse::<EventType>().ok())
        .or_else(|| EventType::infer(&draft.title));
    Some(draft)
}

/// Parse a generator reply into events. Malformed items are skipped.
pub(crate) fn parse_generated(reply: &str, page_url: &str, today: NaiveDate) -> Vec<ScrapedEvent> {
    let Some(array) = first_json_array(reply) else {
        return Vec::new();
    };
    let items: Vec<Value> = match serde_json::from_str(array) {
        Ok(items) => items,
        Err(e) => {
            debug!(error = %e, "generator reply is not a JSON array");
            return Vec::new();
        }
    };
    items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<GeneratedEvent>(item).ok())
        .filter_map(|item| draft_from_generated(item, today))
        .filter_map(|draft| draft.finish(page_url, today))
        .collect()
}

/// Ask the generator for the venue's events. Failures yield no events.
pub async fn extract_via_fallback(
    generator: &dyn TextGenerator,
    venue: &VenueContext,
) -> Vec<ScrapedEvent> {
    let prompt = build_prompt(venue);
    match generator.generate(&prompt).await {
        Ok(reply) => {
            let events = parse_generated(&reply, venue.base_url.as_str(), venue.today);
            info!(venue = %venue.base_url, events = events.len(), "text-model fallback finished");
            events
        }
        Err(e) => {
            warn!(venue = %venue.base_url, error = %e, "text-model fallback failed");
            Vec::new()
        }
    }
}
