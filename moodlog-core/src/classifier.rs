//! Classification client for moodlog — hosted LLM over a chat-completions API
//!
//! Provides a `Classifier` trait and `ChatClassifier`, which talks to any
//! OpenAI-compatible `/chat/completions` endpoint (the Hugging Face inference
//! router by default). One classification is three completions:
//! - **label** — one word, reduced to a `Sentiment` (required)
//! - **message** — a short supportive reply (optional)
//! - **suggestions** — a JSON object with activity ideas (optional)
//!
//! Only the label call can fail the classification; the other two degrade to
//! "absent" with a warning.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;

use crate::config::ClassifierSettings;
use crate::models::Sentiment;

/// The label endpoint carries no score; a recognised label reports this.
pub const DEFAULT_CONFIDENCE: f32 = 0.8;

pub const DEFAULT_BASE_URL: &str = "https://router.huggingface.co/v1";
pub const DEFAULT_MODEL: &str = "deepseek-ai/DeepSeek-V3-0324";
pub const DEFAULT_API_KEY_ENV: &str = "HUGGINGFACE_API_KEY";

// ============================================================================
// Classifier trait
// ============================================================================

/// Result of classifying one mood statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub sentiment: Sentiment,
    pub confidence: f32,
    pub supportive_message: Option<String>,
    pub activity_suggestions: Vec<String>,
}

/// Abstraction over the classification service.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify free text. Any error means the service is unavailable.
    async fn classify(&self, text: &str) -> Result<Classification, ClassifierError>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

// ============================================================================
// Error types
// ============================================================================

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Completion contained no text")]
    EmptyCompletion,

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Missing API key (set {env})")]
    MissingApiKey { env: String },

    #[error("All {attempts} attempts failed")]
    RetryExhausted { attempts: usize },
}

impl ClassifierError {
    /// Worth another attempt: network trouble, rate limiting, server errors.
    fn is_transient(&self) -> bool {
        match self {
            ClassifierError::Http(_) => true,
            ClassifierError::Api { code, .. } => *code == 429 || *code >= 500,
            _ => false,
        }
    }
}

// ============================================================================
// Config
// ============================================================================

/// Runtime configuration for `ChatClassifier`.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_seconds: u64,
    pub max_retries: usize,
    pub retry_delay_ms: u64,
}

impl ClassifierConfig {
    /// Build from the `[classifier]` section, reading the key from the
    /// environment variable it names.
    pub fn from_settings(settings: &ClassifierSettings) -> Result<Self, ClassifierError> {
        let api_key = std::env::var(&settings.api_key_env).unwrap_or_default();
        if api_key.trim().is_empty() {
            return Err(ClassifierError::MissingApiKey {
                env: settings.api_key_env.clone(),
            });
        }

        Ok(Self {
            api_key,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            timeout_seconds: settings.timeout_seconds,
            max_retries: settings.max_retries,
            retry_delay_ms: settings.retry_delay_ms,
        })
    }
}

/// Create the classifier from the `[classifier]` config section.
pub fn create_classifier(
    settings: &ClassifierSettings,
) -> Result<Box<dyn Classifier>, ClassifierError> {
    let config = ClassifierConfig::from_settings(settings)?;
    Ok(Box::new(ChatClassifier::new(config)?))
}

// ============================================================================
// Chat-completions API structs (private)
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
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

/// Error bodies come as `{"error": "..."}` or `{"error": {"message": "..."}}`.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiErrorBody {
    Text(String),
    Detail { message: String },
}

/// Shape the suggestions prompt asks for.
#[derive(Debug, Default, Deserialize)]
struct Suggestions {
    #[serde(default)]
    message: Option<String>,
    activities: Vec<String>,
}

// ============================================================================
// Prompts
// ============================================================================

fn label_prompt(text: &str) -> String {
    format!(
        "Read the following journal entry and decide whether the writer feels \
         happy, sad, or neutral. Weigh their word choice, tone, the situation \
         they describe and how strongly they express it.\n\n\
         Entry: '{}'\n\n\
         Reply with exactly one word: happy, sad, or neutral.",
        text
    )
}

fn message_prompt(sentiment: Sentiment, text: &str) -> String {
    format!(
        "You are a warm, supportive listener. Someone who feels {} wrote: '{}'\n\n\
         Acknowledge how they feel, offer a gentle reframe if it fits, and close \
         on an encouraging note. Answer in two or three sentences of plain text \
         with no quotes or formatting.",
        sentiment, text
    )
}

fn suggestions_prompt(sentiment: Sentiment, text: &str) -> String {
    format!(
        "Someone who feels {} wrote: '{}'. Suggest three specific, varied \
         activities suited to that mood (mix indoor and outdoor, solo and \
         social).\n\n\
         Return only a JSON object, without markdown, shaped like:\n\
         {{\"message\": \"one short encouraging line\", \
         \"activities\": [\"first\", \"second\", \"third\"]}}",
        sentiment, text
    )
}

/// Strip a surrounding markdown code fence (```json ... ```), if any.
fn strip_code_fence(raw: &str) -> &str {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    let fence = FENCE.get_or_init(|| {
        Regex::new(r"(?s)^\s*```[A-Za-z]*\s*(.*?)\s*```\s*$").expect("valid fence regex")
    });

    match fence.captures(raw).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str(),
        None => raw.trim(),
    }
}

fn parse_suggestions(raw: &str) -> Result<Suggestions, ClassifierError> {
    let body = strip_code_fence(raw);
    let mut parsed: Suggestions = serde_json::from_str(body)
        .map_err(|e| ClassifierError::MalformedResponse(format!("suggestions payload: {}", e)))?;

    parsed.activities = parsed
        .activities
        .into_iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect();
    parsed.message = parsed
        .message
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty());

    Ok(parsed)
}

// ============================================================================
// ChatClassifier
// ============================================================================

/// Classifier backed by an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct ChatClassifier {
    client: Client,
    config: ClassifierConfig,
}

impl ChatClassifier {
    pub fn new(config: ClassifierConfig) -> Result<Self, ClassifierError> {
        if config.api_key.trim().is_empty() {
            return Err(ClassifierError::MissingApiKey {
                env: DEFAULT_API_KEY_ENV.to_string(),
            });
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { client, config })
    }

    /// Ask for the one-word label and reduce it to a `Sentiment`.
    pub async fn classify_label(&self, text: &str) -> Result<Sentiment, ClassifierError> {
        let reply = self.complete(&label_prompt(text)).await?;
        let sentiment = Sentiment::from_label(&reply);
        if !sentiment.is_known() {
            tracing::warn!(reply = %reply, "Unrecognised sentiment label from model");
        }
        Ok(sentiment)
    }

    pub async fn supportive_message(
        &self,
        sentiment: Sentiment,
        text: &str,
    ) -> Result<String, ClassifierError> {
        self.complete(&message_prompt(sentiment, text)).await
    }

    async fn suggestions(
        &self,
        sentiment: Sentiment,
        text: &str,
    ) -> Result<Suggestions, ClassifierError> {
        let reply = self.complete(&suggestions_prompt(sentiment, text)).await?;
        parse_suggestions(&reply)
    }

    /// Run one completion with retries on transient failures.
    async fn complete(&self, prompt: &str) -> Result<String, ClassifierError> {
        let retry_strategy = ExponentialBackoff::from_millis(self.config.retry_delay_ms)
            .max_delay(Duration::from_secs(10))
            .map(jitter)
            .take(self.config.max_retries);

        let result = RetryIf::spawn(
            retry_strategy,
            || self.complete_once(prompt),
            ClassifierError::is_transient,
        )
        .await;

        match result {
            Ok(content) => Ok(content),
            Err(e) if e.is_transient() => {
                let attempts = self.config.max_retries + 1;
                tracing::error!(attempts, error = %e, "All completion attempts failed");
                Err(ClassifierError::RetryExhausted { attempts })
            }
            Err(e) => Err(e),
        }
    }

    async fn complete_once(&self, prompt: &str) -> Result<String, ClassifierError> {
        let url = format!("{}/chat/completions", self.config.base_url);

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt.to_string(),
            }],
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&error_body)
                .map(|e| match e.error {
                    ApiErrorBody::Text(m) | ApiErrorBody::Detail { message: m } => m,
                })
                .unwrap_or(error_body);
            let code = status.as_u16();

            tracing::warn!(code, message = %message, "Completion API error");

            return Err(ClassifierError::Api { code, message });
        }

        let chat: ChatResponse = response.json().await?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or(ClassifierError::EmptyCompletion)
    }
}

#[async_trait]
impl Classifier for ChatClassifier {
    async fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
        let sentiment = self.classify_label(text).await?;

        let supportive_message = match self.supportive_message(sentiment, text).await {
            Ok(m) => Some(m),
            Err(e) => {
                tracing::warn!(error = %e, "Supportive message unavailable");
                None
            }
        };

        let suggestions = match self.suggestions(sentiment, text).await {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, "Activity suggestions unavailable, using none");
                Suggestions::default()
            }
        };

        let confidence = if sentiment.is_known() {
            DEFAULT_CONFIDENCE
        } else {
            0.0
        };

        Ok(Classification {
            sentiment,
            confidence,
            supportive_message: supportive_message.or(suggestions.message),
            activity_suggestions: suggestions.activities,
        })
    }

    fn name(&self) -> &str {
        "chat-completions"
    }
}

// ============================================================================
// TESTS
// ============================================================================
