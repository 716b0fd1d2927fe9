//! OpenAI adapter (group summaries).
//!
//! Implements the core `Summarizer` port over the chat-completions endpoint.

use std::time::Duration;

use async_trait::async_trait;

use tgm_core::{config::Config, errors::Error, ports::Summarizer, Result};

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Clone, Debug)]
pub struct OpenAiSummarizer {
    api_key: String,
    model: String,
    http: reqwest::Client,
}

impl OpenAiSummarizer {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| Error::External(format!("openai client build error: {e}")))?;
        Ok(Self {
            api_key: api_key.into(),
            model: model.into(),
            http,
        })
    }

    /// `None` when no API key is configured.
    pub fn from_config(cfg: &Config) -> Result<Option<Self>> {
        let Some(key) = &cfg.openai_api_key else {
            return Ok(None);
        };
        Self::new(key.clone(), cfg.openai_model.clone()).map(Some)
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, prompt: &str) -> Result<String> {
        let resp = self
            .http
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&request_body(&self.model, prompt))
            .send()
            .await
            .map_err(|e| Error::External(format!("openai request error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::External(format!(
                "openai summary failed: {status} {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let v: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| Error::External(format!("openai json error: {e}")))?;

        let text = extract_content(&v)?;
        tracing::debug!(model = %self.model, chars = text.len(), "summary received");
        Ok(text)
    }
}

fn request_body(model: &str, prompt: &str) -> serde_json::Value {
    serde_json::json!({
        "model": model,
        "messages": [
            { "role": "user", "content": prompt }
        ]
    })
}

fn extract_content(v: &serde_json::Value) -> Result<String> {
    let text = v
        .pointer("/choices/0/message/content")
        .and_then(|t| t.as_str())
        .unwrap_or("")
        .trim()
        .to_string();

    if text.is_empty() {
        return Err(Error::External(
            "openai summary returned empty text".to_string(),
        ));
    }
    Ok(text)
}
