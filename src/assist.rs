//! Optional text-generation collaborator for notes, terms and item
//! descriptions.
//!
//! The host checks availability up front: [`GeminiGenerator::from_config`]
//! returns `None` when no credential is configured, and callers hide the
//! feature. Generated text is returned, never written into the document.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config::AssistConfig;
use crate::error::{Error, Result};

const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// What the generated text is for; named in the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistContext {
    TermsAndConditions,
    Notes,
    InvoiceDescription,
}

impl AssistContext {
    pub fn label(self) -> &'static str {
        match self {
            AssistContext::TermsAndConditions => "Terms & Conditions",
            AssistContext::Notes => "Notes",
            AssistContext::InvoiceDescription => "Invoice Description",
        }
    }
}

impl fmt::Display for AssistContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AssistContext {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "terms" | "terms & conditions" => Ok(AssistContext::TermsAndConditions),
            "notes" => Ok(AssistContext::Notes),
            "description" | "invoice description" => Ok(AssistContext::InvoiceDescription),
            other => Err(Error::Generation(format!("unknown context '{other}'"))),
        }
    }
}

/// Prompt sent to the model for `input` in `context`.
pub fn build_prompt(input: &str, context: AssistContext) -> String {
    format!(
        "Context: User is creating an invoice.\n\
         Task: Write a professional, polite, and concise {} text based on this input: \"{}\".\n\
         Output Requirement: Return ONLY the raw text to be inserted into the invoice field. No intro, no quotes.",
        context.label(),
        input
    )
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Raw model output for a prompt already built with [`build_prompt`].
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Generate text for `input`. An empty input produces `None` without
    /// calling the model; output is trimmed.
    async fn generate(&self, input: &str, context: AssistContext) -> Result<Option<String>> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(None);
        }
        let text = self.complete(&build_prompt(input, context)).await?;
        Ok(Some(text.trim().to_string()))
    }
}

pub struct GeminiGenerator {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiGenerator {
    pub fn new(api_key: impl Into<String>, config: &AssistConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config
                .endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: config.model.clone(),
            api_key: api_key.into(),
        }
    }

    /// `None` when the configured credential variable is unset or empty.
    pub fn from_config(config: &AssistConfig) -> Option<Self> {
        let key = std::env::var(&config.api_key_env).ok()?;
        if key.trim().is_empty() {
            return None;
        }
        Some(Self::new(key, config))
    }

    /// Like [`from_config`](Self::from_config) but reports the missing
    /// credential as an error.
    pub fn require(config: &AssistConfig) -> Result<Self> {
        Self::from_config(config)
            .ok_or_else(|| Error::MissingCapability(format!("text generation (set {})", config.api_key_env)))
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

/// Pull the first candidate's text out of a `generateContent` response.
fn candidate_text(body: &Value) -> Option<String> {
    let parts = body.pointer("/candidates/0/content/parts")?.as_array()?;
    let text: String = parts.iter().filter_map(|p| p.get("text")?.as_str()).collect();
    Some(text)
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });
        let response = self
            .client
            .post(self.url())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Generation(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("text generation returned {status}");
            return Err(Error::Generation(format!("service returned {status}")));
        }
        let value: Value = response.json().await.map_err(|e| Error::Generation(e.to_string()))?;
        candidate_text(&value).ok_or_else(|| Error::Generation("response carried no text".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    struct Canned {
        reply: Result<String>,
        prompts: Mutex<Vec<String>>,
    }

    impl Canned {
        fn new(reply: Result<String>) -> Self {
            Self {
                reply,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for Canned {
        async fn complete(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().push(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(Error::Generation(e.to_string())),
            }
        }
    }

    #[test]
    fn prompt_names_the_context() {
        let p = build_prompt("net 30, late fee", AssistContext::TermsAndConditions);
        assert!(p.contains("concise Terms & Conditions text"));
        assert!(p.contains("\"net 30, late fee\""));
        assert!(p.contains("Return ONLY the raw text"));
    }

    #[tokio::test]
    async fn empty_input_skips_the_model() {
        let gen = Canned::new(Ok("unused".into()));
        assert_eq!(gen.generate("   ", AssistContext::Notes).await.unwrap(), None);
        assert!(gen.prompts.lock().is_empty());
    }

    #[tokio::test]
    async fn output_is_trimmed() {
        let gen = Canned::new(Ok("\n  Thanks for your business.  \n".into()));
        let text = gen.generate("thanks", AssistContext::Notes).await.unwrap();
        assert_eq!(text.as_deref(), Some("Thanks for your business."));
    }

    #[tokio::test]
    async fn failures_surface_as_generation_errors() {
        let gen = Canned::new(Err(Error::Generation("quota".into())));
        let err = gen.generate("x", AssistContext::InvoiceDescription).await.unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
    }

    #[test]
    fn missing_credential_disables_the_feature() {
        let config = AssistConfig {
            api_key_env: "INVOICE_FORGE_TEST_UNSET_KEY".into(),
            ..AssistConfig::default()
        };
        assert!(GeminiGenerator::from_config(&config).is_none());
        assert!(matches!(GeminiGenerator::require(&config), Err(Error::MissingCapability(_))));
    }

    #[test]
    fn candidate_parts_are_joined() {
        let body = json!({ "candidates": [{ "content": { "parts": [{ "text": "a" }, { "text": "b" }] } }] });
        assert_eq!(candidate_text(&body).as_deref(), Some("ab"));
        assert_eq!(candidate_text(&json!({})), None);
    }

    #[test]
    fn contexts_parse_from_cli_names() {
        assert_eq!("terms".parse::<AssistContext>().unwrap(), AssistContext::TermsAndConditions);
        assert_eq!("Notes".parse::<AssistContext>().unwrap(), AssistContext::Notes);
        assert!("poem".parse::<AssistContext>().is_err());
    }
}
