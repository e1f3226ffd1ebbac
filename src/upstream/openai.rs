use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::{CaptionGenerator, error_for_status};
use crate::error::MemeError;

const SYSTEM_PROMPT: &str = "You are a meme generator.

You will receive an image description and the language of the meme. Create funny text in a given language for this image.
Sometimes, you will also receive the theme of the meme. In that case, generated meme text should be about this theme.
Respond only with meme text.";

/// Request body for POST /v1/chat/completions
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
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
    #[serde(default)]
    content: Option<String>,
}

/// Builds the user turn: description, language and the optional theme.
fn user_prompt(description: &str, language: &str, theme: Option<&str>) -> String {
    match theme {
        Some(theme) => format!("{description}\nLanguage: {language}\nTheme: {theme}"),
        None => format!("{description}\nLanguage: {language}\n"),
    }
}

/// Meme text from an OpenAI chat completion model.
#[derive(Clone, Debug)]
pub struct OpenAiGenerator {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
    model: String,
}

impl OpenAiGenerator {
    /// Generator calling the chat completions `endpoint` with `model`.
    pub fn new(
        client: reqwest::Client,
        endpoint: Url,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint,
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl CaptionGenerator for OpenAiGenerator {
    async fn generate(
        &self,
        description: &str,
        language: &str,
        theme: Option<&str>,
    ) -> Result<String, MemeError> {
        let prompt = user_prompt(description, language, theme);
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let response = error_for_status("caption generator", response).await?;

        let parsed: ChatResponse = response.json().await?;
        let text = parsed
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| MemeError::Upstream("caption generator returned no text".to_string()))?;
        debug!("generated meme text {text:?}");
        Ok(text)
    }
}
