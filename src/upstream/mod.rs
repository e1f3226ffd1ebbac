//! External services the meme pipeline leans on.
//!
//! Both collaborators are plain traits so the bot can be wired with the real
//! HTTP clients, wrapped in [`Retrying`], or with fakes in tests.

mod huggingface;
mod openai;
mod retry;

pub use huggingface::HuggingFaceCaptioner;
pub use openai::OpenAiGenerator;
pub use retry::{RetryPolicy, Retrying};

use async_trait::async_trait;

use crate::error::MemeError;

/// Describes what's in a photo.
#[async_trait]
pub trait Captioner: Send + Sync {
    /// Returns a short plain-text description of the image.
    async fn describe(&self, image: &[u8]) -> Result<String, MemeError>;
}

/// Writes the joke.
#[async_trait]
pub trait CaptionGenerator: Send + Sync {
    /// Returns raw meme text for an image description, in `language`,
    /// optionally about `theme`.
    async fn generate(
        &self,
        description: &str,
        language: &str,
        theme: Option<&str>,
    ) -> Result<String, MemeError>;
}

/// Turns a non-success HTTP reply into an upstream error, keeping the body.
pub(crate) async fn error_for_status(
    service: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, MemeError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(MemeError::Upstream(format!("{service} returned {status}: {body}")))
}
