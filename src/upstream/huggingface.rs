use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::{Captioner, error_for_status};
use crate::error::MemeError;

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

/// Image captioning through the Hugging Face inference API.
#[derive(Clone, Debug)]
pub struct HuggingFaceCaptioner {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
}

impl HuggingFaceCaptioner {
    /// Captioner posting to `endpoint` (a model URL) with `api_key`.
    pub fn new(client: reqwest::Client, endpoint: Url, api_key: impl Into<String>) -> Self {
        Self {
            client,
            endpoint,
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl Captioner for HuggingFaceCaptioner {
    async fn describe(&self, image: &[u8]) -> Result<String, MemeError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .body(image.to_vec())
            .send()
            .await?;
        let response = error_for_status("captioner", response).await?;

        let parsed: Vec<GeneratedText> = response.json().await?;
        let description = parsed
            .into_iter()
            .next()
            .map(|item| item.generated_text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| MemeError::Upstream("captioner returned no description".to_string()))?;
        debug!("image described as {description:?}");
        Ok(description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::serve;
    use axum::Router;
    use axum::body::Bytes;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;

    async fn caption_handler(headers: HeaderMap, body: Bytes) -> (StatusCode, String) {
        let authorized = headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            == Some("Bearer hf-test");
        if !authorized {
            return (StatusCode::UNAUTHORIZED, "{}".to_string());
        }
        if body.as_ref() != b"jpeg bytes" {
            return (StatusCode::BAD_REQUEST, "{}".to_string());
        }
        (
            StatusCode::OK,
            r#"[{"generated_text": " a cat sitting on a laptop "}]"#.to_string(),
        )
    }

    #[tokio::test]
    async fn describes_an_image() {
        let base = serve(Router::new().route("/model", post(caption_handler))).await;
        let captioner = HuggingFaceCaptioner::new(
            reqwest::Client::new(),
            base.join("model").expect("url"),
            "hf-test",
        );
        let description = captioner.describe(b"jpeg bytes").await.expect("describe");
        assert_eq!(description, "a cat sitting on a laptop");
    }

    #[tokio::test]
    async fn http_errors_are_upstream_errors() {
        let base = serve(Router::new().route("/model", post(caption_handler))).await;
        let captioner = HuggingFaceCaptioner::new(
            reqwest::Client::new(),
            base.join("model").expect("url"),
            "wrong key",
        );
        let result = captioner.describe(b"jpeg bytes").await;
        assert!(matches!(result, Err(MemeError::Upstream(msg)) if msg.contains("401")));
    }

    #[tokio::test]
    async fn empty_answer_is_an_upstream_error() {
        let router = Router::new().route("/model", post(|| async { "[]" }));
        let base = serve(router).await;
        let captioner =
            HuggingFaceCaptioner::new(reqwest::Client::new(), base.join("model").expect("url"), "k");
        assert!(matches!(
            captioner.describe(b"jpeg").await,
            Err(MemeError::Upstream(_))
        ));
    }
}
