//! Error handling

use std::fmt;

use axum::response::IntoResponse;
use tracing::info;

/// Errors raised while turning a photo into a meme.
#[derive(Debug)]
pub enum MemeError {
    /// The caption was empty once cleaned
    EmptyCaption,
    /// The input image couldn't be read or decoded
    UnreadableImage(String),
    /// Input and output point at the same file
    SamePath(String),
    /// The font file is missing or isn't a usable font
    Font(String),
    /// Captioner or generator failed, retries already spent
    Upstream(String),
    /// Talking to the chat transport failed
    Transport(String),
    /// Drawing or encoding the output image failed
    Image(image::ImageError),
    /// Filesystem failures
    Io(std::io::Error),
    /// Webhook request without the right secret
    Unauthorized,
    /// Webhook payload we couldn't make sense of
    BadRequest(String),
}

impl fmt::Display for MemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCaption => write!(f, "Caption is empty after cleaning"),
            Self::UnreadableImage(msg) => write!(f, "Unreadable image: {msg}"),
            Self::SamePath(path) => {
                write!(f, "Input and output are the same file: {path}")
            }
            Self::Font(msg) => write!(f, "Font error: {msg}"),
            Self::Upstream(msg) => write!(f, "Upstream service failed: {msg}"),
            Self::Transport(msg) => write!(f, "Chat transport failed: {msg}"),
            Self::Image(err) => write!(f, "Image processing failed: {err}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::Unauthorized => write!(f, "Missing or invalid webhook secret"),
            Self::BadRequest(msg) => write!(f, "Bad request: {msg}"),
        }
    }
}

impl std::error::Error for MemeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Image(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for MemeError {
    fn from(err: std::io::Error) -> Self {
        MemeError::Io(err)
    }
}

impl From<image::ImageError> for MemeError {
    fn from(err: image::ImageError) -> Self {
        MemeError::Image(err)
    }
}

impl From<reqwest::Error> for MemeError {
    fn from(err: reqwest::Error) -> Self {
        MemeError::Upstream(err.to_string())
    }
}

impl From<tokio::task::JoinError> for MemeError {
    fn from(err: tokio::task::JoinError) -> Self {
        MemeError::Io(std::io::Error::other(err))
    }
}

impl IntoResponse for MemeError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            MemeError::Unauthorized => {
                info!("Webhook call with a bad secret");
                axum::http::StatusCode::UNAUTHORIZED
            }
            MemeError::BadRequest(msg) => {
                info!("Bad webhook payload: {msg}");
                axum::http::StatusCode::BAD_REQUEST
            }
            other => {
                tracing::error!("Internal server error: {}", other);
                axum::http::StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let mut response = axum::response::Response::new(axum::body::Body::from(
            status.canonical_reason().unwrap_or("Error"),
        ));
        *response.status_mut() = status;
        response
    }
}
