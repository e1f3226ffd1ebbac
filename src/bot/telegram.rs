//! Just enough of the Telegram Bot API to receive photos and send memes back.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::MemeError;

/// An incoming update, only the parts we care about.
#[derive(Clone, Debug, Deserialize)]
pub struct Update {
    /// Monotonic update id, used as the polling offset
    pub update_id: i64,
    /// Set for new messages, `None` for every other update kind
    #[serde(default)]
    pub message: Option<Message>,
}

/// A chat message.
#[derive(Clone, Debug, Deserialize)]
pub struct Message {
    /// Id of the message inside its chat
    pub message_id: i64,
    /// Where it was sent
    pub chat: Chat,
    /// Text of a plain message
    #[serde(default)]
    pub text: Option<String>,
    /// Caption of a photo message
    #[serde(default)]
    pub caption: Option<String>,
    /// Every size Telegram keeps of the photo
    #[serde(default)]
    pub photo: Option<Vec<PhotoSize>>,
}

impl Message {
    /// The biggest available rendition of the attached photo.
    pub fn largest_photo(&self) -> Option<&PhotoSize> {
        self.photo
            .as_deref()?
            .iter()
            .max_by_key(|size| u64::from(size.width) * u64::from(size.height))
    }
}

/// A chat, identified by id.
#[derive(Clone, Debug, Deserialize)]
pub struct Chat {
    /// Chat id
    pub id: i64,
}

/// One rendition of a photo.
#[derive(Clone, Debug, Deserialize)]
pub struct PhotoSize {
    /// Id to download it with
    pub file_id: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct File {
    file_path: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct SetWebhook<'a> {
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    secret_token: Option<&'a str>,
    allowed_updates: [&'a str; 1],
}

#[derive(Debug, Serialize)]
struct GetUpdates {
    offset: i64,
    timeout: u64,
    allowed_updates: [&'static str; 1],
}

/// The chat side of the bot: fetch photos, send replies.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Downloads the file `file_id` to `dest`.
    async fn download_photo(&self, file_id: &str, dest: &Path) -> Result<(), MemeError>;
    /// Sends a text message.
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), MemeError>;
    /// Uploads the image at `path` as a photo.
    async fn send_photo(&self, chat_id: i64, path: &Path) -> Result<(), MemeError>;
}

trait TransportResult<T> {
    fn transport(self) -> Result<T, MemeError>;
}

// request URLs carry the bot token, so they never make it into the message
impl<T> TransportResult<T> for Result<T, reqwest::Error> {
    fn transport(self) -> Result<T, MemeError> {
        self.map_err(|err| MemeError::Transport(err.without_url().to_string()))
    }
}

impl<T> TransportResult<T> for Result<T, url::ParseError> {
    fn transport(self) -> Result<T, MemeError> {
        self.map_err(|err| MemeError::Transport(format!("bad Bot API URL: {err}")))
    }
}

/// Bot API client authenticated with a bot token.
#[derive(Clone, Debug)]
pub struct TelegramClient {
    client: reqwest::Client,
    api_base: Url,
    token: String,
}

impl TelegramClient {
    /// Client for the API at `api_base`, normally `https://api.telegram.org/`.
    pub fn new(client: reqwest::Client, api_base: Url, token: impl Into<String>) -> Self {
        Self {
            client,
            api_base,
            token: token.into(),
        }
    }

    // tokens look like `123:abc`; the leading `./` keeps `bot123:` from
    // being read as a URL scheme
    fn method_url(&self, method: &str) -> Result<Url, MemeError> {
        self.api_base
            .join(&format!("./bot{}/{}", self.token, method))
            .transport()
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, MemeError> {
        // errors come back as non-2xx with the same envelope, so parse either way
        let response = request.send().await.transport()?;
        let status = response.status();
        let body: ApiResponse<T> = response.json().await.transport()?;
        if !body.ok {
            return Err(MemeError::Transport(format!(
                "{method} failed with {status}: {}",
                body.description.unwrap_or_default()
            )));
        }
        body.result
            .ok_or_else(|| MemeError::Transport(format!("{method} returned no result")))
    }

    /// Points Telegram at our webhook, optionally with a secret header value.
    pub async fn set_webhook(&self, url: &Url, secret: Option<&str>) -> Result<(), MemeError> {
        let body = SetWebhook {
            url: url.as_str(),
            secret_token: secret,
            allowed_updates: ["message"],
        };
        let _: bool = self
            .call(
                "setWebhook",
                self.client.post(self.method_url("setWebhook")?).json(&body),
            )
            .await?;
        Ok(())
    }

    /// Removes the webhook so long polling can be used.
    pub async fn delete_webhook(&self) -> Result<(), MemeError> {
        let _: bool = self
            .call(
                "deleteWebhook",
                self.client.post(self.method_url("deleteWebhook")?),
            )
            .await?;
        Ok(())
    }

    /// Long-polls for updates newer than `offset`.
    pub async fn get_updates(&self, offset: i64, timeout: Duration) -> Result<Vec<Update>, MemeError> {
        let body = GetUpdates {
            offset,
            timeout: timeout.as_secs(),
            allowed_updates: ["message"],
        };
        let request = self
            .client
            .post(self.method_url("getUpdates")?)
            .timeout(timeout + Duration::from_secs(10))
            .json(&body);
        self.call("getUpdates", request).await
    }
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn download_photo(&self, file_id: &str, dest: &Path) -> Result<(), MemeError> {
        let mut url = self.method_url("getFile")?;
        url.query_pairs_mut().append_pair("file_id", file_id);
        let file: File = self.call("getFile", self.client.get(url)).await?;
        let file_path = file
            .file_path
            .ok_or_else(|| MemeError::Transport(format!("file {file_id} can't be downloaded")))?;

        let url = self
            .api_base
            .join(&format!("./file/bot{}/{}", self.token, file_path))
            .transport()?;
        let response = self.client.get(url).send().await.transport()?;
        let response = response.error_for_status().transport()?;
        let bytes = response.bytes().await.transport()?;
        tokio::fs::write(dest, &bytes).await?;
        debug!("downloaded {} bytes to {}", bytes.len(), dest.display());
        Ok(())
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), MemeError> {
        let body = SendMessage { chat_id, text };
        let _: serde_json::Value = self
            .call(
                "sendMessage",
                self.client.post(self.method_url("sendMessage")?).json(&body),
            )
            .await?;
        Ok(())
    }

    async fn send_photo(&self, chat_id: i64, path: &Path) -> Result<(), MemeError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "meme.jpg".to_string());
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .part("photo", part);
        let _: serde_json::Value = self
            .call(
                "sendPhoto",
                self.client.post(self.method_url("sendPhoto")?).multipart(form),
            )
            .await?;
        Ok(())
    }
}
