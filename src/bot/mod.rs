//! The Telegram side: webhook server, update routing and replies.

use std::collections::HashMap;
use std::num::NonZeroU16;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::error::MemeError;
use crate::service::{MemeRequest, MemeService};

pub mod conversation;
mod messages;
pub mod telegram;

use conversation::{Conversation, Effect, Inbound};
use telegram::{ChatTransport, Message, TelegramClient, Update};

/// Header Telegram echoes the webhook secret in.
pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Path the webhook is served on.
pub const WEBHOOK_PATH: &str = "/telegram/webhook";

const POLL_TIMEOUT: Duration = Duration::from_secs(30);
const POLL_ERROR_PAUSE: Duration = Duration::from_secs(5);

/// Inbox of each chat's worker task.
type ChatQueues = Arc<Mutex<HashMap<i64, mpsc::UnboundedSender<Message>>>>;

/// Everything a handler needs, cheap to clone.
#[derive(Clone)]
pub struct BotState {
    service: Arc<MemeService>,
    transport: Arc<dyn ChatTransport>,
    chats: ChatQueues,
    webhook_secret: Option<String>,
    fallback_image: Option<PathBuf>,
}

impl BotState {
    /// State talking to users through `transport`.
    pub fn new(service: MemeService, transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            service: Arc::new(service),
            transport,
            chats: Arc::new(Mutex::new(HashMap::new())),
            webhook_secret: None,
            fallback_image: None,
        }
    }

    /// Only accept webhook calls carrying this secret.
    pub fn with_webhook_secret(mut self, secret: Option<String>) -> Self {
        self.webhook_secret = secret.filter(|secret| !secret.is_empty());
        self
    }

    /// Picture sent along with the apology when a meme can't be made.
    pub fn with_fallback_image(mut self, path: Option<PathBuf>) -> Self {
        self.fallback_image = path;
        self
    }

    fn check_secret(&self, headers: &HeaderMap) -> Result<(), MemeError> {
        let Some(expected) = self.webhook_secret.as_deref() else {
            return Ok(());
        };
        match headers.get(SECRET_HEADER).and_then(|value| value.to_str().ok()) {
            Some(given) if given == expected => Ok(()),
            _ => Err(MemeError::Unauthorized),
        }
    }

    /// Queues an update behind the earlier ones from the same chat.
    ///
    /// Every chat has one worker task handling its messages in dispatch
    /// order, so a reply typed while a photo is still downloading waits for
    /// the photo. Meme generation runs on a task of its own.
    pub fn dispatch(&self, update: Update) {
        let Some(message) = update.message else {
            debug!("ignoring update {} without a message", update.update_id);
            return;
        };
        let chat_id = message.chat.id;
        let mut chats = self.chats.lock().unwrap_or_else(PoisonError::into_inner);
        let queue = chats
            .entry(chat_id)
            .or_insert_with(|| self.spawn_chat_worker(chat_id));
        if let Err(mpsc::error::SendError(message)) = queue.send(message) {
            warn!("chat {chat_id}: worker went away, starting a new conversation");
            let queue = self.spawn_chat_worker(chat_id);
            if queue.send(message).is_err() {
                error!("chat {chat_id}: message dropped");
            }
            chats.insert(chat_id, queue);
        }
    }

    fn spawn_chat_worker(&self, chat_id: i64) -> mpsc::UnboundedSender<Message> {
        let (queue, mut inbox) = mpsc::unbounded_channel::<Message>();
        let state = self.clone();
        tokio::spawn(async move {
            debug!("chat {chat_id}: worker started");
            let mut conversation = Conversation::default();
            while let Some(message) = inbox.recv().await {
                if let Err(err) = state.handle_message(&mut conversation, &message).await {
                    error!("chat {chat_id}: {err}");
                }
            }
        });
        queue
    }

    async fn handle_message(
        &self,
        conversation: &mut Conversation,
        message: &Message,
    ) -> Result<(), MemeError> {
        let chat_id = message.chat.id;
        let inbound = if let Some(photo) = message.largest_photo() {
            let image = format!("{chat_id}_{}.jpg", message.message_id);
            let dest = self.service.store().input_path(&image);
            if let Err(err) = self.transport.download_photo(&photo.file_id, &dest).await {
                self.service.store().discard_input(&image).await;
                self.transport
                    .send_message(chat_id, messages::ERROR_MSG)
                    .await?;
                return Err(err);
            }
            Inbound::Photo {
                image,
                caption: message.caption.as_deref(),
            }
        } else if let Some(text) = message.text.as_deref() {
            parse_text(text)
        } else {
            debug!("chat {chat_id}: nothing to do with message {}", message.message_id);
            return Ok(());
        };

        for effect in conversation.handle(inbound) {
            self.apply(chat_id, effect).await?;
        }
        Ok(())
    }

    async fn apply(&self, chat_id: i64, effect: Effect) -> Result<(), MemeError> {
        match effect {
            Effect::Reply(text) => self.transport.send_message(chat_id, &text).await,
            Effect::Discard(image) => {
                self.service.store().discard_input(&image).await;
                Ok(())
            }
            Effect::Generate(request) => {
                let state = self.clone();
                tokio::spawn(async move {
                    if let Err(err) = state.generate(chat_id, &request).await {
                        error!("chat {chat_id}: {err}");
                    }
                });
                Ok(())
            }
        }
    }

    async fn generate(&self, chat_id: i64, request: &MemeRequest) -> Result<(), MemeError> {
        let result = self.service.create_meme(request).await;
        self.service.store().discard_input(&request.image).await;
        match result {
            Ok(meme) => {
                info!("chat {chat_id}: sending {}", meme.display());
                self.transport.send_photo(chat_id, &meme).await
            }
            Err(err) => {
                error!("chat {chat_id}: meme generation failed: {err}");
                self.transport
                    .send_message(chat_id, messages::ERROR_MSG)
                    .await?;
                if let Some(fallback) = self.fallback_image.as_deref() {
                    self.transport.send_photo(chat_id, fallback).await?;
                }
                Ok(())
            }
        }
    }
}

/// Turns message text into a command, or leaves it as text.
fn parse_text(text: &str) -> Inbound<'_> {
    let trimmed = text.trim();
    if !trimmed.starts_with('/') {
        return Inbound::Text(text);
    }
    let (command, argument) = trimmed
        .split_once(char::is_whitespace)
        .unwrap_or((trimmed, ""));
    // `/start@SomeBot` in groups
    let command = command.split('@').next().unwrap_or(command);
    match command {
        "/start" | "/help" => Inbound::Start,
        "/cancel" => Inbound::Cancel,
        "/set_language" => Inbound::SetLanguage(Some(argument.trim())),
        _ => Inbound::Text(text),
    }
}

async fn webhook_handler(
    State(state): State<BotState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, MemeError> {
    state.check_secret(&headers)?;
    let update: Update =
        serde_json::from_slice(&body).map_err(|err| MemeError::BadRequest(err.to_string()))?;
    debug!("received update {}", update.update_id);
    // answer straight away, Telegram retries slow webhooks
    state.dispatch(update);
    Ok(StatusCode::OK)
}

async fn healthz_handler() -> &'static str {
    "ok"
}

fn create_router() -> Router<BotState> {
    Router::new()
        .route(WEBHOOK_PATH, axum::routing::post(webhook_handler))
        .route("/healthz", axum::routing::get(healthz_handler))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for ctrl-c: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

/// Serves the webhook until ctrl-c.
pub async fn setup_server(
    listen_addr: &str,
    port: NonZeroU16,
    state: BotState,
) -> Result<(), anyhow::Error> {
    let app = create_router().with_state(state);

    let addr = format!("{}:{}", listen_addr, port);
    info!("Starting webhook server on http://{}{}", addr, WEBHOOK_PATH);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", err);
    }
    Ok(())
}

/// Long-polls Telegram instead of serving a webhook, until ctrl-c.
pub async fn run_polling(state: &BotState, client: &TelegramClient) -> Result<(), MemeError> {
    client.delete_webhook().await?;
    info!("Polling for updates");
    let mut offset = 0;
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);
    loop {
        let updates = tokio::select! {
            () = &mut shutdown => return Ok(()),
            updates = client.get_updates(offset, POLL_TIMEOUT) => updates,
        };
        let updates = match updates {
            Ok(updates) => updates,
            Err(err) => {
                warn!("getUpdates failed: {err}");
                tokio::time::sleep(POLL_ERROR_PAUSE).await;
                continue;
            }
        };
        for update in updates {
            offset = offset.max(update.update_id + 1);
            state.dispatch(update);
        }
    }
}
