use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use memebot::bot::telegram::TelegramClient;
use memebot::bot::{self, BotState};
use memebot::config::{http_client, setup_logging};
use memebot::constants::UPSTREAM_TIMEOUT_SECONDS;
use memebot::meme::{MemeComposer, MemeFont};
use memebot::service::{ImageStore, MemeService};
use memebot::upstream::{HuggingFaceCaptioner, OpenAiGenerator, RetryPolicy, Retrying};
use tracing::{error, info, warn};

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let cli = memebot::cli::CliOptions::parse();

    if setup_logging(cli.debug).is_err() {
        return;
    }

    let font = match MemeFont::load(&cli.font) {
        Ok(font) => font,
        Err(err) => {
            error!("Can't start without a font: {}", err);
            return;
        }
    };

    let client = match http_client(Duration::from_secs(UPSTREAM_TIMEOUT_SECONDS)) {
        Ok(client) => client,
        Err(err) => {
            error!("HTTP client setup failed: {}", err);
            return;
        }
    };

    let captioner = Retrying::new(
        HuggingFaceCaptioner::new(
            client.clone(),
            cli.captioner_url.clone(),
            cli.huggingface_api_key.clone(),
        ),
        RetryPolicy::captioner(),
    );
    let generator = Retrying::new(
        OpenAiGenerator::new(
            client.clone(),
            cli.openai_url.clone(),
            cli.openai_api_key.clone(),
            cli.text_model.clone(),
        ),
        RetryPolicy::generator(),
    );

    let store = ImageStore::new(&cli.images_dir, &cli.memes_dir);
    if let Err(err) = store.prepare().await {
        error!("Failed to create image directories: {}", err);
        return;
    }

    let service = MemeService::new(
        Arc::new(captioner),
        Arc::new(generator),
        MemeComposer::new(font),
        store,
    );

    let fallback_image = if cli.fallback_image.is_file() {
        Some(cli.fallback_image.clone())
    } else {
        warn!(
            "Fallback image {} not found, failures will only get a text reply",
            cli.fallback_image.display()
        );
        None
    };

    let telegram = TelegramClient::new(client, cli.telegram_url.clone(), cli.bot_token.clone());
    let state = BotState::new(service, Arc::new(telegram.clone()))
        .with_webhook_secret(cli.webhook_secret.clone())
        .with_fallback_image(fallback_image);

    if cli.poll {
        if let Err(err) = bot::run_polling(&state, &telegram).await {
            error!("Polling error: {}", err);
        }
        return;
    }

    if let Some(webhook_url) = &cli.webhook_url {
        match telegram
            .set_webhook(webhook_url, cli.webhook_secret.as_deref())
            .await
        {
            Ok(()) => info!("Registered webhook {}", webhook_url),
            Err(err) => {
                error!("Failed to register webhook: {}", err);
                return;
            }
        }
    }

    if let Err(err) = bot::setup_server(&cli.listen_address, cli.port, state).await {
        error!("Application error: {}", err);
    }
}
