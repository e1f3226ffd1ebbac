//! CLI parser
use clap::Parser;
use std::num::NonZeroU16;
use std::path::PathBuf;
use url::Url;

use crate::constants::{
    DEFAULT_CAPTIONER_URL, DEFAULT_FALLBACK_IMAGE, DEFAULT_FONT_PATH, DEFAULT_IMAGES_DIR,
    DEFAULT_MEMES_DIR, DEFAULT_OPENAI_URL, DEFAULT_TELEGRAM_URL, DEFAULT_TEXT_MODEL,
};

#[derive(Parser, Debug)]
/// CLI Options
pub struct CliOptions {
    #[clap(long, help = "Enable debug logging", env = "MEMEBOT_DEBUG")]
    /// Enable debug logging. Env: MEMEBOT_DEBUG
    pub debug: bool,
    #[clap(long, short, default_value = "8080", env = "MEMEBOT_PORT")]
    /// Webhook listener port, defaults to `8080`.
    /// Env: MEMEBOT_PORT
    pub port: NonZeroU16,
    #[clap(
        long,
        short,
        default_value = "127.0.0.1",
        env = "MEMEBOT_LISTEN_ADDRESS"
    )]
    /// Listen address, defaults to `127.0.0.1`.
    /// Env: MEMEBOT_LISTEN_ADDRESS
    pub listen_address: String,

    #[clap(long, env = "BOT_TOKEN", hide_env_values = true)]
    /// Telegram bot token. Env: BOT_TOKEN
    pub bot_token: String,
    #[clap(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    /// OpenAI API key. Env: OPENAI_API_KEY
    pub openai_api_key: String,
    #[clap(long, env = "HUGGINGFACE_API_KEY", hide_env_values = true)]
    /// Hugging Face inference API key. Env: HUGGINGFACE_API_KEY
    pub huggingface_api_key: String,

    #[clap(long, default_value = DEFAULT_CAPTIONER_URL, env = "MEMEBOT_CAPTIONER_URL")]
    /// Image captioning model endpoint. Env: MEMEBOT_CAPTIONER_URL
    pub captioner_url: Url,
    #[clap(long, default_value = DEFAULT_OPENAI_URL, env = "MEMEBOT_OPENAI_URL")]
    /// Chat completions endpoint. Env: MEMEBOT_OPENAI_URL
    pub openai_url: Url,
    #[clap(long, default_value = DEFAULT_TELEGRAM_URL, env = "MEMEBOT_TELEGRAM_URL")]
    /// Telegram Bot API base URL. Env: MEMEBOT_TELEGRAM_URL
    pub telegram_url: Url,
    #[clap(long, default_value = DEFAULT_TEXT_MODEL, env = "MEMEBOT_TEXT_MODEL")]
    /// Chat model writing the captions. Env: MEMEBOT_TEXT_MODEL
    pub text_model: String,

    #[clap(long, default_value = DEFAULT_FONT_PATH, env = "MEMEBOT_FONT")]
    /// TTF/OTF font for the caption. Env: MEMEBOT_FONT
    pub font: PathBuf,
    #[clap(long, default_value = DEFAULT_IMAGES_DIR, env = "MEMEBOT_IMAGES_DIR")]
    /// Where downloaded photos go. Env: MEMEBOT_IMAGES_DIR
    pub images_dir: PathBuf,
    #[clap(long, default_value = DEFAULT_MEMES_DIR, env = "MEMEBOT_MEMES_DIR")]
    /// Where finished memes go. Env: MEMEBOT_MEMES_DIR
    pub memes_dir: PathBuf,
    #[clap(long, default_value = DEFAULT_FALLBACK_IMAGE, env = "MEMEBOT_FALLBACK_IMAGE")]
    /// Picture sent when a meme can't be made; skipped if the file is missing.
    /// Env: MEMEBOT_FALLBACK_IMAGE
    pub fallback_image: PathBuf,

    #[clap(long, env = "MEMEBOT_WEBHOOK_URL", conflicts_with = "poll")]
    /// Public URL Telegram should post updates to, eg
    /// `https://bot.example.org/telegram/webhook`. Registered at start-up when set.
    /// Env: MEMEBOT_WEBHOOK_URL
    pub webhook_url: Option<Url>,
    #[clap(long, env = "MEMEBOT_WEBHOOK_SECRET", hide_env_values = true)]
    /// Secret Telegram must echo back on every webhook call.
    /// Env: MEMEBOT_WEBHOOK_SECRET
    pub webhook_secret: Option<String>,
    #[clap(long, env = "MEMEBOT_POLL")]
    /// Long-poll for updates instead of serving a webhook. Env: MEMEBOT_POLL
    pub poll: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    const REQUIRED: [&str; 7] = [
        "memebot",
        "--bot-token",
        "1:abc",
        "--openai-api-key",
        "sk-test",
        "--huggingface-api-key",
        "hf-test",
    ];

    #[test]
    fn command_is_well_formed() {
        CliOptions::command().debug_assert();
    }

    #[test]
    fn defaults_point_at_the_real_services() {
        let cli = CliOptions::try_parse_from(REQUIRED).expect("parse");
        assert_eq!(cli.captioner_url.as_str(), DEFAULT_CAPTIONER_URL);
        assert_eq!(cli.telegram_url.as_str(), DEFAULT_TELEGRAM_URL);
        assert_eq!(cli.font, PathBuf::from(DEFAULT_FONT_PATH));
        assert!(!cli.poll);
    }

    #[test]
    fn webhook_and_polling_are_exclusive() {
        let args = REQUIRED
            .into_iter()
            .chain(["--poll", "--webhook-url", "https://bot.example.org/telegram/webhook"]);
        assert!(CliOptions::try_parse_from(args).is_err());
    }
}
