//! Shared constants/defaults for things
//!

/// Default Hugging Face image-to-text model endpoint
pub const DEFAULT_CAPTIONER_URL: &str =
    "https://api-inference.huggingface.co/models/nlpconnect/vit-gpt2-image-captioning";

/// Default OpenAI chat completions endpoint
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Default Telegram Bot API base
pub const DEFAULT_TELEGRAM_URL: &str = "https://api.telegram.org/";

/// Chat model used to write the joke
pub const DEFAULT_TEXT_MODEL: &str = "gpt-3.5-turbo";

/// Bold sans font shipped with the repo
pub const DEFAULT_FONT_PATH: &str = "fonts/DejaVuSans-Bold.ttf";

/// The default place downloaded photos go
pub const DEFAULT_IMAGES_DIR: &str = "./images";

/// The default place finished memes go
pub const DEFAULT_MEMES_DIR: &str = "./memes";

/// Sent along with the apology when a meme couldn't be made
pub const DEFAULT_FALLBACK_IMAGE: &str = "assets/fallback.png";

/// Timeout for a single upstream HTTP call, in seconds.
pub const UPSTREAM_TIMEOUT_SECONDS: u64 = 120;
