//! One meme request end to end: describe, generate, compose.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::error::MemeError;
use crate::meme::MemeComposer;
use crate::upstream::{CaptionGenerator, Captioner};

/// Where downloaded photos and finished memes live.
#[derive(Clone, Debug)]
pub struct ImageStore {
    images_dir: PathBuf,
    memes_dir: PathBuf,
}

impl ImageStore {
    /// Store reading inputs from `images_dir` and writing to `memes_dir`.
    pub fn new(images_dir: impl Into<PathBuf>, memes_dir: impl Into<PathBuf>) -> Self {
        Self {
            images_dir: images_dir.into(),
            memes_dir: memes_dir.into(),
        }
    }

    /// Creates both directories if they're missing.
    pub async fn prepare(&self) -> Result<(), MemeError> {
        tokio::fs::create_dir_all(&self.images_dir).await?;
        tokio::fs::create_dir_all(&self.memes_dir).await?;
        Ok(())
    }

    /// Path of the downloaded photo called `name`.
    pub fn input_path(&self, name: &str) -> PathBuf {
        self.images_dir.join(name)
    }

    /// Path of the meme made from the photo called `name`.
    pub fn output_path(&self, name: &str) -> PathBuf {
        self.memes_dir.join(name)
    }

    /// Deletes the downloaded photo, if it's still there.
    pub async fn discard_input(&self, name: &str) {
        let path = self.input_path(name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => debug!("removed {}", path.display()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => tracing::warn!("failed to remove {}: {}", path.display(), err),
        }
    }
}

/// What the user asked for.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MemeRequest {
    /// File name of the downloaded photo inside the store
    pub image: String,
    /// Language the joke should be written in
    pub language: String,
    /// What the joke should be about, if anything
    pub theme: Option<String>,
}

/// Glues the collaborators and the composer together.
#[derive(Clone)]
pub struct MemeService {
    captioner: Arc<dyn Captioner>,
    generator: Arc<dyn CaptionGenerator>,
    composer: MemeComposer,
    store: ImageStore,
}

impl MemeService {
    /// Service using the given collaborators, composer and store.
    pub fn new(
        captioner: Arc<dyn Captioner>,
        generator: Arc<dyn CaptionGenerator>,
        composer: MemeComposer,
        store: ImageStore,
    ) -> Self {
        Self {
            captioner,
            generator,
            composer,
            store,
        }
    }

    /// The image store this service reads from and writes to.
    pub fn store(&self) -> &ImageStore {
        &self.store
    }

    /// Makes the meme and returns where it was written.
    ///
    /// The downloaded photo is left in place; removing it is up to the
    /// caller.
    #[instrument(skip_all, fields(image = %request.image, language = %request.language))]
    pub async fn create_meme(&self, request: &MemeRequest) -> Result<PathBuf, MemeError> {
        let input = self.store.input_path(&request.image);
        let output = self.store.output_path(&request.image);

        let photo = read_photo(&input).await?;
        let description = self.captioner.describe(&photo).await?;
        let caption = self
            .generator
            .generate(&description, &request.language, request.theme.as_deref())
            .await?;
        info!("captioning {} with {caption:?}", request.image);

        let composer = self.composer.clone();
        let target = output.clone();
        tokio::task::spawn_blocking(move || composer.compose(&input, &target, &caption)).await??;
        Ok(output)
    }
}

async fn read_photo(path: &Path) -> Result<Vec<u8>, MemeError> {
    tokio::fs::read(path)
        .await
        .map_err(|err| MemeError::UnreadableImage(format!("{}: {}", path.display(), err)))
}
