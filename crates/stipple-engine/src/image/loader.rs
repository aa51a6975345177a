use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use super::ImageData;

/// Errors that can occur while loading an image.
#[derive(Debug)]
pub enum ImageLoadError {
    /// The source could not be read or decoded.
    Decode(::image::ImageError),
    /// The loader went away without reporting a result.
    Abandoned,
}

impl fmt::Display for ImageLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageLoadError::Decode(e) => write!(f, "image decode failed: {e}"),
            ImageLoadError::Abandoned => f.write_str("image loader dropped the request"),
        }
    }
}

impl std::error::Error for ImageLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImageLoadError::Decode(e) => Some(e),
            ImageLoadError::Abandoned => None,
        }
    }
}

impl From<::image::ImageError> for ImageLoadError {
    fn from(e: ::image::ImageError) -> Self {
        ImageLoadError::Decode(e)
    }
}

/// Result of polling a [`PendingImage`].
#[derive(Debug)]
pub enum ImagePoll {
    Pending,
    Ready(ImageData),
    Failed(ImageLoadError),
}

/// An in-flight image load.
#[derive(Debug)]
pub struct PendingImage {
    rx: Receiver<Result<ImageData, ImageLoadError>>,
}

/// Completion side of a [`PendingImage`].
#[derive(Debug)]
pub struct ImageSender {
    tx: Sender<Result<ImageData, ImageLoadError>>,
}

impl ImageSender {
    /// Delivers the result. Ignored if the receiving binding is gone.
    pub fn complete(self, result: Result<ImageData, ImageLoadError>) {
        let _ = self.tx.send(result);
    }
}

impl PendingImage {
    /// Creates a connected sender/pending pair for custom loaders.
    pub fn channel() -> (ImageSender, PendingImage) {
        let (tx, rx) = mpsc::channel();
        (ImageSender { tx }, PendingImage { rx })
    }

    /// Non-blocking check for completion.
    ///
    /// Returns `Ready`/`Failed` at most once; after that the channel is
    /// exhausted and reports `Failed(Abandoned)`.
    pub fn poll(&mut self) -> ImagePoll {
        match self.rx.try_recv() {
            Ok(Ok(data)) => ImagePoll::Ready(data),
            Ok(Err(e)) => ImagePoll::Failed(e),
            Err(TryRecvError::Empty) => ImagePoll::Pending,
            Err(TryRecvError::Disconnected) => ImagePoll::Failed(ImageLoadError::Abandoned),
        }
    }
}

/// Source of decoded images for texture bindings.
pub trait ImageLoader {
    fn load(&self, source: &str) -> PendingImage;
}

/// Loads images from the filesystem on a background thread.
///
/// Relative sources resolve against `root` when one is set.
#[derive(Debug, Clone, Default)]
pub struct FileImageLoader {
    root: Option<PathBuf>,
}

impl FileImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: Some(root.into()) }
    }

    fn resolve(&self, source: &str) -> PathBuf {
        match &self.root {
            Some(root) if Path::new(source).is_relative() => root.join(source),
            _ => PathBuf::from(source),
        }
    }

    /// Decodes a file synchronously.
    pub fn decode_file(path: &Path) -> Result<ImageData, ImageLoadError> {
        Ok(::image::open(path)?.to_rgba8().into())
    }
}

impl ImageLoader for FileImageLoader {
    fn load(&self, source: &str) -> PendingImage {
        let path = self.resolve(source);
        let (sender, pending) = PendingImage::channel();

        let spawned = thread::Builder::new()
            .name("stipple-image-loader".into())
            .spawn(move || {
                let result = Self::decode_file(&path);
                if let Err(e) = &result {
                    log::debug!("image load failed for {}: {e}", path.display());
                }
                sender.complete(result);
            });

        // A failed spawn drops the sender; the pending load then reports Abandoned.
        if let Err(e) = spawned {
            log::debug!("could not spawn image loader thread: {e}");
        }

        pending
    }
}
