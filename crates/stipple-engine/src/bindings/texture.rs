use crate::device::{Device, Sampling, TextureId};
use crate::image::{ImageData, ImageLoader, ImagePoll, PendingImage};

/// Where a texture binding is in its load.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TextureState {
    /// Holding the transparent pixel; no load was issued.
    Placeholder,
    /// Holding the transparent pixel while the image loads.
    Loading,
    /// Holding the loaded image.
    Loaded,
    /// The load failed; the transparent pixel stays for good.
    Failed,
}

/// A texture slot filled from an image source.
///
/// The texture holds a 1×1 transparent pixel from the moment it attaches, so
/// draws issued before the image arrives sample nothing visible. The image is
/// requested once; completion is picked up by [`TextureBinding::poll`].
#[derive(Debug)]
pub struct TextureBinding {
    unit: u32,
    texture: TextureId,
    source: Option<String>,
    state: TextureState,
    pending: Option<PendingImage>,
}

impl TextureBinding {
    pub fn attach<D: Device + ?Sized>(
        device: &mut D,
        unit: u32,
        source: Option<&str>,
        loader: &dyn ImageLoader,
    ) -> Self {
        let texture = device.create_texture(unit);
        device.texture_image(texture, &ImageData::transparent_pixel());

        let pending = source.map(|src| loader.load(src));
        let state = if pending.is_some() {
            TextureState::Loading
        } else {
            TextureState::Placeholder
        };

        Self {
            unit,
            texture,
            source: source.map(str::to_string),
            state,
            pending,
        }
    }

    /// Commits a finished load. Returns whether the texture content changed.
    pub fn poll<D: Device + ?Sized>(&mut self, device: &mut D) -> bool {
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };

        match pending.poll() {
            ImagePoll::Pending => false,
            ImagePoll::Ready(image) => {
                device.texture_image(self.texture, &image);
                device.texture_sampling(self.texture, Sampling::LINEAR_CLAMP);
                self.state = TextureState::Loaded;
                self.pending = None;
                true
            }
            ImagePoll::Failed(err) => {
                log::debug!("texture {:?} keeps its placeholder: {err}", self.source);
                self.state = TextureState::Failed;
                self.pending = None;
                false
            }
        }
    }

    pub fn state(&self) -> TextureState {
        self.state
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn unit(&self) -> u32 {
        self.unit
    }

    pub fn texture(&self) -> TextureId {
        self.texture
    }
}
