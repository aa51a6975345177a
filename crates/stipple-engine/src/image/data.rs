/// Decoded RGBA8 pixels, row-major, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl ImageData {
    /// Wraps raw RGBA8 pixels; `None` if the buffer size does not match.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        (pixels.len() == expected).then_some(Self { width, height, pixels })
    }

    /// The 1×1 fully transparent image textures hold until their source loads.
    pub fn transparent_pixel() -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![0, 0, 0, 0],
        }
    }

    pub fn is_fully_transparent(&self) -> bool {
        self.pixels.chunks_exact(4).all(|px| px[3] == 0)
    }
}

impl From<::image::RgbaImage> for ImageData {
    fn from(img: ::image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_is_one_transparent_pixel() {
        let img = ImageData::transparent_pixel();
        assert_eq!((img.width, img.height), (1, 1));
        assert!(img.is_fully_transparent());
    }

    #[test]
    fn from_rgba_checks_buffer_length() {
        assert!(ImageData::from_rgba(2, 2, vec![0; 16]).is_some());
        assert!(ImageData::from_rgba(2, 2, vec![0; 15]).is_none());
    }

    #[test]
    fn converts_from_image_buffer() {
        let img = ::image::RgbaImage::from_pixel(3, 2, ::image::Rgba([10, 20, 30, 255]));
        let data = ImageData::from(img);
        assert_eq!((data.width, data.height, data.pixels.len()), (3, 2, 24));
        assert!(!data.is_fully_transparent());
    }
}
