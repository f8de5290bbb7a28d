use image::{DynamicImage, RgbImage};
use crate::Result;

/// A decoded frame, always 3-channel RGB, with the dimensions it had after decoding.
#[derive(Debug, Clone, Default)]
pub struct BvrImage {
    pub image: RgbImage,
    pub img_width: u32,
    pub img_height: u32,
}

impl std::ops::Deref for BvrImage {
    type Target = RgbImage;

    fn deref(&self) -> &Self::Target {
        &self.image
    }
}

impl From<DynamicImage> for BvrImage {
    fn from(image: DynamicImage) -> Self {
        Self::new(image.to_rgb8())
    }
}

impl From<RgbImage> for BvrImage {
    fn from(image: RgbImage) -> Self {
        Self::new(image)
    }
}

impl BvrImage {
    pub fn new(image: RgbImage) -> Self {
        let (img_width, img_height) = image.dimensions();
        Self {
            image,
            img_width,
            img_height,
        }
    }

    /// Decodes an encoded image (JPEG, PNG, ...) and converts it to RGB.
    pub fn decode(encoded: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(encoded)?;
        Ok(Self::from(image))
    }

    /// Solid black frame, used for warm-up passes.
    pub fn blank(width: u32, height: u32) -> Self {
        Self::new(RgbImage::new(width, height))
    }

    pub fn get_img_width(&self) -> u32 {
        self.img_width
    }

    pub fn get_img_height(&self) -> u32 {
        self.img_height
    }
}
