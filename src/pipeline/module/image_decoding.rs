use image::RgbImage;
use crate::error::errors::ExtractionError;

#[derive(Debug, Clone, Default)]
pub struct ImageDecoding {}

impl ImageDecoding {
    pub fn new() -> Self {
        ImageDecoding {}
    }

    /// Decode any format the `image` crate can sniff into 8-bit RGB. Alpha is dropped.
    pub fn call(&self, im_bytes: &[u8]) -> Result<RgbImage, ExtractionError> {
        if im_bytes.is_empty() {
            return Err(ExtractionError::Decode("empty buffer".to_string()));
        }

        let decoded = match image::load_from_memory(im_bytes) {
            Ok(decoded) => decoded,
            Err(e) => return Err(ExtractionError::Decode(e.to_string())),
        };

        if decoded.width() == 0 || decoded.height() == 0 {
            return Err(ExtractionError::Decode("image has a zero dimension".to_string()));
        }

        Ok(decoded.to_rgb8())
    }
}
