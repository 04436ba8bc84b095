use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use crate::error::errors::ExtractionError;
use crate::pipeline::model_config::config::PortraitFormat;

#[derive(Debug, Clone)]
pub struct Encoding {
    format: PortraitFormat,
    quality: u8,
}

impl Encoding {
    pub fn new(format: PortraitFormat, quality: u8) -> Self {
        Encoding { format, quality }
    }

    pub fn format(&self) -> PortraitFormat {
        self.format
    }

    fn compress(&self, image: &RgbImage) -> Result<Vec<u8>, ExtractionError> {
        let mut buffer = Vec::new();
        match self.format {
            PortraitFormat::Jpeg => {
                let encoder = JpegEncoder::new_with_quality(&mut buffer, self.quality);
                if let Err(e) = encoder.write_image(image.as_raw(), image.width(), image.height(), ExtendedColorType::Rgb8) {
                    return Err(ExtractionError::Encode(e.to_string()));
                }
            }
        }
        Ok(buffer)
    }

    /// Compress and wrap as standard base64 for JSON transport.
    pub fn call(&self, image: &RgbImage) -> Result<String, ExtractionError> {
        let compressed = self.compress(image)?;
        Ok(STANDARD.encode(compressed))
    }
}
