use std::sync::Arc;
use log::debug;
use crate::error::errors::ExtractionError;
use crate::pipeline::model_config::config::{EncodingConfig, EnhancementConfig, PortraitFormat, PreprocessingConfig, RegionExtractionConfig};
use crate::pipeline::module::encoding::Encoding;
use crate::pipeline::module::enhancement::Enhancement;
use crate::pipeline::module::face_detection::FaceDetector;
use crate::pipeline::module::face_selection::FaceSelection;
use crate::pipeline::module::image_decoding::ImageDecoding;
use crate::pipeline::module::preprocessing::Preprocessing;
use crate::pipeline::module::region_extraction::RegionExtraction;
use crate::pipeline::processing::rect::Rect;

#[derive(Clone)]
pub struct PortraitPipeline {
    image_decoding: ImageDecoding,
    preprocessing: Preprocessing,
    face_detection: Arc<dyn FaceDetector>,
    face_selection: FaceSelection,
    region_extraction: RegionExtraction,
    enhancement: Enhancement,
    encoding: Encoding,
}

#[derive(Debug, Clone)]
pub struct ExtractedPortrait {
    pub portrait_base64: String,
    pub format: PortraitFormat,
    pub width: u32,
    pub height: u32,
    pub face_region: Rect,
    pub face_count: usize,
}

impl PortraitPipeline {
    /// Build the pipeline around an already loaded detector. The detector is shared read-only.
    pub fn new(face_detection: Arc<dyn FaceDetector>) -> Self {
        let preprocessing_cfg = PreprocessingConfig::new();
        let region_extraction_cfg = RegionExtractionConfig::new();
        let enhancement_cfg = EnhancementConfig::new();
        let encoding_cfg = EncodingConfig::new();

        PortraitPipeline {
            image_decoding: ImageDecoding::new(),
            preprocessing: Preprocessing::new(preprocessing_cfg.clip_limit, preprocessing_cfg.tile_grid),
            face_detection,
            face_selection: FaceSelection::new(),
            region_extraction: RegionExtraction::new(
                region_extraction_cfg.margin_x_ratio,
                region_extraction_cfg.margin_y_ratio,
            ),
            enhancement: Enhancement::new(
                enhancement_cfg.output_size,
                enhancement_cfg.sharpen_sigma,
                enhancement_cfg.sharpen_threshold,
                enhancement_cfg.background,
            ),
            encoding: Encoding::new(encoding_cfg.format, encoding_cfg.quality),
        }
    }

    /// Decode, detect, crop, enhance and encode. Synchronous and CPU-bound.
    pub fn extract(&self, im_bytes: &[u8]) -> Result<ExtractedPortrait, ExtractionError> {
        let image = self.image_decoding.call(im_bytes)?;
        debug!("decoded image {}x{}", image.width(), image.height());

        let gray = self.preprocessing.call(&image);

        let faces = self.face_detection.detect(&gray);
        drop(gray);

        let face_region = match self.face_selection.call(&faces) {
            Some(face_region) => face_region,
            None => return Err(ExtractionError::NoFaceDetected),
        };
        debug!("selected face {:?} out of {} candidates", face_region, faces.len());

        let cropped = self.region_extraction.call(&image, face_region)?;
        drop(image);
        debug!(
            "enhancing {}x{} crop onto {:?} canvas",
            cropped.width(), cropped.height(), self.enhancement.output_size()
        );

        let enhanced = self.enhancement.call(&cropped);
        let portrait_base64 = self.encoding.call(&enhanced)?;

        Ok(ExtractedPortrait {
            portrait_base64,
            format: self.encoding.format(),
            width: enhanced.width(),
            height: enhanced.height(),
            face_region,
            face_count: faces.len(),
        })
    }
}
