use std::io::Cursor;
use std::sync::Arc;
use image::{ImageFormat, Rgb, RgbImage};
use crate::pipeline::cascade::haar_cascade::HaarCascade;
use crate::pipeline::model_config::config::FaceDetectionConfig;
use crate::pipeline::module::face_detection::{FaceDetector, HaarCascadeDetector};
use crate::pipeline::portrait_pipeline::portrait_pipeline::PortraitPipeline;

/// One-feature cascade that fires on a bright square filling the middle of a dark window.
pub const SQUARE_CASCADE_XML: &str = include_str!("../../../test_data/square_cascade.xml");

pub fn square_detector() -> Arc<dyn FaceDetector> {
    let cascade = HaarCascade::from_xml(SQUARE_CASCADE_XML).expect("test cascade must parse");
    Arc::new(HaarCascadeDetector::new(Arc::new(cascade), FaceDetectionConfig::new()))
}

pub fn square_pipeline() -> PortraitPipeline {
    PortraitPipeline::new(square_detector())
}

/// Black canvas with white squares given as `(x, y, side)`.
pub fn canvas_with_squares(width: u32, height: u32, squares: &[(u32, u32, u32)]) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let inside = squares
            .iter()
            .any(|&(sx, sy, side)| x >= sx && x < sx + side && y >= sy && y < sy + side);
        if inside { Rgb([255, 255, 255]) } else { Rgb([0, 0, 0]) }
    })
}

pub fn encode_png(image: &RgbImage) -> Vec<u8> {
    let mut buffer = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .expect("png encoding must succeed");
    buffer
}
