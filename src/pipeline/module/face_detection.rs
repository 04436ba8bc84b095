use std::borrow::Cow;
use std::sync::Arc;
use image::imageops::{self, FilterType};
use image::GrayImage;
use log::debug;
use crate::pipeline::cascade::haar_cascade::HaarCascade;
use crate::pipeline::cascade::integral::IntegralImages;
use crate::pipeline::model_config::config::FaceDetectionConfig;
use crate::pipeline::processing::grouping::group_rectangles;
use crate::pipeline::processing::rect::Rect;

const MIN_SCALE_FACTOR: f64 = 1.01;

/// Pluggable face detection strategy.
///
/// Implementations receive the preprocessed grayscale image and return every
/// candidate face rectangle in its coordinates. An empty result means no face.
pub trait FaceDetector: Send + Sync {
    fn detect(&self, gray: &GrayImage) -> Vec<Rect>;
}

/// Multi-scale sliding-window detector evaluating a boosted Haar cascade.
#[derive(Debug, Clone)]
pub struct HaarCascadeDetector {
    cascade: Arc<HaarCascade>,
    scale_factor: f64,
    min_neighbors: usize,
    min_size: (u32, u32),
    group_eps: f64,
}

impl HaarCascadeDetector {
    pub fn new(cascade: Arc<HaarCascade>, cfg: FaceDetectionConfig) -> Self {
        HaarCascadeDetector {
            cascade,
            scale_factor: cfg.scale_factor.max(MIN_SCALE_FACTOR),
            min_neighbors: cfg.min_neighbors,
            min_size: cfg.min_size,
            group_eps: cfg.group_eps,
        }
    }

    /// Every window accepted by the full cascade, before grouping.
    fn detect_windows(&self, gray: &GrayImage) -> Vec<Rect> {
        let (img_w, img_h) = gray.dimensions();
        let (win_w, win_h) = self.cascade.window_size();
        let mut hits = Vec::new();
        let mut factor = 1.0f64;

        loop {
            let window_w = (win_w as f64 * factor).round() as u32;
            let window_h = (win_h as f64 * factor).round() as u32;
            let scaled_w = (img_w as f64 / factor).round() as u32;
            let scaled_h = (img_h as f64 / factor).round() as u32;

            if scaled_w < win_w || scaled_h < win_h || window_w > img_w || window_h > img_h {
                break;
            }

            if window_w >= self.min_size.0 && window_h >= self.min_size.1 {
                let scaled: Cow<GrayImage> = if scaled_w == img_w && scaled_h == img_h {
                    Cow::Borrowed(gray)
                } else {
                    Cow::Owned(imageops::resize(gray, scaled_w, scaled_h, FilterType::Triangle))
                };
                let integrals = IntegralImages::new(&scaled);
                let step = if factor > 2.0 { 1 } else { 2 };

                for y in (0..=scaled_h - win_h).step_by(step) {
                    for x in (0..=scaled_w - win_w).step_by(step) {
                        if self.cascade.evaluate(&integrals, x, y) {
                            let rect = Rect::new(
                                (x as f64 * factor).round() as u32,
                                (y as f64 * factor).round() as u32,
                                window_w,
                                window_h,
                            );
                            hits.push(rect.clamp_to(img_w, img_h));
                        }
                    }
                }
            }

            factor *= self.scale_factor;
        }

        hits
    }
}

impl FaceDetector for HaarCascadeDetector {
    fn detect(&self, gray: &GrayImage) -> Vec<Rect> {
        let windows = self.detect_windows(gray);
        let faces = group_rectangles(&windows, self.min_neighbors, self.group_eps);
        debug!("cascade accepted {} windows, grouped into {} faces", windows.len(), faces.len());
        faces
    }
}


#[cfg(test)]
mod tests {
    use image::{GrayImage, Luma, Rgb, RgbImage};
    use crate::pipeline::model_config::config::PreprocessingConfig;
    use crate::pipeline::module::preprocessing::Preprocessing;
    use crate::pipeline::utils::test_utils::{canvas_with_squares, square_detector};

    fn preprocess(image: &RgbImage) -> GrayImage {
        let cfg = PreprocessingConfig::new();
        Preprocessing::new(cfg.clip_limit, cfg.tile_grid).call(image)
    }

    #[test]
    fn test_detects_single_target() {
        let gray = preprocess(&canvas_with_squares(320, 240, &[(130, 90, 60)]));
        let faces = square_detector().detect(&gray);

        assert!(faces.iter().any(|f| f.contains_point(160, 120)), "no face covers the target: {:?}", faces);
        for face in &faces {
            assert!(face.right() <= 320 && face.bottom() <= 240);
        }
    }

    #[test]
    fn test_blank_canvas_has_no_faces() {
        let gray = preprocess(&RgbImage::from_pixel(320, 240, Rgb([200, 200, 200])));
        assert!(square_detector().detect(&gray).is_empty());
    }

    #[test]
    fn test_image_smaller_than_window() {
        let gray = GrayImage::from_pixel(20, 20, Luma([0]));
        assert!(square_detector().detect(&gray).is_empty());
    }

    #[test]
    fn test_detects_targets_of_different_size() {
        let gray = preprocess(&canvas_with_squares(640, 480, &[(60, 60, 40), (400, 250, 100)]));
        let faces = square_detector().detect(&gray);

        assert!(faces.iter().any(|f| f.contains_point(80, 80)));
        assert!(faces.iter().any(|f| f.contains_point(450, 300)));
    }
}
