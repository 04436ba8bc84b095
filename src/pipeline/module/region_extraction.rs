use image::{imageops, RgbImage};
use crate::error::errors::ExtractionError;
use crate::pipeline::processing::rect::Rect;

/// Crops the selected face out of the original color image, widened to take in hair and shoulders.
#[derive(Debug, Clone)]
pub struct RegionExtraction {
    margin_x_ratio: f32,
    margin_y_ratio: f32,
}

impl RegionExtraction {
    pub fn new(margin_x_ratio: f32, margin_y_ratio: f32) -> Self {
        RegionExtraction {
            margin_x_ratio,
            margin_y_ratio,
        }
    }

    pub fn region(&self, face: &Rect, image_width: u32, image_height: u32) -> Rect {
        let margin_x = (face.width as f32 * self.margin_x_ratio) as u32;
        let margin_y = (face.height as f32 * self.margin_y_ratio) as u32;

        face.expand(margin_x, margin_y, image_width, image_height)
    }

    pub fn call(&self, image: &RgbImage, face: Rect) -> Result<RgbImage, ExtractionError> {
        let (width, height) = image.dimensions();
        let region = self.region(&face, width, height);

        if region.is_empty() {
            return Err(ExtractionError::Crop(format!(
                "face {:?} does not intersect a {}x{} image",
                face, width, height
            )));
        }

        Ok(imageops::crop_imm(image, region.x, region.y, region.width, region.height).to_image())
    }
}


#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage};
    use crate::error::errors::ExtractionError;
    use crate::pipeline::model_config::config::RegionExtractionConfig;
    use crate::pipeline::module::region_extraction::RegionExtraction;
    use crate::pipeline::processing::rect::Rect;

    fn region_extraction() -> RegionExtraction {
        let cfg = RegionExtractionConfig::new();
        RegionExtraction::new(cfg.margin_x_ratio, cfg.margin_y_ratio)
    }

    #[test]
    fn test_region_adds_margin() {
        let region = region_extraction().region(&Rect::new(100, 100, 50, 60), 400, 400);

        // 30% of 50 horizontally, 40% of 60 vertically.
        assert_eq!(region, Rect::new(85, 76, 80, 108));
    }

    #[test]
    fn test_region_clamps_to_bounds() {
        let region = region_extraction().region(&Rect::new(5, 5, 100, 100), 120, 110);

        assert_eq!(region, Rect::new(0, 0, 120, 110));
    }

    #[test]
    fn test_crop_uses_color_pixels() {
        let image = RgbImage::from_fn(100, 80, |x, _| if x < 50 { Rgb([200, 30, 30]) } else { Rgb([30, 30, 200]) });
        let cropped = region_extraction().call(&image, Rect::new(10, 20, 20, 20)).unwrap();

        assert_eq!(cropped.dimensions(), (32, 36));
        assert_eq!(cropped.get_pixel(0, 0).0, [200, 30, 30]);
    }

    #[test]
    fn test_crop_outside_image_fails() {
        let image = RgbImage::new(50, 50);
        let result = region_extraction().call(&image, Rect::new(80, 80, 10, 10));

        assert!(matches!(result, Err(ExtractionError::Crop(_))));
    }
}
