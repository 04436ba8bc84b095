use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};

#[derive(Debug, Clone)]
pub struct Enhancement {
    output_size: (u32, u32),
    sharpen_sigma: f32,
    sharpen_threshold: i32,
    background: [u8; 3],
}

impl Enhancement {
    pub fn new(output_size: (u32, u32), sharpen_sigma: f32, sharpen_threshold: i32, background: [u8; 3]) -> Self {
        Enhancement {
            output_size,
            sharpen_sigma,
            sharpen_threshold,
            background,
        }
    }

    pub fn output_size(&self) -> (u32, u32) {
        self.output_size
    }

    /// Size of the scaled crop inside the output canvas.
    fn fitted_size(&self, width: u32, height: u32) -> (u32, u32) {
        let (target_w, target_h) = self.output_size;
        let aspect_ratio = width as f64 / height as f64;
        let target_aspect = target_w as f64 / target_h as f64;

        if aspect_ratio > target_aspect {
            let new_h = (target_w as f64 / aspect_ratio) as u32;
            (target_w, new_h.clamp(1, target_h))
        } else {
            let new_w = (target_h as f64 * aspect_ratio) as u32;
            (new_w.clamp(1, target_w), target_h)
        }
    }

    fn letterbox(&self, image: &RgbImage) -> RgbImage {
        let (target_w, target_h) = self.output_size;
        let (new_w, new_h) = self.fitted_size(image.width(), image.height());

        let resized = imageops::resize(image, new_w, new_h, FilterType::CatmullRom);

        let mut canvas = RgbImage::from_pixel(target_w, target_h, Rgb(self.background));
        let x_offset = (target_w - new_w) / 2;
        let y_offset = (target_h - new_h) / 2;
        imageops::overlay(&mut canvas, &resized, x_offset as i64, y_offset as i64);

        canvas
    }

    /// Unsharp mask, then fit onto the fixed-size canvas preserving aspect ratio.
    pub fn call(&self, image: &RgbImage) -> RgbImage {
        let sharpened = imageops::unsharpen(image, self.sharpen_sigma, self.sharpen_threshold);
        self.letterbox(&sharpened)
    }
}


#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage};
    use crate::pipeline::model_config::config::EnhancementConfig;
    use crate::pipeline::module::enhancement::Enhancement;

    fn enhancement() -> Enhancement {
        let cfg = EnhancementConfig::new();
        Enhancement::new(cfg.output_size, cfg.sharpen_sigma, cfg.sharpen_threshold, cfg.background)
    }

    #[test]
    fn test_fitted_size() {
        let enhancement = enhancement();

        assert_eq!(enhancement.fitted_size(600, 800), (300, 400));
        assert_eq!(enhancement.fitted_size(200, 100), (300, 150));
        assert_eq!(enhancement.fitted_size(100, 400), (100, 400));
        assert_eq!(enhancement.fitted_size(5000, 1), (300, 1));
    }

    #[test]
    fn test_output_is_fixed_size() {
        let enhancement = enhancement();
        for (w, h) in [(50, 50), (120, 90), (33, 200), (1, 1)] {
            let image = RgbImage::from_pixel(w, h, Rgb([90, 60, 30]));
            assert_eq!(enhancement.call(&image).dimensions(), (300, 400));
        }
    }

    #[test]
    fn test_letterbox_background() {
        let image = RgbImage::from_pixel(200, 100, Rgb([0, 0, 0]));
        let output = enhancement().call(&image);

        // 300x150 band centered vertically, white above and below.
        assert_eq!(output.get_pixel(150, 10).0, [255, 255, 255]);
        assert_eq!(output.get_pixel(150, 200).0, [0, 0, 0]);
        assert_eq!(output.get_pixel(150, 390).0, [255, 255, 255]);
    }

    #[test]
    fn test_sharpening_increases_edge_contrast() {
        let image = RgbImage::from_fn(300, 400, |x, _| if x < 150 { Rgb([100, 100, 100]) } else { Rgb([160, 160, 160]) });
        let output = enhancement().call(&image);

        assert!(output.get_pixel(149, 200)[0] < 100);
        assert!(output.get_pixel(150, 200)[0] > 160);
    }
}
