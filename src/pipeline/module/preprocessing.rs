use image::{imageops, GrayImage, Luma, RgbImage};

const HIST_SIZE: usize = 256;

/// Grayscale conversion followed by contrast limited adaptive histogram equalization.
#[derive(Debug, Clone)]
pub struct Preprocessing {
    clip_limit: f32,
    tile_grid: (u32, u32),
}

struct TileLayout {
    tile_width: u32,
    tile_height: u32,
    tiles_x: u32,
    tiles_y: u32,
}

impl TileLayout {
    fn new(width: u32, height: u32, grid: (u32, u32)) -> Self {
        let (tile_width, tiles_x) = Self::split(width, grid.0);
        let (tile_height, tiles_y) = Self::split(height, grid.1);
        TileLayout {
            tile_width,
            tile_height,
            tiles_x,
            tiles_y,
        }
    }

    // Last tile absorbs the remainder; never produces an empty tile.
    fn split(length: u32, requested: u32) -> (u32, u32) {
        let requested = requested.clamp(1, length);
        let tile = length.div_ceil(requested);
        (tile, length.div_ceil(tile))
    }
}

impl Preprocessing {
    pub fn new(clip_limit: f32, tile_grid: (u32, u32)) -> Self {
        Preprocessing {
            clip_limit,
            tile_grid,
        }
    }

    pub fn call(&self, image: &RgbImage) -> GrayImage {
        let gray = imageops::grayscale(image);
        self.equalize(&gray)
    }

    fn tile_lut(&self, gray: &GrayImage, x0: u32, y0: u32, width: u32, height: u32) -> [u8; HIST_SIZE] {
        let mut hist = [0u32; HIST_SIZE];
        for y in y0..y0 + height {
            for x in x0..x0 + width {
                hist[gray.get_pixel(x, y)[0] as usize] += 1;
            }
        }

        let tile_area = width * height;
        if self.clip_limit > 0.0 {
            let clip = ((self.clip_limit * tile_area as f32 / HIST_SIZE as f32) as u32).max(1);

            let mut clipped = 0u32;
            for bin in hist.iter_mut() {
                if *bin > clip {
                    clipped += *bin - clip;
                    *bin = clip;
                }
            }

            let redist_batch = clipped / HIST_SIZE as u32;
            let mut residual = clipped - redist_batch * HIST_SIZE as u32;
            for bin in hist.iter_mut() {
                *bin += redist_batch;
            }

            if residual > 0 {
                let residual_step = (HIST_SIZE as u32 / residual).max(1) as usize;
                let mut i = 0;
                while i < HIST_SIZE && residual > 0 {
                    hist[i] += 1;
                    i += residual_step;
                    residual -= 1;
                }
            }
        }

        let lut_scale = 255.0 / tile_area as f32;
        let mut lut = [0u8; HIST_SIZE];
        let mut cumulative = 0u32;
        for (i, bin) in hist.iter().enumerate() {
            cumulative += bin;
            lut[i] = (cumulative as f32 * lut_scale).round().min(255.0) as u8;
        }
        lut
    }

    fn equalize(&self, gray: &GrayImage) -> GrayImage {
        let (width, height) = gray.dimensions();
        if width == 0 || height == 0 {
            return gray.clone();
        }

        let layout = TileLayout::new(width, height, self.tile_grid);

        let mut luts = Vec::with_capacity((layout.tiles_x * layout.tiles_y) as usize);
        for ty in 0..layout.tiles_y {
            for tx in 0..layout.tiles_x {
                let x0 = tx * layout.tile_width;
                let y0 = ty * layout.tile_height;
                let tile_w = layout.tile_width.min(width - x0);
                let tile_h = layout.tile_height.min(height - y0);
                luts.push(self.tile_lut(gray, x0, y0, tile_w, tile_h));
            }
        }

        let lut_at = |tx: u32, ty: u32| &luts[(ty * layout.tiles_x + tx) as usize];
        let inv_tw = 1.0 / layout.tile_width as f32;
        let inv_th = 1.0 / layout.tile_height as f32;

        GrayImage::from_fn(width, height, |x, y| {
            let value = gray.get_pixel(x, y)[0] as usize;

            let tyf = y as f32 * inv_th - 0.5;
            let ty1 = tyf.floor();
            let ya = tyf - ty1;
            let ty2 = ((ty1 as i64 + 1).min(layout.tiles_y as i64 - 1)).max(0) as u32;
            let ty1 = (ty1 as i64).max(0) as u32;

            let txf = x as f32 * inv_tw - 0.5;
            let tx1 = txf.floor();
            let xa = txf - tx1;
            let tx2 = ((tx1 as i64 + 1).min(layout.tiles_x as i64 - 1)).max(0) as u32;
            let tx1 = (tx1 as i64).max(0) as u32;

            let top = lut_at(tx1, ty1)[value] as f32 * (1.0 - xa) + lut_at(tx2, ty1)[value] as f32 * xa;
            let bottom = lut_at(tx1, ty2)[value] as f32 * (1.0 - xa) + lut_at(tx2, ty2)[value] as f32 * xa;
            let result = top * (1.0 - ya) + bottom * ya;

            Luma([result.round().clamp(0.0, 255.0) as u8])
        })
    }
}


#[cfg(test)]
mod tests {
    use image::{GrayImage, Luma, Rgb, RgbImage};
    use crate::pipeline::model_config::config::PreprocessingConfig;
    use crate::pipeline::module::preprocessing::Preprocessing;
    use crate::pipeline::utils::test_utils::canvas_with_squares;

    fn preprocessing() -> Preprocessing {
        let cfg = PreprocessingConfig::new();
        Preprocessing::new(cfg.clip_limit, cfg.tile_grid)
    }

    #[test]
    fn test_output_keeps_dimensions() {
        let image = RgbImage::from_pixel(37, 23, Rgb([90, 120, 200]));
        let gray = preprocessing().call(&image);

        assert_eq!(gray.dimensions(), (37, 23));
    }

    #[test]
    fn test_uniform_stays_uniform() {
        let image = RgbImage::from_pixel(64, 48, Rgb([128, 128, 128]));
        let gray = preprocessing().call(&image);

        let first = gray.get_pixel(0, 0)[0];
        assert!(gray.pixels().all(|p| p[0] == first));
    }

    #[test]
    fn test_preserves_ordering_of_bright_target() {
        let image = canvas_with_squares(160, 120, &[(60, 40, 40)]);
        let gray = preprocessing().call(&image);

        assert_eq!(gray.get_pixel(80, 60)[0], 255);
        assert!(gray.get_pixel(5, 5)[0] < 64);
    }

    #[test]
    fn test_stretches_low_contrast() {
        let gray_input = GrayImage::from_fn(64, 64, |x, _| Luma([100 + (x % 8) as u8]));
        let equalized = preprocessing().equalize(&gray_input);

        let (min, max) = equalized
            .pixels()
            .fold((255u8, 0u8), |(lo, hi), p| (lo.min(p[0]), hi.max(p[0])));
        assert!(max - min > 7);
    }

    #[test]
    fn test_handles_images_smaller_than_grid() {
        let image = RgbImage::from_pixel(3, 2, Rgb([10, 10, 10]));
        let gray = preprocessing().call(&image);

        assert_eq!(gray.dimensions(), (3, 2));
    }

    #[test]
    fn test_does_not_mutate_input() {
        let image = canvas_with_squares(32, 32, &[(8, 8, 8)]);
        let before = image.clone();
        let _ = preprocessing().call(&image);

        assert_eq!(image, before);
    }
}
