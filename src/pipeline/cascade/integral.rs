use image::{GrayImage, ImageBuffer, Luma};
use imageproc::integral_image::{integral_image, integral_squared_image};

type IntegralBuffer = ImageBuffer<Luma<u64>, Vec<u64>>;

/// Summed-area tables of a grayscale image and of its squared intensities.
pub struct IntegralImages {
    sum: IntegralBuffer,
    squared: IntegralBuffer,
}

impl IntegralImages {
    pub fn new(gray: &GrayImage) -> Self {
        IntegralImages {
            sum: integral_image::<_, u64>(gray),
            squared: integral_squared_image::<_, u64>(gray),
        }
    }

    fn lookup(table: &IntegralBuffer, x: u32, y: u32, width: u32, height: u32) -> u64 {
        let top_left = table.get_pixel(x, y)[0];
        let top_right = table.get_pixel(x + width, y)[0];
        let bottom_left = table.get_pixel(x, y + height)[0];
        let bottom_right = table.get_pixel(x + width, y + height)[0];

        (bottom_right + top_left) - (top_right + bottom_left)
    }

    /// Sum of pixel values in `[x, x + width) x [y, y + height)`.
    pub fn rect_sum(&self, x: u32, y: u32, width: u32, height: u32) -> u64 {
        Self::lookup(&self.sum, x, y, width, height)
    }

    pub fn rect_squared_sum(&self, x: u32, y: u32, width: u32, height: u32) -> u64 {
        Self::lookup(&self.squared, x, y, width, height)
    }
}


#[cfg(test)]
mod tests {
    use image::{GrayImage, Luma};
    use crate::pipeline::cascade::integral::IntegralImages;

    #[test]
    fn test_rect_sums() {
        let gray = GrayImage::from_fn(6, 4, |x, y| Luma([(x + y * 6) as u8]));
        let integrals = IntegralImages::new(&gray);

        assert_eq!(integrals.rect_sum(0, 0, 6, 4), (0..24).sum::<u64>());
        // pixels 7, 8, 13, 14
        assert_eq!(integrals.rect_sum(1, 1, 2, 2), 42);
        assert_eq!(integrals.rect_squared_sum(1, 1, 2, 2), 49 + 64 + 169 + 196);
        assert_eq!(integrals.rect_sum(5, 3, 1, 1), 23);
    }
}
