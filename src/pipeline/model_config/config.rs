use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum PortraitFormat {
    #[serde(rename = "JPEG")]
    Jpeg,
}

impl PortraitFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            PortraitFormat::Jpeg => "JPEG",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PreprocessingConfig {
    pub clip_limit: f32,
    pub tile_grid: (u32, u32),
}

impl PreprocessingConfig {
    pub fn new() -> Self {
        PreprocessingConfig {
            clip_limit: 2.0,
            tile_grid: (8, 8),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FaceDetectionConfig {
    pub scale_factor: f64,
    pub min_neighbors: usize,
    pub min_size: (u32, u32),
    pub group_eps: f64,
}

impl FaceDetectionConfig {
    pub fn new() -> Self {
        FaceDetectionConfig {
            scale_factor: 1.1,
            min_neighbors: 5,
            min_size: (30, 30),
            group_eps: 0.2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegionExtractionConfig {
    pub margin_x_ratio: f32,
    pub margin_y_ratio: f32,
}

impl RegionExtractionConfig {
    pub fn new() -> Self {
        RegionExtractionConfig {
            margin_x_ratio: 0.3,
            margin_y_ratio: 0.4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnhancementConfig {
    pub output_size: (u32, u32),
    pub sharpen_sigma: f32,
    pub sharpen_threshold: i32,
    pub background: [u8; 3],
}

impl EnhancementConfig {
    pub fn new() -> Self {
        EnhancementConfig {
            output_size: (300, 400),
            sharpen_sigma: 1.0,
            sharpen_threshold: 3,
            background: [255, 255, 255],
        }
    }
}

#[derive(Debug, Clone)]
pub struct EncodingConfig {
    pub format: PortraitFormat,
    pub quality: u8,
}

impl EncodingConfig {
    pub fn new() -> Self {
        EncodingConfig {
            format: PortraitFormat::Jpeg,
            quality: 95,
        }
    }
}
