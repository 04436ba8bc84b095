pub mod encoding;
pub mod enhancement;
pub mod face_detection;
pub mod face_selection;
pub mod image_decoding;
pub mod preprocessing;
pub mod region_extraction;
