use bytes::Bytes;
use serde::Serialize;
use crate::error::errors::{ErrorCode, ExtractionError};
use crate::pipeline::model_config::config::PortraitFormat;
use crate::pipeline::portrait_pipeline::portrait_pipeline::ExtractedPortrait;

#[derive(Clone)]
pub struct PortraitExtractionInput {
    pub im_bytes: Bytes,
    pub request_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PortraitExtractionOutput {
    pub portrait_base64: String,
    pub portrait_format: PortraitFormat,
    pub width: u32,
    pub height: u32,
}

/// Outcome of one extraction. Failures carry the caller-facing message and code.
#[derive(Debug, Clone)]
pub enum ExtractionResult {
    Success(PortraitExtractionOutput),
    Failure { message: String, code: ErrorCode },
}

impl From<ExtractedPortrait> for ExtractionResult {
    fn from(portrait: ExtractedPortrait) -> Self {
        ExtractionResult::Success(PortraitExtractionOutput {
            portrait_base64: portrait.portrait_base64,
            portrait_format: portrait.format,
            width: portrait.width,
            height: portrait.height,
        })
    }
}

impl From<ExtractionError> for ExtractionResult {
    fn from(err: ExtractionError) -> Self {
        ExtractionResult::Failure {
            message: err.public_message().to_string(),
            code: err.error_code(),
        }
    }
}
