use std::sync::Arc;
use log::{error, info};
use crate::error::errors::{Error, ExtractionError};
use crate::models::portrait_model::{ExtractionResult, PortraitExtractionInput};
use crate::pipeline::portrait_pipeline::portrait_pipeline::PortraitPipeline;

#[derive(Clone)]
pub struct PortraitService {
    portrait_pipeline: Arc<PortraitPipeline>,
}

impl PortraitService {
    pub fn new(portrait_pipeline: &Arc<PortraitPipeline>) -> Self {
        PortraitService {
            portrait_pipeline: Arc::clone(portrait_pipeline),
        }
    }

    /// Runs the pipeline on the blocking pool. Only a panicked or cancelled task is an `Err`.
    pub async fn extract_portrait(&self, input: PortraitExtractionInput) -> Result<ExtractionResult, Error> {
        let pipeline = Arc::clone(&self.portrait_pipeline);
        let PortraitExtractionInput { im_bytes, request_id } = input;

        let outcome = tokio::task::spawn_blocking(move || pipeline.extract(&im_bytes))
            .await
            .map_err(|e| {
                error!("[{request_id}] extraction task failed: {e}");
                Error::server()
            })?;

        let result = match outcome {
            Ok(portrait) => {
                info!(
                    "[{}] extracted {} portrait from face {:?}, {} candidates",
                    request_id, portrait.format.as_str(), portrait.face_region, portrait.face_count
                );
                ExtractionResult::from(portrait)
            }
            Err(ExtractionError::NoFaceDetected) => {
                info!("[{request_id}] no face detected");
                ExtractionResult::from(ExtractionError::NoFaceDetected)
            }
            Err(e) => {
                error!("[{request_id}] failed to extract portrait: {e}");
                ExtractionResult::from(e)
            }
        };

        Ok(result)
    }
}
