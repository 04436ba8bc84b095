use std::sync::Arc;
use crate::pipeline::portrait_pipeline::portrait_pipeline::PortraitPipeline;
use crate::service::portrait_service::PortraitService;

#[derive(Clone)]
pub struct PortraitState {
    pub portrait_service: PortraitService,
}

impl PortraitState {
    pub fn new(pipeline: &Arc<PortraitPipeline>) -> Self {
        Self {
            portrait_service: PortraitService::new(pipeline),
        }
    }
}
