pub mod cascade;
pub mod model_config;
pub mod module;
pub mod portrait_pipeline;
pub mod processing;
pub mod utils;
