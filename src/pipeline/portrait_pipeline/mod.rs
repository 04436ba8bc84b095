pub mod portrait_pipeline;
