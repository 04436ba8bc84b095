pub mod portrait_model;
