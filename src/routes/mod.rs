pub mod portrait_extract;
pub mod root;
