pub mod grouping;
pub mod rect;
