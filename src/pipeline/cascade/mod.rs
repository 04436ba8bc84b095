pub mod haar_cascade;
pub mod integral;
