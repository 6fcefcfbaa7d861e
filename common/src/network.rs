pub mod host;
pub mod range;
