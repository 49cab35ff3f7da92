//! Result normalization — the boundary where "anything might be missing"
//! becomes "everything is present with a default".

pub mod normalizer;
pub mod types;

pub use normalizer::normalize;
pub use types::*;
