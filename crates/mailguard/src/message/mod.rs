//! Message normalization.

pub mod normalizer;
pub mod record;

pub use normalizer::MessageNormalizer;
pub use record::{MessageRecord, RawMessage};
