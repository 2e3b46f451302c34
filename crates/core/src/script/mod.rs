/// Serialization helpers for classified scripts and reports.
pub mod dump;
/// Trail script classifier: raw text into classified lines.
pub mod classifier;
/// Trail line types.
pub mod line;
