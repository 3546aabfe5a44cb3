//! Store-plus-sink handle used by the console and the binary.

/// Library handle with explicit commit step.
pub mod library;
