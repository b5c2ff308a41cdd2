//! Calls to the hosted embeddings/completions API.

pub mod completion;
pub mod embeddings;
pub mod team;
