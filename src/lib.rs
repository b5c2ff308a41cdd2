//! # talent-scout
//!
//! A recruiting assistant. Candidate profiles are embedded through a hosted
//! embeddings API and stored in a hosted vector index. At query time the
//! recruiter's request is embedded, the nearest candidates are fetched from
//! the index and joined back onto the local candidates file, and a chat
//! model assembles a diverse team from that pool.
//!
//! ```text
//!   candidates.json ──► import ──► embeddings API ──► vector index
//!
//!   request ──► embeddings API ──► vector index (top-k ids)
//!                                        │
//!                          join onto candidates.json
//!                                        │
//!                                        ▼
//!                            chat model: pick a team of 5
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration for server, provider, index and importer
//! - [`models`] - Shared data types: `Candidate`, request/response and import job types
//! - [`candidates`] - Loads the candidates file and joins index results back onto it
//! - [`index`] - `VectorIndex` trait with the hosted (Pinecone) and local backends
//! - [`llm::embeddings`] - Batch embedding generation via OpenAI-compatible or Ollama APIs
//! - [`llm::completion`] - Single non-streaming chat completion
//! - [`llm::team`] - Team selection prompt, reply parsing and pool validation
//! - [`import`] - Sequential batch importer with per-item failure accounting
//! - [`search`] - Similar-candidate retrieval and team assembly pipeline
//! - [`api`] - Axum HTTP handlers
//! - [`state`] - Shared application state and import job persistence

pub mod api;
pub mod candidates;
pub mod config;
pub mod import;
pub mod index;
pub mod llm;
pub mod models;
pub mod search;
pub mod state;
