//! External enrichment providers - lyrics search and sentiment inference.
//!
//! # Architecture
//!
//! This module follows a clean separation between:
//! - **Domain types** (`domain.rs`) - Error taxonomy shared by every provider
//! - **API DTOs** (`genius/dto.rs`, `huggingface/dto.rs`) - Exact API response shapes
//! - **Adapters** - Convert DTOs (and page markup) to domain values
//! - **Clients** - HTTP clients for the external APIs
//! - **Traits** (`traits.rs`) - Provider seams used by the pipeline stages
//!
//! Clients never retry. Retry policy belongs to the caller (see [`crate::retry`]).

pub mod domain;
pub mod genius;
pub mod huggingface;
pub mod traits;

pub use domain::{LyricsError, ProviderFault, SentimentError};
pub use genius::GeniusClient;
pub use huggingface::HuggingFaceClient;
pub use traits::{LyricsProvider, SentimentProvider};
