//! Hugging Face Inference integration
//!
//! Text classification against a hosted model, returning a label/score
//! distribution for a piece of text.
//!
//! API docs: https://huggingface.co/docs/inference-providers/tasks/text-classification

pub mod dto;
mod adapter;
mod client;

pub use adapter::to_scores;
pub use client::{DEFAULT_ENDPOINT, DEFAULT_MODEL, HuggingFaceClient};
