//! AI campaign analysis pipeline.
//!
//! The pipeline runs in fixed stages: [`context`] assembles the bounded input,
//! [`prompt`] renders it deterministically, [`engine`] calls the model through
//! the [`engine::GenerativeModel`] seam ([`gemini`] is the production
//! implementation), [`output`] parses and validates the reply, and [`service`]
//! orchestrates the whole flow including authorization, rate limiting and
//! persistence.

pub mod context;
pub mod engine;
pub mod gemini;
pub mod output;
pub mod prompt;
pub mod service;
