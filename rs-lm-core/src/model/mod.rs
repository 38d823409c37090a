//! Top-level module for the character language model system.
//!
//! This module provides an unsmoothed character-level language model, including:
//! - Corpus preprocessing into a padded training stream (`stream`)
//! - Frequency training over a sliding window (`LanguageModel`)
//! - Stochastic sequence generation (`generator`)
//! - Perplexity evaluation of held-out text (`perplexity`)

/// Typed errors shared by training, generation and evaluation.
pub mod error;

/// Stochastic sequence generation from a trained model.
///
/// Walks a rolling history window and samples each next character
/// from the model using an injected random source.
pub mod generator;

/// Trained model: per-history next-character distributions.
///
/// Handles training (sequential or internally parallel), history lookup,
/// and binary persistence of trained models.
pub mod language_model;

/// Perplexity scoring of a held-out corpus against a trained model.
pub mod perplexity;

/// Corpus preprocessing: padding and concatenation into one stream.
pub mod stream;

/// Internal count accumulation (per-history transition counts).
///
/// Tracks raw occurrence counts and supports additive merging
/// (ex. parallel training support). This module is not exposed publicly.
mod counts;
