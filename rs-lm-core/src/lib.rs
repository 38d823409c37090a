//! Unsmoothed character-level language modeling library.
//!
//! This crate provides a maximum-likelihood character model including:
//! - Corpus preprocessing (padding and concatenation into one training stream)
//! - Single-pass frequency training, with internal parallel counting
//! - Stochastic sequence generation with an injected random source
//! - Perplexity scoring of held-out corpora
//!
//! Only the high-level API is exposed publicly. Low-level components
//! are kept internal to ensure consistency and prevent misuse.

/// Core language model, generation and evaluation logic.
///
/// This module exposes the high-level model interface while keeping
/// internal count accumulation private.
pub mod model;

/// I/O utilities (file loading, path helpers).
///
/// Not exposed
pub(crate) mod io;
