use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};

use super::error::ModelError;
use super::language_model::LanguageModel;
use super::stream;

/// How many window positions are scored between cancellation checks.
const CANCEL_CHECK_INTERVAL: usize = 1 << 16;

/// Scores a held-out corpus against a trained model.
///
/// Lower is better fit; a well-formed result is `>= 1.0`. See
/// [`perplexity_cancellable`] for the scoring policy and error cases.
pub fn perplexity<S: AsRef<str>>(
	model: &LanguageModel,
	test_documents: &[S],
) -> Result<f64, ModelError> {
	perplexity_cancellable(model, test_documents, &AtomicBool::new(false))
}

/// Scores a held-out corpus, checking a cooperative cancellation flag.
///
/// The test stream is built exactly like the training stream (each document
/// left-padded with `order` pad characters, then concatenated) and walked
/// with the same sliding window. For each history/next-character pair:
/// - history absent from the model: the position is skipped, contributing
///   nothing to the log-probability sum while still counting toward the
///   denominator;
/// - history present but the character was never observed after it: the
///   history is remembered, and after the scan `ln(1 / (mass + 1))` is
///   added exactly once per such history (not once per occurrence), where
///   `mass` is the sum of the history's stored distribution values (1.0 up
///   to rounding, so the correction is `ln(1/2)` per affected history);
/// - history present and the character observed: `ln(probability)` is added.
///
/// The result is `exp(-log_sum / stream_len)` where `stream_len` is the full
/// padded test stream length, pad characters included.
///
/// Unseen histories and unseen continuations never fail scoring; they are
/// recoverable by the policy above.
///
/// # Errors
/// - `ModelError::EmptyCorpus` if `test_documents` is empty.
/// - `ModelError::Cancelled` if `cancel` is raised while scanning. The flag
///   is checked every `CANCEL_CHECK_INTERVAL` positions, so cancellation
///   of very large corpora takes effect promptly but is not instantaneous.
pub fn perplexity_cancellable<S: AsRef<str>>(
	model: &LanguageModel,
	test_documents: &[S],
	cancel: &AtomicBool,
) -> Result<f64, ModelError> {
	if test_documents.is_empty() {
		return Err(ModelError::EmptyCorpus);
	}

	let order = model.order();
	let test_stream = stream::pad_stream(test_documents, order)?;
	let stream_len = test_stream.len();

	let mut log_sum = 0.0_f64;
	// Histories whose observed continuation was never seen in training.
	// Ordered so the correction below sums in a reproducible order.
	let mut unknown_outcomes: BTreeSet<String> = BTreeSet::new();

	for (position, window) in test_stream.windows(order + 1).enumerate() {
		if position % CANCEL_CHECK_INTERVAL == 0 && cancel.load(Ordering::Relaxed) {
			return Err(ModelError::Cancelled);
		}

		let history: String = window[..order].iter().collect();
		let next_char = window[order];

		let Some(distribution) = model.distribution(&history) else {
			// Unknown history: skipped, but still part of the denominator.
			continue;
		};

		match distribution.prob(next_char) {
			Some(probability) => log_sum += probability.ln(),
			None => {
				unknown_outcomes.insert(history);
			}
		}
	}

	// One-shot correction, applied at the history level regardless of how
	// many unseen-continuation events occurred for that history. The mass
	// is summed from the stored values rather than assumed to be exactly 1.
	for history in &unknown_outcomes {
		if let Some(distribution) = model.distribution(history) {
			let mass: f64 = distribution.probabilities().map(|(_, p)| p).sum();
			log_sum += (1.0 / (mass + 1.0)).ln();
		}
	}

	Ok((-log_sum / stream_len as f64).exp())
}
