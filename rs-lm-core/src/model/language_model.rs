use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::io::{build_output_path, read_file};
use super::counts::{CountTable, HistoryCounts};
use super::error::ModelError;
use super::stream;

/// Probability distribution over the next character for one history.
///
/// Built once from raw counts; probabilities are exact count ratios
/// (unsmoothed), so only characters actually observed after the history
/// have entries, and the entries sum to 1.0 within floating-point tolerance.
///
/// Entries are kept in a fixed, reproducible order (character order) so that
/// sampling is deterministic under a fixed seed, regardless of how the
/// counts were accumulated.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Distribution {
	/// Next character and its probability, in character order.
	probs: BTreeMap<char, f64>,

	/// Total number of training observations for this history.
	///
	/// Kept alongside the normalized probabilities so a trained model can be
	/// inspected without the original counts.
	total: usize,
}

impl Distribution {
	/// Normalizes raw counts into a probability distribution.
	pub(crate) fn from_counts(counter: &HistoryCounts) -> Self {
		let total = counter.total();
		let probs = counter
			.counts()
			.iter()
			.map(|(next_char, occurrence)| (*next_char, *occurrence as f64 / total as f64))
			.collect();
		Self { probs, total }
	}

	/// Probability of `next_char` following this history.
	///
	/// Returns `None` if the character was never observed (unsmoothed model:
	/// unseen continuations have no entry rather than probability zero).
	pub fn prob(&self, next_char: char) -> Option<f64> {
		self.probs.get(&next_char).copied()
	}

	/// Total number of training observations for this history.
	pub fn total(&self) -> usize {
		self.total
	}

	/// Iterates over `(character, probability)` entries in their fixed order.
	pub fn probabilities(&self) -> impl Iterator<Item = (char, f64)> + '_ {
		self.probs.iter().map(|(next_char, probability)| (*next_char, *probability))
	}

	/// Samples the next character using weighted random sampling.
	///
	/// Draws one uniform value in `[0, 1)` and walks the entries in their
	/// fixed order, subtracting each probability until the remainder is
	/// `<= 0`. The last entry absorbs any floating-point dust.
	///
	/// Returns `None` if the distribution has no entries.
	pub(crate) fn sample<R: Rng>(&self, rng: &mut R) -> Option<char> {
		let mut remainder: f64 = rng.random();

		let mut chosen = None;
		for (next_char, probability) in &self.probs {
			chosen = Some(*next_char);
			remainder -= probability;
			if remainder <= 0.0 {
				break;
			}
		}

		chosen
	}
}

/// Unsmoothed maximum-likelihood character-level language model.
///
/// The model maps every history of exactly `order` characters observed in
/// the training stream to the distribution of characters that followed it.
///
/// # Responsibilities
/// - Train from an ordered collection of documents
/// - Look up the distribution recorded for a history
/// - Persist and reload trained models (compact binary form)
///
/// # Invariants
/// - `order` is always >= 1
/// - Each history key has exactly `order` characters
/// - Every distribution sums to 1.0 within 1e-9 relative tolerance
///
/// # Notes
/// - Logically immutable after training: a new training call produces an
///   independent model, and a shared `&LanguageModel` can safely serve
///   concurrent generation and evaluation calls.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LanguageModel {
	/// History length (number of conditioning characters).
	order: usize,

	/// Mapping from a history to its next-character distribution.
	states: HashMap<String, Distribution>,
}

impl LanguageModel {
	/// Trains a model of the given order from an ordered document collection.
	///
	/// Each document is left-padded with `order` pad characters and the
	/// results are concatenated into one stream; a sliding window of width
	/// `order + 1` counts every history/next-character pair, and the counts
	/// are normalized once into probability distributions. Large streams are
	/// counted in parallel internally; the result is identical either way.
	///
	/// # Errors
	/// - `ModelError::InvalidOrder` if `order` is zero.
	/// - `ModelError::EmptyStream` if the padded stream is too short to form
	///   a single window (ex. an empty document list).
	pub fn train<S: AsRef<str>>(documents: &[S], order: usize) -> Result<Self, ModelError> {
		let stream = stream::pad_stream(documents, order)?;
		let table = CountTable::from_stream(&stream, order)?;

		let mut states = HashMap::with_capacity(table.len());
		for (history, counter) in table.into_iter() {
			states.insert(history, Distribution::from_counts(&counter));
		}

		Ok(Self { order, states })
	}

	/// Trains from a newline-delimited corpus file, with a binary cache.
	///
	/// Each line of the file is one document. If a sibling cache file
	/// (`corpus.txt` + order 3 → `corpus.3.bin`) exists it is loaded instead
	/// of retraining; otherwise the trained model is serialized there with
	/// `postcard` for fast future loading.
	pub fn from_corpus_file<P: AsRef<Path>>(
		filepath: P,
		order: usize,
	) -> Result<Self, Box<dyn std::error::Error>> {
		let cache_path = build_output_path(&filepath, &format!("{order}.bin"))?;
		if cache_path.exists() {
			let bytes = std::fs::read(&cache_path)?;
			let model: Self = postcard::from_bytes(&bytes)?;
			if model.order == order {
				return Ok(model);
			}
		}

		let documents = read_file(&filepath)?;
		let model = Self::train(&documents, order)?;

		let bytes = postcard::to_stdvec(&model)?;
		std::fs::write(&cache_path, bytes)?;

		Ok(model)
	}

	/// Serializes the model to a file using `postcard`.
	pub fn save<P: AsRef<Path>>(&self, filepath: P) -> Result<(), Box<dyn std::error::Error>> {
		let bytes = postcard::to_stdvec(self)?;
		std::fs::write(filepath, bytes)?;
		Ok(())
	}

	/// Loads a model previously written by [`LanguageModel::save`].
	pub fn load<P: AsRef<Path>>(filepath: P) -> Result<Self, Box<dyn std::error::Error>> {
		let bytes = std::fs::read(filepath)?;
		Ok(postcard::from_bytes(&bytes)?)
	}

	/// History length of this model.
	pub fn order(&self) -> usize {
		self.order
	}

	/// Returns the distribution recorded for a history, if any.
	pub fn distribution(&self, history: &str) -> Option<&Distribution> {
		self.states.get(history)
	}

	/// Iterates over every history present in the model.
	///
	/// Iteration order is unspecified.
	pub fn histories(&self) -> impl Iterator<Item = &str> {
		self.states.keys().map(String::as_str)
	}

	/// Number of distinct histories in the model.
	pub fn len(&self) -> usize {
		self.states.len()
	}

	/// Whether the model contains no histories.
	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn distributions_sum_to_one() {
		let documents = [
			"The wheel has come full circle.",
			"This is the remix.",
			"the quick brown fox jumps over the lazy dog",
		];
		let model = LanguageModel::train(&documents, 2).unwrap();
		assert!(!model.is_empty());

		for history in model.histories() {
			let distribution = model.distribution(history).unwrap();
			let sum: f64 = distribution.probabilities().map(|(_, p)| p).sum();
			assert!((sum - 1.0).abs() < 1e-9, "history {history:?} sums to {sum}");
		}
	}

	#[test]
	fn normalizes_exact_count_ratios() {
		// Stream "~aab": a is followed by 'a' once and 'b' once.
		let model = LanguageModel::train(&["aab"], 1).unwrap();
		let distribution = model.distribution("a").unwrap();
		assert_eq!(distribution.prob('a'), Some(0.5));
		assert_eq!(distribution.prob('b'), Some(0.5));
		assert_eq!(distribution.total(), 2);
		assert_eq!(distribution.prob('z'), None);
	}

	#[test]
	fn repeated_character_gets_probability_one() {
		let model = LanguageModel::train(&["aaaaaa"], 1).unwrap();
		for history in model.histories() {
			let distribution = model.distribution(history).unwrap();
			assert_eq!(distribution.prob('a'), Some(1.0));
		}
	}

	#[test]
	fn empty_document_list_fails_training() {
		let documents: Vec<&str> = Vec::new();
		let result = LanguageModel::train(&documents, 2);
		assert_eq!(result, Err(ModelError::EmptyStream { len: 0, order: 2 }));
	}

	#[test]
	fn order_zero_fails_training() {
		let result = LanguageModel::train(&["abc"], 0);
		assert_eq!(result, Err(ModelError::InvalidOrder(0)));
	}

	#[test]
	fn survives_binary_serialization() {
		let model = LanguageModel::train(&["This is the remix."], 2).unwrap();
		let bytes = postcard::to_stdvec(&model).unwrap();
		let reloaded: LanguageModel = postcard::from_bytes(&bytes).unwrap();
		assert_eq!(model, reloaded);
	}
}
