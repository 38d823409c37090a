use rand::Rng;

use super::error::ModelError;
use super::language_model::LanguageModel;
use super::stream::PAD;

/// Generates a sequence of exactly `length` characters from a trained model.
///
/// The history buffer starts as `order` pad characters, so every generation
/// is a fresh, repeatable walk. Each step looks up the distribution for the
/// current history, samples one character from it using the supplied random
/// source, emits it, and slides the history window forward by one.
///
/// # Parameters
/// - `model`: trained model, read-only during generation.
/// - `length`: number of characters to emit (may be zero).
/// - `rng`: injected random source; a seeded generator makes the output
///   byte-identical across repeated calls.
///
/// # Errors
/// Returns `ModelError::UnknownHistory` if the walk reaches a history with
/// no recorded distribution. This can happen whenever the model under-covers
/// the reachable history space (ex. after sampling toward the tail of the
/// training stream).
///
/// # Notes
/// - Generation is inherently sequential within one sequence; independent
///   sequences may be generated in parallel from the same shared model.
pub fn generate<R: Rng>(model: &LanguageModel, length: usize, rng: &mut R) -> Result<String, ModelError> {
	let order = model.order();
	if order == 0 {
		// Only reachable through a corrupted model file; train() rejects it.
		return Err(ModelError::InvalidOrder(0));
	}

	let mut history: String = (0..order).map(|_| PAD).collect();
	let mut output = String::with_capacity(length);

	for _ in 0..length {
		let next_char = model
			.distribution(&history)
			.and_then(|distribution| distribution.sample(rng))
			.ok_or_else(|| ModelError::UnknownHistory(history.clone()))?;

		output.push(next_char);
		history.remove(0);
		history.push(next_char);
	}

	Ok(output)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	#[test]
	fn fixed_seed_is_byte_identical() {
		// Every reachable history here has a recorded continuation ('b' and
		// 'c' branch), so any seed can walk indefinitely.
		let documents = ["abcabcabc", "abdabdabd"];
		let model = LanguageModel::train(&documents, 1).unwrap();

		let mut first_rng = StdRng::seed_from_u64(42);
		let mut second_rng = StdRng::seed_from_u64(42);
		let first = generate(&model, 200, &mut first_rng).unwrap();
		let second = generate(&model, 200, &mut second_rng).unwrap();
		assert_eq!(first, second);
		assert_eq!(first.chars().count(), 200);
	}

	#[test]
	fn fixed_seed_is_deterministic_on_natural_text() {
		let documents = [
			"The wheel has come full circle.",
			"the quick brown fox jumps over the lazy dog",
			"This is the remix.",
		];
		let model = LanguageModel::train(&documents, 2).unwrap();

		// The walk may legitimately end in UnknownHistory on some seeds;
		// determinism must hold for the full outcome either way.
		let first = generate(&model, 50, &mut StdRng::seed_from_u64(42));
		let second = generate(&model, 50, &mut StdRng::seed_from_u64(42));
		assert_eq!(first, second);
		if let Ok(sequence) = &first {
			assert_eq!(sequence.chars().count(), 50);
		}
	}

	#[test]
	fn single_character_model_reproduces_it() {
		let model = LanguageModel::train(&["aaaaaaaa"], 1).unwrap();
		let mut rng = StdRng::seed_from_u64(7);
		let output = generate(&model, 10, &mut rng).unwrap();
		assert_eq!(output, "aaaaaaaaaa");
	}

	#[test]
	fn zero_length_yields_empty_string() {
		let model = LanguageModel::train(&["abc"], 1).unwrap();
		let mut rng = StdRng::seed_from_u64(0);
		assert_eq!(generate(&model, 0, &mut rng).unwrap(), "");
	}

	#[test]
	fn unknown_history_is_an_explicit_error() {
		// Stream "~ab": the model knows '~' -> 'a' and 'a' -> 'b', but
		// nothing follows 'b', so the third step has no distribution.
		let model = LanguageModel::train(&["ab"], 1).unwrap();
		let mut rng = StdRng::seed_from_u64(0);
		let result = generate(&model, 3, &mut rng);
		assert_eq!(result, Err(ModelError::UnknownHistory("b".to_owned())));
	}
}
