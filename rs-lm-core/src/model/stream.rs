use super::error::ModelError;

/// Reserved pad character used to left-pad every document.
///
/// Each document is prefixed with `order` copies of this character so that
/// histories at document start are well-defined. It must not collide with
/// any character expected in real text; this is a caller responsibility
/// and is not validated here.
pub const PAD: char = '~';

/// Builds the padded training stream from an ordered sequence of documents.
///
/// The stream is the concatenation of `PAD * order + document` for every
/// document, in input order. Document order does not affect final counts
/// (counting is commutative) but is preserved for inspection.
///
/// # Parameters
/// - `documents`: ordered collection of text documents.
/// - `order`: history length of the model (must be >= 1).
///
/// # Errors
/// Returns `ModelError::InvalidOrder` if `order` is zero.
///
/// # Notes
/// - UTF-8 safe: the stream is a sequence of Unicode scalar values.
/// - An empty document list yields an empty stream.
pub fn pad_stream<S: AsRef<str>>(documents: &[S], order: usize) -> Result<Vec<char>, ModelError> {
	if order == 0 {
		return Err(ModelError::InvalidOrder(order));
	}

	let capacity: usize = documents.iter().map(|d| d.as_ref().len() + order).sum();
	let mut stream = Vec::with_capacity(capacity);
	for document in documents {
		stream.extend(std::iter::repeat(PAD).take(order));
		stream.extend(document.as_ref().chars());
	}

	Ok(stream)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn pads_every_document_in_order() {
		let stream = pad_stream(&["ab", "c"], 2).unwrap();
		let expected: Vec<char> = "~~ab~~c".chars().collect();
		assert_eq!(stream, expected);
	}

	#[test]
	fn empty_document_list_yields_empty_stream() {
		let documents: Vec<&str> = Vec::new();
		let stream = pad_stream(&documents, 3).unwrap();
		assert!(stream.is_empty());
	}

	#[test]
	fn rejects_order_zero() {
		let result = pad_stream(&["abc"], 0);
		assert_eq!(result, Err(ModelError::InvalidOrder(0)));
	}

	#[test]
	fn handles_multibyte_characters() {
		let stream = pad_stream(&["héhé"], 1).unwrap();
		let expected: Vec<char> = "~héhé".chars().collect();
		assert_eq!(stream, expected);
	}
}
