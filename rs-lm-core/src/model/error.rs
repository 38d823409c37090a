use thiserror::Error;

/// Errors produced by training, generation and evaluation.
///
/// All failures are immediate and terminal for the call in question:
/// no retries or partial-failure recovery are meaningful in this
/// single-pass, in-memory core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
	/// The requested model order was zero.
	#[error("order must be at least 1, got {0}")]
	InvalidOrder(usize),

	/// The training stream is too short to form a single history/character pair.
	#[error("training stream of {len} characters is too short for order {order}")]
	EmptyStream { len: usize, order: usize },

	/// The held-out corpus contains no documents.
	#[error("test corpus contains no documents")]
	EmptyCorpus,

	/// Generation reached a history with no recorded distribution.
	///
	/// This happens whenever the model under-covers the reachable history
	/// space, for example after sampling an unusual path.
	#[error("no distribution recorded for history {0:?}")]
	UnknownHistory(String),

	/// A cooperative cancellation flag was raised during evaluation.
	#[error("evaluation cancelled")]
	Cancelled,
}
