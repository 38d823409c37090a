use std::collections::HashMap;
use std::sync::mpsc;
use std::thread;

use super::error::ModelError;

/// Streams at least this long are counted in parallel.
const PARALLEL_THRESHOLD: usize = 1 << 16;

/// Raw transition counts accumulated for a single history.
///
/// A `HistoryCounts` corresponds to a fixed `order`-character history (`key`)
/// and stores how many times each next character was observed after it.
///
/// ## Responsibilities
/// - Accumulate transition occurrences during counting
/// - Merge with another counter having the same key (ex. parallel counting support)
///
/// ## Invariants
/// - All counts belong to the same `key`
/// - Each occurrence count is strictly positive
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct HistoryCounts {
	/// Identifier of the counter (the `order`-character history).
	key: String,
	/// Observed next characters and their occurrence counts.
	/// Example: { 'e' => 42, 'a' => 3 }
	counts: HashMap<char, usize>,
}

impl HistoryCounts {
	/// Creates a new empty counter for the given history.
	pub(crate) fn new(key: &str) -> Self {
		Self {
			key: key.to_owned(),
			counts: HashMap::new(),
		}
	}

	/// Records an occurrence of `next_char` after this history.
	pub(crate) fn add(&mut self, next_char: char) {
		*self.counts.entry(next_char).or_insert(0) += 1;
	}

	/// Merges another counter into this one by summing occurrence counts.
	///
	/// Both counters must track the same history; counting is a commutative,
	/// associative monoid so merge order does not matter.
	pub(crate) fn merge(&mut self, other: &Self) {
		debug_assert_eq!(self.key, other.key);
		for (next_char, occurrence) in &other.counts {
			*self.counts.entry(*next_char).or_insert(0) += *occurrence;
		}
	}

	/// Total number of observations recorded for this history.
	pub(crate) fn total(&self) -> usize {
		self.counts.values().sum()
	}

	/// Read-only access to the raw counts.
	pub(crate) fn counts(&self) -> &HashMap<char, usize> {
		&self.counts
	}
}

/// Builder accumulating history/next-character counts over a stream.
///
/// This is the mutable half of training: a `CountTable` is filled by a
/// sliding-window scan (possibly split across threads) and then converted
/// once, immutably, into per-history probability distributions.
#[derive(Debug, PartialEq)]
pub(crate) struct CountTable {
	/// History length (number of conditioning characters).
	order: usize,

	/// Mapping from a history to its accumulated counts.
	states: HashMap<String, HistoryCounts>,
}

impl CountTable {
	fn new(order: usize) -> Self {
		Self { order, states: HashMap::new() }
	}

	/// Counts all history/next-character pairs of a padded stream.
	///
	/// Scans the stream with a sliding window of width `order + 1`: the first
	/// `order` characters of each window are the history and the last one is
	/// the observed next character.
	///
	/// Large streams are partitioned into contiguous chunks with an
	/// `order`-character overlap at each boundary and counted on one thread
	/// per chunk; partial tables are merged by additive union. The choice is
	/// internal and does not change the resulting counts.
	///
	/// # Errors
	/// Returns `ModelError::EmptyStream` if `stream.len() <= order`
	/// (no window can be formed).
	pub(crate) fn from_stream(stream: &[char], order: usize) -> Result<Self, ModelError> {
		if stream.len() <= order {
			return Err(ModelError::EmptyStream { len: stream.len(), order });
		}

		if stream.len() >= PARALLEL_THRESHOLD {
			Ok(Self::from_stream_parallel(stream, order, num_cpus::get()))
		} else {
			let mut table = Self::new(order);
			table.scan(stream);
			Ok(table)
		}
	}

	/// Sequentially counts every window of the given stream slice.
	fn scan(&mut self, stream: &[char]) {
		for window in stream.windows(self.order + 1) {
			let history: String = window[..self.order].iter().collect();
			let next_char = window[self.order];

			let counter = self
				.states
				.entry(history.clone())
				.or_insert_with(|| HistoryCounts::new(&history));
			counter.add(next_char);
		}
	}

	/// Counts a stream by partitioning it across `workers` threads.
	///
	/// # Behavior
	/// - Splits window start positions into contiguous ranges.
	/// - Each chunk carries `order` extra characters so windows crossing a
	///   boundary are counted exactly once.
	/// - Partial tables are sent back over an MPSC channel and merged.
	///
	/// # Notes
	/// - The caller must guarantee `stream.len() > order` and `workers >= 1`.
	/// - Counts are integers, so the merged table is identical to a
	///   sequential scan regardless of thread scheduling.
	pub(crate) fn from_stream_parallel(stream: &[char], order: usize, workers: usize) -> Self {
		let positions = stream.len() - order;
		let chunk_size = positions.div_ceil(workers.max(1)).max(1);

		let (tx, rx) = mpsc::channel();
		for chunk_start in (0..positions).step_by(chunk_size) {
			let chunk_end = (chunk_start + chunk_size).min(positions);
			let chunk: Vec<char> = stream[chunk_start..chunk_end + order].to_vec();
			let tx = tx.clone();

			thread::spawn(move || {
				let mut partial = CountTable::new(order);
				partial.scan(&chunk);
				tx.send(partial).expect("Failed to send from thread");
			});
		}
		drop(tx);

		let mut table = Self::new(order);
		for partial in rx.iter() {
			table.merge(partial);
		}

		table
	}

	/// Merges another table into this one by additive union.
	fn merge(&mut self, other: Self) {
		debug_assert_eq!(self.order, other.order);
		for (key, counter) in other.states {
			if let Some(existing) = self.states.get_mut(&key) {
				existing.merge(&counter);
			} else {
				self.states.insert(key, counter);
			}
		}
	}

	/// Consumes the table, yielding every history and its counts.
	pub(crate) fn into_iter(self) -> impl Iterator<Item = (String, HistoryCounts)> {
		self.states.into_iter()
	}

	/// Number of distinct histories counted.
	pub(crate) fn len(&self) -> usize {
		self.states.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn stream_of(text: &str) -> Vec<char> {
		text.chars().collect()
	}

	#[test]
	fn counts_every_window_once() {
		// "~~abab": windows are ~~->a, ~a->b, ab->a, ba->b
		let table = CountTable::from_stream(&stream_of("~~abab"), 2).unwrap();
		assert_eq!(table.len(), 4);
		assert_eq!(table.states["~~"].counts()[&'a'], 1);
		assert_eq!(table.states["~a"].counts()[&'b'], 1);
		assert_eq!(table.states["ab"].counts()[&'a'], 1);
		assert_eq!(table.states["ba"].counts()[&'b'], 1);
	}

	#[test]
	fn accumulates_repeated_transitions() {
		let table = CountTable::from_stream(&stream_of("~aaab"), 1).unwrap();
		assert_eq!(table.states["a"].counts()[&'a'], 2);
		assert_eq!(table.states["a"].counts()[&'b'], 1);
		assert_eq!(table.states["a"].total(), 3);
	}

	#[test]
	fn rejects_streams_too_short_for_a_window() {
		let result = CountTable::from_stream(&stream_of("ab"), 2);
		assert_eq!(result, Err(ModelError::EmptyStream { len: 2, order: 2 }));

		let empty: Vec<char> = Vec::new();
		let result = CountTable::from_stream(&empty, 1);
		assert_eq!(result, Err(ModelError::EmptyStream { len: 0, order: 1 }));
	}

	#[test]
	fn parallel_counting_matches_sequential() {
		let text = "~~the quick brown fox jumps over the lazy dog. ".repeat(20);
		let stream = stream_of(&text);

		let sequential = CountTable::from_stream(&stream, 2).unwrap();
		let parallel = CountTable::from_stream_parallel(&stream, 2, 4);
		assert_eq!(sequential, parallel);
	}

	#[test]
	fn parallel_counting_with_more_workers_than_windows() {
		let stream = stream_of("~abc");
		let sequential = CountTable::from_stream(&stream, 1).unwrap();
		let parallel = CountTable::from_stream_parallel(&stream, 1, 16);
		assert_eq!(sequential, parallel);
	}
}
