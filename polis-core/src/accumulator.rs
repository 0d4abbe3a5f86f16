//! Per-request streaming body accumulator: a bounded head buffer plus a
//! rolling tail window, so a body that exceeds the memory budget can
//! still be scanned for a credential or approval command near either
//! end without buffering the whole thing.

use std::collections::VecDeque;

/// Accumulates bytes as they stream in from the host framework's I/O
/// callback. `tail_max == 0` disables the tail window entirely (the OTT
/// service only ever scans the head).
#[derive(Debug)]
pub struct Accumulator {
	head: Vec<u8>,
	head_max: usize,
	tail: VecDeque<u8>,
	tail_max: usize,
	total: usize,
}

impl Accumulator {
	pub fn new(head_max: usize, tail_max: usize) -> Self {
		Self {
			head: Vec::with_capacity(head_max.min(64 * 1024)),
			head_max,
			tail: VecDeque::with_capacity(tail_max),
			tail_max,
			total: 0,
		}
	}

	/// Appends one chunk as delivered by the host framework's `io` callback.
	pub fn push(&mut self, chunk: &[u8]) {
		self.total += chunk.len();

		let room = self.head_max.saturating_sub(self.head.len());
		if chunk.len() <= room {
			self.head.extend_from_slice(chunk);
			return;
		}

		if room > 0 {
			self.head.extend_from_slice(&chunk[..room]);
		}
		let overflow = &chunk[room..];
		self.push_tail(overflow);
	}

	fn push_tail(&mut self, bytes: &[u8]) {
		if self.tail_max == 0 {
			return;
		}
		if bytes.len() >= self.tail_max {
			// A single chunk at least as large as the window replaces it
			// outright with its own final TAIL_MAX bytes: the window has no
			// memory of anything received before this chunk's tail.
			self.tail.clear();
			self.tail.extend(bytes[bytes.len() - self.tail_max..].iter().copied());
			return;
		}
		let overflow = (self.tail.len() + bytes.len()).saturating_sub(self.tail_max);
		for _ in 0..overflow {
			self.tail.pop_front();
		}
		self.tail.extend(bytes.iter().copied());
	}

	pub fn total_len(&self) -> usize {
		self.total
	}

	/// The accumulated head prefix, up to `head_max` bytes.
	pub fn head(&self) -> &[u8] {
		&self.head
	}

	/// The rolling tail window, contiguous and ordered oldest-to-newest.
	/// Empty unless `total_len() > head_max`.
	pub fn tail(&self) -> Vec<u8> {
		self.tail.iter().copied().collect()
	}

	pub fn is_truncated(&self) -> bool {
		self.total > self.head.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn small_body_stays_entirely_in_head() {
		let mut acc = Accumulator::new(16, 4);
		acc.push(b"hello");
		acc.push(b" world");
		assert_eq!(acc.total_len(), 11);
		assert_eq!(acc.head(), b"hello world");
		assert!(acc.tail().is_empty());
		assert!(!acc.is_truncated());
	}

	#[test]
	fn overflow_spills_into_tail_window() {
		let mut acc = Accumulator::new(4, 4);
		acc.push(b"abcdefgh"); // head takes "abcd", tail takes "efgh"
		assert_eq!(acc.head(), b"abcd");
		assert_eq!(acc.tail(), b"efgh");
		assert_eq!(acc.total_len(), 8);
		assert!(acc.is_truncated());
	}

	#[test]
	fn tail_window_drops_oldest_bytes() {
		let mut acc = Accumulator::new(2, 4);
		acc.push(b"ab"); // fills head exactly
		acc.push(b"1234"); // fills tail exactly
		acc.push(b"56"); // pushes "12" out of the window
		assert_eq!(acc.tail(), b"3456");
	}

	#[test]
	fn single_chunk_larger_than_tail_replaces_window() {
		let mut acc = Accumulator::new(2, 4);
		acc.push(b"ab");
		acc.push(b"XX"); // occupies part of the (empty) window
		acc.push(b"0123456789"); // far larger than TAIL_MAX: only its own tail survives
		assert_eq!(acc.tail(), b"6789");
	}

	#[test]
	fn prefix_and_suffix_hold_under_arbitrary_chunking() {
		let head_max = 8usize;
		let tail_max = 4usize;
		let body = b"the quick brown fox jumps over";
		let mut acc = Accumulator::new(head_max, tail_max);
		for chunk in body.chunks(3) {
			acc.push(chunk);
		}
		let total = body.len();
		assert_eq!(acc.total_len(), total);
		assert_eq!(acc.head(), &body[..head_max.min(total)]);
		let want_tail_len = total.saturating_sub(head_max).min(tail_max);
		assert_eq!(acc.tail().len(), want_tail_len);
		assert_eq!(acc.tail(), &body[total - want_tail_len..]);
	}

	#[test]
	fn head_only_scan_matches_non_streaming_scan() {
		let body = b"no overflow here";
		assert!(body.len() <= 64);
		let mut acc = Accumulator::new(64, 16);
		acc.push(body);
		assert_eq!(acc.head(), &body[..]);
	}
}
