//! Pagination state for the board's growing page window.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Tracks the requested page size and the backend's last-reported total.
///
/// The window only ever grows; shrinking would make previously visible
/// rows disappear between polls.
#[derive(Debug)]
pub struct PageWindow {
	limit: AtomicUsize,
	total: AtomicU64,
}

impl PageWindow {
	pub fn new(initial_limit: usize) -> Self {
		PageWindow {
			limit: AtomicUsize::new(initial_limit),
			total: AtomicU64::new(0),
		}
	}

	/// Currently requested page size.
	pub fn limit(&self) -> usize {
		self.limit.load(Ordering::Relaxed)
	}

	/// Grows the requested page size and returns the new limit.
	pub fn grow(&self, increment: usize) -> usize {
		self.limit.fetch_add(increment, Ordering::Relaxed) + increment
	}

	/// Records the total reported by the latest page fetch.
	pub fn record_total(&self, total: u64) {
		self.total.store(total, Ordering::Relaxed);
	}

	/// Total matching orders as of the latest fetch.
	pub fn total(&self) -> u64 {
		self.total.load(Ordering::Relaxed)
	}

	/// Whether the backend holds more orders than are currently visible.
	pub fn has_more(&self, visible: usize) -> bool {
		(visible as u64) < self.total()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn window_only_grows() {
		let window = PageWindow::new(20);
		assert_eq!(window.limit(), 20);
		assert_eq!(window.grow(10), 30);
		assert_eq!(window.grow(10), 40);
		assert_eq!(window.limit(), 40);
	}

	#[test]
	fn has_more_compares_visible_against_total() {
		let window = PageWindow::new(20);
		window.record_total(25);
		assert!(window.has_more(20));
		assert!(!window.has_more(25));
	}
}
