//! Deduplicated storage of the function's values, weakly held.

use alloc::{
	rc::{Rc, Weak},
	vec::Vec,
};

/// One live value of the function, plus the number of points of *this* container sharing its cell.
///
/// The handle is weak so that the range index never extends a cell's lifetime. Eviction goes by
/// the holder count rather than by expiry: clones of a container share cells, and a sibling's
/// strong handles can keep a cell alive long after this container stopped using it, which would
/// otherwise strand an entry here that later expires under a comparison.
struct RangeEntry<V> {
	cell: Weak<V>,
	holders: usize,
}

impl<V> RangeEntry<V> {
	/// Upgrades the weak handle. Entries leave with their last holder, so the cell is live.
	fn live(&self) -> Rc<V> {
		self.cell.upgrade().expect("held value cell expired")
	}
}

impl<V> Clone for RangeEntry<V> {
	fn clone(&self) -> Self {
		Self {
			cell: Weak::clone(&self.cell),
			holders: self.holders,
		}
	}
}

/// Ordered storage of weak handles to every distinct live value, keyed by the value itself.
///
/// Lets the mutation engine share one cell among all points with equal values.
pub(crate) struct ValueIndex<V> {
	entries: Vec<RangeEntry<V>>,
}

impl<V> ValueIndex<V> {
	pub const fn new() -> Self {
		Self {
			entries: Vec::new(),
		}
	}

	/// Binary-searches for `value` among the live cells, yielding the position of the matching
	/// entry or the position where an entry for it would be inserted.
	pub fn locate(&self, value: &V) -> Result<usize, usize>
	where
		V: Ord,
	{
		self.entries
			.binary_search_by(|entry| entry.live().as_ref().cmp(value))
	}

	/// Upgrades the entry at `at` into a strong handle for sharing.
	pub fn share(&self, at: usize) -> Rc<V> {
		self.entries[at].live()
	}

	/// Inserts an entry for a freshly allocated cell, accounted to one holder.
	pub fn insert_at(&mut self, at: usize, cell: &Rc<V>) {
		self.entries.insert(
			at,
			RangeEntry {
				cell: Rc::downgrade(cell),
				holders: 1,
			},
		);
	}

	/// Removes the entry at `at`. Runs no comparisons.
	pub fn remove_at(&mut self, at: usize) {
		self.entries.remove(at);
	}

	/// Records one more point sharing the cell at `at`. Runs no comparisons.
	pub fn add_holder(&mut self, at: usize) {
		self.entries[at].holders += 1;
	}

	/// Records that a point stopped sharing the cell at `at`, evicting the entry together with
	/// its last holder. Runs no comparisons.
	pub fn drop_holder(&mut self, at: usize) {
		let entry = &mut self.entries[at];
		entry.holders -= 1;
		if entry.holders == 0 {
			self.entries.remove(at);
		}
	}
}

impl<V> Clone for ValueIndex<V> {
	fn clone(&self) -> Self {
		Self {
			entries: self.entries.clone(),
		}
	}
}

#[cfg(test)]
impl<V> ValueIndex<V> {
	/// Every entry as a strong handle with its holder count, for integrity checks.
	pub fn entries(&self) -> Vec<(Rc<V>, usize)> {
		self.entries
			.iter()
			.map(|entry| (entry.live(), entry.holders))
			.collect()
	}
}
