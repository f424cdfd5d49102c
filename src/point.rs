//! The (argument, value) pairing every index stores.

use alloc::rc::Rc;
use core::{
	fmt::{self, Debug, Formatter},
	mem,
};

/// One point of the represented function: an argument paired with the value the function takes there.
///
/// Both components live in shared cells, so cloning a [`Point`] (or a whole container) never copies
/// an `A` or a `V`.
pub struct Point<A, V> {
	arg: Rc<A>,
	value: Rc<V>,
}

impl<A, V> Point<A, V> {
	pub(crate) fn new(arg: Rc<A>, value: Rc<V>) -> Self {
		Self { arg, value }
	}

	/// Returns the argument of this point.
	#[must_use]
	pub fn arg(&self) -> &A {
		&self.arg
	}

	/// Returns the value the function takes at [`arg`](`Point::arg`).
	#[must_use]
	pub fn value(&self) -> &V {
		&self.value
	}

	/// The shared argument cell, for integrity checks.
	#[cfg(test)]
	pub(crate) fn arg_cell(&self) -> Rc<A> {
		Rc::clone(&self.arg)
	}

	/// The shared value cell, for range-index bookkeeping and rollback.
	pub(crate) fn value_cell(&self) -> Rc<V> {
		Rc::clone(&self.value)
	}

	/// Swaps in a different value cell, returning the previous one.
	///
	/// Only sound while this point sits in storage keyed by its argument, which never changes.
	pub(crate) fn replace_value(&mut self, value: Rc<V>) -> Rc<V> {
		mem::replace(&mut self.value, value)
	}
}

impl<A, V> Clone for Point<A, V> {
	fn clone(&self) -> Self {
		Self {
			arg: Rc::clone(&self.arg),
			value: Rc::clone(&self.value),
		}
	}
}

impl<A: Debug, V: Debug> Debug for Point<A, V> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Point")
			.field("arg", &self.arg)
			.field("value", &self.value)
			.finish()
	}
}
