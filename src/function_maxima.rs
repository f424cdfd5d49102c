//! The container and its mutation engine.

use alloc::{rc::Rc, vec::Vec};
use core::{
	cmp::Ordering,
	fmt::{self, Debug, Formatter},
	slice,
};

use scopeguard::ScopeGuard;
use tap::{Pipe, Tap};
use thiserror::Error;

use crate::{domain::DomainIndex, maxima::MaximaIndex, point::Point, range::ValueIndex};

/// The error returned by [`FunctionMaxima::value_at`] for arguments outside the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid argument value")]
pub struct InvalidArg;

/// An incremental index of the local maxima of a partial function from `A` to `V`.
///
/// The container stores the graph of the function, ordered by argument, and maintains in step
/// with it the set of the function's local maxima, ordered by descending value with ties towards
/// the smaller argument. A point is a local maximum iff its value is not less than the value at
/// either neighbouring argument, where a missing neighbour counts as satisfied.
///
/// Arguments and values live in shared cells: points with equal values share one `V`, and clones
/// of a container share every cell with their source, so neither cloning the container nor
/// reassigning values copies an `A` or a `V`.
///
/// `A` and `V` take part through [`Ord`] alone; equality is always derived from the same
/// comparison, never from [`PartialEq`].
///
/// # Panic safety
///
/// A user-supplied [`Ord::cmp`] is allowed to panic. When it does inside
/// [`set_value`](`FunctionMaxima::set_value`) or [`remove`](`FunctionMaxima::remove`), the
/// unwinding rolls the container back to exactly the state observed before the call.
///
/// ```rust
/// use function_maxima::FunctionMaxima;
///
/// let mut f = FunctionMaxima::new();
/// f.set_value(1, 3);
/// f.set_value(2, 1);
/// f.set_value(3, 3);
///
/// assert_eq!(*f.value_at(&1).unwrap(), 3);
/// let peaks: Vec<_> = f.maxima().map(|p| (*p.arg(), *p.value())).collect();
/// assert_eq!(peaks, [(1, 3), (3, 3)]);
/// ```
pub struct FunctionMaxima<A, V> {
	fun: DomainIndex<A, V>,
	maxima: MaximaIndex<A, V>,
	range: ValueIndex<V>,
}

impl<A, V> FunctionMaxima<A, V> {
	/// Creates an empty container.
	#[must_use]
	pub const fn new() -> Self {
		Self {
			fun: DomainIndex::new(),
			maxima: MaximaIndex::new(),
			range: ValueIndex::new(),
		}
	}

	/// The number of arguments the function is defined for.
	#[must_use]
	pub fn len(&self) -> usize {
		self.fun.len()
	}

	/// Whether the function is defined nowhere.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Iterates over every point in increasing argument order.
	pub fn iter(&self) -> slice::Iter<'_, Point<A, V>> {
		self.fun.as_slice().iter()
	}

	/// Iterates over the local maxima in decreasing value order, equal values ordered by
	/// increasing argument.
	pub fn maxima(&self) -> slice::Iter<'_, Point<A, V>> {
		self.maxima.as_slice().iter()
	}
}

impl<A: Ord, V: Ord> FunctionMaxima<A, V> {
	/// The point at `arg`, iff the domain contains it.
	#[must_use]
	pub fn find(&self, arg: &A) -> Option<&Point<A, V>> {
		self.fun
			.locate(arg)
			.ok()
			.map(|at| &self.fun.as_slice()[at])
	}

	/// The value the function takes at `arg`.
	///
	/// # Errors
	///
	/// [`InvalidArg`] iff `arg` is outside the domain.
	pub fn value_at(&self, arg: &A) -> Result<&V, InvalidArg> {
		self.find(arg).map(Point::value).ok_or(InvalidArg)
	}

	/// Makes the function take `value` at `arg`, adding `arg` to the domain if necessary.
	///
	/// If `value` compares equal to a value already taken somewhere, the point shares that cell
	/// and the passed `value` is dropped. Assigning a value equal to the current one at `arg` is
	/// a complete no-op.
	///
	/// # Panics
	///
	/// Propagates panics from `A::cmp` and `V::cmp`, after rolling the container back to the
	/// state observed before the call.
	pub fn set_value(&mut self, arg: A, value: V) {
		let located = self.fun.locate(&arg);
		if let Ok(at) = located {
			if self.fun.as_slice()[at].value().cmp(&value) == Ordering::Equal {
				return;
			}
		}

		// Nothing so far mutated state. Share existing cells where possible; a fresh cell is
		// allocated only for a genuinely new value (and below for a genuinely new argument).
		let (value_cell, fresh_value, shared_value) = match self.range.locate(&value) {
			Ok(at) => (self.range.share(at), None, Some(at)),
			Err(at) => (Rc::new(value), Some(at), None),
		};
		let prior_value = located.ok().map(|at| self.fun.as_slice()[at].value_cell());

		// From here to the commit point, every index mutation stays journaled in a guard that
		// undoes it if a later comparison unwinds.
		let mut range = scopeguard::guard((&mut self.range, None::<usize>), |(range, staged)| {
			if let Some(at) = staged {
				range.remove_at(at);
			}
		});
		if let Some(at) = fresh_value {
			let (range, staged) = &mut *range;
			range.insert_at(at, &value_cell);
			*staged = Some(at);
		}
		let prior_value_at = prior_value.as_ref().map(|prior| match range.0.locate(prior) {
			Ok(at) => at,
			Err(_) => unreachable!("replaced value missing from the value index"),
		});

		enum Undo<V> {
			Nothing,
			RestoreValue(usize, Rc<V>),
			RemovePoint(usize),
		}
		let mut fun = scopeguard::guard((&mut self.fun, Undo::Nothing), |(fun, undo)| match undo {
			Undo::Nothing => (),
			Undo::RestoreValue(at, prior) => {
				fun.replace_value(at, prior);
			}
			Undo::RemovePoint(at) => {
				fun.remove_at(at);
			}
		});
		let at = match located {
			Ok(at) => {
				let prior = fun.0.replace_value(at, Rc::clone(&value_cell));
				fun.1 = Undo::RestoreValue(at, prior);
				at
			}
			Err(at) => {
				fun.0.insert_at(at, Point::new(Rc::new(arg), Rc::clone(&value_cell)));
				fun.1 = Undo::RemovePoint(at);
				at
			}
		};

		// Classify the mutated point and its neighbours against the already rewritten graph.
		let points = fun.0.as_slice();
		let left = at.checked_sub(1);
		let right = (at + 1 < points.len()).then_some(at + 1);
		let becomes_max = is_maximum(points, at, None);
		let left_becomes = left.map(|left| is_maximum(points, left, None));
		let right_becomes = right.map(|right| is_maximum(points, right, None));
		let left_was = left.map(|left| {
			self.maxima
				.locate(points[left].value(), points[left].arg())
				.is_ok()
		});
		let right_was = right.map(|right| {
			self.maxima
				.locate(points[right].value(), points[right].arg())
				.is_ok()
		});

		let mut mx = scopeguard::guard((&mut self.maxima, Vec::new()), |(maxima, staged)| {
			for at in staged.into_iter().rev() {
				maxima.remove_at(at);
			}
		});
		let stale_center;
		let stale_left;
		let stale_right;
		{
			let (maxima, staged) = &mut *mx;
			if becomes_max {
				let slot = maxima.slot(points[at].value(), points[at].arg());
				maxima.insert_at(slot, points[at].clone());
				staged.push(slot);
			}
			if let (Some(left), Some(true), Some(false)) = (left, left_becomes, left_was) {
				let slot = maxima.slot(points[left].value(), points[left].arg());
				maxima.insert_at(slot, points[left].clone());
				staged.push(slot);
			}
			if let (Some(right), Some(true), Some(false)) = (right, right_becomes, right_was) {
				let slot = maxima.slot(points[right].value(), points[right].arg());
				maxima.insert_at(slot, points[right].clone());
				staged.push(slot);
			}

			// Everything to un-index afterwards, positioned against the fully staged state so
			// the positions survive into the comparison-free part below.
			stale_center = prior_value
				.as_ref()
				.and_then(|prior| maxima.locate(prior, points[at].arg()).ok());
			stale_left = match (left, left_becomes, left_was) {
				(Some(left), Some(false), Some(true)) => maxima
					.locate(points[left].value(), points[left].arg())
					.ok(),
				_ => None,
			};
			stale_right = match (right, right_becomes, right_was) {
				(Some(right), Some(false), Some(true)) => maxima
					.locate(points[right].value(), points[right].arg())
					.ok(),
				_ => None,
			};
		}

		// Commit point: nothing below runs user code or unwinds.
		let (maxima, _) = ScopeGuard::into_inner(mx);
		ScopeGuard::into_inner(fun);
		let (range, _) = ScopeGuard::into_inner(range);

		let mut stale = [stale_center, stale_left, stale_right];
		stale.sort_unstable();
		for at in stale.into_iter().rev().flatten() {
			maxima.remove_at(at);
		}
		if let Some(at) = shared_value {
			range.add_holder(at);
		}
		if let Some(at) = prior_value_at {
			range.drop_holder(at);
		}
	}

	/// Removes `arg` from the function's domain, returning the removed point, or [`None`] if the
	/// domain did not contain it.
	///
	/// # Panics
	///
	/// Propagates panics from `A::cmp` and `V::cmp`, after rolling the container back to the
	/// state observed before the call.
	pub fn remove(&mut self, arg: &A) -> Option<Point<A, V>> {
		let at = self.fun.locate(arg).ok()?;
		let points = self.fun.as_slice();
		let value_at = match self.range.locate(points[at].value()) {
			Ok(found) => found,
			Err(_) => unreachable!("stored value missing from the value index"),
		};

		// Classify both neighbours as if the point were already gone.
		let left = at.checked_sub(1);
		let right = (at + 1 < points.len()).then_some(at + 1);
		let left_becomes = left.map(|left| is_maximum(points, left, Some(at)));
		let right_becomes = right.map(|right| is_maximum(points, right, Some(at)));
		let left_was = left.map(|left| {
			self.maxima
				.locate(points[left].value(), points[left].arg())
				.is_ok()
		});
		let right_was = right.map(|right| {
			self.maxima
				.locate(points[right].value(), points[right].arg())
				.is_ok()
		});

		let mut mx = scopeguard::guard((&mut self.maxima, Vec::new()), |(maxima, staged)| {
			for at in staged.into_iter().rev() {
				maxima.remove_at(at);
			}
		});
		let stale_own;
		let stale_left;
		let stale_right;
		{
			let (maxima, staged) = &mut *mx;
			if let (Some(left), Some(true), Some(false)) = (left, left_becomes, left_was) {
				let slot = maxima.slot(points[left].value(), points[left].arg());
				maxima.insert_at(slot, points[left].clone());
				staged.push(slot);
			}
			if let (Some(right), Some(true), Some(false)) = (right, right_becomes, right_was) {
				let slot = maxima.slot(points[right].value(), points[right].arg());
				maxima.insert_at(slot, points[right].clone());
				staged.push(slot);
			}

			stale_own = maxima.locate(points[at].value(), points[at].arg()).ok();
			stale_left = match (left, left_becomes, left_was) {
				(Some(left), Some(false), Some(true)) => maxima
					.locate(points[left].value(), points[left].arg())
					.ok(),
				_ => None,
			};
			stale_right = match (right, right_becomes, right_was) {
				(Some(right), Some(false), Some(true)) => maxima
					.locate(points[right].value(), points[right].arg())
					.ok(),
				_ => None,
			};
		}

		// Commit point: nothing below runs user code or unwinds.
		let (maxima, _) = ScopeGuard::into_inner(mx);
		let mut stale = [stale_own, stale_left, stale_right];
		stale.sort_unstable();
		for at in stale.into_iter().rev().flatten() {
			maxima.remove_at(at);
		}
		let point = self.fun.remove_at(at);
		self.range.drop_holder(value_at);
		point.pipe(Some)
	}
}

impl<A, V> Default for FunctionMaxima<A, V> {
	fn default() -> Self {
		Self::new()
	}
}

impl<A, V> Clone for FunctionMaxima<A, V> {
	fn clone(&self) -> Self {
		Self {
			fun: self.fun.clone(),
			maxima: self.maxima.clone(),
			range: self.range.clone(),
		}
	}
}

impl<A: Debug, V: Debug> Debug for FunctionMaxima<A, V> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_map()
			.entries(self.iter().map(|point| (point.arg(), point.value())))
			.finish()
	}
}

impl<'a, A, V> IntoIterator for &'a FunctionMaxima<A, V> {
	type Item = &'a Point<A, V>;
	type IntoIter = slice::Iter<'a, Point<A, V>>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

impl<A: Ord, V: Ord> Extend<(A, V)> for FunctionMaxima<A, V> {
	fn extend<I: IntoIterator<Item = (A, V)>>(&mut self, iter: I) {
		for (arg, value) in iter {
			self.set_value(arg, value);
		}
	}
}

impl<A: Ord, V: Ord> FromIterator<(A, V)> for FunctionMaxima<A, V> {
	fn from_iter<I: IntoIterator<Item = (A, V)>>(iter: I) -> Self {
		Self::new().tap_mut(|this| this.extend(iter))
	}
}

/// Whether the point at `at` is a local maximum of `points`, pretending the point at `skip`
/// (if any) has already been removed.
fn is_maximum<A, V: Ord>(points: &[Point<A, V>], at: usize, skip: Option<usize>) -> bool {
	left_check(points, at, skip) && right_check(points, at, skip)
}

fn left_check<A, V: Ord>(points: &[Point<A, V>], at: usize, skip: Option<usize>) -> bool {
	let mut left = match at.checked_sub(1) {
		None => return true,
		Some(left) => left,
	};
	if Some(left) == skip {
		match left.checked_sub(1) {
			None => return true,
			Some(further) => left = further,
		}
	}
	points[at].value().cmp(points[left].value()) != Ordering::Less
}

fn right_check<A, V: Ord>(points: &[Point<A, V>], at: usize, skip: Option<usize>) -> bool {
	let mut right = at + 1;
	if Some(right) == skip {
		right += 1;
	}
	if right >= points.len() {
		return true;
	}
	points[at].value().cmp(points[right].value()) != Ordering::Less
}

#[cfg(test)]
impl<A: Ord, V: Ord> FunctionMaxima<A, V> {
	/// Panics unless every structural invariant currently holds.
	pub(crate) fn assert_valid(&self) {
		let points = self.fun.as_slice();

		// Arguments strictly increase.
		for pair in points.windows(2) {
			assert_eq!(pair[0].arg().cmp(pair[1].arg()), Ordering::Less);
		}

		// The maxima index holds exactly the local maxima, strictly ordered by
		// (value descending, argument ascending), sharing cells with their domain points.
		let maxima = self.maxima.as_slice();
		for pair in maxima.windows(2) {
			let key = pair[0]
				.value()
				.cmp(pair[1].value())
				.reverse()
				.then_with(|| pair[0].arg().cmp(pair[1].arg()));
			assert_eq!(key, Ordering::Less);
		}
		let expected = points
			.iter()
			.enumerate()
			.filter(|&(at, _)| is_maximum(points, at, None))
			.count();
		assert_eq!(maxima.len(), expected);
		for entry in maxima {
			let at = self
				.fun
				.locate(entry.arg())
				.expect("maxima entry without a domain point");
			assert!(Rc::ptr_eq(&points[at].arg_cell(), &entry.arg_cell()));
			assert!(Rc::ptr_eq(&points[at].value_cell(), &entry.value_cell()));
			assert!(is_maximum(points, at, None));
		}

		// Range entries are live, strictly ordered, and account for every point exactly once.
		let entries = self.range.entries();
		for pair in entries.windows(2) {
			assert_eq!(pair[0].0.as_ref().cmp(pair[1].0.as_ref()), Ordering::Less);
		}
		let mut accounted = 0;
		for (cell, holders) in &entries {
			let sharing = points
				.iter()
				.filter(|point| Rc::ptr_eq(&point.value_cell(), cell))
				.count();
			assert!(*holders > 0);
			assert_eq!(sharing, *holders);
			accounted += sharing;
		}
		assert_eq!(accounted, points.len());
	}
}
