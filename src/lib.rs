//! An incremental index of the local maxima of a partial function.
//!
//! [`FunctionMaxima`] stores the graph of a function from `A` to `V` and keeps, in step with
//! every mutation, the set of the function's local maxima. Both are iterable in their natural
//! orders: the graph by increasing argument, the maxima by decreasing value.
//!
//! Arguments and values live in shared, weakly observable cells, so equal values are stored
//! once and container clones copy no `A` or `V` at all.
//!
//! # Panic safety
//!
//! `A` and `V` take part through [`Ord`] alone, and a user-supplied `cmp` is allowed to panic.
//! Every mutating operation is strongly panic-safe: if a comparison unwinds mid-mutation, the
//! container rolls back to exactly the state it had before the call.
//!
//! # Performance Focus
//!
//! The indexes are flat sorted vectors: lookups cost O(log n) comparisons, while insertion and
//! removal are position-addressed so the rollback machinery never has to compare anything.
//! This favours relatively small to medium entry counts over asymptotic node-storage wins.
#![no_std]
#![doc(html_root_url = "https://docs.rs/function-maxima/0.1.0")]
#![warn(clippy::pedantic, missing_docs)]
#![allow(clippy::semicolon_if_nothing_returned)]

#[cfg(doctest)]
#[doc = include_str!("../README.md")]
mod readme {}

extern crate alloc;

#[cfg(test)]
extern crate std;

mod domain;
mod function_maxima;
mod maxima;
mod point;
mod range;

pub use self::{
	function_maxima::{FunctionMaxima, InvalidArg},
	point::Point,
};
