//! An order-statistic AVL tree for Rust.
//!
//! This crate provides [`OSAvlSet`], an ordered set of unique keys backed by a
//! height-balanced binary search tree. Every node caches the size of its subtree,
//! which adds O(log n) order-statistic queries to the usual ordered-set operations:
//!
//! - [`select`](OSAvlSet::select) - Get the key at a one-based sorted position
//! - [`rank`](OSAvlSet::rank) - Get the one-based sorted position of a key
//! - [`count_less_than`](OSAvlSet::count_less_than) - Count keys strictly below a bound
//! - Indexing by [`Rank`] - e.g., `set[Rank(1)]` for the smallest key
//!
//! # Example
//!
//! ```
//! use osavl_tree::{Error, OSAvlSet, Rank};
//!
//! let mut set = OSAvlSet::new();
//! for key in [8, 2, 6, 4] {
//!     set.insert(key)?;
//! }
//!
//! assert_eq!(set.insert(6).unwrap_err(), Error::DuplicateKey);
//! assert_eq!(set.select(3), Ok(&6));
//! assert_eq!(set.rank(&8), Ok(4));
//! assert_eq!(set.count_less_than(&5), 2);
//! assert_eq!(set[Rank(1)], 2);
//!
//! // Cursors walk the sorted sequence and survive unrelated mutations.
//! let four = set.find(&4).position();
//! set.erase(&2)?;
//! set.insert(5)?;
//! let cursor = set.cursor_at(four);
//! assert_eq!(cursor.peek_next(), Some(&5));
//! # Ok::<(), Error>(())
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Stable positions** - Erasing a key never relocates any other key
//! - **Arena storage** - Nodes live in one contiguous slab and refer to each other by index
//! - **`tracing`** - Optional rebalancing diagnostics through the `tracing` facade
//!
//! # Implementation
//!
//! The tree keeps a balance factor of `height(right) - height(left)` in `{-1, 0, +1}`
//! for every node, restoring it with single or double rotations after each insert and
//! erase. The smallest and largest keys are cached so both ends are reachable in O(1).

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod error;
mod order_statistic;
mod raw;

pub mod osavl_set;
pub mod query;

pub use error::Error;
pub use order_statistic::Rank;
pub use osavl_set::{Cursor, OSAvlSet, Position};
