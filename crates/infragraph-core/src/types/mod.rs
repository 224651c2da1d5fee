//! Shared collection types.

pub mod collections;

pub use collections::{FxHashMap, FxHashSet};
