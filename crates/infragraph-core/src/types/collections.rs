//! Re-exports of performance-oriented collection types.

pub use rustc_hash::{FxHashMap, FxHashSet};
pub use smallvec::SmallVec;
pub use std::collections::BTreeMap;

/// SmallVec sized for relation paths (blast radius rarely goes past 4 hops).
pub type SmallVec4<T> = SmallVec<[T; 4]>;
