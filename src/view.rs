//! Filtered views over collections and the pool that shares them.

mod filter;
mod filtered;
mod pool;

pub use filter::fuzzy_matches;
pub use filtered::{FilteredView, SortKey, ViewId, ViewRef};
pub use pool::{PooledView, ViewPool};

#[cfg(test)]
mod tests;
