//! Cache identity and shared item state.

pub mod key;
pub mod keys;
pub mod store;

pub use key::{CacheKey, Segment};
pub use store::ItemStore;
