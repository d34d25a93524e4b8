// Vector store module
// Flat exact-search index and its paired on-disk persistence

pub mod flat;
pub mod store;

pub use flat::{FlatIndex, Neighbor, l2_distance_squared};
pub use store::{IndexMetadata, IndexStore, IndexSummary, LoadedIndex};
