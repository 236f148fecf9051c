//! The recency-ordered string map and its per-key entries.

mod entry;
mod ordered_map;

pub use ordered_map::OrderedStringMap;
