//! Global-ranking pipeline: the merged-list wire codec, overflow rescue,
//! and final per-query list assembly.

pub mod codec;
pub mod list_builder;
pub mod rescue;
