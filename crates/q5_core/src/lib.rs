//! Parallel execution of TPC-H Query 5 over in-memory tables.
//!
//! Line items are split into contiguous chunks, each chunk is joined against
//! prebuilt hash indexes on a worker thread, and the per-nation partial sums
//! are merged into the final result.
pub mod chunk;
pub mod config;
pub mod index;
pub mod merge;
pub mod query;
pub mod tables;

#[cfg(test)]
mod testutil;
