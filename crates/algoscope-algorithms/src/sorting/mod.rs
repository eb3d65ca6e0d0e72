//! Sorting algorithms, grouped by how they report progress.

pub mod painted;
pub mod logged;
pub mod direct;
