//! Repolens Analyzer - repository intake statistics
//!
//! Shallow-clones a repository into a per-call scratch directory, walks the
//! working tree, and returns aggregate file/line statistics. The snapshot is
//! removed before the call returns, on success and failure alike.

pub mod analyzer;
pub mod walk;

pub use analyzer::*;
pub use walk::*;
