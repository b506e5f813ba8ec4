//! Repolens Core - shared data structures and infrastructure
//!
//! Defines the error taxonomy, logging bootstrap, and result types used by
//! the repository snapshot analyzer.

pub mod error;
pub mod logging;
pub mod types;

pub use error::*;
pub use logging::*;
pub use types::*;
