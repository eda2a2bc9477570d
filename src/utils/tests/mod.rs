//! Test helper utilities
//!
//! - `builders`: helpers for creating test instances of domain models


pub use builders::*;
