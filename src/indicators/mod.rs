//! Indicators Module
//!
//! Code classification, normalization of backend rows into the ordered
//! report, and the lazy per-indicator detail loader.

pub mod category;
pub mod details;
pub mod normalizer;

pub use category::{canonical_code, classify, Category, Classification, DisplayCategory};
pub use details::{DetailLoader, DetailState};
pub use normalizer::{NormalizedIndicator, NormalizedReport, Normalizer, Status, UnknownCodePolicy};
