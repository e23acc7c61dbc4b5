//! ClariFind Client
//!
//! Terminal client for the ClariFind compliance-indicator service:
//! - Company lookup by name or registration number
//! - Normalization of backend indicator rows into six report categories
//! - Timed, cancellable reveal of the results
//! - Lazy per-indicator drill-down with specialized renderers

pub mod analysis;
pub mod api;
pub mod config;
pub mod indicators;
pub mod render;
pub mod report;
pub mod reveal;
pub mod search;
pub mod telemetry;
pub mod text;
pub mod tui;

// Re-exports for convenience
pub use analysis::{Analysis, AnalysisOutcome};
pub use api::{ApiClient, ApiError, IndicatorApi, Session};
pub use config::ClientConfig;
pub use indicators::{classify, Category, DetailLoader, NormalizedReport, Normalizer, Status};
pub use render::DetailRegistry;
pub use report::{build_view, ResultFilter, ResultsView};
pub use reveal::{RevealSequencer, RevealTimings};
