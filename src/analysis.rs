//! Analysis pipeline
//!
//! Fetches one company's indicator summary together with the list of found
//! codes and normalizes them into a `NormalizedReport`.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};

use crate::api::{ApiError, IndicatorApi, IndicatorSummary, TrueOnlyResponse};
use crate::indicators::{NormalizedReport, Normalizer};
use crate::text::sanitize_for_display;

/// Result of an analysis run
#[derive(Debug, Clone)]
pub enum AnalysisOutcome {
    Ready(Arc<NormalizedReport>),
    /// The backend has no indicator data for this registration ID.
    NoData { registration_id: String },
}

impl AnalysisOutcome {
    pub fn report(&self) -> Option<&Arc<NormalizedReport>> {
        match self {
            AnalysisOutcome::Ready(report) => Some(report),
            AnalysisOutcome::NoData { .. } => None,
        }
    }
}

pub struct Analysis;

impl Analysis {
    /// Run the summary and true-only fetches concurrently and normalize.
    pub async fn run(
        api: &dyn IndicatorApi,
        registration_id: &str,
        normalizer: &Normalizer,
    ) -> Result<AnalysisOutcome, ApiError> {
        let registration_id = registration_id.trim();
        if registration_id.is_empty() {
            return Err(ApiError::InvalidInput("missing registration_id".to_string()));
        }

        let found = async {
            match api.indicator_true_only(registration_id).await {
                Ok(res) => Ok(res),
                // No found list means nothing was found.
                Err(ApiError::NotFound) => Ok(TrueOnlyResponse::default()),
                Err(e) => Err(e),
            }
        };
        let summary = api.indicator_summary(registration_id);
        let (summary, found) = match tokio::try_join!(summary, found) {
            Ok(pair) => pair,
            Err(ApiError::NotFound) => {
                info!("No indicator data for {}", registration_id);
                return Ok(AnalysisOutcome::NoData {
                    registration_id: registration_id.to_string(),
                });
            }
            Err(e) => return Err(e),
        };

        let found: HashSet<String> = found.indicators.into_iter().map(|f| f.code).collect();
        debug!(
            "Summary for {}: {} rows, {} found",
            registration_id,
            summary.indicators.len(),
            found.len()
        );

        let name = company_display_name(&summary, registration_id);
        let indicators = normalizer.normalize(&summary.indicators, &found);
        let report = NormalizedReport::new(registration_id, name, indicators);
        let (fail, pass) = report.counts();
        info!(
            "Analysis for {} ready: {} fail, {} pass",
            registration_id, fail, pass
        );
        Ok(AnalysisOutcome::Ready(Arc::new(report)))
    }
}

/// `company.name_th`, `company.name_en`, `company_name`, then "ทะเบียน <id>".
pub fn company_display_name(summary: &IndicatorSummary, registration_id: &str) -> String {
    summary
        .company
        .as_ref()
        .and_then(|c| c.display_name())
        .or(summary.company_name.as_deref())
        .map(sanitize_for_display)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| format!("ทะเบียน {}", registration_id))
}
