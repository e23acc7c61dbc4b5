//! Indicator Normalizer
//!
//! Turns the backend's unordered indicator rows into the ordered, numbered
//! list the report is built from: unknown codes dropped, one record per
//! code, grouped by category in display order, fails first within a group,
//! then Thai-collated names.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::category::{canonical_code, classify, Category, DisplayCategory, CATEGORY_TABLE};
use crate::api::RawIndicatorRow;
use crate::text::{sanitize_for_display, thai_collate};

const PLACEHOLDER_PREFIX: &str = "(ไม่มีข้อมูล)";
const PLACEHOLDER_DESCRIPTION: &str = "ไม่มีข้อมูลจาก backend สำหรับตัวชี้วัดนี้";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pass,
    Fail,
}

impl Status {
    pub fn from_flag(flag: bool) -> Self {
        if flag {
            Status::Fail
        } else {
            Status::Pass
        }
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, Status::Fail)
    }

    /// Sort rank: fails before passes.
    fn rank(&self) -> u8 {
        match self {
            Status::Fail => 0,
            Status::Pass => 1,
        }
    }
}

/// What to do with table codes the backend did not return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownCodePolicy {
    /// Report only what the backend sent.
    #[default]
    Drop,
    /// Add a "no data" pass record for every missing table code.
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedIndicator {
    /// Running number over the whole report, starting at 1
    pub display_id: usize,
    /// Canonical lowercase code
    pub code: String,
    pub name_th: String,
    pub name_en: String,
    pub status: Status,
    pub category: Category,
    pub display_category: DisplayCategory,
    pub description: Option<String>,
    pub updated_at: Option<String>,
    /// Synthesized because the backend had no row for this code
    pub placeholder: bool,
}

impl NormalizedIndicator {
    /// Heading for the row: English name, falling back to the code.
    pub fn title(&self) -> &str {
        if self.name_en.is_empty() {
            &self.code
        } else {
            &self.name_en
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    policy: UnknownCodePolicy,
}

impl Normalizer {
    pub fn new(policy: UnknownCodePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> UnknownCodePolicy {
        self.policy
    }

    /// Normalize one company's rows. `found` holds codes reported as found by
    /// the true-only endpoint; they are marked as fails regardless of the
    /// row's own flag.
    pub fn normalize(
        &self,
        rows: &[RawIndicatorRow],
        found: &HashSet<String>,
    ) -> Vec<NormalizedIndicator> {
        let found: HashSet<String> = found.iter().map(|c| canonical_code(c)).collect();
        let mut out: Vec<NormalizedIndicator> = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::new();

        for row in rows {
            let Some(raw_code) = row.code() else {
                debug!("Skipping indicator row without code");
                continue;
            };
            let code = canonical_code(raw_code);
            let Some(class) = classify(&code) else {
                debug!("Dropping unmapped indicator code {}", code);
                continue;
            };

            let status = Status::from_flag(row.is_flagged() || found.contains(&code));
            if let Some(&idx) = seen.get(&code) {
                if status.is_fail() {
                    out[idx].status = Status::Fail;
                }
                continue;
            }

            let name_th = row
                .name_th()
                .map(sanitize_for_display)
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| code.clone());
            let name_en = row.name_en.as_deref().map(sanitize_for_display).unwrap_or_default();

            seen.insert(code.clone(), out.len());
            out.push(NormalizedIndicator {
                display_id: 0,
                code,
                name_th,
                name_en,
                status,
                category: class.category,
                display_category: class.display_category,
                description: row.description.clone().filter(|d| !d.trim().is_empty()),
                updated_at: row.updated_at.clone(),
                placeholder: false,
            });
        }

        if self.policy == UnknownCodePolicy::Placeholder {
            for (code, category) in CATEGORY_TABLE {
                if seen.contains_key(*code) {
                    continue;
                }
                out.push(NormalizedIndicator {
                    display_id: 0,
                    code: code.to_string(),
                    name_th: format!("{} {}", PLACEHOLDER_PREFIX, code),
                    name_en: String::new(),
                    status: Status::Pass,
                    category: *category,
                    display_category: category.display_category(),
                    description: Some(PLACEHOLDER_DESCRIPTION.to_string()),
                    updated_at: None,
                    placeholder: true,
                });
            }
        }

        // Category derives Ord in display order, so one sort does group + concat.
        out.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then_with(|| a.status.rank().cmp(&b.status.rank()))
                .then_with(|| thai_collate(&a.name_th, &b.name_th))
                .then_with(|| a.code.cmp(&b.code))
        });

        for (idx, indicator) in out.iter_mut().enumerate() {
            indicator.display_id = idx + 1;
        }

        debug!("Normalized {} indicator rows into {} records", rows.len(), out.len());
        out
    }
}

/// One company's normalized indicators with code lookup.
#[derive(Debug, Clone, Default)]
pub struct NormalizedReport {
    registration_id: String,
    company_name: String,
    indicators: Vec<NormalizedIndicator>,
    index: HashMap<String, usize>,
}

impl NormalizedReport {
    pub fn new(
        registration_id: impl Into<String>,
        company_name: impl Into<String>,
        indicators: Vec<NormalizedIndicator>,
    ) -> Self {
        let index = indicators
            .iter()
            .enumerate()
            .map(|(i, ind)| (ind.code.clone(), i))
            .collect();
        Self {
            registration_id: registration_id.into(),
            company_name: company_name.into(),
            indicators,
            index,
        }
    }

    pub fn registration_id(&self) -> &str {
        &self.registration_id
    }

    pub fn company_name(&self) -> &str {
        &self.company_name
    }

    pub fn indicators(&self) -> &[NormalizedIndicator] {
        &self.indicators
    }

    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }

    pub fn find(&self, code: &str) -> Option<&NormalizedIndicator> {
        self.index
            .get(&canonical_code(code))
            .map(|&i| &self.indicators[i])
    }

    pub fn status_of(&self, code: &str) -> Option<Status> {
        self.find(code).map(|i| i.status)
    }

    /// Indicators of one category, in report order.
    pub fn in_category(&self, category: Category) -> Vec<&NormalizedIndicator> {
        self.indicators
            .iter()
            .filter(|i| i.category == category)
            .collect()
    }

    /// (fail, pass) over the whole report.
    pub fn counts(&self) -> (usize, usize) {
        let fail = self.indicators.iter().filter(|i| i.status.is_fail()).count();
        (fail, self.indicators.len() - fail)
    }

    /// Whole-report failure rate in percent, rounded.
    pub fn failure_rate(&self) -> u32 {
        if self.indicators.is_empty() {
            return 0;
        }
        let (fail, _) = self.counts();
        ((fail as f64 / self.indicators.len() as f64) * 100.0).round() as u32
    }
}
