//! Results view model
//!
//! Turns a normalized report plus a reveal snapshot into what the results
//! screen shows: the summary bar and one section per displayed category,
//! split into fail and pass columns under the active filter. Building a view
//! is pure; changing the filter or the expanded set never touches the
//! sequencer.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::indicators::{Category, NormalizedIndicator, NormalizedReport, Status};
use crate::render::DetailRegistry;
use crate::reveal::RevealState;

pub const SUMMARY_TITLE: &str = "สัดส่วนผลการวิเคราะห์ตัวชี้วัด";
pub const FAIL_HEADING: &str = "พบตัวบ่งชี้";
pub const PASS_HEADING: &str = "ไม่พบตัวบ่งชี้";
pub const EMPTY_FAIL_COLUMN: &str = "ไม่พบตัวบ่งชี้ในหมวดนี้";
pub const EMPTY_PASS_COLUMN: &str = "ไม่มีตัวบ่งชี้ที่ผ่านในหมวดนี้";
pub const PLACEHOLDER_NOTE: &str = "• ไม่มีข้อมูลจาก backend";

/// Which columns are visible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultFilter {
    #[default]
    All,
    Fail,
    Pass,
}

impl ResultFilter {
    /// All → Fail → Pass → All
    pub fn next(self) -> Self {
        match self {
            ResultFilter::All => ResultFilter::Fail,
            ResultFilter::Fail => ResultFilter::Pass,
            ResultFilter::Pass => ResultFilter::All,
        }
    }

    pub fn shows_fail(self) -> bool {
        matches!(self, ResultFilter::All | ResultFilter::Fail)
    }

    pub fn shows_pass(self) -> bool {
        matches!(self, ResultFilter::All | ResultFilter::Pass)
    }
}

impl fmt::Display for ResultFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ResultFilter::All => "ทั้งหมด",
            ResultFilter::Fail => FAIL_HEADING,
            ResultFilter::Pass => PASS_HEADING,
        };
        write!(f, "{}", label)
    }
}

/// Counters over what is displayed so far, against the full report size.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SummaryBar {
    pub fail: usize,
    pub pass: usize,
    pub total: usize,
}

impl SummaryBar {
    pub fn displayed(&self) -> usize {
        self.fail + self.pass
    }

    /// Share of the bar taken by fails, 0.0 when nothing is displayed.
    pub fn fail_ratio(&self) -> f64 {
        match self.displayed() {
            0 => 0.0,
            n => self.fail as f64 / n as f64,
        }
    }

    pub fn pass_ratio(&self) -> f64 {
        match self.displayed() {
            0 => 0.0,
            n => self.pass as f64 / n as f64,
        }
    }

    pub fn fail_label(&self) -> Option<String> {
        (self.fail > 0).then(|| format!("{} {}", FAIL_HEADING, self.fail))
    }

    pub fn pass_label(&self) -> Option<String> {
        (self.pass > 0).then(|| format!("{} {}", PASS_HEADING, self.pass))
    }

    pub fn description(&self) -> String {
        format!(
            "การแสดงสัดส่วนระหว่างตัวบ่งชี้ที่พบและไม่พบจากทั้งหมด {} ตัวชี้วัด",
            self.total
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub display_no: usize,
    pub code: String,
    /// English name, or the code
    pub title: String,
    pub name_th: String,
    /// Description, or "—"
    pub description: String,
    pub status: Status,
    pub highlighted: bool,
    /// A specialized detail renderer exists, so the row can expand
    pub has_details: bool,
    pub expanded: bool,
    pub placeholder: bool,
}

impl IndicatorRow {
    fn new(
        indicator: &NormalizedIndicator,
        reveal: &RevealState,
        expanded: &HashSet<String>,
        registry: &DetailRegistry,
    ) -> Self {
        // Only found indicators carry drill-down data.
        let has_details = indicator.status.is_fail() && registry.has_renderer(&indicator.code);
        Self {
            display_no: indicator.display_id,
            code: indicator.code.clone(),
            title: indicator.title().to_string(),
            name_th: indicator.name_th.clone(),
            description: indicator
                .description
                .clone()
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| "—".to_string()),
            status: indicator.status,
            highlighted: reveal.highlighted_code.as_deref() == Some(indicator.code.as_str()),
            has_details,
            expanded: has_details && expanded.contains(&indicator.code),
            placeholder: indicator.placeholder,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategorySection {
    pub category: Category,
    /// Number of displayed codes, whatever the filter
    pub badge: usize,
    /// `None` when the filter hides the column
    pub fail_column: Option<Vec<IndicatorRow>>,
    pub pass_column: Option<Vec<IndicatorRow>>,
}

impl CategorySection {
    pub fn badge_label(&self) -> String {
        format!("{} ตัวชี้วัด", self.badge)
    }

    /// Visible rows, fail column first.
    pub fn rows(&self) -> impl Iterator<Item = &IndicatorRow> {
        self.fail_column
            .iter()
            .flatten()
            .chain(self.pass_column.iter().flatten())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultsView {
    pub registration_id: String,
    pub company_name: String,
    pub filter: ResultFilter,
    pub summary: SummaryBar,
    pub sections: Vec<CategorySection>,
    pub complete: bool,
}

impl ResultsView {
    /// Every visible row in screen order.
    pub fn rows(&self) -> impl Iterator<Item = &IndicatorRow> {
        self.sections.iter().flat_map(CategorySection::rows)
    }

    pub fn row_count(&self) -> usize {
        self.rows().count()
    }

    pub fn position_of(&self, code: &str) -> Option<usize> {
        self.rows().position(|r| r.code == code)
    }

    /// Position of the first row of `category`, if the section is visible.
    pub fn position_of_category(&self, category: Category) -> Option<usize> {
        let mut offset = 0;
        for section in &self.sections {
            if section.category == category {
                return Some(offset);
            }
            offset += section.rows().count();
        }
        None
    }

    pub fn section(&self, category: Category) -> Option<&CategorySection> {
        self.sections.iter().find(|s| s.category == category)
    }
}

/// Build the results view for the current reveal snapshot.
pub fn build_view(
    report: &NormalizedReport,
    reveal: &RevealState,
    filter: ResultFilter,
    expanded: &HashSet<String>,
    registry: &DetailRegistry,
) -> ResultsView {
    let (fail, pass) = reveal.counts(report);
    let mut sections = Vec::new();

    for &category in &reveal.displayed_categories {
        let codes = reveal.displayed(category);
        let indicators: Vec<&NormalizedIndicator> =
            codes.iter().filter_map(|c| report.find(c)).collect();

        let column = |status: Status| -> Vec<IndicatorRow> {
            indicators
                .iter()
                .filter(|i| i.status == status)
                .map(|i| IndicatorRow::new(i, reveal, expanded, registry))
                .collect()
        };
        let fails = column(Status::Fail);
        let passes = column(Status::Pass);

        let elided = match filter {
            ResultFilter::Fail => fails.is_empty(),
            ResultFilter::Pass => passes.is_empty(),
            ResultFilter::All => false,
        };
        if elided {
            continue;
        }

        sections.push(CategorySection {
            category,
            badge: codes.len(),
            fail_column: filter.shows_fail().then_some(fails),
            pass_column: filter.shows_pass().then_some(passes),
        });
    }

    ResultsView {
        registration_id: report.registration_id().to_string(),
        company_name: report.company_name().to_string(),
        filter,
        summary: SummaryBar {
            fail,
            pass,
            total: report.len(),
        },
        sections,
        complete: reveal.is_complete(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{Category, DisplayCategory};
    use crate::reveal::RevealPhase;
    use std::collections::HashMap;

    fn indicator(
        display_id: usize,
        code: &str,
        category: Category,
        status: Status,
    ) -> NormalizedIndicator {
        NormalizedIndicator {
            display_id,
            code: code.to_string(),
            name_th: format!("ชื่อ {}", code),
            name_en: String::new(),
            status,
            category,
            display_category: DisplayCategory::Ownership,
            description: None,
            updated_at: None,
            placeholder: false,
        }
    }

    fn sample() -> (NormalizedReport, RevealState) {
        let report = NormalizedReport::new(
            "0105551234567",
            "บริษัท ทดสอบ จำกัด",
            vec![
                indicator(1, "ad10000", Category::SharedResources, Status::Fail),
                indicator(2, "au10000", Category::SharedResources, Status::Pass),
                indicator(3, "d40000", Category::ForeignerControl, Status::Pass),
                indicator(4, "i10000", Category::HighRiskIndustry, Status::Pass),
            ],
        );
        let mut displayed = HashMap::new();
        displayed.insert(
            Category::SharedResources,
            vec!["ad10000".to_string(), "au10000".to_string()],
        );
        displayed.insert(Category::ForeignerControl, vec!["d40000".to_string()]);
        let reveal = RevealState {
            phase: RevealPhase::RevealingCategory(2),
            displayed_categories: vec![Category::SharedResources, Category::ForeignerControl],
            displayed_by_category: displayed,
            highlighted_code: Some("ad10000".to_string()),
        };
        (report, reveal)
    }

    #[test]
    fn test_build_view_all() {
        let (report, reveal) = sample();
        let registry = DetailRegistry::default();
        let view = build_view(&report, &reveal, ResultFilter::All, &HashSet::new(), &registry);

        assert_eq!(view.summary, SummaryBar { fail: 1, pass: 2, total: 4 });
        assert_eq!(view.sections.len(), 2);
        let shared = &view.sections[0];
        assert_eq!(shared.badge_label(), "2 ตัวชี้วัด");
        let fails = shared.fail_column.as_ref().unwrap();
        assert_eq!(fails[0].display_no, 1);
        assert_eq!(fails[0].title, "ad10000");
        assert_eq!(fails[0].description, "—");
        assert!(fails[0].highlighted);
        assert!(fails[0].has_details);
        // passes never expand
        assert!(!shared.pass_column.as_ref().unwrap()[0].has_details);
        assert!(!view.complete);
        assert_eq!(view.position_of("d40000"), Some(2));
    }

    #[test]
    fn test_filter_elides_empty_categories() {
        let (report, reveal) = sample();
        let registry = DetailRegistry::default();

        let none = HashSet::new();
        let fail_view = build_view(&report, &reveal, ResultFilter::Fail, &none, &registry);
        assert_eq!(fail_view.sections.len(), 1);
        assert!(fail_view.sections[0].pass_column.is_none());
        assert_eq!(fail_view.sections[0].badge, 2);

        let pass_view = build_view(&report, &reveal, ResultFilter::Pass, &none, &registry);
        assert_eq!(pass_view.sections.len(), 2);
        assert!(pass_view.sections.iter().all(|s| s.fail_column.is_none()));
        // counters ignore the filter
        assert_eq!(pass_view.summary, fail_view.summary);
    }

    #[test]
    fn test_expanded_requires_renderer() {
        let (report, reveal) = sample();
        let expanded: HashSet<String> = ["ad10000".to_string(), "au10000".to_string()].into();
        let registry = DetailRegistry::empty();
        let view = build_view(&report, &reveal, ResultFilter::All, &expanded, &registry);
        assert!(view.rows().all(|r| !r.expanded));
    }

    #[test]
    fn test_summary_ratios() {
        let bar = SummaryBar { fail: 1, pass: 3, total: 10 };
        assert_eq!(bar.fail_ratio(), 0.25);
        assert_eq!(bar.pass_ratio(), 0.75);
        assert_eq!(bar.fail_label().as_deref(), Some("พบตัวบ่งชี้ 1"));
        assert_eq!(SummaryBar::default().fail_ratio(), 0.0);
        assert_eq!(SummaryBar::default().pass_label(), None);
    }

    #[test]
    fn test_filter_cycle() {
        assert_eq!(ResultFilter::All.next(), ResultFilter::Fail);
        assert_eq!(ResultFilter::Pass.next(), ResultFilter::All);
    }
}
