//! Indicator Classifier
//!
//! Static mapping from backend indicator codes to the six report categories.
//! The table mirrors the backend's code space and must be updated together
//! with it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The six fixed report categories, declared in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    SharedResources,
    ForeignerControl,
    DirectorshipPattern,
    ShareholdingPatterns,
    FinancialIndicators,
    HighRiskIndustry,
}

/// Coarse label shown next to each indicator row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisplayCategory {
    Ownership,
    Governance,
    Compliance,
    Financial,
    Assets,
    Risk,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::SharedResources,
        Category::ForeignerControl,
        Category::DirectorshipPattern,
        Category::ShareholdingPatterns,
        Category::FinancialIndicators,
        Category::HighRiskIndustry,
    ];

    /// Position in the report, 0-based.
    pub fn order(&self) -> usize {
        match self {
            Category::SharedResources => 0,
            Category::ForeignerControl => 1,
            Category::DirectorshipPattern => 2,
            Category::ShareholdingPatterns => 3,
            Category::FinancialIndicators => 4,
            Category::HighRiskIndustry => 5,
        }
    }

    pub fn from_index(index: usize) -> Option<Category> {
        Self::ALL.get(index).copied()
    }

    pub fn id(&self) -> &'static str {
        match self {
            Category::SharedResources => "shared-resources",
            Category::ForeignerControl => "foreigner-control",
            Category::DirectorshipPattern => "directorship-pattern",
            Category::ShareholdingPatterns => "shareholding-patterns",
            Category::FinancialIndicators => "financial-indicators",
            Category::HighRiskIndustry => "high-risk-industry",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Category::SharedResources => "Shared Resources",
            Category::ForeignerControl => "Foreigner Control",
            Category::DirectorshipPattern => "Directorship Pattern",
            Category::ShareholdingPatterns => "Shareholding Patterns",
            Category::FinancialIndicators => "Financial Indicators",
            Category::HighRiskIndustry => "High Risk Industry",
        }
    }

    pub fn name_th(&self) -> &'static str {
        match self {
            Category::SharedResources => "ทรัพยากรที่ใช้ร่วมกัน",
            Category::ForeignerControl => "การควบคุมโดยต่างชาติ",
            Category::DirectorshipPattern => "รูปแบบกรรมการ",
            Category::ShareholdingPatterns => "รูปแบบการถือหุ้น",
            Category::FinancialIndicators => "ตัวชี้วัดทางการเงิน",
            Category::HighRiskIndustry => "อุตสาหกรรมเสี่ยงสูง",
        }
    }

    /// Colour token, interpreted by the presentation layer.
    pub fn color(&self) -> &'static str {
        match self {
            Category::SharedResources => "blue",
            Category::ForeignerControl => "cyan",
            Category::DirectorshipPattern => "purple",
            Category::ShareholdingPatterns => "orange",
            Category::FinancialIndicators => "green",
            Category::HighRiskIndustry => "red",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Category::SharedResources => "👥",
            Category::ForeignerControl => "🌐",
            Category::DirectorshipPattern => "👑",
            Category::ShareholdingPatterns => "🏢",
            Category::FinancialIndicators => "💲",
            Category::HighRiskIndustry => "⚠",
        }
    }

    pub fn display_category(&self) -> DisplayCategory {
        match self {
            Category::SharedResources => DisplayCategory::Ownership,
            Category::ForeignerControl => DisplayCategory::Compliance,
            Category::DirectorshipPattern => DisplayCategory::Governance,
            Category::ShareholdingPatterns => DisplayCategory::Ownership,
            Category::FinancialIndicators => DisplayCategory::Financial,
            Category::HighRiskIndustry => DisplayCategory::Assets,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::fmt::Display for DisplayCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DisplayCategory::Ownership => "Ownership",
            DisplayCategory::Governance => "Governance",
            DisplayCategory::Compliance => "Compliance",
            DisplayCategory::Financial => "Financial",
            DisplayCategory::Assets => "Assets",
            DisplayCategory::Risk => "Risk",
        };
        write!(f, "{}", label)
    }
}

/// Result of classifying one code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    pub display_category: DisplayCategory,
}

/// Known codes in canonical (lowercase) form, grouped by category.
pub const CATEGORY_TABLE: &[(&str, Category)] = &[
    ("ad10000", Category::SharedResources),
    ("ad20000", Category::SharedResources),
    ("au10000", Category::SharedResources),
    ("au20000", Category::SharedResources),
    ("d40000", Category::ForeignerControl),
    ("s50000", Category::ForeignerControl),
    ("u10000", Category::ForeignerControl),
    ("d10000", Category::DirectorshipPattern),
    ("d60000", Category::DirectorshipPattern),
    ("d70000", Category::DirectorshipPattern),
    ("d80000", Category::DirectorshipPattern),
    ("c10000", Category::ShareholdingPatterns),
    ("h20000", Category::ShareholdingPatterns),
    ("h30000", Category::ShareholdingPatterns),
    ("h40000", Category::ShareholdingPatterns),
    ("h70000", Category::ShareholdingPatterns),
    ("s20000", Category::ShareholdingPatterns),
    ("s30000", Category::ShareholdingPatterns),
    ("u30000", Category::ShareholdingPatterns),
    ("f10000", Category::FinancialIndicators),
    ("i10000", Category::HighRiskIndustry),
    ("i20000", Category::HighRiskIndustry),
    ("i30000", Category::HighRiskIndustry),
];

lazy_static::lazy_static! {
    static ref CODE_TO_CATEGORY: HashMap<&'static str, Category> =
        CATEGORY_TABLE.iter().copied().collect();
}

/// Canonical form used as the identity of an indicator across the pipeline.
pub fn canonical_code(code: &str) -> String {
    code.trim().to_lowercase()
}

/// Classify a raw code. Unknown codes yield `None`.
pub fn classify(code: &str) -> Option<Classification> {
    CODE_TO_CATEGORY
        .get(canonical_code(code).as_str())
        .map(|category| Classification {
            category: *category,
            display_category: category.display_category(),
        })
}

/// Number of codes known to the classifier.
pub fn known_code_count() -> usize {
    CATEGORY_TABLE.len()
}
