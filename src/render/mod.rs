//! Detail Renderers
//!
//! Per-indicator formatters that turn a detail response into a `DetailView`
//! of labelled sections. Each formatter is a pure function that does its own
//! deduplication and aggregation over the backend rows; codes without one
//! fall back to a plain table of the backend's columns.

mod directorship;
mod financial;
mod foreign;
mod helpers;
mod shared;
mod shareholding;

use std::collections::HashMap;

use serde_json::Value;

use crate::api::IndicatorDetailResponse;

pub(crate) const NO_DETAIL: &str = "ไม่มีข้อมูลรายละเอียด";
const GENERIC_TITLE: &str = "รายละเอียดเพิ่มเติม";

/// Accent colour of a detail card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Rose,
    Cyan,
    Amber,
    Emerald,
    Purple,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SectionBody {
    Text(String),
    List(Vec<String>),
    /// Headed sub-lists, e.g. companies per year
    Groups(Vec<(String, Vec<String>)>),
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailSection {
    pub label: String,
    pub body: SectionBody,
}

impl DetailSection {
    pub fn text(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            body: SectionBody::Text(text.into()),
        }
    }

    pub fn list(label: impl Into<String>, items: Vec<String>) -> Self {
        Self {
            label: label.into(),
            body: SectionBody::List(items),
        }
    }
}

/// Rendered detail card
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub title: String,
    pub tone: Tone,
    pub sections: Vec<DetailSection>,
}

impl DetailView {
    pub fn new(title: impl Into<String>, tone: Tone) -> Self {
        Self {
            title: title.into(),
            tone,
            sections: Vec::new(),
        }
    }

    pub fn push(&mut self, section: DetailSection) {
        self.sections.push(section);
    }

    /// Push a list section unless it has no items.
    pub fn push_list(&mut self, label: &str, items: Vec<String>) {
        if !items.is_empty() {
            self.push(DetailSection::list(label, items));
        }
    }

    /// True when no section could be built; shown as "no detail".
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn section(&self, label: &str) -> Option<&DetailSection> {
        self.sections.iter().find(|s| s.label == label)
    }
}

pub type Renderer = fn(&IndicatorDetailResponse) -> DetailView;

/// Code → formatter map with a generic fallback
pub struct DetailRegistry {
    renderers: HashMap<String, Renderer>,
}

impl Default for DetailRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        shared::register(&mut registry);
        shareholding::register(&mut registry);
        directorship::register(&mut registry);
        foreign::register(&mut registry);
        financial::register(&mut registry);
        registry
    }
}

impl DetailRegistry {
    /// Registry with every built-in renderer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with no specialized renderers; everything is generic.
    pub fn empty() -> Self {
        Self {
            renderers: HashMap::new(),
        }
    }

    pub fn register(&mut self, code: &str, renderer: Renderer) {
        self.renderers.insert(code.trim().to_uppercase(), renderer);
    }

    /// Whether `code` has a specialized renderer.
    pub fn has_renderer(&self, code: &str) -> bool {
        self.renderers.contains_key(&code.trim().to_uppercase())
    }

    pub fn codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.renderers.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }

    /// Render `resp` for `code`. A response without rows renders nothing.
    pub fn render(&self, code: &str, resp: &IndicatorDetailResponse) -> Option<DetailView> {
        if resp.rows().is_empty() {
            return None;
        }
        let view = match self.renderers.get(&code.trim().to_uppercase()) {
            Some(renderer) => renderer(resp),
            None => generic(resp),
        };
        Some(view)
    }
}

fn cell_text(v: Option<&Value>) -> String {
    match v {
        None | Some(Value::Null) => "—".to_string(),
        Some(Value::String(s)) => s.clone(),
        // Objects and arrays print as compact JSON.
        Some(other) => other.to_string(),
    }
}

/// Plain table of the backend's columns.
pub fn generic(resp: &IndicatorDetailResponse) -> DetailView {
    let mut view = DetailView::new(GENERIC_TITLE, Tone::Amber);
    let columns = &resp.details.columns;
    if resp.rows().is_empty() || columns.is_empty() {
        return view;
    }

    let headers = columns.iter().map(|c| c.label.clone()).collect();
    let rows = resp
        .rows()
        .iter()
        .map(|row| columns.iter().map(|c| cell_text(row.get(&c.key))).collect())
        .collect();
    view.push(DetailSection {
        label: String::new(),
        body: SectionBody::Table { headers, rows },
    });
    view
}
