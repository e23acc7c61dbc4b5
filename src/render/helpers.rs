//! Row accessors shared by the renderers.

use std::collections::{BTreeSet, HashSet};

use chrono::Datelike;
use serde_json::Value;

use crate::api::IndicatorDetailResponse;
use crate::text::{format_number, group_thousands, parse_datetime, to_ymd};

static NULL: Value = Value::Null;

pub(super) fn title_or(resp: &IndicatorDetailResponse, fallback: &str) -> String {
    resp.title().unwrap_or(fallback).to_string()
}

pub(super) fn first_row(resp: &IndicatorDetailResponse) -> &Value {
    resp.rows().first().unwrap_or(&NULL)
}

/// Non-blank string field.
pub(super) fn text(row: &Value, key: &str) -> Option<String> {
    row.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// First non-blank string among `keys`.
pub(super) fn first_text(row: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| text(row, k))
}

/// Field that is a JSON number.
pub(super) fn number(row: &Value, key: &str) -> Option<f64> {
    row.get(key).and_then(Value::as_f64)
}

/// JSON number or numeric string.
pub(super) fn to_num(v: Option<&Value>) -> Option<f64> {
    match v? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if !s.trim().is_empty() => {
            s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
        }
        _ => None,
    }
}

/// String or number rendered as an identifier.
pub(super) fn id_text(v: Option<&Value>) -> Option<String> {
    match v? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(super) fn ymd(row: &Value, key: &str) -> Option<String> {
    to_ymd(row.get(key).and_then(Value::as_str))
}

pub(super) fn year_of(row: &Value, key: &str) -> Option<i32> {
    row.get(key)
        .and_then(Value::as_str)
        .and_then(parse_datetime)
        .map(|dt| dt.year())
}

/// "1,234 บริษัท"
pub(super) fn count_text(n: f64, unit: &str) -> String {
    let value = if n.fract() == 0.0 {
        group_thousands(n as i64)
    } else {
        format_number(n)
    };
    format!("{} {}", value, unit)
}

pub(super) fn sorted_unique(items: impl IntoIterator<Item = String>) -> Vec<String> {
    items.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
}

/// Keeps first occurrences, preserving order.
pub(super) fn unique_in_order(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items.into_iter().filter(|i| seen.insert(i.clone())).collect()
}

/// Identity of a related company row: its detail id, or registration number
/// plus name when the id is missing.
pub(super) fn company_key(row: &Value) -> String {
    id_text(row.get("company_id_detail")).unwrap_or_else(|| {
        let name = text(row, "name_th").or_else(|| text(row, "name_en")).unwrap_or_default();
        format!("{}-{}", text(row, "registration_id").unwrap_or_default(), name)
    })
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct Company {
    pub reg: Option<String>,
    pub name_th: Option<String>,
    pub name_en: Option<String>,
}

impl Company {
    pub fn from_row(row: &Value) -> Self {
        Self {
            reg: text(row, "registration_id"),
            name_th: text(row, "name_th"),
            name_en: text(row, "name_en"),
        }
    }

    /// Name (or registration number) followed by the registration number.
    pub fn label(&self) -> String {
        let name = self
            .name_th
            .as_deref()
            .or(self.name_en.as_deref())
            .or(self.reg.as_deref())
            .unwrap_or("-");
        match &self.reg {
            Some(reg) => format!("{} — {}", name, reg),
            None => name.to_string(),
        }
    }
}

/// Related companies deduplicated by `company_key`, first row wins.
pub(super) fn dedupe_companies<'a>(rows: impl IntoIterator<Item = &'a Value>) -> Vec<Company> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|row| seen.insert(company_key(row)))
        .map(Company::from_row)
        .collect()
}

/// Person name preferring Thai, with the English name appended when it differs.
pub(super) fn person_label(th: Option<String>, en: Option<String>) -> Option<String> {
    match (th, en) {
        (Some(th), Some(en)) if en != th => Some(format!("{} — {}", th, en)),
        (Some(th), _) => Some(th),
        (None, en) => en,
    }
}
