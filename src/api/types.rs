//! Wire types for the ClariFind REST API.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Company identity as returned by resolve, suggest and summary endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyLite {
    #[serde(default)]
    pub company_id: Option<i64>,
    #[serde(default)]
    pub registration_id: Option<String>,
    #[serde(default)]
    pub name_th: Option<String>,
    #[serde(default)]
    pub name_en: Option<String>,
}

impl CompanyLite {
    /// Thai name, then English name, whichever is present.
    pub fn display_name(&self) -> Option<&str> {
        non_empty(self.name_th.as_deref()).or_else(|| non_empty(self.name_en.as_deref()))
    }
}

/// One indicator row of the summary endpoint.
///
/// Older backends send `indicator`, `name` and `value` instead of `code`,
/// `name_th` and `flag`; some send both spellings. Use the accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawIndicatorRow {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub indicator: Option<String>,
    #[serde(default)]
    pub name_th: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub name_en: Option<String>,
    /// `true` when the indicator condition was found for the company.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub flag: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub value: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl RawIndicatorRow {
    /// `code`, then `indicator`.
    pub fn code(&self) -> Option<&str> {
        non_empty(self.code.as_deref()).or_else(|| non_empty(self.indicator.as_deref()))
    }

    /// `name_th`, then `name`.
    pub fn name_th(&self) -> Option<&str> {
        non_empty(self.name_th.as_deref()).or_else(|| non_empty(self.name.as_deref()))
    }

    pub fn is_flagged(&self) -> bool {
        self.flag || self.value
    }
}

/// Decode summary rows one by one; a malformed row is skipped, not fatal.
fn deserialize_rows<'de, D>(deserializer: D) -> Result<Vec<RawIndicatorRow>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(values
        .into_iter()
        .enumerate()
        .filter_map(|(idx, value)| match serde_json::from_value(value) {
            Ok(row) => Some(row),
            Err(e) => {
                debug!("Skipping malformed indicator row #{}: {}", idx, e);
                None
            }
        })
        .collect())
}

/// Accepts `0|1`, booleans, `null` and numeric strings.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Some(Value::String(s)) => {
            matches!(s.trim().to_lowercase().as_str(), "1" | "true" | "y" | "yes")
        }
        Some(_) => false,
    })
}

/// `GET /v1/indicators/summary`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSummary {
    #[serde(default)]
    pub company: Option<CompanyLite>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub registration_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_rows")]
    pub indicators: Vec<RawIndicatorRow>,
    #[serde(default)]
    pub found_count: Option<u32>,
    #[serde(default)]
    pub total: Option<u32>,
    #[serde(default)]
    pub coverage_pct: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FoundCode {
    #[serde(alias = "indicator")]
    pub code: String,
}

/// `GET /v1/indicator/true-only`: only the codes whose condition was found.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrueOnlyResponse {
    #[serde(default)]
    pub registration_id: Option<String>,
    #[serde(default)]
    pub indicators: Vec<FoundCode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRef {
    pub code: String,
    #[serde(default)]
    pub name_th: Option<String>,
    #[serde(default)]
    pub name_en: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailColumn {
    pub key: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    pub total: u64,
    pub take: u64,
    pub skip: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailTable {
    #[serde(default)]
    pub rows: Vec<Value>,
    #[serde(default)]
    pub columns: Vec<DetailColumn>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// `GET /v1/indicator/details`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorDetailResponse {
    #[serde(default)]
    pub company: Option<CompanyLite>,
    pub indicator: IndicatorRef,
    #[serde(default)]
    pub details: DetailTable,
    #[serde(default)]
    pub meta: Option<Map<String, Value>>,
}

impl IndicatorDetailResponse {
    pub fn rows(&self) -> &[Value] {
        &self.details.rows
    }

    /// Indicator title from the backend, if it sent one.
    pub fn title(&self) -> Option<&str> {
        non_empty(self.indicator.name_th.as_deref())
    }
}

/// `GET /v1/company/resolve`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolveResponse {
    #[serde(default)]
    pub company: Vec<CompanyLite>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// `GET /v1/company/suggest`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestResponse {
    #[serde(default)]
    pub suggestions: Vec<CompanyLite>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeResponse {
    pub user: User,
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.trim().is_empty())
}
