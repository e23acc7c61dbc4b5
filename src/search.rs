//! Company lookup helpers
//!
//! Turns whatever the user typed into either a registration number or a
//! name query, and resolves it to a single company through the API.

use tracing::debug;

use crate::api::{ApiClient, ApiError, CompanyLite};

const MIN_REG_DIGITS: usize = 8;
const MAX_REG_DIGITS: usize = 13;

/// Digits of `input` when they form a plausible registration number
/// (8 to 13 digits once separators are removed).
pub fn parse_registration_id(input: &str) -> Option<String> {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    (MIN_REG_DIGITS..=MAX_REG_DIGITS)
        .contains(&digits.len())
        .then_some(digits)
}

/// How a lookup string is interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Registration(String),
    Name(String),
}

impl Lookup {
    pub fn parse(input: &str) -> Result<Self, ApiError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ApiError::InvalidInput("empty query".to_string()));
        }
        // Names may contain digits; only mostly-numeric input is a number.
        let digit_share = input.chars().filter(char::is_ascii_digit).count() * 2;
        match parse_registration_id(input) {
            Some(id) if digit_share >= input.chars().count() => Ok(Lookup::Registration(id)),
            _ => Ok(Lookup::Name(input.to_string())),
        }
    }
}

/// Resolve `input` to candidate companies: an exact registration match, or
/// the first `take` name matches.
pub async fn find_companies(
    api: &ApiClient,
    input: &str,
    take: u64,
) -> Result<Vec<CompanyLite>, ApiError> {
    let lookup = Lookup::parse(input)?;
    debug!("Company lookup {:?}", lookup);
    let res = match &lookup {
        Lookup::Registration(id) => match api.resolve_registration(id).await {
            Ok(res) => res,
            Err(ApiError::NotFound) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        },
        Lookup::Name(q) => api.search_companies(q, 0, take).await?,
    };

    let mut companies = res.company;
    // A bare registration number with no resolve hit is still analysable.
    if companies.is_empty() {
        if let Lookup::Registration(id) = lookup {
            companies.push(CompanyLite {
                registration_id: Some(id),
                ..Default::default()
            });
        }
    }
    Ok(companies)
}
