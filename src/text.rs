//! Text Helpers
//!
//! Display sanitizing, Thai-aware collation and the small number/date
//! formatters shared by the normalizer and the detail renderers.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;

lazy_static::lazy_static! {
    static ref INVISIBLE: Regex = Regex::new("[\u{200B}\u{200C}\u{200D}\u{FEFF}\u{00A0}\u{3000}]").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Replace zero-width and non-breaking spaces, squeeze runs of whitespace and trim.
pub fn sanitize_for_display(s: &str) -> String {
    let replaced = INVISIBLE.replace_all(s, " ");
    WHITESPACE.replace_all(&replaced, " ").trim().to_string()
}

/// Leading vowels are written before the consonant they follow in speech.
fn is_thai_leading_vowel(c: char) -> bool {
    ('\u{0E40}'..='\u{0E44}').contains(&c)
}

/// Tone marks and other combining signs only matter after the base letters.
fn is_thai_diacritic(c: char) -> bool {
    matches!(c, '\u{0E31}' | '\u{0E34}'..='\u{0E3A}' | '\u{0E47}'..='\u{0E4E}')
}

fn is_thai_consonant(c: char) -> bool {
    ('\u{0E01}'..='\u{0E2E}').contains(&c)
}

/// Primary and secondary collation keys for a string.
///
/// The primary key reorders leading vowels behind their consonant, drops
/// diacritics and folds Latin case. The secondary key keeps the diacritics in
/// their reordered position so that words differing only by tone still sort
/// stably.
fn collation_keys(s: &str) -> (Vec<char>, Vec<char>) {
    let chars: Vec<char> = s.chars().collect();
    let mut reordered = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if is_thai_leading_vowel(c) && i + 1 < chars.len() && is_thai_consonant(chars[i + 1]) {
            reordered.push(chars[i + 1]);
            reordered.push(c);
            i += 2;
            continue;
        }
        reordered.push(c);
        i += 1;
    }

    let primary = reordered
        .iter()
        .filter(|c| !is_thai_diacritic(**c))
        .flat_map(|c| c.to_lowercase())
        .collect();
    let secondary = reordered.iter().flat_map(|c| c.to_lowercase()).collect();
    (primary, secondary)
}

/// Locale-aware comparison tuned for Thai names with embedded Latin text.
pub fn thai_collate(a: &str, b: &str) -> Ordering {
    let (pa, sa) = collation_keys(a);
    let (pb, sb) = collation_keys(b);
    pa.cmp(&pb).then_with(|| sa.cmp(&sb)).then_with(|| a.cmp(b))
}

/// Thousands separators for counts ("1,234").
pub fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if n < 0 {
        format!("-{}", out)
    } else {
        out
    }
}

/// Shortest decimal rendering: `49.0` prints as `49`, `49.25` as `49.25`.
pub fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

/// Percent with at most `max_fraction` decimals and grouped integer part.
pub fn format_percent(v: f64, max_fraction: usize) -> String {
    let fixed = format!("{:.*}", max_fraction, v);
    let trimmed = if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        fixed
    };
    let (int_part, frac_part) = match trimmed.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (trimmed, None),
    };
    let grouped = int_part
        .parse::<i64>()
        .map(group_thousands)
        .unwrap_or(int_part);
    match frac_part {
        Some(f) => format!("{}.{}%", grouped, f),
        None => format!("{}%", grouped),
    }
}

/// Parse the date formats the backend emits and return the UTC instant.
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// `YYYY-MM-DD` of a backend date, `None` when absent or unparseable.
pub fn to_ymd(raw: Option<&str>) -> Option<String> {
    raw.and_then(parse_datetime)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
}
