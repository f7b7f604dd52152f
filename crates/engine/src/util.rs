//! Internal helpers for input normalization and calendar math.
//!
//! These utilities are **not** part of the public API.

use chrono::{Datelike, NaiveDate};
use sea_orm::sea_query::LikeExpr;
use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, ResultEngine};

const MAX_CATEGORY_NAME_CHARS: usize = 100;

/// Trim and NFC-normalize a category name, rejecting blank or overlong input.
pub(crate) fn normalize_category_name(value: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(
            "category name must not be empty".to_string(),
        ));
    }
    let normalized: String = trimmed.nfc().collect();
    if normalized.chars().count() > MAX_CATEGORY_NAME_CHARS {
        return Err(EngineError::InvalidName(format!(
            "category name must be at most {MAX_CATEGORY_NAME_CHARS} characters"
        )));
    }
    Ok(normalized)
}

/// Blank text is treated as absent.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Escapes `\`, `%` and `_` so `needle` matches literally inside `LIKE`.
fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// `LIKE '%needle%'` with `\` as escape character.
///
/// SQLite's `LIKE` folds case for ASCII letters only.
pub(crate) fn contains_pattern(needle: &str) -> LikeExpr {
    LikeExpr::new(format!("%{}%", escape_like(needle))).escape('\\')
}

/// Case-insensitive substring match with full Unicode case folding.
pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// First day of the month containing `date`.
pub(crate) fn first_of_month(date: NaiveDate) -> ResultEngine<NaiveDate> {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
        .ok_or_else(|| EngineError::InvalidDate(format!("no month start for {date}")))
}

/// Inclusive `(first, last)` days of the month containing `date`.
pub(crate) fn month_bounds(date: NaiveDate) -> ResultEngine<(NaiveDate, NaiveDate)> {
    let first = first_of_month(date)?;
    let next_first = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    let last = next_first
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| EngineError::InvalidDate(format!("no month end for {date}")))?;
    Ok((first, last))
}

/// Inclusive `(Jan 1, Dec 31)` of `year`.
pub(crate) fn year_bounds(year: i32) -> ResultEngine<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, 1, 1);
    let last = NaiveDate::from_ymd_opt(year, 12, 31);
    first
        .zip(last)
        .ok_or_else(|| EngineError::InvalidDate(format!("year {year} out of range")))
}
