//! Coercion shared by the loader and the filter evaluator.
//!
//! Columns are coerced with polars expressions ([`numeric`],
//! [`day_first_date`], [`category`]) so whole columns convert in one lazy
//! step. [`coerce_any`] is the cell-level fallback for columns whose dtype
//! no expression can be trusted with.

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;

/// Days between 0001-01-01 (CE day 1) and 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

const WHITESPACE: &str = " \t\r\n";

const YEAR_FIRST: &str = r"^\d{4}[-/]\d{1,2}[-/]\d{1,2}$";
const DAY_FIRST: &str = r"^\d{1,2}[-/.]\d{1,2}[-/.]\d{4}$";
const DAY_FIRST_SHORT_YEAR: &str = r"^\d{1,2}[-/.]\d{1,2}[-/.]\d{2}$";

const YEAR_FIRST_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
const DAY_FIRST_FORMATS: [&str; 3] = ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];
const DAY_FIRST_SHORT_YEAR_FORMATS: [&str; 3] = ["%d/%m/%y", "%d-%m-%y", "%d.%m.%y"];

/// Outcome of coercing one cell to a floating-point number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coercion {
    Numeric(f64),
    Missing,
    Unrecognized,
}

impl Coercion {
    /// The numeric value, with both `Missing` and `Unrecognized` as "no value".
    pub fn value(self) -> Option<f64> {
        match self {
            Coercion::Numeric(v) => Some(v),
            Coercion::Missing | Coercion::Unrecognized => None,
        }
    }
}

fn stripped(text: Expr) -> Expr {
    text.str().strip_chars(lit(WHITESPACE))
}

// ── Numbers ─────────────────────────────────────────────────────────────────

/// Text to `Float64`, stripping every occurrence of `thousands_separator`.
///
/// Blank cells and residue that is not a finite number (`"NaN"` and `"inf"`
/// included) become null.
pub fn numeric(text: Expr, thousands_separator: char) -> Expr {
    let parsed = stripped(text)
        .str()
        .replace_all(lit(thousands_separator.to_string()), lit(""), true)
        .str()
        .strip_chars(lit(WHITESPACE))
        .cast(DataType::Float64);
    when(parsed.clone().is_finite())
        .then(parsed)
        .otherwise(lit(NULL).cast(DataType::Float64))
}

/// True where a cell holds text that [`numeric`] could not read.
pub fn unrecognized_number(text: Expr, thousands_separator: char) -> Expr {
    text.clone()
        .is_not_null()
        .and(stripped(text.clone()).neq(lit("")))
        .and(numeric(text, thousands_separator).is_null())
}

/// Coerce a text cell, stripping every occurrence of `thousands_separator`.
///
/// Blank cells are `Missing`; residue that is not a finite number is
/// `Unrecognized`.
pub fn coerce_text(cell: Option<&str>, thousands_separator: char) -> Coercion {
    let Some(raw) = cell else {
        return Coercion::Missing;
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Coercion::Missing;
    }
    let cleaned: String = trimmed
        .chars()
        .filter(|c| *c != thousands_separator)
        .collect();
    match cleaned.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Coercion::Numeric(v),
        _ => Coercion::Unrecognized,
    }
}

/// Coerce a cell of arbitrary dtype. Every integer and float width counts
/// as numeric; non-finite floats are `Missing`.
pub fn coerce_any(value: &AnyValue<'_>, thousands_separator: char) -> Coercion {
    match value {
        AnyValue::Null => Coercion::Missing,
        AnyValue::String(s) => coerce_text(Some(*s), thousands_separator),
        AnyValue::StringOwned(s) => coerce_text(Some(s.as_str()), thousands_separator),
        v if v.is_primitive_numeric() => match v.extract::<f64>() {
            Some(x) if x.is_finite() => Coercion::Numeric(x),
            _ => Coercion::Missing,
        },
        _ => Coercion::Unrecognized,
    }
}

// ── Text ────────────────────────────────────────────────────────────────────

/// Trimmed text, with blank cells as null.
pub fn category(text: Expr) -> Expr {
    let trimmed = stripped(text);
    when(trimmed.clone().eq(lit("")))
        .then(lit(NULL).cast(DataType::String))
        .otherwise(trimmed)
}

// ── Dates ───────────────────────────────────────────────────────────────────

fn any_format(text: &Expr, formats: &[&str]) -> Expr {
    let parsed: Vec<Expr> = formats
        .iter()
        .map(|format| {
            text.clone().str().to_date(StrptimeOptions {
                format: Some((*format).into()),
                strict: false,
                exact: true,
                cache: true,
            })
        })
        .collect();
    coalesce(&parsed)
}

/// Parse contract dates using the day-first convention.
///
/// `"03/04/2025"` is 3 April 2025. `/`, `-` and `.` separators are accepted,
/// with four- or two-digit years (`25` is 2025, `85` is 1985). A leading
/// four-digit year cannot be a day, so `yyyy-mm-dd` and `yyyy/mm/dd` are read
/// year-first. Any time-of-day suffix is ignored. Month names
/// (`"3 April 2025"`) are not accepted and give null like any other
/// unparseable cell.
pub fn day_first_date(text: Expr) -> Expr {
    let date_part = stripped(text)
        .str()
        .replace(lit(r"[ T].*$"), lit(""), false);
    let shaped = |pattern: &str| date_part.clone().str().contains(lit(pattern), true);

    when(shaped(YEAR_FIRST))
        .then(any_format(&date_part, &YEAR_FIRST_FORMATS))
        .when(shaped(DAY_FIRST))
        .then(any_format(&date_part, &DAY_FIRST_FORMATS))
        .when(shaped(DAY_FIRST_SHORT_YEAR))
        .then(any_format(&date_part, &DAY_FIRST_SHORT_YEAR_FORMATS))
        .otherwise(lit(NULL).cast(DataType::Date))
}

/// Days since 1970-01-01, the physical representation of a polars `Date`.
pub fn to_epoch_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

pub fn from_epoch_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?)
}
