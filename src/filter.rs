use std::fmt;

use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::DashboardError;
use crate::parse::{self, Coercion};
use crate::schema::{transaction, ALL};

// ── Criteria ────────────────────────────────────────────────────────────────

/// A categorical criterion: either the `"All"` sentinel or one exact value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Choice {
    #[default]
    All,
    Only(String),
}

impl From<String> for Choice {
    fn from(value: String) -> Self {
        if value == ALL {
            Choice::All
        } else {
            Choice::Only(value)
        }
    }
}

impl From<&str> for Choice {
    fn from(value: &str) -> Self {
        Choice::from(value.to_string())
    }
}

impl From<Choice> for String {
    fn from(choice: Choice) -> Self {
        match choice {
            Choice::All => ALL.to_string(),
            Choice::Only(value) => value,
        }
    }
}

/// Inclusive calendar-date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }
}

/// Inclusive contract-amount range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Everything the user has selected. All constraints compose with AND.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub date_range: DateRange,
    #[serde(default)]
    pub project: Choice,
    #[serde(default)]
    pub bedrooms: Choice,
    pub price_range: PriceRange,
    #[serde(default)]
    pub market_segment: Choice,
}

impl FilterCriteria {
    /// Criteria with the given ranges and no categorical constraint.
    pub fn new(date_range: DateRange, price_range: PriceRange) -> Self {
        Self {
            date_range,
            project: Choice::All,
            bedrooms: Choice::All,
            price_range,
            market_segment: Choice::All,
        }
    }

    pub fn with_project(mut self, project: impl Into<Choice>) -> Self {
        self.project = project.into();
        self
    }

    pub fn with_bedrooms(mut self, bedrooms: impl Into<Choice>) -> Self {
        self.bedrooms = bedrooms.into();
        self
    }

    pub fn with_market_segment(mut self, segment: impl Into<Choice>) -> Self {
        self.market_segment = segment.into();
        self
    }

    /// The selection mask as one polars expression.
    fn predicate(&self) -> Expr {
        let start = lit(parse::to_epoch_days(self.date_range.start)).cast(DataType::Date);
        let end = lit(parse::to_epoch_days(self.date_range.end)).cast(DataType::Date);

        let mut predicate = col(transaction::CONTRACT_DATE)
            .gt_eq(start)
            .and(col(transaction::CONTRACT_DATE).lt_eq(end))
            .and(col(transaction::CONTRACT_AMOUNT).gt_eq(lit(self.price_range.min)))
            .and(col(transaction::CONTRACT_AMOUNT).lt_eq(lit(self.price_range.max)));

        let categorical = [
            (transaction::PROJECT, &self.project),
            (transaction::BEDROOMS, &self.bedrooms),
            (transaction::MARKET_SEGMENT, &self.market_segment),
        ];
        for (column, choice) in categorical {
            if let Choice::Only(value) = choice {
                predicate = predicate.and(col(column).eq(lit(value.clone())));
            }
        }
        predicate
    }
}

// ── Selection ───────────────────────────────────────────────────────────────

/// Non-fatal anomalies met while filtering, meant to be shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterWarning {
    UnexpectedAreaType { dtype: String, unrecognized: usize },
}

impl fmt::Display for FilterWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterWarning::UnexpectedAreaType {
                dtype,
                unrecognized,
            } => write!(
                f,
                "Unexpected data type {dtype} in m² column; {unrecognized} value(s) treated as missing"
            ),
        }
    }
}

/// The rows matching a [`FilterCriteria`], with `area_m2` guaranteed Float64.
#[derive(Debug, Clone)]
pub struct Selection {
    frame: DataFrame,
    warnings: Vec<FilterWarning>,
}

impl Selection {
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    pub fn warnings(&self) -> &[FilterWarning] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ── Evaluation ──────────────────────────────────────────────────────────────

/// Apply `criteria` to a frame with the canonical transaction columns.
///
/// Pure: the input frame is untouched and nothing is remembered between
/// calls. An empty result is a valid selection.
pub fn filter_frame(
    frame: &DataFrame,
    criteria: &FilterCriteria,
    thousands_separator: char,
) -> Result<Selection, DashboardError> {
    let subset = frame
        .clone()
        .lazy()
        .filter(criteria.predicate())
        .collect()?;
    let (subset, warnings) = normalize_area_column(subset, thousands_separator)?;

    tracing::debug!(
        matched = subset.height(),
        of = frame.height(),
        warnings = warnings.len(),
        "applied filter criteria"
    );
    Ok(Selection {
        frame: subset,
        warnings,
    })
}

/// Make `area_m2` Float64 whatever representation it arrived in.
///
/// Text is parsed with separator stripping and other numeric dtypes are cast.
/// Any other dtype produces a [`FilterWarning`] and a per-cell best effort,
/// with cells that cannot be understood becoming null.
pub fn normalize_area_column(
    mut frame: DataFrame,
    thousands_separator: char,
) -> Result<(DataFrame, Vec<FilterWarning>), DashboardError> {
    let dtype = frame.column(transaction::AREA_M2)?.dtype().clone();
    let mut warnings = Vec::new();

    let normalized = match dtype {
        DataType::Float64 => return Ok((frame, warnings)),
        DataType::String => {
            let parsed = frame
                .lazy()
                .with_column(
                    parse::numeric(col(transaction::AREA_M2), thousands_separator)
                        .alias(transaction::AREA_M2),
                )
                .collect()?;
            return Ok((parsed, warnings));
        }
        dt if dt.is_primitive_numeric() || dt == DataType::Null => frame
            .column(transaction::AREA_M2)?
            .cast(&DataType::Float64)?,
        other => {
            let coerced: Vec<Coercion> = frame
                .column(transaction::AREA_M2)?
                .as_materialized_series()
                .iter()
                .map(|value| parse::coerce_any(&value, thousands_separator))
                .collect();
            let unrecognized = coerced
                .iter()
                .filter(|c| **c == Coercion::Unrecognized)
                .count();
            tracing::warn!(
                dtype = %other,
                unrecognized,
                "unexpected data type in m² column, coercing cell by cell"
            );
            warnings.push(FilterWarning::UnexpectedAreaType {
                dtype: other.to_string(),
                unrecognized,
            });
            let values: Vec<Option<f64>> = coerced.into_iter().map(Coercion::value).collect();
            Column::new(transaction::AREA_M2.into(), &values)
        }
    };

    frame.with_column(normalized)?;
    Ok((frame, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{dataset, Sale};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn everything() -> FilterCriteria {
        FilterCriteria::new(
            DateRange::new(date(2000, 1, 1), date(2100, 1, 1)),
            PriceRange::new(0.0, f64::MAX),
        )
    }

    fn units(selection: &Selection) -> Vec<String> {
        selection
            .frame()
            .column(transaction::UNIT_ID)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .map(|u| u.unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn criteria_compose_with_and() {
        let ds = dataset(&[
            Sale {
                unit: "1",
                project: "A",
                amount: "100",
                ..Sale::default()
            },
            Sale {
                unit: "2",
                project: "A",
                amount: "500",
                ..Sale::default()
            },
            Sale {
                unit: "3",
                project: "B",
                amount: "300",
                ..Sale::default()
            },
        ]);
        let mut criteria = everything().with_project("A");
        criteria.price_range = PriceRange::new(50.0, 200.0);

        let selection = ds.filter(&criteria).unwrap();
        assert_eq!(units(&selection), vec!["1"]);
    }

    #[test]
    fn all_sentinel_leaves_rows_unconstrained() {
        let ds = dataset(&[
            Sale {
                unit: "1",
                project: "A",
                ..Sale::default()
            },
            Sale {
                unit: "2",
                project: "B",
                ..Sale::default()
            },
            Sale {
                unit: "3",
                project: "",
                ..Sale::default()
            },
        ]);
        let selection = ds.filter(&everything().with_project(ALL)).unwrap();
        assert_eq!(units(&selection), vec!["1", "2", "3"]);
        assert!(selection.frame().equals_missing(ds.frame()));
    }

    #[test]
    fn date_range_is_inclusive_on_both_ends() {
        let ds = dataset(&[
            Sale {
                unit: "before",
                date: "31/12/2023",
                ..Sale::default()
            },
            Sale {
                unit: "first",
                date: "01/01/2024",
                ..Sale::default()
            },
            Sale {
                unit: "last",
                date: "31/01/2024 23:59",
                ..Sale::default()
            },
            Sale {
                unit: "after",
                date: "01/02/2024",
                ..Sale::default()
            },
        ]);
        let mut criteria = everything();
        criteria.date_range = DateRange::new(date(2024, 1, 1), date(2024, 1, 31));
        assert_eq!(units(&ds.filter(&criteria).unwrap()), vec!["first", "last"]);
    }

    #[test]
    fn price_range_is_inclusive() {
        let ds = dataset(&[
            Sale {
                unit: "low",
                amount: "100",
                ..Sale::default()
            },
            Sale {
                unit: "high",
                amount: "200",
                ..Sale::default()
            },
            Sale {
                unit: "over",
                amount: "200.01",
                ..Sale::default()
            },
        ]);
        let mut criteria = everything();
        criteria.price_range = PriceRange::new(100.0, 200.0);
        assert_eq!(units(&ds.filter(&criteria).unwrap()), vec!["low", "high"]);
    }

    #[test]
    fn non_numeric_bedrooms_match_exactly() {
        let ds = dataset(&[
            Sale {
                unit: "studio",
                bedrooms: "Studio",
                ..Sale::default()
            },
            Sale {
                unit: "two",
                bedrooms: "2",
                ..Sale::default()
            },
            Sale {
                unit: "unknown",
                bedrooms: "",
                ..Sale::default()
            },
        ]);
        let studio = ds.filter(&everything().with_bedrooms("Studio")).unwrap();
        assert_eq!(units(&studio), vec!["studio"]);
        let two = ds.filter(&everything().with_bedrooms("2")).unwrap();
        assert_eq!(units(&two), vec!["two"]);
    }

    #[test]
    fn market_segment_matches_exactly() {
        let ds = dataset(&[
            Sale {
                unit: "1",
                segment: "New",
                ..Sale::default()
            },
            Sale {
                unit: "2",
                segment: "Resale",
                ..Sale::default()
            },
        ]);
        let selection = ds.filter(&everything().with_market_segment("New")).unwrap();
        assert_eq!(units(&selection), vec!["1"]);
    }

    #[test]
    fn no_match_is_an_empty_selection() {
        let ds = dataset(&[Sale::default()]);
        let selection = ds.filter(&everything().with_project("Nowhere")).unwrap();
        assert!(selection.is_empty());
        assert!(selection.warnings().is_empty());

        let mut inverted = everything();
        inverted.price_range = PriceRange::new(10.0, 1.0);
        assert!(ds.filter(&inverted).unwrap().is_empty());
    }

    #[test]
    fn filtering_twice_gives_the_same_answer() {
        let ds = dataset(&[Sale::default(), Sale::default()]);
        let criteria = everything().with_project("Marina");
        let first = ds.filter(&criteria).unwrap();
        let _ = ds.filter(&everything().with_project("Other")).unwrap();
        let second = ds.filter(&criteria).unwrap();
        assert!(first.frame().equals_missing(second.frame()));
        assert_eq!(ds.len(), 2);
    }

    #[test]
    fn text_area_column_is_coerced() {
        let frame = df!(transaction::AREA_M2 => [Some("1,200"), None, Some("n/a")]).unwrap();
        let (frame, warnings) = normalize_area_column(frame, ',').unwrap();
        let areas = frame.column(transaction::AREA_M2).unwrap().f64().unwrap();
        assert_eq!(areas.get(0), Some(1200.0));
        assert_eq!(areas.get(1), None);
        assert_eq!(areas.get(2), None);
        assert!(warnings.is_empty());
    }

    #[test]
    fn integer_area_column_is_cast() {
        let frame = df!(transaction::AREA_M2 => [1_i64, 2, 3]).unwrap();
        let (frame, warnings) = normalize_area_column(frame, ',').unwrap();
        assert_eq!(frame.column(transaction::AREA_M2).unwrap().dtype(), &DataType::Float64);
        assert!(warnings.is_empty());
    }

    #[test]
    fn narrow_integer_area_columns_are_cast_without_warning() {
        let frames = [
            df!(transaction::AREA_M2 => [85_i8, -1]).unwrap(),
            df!(transaction::AREA_M2 => [850_i16, 900]).unwrap(),
            df!(transaction::AREA_M2 => [85_u8, 90]).unwrap(),
            df!(transaction::AREA_M2 => [2_500_u16, 3_000]).unwrap(),
        ];
        for frame in frames {
            let dtype = frame.column(transaction::AREA_M2).unwrap().dtype().clone();
            let (frame, warnings) = normalize_area_column(frame, ',').unwrap();
            let areas = frame.column(transaction::AREA_M2).unwrap();
            assert_eq!(areas.dtype(), &DataType::Float64, "{dtype}");
            assert_eq!(areas.null_count(), 0, "{dtype}");
            assert!(warnings.is_empty(), "{dtype}");
        }
    }

    #[test]
    fn unexpected_area_type_warns_without_failing() {
        let frame = df!(transaction::AREA_M2 => [true, false]).unwrap();
        let (frame, warnings) = normalize_area_column(frame, ',').unwrap();
        assert_eq!(frame.column(transaction::AREA_M2).unwrap().null_count(), 2);
        assert_eq!(
            warnings,
            vec![FilterWarning::UnexpectedAreaType {
                dtype: DataType::Boolean.to_string(),
                unrecognized: 2,
            }]
        );
    }

    #[test]
    fn choice_round_trips_through_plain_strings() {
        let criteria = everything().with_project("Marina");
        let json = serde_json::to_value(&criteria).unwrap();
        assert_eq!(json["project"], "Marina");
        assert_eq!(json["bedrooms"], "All");
        let back: FilterCriteria = serde_json::from_value(json).unwrap();
        assert_eq!(back, criteria);
    }
}
