use std::cmp::Ordering;
use std::path::Path;

use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::DashboardError;
use crate::filter::{self, Choice, DateRange, FilterCriteria, PriceRange, Selection};
use crate::parse;
use crate::schema::{source, transaction, ALL};

// ── Load options ────────────────────────────────────────────────────────────

/// What to do with a row whose contract date does not parse day-first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidDatePolicy {
    /// Abort the whole load.
    #[default]
    Reject,
    /// Skip the row and keep loading.
    Drop,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadOptions {
    pub thousands_separator: char,
    pub invalid_dates: InvalidDatePolicy,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            thousands_separator: ',',
            invalid_dates: InvalidDatePolicy::Reject,
        }
    }
}

// ── Cached summaries ────────────────────────────────────────────────────────

/// Extremes used to initialise the date and price controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetBounds {
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub min_amount: f64,
    pub max_amount: f64,
}

/// Distinct values of the categorical filter fields, sorted, nulls excluded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub projects: Vec<String>,
    pub bedrooms: Vec<String>,
    pub market_segments: Vec<String>,
}

impl FilterOptions {
    pub fn project_choices(&self) -> Vec<String> {
        with_all(&self.projects)
    }

    pub fn bedroom_choices(&self) -> Vec<String> {
        with_all(&self.bedrooms)
    }

    pub fn market_segment_choices(&self) -> Vec<String> {
        with_all(&self.market_segments)
    }
}

fn with_all(values: &[String]) -> Vec<String> {
    std::iter::once(ALL.to_string())
        .chain(values.iter().cloned())
        .collect()
}

/// Bedroom categories: numeric values ascending, then text alphabetically.
fn category_order(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

// ── Dataset ─────────────────────────────────────────────────────────────────

/// The canonical, immutable sales table.
///
/// Built once per session by [`Dataset::load_csv`] or [`Dataset::from_raw`].
/// The frame is only ever handed out by shared reference; filtering and
/// aggregation always produce new frames.
#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
    bounds: Option<DatasetBounds>,
    options: FilterOptions,
    dropped_rows: usize,
    thousands_separator: char,
}

impl PartialEq for Dataset {
    fn eq(&self, other: &Self) -> bool {
        self.frame.equals_missing(&other.frame)
            && self.bounds == other.bounds
            && self.options == other.options
            && self.dropped_rows == other.dropped_rows
            && self.thousands_separator == other.thousands_separator
    }
}

impl Dataset {
    /// Load a sales CSV.
    ///
    /// Every column is read as text, then coerced by [`Dataset::from_raw`].
    pub fn load_csv(path: &Path, options: &LoadOptions) -> Result<Self, DashboardError> {
        let raw = read_csv_as_strings(path)?;
        let dataset = Self::from_raw(raw, options)?;
        tracing::info!(
            path = %path.display(),
            rows = dataset.len(),
            dropped = dataset.dropped_rows,
            "loaded sales dataset"
        );
        Ok(dataset)
    }

    /// Build the canonical dataset from a raw frame with the source headers.
    ///
    /// Required headers: Unit ID, Project, Contract Date, Contract Amount, m²,
    /// Covered Area, Covered Veranda, Total Covered, Bedrooms, Market Segment.
    /// Latitude and Longitude are optional.
    ///
    /// - Contract Date is parsed day-first; failures follow `options.invalid_dates`.
    /// - Contract Amount must be a finite, non-negative number or the load fails.
    /// - m² that does not parse becomes null.
    /// - Covered-area cells that are blank (or do not parse) become zero.
    pub fn from_raw(mut raw: DataFrame, options: &LoadOptions) -> Result<Self, DashboardError> {
        let trimmed: Vec<String> = raw
            .get_column_names_str()
            .iter()
            .map(|c| c.trim_start_matches('\u{feff}').trim().to_string())
            .collect();
        raw.set_column_names(trimmed.as_slice())?;
        require_columns(&raw, &source::REQUIRED)?;
        let total_rows = raw.height();
        for name in [source::LATITUDE, source::LONGITUDE] {
            if raw.column(name).is_err() {
                raw.with_column(Column::full_null(name.into(), total_rows, &DataType::String))?;
            }
        }

        let sep = options.thousands_separator;
        let mut typed = vec![
            parse::category(text(source::UNIT_ID)).alias(transaction::UNIT_ID),
            parse::category(text(source::PROJECT)).alias(transaction::PROJECT),
            parse::day_first_date(text(source::CONTRACT_DATE)).alias(transaction::CONTRACT_DATE),
            parse::numeric(text(source::CONTRACT_AMOUNT), sep).alias(transaction::CONTRACT_AMOUNT),
            parse::numeric(text(source::AREA_M2), sep).alias(transaction::AREA_M2),
            parse::category(text(source::BEDROOMS)).alias(transaction::BEDROOMS),
            parse::category(text(source::MARKET_SEGMENT)).alias(transaction::MARKET_SEGMENT),
            parse::numeric(text(source::LATITUDE), sep).alias(transaction::LATITUDE),
            parse::numeric(text(source::LONGITUDE), sep).alias(transaction::LONGITUDE),
        ];
        typed.extend(
            source::COVERED
                .into_iter()
                .zip(transaction::COVERED)
                .map(|(from, to)| parse::numeric(text(from), sep).fill_null(lit(0.0)).alias(to)),
        );

        let converted = raw
            .lazy()
            .with_row_index(LINE, Some(2))
            .with_columns(typed)
            .collect()?;

        let reject_dates = options.invalid_dates == InvalidDatePolicy::Reject;
        if let Some(err) = first_failure(&converted, reject_dates)? {
            return Err(err);
        }

        let kept = if reject_dates {
            converted
        } else {
            converted
                .lazy()
                .filter(col(transaction::CONTRACT_DATE).is_not_null())
                .collect()?
        };
        let dropped_rows = total_rows - kept.height();
        if dropped_rows > 0 {
            tracing::warn!(rows = dropped_rows, "dropped rows with unparseable contract dates");
        }
        log_unrecognized(&kept, sep)?;

        let frame = kept
            .lazy()
            .select([
                col(transaction::UNIT_ID),
                col(transaction::PROJECT),
                col(transaction::CONTRACT_DATE),
                col(transaction::CONTRACT_AMOUNT),
                col(transaction::AREA_M2),
                col(transaction::COVERED_AREA),
                col(transaction::COVERED_VERANDA),
                col(transaction::TOTAL_COVERED),
                col(transaction::BEDROOMS),
                col(transaction::MARKET_SEGMENT),
                col(transaction::LATITUDE),
                col(transaction::LONGITUDE),
                col(transaction::CONTRACT_DATE)
                    .dt()
                    .strftime("%Y-%m")
                    .alias(transaction::YEAR_MONTH),
            ])
            .collect()?;

        let mut bedrooms = distinct_sorted(&frame, transaction::BEDROOMS)?;
        bedrooms.sort_by(|a, b| category_order(a, b));
        let options_lists = FilterOptions {
            projects: distinct_sorted(&frame, transaction::PROJECT)?,
            bedrooms,
            market_segments: distinct_sorted(&frame, transaction::MARKET_SEGMENT)?,
        };

        Ok(Self {
            bounds: bounds_of(&frame)?,
            frame,
            options: options_lists,
            dropped_rows,
            thousands_separator: sep,
        })
    }

    // ── Accessors ───────────────────────────────────────────────────────────

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn len(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `None` when the dataset has no rows.
    pub fn bounds(&self) -> Option<&DatasetBounds> {
        self.bounds.as_ref()
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    /// Rows skipped under [`InvalidDatePolicy::Drop`].
    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }

    pub fn thousands_separator(&self) -> char {
        self.thousands_separator
    }

    // ── Filtering ───────────────────────────────────────────────────────────

    pub fn filter(&self, criteria: &FilterCriteria) -> Result<Selection, DashboardError> {
        filter::filter_frame(&self.frame, criteria, self.thousands_separator)
    }

    /// Criteria that initialise the controls.
    ///
    /// The start date is the first contract date raised to `start_floor`
    /// (never past the last date). The price range is widened to whole
    /// numbers so no row falls outside it.
    pub fn default_criteria(&self, start_floor: Option<NaiveDate>) -> Option<FilterCriteria> {
        let b = self.bounds.as_ref()?;
        let start = match start_floor {
            Some(floor) => floor.max(b.first_date).min(b.last_date),
            None => b.first_date,
        };
        Some(FilterCriteria {
            date_range: DateRange::new(start, b.last_date),
            project: Choice::All,
            bedrooms: Choice::All,
            price_range: PriceRange::new(b.min_amount.floor(), b.max_amount.ceil()),
            market_segment: Choice::All,
        })
    }
}

// ── Private helpers ─────────────────────────────────────────────────────────

/// Read a CSV file with all columns as String dtype.
fn read_csv_as_strings(path: &Path) -> Result<DataFrame, DashboardError> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0)) // all columns as String
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(df)
}

fn require_columns(df: &DataFrame, required: &[&str]) -> Result<(), DashboardError> {
    for &col_name in required {
        if df.column(col_name).is_err() {
            return Err(DashboardError::MissingColumn(col_name.to_string()));
        }
    }
    Ok(())
}

/// 1-based CSV line of each raw row; the header is line 1.
const LINE: &str = "__line";
const AMOUNT_FAILED: &str = "__amount_failed";

fn text(name: &str) -> Expr {
    col(name).cast(DataType::String)
}

/// The error for the first row that cannot be loaded, in file order.
///
/// A bad amount is always fatal; a null date only under
/// [`InvalidDatePolicy::Reject`]. When one row has both, the amount wins.
fn first_failure(
    converted: &DataFrame,
    reject_dates: bool,
) -> Result<Option<DashboardError>, DashboardError> {
    let amount = col(transaction::CONTRACT_AMOUNT);
    let amount_failed = amount.clone().is_null().or(amount.lt(lit(0.0)));
    let mut failed = amount_failed.clone();
    if reject_dates {
        failed = failed.or(col(transaction::CONTRACT_DATE).is_null());
    }

    let hit = converted
        .clone()
        .lazy()
        .filter(failed)
        .limit(1)
        .select([
            col(LINE).cast(DataType::UInt64),
            amount_failed.alias(AMOUNT_FAILED),
            text(source::CONTRACT_AMOUNT),
            text(source::CONTRACT_DATE),
        ])
        .collect()?;

    let Some(line) = hit.column(LINE)?.u64()?.iter().next().flatten() else {
        return Ok(None);
    };
    let row = line as usize;
    let cell = |name: &str| -> Result<String, DashboardError> {
        Ok(hit.column(name)?.str()?.get(0).unwrap_or_default().to_string())
    };
    let err = if hit.column(AMOUNT_FAILED)?.bool()?.get(0).unwrap_or(false) {
        DashboardError::InvalidAmount {
            row,
            value: cell(source::CONTRACT_AMOUNT)?,
        }
    } else {
        DashboardError::InvalidDate {
            row,
            value: cell(source::CONTRACT_DATE)?,
        }
    };
    Ok(Some(err))
}

/// Count text cells that did not read as numbers. m² becomes null and the
/// covered areas become zero, so only the latter are worth a warning.
fn log_unrecognized(kept: &DataFrame, sep: char) -> Result<(), DashboardError> {
    let columns: Vec<&str> = std::iter::once(source::AREA_M2)
        .chain(source::COVERED)
        .collect();
    let counts = kept
        .clone()
        .lazy()
        .select(
            columns
                .iter()
                .map(|name| {
                    parse::unrecognized_number(text(name), sep)
                        .sum()
                        .cast(DataType::UInt64)
                        .alias(*name)
                })
                .collect::<Vec<_>>(),
        )
        .collect()?;
    let count = |name: &str| -> Result<u64, DashboardError> {
        Ok(counts.column(name)?.u64()?.get(0).unwrap_or(0))
    };

    let areas = count(source::AREA_M2)?;
    if areas > 0 {
        tracing::debug!(cells = areas, "non-numeric m² cells recorded as missing");
    }
    for (name, column) in source::COVERED.into_iter().zip(transaction::COVERED) {
        let cells = count(name)?;
        if cells > 0 {
            tracing::warn!(column, cells, "non-numeric covered-area cells treated as zero");
        }
    }
    Ok(())
}

/// `None` for an empty frame.
fn bounds_of(frame: &DataFrame) -> Result<Option<DatasetBounds>, DashboardError> {
    let extremes = frame
        .clone()
        .lazy()
        .select([
            col(transaction::CONTRACT_DATE)
                .min()
                .cast(DataType::Int32)
                .alias("first_date"),
            col(transaction::CONTRACT_DATE)
                .max()
                .cast(DataType::Int32)
                .alias("last_date"),
            col(transaction::CONTRACT_AMOUNT).min().alias("min_amount"),
            col(transaction::CONTRACT_AMOUNT).max().alias("max_amount"),
        ])
        .collect()?;
    let day = |name: &str| -> Result<Option<NaiveDate>, DashboardError> {
        Ok(extremes
            .column(name)?
            .i32()?
            .get(0)
            .and_then(parse::from_epoch_days))
    };
    let amount = |name: &str| -> Result<Option<f64>, DashboardError> {
        Ok(extremes.column(name)?.f64()?.get(0))
    };

    Ok(
        match (
            day("first_date")?,
            day("last_date")?,
            amount("min_amount")?,
            amount("max_amount")?,
        ) {
            (Some(first_date), Some(last_date), Some(min_amount), Some(max_amount)) => {
                Some(DatasetBounds {
                    first_date,
                    last_date,
                    min_amount,
                    max_amount,
                })
            }
            _ => None,
        },
    )
}

fn distinct_sorted(frame: &DataFrame, name: &str) -> Result<Vec<String>, DashboardError> {
    let values = frame
        .clone()
        .lazy()
        .select([col(name).drop_nulls().unique().sort(SortOptions::default())])
        .collect()?;
    Ok(values
        .column(name)?
        .str()?
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{raw_frame, Sale};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn load(rows: &[Sale]) -> Dataset {
        Dataset::from_raw(raw_frame(rows), &LoadOptions::default()).unwrap()
    }

    #[test]
    fn contract_dates_are_day_first() {
        let ds = load(&[Sale {
            date: "03/04/2025",
            ..Sale::default()
        }]);
        let bounds = ds.bounds().unwrap();
        assert_eq!(bounds.first_date, date(2025, 4, 3));
        let months = ds.frame().column(transaction::YEAR_MONTH).unwrap().str().unwrap();
        assert_eq!(months.get(0), Some("2025-04"));
        assert_eq!(
            ds.frame().column(transaction::CONTRACT_DATE).unwrap().dtype(),
            &DataType::Date
        );
    }

    #[test]
    fn amounts_strip_thousands_separators() {
        let ds = load(&[Sale {
            amount: "1,250,000",
            ..Sale::default()
        }]);
        let amounts = ds.frame().column(transaction::CONTRACT_AMOUNT).unwrap().f64().unwrap();
        assert_eq!(amounts.get(0), Some(1_250_000.0));
    }

    #[test]
    fn missing_amount_is_fatal_with_line_number() {
        let raw = raw_frame(&[
            Sale::default(),
            Sale {
                amount: "",
                ..Sale::default()
            },
        ]);
        let err = Dataset::from_raw(raw, &LoadOptions::default()).unwrap_err();
        match err {
            DashboardError::InvalidAmount { row, .. } => assert_eq!(row, 3),
            other => panic!("expected InvalidAmount, got {other:?}"),
        }
    }

    #[test]
    fn negative_or_garbage_amount_is_fatal() {
        for amount in ["-5", "call agent", "NaN"] {
            let raw = raw_frame(&[Sale {
                amount,
                ..Sale::default()
            }]);
            assert!(matches!(
                Dataset::from_raw(raw, &LoadOptions::default()),
                Err(DashboardError::InvalidAmount { .. })
            ));
        }
    }

    #[test]
    fn area_garbage_is_missing_not_zero() {
        let ds = load(&[
            Sale {
                area: "2,500",
                ..Sale::default()
            },
            Sale {
                area: "tbc",
                ..Sale::default()
            },
            Sale {
                area: "",
                ..Sale::default()
            },
        ]);
        let areas = ds.frame().column(transaction::AREA_M2).unwrap().f64().unwrap();
        assert_eq!(areas.get(0), Some(2500.0));
        assert_eq!(areas.get(1), None);
        assert_eq!(areas.get(2), None);
    }

    #[test]
    fn covered_areas_fill_missing_with_zero() {
        let ds = load(&[Sale {
            covered: "",
            veranda: "",
            total: "",
            ..Sale::default()
        }]);
        for name in transaction::COVERED {
            let values = ds.frame().column(name).unwrap().f64().unwrap();
            assert_eq!(values.get(0), Some(0.0), "{name}");
            assert_eq!(values.null_count(), 0);
        }
    }

    #[test]
    fn non_numeric_covered_text_becomes_zero() {
        let ds = load(&[
            Sale {
                veranda: "n/a",
                ..Sale::default()
            },
            Sale {
                covered: "tbc",
                veranda: "12",
                ..Sale::default()
            },
        ]);
        let frame = ds.frame();
        let veranda = frame.column(transaction::COVERED_VERANDA).unwrap().f64().unwrap();
        assert_eq!(veranda.get(0), Some(0.0));
        assert_eq!(veranda.get(1), Some(12.0));
        let covered = frame.column(transaction::COVERED_AREA).unwrap().f64().unwrap();
        assert_eq!(covered.get(0), Some(85.0));
        assert_eq!(covered.get(1), Some(0.0));
    }

    #[test]
    fn unrecognized_covered_cells_are_counted_for_the_warning() {
        let raw = raw_frame(&[
            Sale {
                veranda: "n/a",
                ..Sale::default()
            },
            Sale {
                veranda: "",
                ..Sale::default()
            },
        ]);
        let counts = raw
            .lazy()
            .select([parse::unrecognized_number(col(source::COVERED_VERANDA), ',')
                .sum()
                .cast(DataType::UInt64)
                .alias(source::COVERED_VERANDA)])
            .collect()
            .unwrap();
        assert_eq!(
            counts.column(source::COVERED_VERANDA).unwrap().u64().unwrap().get(0),
            Some(1)
        );
    }

    #[test]
    fn missing_required_header_is_reported() {
        let raw = raw_frame(&[Sale::default()]).drop(source::BEDROOMS).unwrap();
        let err = Dataset::from_raw(raw, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, DashboardError::MissingColumn(c) if c == source::BEDROOMS));
    }

    #[test]
    fn coordinates_are_optional_columns() {
        let raw = raw_frame(&[Sale::default()])
            .drop(source::LATITUDE)
            .unwrap()
            .drop(source::LONGITUDE)
            .unwrap();
        let ds = Dataset::from_raw(raw, &LoadOptions::default()).unwrap();
        assert_eq!(ds.frame().column(transaction::LATITUDE).unwrap().null_count(), 1);
    }

    #[test]
    fn padded_headers_are_trimmed() {
        let mut raw = raw_frame(&[Sale::default()]);
        raw.rename(source::PROJECT, " Project ".into()).unwrap();
        let ds = Dataset::from_raw(raw, &LoadOptions::default()).unwrap();
        assert_eq!(ds.len(), 1);
    }

    #[test]
    fn invalid_dates_reject_by_default() {
        let raw = raw_frame(&[Sale {
            date: "2025/13/45",
            ..Sale::default()
        }]);
        let err = Dataset::from_raw(raw, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, DashboardError::InvalidDate { row: 2, .. }));
    }

    #[test]
    fn first_bad_row_in_file_order_is_reported() {
        let raw = raw_frame(&[
            Sale::default(),
            Sale {
                date: "someday",
                ..Sale::default()
            },
            Sale {
                amount: "n/a",
                ..Sale::default()
            },
        ]);
        let err = Dataset::from_raw(raw.clone(), &LoadOptions::default()).unwrap_err();
        match err {
            DashboardError::InvalidDate { row, value } => {
                assert_eq!(row, 3);
                assert_eq!(value, "someday");
            }
            other => panic!("expected InvalidDate, got {other:?}"),
        }

        // Dropping bad dates still leaves the bad amount fatal.
        let options = LoadOptions {
            invalid_dates: InvalidDatePolicy::Drop,
            ..LoadOptions::default()
        };
        let err = Dataset::from_raw(raw, &options).unwrap_err();
        match err {
            DashboardError::InvalidAmount { row, value } => {
                assert_eq!(row, 4);
                assert_eq!(value, "n/a");
            }
            other => panic!("expected InvalidAmount, got {other:?}"),
        }
    }

    #[test]
    fn bad_amount_wins_over_bad_date_on_the_same_row() {
        let raw = raw_frame(&[Sale {
            date: "someday",
            amount: "-1",
            ..Sale::default()
        }]);
        assert!(matches!(
            Dataset::from_raw(raw, &LoadOptions::default()),
            Err(DashboardError::InvalidAmount { row: 2, .. })
        ));
    }

    #[test]
    fn year_first_slash_dates_load() {
        let ds = load(&[Sale {
            date: "2025/04/03",
            ..Sale::default()
        }]);
        assert_eq!(ds.bounds().unwrap().first_date, date(2025, 4, 3));
    }

    #[test]
    fn invalid_dates_can_be_dropped() {
        let raw = raw_frame(&[
            Sale::default(),
            Sale {
                date: "someday",
                ..Sale::default()
            },
        ]);
        let options = LoadOptions {
            invalid_dates: InvalidDatePolicy::Drop,
            ..LoadOptions::default()
        };
        let ds = Dataset::from_raw(raw, &options).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.dropped_rows(), 1);
    }

    #[test]
    fn bounds_and_option_lists_are_cached() {
        let ds = load(&[
            Sale {
                project: "Marina",
                date: "15/06/2023",
                amount: "300,000",
                bedrooms: "3",
                segment: "Resale",
                ..Sale::default()
            },
            Sale {
                project: "Aurora",
                date: "01/02/2022",
                amount: "150,000",
                bedrooms: "Studio",
                segment: "New",
                ..Sale::default()
            },
            Sale {
                project: "Marina",
                date: "30/12/2024",
                amount: "95,500.50",
                bedrooms: "10",
                segment: "",
                ..Sale::default()
            },
            Sale {
                project: "",
                bedrooms: "2",
                ..Sale::default()
            },
        ]);
        let b = ds.bounds().unwrap();
        assert_eq!(b.first_date, date(2022, 2, 1));
        assert_eq!(b.last_date, date(2024, 12, 30));
        assert_eq!(b.min_amount, 95_500.5);
        assert_eq!(b.max_amount, 300_000.0);

        let o = ds.options();
        assert_eq!(o.projects, vec!["Aurora", "Marina"]);
        assert_eq!(o.bedrooms, vec!["2", "3", "10", "Studio"]);
        assert_eq!(o.market_segments, vec!["New", "Resale"]);
        assert_eq!(o.project_choices(), vec![ALL, "Aurora", "Marina"]);
    }

    #[test]
    fn empty_input_has_no_bounds() {
        let ds = load(&[]);
        assert!(ds.is_empty());
        assert!(ds.bounds().is_none());
        assert!(ds.default_criteria(None).is_none());
    }

    #[test]
    fn default_criteria_respect_start_floor_and_whole_prices() {
        let ds = load(&[
            Sale {
                date: "01/06/2021",
                amount: "100,000.40",
                ..Sale::default()
            },
            Sale {
                date: "01/06/2023",
                amount: "250,000.60",
                ..Sale::default()
            },
        ]);
        let criteria = ds.default_criteria(Some(date(2022, 1, 1))).unwrap();
        assert_eq!(criteria.date_range.start, date(2022, 1, 1));
        assert_eq!(criteria.date_range.end, date(2023, 6, 1));
        assert_eq!(criteria.price_range.min, 100_000.0);
        assert_eq!(criteria.price_range.max, 250_001.0);

        let late_floor = ds.default_criteria(Some(date(2030, 1, 1))).unwrap();
        assert_eq!(late_floor.date_range.start, date(2023, 6, 1));
    }

    #[test]
    fn rebuilding_from_the_same_input_is_equal() {
        let rows = [
            Sale::default(),
            Sale {
                area: "",
                lat: "",
                ..Sale::default()
            },
        ];
        assert_eq!(load(&rows), load(&rows));
    }
}
