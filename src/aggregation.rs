//! Named aggregate views over a filtered subset.
//!
//! Every view exists in two forms: a polars frame for renderers that plot
//! tables directly, and typed rows for everything else. Both are pure
//! functions of the subset. Zero matching rows is never an error: the typed
//! form returns [`AggregateView::NoData`] and [`view_frame`] returns `None`.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::DashboardError;
use crate::parse;
use crate::schema::{transaction, view};

/// Shown in place of a chart when a view has nothing to display.
pub const NO_DATA_NOTICE: &str =
    "No data available for the selected filters. Please adjust your filter criteria.";

/// Rows matched, but none of them has a usable `m²`.
pub const NO_PRICE_AREA_NOTICE: &str =
    "No valid price per m² data available for the selected filters.";

/// Rows matched, but none of them has coordinates and a project.
pub const NO_LOCATION_NOTICE: &str = "No location data available for the selected filters.";

// ── Empty sentinel ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum AggregateView<T> {
    NoData,
    Data(T),
}

impl<T> AggregateView<T> {
    pub fn is_no_data(&self) -> bool {
        matches!(self, AggregateView::NoData)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            AggregateView::NoData => None,
            AggregateView::Data(data) => Some(data),
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            AggregateView::NoData => None,
            AggregateView::Data(data) => Some(data),
        }
    }

    /// The user-facing notice for the empty sentinel.
    pub fn notice(&self) -> Option<&'static str> {
        self.is_no_data().then_some(NO_DATA_NOTICE)
    }
}

fn rows_or_no_data<T>(rows: Vec<T>) -> AggregateView<Vec<T>> {
    if rows.is_empty() {
        AggregateView::NoData
    } else {
        AggregateView::Data(rows)
    }
}

// ── View kinds ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewKind {
    MonthlyTimeline,
    PriceExtremes,
    ProjectRollup,
    MonthlyAreaMean,
    LocationRollup,
}

impl ViewKind {
    pub const ALL: [ViewKind; 5] = [
        ViewKind::MonthlyTimeline,
        ViewKind::PriceExtremes,
        ViewKind::ProjectRollup,
        ViewKind::MonthlyAreaMean,
        ViewKind::LocationRollup,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ViewKind::MonthlyTimeline => "monthly-timeline",
            ViewKind::PriceExtremes => "price-extremes",
            ViewKind::ProjectRollup => "project-rollup",
            ViewKind::MonthlyAreaMean => "monthly-area-mean",
            ViewKind::LocationRollup => "location-rollup",
        }
    }

    /// Notice for this view's empty sentinel. An empty subset gets the
    /// general notice; views that can be empty over a non-empty subset say
    /// what was missing.
    pub fn no_data_notice(self, subset_rows: usize) -> &'static str {
        match self {
            _ if subset_rows == 0 => NO_DATA_NOTICE,
            ViewKind::PriceExtremes => NO_PRICE_AREA_NOTICE,
            ViewKind::LocationRollup => NO_LOCATION_NOTICE,
            _ => NO_DATA_NOTICE,
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ViewKind {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ViewKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| {
                DashboardError::Validation(format!(
                    "Invalid view: '{s}'. Must be one of {}",
                    ViewKind::ALL.map(ViewKind::name).join(", ")
                ))
            })
    }
}

// ── Row types ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotal {
    pub month: String,
    pub total_amount: f64,
    pub unit_count: usize,
}

/// One transaction, as shown next to the price-per-area extremes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionSummary {
    pub project: Option<String>,
    pub unit_id: Option<String>,
    pub contract_amount: f64,
    pub area_m2: f64,
    pub contract_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceExtremes {
    pub highest: TransactionSummary,
    pub lowest: TransactionSummary,
    pub average_area_m2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectRollup {
    pub project: String,
    pub total_amount: f64,
    pub average_amount: f64,
    pub unit_count: usize,
    pub average_covered: f64,
    /// `None` when the project's mean covered area is zero.
    pub price_per_area: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyAreaMean {
    pub month: String,
    /// `None` when every row of the month lacks `area_m2`.
    pub average_area_m2: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationRollup {
    pub project: String,
    pub latitude: f64,
    pub longitude: f64,
    pub total_amount: f64,
    pub unit_count: usize,
    pub average_area_m2: Option<f64>,
    pub marker_size: f64,
}

// ── Monthly timeline ────────────────────────────────────────────────────────

/// Columns: month, total_amount, unit_count. Ascending by month.
pub fn monthly_timeline_frame(frame: &DataFrame) -> Result<DataFrame, DashboardError> {
    let df = frame
        .clone()
        .lazy()
        .group_by([col(transaction::YEAR_MONTH).alias(view::MONTH)])
        .agg([
            col(transaction::CONTRACT_AMOUNT)
                .sum()
                .alias(view::TOTAL_AMOUNT),
            col(transaction::CONTRACT_AMOUNT)
                .count()
                .cast(DataType::Int64)
                .alias(view::UNIT_COUNT),
        ])
        .sort([view::MONTH], SortMultipleOptions::default())
        .collect()?;
    Ok(df)
}

pub fn monthly_timeline(
    frame: &DataFrame,
) -> Result<AggregateView<Vec<MonthlyTotal>>, DashboardError> {
    if frame.height() == 0 {
        return Ok(AggregateView::NoData);
    }
    let table = monthly_timeline_frame(frame)?;
    let months = table.column(view::MONTH)?.str()?;
    let totals = table.column(view::TOTAL_AMOUNT)?.f64()?;
    let counts = table.column(view::UNIT_COUNT)?.i64()?;

    let rows = months
        .into_iter()
        .zip(totals)
        .zip(counts)
        .map(|((month, total), count)| MonthlyTotal {
            month: month.unwrap_or_default().to_string(),
            total_amount: total.unwrap_or(0.0),
            unit_count: count.unwrap_or(0) as usize,
        })
        .collect();
    Ok(rows_or_no_data(rows))
}

// ── Price-per-area extremes ─────────────────────────────────────────────────

/// Highest and lowest `area_m2` rows plus the mean over non-missing values.
///
/// Rows without `area_m2` are ignored rather than counted as zero. The first
/// row wins a tie.
pub fn price_per_area_extremes(
    frame: &DataFrame,
) -> Result<AggregateView<PriceExtremes>, DashboardError> {
    if frame.height() == 0 {
        return Ok(AggregateView::NoData);
    }
    let stats = frame
        .clone()
        .lazy()
        .select([
            col(transaction::AREA_M2)
                .arg_max()
                .cast(DataType::UInt64)
                .alias("highest"),
            col(transaction::AREA_M2)
                .arg_min()
                .cast(DataType::UInt64)
                .alias("lowest"),
            col(transaction::AREA_M2)
                .mean()
                .alias(view::AVERAGE_AREA_M2),
        ])
        .collect()?;
    let highest = stats.column("highest")?.u64()?.get(0);
    let lowest = stats.column("lowest")?.u64()?.get(0);
    let mean = stats.column(view::AVERAGE_AREA_M2)?.f64()?.get(0);

    let (Some(hi), Some(lo), Some(average_area_m2)) = (highest, lowest, mean) else {
        return Ok(AggregateView::NoData);
    };
    Ok(AggregateView::Data(PriceExtremes {
        highest: TransactionSummary::from_row(frame, hi as usize)?,
        lowest: TransactionSummary::from_row(frame, lo as usize)?,
        average_area_m2,
    }))
}

impl TransactionSummary {
    fn from_row(frame: &DataFrame, i: usize) -> Result<Self, DashboardError> {
        let dates = frame
            .column(transaction::CONTRACT_DATE)?
            .cast(&DataType::Int32)?;
        let contract_date = dates
            .i32()?
            .get(i)
            .and_then(parse::from_epoch_days)
            .ok_or_else(|| DashboardError::Validation(format!("Null contract date at row {i}")))?;

        Ok(Self {
            project: frame
                .column(transaction::PROJECT)?
                .str()?
                .get(i)
                .map(str::to_string),
            unit_id: frame
                .column(transaction::UNIT_ID)?
                .str()?
                .get(i)
                .map(str::to_string),
            contract_amount: frame
                .column(transaction::CONTRACT_AMOUNT)?
                .f64()?
                .get(i)
                .unwrap_or(f64::NAN),
            area_m2: frame
                .column(transaction::AREA_M2)?
                .f64()?
                .get(i)
                .unwrap_or(f64::NAN),
            contract_date,
        })
    }
}

impl PriceExtremes {
    /// Two rows, `highest` then `lowest`, each carrying the overall mean.
    pub fn to_frame(&self) -> Result<DataFrame, DashboardError> {
        let rows = [("highest", &self.highest), ("lowest", &self.lowest)];
        let dates: Vec<i32> = rows
            .iter()
            .map(|(_, t)| parse::to_epoch_days(t.contract_date))
            .collect();
        let df = DataFrame::new(vec![
            Column::new("extreme".into(), &rows.map(|(name, _)| name)),
            Column::new(
                transaction::PROJECT.into(),
                &rows.map(|(_, t)| t.project.clone()),
            ),
            Column::new(
                transaction::UNIT_ID.into(),
                &rows.map(|(_, t)| t.unit_id.clone()),
            ),
            Column::new(
                transaction::CONTRACT_AMOUNT.into(),
                &rows.map(|(_, t)| t.contract_amount),
            ),
            Column::new(transaction::AREA_M2.into(), &rows.map(|(_, t)| t.area_m2)),
            Column::new(transaction::CONTRACT_DATE.into(), &dates).cast(&DataType::Date)?,
            Column::new(
                view::AVERAGE_AREA_M2.into(),
                &[self.average_area_m2, self.average_area_m2],
            ),
        ])?;
        Ok(df)
    }
}

// ── Per-project rollup ──────────────────────────────────────────────────────

/// Columns: project, total_amount, average_amount, unit_count,
/// average_covered, price_per_area. Descending by total sales.
pub fn project_rollup_frame(frame: &DataFrame) -> Result<DataFrame, DashboardError> {
    let df = frame
        .clone()
        .lazy()
        .filter(col(transaction::PROJECT).is_not_null())
        .group_by([col(transaction::PROJECT)])
        .agg([
            col(transaction::CONTRACT_AMOUNT)
                .sum()
                .alias(view::TOTAL_AMOUNT),
            col(transaction::CONTRACT_AMOUNT)
                .mean()
                .alias(view::AVERAGE_AMOUNT),
            col(transaction::CONTRACT_AMOUNT)
                .count()
                .cast(DataType::Int64)
                .alias(view::UNIT_COUNT),
            col(transaction::TOTAL_COVERED)
                .mean()
                .alias(view::AVERAGE_COVERED),
        ])
        // A zero mean area has no price per area; it is not a failure.
        .with_column(
            when(col(view::AVERAGE_COVERED).eq(lit(0.0)))
                .then(lit(NULL).cast(DataType::Float64))
                .otherwise(col(view::AVERAGE_AMOUNT) / col(view::AVERAGE_COVERED))
                .alias(view::PRICE_PER_AREA),
        )
        .sort(
            [view::TOTAL_AMOUNT, transaction::PROJECT],
            SortMultipleOptions::default().with_order_descending_multi([true, false]),
        )
        .collect()?;
    Ok(df)
}

pub fn project_rollup(
    frame: &DataFrame,
) -> Result<AggregateView<Vec<ProjectRollup>>, DashboardError> {
    if frame.height() == 0 {
        return Ok(AggregateView::NoData);
    }
    let table = project_rollup_frame(frame)?;
    let projects = table.column(transaction::PROJECT)?.str()?;
    let totals = table.column(view::TOTAL_AMOUNT)?.f64()?;
    let averages = table.column(view::AVERAGE_AMOUNT)?.f64()?;
    let counts = table.column(view::UNIT_COUNT)?.i64()?;
    let covered = table.column(view::AVERAGE_COVERED)?.f64()?;
    let per_area = table.column(view::PRICE_PER_AREA)?.f64()?;

    let mut rows = Vec::with_capacity(table.height());
    for i in 0..table.height() {
        rows.push(ProjectRollup {
            project: projects.get(i).unwrap_or_default().to_string(),
            total_amount: totals.get(i).unwrap_or(0.0),
            average_amount: averages.get(i).unwrap_or(f64::NAN),
            unit_count: counts.get(i).unwrap_or(0) as usize,
            average_covered: covered.get(i).unwrap_or(0.0),
            price_per_area: per_area.get(i),
        });
    }
    Ok(rows_or_no_data(rows))
}

// ── Monthly mean area ───────────────────────────────────────────────────────

/// Columns: month, average_area_m2. Ascending by month.
pub fn monthly_area_mean_frame(frame: &DataFrame) -> Result<DataFrame, DashboardError> {
    let df = frame
        .clone()
        .lazy()
        .group_by([col(transaction::YEAR_MONTH).alias(view::MONTH)])
        .agg([col(transaction::AREA_M2)
            .mean()
            .alias(view::AVERAGE_AREA_M2)])
        .sort([view::MONTH], SortMultipleOptions::default())
        .collect()?;
    Ok(df)
}

pub fn monthly_area_mean(
    frame: &DataFrame,
) -> Result<AggregateView<Vec<MonthlyAreaMean>>, DashboardError> {
    if frame.height() == 0 {
        return Ok(AggregateView::NoData);
    }
    let table = monthly_area_mean_frame(frame)?;
    let months = table.column(view::MONTH)?.str()?;
    let means = table.column(view::AVERAGE_AREA_M2)?.f64()?;

    let rows = months
        .into_iter()
        .zip(means)
        .map(|(month, mean)| MonthlyAreaMean {
            month: month.unwrap_or_default().to_string(),
            average_area_m2: mean,
        })
        .collect();
    Ok(rows_or_no_data(rows))
}

// ── Geographic rollup ───────────────────────────────────────────────────────

/// Columns: project, latitude, longitude, total_amount, unit_count,
/// average_area_m2, marker_size. Rows without coordinates are dropped.
/// Descending by total sales.
pub fn location_rollup_frame(frame: &DataFrame) -> Result<DataFrame, DashboardError> {
    let df = frame
        .clone()
        .lazy()
        .filter(
            col(transaction::LATITUDE)
                .is_not_null()
                .and(col(transaction::LONGITUDE).is_not_null())
                .and(col(transaction::PROJECT).is_not_null()),
        )
        .group_by([
            col(transaction::PROJECT),
            col(transaction::LATITUDE),
            col(transaction::LONGITUDE),
        ])
        .agg([
            col(transaction::CONTRACT_AMOUNT)
                .sum()
                .alias(view::TOTAL_AMOUNT),
            col(transaction::CONTRACT_AMOUNT)
                .count()
                .cast(DataType::Int64)
                .alias(view::UNIT_COUNT),
            col(transaction::AREA_M2)
                .mean()
                .alias(view::AVERAGE_AREA_M2),
        ])
        .sort(
            [view::TOTAL_AMOUNT, transaction::PROJECT],
            SortMultipleOptions::default().with_order_descending_multi([true, false]),
        )
        // Marker area grows with total sales.
        .with_column((col(view::TOTAL_AMOUNT).sqrt() / lit(100.0)).alias(view::MARKER_SIZE))
        .collect()?;
    Ok(df)
}

pub fn location_rollup(
    frame: &DataFrame,
) -> Result<AggregateView<Vec<LocationRollup>>, DashboardError> {
    if frame.height() == 0 {
        return Ok(AggregateView::NoData);
    }
    let table = location_rollup_frame(frame)?;
    let projects = table.column(transaction::PROJECT)?.str()?;
    let latitudes = table.column(transaction::LATITUDE)?.f64()?;
    let longitudes = table.column(transaction::LONGITUDE)?.f64()?;
    let totals = table.column(view::TOTAL_AMOUNT)?.f64()?;
    let counts = table.column(view::UNIT_COUNT)?.i64()?;
    let areas = table.column(view::AVERAGE_AREA_M2)?.f64()?;
    let sizes = table.column(view::MARKER_SIZE)?.f64()?;

    let mut rows = Vec::with_capacity(table.height());
    for i in 0..table.height() {
        rows.push(LocationRollup {
            project: projects.get(i).unwrap_or_default().to_string(),
            latitude: latitudes.get(i).unwrap_or(f64::NAN),
            longitude: longitudes.get(i).unwrap_or(f64::NAN),
            total_amount: totals.get(i).unwrap_or(0.0),
            unit_count: counts.get(i).unwrap_or(0) as usize,
            average_area_m2: areas.get(i),
            marker_size: sizes.get(i).unwrap_or(0.0),
        });
    }
    Ok(rows_or_no_data(rows))
}

// ── Dispatch ────────────────────────────────────────────────────────────────

/// Result of [`compute_view`], tagged by view name when serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", content = "result", rename_all = "kebab-case")]
pub enum ViewOutput {
    MonthlyTimeline(AggregateView<Vec<MonthlyTotal>>),
    PriceExtremes(AggregateView<PriceExtremes>),
    ProjectRollup(AggregateView<Vec<ProjectRollup>>),
    MonthlyAreaMean(AggregateView<Vec<MonthlyAreaMean>>),
    LocationRollup(AggregateView<Vec<LocationRollup>>),
}

impl ViewOutput {
    pub fn kind(&self) -> ViewKind {
        match self {
            ViewOutput::MonthlyTimeline(_) => ViewKind::MonthlyTimeline,
            ViewOutput::PriceExtremes(_) => ViewKind::PriceExtremes,
            ViewOutput::ProjectRollup(_) => ViewKind::ProjectRollup,
            ViewOutput::MonthlyAreaMean(_) => ViewKind::MonthlyAreaMean,
            ViewOutput::LocationRollup(_) => ViewKind::LocationRollup,
        }
    }

    pub fn is_no_data(&self) -> bool {
        match self {
            ViewOutput::MonthlyTimeline(v) => v.is_no_data(),
            ViewOutput::PriceExtremes(v) => v.is_no_data(),
            ViewOutput::ProjectRollup(v) => v.is_no_data(),
            ViewOutput::MonthlyAreaMean(v) => v.is_no_data(),
            ViewOutput::LocationRollup(v) => v.is_no_data(),
        }
    }
}

/// Compute one named view as typed rows.
pub fn compute_view(kind: ViewKind, frame: &DataFrame) -> Result<ViewOutput, DashboardError> {
    tracing::debug!(view = %kind, rows = frame.height(), "computing view");
    let output = match kind {
        ViewKind::MonthlyTimeline => ViewOutput::MonthlyTimeline(monthly_timeline(frame)?),
        ViewKind::PriceExtremes => ViewOutput::PriceExtremes(price_per_area_extremes(frame)?),
        ViewKind::ProjectRollup => ViewOutput::ProjectRollup(project_rollup(frame)?),
        ViewKind::MonthlyAreaMean => ViewOutput::MonthlyAreaMean(monthly_area_mean(frame)?),
        ViewKind::LocationRollup => ViewOutput::LocationRollup(location_rollup(frame)?),
    };
    Ok(output)
}

/// Compute one named view as a polars frame; `None` when there is no data.
pub fn view_frame(kind: ViewKind, frame: &DataFrame) -> Result<Option<DataFrame>, DashboardError> {
    if frame.height() == 0 {
        return Ok(None);
    }
    let table = match kind {
        ViewKind::MonthlyTimeline => monthly_timeline_frame(frame)?,
        ViewKind::PriceExtremes => match price_per_area_extremes(frame)? {
            AggregateView::NoData => return Ok(None),
            AggregateView::Data(extremes) => extremes.to_frame()?,
        },
        ViewKind::ProjectRollup => project_rollup_frame(frame)?,
        ViewKind::MonthlyAreaMean => monthly_area_mean_frame(frame)?,
        ViewKind::LocationRollup => location_rollup_frame(frame)?,
    };
    Ok((table.height() > 0).then_some(table))
}
