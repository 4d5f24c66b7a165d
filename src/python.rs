use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use pyo3::exceptions::PyRuntimeError;
use pyo3::prelude::*;
use pyo3_polars::PyDataFrame;

use crate::aggregation::{self, ViewKind, NO_DATA_NOTICE, NO_LOCATION_NOTICE, NO_PRICE_AREA_NOTICE};
use crate::cache::DatasetCache;
use crate::config::DashboardConfig;
use crate::filter::{DateRange, FilterCriteria, PriceRange, Selection};
use crate::model::Dataset;
use crate::schema::ALL;

#[pyclass(name = "MarketDashboard")]
pub struct PyMarketDashboard {
    config: DashboardConfig,
    cache: DatasetCache,
    dataset: Option<Arc<Dataset>>,
}

impl PyMarketDashboard {
    fn dataset(&self) -> PyResult<&Arc<Dataset>> {
        self.dataset
            .as_ref()
            .ok_or_else(|| PyRuntimeError::new_err("No dataset loaded. Call load() first."))
    }
}

#[pymethods]
impl PyMarketDashboard {
    #[new]
    #[pyo3(signature = (config_path=None))]
    fn new(config_path: Option<String>) -> PyResult<Self> {
        let config = match config_path {
            Some(path) => DashboardConfig::load_from(&PathBuf::from(path))?,
            None => DashboardConfig::default(),
        };
        Ok(Self {
            config,
            cache: DatasetCache::new(),
            dataset: None,
        })
    }

    // ── Data loading ────────────────────────────────────────────────────────

    /// Load (or reuse) the sales CSV. Returns the number of rows.
    #[pyo3(signature = (path=None))]
    fn load(&mut self, path: Option<String>) -> PyResult<usize> {
        let path = path
            .map(PathBuf::from)
            .unwrap_or_else(|| self.config.data.path.clone());
        let dataset = self
            .cache
            .get_or_load(&path, &self.config.data.load_options())?;
        let rows = dataset.len();
        self.dataset = Some(dataset);
        Ok(rows)
    }

    fn frame(&self) -> PyResult<PyDataFrame> {
        Ok(PyDataFrame(self.dataset()?.frame().clone()))
    }

    // ── Control state ───────────────────────────────────────────────────────

    fn project_choices(&self) -> PyResult<Vec<String>> {
        Ok(self.dataset()?.options().project_choices())
    }

    fn bedroom_choices(&self) -> PyResult<Vec<String>> {
        Ok(self.dataset()?.options().bedroom_choices())
    }

    fn market_segment_choices(&self) -> PyResult<Vec<String>> {
        Ok(self.dataset()?.options().market_segment_choices())
    }

    fn date_bounds(&self) -> PyResult<Option<(NaiveDate, NaiveDate)>> {
        Ok(self
            .dataset()?
            .bounds()
            .map(|b| (b.first_date, b.last_date)))
    }

    fn price_bounds(&self) -> PyResult<Option<(f64, f64)>> {
        Ok(self
            .dataset()?
            .bounds()
            .map(|b| (b.min_amount, b.max_amount)))
    }

    /// Initial `(start, end, min_price, max_price)` for the controls.
    fn default_ranges(&self) -> PyResult<Option<(NaiveDate, NaiveDate, f64, f64)>> {
        let criteria = self
            .dataset()?
            .default_criteria(self.config.filters.start_date_floor);
        Ok(criteria.map(|c| {
            (
                c.date_range.start,
                c.date_range.end,
                c.price_range.min,
                c.price_range.max,
            )
        }))
    }

    #[getter]
    fn map_zoom(&self) -> u8 {
        self.config.map.zoom
    }

    #[getter]
    fn map_highlight(&self) -> Option<(String, f64, f64)> {
        self.config
            .map
            .highlight
            .as_ref()
            .map(|m| (m.label.clone(), m.latitude, m.longitude))
    }

    // ── Filtering ───────────────────────────────────────────────────────────

    #[pyo3(signature = (start, end, min_price, max_price, project=ALL, bedrooms=ALL, market_segment=ALL))]
    #[allow(clippy::too_many_arguments)]
    fn filter(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        min_price: f64,
        max_price: f64,
        project: &str,
        bedrooms: &str,
        market_segment: &str,
    ) -> PyResult<PySelection> {
        let criteria = FilterCriteria::new(
            DateRange::new(start, end),
            PriceRange::new(min_price, max_price),
        )
        .with_project(project)
        .with_bedrooms(bedrooms)
        .with_market_segment(market_segment);
        let selection = self.dataset()?.filter(&criteria)?;
        Ok(PySelection { inner: selection })
    }
}

#[pyclass(name = "Selection")]
pub struct PySelection {
    inner: Selection,
}

#[pymethods]
impl PySelection {
    fn frame(&self) -> PyDataFrame {
        PyDataFrame(self.inner.frame().clone())
    }

    fn warnings(&self) -> Vec<String> {
        self.inner.warnings().iter().map(|w| w.to_string()).collect()
    }

    fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    /// One named view as a polars frame, or `None` when there is no data.
    fn view(&self, name: &str) -> PyResult<Option<PyDataFrame>> {
        let kind: ViewKind = name.parse()?;
        let table = aggregation::view_frame(kind, self.inner.frame())?;
        Ok(table.map(PyDataFrame))
    }

    /// What to show instead of the named view when it has no data.
    fn notice(&self, name: &str) -> PyResult<&'static str> {
        let kind: ViewKind = name.parse()?;
        Ok(kind.no_data_notice(self.inner.len()))
    }
}

#[pymodule]
fn market_lens(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyMarketDashboard>()?;
    m.add_class::<PySelection>()?;
    m.add("ALL", ALL)?;
    m.add("NO_DATA_NOTICE", NO_DATA_NOTICE)?;
    m.add("NO_PRICE_AREA_NOTICE", NO_PRICE_AREA_NOTICE)?;
    m.add("NO_LOCATION_NOTICE", NO_LOCATION_NOTICE)?;
    m.add(
        "VIEWS",
        ViewKind::ALL.map(ViewKind::name).to_vec(),
    )?;
    Ok(())
}
