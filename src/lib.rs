//! Core of a real-estate sales dashboard: load a transaction CSV, narrow it
//! with filter criteria, and summarize the subset into chart-ready views.

pub mod aggregation;
pub mod cache;
pub mod config;
pub mod error;
pub mod filter;
pub mod model;
pub mod parse;
pub mod schema;

#[cfg(feature = "python")]
mod python;

#[cfg(test)]
mod testing;

pub use aggregation::{
    compute_view, view_frame, AggregateView, ViewKind, ViewOutput, NO_DATA_NOTICE,
    NO_LOCATION_NOTICE, NO_PRICE_AREA_NOTICE,
};
pub use cache::DatasetCache;
pub use config::DashboardConfig;
pub use error::DashboardError;
pub use filter::{Choice, DateRange, FilterCriteria, FilterWarning, PriceRange, Selection};
pub use model::{Dataset, DatasetBounds, FilterOptions, InvalidDatePolicy, LoadOptions};
