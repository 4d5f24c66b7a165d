//! Raw-frame fixtures for unit tests.

use polars::prelude::*;

use crate::model::{Dataset, LoadOptions};
use crate::schema::source;

/// One source row, cells as they would appear in the CSV. Empty means blank.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Sale {
    pub unit: &'static str,
    pub project: &'static str,
    pub date: &'static str,
    pub amount: &'static str,
    pub area: &'static str,
    pub covered: &'static str,
    pub veranda: &'static str,
    pub total: &'static str,
    pub bedrooms: &'static str,
    pub segment: &'static str,
    pub lat: &'static str,
    pub lon: &'static str,
}

impl Default for Sale {
    fn default() -> Self {
        Self {
            unit: "A-101",
            project: "Marina",
            date: "15/03/2024",
            amount: "250,000",
            area: "2,500",
            covered: "85",
            veranda: "15",
            total: "100",
            bedrooms: "2",
            segment: "Resale",
            lat: "34.6861",
            lon: "32.6205",
        }
    }
}

fn cell(value: &'static str) -> Option<&'static str> {
    (!value.is_empty()).then_some(value)
}

pub(crate) fn raw_frame(rows: &[Sale]) -> DataFrame {
    let column = |name: &str, pick: fn(&Sale) -> &'static str| {
        let values: Vec<Option<&str>> = rows.iter().map(|r| cell(pick(r))).collect();
        Column::new(name.into(), &values)
    };
    DataFrame::new(vec![
        column(source::UNIT_ID, |r| r.unit),
        column(source::PROJECT, |r| r.project),
        column(source::CONTRACT_DATE, |r| r.date),
        column(source::CONTRACT_AMOUNT, |r| r.amount),
        column(source::AREA_M2, |r| r.area),
        column(source::COVERED_AREA, |r| r.covered),
        column(source::COVERED_VERANDA, |r| r.veranda),
        column(source::TOTAL_COVERED, |r| r.total),
        column(source::BEDROOMS, |r| r.bedrooms),
        column(source::MARKET_SEGMENT, |r| r.segment),
        column(source::LATITUDE, |r| r.lat),
        column(source::LONGITUDE, |r| r.lon),
    ])
    .unwrap()
}

pub(crate) fn dataset(rows: &[Sale]) -> Dataset {
    Dataset::from_raw(raw_frame(rows), &LoadOptions::default()).unwrap()
}
