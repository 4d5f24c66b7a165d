/// Column-name constants for market-lens.
/// Single source of truth for the loader, the filter evaluator and the views.

// ── Source CSV headers ──────────────────────────────────────────────────────
pub mod source {
    pub const UNIT_ID: &str = "Unit ID";
    pub const PROJECT: &str = "Project";
    pub const CONTRACT_DATE: &str = "Contract Date";
    pub const CONTRACT_AMOUNT: &str = "Contract Amount";
    pub const AREA_M2: &str = "m²";
    pub const COVERED_AREA: &str = "Covered Area";
    pub const COVERED_VERANDA: &str = "Covered Veranda";
    pub const TOTAL_COVERED: &str = "Total Covered";
    pub const BEDROOMS: &str = "Bedrooms";
    pub const MARKET_SEGMENT: &str = "Market Segment";
    pub const LATITUDE: &str = "Latitude";
    pub const LONGITUDE: &str = "Longitude";

    pub const REQUIRED: [&str; 10] = [
        UNIT_ID,
        PROJECT,
        CONTRACT_DATE,
        CONTRACT_AMOUNT,
        AREA_M2,
        COVERED_AREA,
        COVERED_VERANDA,
        TOTAL_COVERED,
        BEDROOMS,
        MARKET_SEGMENT,
    ];

    /// Same order as `transaction::COVERED`.
    pub const COVERED: [&str; 3] = [COVERED_AREA, COVERED_VERANDA, TOTAL_COVERED];
}

// ── Canonical transaction columns ───────────────────────────────────────────
pub mod transaction {
    pub const UNIT_ID: &str = "unit_id";
    pub const PROJECT: &str = "project";
    pub const CONTRACT_DATE: &str = "contract_date";
    pub const CONTRACT_AMOUNT: &str = "contract_amount";
    pub const AREA_M2: &str = "area_m2";
    pub const COVERED_AREA: &str = "covered_area";
    pub const COVERED_VERANDA: &str = "covered_veranda";
    pub const TOTAL_COVERED: &str = "total_covered";
    pub const BEDROOMS: &str = "bedrooms";
    pub const MARKET_SEGMENT: &str = "market_segment";
    pub const LATITUDE: &str = "latitude";
    pub const LONGITUDE: &str = "longitude";
    pub const YEAR_MONTH: &str = "year_month";

    /// Covered-area components; missing cells become zero.
    pub const COVERED: [&str; 3] = [COVERED_AREA, COVERED_VERANDA, TOTAL_COVERED];
}

// ── Aggregate view columns ──────────────────────────────────────────────────
pub mod view {
    pub const MONTH: &str = "month";
    pub const TOTAL_AMOUNT: &str = "total_amount";
    pub const UNIT_COUNT: &str = "unit_count";
    pub const AVERAGE_AMOUNT: &str = "average_amount";
    pub const AVERAGE_COVERED: &str = "average_covered";
    pub const PRICE_PER_AREA: &str = "price_per_area";
    pub const AVERAGE_AREA_M2: &str = "average_area_m2";
    pub const MARKER_SIZE: &str = "marker_size";
}

// ── Filter sentinel ─────────────────────────────────────────────────────────
pub const ALL: &str = "All";
