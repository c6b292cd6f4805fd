use h3o::CellIndex;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// the derived row for one cell, consumed by the regression fitter and
/// written as one line of features.csv.
///
/// every field is concrete: cells with no co-located listings carry an
/// imputed price (flagged by `listing_price_imputed`) rather than a hole.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationFeatureVector {
    #[serde(with = "crate::model::cell::hex_id")]
    pub cell: CellIndex,
    /// cell centroid, degrees
    pub lat: f64,
    pub lon: f64,
    /// total device sightings at the cell
    pub visit_count: u64,
    pub distinct_visitors: u64,
    pub recurring_visitors: u64,
    /// distinct UTC days with at least one sighting
    pub active_days: u64,
    /// hour of day with the most sightings, in [0, 23]
    pub peak_hour: u8,
    /// fraction of sightings falling in the peak hour
    pub peak_hour_share: f64,
    /// meters to the nearest other observed cell (0.0 when it is the only one)
    pub nearest_cell_distance_m: f64,
    /// mean meters to all other observed cells (0.0 when it is the only one)
    pub mean_cell_distance_m: f64,
    /// co-located listings count
    pub listing_count: u64,
    /// aggregated listing price, possibly imputed from surrounding rings
    pub listing_price: f64,
    pub listing_price_imputed: bool,
}

impl LocationFeatureVector {
    /// the named numeric columns handed to the regression model, in a fixed
    /// order shared by every row.
    pub fn model_columns(&self) -> IndexMap<&'static str, f64> {
        IndexMap::from([
            ("visit_count", self.visit_count as f64),
            ("distinct_visitors", self.distinct_visitors as f64),
            ("recurring_visitors", self.recurring_visitors as f64),
            ("active_days", self.active_days as f64),
            ("peak_hour", self.peak_hour as f64),
            ("peak_hour_share", self.peak_hour_share),
            ("nearest_cell_distance_m", self.nearest_cell_distance_m),
            ("mean_cell_distance_m", self.mean_cell_distance_m),
            ("listing_count", self.listing_count as f64),
            ("listing_price", self.listing_price),
        ])
    }
}
