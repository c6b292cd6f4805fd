use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use colibri_core::model::cell::cell_ops;
use colibri_core::model::feature::{
    ActivityHistogram, LocationFeatureVector, PriceAggregation, VisitorStats,
};
use colibri_core::model::record::{MobilityRecord, PropertyRecord};
use h3o::{CellIndex, LatLng};
use itertools::Itertools;
use kdam::{tqdm, Bar, BarExt};
use ordered_float::OrderedFloat;
use rayon::prelude::*;

use crate::pipeline::PipelineError;

pub struct FeatureBuilderParams {
    /// grid distances searched, nearest first, when imputing a missing
    /// listing price from surrounding cells
    pub price_rings: Vec<u32>,
    pub price_aggregation: PriceAggregation,
}

/// derives one feature vector per cell observed in the mobility data.
///
/// cells with mobility records but no co-located listings get a price imputed
/// from the nearest non-empty ring, falling back to the global aggregate;
/// listings in cells with no mobility records still feed the ring averages.
/// output is ordered by ascending cell index and is deterministic for a given
/// input.
pub fn build_location_features(
    records: &[MobilityRecord],
    listings: &[PropertyRecord],
    params: &FeatureBuilderParams,
) -> Result<Vec<LocationFeatureVector>, PipelineError> {
    if records.is_empty() {
        return Err(PipelineError::EmptyDataset(String::from(
            "cannot build location features from zero mobility records",
        )));
    }

    let mut by_cell: BTreeMap<CellIndex, Vec<&MobilityRecord>> = BTreeMap::new();
    for record in records.iter() {
        by_cell.entry(record.cell).or_default().push(record);
    }

    let mut prices_by_cell: BTreeMap<CellIndex, Vec<f64>> = BTreeMap::new();
    for listing in listings.iter() {
        prices_by_cell
            .entry(listing.cell)
            .or_default()
            .push(listing.price);
    }
    let cell_prices: BTreeMap<CellIndex, f64> = prices_by_cell
        .iter()
        .filter_map(|(cell, prices)| {
            params
                .price_aggregation
                .aggregate(prices)
                .map(|price| (*cell, price))
        })
        .collect();
    let all_prices = listings.iter().map(|l| l.price).collect_vec();
    let global_price = params.price_aggregation.aggregate(&all_prices);
    if global_price.is_none() {
        log::warn!("no usable listing prices, every location gets a zero listing_price");
    }

    let cells = by_cell.keys().copied().collect_vec();
    let centroids = cells
        .iter()
        .map(|cell| cell_ops::cell_centroid(*cell))
        .collect_vec();

    let proximity = centroid_proximity(&centroids)?;

    let aggregate_iter = tqdm!(
        cells.iter().enumerate(),
        desc = "aggregate location features",
        total = cells.len()
    );
    let mut result: Vec<LocationFeatureVector> = Vec::with_capacity(cells.len());
    for (idx, cell) in aggregate_iter {
        let cell_records = by_cell.get(cell).ok_or_else(|| {
            PipelineError::InternalError(format!("cell {cell} missing from sighting groups"))
        })?;
        let mut histogram = ActivityHistogram::new();
        for record in cell_records.iter() {
            histogram.observe(&record.time);
        }
        let stats = VisitorStats::from_sightings(
            cell_records
                .iter()
                .map(|record| (record.device_id.as_str(), record.day())),
        );
        let peak_hour = histogram.peak_hour().ok_or_else(|| {
            PipelineError::InternalError(format!("cell {cell} has sightings but no peak hour"))
        })?;
        let peak_hour_share = histogram.peak_share().ok_or_else(|| {
            PipelineError::InternalError(format!("cell {cell} has sightings but no peak share"))
        })?;
        let (nearest_cell_distance_m, mean_cell_distance_m) = proximity[idx];
        let listing_count = prices_by_cell
            .get(cell)
            .map(|prices| prices.len() as u64)
            .unwrap_or(0);
        let (listing_price, listing_price_imputed) =
            resolve_listing_price(*cell, &cell_prices, global_price, &params.price_rings);
        let centroid = centroids[idx];
        result.push(LocationFeatureVector {
            cell: *cell,
            lat: centroid.lat(),
            lon: centroid.lng(),
            visit_count: cell_records.len() as u64,
            distinct_visitors: stats.distinct_visitors,
            recurring_visitors: stats.recurring_visitors,
            active_days: stats.active_days,
            peak_hour,
            peak_hour_share,
            nearest_cell_distance_m,
            mean_cell_distance_m,
            listing_count,
            listing_price,
            listing_price_imputed,
        });
    }
    eprintln!();

    Ok(result)
}

/// nearest and mean centroid distance from each cell to every other observed
/// cell, in meters. a lone cell gets (0.0, 0.0). parallelized over cells.
fn centroid_proximity(centroids: &[LatLng]) -> Result<Vec<(f64, f64)>, PipelineError> {
    let bar = Arc::new(Mutex::new(
        Bar::builder()
            .desc("measure cell proximity")
            .total(centroids.len())
            .build()
            .map_err(|e| {
                PipelineError::InternalError(format!("failure building progress bar: {e}"))
            })?,
    ));
    let proximity: Vec<(f64, f64)> = centroids
        .par_iter()
        .enumerate()
        .map(|(i, centroid)| {
            if let Ok(mut bar) = bar.clone().lock() {
                let _ = bar.update(1);
            }
            let distances = centroids
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, other)| cell_ops::coord_distance_meters(centroid, other))
                .collect_vec();
            if distances.is_empty() {
                return (0.0, 0.0);
            }
            let nearest = distances
                .iter()
                .copied()
                .min_by_key(|d| OrderedFloat(*d))
                .unwrap_or(0.0);
            let mean = distances.iter().sum::<f64>() / distances.len() as f64;
            (nearest, mean)
        })
        .collect();
    eprintln!();
    Ok(proximity)
}

/// price for a cell: its own aggregate when it has listings, else the first
/// non-empty ring average working outward, else the global aggregate.
fn resolve_listing_price(
    cell: CellIndex,
    cell_prices: &BTreeMap<CellIndex, f64>,
    global_price: Option<f64>,
    rings: &[u32],
) -> (f64, bool) {
    if let Some(price) = cell_prices.get(&cell) {
        return (*price, false);
    }
    for average in cell_ops::ring_averages(cell, cell_prices, rings) {
        if let Some(price) = average {
            return (price, true);
        }
    }
    (global_price.unwrap_or(0.0), true)
}
