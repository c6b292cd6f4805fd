mod activity_histogram;
mod feature_vector;
mod price_aggregation;
mod visitor_stats;

pub use activity_histogram::ActivityHistogram;
pub use feature_vector::LocationFeatureVector;
pub use price_aggregation::PriceAggregation;
pub use visitor_stats::VisitorStats;
