mod feature_builder;

pub use feature_builder::{build_location_features, FeatureBuilderParams};
