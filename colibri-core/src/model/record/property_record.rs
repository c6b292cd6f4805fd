use h3o::{CellIndex, Resolution};
use serde::{Deserialize, Serialize};

use crate::model::cell::{cell_ops, LocationError};

/// one property listing, indexed to the cell grid. immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropertyRecord {
    pub lat: f64,
    pub lon: f64,
    /// asking price in the listing currency
    pub price: f64,
    /// listed floor area in square meters, where the source provides it
    pub area_m2: Option<f64>,
    pub property_type: Option<String>,
    #[serde(with = "crate::model::cell::hex_id")]
    pub cell: CellIndex,
}

impl PropertyRecord {
    pub fn new(
        lat: f64,
        lon: f64,
        price: f64,
        area_m2: Option<f64>,
        property_type: Option<String>,
        resolution: Resolution,
    ) -> Result<PropertyRecord, LocationError> {
        let cell = cell_ops::cell_from_coord(lat, lon, resolution)?;
        Ok(PropertyRecord {
            lat,
            lon,
            price,
            area_m2,
            property_type,
            cell,
        })
    }

    /// price per square meter, when the listing reports a positive area.
    pub fn price_per_area(&self) -> Option<f64> {
        match self.area_m2 {
            Some(area) if area > 0.0 => Some(self.price / area),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::cell::cell_ops::DEFAULT_RESOLUTION;

    #[test]
    fn test_price_per_area() {
        let listing = PropertyRecord::new(
            -2.19,
            -79.89,
            120_000.0,
            Some(80.0),
            Some(String::from("apartment")),
            DEFAULT_RESOLUTION,
        )
        .unwrap();
        assert_eq!(listing.price_per_area(), Some(1_500.0));
    }

    #[test]
    fn test_price_per_area_requires_positive_area() {
        let listing = PropertyRecord::new(
            -2.19,
            -79.89,
            120_000.0,
            Some(0.0),
            None,
            DEFAULT_RESOLUTION,
        )
        .unwrap();
        assert_eq!(listing.price_per_area(), None);
    }
}
