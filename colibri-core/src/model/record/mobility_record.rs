use chrono::{DateTime, NaiveDate, Timelike, Utc};
use h3o::{CellIndex, Resolution};
use serde::{Deserialize, Serialize};

use crate::model::cell::{cell_ops, LocationError};

/// a single device sighting from the mobility trace dataset, indexed to the
/// cell grid. immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MobilityRecord {
    pub device_id: String,
    pub time: DateTime<Utc>,
    pub lat: f64,
    pub lon: f64,
    #[serde(with = "crate::model::cell::hex_id")]
    pub cell: CellIndex,
}

impl MobilityRecord {
    pub fn new(
        device_id: String,
        time: DateTime<Utc>,
        lat: f64,
        lon: f64,
        resolution: Resolution,
    ) -> Result<MobilityRecord, LocationError> {
        let cell = cell_ops::cell_from_coord(lat, lon, resolution)?;
        Ok(MobilityRecord {
            device_id,
            time,
            lat,
            lon,
            cell,
        })
    }

    /// hour of day of the sighting, in [0, 23] (UTC).
    pub fn hour(&self) -> u32 {
        self.time.hour()
    }

    /// the UTC calendar day of the sighting. two sightings of a device on the
    /// same day count as a single occasion.
    pub fn day(&self) -> NaiveDate {
        self.time.date_naive()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::cell::cell_ops::DEFAULT_RESOLUTION;

    #[test]
    fn test_new_indexes_to_cell_grid() {
        let time = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let record = MobilityRecord::new(
            String::from("device-a"),
            time,
            -0.22,
            -78.51,
            DEFAULT_RESOLUTION,
        )
        .unwrap();
        assert_eq!(record.cell.resolution(), DEFAULT_RESOLUTION);
        assert!(record.hour() < 24);
    }

    #[test]
    fn test_new_rejects_bad_coordinate() {
        let time = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let result = MobilityRecord::new(
            String::from("device-a"),
            time,
            -100.0,
            -78.51,
            DEFAULT_RESOLUTION,
        );
        assert!(result.is_err());
    }
}
