use std::collections::BTreeMap;

use geo::{Distance, Haversine, Point};
use h3o::{CellIndex, LatLng, Resolution};

use super::LocationError;

/// resolution used when none is configured. matches the grid used to label
/// the cost-of-living dataset.
pub const DEFAULT_RESOLUTION: Resolution = Resolution::Eight;

/// grid distances used when averaging a value over the rings surrounding a cell.
pub const DEFAULT_RING_DISTANCES: [u32; 4] = [1, 2, 3, 4];

pub fn resolution_from_u8(value: u8) -> Result<Resolution, LocationError> {
    Resolution::try_from(value).map_err(|_| LocationError::InvalidResolution(value))
}

/// indexes a WGS84 coordinate (degrees) to the cell grid.
pub fn cell_from_coord(
    lat: f64,
    lon: f64,
    resolution: Resolution,
) -> Result<CellIndex, LocationError> {
    let coord = LatLng::new(lat, lon).map_err(|e| LocationError::InvalidCoordinate {
        lat,
        lon,
        message: e.to_string(),
    })?;
    Ok(coord.to_cell(resolution))
}

/// parses the hex string form of a cell identifier, as found in the labeled dataset.
pub fn cell_from_hex(hex_id: &str) -> Result<CellIndex, LocationError> {
    hex_id
        .parse::<CellIndex>()
        .map_err(|e| LocationError::InvalidCellId(hex_id.to_string(), e.to_string()))
}

pub fn cell_centroid(cell: CellIndex) -> LatLng {
    LatLng::from(cell)
}

/// great-circle distance in meters between two cell centroids.
pub fn centroid_distance_meters(a: CellIndex, b: CellIndex) -> f64 {
    coord_distance_meters(&cell_centroid(a), &cell_centroid(b))
}

/// great-circle distance in meters between two coordinates.
pub fn coord_distance_meters(a: &LatLng, b: &LatLng) -> f64 {
    Haversine.distance(
        Point::new(a.lng(), a.lat()),
        Point::new(b.lng(), b.lat()),
    )
}

/// averages the value held by cells within `max_distance` grid steps of `center`.
/// the center cell itself is never included, and cells whose grid distance to the
/// center cannot be computed (different resolution, or too far apart for a local
/// coordinate frame) are treated as out of range. returns None when no cell in
/// `values` falls within range.
pub fn neighbor_average(
    center: CellIndex,
    values: &BTreeMap<CellIndex, f64>,
    max_distance: u32,
) -> Option<f64> {
    let mut sum = 0.0;
    let mut count: usize = 0;
    for (candidate, value) in values.iter() {
        match center.grid_distance(*candidate) {
            Ok(distance) if distance > 0 && distance <= max_distance as i32 => {
                sum += value;
                count += 1;
            }
            _ => {}
        }
    }
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// neighbor averages at each of the given grid distances, widening outward.
/// a None entry means no cell in `values` lies within that distance.
pub fn ring_averages(
    center: CellIndex,
    values: &BTreeMap<CellIndex, f64>,
    rings: &[u32],
) -> Vec<Option<f64>> {
    rings
        .iter()
        .map(|max_distance| neighbor_average(center, values, *max_distance))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    fn base_cell() -> CellIndex {
        cell_from_coord(-0.1807, -78.4678, DEFAULT_RESOLUTION)
            .expect("test invariant failed: Quito coordinate should index")
    }

    #[test]
    fn test_cell_from_coord_resolution() {
        let cell = base_cell();
        assert_eq!(cell.resolution(), DEFAULT_RESOLUTION);
    }

    #[test]
    fn test_cell_from_coord_is_deterministic() {
        let a = cell_from_coord(-2.1894, -79.8891, DEFAULT_RESOLUTION).unwrap();
        let b = cell_from_coord(-2.1894, -79.8891, DEFAULT_RESOLUTION).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_cell_from_coord_invalid_latitude() {
        let result = cell_from_coord(95.0, -78.0, DEFAULT_RESOLUTION);
        assert!(matches!(
            result,
            Err(LocationError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn test_cell_hex_round_trip() {
        let cell = base_cell();
        let parsed = cell_from_hex(&cell.to_string()).unwrap();
        assert_eq!(cell, parsed);
    }

    #[test]
    fn test_cell_from_hex_rejects_garbage() {
        assert!(matches!(
            cell_from_hex("not-a-cell"),
            Err(LocationError::InvalidCellId(_, _))
        ));
    }

    #[test]
    fn test_centroid_distance_zero_for_same_cell() {
        let cell = base_cell();
        assert_eq!(centroid_distance_meters(cell, cell), 0.0);
    }

    #[test]
    fn test_centroid_distance_positive_for_neighbors() {
        let center = base_cell();
        let neighbor = center
            .grid_disk::<Vec<_>>(1)
            .into_iter()
            .find(|c| *c != center)
            .expect("test invariant failed: cell has no ring-1 neighbors");
        let d = centroid_distance_meters(center, neighbor);
        // resolution-8 hexagons are several hundred meters across
        assert!(d > 100.0 && d < 2_000.0, "unexpected distance {d}");
    }

    #[test]
    fn test_neighbor_average_excludes_center() {
        let center = base_cell();
        let mut values = BTreeMap::new();
        values.insert(center, 1_000_000.0);
        for neighbor in center.grid_disk::<Vec<_>>(1) {
            if neighbor != center {
                values.insert(neighbor, 100.0);
            }
        }
        let avg = neighbor_average(center, &values, 1).unwrap();
        assert!((avg - 100.0).abs() < 1e-9, "center leaked into average: {avg}");
    }

    #[test]
    fn test_neighbor_average_empty_when_no_neighbors() {
        let center = base_cell();
        let mut values = BTreeMap::new();
        values.insert(center, 42.0);
        assert_eq!(neighbor_average(center, &values, 4), None);
    }

    #[test]
    fn test_ring_averages_widen_outward() {
        let center = base_cell();
        let ring2: Vec<CellIndex> = center
            .grid_disk::<Vec<_>>(2)
            .into_iter()
            .filter(|c| {
                matches!(center.grid_distance(*c), Ok(2))
            })
            .collect();
        let mut values = BTreeMap::new();
        for cell in ring2.iter() {
            values.insert(*cell, 50.0);
        }
        let averages = ring_averages(center, &values, &DEFAULT_RING_DISTANCES);
        assert_eq!(averages[0], None);
        assert_eq!(averages[1], Some(50.0));
        assert_eq!(averages[2], Some(50.0));
        assert_eq!(averages[3], Some(50.0));
    }
}
