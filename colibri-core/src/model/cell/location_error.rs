#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LocationError {
    #[error("coordinate ({lat}, {lon}) cannot be placed on the cell grid: {message}")]
    InvalidCoordinate {
        lat: f64,
        lon: f64,
        message: String,
    },
    #[error("invalid cell resolution {0}, must be in [0, 15]")]
    InvalidResolution(u8),
    #[error("invalid cell identifier '{0}': {1}")]
    InvalidCellId(String, String),
}
