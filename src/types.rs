use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Real-valued raster data (digital numbers, angles, dB values)
pub type SarReal = f64;

/// 2D real raster array (rows x cols)
pub type SarRealImage = Array2<SarReal>;

/// Polarization channels carried by dual/quad-pol products
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Polarization {
    VV,
    VH,
    HV,
    HH,
}

impl std::fmt::Display for Polarization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Polarization::VV => write!(f, "VV"),
            Polarization::VH => write!(f, "VH"),
            Polarization::HV => write!(f, "HV"),
            Polarization::HH => write!(f, "HH"),
        }
    }
}

impl std::str::FromStr for Polarization {
    type Err = SarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "VV" => Ok(Polarization::VV),
            "VH" => Ok(Polarization::VH),
            "HV" => Ok(Polarization::HV),
            "HH" => Ok(Polarization::HH),
            other => Err(SarError::InvalidValue {
                key: "polarization".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Geographic position in degrees (WGS84)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// As a `geo` point (x = longitude, y = latitude)
    pub fn to_geo(&self) -> geo::Point<f64> {
        geo::Point::new(self.longitude, self.latitude)
    }

    pub fn from_geo(point: geo::Point<f64>) -> Self {
        Self::new(point.y(), point.x())
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// Area of interest, axis-aligned in lat/lon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub upper_left: GeoPoint,
    pub lower_right: GeoPoint,
}

impl BoundingBox {
    /// Create a bounding box, rejecting corners that are not upper-left/lower-right
    pub fn new(upper_left: GeoPoint, lower_right: GeoPoint) -> SarResult<Self> {
        if upper_left.latitude < lower_right.latitude
            || upper_left.longitude > lower_right.longitude
        {
            return Err(SarError::InvalidBoundingBox(format!(
                "upper_left {} is not above and left of lower_right {}",
                upper_left, lower_right
            )));
        }
        Ok(Self {
            upper_left,
            lower_right,
        })
    }

    pub fn min_lat(&self) -> f64 {
        self.lower_right.latitude
    }

    pub fn max_lat(&self) -> f64 {
        self.upper_left.latitude
    }

    pub fn min_lon(&self) -> f64 {
        self.upper_left.longitude
    }

    pub fn max_lon(&self) -> f64 {
        self.lower_right.longitude
    }

    /// Midpoint in degrees
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min_lat() + self.max_lat()) / 2.0,
            (self.min_lon() + self.max_lon()) / 2.0,
        )
    }

    /// Closed rectangle polygon in (lon, lat) order
    pub fn to_polygon(&self) -> geo::Polygon<f64> {
        geo::Rect::new(
            geo::coord! { x: self.min_lon(), y: self.min_lat() },
            geo::coord! { x: self.max_lon(), y: self.max_lat() },
        )
        .to_polygon()
    }
}

/// Footprint of a SAR scene. Corners may be skewed, so this is a general quadrilateral.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneGeometry {
    pub center: GeoPoint,
    pub upper_left: GeoPoint,
    pub upper_right: GeoPoint,
    pub lower_left: GeoPoint,
    pub lower_right: GeoPoint,
}

impl SceneGeometry {
    /// Footprint polygon in (lon, lat) order, walking ll -> lr -> ur -> ul
    pub fn to_polygon(&self) -> geo::Polygon<f64> {
        let ring = vec![
            self.lower_left,
            self.lower_right,
            self.upper_right,
            self.upper_left,
            self.lower_left,
        ];
        geo::Polygon::new(
            geo::LineString::from(
                ring.iter()
                    .map(|p| (p.longitude, p.latitude))
                    .collect::<Vec<_>>(),
            ),
            vec![],
        )
    }
}

/// Per-polarization calibration constants (K_beta, dB)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationConstants {
    constants: HashMap<Polarization, f64>,
}

impl CalibrationConstants {
    pub fn new(constants: HashMap<Polarization, f64>) -> Self {
        Self { constants }
    }

    /// K_beta for a polarization; absence is a configuration error
    pub fn get(&self, pol: Polarization) -> SarResult<f64> {
        self.constants.get(&pol).copied().ok_or_else(|| {
            SarError::Metadata(format!("No calibration constant for polarization {}", pol))
        })
    }

    pub fn polarizations(&self) -> Vec<Polarization> {
        let mut pols: Vec<_> = self.constants.keys().copied().collect();
        pols.sort();
        pols
    }
}

/// Geospatial transformation parameters (GDAL coefficient order)
///
/// ```text
/// x = top_left_x + col * pixel_width + row * rotation_x
/// y = top_left_y + col * rotation_y  + row * pixel_height
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub top_left_x: f64,
    pub pixel_width: f64,
    pub rotation_x: f64,
    pub top_left_y: f64,
    pub rotation_y: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// North-up transform with no rotation
    pub fn north_up(top_left_x: f64, top_left_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            top_left_x,
            pixel_width,
            rotation_x: 0.0,
            top_left_y,
            rotation_y: 0.0,
            pixel_height,
        }
    }

    pub fn from_gdal(coeffs: [f64; 6]) -> Self {
        Self {
            top_left_x: coeffs[0],
            pixel_width: coeffs[1],
            rotation_x: coeffs[2],
            top_left_y: coeffs[3],
            rotation_y: coeffs[4],
            pixel_height: coeffs[5],
        }
    }

    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.top_left_x,
            self.pixel_width,
            self.rotation_x,
            self.top_left_y,
            self.rotation_y,
            self.pixel_height,
        ]
    }

    /// Projected coordinate at fractional pixel position (col, row)
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        let x = self.top_left_x + col * self.pixel_width + row * self.rotation_x;
        let y = self.top_left_y + col * self.rotation_y + row * self.pixel_height;
        (x, y)
    }

    /// Projected coordinate of a pixel center
    pub fn pixel_center(&self, col: usize, row: usize) -> (f64, f64) {
        self.apply(col as f64 + 0.5, row as f64 + 0.5)
    }

    /// Fractional (col, row) for a projected coordinate
    pub fn invert(&self, x: f64, y: f64) -> SarResult<(f64, f64)> {
        let det = self.pixel_width * self.pixel_height - self.rotation_x * self.rotation_y;
        if det.abs() < 1e-15 {
            return Err(SarError::Processing(format!(
                "Degenerate geotransform {:?}",
                self.to_gdal()
            )));
        }

        let dx = x - self.top_left_x;
        let dy = y - self.top_left_y;

        let col = (self.pixel_height * dx - self.rotation_x * dy) / det;
        let row = (-self.rotation_y * dx + self.pixel_width * dy) / det;
        Ok((col, row))
    }

    /// Transform of a sub-window starting at (col_off, row_off); pixel scale is unchanged
    pub fn window_transform(&self, col_off: usize, row_off: usize) -> Self {
        let (x, y) = self.apply(col_off as f64, row_off as f64);
        Self {
            top_left_x: x,
            top_left_y: y,
            ..*self
        }
    }
}

/// Broad category of a `SarError`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing/malformed metadata or input files
    Configuration,
    /// AOI outside the raster, empty windows, mismatched grids
    Geometric,
    /// GDAL, CSV and other backend failures
    Backend,
}

/// Error types for SAR processing
#[derive(Debug, thiserror::Error)]
pub enum SarError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing required metadata key '{key}' in {path}")]
    MissingKey { key: String, path: PathBuf },

    #[error("Invalid value for '{key}': '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("XML parsing error: {0}")]
    XmlParsing(String),

    #[error("Distance must be positive and finite, got {0} m")]
    InvalidDistance(f64),

    #[error("Invalid bounding box: {0}")]
    InvalidBoundingBox(String),

    #[error("Window {window} lies outside raster of {raster_cols}x{raster_rows} pixels")]
    WindowOutOfBounds {
        window: String,
        raster_cols: usize,
        raster_rows: usize,
    },

    #[error("Window has zero area: {0}")]
    EmptyWindow(String),

    #[error("Shape mismatch: {left} is {left_dim:?} but {right} is {right_dim:?}")]
    ShapeMismatch {
        left: String,
        left_dim: (usize, usize),
        right: String,
        right_dim: (usize, usize),
    },

    #[error("Area of interest {0} is not covered by the scene footprint")]
    OutsideScene(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl SarError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SarError::Io(_)
            | SarError::MissingKey { .. }
            | SarError::InvalidValue { .. }
            | SarError::Metadata(_)
            | SarError::XmlParsing(_) => ErrorKind::Configuration,
            SarError::InvalidDistance(_)
            | SarError::InvalidBoundingBox(_)
            | SarError::WindowOutOfBounds { .. }
            | SarError::EmptyWindow(_)
            | SarError::ShapeMismatch { .. }
            | SarError::OutsideScene(_) => ErrorKind::Geometric,
            SarError::Processing(_) | SarError::Gdal(_) | SarError::Csv(_) => ErrorKind::Backend,
        }
    }
}

/// Result type for SAR operations
pub type SarResult<T> = Result<T, SarError>;
