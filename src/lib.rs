//! sarcal: sigma-naught calibration and geolocation for dual-pol SAR scenes
//!
//! Builds a geodesic area of interest around a point, reads only the matching
//! window of the HH/HV/incidence-angle rasters, calibrates digital numbers to
//! sigma0 in dB (cached per polarization), geolocates every pixel and exports
//! the result as a flat per-pixel dataset.

pub mod config;
pub mod core;
pub mod io;
pub mod pipeline;
pub mod types;

#[cfg(feature = "python")]
mod python;

// Re-export main types and functions for easier access
pub use types::{
    BoundingBox, CalibrationConstants, ErrorKind, GeoPoint, GeoTransform, Polarization, SarError,
    SarRealImage, SarResult, SceneGeometry,
};

pub use crate::core::{
    bounding_box_around, build_bbox, calibrate, covers, extract_window, geolocate, BoxDistances,
    GeolocationGrid, Sigma0Cache, Sigma0Grid, SigmaNaughtCalibrator,
};
pub use config::PipelineConfig;
pub use io::{get_calibration_constants, get_scene_geometry, parse_xml_corners, GeoRaster, SceneDataset};
pub use pipeline::{PipelineOutput, ScenePipeline};
