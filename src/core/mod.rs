//! Core processing: AOI geometry, calibration, caching and geolocation

pub mod bbox;
pub mod cache;
pub mod calibrate;
pub mod coverage;
pub mod geolocation;
pub mod window;

// Re-export main types
pub use bbox::{bounding_box_around, build_bbox, destination, BoxDistances};
pub use cache::Sigma0Cache;
pub use calibrate::{
    calibrate, sigma0_pixel, CalibrationInput, Sigma0Grid, Sigma0Stats, SigmaNaughtCalibrator,
};
pub use coverage::covers;
pub use geolocation::{geolocate, GeolocationGrid};
pub use window::{compute_window, extract_window, project_bbox, window_from_bounds};
