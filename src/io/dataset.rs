use crate::core::calibrate::Sigma0Grid;
use crate::core::geolocation::GeolocationGrid;
use crate::types::{SarError, SarRealImage, SarResult};
use serde::Serialize;
use std::path::Path;

/// One pixel of the exported dataset. NaN and infinite values are written as empty fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetRow {
    #[serde(rename = "HH [dB]")]
    pub hh_db: Option<f64>,
    #[serde(rename = "HV [dB]")]
    pub hv_db: Option<f64>,
    #[serde(rename = "HH / HV")]
    pub hh_hv_ratio: Option<f64>,
    #[serde(rename = "HH - HV [dB]")]
    pub hh_hv_diff_db: Option<f64>,
    #[serde(rename = "Latitude")]
    pub latitude: Option<f64>,
    #[serde(rename = "Longitude")]
    pub longitude: Option<f64>,
}

fn finite(value: f64) -> Option<f64> {
    if !value.is_finite() {
        None
    } else {
        Some(value)
    }
}

fn check_shape(name: &str, dim: (usize, usize), expected: (usize, usize)) -> SarResult<()> {
    if dim != expected {
        return Err(SarError::ShapeMismatch {
            left: "raw HH".to_string(),
            left_dim: expected,
            right: name.to_string(),
            right_dim: dim,
        });
    }
    Ok(())
}

/// Flattened per-pixel table of dual-pol backscatter and position
#[derive(Debug, Clone, Default)]
pub struct SceneDataset {
    pub rows: Vec<DatasetRow>,
}

impl SceneDataset {
    /// Flatten co-registered layers in row-major order
    pub fn assemble(
        raw_hh: &SarRealImage,
        raw_hv: &SarRealImage,
        sigma0_hh: &Sigma0Grid,
        sigma0_hv: &Sigma0Grid,
        geolocation: &GeolocationGrid,
    ) -> SarResult<Self> {
        let shape = raw_hh.dim();
        check_shape("raw HV", raw_hv.dim(), shape)?;
        check_shape("sigma0 HH", sigma0_hh.dim(), shape)?;
        check_shape("sigma0 HV", sigma0_hv.dim(), shape)?;
        check_shape("latitude", geolocation.latitude.dim(), shape)?;
        check_shape("longitude", geolocation.longitude.dim(), shape)?;

        let rows = raw_hh
            .iter()
            .zip(raw_hv.iter())
            .zip(sigma0_hh.values().iter().zip(sigma0_hv.values().iter()))
            .zip(geolocation.latitude.iter().zip(geolocation.longitude.iter()))
            .map(|(((&hh, &hv), (&s_hh, &s_hv)), (&lat, &lon))| {
                let ratio = if hv == 0.0 { f64::NAN } else { hh / hv };
                DatasetRow {
                    hh_db: finite(s_hh),
                    hv_db: finite(s_hv),
                    hh_hv_ratio: finite(ratio),
                    hh_hv_diff_db: finite(s_hh - s_hv),
                    latitude: finite(lat),
                    longitude: finite(lon),
                }
            })
            .collect();

        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write the dataset as CSV with a header row
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> SarResult<()> {
        log::info!("Writing {} rows to {}", self.rows.len(), path.as_ref().display());

        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut writer = csv::Writer::from_path(path.as_ref())?;
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}
