//! Reader for the flat `KEY=VALUE` band metadata file shipped with each scene
//! (`BAND_META.txt`).

use crate::types::{
    CalibrationConstants, GeoPoint, Polarization, SarError, SarResult, SceneGeometry,
};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Parse a key=value metadata file
pub fn parse_key_value_file<P: AsRef<Path>>(path: P) -> SarResult<BTreeMap<String, String>> {
    let content = std::fs::read_to_string(path.as_ref())?;
    Ok(parse_key_value_str(&content))
}

/// Parse key=value content. Lines that do not split into exactly two parts are skipped.
pub fn parse_key_value_str(content: &str) -> BTreeMap<String, String> {
    let mut meta = BTreeMap::new();

    for line in content.lines() {
        let parts: Vec<&str> = line.split('=').collect();
        if parts.len() == 2 {
            meta.insert(parts[0].trim().to_string(), parts[1].trim().to_string());
        }
    }

    meta
}

const CALIBRATION_KEY_PREFIX: &str = "Calibration_Constant_";

/// Typed view over a parsed metadata file; every lookup fails fast on a missing key
pub struct BandMeta {
    values: BTreeMap<String, String>,
    path: PathBuf,
}

impl BandMeta {
    pub fn open<P: AsRef<Path>>(path: P) -> SarResult<Self> {
        log::debug!("Reading band metadata: {}", path.as_ref().display());
        Ok(Self {
            values: parse_key_value_file(path.as_ref())?,
            path: path.as_ref().to_path_buf(),
        })
    }

    pub fn from_map(values: BTreeMap<String, String>, path: PathBuf) -> Self {
        Self { values, path }
    }

    pub fn get(&self, key: &str) -> SarResult<&str> {
        self.values
            .get(key)
            .map(|v| v.as_str())
            .ok_or_else(|| SarError::MissingKey {
                key: key.to_string(),
                path: self.path.clone(),
            })
    }

    pub fn get_f64(&self, key: &str) -> SarResult<f64> {
        let raw = self.get(key)?;
        raw.parse::<f64>().map_err(|_| SarError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
        })
    }

    fn point(&self, lat_key: &str, lon_key: &str) -> SarResult<GeoPoint> {
        Ok(GeoPoint::new(self.get_f64(lat_key)?, self.get_f64(lon_key)?))
    }

    pub fn scene_geometry(&self) -> SarResult<SceneGeometry> {
        Ok(SceneGeometry {
            center: self.point("SceneCenterLat", "SceneCenterLon")?,
            upper_left: self.point("ImageULLat", "ImageULLon")?,
            upper_right: self.point("ImageURLat", "ImageURLon")?,
            lower_left: self.point("ImageLLLat", "ImageLLLon")?,
            lower_right: self.point("ImageLRLat", "ImageLRLon")?,
        })
    }

    /// Every `Calibration_Constant_<POL>` key. HH and HV are required; other
    /// polarizations are picked up when present, unknown suffixes are ignored.
    pub fn calibration_constants(&self) -> SarResult<CalibrationConstants> {
        let mut constants = HashMap::new();
        for key in self.values.keys() {
            let Some(suffix) = key.strip_prefix(CALIBRATION_KEY_PREFIX) else {
                continue;
            };
            match suffix.parse::<Polarization>() {
                Ok(pol) => {
                    constants.insert(pol, self.get_f64(key)?);
                }
                Err(_) => log::debug!("Ignoring calibration key with unknown polarization: {}", key),
            }
        }

        for pol in [Polarization::HH, Polarization::HV] {
            if !constants.contains_key(&pol) {
                return Err(SarError::MissingKey {
                    key: format!("{}{}", CALIBRATION_KEY_PREFIX, pol),
                    path: self.path.clone(),
                });
            }
        }
        Ok(CalibrationConstants::new(constants))
    }
}

/// Scene geometry and calibration constants read from a single metadata file
#[derive(Debug, Clone)]
pub struct SceneMetadata {
    pub geometry: SceneGeometry,
    pub calibration: CalibrationConstants,
}

impl SceneMetadata {
    pub fn from_band_meta<P: AsRef<Path>>(path: P) -> SarResult<Self> {
        let meta = BandMeta::open(path)?;
        let metadata = Self {
            geometry: meta.scene_geometry()?,
            calibration: meta.calibration_constants()?,
        };
        log::info!(
            "Scene center {}, calibration constants for {:?}",
            metadata.geometry.center,
            metadata.calibration.polarizations()
        );
        Ok(metadata)
    }
}

/// Scene footprint from a band metadata file
pub fn get_scene_geometry<P: AsRef<Path>>(path: P) -> SarResult<SceneGeometry> {
    BandMeta::open(path)?.scene_geometry()
}

/// HH/HV calibration constants from a band metadata file
pub fn get_calibration_constants<P: AsRef<Path>>(path: P) -> SarResult<CalibrationConstants> {
    BandMeta::open(path)?.calibration_constants()
}
