//! Paths and settings for a single scene run

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const BAND_META_FILE: &str = "BAND_META.txt";
pub const DEFAULT_CACHE_DIR: &str = "cache";

/// Explicit inputs of a scene run.
///
/// Nothing here is global: a pipeline receives one config and uses only it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// `KEY=VALUE` band metadata file
    pub band_meta_path: PathBuf,
    /// HH digital-number raster
    pub hh_path: PathBuf,
    /// HV digital-number raster
    pub hv_path: PathBuf,
    /// Local incidence angle raster (degrees), co-registered with HH/HV
    pub lia_path: PathBuf,
    /// Directory for cached sigma0 grids; `None` disables caching
    pub cache_dir: Option<PathBuf>,
    /// CSV destination; nothing is written when `None`
    pub dataset_path: Option<PathBuf>,
}

impl PipelineConfig {
    pub fn new<P: Into<PathBuf>>(band_meta_path: P, hh_path: P, hv_path: P, lia_path: P) -> Self {
        Self {
            band_meta_path: band_meta_path.into(),
            hh_path: hh_path.into(),
            hv_path: hv_path.into(),
            lia_path: lia_path.into(),
            cache_dir: Some(PathBuf::from(DEFAULT_CACHE_DIR)),
            dataset_path: None,
        }
    }

    /// Standard layout of an extracted scene directory:
    ///
    /// ```text
    /// <dir>/BAND_META.txt
    /// <dir>/scene_HH/imagery_HH.tif
    /// <dir>/scene_HV/imagery_HV.tif
    /// <dir>/<dir name>_lia.tif
    /// ```
    pub fn from_scene_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self::new(
            dir.join(BAND_META_FILE),
            dir.join("scene_HH").join("imagery_HH.tif"),
            dir.join("scene_HV").join("imagery_HV.tif"),
            dir.join(format!("{}_lia.tif", name)),
        )
    }

    pub fn with_cache_dir<P: Into<PathBuf>>(mut self, cache_dir: P) -> Self {
        self.cache_dir = Some(cache_dir.into());
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.cache_dir = None;
        self
    }

    pub fn with_dataset_path<P: Into<PathBuf>>(mut self, dataset_path: P) -> Self {
        self.dataset_path = Some(dataset_path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_dir_layout() {
        let config = PipelineConfig::from_scene_dir("/data/E04_SAR_MRS_20240101");

        assert_eq!(
            config.band_meta_path,
            PathBuf::from("/data/E04_SAR_MRS_20240101/BAND_META.txt")
        );
        assert_eq!(
            config.hh_path,
            PathBuf::from("/data/E04_SAR_MRS_20240101/scene_HH/imagery_HH.tif")
        );
        assert_eq!(
            config.hv_path,
            PathBuf::from("/data/E04_SAR_MRS_20240101/scene_HV/imagery_HV.tif")
        );
        assert_eq!(
            config.lia_path,
            PathBuf::from("/data/E04_SAR_MRS_20240101/E04_SAR_MRS_20240101_lia.tif")
        );
        assert_eq!(config.cache_dir, Some(PathBuf::from("cache")));
        assert!(config.dataset_path.is_none());
    }

    #[test]
    fn test_builder_setters() {
        let config = PipelineConfig::from_scene_dir("scene")
            .with_cache_dir("/tmp/sigma0")
            .with_dataset_path("out/dataset.csv");
        assert_eq!(config.cache_dir, Some(PathBuf::from("/tmp/sigma0")));
        assert_eq!(config.dataset_path, Some(PathBuf::from("out/dataset.csv")));

        let config = config.without_cache();
        assert!(config.cache_dir.is_none());
    }
}
