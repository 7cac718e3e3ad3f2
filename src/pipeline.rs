//! End-to-end scene run: AOI, coverage, windows, calibration, geolocation, dataset

use crate::config::PipelineConfig;
use crate::core::bbox::{build_bbox, BoxDistances};
use crate::core::calibrate::{CalibrationInput, Sigma0Grid, SigmaNaughtCalibrator};
use crate::core::coverage::covers;
use crate::core::geolocation::GeolocationGrid;
use crate::core::window::extract_window;
use crate::io::band_meta::SceneMetadata;
use crate::io::dataset::SceneDataset;
use crate::io::raster::{GeoRaster, PixelWindow, RasterWindow};
use crate::types::{BoundingBox, GeoPoint, Polarization, SarError, SarRealImage, SarResult};
use std::time::Instant;

/// Run `f` and log how long it took
fn timed<T, F>(stage: &str, f: F) -> SarResult<T>
where
    F: FnOnce() -> SarResult<T>,
{
    let start = Instant::now();
    let result = f();
    log::info!("{} took {:.3}s", stage, start.elapsed().as_secs_f64());
    result
}

/// Everything produced by one run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub bbox: BoundingBox,
    pub window: PixelWindow,
    pub sigma0_hh: Sigma0Grid,
    pub sigma0_hv: Sigma0Grid,
    pub geolocation: GeolocationGrid,
    pub dataset: SceneDataset,
}

pub struct ScenePipeline {
    config: PipelineConfig,
    metadata: SceneMetadata,
    calibrator: SigmaNaughtCalibrator,
}

impl ScenePipeline {
    /// Read scene metadata up front; a broken metadata file fails here
    pub fn new(config: PipelineConfig) -> SarResult<Self> {
        let metadata = SceneMetadata::from_band_meta(&config.band_meta_path)?;
        let calibrator = match &config.cache_dir {
            Some(dir) => SigmaNaughtCalibrator::new(dir),
            None => SigmaNaughtCalibrator::without_cache(),
        };

        Ok(Self {
            config,
            metadata,
            calibrator,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn metadata(&self) -> &SceneMetadata {
        &self.metadata
    }

    pub fn calibrator(&self) -> &SigmaNaughtCalibrator {
        &self.calibrator
    }

    pub fn run(&self, center: GeoPoint, distances: BoxDistances) -> SarResult<PipelineOutput> {
        log::info!("Processing AOI around {}", center);

        let bbox = timed("Bounding box", || build_bbox(center, distances))?;

        if !covers(&self.metadata.geometry, &bbox) {
            return Err(SarError::OutsideScene(format!(
                "{} .. {}",
                bbox.upper_left, bbox.lower_right
            )));
        }

        let (hh, hv) = timed("Window extraction", || {
            let hh = extract_window(&GeoRaster::open(&self.config.hh_path)?, &bbox)?;
            let hv = extract_window(&GeoRaster::open(&self.config.hv_path)?, &bbox)?;
            Ok((hh, hv))
        })?;

        // Read at most once, and only if a polarization misses the cache
        let mut lia: Option<SarRealImage> = None;

        let sigma0_hh = timed("HH calibration", || {
            self.calibrate(Polarization::HH, &hh, &bbox, &mut lia)
        })?;
        let sigma0_hv = timed("HV calibration", || {
            self.calibrate(Polarization::HV, &hv, &bbox, &mut lia)
        })?;

        let geolocation = timed("Geolocation", || hh.geolocate())?;

        let dataset = timed("Dataset assembly", || {
            SceneDataset::assemble(&hh.data, &hv.data, &sigma0_hh, &sigma0_hv, &geolocation)
        })?;

        if let Some(path) = &self.config.dataset_path {
            timed("CSV export", || dataset.write_csv(path))?;
        }

        Ok(PipelineOutput {
            bbox,
            window: hh.window,
            sigma0_hh,
            sigma0_hv,
            geolocation,
            dataset,
        })
    }

    fn calibrate<'a>(
        &self,
        pol: Polarization,
        band: &'a RasterWindow,
        bbox: &BoundingBox,
        lia: &'a mut Option<SarRealImage>,
    ) -> SarResult<Sigma0Grid> {
        let k_beta = self.metadata.calibration.get(pol)?;
        let lia_path = &self.config.lia_path;

        // Both windows are lent to the calibrator; the LIA window is read into `lia`
        // on the first miss and reused by the next polarization
        let grid = self.calibrator.calibrate_band(pol, k_beta, move || {
            if lia.is_none() {
                let lia_raster = GeoRaster::open(lia_path)?;
                *lia = Some(extract_window(&lia_raster, bbox)?.data);
            }
            let lia: &'a Option<SarRealImage> = lia;
            let angles = lia.as_ref().ok_or_else(|| {
                SarError::Processing("Incidence angle window was not loaded".to_string())
            })?;
            Ok(CalibrationInput::borrowed(band.data.view(), angles.view()))
        })?;

        if grid.dim() != band.dim() {
            log::warn!(
                "sigma0 {} grid is {:?} but the current window is {:?}; the cache may be stale",
                pol,
                grid.dim(),
                band.dim()
            );
        }

        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_metadata_fails_fast() {
        let dir = TempDir::new().unwrap();
        let config = PipelineConfig::from_scene_dir(dir.path());

        let result = ScenePipeline::new(config);
        assert!(matches!(result, Err(SarError::Io(_))));
    }

    #[test]
    fn test_aoi_outside_scene() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("BAND_META.txt"),
            "SceneCenterLat=23.0215\nSceneCenterLon=72.5797\n\
             ImageULLat=23.5\nImageULLon=72.0\nImageURLat=23.5\nImageURLon=73.0\n\
             ImageLLLat=22.5\nImageLLLon=72.0\nImageLRLat=22.5\nImageLRLon=73.0\n\
             Calibration_Constant_HH=-19.5\nCalibration_Constant_HV=-20.1\n",
        )
        .unwrap();

        let config = PipelineConfig::from_scene_dir(dir.path()).without_cache();
        let pipeline = ScenePipeline::new(config).unwrap();

        // Rasters do not exist; the coverage check must reject first
        let result = pipeline.run(GeoPoint::new(28.6, 77.2), BoxDistances::Uniform(5_000.0));
        assert!(matches!(result, Err(SarError::OutsideScene(_))));
    }
}
