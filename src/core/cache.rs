use crate::core::calibrate::Sigma0Grid;
use crate::io::raster::write_geotiff;
use crate::types::{Polarization, SarError, SarResult};
use gdal::Dataset;
use ndarray::Array2;
use std::path::{Path, PathBuf};

/// On-disk sigma0 cache, one Float64 GeoTIFF per polarization.
///
/// Presence of a file is the only validity check. There is no locking; two
/// processes sharing a directory can race on the same file.
#[derive(Debug, Clone)]
pub struct Sigma0Cache {
    dir: PathBuf,
}

impl Sigma0Cache {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, pol: Polarization) -> PathBuf {
        self.dir.join(format!("sigma0_{}.tif", pol))
    }

    pub fn contains(&self, pol: Polarization) -> bool {
        self.path_for(pol).exists()
    }

    /// Cached grid for `pol`. Unreadable files count as a miss.
    pub fn load(&self, pol: Polarization) -> Option<Sigma0Grid> {
        let path = self.path_for(pol);
        if !path.exists() {
            log::debug!("No cached sigma0 for {} at {}", pol, path.display());
            return None;
        }

        match read_grid(&path) {
            Ok(grid) => Some(grid),
            Err(e) => {
                log::warn!(
                    "Ignoring unreadable sigma0 cache {}: {}",
                    path.display(),
                    e
                );
                None
            }
        }
    }

    /// Persist a grid, creating the cache directory if needed
    pub fn store(&self, pol: Polarization, grid: &Sigma0Grid) -> SarResult<()> {
        std::fs::create_dir_all(&self.dir)?;

        let path = self.path_for(pol);
        if path.exists() {
            std::fs::remove_file(&path)?;
        }

        write_geotiff(grid.values(), &path, None, None, Some(f64::NAN))?;
        log::info!("Cached sigma0 for {} at {}", pol, path.display());
        Ok(())
    }

    /// Remove the cached grid for one polarization
    pub fn invalidate(&self, pol: Polarization) -> SarResult<bool> {
        let path = self.path_for(pol);
        if path.exists() {
            std::fs::remove_file(&path)?;
            log::info!("Removed cached sigma0 {}", path.display());
            return Ok(true);
        }
        Ok(false)
    }

    /// Remove every cached polarization
    pub fn clear(&self) -> SarResult<usize> {
        let mut removed = 0;
        for pol in [
            Polarization::HH,
            Polarization::HV,
            Polarization::VH,
            Polarization::VV,
        ] {
            if self.invalidate(pol)? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

fn read_grid(path: &Path) -> SarResult<Sigma0Grid> {
    let dataset = Dataset::open(path)?;
    let (width, height) = dataset.raster_size();
    if width == 0 || height == 0 {
        return Err(SarError::EmptyWindow(format!("{} has no pixels", path.display())));
    }

    let rasterband = dataset.rasterband(1)?;
    let buffer = rasterband.read_as::<f64>((0, 0), (width, height), (width, height), None)?;

    let values = Array2::from_shape_vec((height, width), buffer.data)
        .map_err(|e| SarError::Processing(format!("Failed to reshape cached sigma0: {}", e)))?;
    Ok(Sigma0Grid::new(values))
}
