use crate::core::cache::Sigma0Cache;
use crate::types::{Polarization, SarError, SarRealImage, SarResult};
use ndarray::{ArrayView2, CowArray, Ix2, Zip};
use num_traits::AsPrimitive;
use std::path::PathBuf;

/// Calibrated backscatter in dB; invalid pixels hold NaN
#[derive(Debug, Clone, PartialEq)]
pub struct Sigma0Grid {
    values: SarRealImage,
}

/// Summary over the valid pixels of a grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sigma0Stats {
    pub valid_pixels: usize,
    pub min_db: f64,
    pub max_db: f64,
    pub mean_db: f64,
}

impl Sigma0Grid {
    pub fn new(values: SarRealImage) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &SarRealImage {
        &self.values
    }

    pub fn into_inner(self) -> SarRealImage {
        self.values
    }

    pub fn dim(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }

    /// Min/max/mean of the valid pixels, `None` if every pixel is masked
    pub fn stats(&self) -> Option<Sigma0Stats> {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min_db = f64::INFINITY;
        let mut max_db = f64::NEG_INFINITY;

        for &v in self.values.iter().filter(|v| !v.is_nan()) {
            count += 1;
            sum += v;
            min_db = min_db.min(v);
            max_db = max_db.max(v);
        }

        if count == 0 {
            return None;
        }
        Some(Sigma0Stats {
            valid_pixels: count,
            min_db,
            max_db,
            mean_db: sum / count as f64,
        })
    }
}

/// sigma0 for a single pixel, NaN unless `dn > 0` and `0 < lia_deg < 90`
#[inline]
pub fn sigma0_pixel(dn: f64, lia_deg: f64, k_beta: f64) -> f64 {
    if dn > 0.0 && lia_deg > 0.0 && lia_deg < 90.0 {
        10.0 * (dn * dn).log10() + 10.0 * lia_deg.to_radians().sin().log10() - k_beta
    } else {
        f64::NAN
    }
}

/// Calibrate digital numbers against a co-registered local incidence angle grid.
///
/// `sigma0 = 10 log10(DN^2) + 10 log10(sin(theta)) - K_beta`, with theta in degrees.
/// Inputs are cast to f64 before squaring so 16-bit DNs cannot overflow.
pub fn calibrate<D, A>(
    digital_numbers: ArrayView2<D>,
    incidence_angle: ArrayView2<A>,
    k_beta: f64,
) -> SarResult<Sigma0Grid>
where
    D: AsPrimitive<f64> + Send + Sync,
    A: AsPrimitive<f64> + Send + Sync,
{
    if digital_numbers.dim() != incidence_angle.dim() {
        return Err(SarError::ShapeMismatch {
            left: "digital numbers".to_string(),
            left_dim: digital_numbers.dim(),
            right: "incidence angle".to_string(),
            right_dim: incidence_angle.dim(),
        });
    }

    log::debug!(
        "Calibrating {}x{} pixels with K_beta = {}",
        digital_numbers.nrows(),
        digital_numbers.ncols(),
        k_beta
    );

    let zip = Zip::from(&digital_numbers).and(&incidence_angle);

    #[cfg(feature = "parallel")]
    let values = zip.par_map_collect(|&dn, &lia| sigma0_pixel(dn.as_(), lia.as_(), k_beta));

    #[cfg(not(feature = "parallel"))]
    let values = zip.map_collect(|&dn, &lia| sigma0_pixel(dn.as_(), lia.as_(), k_beta));

    let grid = Sigma0Grid::new(values);
    match grid.stats() {
        Some(stats) => log::info!(
            "Calibration completed: {} valid pixels, range {:.2} to {:.2} dB",
            stats.valid_pixels,
            stats.min_db,
            stats.max_db
        ),
        None => log::warn!("Calibration completed but every pixel is masked"),
    }

    Ok(grid)
}

/// Raster inputs for one polarization band, either borrowed or owned
#[derive(Debug, Clone)]
pub struct CalibrationInput<'a> {
    pub digital_numbers: CowArray<'a, f64, Ix2>,
    pub incidence_angle: CowArray<'a, f64, Ix2>,
}

impl<'a> CalibrationInput<'a> {
    pub fn borrowed(digital_numbers: ArrayView2<'a, f64>, incidence_angle: ArrayView2<'a, f64>) -> Self {
        Self {
            digital_numbers: digital_numbers.into(),
            incidence_angle: incidence_angle.into(),
        }
    }

    pub fn owned(digital_numbers: SarRealImage, incidence_angle: SarRealImage) -> Self {
        Self {
            digital_numbers: digital_numbers.into(),
            incidence_angle: incidence_angle.into(),
        }
    }
}

/// Sigma-naught calibrator with an optional per-polarization disk cache
pub struct SigmaNaughtCalibrator {
    cache: Option<Sigma0Cache>,
}

impl SigmaNaughtCalibrator {
    /// Calibrator that memoizes results under `cache_dir`
    pub fn new<P: Into<PathBuf>>(cache_dir: P) -> Self {
        Self {
            cache: Some(Sigma0Cache::new(cache_dir)),
        }
    }

    /// Calibrator that always computes
    pub fn without_cache() -> Self {
        Self { cache: None }
    }

    pub fn cache(&self) -> Option<&Sigma0Cache> {
        self.cache.as_ref()
    }

    /// Calibrate one polarization band.
    ///
    /// A cache file for `pol` is returned as-is when present and `load` is never
    /// called. The cache is keyed by polarization only: a changed K_beta, AOI or
    /// source raster is not detected until the file is removed.
    pub fn calibrate_band<'a, F>(
        &self,
        pol: Polarization,
        k_beta: f64,
        load: F,
    ) -> SarResult<Sigma0Grid>
    where
        F: FnOnce() -> SarResult<CalibrationInput<'a>>,
    {
        if let Some(cache) = &self.cache {
            if let Some(grid) = cache.load(pol) {
                log::info!("Using cached sigma0 for {} from {}", pol, cache.path_for(pol).display());
                return Ok(grid);
            }
        }

        log::info!("Computing sigma0 for {}", pol);
        let input = load()?;
        let grid = calibrate(input.digital_numbers.view(), input.incidence_angle.view(), k_beta)?;

        if let Some(cache) = &self.cache {
            cache.store(pol, &grid)?;
        }

        Ok(grid)
    }
}
