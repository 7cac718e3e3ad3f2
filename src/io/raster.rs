use crate::types::{GeoTransform, SarError, SarRealImage, SarResult};
use gdal::spatial_ref::SpatialRef;
use gdal::Dataset;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Pixel window in parent raster space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelWindow {
    pub col_off: usize,
    pub row_off: usize,
    pub cols: usize,
    pub rows: usize,
}

impl PixelWindow {
    pub fn new(col_off: usize, row_off: usize, cols: usize, rows: usize) -> Self {
        Self {
            col_off,
            row_off,
            cols,
            rows,
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.cols * self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.cols == 0 || self.rows == 0
    }
}

impl std::fmt::Display for PixelWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "cols {}..{}, rows {}..{}",
            self.col_off,
            self.col_off + self.cols,
            self.row_off,
            self.row_off + self.rows
        )
    }
}

/// A window of a single raster band, cast to f64, with its own georeferencing
#[derive(Debug, Clone)]
pub struct RasterWindow {
    pub data: SarRealImage,
    pub window: PixelWindow,
    pub transform: GeoTransform,
    /// CRS of the source raster as WKT
    pub crs_wkt: String,
}

impl RasterWindow {
    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn spatial_ref(&self) -> SarResult<SpatialRef> {
        Ok(SpatialRef::from_wkt(&self.crs_wkt)?)
    }
}

/// Georeferenced raster opened through GDAL. Pixel data is only read on demand.
#[derive(Debug)]
pub struct GeoRaster {
    dataset: Dataset,
    path: PathBuf,
}

impl GeoRaster {
    /// Open a raster file
    pub fn open<P: AsRef<Path>>(path: P) -> SarResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SarError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Raster not found: {}", path.display()),
            )));
        }

        log::debug!("Opening raster: {}", path.display());
        let dataset = Dataset::open(path)?;

        Ok(Self {
            dataset,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raster size as (cols, rows)
    pub fn size(&self) -> (usize, usize) {
        self.dataset.raster_size()
    }

    pub fn transform(&self) -> SarResult<GeoTransform> {
        Ok(GeoTransform::from_gdal(self.dataset.geo_transform()?))
    }

    pub fn spatial_ref(&self) -> SarResult<SpatialRef> {
        Ok(self.dataset.spatial_ref()?)
    }

    /// Read a pixel window of band 1 as f64
    pub fn read_window(&self, window: PixelWindow) -> SarResult<RasterWindow> {
        let (width, height) = self.size();
        if window.is_empty() {
            return Err(SarError::EmptyWindow(window.to_string()));
        }
        if window.col_off + window.cols > width || window.row_off + window.rows > height {
            return Err(SarError::WindowOutOfBounds {
                window: window.to_string(),
                raster_cols: width,
                raster_rows: height,
            });
        }

        log::debug!("Reading window [{}] from {}", window, self.path.display());

        let rasterband = self.dataset.rasterband(1)?;
        let buffer = rasterband.read_as::<f64>(
            (window.col_off as isize, window.row_off as isize),
            (window.cols, window.rows),
            (window.cols, window.rows),
            None,
        )?;

        let data = Array2::from_shape_vec((window.rows, window.cols), buffer.data)
            .map_err(|e| SarError::Processing(format!("Failed to reshape raster window: {}", e)))?;

        let transform = self.transform()?.window_transform(window.col_off, window.row_off);
        let crs_wkt = self.spatial_ref()?.to_wkt()?;

        Ok(RasterWindow {
            data,
            window,
            transform,
            crs_wkt,
        })
    }
}

/// Save a 2D array as a single-band GeoTIFF
pub fn write_geotiff<T, P>(
    data: &Array2<T>,
    output_path: P,
    transform: Option<&GeoTransform>,
    spatial_ref: Option<&SpatialRef>,
    no_data: Option<f64>,
) -> SarResult<()>
where
    T: gdal::raster::GdalType + Copy,
    P: AsRef<Path>,
{
    log::debug!("Writing GeoTIFF: {}", output_path.as_ref().display());

    let driver = gdal::DriverManager::get_driver_by_name("GTiff")?;
    let (height, width) = data.dim();

    let mut dataset = driver.create_with_band_type::<T, _>(
        output_path.as_ref(),
        width as isize,
        height as isize,
        1,
    )?;

    if let Some(transform) = transform {
        dataset.set_geo_transform(&transform.to_gdal())?;
    }
    if let Some(srs) = spatial_ref {
        dataset.set_spatial_ref(srs)?;
    }

    let mut rasterband = dataset.rasterband(1)?;
    let flat_data: Vec<T> = data.iter().copied().collect();
    let buffer = gdal::raster::Buffer::new((width, height), flat_data);
    rasterband.write((0, 0), (width, height), &buffer)?;

    if no_data.is_some() {
        rasterband.set_no_data_value(no_data)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn utm43n() -> SpatialRef {
        SpatialRef::from_epsg(32643).unwrap()
    }

    fn write_ramp(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("ramp.tif");
        let data = Array2::from_shape_fn((20, 30), |(r, c)| (r * 100 + c) as u16);
        let gt = GeoTransform::north_up(250_000.0, 2_550_000.0, 10.0, -10.0);
        write_geotiff(&data, &path, Some(&gt), Some(&utm43n()), None).unwrap();
        path
    }

    #[test]
    fn test_read_window_values_and_transform() {
        let dir = TempDir::new().unwrap();
        let raster = GeoRaster::open(write_ramp(&dir)).unwrap();
        assert_eq!(raster.size(), (30, 20));

        let window = raster.read_window(PixelWindow::new(5, 3, 4, 2)).unwrap();
        assert_eq!(window.dim(), (2, 4));
        assert_eq!(window.data[[0, 0]], 305.0);
        assert_eq!(window.data[[1, 3]], 408.0);
        assert_eq!(window.transform.top_left_x, 250_050.0);
        assert_eq!(window.transform.top_left_y, 2_549_970.0);
        assert!(window.spatial_ref().is_ok());
    }

    #[test]
    fn test_read_window_out_of_bounds() {
        let dir = TempDir::new().unwrap();
        let raster = GeoRaster::open(write_ramp(&dir)).unwrap();

        let result = raster.read_window(PixelWindow::new(28, 0, 5, 5));
        assert!(matches!(result, Err(SarError::WindowOutOfBounds { .. })));

        let result = raster.read_window(PixelWindow::new(0, 0, 0, 5));
        assert!(matches!(result, Err(SarError::EmptyWindow(_))));
    }

    #[test]
    fn test_open_missing_file() {
        let result = GeoRaster::open("/nonexistent/imagery_HH.tif");
        assert!(matches!(result, Err(SarError::Io(_))));
    }
}
