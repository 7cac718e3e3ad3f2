use crate::core::window::{traditional_order, wgs84};
use crate::io::raster::RasterWindow;
use crate::types::{GeoTransform, SarError, SarRealImage, SarResult};
use gdal::spatial_ref::{CoordTransform, SpatialRef};
use ndarray::Array2;

/// Per-pixel geographic coordinates, same shape as the source window
#[derive(Debug, Clone, PartialEq)]
pub struct GeolocationGrid {
    pub latitude: SarRealImage,
    pub longitude: SarRealImage,
}

impl GeolocationGrid {
    pub fn dim(&self) -> (usize, usize) {
        self.latitude.dim()
    }
}

/// Latitude/longitude of every pixel center of a `(rows, cols)` window.
///
/// Pixel centers go through `window_transform` into `raster_crs`, then all points
/// are reprojected to WGS84 in a single batched call.
pub fn geolocate(
    shape: (usize, usize),
    window_transform: &GeoTransform,
    raster_crs: &SpatialRef,
) -> SarResult<GeolocationGrid> {
    let (rows, cols) = shape;
    let n = rows * cols;
    log::debug!("Geolocating {}x{} pixels", rows, cols);

    let center = |i: usize| window_transform.pixel_center(i % cols, i / cols);

    #[cfg(feature = "parallel")]
    let (mut xs, mut ys): (Vec<f64>, Vec<f64>) = {
        use rayon::prelude::*;
        (0..n).into_par_iter().map(center).unzip()
    };

    #[cfg(not(feature = "parallel"))]
    let (mut xs, mut ys): (Vec<f64>, Vec<f64>) = (0..n).map(center).unzip();

    let mut zs = vec![0.0; n];

    if n > 0 {
        let source = traditional_order(raster_crs)?;
        let target = wgs84()?;
        let transform = CoordTransform::new(&source, &target)?;
        transform.transform_coords(&mut xs, &mut ys, &mut zs)?;
    }

    // Traditional GIS order: x = longitude, y = latitude
    let longitude = Array2::from_shape_vec((rows, cols), xs)
        .map_err(|e| SarError::Processing(format!("Failed to reshape longitudes: {}", e)))?;
    let latitude = Array2::from_shape_vec((rows, cols), ys)
        .map_err(|e| SarError::Processing(format!("Failed to reshape latitudes: {}", e)))?;

    Ok(GeolocationGrid {
        latitude,
        longitude,
    })
}

impl RasterWindow {
    /// Geolocation grid for this window
    pub fn geolocate(&self) -> SarResult<GeolocationGrid> {
        geolocate(self.dim(), &self.transform, &self.spatial_ref()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_geographic_raster_is_identity_on_centers() {
        let gt = GeoTransform::north_up(72.0, 23.5, 0.01, -0.01);
        let srs = SpatialRef::from_epsg(4326).unwrap();

        let grid = geolocate((3, 4), &gt, &srs).unwrap();
        assert_eq!(grid.dim(), (3, 4));
        assert_abs_diff_eq!(grid.longitude[[0, 0]], 72.005, epsilon = 1e-9);
        assert_abs_diff_eq!(grid.latitude[[0, 0]], 23.495, epsilon = 1e-9);
        assert_abs_diff_eq!(grid.longitude[[2, 3]], 72.035, epsilon = 1e-9);
        assert_abs_diff_eq!(grid.latitude[[2, 3]], 23.475, epsilon = 1e-9);
    }

    #[test]
    fn test_utm_grid_orientation() {
        let gt = GeoTransform::north_up(240_000.0, 2_550_000.0, 100.0, -100.0);
        let srs = SpatialRef::from_epsg(32643).unwrap();

        let grid = geolocate((10, 10), &gt, &srs).unwrap();

        // Gujarat: lat ~23, lon ~72.5
        assert!(grid.latitude.iter().all(|&v| v > 22.0 && v < 24.0));
        assert!(grid.longitude.iter().all(|&v| v > 72.0 && v < 73.0));

        // Rows go south, columns go east
        assert!(grid.latitude[[9, 0]] < grid.latitude[[0, 0]]);
        assert!(grid.longitude[[0, 9]] > grid.longitude[[0, 0]]);
    }

    #[test]
    fn test_empty_shape() {
        let gt = GeoTransform::north_up(0.0, 0.0, 1.0, -1.0);
        let srs = SpatialRef::from_epsg(4326).unwrap();
        let grid = geolocate((0, 5), &gt, &srs).unwrap();
        assert_eq!(grid.dim(), (0, 5));
    }
}
