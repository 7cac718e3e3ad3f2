use crate::io::raster::{GeoRaster, PixelWindow, RasterWindow};
use crate::types::{BoundingBox, GeoTransform, SarError, SarResult};
use gdal::spatial_ref::{CoordTransform, SpatialRef};

/// EPSG code of the geographic frame AOIs are expressed in
pub const WGS84_EPSG: u32 = 4326;

/// WGS84 with (lon, lat) axis order
pub fn wgs84() -> SarResult<SpatialRef> {
    let mut srs = SpatialRef::from_epsg(WGS84_EPSG)?;
    srs.set_axis_mapping_strategy(gdal_sys::OSRAxisMappingStrategy::OAMS_TRADITIONAL_GIS_ORDER);
    Ok(srs)
}

/// Copy of `srs` forced to traditional (x = easting/lon, y = northing/lat) axis order
pub fn traditional_order(srs: &SpatialRef) -> SarResult<SpatialRef> {
    let mut srs = SpatialRef::from_wkt(&srs.to_wkt()?)?;
    srs.set_axis_mapping_strategy(gdal_sys::OSRAxisMappingStrategy::OAMS_TRADITIONAL_GIS_ORDER);
    Ok(srs)
}

/// Projected extent (min_x, min_y, max_x, max_y) of a geographic AOI in `target` CRS
pub fn project_bbox(bbox: &BoundingBox, target: &SpatialRef) -> SarResult<(f64, f64, f64, f64)> {
    let source = wgs84()?;
    let target = traditional_order(target)?;
    let transform = CoordTransform::new(&source, &target)?;

    let mut xs = [bbox.upper_left.longitude, bbox.lower_right.longitude];
    let mut ys = [bbox.upper_left.latitude, bbox.lower_right.latitude];
    let mut zs = [0.0; 2];
    transform
        .transform_coords(&mut xs, &mut ys, &mut zs)
        .map_err(|e| {
            SarError::OutsideScene(format!(
                "{} .. {} cannot be projected into the raster CRS ({})",
                bbox.upper_left, bbox.lower_right, e
            ))
        })?;

    Ok((
        xs[0].min(xs[1]),
        ys[0].min(ys[1]),
        xs[0].max(xs[1]),
        ys[0].max(ys[1]),
    ))
}

/// Pixel coordinates closer than this to an integer are treated as lying on the edge
const PIXEL_EDGE_TOLERANCE: f64 = 1e-6;

/// Snap `v` onto the nearest pixel edge when it only misses it by rounding noise
fn snap_to_edge(v: f64) -> f64 {
    let edge = v.round();
    if (v - edge).abs() < PIXEL_EDGE_TOLERANCE {
        edge
    } else {
        v
    }
}

/// Covering pixel window for a projected extent.
///
/// Fractional pixel bounds are expanded outward (floor start, ceil end) after
/// snapping near-integer bounds onto their edge. A window that leaves the raster
/// is an error; it is never clipped.
pub fn window_from_bounds(
    bounds: (f64, f64, f64, f64),
    transform: &GeoTransform,
    raster_size: (usize, usize),
) -> SarResult<PixelWindow> {
    let (min_x, min_y, max_x, max_y) = bounds;
    let (width, height) = raster_size;

    let corners = [
        transform.invert(min_x, max_y)?,
        transform.invert(max_x, max_y)?,
        transform.invert(min_x, min_y)?,
        transform.invert(max_x, min_y)?,
    ];

    let col_min = corners.iter().map(|c| c.0).fold(f64::INFINITY, f64::min);
    let col_max = corners.iter().map(|c| c.0).fold(f64::NEG_INFINITY, f64::max);
    let row_min = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min);
    let row_max = corners.iter().map(|c| c.1).fold(f64::NEG_INFINITY, f64::max);

    let describe = || {
        format!(
            "cols {:.2}..{:.2}, rows {:.2}..{:.2}",
            col_min, col_max, row_min, row_max
        )
    };

    if !(col_min.is_finite() && col_max.is_finite() && row_min.is_finite() && row_max.is_finite())
    {
        return Err(SarError::Processing(format!(
            "Non-finite pixel bounds: {}",
            describe()
        )));
    }

    if col_max - col_min <= 0.0 || row_max - row_min <= 0.0 {
        return Err(SarError::EmptyWindow(describe()));
    }

    let col_start = snap_to_edge(col_min).floor();
    let row_start = snap_to_edge(row_min).floor();
    let col_end = snap_to_edge(col_max).ceil();
    let row_end = snap_to_edge(row_max).ceil();

    if col_start < 0.0 || row_start < 0.0 || col_end > width as f64 || row_end > height as f64 {
        return Err(SarError::WindowOutOfBounds {
            window: describe(),
            raster_cols: width,
            raster_rows: height,
        });
    }

    Ok(PixelWindow::new(
        col_start as usize,
        row_start as usize,
        (col_end - col_start) as usize,
        (row_end - row_start) as usize,
    ))
}

/// Pixel window of `parent` covering a geographic AOI, without reading pixels
pub fn compute_window(parent: &GeoRaster, child_bbox: &BoundingBox) -> SarResult<PixelWindow> {
    let bounds = project_bbox(child_bbox, &parent.spatial_ref()?)?;
    log::debug!(
        "AOI in {} projected to x {:.1}..{:.1}, y {:.1}..{:.1}",
        parent.path().display(),
        bounds.0,
        bounds.2,
        bounds.1,
        bounds.3
    );
    window_from_bounds(bounds, &parent.transform()?, parent.size())
}

/// Read only the part of `parent` that covers `child_bbox`.
///
/// The returned window carries its own transform (origin moved to the window
/// offset, original pixel scale), so geolocation stays consistent with the crop.
pub fn extract_window(parent: &GeoRaster, child_bbox: &BoundingBox) -> SarResult<RasterWindow> {
    let window = compute_window(parent, child_bbox)?;
    log::info!(
        "Extracting {}x{} window [{}] from {}",
        window.cols,
        window.rows,
        window,
        parent.path().display()
    );
    parent.read_window(window)
}
