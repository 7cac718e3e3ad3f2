use approx::assert_abs_diff_eq;
use gdal::spatial_ref::SpatialRef;
use ndarray::Array2;
use sarcal::core::window::compute_window;
use sarcal::io::{write_geotiff, PixelWindow, SceneMetadata};
use sarcal::{
    bounding_box_around, calibrate, covers, extract_window, get_scene_geometry, parse_xml_corners,
    ErrorKind, GeoPoint, GeoRaster, GeoTransform, Polarization, SarError,
};
use tempfile::TempDir;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

const BAND_META: &str = "SceneCenterLat=23.0215
SceneCenterLon=72.5797
ImageULLat=23.9
ImageULLon=71.8
ImageURLat=24.0
ImageURLon=73.3
ImageLLLat=22.1
ImageLLLon=71.9
ImageLRLat=22.2
ImageLRLon=73.4
Calibration_Constant_HH=-19.5
Calibration_Constant_HV=-20.1
";

#[test]
fn test_single_bright_pixel_scene() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let meta_path = dir.path().join("BAND_META.txt");
    std::fs::write(&meta_path, BAND_META).unwrap();

    let metadata = SceneMetadata::from_band_meta(&meta_path).unwrap();
    let k_beta = metadata.calibration.get(Polarization::HH).unwrap();

    // 5x5 geographic grid around the scene center
    let gt = GeoTransform::north_up(72.5772, 23.024, 0.001, -0.001);
    let srs = SpatialRef::from_epsg(4326).unwrap();

    let mut dn = Array2::<u16>::zeros((5, 5));
    let mut lia = Array2::<f32>::zeros((5, 5));
    dn[[2, 2]] = 100;
    lia[[2, 2]] = 45.0;

    let dn_path = dir.path().join("imagery_HH.tif");
    let lia_path = dir.path().join("scene_lia.tif");
    write_geotiff(&dn, &dn_path, Some(&gt), Some(&srs), None).unwrap();
    write_geotiff(&lia, &lia_path, Some(&gt), Some(&srs), None).unwrap();

    let full = PixelWindow::new(0, 0, 5, 5);
    let dn_window = GeoRaster::open(&dn_path).unwrap().read_window(full).unwrap();
    let lia_window = GeoRaster::open(&lia_path).unwrap().read_window(full).unwrap();

    let grid = calibrate(dn_window.data.view(), lia_window.data.view(), k_beta).unwrap();

    assert_abs_diff_eq!(grid.values()[[2, 2]], 57.995, epsilon = 1e-3);
    assert_eq!(grid.valid_count(), 1);
    for ((r, c), v) in grid.values().indexed_iter() {
        if (r, c) != (2, 2) {
            assert!(v.is_nan(), "pixel ({}, {}) = {}", r, c, v);
        }
    }

    // Geolocation of the bright pixel is the scene center
    let geolocation = dn_window.geolocate().unwrap();
    assert_abs_diff_eq!(geolocation.latitude[[2, 2]], 23.0215, epsilon = 1e-7);
    assert_abs_diff_eq!(geolocation.longitude[[2, 2]], 72.5797, epsilon = 1e-7);
}

#[test]
fn test_window_pixel_count_matches_transform() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("grid.tif");

    let gt = GeoTransform::north_up(72.0, 23.5, 0.002, -0.002);
    let srs = SpatialRef::from_epsg(4326).unwrap();
    let data = Array2::from_shape_fn((500, 500), |(r, c)| (r * 500 + c) as f32);
    write_geotiff(&data, &path, Some(&gt), Some(&srs), None).unwrap();

    let raster = GeoRaster::open(&path).unwrap();
    let bbox = bounding_box_around(GeoPoint::new(23.0215, 72.5797), 5_000.0).unwrap();
    let window = extract_window(&raster, &bbox).unwrap();

    let (rows, cols) = window.dim();
    assert!(rows > 0 && cols > 0);
    assert_eq!(window.data.len(), rows * cols);
    assert_eq!(window.window.pixel_count(), rows * cols);

    // The window is the smallest pixel-aligned extent covering the AOI
    let gt = window.transform;
    let west = gt.top_left_x;
    let east = gt.top_left_x + cols as f64 * gt.pixel_width;
    let north = gt.top_left_y;
    let south = gt.top_left_y + rows as f64 * gt.pixel_height;
    let eps = 1e-9;
    assert!(west <= bbox.min_lon() + eps && west > bbox.min_lon() - 0.002);
    assert!(east >= bbox.max_lon() - eps && east < bbox.max_lon() + 0.002);
    assert!(north >= bbox.max_lat() - eps && north < bbox.max_lat() + 0.002);
    assert!(south <= bbox.min_lat() + eps && south > bbox.min_lat() - 0.002);

    // ~10 km box at ~0.2 km pixels
    assert!(cols > 40 && cols < 55, "cols = {}", cols);
    assert!(rows > 40 && rows < 55, "rows = {}", rows);
    assert_eq!(compute_window(&raster, &bbox).unwrap(), window.window);

    // Values are read from the right offset
    let first = window.data[[0, 0]] as usize;
    assert_eq!(first, window.window.row_off * 500 + window.window.col_off);
}

#[test]
fn test_missing_metadata_key() {
    let dir = TempDir::new().unwrap();
    let meta_path = dir.path().join("BAND_META.txt");
    std::fs::write(&meta_path, BAND_META.replace("SceneCenterLon=72.5797\n", "")).unwrap();

    let err = get_scene_geometry(&meta_path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    match err {
        SarError::MissingKey { key, path } => {
            assert_eq!(key, "SceneCenterLon");
            assert_eq!(path, meta_path);
        }
        other => panic!("expected MissingKey, got {:?}", other),
    }
}

#[test]
fn test_coverage_against_metadata_footprint() {
    let dir = TempDir::new().unwrap();
    let meta_path = dir.path().join("BAND_META.txt");
    std::fs::write(&meta_path, BAND_META).unwrap();
    let geometry = get_scene_geometry(&meta_path).unwrap();

    let inside = bounding_box_around(geometry.center, 25_000.0).unwrap();
    assert!(covers(&geometry, &inside));

    let far = bounding_box_around(GeoPoint::new(19.076, 72.8777), 25_000.0).unwrap();
    assert!(!covers(&geometry, &far));
}

#[test]
fn test_product_xml_corners_match_band_meta() {
    let dir = TempDir::new().unwrap();
    let xml_path = dir.path().join("product.xml");
    std::fs::write(
        &xml_path,
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Product>
  <ImageAttributes>
    <GeographicInformation>
      <MapProjection>
        <MapCorners>
          <UpperLeft><Latitude>23.9</Latitude><Longitude>71.8</Longitude></UpperLeft>
          <UpperRight><Latitude>24.0</Latitude><Longitude>73.3</Longitude></UpperRight>
          <LowerLeft><Latitude>22.1</Latitude><Longitude>71.9</Longitude></LowerLeft>
          <LowerRight><Latitude>22.2</Latitude><Longitude>73.4</Longitude></LowerRight>
        </MapCorners>
      </MapProjection>
    </GeographicInformation>
  </ImageAttributes>
</Product>"#,
    )
    .unwrap();

    let meta_path = dir.path().join("BAND_META.txt");
    std::fs::write(&meta_path, BAND_META).unwrap();
    let geometry = get_scene_geometry(&meta_path).unwrap();

    let corners = parse_xml_corners(&xml_path).unwrap();
    assert_eq!(corners.len(), 4);
    assert_eq!(corners["UpperLeft"], geometry.upper_left);
    assert_eq!(corners["LowerRight"], geometry.lower_right);
}

#[test]
fn test_missing_raster() {
    let err = GeoRaster::open("/nonexistent/imagery_HH.tif").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}
