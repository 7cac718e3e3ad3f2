//! File readers and writers: band metadata, product XML, rasters and dataset export

pub mod band_meta;
pub mod dataset;
pub mod product_xml;
pub mod raster;

pub use band_meta::{
    get_calibration_constants, get_scene_geometry, parse_key_value_file, BandMeta, SceneMetadata,
};
pub use dataset::{DatasetRow, SceneDataset};
pub use product_xml::{parse_xml_corners, ProductXmlParser};
pub use raster::{write_geotiff, GeoRaster, PixelWindow, RasterWindow};
