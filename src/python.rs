//! Python bindings, built with the `python` feature

use crate::core::bbox::bounding_box_around;
use crate::core::calibrate::calibrate;
use crate::io::band_meta::{get_calibration_constants, get_scene_geometry};
use crate::types::{GeoPoint, SarError};
use numpy::{IntoPyArray, PyArray2, PyReadonlyArray2};
use pyo3::prelude::*;
use std::collections::HashMap;

fn to_py_err(e: SarError) -> PyErr {
    match e.kind() {
        crate::types::ErrorKind::Configuration | crate::types::ErrorKind::Geometric => {
            PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("{}", e))
        }
        crate::types::ErrorKind::Backend => {
            PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!("{}", e))
        }
    }
}

/// sigma0 in dB for a DN grid and a local incidence angle grid (degrees)
#[pyfunction]
fn compute_sigma_naught<'py>(
    py: Python<'py>,
    dn: PyReadonlyArray2<f64>,
    lia: PyReadonlyArray2<f64>,
    k_beta: f64,
) -> PyResult<&'py PyArray2<f64>> {
    let grid = calibrate(dn.as_array(), lia.as_array(), k_beta).map_err(to_py_err)?;
    Ok(grid.into_inner().into_pyarray(py))
}

/// ((ul_lat, ul_lon), (lr_lat, lr_lon)) of a square AOI with the given half-side in meters
#[pyfunction]
fn bounding_box(lat: f64, lon: f64, half_side_m: f64) -> PyResult<((f64, f64), (f64, f64))> {
    let bbox = bounding_box_around(GeoPoint::new(lat, lon), half_side_m).map_err(to_py_err)?;
    Ok((
        (bbox.upper_left.latitude, bbox.upper_left.longitude),
        (bbox.lower_right.latitude, bbox.lower_right.longitude),
    ))
}

/// Scene center and corners as {name: (lat, lon)}
#[pyfunction]
fn scene_geometry(path: String) -> PyResult<HashMap<String, (f64, f64)>> {
    let geometry = get_scene_geometry(&path).map_err(to_py_err)?;
    let corners = [
        ("center", geometry.center),
        ("upper_left", geometry.upper_left),
        ("upper_right", geometry.upper_right),
        ("lower_left", geometry.lower_left),
        ("lower_right", geometry.lower_right),
    ];
    Ok(corners
        .iter()
        .map(|(name, p)| (name.to_string(), (p.latitude, p.longitude)))
        .collect())
}

#[pyfunction]
fn calibration_constants(path: String) -> PyResult<HashMap<String, f64>> {
    let constants = get_calibration_constants(&path).map_err(to_py_err)?;
    let mut out = HashMap::new();
    for pol in constants.polarizations() {
        out.insert(pol.to_string(), constants.get(pol).map_err(to_py_err)?);
    }
    Ok(out)
}

/// Python module definition
#[pymodule]
fn _core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(compute_sigma_naught, m)?)?;
    m.add_function(wrap_pyfunction!(bounding_box, m)?)?;
    m.add_function(wrap_pyfunction!(scene_geometry, m)?)?;
    m.add_function(wrap_pyfunction!(calibration_constants, m)?)?;
    Ok(())
}
