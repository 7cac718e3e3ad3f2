use crate::types::{BoundingBox, SceneGeometry};
use geo::{Contains, Intersects};

/// Does the scene footprint cover the requested AOI?
///
/// Uses the real four footprint corners, so skewed SAR footprints are handled.
/// For an AOI with positive area, polygon containment is equivalent to closed-set
/// covering; a degenerate AOI falls back to intersection of its corners.
pub fn covers(parent: &SceneGeometry, child: &BoundingBox) -> bool {
    let footprint = parent.to_polygon();
    let aoi = child.to_polygon();

    let degenerate = child.min_lat() == child.max_lat() || child.min_lon() == child.max_lon();
    let covered = if degenerate {
        [child.upper_left, child.lower_right]
            .iter()
            .all(|p| footprint.intersects(&p.to_geo()))
    } else {
        footprint.contains(&aoi)
    };

    log::debug!("AOI {:?} covered by scene footprint: {}", child, covered);
    covered
}
