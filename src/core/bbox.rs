use crate::types::{BoundingBox, GeoPoint, SarError, SarResult};
use geo::GeodesicDestination;

pub const NORTH_BEARING: f64 = 0.0;
pub const EAST_BEARING: f64 = 90.0;
pub const SOUTH_BEARING: f64 = 180.0;
pub const WEST_BEARING: f64 = 270.0;

/// Offsets (meters) from the AOI center to its edges
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoxDistances {
    /// Same half-side in all four directions
    Uniform(f64),
    Directional {
        north: f64,
        south: f64,
        east: f64,
        west: f64,
    },
}

impl BoxDistances {
    /// (north, south, east, west)
    fn resolve(&self) -> (f64, f64, f64, f64) {
        match *self {
            BoxDistances::Uniform(d) => (d, d, d, d),
            BoxDistances::Directional {
                north,
                south,
                east,
                west,
            } => (north, south, east, west),
        }
    }
}

/// Move `distance` meters from `origin` along the WGS84 geodesic with the given bearing
pub fn destination(origin: GeoPoint, bearing: f64, distance: f64) -> GeoPoint {
    GeoPoint::from_geo(origin.to_geo().geodesic_destination(bearing, distance))
}

/// Build an AOI around `center`.
///
/// The upper-left corner is reached by going north then west, the lower-right by
/// going south then east. Each leg is an ellipsoidal geodesic, so the box is square
/// in ground distance rather than in degrees. Composing two legs is not the same as
/// one diagonal leg; the difference is second order (tens of meters at 25 km
/// half-side) and is kept as-is.
pub fn build_bbox(center: GeoPoint, distances: BoxDistances) -> SarResult<BoundingBox> {
    let (north, south, east, west) = distances.resolve();
    for d in [north, south, east, west] {
        if !d.is_finite() || d <= 0.0 {
            return Err(SarError::InvalidDistance(d));
        }
    }

    let north_point = destination(center, NORTH_BEARING, north);
    let upper_left = destination(north_point, WEST_BEARING, west);

    let south_point = destination(center, SOUTH_BEARING, south);
    let lower_right = destination(south_point, EAST_BEARING, east);

    log::debug!(
        "AOI around {}: upper_left {}, lower_right {}",
        center,
        upper_left,
        lower_right
    );

    BoundingBox::new(upper_left, lower_right)
}

/// Square AOI with the same half-side (meters) in every direction
pub fn bounding_box_around(center: GeoPoint, half_side: f64) -> SarResult<BoundingBox> {
    build_bbox(center, BoxDistances::Uniform(half_side))
}
