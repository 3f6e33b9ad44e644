//! Great-circle geodesy on a spherical Earth.
//!
//! Distances and bearings come from the haversine formula; forward projection
//! solves the direct geodetic problem. All angle math is done in radians with
//! degrees at the API boundary. Paths that cross the antimeridian are handled
//! by computing in a shifted longitude frame, selected with [`LonMode`].

use crate::util::math::{shift_lon_east, unshift_lon};

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A geographic coordinate in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinate {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east, in [-180, 180].
    pub lon: f64,
}

impl Coordinate {
    /// Creates a coordinate from latitude and longitude in degrees.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Longitude frame used for a great-circle computation.
///
/// `AntimeridianShift` moves western-hemisphere longitudes into [180, 360)
/// before the math so a segment over the date line stays contiguous; output
/// longitudes above +180 are mapped back into the signed frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LonMode {
    /// Longitudes are used as given.
    #[default]
    Standard,
    /// Compute in the shifted frame for antimeridian-crossing segments.
    AntimeridianShift,
}

impl LonMode {
    fn shift_in(self, lon_deg: f64) -> f64 {
        match self {
            LonMode::Standard => lon_deg,
            LonMode::AntimeridianShift => shift_lon_east(lon_deg),
        }
    }

    fn shift_out(self, lon_deg: f64) -> f64 {
        match self {
            LonMode::Standard => lon_deg,
            LonMode::AntimeridianShift => unshift_lon(lon_deg),
        }
    }
}

/// Haversine distance in kilometers and initial bearing in radians.
pub fn distance_and_bearing(from: Coordinate, to: Coordinate, mode: LonMode) -> (f64, f64) {
    let lon1 = mode.shift_in(from.lon).to_radians();
    let lon2 = mode.shift_in(to.lon).to_radians();
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();

    let dlon = lon2 - lon1;
    let dlat = lat2 - lat1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let distance_km = 2.0 * a.sqrt().asin() * EARTH_RADIUS_KM;

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    let bearing_rad = y.atan2(x);

    (distance_km, bearing_rad)
}

/// Solves the direct geodetic problem: the point `distance_km` away from
/// `from` along the initial bearing `bearing_rad`.
pub fn destination_point(
    from: Coordinate,
    distance_km: f64,
    bearing_rad: f64,
    mode: LonMode,
) -> Coordinate {
    let lat1 = from.lat.to_radians();
    let lon1 = mode.shift_in(from.lon).to_radians();
    let angular = distance_km / EARTH_RADIUS_KM;

    let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing_rad.cos()).asin();
    let lon2 = lon1
        + (bearing_rad.sin() * angular.sin() * lat1.cos())
            .atan2(angular.cos() - lat1.sin() * lat2.sin());

    Coordinate {
        lat: lat2.to_degrees(),
        lon: mode.shift_out(lon2.to_degrees()),
    }
}
