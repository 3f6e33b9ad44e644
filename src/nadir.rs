//! Nadir reference samples and their tolerance queries.
//!
//! A [`NadirPoint`] is one scan of the reference track: a coordinate, a scan
//! time, and the spatial/temporal tolerances that decide whether an off-nadir
//! sample counts as a matchup candidate. Points are immutable once built and
//! are consumed read-only by the matcher.

use chrono::{DateTime, TimeDelta, Utc};

use crate::compare::SensorKind;
use crate::geo::Coordinate;
use crate::source::{geo_rows_per_scan, GranuleSource};
use crate::util::{SwathMatchError, SwathMatchResult};

/// One reference-track sample with its match tolerances.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NadirPoint {
    coordinate: Coordinate,
    scan_time: DateTime<Utc>,
    scan_number: usize,
    spatial_tolerance: f64,
    temporal_tolerance: TimeDelta,
    nadir_frame: usize,
}

impl NadirPoint {
    /// Creates a reference sample.
    ///
    /// `scan_number` is 1-based; `spatial_tolerance` is in degrees;
    /// `nadir_frame` is the sensor's own cross-track index at nadir.
    pub fn new(
        coordinate: Coordinate,
        scan_time: DateTime<Utc>,
        scan_number: usize,
        spatial_tolerance: f64,
        temporal_tolerance: TimeDelta,
        nadir_frame: usize,
    ) -> Self {
        Self {
            coordinate,
            scan_time,
            scan_number,
            spatial_tolerance,
            temporal_tolerance,
            nadir_frame,
        }
    }

    /// The sample's geographic coordinate.
    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    /// The sample's scan time.
    pub fn scan_time(&self) -> DateTime<Utc> {
        self.scan_time
    }

    /// The 1-based scan number on the reference track.
    pub fn scan_number(&self) -> usize {
        self.scan_number
    }

    /// The reference sensor's cross-track frame index at nadir.
    pub fn nadir_frame(&self) -> usize {
        self.nadir_frame
    }

    /// Whether `other` falls inside this point's time window.
    ///
    /// The comparison is one-sided and signed: `scan_time - other` must not
    /// exceed the tolerance, with no lower bound, so any `other` later than
    /// `scan_time` passes. Inherited behavior, kept for result parity with
    /// existing match runs.
    pub fn within_time_range(&self, other: DateTime<Utc>) -> bool {
        self.scan_time - other <= self.temporal_tolerance
    }

    /// Whether `other` falls inside this point's spatial window.
    ///
    /// The longitude tolerance widens with latitude as
    /// `tol * (1 + (1 - cos(lat)))`, with the latitude fed to `cos` in
    /// degrees, untransformed. Inherited behavior, kept for result parity
    /// with existing match runs.
    pub fn within_geospatial_range(&self, other: Coordinate) -> bool {
        let lat_difference = self.coordinate.lat - other.lat;
        let lon_difference = self.coordinate.lon - other.lon;
        if lat_difference.abs() > self.spatial_tolerance {
            return false;
        }
        let lon_tolerance =
            self.spatial_tolerance + self.spatial_tolerance * (1.0 - self.coordinate.lat.cos());
        lon_difference.abs() <= lon_tolerance
    }
}

/// Builds one [`NadirPoint`] per scan of a granule.
///
/// Each scan's geolocation rows are averaged at the grid's centre column,
/// which also becomes every point's nadir frame index.
pub fn nadir_points_from_granule<G: GranuleSource + ?Sized>(
    granule: &G,
    spatial_tolerance: f64,
    temporal_tolerance: TimeDelta,
) -> SwathMatchResult<Vec<NadirPoint>> {
    let (_, cols) = granule.geo_dimensions();
    let rows_per_scan = geo_rows_per_scan(granule)?;
    let scans = granule.number_of_scans();
    let times = granule.scan_times();
    if times.len() != scans {
        return Err(SwathMatchError::ShapeMismatch {
            expected: scans,
            got: times.len(),
            context: "scan times",
        });
    }
    let nadir_frame = cols / 2;

    let mut points = Vec::with_capacity(scans);
    for (scan_idx, &scan_time) in times.iter().enumerate() {
        let row0 = scan_idx * rows_per_scan;
        let mut lat_sum = 0.0;
        let mut lon_sum = 0.0;
        for row in row0..row0 + rows_per_scan {
            let c = granule.coordinate(row, nadir_frame);
            lat_sum += c.lat;
            lon_sum += c.lon;
        }
        let n = rows_per_scan as f64;
        points.push(NadirPoint::new(
            Coordinate::new(lat_sum / n, lon_sum / n),
            scan_time,
            scan_idx + 1,
            spatial_tolerance,
            temporal_tolerance,
            nadir_frame,
        ));
    }
    Ok(points)
}

/// Per-scan calibrated values at the nadir column of the data grid.
///
/// The scan's detector rows are summed and floor-divided by the detector
/// count before calibration; raw counts were historically integral and the
/// truncating average is part of the established results.
pub fn nadir_track_values<G: GranuleSource + ?Sized>(
    granule: &G,
    kind: SensorKind,
    band: usize,
) -> Vec<f64> {
    let (_, data_cols) = granule.data_dimensions();
    let nadir_frame = data_cols / 2;
    let detectors = granule.detectors_per_scan();
    let scans = granule.number_of_scans();

    let mut values = Vec::with_capacity(scans);
    for scan_idx in 0..scans {
        let row0 = scan_idx * detectors;
        let mut total = 0.0;
        for row in row0..row0 + detectors {
            total += granule.raw_value(row, nadir_frame, band);
        }
        let avg = (total / detectors as f64).floor();
        values.push(kind.calibrate(granule.calibration(band, scan_idx + 1), avg));
    }
    values
}
