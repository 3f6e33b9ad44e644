//! Scan-region footprints and the broad-phase containment test.
//!
//! A [`ScanRegion`] covers a contiguous run of off-nadir scans with the four
//! geolocation corners of that run. Containment is answered against an
//! axis-aligned bounding rectangle derived by sampling the four great-circle
//! edges: an approximation of the true quadrilateral that is cheap and close
//! for the small, roughly rectangular footprints regions have in practice,
//! at the cost of false positives/negatives near the corners. The test sits
//! behind the [`Containment`] trait so an exact polygon test can replace it
//! without touching the matcher.

mod indexer;

pub use indexer::{build_scan_regions, region_length_for, WIDE_SWATH_REGION_SCANS};

use std::ops::RangeInclusive;

use crate::geo::{destination_point, distance_and_bearing, Coordinate, LonMode};
use crate::util::{SwathMatchError, SwathMatchResult};

/// Points sampled along each edge of a region.
pub const EDGE_SAMPLES: usize = 30;

/// Broad-phase containment strategy for a region footprint.
pub trait Containment {
    /// Whether the footprint plausibly contains the coordinate.
    fn contains(&self, coordinate: Coordinate) -> bool;
}

/// Axis-aligned latitude/longitude bounds of a sampled region boundary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisAlignedBounds {
    min_lat: f64,
    max_lat: f64,
    min_lon: f64,
    max_lon: f64,
}

impl AxisAlignedBounds {
    /// Derives bounds from a region's sampled boundary.
    pub fn around(region: &ScanRegion) -> Self {
        Self::from_points(&region.boundary())
    }

    fn from_points(points: &[Coordinate]) -> Self {
        let mut bounds = Self {
            min_lat: f64::INFINITY,
            max_lat: f64::NEG_INFINITY,
            min_lon: f64::INFINITY,
            max_lon: f64::NEG_INFINITY,
        };
        for point in points {
            bounds.min_lat = bounds.min_lat.min(point.lat);
            bounds.max_lat = bounds.max_lat.max(point.lat);
            bounds.min_lon = bounds.min_lon.min(point.lon);
            bounds.max_lon = bounds.max_lon.max(point.lon);
        }
        bounds
    }
}

impl Containment for AxisAlignedBounds {
    fn contains(&self, coordinate: Coordinate) -> bool {
        (self.min_lat..=self.max_lat).contains(&coordinate.lat)
            && (self.min_lon..=self.max_lon).contains(&coordinate.lon)
    }
}

/// Quadrilateral footprint covering an inclusive run of off-nadir scans.
#[derive(Clone, Debug)]
pub struct ScanRegion {
    top_left: Coordinate,
    top_right: Coordinate,
    bottom_left: Coordinate,
    bottom_right: Coordinate,
    start_scan: usize,
    end_scan: usize,
    crosses_antimeridian: bool,
    bounds: AxisAlignedBounds,
}

impl ScanRegion {
    /// Creates a region from its four corners and 1-based scan range.
    pub fn new(
        top_left: Coordinate,
        top_right: Coordinate,
        bottom_left: Coordinate,
        bottom_right: Coordinate,
        start_scan: usize,
        end_scan: usize,
    ) -> SwathMatchResult<Self> {
        if start_scan > end_scan {
            return Err(SwathMatchError::InvalidScanRange {
                start: start_scan,
                end: end_scan,
            });
        }
        let crosses_antimeridian = detect_antimeridian(top_left, top_right);
        let mode = if crosses_antimeridian {
            LonMode::AntimeridianShift
        } else {
            LonMode::Standard
        };
        let boundary = sample_boundary(
            top_left,
            top_right,
            bottom_left,
            bottom_right,
            mode,
        );
        let bounds = AxisAlignedBounds::from_points(&boundary);
        Ok(Self {
            top_left,
            top_right,
            bottom_left,
            bottom_right,
            start_scan,
            end_scan,
            crosses_antimeridian,
            bounds,
        })
    }

    /// First scan covered, 1-based.
    pub fn start_scan(&self) -> usize {
        self.start_scan
    }

    /// Last scan covered, 1-based and inclusive.
    pub fn end_scan(&self) -> usize {
        self.end_scan
    }

    /// Inclusive scan-number range covered by this footprint.
    pub fn scan_range(&self) -> RangeInclusive<usize> {
        self.start_scan..=self.end_scan
    }

    /// Whether the footprint spans the antimeridian.
    pub fn crosses_antimeridian(&self) -> bool {
        self.crosses_antimeridian
    }

    /// Longitude frame for great-circle math over this footprint.
    pub fn lon_mode(&self) -> LonMode {
        if self.crosses_antimeridian {
            LonMode::AntimeridianShift
        } else {
            LonMode::Standard
        }
    }

    /// Mean of the four corners.
    pub fn midpoint(&self) -> Coordinate {
        Coordinate::new(
            (self.top_left.lat + self.top_right.lat + self.bottom_left.lat + self.bottom_right.lat)
                / 4.0,
            (self.top_left.lon + self.top_right.lon + self.bottom_left.lon + self.bottom_right.lon)
                / 4.0,
        )
    }

    /// Samples [`EDGE_SAMPLES`] points along the great circle from `p1`
    /// toward `p2`, endpoint excluded.
    pub fn edge_points(&self, p1: Coordinate, p2: Coordinate) -> Vec<Coordinate> {
        sample_edge(p1, p2, self.lon_mode())
    }

    /// The sampled points of all four edges: top, right, bottom, left.
    pub fn boundary(&self) -> Vec<Coordinate> {
        sample_boundary(
            self.top_left,
            self.top_right,
            self.bottom_left,
            self.bottom_right,
            self.lon_mode(),
        )
    }

    /// The bounding rectangle cached at construction.
    pub fn bounds(&self) -> &AxisAlignedBounds {
        &self.bounds
    }

    /// Bounding-rectangle containment test for this footprint.
    pub fn contains(&self, coordinate: Coordinate) -> bool {
        self.bounds.contains(coordinate)
    }
}

/// True when both top corners sit near the antimeridian in opposite
/// hemispheres.
///
/// The 80-degree magnitude floor keeps ordinary prime-meridian and low-span
/// date-line footprints from qualifying.
fn detect_antimeridian(top_left: Coordinate, top_right: Coordinate) -> bool {
    if top_left.lon.abs() > 80.0 && top_right.lon.abs() > 80.0 {
        !((top_left.lon >= 0.0 && top_right.lon >= 0.0)
            || (top_left.lon < 0.0 && top_right.lon < 0.0))
    } else {
        false
    }
}

fn sample_edge(p1: Coordinate, p2: Coordinate, mode: LonMode) -> Vec<Coordinate> {
    let (distance, bearing) = distance_and_bearing(p1, p2, mode);
    if distance == 0.0 {
        return vec![p1];
    }
    let increment = distance / EDGE_SAMPLES as f64;
    (0..EDGE_SAMPLES)
        .map(|i| destination_point(p1, increment * i as f64, bearing, mode))
        .collect()
}

fn sample_boundary(
    top_left: Coordinate,
    top_right: Coordinate,
    bottom_left: Coordinate,
    bottom_right: Coordinate,
    mode: LonMode,
) -> Vec<Coordinate> {
    let mut points = sample_edge(top_left, top_right, mode);
    points.extend(sample_edge(top_right, bottom_right, mode));
    points.extend(sample_edge(bottom_left, bottom_right, mode));
    points.extend(sample_edge(top_left, bottom_left, mode));
    points
}
