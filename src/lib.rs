//! SwathMatch cross-calibrates two satellite radiometers by matching one
//! instrument's nadir ground-track samples against the other's wide-swath
//! scan geometry, then comparing calibrated values at the matched locations.
//!
//! The crate provides the geodesy primitives, the region index over a
//! granule's scans, and the two-phase (region-then-point) matcher, with
//! optional parallelism via the `rayon` feature. File parsing, persistence,
//! and presentation are left to callers behind the [`GranuleSource`] trait.

pub mod compare;
pub mod geo;
pub mod matcher;
pub mod nadir;
pub mod region;
pub mod source;
mod trace;
pub mod util;

pub use compare::{CalibrationFactors, ComparisonRecord, SensorKind};
pub use geo::{destination_point, distance_and_bearing, Coordinate, LonMode, EARTH_RADIUS_KM};
pub use matcher::{
    candidate_scans, find_candidate_regions, find_candidate_regions_by, match_points,
    MatchConfig, Matcher,
};
#[cfg(feature = "rayon")]
pub use matcher::match_points_par;
pub use nadir::{nadir_points_from_granule, nadir_track_values, NadirPoint};
pub use region::{
    build_scan_regions, region_length_for, AxisAlignedBounds, Containment, ScanRegion,
    EDGE_SAMPLES, WIDE_SWATH_REGION_SCANS,
};
pub use source::{
    calibrated_scan_value, geo_rows_per_scan, scan_mean_coordinates, GranuleSource,
    MemoryGranule, SampleGrid,
};
pub use util::{SwathMatchError, SwathMatchResult};
