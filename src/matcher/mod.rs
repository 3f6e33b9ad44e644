//! Two-phase spatiotemporal matching.
//!
//! Testing every nadir point against every off-nadir sample is quadratic in
//! granule size, so matching runs in two phases: a broad phase that keeps
//! only the scan regions some nadir point could fall in, and a fine phase
//! that walks the surviving scans' coordinate samples point by point. Both
//! phases are pure over immutable inputs; the fine phase optionally fans out
//! per nadir point via the `rayon` feature.

use chrono::{DateTime, Utc};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::compare::{ComparisonRecord, SensorKind};
use crate::geo::Coordinate;
use crate::nadir::NadirPoint;
use crate::region::{
    build_scan_regions, region_length_for, ScanRegion, WIDE_SWATH_REGION_SCANS,
};
use crate::source::{calibrated_scan_value, scan_mean_coordinates, GranuleSource};
use crate::trace::{trace_event, trace_span};
use crate::util::{SwathMatchError, SwathMatchResult};

/// Configuration for a matching run.
#[derive(Clone, Copy, Debug)]
pub struct MatchConfig {
    /// Band (channel) index compared between the sensors.
    pub band: usize,
    /// Run the fine phase in parallel (requires the `rayon` feature).
    pub parallel: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            band: 0,
            parallel: false,
        }
    }
}

/// Broad phase: regions some nadir point could fall in.
///
/// A region qualifies when at least one nadir point's time window contains
/// the region's start-scan or end-scan time and the point's coordinate passes
/// the region's containment test. The first qualifying point settles a
/// region; output preserves region order with each region at most once.
pub fn find_candidate_regions<'r>(
    nadir_points: &[NadirPoint],
    regions: &'r [ScanRegion],
    scan_times: &[DateTime<Utc>],
) -> SwathMatchResult<Vec<&'r ScanRegion>> {
    find_candidate_regions_by(nadir_points, regions, scan_times, |region, coordinate| {
        region.contains(coordinate)
    })
}

/// Broad phase with a caller-supplied containment test.
///
/// The default test is the bounding-rectangle approximation; this variant is
/// the seam for substituting an exact polygon test.
pub fn find_candidate_regions_by<'r, F>(
    nadir_points: &[NadirPoint],
    regions: &'r [ScanRegion],
    scan_times: &[DateTime<Utc>],
    contains: F,
) -> SwathMatchResult<Vec<&'r ScanRegion>>
where
    F: Fn(&ScanRegion, Coordinate) -> bool,
{
    let _span = trace_span!(
        "broad_phase",
        regions = regions.len(),
        nadir_points = nadir_points.len()
    )
    .entered();

    let mut candidates = Vec::new();
    for region in regions {
        let start_time = scan_time_at(scan_times, region.start_scan())?;
        let end_time = scan_time_at(scan_times, region.end_scan())?;
        for point in nadir_points {
            let in_window =
                point.within_time_range(start_time) || point.within_time_range(end_time);
            if in_window && contains(region, point.coordinate()) {
                candidates.push(region);
                break;
            }
        }
    }

    trace_event!("broad_candidates", count = candidates.len());
    Ok(candidates)
}

/// Flattens candidate regions into their covered scan numbers, in order.
pub fn candidate_scans(regions: &[&ScanRegion]) -> Vec<usize> {
    regions.iter().flat_map(|region| region.scan_range()).collect()
}

/// Fine phase: point-level matching over the candidate scans.
///
/// For every nadir point and candidate scan inside the point's time window,
/// each cross-track coordinate sample within the spatial window yields one
/// [`ComparisonRecord`], populated with the off-nadir value for that scan and
/// frame and the nadir point's own value. The recorded nadir scan number is
/// the point's 1-based position in `nadir_points`.
pub fn match_points<F>(
    nadir_points: &[NadirPoint],
    nadir_values: &[f64],
    candidate_scans: &[usize],
    candidate_coordinates: &[Vec<Coordinate>],
    scan_times: &[DateTime<Utc>],
    kind: SensorKind,
    off_nadir_value: F,
) -> SwathMatchResult<Vec<ComparisonRecord>>
where
    F: Fn(usize, usize) -> f64,
{
    check_fine_inputs(nadir_points, nadir_values, candidate_scans, candidate_coordinates)?;
    let _span = trace_span!(
        "fine_phase",
        scans = candidate_scans.len(),
        nadir_points = nadir_points.len()
    )
    .entered();

    let mut matches = Vec::new();
    for (n_idx, point) in nadir_points.iter().enumerate() {
        match_one_point(
            n_idx,
            point,
            nadir_values[n_idx],
            candidate_scans,
            candidate_coordinates,
            scan_times,
            kind,
            &off_nadir_value,
            &mut matches,
        )?;
    }

    trace_event!("matches", count = matches.len());
    Ok(matches)
}

/// Fine phase parallelized per nadir point.
///
/// Workers fill local record vectors that are merged in nadir-point order, so
/// the output equals the serial [`match_points`] result.
#[cfg(feature = "rayon")]
pub fn match_points_par<F>(
    nadir_points: &[NadirPoint],
    nadir_values: &[f64],
    candidate_scans: &[usize],
    candidate_coordinates: &[Vec<Coordinate>],
    scan_times: &[DateTime<Utc>],
    kind: SensorKind,
    off_nadir_value: F,
) -> SwathMatchResult<Vec<ComparisonRecord>>
where
    F: Fn(usize, usize) -> f64 + Sync,
{
    check_fine_inputs(nadir_points, nadir_values, candidate_scans, candidate_coordinates)?;
    let _span = trace_span!(
        "fine_phase",
        scans = candidate_scans.len(),
        nadir_points = nadir_points.len(),
        parallel = true
    )
    .entered();

    let results: Vec<SwathMatchResult<Vec<ComparisonRecord>>> = nadir_points
        .par_iter()
        .enumerate()
        .map(|(n_idx, point)| {
            let mut local = Vec::new();
            match_one_point(
                n_idx,
                point,
                nadir_values[n_idx],
                candidate_scans,
                candidate_coordinates,
                scan_times,
                kind,
                &off_nadir_value,
                &mut local,
            )?;
            Ok(local)
        })
        .collect();

    let mut matches = Vec::new();
    for result in results {
        matches.extend(result?);
    }

    trace_event!("matches", count = matches.len());
    Ok(matches)
}

fn check_fine_inputs(
    nadir_points: &[NadirPoint],
    nadir_values: &[f64],
    candidate_scans: &[usize],
    candidate_coordinates: &[Vec<Coordinate>],
) -> SwathMatchResult<()> {
    if nadir_values.len() != nadir_points.len() {
        return Err(SwathMatchError::ShapeMismatch {
            expected: nadir_points.len(),
            got: nadir_values.len(),
            context: "nadir values",
        });
    }
    if candidate_coordinates.len() != candidate_scans.len() {
        return Err(SwathMatchError::ShapeMismatch {
            expected: candidate_scans.len(),
            got: candidate_coordinates.len(),
            context: "candidate coordinates",
        });
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn match_one_point<F>(
    n_idx: usize,
    point: &NadirPoint,
    nadir_value: f64,
    candidate_scans: &[usize],
    candidate_coordinates: &[Vec<Coordinate>],
    scan_times: &[DateTime<Utc>],
    kind: SensorKind,
    off_nadir_value: &F,
    out: &mut Vec<ComparisonRecord>,
) -> SwathMatchResult<()>
where
    F: Fn(usize, usize) -> f64,
{
    for (o, &scan) in candidate_scans.iter().enumerate() {
        if !point.within_time_range(scan_time_at(scan_times, scan)?) {
            continue;
        }
        for (c, &coordinate) in candidate_coordinates[o].iter().enumerate() {
            if !point.within_geospatial_range(coordinate) {
                continue;
            }
            let frame = kind.data_frame_index(c);
            let mut record = ComparisonRecord::new(
                scan,
                n_idx + 1,
                frame,
                point.nadir_frame(),
                coordinate,
                point.coordinate(),
            );
            record.set_comparison_values(off_nadir_value(scan, frame), nadir_value, kind);
            out.push(record);
        }
    }
    Ok(())
}

fn scan_time_at(scan_times: &[DateTime<Utc>], scan: usize) -> SwathMatchResult<DateTime<Utc>> {
    scan
        .checked_sub(1)
        .and_then(|idx| scan_times.get(idx).copied())
        .ok_or(SwathMatchError::IndexOutOfBounds {
            index: scan.saturating_sub(1),
            len: scan_times.len(),
            context: "scan times",
        })
}

/// Matching handle for one off-nadir granule.
///
/// Building the handle indexes the granule's scan regions once; the index,
/// scan times, and sensor kind are then reused across every [`run`] call.
///
/// [`run`]: Matcher::run
pub struct Matcher<'g, G: GranuleSource> {
    granule: &'g G,
    kind: SensorKind,
    regions: Vec<ScanRegion>,
    scan_times: Vec<DateTime<Utc>>,
    cfg: MatchConfig,
}

impl<'g, G: GranuleSource> Matcher<'g, G> {
    /// Indexes the granule and prepares a matcher for it.
    ///
    /// Reference granules take their region length from the scan-count
    /// table; wide-swath granules use the fixed stride.
    pub fn new(granule: &'g G, kind: SensorKind) -> SwathMatchResult<Self> {
        let scans_per_region = match kind {
            SensorKind::Reference => region_length_for(granule.number_of_scans())?,
            SensorKind::WideSwath => WIDE_SWATH_REGION_SCANS,
        };
        let regions = build_scan_regions(granule, scans_per_region)?;
        let scan_times = granule.scan_times();
        if scan_times.len() != granule.number_of_scans() {
            return Err(SwathMatchError::ShapeMismatch {
                expected: granule.number_of_scans(),
                got: scan_times.len(),
                context: "scan times",
            });
        }
        Ok(Self {
            granule,
            kind,
            regions,
            scan_times,
            cfg: MatchConfig::default(),
        })
    }

    /// Replaces the match configuration.
    pub fn with_config(mut self, cfg: MatchConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// The cached region index.
    pub fn regions(&self) -> &[ScanRegion] {
        &self.regions
    }

    /// The off-nadir granule's sensor kind.
    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    /// Runs both phases and returns the comparison records.
    ///
    /// `nadir_values` holds one calibrated reference value per entry of
    /// `nadir_points`, in the same order.
    pub fn run(
        &self,
        nadir_points: &[NadirPoint],
        nadir_values: &[f64],
    ) -> SwathMatchResult<Vec<ComparisonRecord>> {
        let candidates = find_candidate_regions(nadir_points, &self.regions, &self.scan_times)?;
        let scans = candidate_scans(&candidates);

        let interval = self.kind.coordinate_interval();
        let mut coordinates = Vec::with_capacity(scans.len());
        for region in &candidates {
            coordinates.extend(scan_mean_coordinates(
                self.granule,
                region.start_scan(),
                region.end_scan(),
                interval,
            )?);
        }

        let band = self.cfg.band;
        let value = |scan: usize, frame: usize| {
            calibrated_scan_value(self.granule, self.kind, scan, frame, band)
        };

        #[cfg(feature = "rayon")]
        if self.cfg.parallel {
            return match_points_par(
                nadir_points,
                nadir_values,
                &scans,
                &coordinates,
                &self.scan_times,
                self.kind,
                value,
            );
        }

        match_points(
            nadir_points,
            nadir_values,
            &scans,
            &coordinates,
            &self.scan_times,
            self.kind,
            value,
        )
    }
}
