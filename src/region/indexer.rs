//! Builds the scan-region index covering a whole granule.
//!
//! The granule's scan count is cut into fixed-length chunks; each chunk
//! contributes one region whose corners are the first and last valid
//! geolocation samples at the chunk's boundary rows. Fill-value samples are
//! skipped by walking inward, and the accumulated walk offsets shift the
//! region's scan range so it still matches the corners actually used.

use crate::geo::Coordinate;
use crate::region::ScanRegion;
use crate::source::{geo_rows_per_scan, GranuleSource};
use crate::util::{SwathMatchError, SwathMatchResult};

/// Scans per region for wide-swath granules.
pub const WIDE_SWATH_REGION_SCANS: usize = 24;

/// Scans per region for a reference-sensor granule, keyed by its total scan
/// count.
///
/// Reference granules only ever carry 202 to 204 scans; any other count is
/// rejected rather than guessed at.
pub fn region_length_for(num_scans: usize) -> SwathMatchResult<usize> {
    match num_scans {
        202 => Ok(101),
        203 => Ok(58),
        204 => Ok(68),
        scans => Err(SwathMatchError::UnsupportedScanCount { scans }),
    }
}

/// Builds the ordered region set covering every scan of the granule.
///
/// The final region is truncated at the granule's last scan when the chunk
/// length does not divide the scan count.
pub fn build_scan_regions<G: GranuleSource + ?Sized>(
    granule: &G,
    scans_per_region: usize,
) -> SwathMatchResult<Vec<ScanRegion>> {
    if scans_per_region == 0 {
        return Err(SwathMatchError::InvalidScanRange { start: 1, end: 0 });
    }
    let (_, cols) = granule.geo_dimensions();
    let scans = granule.number_of_scans();
    let rows_per_scan = geo_rows_per_scan(granule)?;
    let fill = granule.geo_fill_value();

    let mut regions = Vec::with_capacity(scans.div_ceil(scans_per_region));
    let mut chunk_start = 0;
    while chunk_start < scans {
        let last_scan_idx = (chunk_start + scans_per_region).min(scans) - 1;
        let top_row = chunk_start * rows_per_scan;
        let bottom_row = (last_scan_idx + 1) * rows_per_scan - 1;

        // The two walks of an edge share one offset, so a fill run found on
        // the left also advances where the right corner search resumes.
        let mut start_offset = 0usize;
        let top_left = corner_down(granule, top_row, 0, bottom_row, fill, &mut start_offset)?;
        let top_right =
            corner_down(granule, top_row, cols - 1, bottom_row, fill, &mut start_offset)?;

        let mut end_offset = 0i64;
        let bottom_right =
            corner_up(granule, bottom_row, cols - 1, top_row, fill, &mut end_offset)?;
        let bottom_left = corner_up(granule, bottom_row, 0, top_row, fill, &mut end_offset)?;

        let start_scan = chunk_start + 1 + start_offset / rows_per_scan;
        let end_scan = (last_scan_idx as i64 + 1 + end_offset.div_euclid(rows_per_scan as i64))
            as usize;

        regions.push(ScanRegion::new(
            top_left,
            top_right,
            bottom_left,
            bottom_right,
            start_scan,
            end_scan,
        )?);
        chunk_start += scans_per_region;
    }
    Ok(regions)
}

fn is_fill(c: Coordinate, fill: f64) -> bool {
    c.lat == fill && c.lon == fill
}

/// Locates a valid sample walking down from `row`, advancing the shared
/// offset past fill values. The walk never leaves the chunk.
fn corner_down<G: GranuleSource + ?Sized>(
    granule: &G,
    row: usize,
    col: usize,
    max_row: usize,
    fill: f64,
    offset: &mut usize,
) -> SwathMatchResult<Coordinate> {
    let mut candidate = granule.coordinate(row, col);
    while is_fill(candidate, fill) {
        *offset += 1;
        let probe = row + *offset;
        if probe > max_row {
            return Err(SwathMatchError::DataGeometry {
                row,
                col,
                limit: max_row - row + 1,
            });
        }
        candidate = granule.coordinate(probe, col);
    }
    Ok(candidate)
}

/// Locates a valid sample walking up from `row`; the shared offset goes
/// negative as fill rows are skipped.
fn corner_up<G: GranuleSource + ?Sized>(
    granule: &G,
    row: usize,
    col: usize,
    min_row: usize,
    fill: f64,
    offset: &mut i64,
) -> SwathMatchResult<Coordinate> {
    let mut candidate = granule.coordinate(row, col);
    while is_fill(candidate, fill) {
        *offset -= 1;
        let probe = row as i64 + *offset;
        if probe < min_row as i64 {
            return Err(SwathMatchError::DataGeometry {
                row,
                col,
                limit: row - min_row + 1,
            });
        }
        candidate = granule.coordinate(probe as usize, col);
    }
    Ok(candidate)
}
