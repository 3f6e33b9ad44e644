//! Granule data access and chunked sample statistics.
//!
//! File parsing lives outside this crate; the matching core sees a granule
//! only through [`GranuleSource`]. Implementations hand back per-scan
//! geolocation and raw band samples, and the helpers here turn those into the
//! per-scan mean coordinates and calibrated values the matcher consumes.

use chrono::{DateTime, Utc};

use crate::compare::{CalibrationFactors, SensorKind};
use crate::geo::Coordinate;
use crate::util::{SwathMatchError, SwathMatchResult};

/// Read-only access to one granule's geolocation, timing, and band data.
///
/// Index arguments must lie within the advertised dimensions; implementations
/// are not required to range-check them. Sources are immutable after
/// construction, so the trait requires `Sync` and the matching phases can
/// share one source across workers.
pub trait GranuleSource: Sync {
    /// Rows and columns of the geolocation grid.
    fn geo_dimensions(&self) -> (usize, usize);

    /// Geolocation sample at a grid position.
    fn coordinate(&self, row: usize, col: usize) -> Coordinate;

    /// Sentinel marking an invalid geolocation sample; a sample is invalid
    /// when both its latitude and longitude equal the sentinel.
    fn geo_fill_value(&self) -> f64;

    /// Number of scans in the granule.
    fn number_of_scans(&self) -> usize;

    /// One timestamp per scan, in scan order.
    fn scan_times(&self) -> Vec<DateTime<Utc>>;

    /// Detector rows per scan in the data grid.
    fn detectors_per_scan(&self) -> usize;

    /// Rows and columns of the data grid.
    fn data_dimensions(&self) -> (usize, usize);

    /// Raw (uncalibrated) sample for a band at a data grid position.
    fn raw_value(&self, row: usize, col: usize, band: usize) -> f64;

    /// Calibration factors for a band at a given scan.
    ///
    /// The default covers granules without calibration metadata: scale 1,
    /// offset 0.
    fn calibration(&self, _band: usize, _scan: usize) -> CalibrationFactors {
        CalibrationFactors::default()
    }
}

/// Geolocation rows covering one scan, derived from the grid dimensions.
pub fn geo_rows_per_scan<G: GranuleSource + ?Sized>(granule: &G) -> SwathMatchResult<usize> {
    let (rows, _) = granule.geo_dimensions();
    let scans = granule.number_of_scans();
    if scans == 0 || rows % scans != 0 {
        return Err(SwathMatchError::ShapeMismatch {
            expected: scans,
            got: rows,
            context: "geolocation rows per scan",
        });
    }
    Ok(rows / scans)
}

/// Per-scan mean coordinates over an inclusive 1-based scan range.
///
/// Each scan's geolocation rows are averaged columnwise, with columns
/// subsampled at `col_interval`. The result holds one coordinate row per
/// scan, in scan order.
pub fn scan_mean_coordinates<G: GranuleSource + ?Sized>(
    granule: &G,
    start_scan: usize,
    end_scan: usize,
    col_interval: usize,
) -> SwathMatchResult<Vec<Vec<Coordinate>>> {
    if start_scan == 0 || start_scan > end_scan {
        return Err(SwathMatchError::InvalidScanRange {
            start: start_scan,
            end: end_scan,
        });
    }
    let scans = granule.number_of_scans();
    if end_scan > scans {
        return Err(SwathMatchError::IndexOutOfBounds {
            index: end_scan - 1,
            len: scans,
            context: "scan",
        });
    }

    let rows_per_scan = geo_rows_per_scan(granule)?;
    let (_, cols) = granule.geo_dimensions();
    let interval = col_interval.max(1);

    let mut out = Vec::with_capacity(end_scan - start_scan + 1);
    for scan in start_scan..=end_scan {
        let row0 = (scan - 1) * rows_per_scan;
        let mut scan_coords = Vec::with_capacity(cols.div_ceil(interval));
        let mut col = 0;
        while col < cols {
            let mut lat_sum = 0.0;
            let mut lon_sum = 0.0;
            for row in row0..row0 + rows_per_scan {
                let c = granule.coordinate(row, col);
                lat_sum += c.lat;
                lon_sum += c.lon;
            }
            let n = rows_per_scan as f64;
            scan_coords.push(Coordinate::new(lat_sum / n, lon_sum / n));
            col += interval;
        }
        out.push(scan_coords);
    }
    Ok(out)
}

/// Calibrated value for one scan at a cross-track data frame.
///
/// The raw samples of the scan's detector rows at `frame` are averaged, then
/// calibrated with the sensor's convention and the granule's factors for
/// that band and scan.
pub fn calibrated_scan_value<G: GranuleSource + ?Sized>(
    granule: &G,
    kind: SensorKind,
    scan: usize,
    frame: usize,
    band: usize,
) -> f64 {
    let detectors = granule.detectors_per_scan();
    let row0 = (scan - 1) * detectors;
    let mut total = 0.0;
    for row in row0..row0 + detectors {
        total += granule.raw_value(row, frame, band);
    }
    let mean = total / detectors as f64;
    kind.calibrate(granule.calibration(band, scan), mean)
}

/// Owned n-dimensional sample array with rank-checked chunk operations.
#[derive(Clone, Debug)]
pub struct SampleGrid {
    data: Vec<f64>,
    shape: Vec<usize>,
}

impl SampleGrid {
    /// Creates a grid, validating that the buffer length matches the shape.
    pub fn new(data: Vec<f64>, shape: Vec<usize>) -> SwathMatchResult<Self> {
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(SwathMatchError::ShapeMismatch {
                expected,
                got: data.len(),
                context: "sample grid length",
            });
        }
        Ok(Self { data, shape })
    }

    /// Returns the grid shape.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the number of dimensions.
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    fn require_rank(&self, expected: usize, context: &'static str) -> SwathMatchResult<()> {
        if self.rank() != expected {
            return Err(SwathMatchError::ShapeMismatch {
                expected,
                got: self.rank(),
                context,
            });
        }
        Ok(())
    }

    /// Sample at `(row, col)` of a rank-2 grid. Indices must be in range.
    pub fn point(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.shape[1] + col]
    }

    /// Sample at `(band, row, col)` of a rank-3 grid. Indices must be in range.
    pub fn point_3d(&self, band: usize, row: usize, col: usize) -> f64 {
        self.data[(band * self.shape[1] + row) * self.shape[2] + col]
    }

    /// Columnwise means over groups of `rows_per_group` rows of a rank-2 grid.
    ///
    /// Rows and columns are inclusive bounds. A trailing group shorter than
    /// `rows_per_group` is dropped.
    pub fn chunk_mean_2d(
        &self,
        start_row: usize,
        end_row: usize,
        start_col: usize,
        end_col: usize,
        rows_per_group: usize,
    ) -> SwathMatchResult<Vec<Vec<f64>>> {
        self.require_rank(2, "2-d chunk of non-2-d data")?;
        self.check_window(1, start_row, end_row, start_col, end_col)?;
        Ok(self.window_means(
            start_row,
            end_row,
            start_col,
            end_col,
            rows_per_group,
            |row, col| self.point(row, col),
        ))
    }

    /// Columnwise means over groups of `rows_per_group` rows of one band of a
    /// rank-3 grid.
    pub fn chunk_mean_3d(
        &self,
        band: usize,
        start_row: usize,
        end_row: usize,
        start_col: usize,
        end_col: usize,
        rows_per_group: usize,
    ) -> SwathMatchResult<Vec<Vec<f64>>> {
        self.require_rank(3, "3-d chunk of non-3-d data")?;
        if band >= self.shape[0] {
            return Err(SwathMatchError::IndexOutOfBounds {
                index: band,
                len: self.shape[0],
                context: "band",
            });
        }
        self.check_window(2, start_row, end_row, start_col, end_col)?;
        Ok(self.window_means(
            start_row,
            end_row,
            start_col,
            end_col,
            rows_per_group,
            |row, col| self.point_3d(band, row, col),
        ))
    }

    fn check_window(
        &self,
        col_axis: usize,
        start_row: usize,
        end_row: usize,
        start_col: usize,
        end_col: usize,
    ) -> SwathMatchResult<()> {
        let rows = self.shape[col_axis - 1];
        let cols = self.shape[col_axis];
        if start_row > end_row || end_row >= rows {
            return Err(SwathMatchError::IndexOutOfBounds {
                index: end_row,
                len: rows,
                context: "chunk rows",
            });
        }
        if start_col > end_col || end_col >= cols {
            return Err(SwathMatchError::IndexOutOfBounds {
                index: end_col,
                len: cols,
                context: "chunk columns",
            });
        }
        Ok(())
    }

    fn window_means<F>(
        &self,
        start_row: usize,
        end_row: usize,
        start_col: usize,
        end_col: usize,
        rows_per_group: usize,
        sample: F,
    ) -> Vec<Vec<f64>>
    where
        F: Fn(usize, usize) -> f64,
    {
        let rows_per_group = rows_per_group.max(1);
        let width = end_col - start_col + 1;
        let mut groups = Vec::new();
        let mut row = start_row;
        while row + rows_per_group <= end_row + 1 {
            let mut means = Vec::with_capacity(width);
            for col in start_col..=end_col {
                let mut sum = 0.0;
                for r in row..row + rows_per_group {
                    sum += sample(r, col);
                }
                means.push(sum / rows_per_group as f64);
            }
            groups.push(means);
            row += rows_per_group;
        }
        groups
    }
}

/// In-memory [`GranuleSource`] backed by [`SampleGrid`]s.
///
/// Intended for callers that parse granule files elsewhere and hand the
/// arrays over, and for this crate's own tests and benches.
#[derive(Clone, Debug)]
pub struct MemoryGranule {
    latitudes: SampleGrid,
    longitudes: SampleGrid,
    bands: SampleGrid,
    scan_times: Vec<DateTime<Utc>>,
    number_of_scans: usize,
    detectors_per_scan: usize,
    fill_value: f64,
    factors: Vec<CalibrationFactors>,
}

impl MemoryGranule {
    /// Assembles a granule from geolocation and band arrays.
    ///
    /// `latitudes` and `longitudes` must be rank-2 grids of the same shape;
    /// `bands` must be rank-3 `[band][row][col]`. One scan time per scan is
    /// required.
    pub fn new(
        latitudes: SampleGrid,
        longitudes: SampleGrid,
        bands: SampleGrid,
        scan_times: Vec<DateTime<Utc>>,
        number_of_scans: usize,
        detectors_per_scan: usize,
        fill_value: f64,
    ) -> SwathMatchResult<Self> {
        if latitudes.rank() != 2 {
            return Err(SwathMatchError::ShapeMismatch {
                expected: 2,
                got: latitudes.rank(),
                context: "latitude grid rank",
            });
        }
        if longitudes.shape() != latitudes.shape() {
            return Err(SwathMatchError::ShapeMismatch {
                expected: latitudes.shape()[0],
                got: longitudes.shape().first().copied().unwrap_or(0),
                context: "longitude grid shape",
            });
        }
        if bands.rank() != 3 {
            return Err(SwathMatchError::ShapeMismatch {
                expected: 3,
                got: bands.rank(),
                context: "band grid rank",
            });
        }
        if scan_times.len() != number_of_scans {
            return Err(SwathMatchError::ShapeMismatch {
                expected: number_of_scans,
                got: scan_times.len(),
                context: "scan times",
            });
        }
        Ok(Self {
            latitudes,
            longitudes,
            bands,
            scan_times,
            number_of_scans,
            detectors_per_scan,
            fill_value,
            factors: Vec::new(),
        })
    }

    /// Attaches per-band calibration factors.
    pub fn with_calibration(mut self, factors: Vec<CalibrationFactors>) -> Self {
        self.factors = factors;
        self
    }
}

impl GranuleSource for MemoryGranule {
    fn geo_dimensions(&self) -> (usize, usize) {
        (self.latitudes.shape()[0], self.latitudes.shape()[1])
    }

    fn coordinate(&self, row: usize, col: usize) -> Coordinate {
        Coordinate::new(self.latitudes.point(row, col), self.longitudes.point(row, col))
    }

    fn geo_fill_value(&self) -> f64 {
        self.fill_value
    }

    fn number_of_scans(&self) -> usize {
        self.number_of_scans
    }

    fn scan_times(&self) -> Vec<DateTime<Utc>> {
        self.scan_times.clone()
    }

    fn detectors_per_scan(&self) -> usize {
        self.detectors_per_scan
    }

    fn data_dimensions(&self) -> (usize, usize) {
        (self.bands.shape()[1], self.bands.shape()[2])
    }

    fn raw_value(&self, row: usize, col: usize, band: usize) -> f64 {
        self.bands.point_3d(band, row, col)
    }

    fn calibration(&self, band: usize, _scan: usize) -> CalibrationFactors {
        self.factors.get(band).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::SampleGrid;
    use crate::util::SwathMatchError;

    #[test]
    fn sample_grid_rejects_wrong_length() {
        let err = SampleGrid::new(vec![0.0; 5], vec![2, 3]).err().unwrap();
        assert_eq!(
            err,
            SwathMatchError::ShapeMismatch {
                expected: 6,
                got: 5,
                context: "sample grid length",
            }
        );
    }

    #[test]
    fn chunk_mean_2d_rejects_rank_3_data() {
        let grid = SampleGrid::new(vec![0.0; 8], vec![2, 2, 2]).unwrap();
        let err = grid.chunk_mean_2d(0, 1, 0, 1, 2).err().unwrap();
        assert_eq!(
            err,
            SwathMatchError::ShapeMismatch {
                expected: 2,
                got: 3,
                context: "2-d chunk of non-2-d data",
            }
        );
    }

    #[test]
    fn chunk_mean_3d_rejects_rank_2_data() {
        let grid = SampleGrid::new(vec![0.0; 4], vec![2, 2]).unwrap();
        let err = grid.chunk_mean_3d(0, 0, 1, 0, 1, 2).err().unwrap();
        assert_eq!(
            err,
            SwathMatchError::ShapeMismatch {
                expected: 3,
                got: 2,
                context: "3-d chunk of non-3-d data",
            }
        );
    }

    #[test]
    fn chunk_mean_2d_averages_row_groups() {
        // 4x2 grid; groups of 2 rows.
        let grid = SampleGrid::new(
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0],
            vec![4, 2],
        )
        .unwrap();
        let means = grid.chunk_mean_2d(0, 3, 0, 1, 2).unwrap();
        assert_eq!(means, vec![vec![2.0, 3.0], vec![6.0, 7.0]]);
    }

    #[test]
    fn chunk_mean_drops_partial_trailing_group() {
        let grid = SampleGrid::new((0..10).map(f64::from).collect(), vec![5, 2]).unwrap();
        let means = grid.chunk_mean_2d(0, 4, 0, 1, 2).unwrap();
        assert_eq!(means.len(), 2);
    }
}
