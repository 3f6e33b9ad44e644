//! Sensor conventions and the per-match comparison record.
//!
//! The two instruments calibrate raw counts differently and carry different
//! scan-angle models, so every sensor-specific rule hangs off [`SensorKind`]:
//! the kind of the off-nadir granule is decided once per file handle and
//! selects the calibration convention, the ratio orientation, the scan-angle
//! formula, and the geolocation-to-data frame mapping.

use crate::geo::Coordinate;

/// Scale/offset pair for one band.
///
/// Granules without calibration metadata fall back to the identity factors.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationFactors {
    pub scale: f64,
    pub offset: f64,
}

impl Default for CalibrationFactors {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: 0.0,
        }
    }
}

/// Which instrument produced the off-nadir granule under comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SensorKind {
    /// The narrow-swath reference instrument.
    Reference,
    /// The wide-swath instrument.
    WideSwath,
}

impl SensorKind {
    /// Applies this sensor's calibration convention to a raw count.
    ///
    /// The two conventions differ in where the offset is applied and must not
    /// be unified: the reference instrument subtracts before scaling, the
    /// wide-swath instrument adds after.
    pub fn calibrate(self, factors: CalibrationFactors, raw: f64) -> f64 {
        match self {
            SensorKind::Reference => factors.scale * (raw - factors.offset),
            SensorKind::WideSwath => factors.scale * raw + factors.offset,
        }
    }

    /// Scan angle in degrees for a cross-track data frame position.
    pub fn scan_angle(self, frame: usize) -> f64 {
        let p = frame as f64;
        match self {
            SensorKind::WideSwath => (2.0 * p + 0.5 - 33.5) * 0.017785 - 56.063,
            SensorKind::Reference => 2.0 * ((10.5 + p / 1353.0 * 55.0) - 38.0),
        }
    }

    /// Maps a subsampled cross-track coordinate index to the instrument's
    /// data-frame index.
    ///
    /// Both geolocation streams are 5x subsampled relative to the data grid;
    /// the residual +1/+2 places the frame at the sample the geolocation
    /// value describes.
    pub fn data_frame_index(self, coordinate_index: usize) -> usize {
        match self {
            SensorKind::WideSwath => coordinate_index * 5 + 1,
            SensorKind::Reference => coordinate_index * 5 + 2,
        }
    }

    /// Cross-track subsampling interval applied when extracting candidate
    /// coordinates for this sensor's granules.
    ///
    /// The reference instrument's geolocation grid is natively subsampled, so
    /// its rows are taken as-is; the wide-swath grid is full resolution and
    /// thinned in-code.
    pub fn coordinate_interval(self) -> usize {
        match self {
            SensorKind::WideSwath => 5,
            SensorKind::Reference => 1,
        }
    }
}

/// One matched pair of samples with both sensors' calibrated values.
///
/// Identifier and coordinate fields are fixed at construction; the value
/// fields are populated by the single [`set_comparison_values`] call and the
/// record is read-only afterward.
///
/// [`set_comparison_values`]: ComparisonRecord::set_comparison_values
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComparisonRecord {
    off_nadir_scan: usize,
    nadir_scan: usize,
    off_nadir_frame: usize,
    nadir_frame: usize,
    off_nadir_coordinate: Coordinate,
    nadir_coordinate: Coordinate,
    wide_swath_value: f64,
    reference_value: f64,
    ratio: f64,
    scan_angle: f64,
}

impl ComparisonRecord {
    /// Creates a record for one matched sample pair with zeroed values.
    pub fn new(
        off_nadir_scan: usize,
        nadir_scan: usize,
        off_nadir_frame: usize,
        nadir_frame: usize,
        off_nadir_coordinate: Coordinate,
        nadir_coordinate: Coordinate,
    ) -> Self {
        Self {
            off_nadir_scan,
            nadir_scan,
            off_nadir_frame,
            nadir_frame,
            off_nadir_coordinate,
            nadir_coordinate,
            wide_swath_value: 0.0,
            reference_value: 0.0,
            ratio: 0.0,
            scan_angle: 0.0,
        }
    }

    /// Populates both calibrated values and the derived ratio and scan angle.
    ///
    /// `kind` is the off-nadir granule's sensor: it decides which identity
    /// slot each value lands in, the ratio orientation, and the scan-angle
    /// formula applied to the off-nadir frame.
    pub fn set_comparison_values(&mut self, off_nadir_value: f64, nadir_value: f64, kind: SensorKind) {
        match kind {
            SensorKind::WideSwath => {
                self.wide_swath_value = off_nadir_value;
                self.reference_value = nadir_value;
                self.ratio = self.wide_swath_value / self.reference_value;
            }
            SensorKind::Reference => {
                self.reference_value = off_nadir_value;
                self.wide_swath_value = nadir_value;
                self.ratio = self.reference_value / self.wide_swath_value;
            }
        }
        self.scan_angle = kind.scan_angle(self.off_nadir_frame);
    }

    /// Scan number of the off-nadir sample, 1-based.
    pub fn off_nadir_scan(&self) -> usize {
        self.off_nadir_scan
    }

    /// Scan number of the nadir sample, 1-based.
    pub fn nadir_scan(&self) -> usize {
        self.nadir_scan
    }

    /// Cross-track data-frame index of the off-nadir sample.
    pub fn off_nadir_frame(&self) -> usize {
        self.off_nadir_frame
    }

    /// Cross-track frame index of the nadir sample.
    pub fn nadir_frame(&self) -> usize {
        self.nadir_frame
    }

    /// Geographic coordinate of the off-nadir sample.
    pub fn off_nadir_coordinate(&self) -> Coordinate {
        self.off_nadir_coordinate
    }

    /// Geographic coordinate of the nadir sample.
    pub fn nadir_coordinate(&self) -> Coordinate {
        self.nadir_coordinate
    }

    /// Calibrated value from the wide-swath instrument.
    pub fn wide_swath_value(&self) -> f64 {
        self.wide_swath_value
    }

    /// Calibrated value from the reference instrument.
    pub fn reference_value(&self) -> f64 {
        self.reference_value
    }

    /// Value ratio in the off-nadir sensor's orientation.
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Scan angle of the off-nadir sample in degrees.
    pub fn scan_angle(&self) -> f64 {
        self.scan_angle
    }
}

#[cfg(test)]
mod tests {
    use super::{CalibrationFactors, ComparisonRecord, SensorKind};
    use crate::geo::Coordinate;

    fn record() -> ComparisonRecord {
        ComparisonRecord::new(
            4,
            2,
            16,
            677,
            Coordinate::new(10.0, 20.0),
            Coordinate::new(10.1, 20.1),
        )
    }

    #[test]
    fn ratio_is_exactly_one_for_identical_values() {
        let mut a = record();
        a.set_comparison_values(7.25, 7.25, SensorKind::WideSwath);
        assert_eq!(a.ratio(), 1.0);

        let mut b = record();
        b.set_comparison_values(7.25, 7.25, SensorKind::Reference);
        assert_eq!(b.ratio(), 1.0);
    }

    #[test]
    fn ratio_orientation_follows_off_nadir_sensor() {
        let mut a = record();
        a.set_comparison_values(4.0, 2.0, SensorKind::WideSwath);
        assert_eq!(a.wide_swath_value(), 4.0);
        assert_eq!(a.reference_value(), 2.0);
        assert_eq!(a.ratio(), 2.0);

        let mut b = record();
        b.set_comparison_values(4.0, 2.0, SensorKind::Reference);
        assert_eq!(b.reference_value(), 4.0);
        assert_eq!(b.wide_swath_value(), 2.0);
        assert_eq!(b.ratio(), 2.0);
    }

    #[test]
    fn wide_swath_scan_angle_matches_formula() {
        let angle = SensorKind::WideSwath.scan_angle(16);
        assert!((angle - ((32.0 + 0.5 - 33.5) * 0.017785 - 56.063)).abs() < 1e-12);
    }

    #[test]
    fn reference_scan_angle_spans_swath() {
        assert!((SensorKind::Reference.scan_angle(0) + 55.0).abs() < 1e-12);
        assert!((SensorKind::Reference.scan_angle(1353) - 55.0).abs() < 1e-12);
    }

    #[test]
    fn calibration_conventions_stay_distinct() {
        let factors = CalibrationFactors {
            scale: 2.0,
            offset: 3.0,
        };
        assert_eq!(SensorKind::Reference.calibrate(factors, 10.0), 14.0);
        assert_eq!(SensorKind::WideSwath.calibrate(factors, 10.0), 23.0);
    }

    #[test]
    fn missing_factors_default_to_identity() {
        let factors = CalibrationFactors::default();
        assert_eq!(SensorKind::Reference.calibrate(factors, 5.5), 5.5);
        assert_eq!(SensorKind::WideSwath.calibrate(factors, 5.5), 5.5);
    }

    #[test]
    fn frame_mapping_offsets_differ_per_sensor() {
        assert_eq!(SensorKind::WideSwath.data_frame_index(3), 16);
        assert_eq!(SensorKind::Reference.data_frame_index(3), 17);
    }
}
