#![cfg(feature = "rayon")]

use chrono::{TimeDelta, TimeZone, Utc};
use swathmatch::{
    Coordinate, MatchConfig, Matcher, MemoryGranule, NadirPoint, SampleGrid, SensorKind,
};

const FILL: f64 = -999.3;

fn granule(scans: usize) -> MemoryGranule {
    let rows_per_scan = 2;
    let cols = 11;
    let geo_rows = scans * rows_per_scan;
    let mut lats = Vec::with_capacity(geo_rows * cols);
    let mut lons = Vec::with_capacity(geo_rows * cols);
    for row in 0..geo_rows {
        let lat = 8.5 + 0.05 * (row / rows_per_scan) as f64;
        for col in 0..cols {
            lats.push(lat);
            lons.push(19.53 + 0.1 * col as f64);
        }
    }

    let detectors = 2;
    let data_rows = scans * detectors;
    let data_cols = 12;
    let mut raw = Vec::with_capacity(data_rows * data_cols);
    for row in 0..data_rows {
        raw.extend(std::iter::repeat((row / detectors + 1) as f64).take(data_cols));
    }

    let start = Utc.with_ymd_and_hms(2018, 3, 14, 12, 0, 0).unwrap();
    let times = (0..scans)
        .map(|s| start + TimeDelta::seconds(10 * s as i64))
        .collect();

    MemoryGranule::new(
        SampleGrid::new(lats, vec![geo_rows, cols]).unwrap(),
        SampleGrid::new(lons, vec![geo_rows, cols]).unwrap(),
        SampleGrid::new(raw, vec![1, data_rows, data_cols]).unwrap(),
        times,
        scans,
        detectors,
        FILL,
    )
    .unwrap()
}

#[test]
fn parallel_run_matches_serial_run() {
    let granule = granule(48);
    let start = Utc.with_ymd_and_hms(2018, 3, 14, 12, 0, 0).unwrap();

    // Several points along the track so more than one worker has real work.
    let points: Vec<NadirPoint> = (0..8)
        .map(|i| {
            NadirPoint::new(
                Coordinate::new(9.0 + 0.25 * i as f64, 20.0),
                start + TimeDelta::minutes(5),
                i + 1,
                0.10,
                TimeDelta::minutes(15),
                677,
            )
        })
        .collect();
    let values: Vec<f64> = (0..8).map(|i| 1.0 + i as f64).collect();

    let serial = Matcher::new(&granule, SensorKind::WideSwath)
        .unwrap()
        .with_config(MatchConfig {
            band: 0,
            parallel: false,
        })
        .run(&points, &values)
        .unwrap();

    let parallel = Matcher::new(&granule, SensorKind::WideSwath)
        .unwrap()
        .with_config(MatchConfig {
            band: 0,
            parallel: true,
        })
        .run(&points, &values)
        .unwrap();

    assert!(!serial.is_empty());
    assert_eq!(serial, parallel);
}
