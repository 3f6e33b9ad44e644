#![cfg(feature = "serde")]

use swathmatch::{ComparisonRecord, Coordinate, SensorKind};

#[test]
fn comparison_record_round_trips_through_json() {
    let mut record = ComparisonRecord::new(
        32,
        7,
        6,
        677,
        Coordinate::new(10.05, 20.03),
        Coordinate::new(10.0, 20.0),
    );
    record.set_comparison_values(3.5, 2.0, SensorKind::WideSwath);

    let json = serde_json::to_string(&record).unwrap();
    let back: ComparisonRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(back, record);
    assert_eq!(back.ratio(), 1.75);
}
