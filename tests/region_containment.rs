use swathmatch::{Coordinate, ScanRegion, EDGE_SAMPLES};

fn rectangle(lat0: f64, lat1: f64, lon0: f64, lon1: f64) -> ScanRegion {
    ScanRegion::new(
        Coordinate::new(lat1, lon0),
        Coordinate::new(lat1, lon1),
        Coordinate::new(lat0, lon0),
        Coordinate::new(lat0, lon1),
        1,
        24,
    )
    .unwrap()
}

/// Smallest absolute longitude difference, accounting for wrap.
fn lon_gap(a: f64, b: f64) -> f64 {
    let diff = (a - b).rem_euclid(360.0);
    diff.min(360.0 - diff)
}

#[test]
fn every_region_contains_its_own_midpoint() {
    let regions = [
        rectangle(8.0, 12.0, 20.0, 24.0),
        rectangle(-45.0, -41.0, -71.0, -67.0),
        rectangle(60.0, 63.0, 5.0, 11.0),
    ];
    for region in &regions {
        assert!(
            region.contains(region.midpoint()),
            "midpoint escaped {:?}",
            region.midpoint()
        );
    }
}

#[test]
fn date_line_region_sets_the_crossing_flag() {
    let region = ScanRegion::new(
        Coordinate::new(5.0, 179.0),
        Coordinate::new(5.0, -179.0),
        Coordinate::new(1.0, 179.0),
        Coordinate::new(1.0, -179.0),
        1,
        24,
    )
    .unwrap();
    assert!(region.crosses_antimeridian());
    assert!(region.contains(region.midpoint()));
}

#[test]
fn crossing_interpolation_has_no_longitude_discontinuity() {
    let region = ScanRegion::new(
        Coordinate::new(5.0, 179.0),
        Coordinate::new(5.0, -179.0),
        Coordinate::new(1.0, 179.0),
        Coordinate::new(1.0, -179.0),
        1,
        24,
    )
    .unwrap();

    // The top edge spans 2 degrees of longitude in 30 steps; consecutive
    // samples should never jump by more than a couple of step widths.
    let edge = region.edge_points(Coordinate::new(5.0, 179.0), Coordinate::new(5.0, -179.0));
    assert_eq!(edge.len(), EDGE_SAMPLES);
    for pair in edge.windows(2) {
        let gap = lon_gap(pair[0].lon, pair[1].lon);
        assert!(gap < 0.2, "gap {gap} between {:?} and {:?}", pair[0], pair[1]);
    }
}

#[test]
fn high_latitude_same_hemisphere_does_not_cross() {
    let region = ScanRegion::new(
        Coordinate::new(5.0, 121.0),
        Coordinate::new(5.0, 127.0),
        Coordinate::new(1.0, 121.0),
        Coordinate::new(1.0, 127.0),
        1,
        24,
    )
    .unwrap();
    assert!(!region.crosses_antimeridian());
}

#[test]
fn bounding_box_admits_corner_overshoot() {
    // The containment test is a bounding rectangle over the sampled edges, so
    // a point outside the quadrilateral but inside the rectangle passes.
    // Known approximation, asserted here so a behavior change is loud.
    let region = ScanRegion::new(
        Coordinate::new(10.0, 0.0),
        Coordinate::new(12.0, 4.0),
        Coordinate::new(6.0, 0.5),
        Coordinate::new(8.0, 4.5),
        1,
        24,
    )
    .unwrap();
    assert!(region.contains(Coordinate::new(11.9, 0.1)));
}
