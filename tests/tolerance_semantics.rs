//! Inherited tolerance behaviors, documented as-is.
//!
//! Two comparisons in the search criterion look like defects but are part of
//! the established match results: the time window is one-sided (no lower
//! bound on how far in the future a sample may be), and the longitude window
//! widens with the cosine of the latitude taken in degrees. Both are kept
//! bit-for-bit pending confirmation from the data owners; these tests pin
//! the behavior so an accidental "fix" fails loudly.

use chrono::{TimeDelta, TimeZone, Utc};
use swathmatch::{Coordinate, NadirPoint};

fn point_at(lat: f64, lon: f64) -> NadirPoint {
    NadirPoint::new(
        Coordinate::new(lat, lon),
        Utc.with_ymd_and_hms(2018, 3, 14, 12, 0, 0).unwrap(),
        1,
        0.10,
        TimeDelta::minutes(15),
        677,
    )
}

#[test]
fn time_window_is_one_sided() {
    let p = point_at(10.0, 20.0);

    // Inclusive at exactly tolerance in the past.
    assert!(p.within_time_range(p.scan_time() - TimeDelta::minutes(15)));
    // One second beyond the tolerance fails.
    assert!(!p.within_time_range(p.scan_time() - TimeDelta::minutes(15) - TimeDelta::seconds(1)));
    // No upper bound: samples arbitrarily far in the future pass.
    assert!(p.within_time_range(p.scan_time() + TimeDelta::days(300)));
}

#[test]
fn longitude_window_uses_degree_cosine() {
    // At latitude 10 the factor is 1 + (1 - cos(10 rad)) ~= 2.839, so the
    // longitude window is ~0.2839 degrees. A radian-correct cosine would
    // give ~0.1015 and reject the 0.25-degree probe below.
    let p = point_at(10.0, 20.0);
    assert!(p.within_geospatial_range(Coordinate::new(10.0, 20.25)));
    assert!(!p.within_geospatial_range(Coordinate::new(10.0, 20.30)));
}

#[test]
fn longitude_window_can_narrow_where_a_radian_cosine_would_widen() {
    // cos(60 rad) ~= -0.952 widens the window to ~0.295 degrees, while
    // cos(60 deg) = 0.5 would give only 0.15. At latitude 87 the degree
    // cosine is ~0.57 and the window shrinks to ~0.143, far below the ~0.29
    // a polar pass actually needs. Pinned, not endorsed.
    let at_60 = point_at(60.0, 0.0);
    assert!(at_60.within_geospatial_range(Coordinate::new(60.0, 0.29)));

    let at_87 = point_at(87.0, 0.0);
    assert!(!at_87.within_geospatial_range(Coordinate::new(87.0, 0.15)));
}

#[test]
fn latitude_window_is_symmetric_and_inclusive() {
    let p = point_at(10.0, 20.0);
    assert!(p.within_geospatial_range(Coordinate::new(10.10, 20.0)));
    assert!(p.within_geospatial_range(Coordinate::new(9.90, 20.0)));
    assert!(!p.within_geospatial_range(Coordinate::new(10.11, 20.0)));
}
