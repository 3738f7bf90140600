//! Great-circle distance between two coordinates.
//!

use crate::Coordinate;

/// Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance in meters.
///
/// Pure and total: symmetric, zero for identical points, NaN inputs propagate
/// as NaN.
///
pub fn distance(a: &Coordinate, b: &Coordinate) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin() * (d_lat / 2.0).sin()
        + a.latitude.to_radians().cos()
            * b.latitude.to_radians().cos()
            * (d_lon / 2.0).sin()
            * (d_lon / 2.0).sin();

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0., 0.)]
    #[case(48.573174, 2.319671)]
    #[case(-6.2, 106.8)]
    fn test_distance_to_self_is_zero(#[case] lat: f64, #[case] lon: f64) {
        let p = Coordinate::new(lat, lon);
        assert_eq!(0., distance(&p, &p));
    }

    #[rstest]
    #[case(48.573174, 2.319671, 48.566757, 2.303015)]
    #[case(0., 0., 1., 1.)]
    #[case(-33.86, 151.20, 40.71, -74.00)]
    fn test_distance_is_symmetric(
        #[case] lat1: f64,
        #[case] lon1: f64,
        #[case] lat2: f64,
        #[case] lon2: f64,
    ) {
        let a = Coordinate::new(lat1, lon1);
        let b = Coordinate::new(lat2, lon2);
        assert_eq!(distance(&a, &b), distance(&b, &a));
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let a = Coordinate::new(0., 0.);
        let b = Coordinate::new(1., 0.);
        let d = distance(&a, &b);

        // one degree of latitude is ~111.32 km, allow 1%
        let expected = 111_320.0;
        assert!((d - expected).abs() / expected < 0.01, "got {d}");
    }

    #[test]
    fn test_nan_propagates() {
        let a = Coordinate::new(f64::NAN, 0.);
        let b = Coordinate::new(0., 0.);
        assert!(distance(&a, &b).is_nan());
    }
}
