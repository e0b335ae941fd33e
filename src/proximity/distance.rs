use crate::models::geo::{check_latitude, check_longitude, GeoPoint};

use super::types::NotifyError;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometers between two decimal-degree positions.
///
/// All four coordinates are checked first; a non-finite or out-of-range value
/// is `InvalidInput`, never a distance.
pub fn compute_distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Result<f64, NotifyError> {
    check_latitude(lat1)?;
    check_longitude(lon1)?;
    check_latitude(lat2)?;
    check_longitude(lon2)?;
    Ok(haversine_km(lat1, lon1, lat2, lon2))
}

/// Distance between two points. Points are re-validated since their fields are public.
pub fn distance_between(a: &GeoPoint, b: &GeoPoint) -> Result<f64, NotifyError> {
    compute_distance_km(a.latitude, a.longitude, b.latitude, b.longitude)
}

/// Display form used in notifications and lists, e.g. "2.1 km".
pub fn format_distance(km: f64) -> String {
    format!("{:.1} km", km)
}

fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1 for antipodal points.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    const KIGALI: (f64, f64) = (-1.9441, 30.0619);
    const HUYE: (f64, f64) = (-2.5967, 29.7394);
    const GISENYI: (f64, f64) = (-1.7023, 29.2564);

    fn d(a: (f64, f64), b: (f64, f64)) -> f64 {
        compute_distance_km(a.0, a.1, b.0, b.1).unwrap()
    }

    #[test]
    fn kigali_to_itself_is_zero() {
        assert_eq!(d(KIGALI, KIGALI), 0.0);
    }

    #[test]
    fn identical_points_are_zero() {
        for p in [(0.0, 0.0), (89.9, -179.9), (-45.5, 120.25), HUYE] {
            assert_eq!(d(p, p), 0.0);
        }
    }

    #[test]
    fn symmetric_within_tolerance() {
        let points = [KIGALI, HUYE, GISENYI, (0.0, 0.0), (60.0, -150.0), (-89.0, 179.0)];
        for a in points {
            for b in points {
                assert!((d(a, b) - d(b, a)).abs() < 1e-6, "asymmetric for {:?} {:?}", a, b);
            }
        }
    }

    #[test]
    fn hundredth_degree_latitude_at_equator() {
        let km = d((0.0, 0.0), (0.01, 0.0));
        assert!((km - 1.11).abs() <= 0.01, "got {}", km);
    }

    #[test]
    fn monotonic_with_separation() {
        let mut last = 0.0;
        for step in 1..=18 {
            let km = d((0.0, 0.0), (0.0, step as f64 * 10.0));
            assert!(km > last, "step {} gave {} <= {}", step, km, last);
            last = km;
        }
    }

    #[test]
    fn never_negative() {
        assert!(d(KIGALI, HUYE) > 0.0);
        assert!(d((-90.0, 0.0), (90.0, 0.0)) > 0.0);
    }

    #[test]
    fn antipodal_is_half_circumference() {
        let km = d((0.0, 0.0), (0.0, 180.0));
        assert!((km - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn kigali_to_huye_roughly_eighty_km() {
        let km = d(KIGALI, HUYE);
        assert!((75.0..85.0).contains(&km), "got {}", km);
    }

    #[test]
    fn out_of_range_latitude_is_invalid_input() {
        let err = compute_distance_km(200.0, 30.0, -1.9, 30.0).unwrap_err();
        assert!(err.is_invalid_input());
        let err = compute_distance_km(-1.9, 30.0, -90.5, 30.0).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn non_finite_is_invalid_input() {
        assert!(compute_distance_km(f64::NAN, 0.0, 0.0, 0.0).is_err());
        assert!(compute_distance_km(0.0, f64::NEG_INFINITY, 0.0, 0.0).is_err());
    }

    #[test]
    fn distance_between_rechecks_points() {
        let a = GeoPoint::new(KIGALI.0, KIGALI.1).unwrap();
        let mut b = a;
        b.longitude = 500.0;
        assert!(distance_between(&a, &b).is_err());
    }

    #[test]
    fn formats_one_decimal() {
        assert_eq!(format_distance(2.14), "2.1 km");
        assert_eq!(format_distance(0.0), "0.0 km");
        assert_eq!(format_distance(10.96), "11.0 km");
    }
}
