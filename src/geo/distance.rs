use super::{Coordinate, CoordinateStore};

/// Mean Earth radius (IUGG), in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Statute mile in kilometres.
pub const KM_PER_MILE: f64 = 1.60934;

/// Radius implied by "near <ZIP>" when no distance is given.
pub const DEFAULT_NEAR_RADIUS_MILES: f64 = 50.0;

pub fn miles_to_km(miles: f64) -> f64 {
    miles * KM_PER_MILE
}

/// Great-circle distance between two coordinates using the haversine formula.
///
/// The endpoints are put in a canonical order before computing, so
/// `haversine_km(a, b)` and `haversine_km(b, a)` are bit-for-bit equal.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let (p, q) = if (a.latitude, a.longitude) <= (b.latitude, b.longitude) {
        (a, b)
    } else {
        (b, a)
    };

    let d_lat = (q.latitude - p.latitude).to_radians();
    let d_lon = (q.longitude - p.longitude).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + p.latitude.to_radians().cos() * q.latitude.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

impl CoordinateStore {
    /// Distance in kilometres between two ZIP codes.
    ///
    /// Returns `None` when either ZIP is not in the store.
    pub fn distance_km(&self, from_zip: &str, to_zip: &str) -> Option<f64> {
        let from = self.get(from_zip)?;
        let to = self.get(to_zip)?;
        Some(haversine_km(from, to))
    }

    /// Like [`distance_km`](Self::distance_km), but unresolvable ZIPs are
    /// infinitely far away.
    pub fn distance_or_infinite(&self, from_zip: &str, to_zip: &str) -> f64 {
        self.distance_km(from_zip, to_zip).unwrap_or(f64::INFINITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CoordinateStore {
        CoordinateStore::from_entries([
            ("10001", Coordinate::new(40.75065, -73.99718)),
            ("10029", Coordinate::new(40.79171, -73.94410)),
            ("02101", Coordinate::new(42.37000, -71.02700)),
            ("90210", Coordinate::new(34.10300, -118.41620)),
        ])
    }

    #[test]
    fn distance_to_self_is_zero() {
        let store = store();
        for zip in ["10001", "10029", "02101", "90210"] {
            assert_eq!(store.distance_km(zip, zip), Some(0.0));
        }
    }

    #[test]
    fn distance_is_symmetric() {
        let store = store();
        let zips = ["10001", "10029", "02101", "90210"];
        for a in zips {
            for b in zips {
                assert_eq!(store.distance_km(a, b), store.distance_km(b, a));
            }
        }
    }

    #[test]
    fn new_york_to_los_angeles_is_about_3940_km() {
        let d = store().distance_km("10001", "90210").unwrap();
        assert!((3900.0..4000.0).contains(&d), "got {d}");
    }

    #[test]
    fn nearby_manhattan_zips_are_a_few_km_apart() {
        let d = store().distance_km("10001", "10029").unwrap();
        assert!((5.0..7.0).contains(&d), "got {d}");
    }

    #[test]
    fn unknown_zip_is_unresolved() {
        let store = store();
        assert_eq!(store.distance_km("10001", "99999"), None);
        assert_eq!(store.distance_km("99999", "10001"), None);
        assert_eq!(store.distance_or_infinite("99999", "10001"), f64::INFINITY);
    }

    #[test]
    fn miles_convert_with_fixed_factor() {
        assert_eq!(miles_to_km(25.0), 25.0 * 1.60934);
        assert_eq!(miles_to_km(DEFAULT_NEAR_RADIUS_MILES), 50.0 * 1.60934);
    }
}
