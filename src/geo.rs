//! ZIP code geography: coordinate lookup and great-circle distances.
//!
//! The [`CoordinateStore`] is loaded once from a reference CSV and is
//! read-only afterwards, so it can be shared behind an `Arc` by any number
//! of concurrent readers.

mod coordinates;
mod distance;

pub use coordinates::{Coordinate, CoordinateError, CoordinateStore, normalize_zip};
pub use distance::{DEFAULT_NEAR_RADIUS_MILES, EARTH_RADIUS_KM, KM_PER_MILE, haversine_km, miles_to_km};
