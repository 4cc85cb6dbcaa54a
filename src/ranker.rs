//! Distance filtering and price ordering of result rows.

use std::cmp::Ordering;

use crate::db::ResultRow;
use crate::geo::CoordinateStore;
use crate::intent::GeoConstraint;
use crate::models::ProviderMatch;

/// Keeps the items whose ZIP lies within `radius_km` of `origin_zip`,
/// pairing each survivor with its distance.
///
/// Items without a ZIP, or whose ZIP (or the origin) is not in the store,
/// are dropped. Input order is preserved.
pub fn retain_within<T>(
    items: impl IntoIterator<Item = T>,
    origin_zip: &str,
    radius_km: f64,
    coordinates: &CoordinateStore,
    zip_of: impl Fn(&T) -> Option<String>,
) -> Vec<(T, f64)> {
    items
        .into_iter()
        .filter_map(|item| {
            let zip = zip_of(&item)?;
            let distance = coordinates.distance_km(origin_zip, &zip)?;
            (distance <= radius_km).then_some((item, distance))
        })
        .collect()
}

/// Applies an optional radius constraint to query rows.
///
/// Without a constraint the rows pass through unchanged.
pub fn filter_rows(
    rows: Vec<ResultRow>,
    geo: Option<&GeoConstraint>,
    coordinates: &CoordinateStore,
) -> Vec<ResultRow> {
    let Some(geo) = geo else {
        return rows;
    };

    let before = rows.len();
    let kept: Vec<ResultRow> = retain_within(
        rows,
        &geo.origin_zip,
        geo.radius_km,
        coordinates,
        ResultRow::zip_code,
    )
    .into_iter()
    .map(|(row, _)| row)
    .collect();

    tracing::debug!(
        origin = %geo.origin_zip,
        radius_km = geo.radius_km,
        before,
        after = kept.len(),
        "applied radius filter"
    );
    kept
}

/// Orders matches by average covered charge, cheapest first.
///
/// The sort is stable so equal prices keep their query order.
pub fn sort_by_price(matches: &mut [ProviderMatch]) {
    matches.sort_by(|a, b| compare_price(a.avg_covered_charges, b.avg_covered_charges));
}

fn compare_price(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::CellValue;
    use crate::geo::Coordinate;
    use crate::models::{DrgCode, Procedure, Provider, ProviderId};

    fn store() -> CoordinateStore {
        CoordinateStore::from_entries([
            ("10001", Coordinate::new(40.7506, -73.9972)),
            ("10029", Coordinate::new(40.7918, -73.9441)),
            ("07030", Coordinate::new(40.7449, -74.0324)),
            ("90001", Coordinate::new(33.9731, -118.2479)),
        ])
    }

    fn row(name: &str, zip: &str) -> ResultRow {
        ResultRow::from_pairs([
            ("name", CellValue::Text(name.to_string())),
            ("zip_code", CellValue::Text(zip.to_string())),
        ])
    }

    fn names(rows: &[ResultRow]) -> Vec<String> {
        rows.iter().filter_map(ResultRow::name).collect()
    }

    #[test]
    fn no_constraint_passes_rows_through() {
        let rows = vec![row("A", "90001"), row("B", "99999")];
        let filtered = filter_rows(rows.clone(), None, &store());
        assert_eq!(filtered, rows);
    }

    #[test]
    fn radius_keeps_nearby_rows_in_order() {
        let rows = vec![
            row("Harlem", "10029"),
            row("Los Angeles", "90001"),
            row("Hoboken", "07030"),
        ];
        let geo = GeoConstraint::from_miles(25.0, "10001");

        let filtered = filter_rows(rows, Some(&geo), &store());
        assert_eq!(names(&filtered), ["Harlem", "Hoboken"]);
    }

    #[test]
    fn unresolvable_zips_are_dropped() {
        let rows = vec![
            row("Unknown", "99999"),
            ResultRow::from_pairs([("name", CellValue::Text("No zip".into()))]),
            row("Harlem", "10029"),
        ];
        let geo = GeoConstraint::from_miles(25.0, "10001");

        let filtered = filter_rows(rows, Some(&geo), &store());
        assert_eq!(names(&filtered), ["Harlem"]);
    }

    #[test]
    fn unknown_origin_drops_everything() {
        let rows = vec![row("Harlem", "10029")];
        let geo = GeoConstraint::from_miles(25.0, "99999");

        assert!(filter_rows(rows, Some(&geo), &store()).is_empty());
    }

    #[test]
    fn every_kept_row_is_inside_radius() {
        let coords = store();
        let zips = ["10001", "10029", "07030", "90001", "00000"];
        let radius_km = 5.0;

        let kept = retain_within(zips, "10001", radius_km, &coords, |z| Some(z.to_string()));
        for (zip, distance) in &kept {
            assert!(*distance <= radius_km, "{zip} at {distance}");
        }
        for zip in zips {
            if !kept.iter().any(|(z, _)| *z == zip) {
                let d = coords.distance_or_infinite("10001", zip);
                assert!(d > radius_km);
            }
        }
    }

    #[test]
    fn filtering_is_deterministic() {
        let rows = vec![row("Harlem", "10029"), row("Hoboken", "07030")];
        let geo = GeoConstraint::from_miles(25.0, "10001");

        let first = filter_rows(rows.clone(), Some(&geo), &store());
        let second = filter_rows(rows, Some(&geo), &store());
        assert_eq!(first, second);
    }

    #[test]
    fn sort_by_price_is_ascending_and_stable() {
        let make = |id: &str, price: f64| {
            let provider = Provider::new(ProviderId::new(id), id, "City", "NY", "10001");
            let procedure = Procedure {
                provider_id: ProviderId::new(id),
                drg_code: DrgCode::new("470"),
                drg_description: "JOINT".into(),
                total_discharges: 1,
                avg_covered_charges: price,
                avg_total_payments: 0.0,
                avg_medicare_payments: 0.0,
            };
            ProviderMatch::new(&provider, &procedure, None, 0.0)
        };
        let mut matches = vec![
            make("a", 300.0),
            make("b", 100.0),
            make("c", 300.0),
            make("d", 200.0),
        ];

        sort_by_price(&mut matches);

        let ids: Vec<&str> = matches.iter().map(|m| m.provider_id.as_str()).collect();
        assert_eq!(ids, ["b", "d", "a", "c"]);
    }
}
