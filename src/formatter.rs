//! Turns result rows into a plain-language answer.

use std::fmt::Write;

use crate::db::ResultRow;
use crate::intent::{ResultShape, Superlative};

/// Answer given when the query produced no rows (or none survived filtering).
pub const NO_RESULTS: &str = "No results found for your query.";

/// Rows listed in a general answer before the remainder is summarized.
const GENERAL_LIMIT: usize = 5;

/// Formats an amount as US currency with thousands separators.
///
/// # Examples
///
/// ```
/// use carenav::formatter::format_currency;
///
/// assert_eq!(format_currency(41250.5), "$41,250.50");
/// assert_eq!(format_currency(999.0), "$999.00");
/// ```
pub fn format_currency(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}${grouped}.{cents}")
}

/// Builds the answer text for a set of rows.
pub fn format_answer(shape: &ResultShape, rows: &[ResultRow]) -> String {
    let Some(first) = rows.first() else {
        return NO_RESULTS.to_string();
    };

    match *shape {
        ResultShape::TopN { n, cheapest } => top_n(n, cheapest, rows),
        ResultShape::Single(superlative) => single(superlative, first),
        ResultShape::General => general(rows),
    }
}

/// "Name in City, ST", tolerating missing columns.
fn describe(row: &ResultRow) -> String {
    let name = row.name().unwrap_or_else(|| "Unknown provider".to_string());
    match (row.city(), row.state()) {
        (Some(city), Some(state)) => format!("{name} in {city}, {state}"),
        (Some(place), None) | (None, Some(place)) => format!("{name} in {place}"),
        (None, None) => name,
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "result" } else { "results" }
}

fn top_n(n: usize, cheapest: bool, rows: &[ResultRow]) -> String {
    let shown = &rows[..rows.len().min(n)];
    let mut answer = match shown.len() {
        1 => "Here is the top result:".to_string(),
        count => format!("Here are the top {count} {}:", plural(count)),
    };

    for (i, row) in shown.iter().enumerate() {
        let _ = write!(answer, "\n{}. {}", i + 1, describe(row));
        if cheapest {
            if let Some(price) = row.avg_covered_charges() {
                let _ = write!(answer, " - {}", format_currency(price));
            }
        }
    }
    answer
}

fn single(superlative: Superlative, row: &ResultRow) -> String {
    let who = describe(row);
    match superlative {
        Superlative::Cheapest => match row.avg_covered_charges() {
            Some(price) => format!(
                "Based on data, the cheapest hospital is {who} with an average covered charge of {}",
                format_currency(price)
            ),
            None => format!("Based on data, the cheapest hospital is {who}"),
        },
        Superlative::Best | Superlative::Worst => {
            let kind = superlative.as_str();
            match row.rating() {
                Some(rating) => {
                    format!("Based on data, the {kind} rated hospital is {who} with a rating of {rating}")
                }
                None => format!("Based on data, the {kind} rated hospital is {who}"),
            }
        }
        Superlative::Highest | Superlative::Lowest => {
            let kind = superlative.as_str();
            if let Some(price) = row.avg_covered_charges() {
                format!(
                    "Based on data, the {kind} average covered charge is at {who}: {}",
                    format_currency(price)
                )
            } else if let Some(rating) = row.rating() {
                format!("Based on data, the {kind} rating is at {who}: {rating}")
            } else {
                format!("Based on data, the {kind} result is {who}")
            }
        }
    }
}

fn general(rows: &[ResultRow]) -> String {
    let mut answer = format!("Found {} {}:", rows.len(), plural(rows.len()));

    for row in rows.iter().take(GENERAL_LIMIT) {
        let _ = write!(answer, "\n- {}", describe(row));
        if let Some(price) = row.avg_covered_charges() {
            let _ = write!(answer, ", average covered charge {}", format_currency(price));
        }
        if let Some(rating) = row.rating() {
            let _ = write!(answer, ", rating {rating}");
        }
    }

    if rows.len() > GENERAL_LIMIT {
        let _ = write!(answer, "\n...and {} more", rows.len() - GENERAL_LIMIT);
    }
    answer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::CellValue;
    use crate::intent::extract_shape;

    fn hospital(name: &str, price: Option<f64>, rating: Option<i64>) -> ResultRow {
        let mut pairs = vec![
            ("name", CellValue::Text(name.to_string())),
            ("city", CellValue::Text("New York".to_string())),
            ("state", CellValue::Text("NY".to_string())),
        ];
        if let Some(price) = price {
            pairs.push(("avg_covered_charges", CellValue::Real(price)));
        }
        if let Some(rating) = rating {
            pairs.push(("rating", CellValue::Integer(rating)));
        }
        ResultRow::from_pairs(pairs)
    }

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(1234567.891), "$1,234,567.89");
        assert_eq!(format_currency(100000.0), "$100,000.00");
        assert_eq!(format_currency(-1500.0), "-$1,500.00");
    }

    #[test]
    fn empty_rows_have_fixed_answer() {
        for shape in [
            ResultShape::General,
            ResultShape::Single(Superlative::Cheapest),
            ResultShape::TopN { n: 3, cheapest: true },
        ] {
            assert_eq!(format_answer(&shape, &[]), NO_RESULTS);
        }
    }

    #[test]
    fn cheapest_reports_first_row_price() {
        let rows = [
            hospital("Mount Sinai", Some(41250.5), None),
            hospital("Bellevue", Some(52000.0), None),
        ];
        let answer = format_answer(&extract_shape("Who is cheapest for knee replacement?"), &rows);
        assert_eq!(
            answer,
            "Based on data, the cheapest hospital is Mount Sinai in New York, NY with an average covered charge of $41,250.50"
        );
    }

    #[test]
    fn cheapest_without_price_omits_amount() {
        let rows = [hospital("Mount Sinai", None, None)];
        let answer = format_answer(&ResultShape::Single(Superlative::Cheapest), &rows);
        assert_eq!(answer, "Based on data, the cheapest hospital is Mount Sinai in New York, NY");
    }

    #[test]
    fn price_is_read_by_name_not_magnitude() {
        // Discharges are large but must never be mistaken for the price.
        let row = ResultRow::from_pairs([
            ("name", CellValue::Text("Mount Sinai".into())),
            ("total_discharges", CellValue::Integer(5000)),
            ("avg_covered_charges", CellValue::Real(900.0)),
        ]);
        let answer = format_answer(&ResultShape::Single(Superlative::Cheapest), &[row]);
        assert!(answer.ends_with("$900.00"), "{answer}");
    }

    #[test]
    fn best_reports_rating_out_of_ten() {
        let rows = [hospital("Mount Sinai", None, Some(9))];
        let answer = format_answer(&extract_shape("Which is the best hospital for sepsis?"), &rows);
        assert_eq!(
            answer,
            "Based on data, the best rated hospital is Mount Sinai in New York, NY with a rating of 9/10"
        );
    }

    #[test]
    fn top_n_lists_numbered_rows_with_prices() {
        let rows = [
            hospital("A", Some(1000.0), None),
            hospital("B", Some(2000.0), None),
            hospital("C", Some(3000.0), None),
        ];
        let answer = format_answer(&extract_shape("Top 2 cheapest hospitals for DRG 470"), &rows);
        assert_eq!(
            answer,
            "Here are the top 2 results:\n1. A in New York, NY - $1,000.00\n2. B in New York, NY - $2,000.00"
        );
    }

    #[test]
    fn top_n_without_cheapest_omits_prices() {
        let rows = [hospital("A", Some(1000.0), Some(8))];
        let answer = format_answer(&extract_shape("top 5 hospitals by rating"), &rows);
        assert_eq!(answer, "Here is the top result:\n1. A in New York, NY");
    }

    #[test]
    fn single_row_heading_is_singular() {
        let rows = [hospital("A", Some(1000.0), None)];
        let answer = format_answer(&extract_shape("top 3 cheapest hospitals"), &rows);

        assert_eq!(answer, "Here is the top result:\n1. A in New York, NY - $1,000.00");
        assert!(!answer.contains("results"));
    }

    #[test]
    fn general_lists_at_most_five() {
        let rows: Vec<ResultRow> = (1..=7)
            .map(|i| hospital(&format!("H{i}"), Some(1000.0 * i as f64), None))
            .collect();
        let answer = format_answer(&ResultShape::General, &rows);

        assert!(answer.starts_with("Found 7 results:"));
        assert!(answer.contains("H5"));
        assert!(!answer.contains("H6"));
        assert!(answer.ends_with("...and 2 more"));
    }

    #[test]
    fn missing_location_still_names_provider() {
        let row = ResultRow::from_pairs([("name", CellValue::Text("Solo".into()))]);
        assert_eq!(format_answer(&ResultShape::General, &[row]), "Found 1 result:\n- Solo");
    }

    #[test]
    fn formatting_is_deterministic() {
        let rows = [hospital("A", Some(1.0), Some(2)), hospital("B", None, None)];
        assert_eq!(
            format_answer(&ResultShape::General, &rows),
            format_answer(&ResultShape::General, &rows)
        );
    }
}
