use rusqlite::types::ValueRef;
use serde::Serialize;

use crate::geo::normalize_zip;
use crate::models::Rating;

/// A single SQLite value from an arbitrary query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl CellValue {
    /// Numeric view of the value; text is parsed if it looks like a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Real(f) => Some(*f),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Null => None,
        }
    }

    /// Textual view of the value; numbers are rendered without decoration.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s.clone()),
            Self::Integer(i) => Some(i.to_string()),
            Self::Real(f) => Some(f.to_string()),
            Self::Null => None,
        }
    }
}

impl From<ValueRef<'_>> for CellValue {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null | ValueRef::Blob(_) => Self::Null,
            ValueRef::Integer(i) => Self::Integer(i),
            ValueRef::Real(f) => Self::Real(f),
            ValueRef::Text(bytes) => Self::Text(String::from_utf8_lossy(bytes).into_owned()),
        }
    }
}

/// A result row whose values are addressed by column name.
///
/// Column names are lower-cased. Identity fields (`name`, `city`, `state`,
/// `zip_code`, `rating`) must match exactly; metric lookups also accept a
/// column whose name contains the metric, so `MIN(avg_covered_charges)`
/// still counts as the covered-charge column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    columns: Vec<(String, CellValue)>,
}

impl ResultRow {
    pub fn new(columns: Vec<(String, CellValue)>) -> Self {
        Self { columns }
    }

    /// Builds a row from `(column, value)` pairs; handy in tests.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, CellValue)>) -> Self {
        Self::new(
            pairs
                .into_iter()
                .map(|(name, value)| (name.to_lowercase(), value))
                .collect(),
        )
    }

    pub fn columns(&self) -> &[(String, CellValue)] {
        &self.columns
    }

    /// Value of the column named exactly `name`.
    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value)
    }

    fn metric(&self, key: &str) -> Option<f64> {
        self.get(key)
            .or_else(|| {
                self.columns
                    .iter()
                    .find(|(column, _)| column.contains(key))
                    .map(|(_, value)| value)
            })
            .and_then(CellValue::as_f64)
    }

    fn text(&self, name: &str) -> Option<String> {
        self.get(name)
            .and_then(CellValue::as_text)
            .filter(|s| !s.trim().is_empty())
    }

    pub fn name(&self) -> Option<String> {
        self.text("name")
    }

    pub fn city(&self) -> Option<String> {
        self.text("city")
    }

    pub fn state(&self) -> Option<String> {
        self.text("state")
    }

    /// The provider's ZIP, normalized to five digits.
    pub fn zip_code(&self) -> Option<String> {
        self.text("zip_code")
            .or_else(|| self.text("zip"))
            .and_then(|zip| normalize_zip(&zip))
    }

    pub fn avg_covered_charges(&self) -> Option<f64> {
        self.metric("avg_covered_charges")
    }

    pub fn avg_total_payments(&self) -> Option<f64> {
        self.metric("avg_total_payments")
    }

    pub fn avg_medicare_payments(&self) -> Option<f64> {
        self.metric("avg_medicare_payments")
    }

    pub fn total_discharges(&self) -> Option<i64> {
        self.metric("total_discharges").map(|d| d as i64)
    }

    /// The provider's rating; absent or out-of-range values are `None`.
    pub fn rating(&self) -> Option<Rating> {
        self.get("rating")
            .and_then(CellValue::as_f64)
            .and_then(|r| Rating::new(r.round() as i64))
    }
}
