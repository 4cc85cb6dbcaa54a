use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use thiserror::Error;

/// Errors that can occur while loading the ZIP coordinate reference file.
#[derive(Debug, Error)]
pub enum CoordinateError {
    /// The reference file could not be opened.
    #[error("Failed to open ZIP coordinate file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file is not readable as CSV.
    #[error("Malformed ZIP coordinate CSV: {0}")]
    Csv(#[from] csv::Error),

    /// The file has fewer than three columns, so no ZIP/lat/lng triple exists.
    #[error("ZIP coordinate CSV needs at least 3 columns, found {0}")]
    MissingColumns(usize),
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Immutable ZIP → coordinate lookup table.
///
/// Built once from the reference dataset; there is no way to mutate it after
/// construction.
#[derive(Debug, Clone, Default)]
pub struct CoordinateStore {
    zips: HashMap<String, Coordinate>,
}

impl CoordinateStore {
    /// Loads the store from a CSV file on disk.
    ///
    /// # Errors
    ///
    /// Returns `CoordinateError::Io` if the file cannot be opened, or a CSV
    /// error if the header cannot be read.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CoordinateError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| CoordinateError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let store = Self::from_reader(file)?;
        tracing::info!(
            zips = store.len(),
            path = %path.display(),
            "Loaded ZIP coordinates"
        );
        Ok(store)
    }

    /// Loads the store from any CSV source with a header row.
    ///
    /// Columns are located by header name (`zip`/`zip_code`, `lat`/`latitude`,
    /// `lng`/`lon`/`longitude`); when the header doesn't name them the first
    /// three columns are used. Extra columns are ignored and rows whose ZIP
    /// or coordinates don't parse are skipped.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CoordinateError> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        if headers.len() < 3 {
            return Err(CoordinateError::MissingColumns(headers.len()));
        }
        let (zip_col, lat_col, lng_col) = locate_columns(&headers);

        let mut zips = HashMap::new();
        let mut skipped = 0usize;
        for record in rdr.records() {
            let Ok(record) = record else {
                skipped += 1;
                continue;
            };
            let parsed = (|| {
                let zip = normalize_zip(record.get(zip_col)?)?;
                let latitude = record.get(lat_col)?.parse::<f64>().ok()?;
                let longitude = record.get(lng_col)?.parse::<f64>().ok()?;
                let coordinate = Coordinate::new(latitude, longitude);
                coordinate.is_valid().then_some((zip, coordinate))
            })();

            match parsed {
                Some((zip, coordinate)) => {
                    // First occurrence wins; one coordinate per code.
                    zips.entry(zip).or_insert(coordinate);
                }
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            tracing::debug!(skipped, "Skipped unparseable ZIP coordinate rows");
        }

        Ok(Self { zips })
    }

    /// Builds a store from in-memory entries. Later duplicates are ignored.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Coordinate)>,
        S: AsRef<str>,
    {
        let mut zips = HashMap::new();
        for (zip, coordinate) in entries {
            if let Some(zip) = normalize_zip(zip.as_ref()) {
                zips.entry(zip).or_insert(coordinate);
            }
        }
        Self { zips }
    }

    /// Looks up the coordinate for a ZIP code.
    pub fn get(&self, zip: &str) -> Option<Coordinate> {
        let zip = normalize_zip(zip)?;
        self.zips.get(&zip).copied()
    }

    /// Returns true if the ZIP code resolves to a coordinate.
    pub fn contains(&self, zip: &str) -> bool {
        self.get(zip).is_some()
    }

    pub fn len(&self) -> usize {
        self.zips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zips.is_empty()
    }
}

fn locate_columns(headers: &csv::StringRecord) -> (usize, usize, usize) {
    let find = |names: &[&str]| {
        headers
            .iter()
            .position(|h| names.contains(&h.trim().to_lowercase().as_str()))
    };

    match (
        find(&["zip", "zip_code", "zipcode", "zcta"]),
        find(&["lat", "latitude"]),
        find(&["lng", "lon", "long", "longitude"]),
    ) {
        (Some(zip), Some(lat), Some(lng)) => (zip, lat, lng),
        _ => (0, 1, 2),
    }
}

/// Normalizes a ZIP code to its 5-digit form.
///
/// Accepts ZIP+4 (`10001-1234`), spreadsheet artifacts (`601.0`) and short
/// codes that lost their leading zeros (`601` → `00601`). Returns `None` for
/// anything that isn't a US ZIP.
///
/// # Examples
///
/// ```
/// use carenav::geo::normalize_zip;
///
/// assert_eq!(normalize_zip("601").as_deref(), Some("00601"));
/// assert_eq!(normalize_zip("10001-1234").as_deref(), Some("10001"));
/// assert_eq!(normalize_zip("abc"), None);
/// ```
pub fn normalize_zip(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let base = trimmed.split(['-', '.']).next().unwrap_or(trimmed);

    if base.is_empty() || base.len() > 5 || !base.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    Some(format!("{base:0>5}"))
}
