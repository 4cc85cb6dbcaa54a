//! Shared fixtures: a small provider database and ZIP file on disk.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use tempfile::TempDir;

const IMPORT_SQL: &str = "
CREATE TABLE providers (
    provider_id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    city TEXT NOT NULL,
    state TEXT NOT NULL,
    zip_code TEXT NOT NULL
);
CREATE TABLE procedures (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    provider_id TEXT NOT NULL REFERENCES providers(provider_id),
    drg_code TEXT NOT NULL,
    drg_description TEXT NOT NULL,
    total_discharges INTEGER NOT NULL,
    avg_covered_charges REAL NOT NULL,
    avg_total_payments REAL NOT NULL,
    avg_medicare_payments REAL NOT NULL
);
CREATE TABLE ratings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    provider_id TEXT NOT NULL UNIQUE REFERENCES providers(provider_id),
    rating INTEGER NOT NULL
);

INSERT INTO providers VALUES
    ('330024', 'Mount Sinai Hospital', 'New York', 'NY', '10029'),
    ('330214', 'NYU Langone Hospitals', 'New York', 'NY', '10016'),
    ('310009', 'Hoboken University Medical Center', 'Hoboken', 'NJ', '07030'),
    ('050454', 'UCSF Medical Center', 'San Francisco', 'CA', '94143'),
    ('220071', 'Massachusetts General Hospital', 'Boston', 'MA', '02114');

INSERT INTO procedures (provider_id, drg_code, drg_description, total_discharges,
                        avg_covered_charges, avg_total_payments, avg_medicare_payments) VALUES
    ('330024', '470', 'MAJOR HIP AND KNEE JOINT REPLACEMENT OR REATTACHMENT OF LOWER EXTREMITY W/O MCC', 310, 91000.00, 24500.00, 22100.00),
    ('330214', '470', 'MAJOR HIP AND KNEE JOINT REPLACEMENT OR REATTACHMENT OF LOWER EXTREMITY W/O MCC', 540, 78250.75, 23100.00, 20900.00),
    ('310009', '470', 'MAJOR HIP AND KNEE JOINT REPLACEMENT OR REATTACHMENT OF LOWER EXTREMITY W/O MCC', 95, 102400.00, 21000.00, 19000.00),
    ('050454', '470', 'MAJOR HIP AND KNEE JOINT REPLACEMENT OR REATTACHMENT OF LOWER EXTREMITY W/O MCC', 220, 45500.00, 27000.00, 24000.00),
    ('220071', '470', 'MAJOR HIP AND KNEE JOINT REPLACEMENT OR REATTACHMENT OF LOWER EXTREMITY W/O MCC', 410, 60500.00, 25500.00, 23000.00),
    ('330024', '291', 'HEART FAILURE & SHOCK W MCC', 640, 48000.00, 14000.00, 12500.00),
    ('330214', '291', 'HEART FAILURE & SHOCK W MCC', 580, 52000.00, 15000.00, 13000.00);

INSERT INTO ratings (provider_id, rating) VALUES
    ('330024', 9),
    ('330214', 8),
    ('310009', 5),
    ('220071', 10);
";

const ZIP_CSV: &str = "zip,lat,lng,city,state_id
10001,40.75064,-73.99718,New York,NY
10016,40.74524,-73.97819,New York,NY
10029,40.79173,-73.94383,New York,NY
7030,40.74487,-74.03239,Hoboken,NJ
94143,37.76303,-122.45859,San Francisco,CA
2114,42.36124,-71.06778,Boston,MA
";

/// A database file and ZIP file in a temporary directory.
pub struct Fixture {
    _dir: TempDir,
    pub database: PathBuf,
    pub zip_file: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let database = dir.path().join("providers.db");
        let zip_file = dir.path().join("uszips.csv");

        write_database(&database);
        std::fs::write(&zip_file, ZIP_CSV).expect("write ZIP file");

        Self {
            _dir: dir,
            database,
            zip_file,
        }
    }
}

fn write_database(path: &Path) {
    let conn = rusqlite::Connection::open(path).expect("create database");
    conn.execute_batch(IMPORT_SQL).expect("load fixture data");
}

/// Counts rows in a table through a separate connection.
pub fn count_rows(path: &Path, table: &str) -> i64 {
    rusqlite::Connection::open(path)
        .expect("open database")
        .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        .expect("count rows")
}
