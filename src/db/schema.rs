/// Dataset schema as written by the import pipeline.
///
/// Uses CREATE TABLE/INDEX IF NOT EXISTS for idempotent execution. The
/// service only ever reads these tables; the statements exist so in-memory
/// databases match the production layout.
pub const INITIAL_SCHEMA: &str = r#"
-- Providers: one row per facility
CREATE TABLE IF NOT EXISTS providers (
    provider_id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    city TEXT NOT NULL,
    state TEXT NOT NULL,
    zip_code TEXT NOT NULL
);

-- Procedures: DRG pricing per provider (drg_code is text, leading zeros matter)
CREATE TABLE IF NOT EXISTS procedures (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    provider_id TEXT NOT NULL REFERENCES providers(provider_id),
    drg_code TEXT NOT NULL,
    drg_description TEXT NOT NULL,
    total_discharges INTEGER NOT NULL,
    avg_covered_charges REAL NOT NULL,
    avg_total_payments REAL NOT NULL,
    avg_medicare_payments REAL NOT NULL
);

-- Ratings: at most one per provider
CREATE TABLE IF NOT EXISTS ratings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    provider_id TEXT NOT NULL UNIQUE REFERENCES providers(provider_id),
    rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 10)
);

CREATE INDEX IF NOT EXISTS idx_providers_zip ON providers(zip_code);
CREATE INDEX IF NOT EXISTS idx_drg_search ON procedures(drg_code, drg_description);
CREATE INDEX IF NOT EXISTS idx_procedures_provider ON procedures(provider_id);
"#;

/// Tables a database must have before the service will use it.
pub const REQUIRED_TABLES: [&str; 3] = ["providers", "procedures", "ratings"];
