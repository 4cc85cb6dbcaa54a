mod row;
mod schema;

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags, OptionalExtension};

use crate::models::{DrgCode, Procedure, Provider, ProviderId, Rating};

pub use row::{CellValue, ResultRow};
use schema::{INITIAL_SCHEMA, REQUIRED_TABLES};

/// Row counts for the three dataset tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct TableCounts {
    pub providers: i64,
    pub procedures: i64,
    pub ratings: i64,
}

/// One provider/procedure pairing with the provider's optional rating.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureRecord {
    pub provider: Provider,
    pub procedure: Procedure,
    pub rating: Option<Rating>,
}

/// Database wrapper over the provider pricing dataset.
///
/// The dataset is populated by an external import; file-backed databases
/// are opened read-only.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens an in-memory SQLite database.
    ///
    /// Creates the dataset schema so tests and fixtures can load rows.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Opens an existing database file read-only.
    ///
    /// # Errors
    ///
    /// Fails if the file does not exist or any of the `providers`,
    /// `procedures` or `ratings` tables is missing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI,
        )
        .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Self { conn };
        db.verify_schema()?;
        Ok(db)
    }

    /// Creates tables and indexes if they do not exist.
    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute("PRAGMA foreign_keys = ON", [])?;
        self.conn.execute_batch(INITIAL_SCHEMA)?;
        Ok(())
    }

    fn verify_schema(&self) -> Result<()> {
        for table in REQUIRED_TABLES {
            let exists: Option<i64> = self
                .conn
                .query_row(
                    "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [table],
                    |row| row.get(0),
                )
                .optional()?;
            if exists.is_none() {
                anyhow::bail!("Database is missing required table `{table}`");
            }
        }
        Ok(())
    }

    /// Returns a reference to the underlying connection.
    ///
    /// Useful for loading fixtures in tests.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Counts the rows in each dataset table.
    pub fn table_counts(&self) -> rusqlite::Result<TableCounts> {
        let count = |table: &str| -> rusqlite::Result<i64> {
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        };

        Ok(TableCounts {
            providers: count("providers")?,
            procedures: count("procedures")?,
            ratings: count("ratings")?,
        })
    }

    /// Executes an already-validated SELECT and returns rows keyed by column
    /// name.
    pub fn execute_select(&self, sql: &str) -> rusqlite::Result<Vec<ResultRow>> {
        let mut stmt = self.conn.prepare(sql)?;
        let names: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(|name| name.to_lowercase())
            .collect();

        let rows = stmt.query_map([], |row| {
            let mut columns = Vec::with_capacity(names.len());
            for (i, name) in names.iter().enumerate() {
                columns.push((name.clone(), CellValue::from(row.get_ref(i)?)));
            }
            Ok(ResultRow::new(columns))
        })?;

        rows.collect()
    }

    /// Finds every provider offering a procedure.
    ///
    /// An all-digit `procedure` is an exact DRG code match; anything else is
    /// a case-insensitive substring match on the DRG description.
    pub fn find_procedures(&self, procedure: &str) -> rusqlite::Result<Vec<ProcedureRecord>> {
        const SELECT: &str = "SELECT p.provider_id, p.name, p.city, p.state, p.zip_code,
                    pr.drg_code, pr.drg_description, pr.total_discharges,
                    pr.avg_covered_charges, pr.avg_total_payments, pr.avg_medicare_payments,
                    r.rating
             FROM procedures pr
             JOIN providers p ON pr.provider_id = p.provider_id
             LEFT JOIN ratings r ON r.provider_id = p.provider_id";

        let term = procedure.trim();
        let (sql, param) = if DrgCode::is_code_like(term) {
            (format!("{SELECT} WHERE pr.drg_code = ?1"), term.to_string())
        } else {
            (
                format!("{SELECT} WHERE pr.drg_description LIKE ?1 ESCAPE '\\'"),
                format!("%{}%", escape_like(term)),
            )
        };

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([param], |row| {
            let provider_id = ProviderId::new(row.get::<_, String>(0)?);
            let provider = Provider::new(
                provider_id.clone(),
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            );
            let procedure = Procedure {
                provider_id,
                drg_code: DrgCode::new(row.get::<_, String>(5)?),
                drg_description: row.get(6)?,
                total_discharges: row.get(7)?,
                avg_covered_charges: row.get(8)?,
                avg_total_payments: row.get(9)?,
                avg_medicare_payments: row.get(10)?,
            };
            let rating = row.get::<_, Option<i64>>(11)?.and_then(Rating::new);

            Ok(ProcedureRecord {
                provider,
                procedure,
                rating,
            })
        })?;

        rows.collect()
    }
}

/// Escapes `%`, `_` and the escape character itself for a LIKE pattern.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
