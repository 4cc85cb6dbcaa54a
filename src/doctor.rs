//! Health checks for carenav.
//!
//! Backs the `doctor` command and the `/health` endpoint:
//! - Database availability and dataset row counts
//! - ZIP coordinate file
//! - Completion service configuration

use std::path::Path;

use serde::Serialize;

use crate::completion::{CompletionClient, CompletionClientBuilder};
use crate::config::Config;
use crate::db::{Database, TableCounts};
use crate::geo::CoordinateStore;

// ANSI color codes for terminal output
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Health status for a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Component is healthy
    Ok,
    /// Component has a warning but is functional
    Warning(String),
    /// Component is not functional
    Error(String),
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, HealthStatus::Ok)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, HealthStatus::Error(_))
    }
}

/// Database health information.
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseHealth {
    pub status: HealthStatus,
    pub path: String,
    pub counts: Option<TableCounts>,
}

impl DatabaseHealth {
    /// Inspects an open database.
    pub fn check(path: &str, db: &Database) -> Self {
        match db.table_counts() {
            Ok(counts) => Self {
                status: if counts.providers == 0 || counts.procedures == 0 {
                    HealthStatus::Warning("Dataset is empty".to_string())
                } else {
                    HealthStatus::Ok
                },
                path: path.to_string(),
                counts: Some(counts),
            },
            Err(e) => Self::unavailable(path, format!("Query failed: {e}")),
        }
    }

    pub fn unavailable(path: &str, reason: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Error(reason.into()),
            path: path.to_string(),
            counts: None,
        }
    }
}

/// ZIP coordinate file information.
#[derive(Debug, Clone, Serialize)]
pub struct CoordinatesHealth {
    pub status: HealthStatus,
    pub path: String,
    pub zip_count: usize,
}

impl CoordinatesHealth {
    pub fn check(path: &str, store: &CoordinateStore) -> Self {
        Self {
            status: if store.is_empty() {
                HealthStatus::Warning("No ZIP coordinates loaded".to_string())
            } else {
                HealthStatus::Ok
            },
            path: path.to_string(),
            zip_count: store.len(),
        }
    }

    pub fn unavailable(path: &str, reason: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Error(reason.into()),
            path: path.to_string(),
            zip_count: 0,
        }
    }
}

/// Completion service configuration.
///
/// Only the configuration is inspected; no request is sent.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionHealth {
    pub status: HealthStatus,
    pub base_url: String,
    pub model: String,
}

impl CompletionHealth {
    pub fn check(client: &CompletionClient) -> Self {
        Self {
            status: if client.has_api_key() {
                HealthStatus::Ok
            } else {
                HealthStatus::Warning("OPENAI_API_KEY is not set".to_string())
            },
            base_url: client.base_url().to_string(),
            model: client.model().to_string(),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Error(reason.into()),
            base_url: String::new(),
            model: String::new(),
        }
    }
}

/// Combined health of every component.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub database: DatabaseHealth,
    pub coordinates: CoordinatesHealth,
    pub completion: CompletionHealth,
}

impl HealthReport {
    /// True when no component is in an error state.
    pub fn is_healthy(&self) -> bool {
        !self.database.status.is_error()
            && !self.coordinates.status.is_error()
            && !self.completion.status.is_error()
    }
}

/// Checks every configured component and prints the report.
///
/// Returns the report so callers can pick an exit code.
pub fn run_health_checks(config: &Config) -> HealthReport {
    let report = collect_health(config);
    print_health_report(&report);
    report
}

/// Checks every configured component without printing.
pub fn collect_health(config: &Config) -> HealthReport {
    let db_path = config.database_path.display().to_string();
    let database = match Database::open(&config.database_path) {
        Ok(db) => DatabaseHealth::check(&db_path, &db),
        Err(e) => DatabaseHealth::unavailable(&db_path, format!("{e:#}")),
    };

    HealthReport {
        database,
        coordinates: check_coordinates(&config.zip_file),
        completion: match CompletionClientBuilder::new().build() {
            Ok(client) => CompletionHealth::check(&client),
            Err(e) => CompletionHealth::unavailable(format!("Failed to build client: {e}")),
        },
    }
}

fn check_coordinates(path: &Path) -> CoordinatesHealth {
    let display = path.display().to_string();
    match CoordinateStore::from_path(path) {
        Ok(store) => CoordinatesHealth::check(&display, &store),
        Err(e) => CoordinatesHealth::unavailable(&display, e.to_string()),
    }
}

// ============================================================================
// Pretty Printing
// ============================================================================

fn status_symbol(status: &HealthStatus) -> &'static str {
    match status {
        HealthStatus::Ok => "\u{2713}",
        HealthStatus::Warning(_) => "!",
        HealthStatus::Error(_) => "\u{2717}",
    }
}

fn status_color(status: &HealthStatus) -> &'static str {
    match status {
        HealthStatus::Ok => GREEN,
        HealthStatus::Warning(_) => YELLOW,
        HealthStatus::Error(_) => RED,
    }
}

fn status_text(status: &HealthStatus, ok: &str) -> String {
    match status {
        HealthStatus::Ok => ok.to_string(),
        HealthStatus::Warning(w) => w.clone(),
        HealthStatus::Error(e) => e.clone(),
    }
}

fn print_status_line(label: &str, status: &HealthStatus, ok: &str) {
    println!(
        "  {}{}{} {}: {}",
        status_color(status),
        status_symbol(status),
        RESET,
        label,
        status_text(status, ok)
    );
}

fn print_health_report(report: &HealthReport) {
    println!("{BOLD}carenav doctor{RESET}");
    println!();

    let db = &report.database;
    println!("{BOLD}Database{RESET}");
    print_status_line("Connection", &db.status, "OK");
    println!("    {DIM}Path: {}{RESET}", db.path);
    if let Some(counts) = &db.counts {
        println!("    Providers:  {:>8}", counts.providers);
        println!("    Procedures: {:>8}", counts.procedures);
        println!("    Ratings:    {:>8}", counts.ratings);
    }
    println!();

    let coords = &report.coordinates;
    println!("{BOLD}ZIP coordinates{RESET}");
    print_status_line("File", &coords.status, "Loaded");
    println!("    {DIM}Path: {}{RESET}", coords.path);
    if coords.zip_count > 0 {
        println!("    ZIP codes:  {:>8}", coords.zip_count);
    }
    println!();

    let completion = &report.completion;
    println!("{BOLD}Completion service{RESET}");
    print_status_line("Config", &completion.status, "API key configured");
    if !completion.base_url.is_empty() {
        println!("    {DIM}URL: {}{RESET}", completion.base_url);
        println!("    {DIM}Model: {}{RESET}", completion.model);
    }
}
