//! Cleaning and validation of model-generated SQL.
//!
//! The completion model is instructed to emit a single read-only query, but
//! nothing it returns is trusted: fences are stripped, then the text is
//! parsed and rejected unless it is exactly one SELECT reading only from the
//! known tables.

use std::fmt;
use std::ops::ControlFlow;
use std::sync::LazyLock;

use regex::Regex;
use sqlparser::ast::{SetExpr, Statement, visit_relations};
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;
use thiserror::Error;

/// Tables a generated query may read from.
pub const ALLOWED_TABLES: [&str; 3] = ["providers", "procedures", "ratings"];

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)```(?:sql)?\s*").expect("valid fence pattern"));

/// Reasons a candidate query is refused before reaching the store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SanitizeError {
    #[error("query is empty")]
    Empty,

    #[error("query could not be parsed: {0}")]
    Parse(String),

    #[error("expected a single statement, found {0}")]
    MultipleStatements(usize),

    #[error("only SELECT queries are allowed, found {0}")]
    NotSelect(String),

    #[error("query references unknown table `{0}`")]
    UnknownTable(String),
}

/// A query that passed validation and may be executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedQuery(String);

impl SanitizedQuery {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SanitizedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Removes Markdown code fences and surrounding whitespace.
///
/// # Examples
///
/// ```
/// use carenav::sanitizer::strip_fences;
///
/// assert_eq!(strip_fences("```sql\nSELECT 1\n```"), "SELECT 1");
/// ```
pub fn strip_fences(raw: &str) -> String {
    CODE_FENCE.replace_all(raw, "").trim().to_string()
}

/// Strips fences and validates the result as a single read-only SELECT.
///
/// The returned query is rendered from the parsed statement, so comments
/// and trailing semicolons are gone and the executed text is exactly the
/// text that was checked.
pub fn sanitize(raw: &str) -> Result<SanitizedQuery, SanitizeError> {
    let cleaned = strip_fences(raw);
    let cleaned = cleaned.trim_end_matches(|c: char| c == ';' || c.is_whitespace());
    if cleaned.is_empty() {
        return Err(SanitizeError::Empty);
    }

    let statements = Parser::parse_sql(&SQLiteDialect {}, cleaned)
        .map_err(|e| SanitizeError::Parse(e.to_string()))?;

    match statements.len() {
        0 => return Err(SanitizeError::Empty),
        1 => {}
        n => return Err(SanitizeError::MultipleStatements(n)),
    }

    let Statement::Query(query) = &statements[0] else {
        return Err(SanitizeError::NotSelect(statement_verb(cleaned)));
    };
    if query.with.is_some() {
        return Err(SanitizeError::NotSelect("WITH".to_string()));
    }
    ensure_select(&query.body)?;

    let unknown = visit_relations(&statements, |relation| {
        let table = relation
            .0
            .last()
            .map(|ident| ident.value.to_lowercase())
            .unwrap_or_default();
        if ALLOWED_TABLES.contains(&table.as_str()) {
            ControlFlow::Continue(())
        } else {
            ControlFlow::Break(relation.to_string())
        }
    });
    if let ControlFlow::Break(table) = unknown {
        return Err(SanitizeError::UnknownTable(table));
    }

    Ok(SanitizedQuery(statements[0].to_string()))
}

fn ensure_select(body: &SetExpr) -> Result<(), SanitizeError> {
    match body {
        SetExpr::Select(select) if select.into.is_some() => {
            Err(SanitizeError::NotSelect("SELECT INTO".to_string()))
        }
        SetExpr::Select(_) => Ok(()),
        SetExpr::Query(query) => ensure_select(&query.body),
        SetExpr::SetOperation { left, right, .. } => {
            ensure_select(left)?;
            ensure_select(right)
        }
        SetExpr::Values(_) => Err(SanitizeError::NotSelect("VALUES".to_string())),
        _ => Err(SanitizeError::NotSelect("a data-modifying statement".to_string())),
    }
}

fn statement_verb(sql: &str) -> String {
    sql.split_whitespace()
        .next()
        .unwrap_or_default()
        .to_uppercase()
}
