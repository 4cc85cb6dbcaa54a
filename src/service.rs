use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::completion::CompletionError;
use crate::db::Database;
use crate::formatter::format_answer;
use crate::geo::{CoordinateStore, normalize_zip};
use crate::intent;
use crate::models::ProviderMatch;
use crate::ranker::{filter_rows, retain_within, sort_by_price};
use crate::sanitizer::{sanitize, strip_fences};
use crate::translator::{QueryTranslator, REFUSAL_MESSAGE, Translation};

/// Default search radius for provider lookups.
pub const DEFAULT_RADIUS_KM: f64 = 50.0;

/// Answer to a natural-language question.
///
/// `query` carries the SQL that was (or would have been) executed; it is
/// `None` when the question was refused or never translated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AskResponse {
    pub answer: String,
    pub query: Option<String>,
}

impl AskResponse {
    fn without_query(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            query: None,
        }
    }

    fn with_query(answer: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            query: Some(query.into()),
        }
    }
}

/// Parameters of a structured provider search.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProviderSearch {
    /// DRG code (all digits) or description fragment.
    #[serde(alias = "drg")]
    pub procedure: String,
    /// ZIP the radius is measured from.
    #[serde(alias = "zip")]
    pub origin_zip: String,
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
}

fn default_radius_km() -> f64 {
    DEFAULT_RADIUS_KM
}

impl ProviderSearch {
    pub fn new(procedure: impl Into<String>, origin_zip: impl Into<String>, radius_km: f64) -> Self {
        Self {
            procedure: procedure.into(),
            origin_zip: origin_zip.into(),
            radius_km,
        }
    }

    /// Checks the parameters and returns the trimmed procedure term and the
    /// normalized origin ZIP.
    fn validate(&self) -> Result<(&str, String), SearchError> {
        let procedure = self.procedure.trim();
        if procedure.is_empty() {
            return Err(SearchError::EmptyProcedure);
        }

        let zip = self.origin_zip.trim();
        if zip.len() != 5 || !zip.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SearchError::InvalidZip(self.origin_zip.clone()));
        }

        if !self.radius_km.is_finite() || self.radius_km < 0.0 {
            return Err(SearchError::InvalidRadius(self.radius_km));
        }

        let zip = normalize_zip(zip).ok_or_else(|| SearchError::InvalidZip(zip.to_string()))?;
        Ok((procedure, zip))
    }
}

/// Result of a provider search, cheapest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderSearchResponse {
    pub total_found: usize,
    pub providers: Vec<ProviderMatch>,
}

/// Errors from a structured provider search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("procedure must not be empty")]
    EmptyProcedure,

    #[error("origin ZIP must be five digits, got `{0}`")]
    InvalidZip(String),

    #[error("radius_km must be a non-negative number, got {0}")]
    InvalidRadius(f64),

    #[error("Database error: {0}")]
    Store(#[from] rusqlite::Error),
}

impl SearchError {
    /// True when the caller supplied bad parameters rather than the store failing.
    pub fn is_invalid_input(&self) -> bool {
        !matches!(self, Self::Store(_))
    }
}

/// Service layer for both query paths.
///
/// Owns the database and shares the immutable coordinate store. Translation
/// happens outside the service so callers can avoid holding it while the
/// completion service is busy.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use carenav::{CoordinateStore, Database, NavigatorService};
///
/// # fn main() -> anyhow::Result<()> {
/// let db = Database::in_memory()?;
/// let service = NavigatorService::new(db, Arc::new(CoordinateStore::default()));
/// assert_eq!(service.database().table_counts()?.providers, 0);
/// # Ok(())
/// # }
/// ```
pub struct NavigatorService {
    db: Database,
    coordinates: Arc<CoordinateStore>,
}

impl NavigatorService {
    pub fn new(db: Database, coordinates: Arc<CoordinateStore>) -> Self {
        Self { db, coordinates }
    }

    /// Returns a reference to the underlying database.
    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn coordinates(&self) -> &CoordinateStore {
        &self.coordinates
    }

    /// Finds providers offering a procedure within a radius of a ZIP,
    /// ordered by average covered charge ascending.
    ///
    /// An origin ZIP missing from the coordinate store yields no providers.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] for invalid parameters or store failures.
    pub fn search_providers(
        &self,
        search: &ProviderSearch,
    ) -> Result<ProviderSearchResponse, SearchError> {
        let (procedure, origin_zip) = search.validate()?;

        let records = self.db.find_procedures(procedure)?;
        let candidates = records.len();

        let mut providers: Vec<ProviderMatch> = retain_within(
            records,
            &origin_zip,
            search.radius_km,
            &self.coordinates,
            |record| Some(record.provider.zip_code().to_string()),
        )
        .into_iter()
        .map(|(record, distance)| {
            ProviderMatch::new(&record.provider, &record.procedure, record.rating, distance)
        })
        .collect();
        sort_by_price(&mut providers);

        tracing::info!(
            procedure,
            origin_zip = %origin_zip,
            radius_km = search.radius_km,
            candidates,
            found = providers.len(),
            "provider search"
        );

        Ok(ProviderSearchResponse {
            total_found: providers.len(),
            providers,
        })
    }

    /// Answers a question given the outcome of its translation.
    ///
    /// Every failure is reported in the answer text: translation errors as
    /// `Error: ...` without a query, validation or execution errors as
    /// `Database error: ...` with the attempted query.
    pub fn answer_translation(
        &self,
        question: &str,
        translation: Result<Translation, CompletionError>,
    ) -> AskResponse {
        match translation {
            Err(e) => {
                tracing::warn!(error = %e, "translation failed");
                AskResponse::without_query(format!("Error: {e}"))
            }
            Ok(Translation::Refused { .. }) => AskResponse::without_query(REFUSAL_MESSAGE),
            Ok(Translation::Candidate(raw)) => self.answer_candidate(question, &raw),
        }
    }

    fn answer_candidate(&self, question: &str, raw: &str) -> AskResponse {
        let query = match sanitize(raw) {
            Ok(query) => query,
            Err(e) => {
                tracing::warn!(error = %e, "rejected candidate query");
                return AskResponse::with_query(format!("Database error: {e}"), strip_fences(raw));
            }
        };

        let rows = match self.db.execute_select(query.as_str()) {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(error = %e, %query, "query execution failed");
                return AskResponse::with_query(format!("Database error: {e}"), query.into_string());
            }
        };

        let intent = intent::extract(question);
        let returned = rows.len();
        let rows = filter_rows(rows, intent.geo.as_ref(), &self.coordinates);
        tracing::info!(%query, returned, kept = rows.len(), "answered question");

        AskResponse::with_query(format_answer(&intent.shape, &rows), query.into_string())
    }

    /// Translates and answers a question in one call.
    ///
    /// Holds `self` for the duration of the completion call; concurrent
    /// callers should translate first and use
    /// [`answer_translation`](Self::answer_translation).
    pub fn ask(&self, translator: &QueryTranslator, question: &str) -> AskResponse {
        self.answer_translation(question, translator.translate(question))
    }
}
