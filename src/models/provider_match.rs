use serde::Serialize;

use super::{Procedure, Provider, Rating};

/// One row of a radius search: a provider offering a procedure, with its
/// distance from the search origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderMatch {
    pub provider_id: String,
    pub name: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub distance_km: f64,
    pub avg_covered_charges: f64,
    pub avg_total_payments: f64,
    pub avg_medicare_payments: f64,
    pub total_discharges: i64,
    pub rating: Option<Rating>,
    pub drg_code: String,
    pub drg_description: String,
}

impl ProviderMatch {
    /// Combines a provider, its procedure and optional rating into a match.
    ///
    /// `distance_km` is rounded to two decimals for presentation.
    pub fn new(
        provider: &Provider,
        procedure: &Procedure,
        rating: Option<Rating>,
        distance_km: f64,
    ) -> Self {
        Self {
            provider_id: provider.id().to_string(),
            name: provider.name().to_string(),
            city: provider.city().to_string(),
            state: provider.state().to_string(),
            zip_code: provider.zip_code().to_string(),
            distance_km: (distance_km * 100.0).round() / 100.0,
            avg_covered_charges: procedure.avg_covered_charges,
            avg_total_payments: procedure.avg_total_payments,
            avg_medicare_payments: procedure.avg_medicare_payments,
            total_discharges: procedure.total_discharges,
            rating,
            drg_code: procedure.drg_code.to_string(),
            drg_description: procedure.drg_description.clone(),
        }
    }
}
