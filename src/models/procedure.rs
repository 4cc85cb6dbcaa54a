use serde::{Deserialize, Serialize};

use super::{DrgCode, ProviderId};

/// Pricing for one DRG at one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Procedure {
    /// Provider offering the procedure.
    pub provider_id: ProviderId,
    /// DRG code, compared as a string.
    pub drg_code: DrgCode,
    /// Free-text DRG description.
    pub drg_description: String,
    /// Number of discharges billed under this DRG.
    pub total_discharges: i64,
    /// Average billed amount before negotiated adjustments.
    pub avg_covered_charges: f64,
    /// Average total payment received.
    pub avg_total_payments: f64,
    /// Average payment made by the program.
    pub avg_medicare_payments: f64,
}
