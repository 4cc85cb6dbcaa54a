use serde::{Deserialize, Serialize};

use super::ProviderId;

/// A hospital or facility that reports procedure pricing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    id: ProviderId,
    name: String,
    city: String,
    state: String,
    zip_code: String,
}

impl Provider {
    /// Creates a new provider record.
    ///
    /// # Examples
    ///
    /// ```
    /// use carenav::{Provider, ProviderId};
    ///
    /// let provider = Provider::new(ProviderId::new("330024"), "Mount Sinai", "New York", "NY", "10029");
    /// assert_eq!(provider.zip_code(), "10029");
    /// ```
    pub fn new(
        id: ProviderId,
        name: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        zip_code: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            city: city.into(),
            state: state.into(),
            zip_code: zip_code.into(),
        }
    }

    pub fn id(&self) -> &ProviderId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn zip_code(&self) -> &str {
        &self.zip_code
    }
}
