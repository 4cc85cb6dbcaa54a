mod ids;
mod procedure;
mod provider;
mod provider_match;
mod rating;

pub use ids::{DrgCode, ProviderId};
pub use procedure::Procedure;
pub use provider::Provider;
pub use provider_match::ProviderMatch;
pub use rating::Rating;
