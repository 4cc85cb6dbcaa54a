pub mod completion;
pub mod config;
pub mod db;
pub mod doctor;
pub mod formatter;
pub mod geo;
pub mod intent;
pub mod models;
pub mod ranker;
pub mod sanitizer;
pub mod server;
pub mod service;
pub mod translator;

pub use db::Database;
pub use geo::{Coordinate, CoordinateStore};
pub use models::{DrgCode, Procedure, Provider, ProviderId, ProviderMatch, Rating};
pub use service::{AskResponse, NavigatorService, ProviderSearch, ProviderSearchResponse};
pub use translator::{QueryTranslator, Translation};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_accessible_from_crate_root() {
        let db = Database::in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn types_accessible_from_crate_root() {
        let provider = Provider::new(ProviderId::new("330024"), "Mount Sinai", "New York", "NY", "10029");
        assert_eq!(provider.id().as_str(), "330024");

        assert_eq!(Rating::new(7).map(|r| r.to_string()), Some("7/10".to_string()));
        assert!(DrgCode::is_code_like("470"));

        let store = CoordinateStore::from_entries([("10001", Coordinate::new(40.75, -73.99))]);
        assert!(store.contains("10001"));
    }
}
