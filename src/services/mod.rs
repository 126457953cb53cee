//! Business logic services

pub mod catalog;
pub mod loans;
pub mod lookup;
pub mod records;
pub mod sessions;

use std::sync::Arc;

use crate::{config::AppConfig, repository::RecordStore};

use self::sessions::SessionStore;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub lookup: lookup::LookupService,
    pub loans: loans::LoansService,
    pub records: records::RecordsService,
    pub sessions: Arc<dyn SessionStore>,
}

impl Services {
    /// Create all services over the given record store
    pub fn new(
        store: Arc<dyn RecordStore>,
        sessions: Arc<dyn SessionStore>,
        config: &AppConfig,
    ) -> Self {
        Self {
            catalog: catalog::CatalogService::new(store.clone(), config.catalog.clone(), &config.loans),
            lookup: lookup::LookupService::new(store.clone()),
            loans: loans::LoansService::new(store.clone(), config.loans.clone()),
            records: records::RecordsService::new(store, config.records.clone()),
            sessions,
        }
    }
}
