//! Data store boundary: the collections the bracket engine and admin screens read and write.

mod memory;

pub use memory::MemoryStore;

use crate::models::{
    AdminAccount, AdminId, Category, GameMatch, MatchId, Registration, RegistrationRow,
    Representative, RepresentativeId, Sport,
};
use async_trait::async_trait;

/// Errors reported by a data store.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("not found: {0}")]
    NotFound(String),
    /// The store could not be read or written at all.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Optional sport/category filter for match queries.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MatchFilter {
    pub sport: Option<Sport>,
    pub category: Option<Category>,
}

impl MatchFilter {
    pub fn division(sport: Sport, category: Category) -> Self {
        Self {
            sport: Some(sport),
            category: Some(category),
        }
    }

    pub fn accepts(&self, m: &GameMatch) -> bool {
        self.sport.map_or(true, |s| s == m.sport) && self.category.map_or(true, |c| c == m.category)
    }
}

#[async_trait]
pub trait DataStore: Send + Sync {
    /// All registration rows, newest submission first. Rows are not validated.
    async fn list_registrations(&self) -> Result<Vec<RegistrationRow>, StoreError>;
    /// Insert or replace the registration with the same (representative, sport, category).
    async fn upsert_registration(&self, registration: &Registration) -> Result<Registration, StoreError>;
    /// Append raw rows (e.g. an import from the hosted table).
    async fn import_registrations(&self, rows: Vec<RegistrationRow>) -> Result<usize, StoreError>;

    /// Matches accepted by `filter`, by scheduled date then creation order.
    async fn list_matches(&self, filter: MatchFilter) -> Result<Vec<GameMatch>, StoreError>;
    async fn get_match(&self, id: MatchId) -> Result<Option<GameMatch>, StoreError>;
    /// All-or-nothing: either every match is stored or none is.
    async fn insert_matches(&self, matches: Vec<GameMatch>) -> Result<(), StoreError>;
    async fn update_match(&self, m: &GameMatch) -> Result<(), StoreError>;

    async fn list_representatives(&self) -> Result<Vec<Representative>, StoreError>;
    async fn get_representative(&self, code: &str) -> Result<Option<Representative>, StoreError>;
    async fn insert_representative(&self, rep: Representative) -> Result<(), StoreError>;
    async fn delete_representative(&self, id: RepresentativeId) -> Result<Option<Representative>, StoreError>;

    async fn list_admins(&self) -> Result<Vec<AdminAccount>, StoreError>;
    async fn get_admin(&self, id: AdminId) -> Result<Option<AdminAccount>, StoreError>;
    async fn get_admin_by_username(&self, username: &str) -> Result<Option<AdminAccount>, StoreError>;
    async fn insert_admin(&self, admin: AdminAccount) -> Result<(), StoreError>;
    async fn update_admin(&self, admin: &AdminAccount) -> Result<(), StoreError>;
    async fn delete_admin(&self, id: AdminId) -> Result<(), StoreError>;
}
