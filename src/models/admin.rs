//! Administrator accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type AdminId = Uuid;

/// Stored admin account. `password_hash` is an Argon2 PHC string and never leaves the server.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdminAccount {
    pub id: AdminId,
    pub username: String,
    pub password_hash: String,
    pub full_name: String,
    pub email: String,
    /// Master admins manage other admins and cannot be removed.
    pub is_master: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// What the API sees of an admin.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct AdminInfo {
    pub id: AdminId,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub is_master: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<&AdminAccount> for AdminInfo {
    fn from(a: &AdminAccount) -> Self {
        Self {
            id: a.id,
            username: a.username.clone(),
            full_name: a.full_name.clone(),
            email: a.email.clone(),
            is_master: a.is_master,
            created_at: a.created_at,
            last_login: a.last_login,
        }
    }
}
