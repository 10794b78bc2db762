//! Administration: authorized representatives and admin accounts.

use crate::models::{AdminAccount, AdminId, AdminInfo, Representative, RepresentativeId};
use crate::store::{DataStore, StoreError};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::Utc;
use uuid::Uuid;

/// Errors that can occur during administration.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum AdminError {
    #[error("This representative code is already registered")]
    DuplicateRepresentative,
    #[error("Representative not found")]
    RepresentativeNotFound(RepresentativeId),
    #[error("Cannot remove a representative who has registrations")]
    RepresentativeHasRegistrations,
    #[error("All fields are required")]
    MissingField(&'static str),
    #[error("This username already exists")]
    DuplicateUsername,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Current password is incorrect")]
    WrongPassword,
    #[error("Admin not found")]
    AdminNotFound(AdminId),
    #[error("A master admin cannot be removed")]
    MasterAdmin,
    #[error("Password could not be hashed")]
    Hash,
    #[error("Store error")]
    Store(#[from] StoreError),
}

fn required(value: &str, field: &'static str) -> Result<String, AdminError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(AdminError::MissingField(field));
    }
    Ok(v.to_string())
}

/// Authorize a new representative. Codes are unique.
pub async fn add_representative<S: DataStore + ?Sized>(
    store: &S,
    code: &str,
    name: &str,
    year: &str,
    course: &str,
) -> Result<Representative, AdminError> {
    let rep = Representative::new(
        required(code, "code")?,
        required(name, "name")?,
        required(year, "year")?,
        required(course, "course")?,
    );
    if store.get_representative(&rep.code).await?.is_some() {
        return Err(AdminError::DuplicateRepresentative);
    }
    match store.insert_representative(rep.clone()).await {
        Ok(()) => {}
        Err(StoreError::Conflict(_)) => return Err(AdminError::DuplicateRepresentative),
        Err(e) => return Err(e.into()),
    }
    log::info!("Representative {} ({} {}) authorized", rep.code, rep.year, rep.course);
    Ok(rep)
}

/// Revoke a representative. Refused while any registration references them.
pub async fn remove_representative<S: DataStore + ?Sized>(
    store: &S,
    id: RepresentativeId,
) -> Result<(), AdminError> {
    let rep = store
        .list_representatives()
        .await?
        .into_iter()
        .find(|r| r.id == id)
        .ok_or(AdminError::RepresentativeNotFound(id))?;
    let rows = store.list_registrations().await?;
    if rows.iter().any(|r| r.representative_id == rep.code) {
        return Err(AdminError::RepresentativeHasRegistrations);
    }
    store.delete_representative(id).await?;
    log::info!("Representative {} removed", rep.code);
    Ok(())
}

/// Look up a representative by code (step one of the intake form).
pub async fn verify_representative<S: DataStore + ?Sized>(
    store: &S,
    code: &str,
) -> Result<Option<Representative>, AdminError> {
    Ok(store.get_representative(code.trim()).await?)
}

fn hash_password(password: &str) -> Result<String, AdminError> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|_| AdminError::Hash)
}

fn password_matches(account: &AdminAccount, password: &str) -> bool {
    let Ok(hash) = PasswordHash::new(&account.password_hash) else {
        log::warn!("Stored password hash for {} is unreadable", account.username);
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &hash)
        .is_ok()
}

/// New admin account data.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct NewAdmin {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub email: String,
}

async fn insert_account<S: DataStore + ?Sized>(
    store: &S,
    new: &NewAdmin,
    is_master: bool,
) -> Result<AdminAccount, AdminError> {
    let username = required(&new.username, "username")?;
    if new.password.is_empty() {
        return Err(AdminError::MissingField("password"));
    }
    if store.get_admin_by_username(&username).await?.is_some() {
        return Err(AdminError::DuplicateUsername);
    }
    let account = AdminAccount {
        id: Uuid::new_v4(),
        username,
        password_hash: hash_password(&new.password)?,
        full_name: new.full_name.trim().to_string(),
        email: new.email.trim().to_string(),
        is_master,
        created_at: Utc::now(),
        last_login: None,
    };
    match store.insert_admin(account.clone()).await {
        Ok(()) => Ok(account),
        Err(StoreError::Conflict(_)) => Err(AdminError::DuplicateUsername),
        Err(e) => Err(e.into()),
    }
}

/// Create a regular (non-master) admin.
pub async fn create_admin<S: DataStore + ?Sized>(store: &S, new: &NewAdmin) -> Result<AdminInfo, AdminError> {
    let account = insert_account(store, new, false).await?;
    log::info!("Admin {} created", account.username);
    Ok(AdminInfo::from(&account))
}

/// Create the master admin if no account with that username exists yet.
pub async fn ensure_master_admin<S: DataStore + ?Sized>(
    store: &S,
    new: &NewAdmin,
) -> Result<AdminInfo, AdminError> {
    if let Some(existing) = store.get_admin_by_username(new.username.trim()).await? {
        return Ok(AdminInfo::from(&existing));
    }
    let account = insert_account(store, new, true).await?;
    log::info!("Master admin {} bootstrapped", account.username);
    Ok(AdminInfo::from(&account))
}

pub async fn list_admins<S: DataStore + ?Sized>(store: &S) -> Result<Vec<AdminInfo>, AdminError> {
    Ok(store.list_admins().await?.iter().map(AdminInfo::from).collect())
}

pub async fn remove_admin<S: DataStore + ?Sized>(store: &S, id: AdminId) -> Result<(), AdminError> {
    let account = store.get_admin(id).await?.ok_or(AdminError::AdminNotFound(id))?;
    if account.is_master {
        return Err(AdminError::MasterAdmin);
    }
    store.delete_admin(id).await?;
    log::info!("Admin {} removed", account.username);
    Ok(())
}

/// Current state of a signed-in admin. Fails once the account has been removed.
pub async fn session_admin<S: DataStore + ?Sized>(store: &S, id: AdminId) -> Result<AdminInfo, AdminError> {
    let account = store.get_admin(id).await?.ok_or(AdminError::AdminNotFound(id))?;
    Ok(AdminInfo::from(&account))
}

/// Check username/password and record the login time.
pub async fn verify_credentials<S: DataStore + ?Sized>(
    store: &S,
    username: &str,
    password: &str,
) -> Result<AdminInfo, AdminError> {
    let mut account = store
        .get_admin_by_username(username.trim())
        .await?
        .ok_or(AdminError::InvalidCredentials)?;
    if !password_matches(&account, password) {
        log::warn!("Failed login for {}", account.username);
        return Err(AdminError::InvalidCredentials);
    }
    account.last_login = Some(Utc::now());
    store.update_admin(&account).await?;
    log::info!("Admin {} logged in", account.username);
    Ok(AdminInfo::from(&account))
}

pub async fn change_password<S: DataStore + ?Sized>(
    store: &S,
    id: AdminId,
    current: &str,
    new_password: &str,
) -> Result<(), AdminError> {
    let mut account = store.get_admin(id).await?.ok_or(AdminError::AdminNotFound(id))?;
    if !password_matches(&account, current) {
        return Err(AdminError::WrongPassword);
    }
    if new_password.is_empty() {
        return Err(AdminError::MissingField("password"));
    }
    account.password_hash = hash_password(new_password)?;
    store.update_admin(&account).await?;
    log::info!("Admin {} changed password", account.username);
    Ok(())
}
