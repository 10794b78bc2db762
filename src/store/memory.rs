//! In-memory data store for the single-binary deployment and for tests.

use super::{DataStore, MatchFilter, StoreError};
use crate::models::{
    AdminAccount, AdminId, Category, GameMatch, Group, MatchId, Registration, RegistrationRow,
    Representative, RepresentativeId, Sport, Stage,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Tables {
    registrations: Vec<RegistrationRow>,
    matches: Vec<GameMatch>,
    representatives: Vec<Representative>,
    admins: Vec<AdminAccount>,
}

/// Knockout slots are unique per division: a second bracket for the same
/// sport/category always collides on at least the final.
type SlotKey = (Sport, Category, Stage, Option<Group>);

fn slot_key(m: &GameMatch) -> Option<SlotKey> {
    m.stage
        .is_knockout()
        .then_some((m.sport, m.category, m.stage, m.group))
}

/// Data store backed by `RwLock`-guarded vectors.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::Unavailable("lock error".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::Unavailable("lock error".into()))
    }
}

fn submitted_at(row: &RegistrationRow) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&row.submitted_at)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Same conflict key as the hosted table: (representative, sport, category).
fn same_entry(row: &RegistrationRow, r: &Registration) -> bool {
    row.representative_id == r.representative_id
        && row.sport.parse::<Sport>().ok() == Some(r.sport)
        && row.category.parse::<Category>().ok() == Some(r.category)
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn list_registrations(&self) -> Result<Vec<RegistrationRow>, StoreError> {
        let mut rows = self.read()?.registrations.clone();
        // Newest first; unparseable timestamps sort last.
        rows.sort_by(|a, b| submitted_at(b).cmp(&submitted_at(a)));
        Ok(rows)
    }

    async fn upsert_registration(&self, registration: &Registration) -> Result<Registration, StoreError> {
        let mut g = self.write()?;
        let mut stored = registration.clone();
        match g.registrations.iter_mut().find(|row| same_entry(row, registration)) {
            Some(row) => {
                stored.id = row.id;
                *row = stored.to_row();
            }
            None => g.registrations.push(stored.to_row()),
        }
        Ok(stored)
    }

    async fn import_registrations(&self, rows: Vec<RegistrationRow>) -> Result<usize, StoreError> {
        let mut g = self.write()?;
        let n = rows.len();
        g.registrations.extend(rows);
        Ok(n)
    }

    async fn list_matches(&self, filter: MatchFilter) -> Result<Vec<GameMatch>, StoreError> {
        let mut matches: Vec<GameMatch> = self
            .read()?
            .matches
            .iter()
            .filter(|m| filter.accepts(m))
            .cloned()
            .collect();
        // Stable: unscheduled matches keep creation order, after scheduled ones.
        matches.sort_by_key(|m| (m.schedule.date.is_none(), m.schedule.date, m.schedule.time));
        Ok(matches)
    }

    async fn get_match(&self, id: MatchId) -> Result<Option<GameMatch>, StoreError> {
        Ok(self.read()?.matches.iter().find(|m| m.id == id).cloned())
    }

    async fn insert_matches(&self, matches: Vec<GameMatch>) -> Result<(), StoreError> {
        let mut g = self.write()?;
        let mut taken: HashSet<SlotKey> = g.matches.iter().filter_map(slot_key).collect();
        let mut ids: HashSet<MatchId> = g.matches.iter().map(|m| m.id).collect();
        for m in &matches {
            if !ids.insert(m.id) {
                return Err(StoreError::Conflict(format!("duplicate match id {}", m.id)));
            }
            if let Some(key) = slot_key(m) {
                if !taken.insert(key) {
                    return Err(StoreError::Conflict(format!(
                        "{:?} slot already exists for {} {}",
                        m.stage, m.sport, m.category
                    )));
                }
            }
        }
        g.matches.extend(matches);
        Ok(())
    }

    async fn update_match(&self, m: &GameMatch) -> Result<(), StoreError> {
        let mut g = self.write()?;
        let slot = g
            .matches
            .iter_mut()
            .find(|x| x.id == m.id)
            .ok_or_else(|| StoreError::NotFound(format!("match {}", m.id)))?;
        *slot = m.clone();
        Ok(())
    }

    async fn list_representatives(&self) -> Result<Vec<Representative>, StoreError> {
        let mut reps = self.read()?.representatives.clone();
        reps.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(reps)
    }

    async fn get_representative(&self, code: &str) -> Result<Option<Representative>, StoreError> {
        Ok(self
            .read()?
            .representatives
            .iter()
            .find(|r| r.code == code)
            .cloned())
    }

    async fn insert_representative(&self, rep: Representative) -> Result<(), StoreError> {
        let mut g = self.write()?;
        if g.representatives.iter().any(|r| r.code == rep.code) {
            return Err(StoreError::Conflict(format!("representative {}", rep.code)));
        }
        g.representatives.push(rep);
        Ok(())
    }

    async fn delete_representative(&self, id: RepresentativeId) -> Result<Option<Representative>, StoreError> {
        let mut g = self.write()?;
        let idx = g.representatives.iter().position(|r| r.id == id);
        Ok(idx.map(|i| g.representatives.remove(i)))
    }

    async fn list_admins(&self) -> Result<Vec<AdminAccount>, StoreError> {
        let mut admins = self.read()?.admins.clone();
        admins.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(admins)
    }

    async fn get_admin(&self, id: AdminId) -> Result<Option<AdminAccount>, StoreError> {
        Ok(self.read()?.admins.iter().find(|a| a.id == id).cloned())
    }

    async fn get_admin_by_username(&self, username: &str) -> Result<Option<AdminAccount>, StoreError> {
        Ok(self
            .read()?
            .admins
            .iter()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn insert_admin(&self, admin: AdminAccount) -> Result<(), StoreError> {
        let mut g = self.write()?;
        if g.admins.iter().any(|a| a.username == admin.username) {
            return Err(StoreError::Conflict(format!("admin {}", admin.username)));
        }
        g.admins.push(admin);
        Ok(())
    }

    async fn update_admin(&self, admin: &AdminAccount) -> Result<(), StoreError> {
        let mut g = self.write()?;
        let slot = g
            .admins
            .iter_mut()
            .find(|a| a.id == admin.id)
            .ok_or_else(|| StoreError::NotFound(format!("admin {}", admin.id)))?;
        *slot = admin.clone();
        Ok(())
    }

    async fn delete_admin(&self, id: AdminId) -> Result<(), StoreError> {
        let mut g = self.write()?;
        let before = g.admins.len();
        g.admins.retain(|a| a.id != id);
        if g.admins.len() == before {
            return Err(StoreError::NotFound(format!("admin {id}")));
        }
        Ok(())
    }
}
