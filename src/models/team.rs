//! Team: derived aggregate of one or more registrations sharing a grouping key.

use crate::models::player::Player;
use crate::models::registration::{Category, Sport};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Deterministic team id, e.g. `volleyball-ds-ams-female`.
pub type TeamId = String;

/// A team is never stored: it is recomputed from registrations on every read.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub display_name: String,
    /// Names of the representatives whose registrations make up this team.
    pub representatives: Vec<String>,
    pub roster: Vec<Player>,
    pub sport: Sport,
    pub category: Category,
}

impl Team {
    pub fn new(id: TeamId, display_name: impl Into<String>, sport: Sport, category: Category) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            representatives: Vec::new(),
            roster: Vec::new(),
            sport,
            category,
        }
    }

    /// Add a representative and their players; players whose normalized name is
    /// already on the roster are skipped (the first one seen stays).
    pub fn merge(&mut self, representative: &str, players: &[Player]) {
        self.representatives.push(representative.to_string());
        for p in players {
            if p.is_blank() {
                continue;
            }
            let key = p.normalized_name();
            if !self.roster.iter().any(|q| q.normalized_name() == key) {
                self.roster.push(p.clone());
            }
        }
    }
}

/// Teams per sport and category. Every sport/category pair is present, possibly empty.
pub type TeamsByDivision = BTreeMap<Sport, BTreeMap<Category, Vec<Team>>>;

/// Teams for one sport/category (empty slice if none).
pub fn teams_for(teams: &TeamsByDivision, sport: Sport, category: Category) -> &[Team] {
    teams
        .get(&sport)
        .and_then(|by_cat| by_cat.get(&category))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Lowercase and collapse whitespace runs into single hyphens.
pub fn normalize_key(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}
