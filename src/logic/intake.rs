//! Registration intake: roster validation and the step-by-step form a representative fills in.

use crate::models::{normalize_name, Category, Player, Registration, Representative, Sport};
use crate::store::{DataStore, StoreError};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

pub const MIN_PLAYERS: usize = 5;
pub const MAX_PLAYERS: usize = 12;

/// Errors that can occur while filling in or submitting a registration.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum RegistrationError {
    #[error("At least 5 players are required")]
    TooFewPlayers,
    #[error("At most 12 players are allowed")]
    TooManyPlayers,
    #[error("Duplicate player name: {0}")]
    DuplicateName(String),
    #[error("Exactly one captain must be selected (found {0})")]
    CaptainCount(usize),
    #[error("Representative code not found")]
    RepresentativeNotFound,
    #[error("This action is not available at the current step")]
    InvalidStep,
    #[error("Saved form could not be read")]
    Blob(String),
    #[error("Failed to save the registration")]
    Store(#[from] StoreError),
}

/// Check a submitted roster and return it cleaned up.
///
/// Blank entries (unused slots) are dropped and names trimmed. The remaining roster
/// must hold 5 to 12 players with distinct names (case-insensitive) and exactly one captain.
pub fn validate_roster(players: &[Player]) -> Result<Vec<Player>, RegistrationError> {
    let roster: Vec<Player> = players
        .iter()
        .filter(|p| !p.is_blank())
        .map(|p| Player {
            name: p.name.trim().to_string(),
            is_captain: p.is_captain,
        })
        .collect();

    if roster.len() < MIN_PLAYERS {
        return Err(RegistrationError::TooFewPlayers);
    }
    if roster.len() > MAX_PLAYERS {
        return Err(RegistrationError::TooManyPlayers);
    }
    let mut names = HashSet::new();
    for p in &roster {
        if !names.insert(normalize_name(&p.name)) {
            return Err(RegistrationError::DuplicateName(p.name.clone()));
        }
    }
    let captains = roster.iter().filter(|p| p.is_captain).count();
    if captains != 1 {
        return Err(RegistrationError::CaptainCount(captains));
    }
    Ok(roster)
}

/// Validate and store a registration. Replaces the representative's earlier
/// registration for the same sport and category, if any.
pub async fn submit_registration<S: DataStore + ?Sized>(
    store: &S,
    representative: &Representative,
    sport: Sport,
    category: Category,
    players: &[Player],
) -> Result<Registration, RegistrationError> {
    let roster = validate_roster(players)?;
    let registration = Registration {
        id: Uuid::new_v4(),
        representative_id: representative.code.clone(),
        representative_name: representative.name.clone(),
        year: representative.year.clone(),
        course: representative.course.clone(),
        sport,
        category,
        roster,
        submitted_at: Utc::now(),
    };
    let stored = store.upsert_registration(&registration).await?;
    log::info!(
        "Registration {} saved: {} {} for {} {}",
        stored.id,
        sport,
        category,
        stored.year,
        stored.course
    );
    Ok(stored)
}

/// Where the representative is in the intake form.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeStep {
    /// Entering the representative code.
    #[default]
    Identify,
    /// Checking the class data found for the code.
    Confirm,
    /// Choosing sport, category, and players.
    Roster,
    /// Registration stored.
    Submitted,
}

/// Intake form state. The client keeps it (see [`IntakeForm::to_blob`]) and sends it back with each action.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct IntakeForm {
    pub step: IntakeStep,
    pub representative: Option<Representative>,
    pub sport: Option<Sport>,
    pub category: Option<Category>,
    #[serde(default)]
    pub roster: Vec<Player>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum IntakeAction {
    Identify { code: String },
    Confirm,
    Back,
    Submit {
        sport: Sport,
        category: Category,
        players: Vec<Player>,
    },
    Reset,
}

impl IntakeForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opaque string for client-side storage.
    pub fn to_blob(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn from_blob(blob: &str) -> Result<Self, RegistrationError> {
        serde_json::from_str(blob).map_err(|e| RegistrationError::Blob(e.to_string()))
    }

    /// Apply `action` and return the next state. `self` is left untouched on error.
    pub async fn advance<S: DataStore + ?Sized>(
        &self,
        store: &S,
        action: IntakeAction,
    ) -> Result<IntakeForm, RegistrationError> {
        use IntakeStep::*;
        match (self.step, action) {
            (_, IntakeAction::Reset) => Ok(IntakeForm::new()),
            (Identify, IntakeAction::Identify { code }) => {
                let rep = store
                    .get_representative(code.trim())
                    .await?
                    .ok_or(RegistrationError::RepresentativeNotFound)?;
                Ok(IntakeForm {
                    step: Confirm,
                    representative: Some(rep),
                    ..self.clone()
                })
            }
            (Confirm, IntakeAction::Confirm) => Ok(IntakeForm {
                step: Roster,
                ..self.clone()
            }),
            (Confirm, IntakeAction::Back) => Ok(IntakeForm {
                step: Identify,
                representative: None,
                ..self.clone()
            }),
            (Roster, IntakeAction::Back) => Ok(IntakeForm {
                step: Confirm,
                ..self.clone()
            }),
            (Roster, IntakeAction::Submit { sport, category, players }) => {
                let code = self
                    .representative
                    .as_ref()
                    .map(|r| r.code.as_str())
                    .ok_or(RegistrationError::InvalidStep)?;
                // The form comes back from the client; only the stored record is trusted.
                let rep = store
                    .get_representative(code)
                    .await?
                    .ok_or(RegistrationError::RepresentativeNotFound)?;
                let stored = submit_registration(store, &rep, sport, category, &players).await?;
                Ok(IntakeForm {
                    step: Submitted,
                    representative: Some(rep),
                    sport: Some(sport),
                    category: Some(category),
                    roster: stored.roster,
                })
            }
            _ => Err(RegistrationError::InvalidStep),
        }
    }
}
