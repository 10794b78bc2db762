//! Sport, Category, and Registration (one representative's roster for one sport/category).

use crate::models::player::Player;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a registration record.
pub type RegistrationId = Uuid;

/// Sport a team is registered for.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sport {
    #[serde(alias = "volei")]
    Volleyball,
    #[serde(alias = "handebol")]
    Handball,
    Futsal,
}

impl Sport {
    pub const ALL: [Sport; 3] = [Sport::Volleyball, Sport::Handball, Sport::Futsal];

    pub fn as_str(self) -> &'static str {
        match self {
            Sport::Volleyball => "volleyball",
            Sport::Handball => "handball",
            Sport::Futsal => "futsal",
        }
    }

    /// Human label used in exports.
    pub fn label(self) -> &'static str {
        match self {
            Sport::Volleyball => "Volleyball",
            Sport::Handball => "Handball",
            Sport::Futsal => "Futsal",
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sport {
    type Err = MalformedRow;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "volleyball" | "volei" => Ok(Sport::Volleyball),
            "handball" | "handebol" => Ok(Sport::Handball),
            "futsal" => Ok(Sport::Futsal),
            other => Err(MalformedRow::UnknownSport(other.to_string())),
        }
    }
}

/// Competitive division.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[serde(alias = "feminino")]
    Female,
    #[serde(alias = "masculino")]
    Male,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Female, Category::Male];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Female => "female",
            Category::Male => "male",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Female => "Female",
            Category::Male => "Male",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = MalformedRow;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "female" | "feminino" => Ok(Category::Female),
            "male" | "masculino" => Ok(Category::Male),
            other => Err(MalformedRow::UnknownCategory(other.to_string())),
        }
    }
}

/// Why a raw registration row was dropped at the store boundary.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum MalformedRow {
    #[error("unknown sport '{0}'")]
    UnknownSport(String),
    #[error("unknown category '{0}'")]
    UnknownCategory(String),
    #[error("unreadable roster: {0}")]
    Roster(String),
    #[error("unreadable submission time '{0}'")]
    SubmittedAt(String),
}

/// A validated registration: one representative's roster for one sport and category.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub id: RegistrationId,
    /// Code of the submitting representative (school enrolment number).
    pub representative_id: String,
    pub representative_name: String,
    /// School-year grouping, e.g. "3°".
    pub year: String,
    /// Course code, e.g. "DS-AMS".
    pub course: String,
    pub sport: Sport,
    pub category: Category,
    pub roster: Vec<Player>,
    pub submitted_at: DateTime<Utc>,
}

impl Registration {
    /// Loosely-typed form of this registration, as the store holds it.
    pub fn to_row(&self) -> RegistrationRow {
        RegistrationRow {
            id: self.id,
            representative_id: self.representative_id.clone(),
            representative_name: self.representative_name.clone(),
            year: self.year.clone(),
            course: self.course.clone(),
            sport: self.sport.as_str().to_string(),
            category: self.category.as_str().to_string(),
            // Player is a plain struct of a string and a bool; serialising it cannot fail.
            roster: serde_json::to_value(&self.roster).unwrap_or_default(),
            submitted_at: self.submitted_at.to_rfc3339(),
        }
    }
}

/// Registration as stored by the external data store: nothing beyond the field names is trusted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegistrationRow {
    #[serde(default = "Uuid::new_v4")]
    pub id: RegistrationId,
    pub representative_id: String,
    pub representative_name: String,
    pub year: String,
    pub course: String,
    pub sport: String,
    pub category: String,
    #[serde(default)]
    pub roster: serde_json::Value,
    pub submitted_at: String,
}

impl TryFrom<&RegistrationRow> for Registration {
    type Error = MalformedRow;

    fn try_from(row: &RegistrationRow) -> Result<Self, Self::Error> {
        let sport: Sport = row.sport.parse()?;
        let category: Category = row.category.parse()?;
        let roster: Vec<Player> = serde_json::from_value(row.roster.clone())
            .map_err(|e| MalformedRow::Roster(e.to_string()))?;
        let submitted_at = DateTime::parse_from_rfc3339(&row.submitted_at)
            .map_err(|_| MalformedRow::SubmittedAt(row.submitted_at.clone()))?
            .with_timezone(&Utc);
        Ok(Registration {
            id: row.id,
            representative_id: row.representative_id.clone(),
            representative_name: row.representative_name.clone(),
            year: row.year.clone(),
            course: row.course.clone(),
            sport,
            category,
            roster,
            submitted_at,
        })
    }
}

/// Convert store rows into registrations, dropping (and logging) rows that do not parse.
pub fn parse_registrations(rows: &[RegistrationRow]) -> Vec<Registration> {
    rows.iter()
        .filter_map(|row| match Registration::try_from(row) {
            Ok(r) => Some(r),
            Err(e) => {
                log::debug!("Skipping registration row {}: {}", row.id, e);
                None
            }
        })
        .collect()
}
