//! Match (game), Stage, and Group for bracket play.

use crate::models::registration::{Category, Sport};
use crate::models::team::TeamId;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Bracket phase this match belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[serde(alias = "grupo")]
    Group,
    Semifinal,
    Final,
    #[serde(alias = "terceiro")]
    ThirdPlace,
}

impl Stage {
    /// Semifinal, final, and third-place matches must produce a winner.
    pub fn is_knockout(self) -> bool {
        !matches!(self, Stage::Group)
    }
}

/// Group letter in a grouped bracket; also tags the two semifinals.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub enum Group {
    A,
    B,
}

impl Group {
    pub fn other(self) -> Group {
        match self {
            Group::A => Group::B,
            Group::B => Group::A,
        }
    }
}

/// When and where a match is played. All fields optional; set by an admin.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchSchedule {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub venue: Option<String>,
}

/// A single game between two (possibly undecided) teams.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    /// None means "to be decided".
    pub team_1: Option<TeamId>,
    pub team_2: Option<TeamId>,
    /// Set only once the match is completed.
    pub score_1: Option<u32>,
    pub score_2: Option<u32>,
    pub stage: Stage,
    pub group: Option<Group>,
    pub completed: bool,
    /// None while pending, or after a group-stage draw.
    pub winner: Option<TeamId>,
    pub sport: Sport,
    pub category: Category,
    #[serde(default)]
    pub schedule: MatchSchedule,
    pub created_at: DateTime<Utc>,
}

impl GameMatch {
    pub fn new(
        sport: Sport,
        category: Category,
        stage: Stage,
        group: Option<Group>,
        team_1: Option<TeamId>,
        team_2: Option<TeamId>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            team_1,
            team_2,
            score_1: None,
            score_2: None,
            stage,
            group,
            completed: false,
            winner: None,
            sport,
            category,
            schedule: MatchSchedule::default(),
            created_at: Utc::now(),
        }
    }

    /// Empty knockout slot awaiting earlier results.
    pub fn placeholder(sport: Sport, category: Category, stage: Stage, group: Option<Group>) -> Self {
        Self::new(sport, category, stage, group, None, None)
    }

    pub fn is_for(&self, sport: Sport, category: Category) -> bool {
        self.sport == sport && self.category == category
    }

    pub fn involves(&self, team: &str) -> bool {
        self.team_1.as_deref() == Some(team) || self.team_2.as_deref() == Some(team)
    }

    /// The team that did not win, if the match is completed with a winner and both slots were filled.
    pub fn loser(&self) -> Option<&TeamId> {
        let winner = self.winner.as_ref()?;
        if self.team_1.as_ref() == Some(winner) {
            self.team_2.as_ref()
        } else {
            self.team_1.as_ref()
        }
    }
}
