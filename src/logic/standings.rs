//! Group stage standings.

use crate::models::{GameMatch, Group, Stage, TeamId};
use serde::Serialize;
use std::collections::BTreeMap;

pub const POINTS_WIN: u32 = 3;
pub const POINTS_DRAW: u32 = 1;

/// One team's line in a group table.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct StandingRow {
    pub team: TeamId,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub points: u32,
}

impl StandingRow {
    fn new(team: TeamId) -> Self {
        Self {
            team,
            ..Self::default()
        }
    }

    pub fn goal_difference(&self) -> i64 {
        i64::from(self.goals_for) - i64::from(self.goals_against)
    }

    fn record(&mut self, scored: u32, conceded: u32) {
        self.played += 1;
        self.goals_for = self.goals_for.saturating_add(scored);
        self.goals_against = self.goals_against.saturating_add(conceded);
        if scored > conceded {
            self.won += 1;
            self.points += POINTS_WIN;
        } else if scored == conceded {
            self.drawn += 1;
            self.points += POINTS_DRAW;
        } else {
            self.lost += 1;
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct GroupStanding {
    pub group: Group,
    pub rows: Vec<StandingRow>,
}

/// Tables for every group appearing in `matches` (other stages are ignored).
///
/// Every team scheduled in a group is listed, played or not. Rows are ordered by
/// points, goal difference, goals scored (all descending), then team id.
pub fn group_standings(matches: &[GameMatch]) -> Vec<GroupStanding> {
    let mut groups: BTreeMap<Group, BTreeMap<TeamId, StandingRow>> = BTreeMap::new();

    for m in matches.iter().filter(|m| m.stage == Stage::Group) {
        let Some(group) = m.group else { continue };
        let table = groups.entry(group).or_default();
        for team in m.team_1.iter().chain(m.team_2.iter()) {
            table
                .entry(team.clone())
                .or_insert_with(|| StandingRow::new(team.clone()));
        }
        let (Some(t1), Some(t2), Some(s1), Some(s2)) = (&m.team_1, &m.team_2, m.score_1, m.score_2) else {
            continue;
        };
        if !m.completed {
            continue;
        }
        if let Some(row) = table.get_mut(t1) {
            row.record(s1, s2);
        }
        if let Some(row) = table.get_mut(t2) {
            row.record(s2, s1);
        }
    }

    groups
        .into_iter()
        .map(|(group, table)| {
            let mut rows: Vec<StandingRow> = table.into_values().collect();
            rows.sort_by(|a, b| {
                b.points
                    .cmp(&a.points)
                    .then_with(|| b.goal_difference().cmp(&a.goal_difference()))
                    .then_with(|| b.goals_for.cmp(&a.goals_for))
                    .then_with(|| a.team.cmp(&b.team))
            });
            GroupStanding { group, rows }
        })
        .collect()
}
