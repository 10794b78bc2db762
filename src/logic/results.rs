//! Score recording, manual slot assignment, and knockout progression.

use crate::logic::standings::group_standings;
use crate::models::{Category, GameMatch, Group, MatchId, MatchSchedule, Sport, Stage, Team, TeamId};
use crate::store::{DataStore, MatchFilter, StoreError};
use serde::Deserialize;
use std::cmp::Ordering;

/// Errors from recording results or moving teams through the bracket.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ResultError {
    #[error("Match not found")]
    MatchNotFound(MatchId),
    #[error("Both teams of this match are still undecided")]
    NoTeams,
    #[error("An empty slot cannot win a match")]
    EmptySlotCannotWin,
    #[error("Knockout matches cannot end in a draw")]
    TieInKnockout,
    #[error("Teams of a completed match cannot be changed")]
    TeamsLocked,
    #[error("A team cannot play against itself")]
    SameTeam,
    #[error("Team {0} is not registered for this sport and category")]
    UnknownTeam(TeamId),
    #[error("This bracket has no group stage")]
    NotGrouped,
    #[error("Not all group matches are completed")]
    GroupStageIncomplete,
    #[error("Not all semifinals are completed")]
    SemifinalsIncomplete,
    #[error("Teams from this match have already moved on in the bracket")]
    AlreadyAdvanced,
    #[error("Failed to save the match")]
    Store(#[from] StoreError),
}

/// Set the score of `m`, mark it completed, and set the winner.
///
/// The side with the strictly higher score wins. Group matches may end level (draw,
/// no winner); knockout matches may not. A bye is resolved by scoring the present team
/// higher: the empty side can never win.
pub fn apply_score(m: &mut GameMatch, score_1: u32, score_2: u32) -> Result<(), ResultError> {
    if m.team_1.is_none() && m.team_2.is_none() {
        return Err(ResultError::NoTeams);
    }
    let winner = match score_1.cmp(&score_2) {
        Ordering::Greater => Some(m.team_1.clone().ok_or(ResultError::EmptySlotCannotWin)?),
        Ordering::Less => Some(m.team_2.clone().ok_or(ResultError::EmptySlotCannotWin)?),
        Ordering::Equal if m.stage.is_knockout() => return Err(ResultError::TieInKnockout),
        Ordering::Equal => None,
    };
    m.score_1 = Some(score_1);
    m.score_2 = Some(score_2);
    m.completed = true;
    m.winner = winner;
    Ok(())
}

async fn load_match<S: DataStore + ?Sized>(store: &S, id: MatchId) -> Result<GameMatch, ResultError> {
    store
        .get_match(id)
        .await?
        .ok_or(ResultError::MatchNotFound(id))
}

/// Refuse to re-score a completed match whose outcome has already been carried forward.
///
/// Group scores are final once any semifinal holds a team of that group. A semifinal
/// may be corrected as long as its winner stays the same.
pub fn check_rescore(
    previous: &GameMatch,
    rescored: &GameMatch,
    division: &[GameMatch],
) -> Result<(), ResultError> {
    if !previous.completed {
        return Ok(());
    }
    let placed = |stages: &[Stage], teams: &[&TeamId]| {
        division
            .iter()
            .filter(|d| stages.contains(&d.stage))
            .any(|d| d.team_1.iter().chain(d.team_2.iter()).any(|t| teams.contains(&t)))
    };
    let advanced = match previous.stage {
        Stage::Group => {
            let group_teams: Vec<&TeamId> = division
                .iter()
                .filter(|d| d.stage == Stage::Group && d.group == previous.group)
                .flat_map(|d| d.team_1.iter().chain(d.team_2.iter()))
                .collect();
            placed(&[Stage::Semifinal], &group_teams)
        }
        Stage::Semifinal if previous.winner != rescored.winner => {
            let teams: Vec<&TeamId> = previous.team_1.iter().chain(previous.team_2.iter()).collect();
            placed(&[Stage::Final, Stage::ThirdPlace], &teams)
        }
        _ => false,
    };
    if advanced {
        log::warn!("Refused to re-score {:?} match {}: already carried forward", previous.stage, previous.id);
        return Err(ResultError::AlreadyAdvanced);
    }
    Ok(())
}

/// Record a final score for a stored match.
pub async fn record_result<S: DataStore + ?Sized>(
    store: &S,
    id: MatchId,
    score_1: u32,
    score_2: u32,
) -> Result<GameMatch, ResultError> {
    let mut m = load_match(store, id).await?;
    let previous = m.clone();
    apply_score(&mut m, score_1, score_2)?;
    if previous.completed {
        let division = store
            .list_matches(MatchFilter::division(m.sport, m.category))
            .await?;
        check_rescore(&previous, &m, &division)?;
    }
    store.update_match(&m).await?;
    log::info!(
        "Recorded {score_1}x{score_2} for {:?} match {} ({} {})",
        m.stage,
        m.id,
        m.sport,
        m.category
    );
    Ok(m)
}

/// Admin edit of a match: slot assignment and schedule.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MatchDetails {
    pub team_1: Option<TeamId>,
    pub team_2: Option<TeamId>,
    #[serde(default)]
    pub schedule: MatchSchedule,
}

/// Assign teams and schedule to a match. `teams` are the teams of the match's sport/category.
pub async fn update_details<S: DataStore + ?Sized>(
    store: &S,
    id: MatchId,
    details: MatchDetails,
    teams: &[Team],
) -> Result<GameMatch, ResultError> {
    let mut m = load_match(store, id).await?;
    if m.completed && (m.team_1 != details.team_1 || m.team_2 != details.team_2) {
        return Err(ResultError::TeamsLocked);
    }
    for team in details.team_1.iter().chain(details.team_2.iter()) {
        if !teams.iter().any(|t| &t.id == team) {
            return Err(ResultError::UnknownTeam(team.clone()));
        }
    }
    if details.team_1.is_some() && details.team_1 == details.team_2 {
        return Err(ResultError::SameTeam);
    }
    m.team_1 = details.team_1;
    m.team_2 = details.team_2;
    m.schedule = details.schedule;
    store.update_match(&m).await?;
    Ok(m)
}

/// Fill `slot` only if it is still empty. Returns whether it changed.
fn fill(slot: &mut Option<TeamId>, team: Option<&TeamId>) -> bool {
    match (slot.as_ref(), team) {
        (None, Some(t)) => {
            *slot = Some(t.clone());
            true
        }
        _ => false,
    }
}

fn find_mut(matches: &mut [GameMatch], stage: Stage, group: Option<Group>) -> Option<&mut GameMatch> {
    matches
        .iter_mut()
        .find(|m| m.stage == stage && (group.is_none() || m.group == group))
}

/// Fill empty semifinal slots from final group standings:
/// semifinal A is 1st of A vs 2nd of B, semifinal B is 1st of B vs 2nd of A.
///
/// Returns the ids of matches that changed.
pub fn seed_semifinals_in(matches: &mut [GameMatch]) -> Result<Vec<MatchId>, ResultError> {
    let group_matches: Vec<&GameMatch> = matches.iter().filter(|m| m.stage == Stage::Group).collect();
    if group_matches.is_empty() {
        return Err(ResultError::NotGrouped);
    }
    if group_matches.iter().any(|m| !m.completed) {
        return Err(ResultError::GroupStageIncomplete);
    }

    let standings = group_standings(matches);
    let place = |group: Group, i: usize| {
        standings
            .iter()
            .find(|s| s.group == group)
            .and_then(|s| s.rows.get(i))
            .map(|r| r.team.clone())
    };
    let mut changed = Vec::new();
    for group in [Group::A, Group::B] {
        let first = place(group, 0);
        let second_other = place(group.other(), 1);
        if let Some(semi) = find_mut(matches, Stage::Semifinal, Some(group)) {
            let a = fill(&mut semi.team_1, first.as_ref());
            let b = fill(&mut semi.team_2, second_other.as_ref());
            if a || b {
                changed.push(semi.id);
            }
        }
    }
    Ok(changed)
}

/// Fill the final with the semifinal winners and the third-place match with the losers.
/// Teams already in the match are skipped; the rest take the first empty slots.
///
/// A semifinal with no teams at all is skipped; every other semifinal must be completed.
/// Returns the ids of matches that changed.
pub fn advance_knockout_in(matches: &mut [GameMatch]) -> Result<Vec<MatchId>, ResultError> {
    let mut winners: Vec<Option<TeamId>> = Vec::new();
    let mut losers: Vec<Option<TeamId>> = Vec::new();
    for group in [Group::A, Group::B] {
        let Some(semi) = matches
            .iter()
            .find(|m| m.stage == Stage::Semifinal && m.group == Some(group))
        else {
            continue;
        };
        if semi.team_1.is_none() && semi.team_2.is_none() {
            continue;
        }
        if !semi.completed {
            return Err(ResultError::SemifinalsIncomplete);
        }
        winners.push(semi.winner.clone());
        losers.push(semi.loser().cloned());
    }

    let mut changed = Vec::new();
    let slots = [(Stage::Final, winners), (Stage::ThirdPlace, losers)];
    for (stage, teams) in slots {
        let Some(m) = find_mut(matches, stage, None) else {
            continue;
        };
        let mut filled = false;
        for team in teams.into_iter().flatten() {
            if m.involves(&team) {
                continue;
            }
            // First empty slot; a team placed by hand keeps its seat.
            filled |= fill(&mut m.team_1, Some(&team)) || fill(&mut m.team_2, Some(&team));
        }
        if filled {
            changed.push(m.id);
        }
    }
    Ok(changed)
}

async fn apply_to_division<S, F>(
    store: &S,
    sport: Sport,
    category: Category,
    step: F,
) -> Result<Vec<GameMatch>, ResultError>
where
    S: DataStore + ?Sized,
    F: FnOnce(&mut [GameMatch]) -> Result<Vec<MatchId>, ResultError>,
{
    let mut matches = store
        .list_matches(MatchFilter::division(sport, category))
        .await?;
    let changed = step(matches.as_mut_slice())?;
    let mut updated = Vec::new();
    for m in matches.into_iter().filter(|m| changed.contains(&m.id)) {
        store.update_match(&m).await?;
        updated.push(m);
    }
    Ok(updated)
}

/// Seed the semifinals of a grouped bracket from the group standings.
pub async fn seed_semifinals<S: DataStore + ?Sized>(
    store: &S,
    sport: Sport,
    category: Category,
) -> Result<Vec<GameMatch>, ResultError> {
    let updated = apply_to_division(store, sport, category, seed_semifinals_in).await?;
    log::info!("Seeded {} semifinal(s) for {sport} {category}", updated.len());
    Ok(updated)
}

/// Move semifinal winners and losers into the final and third-place match.
pub async fn advance_knockout<S: DataStore + ?Sized>(
    store: &S,
    sport: Sport,
    category: Category,
) -> Result<Vec<GameMatch>, ResultError> {
    let updated = apply_to_division(store, sport, category, advance_knockout_in).await?;
    log::info!("Advanced knockout for {sport} {category}: {} match(es) filled", updated.len());
    Ok(updated)
}
