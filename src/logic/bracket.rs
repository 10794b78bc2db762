//! Bracket generation: initial matches for one sport/category.

use crate::models::{Category, GameMatch, Group, Sport, Stage, Team, TeamId};
use crate::store::{DataStore, MatchFilter, StoreError};
use rand::seq::SliceRandom;
use rand::Rng;

/// Largest team count played as a direct knockout (two semifinals).
pub const DIRECT_KNOCKOUT_MAX: usize = 4;

/// Errors that can occur while generating a bracket.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum BracketError {
    #[error("Matches have already been generated for this sport and category")]
    AlreadyGenerated,
    #[error("Not enough teams to generate a bracket (need at least 2)")]
    InsufficientTeams,
    #[error("Failed to save the bracket")]
    Store(#[from] StoreError),
}

/// Build the initial matches for `teams` after shuffling them with `rng`.
///
/// - Up to 4 teams: semifinal A (team 0 vs 1), semifinal B (team 2 vs 3), final, third place.
///   Missing teams are empty slots (byes).
/// - More: group A takes the first `ceil(n/2)` shuffled teams, group B the rest; a full
///   round robin in each group, then empty semifinals A/B, final, and third place.
pub fn plan_bracket<R: Rng + ?Sized>(
    sport: Sport,
    category: Category,
    teams: &[Team],
    rng: &mut R,
) -> Result<Vec<GameMatch>, BracketError> {
    if teams.len() < 2 {
        return Err(BracketError::InsufficientTeams);
    }
    let mut ids: Vec<TeamId> = teams.iter().map(|t| t.id.clone()).collect();
    ids.shuffle(rng);

    let mut matches = Vec::new();
    let n = ids.len();

    if n <= DIRECT_KNOCKOUT_MAX {
        let slot = |i: usize| ids.get(i).cloned();
        matches.push(GameMatch::new(sport, category, Stage::Semifinal, Some(Group::A), slot(0), slot(1)));
        matches.push(GameMatch::new(sport, category, Stage::Semifinal, Some(Group::B), slot(2), slot(3)));
    } else {
        let (group_a, group_b) = ids.split_at(n.div_ceil(2));
        for (group, members) in [(Group::A, group_a), (Group::B, group_b)] {
            for (i, home) in members.iter().enumerate() {
                for away in &members[i + 1..] {
                    matches.push(GameMatch::new(
                        sport,
                        category,
                        Stage::Group,
                        Some(group),
                        Some(home.clone()),
                        Some(away.clone()),
                    ));
                }
            }
        }
        matches.push(GameMatch::placeholder(sport, category, Stage::Semifinal, Some(Group::A)));
        matches.push(GameMatch::placeholder(sport, category, Stage::Semifinal, Some(Group::B)));
    }

    matches.push(GameMatch::placeholder(sport, category, Stage::Final, None));
    matches.push(GameMatch::placeholder(sport, category, Stage::ThirdPlace, None));
    Ok(matches)
}

/// Generate and store the bracket for one sport/category.
///
/// Refuses if any match already exists for the pair, then if there are fewer than two
/// teams. The matches are inserted as a single all-or-nothing batch; two racing calls
/// are separated by the store's knockout-slot uniqueness constraint.
pub async fn generate_bracket<S: DataStore + ?Sized>(
    store: &S,
    sport: Sport,
    category: Category,
    teams: &[Team],
) -> Result<Vec<GameMatch>, BracketError> {
    let existing = store
        .list_matches(MatchFilter::division(sport, category))
        .await?;
    if !existing.is_empty() {
        log::warn!("Bracket for {sport} {category} already generated ({} matches)", existing.len());
        return Err(BracketError::AlreadyGenerated);
    }

    let matches = plan_bracket(sport, category, teams, &mut rand::thread_rng())?;
    match store.insert_matches(matches.clone()).await {
        Ok(()) => {}
        // Lost a race with another generation for the same pair.
        Err(StoreError::Conflict(detail)) => {
            log::warn!("Bracket insert for {sport} {category} conflicted: {detail}");
            return Err(BracketError::AlreadyGenerated);
        }
        Err(e) => {
            log::warn!("Inserting bracket for {sport} {category} failed: {e}");
            return Err(e.into());
        }
    }
    log::info!(
        "Generated {} matches for {sport} {category} from {} teams",
        matches.len(),
        teams.len()
    );
    Ok(matches)
}
