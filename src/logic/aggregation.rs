//! Team aggregation: fold registrations into teams per sport and category.

use crate::models::{
    normalize_key, parse_registrations, Category, Registration, Sport, Team, TeamsByDivision,
};
use crate::store::{DataStore, StoreError};
use std::collections::{BTreeMap, HashMap};

/// Year whose two DS tracks play futsal as one team.
pub const MERGED_FUTSAL_YEAR: &str = "3°";
/// Sibling course codes merged into one futsal team in [`MERGED_FUTSAL_YEAR`].
pub const MERGED_FUTSAL_COURSES: [&str; 2] = ["DS-AMS", "DS-PI"];
pub const MERGED_FUTSAL_NAME: &str = "DS 3° Ano";

/// Id of the merged futsal team for a category.
pub fn merged_futsal_team_id(category: Category) -> String {
    format!("futsal-3rdyear-merged-{category}")
}

fn is_merged_futsal(r: &Registration) -> bool {
    r.sport == Sport::Futsal
        && r.year == MERGED_FUTSAL_YEAR
        && MERGED_FUTSAL_COURSES.contains(&r.course.as_str())
}

/// Team id and display name a registration belongs to.
fn grouping(r: &Registration) -> (String, String) {
    if is_merged_futsal(r) {
        return (merged_futsal_team_id(r.category), MERGED_FUTSAL_NAME.to_string());
    }
    match r.sport {
        // Cross-course: every year of a course plays together.
        Sport::Volleyball | Sport::Handball => (
            format!("{}-{}-{}", r.sport, normalize_key(&r.course), r.category),
            r.course.clone(),
        ),
        // Per class: year + course.
        Sport::Futsal => (
            format!("futsal-{}-{}", normalize_key(&format!("{}-{}", r.year, r.course)), r.category),
            format!("{} {}", r.year, r.course),
        ),
    }
}

/// Group registrations into teams.
///
/// Registrations are folded in submission order (ties broken by representative id),
/// so when two rosters share a player name the earliest submission's entry is kept.
/// The result does not depend on the order of `registrations`. Every sport/category
/// pair is present in the output; teams within a pair are sorted by display name.
pub fn aggregate_teams(registrations: &[Registration]) -> TeamsByDivision {
    let mut ordered: Vec<&Registration> = registrations.iter().collect();
    ordered.sort_by(|a, b| {
        (a.submitted_at, &a.representative_id, a.id).cmp(&(b.submitted_at, &b.representative_id, b.id))
    });

    let mut teams: HashMap<(Sport, Category), Vec<Team>> = HashMap::new();
    // Position of each team id within its division's list.
    let mut seen: HashMap<String, usize> = HashMap::new();

    for r in ordered {
        let (id, display_name) = grouping(r);
        let division = teams.entry((r.sport, r.category)).or_default();
        let idx = *seen.entry(id.clone()).or_insert_with(|| {
            division.push(Team::new(id, display_name, r.sport, r.category));
            division.len() - 1
        });
        division[idx].merge(&r.representative_name, &r.roster);
    }

    let mut out: TeamsByDivision = BTreeMap::new();
    for sport in Sport::ALL {
        let by_cat = out.entry(sport).or_default();
        for category in Category::ALL {
            let mut list = teams.remove(&(sport, category)).unwrap_or_default();
            list.sort_by(|a, b| a.display_name.cmp(&b.display_name).then_with(|| a.id.cmp(&b.id)));
            by_cat.insert(category, list);
        }
    }
    out
}

/// Read every registration from the store and aggregate it into teams.
pub async fn load_teams<S: DataStore + ?Sized>(store: &S) -> Result<TeamsByDivision, StoreError> {
    let rows = store.list_registrations().await?;
    Ok(aggregate_teams(&parse_registrations(&rows)))
}
