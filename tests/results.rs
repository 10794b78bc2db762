//! Integration tests for score recording, standings, and knockout progression.

use interclass_web::logic::{
    advance_knockout, advance_knockout_in, apply_score, check_rescore, group_standings,
    seed_semifinals_in, update_details, MatchDetails, POINTS_WIN,
};
use interclass_web::models::{MatchSchedule, Team};
use interclass_web::{
    record_result, Category, DataStore, GameMatch, Group, MatchFilter, MemoryStore, ResultError,
    Sport, Stage,
};
use chrono::NaiveDate;

fn game(stage: Stage, group: Option<Group>, t1: Option<&str>, t2: Option<&str>) -> GameMatch {
    GameMatch::new(
        Sport::Futsal,
        Category::Male,
        stage,
        group,
        t1.map(String::from),
        t2.map(String::from),
    )
}

#[test]
fn higher_score_wins() {
    let mut m = game(Stage::Group, Some(Group::A), Some("T1"), Some("T2"));
    apply_score(&mut m, 3, 1).unwrap();
    assert!(m.completed);
    assert_eq!((m.score_1, m.score_2), (Some(3), Some(1)));
    assert_eq!(m.winner.as_deref(), Some("T1"));

    let mut m = game(Stage::Final, None, Some("T1"), Some("T2"));
    apply_score(&mut m, 0, 2).unwrap();
    assert_eq!(m.winner.as_deref(), Some("T2"));
    assert_eq!(m.loser().map(String::as_str), Some("T1"));
}

#[test]
fn group_draw_completes_without_winner() {
    let mut m = game(Stage::Group, Some(Group::B), Some("T1"), Some("T2"));
    apply_score(&mut m, 2, 2).unwrap();
    assert!(m.completed);
    assert_eq!(m.winner, None);
}

#[test]
fn knockout_draw_is_rejected_and_match_untouched() {
    let mut m = game(Stage::Semifinal, Some(Group::A), Some("T1"), Some("T2"));
    assert_eq!(apply_score(&mut m, 1, 1), Err(ResultError::TieInKnockout));
    assert!(!m.completed);
    assert_eq!(m.score_1, None);
}

#[test]
fn bye_is_resolved_in_favour_of_the_present_team() {
    let mut m = game(Stage::Semifinal, Some(Group::B), Some("T3"), None);
    assert_eq!(apply_score(&mut m, 0, 1), Err(ResultError::EmptySlotCannotWin));
    apply_score(&mut m, 1, 0).unwrap();
    assert_eq!(m.winner.as_deref(), Some("T3"));
    assert_eq!(m.loser(), None);

    let mut empty = game(Stage::Final, None, None, None);
    assert_eq!(apply_score(&mut empty, 1, 0), Err(ResultError::NoTeams));
}

fn grouped_bracket() -> Vec<GameMatch> {
    vec![
        game(Stage::Group, Some(Group::A), Some("A1"), Some("A2")),
        game(Stage::Group, Some(Group::A), Some("A1"), Some("A3")),
        game(Stage::Group, Some(Group::A), Some("A2"), Some("A3")),
        game(Stage::Group, Some(Group::B), Some("B1"), Some("B2")),
        game(Stage::Semifinal, Some(Group::A), None, None),
        game(Stage::Semifinal, Some(Group::B), None, None),
        game(Stage::Final, None, None, None),
        game(Stage::ThirdPlace, None, None, None),
    ]
}

#[test]
fn standings_order_by_points_then_goal_difference() {
    let mut matches = grouped_bracket();
    apply_score(&mut matches[0], 2, 0).unwrap(); // A1 beats A2
    apply_score(&mut matches[1], 1, 1).unwrap(); // A1 draws A3
    apply_score(&mut matches[2], 5, 0).unwrap(); // A2 beats A3

    let tables = group_standings(&matches);
    assert_eq!(tables.len(), 2);
    let a = &tables[0];
    assert_eq!(a.group, Group::A);
    let order: Vec<_> = a.rows.iter().map(|r| r.team.as_str()).collect();
    // A1: 4 pts, A2: 3 pts (+3), A3: 1 pt.
    assert_eq!(order, ["A1", "A2", "A3"]);
    assert_eq!(a.rows[0].points, POINTS_WIN + 1);
    assert_eq!(a.rows[0].drawn, 1);
    assert_eq!(a.rows[1].goal_difference(), 3);

    // Unplayed group B still lists both teams.
    let b = &tables[1];
    assert_eq!(b.rows.len(), 2);
    assert!(b.rows.iter().all(|r| r.played == 0));
}

#[test]
fn semifinals_seeded_crosswise_once_groups_are_done() {
    let mut matches = grouped_bracket();
    assert_eq!(seed_semifinals_in(&mut matches), Err(ResultError::GroupStageIncomplete));

    apply_score(&mut matches[0], 2, 0).unwrap();
    apply_score(&mut matches[1], 3, 0).unwrap();
    apply_score(&mut matches[2], 1, 0).unwrap();
    apply_score(&mut matches[3], 0, 4).unwrap(); // B2 wins group B

    let changed = seed_semifinals_in(&mut matches).unwrap();
    assert_eq!(changed.len(), 2);
    assert_eq!(matches[4].team_1.as_deref(), Some("A1"));
    assert_eq!(matches[4].team_2.as_deref(), Some("B1"));
    assert_eq!(matches[5].team_1.as_deref(), Some("B2"));
    assert_eq!(matches[5].team_2.as_deref(), Some("A2"));

    // Filled slots are not overwritten.
    assert!(seed_semifinals_in(&mut matches).unwrap().is_empty());
}

#[test]
fn seeding_needs_a_group_stage() {
    let mut matches = vec![
        game(Stage::Semifinal, Some(Group::A), Some("T1"), Some("T2")),
        game(Stage::Final, None, None, None),
    ];
    assert_eq!(seed_semifinals_in(&mut matches), Err(ResultError::NotGrouped));
}

#[test]
fn knockout_advances_winners_and_losers() {
    let mut matches = vec![
        game(Stage::Semifinal, Some(Group::A), Some("T1"), Some("T2")),
        game(Stage::Semifinal, Some(Group::B), Some("T3"), Some("T4")),
        game(Stage::Final, None, None, None),
        game(Stage::ThirdPlace, None, None, None),
    ];
    apply_score(&mut matches[0], 1, 0).unwrap();
    assert_eq!(advance_knockout_in(&mut matches), Err(ResultError::SemifinalsIncomplete));

    apply_score(&mut matches[1], 0, 2).unwrap();
    let changed = advance_knockout_in(&mut matches).unwrap();
    assert_eq!(changed.len(), 2);
    assert_eq!(matches[2].team_1.as_deref(), Some("T1"));
    assert_eq!(matches[2].team_2.as_deref(), Some("T4"));
    assert_eq!(matches[3].team_1.as_deref(), Some("T2"));
    assert_eq!(matches[3].team_2.as_deref(), Some("T3"));
}

#[test]
fn two_team_bracket_sends_the_lone_semifinal_winner_to_the_final() {
    let mut matches = vec![
        game(Stage::Semifinal, Some(Group::A), Some("T1"), Some("T2")),
        game(Stage::Semifinal, Some(Group::B), None, None),
        game(Stage::Final, None, None, None),
        game(Stage::ThirdPlace, None, None, None),
    ];
    apply_score(&mut matches[0], 0, 3).unwrap();
    advance_knockout_in(&mut matches).unwrap();
    assert_eq!(matches[2].team_1.as_deref(), Some("T2"));
    assert_eq!(matches[2].team_2, None);
    assert_eq!(matches[3].team_1.as_deref(), Some("T1"));
}

fn division_teams() -> Vec<Team> {
    ["T1", "T2", "T3"]
        .iter()
        .map(|id| Team::new(id.to_string(), *id, Sport::Futsal, Category::Male))
        .collect()
}

#[tokio::test]
async fn recorded_result_is_persisted() {
    let store = MemoryStore::new();
    let m = game(Stage::Semifinal, Some(Group::A), Some("T1"), Some("T2"));
    let id = m.id;
    store.insert_matches(vec![m]).await.unwrap();

    let updated = record_result(&store, id, 3, 1).await.unwrap();
    assert_eq!(updated.winner.as_deref(), Some("T1"));
    let stored = store.get_match(id).await.unwrap().unwrap();
    assert_eq!(stored, updated);

    let missing = record_result(&store, uuid::Uuid::new_v4(), 1, 0).await;
    assert!(matches!(missing, Err(ResultError::MatchNotFound(_))));
}

#[tokio::test]
async fn details_assign_known_teams_and_schedule() {
    let store = MemoryStore::new();
    let m = game(Stage::Final, None, None, None);
    let id = m.id;
    store.insert_matches(vec![m]).await.unwrap();
    let teams = division_teams();

    let unknown = MatchDetails {
        team_1: Some("T9".into()),
        ..MatchDetails::default()
    };
    assert_eq!(
        update_details(&store, id, unknown, &teams).await,
        Err(ResultError::UnknownTeam("T9".into()))
    );

    let same = MatchDetails {
        team_1: Some("T1".into()),
        team_2: Some("T1".into()),
        ..MatchDetails::default()
    };
    assert_eq!(update_details(&store, id, same, &teams).await, Err(ResultError::SameTeam));

    let details = MatchDetails {
        team_1: Some("T1".into()),
        team_2: Some("T3".into()),
        schedule: MatchSchedule {
            date: NaiveDate::from_ymd_opt(2025, 4, 2),
            time: None,
            venue: Some("Main court".into()),
        },
    };
    let updated = update_details(&store, id, details, &teams).await.unwrap();
    assert_eq!(updated.team_2.as_deref(), Some("T3"));
    assert_eq!(updated.schedule.venue.as_deref(), Some("Main court"));

    record_result(&store, id, 2, 1).await.unwrap();
    let swap = MatchDetails {
        team_1: Some("T2".into()),
        team_2: Some("T3".into()),
        ..MatchDetails::default()
    };
    assert_eq!(update_details(&store, id, swap, &teams).await, Err(ResultError::TeamsLocked));
}

#[tokio::test]
async fn advancing_updates_stored_final() {
    let store = MemoryStore::new();
    let semi_a = game(Stage::Semifinal, Some(Group::A), Some("T1"), Some("T2"));
    let semi_b = game(Stage::Semifinal, Some(Group::B), Some("T3"), None);
    let (a, b) = (semi_a.id, semi_b.id);
    store
        .insert_matches(vec![
            semi_a,
            semi_b,
            game(Stage::Final, None, None, None),
            game(Stage::ThirdPlace, None, None, None),
        ])
        .await
        .unwrap();
    record_result(&store, a, 2, 0).await.unwrap();
    record_result(&store, b, 1, 0).await.unwrap();

    let updated = advance_knockout(&store, Sport::Futsal, Category::Male).await.unwrap();
    assert_eq!(updated.len(), 2);

    let stored = store
        .list_matches(MatchFilter::division(Sport::Futsal, Category::Male))
        .await
        .unwrap();
    let final_match = stored.iter().find(|m| m.stage == Stage::Final).unwrap();
    assert_eq!(final_match.team_1.as_deref(), Some("T1"));
    assert_eq!(final_match.team_2.as_deref(), Some("T3"));
    let third = stored.iter().find(|m| m.stage == Stage::ThirdPlace).unwrap();
    assert_eq!(third.team_1.as_deref(), Some("T2"));
    assert_eq!(third.team_2, None);
}

#[test]
fn standings_saturate_on_huge_scores() {
    let mut matches = vec![
        game(Stage::Group, Some(Group::A), Some("A"), Some("B")),
        game(Stage::Group, Some(Group::A), Some("A"), Some("C")),
    ];
    apply_score(&mut matches[0], u32::MAX, 0).unwrap();
    apply_score(&mut matches[1], 1, 0).unwrap();

    let tables = group_standings(&matches);
    let top = &tables[0].rows[0];
    assert_eq!(top.team, "A");
    assert_eq!(top.goals_for, u32::MAX);
    assert_eq!(top.points, 2 * POINTS_WIN);
    assert_eq!(top.goal_difference(), i64::from(u32::MAX));
}

#[test]
fn advancing_keeps_a_team_placed_by_hand() {
    let mut matches = vec![
        game(Stage::Semifinal, Some(Group::A), Some("T1"), Some("T2")),
        game(Stage::Semifinal, Some(Group::B), Some("T3"), Some("T4")),
        game(Stage::Final, None, Some("T4"), None),
        game(Stage::ThirdPlace, None, None, None),
    ];
    apply_score(&mut matches[0], 1, 0).unwrap();
    apply_score(&mut matches[1], 0, 1).unwrap();

    advance_knockout_in(&mut matches).unwrap();
    assert_eq!(matches[2].team_1.as_deref(), Some("T4"));
    assert_eq!(matches[2].team_2.as_deref(), Some("T1"));
    assert_eq!(matches[3].team_1.as_deref(), Some("T2"));
    assert_eq!(matches[3].team_2.as_deref(), Some("T3"));
}

#[test]
fn group_scores_are_final_once_semifinals_are_seeded() {
    let mut matches = grouped_bracket();
    for (i, (s1, s2)) in [(2, 0), (3, 0), (1, 0), (0, 4)].into_iter().enumerate() {
        apply_score(&mut matches[i], s1, s2).unwrap();
    }
    let previous = matches[0].clone();
    let mut rescored = previous.clone();
    apply_score(&mut rescored, 0, 2).unwrap();
    assert_eq!(check_rescore(&previous, &rescored, &matches), Ok(()));

    seed_semifinals_in(&mut matches).unwrap();
    assert_eq!(
        check_rescore(&previous, &rescored, &matches),
        Err(ResultError::AlreadyAdvanced)
    );
}

#[tokio::test]
async fn semifinal_outcome_is_locked_once_advanced() {
    let store = MemoryStore::new();
    let semi_a = game(Stage::Semifinal, Some(Group::A), Some("A"), Some("B"));
    let semi_b = game(Stage::Semifinal, Some(Group::B), Some("C"), Some("D"));
    let final_match = game(Stage::Final, None, None, None);
    let (a, b, f) = (semi_a.id, semi_b.id, final_match.id);
    store
        .insert_matches(vec![semi_a, semi_b, final_match, game(Stage::ThirdPlace, None, None, None)])
        .await
        .unwrap();
    record_result(&store, a, 2, 1).await.unwrap();
    record_result(&store, b, 3, 0).await.unwrap();

    // Before advancing, a semifinal can still be corrected either way.
    record_result(&store, a, 1, 2).await.unwrap();
    record_result(&store, a, 2, 1).await.unwrap();
    advance_knockout(&store, Sport::Futsal, Category::Male).await.unwrap();

    assert_eq!(
        record_result(&store, a, 0, 3).await,
        Err(ResultError::AlreadyAdvanced)
    );
    let stored = store.get_match(a).await.unwrap().unwrap();
    assert_eq!(stored.winner.as_deref(), Some("A"));
    assert_eq!((stored.score_1, stored.score_2), (Some(2), Some(1)));

    // Same winner: the score may still be fixed.
    let fixed = record_result(&store, a, 4, 1).await.unwrap();
    assert_eq!(fixed.score_1, Some(4));

    // Nothing is fed by the final.
    record_result(&store, f, 1, 0).await.unwrap();
    record_result(&store, f, 0, 1).await.unwrap();
}
