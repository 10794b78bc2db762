//! Integration tests for roster validation and the intake form.

use interclass_web::logic::{validate_roster, RegistrationError};
use interclass_web::models::parse_registrations;
use interclass_web::{
    Category, DataStore, IntakeAction, IntakeForm, IntakeStep, MemoryStore, Player,
    Representative, Sport,
};

fn players(n: usize) -> Vec<Player> {
    (0..n)
        .map(|i| if i == 0 { Player::captain("Captain") } else { Player::new(format!("Player {i}")) })
        .collect()
}

#[test]
fn roster_drops_blank_slots_and_trims_names() {
    let mut input = players(5);
    input[1].name = "  Bia  ".into();
    input.extend((0..7).map(|_| Player::new("   ")));
    let roster = validate_roster(&input).unwrap();
    assert_eq!(roster.len(), 5);
    assert_eq!(roster[1].name, "Bia");
}

#[test]
fn roster_size_limits() {
    assert_eq!(validate_roster(&players(4)), Err(RegistrationError::TooFewPlayers));
    assert!(validate_roster(&players(12)).is_ok());
    assert_eq!(validate_roster(&players(13)), Err(RegistrationError::TooManyPlayers));
}

#[test]
fn roster_rejects_duplicate_names_ignoring_case() {
    let mut input = players(6);
    input[5].name = " player 1".into();
    assert_eq!(
        validate_roster(&input),
        Err(RegistrationError::DuplicateName("player 1".into()))
    );
}

#[test]
fn roster_needs_exactly_one_captain() {
    let mut none = players(5);
    none[0].is_captain = false;
    assert_eq!(validate_roster(&none), Err(RegistrationError::CaptainCount(0)));

    let mut two = players(5);
    two[3].is_captain = true;
    assert_eq!(validate_roster(&two), Err(RegistrationError::CaptainCount(2)));

    // A captain flag on a blank slot does not count.
    let mut blank_captain = players(5);
    blank_captain.push(Player::captain(""));
    assert!(validate_roster(&blank_captain).is_ok());
}

async fn store_with_rep() -> MemoryStore {
    let store = MemoryStore::new();
    store
        .insert_representative(Representative::new("1001", "Maria", "3°", "DS-AMS"))
        .await
        .unwrap();
    store
}

#[tokio::test]
async fn full_walkthrough_stores_registration() {
    let store = store_with_rep().await;
    let form = IntakeForm::new();

    let form = form
        .advance(&store, IntakeAction::Identify { code: " 1001 ".into() })
        .await
        .unwrap();
    assert_eq!(form.step, IntakeStep::Confirm);
    assert_eq!(form.representative.as_ref().unwrap().name, "Maria");

    let form = form.advance(&store, IntakeAction::Confirm).await.unwrap();
    assert_eq!(form.step, IntakeStep::Roster);

    let form = form
        .advance(
            &store,
            IntakeAction::Submit {
                sport: Sport::Futsal,
                category: Category::Female,
                players: players(7),
            },
        )
        .await
        .unwrap();
    assert_eq!(form.step, IntakeStep::Submitted);
    assert_eq!(form.roster.len(), 7);

    let stored = parse_registrations(&store.list_registrations().await.unwrap());
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].representative_id, "1001");
    assert_eq!(stored[0].course, "DS-AMS");
    assert_eq!(stored[0].sport, Sport::Futsal);
}

#[tokio::test]
async fn resubmitting_replaces_the_same_sport_and_category() {
    let store = store_with_rep().await;
    let rep = store.get_representative("1001").await.unwrap().unwrap();
    let roster_form = IntakeForm {
        step: IntakeStep::Roster,
        representative: Some(rep),
        ..IntakeForm::default()
    };
    for n in [5, 8] {
        roster_form
            .advance(
                &store,
                IntakeAction::Submit {
                    sport: Sport::Volleyball,
                    category: Category::Male,
                    players: players(n),
                },
            )
            .await
            .unwrap();
    }
    roster_form
        .advance(
            &store,
            IntakeAction::Submit {
                sport: Sport::Volleyball,
                category: Category::Female,
                players: players(5),
            },
        )
        .await
        .unwrap();

    let stored = parse_registrations(&store.list_registrations().await.unwrap());
    assert_eq!(stored.len(), 2);
    let male = stored.iter().find(|r| r.category == Category::Male).unwrap();
    assert_eq!(male.roster.len(), 8);
}

#[tokio::test]
async fn unknown_code_and_out_of_order_actions_are_rejected() {
    let store = store_with_rep().await;
    let form = IntakeForm::new();
    assert_eq!(
        form.advance(&store, IntakeAction::Identify { code: "9999".into() }).await,
        Err(RegistrationError::RepresentativeNotFound)
    );
    assert_eq!(
        form.advance(&store, IntakeAction::Confirm).await,
        Err(RegistrationError::InvalidStep)
    );
    assert_eq!(
        form.advance(
            &store,
            IntakeAction::Submit {
                sport: Sport::Handball,
                category: Category::Male,
                players: players(5),
            }
        )
        .await,
        Err(RegistrationError::InvalidStep)
    );
}

#[tokio::test]
async fn back_and_reset() {
    let store = store_with_rep().await;
    let confirm = IntakeForm::new()
        .advance(&store, IntakeAction::Identify { code: "1001".into() })
        .await
        .unwrap();
    let roster = confirm.advance(&store, IntakeAction::Confirm).await.unwrap();

    let back = roster.advance(&store, IntakeAction::Back).await.unwrap();
    assert_eq!(back.step, IntakeStep::Confirm);
    let back = back.advance(&store, IntakeAction::Back).await.unwrap();
    assert_eq!(back.step, IntakeStep::Identify);
    assert!(back.representative.is_none());

    let reset = roster.advance(&store, IntakeAction::Reset).await.unwrap();
    assert_eq!(reset, IntakeForm::new());
}

#[tokio::test]
async fn invalid_roster_keeps_form_at_roster_step() {
    let store = store_with_rep().await;
    let roster = IntakeForm::new()
        .advance(&store, IntakeAction::Identify { code: "1001".into() })
        .await
        .unwrap()
        .advance(&store, IntakeAction::Confirm)
        .await
        .unwrap();
    let result = roster
        .advance(
            &store,
            IntakeAction::Submit {
                sport: Sport::Futsal,
                category: Category::Male,
                players: players(3),
            },
        )
        .await;
    assert_eq!(result, Err(RegistrationError::TooFewPlayers));
    assert_eq!(roster.step, IntakeStep::Roster);
    assert!(store.list_registrations().await.unwrap().is_empty());
}

#[tokio::test]
async fn form_survives_a_blob_round_trip() {
    let store = store_with_rep().await;
    let form = IntakeForm::new()
        .advance(&store, IntakeAction::Identify { code: "1001".into() })
        .await
        .unwrap();
    let restored = IntakeForm::from_blob(&form.to_blob()).unwrap();
    assert_eq!(restored, form);
    assert!(matches!(IntakeForm::from_blob("{not json"), Err(RegistrationError::Blob(_))));
}

#[test]
fn actions_are_tagged_json() {
    let action: IntakeAction = serde_json::from_str(r#"{"action":"identify","code":"1001"}"#).unwrap();
    assert_eq!(action, IntakeAction::Identify { code: "1001".into() });
    let action: IntakeAction = serde_json::from_str(r#"{"action":"back"}"#).unwrap();
    assert_eq!(action, IntakeAction::Back);
}

#[tokio::test]
async fn submit_rechecks_the_representative_against_the_store() {
    let store = store_with_rep().await;
    let submit = || IntakeAction::Submit {
        sport: Sport::Handball,
        category: Category::Female,
        players: players(5),
    };

    let unknown = IntakeForm {
        step: IntakeStep::Roster,
        representative: Some(Representative::new("NOPE", "Nobody", "1°", "ADM")),
        ..IntakeForm::default()
    };
    assert_eq!(
        unknown.advance(&store, submit()).await,
        Err(RegistrationError::RepresentativeNotFound)
    );
    assert!(store.list_registrations().await.unwrap().is_empty());

    // A known code with edited details is stored with the registered details.
    let edited = IntakeForm {
        step: IntakeStep::Roster,
        representative: Some(Representative::new("1001", "Someone Else", "1°", "ADM")),
        ..IntakeForm::default()
    };
    let done = edited.advance(&store, submit()).await.unwrap();
    assert_eq!(done.representative.as_ref().unwrap().name, "Maria");
    let stored = parse_registrations(&store.list_registrations().await.unwrap());
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].representative_name, "Maria");
    assert_eq!(stored[0].course, "DS-AMS");
    assert_eq!(stored[0].year, "3°");
}
