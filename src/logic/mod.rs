//! Business logic: team aggregation, brackets, results, intake, administration, export.

mod admin;
mod aggregation;
mod bracket;
mod export;
mod intake;
mod results;
mod standings;

pub use admin::{
    add_representative, change_password, create_admin, ensure_master_admin, list_admins,
    remove_admin, remove_representative, session_admin, verify_credentials, verify_representative,
    AdminError, NewAdmin,
};
pub use aggregation::{
    aggregate_teams, load_teams, merged_futsal_team_id, MERGED_FUTSAL_COURSES, MERGED_FUTSAL_NAME,
    MERGED_FUTSAL_YEAR,
};
pub use bracket::{generate_bracket, plan_bracket, BracketError, DIRECT_KNOCKOUT_MAX};
pub use export::{registrations_csv, roster_csv, roster_file_name};
pub use intake::{
    submit_registration, validate_roster, IntakeAction, IntakeForm, IntakeStep,
    RegistrationError, MAX_PLAYERS, MIN_PLAYERS,
};
pub use results::{
    advance_knockout, advance_knockout_in, apply_score, check_rescore, record_result, seed_semifinals,
    seed_semifinals_in, update_details, MatchDetails, ResultError,
};
pub use standings::{group_standings, GroupStanding, StandingRow, POINTS_DRAW, POINTS_WIN};
