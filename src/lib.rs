//! Interclass sports web app: library with models, data store, and business logic.

pub mod config;
pub mod logic;
pub mod models;
pub mod store;

pub use logic::{
    aggregate_teams, generate_bracket, load_teams, plan_bracket, record_result, AdminError,
    BracketError, IntakeAction, IntakeForm, IntakeStep, RegistrationError, ResultError,
};
pub use models::{
    Category, GameMatch, Group, MatchId, Player, Registration, RegistrationRow, Representative,
    Sport, Stage, Team, TeamId, TeamsByDivision,
};
pub use store::{DataStore, MatchFilter, MemoryStore, StoreError};
