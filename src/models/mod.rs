//! Data structures: registrations, teams, matches, representatives, admins.

mod admin;
mod game;
mod player;
mod registration;
mod representative;
mod team;

pub use admin::{AdminAccount, AdminId, AdminInfo};
pub use game::{GameMatch, Group, MatchId, MatchSchedule, Stage};
pub use player::{normalize_name, Player};
pub use registration::{
    parse_registrations, Category, MalformedRow, Registration, RegistrationId, RegistrationRow,
    Sport,
};
pub use representative::{Representative, RepresentativeId};
pub use team::{normalize_key, teams_for, Team, TeamId, TeamsByDivision};
