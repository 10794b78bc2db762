//! Authorized class representative.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type RepresentativeId = Uuid;

/// A student allowed to submit registrations for their class.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Representative {
    pub id: RepresentativeId,
    /// Enrolment code the representative identifies with.
    pub code: String,
    pub name: String,
    pub year: String,
    pub course: String,
}

impl Representative {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        year: impl Into<String>,
        course: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: code.into(),
            name: name.into(),
            year: year.into(),
            course: course.into(),
        }
    }
}
