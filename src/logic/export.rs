//! CSV export of registrations and rosters.

use crate::models::Registration;
use chrono::{DateTime, Utc};

const DATE_FORMAT: &str = "%d/%m/%Y %H:%M";

fn format_date(t: &DateTime<Utc>) -> String {
    t.format(DATE_FORMAT).to_string()
}

fn into_string(writer: csv::Writer<Vec<u8>>) -> Result<String, csv::Error> {
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| {
        csv::Error::from(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })
}

/// One row per registration.
pub fn registrations_csv(registrations: &[Registration]) -> Result<String, csv::Error> {
    let mut w = csv::Writer::from_writer(Vec::new());
    w.write_record(["Code", "Name", "Year", "Course", "Sport", "Category", "Submitted At"])?;
    for r in registrations {
        w.write_record([
            r.representative_id.as_str(),
            r.representative_name.as_str(),
            r.year.as_str(),
            r.course.as_str(),
            r.sport.label(),
            r.category.label(),
            format_date(&r.submitted_at).as_str(),
        ])?;
    }
    into_string(w)
}

/// Team sheet for one registration: a short header block, then one row per player.
pub fn roster_csv(registration: &Registration) -> Result<String, csv::Error> {
    let mut w = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    let r = registration;
    w.write_record([format!("Team: {} - {}", r.year, r.course)])?;
    w.write_record([format!("Sport: {}", r.sport.label())])?;
    w.write_record([format!("Category: {}", r.category.label())])?;
    w.write_record([format!(
        "Representative: {} (code: {})",
        r.representative_name, r.representative_id
    )])?;
    w.write_record([format!("Submitted: {}", format_date(&r.submitted_at))])?;
    w.write_record(["Position", "Name", "Captain"])?;
    for (i, p) in r.roster.iter().enumerate() {
        let position = (i + 1).to_string();
        let captain = if p.is_captain { "Yes" } else { "No" };
        w.write_record([position.as_str(), p.name.as_str(), captain])?;
    }
    into_string(w)
}

/// Download file name for a roster export.
pub fn roster_file_name(r: &Registration) -> String {
    let course: String = r.course.split_whitespace().collect::<Vec<_>>().join("_");
    format!("team_{}_{}_{}_{}.csv", r.sport, r.category, r.year, course)
}
