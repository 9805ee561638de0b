use crate::error::{ApiError, ApiResult};
use chrono::SecondsFormat;
use common::model::voter::Voter;
use csv::Writer;

pub const EXPORT_HEADERS: [&str; 9] = [
    "Voter Slip Number",
    "Voter Name",
    "Voter Number",
    "Father Name",
    "Mother Name",
    "Occupation",
    "Date of Birth",
    "Address",
    "Created At",
];

/// Renders voters as CSV, one line per voter in the given order.
///
/// Dates of birth use `YYYY-MM-DD` (empty when unknown) so the file can be fed straight
/// back into the importer.
pub fn voters_to_csv(voters: &[Voter]) -> ApiResult<String> {
    let failed = |err: csv::Error| ApiError::internal(format!("CSV export failed: {err}"));

    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(EXPORT_HEADERS).map_err(failed)?;
    for voter in voters {
        let date_of_birth = voter
            .date_of_birth
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let created_at = voter
            .created_at
            .to_rfc3339_opts(SecondsFormat::Millis, true);
        writer
            .write_record([
                voter.voter_slip_number.as_str(),
                voter.voter_name.as_str(),
                voter.voter_number.as_str(),
                voter.father_name.as_str(),
                voter.mother_name.as_str(),
                voter.occupation.as_str(),
                date_of_birth.as_str(),
                voter.address.as_str(),
                created_at.as_str(),
            ])
            .map_err(failed)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| ApiError::internal(format!("CSV export failed: {err}")))?;
    String::from_utf8(bytes).map_err(|err| ApiError::internal(format!("CSV export failed: {err}")))
}
