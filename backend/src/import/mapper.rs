use super::parse::CsvRow;
use common::requests::CreateVoterRequest;

// Header aliases per field, in priority order: spreadsheet label, camelCase, snake_case.
const VOTER_SLIP_NUMBER: &[&str] = &["Voter Slip Number", "voterSlipNumber", "voter_slip_number"];
const VOTER_NAME: &[&str] = &["Voter Name", "voterName", "voter_name"];
const VOTER_NUMBER: &[&str] = &["Voter Number", "voterNumber", "voter_number"];
const FATHER_NAME: &[&str] = &["Father Name", "fatherName", "father_name"];
const MOTHER_NAME: &[&str] = &["Mother Name", "motherName", "mother_name"];
const OCCUPATION: &[&str] = &["Occupation", "occupation"];
const DATE_OF_BIRTH: &[&str] = &["Date of Birth", "dateOfBirth", "date_of_birth"];
const ADDRESS: &[&str] = &["Address", "address"];

/// First alias with a non-empty value.
fn first_present(row: &CsvRow, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .filter_map(|alias| row.get(alias))
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

fn text(row: &CsvRow, aliases: &[&str]) -> Option<String> {
    Some(first_present(row, aliases).unwrap_or_default())
}

/// Maps a loosely keyed CSV row onto the voter creation payload.
///
/// Text fields that match no alias become `""` so the validator reports them as
/// missing; an unmatched date of birth stays absent.
pub fn map_row(row: &CsvRow) -> CreateVoterRequest {
    CreateVoterRequest {
        voter_slip_number: text(row, VOTER_SLIP_NUMBER),
        voter_name: text(row, VOTER_NAME),
        voter_number: text(row, VOTER_NUMBER),
        father_name: text(row, FATHER_NAME),
        mother_name: text(row, MOTHER_NAME),
        occupation: text(row, OCCUPATION),
        date_of_birth: first_present(row, DATE_OF_BIRTH),
        address: text(row, ADDRESS),
    }
}
