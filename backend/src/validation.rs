//! Field rules for voter payloads.
//!
//! The same rules apply to `POST /api/voters` bodies and to every mapped CSV row, so
//! both paths go through [`validate_new_voter`].

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use common::model::voter::{NewVoter, VoterPatch};
use common::requests::{CreateVoterRequest, LoginRequest, UpdateVoterRequest};
use regex::Regex;
use std::fmt;

/// One violated rule, keyed by the wire name of the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every violated rule of one payload, in field declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn join(&self, separator: &str) -> String {
        self.0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(separator)
    }

    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }
}

const INVALID_DATE: &str = "Invalid date format";

fn required(
    errors: &mut ValidationErrors,
    field: &'static str,
    label: &str,
    value: Option<&String>,
) -> String {
    let trimmed = value.map(|v| v.trim()).unwrap_or_default();
    if trimmed.is_empty() {
        errors.push(field, format!("{label} is required"));
    }
    trimmed.to_string()
}

fn optional_text(value: Option<&String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

/// `None` for a missing or blank value, `Some(Err(()))` when the text is not a date.
fn optional_date(value: Option<&String>) -> Option<Result<NaiveDate, ()>> {
    let raw = value.map(|v| v.trim()).filter(|v| !v.is_empty())?;
    Some(parse_date(raw).ok_or(()))
}

/// Accepts ISO dates, ISO/RFC 3339 timestamps and a few common spreadsheet layouts.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%B %d, %Y", "%d %B %Y"];
    const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

pub fn validate_new_voter(req: &CreateVoterRequest) -> Result<NewVoter, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let voter_slip_number = required(
        &mut errors,
        "voterSlipNumber",
        "Voter slip number",
        req.voter_slip_number.as_ref(),
    );
    let voter_name = required(&mut errors, "voterName", "Voter name", req.voter_name.as_ref());
    let voter_number = required(
        &mut errors,
        "voterNumber",
        "Voter number",
        req.voter_number.as_ref(),
    );
    let father_name = required(&mut errors, "fatherName", "Father name", req.father_name.as_ref());
    let mother_name = required(&mut errors, "motherName", "Mother name", req.mother_name.as_ref());
    let occupation = optional_text(req.occupation.as_ref());
    let date_of_birth = match optional_date(req.date_of_birth.as_ref()) {
        Some(Ok(date)) => Some(date),
        Some(Err(())) => {
            errors.push("dateOfBirth", INVALID_DATE);
            None
        }
        None => None,
    };
    let address = optional_text(req.address.as_ref());

    if !errors.0.is_empty() {
        return Err(errors);
    }

    Ok(NewVoter {
        voter_slip_number,
        voter_name,
        voter_number,
        father_name,
        mother_name,
        occupation,
        date_of_birth,
        address,
    })
}

pub fn validate_voter_patch(req: &UpdateVoterRequest) -> Result<VoterPatch, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let mut non_empty = |field: &'static str, label: &str, value: &Option<String>| {
        let value = value.as_ref()?.trim().to_string();
        if value.is_empty() {
            errors.push(field, format!("{label} must not be empty"));
            return None;
        }
        Some(value)
    };

    let voter_slip_number = non_empty("voterSlipNumber", "Voter slip number", &req.voter_slip_number);
    let voter_name = non_empty("voterName", "Voter name", &req.voter_name);
    let voter_number = non_empty("voterNumber", "Voter number", &req.voter_number);
    let father_name = non_empty("fatherName", "Father name", &req.father_name);
    let mother_name = non_empty("motherName", "Mother name", &req.mother_name);

    let date_of_birth = match optional_date(req.date_of_birth.as_ref()) {
        Some(Ok(date)) => Some(date),
        Some(Err(())) => {
            errors.push("dateOfBirth", INVALID_DATE);
            None
        }
        None => None,
    };

    if !errors.0.is_empty() {
        return Err(errors);
    }

    Ok(VoterPatch {
        voter_slip_number,
        voter_name,
        voter_number,
        father_name,
        mother_name,
        occupation: req.occupation.as_ref().map(|v| v.trim().to_string()),
        date_of_birth,
        address: req.address.as_ref().map(|v| v.trim().to_string()),
    })
}

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// A login attempt that passed the shape checks. The email is normalized to lower case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

pub fn validate_login(req: &LoginRequest) -> Result<Credentials, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let email = req
        .email
        .as_deref()
        .map(|v| v.trim().to_lowercase())
        .unwrap_or_default();
    if email.is_empty() {
        errors.push("email", "Email is required");
    } else if !Regex::new(EMAIL_PATTERN).is_ok_and(|re| re.is_match(&email)) {
        errors.push("email", "Invalid email format");
    }

    let password = req.password.clone().unwrap_or_default();
    if password.is_empty() {
        errors.push("password", "Password is required");
    }

    if !errors.0.is_empty() {
        return Err(errors);
    }
    Ok(Credentials { email, password })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_request() -> CreateVoterRequest {
        CreateVoterRequest {
            voter_slip_number: Some(" S-1 ".into()),
            voter_name: Some("Rahim".into()),
            voter_number: Some("N-1".into()),
            father_name: Some("Karim".into()),
            mother_name: Some("Amina".into()),
            occupation: None,
            date_of_birth: Some("1990-01-15".into()),
            address: Some("  Dhaka ".into()),
        }
    }

    #[test]
    fn valid_request_is_trimmed_and_defaulted() {
        let voter = validate_new_voter(&complete_request()).unwrap();
        assert_eq!(voter.voter_slip_number, "S-1");
        assert_eq!(voter.occupation, "");
        assert_eq!(voter.address, "Dhaka");
        assert_eq!(voter.date_of_birth, NaiveDate::from_ymd_opt(1990, 1, 15));
    }

    #[test]
    fn missing_and_blank_required_fields_are_reported_in_order() {
        let req = CreateVoterRequest {
            voter_name: Some("   ".into()),
            mother_name: None,
            ..complete_request()
        };
        let errors = validate_new_voter(&req).unwrap_err();
        assert_eq!(
            errors.join("; "),
            "voterName: Voter name is required; motherName: Mother name is required"
        );
    }

    #[test]
    fn invalid_date_is_rejected_but_blank_date_is_absent() {
        let bad = CreateVoterRequest {
            date_of_birth: Some("1990-02-30".into()),
            ..complete_request()
        };
        let errors = validate_new_voter(&bad).unwrap_err();
        assert_eq!(errors.0[0].field, "dateOfBirth");
        assert_eq!(errors.0[0].message, INVALID_DATE);

        let blank = CreateVoterRequest {
            date_of_birth: Some("  ".into()),
            ..complete_request()
        };
        assert_eq!(validate_new_voter(&blank).unwrap().date_of_birth, None);
    }

    #[test]
    fn date_parser_accepts_common_layouts() {
        let expected = NaiveDate::from_ymd_opt(1990, 3, 5);
        for raw in [
            "1990-03-05",
            "1990/03/05",
            "03/05/1990",
            "March 5, 1990",
            "5 March 1990",
            "1990-03-05T10:00:00",
            "1990-03-05T10:00:00.000Z",
            "1990-03-05 00:00:00",
        ] {
            assert_eq!(parse_date(raw), expected, "layout {raw}");
        }
        assert_eq!(parse_date("not a date"), None);
    }

    #[test]
    fn patch_keeps_absent_fields_and_rejects_blank_required_ones() {
        let patch = validate_voter_patch(&UpdateVoterRequest {
            voter_name: Some(" New Name ".into()),
            occupation: Some("".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(patch.voter_name.as_deref(), Some("New Name"));
        assert_eq!(patch.occupation.as_deref(), Some(""));
        assert!(patch.voter_slip_number.is_none());
        assert!(patch.date_of_birth.is_none());

        let errors = validate_voter_patch(&UpdateVoterRequest {
            voter_number: Some(" ".into()),
            date_of_birth: Some("yesterday".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(
            errors.join(", "),
            "voterNumber: Voter number must not be empty, dateOfBirth: Invalid date format"
        );
    }

    #[test]
    fn login_normalizes_email_and_requires_both_fields() {
        let creds = validate_login(&LoginRequest {
            email: Some("  Admin@Example.COM ".into()),
            password: Some("secret".into()),
        })
        .unwrap();
        assert_eq!(creds.email, "admin@example.com");

        let errors = validate_login(&LoginRequest {
            email: Some("not-an-email".into()),
            password: None,
        })
        .unwrap_err();
        assert_eq!(
            errors.join(", "),
            "email: Invalid email format, password: Password is required"
        );

        let errors = validate_login(&LoginRequest {
            email: None,
            password: Some("x".into()),
        })
        .unwrap_err();
        assert_eq!(errors.join(", "), "email: Email is required");
    }
}
