use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A stored voter record.
///
/// `voter_slip_number` and `voter_number` are each unique across all live records.
/// `id`, `created_at` and `updated_at` are owned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voter {
    pub id: String,
    pub voter_slip_number: String,
    pub voter_name: String,
    pub voter_number: String,
    pub father_name: String,
    pub mother_name: String,
    pub occupation: String,
    pub date_of_birth: Option<NaiveDate>,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated voter that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVoter {
    pub voter_slip_number: String,
    pub voter_name: String,
    pub voter_number: String,
    pub father_name: String,
    pub mother_name: String,
    pub occupation: String,
    pub date_of_birth: Option<NaiveDate>,
    pub address: String,
}

/// A validated partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoterPatch {
    pub voter_slip_number: Option<String>,
    pub voter_name: Option<String>,
    pub voter_number: Option<String>,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    pub occupation: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voter_serializes_camel_case_with_iso_date() {
        let now = Utc::now();
        let voter = Voter {
            id: "v1".into(),
            voter_slip_number: "S-1".into(),
            voter_name: "Rahim".into(),
            voter_number: "N-1".into(),
            father_name: "Karim".into(),
            mother_name: "Amina".into(),
            occupation: String::new(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 5, 17),
            address: String::new(),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&voter).unwrap();
        assert_eq!(json["voterSlipNumber"], "S-1");
        assert_eq!(json["dateOfBirth"], "1990-05-17");
        assert!(json.get("voter_slip_number").is_none());
    }
}
