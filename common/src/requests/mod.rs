use serde::{Deserialize, Serialize};

/// Body of `POST /api/voters`, and the shape every CSV row is mapped onto.
///
/// Every field is optional at the wire level so that missing values surface as
/// field-level validation messages instead of deserialization failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVoterRequest {
    pub voter_slip_number: Option<String>,
    pub voter_name: Option<String>,
    pub voter_number: Option<String>,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    pub occupation: Option<String>,
    pub date_of_birth: Option<String>,
    pub address: Option<String>,
}

/// Body of `PUT /api/voters/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVoterRequest {
    pub voter_slip_number: Option<String>,
    pub voter_name: Option<String>,
    pub voter_number: Option<String>,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    pub occupation: Option<String>,
    pub date_of_birth: Option<String>,
    pub address: Option<String>,
}

/// Query string of `GET /api/voters`. Numbers arrive as text and are parsed leniently.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchVotersQuery {
    pub search: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}
