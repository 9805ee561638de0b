//! Storage contracts for voters and user accounts.
//!
//! The HTTP services and the CSV import pipeline only talk to the [`VoterStore`] and
//! [`UserStore`] traits. [`sqlite::SqliteStore`] is the production implementation; the
//! traits are synchronous because every implementation is expected to be driven from
//! tokio's blocking pool.
//!
//! Uniqueness of `voter_slip_number`, `voter_number` and user emails is enforced by
//! the store itself. Callers may pre-check, but a [`StoreError::Conflict`] can always
//! surface when two requests race on the same key.

pub mod sqlite;

use chrono::{DateTime, Utc};
use common::model::user::Role;
use common::model::voter::{NewVoter, Voter, VoterPatch};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write. `fields` uses wire (camelCase) names.
    #[error("unique constraint violated on {}", fields.join(", "))]
    Conflict { fields: Vec<String> },

    #[error("record not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("store lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Filter and paging for [`VoterStore::search`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoterFilter {
    /// Case-insensitive substring of `voter_name`. `None` or empty matches everything.
    pub name_contains: Option<String>,
    pub offset: u64,
    pub limit: u64,
}

/// A user account as stored, including the password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub trait VoterStore: Send + Sync {
    fn create_voter(&self, voter: &NewVoter) -> StoreResult<Voter>;

    /// Matching voters newest first, plus the total number of matches ignoring paging.
    fn search_voters(&self, filter: &VoterFilter) -> StoreResult<(Vec<Voter>, u64)>;

    fn get_voter(&self, id: &str) -> StoreResult<Option<Voter>>;

    fn update_voter(&self, id: &str, patch: &VoterPatch) -> StoreResult<Voter>;

    fn delete_voter(&self, id: &str) -> StoreResult<()>;

    /// Every voter, newest first.
    fn list_voters(&self) -> StoreResult<Vec<Voter>>;

    /// The subset of `candidates` already used as a voter slip number.
    fn existing_slip_numbers(&self, candidates: &[&str]) -> StoreResult<HashSet<String>>;

    /// The subset of `candidates` already used as a voter number.
    fn existing_voter_numbers(&self, candidates: &[&str]) -> StoreResult<HashSet<String>>;

    /// Inserts every voter or none of them.
    fn insert_voters(&self, voters: &[NewVoter]) -> StoreResult<usize>;
}

pub trait UserStore: Send + Sync {
    fn create_user(&self, email: &str, password_hash: &str, role: Role) -> StoreResult<User>;

    fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    fn find_user_by_id(&self, id: &str) -> StoreResult<Option<User>>;
}
