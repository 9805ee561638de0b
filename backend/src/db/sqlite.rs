//! SQLite-backed implementation of the voter and user stores.
//!
//! A single connection is shared behind a mutex. Every public method takes the lock
//! for its whole duration, so each call is atomic with respect to the others.

use super::{StoreError, StoreResult, User, UserStore, VoterFilter, VoterStore};
use chrono::Utc;
use common::model::user::Role;
use common::model::voter::{NewVoter, Voter, VoterPatch};
use log::debug;
use rusqlite::functions::FunctionFlags;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension, Row};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use uuid::Uuid;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id            TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    role          TEXT NOT NULL,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS voters (
    id                TEXT PRIMARY KEY,
    voter_slip_number TEXT NOT NULL UNIQUE,
    voter_name        TEXT NOT NULL,
    voter_number      TEXT NOT NULL UNIQUE,
    father_name       TEXT NOT NULL,
    mother_name       TEXT NOT NULL,
    occupation        TEXT NOT NULL DEFAULT '',
    date_of_birth     TEXT,
    address           TEXT NOT NULL DEFAULT '',
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_voters_created_at ON voters (created_at);
CREATE INDEX IF NOT EXISTS idx_voters_voter_name ON voters (voter_name);
";

const VOTER_COLUMNS: &str = "id, voter_slip_number, voter_name, voter_number, father_name, \
     mother_name, occupation, date_of_birth, address, created_at, updated_at";

const USER_COLUMNS: &str = "id, email, password_hash, role, created_at, updated_at";

const NEWEST_FIRST: &str = "ORDER BY created_at DESC, rowid DESC";

/// Keeps `IN (...)` lookups well under SQLite's bound-parameter limit.
const LOOKUP_CHUNK: usize = 500;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) a database file and applies the schema.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        register_functions(&conn)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    fn existing_values(&self, column: &str, candidates: &[&str]) -> StoreResult<HashSet<String>> {
        let conn = self.lock()?;
        let mut found = HashSet::new();
        for chunk in candidates.chunks(LOOKUP_CHUNK) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!("SELECT {column} FROM voters WHERE {column} IN ({placeholders})");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(chunk.iter()), |row| row.get::<_, String>(0))?;
            for value in rows {
                found.insert(value?);
            }
        }
        Ok(found)
    }
}

fn voter_from_row(row: &Row<'_>) -> rusqlite::Result<Voter> {
    Ok(Voter {
        id: row.get(0)?,
        voter_slip_number: row.get(1)?,
        voter_name: row.get(2)?,
        voter_number: row.get(3)?,
        father_name: row.get(4)?,
        mother_name: row.get(5)?,
        occupation: row.get(6)?,
        date_of_birth: row.get(7)?,
        address: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let role: String = row.get(3)?;
    let role = role.parse::<Role>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, e.into())
    })?;
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        role,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn select_voter(conn: &Connection, id: &str) -> StoreResult<Option<Voter>> {
    let sql = format!("SELECT {VOTER_COLUMNS} FROM voters WHERE id = ?1");
    Ok(conn.query_row(&sql, params![id], voter_from_row).optional()?)
}

fn insert_voter(conn: &Connection, voter: &NewVoter) -> StoreResult<Voter> {
    let now = Utc::now();
    let stored = Voter {
        id: Uuid::new_v4().to_string(),
        voter_slip_number: voter.voter_slip_number.clone(),
        voter_name: voter.voter_name.clone(),
        voter_number: voter.voter_number.clone(),
        father_name: voter.father_name.clone(),
        mother_name: voter.mother_name.clone(),
        occupation: voter.occupation.clone(),
        date_of_birth: voter.date_of_birth,
        address: voter.address.clone(),
        created_at: now,
        updated_at: now,
    };
    conn.execute(
        &format!(
            "INSERT INTO voters ({VOTER_COLUMNS}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
        ),
        params![
            stored.id,
            stored.voter_slip_number,
            stored.voter_name,
            stored.voter_number,
            stored.father_name,
            stored.mother_name,
            stored.occupation,
            stored.date_of_birth,
            stored.address,
            stored.created_at,
            stored.updated_at,
        ],
    )
    .map_err(classify_write_error)?;
    Ok(stored)
}

/// Turns SQLite UNIQUE violations into [`StoreError::Conflict`] naming the fields.
///
/// SQLite reports them as `UNIQUE constraint failed: voters.voter_number` (several
/// columns are comma-separated).
fn classify_write_error(err: rusqlite::Error) -> StoreError {
    if let rusqlite::Error::SqliteFailure(failure, Some(message)) = &err {
        if failure.code == ErrorCode::ConstraintViolation {
            if let Some(columns) = message.strip_prefix("UNIQUE constraint failed:") {
                let fields = columns
                    .split(',')
                    .map(|qualified| {
                        let column = qualified.trim();
                        let column = column.rsplit('.').next().unwrap_or(column);
                        snake_to_camel(column)
                    })
                    .collect();
                return StoreError::Conflict { fields };
            }
        }
    }
    StoreError::Database(err)
}

fn snake_to_camel(column: &str) -> String {
    let mut out = String::with_capacity(column.len());
    let mut upper = false;
    for c in column.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Registers `fold(text)`, a Unicode lower-casing used for case-insensitive search.
/// SQLite's own `LIKE` and `lower()` only fold ASCII.
fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "fold",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| Ok(ctx.get::<Option<String>>(0)?.map(|text| text.to_lowercase())),
    )
}

impl VoterStore for SqliteStore {
    fn create_voter(&self, voter: &NewVoter) -> StoreResult<Voter> {
        let conn = self.lock()?;
        insert_voter(&conn, voter)
    }

    fn search_voters(&self, filter: &VoterFilter) -> StoreResult<(Vec<Voter>, u64)> {
        let conn = self.lock()?;
        let needle = filter.name_contains.as_deref().filter(|s| !s.is_empty());

        let limit = i64::try_from(filter.limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(filter.offset).unwrap_or(i64::MAX);

        let (voters, total) = match needle {
            Some(needle) => {
                let sql = format!(
                    "SELECT {VOTER_COLUMNS} FROM voters WHERE instr(fold(voter_name), fold(?1)) > 0 \
                     {NEWEST_FIRST} LIMIT ?2 OFFSET ?3"
                );
                let mut stmt = conn.prepare(&sql)?;
                let voters = stmt
                    .query_map(params![needle, limit, offset], voter_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                let total: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM voters WHERE instr(fold(voter_name), fold(?1)) > 0",
                    params![needle],
                    |row| row.get(0),
                )?;
                (voters, total)
            }
            None => {
                let sql =
                    format!("SELECT {VOTER_COLUMNS} FROM voters {NEWEST_FIRST} LIMIT ?1 OFFSET ?2");
                let mut stmt = conn.prepare(&sql)?;
                let voters = stmt
                    .query_map(params![limit, offset], voter_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                let total: i64 =
                    conn.query_row("SELECT COUNT(*) FROM voters", [], |row| row.get(0))?;
                (voters, total)
            }
        };

        Ok((voters, u64::try_from(total).unwrap_or(0)))
    }

    fn get_voter(&self, id: &str) -> StoreResult<Option<Voter>> {
        let conn = self.lock()?;
        select_voter(&conn, id)
    }

    fn update_voter(&self, id: &str, patch: &VoterPatch) -> StoreResult<Voter> {
        let conn = self.lock()?;
        let changed = conn
            .execute(
                "UPDATE voters SET
                    voter_slip_number = COALESCE(?2, voter_slip_number),
                    voter_name        = COALESCE(?3, voter_name),
                    voter_number      = COALESCE(?4, voter_number),
                    father_name       = COALESCE(?5, father_name),
                    mother_name       = COALESCE(?6, mother_name),
                    occupation        = COALESCE(?7, occupation),
                    date_of_birth     = COALESCE(?8, date_of_birth),
                    address           = COALESCE(?9, address),
                    updated_at        = ?10
                 WHERE id = ?1",
                params![
                    id,
                    patch.voter_slip_number,
                    patch.voter_name,
                    patch.voter_number,
                    patch.father_name,
                    patch.mother_name,
                    patch.occupation,
                    patch.date_of_birth,
                    patch.address,
                    Utc::now(),
                ],
            )
            .map_err(classify_write_error)?;
        if changed == 0 {
            return Err(StoreError::NotFound);
        }
        select_voter(&conn, id)?.ok_or(StoreError::NotFound)
    }

    fn delete_voter(&self, id: &str) -> StoreResult<()> {
        let conn = self.lock()?;
        match conn.execute("DELETE FROM voters WHERE id = ?1", params![id])? {
            0 => Err(StoreError::NotFound),
            _ => Ok(()),
        }
    }

    fn list_voters(&self) -> StoreResult<Vec<Voter>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("SELECT {VOTER_COLUMNS} FROM voters {NEWEST_FIRST}"))?;
        let voters = stmt
            .query_map([], voter_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(voters)
    }

    fn existing_slip_numbers(&self, candidates: &[&str]) -> StoreResult<HashSet<String>> {
        self.existing_values("voter_slip_number", candidates)
    }

    fn existing_voter_numbers(&self, candidates: &[&str]) -> StoreResult<HashSet<String>> {
        self.existing_values("voter_number", candidates)
    }

    fn insert_voters(&self, voters: &[NewVoter]) -> StoreResult<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        for voter in voters {
            // Dropping `tx` on the error path rolls the whole batch back.
            insert_voter(&tx, voter)?;
        }
        tx.commit()?;
        debug!("Inserted {} voters in one transaction", voters.len());
        Ok(voters.len())
    }
}

impl UserStore for SqliteStore {
    fn create_user(&self, email: &str, password_hash: &str, role: Role) -> StoreResult<User> {
        let conn = self.lock()?;
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role,
            created_at: now,
            updated_at: now,
        };
        conn.execute(
            &format!("INSERT INTO users ({USER_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
            params![
                user.id,
                user.email,
                user.password_hash,
                user.role.as_str(),
                user.created_at,
                user.updated_at,
            ],
        )
        .map_err(classify_write_error)?;
        Ok(user)
    }

    fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let conn = self.lock()?;
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1");
        Ok(conn.query_row(&sql, params![email], user_from_row).optional()?)
    }

    fn find_user_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        let conn = self.lock()?;
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
        Ok(conn.query_row(&sql, params![id], user_from_row).optional()?)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDate;

    pub(crate) fn new_voter(slip: &str, number: &str, name: &str) -> NewVoter {
        NewVoter {
            voter_slip_number: slip.to_string(),
            voter_name: name.to_string(),
            voter_number: number.to_string(),
            father_name: "Father".to_string(),
            mother_name: "Mother".to_string(),
            occupation: String::new(),
            date_of_birth: None,
            address: String::new(),
        }
    }

    fn setup() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    #[test]
    fn create_and_get_voter() {
        let store = setup();
        let mut input = new_voter("S-1", "N-1", "Rahim Uddin");
        input.date_of_birth = NaiveDate::from_ymd_opt(1985, 2, 28);
        input.occupation = "Farmer".into();

        let created = store.create_voter(&input).unwrap();
        assert_eq!(created.created_at, created.updated_at);

        let fetched = store.get_voter(&created.id).unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.date_of_birth, NaiveDate::from_ymd_opt(1985, 2, 28));
        assert!(store.get_voter("missing").unwrap().is_none());
    }

    #[test]
    fn duplicate_keys_are_conflicts() {
        let store = setup();
        store.create_voter(&new_voter("S-1", "N-1", "A")).unwrap();

        match store.create_voter(&new_voter("S-1", "N-2", "B")) {
            Err(StoreError::Conflict { fields }) => assert_eq!(fields, vec!["voterSlipNumber"]),
            other => panic!("expected conflict, got {other:?}"),
        }
        match store.create_voter(&new_voter("S-2", "N-1", "B")) {
            Err(StoreError::Conflict { fields }) => assert_eq!(fields, vec!["voterNumber"]),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn search_is_case_insensitive_paged_and_newest_first() {
        let store = setup();
        for i in 0..5 {
            store
                .create_voter(&new_voter(&format!("S-{i}"), &format!("N-{i}"), &format!("Karim {i}")))
                .unwrap();
        }
        store.create_voter(&new_voter("S-x", "N-x", "Someone Else")).unwrap();

        let (page, total) = store
            .search_voters(&VoterFilter {
                name_contains: Some("kARIM".into()),
                offset: 0,
                limit: 2,
            })
            .unwrap();
        assert_eq!(total, 5);
        let names: Vec<_> = page.iter().map(|v| v.voter_name.as_str()).collect();
        assert_eq!(names, vec!["Karim 4", "Karim 3"]);

        let (rest, _) = store
            .search_voters(&VoterFilter {
                name_contains: Some("karim".into()),
                offset: 4,
                limit: 2,
            })
            .unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].voter_name, "Karim 0");

        let (all, total) = store
            .search_voters(&VoterFilter {
                name_contains: None,
                offset: 0,
                limit: 100,
            })
            .unwrap();
        assert_eq!(total, 6);
        assert_eq!(all[0].voter_name, "Someone Else");
    }

    #[test]
    fn search_treats_wildcards_literally() {
        let store = setup();
        store.create_voter(&new_voter("S-1", "N-1", "100% Rahim")).unwrap();
        store.create_voter(&new_voter("S-2", "N-2", "Rahim_Uddin")).unwrap();
        store.create_voter(&new_voter("S-3", "N-3", "Abdul")).unwrap();

        let count = |needle: &str| {
            store
                .search_voters(&VoterFilter {
                    name_contains: Some(needle.into()),
                    offset: 0,
                    limit: 10,
                })
                .unwrap()
                .1
        };
        assert_eq!(count("%"), 1);
        assert_eq!(count("_"), 1);
        assert_eq!(count("rahim"), 2);
    }

    #[test]
    fn search_folds_non_ascii_case() {
        let store = setup();
        store.create_voter(&new_voter("S-1", "N-1", "ÉLODIE Ömer")).unwrap();
        store.create_voter(&new_voter("S-2", "N-2", "Elodie Smith")).unwrap();

        let search = |needle: &str| {
            store
                .search_voters(&VoterFilter {
                    name_contains: Some(needle.into()),
                    offset: 0,
                    limit: 10,
                })
                .unwrap()
        };
        let (found, total) = search("élodie");
        assert_eq!(total, 1);
        assert_eq!(found[0].voter_name, "ÉLODIE Ömer");
        assert_eq!(search("öMER").1, 1);
        assert_eq!(search("ÉLO").1, 1);
    }

    #[test]
    fn update_applies_patch_and_detects_conflicts() {
        let store = setup();
        let first = store.create_voter(&new_voter("S-1", "N-1", "A")).unwrap();
        store.create_voter(&new_voter("S-2", "N-2", "B")).unwrap();

        let updated = store
            .update_voter(
                &first.id,
                &VoterPatch {
                    voter_name: Some("Alpha".into()),
                    address: Some("Dhaka".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.voter_name, "Alpha");
        assert_eq!(updated.address, "Dhaka");
        assert_eq!(updated.voter_slip_number, "S-1");
        assert_eq!(updated.created_at, first.created_at);
        assert!(updated.updated_at >= first.updated_at);

        let clash = store.update_voter(
            &first.id,
            &VoterPatch {
                voter_number: Some("N-2".into()),
                ..Default::default()
            },
        );
        assert!(matches!(clash, Err(StoreError::Conflict { .. })));

        let missing = store.update_voter("nope", &VoterPatch::default());
        assert!(matches!(missing, Err(StoreError::NotFound)));
    }

    #[test]
    fn delete_removes_and_reports_missing() {
        let store = setup();
        let voter = store.create_voter(&new_voter("S-1", "N-1", "A")).unwrap();
        store.delete_voter(&voter.id).unwrap();
        assert!(store.get_voter(&voter.id).unwrap().is_none());
        assert!(matches!(store.delete_voter(&voter.id), Err(StoreError::NotFound)));
    }

    #[test]
    fn existing_key_lookups_return_only_matches() {
        let store = setup();
        store.create_voter(&new_voter("S-1", "N-1", "A")).unwrap();
        store.create_voter(&new_voter("S-2", "N-2", "B")).unwrap();

        let slips = store.existing_slip_numbers(&["S-2", "S-9"]).unwrap();
        assert_eq!(slips, HashSet::from(["S-2".to_string()]));
        let numbers = store.existing_voter_numbers(&["N-1", "N-2", "N-3"]).unwrap();
        assert_eq!(numbers.len(), 2);
        assert!(store.existing_slip_numbers(&[]).unwrap().is_empty());
    }

    #[test]
    fn existing_key_lookups_span_chunks() {
        let store = setup();
        let batch: Vec<NewVoter> = (0..LOOKUP_CHUNK + 10)
            .map(|i| new_voter(&format!("S-{i}"), &format!("N-{i}"), "Bulk"))
            .collect();
        store.insert_voters(&batch).unwrap();

        let candidates: Vec<String> = (0..LOOKUP_CHUNK + 20).map(|i| format!("S-{i}")).collect();
        let refs: Vec<&str> = candidates.iter().map(String::as_str).collect();
        assert_eq!(store.existing_slip_numbers(&refs).unwrap().len(), LOOKUP_CHUNK + 10);
    }

    #[test]
    fn bulk_insert_is_all_or_nothing() {
        let store = setup();
        store.create_voter(&new_voter("S-taken", "N-0", "Existing")).unwrap();

        let batch = vec![
            new_voter("S-1", "N-1", "A"),
            new_voter("S-2", "N-2", "B"),
            new_voter("S-taken", "N-3", "C"),
        ];
        let err = store.insert_voters(&batch).unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
        assert_eq!(store.list_voters().unwrap().len(), 1);

        assert_eq!(store.insert_voters(&batch[..2]).unwrap(), 2);
        assert_eq!(store.list_voters().unwrap().len(), 3);
    }

    #[test]
    fn users_round_trip_and_emails_are_unique() {
        let store = setup();
        let user = store
            .create_user("admin@example.com", "$argon2id$hash", Role::SuperAdmin)
            .unwrap();

        let by_email = store.find_user_by_email("admin@example.com").unwrap().unwrap();
        assert_eq!(by_email, user);
        let by_id = store.find_user_by_id(&user.id).unwrap().unwrap();
        assert_eq!(by_id.role, Role::SuperAdmin);

        let dup = store.create_user("admin@example.com", "x", Role::EndUser);
        match dup {
            Err(StoreError::Conflict { fields }) => assert_eq!(fields, vec!["email"]),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn file_database_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voters.sqlite");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.create_voter(&new_voter("S-1", "N-1", "Persisted")).unwrap();
        }

        let reopened = SqliteStore::open(&path).unwrap();
        let voters = reopened.list_voters().unwrap();
        assert_eq!(voters.len(), 1);
        assert_eq!(voters[0].voter_name, "Persisted");
    }

    #[test]
    fn snake_case_columns_map_to_wire_names() {
        assert_eq!(snake_to_camel("voter_slip_number"), "voterSlipNumber");
        assert_eq!(snake_to_camel("email"), "email");
    }
}
