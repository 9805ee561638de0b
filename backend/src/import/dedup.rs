use crate::db::{StoreResult, VoterStore};
use common::model::voter::NewVoter;
use std::collections::HashSet;
use std::fmt;

/// Why a row was rejected as a duplicate. Slip numbers are checked first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Duplicate {
    SlipNumber(String),
    VoterNumber(String),
}

impl fmt::Display for Duplicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Duplicate::SlipNumber(value) => write!(f, "Duplicate voter slip number: {value}"),
            Duplicate::VoterNumber(value) => write!(f, "Duplicate voter number: {value}"),
        }
    }
}

/// Tracks every slip number and voter number that is already taken, either in the
/// store or by a row admitted earlier in the same batch.
///
/// The sets only ever grow: a rejected row never adds its keys, so later rows collide
/// with accepted rows only.
#[derive(Debug, Default)]
pub struct DuplicateFilter {
    seen_slips: HashSet<String>,
    seen_numbers: HashSet<String>,
}

impl DuplicateFilter {
    /// Seeds the filter with the keys of `candidates` that already exist in `store`.
    pub fn seeded<'a, S, I>(store: &S, candidates: I) -> StoreResult<Self>
    where
        S: VoterStore + ?Sized,
        I: IntoIterator<Item = &'a NewVoter>,
    {
        let (slips, numbers): (Vec<&str>, Vec<&str>) = candidates
            .into_iter()
            .map(|v| (v.voter_slip_number.as_str(), v.voter_number.as_str()))
            .unzip();

        Ok(Self {
            seen_slips: store.existing_slip_numbers(&slips)?,
            seen_numbers: store.existing_voter_numbers(&numbers)?,
        })
    }

    /// Admits `voter` and records its keys, or reports the first colliding key.
    pub fn admit(&mut self, voter: &NewVoter) -> Result<(), Duplicate> {
        if self.seen_slips.contains(&voter.voter_slip_number) {
            return Err(Duplicate::SlipNumber(voter.voter_slip_number.clone()));
        }
        if self.seen_numbers.contains(&voter.voter_number) {
            return Err(Duplicate::VoterNumber(voter.voter_number.clone()));
        }
        self.seen_slips.insert(voter.voter_slip_number.clone());
        self.seen_numbers.insert(voter.voter_number.clone());
        Ok(())
    }
}
