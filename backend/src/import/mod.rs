//! CSV import pipeline for voter records.
//!
//! An import runs as one pass over an in-memory buffer:
//!
//! 1. **Parse** (`parse`): header line plus data rows, trimmed, blank lines dropped.
//!    Structural problems or an empty file fail the whole call with `BadRequest`.
//! 2. **Map** (`mapper`): each row is resolved onto the creation payload by trying the
//!    spreadsheet label, then the camelCase name, then the snake_case name per field.
//! 3. **Validate** (`crate::validation`): the same rules as `POST /api/voters`. Failing
//!    rows are reported and skipped; they never abort the batch.
//! 4. **Deduplicate** (`dedup`): keys already in the store seed the filter, then rows
//!    are admitted in file order so later rows collide with earlier accepted ones.
//! 5. **Insert**: all admitted rows go to the store in one transaction. A failure here,
//!    including a unique-constraint race with another request, fails the whole call
//!    and persists nothing.
//!
//! Mapping and validation are independent per row and run on the rayon pool; the
//! deduplication walk is sequential.

mod dedup;
mod mapper;
mod parse;
mod report;

use crate::db::VoterStore;
use crate::error::ApiResult;
use crate::validation::validate_new_voter;
use common::model::import::ImportReport;
use common::model::voter::NewVoter;
use dedup::DuplicateFilter;
use log::info;
use parse::CsvRow;
use rayon::prelude::*;
use report::ReportBuilder;

/// Offset between a row's 0-based position among data rows and its spreadsheet line.
const HEADER_OFFSET: usize = 2;

/// A row that passed validation, tagged with its spreadsheet line number.
#[derive(Debug)]
struct ValidRow {
    row: usize,
    voter: NewVoter,
}

fn validate_rows(rows: &[CsvRow], report: &mut ReportBuilder) -> Vec<ValidRow> {
    let outcomes: Vec<_> = rows
        .par_iter()
        .enumerate()
        .map(|(idx, raw)| (idx + HEADER_OFFSET, validate_new_voter(&mapper::map_row(raw))))
        .collect();

    let mut valid = Vec::with_capacity(outcomes.len());
    for (row, outcome) in outcomes {
        match outcome {
            Ok(voter) => valid.push(ValidRow { row, voter }),
            Err(errors) => report.skip(row, errors.join("; ")),
        }
    }
    valid
}

fn filter_duplicates<S: VoterStore + ?Sized>(
    store: &S,
    valid: Vec<ValidRow>,
    report: &mut ReportBuilder,
) -> ApiResult<Vec<NewVoter>> {
    if valid.is_empty() {
        return Ok(Vec::new());
    }

    let mut filter = DuplicateFilter::seeded(store, valid.iter().map(|v| &v.voter))?;
    let mut accepted = Vec::with_capacity(valid.len());
    for ValidRow { row, voter } in valid {
        match filter.admit(&voter) {
            Ok(()) => accepted.push(voter),
            Err(duplicate) => report.skip(row, duplicate.to_string()),
        }
    }
    Ok(accepted)
}

/// Imports every acceptable row of `bytes` into `store` and reports on the rest.
pub fn import_csv<S: VoterStore + ?Sized>(store: &S, bytes: &[u8]) -> ApiResult<ImportReport> {
    let rows = parse::parse_rows(bytes)?;
    let mut report = ReportBuilder::new(rows.len());

    let valid = validate_rows(&rows, &mut report);
    let accepted = filter_duplicates(store, valid, &mut report)?;

    let imported = if accepted.is_empty() {
        0
    } else {
        store.insert_voters(&accepted)?
    };

    info!(
        "CSV import finished: {} rows, {} imported, {} skipped",
        rows.len(),
        imported,
        report.skipped()
    );
    Ok(report.finish(imported))
}
