use serde::{Deserialize, Serialize};

/// One row that was not imported, with the reason it was skipped.
///
/// `row` is the line number a person would see in a spreadsheet editor: the header is
/// line 1, so the first data row is 2.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRowError {
    pub row: usize,
    pub reason: String,
}

/// Outcome of a single CSV import call. `imported + skipped == total` always holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub total: usize,
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<ImportRowError>,
}

impl ImportReport {
    /// Human-readable one-line summary used as the response message.
    pub fn summary(&self) -> String {
        format!(
            "Import complete: {} imported, {} skipped out of {} rows",
            self.imported, self.skipped, self.total
        )
    }
}
