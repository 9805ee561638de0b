use common::model::import::{ImportReport, ImportRowError};

/// Accumulates skipped rows while an import moves through its phases.
#[derive(Debug)]
pub struct ReportBuilder {
    total: usize,
    errors: Vec<ImportRowError>,
}

impl ReportBuilder {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            errors: Vec::new(),
        }
    }

    /// Records `row` (spreadsheet line number) as skipped.
    pub fn skip(&mut self, row: usize, reason: impl Into<String>) {
        self.errors.push(ImportRowError {
            row,
            reason: reason.into(),
        });
    }

    pub fn skipped(&self) -> usize {
        self.errors.len()
    }

    /// Closes the report once `imported` rows have been committed.
    pub fn finish(mut self, imported: usize) -> ImportReport {
        debug_assert_eq!(imported + self.errors.len(), self.total);
        // Phases record skips in their own passes; present them in file order.
        self.errors.sort_by_key(|e| e.row);
        ImportReport {
            total: self.total,
            imported,
            skipped: self.errors.len(),
            errors: self.errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_orders_errors_by_row() {
        let mut builder = ReportBuilder::new(4);
        builder.skip(5, "Duplicate voter number: N-1");
        builder.skip(2, "voterName: Voter name is required");
        assert_eq!(builder.skipped(), 2);

        let report = builder.finish(2);
        assert_eq!(report.total, 4);
        assert_eq!(report.imported, 2);
        assert_eq!(report.skipped, 2);
        let rows: Vec<_> = report.errors.iter().map(|e| e.row).collect();
        assert_eq!(rows, vec![2, 5]);
    }
}
