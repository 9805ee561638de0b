use crate::error::{ApiError, ApiResult};
use csv::{ReaderBuilder, StringRecord, Trim};
use log::debug;
use std::collections::HashMap;

const INVALID_FORMAT: &str = "Invalid CSV file format";
const EMPTY_FILE: &str = "CSV file is empty";

/// One data row keyed by its (trimmed) header names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvRow {
    values: HashMap<String, String>,
}

impl CsvRow {
    fn from_record(headers: &StringRecord, record: &StringRecord) -> Self {
        let mut values = HashMap::with_capacity(headers.len());
        for (header, value) in headers.iter().zip(record.iter()) {
            // A repeated header keeps its first column.
            values
                .entry(header.to_string())
                .or_insert_with(|| value.to_string());
        }
        Self { values }
    }

    pub fn get(&self, header: &str) -> Option<&str> {
        self.values.get(header).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CsvRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted,
    /// A `"` inside a quoted field: either the closing quote or the first half of `""`.
    QuoteInQuoted,
    AfterQuoted,
}

/// Walks field boundaries and checks that quotes only open a field, that `""` is the
/// only quote inside a quoted field, and that every quoted field is closed.
///
/// The reader tolerates all three (it closes an open field at EOF and keeps stray
/// quotes as text), so they are rejected here before any row is read.
fn quotes_are_well_formed(bytes: &[u8]) -> bool {
    use QuoteState::*;

    let bytes = bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(bytes);
    let mut state = FieldStart;
    for &b in bytes {
        state = match (state, b) {
            (Quoted, b'"') => QuoteInQuoted,
            (Quoted, _) => Quoted,
            (QuoteInQuoted, b'"') => Quoted,
            (_, b',' | b'\n' | b'\r') => FieldStart,
            (QuoteInQuoted | AfterQuoted, b' ' | b'\t') => AfterQuoted,
            (QuoteInQuoted | AfterQuoted, _) => return false,
            (FieldStart, b'"') => Quoted,
            (Unquoted, b'"') => return false,
            (FieldStart | Unquoted, _) => Unquoted,
        };
    }
    state != Quoted
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(str::is_empty) && record.len() <= 1
}

/// Parses a whole CSV buffer whose first line is the header.
///
/// Fails with `BadRequest` on any structural problem (an unterminated or misplaced
/// quote, a record whose length differs from the header, invalid UTF-8) and when there
/// is no data row at all. Blank lines are dropped and not counted.
pub fn parse_rows(bytes: &[u8]) -> ApiResult<Vec<CsvRow>> {
    if !quotes_are_well_formed(bytes) {
        debug!("Rejecting CSV with an unterminated or misplaced quote");
        return Err(ApiError::bad_request(INVALID_FORMAT));
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(bytes);

    let invalid = |err: csv::Error| {
        debug!("CSV parse error: {}", err);
        ApiError::bad_request(INVALID_FORMAT)
    };

    let headers = reader.headers().map_err(invalid)?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(invalid)?;
        if is_blank(&record) {
            continue;
        }
        if record.len() != headers.len() {
            debug!(
                "CSV record at line {} has {} fields, header has {}",
                record.position().map(|p| p.line()).unwrap_or_default(),
                record.len(),
                headers.len()
            );
            return Err(ApiError::bad_request(INVALID_FORMAT));
        }
        rows.push(CsvRow::from_record(&headers, &record));
    }

    if rows.is_empty() {
        return Err(ApiError::bad_request(EMPTY_FILE));
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(err: ApiError) -> String {
        match err {
            ApiError::BadRequest(msg) => msg,
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }

    #[test]
    fn rows_are_keyed_by_trimmed_headers_and_values() {
        let csv = b" Voter Name , voterNumber\n  Rahim  ,N-1 \n\nKarim,N-2\n";
        let rows = parse_rows(csv).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Voter Name"), Some("Rahim"));
        assert_eq!(rows[0].get("voterNumber"), Some("N-1"));
        assert_eq!(rows[1].get("Voter Name"), Some("Karim"));
    }

    #[test]
    fn quoted_fields_keep_commas_and_newlines() {
        let csv = b"name,address\n\"Rahim, Jr.\",\"House 4\nRoad \"\"B\"\"\"\n";
        let rows = parse_rows(csv).unwrap();
        assert_eq!(rows[0].get("name"), Some("Rahim, Jr."));
        assert_eq!(rows[0].get("address"), Some("House 4\nRoad \"B\""));
    }

    #[test]
    fn crlf_and_bom_are_accepted() {
        let csv = "\u{feff}name,number\r\nRahim,N-1\r\n".as_bytes();
        let rows = parse_rows(csv).unwrap();
        assert_eq!(rows[0].get("name"), Some("Rahim"));
    }

    #[test]
    fn unterminated_quote_is_bad_request() {
        let csv = b"name,number\n\"Rahim,N-1\n";
        assert_eq!(message(parse_rows(csv).unwrap_err()), INVALID_FORMAT);
    }

    #[test]
    fn open_quote_hidden_by_a_stray_quote_is_bad_request() {
        // Two quotes in total, but the second one opens a field that never closes.
        let csv = b"H1,H2\nx\"y,\"z,2\n";
        assert_eq!(message(parse_rows(csv).unwrap_err()), INVALID_FORMAT);
    }

    #[test]
    fn misplaced_quotes_are_bad_request() {
        for csv in [
            &b"name,number\nRa\"him,N-1\n"[..],
            &b"name,number\n\"Rahim\"x,N-1\n"[..],
        ] {
            assert_eq!(message(parse_rows(csv).unwrap_err()), INVALID_FORMAT);
        }
    }

    #[test]
    fn quote_scan_follows_field_boundaries() {
        assert!(quotes_are_well_formed(b"a,b\n\"x\"\"y\",\"\"\n"));
        assert!(quotes_are_well_formed(b"a\r\n\"closed\" ,2"));
        assert!(quotes_are_well_formed("\u{feff}\"name\",n\n".as_bytes()));
        assert!(!quotes_are_well_formed(b"a\n\"open"));
        assert!(!quotes_are_well_formed(b"a\n\"x\"\"\n"));
    }

    #[test]
    fn ragged_record_is_bad_request() {
        let csv = b"name,number\nRahim,N-1,extra\n";
        assert_eq!(message(parse_rows(csv).unwrap_err()), INVALID_FORMAT);
    }

    #[test]
    fn invalid_utf8_is_bad_request() {
        let csv = b"name,number\n\xff\xfe,N-1\n";
        assert_eq!(message(parse_rows(csv).unwrap_err()), INVALID_FORMAT);
    }

    #[test]
    fn header_only_and_empty_input_are_empty_file() {
        assert_eq!(message(parse_rows(b"name,number\n").unwrap_err()), EMPTY_FILE);
        assert_eq!(message(parse_rows(b"name,number\n\n\n").unwrap_err()), EMPTY_FILE);
        assert_eq!(message(parse_rows(b"").unwrap_err()), EMPTY_FILE);
    }

    #[test]
    fn repeated_header_keeps_first_column() {
        let rows = parse_rows(b"name,name\nfirst,second\n").unwrap();
        assert_eq!(rows[0].get("name"), Some("first"));
    }
}
