//! CSV source with encoding and delimiter auto-detection.
//!
//! Turns a file or byte buffer into a [`Dataset`]: the header row plus one
//! [`Record`] per data row. Cells are kept exactly as read (no trimming);
//! cleaning belongs to the validation pipeline.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

use crate::error::{SourceError, SourceResult};
use crate::models::Record;

/// Parsed tabular source with metadata
#[derive(Debug, Clone, Serialize)]
pub struct Dataset {
    /// Column headers, in file order
    pub headers: Vec<String>,
    /// One record per non-blank data row
    pub records: Vec<Record>,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to a string using the given encoding.
///
/// Unknown encodings fall back to lossy UTF-8. A UTF-8 BOM is dropped.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let decoded = match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    };

    match decoded.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => decoded,
    }
}

/// Detect the delimiter by counting occurrences in the first line.
///
/// Defaults to `,` when no candidate appears.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse decoded CSV text with an explicit delimiter.
///
/// Rows shorter than the header get `null` for the missing cells; extra
/// cells are ignored. Blank lines are skipped.
///
/// # Example
/// ```
/// use rowcheck::parse_csv_str;
///
/// let dataset = parse_csv_str("id,price\n1,9.9\n2,\n", ',').unwrap();
/// assert_eq!(dataset.headers, vec!["id", "price"]);
/// assert_eq!(dataset.records.len(), 2);
/// assert_eq!(dataset.records[1]["price"], "");
/// ```
pub fn parse_csv_str(content: &str, delimiter: char) -> SourceResult<Dataset> {
    if content.trim().is_empty() {
        return Err(SourceError::EmptyFile);
    }

    if !delimiter.is_ascii() {
        return Err(SourceError::Parse {
            line: 1,
            message: format!("delimiter '{}' is not an ASCII character", delimiter),
        });
    }
    let delimiter_byte = delimiter as u8;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_byte)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(parse_error)?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(SourceError::NoHeaders);
    }
    check_duplicate_headers(&headers)?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(parse_error)?;

        let record: Record = headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let value = row
                    .get(i)
                    .map(|cell| Value::String(cell.to_string()))
                    .unwrap_or(Value::Null);
                (header.clone(), value)
            })
            .collect();

        records.push(record);
    }

    Ok(Dataset {
        headers,
        records,
        encoding: "utf-8".to_string(),
        delimiter,
    })
}

/// Named columns must be unique; repeated blank headers only warn.
fn check_duplicate_headers(headers: &[String]) -> SourceResult<()> {
    let mut seen = HashSet::new();
    let mut blank_repeats = 0;

    for header in headers {
        if seen.insert(header.as_str()) {
            continue;
        }
        if header.trim().is_empty() {
            blank_repeats += 1;
        } else {
            return Err(SourceError::Parse {
                line: 1,
                message: format!("duplicate header '{}'", header),
            });
        }
    }

    if blank_repeats > 0 {
        tracing::warn!(repeats = blank_repeats, "blank header repeated, later columns overwrite earlier ones");
    }
    Ok(())
}

fn parse_error(err: csv::Error) -> SourceError {
    let line = err.position().map(csv::Position::line).unwrap_or(0);
    SourceError::Parse {
        line,
        message: err.to_string(),
    }
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> SourceResult<Dataset> {
    read_csv_bytes(bytes, None)
}

/// Parse CSV bytes, auto-detecting the delimiter unless one is given.
pub fn read_csv_bytes(bytes: &[u8], delimiter: Option<char>) -> SourceResult<Dataset> {
    if bytes.is_empty() {
        return Err(SourceError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));

    let mut dataset = parse_csv_str(&content, delimiter)?;
    dataset.encoding = encoding;
    Ok(dataset)
}

/// Read and parse a CSV file.
///
/// A missing file is reported as [`SourceError::FileNotFound`] before any
/// parsing happens.
pub fn read_csv_file(path: &Path, delimiter: Option<char>) -> SourceResult<Dataset> {
    let bytes = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SourceError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            SourceError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    let dataset = read_csv_bytes(&bytes, delimiter)?;
    tracing::debug!(
        path = %path.display(),
        encoding = %dataset.encoding,
        delimiter = %format_delimiter(dataset.delimiter),
        rows = dataset.records.len(),
        "read CSV source"
    );
    Ok(dataset)
}

/// Format delimiter for display
pub fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "TAB".to_string(),
        c => c.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_simple_csv() {
        let dataset = parse_csv_str("name;age\nAlice;30\nBob;25", ';').unwrap();

        assert_eq!(dataset.records.len(), 2);
        assert_eq!(dataset.records[0]["name"], "Alice");
        assert_eq!(dataset.records[0]["age"], "30");
        assert_eq!(dataset.records[1]["name"], "Bob");
        assert_eq!(dataset.records[1]["age"], "25");
    }

    #[test]
    fn test_quoted_values_keep_delimiters() {
        let csv = "name,value\n\"Smith, Alice\",\"Hello World\"";
        let dataset = parse_csv_str(csv, ',').unwrap();

        assert_eq!(dataset.records[0]["name"], "Smith, Alice");
        assert_eq!(dataset.records[0]["value"], "Hello World");
    }

    #[test]
    fn test_cells_not_trimmed() {
        let dataset = parse_csv_str("id,name\n 1 , Bob ", ',').unwrap();
        assert_eq!(dataset.records[0]["id"], " 1 ");
        assert_eq!(dataset.records[0]["name"], " Bob ");
    }

    #[test]
    fn test_empty_lines_skipped() {
        let dataset = parse_csv_str("a;b\n1;2\n\n3;4\n", ';').unwrap();
        assert_eq!(dataset.records.len(), 2);
    }

    #[test]
    fn test_short_rows_get_null() {
        let dataset = parse_csv_str("a,b,c\n1", ',').unwrap();

        assert_eq!(dataset.records[0]["a"], "1");
        assert_eq!(dataset.records[0]["b"], Value::Null);
        assert_eq!(dataset.records[0]["c"], Value::Null);
    }

    #[test]
    fn test_extra_columns_ignored() {
        let dataset = parse_csv_str("a;b\n1;2;3;4", ';').unwrap();

        assert_eq!(dataset.records[0].len(), 2);
        assert_eq!(dataset.records[0]["b"], "2");
    }

    #[test]
    fn test_header_only() {
        let dataset = parse_csv_str("id,price\n", ',').unwrap();
        assert_eq!(dataset.headers, vec!["id", "price"]);
        assert!(dataset.records.is_empty());
    }

    #[test]
    fn test_empty_csv_error() {
        assert!(matches!(parse_csv_str("", ','), Err(SourceError::EmptyFile)));
        assert!(matches!(parse_bytes_auto(b""), Err(SourceError::EmptyFile)));
    }

    #[test]
    fn test_blank_header_row_error() {
        assert!(matches!(parse_csv_str(",,\n1,2,3", ','), Err(SourceError::NoHeaders)));
    }

    #[test]
    fn test_non_ascii_delimiter_error() {
        let err = parse_csv_str("a\u{e9}b\n1\u{e9}2", '\u{e9}').unwrap_err();
        assert!(matches!(err, SourceError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_duplicate_header_error() {
        match parse_csv_str("id,id\n1,2", ',') {
            Err(SourceError::Parse { line, message }) => {
                assert_eq!(line, 1);
                assert!(message.contains("'id'"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_repeated_blank_headers_allowed() {
        let dataset = parse_csv_str("id,,\n1,x,y", ',').unwrap();
        assert_eq!(dataset.headers, vec!["id", "", ""]);
        assert_eq!(dataset.records[0]["id"], "1");
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
        assert_eq!(detect_delimiter("single"), ',');
    }

    #[test]
    fn test_auto_parse() {
        let dataset = parse_bytes_auto(b"name;age\nAlice;30\nBob;25").unwrap();

        assert_eq!(dataset.delimiter, ';');
        assert_eq!(dataset.records.len(), 2);
        assert_eq!(dataset.headers, vec!["name", "age"]);
    }

    #[test]
    fn test_utf8_bom_stripped() {
        let dataset = parse_bytes_auto(b"\xEF\xBB\xBFid,price\n1,2").unwrap();
        assert_eq!(dataset.headers, vec!["id", "price"]);
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1");
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_csv_file(Path::new("/no/such/input.csv"), None).unwrap_err();
        assert!(matches!(err, SourceError::FileNotFound { .. }));
    }

    #[test]
    fn test_read_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "id,price\n1,9.9\n,5\n3,oops\n").unwrap();

        let dataset = read_csv_file(file.path(), None).unwrap();
        assert_eq!(dataset.delimiter, ',');
        assert_eq!(dataset.records.len(), 3);
        assert_eq!(dataset.records[1]["id"], "");
    }
}
