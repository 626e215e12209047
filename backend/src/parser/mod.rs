//! Table loader with encoding and delimiter auto-detection.
//!
//! Reads a tabular source into ordered rows of `column -> string`. Every
//! absent cell becomes `""`; header order and row order are kept as found.
//! No catalog-specific logic here.

use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{CsvError, CsvResult};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// One data row with its source line (1-based, header is line 1).
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub line: u64,
    pub fields: Map<String, Value>,
}

impl Row {
    /// Cell value, `""` when the column does not exist.
    pub fn get(&self, column: &str) -> &str {
        self.fields.get(column).and_then(Value::as_str).unwrap_or("")
    }
}

/// A loaded table with parsing metadata.
#[derive(Debug, Clone)]
pub struct Table {
    /// Column headers, in source order
    pub headers: Vec<String>,
    /// Data rows, in source order
    pub rows: Vec<Row>,
    /// Detected encoding
    pub encoding: String,
    /// Detected delimiter
    pub delimiter: char,
}

impl Table {
    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows as JSON objects.
    pub fn records(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| Value::Object(row.fields.clone()))
            .collect()
    }
}

/// Minimum chardet confidence for a guess to be trusted.
const MIN_CONFIDENCE: f32 = 0.5;

/// Detect the encoding of raw bytes.
///
/// Valid UTF-8 (with or without BOM) always wins. Bytes that decode
/// cleanly as EUC-KR/CP949 are taken as Korean next; chardet is only asked
/// about everything else, and a low-confidence guess is rejected.
pub fn detect_encoding(bytes: &[u8]) -> CsvResult<String> {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if std::str::from_utf8(body).is_ok() {
        return Ok("utf-8".to_string());
    }

    if encoding_rs::EUC_KR
        .decode_without_bom_handling_and_without_replacement(bytes)
        .is_some()
    {
        return Ok("euc-kr".to_string());
    }

    let (charset, confidence, _) = chardet::detect(bytes);
    if confidence < MIN_CONFIDENCE {
        return Err(CsvError::EncodingError(format!(
            "could not detect encoding (best guess '{}' at {:.0}% confidence)",
            charset,
            confidence * 100.0
        )));
    }

    let label = match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "euc-kr" | "cp949" | "uhc" | "windows-949" => "euc-kr".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    };
    Ok(label)
}

/// Decode bytes to a string using the given encoding. A UTF-8 BOM is dropped.
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => {
            let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
            String::from_utf8(body.to_vec())
                .map_err(|e| CsvError::EncodingError(format!("invalid UTF-8: {}", e)))
        }
        label => {
            let codec = encoding_rs::Encoding::for_label(label.as_bytes()).ok_or_else(|| {
                CsvError::EncodingError(format!("unsupported encoding '{}'", label))
            })?;
            codec
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|text| text.into_owned())
                .ok_or_else(|| {
                    CsvError::EncodingError(format!("content is not valid {}", codec.name()))
                })
        }
    }
}

/// Detect the delimiter by counting occurrences in the header line.
///
/// Falls back to `,` when no candidate appears.
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

/// Load a table from disk with auto-detection of encoding and delimiter.
///
/// # Errors
/// [`CsvError::SourceMissing`] when the path does not exist.
pub fn load_table(path: &Path) -> CsvResult<Table> {
    let bytes = fs::read(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            CsvError::SourceMissing {
                path: path.to_path_buf(),
            }
        } else {
            CsvError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    parse_bytes_auto(&bytes)
}

/// Parse raw bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> CsvResult<Table> {
    let encoding = detect_encoding(bytes)?;
    let content = decode_content(bytes, &encoding)?;
    let delimiter = detect_delimiter(&content);
    parse_table(&content, delimiter, encoding)
}

/// Parse decoded content with an explicit delimiter.
///
/// Short rows are padded with `""`; rows with more cells than headers are
/// rejected; blank lines are skipped.
pub fn parse_table(content: &str, delimiter: char, encoding: String) -> CsvResult<Table> {
    let delimiter_byte = u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| CsvError::ParseError {
            line: 1,
            message: format!("delimiter '{}' is not a single ASCII character", delimiter),
        })?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_byte)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let header_record = reader.headers().map_err(|e| csv_parse_error(&e, 1))?.clone();
    let headers: Vec<String> = header_record.iter().map(|h| h.trim().to_string()).collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::EmptyFile);
    }
    for (i, header) in headers.iter().enumerate() {
        if headers[..i].contains(header) {
            return Err(CsvError::ParseError {
                line: 1,
                message: format!("duplicate column '{}'", header),
            });
        }
    }

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let fallback_line = idx as u64 + 2;
        let record = result.map_err(|e| csv_parse_error(&e, fallback_line))?;
        let line = record.position().map(|p| p.line()).unwrap_or(fallback_line);

        let blank = record.len() <= 1 && record.get(0).map_or(true, |v| v.trim().is_empty());
        if headers.len() > 1 && blank {
            continue;
        }

        if record.len() > headers.len() {
            return Err(CsvError::ParseError {
                line,
                message: format!(
                    "expected {} fields, found {}",
                    headers.len(),
                    record.len()
                ),
            });
        }

        let mut fields = Map::new();
        for (i, header) in headers.iter().enumerate() {
            let value = record.get(i).unwrap_or("");
            fields.insert(header.clone(), Value::String(value.to_string()));
        }
        rows.push(Row { line, fields });
    }

    Ok(Table {
        headers,
        rows,
        encoding,
        delimiter,
    })
}

fn csv_parse_error(err: &csv::Error, fallback_line: u64) -> CsvError {
    let line = err
        .position()
        .map(|p| p.line())
        .unwrap_or(fallback_line);
    CsvError::ParseError {
        line,
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn parse(content: &str) -> Table {
        parse_bytes_auto(content.as_bytes()).unwrap()
    }

    #[test]
    fn test_simple_csv() {
        let table = parse("code,name_en,status\nE120,Cochineal,Haram\nE330,Citric acid,Halal");

        assert_eq!(table.headers, vec!["code", "name_en", "status"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].get("code"), "E120");
        assert_eq!(table.rows[1].get("name_en"), "Citric acid");
        assert_eq!(table.delimiter, ',');
        assert_eq!(table.encoding, "utf-8");
    }

    #[test]
    fn test_missing_values_become_empty_strings() {
        let table = parse("code,name_en,status\n,Pork,Haram\nE471,,");

        assert_eq!(table.rows[0].fields["code"], "");
        assert_eq!(table.rows[1].fields["name_en"], "");
        assert_eq!(table.rows[1].fields["status"], "");
    }

    #[test]
    fn test_short_rows_are_padded() {
        let table = parse("a,b,c\n1");
        let row = &table.rows[0];
        assert_eq!(row.fields.len(), 3);
        assert_eq!(row.fields["b"], "");
        assert_eq!(row.fields["c"], "");
    }

    #[test]
    fn test_extra_cells_rejected() {
        let err = parse_bytes_auto("a,b\n1,2,3".as_bytes()).unwrap_err();
        match err {
            CsvError::ParseError { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("expected 2 fields"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_quoted_values_keep_delimiters() {
        let table = parse("name_en,description\n\"Gelatin\",\"Animal bones, skin\"");
        assert_eq!(table.rows[0].get("description"), "Animal bones, skin");
    }

    #[test]
    fn test_column_and_row_order_preserved() {
        let table = parse("status,code,name_en\nHaram,E120,Cochineal\nHalal,E330,Citric acid");
        let keys: Vec<&String> = table.rows[0].fields.keys().collect();
        assert_eq!(keys, vec!["status", "code", "name_en"]);
        assert_eq!(table.rows[0].line, 2);
        assert_eq!(table.rows[1].line, 3);
    }

    #[test]
    fn test_empty_lines_skipped() {
        let table = parse("a,b\n1,2\n\n3,4\n");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_empty_csv_error() {
        assert!(matches!(parse_bytes_auto(b""), Err(CsvError::EmptyFile)));
    }

    #[test]
    fn test_duplicate_header_rejected() {
        let err = parse_bytes_auto(b"id,id\n1,2").unwrap_err();
        assert!(err.to_string().contains("duplicate column 'id'"));
    }

    #[test]
    fn test_utf8_bom_stripped() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice("id,name_en\nP1,Banana Milk".as_bytes());
        let table = parse_bytes_auto(&bytes).unwrap();
        assert_eq!(table.headers[0], "id");
    }

    #[test]
    fn test_korean_utf8_kept_literally() {
        let table = parse("code,name_local\nE120,코치닐");
        assert_eq!(table.rows[0].get("name_local"), "코치닐");
    }

    #[test]
    fn test_euc_kr_decoding() {
        let (bytes, _, _) = encoding_rs::EUC_KR.encode("돼지고기");
        let decoded = decode_content(&bytes, "euc-kr").unwrap();
        assert_eq!(decoded, "돼지고기");
    }

    #[test]
    fn test_euc_kr_table_detected() {
        let source = "code,name_en,name_local,status,description\n\
                      E120,Cochineal,코치닐,Haram,Insect dye\n\
                      ,Pork,돼지고기,Haram,Pig meat\n";
        let (bytes, _, _) = encoding_rs::EUC_KR.encode(source);
        assert!(std::str::from_utf8(&bytes).is_err());

        let table = parse_bytes_auto(&bytes).unwrap();
        assert_eq!(table.encoding, "euc-kr");
        assert_eq!(table.rows[0].get("name_local"), "코치닐");
        assert_eq!(table.rows[1].get("name_local"), "돼지고기");
    }

    #[test]
    fn test_invalid_euc_kr_rejected_when_forced() {
        let bytes: &[u8] = &[0x53, 0xE9, 0x74];
        assert!(decode_content(bytes, "euc-kr").is_err());
    }

    #[test]
    fn test_invalid_utf8_rejected_when_forced() {
        let bytes: &[u8] = &[0x53, 0xE9, 0x74];
        assert!(decode_content(bytes, "utf-8").is_err());
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
        assert_eq!(detect_delimiter("id\nP1"), ',');
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = load_table(&dir.path().join("ingredients.csv")).unwrap_err();
        assert!(matches!(err, CsvError::SourceMissing { .. }));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("products.csv");
        fs::write(&path, "id;name_en;status\nP1;Shin Ramyun;Haram\n").unwrap();

        let table = load_table(&path).unwrap();
        assert_eq!(table.delimiter, ';');
        assert_eq!(table.rows[0].get("status"), "Haram");
    }
}
