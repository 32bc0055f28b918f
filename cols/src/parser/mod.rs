//! Input table reader with encoding and delimiter detection.
//!
//! Turns the bytes of one input file into a [`Table`]: the first record is
//! the header, every following record a row.

use csv::ReaderBuilder;
use std::path::Path;

use crate::engine::Table;
use crate::error::{CsvError, CsvResult};
use crate::script::{Delimiter, InputFormat};

/// Result of reading one input
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Header and rows
    pub table: Table,
    /// Detected encoding
    pub encoding: String,
    /// Delimiter used
    pub delimiter: u8,
    /// Records whose width differed from the header
    pub ragged: usize,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes using the given encoding label.
///
/// Unknown labels fall back to lossy UTF-8. A leading byte-order mark is
/// dropped.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let decoded = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8_lossy(bytes).into_owned(),
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        label => match encoding_rs::Encoding::for_label(label.as_bytes()) {
            Some(enc) => enc.decode(bytes).0.into_owned(),
            None => String::from_utf8_lossy(bytes).into_owned(),
        },
    };
    match decoded.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => decoded,
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> u8 {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [b',', b';', b'\t', b'|'];
    let mut best_sep = b',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.bytes().filter(|&b| b == sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse decoded text into a table.
pub fn parse_table(content: &str, format: &InputFormat) -> CsvResult<ParseResult> {
    parse_with_encoding(content, format, "utf-8".to_string())
}

fn parse_with_encoding(content: &str, format: &InputFormat, encoding: String) -> CsvResult<ParseResult> {
    let delimiter = match format.delimiter {
        Delimiter::Byte(b) => b,
        Delimiter::Auto => detect_delimiter(content),
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .quote(format.quote)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let header: Vec<String> = match records.next() {
        Some(record) => record?.iter().map(str::to_string).collect(),
        None => return Err(CsvError::EmptyFile),
    };

    let mut rows = Vec::new();
    let mut ragged = 0;
    for record in records {
        let record = record?;
        if record.len() != header.len() {
            ragged += 1;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(ParseResult {
        table: Table::new(header, rows),
        encoding,
        delimiter,
        ragged,
    })
}

/// Parse raw bytes, detecting their encoding.
pub fn parse_bytes(bytes: &[u8], format: &InputFormat) -> CsvResult<ParseResult> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    parse_with_encoding(&content, format, encoding)
}

/// Read and parse one input file.
pub fn read_table(path: impl AsRef<Path>, format: &InputFormat) -> CsvResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes(&bytes, format)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn comma() -> InputFormat {
        InputFormat::default()
    }

    #[test]
    fn test_simple_csv() {
        let result = parse_table("name,age\nAlice,30\nBob,25", &comma()).unwrap();
        assert_eq!(result.table.header(), strings(&["name", "age"]).as_slice());
        assert_eq!(result.table.rows()[1], strings(&["Bob", "25"]));
        assert_eq!(result.ragged, 0);
    }

    #[test]
    fn test_quoted_values() {
        let csv = "name;value\n\"Alice\";\"Hello; World\"";
        let format = InputFormat {
            delimiter: Delimiter::Byte(b';'),
            quote: b'"',
        };
        let result = parse_table(csv, &format).unwrap();
        assert_eq!(result.table.rows()[0], strings(&["Alice", "Hello; World"]));
    }

    #[test]
    fn test_custom_quote() {
        let format = InputFormat {
            delimiter: Delimiter::Byte(b','),
            quote: b'\'',
        };
        let result = parse_table("a,b\n'x,y',z", &format).unwrap();
        assert_eq!(result.table.rows()[0], strings(&["x,y", "z"]));
    }

    #[test]
    fn test_ragged_rows() {
        let result = parse_table("a,b,c\n1\n1,2,3,4\n1,2,3", &comma()).unwrap();
        assert_eq!(result.ragged, 2);
        assert_eq!(result.table.rows()[0], strings(&["1", "", ""]));
        assert_eq!(result.table.rows()[1], strings(&["1", "2", "3"]));
    }

    #[test]
    fn test_empty_input_error() {
        assert!(matches!(parse_table("", &comma()), Err(CsvError::EmptyFile)));
    }

    #[test]
    fn test_header_only() {
        let result = parse_table("a,b\n", &comma()).unwrap();
        assert_eq!(result.table.width(), 2);
        assert_eq!(result.table.row_count(), 0);
    }

    #[test]
    fn test_auto_delimiter() {
        let format = InputFormat {
            delimiter: Delimiter::Auto,
            quote: b'"',
        };
        let result = parse_table("a|b|c\n1|2|3", &format).unwrap();
        assert_eq!(result.delimiter, b'|');
        assert_eq!(result.table.rows()[0], strings(&["1", "2", "3"]));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), b';');
        assert_eq!(detect_delimiter("a\tb\tc"), b'\t');
        assert_eq!(detect_delimiter("single"), b',');
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        assert_eq!(decode_content(bytes, "iso-8859-1"), "Société");
    }

    #[test]
    fn test_bom_stripped() {
        let bytes = b"\xEF\xBB\xBFid,name\n1,x\n";
        let result = parse_bytes(bytes, &comma()).unwrap();
        assert_eq!(result.table.header()[0], "id");
    }

    #[test]
    fn test_read_table_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.csv");
        std::fs::write(&path, "id,name\n1,Alice\n").unwrap();

        let result = read_table(&path, &comma()).unwrap();
        assert_eq!(result.table.row_count(), 1);
        assert_eq!(result.encoding, "utf-8");

        let missing = read_table(dir.path().join("nope.csv"), &comma());
        assert!(matches!(missing, Err(CsvError::IoError(_))));
    }
}
