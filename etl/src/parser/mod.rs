//! Flight CSV reader with encoding and delimiter auto-detection.
//!
//! Produces [`RawFlightRecord`]s; no coercion happens here beyond decoding
//! bytes to text. Quoted fields (e.g. `"New York, NY"`) are handled by the
//! `csv` crate.

use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::models::{RawFlightRecord, REQUIRED_COLUMNS};

/// Result of reading the input file, with detection metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Raw rows, in file order
    pub records: Vec<RawFlightRecord>,
    /// Detected encoding
    pub encoding: String,
    /// Detected or configured delimiter
    pub delimiter: char,
    /// Column headers as found in the file
    pub headers: Vec<String>,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let charset = chardet::detect(bytes).0;

    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to a string using the given encoding.
///
/// Unknown encodings fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let decoded = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => String::from_utf8_lossy(bytes).into_owned(),
        },
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    };
    Ok(decoded)
}

/// Detect the delimiter by counting candidates in the header line
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

/// Read the flight file with auto-detection of encoding and delimiter.
pub fn read_flights_file<P: AsRef<Path>>(path: P, delimiter: Option<char>) -> CsvResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    read_flights_bytes(&bytes, delimiter)
}

/// Read flight rows from raw bytes.
pub fn read_flights_bytes(bytes: &[u8], delimiter: Option<char>) -> CsvResult<ParseResult> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;

    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));
    let (headers, records) = read_flights_str(&content, delimiter)?;

    Ok(ParseResult {
        records,
        encoding,
        delimiter,
        headers,
    })
}

/// Parse decoded CSV text with an explicit delimiter.
pub fn read_flights_str(content: &str, delimiter: char) -> CsvResult<(Vec<String>, Vec<RawFlightRecord>)> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::EmptyFile);
    }
    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|col| !headers.iter().any(|h| h == *col))
    {
        return Err(CsvError::MissingColumn(missing.to_string()));
    }

    let mut records = Vec::new();
    for row in reader.deserialize::<RawFlightRecord>() {
        records.push(row?);
    }

    Ok((headers, records))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "FlightDate,IATA_Code_Operating_Airline,Origin,OriginCityName,Dest,DestCityName,DepDelayMinutes,ArrDelayMinutes,Cancelled,Diverted";

    #[test]
    fn test_reads_quoted_city_names() {
        let csv = format!(
            "{}\n2024-01-01,AA,JFK,\"New York, NY\",LAX,\"Los Angeles, CA\",10,,False,False\n",
            HEADER
        );
        let result = read_flights_bytes(csv.as_bytes(), None).unwrap();

        assert_eq!(result.delimiter, ',');
        assert_eq!(result.encoding, "utf-8");
        assert_eq!(result.records.len(), 1);
        let row = &result.records[0];
        assert_eq!(row.origin_city, "New York, NY");
        assert_eq!(row.dest_city, "Los Angeles, CA");
        assert_eq!(row.dep_delay_minutes.as_deref(), Some("10"));
        assert_eq!(row.arr_delay_minutes, None);
        assert_eq!(row.cancelled, "False");
    }

    #[test]
    fn test_extra_columns_ignored() {
        let csv = format!("Year,{}\n2024,2024-01-01,AA,JFK,NY,LAX,LA,1,2,0,0\n", HEADER);
        let result = read_flights_bytes(csv.as_bytes(), None).unwrap();

        assert_eq!(result.headers[0], "Year");
        assert_eq!(result.records[0].flight_date, "2024-01-01");
        assert_eq!(result.records[0].operating_airline, "AA");
    }

    #[test]
    fn test_semicolon_delimiter_detected() {
        let csv = format!("{}\n2024-01-01;AA;JFK;NY;LAX;LA;;;0;0\n", HEADER.replace(',', ";"));
        let result = read_flights_bytes(csv.as_bytes(), None).unwrap();

        assert_eq!(result.delimiter, ';');
        assert_eq!(result.records[0].dest, "LAX");
        assert_eq!(result.records[0].dep_delay_minutes, None);
    }

    #[test]
    fn test_missing_column_error() {
        let csv = "FlightDate,Origin\n2024-01-01,JFK\n";
        let err = read_flights_bytes(csv.as_bytes(), None).unwrap_err();
        assert!(matches!(err, CsvError::MissingColumn(ref c) if c == "DepDelayMinutes"));
    }

    #[test]
    fn test_empty_file_error() {
        assert!(matches!(read_flights_bytes(b"", None), Err(CsvError::EmptyFile)));
        assert!(matches!(read_flights_bytes(b"\n\n", None), Err(CsvError::EmptyFile)));
    }

    #[test]
    fn test_header_only_yields_no_records() {
        let result = read_flights_bytes(HEADER.as_bytes(), None).unwrap();
        assert!(result.records.is_empty());
        assert_eq!(result.headers.len(), 10);
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a;b;c"), ';');
        assert_eq!(detect_delimiter("a\tb\tc"), '\t');
        assert_eq!(detect_delimiter("a|b|c"), '|');
        assert_eq!(detect_delimiter("single"), ',');
    }

    #[test]
    fn test_latin1_decoding() {
        // "Montréal" in ISO-8859-1
        let bytes: &[u8] = &[0x4D, 0x6F, 0x6E, 0x74, 0x72, 0xE9, 0x61, 0x6C];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert_eq!(decoded, "Montréal");
    }

    #[test]
    fn test_utf8_bom_stripped() {
        let mut bytes = b"\xEF\xBB\xBF".to_vec();
        bytes.extend_from_slice(format!("{}\n2024-01-01,AA,JFK,NY,LAX,LA,,,0,0\n", HEADER).as_bytes());
        let result = read_flights_bytes(&bytes, None).unwrap();
        assert_eq!(result.headers[0], "FlightDate");
    }

    #[test]
    fn test_read_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flights.csv");
        std::fs::write(&path, format!("{}\n2024-01-02,DL,ATL,Atlanta,JFK,New York,,,1.0,0.0\n", HEADER)).unwrap();

        let result = read_flights_file(&path, Some(',')).unwrap();
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].cancelled, "1.0");
    }
}
