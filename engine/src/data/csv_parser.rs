use anyhow::{anyhow, Context, Result};
use csv::{ReaderBuilder, StringRecord};
use shared::models::RawBar;
use std::fs::File;
use std::io::{BufReader, Read};

// Field parsing for exported price files (exchange dumps, spreadsheet exports).
pub mod price_format {
    use anyhow::{anyhow, Result};
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

    const NAIVE_DATETIME_FORMATS: [&str; 3] =
        ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
    const MISSING_PLACEHOLDERS: [&str; 5] = ["nan", "null", "none", "na", "-"];

    /// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS+00:00`, naive date-times
    /// (taken as UTC), plain dates (midnight UTC) and epoch milliseconds.
    pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(dt.with_timezone(&Utc));
        }
        if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z") {
            return Ok(dt.with_timezone(&Utc));
        }
        for fmt in NAIVE_DATETIME_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Ok(DateTime::from_naive_utc_and_offset(naive, Utc));
            }
        }
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            if let Some(naive) = date.and_hms_opt(0, 0, 0) {
                return Ok(DateTime::from_naive_utc_and_offset(naive, Utc));
            }
        }
        if let Ok(millis) = s.parse::<i64>() {
            if let Some(dt) = DateTime::from_timestamp_millis(millis) {
                return Ok(dt);
            }
        }
        Err(anyhow!("Failed to parse timestamp '{}'", s))
    }

    /// `Ok(None)` for the placeholders exporters write for a missing close.
    pub fn parse_close(s: &str) -> Result<Option<f64>> {
        let s = s.trim();
        if s.is_empty() || MISSING_PLACEHOLDERS.contains(&s.to_ascii_lowercase().as_str()) {
            return Ok(None);
        }
        s.parse::<f64>()
            .map(Some)
            .map_err(|e| anyhow!("Failed to parse close '{}': {}", s, e))
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use chrono::{Datelike, Timelike};

        #[test]
        fn test_parse_timestamp_rfc3339() {
            let dt = parse_timestamp("2024-03-01T12:30:00Z").unwrap();
            assert_eq!(
                (dt.year(), dt.month(), dt.day(), dt.hour(), dt.minute()),
                (2024, 3, 1, 12, 30)
            );
        }

        #[test]
        fn test_parse_timestamp_with_offset() {
            let dt = parse_timestamp("2024-03-01 12:00:00+02:00").unwrap();
            assert_eq!(dt.hour(), 10);
        }

        #[test]
        fn test_parse_timestamp_date_only() {
            let dt = parse_timestamp("2024-03-01").unwrap();
            assert_eq!((dt.day(), dt.hour()), (1, 0));
        }

        #[test]
        fn test_parse_timestamp_epoch_millis() {
            let dt = parse_timestamp("1704067200000").unwrap();
            assert_eq!(dt.year(), 2024);
        }

        #[test]
        fn test_parse_timestamp_invalid() {
            assert!(parse_timestamp("01/03/2024").is_err());
        }

        #[test]
        fn test_parse_close() {
            assert_eq!(parse_close(" 42150.25 ").unwrap(), Some(42150.25));
            assert_eq!(parse_close("").unwrap(), None);
            assert_eq!(parse_close("NaN").unwrap(), None);
            assert_eq!(parse_close("null").unwrap(), None);
            assert!(parse_close("abc").is_err());
        }
    }
}

const TIMESTAMP_HEADERS: [&str; 3] = ["timestamp", "datetime", "date"];
const CLOSE_HEADERS: [&str; 1] = ["close"];
const SYMBOL_HEADERS: [&str; 1] = ["symbol"];

/// One parsed record. `symbol` is only set when the file has a symbol column.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvPriceRow {
    pub symbol: Option<String>,
    pub bar: RawBar,
}

pub struct PriceCsvParser;

impl PriceCsvParser {
    // Header: a timestamp column and a close column, matched case-insensitively,
    // plus an optional symbol column. Other columns (Open, High, ...) are ignored.
    // Example: Datetime,Open,High,Low,Close,Volume
    pub fn load_rows_from_csv(file_path: &str, delimiter: u8) -> Result<Vec<CsvPriceRow>> {
        let file = File::open(file_path)
            .with_context(|| format!("Failed to open CSV file '{}'", file_path))?;
        Self::load_rows(BufReader::new(file), delimiter)
    }

    pub fn load_rows<R: Read>(reader: R, delimiter: u8) -> Result<Vec<CsvPriceRow>> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let ts_pos = Self::find_column(&headers, &TIMESTAMP_HEADERS).ok_or_else(|| {
            anyhow!("Missing timestamp column (expected one of {:?})", TIMESTAMP_HEADERS)
        })?;
        let close_pos = Self::find_column(&headers, &CLOSE_HEADERS).ok_or_else(|| {
            anyhow!("Missing close column (expected one of {:?})", CLOSE_HEADERS)
        })?;
        let symbol_pos = Self::find_column(&headers, &SYMBOL_HEADERS);

        let mut rows = Vec::new();
        for (idx, result) in rdr.records().enumerate() {
            let line = idx + 2;
            let record = result?;

            let ts_str = Self::get_field(&record, ts_pos).ok_or_else(|| {
                anyhow!("Missing timestamp field in CSV record at line {}", line)
            })?;
            let timestamp = price_format::parse_timestamp(ts_str)
                .map_err(|e| anyhow!("Error parsing timestamp at line {}: {}", line, e))?;

            // A short record without a close is a missing value, not a format error.
            let close = match Self::get_field(&record, close_pos) {
                Some(s) => price_format::parse_close(s)
                    .map_err(|e| anyhow!("Error parsing close at line {}: {}", line, e))?,
                None => None,
            };

            let symbol = symbol_pos
                .and_then(|pos| Self::get_field(&record, pos))
                .filter(|s| !s.is_empty())
                .map(str::to_string);

            rows.push(CsvPriceRow { symbol, bar: RawBar::new(timestamp, close) });
        }
        Ok(rows)
    }

    fn find_column(headers: &StringRecord, names: &[&str]) -> Option<usize> {
        names
            .iter()
            .find_map(|name| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name)))
    }

    fn get_field(record: &StringRecord, pos: usize) -> Option<&str> {
        record.get(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_load_rows_valid_data() {
        let csv_content = "\
Datetime,Open,High,Low,Close,Volume
2024-01-01 00:00:00+00:00,42000,42100,41900,42050.5,10
2024-01-01 01:00:00+00:00,42050,42200,42000,42150.25,12";
        let tmp_file = create_test_csv(csv_content);
        let path = tmp_file.path().to_str().unwrap();
        let rows = PriceCsvParser::load_rows_from_csv(path, b',').unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].symbol, None);
        assert_eq!(rows[0].bar.close, Some(42050.5));
        assert_eq!(rows[1].bar.close, Some(42150.25));
        assert!(rows[0].bar.timestamp < rows[1].bar.timestamp);
    }

    #[test]
    fn test_load_rows_missing_close_values() {
        let csv_content = "\
timestamp;symbol;close
2024-01-01;BTC-USD;100
2024-01-02;BTC-USD;
2024-01-03;BTC-USD;NaN";
        let rows = PriceCsvParser::load_rows(csv_content.as_bytes(), b';').unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].symbol.as_deref(), Some("BTC-USD"));
        assert_eq!(rows[1].bar.close, None);
        assert_eq!(rows[2].bar.close, None);
    }

    #[test]
    fn test_load_rows_header_only() {
        let rows = PriceCsvParser::load_rows("Date,Close".as_bytes(), b',').unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_load_rows_missing_close_column() {
        let result = PriceCsvParser::load_rows("Date,Open\n2024-01-01,1".as_bytes(), b',');
        assert!(result.unwrap_err().to_string().contains("Missing close column"));
    }

    #[test]
    fn test_load_rows_ignores_unlisted_headers() {
        let result = PriceCsvParser::load_rows("Data;Fechamento\n2024-01-01;1".as_bytes(), b';');
        assert!(result.unwrap_err().to_string().contains("Missing timestamp column"));
        let result = PriceCsvParser::load_rows("Date,Fechamento\n2024-01-01,1".as_bytes(), b',');
        assert!(result.unwrap_err().to_string().contains("Missing close column"));
    }

    #[test]
    fn test_load_rows_invalid_close() {
        let result = PriceCsvParser::load_rows("Date,Close\n2024-01-01,abc".as_bytes(), b',');
        assert!(result.unwrap_err().to_string().contains("Error parsing close at line 2"));
    }

    #[test]
    fn test_load_rows_invalid_timestamp() {
        let result = PriceCsvParser::load_rows("Date,Close\nyesterday,1".as_bytes(), b',');
        assert!(result.unwrap_err().to_string().contains("Error parsing timestamp at line 2"));
    }

    #[test]
    fn test_load_rows_file_not_found() {
        let result = PriceCsvParser::load_rows_from_csv("non_existent_file.csv", b',');
        let err = result.unwrap_err();
        assert!(err.downcast_ref::<std::io::Error>().is_some());
    }
}
