//! CSV candle source.

use chrono::{NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use kfx_core::error::DataError;
use kfx_core::types::Candle;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// CSV record format.
///
/// Accepts terminal exports (`time,open,high,low,close,tick_volume`) as
/// well as the common `Date,Open,High,Low,Close,Volume` layout.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(
        alias = "Time",
        alias = "Date",
        alias = "date",
        alias = "timestamp",
        alias = "Timestamp"
    )]
    time: String,
    #[serde(alias = "Open")]
    open: f64,
    #[serde(alias = "High")]
    high: f64,
    #[serde(alias = "Low")]
    low: f64,
    #[serde(alias = "Close")]
    close: f64,
    #[serde(alias = "Volume", alias = "volume", alias = "TickVolume", default)]
    tick_volume: f64,
}

/// Candles stored in a single CSV file.
pub struct CsvCandleSource {
    path: PathBuf,
}

impl CsvCandleSource {
    /// Create a source for an existing file.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(DataError::NoDataAvailable);
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all candles, oldest first.
    pub fn load_all(&self) -> Result<Vec<Candle>, DataError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| DataError::ParseError(e.to_string()))?;

        let mut candles = Vec::new();

        for (line, result) in reader.deserialize().enumerate() {
            let record: CsvRecord = result
                .map_err(|e| DataError::ParseError(format!("row {}: {}", line + 1, e)))?;

            let timestamp = parse_timestamp(&record.time)?;

            candles.push(
                Candle::new(timestamp, record.open, record.high, record.low, record.close)
                    .with_tick_volume(record.tick_volume),
            );
        }

        candles.sort_by_key(|c| c.timestamp);

        debug!(path = %self.path.display(), candles = candles.len(), "Loaded CSV candles");
        Ok(candles)
    }
}

/// Load all candles from a CSV file.
pub fn load_candles(path: impl AsRef<Path>) -> Result<Vec<Candle>, DataError> {
    CsvCandleSource::new(path)?.load_all()
}

/// Parse the timestamp formats seen in candle exports into Unix milliseconds.
fn parse_timestamp(value: &str) -> Result<i64, DataError> {
    const DATETIME_FORMATS: [&str; 5] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y.%m.%d %H:%M:%S",
        "%Y.%m.%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
    ];
    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d"];

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }
    for format in DATE_FORMATS {
        if let Some(dt) = NaiveDate::parse_from_str(value, format)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
        {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }

    // Unix timestamp: seconds unless it has more than 10 digits
    if let Ok(ts) = value.parse::<i64>() {
        return Ok(if ts > 10_000_000_000 { ts } else { ts * 1000 });
    }

    Err(DataError::ParseError(format!(
        "Could not parse time: {}",
        value
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_csv(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("kfx-{}.csv", uuid::Uuid::new_v4()));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("1970-01-01 00:01:00").unwrap(), 60_000);
        assert_eq!(parse_timestamp("1970.01.01 00:01").unwrap(), 60_000);
        assert_eq!(parse_timestamp("1970-01-02").unwrap(), 86_400_000);
        assert_eq!(parse_timestamp("1705312800").unwrap(), 1_705_312_800_000);
        assert_eq!(parse_timestamp("1705312800000").unwrap(), 1_705_312_800_000);
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_load_terminal_export_sorted() {
        let path = temp_csv(
            "time,open,high,low,close,tick_volume\n\
             2024.01.15 10:01,1.1,1.3,1.0,1.2,15\n\
             2024.01.15 10:00,1.0,1.2,0.9,1.1,12\n",
        );

        let candles = load_candles(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(candles.len(), 2);
        assert!(candles[0].timestamp < candles[1].timestamp);
        assert_eq!(candles[0].close, 1.1);
        assert_eq!(candles[1].tick_volume, 15.0);
    }

    #[test]
    fn test_load_without_volume_column() {
        let path = temp_csv("Date,Open,High,Low,Close\n2024-01-15,1.0,1.2,0.9,1.1\n");

        let candles = load_candles(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(candles.len(), 1);
        assert_eq!(candles[0].tick_volume, 0.0);
    }

    #[test]
    fn test_bad_row_is_parse_error() {
        let path = temp_csv("time,open,high,low,close\n2024-01-15,abc,1.2,0.9,1.1\n");

        let result = load_candles(&path);
        fs::remove_file(&path).ok();

        assert!(matches!(result, Err(DataError::ParseError(_))));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            CsvCandleSource::new("/nonexistent/kfx.csv"),
            Err(DataError::NoDataAvailable)
        ));
    }
}
