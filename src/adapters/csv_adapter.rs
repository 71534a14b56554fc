//! CSV file data adapter.
//!
//! One file per asset and frequency, `{asset}_{frequency}.csv`, with a header
//! row and columns `timestamp,open,high,low,close,volume`.

use crate::domain::error::BandTraderError;
use crate::domain::frequency::Frequency;
use crate::domain::ohlcv::{parse_timestamp, OhlcvBar};
use crate::ports::data_port::DataPort;
use chrono::NaiveDateTime;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, asset: &str, frequency: Frequency) -> PathBuf {
        self.base_path.join(format!("{}_{}.csv", asset, frequency))
    }
}

fn parse_field(record: &csv::StringRecord, index: usize, name: &str) -> Result<f64, BandTraderError> {
    record
        .get(index)
        .ok_or_else(|| BandTraderError::Data {
            reason: format!("missing {} column", name),
        })?
        .trim()
        .parse::<f64>()
        .map_err(|e| BandTraderError::Data {
            reason: format!("invalid {} value: {}", name, e),
        })
        .and_then(|value| {
            if value.is_finite() {
                Ok(value)
            } else {
                Err(BandTraderError::Data {
                    reason: format!("invalid {} value: {} is not finite", name, value),
                })
            }
        })
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        asset: &str,
        frequency: Frequency,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<OhlcvBar>, BandTraderError> {
        let path = self.csv_path(asset, frequency);
        let content = fs::read_to_string(&path).map_err(|e| BandTraderError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| BandTraderError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let ts_str = record.get(0).ok_or_else(|| BandTraderError::Data {
                reason: "missing timestamp column".into(),
            })?;
            let timestamp = parse_timestamp(ts_str).ok_or_else(|| BandTraderError::Data {
                reason: format!("invalid timestamp '{}'", ts_str),
            })?;

            if timestamp < start || timestamp > end {
                continue;
            }

            let close = parse_field(&record, 4, "close")?;
            if close <= 0.0 {
                return Err(BandTraderError::Data {
                    reason: format!("non-positive close {} at {}", close, timestamp),
                });
            }

            bars.push(OhlcvBar {
                asset: asset.to_string(),
                timestamp,
                open: parse_field(&record, 1, "open")?,
                high: parse_field(&record, 2, "high")?,
                low: parse_field(&record, 3, "low")?,
                close,
                volume: parse_field(&record, 5, "volume")?,
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        Ok(bars)
    }

    fn list_assets(&self, frequency: Frequency) -> Result<Vec<String>, BandTraderError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| BandTraderError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let suffix = format!("_{}.csv", frequency);
        let mut assets = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| BandTraderError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(asset) = name_str.strip_suffix(&suffix) {
                assets.push(asset.to_string());
            }
        }

        assets.sort();
        Ok(assets)
    }
}
