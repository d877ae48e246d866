// ============================================================
// Layer 4 — Candle Loader
// ============================================================
// Reads the kline CSV written by the market-data client.
//
// Expected header (column order does not matter, extra columns
// such as `date` are ignored):
//
//   date,start,open,high,low,close
//   2024-01-01 00:00:00,1704067200000,2281.5,2290.1,2279.0,2288.4
//
// The exchange API pages bars newest-first and the client
// concatenates pages as they arrive, so rows are sorted by
// `start` here. Duplicate `start` values (overlapping pages)
// keep the first occurrence.
//
// If the file has no `start` column the file order is assumed
// to already be chronological.

use anyhow::{bail, Context, Result};
use std::{fs, path::{Path, PathBuf}};

use crate::domain::candle::Candle;

pub struct CandleLoader {
    path: PathBuf,
}

/// Positions of the columns we care about in the header row
struct Columns {
    start: Option<usize>,
    open:  usize,
    high:  usize,
    low:   usize,
    close: usize,
}

impl CandleLoader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    /// Load every bar in the file, oldest first.
    pub fn load(&self) -> Result<Vec<Candle>> {
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read candle CSV '{}'", self.path.display()))?;
        let candles = parse_candles(&text)
            .with_context(|| format!("Malformed candle CSV '{}'", self.path.display()))?;

        tracing::info!("Loaded {} candles from '{}'", candles.len(), self.path.display());
        Ok(candles)
    }
}

/// Parse CSV text into chronologically ordered candles.
pub fn parse_candles(text: &str) -> Result<Vec<Candle>> {
    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let (_, header) = match lines.next() {
        Some(h) => h,
        None    => bail!("file is empty"),
    };
    let columns = Columns::from_header(header)?;

    let mut candles = Vec::new();
    for (idx, line) in lines {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let row = idx + 1;

        let start = match columns.start {
            Some(i) => parse_field::<f64>(&fields, i, "start", row)? as i64,
            None    => candles.len() as i64,
        };
        candles.push(Candle::new(
            start,
            parse_field(&fields, columns.open,  "open",  row)?,
            parse_field(&fields, columns.high,  "high",  row)?,
            parse_field(&fields, columns.low,   "low",   row)?,
            parse_field(&fields, columns.close, "close", row)?,
        ));
    }

    // Stable sort keeps the first of any duplicated bar in front
    candles.sort_by_key(|c| c.start);
    candles.dedup_by_key(|c| c.start);
    Ok(candles)
}

impl Columns {
    fn from_header(header: &str) -> Result<Self> {
        let names: Vec<String> = header
            .split(',')
            .map(|h| h.trim().trim_matches('"').to_ascii_lowercase())
            .collect();
        let find = |name: &str| names.iter().position(|n| n == name);
        let require = |name: &str| {
            find(name).with_context(|| format!("missing '{name}' column in header"))
        };

        Ok(Self {
            start: find("start"),
            open:  require("open")?,
            high:  require("high")?,
            low:   require("low")?,
            close: require("close")?,
        })
    }
}

fn parse_field<T: std::str::FromStr>(
    fields: &[&str],
    index:  usize,
    name:   &str,
    row:    usize,
) -> Result<T> {
    let raw = fields
        .get(index)
        .with_context(|| format!("line {row}: missing '{name}' value"))?;
    raw.trim_matches('"')
        .parse::<T>()
        .map_err(|_| anyhow::anyhow!("line {row}: cannot parse '{name}' value '{raw}'"))
}
