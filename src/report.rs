//! Report - CSV audit trail of built bouquets.
//!
//! One row per emission: the input line that triggered it, the recipe
//! code, and the exact flowers taken from the inventory.

use std::fs::File;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::command::BouquetBuilt;

/// A single report row
#[derive(Debug, Serialize)]
pub struct EmissionRecord<'a> {
    pub line: u64,
    pub code: &'a str,
    pub size: char,
    /// Allocation as `<qty><species>` pairs, e.g. `2a1b`
    pub flowers: String,
    pub recorded_at: DateTime<Utc>,
}

impl<'a> EmissionRecord<'a> {
    pub fn new(built: &'a BouquetBuilt, recorded_at: DateTime<Utc>) -> Self {
        Self {
            line: built.line,
            code: &built.code,
            size: built.size.as_char(),
            flowers: built.allocation.to_string(),
            recorded_at,
        }
    }
}

/// Writes emission rows as CSV, header first.
pub struct ReportWriter<W: io::Write> {
    writer: csv::Writer<W>,
    rows: u64,
}

impl ReportWriter<File> {
    /// Create (or truncate) a report file
    pub fn create(path: impl AsRef<Path>) -> csv::Result<Self> {
        Ok(Self {
            writer: csv::Writer::from_path(path)?,
            rows: 0,
        })
    }
}

impl<W: io::Write> ReportWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(inner),
            rows: 0,
        }
    }

    /// Append a row stamped with the current time
    pub fn record(&mut self, built: &BouquetBuilt) -> csv::Result<()> {
        self.record_at(built, Utc::now())
    }

    /// Append a row with an explicit timestamp
    pub fn record_at(&mut self, built: &BouquetBuilt, at: DateTime<Utc>) -> csv::Result<()> {
        self.writer.serialize(EmissionRecord::new(built, at))?;
        self.rows += 1;
        Ok(())
    }

    /// Rows written so far
    #[inline]
    pub fn rows(&self) -> u64 {
        self.rows
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Flush and return the underlying writer
    pub fn into_inner(self) -> io::Result<W> {
        self.writer.into_inner().map_err(|err| err.into_error())
    }
}
