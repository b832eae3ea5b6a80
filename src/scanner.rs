//! Single-pass table scan.
//!
//! [`scan`] reads the header, validates the [`ColumnSelector`] against it,
//! then streams the remaining records exactly once. Each selected cell is
//! classified and routed to its column's [`ColumnAccumulator`]; the first few
//! rows are kept for the preview. Memory use is bounded by the number of
//! selected columns and the preview depth, never by file size.

use std::{
    collections::{BTreeMap, BTreeSet},
    io::Read,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use encoding_rs::{Encoding, UTF_8};
use itertools::Itertools;
use log::debug;

use crate::{
    aggregate::{ColumnAccumulator, ColumnSummary},
    cell::{Cell, parse_cell},
    error::AnalysisError,
    io_utils,
};

pub const DEFAULT_PREVIEW_ROWS: usize = 10;
pub const EMPTY_PREVIEW: &str = "File is empty or has no data";

/// Caller-chosen subset of columns, stored as sorted 0-based indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSelector {
    indices: Option<BTreeSet<usize>>,
}

impl ColumnSelector {
    pub fn all() -> Self {
        Self { indices: None }
    }

    /// Parses a comma-separated list of 1-based positions such as `"2,3"`.
    ///
    /// An absent or blank string selects every column. Tokens that are not
    /// positive integers fail with [`AnalysisError::InvalidColumn`].
    pub fn parse(raw: Option<&str>, source: &str) -> Result<Self, AnalysisError> {
        let Some(raw) = raw.filter(|value| !value.trim().is_empty()) else {
            return Ok(Self::all());
        };
        let mut indices = BTreeSet::new();
        for token in raw.split(',').map(str::trim) {
            let position = token.parse::<usize>().map_err(|_| {
                AnalysisError::invalid_column(source, token, "column numbers must be integers")
            })?;
            if position == 0 {
                return Err(AnalysisError::invalid_column(
                    source,
                    token,
                    "column numbers start at 1",
                ));
            }
            indices.insert(position - 1);
        }
        Ok(Self {
            indices: Some(indices),
        })
    }

    #[cfg(test)]
    pub fn from_positions<I>(positions: I, source: &str) -> Result<Self, AnalysisError>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut indices = BTreeSet::new();
        for position in positions {
            let index = position.checked_sub(1).ok_or_else(|| {
                AnalysisError::invalid_column(source, "0", "column numbers start at 1")
            })?;
            indices.insert(index);
        }
        Ok(Self {
            indices: Some(indices),
        })
    }

    pub fn is_all(&self) -> bool {
        self.indices.is_none()
    }

    /// Selected 1-based positions in header order, or `None` for every column.
    pub fn positions(&self) -> Option<Vec<usize>> {
        self.indices
            .as_ref()
            .map(|indices| indices.iter().map(|idx| idx + 1).collect())
    }

    /// Checks every index against `column_count` and returns the indices to scan.
    pub fn resolve(&self, column_count: usize, source: &str) -> Result<Vec<usize>, AnalysisError> {
        match &self.indices {
            None => Ok((0..column_count).collect()),
            Some(indices) => {
                if let Some(bad) = indices.iter().find(|idx| **idx >= column_count) {
                    return Err(AnalysisError::invalid_column(
                        source,
                        (bad + 1).to_string(),
                        format!("file has {column_count} column(s)"),
                    ));
                }
                Ok(indices.iter().copied().collect())
            }
        }
    }
}

/// Cooperative cancellation shared between a caller and an in-flight scan.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub delimiter: u8,
    pub encoding: &'static Encoding,
    /// Rows kept for the preview, header included.
    pub preview_rows: usize,
    pub cancellation: Option<CancellationFlag>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            delimiter: io_utils::DEFAULT_CSV_DELIMITER,
            encoding: UTF_8,
            preview_rows: DEFAULT_PREVIEW_ROWS,
            cancellation: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanOutcome {
    pub headers: Vec<String>,
    pub columns: Vec<ColumnSummary>,
    pub preview: String,
    pub data_rows: u64,
}

pub fn scan<R>(
    input: R,
    source: &str,
    selector: &ColumnSelector,
    options: &ScanOptions,
) -> Result<ScanOutcome, AnalysisError>
where
    R: Read,
{
    let mut reader = io_utils::open_csv_reader(input, options.delimiter);
    let mut records = reader.byte_records();

    let header_record = match records.next() {
        Some(record) => record.map_err(|err| io_utils::read_failure(err, source, 1))?,
        None => {
            return Err(AnalysisError::EmptyFile {
                filename: source.to_string(),
            });
        }
    };
    let headers = io_utils::decode_record(&header_record, options.encoding, source)?;
    let column_count = headers.len();

    let mut accumulators = selector
        .resolve(column_count, source)?
        .into_iter()
        .map(|idx| (idx, ColumnAccumulator::new(idx, headers[idx].clone())))
        .collect::<BTreeMap<_, _>>();
    debug!(
        "Scanning {source:?}: {column_count} column(s), {} selected",
        accumulators.len()
    );

    let separator = char::from(options.delimiter).to_string();
    let mut preview = Vec::with_capacity(options.preview_rows.min(DEFAULT_PREVIEW_ROWS));
    if options.preview_rows > 0 {
        preview.push(headers.join(separator.as_str()));
    }

    let mut data_rows = 0u64;
    let mut skipped_cells = 0u64;
    for record in records {
        if options
            .cancellation
            .as_ref()
            .is_some_and(CancellationFlag::is_cancelled)
        {
            return Err(AnalysisError::Cancelled {
                filename: source.to_string(),
            });
        }
        data_rows += 1;
        // Header is line 1, so data row n sits on line n + 1.
        let record = record.map_err(|err| io_utils::read_failure(err, source, data_rows + 1))?;
        let row = io_utils::decode_record(&record, options.encoding, source)?;

        if preview.len() < options.preview_rows {
            preview.push(row.join(separator.as_str()));
        }

        for (idx, accumulator) in accumulators.iter_mut() {
            let Some(raw) = row.get(*idx) else {
                continue;
            };
            match parse_cell(raw) {
                Cell::Numeric(value) => accumulator.observe(value),
                Cell::NonNumeric => skipped_cells += 1,
            }
        }
    }
    debug!("Scanned {data_rows} data row(s) from {source:?}, {skipped_cells} non-numeric cell(s)");

    let columns = accumulators
        .into_values()
        .map(|accumulator| accumulator.finalize(source))
        .collect::<Result<Vec<_>, _>>()?;
    let preview = if preview.is_empty() {
        EMPTY_PREVIEW.to_string()
    } else {
        preview.iter().join("\n")
    };

    Ok(ScanOutcome {
        headers,
        columns,
        preview,
        data_rows,
    })
}
