//! Analysis requests: filename in, [`AnalysisReport`] out.
//!
//! The [`Analyzer`] opens the named stream through its [`Storage`], parses
//! the column selector, runs a single [`scanner::scan`] pass and renders the
//! report. It holds no per-request state, so one analyzer can serve any
//! number of concurrent requests.

use encoding_rs::{Encoding, UTF_8};
use log::{debug, info};
use serde::{Serialize, Serializer};

use crate::{
    aggregate::{ColumnSummary, Metric},
    config::{AnalyzerConfig, EmptyColumnPolicy},
    error::AnalysisError,
    io_utils,
    scanner::{self, CancellationFlag, ColumnSelector, DEFAULT_PREVIEW_ROWS, ScanOptions},
    storage::Storage,
};

/// Which columns a report covers, as echoed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSelection {
    All,
    Positions(Vec<usize>),
}

impl From<&ColumnSelector> for ColumnSelection {
    fn from(selector: &ColumnSelector) -> Self {
        match selector.positions() {
            Some(positions) => ColumnSelection::Positions(positions),
            None => ColumnSelection::All,
        }
    }
}

impl Serialize for ColumnSelection {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ColumnSelection::All => serializer.serialize_str("All"),
            ColumnSelection::Positions(positions) => positions.serialize(serializer),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnReport {
    pub column: String,
    pub sum: Metric,
    pub average: Metric,
    pub max: Metric,
    #[serde(skip)]
    pub count: u64,
}

impl ColumnReport {
    fn from_summary(summary: ColumnSummary, policy: EmptyColumnPolicy) -> Self {
        Self {
            column: summary.name,
            sum: summary.sum.resolve(policy),
            average: summary.average.resolve(policy),
            max: summary.max.resolve(policy),
            count: summary.count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub filename: String,
    pub columns_total: usize,
    /// Data rows scanned, excluding the header.
    pub rows: u64,
    pub columns_selected: ColumnSelection,
    pub preview: String,
    pub analysis: Vec<ColumnReport>,
}

impl AnalysisReport {
    pub fn column(&self, name: &str) -> Option<&ColumnReport> {
        self.analysis.iter().find(|report| report.column == name)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Resolved, immutable settings applied to every request.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub preview_rows: usize,
    pub delimiter: Option<u8>,
    pub encoding: &'static Encoding,
    pub empty_columns: EmptyColumnPolicy,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            preview_rows: DEFAULT_PREVIEW_ROWS,
            delimiter: None,
            encoding: UTF_8,
            empty_columns: EmptyColumnPolicy::default(),
        }
    }
}

impl AnalysisOptions {
    pub fn from_config(config: &AnalyzerConfig) -> anyhow::Result<Self> {
        Ok(Self {
            preview_rows: config.preview_rows,
            delimiter: config.delimiter,
            encoding: config.resolve_encoding()?,
            empty_columns: config.empty_columns,
        })
    }

    fn scan_options(&self, filename: &str, cancellation: Option<&CancellationFlag>) -> ScanOptions {
        ScanOptions {
            delimiter: io_utils::resolve_input_delimiter(filename, self.delimiter),
            encoding: self.encoding,
            preview_rows: self.preview_rows,
            cancellation: cancellation.cloned(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Analyzer<S> {
    storage: S,
    options: AnalysisOptions,
}

impl<S: Storage> Analyzer<S> {
    pub fn new(storage: S, options: AnalysisOptions) -> Self {
        Self { storage, options }
    }

    pub fn handle(
        &self,
        filename: &str,
        raw_selector: Option<&str>,
    ) -> Result<AnalysisReport, AnalysisError> {
        self.handle_with_cancellation(filename, raw_selector, None)
    }

    /// Like [`Analyzer::handle`], aborting once `cancellation` is triggered.
    pub fn handle_with_cancellation(
        &self,
        filename: &str,
        raw_selector: Option<&str>,
        cancellation: Option<&CancellationFlag>,
    ) -> Result<AnalysisReport, AnalysisError> {
        info!("Analyzing {filename:?}");
        let stream = self.storage.open(filename)?;
        let selector = ColumnSelector::parse(raw_selector, filename)?;
        debug!("Column selection for {filename:?}: {:?}", selector.positions());

        let scan_options = self.options.scan_options(filename, cancellation);
        let outcome = scanner::scan(stream, filename, &selector, &scan_options)?;

        for column in &outcome.columns {
            debug!(
                "Column '{}' ({} numeric cell(s)): sum={:?} average={:?} max={:?}",
                column.name,
                column.count,
                column.sum.value(),
                column.average.value(),
                column.max.value()
            );
        }

        let policy = self.options.empty_columns;
        let report = AnalysisReport {
            filename: filename.to_string(),
            columns_total: outcome.headers.len(),
            rows: outcome.data_rows,
            columns_selected: ColumnSelection::from(&selector),
            preview: outcome.preview,
            analysis: outcome
                .columns
                .into_iter()
                .map(|summary| ColumnReport::from_summary(summary, policy))
                .collect(),
        };
        info!(
            "Analyzed {} data row(s) across {} column(s) in {filename:?}",
            report.rows,
            report.analysis.len()
        );
        Ok(report)
    }
}
