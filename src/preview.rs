use anyhow::{Context, Result};
use log::info;

use crate::{
    cli::PreviewArgs,
    error::AnalysisError,
    io_utils,
    storage::{DirectoryStorage, Storage},
    table,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRows {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Reads the header and at most `limit` data rows, stopping early.
pub fn collect_rows<S: Storage>(
    storage: &S,
    filename: &str,
    limit: usize,
    delimiter: Option<u8>,
    encoding: &'static encoding_rs::Encoding,
) -> Result<PreviewRows, AnalysisError> {
    let stream = storage.open(filename)?;
    let delimiter = io_utils::resolve_input_delimiter(filename, delimiter);
    let mut reader = io_utils::open_csv_reader(stream, delimiter);
    let mut records = reader.byte_records();

    let headers = match records.next() {
        Some(record) => {
            let record = record.map_err(|err| io_utils::read_failure(err, filename, 1))?;
            io_utils::decode_record(&record, encoding, filename)?
        }
        None => {
            return Err(AnalysisError::EmptyFile {
                filename: filename.to_string(),
            });
        }
    };

    let mut rows = Vec::new();
    for (idx, record) in records.take(limit).enumerate() {
        let record = record.map_err(|err| io_utils::read_failure(err, filename, idx as u64 + 2))?;
        rows.push(io_utils::decode_record(&record, encoding, filename)?);
    }
    Ok(PreviewRows { headers, rows })
}

pub fn execute(args: &PreviewArgs) -> Result<()> {
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let storage = DirectoryStorage::new(&args.storage);
    let preview = collect_rows(&storage, &args.filename, args.rows, args.delimiter, encoding)
        .with_context(|| format!("Previewing {:?}", args.filename))?;
    table::print_table(&preview.headers, &preview.rows);
    info!(
        "Displayed {} row(s) from {:?}",
        preview.rows.len(),
        args.filename
    );
    Ok(())
}
