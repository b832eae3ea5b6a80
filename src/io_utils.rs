//! Reader construction, delimiter resolution and byte decoding.
//!
//! Input is always read as raw byte records and decoded per field with
//! `encoding_rs`, defaulting to UTF-8. Readers run in flexible mode so rows
//! narrower or wider than the header are passed through instead of rejected.

use std::io::Read;

use anyhow::{Result, anyhow};
use encoding_rs::{Encoding, UTF_8};

use crate::error::AnalysisError;

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

/// Picks the delimiter for `filename`: explicit choice first, then `.tsv` as tab,
/// otherwise comma.
pub fn resolve_input_delimiter(filename: &str, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| {
        let extension = filename.rsplit_once('.').map(|(_, ext)| ext);
        match extension {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
            _ => DEFAULT_CSV_DELIMITER,
        }
    })
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

pub fn decode_bytes(
    bytes: &[u8],
    encoding: &'static Encoding,
    source: &str,
) -> Result<String, AnalysisError> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(AnalysisError::decode(
            source,
            format!("input is not valid {}", encoding.name()),
        ))
    } else {
        Ok(text.into_owned())
    }
}

pub fn decode_record(
    record: &csv::ByteRecord,
    encoding: &'static Encoding,
    source: &str,
) -> Result<Vec<String>, AnalysisError> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding, source))
        .collect()
}

/// Maps a reader failure into the request's error taxonomy.
pub fn read_failure(err: csv::Error, source: &str, row: u64) -> AnalysisError {
    AnalysisError::decode(source, format!("failed to read row {row}: {err}"))
}
