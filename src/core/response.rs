//! Decoding of batch geocoder responses.
//!
//! The service does not reliably announce its response encoding, so the body
//! is tried against a fixed sequence of (encoding, engine) pairs and the first
//! one that yields a well-formed eight-column table wins.

use crate::domain::model::{GeocodeResult, RESULT_COLUMNS};
use crate::utils::error::{GeocodeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Latin1,
    Utf8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseEngine {
    /// Ragged rows, fields kept verbatim, blank surplus fields dropped.
    Tolerant,
    /// All rows must share one field count.
    Strict,
    /// Ragged rows, fields kept verbatim.
    Default,
}

pub const FALLBACK_CHAIN: [(TextEncoding, ParseEngine); 5] = [
    (TextEncoding::Latin1, ParseEngine::Tolerant),
    (TextEncoding::Latin1, ParseEngine::Strict),
    (TextEncoding::Utf8, ParseEngine::Default),
    (TextEncoding::Utf8, ParseEngine::Strict),
    (TextEncoding::Utf8, ParseEngine::Tolerant),
];

pub fn parse_response(body: &[u8]) -> Result<Vec<GeocodeResult>> {
    let mut last_error = String::new();

    for (attempt, (encoding, engine)) in FALLBACK_CHAIN.iter().enumerate() {
        match decode(body, *encoding).and_then(|text| parse_with(&text, *engine)) {
            Ok(rows) => {
                tracing::debug!(
                    "Parsed {} response rows on attempt {} ({:?}, {:?})",
                    rows.len(),
                    attempt + 1,
                    encoding,
                    engine
                );
                return Ok(rows);
            }
            Err(e) => {
                tracing::debug!(
                    "Response parse attempt {} ({:?}, {:?}) failed: {}",
                    attempt + 1,
                    encoding,
                    engine,
                    e
                );
                last_error = e;
            }
        }
    }

    Err(GeocodeError::ResponseParseError {
        attempts: FALLBACK_CHAIN.len(),
        last_error,
    })
}

pub(crate) fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

fn decode(body: &[u8], encoding: TextEncoding) -> std::result::Result<String, String> {
    match encoding {
        TextEncoding::Latin1 => Ok(decode_latin1(body)),
        TextEncoding::Utf8 => {
            let text = std::str::from_utf8(body).map_err(|e| format!("invalid UTF-8: {}", e))?;
            Ok(text.strip_prefix('\u{feff}').unwrap_or(text).to_string())
        }
    }
}

fn parse_with(text: &str, engine: ParseEngine) -> std::result::Result<Vec<GeocodeResult>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(engine != ParseEngine::Strict)
        .from_reader(text.as_bytes());
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| e.to_string())?;
        rows.push(shape_row(&record, engine)?);
    }
    Ok(rows)
}

fn shape_row(
    record: &csv::StringRecord,
    engine: ParseEngine,
) -> std::result::Result<GeocodeResult, String> {
    let mut fields: Vec<&str> = record.iter().collect();

    if fields.len() > RESULT_COLUMNS {
        let surplus_empty = fields[RESULT_COLUMNS..].iter().all(|f| f.trim().is_empty());
        if engine == ParseEngine::Tolerant && surplus_empty {
            fields.truncate(RESULT_COLUMNS);
        } else {
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            return Err(format!(
                "line {}: expected at most {} fields, found {}",
                line,
                RESULT_COLUMNS,
                fields.len()
            ));
        }
    }

    let mut columns: [Option<String>; RESULT_COLUMNS] = Default::default();
    for (slot, field) in columns.iter_mut().zip(fields) {
        if !field.is_empty() {
            *slot = Some(field.to_string());
        }
    }
    Ok(GeocodeResult::from_columns(columns))
}
