use crate::core::response::decode_latin1;
use crate::domain::model::{AddressRecord, AddressTable, ADDRESS_COLUMNS};
use crate::utils::error::{GeocodeError, Result};

/// Parses a pipe-delimited address file. Every row, the header included,
/// must have exactly five columns.
pub fn parse_addresses(data: &[u8], has_headers: bool) -> Result<AddressTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'|')
        .has_headers(has_headers)
        .flexible(true)
        .from_reader(data);

    if has_headers {
        let headers = reader.byte_headers()?;
        if headers.len() != ADDRESS_COLUMNS {
            return Err(GeocodeError::AddressFormatError {
                line: 1,
                expected: ADDRESS_COLUMNS,
                found: headers.len(),
            });
        }
    }

    let mut table = AddressTable::new();
    for record in reader.byte_records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let fields: Vec<String> = record.iter().map(decode_field).collect();
        let found = fields.len();

        let address = AddressRecord::from_fields(fields).ok_or(GeocodeError::AddressFormatError {
            line,
            expected: ADDRESS_COLUMNS,
            found,
        })?;
        table.push(address);
    }

    tracing::debug!("Parsed {} address rows", table.len());
    Ok(table)
}

/// Serializes addresses as the headerless, comma-delimited CSV the batch endpoint accepts.
pub fn addresses_to_csv(rows: &[AddressRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    for row in rows {
        writer.write_record(row.as_row())?;
    }

    writer
        .into_inner()
        .map_err(|e| GeocodeError::IoError(e.into_error()))
}

fn decode_field(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => decode_latin1(bytes),
    }
}
