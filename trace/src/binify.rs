//! Packs a whitespace-separated option trace into the fixed-width binary
//! layout the simulator's memory trace core reads directly.
//!
//! The text file starts with a record count on its own line, followed by one
//! record per line. Each record packs into 36 little-endian bytes: six `f32`
//! values, one `i32`, then two more `f32` values.

use super::Error;
use std::io::{BufRead, Write};

/// Packed size of one record in bytes.
pub const RECORD_SIZE: usize = 9 * 4;

const FLOAT_FIELDS_BEFORE: usize = 6;
const FLOAT_FIELDS_AFTER: usize = 2;
const NUM_FIELDS: usize = FLOAT_FIELDS_BEFORE + 1 + FLOAT_FIELDS_AFTER;

fn parse<T: std::str::FromStr>(value: &str, line: usize) -> Result<T, Error> {
    value.parse().map_err(|_| Error::Parse {
        line,
        value: value.to_string(),
    })
}

/// Packs one already-split record.
fn pack_record(fields: &[&str], line: usize, out: &mut Vec<u8>) -> Result<(), Error> {
    if fields.len() != NUM_FIELDS {
        return Err(Error::FieldCount {
            line,
            expected: NUM_FIELDS,
            found: fields.len(),
        });
    }
    for value in &fields[..FLOAT_FIELDS_BEFORE] {
        out.extend_from_slice(&parse::<f32>(value, line)?.to_le_bytes());
    }
    out.extend_from_slice(&parse::<i32>(fields[FLOAT_FIELDS_BEFORE], line)?.to_le_bytes());
    for value in &fields[FLOAT_FIELDS_BEFORE + 1..] {
        out.extend_from_slice(&parse::<f32>(value, line)?.to_le_bytes());
    }
    Ok(())
}

/// Converts the text trace read from `reader` into its binary form.
///
/// The record count from the first line is written verbatim as a
/// little-endian `i32` header; it is not checked against the number of
/// records that follow, matching the simulator's reader which trusts the
/// header.
pub fn binify(reader: impl BufRead, writer: &mut impl Write) -> Result<usize, Error> {
    let mut packed = Vec::with_capacity(RECORD_SIZE);
    let mut records = 0;
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        packed.clear();
        if index == 0 {
            let count: i32 = parse(line.trim(), index)?;
            packed.extend_from_slice(&count.to_le_bytes());
        } else {
            let fields: Vec<_> = line.split_whitespace().collect();
            pack_record(&fields, index, &mut packed)?;
            records += 1;
        }
        log::trace!("line {index}: {} bytes", packed.len());
        writer.write_all(&packed)?;
    }
    Ok(records)
}
