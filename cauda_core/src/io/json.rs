//! Module providing JSON output of knockout results
use std::io::{Read, Write};

use crate::io::IoError;
use crate::knockout::{KnockoutRow, KnockoutTable};

/// Write a knockout table as a JSON array of row objects
///
/// A missing change is written as `null`.
pub fn write_knockout_json<W: Write>(mut writer: W, table: &KnockoutTable) -> Result<(), IoError> {
    serde_json::to_writer_pretty(&mut writer, &table.rows)?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Read a knockout table written by [`write_knockout_json`]
pub fn read_knockout_json<R: Read>(reader: R) -> Result<KnockoutTable, IoError> {
    let rows: Vec<KnockoutRow> = serde_json::from_reader(reader)?;
    Ok(KnockoutTable { rows })
}

#[cfg(test)]
mod json_tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn json_rows() {
        let table = KnockoutTable {
            rows: vec![KnockoutRow {
                knockout: "a".to_string(),
                kept: "b".to_string(),
                kept_relative_change: None,
                error: "knockout sweep failed: infeasible".to_string(),
                sample_id: "a_b".to_string(),
            }],
        };
        let mut buffer: Vec<u8> = Vec::new();
        write_knockout_json(&mut buffer, &table).unwrap();
        let value: Value = serde_json::from_slice(&buffer).unwrap();
        let row = &value[0];
        assert_eq!(row["knockout"], "a");
        assert_eq!(row["kept"], "b");
        assert!(row["kept_relative_change"].is_null());
        assert_eq!(row["SampleID"], "a_b");
        assert_eq!(read_knockout_json(buffer.as_slice()).unwrap(), table);
    }
}
