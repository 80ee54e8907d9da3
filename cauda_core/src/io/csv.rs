//! Module providing CSV IO for flux tables, metabolic tables and knockout results
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use ::csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use indexmap::IndexMap;
use tracing::debug;

use crate::community::{MetabolicTable, TaxonRecord};
use crate::flux::{FluxSeries, FluxTable};
use crate::io::IoError;
use crate::knockout::{KnockoutRow, KnockoutTable};

/// Header of a knockout result table
pub const KNOCKOUT_HEADER: [&str; 5] = [
    "knockout",
    "kept",
    "kept_relative_change",
    "error",
    "SampleID",
];

fn open<P: AsRef<Path>>(path: P) -> Result<File, IoError> {
    File::open(path.as_ref()).map_err(|err| IoError::UnableToRead {
        path: path.as_ref().display().to_string(),
        reason: err.to_string(),
    })
}

// region Flux tables
/// Read a flux table from a csv file
///
/// The first column holds the reaction ids, whatever its header. Every other column whose values
/// all parse as numbers becomes a flux column; empty cells are read as missing (NaN). Columns
/// with non numeric values are skipped.
pub fn read_flux_table<P: AsRef<Path>>(path: P) -> Result<FluxTable, IoError> {
    read_flux_table_from(open(path)?)
}

/// Read a flux table from any reader, see [`read_flux_table`]
pub fn read_flux_table_from<R: Read>(reader: R) -> Result<FluxTable, IoError> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(IoError::MissingColumn("reaction".to_string()));
    }
    let records: Vec<StringRecord> = reader.records().collect::<Result<_, _>>()?;

    let index: Vec<String> = records
        .iter()
        .map(|r| r.get(0).unwrap_or_default().to_string())
        .collect();
    let mut table = FluxTable::new(index);
    for (col, name) in headers.iter().enumerate().skip(1) {
        let values: Option<Vec<f64>> = records
            .iter()
            .map(|r| parse_optional_float(r.get(col).unwrap_or_default()))
            .map(|v| v.map(|v| v.unwrap_or(f64::NAN)))
            .collect();
        match values {
            Some(values) => table.add_column(name, values)?,
            None => debug!("Skipping non numeric column {}", name),
        }
    }
    Ok(table)
}

/// Write a flux series as a two column `reaction,<column>` csv
pub fn write_flux_series<W: Write>(
    writer: W,
    series: &FluxSeries,
    column: &str,
) -> Result<(), IoError> {
    let mut writer = WriterBuilder::new().from_writer(writer);
    writer.write_record(["reaction", column])?;
    for (rxn, flux) in series {
        writer.write_record([rxn.as_str(), flux.to_string().as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

/// `None` if the cell is not a number, `Some(None)` if it is empty
fn parse_optional_float(cell: &str) -> Option<Option<f64>> {
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
        return Some(None);
    }
    cell.parse::<f64>().ok().map(Some)
}
// endregion Flux tables

// region Metabolic tables
/// Read the metabolic metadata table
///
/// The table must have an `id` column, and may have `file` and `abundance` columns. All other
/// columns are kept as string attributes of the taxa. Rows are indexed by their position,
/// starting at 0.
pub fn read_metabolic_table<P: AsRef<Path>>(path: P) -> Result<MetabolicTable, IoError> {
    read_metabolic_table_from(open(path)?)
}

/// Read a metabolic table from any reader, see [`read_metabolic_table`]
pub fn read_metabolic_table_from<R: Read>(reader: R) -> Result<MetabolicTable, IoError> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let headers = reader.headers()?.clone();
    let id_col = headers
        .iter()
        .position(|h| h == "id")
        .ok_or_else(|| IoError::MissingColumn("id".to_string()))?;
    let file_col = headers.iter().position(|h| h == "file");
    let abundance_col = headers.iter().position(|h| h == "abundance");

    let mut table = MetabolicTable::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let cell = |col: usize| record.get(col).unwrap_or_default();
        let abundance = match abundance_col {
            Some(col) => parse_optional_float(cell(col)).ok_or_else(|| IoError::InvalidNumber {
                row,
                column: "abundance".to_string(),
                value: cell(col).to_string(),
            })?,
            None => None,
        };
        let attributes: IndexMap<String, String> = headers
            .iter()
            .enumerate()
            .filter(|(col, _)| *col != id_col && Some(*col) != file_col && Some(*col) != abundance_col)
            .map(|(col, name)| (name.to_string(), cell(col).to_string()))
            .collect();
        let taxon = TaxonRecord {
            id: cell(id_col).to_string(),
            file: file_col.map(cell).filter(|f| !f.is_empty()).map(str::to_string),
            abundance,
            attributes,
        };
        table.insert(row, taxon);
    }
    debug!("Read metabolic table with {} taxa", table.len());
    Ok(table)
}
// endregion Metabolic tables

// region Knockout tables
/// Write a knockout table as csv, a missing change is written as an empty cell
pub fn write_knockout_table<W: Write>(writer: W, table: &KnockoutTable) -> Result<(), IoError> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    writer.write_record(KNOCKOUT_HEADER)?;
    for row in table.iter() {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a knockout table written by [`write_knockout_table`]
pub fn read_knockout_table<R: Read>(reader: R) -> Result<KnockoutTable, IoError> {
    let mut reader = ReaderBuilder::new().from_reader(reader);
    let rows = reader
        .deserialize::<KnockoutRow>()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(KnockoutTable { rows })
}
// endregion Knockout tables
