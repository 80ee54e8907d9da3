//! Module providing flux tables and interpolation between them

pub mod interpolate;

use indexmap::IndexMap;
use thiserror::Error;

use crate::community::Medium;

pub use interpolate::{interpolate_flux_columns, interpolate_fluxes};

/// Map of reaction id to a single flux value
pub type FluxSeries = IndexMap<String, f64>;

/// Table of fluxes, rows identified by reaction id, one or more named numeric columns
///
/// Reaction ids are not required to be unique, readers of a column keep the first occurrence.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FluxTable {
    index: Vec<String>,
    columns: IndexMap<String, Vec<f64>>,
}

impl FluxTable {
    /// Create a table with the given reaction ids and no columns
    pub fn new(index: Vec<String>) -> Self {
        FluxTable {
            index,
            columns: IndexMap::new(),
        }
    }

    /// Create a single column table from `(reaction id, flux)` rows
    ///
    /// # Examples
    /// ```rust
    /// use cauda_core::flux::FluxTable;
    /// let table = FluxTable::from_rows("flux", [("EX_glc__D_m", 10.0), ("EX_o2_m", 20.0)]);
    /// assert_eq!(table.len(), 2);
    /// ```
    pub fn from_rows<S, I>(column: &str, rows: I) -> Self
    where
        S: ToString,
        I: IntoIterator<Item = (S, f64)>,
    {
        let (index, values): (Vec<String>, Vec<f64>) = rows
            .into_iter()
            .map(|(id, value)| (id.to_string(), value))
            .unzip();
        let mut columns = IndexMap::new();
        columns.insert(column.to_string(), values);
        FluxTable { index, columns }
    }

    /// Add (or replace) a column, `values` must have one entry per row
    pub fn add_column(&mut self, name: &str, values: Vec<f64>) -> Result<(), FluxError> {
        if values.len() != self.index.len() {
            return Err(FluxError::LengthMismatch {
                column: name.to_string(),
                expected: self.index.len(),
                found: values.len(),
            });
        }
        self.columns.insert(name.to_string(), values);
        Ok(())
    }

    /// Reaction ids, in row order
    pub fn index(&self) -> &[String] {
        &self.index
    }

    /// Names of the columns
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Raw values of a column, in row order
    pub fn column(&self, name: &str) -> Result<&[f64], FluxError> {
        self.columns
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| FluxError::ColumnNotFound(name.to_string()))
    }

    /// A column as a series keyed by reaction id, keeping the first occurrence of duplicated ids
    pub fn series(&self, name: &str) -> Result<FluxSeries, FluxError> {
        let values = self.column(name)?;
        let mut series = FluxSeries::with_capacity(values.len());
        for (id, value) in self.index.iter().zip(values) {
            series.entry(id.clone()).or_insert(*value);
        }
        Ok(series)
    }

    /// A column as a medium
    ///
    /// Like [`FluxTable::series`], but rows with a missing (NaN) value are left out of the medium.
    pub fn column_as_medium(&self, name: &str) -> Result<Medium, FluxError> {
        let mut medium = self.series(name)?;
        medium.retain(|_, bound| !bound.is_nan());
        Ok(medium)
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum FluxError {
    #[error("Interpolation factor must be between 0 and 1, got {0}")]
    OutOfRange(f64),
    #[error("Flux table has no column named {0}")]
    ColumnNotFound(String),
    #[error("Column {column} has {found} values but the table has {expected} rows")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },
}
