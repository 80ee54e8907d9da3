//! Module for reading and writing flux tables, metabolic metadata, and knockout results
pub mod csv;
pub mod json;

use thiserror::Error;

use crate::flux::FluxError;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("Unable to read {path} due to {reason}")]
    UnableToRead { path: String, reason: String },
    #[error("Malformed csv data")]
    Csv(#[from] ::csv::Error),
    #[error("Serde json error")]
    SerdeJson(#[from] serde_json::Error),
    #[error("Unable to write output")]
    UnableToWrite(#[from] std::io::Error),
    #[error("Invalid flux table")]
    Flux(#[from] FluxError),
    #[error("Table is missing the required column {0}")]
    MissingColumn(String),
    #[error("Value {value:?} in row {row}, column {column} is not a number")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },
}
