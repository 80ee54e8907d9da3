//! This module provides the struct representing a row of the metabolic metadata table
use std::fmt::{Display, Formatter};

use derive_builder::Builder;
use indexmap::IndexMap;

/// Metabolic metadata table, row index to taxon
pub type MetabolicTable = IndexMap<usize, TaxonRecord>;

/// Represents a single community member
#[derive(Builder, Clone, Debug, PartialEq)]
pub struct TaxonRecord {
    /// Used to identify the taxon, always held in its string form
    #[builder(setter(into))]
    pub id: String,
    /// Location of the metabolic model for this taxon
    #[builder(default = "None")]
    pub file: Option<String>,
    /// Relative abundance of the taxon, uniform abundances are assumed if missing
    #[builder(default = "None")]
    pub abundance: Option<f64>,
    /// Any additional metadata columns
    #[builder(default = "IndexMap::new()")]
    pub attributes: IndexMap<String, String>,
}

impl TaxonRecord {
    /// Create a taxon with only an id
    pub fn new<S: ToString>(id: S) -> TaxonRecord {
        TaxonRecord {
            id: id.to_string(),
            file: None,
            abundance: None,
            attributes: IndexMap::new(),
        }
    }
}

impl Display for TaxonRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}
