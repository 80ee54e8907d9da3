//! Wide knockout matrix returned by a knockout sweep
use indexmap::IndexSet;

/// Effect of knocking out each taxon (rows) on every member (columns)
///
/// Cells are `None` where the effect is undefined, for example the self comparison when the
/// diagonal is excluded.
#[derive(Clone, Debug, PartialEq)]
pub struct KnockoutMatrix {
    rows: IndexSet<String>,
    columns: IndexSet<String>,
    values: Vec<Vec<Option<f64>>>,
}

impl KnockoutMatrix {
    /// Create a matrix where every cell is missing
    pub fn new<R, C>(rows: R, columns: C) -> Self
    where
        R: IntoIterator<Item = String>,
        C: IntoIterator<Item = String>,
    {
        let rows: IndexSet<String> = rows.into_iter().collect();
        let columns: IndexSet<String> = columns.into_iter().collect();
        let values = vec![vec![None; columns.len()]; rows.len()];
        KnockoutMatrix {
            rows,
            columns,
            values,
        }
    }

    /// Ids of the knocked out taxa
    pub fn rows(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(String::as_str)
    }

    /// Ids of the compared taxa
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    /// Set a cell, returns false if either id is not part of the matrix
    pub fn set(&mut self, knockout: &str, kept: &str, value: Option<f64>) -> bool {
        match (self.rows.get_index_of(knockout), self.columns.get_index_of(kept)) {
            (Some(r), Some(c)) => {
                self.values[r][c] = value;
                true
            }
            _ => false,
        }
    }

    /// Get a cell, `None` if the ids are unknown or the value is missing
    pub fn get(&self, knockout: &str, kept: &str) -> Option<f64> {
        let r = self.rows.get_index_of(knockout)?;
        let c = self.columns.get_index_of(kept)?;
        self.values[r][c]
    }

    /// Convert into long form `(knockout, kept, value)` triples
    ///
    /// Triples are emitted column by column, and within a column in row order. Missing (`None`
    /// or NaN) values are dropped, infinite values are kept.
    pub fn melt(&self) -> Vec<(String, String, f64)> {
        let mut long = Vec::with_capacity(self.rows.len() * self.columns.len());
        for (c, kept) in self.columns.iter().enumerate() {
            for (r, knockout) in self.rows.iter().enumerate() {
                if let Some(value) = self.values[r][c].filter(|v| !v.is_nan()) {
                    long.push((knockout.clone(), kept.clone(), value));
                }
            }
        }
        long
    }
}
