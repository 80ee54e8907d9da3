//! Single member knockout sweeps of a community, reshaped into a long form result table
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::community::{
    CommunityBuilder, CommunityError, CommunityModel, KnockoutMatrix, Medium, MetabolicTable,
    TaxonRecord,
};
use crate::configuration::{self, Configuration};

/// Value of the `error` column for rows produced by a successful sweep
pub const NO_ERROR: &str = "None";

/// One (knocked out taxon, kept taxon) pair of a knockout result table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KnockoutRow {
    /// Id of the knocked out taxon
    pub knockout: String,
    /// Id of the taxon whose abundance change is reported
    pub kept: String,
    /// Relative change in abundance of `kept`, missing if the sweep failed
    pub kept_relative_change: Option<f64>,
    /// [`NO_ERROR`] on success, otherwise a description of the failure
    pub error: String,
    /// Sorted, underscore joined ids of every member of the community
    #[serde(rename = "SampleID")]
    pub sample_id: String,
}

/// Long form result of a knockout sweep
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KnockoutTable {
    pub rows: Vec<KnockoutRow>,
}

impl KnockoutTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KnockoutRow> {
        self.rows.iter()
    }

    /// Whether this table is a placeholder for a failed sweep
    pub fn is_failure(&self) -> bool {
        self.rows.iter().any(|row| row.error != NO_ERROR)
    }
}

impl IntoIterator for KnockoutTable {
    type Item = KnockoutRow;
    type IntoIter = std::vec::IntoIter<KnockoutRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

/// Result of running a sweep inside the fault boundary
#[derive(Clone, Debug, PartialEq)]
pub enum KnockoutOutcome {
    /// The sweep finished, long form `(knockout, kept, change)` triples
    Completed(Vec<(String, String, f64)>),
    /// Construction, medium assignment, or the sweep failed
    Failed { reason: String },
}

impl From<Result<KnockoutMatrix, CommunityError>> for KnockoutOutcome {
    fn from(value: Result<KnockoutMatrix, CommunityError>) -> Self {
        match value {
            Ok(matrix) => KnockoutOutcome::Completed(matrix.melt()),
            Err(err) => KnockoutOutcome::Failed {
                reason: err.to_string(),
            },
        }
    }
}

impl KnockoutOutcome {
    /// Convert the outcome into result rows for a community made up of `ids`
    ///
    /// A failure becomes one placeholder row per member, pairing the i-th id with the i-th id
    /// of the reversed list, with a missing change. For a two member community these are the
    /// two cross pairs. The placeholder does not cover every pair of larger communities.
    /// Every row is tagged with `sample_id`, see [`sample_id`].
    pub fn into_rows(self, ids: &[String], sample_id: &str) -> Vec<KnockoutRow> {
        match self {
            KnockoutOutcome::Completed(long) => long
                .into_iter()
                .map(|(knockout, kept, change)| KnockoutRow {
                    knockout,
                    kept,
                    kept_relative_change: Some(change),
                    error: NO_ERROR.to_string(),
                    sample_id: sample_id.to_string(),
                })
                .collect(),
            KnockoutOutcome::Failed { reason } => ids
                .iter()
                .zip(ids.iter().rev())
                .map(|(knockout, kept)| KnockoutRow {
                    knockout: knockout.clone(),
                    kept: kept.clone(),
                    kept_relative_change: None,
                    error: reason.clone(),
                    sample_id: sample_id.to_string(),
                })
                .collect(),
        }
    }
}

/// Errors in the arguments to [`calculate_knockouts`]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum KnockoutError {
    #[error("No taxa were selected for the community")]
    NoTaxaSelected,
    #[error("Index {0} is not present in the metabolic table")]
    IndexNotFound(usize),
}

/// Key identifying a community, its sorted member ids joined by underscores
///
/// # Examples
/// ```rust
/// use cauda_core::knockout::sample_id;
/// let ids = vec!["7".to_string(), "3".to_string()];
/// assert_eq!(sample_id(&ids), "3_7");
/// ```
pub fn sample_id(ids: &[String]) -> String {
    let mut sorted: Vec<&str> = ids.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.join("_")
}

/// Calculate the effect of knocking out each member of a community on the others
///
/// # Parameters
/// - `builder`: Community engine used to build and sweep the community
/// - `medium`: Base medium of the simulation
/// - `table`: Metabolic metadata table
/// - `indices`: Rows of `table` that make up the community
///
/// # Returns
/// - `Ok`: The long form knockout table. If the engine failed for any reason the table holds
///   placeholder rows whose `error` column describes the failure, see
///   [`KnockoutOutcome::into_rows`].
/// - `Err`: `indices` was empty or referenced a row not in `table`
pub fn calculate_knockouts<B: CommunityBuilder>(
    builder: &B,
    medium: &Medium,
    table: &MetabolicTable,
    indices: &[usize],
) -> Result<KnockoutTable, KnockoutError> {
    let taxa = select_taxa(table, indices)?;
    Ok(calculate_knockouts_for(builder, medium, &taxa))
}

/// Same as [`calculate_knockouts`], for an already selected set of taxa
pub fn calculate_knockouts_for<B: CommunityBuilder>(
    builder: &B,
    medium: &Medium,
    taxa: &[TaxonRecord],
) -> KnockoutTable {
    let config = configuration::current();
    let ids: Vec<String> = taxa.iter().map(|t| t.id.clone()).collect();
    let sample = sample_id(&ids);
    debug!(
        "Running {} knockout sweep over {} taxa",
        config.knockout_method,
        ids.len()
    );
    let outcome = KnockoutOutcome::from(run_sweep(builder, medium, taxa, &config));
    if let KnockoutOutcome::Failed { reason } = &outcome {
        warn!("Knockout sweep for {} failed: {}", sample, reason);
    }
    let rows = outcome.into_rows(&ids, &sample);
    debug!("Knockout sweep for {} produced {} rows", sample, rows.len());
    KnockoutTable { rows }
}

/// Look up the taxa at `indices`, keeping the order of `indices`
pub fn select_taxa(
    table: &MetabolicTable,
    indices: &[usize],
) -> Result<Vec<TaxonRecord>, KnockoutError> {
    if indices.is_empty() {
        return Err(KnockoutError::NoTaxaSelected);
    }
    indices
        .iter()
        .map(|idx| table.get(idx).cloned().ok_or(KnockoutError::IndexNotFound(*idx)))
        .collect()
}

fn run_sweep<B: CommunityBuilder>(
    builder: &B,
    medium: &Medium,
    taxa: &[TaxonRecord],
    config: &Configuration,
) -> Result<KnockoutMatrix, CommunityError> {
    let quiet = !config.progress;
    let mut model = builder.construct(taxa, quiet)?;
    model.set_medium(medium)?;
    model.knockout_sweep(
        config.knockout_fraction,
        config.knockout_method,
        config.exclude_diagonal,
        quiet,
    )
}
