//! Module providing the capability interface to a community modeling engine
//!
//! The knockout calculator only ever talks to an engine through [`CommunityBuilder`] and
//! [`CommunityModel`], so any engine (including mocks in tests) can be plugged in.

pub mod matrix;
pub mod proportional;
pub mod taxon;

use std::fmt::{Display, Formatter};

use indexmap::IndexMap;
use thiserror::Error;

pub use matrix::KnockoutMatrix;
pub use taxon::{MetabolicTable, TaxonRecord, TaxonRecordBuilder};

/// Nutrient environment of a community, map of exchange id to import bound
pub type Medium = IndexMap<String, f64>;

/// Constructs community models from a set of taxa
pub trait CommunityBuilder {
    /// Model produced by this builder
    type Model: CommunityModel;

    /// Build a community model containing `taxa`
    ///
    /// # Parameters
    /// - `taxa`: Members of the community, in the order they were selected
    /// - `quiet`: Suppress progress reporting while building
    fn construct(&self, taxa: &[TaxonRecord], quiet: bool) -> Result<Self::Model, CommunityError>;
}

/// A constructed community model
pub trait CommunityModel {
    /// Apply `medium` as the nutrient constraints of the community
    fn set_medium(&mut self, medium: &Medium) -> Result<(), CommunityError>;

    /// Knock out every member in turn and compare against the full community
    ///
    /// # Parameters
    /// - `fraction`: Fraction of the maximal community growth rate to enforce
    /// - `method`: How knockout abundances are compared to the baseline (see [`KnockoutMethod`])
    /// - `exclude_diagonal`: Leave the self comparison of a knocked out taxon missing
    /// - `quiet`: Suppress progress reporting during the sweep
    ///
    /// # Returns
    /// Wide matrix with one row per knocked out taxon and one column per member
    fn knockout_sweep(
        &mut self,
        fraction: f64,
        method: KnockoutMethod,
        exclude_diagonal: bool,
        quiet: bool,
    ) -> Result<KnockoutMatrix, CommunityError>;
}

/// Comparison used to report the effect of a knockout on the remaining members
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KnockoutMethod {
    /// (knockout - baseline) / baseline
    RelativeChange,
    /// knockout - baseline
    Change,
    /// Abundance in the knockout community
    Raw,
}

impl Display for KnockoutMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            KnockoutMethod::RelativeChange => write!(f, "relative change"),
            KnockoutMethod::Change => write!(f, "change"),
            KnockoutMethod::Raw => write!(f, "raw"),
        }
    }
}

/// Failures raised by a community engine
#[derive(Clone, Debug, Error, PartialEq)]
pub enum CommunityError {
    /// The community could not be built, or its medium could not be applied
    #[error("unable to construct community: {0}")]
    ConstructionFailure(String),
    /// The knockout sweep itself failed
    #[error("knockout sweep failed: {0}")]
    SweepFailure(String),
}
