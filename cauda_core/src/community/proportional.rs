//! A lightweight reference engine where knocking out a member redistributes its abundance
//! proportionally across the remaining members.
//!
//! This does no flux balance analysis, it exists so the driver can run end to end (and be
//! tested) without an external simulation engine.
use indexmap::IndexSet;
use tracing::{debug, info};

use crate::community::{
    CommunityBuilder, CommunityError, CommunityModel, KnockoutMatrix, KnockoutMethod, Medium,
    TaxonRecord,
};

/// Builds [`ProportionalCommunity`] models
#[derive(Clone, Copy, Debug, Default)]
pub struct ProportionalBuilder;

impl CommunityBuilder for ProportionalBuilder {
    type Model = ProportionalCommunity;

    fn construct(&self, taxa: &[TaxonRecord], quiet: bool) -> Result<Self::Model, CommunityError> {
        ProportionalCommunity::new(taxa, quiet)
    }
}

/// Community whose members hold a fixed share of the total abundance
#[derive(Clone, Debug)]
pub struct ProportionalCommunity {
    ids: Vec<String>,
    /// Normalized to sum to 1
    abundances: Vec<f64>,
    medium: Option<Medium>,
}

impl ProportionalCommunity {
    /// Create a new community from a set of taxa
    ///
    /// Missing abundances are taken to be uniform, all abundances are then normalized.
    pub fn new(taxa: &[TaxonRecord], quiet: bool) -> Result<Self, CommunityError> {
        if taxa.is_empty() {
            return Err(CommunityError::ConstructionFailure(
                "community has no members".to_string(),
            ));
        }
        let mut seen: IndexSet<&str> = IndexSet::with_capacity(taxa.len());
        let mut raw = Vec::with_capacity(taxa.len());
        for taxon in taxa {
            if !seen.insert(taxon.id.as_str()) {
                return Err(CommunityError::ConstructionFailure(format!(
                    "taxon {} appears more than once",
                    taxon.id
                )));
            }
            let abundance = taxon.abundance.unwrap_or(1.0);
            if !abundance.is_finite() || abundance < 0f64 {
                return Err(CommunityError::ConstructionFailure(format!(
                    "taxon {} has an invalid abundance of {}",
                    taxon.id, abundance
                )));
            }
            raw.push(abundance);
        }
        let total: f64 = raw.iter().sum();
        if total <= 0f64 {
            return Err(CommunityError::ConstructionFailure(
                "total community abundance is zero".to_string(),
            ));
        }
        if !quiet {
            info!("Built community with {} members", taxa.len());
        }
        Ok(ProportionalCommunity {
            ids: taxa.iter().map(|t| t.id.clone()).collect(),
            abundances: raw.into_iter().map(|a| a / total).collect(),
            medium: None,
        })
    }

    /// Normalized abundances of the intact community, keyed by taxon id
    pub fn abundances(&self) -> impl Iterator<Item = (&str, f64)> {
        self.ids
            .iter()
            .map(String::as_str)
            .zip(self.abundances.iter().copied())
    }

    /// Currently applied medium
    pub fn medium(&self) -> Option<&Medium> {
        self.medium.as_ref()
    }

    fn compare(method: KnockoutMethod, baseline: f64, knockout: f64) -> Option<f64> {
        match method {
            KnockoutMethod::Raw => Some(knockout),
            KnockoutMethod::Change => Some(knockout - baseline),
            KnockoutMethod::RelativeChange => {
                if baseline > 0f64 {
                    Some((knockout - baseline) / baseline)
                } else {
                    None
                }
            }
        }
    }
}

impl CommunityModel for ProportionalCommunity {
    fn set_medium(&mut self, medium: &Medium) -> Result<(), CommunityError> {
        if medium.is_empty() {
            return Err(CommunityError::ConstructionFailure(
                "medium is empty".to_string(),
            ));
        }
        if let Some((id, bound)) = medium
            .iter()
            .find(|(_, bound)| !bound.is_finite() || **bound < 0f64)
        {
            return Err(CommunityError::ConstructionFailure(format!(
                "medium component {} has an invalid bound of {}",
                id, bound
            )));
        }
        self.medium = Some(medium.clone());
        Ok(())
    }

    fn knockout_sweep(
        &mut self,
        fraction: f64,
        method: KnockoutMethod,
        exclude_diagonal: bool,
        quiet: bool,
    ) -> Result<KnockoutMatrix, CommunityError> {
        if self.medium.is_none() {
            return Err(CommunityError::SweepFailure(
                "no medium has been set".to_string(),
            ));
        }
        if !(fraction > 0f64 && fraction <= 1f64) {
            return Err(CommunityError::SweepFailure(format!(
                "growth fraction must be in (0, 1], got {}",
                fraction
            )));
        }
        let mut matrix = KnockoutMatrix::new(self.ids.clone(), self.ids.clone());
        for (k, knockout) in self.ids.iter().enumerate() {
            if !quiet {
                debug!("Knocking out {}", knockout);
            }
            let remaining = 1f64 - self.abundances[k];
            // Nothing is left to grow
            if remaining <= 0f64 {
                continue;
            }
            for (j, kept) in self.ids.iter().enumerate() {
                let value = if j == k {
                    if exclude_diagonal {
                        None
                    } else {
                        Self::compare(method, self.abundances[j], 0f64)
                    }
                } else {
                    Self::compare(method, self.abundances[j], self.abundances[j] / remaining)
                };
                matrix.set(knockout, kept, value);
            }
        }
        Ok(matrix)
    }
}

#[cfg(test)]
mod proportional_tests {
    use super::*;
    use crate::community::TaxonRecordBuilder;

    fn taxon(id: &str, abundance: Option<f64>) -> TaxonRecord {
        TaxonRecordBuilder::default()
            .id(id)
            .abundance(abundance)
            .build()
            .unwrap()
    }

    fn medium() -> Medium {
        let mut medium = Medium::new();
        medium.insert("EX_glc__D_m".to_string(), 10.0);
        medium.insert("EX_o2_m".to_string(), 20.0);
        medium
    }

    #[test]
    fn abundances_are_normalized() {
        let community = ProportionalBuilder
            .construct(&[taxon("a", Some(2.0)), taxon("b", None), taxon("c", Some(1.0))], true)
            .unwrap();
        let abundances: Vec<(&str, f64)> = community.abundances().collect();
        assert_eq!(abundances[0].0, "a");
        assert!((abundances[0].1 - 0.5).abs() < 1e-12);
        assert!((abundances[1].1 - 0.25).abs() < 1e-12);
        assert!((abundances[2].1 - 0.25).abs() < 1e-12);
    }

    #[test]
    fn construction_failures() {
        assert!(matches!(
            ProportionalBuilder.construct(&[], true),
            Err(CommunityError::ConstructionFailure(_))
        ));
        assert!(matches!(
            ProportionalBuilder.construct(&[taxon("a", None), taxon("a", None)], true),
            Err(CommunityError::ConstructionFailure(_))
        ));
        assert!(matches!(
            ProportionalBuilder.construct(&[taxon("a", Some(-1.0))], true),
            Err(CommunityError::ConstructionFailure(_))
        ));
        assert!(matches!(
            ProportionalBuilder.construct(&[taxon("a", Some(0.0)), taxon("b", Some(0.0))], true),
            Err(CommunityError::ConstructionFailure(_))
        ));
    }

    #[test]
    fn medium_validation() {
        let mut community = ProportionalBuilder
            .construct(&[taxon("a", None), taxon("b", None)], true)
            .unwrap();
        assert!(community.set_medium(&Medium::new()).is_err());
        let mut bad = medium();
        bad.insert("EX_fe2_m".to_string(), f64::NAN);
        assert!(community.set_medium(&bad).is_err());
        assert!(community.medium().is_none());
        community.set_medium(&medium()).unwrap();
        assert_eq!(community.medium().unwrap().len(), 2);
    }

    #[test]
    fn sweep_requires_medium() {
        let mut community = ProportionalBuilder
            .construct(&[taxon("a", None), taxon("b", None)], true)
            .unwrap();
        let res = community.knockout_sweep(1.0, KnockoutMethod::RelativeChange, true, true);
        assert!(matches!(res, Err(CommunityError::SweepFailure(_))));
    }

    #[test]
    fn sweep_rejects_bad_fraction() {
        let mut community = ProportionalBuilder
            .construct(&[taxon("a", None), taxon("b", None)], true)
            .unwrap();
        community.set_medium(&medium()).unwrap();
        for fraction in [0.0, 1.5, f64::NAN] {
            let res = community.knockout_sweep(fraction, KnockoutMethod::Raw, true, true);
            assert!(matches!(res, Err(CommunityError::SweepFailure(_))));
        }
    }

    #[test]
    fn relative_change_sweep() {
        let mut community = ProportionalBuilder
            .construct(&[taxon("a", Some(0.5)), taxon("b", Some(0.25)), taxon("c", Some(0.25))], true)
            .unwrap();
        community.set_medium(&medium()).unwrap();
        let matrix = community
            .knockout_sweep(1.0, KnockoutMethod::RelativeChange, true, true)
            .unwrap();
        // Removing a, b and c each grow from 0.25 to 0.5
        assert!((matrix.get("a", "b").unwrap() - 1.0).abs() < 1e-12);
        assert!((matrix.get("a", "c").unwrap() - 1.0).abs() < 1e-12);
        // Removing b, a goes from 0.5 to 2/3
        assert!((matrix.get("b", "a").unwrap() - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(matrix.get("a", "a"), None);
        assert_eq!(matrix.get("b", "b"), None);
        assert_eq!(matrix.melt().len(), 6);
    }

    #[test]
    fn diagonal_included_when_requested() {
        let mut community = ProportionalBuilder
            .construct(&[taxon("a", None), taxon("b", None)], true)
            .unwrap();
        community.set_medium(&medium()).unwrap();
        let relative = community
            .knockout_sweep(1.0, KnockoutMethod::RelativeChange, false, true)
            .unwrap();
        assert!((relative.get("a", "a").unwrap() + 1.0).abs() < 1e-12);
        let raw = community
            .knockout_sweep(1.0, KnockoutMethod::Raw, false, true)
            .unwrap();
        assert!((raw.get("a", "b").unwrap() - 1.0).abs() < 1e-12);
        assert!(raw.get("a", "a").unwrap().abs() < 1e-12);
        let change = community
            .knockout_sweep(1.0, KnockoutMethod::Change, true, true)
            .unwrap();
        assert!((change.get("b", "a").unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn zero_abundance_members_have_no_relative_change() {
        let mut community = ProportionalBuilder
            .construct(&[taxon("a", Some(1.0)), taxon("b", Some(0.0))], true)
            .unwrap();
        community.set_medium(&medium()).unwrap();
        let matrix = community
            .knockout_sweep(1.0, KnockoutMethod::RelativeChange, true, true)
            .unwrap();
        // Knocking out a leaves nothing able to grow
        assert_eq!(matrix.get("a", "b"), None);
        assert!(matrix.get("b", "a").unwrap().abs() < 1e-12);
        assert_eq!(matrix.melt().len(), 1);
    }
}
