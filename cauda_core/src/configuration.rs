//! Process wide defaults used by the knockout calculator and the flux utilities
use std::sync::{LazyLock, RwLock};

use crate::community::KnockoutMethod;

pub static CONFIGURATION: LazyLock<RwLock<Configuration>> =
    LazyLock::new(|| RwLock::new(Configuration::default()));

#[derive(Clone, Debug)]
pub struct Configuration {
    /// Fraction of the maximal community growth rate enforced during a knockout sweep
    pub knockout_fraction: f64,
    /// How knockout abundances are compared against the full community
    pub knockout_method: KnockoutMethod,
    /// Whether self comparisons (a taxon against its own knockout) are left out of the sweep
    pub exclude_diagonal: bool,
    /// Whether the community engine should report progress
    pub progress: bool,
    /// Name of the flux column read from flux tables when none is given
    pub flux_column: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            knockout_fraction: 1.0,
            knockout_method: KnockoutMethod::RelativeChange,
            exclude_diagonal: true,
            progress: false,
            flux_column: "flux".to_string(),
        }
    }
}

/// Snapshot of the current configuration
///
/// Falls back to the defaults if the lock was poisoned by a panicking writer.
pub fn current() -> Configuration {
    match CONFIGURATION.read() {
        Ok(config) => config.clone(),
        Err(_) => Configuration::default(),
    }
}
