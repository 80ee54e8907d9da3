//! Linear interpolation of fluxes between two chemical environments
use tracing::debug;

use crate::configuration;
use crate::flux::{FluxError, FluxSeries, FluxTable};

/// Interpolate between the default flux columns of two tables
///
/// See [`interpolate_flux_columns`], both tables are read from the configured flux column
/// (`"flux"` unless changed).
pub fn interpolate_fluxes(
    table_1: &FluxTable,
    table_2: &FluxTable,
    factor: f64,
) -> Result<FluxSeries, FluxError> {
    let column = configuration::current().flux_column;
    interpolate_flux_columns(table_1, table_2, factor, &column, &column)
}

/// Interpolate fluxes between two chemical environments
///
/// Every reaction present in either table is included. A reaction missing from one of the
/// tables, or with a missing value, contributes a flux of zero. For each reaction the result is
/// `(1 - factor) * flux_1 + factor * flux_2`.
///
/// # Parameters
/// - `table_1`, `table_2`: Flux tables of the two environments
/// - `factor`: Interpolation factor, must be in [0, 1]
/// - `column_1`, `column_2`: Name of the flux column in each table
///
/// # Returns
/// The interpolated fluxes, ordered as the reactions of `table_1` followed by those only found
/// in `table_2`. Fails with [`FluxError::OutOfRange`] if `factor` is outside [0, 1].
///
/// # Examples
/// ```rust
/// use cauda_core::flux::{interpolate_flux_columns, FluxTable};
/// let a = FluxTable::from_rows("flux", [("R1", 10.0)]);
/// let b = FluxTable::from_rows("uptake", [("R2", 4.0)]);
/// let fluxes = interpolate_flux_columns(&a, &b, 0.25, "flux", "uptake").unwrap();
/// assert_eq!(fluxes["R1"], 7.5);
/// assert_eq!(fluxes["R2"], 1.0);
/// ```
pub fn interpolate_flux_columns(
    table_1: &FluxTable,
    table_2: &FluxTable,
    factor: f64,
    column_1: &str,
    column_2: &str,
) -> Result<FluxSeries, FluxError> {
    if !(0f64..=1f64).contains(&factor) {
        return Err(FluxError::OutOfRange(factor));
    }
    let series_1 = table_1.series(column_1)?;
    let series_2 = table_2.series(column_2)?;

    let mut interpolated = FluxSeries::with_capacity(series_1.len() + series_2.len());
    let reactions = series_1.keys().chain(series_2.keys());
    for rxn in reactions {
        if interpolated.contains_key(rxn) {
            continue;
        }
        let flux_1 = zero_filled(series_1.get(rxn));
        let flux_2 = zero_filled(series_2.get(rxn));
        interpolated.insert(rxn.clone(), (1f64 - factor) * flux_1 + factor * flux_2);
    }
    debug!(
        "Interpolated {} reactions with factor {}",
        interpolated.len(),
        factor
    );
    Ok(interpolated)
}

fn zero_filled(value: Option<&f64>) -> f64 {
    match value {
        Some(v) if !v.is_nan() => *v,
        _ => 0f64,
    }
}

#[cfg(test)]
mod interpolate_tests {
    use super::*;
    use indexmap::IndexSet;

    fn setup_tables() -> (FluxTable, FluxTable) {
        let medium_1 = FluxTable::from_rows(
            "flux",
            [("EX_glc__D_m", 10.0), ("EX_o2_m", 20.0), ("EX_nh4_m", 5.0)],
        );
        let medium_2 = FluxTable::from_rows(
            "flux",
            [("EX_o2_m", 0.0), ("EX_fru_m", 8.0), ("EX_nh4_m", 15.0)],
        );
        (medium_1, medium_2)
    }

    #[test]
    fn keys_are_union() {
        let (medium_1, medium_2) = setup_tables();
        for factor in [0.0, 0.3, 0.5, 1.0] {
            let fluxes = interpolate_fluxes(&medium_1, &medium_2, factor).unwrap();
            let keys: IndexSet<&str> = fluxes.keys().map(String::as_str).collect();
            let expected: IndexSet<&str> =
                ["EX_glc__D_m", "EX_o2_m", "EX_nh4_m", "EX_fru_m"].into_iter().collect();
            assert_eq!(keys, expected);
        }
    }

    #[test]
    fn output_order() {
        let (medium_1, medium_2) = setup_tables();
        let fluxes = interpolate_fluxes(&medium_1, &medium_2, 0.5).unwrap();
        let keys: Vec<&str> = fluxes.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["EX_glc__D_m", "EX_o2_m", "EX_nh4_m", "EX_fru_m"]);
    }

    #[test]
    fn endpoints_match_zero_filled_tables() {
        let (medium_1, medium_2) = setup_tables();
        let at_zero = interpolate_fluxes(&medium_1, &medium_2, 0.0).unwrap();
        assert_eq!(at_zero["EX_glc__D_m"], 10.0);
        assert_eq!(at_zero["EX_o2_m"], 20.0);
        assert_eq!(at_zero["EX_nh4_m"], 5.0);
        assert_eq!(at_zero["EX_fru_m"], 0.0);

        let at_one = interpolate_fluxes(&medium_1, &medium_2, 1.0).unwrap();
        assert_eq!(at_one["EX_glc__D_m"], 0.0);
        assert_eq!(at_one["EX_o2_m"], 0.0);
        assert_eq!(at_one["EX_nh4_m"], 15.0);
        assert_eq!(at_one["EX_fru_m"], 8.0);
    }

    #[test]
    fn midpoint() {
        let (medium_1, medium_2) = setup_tables();
        let fluxes = interpolate_fluxes(&medium_1, &medium_2, 0.25).unwrap();
        assert!((fluxes["EX_glc__D_m"] - 7.5).abs() < 1e-12);
        assert!((fluxes["EX_o2_m"] - 15.0).abs() < 1e-12);
        assert!((fluxes["EX_nh4_m"] - 7.5).abs() < 1e-12);
        assert!((fluxes["EX_fru_m"] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn factor_out_of_range() {
        let (medium_1, medium_2) = setup_tables();
        for factor in [-0.01, 1.01, f64::NAN] {
            assert!(matches!(
                interpolate_fluxes(&medium_1, &medium_2, factor),
                Err(FluxError::OutOfRange(_))
            ));
        }
    }

    #[test]
    fn duplicates_use_first_occurrence() {
        let medium_1 = FluxTable::from_rows("flux", [("R1", 5.0), ("R1", 9.0)]);
        let medium_2 = FluxTable::from_rows("flux", [("R2", 1.0)]);
        let fluxes = interpolate_fluxes(&medium_1, &medium_2, 0.0).unwrap();
        assert_eq!(fluxes.len(), 2);
        assert_eq!(fluxes["R1"], 5.0);
    }

    #[test]
    fn missing_values_are_zero() {
        let medium_1 = FluxTable::from_rows("flux", [("R1", f64::NAN), ("R2", 2.0)]);
        let medium_2 = FluxTable::from_rows("flux", [("R1", 4.0)]);
        let fluxes = interpolate_fluxes(&medium_1, &medium_2, 0.5).unwrap();
        assert_eq!(fluxes["R1"], 2.0);
        assert_eq!(fluxes["R2"], 1.0);
    }

    #[test]
    fn named_columns() {
        let medium_1 = FluxTable::from_rows("uptake", [("R1", 2.0)]);
        let medium_2 = FluxTable::from_rows("flux", [("R1", 4.0)]);
        let fluxes = interpolate_flux_columns(&medium_1, &medium_2, 0.5, "uptake", "flux").unwrap();
        assert_eq!(fluxes["R1"], 3.0);
        assert!(matches!(
            interpolate_fluxes(&medium_1, &medium_2, 0.5),
            Err(FluxError::ColumnNotFound(_))
        ));
    }
}
