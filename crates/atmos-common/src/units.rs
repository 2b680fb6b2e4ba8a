//! Column-amount unit selection.
//!
//! The conversion between mol/m² and molecules/cm² was toggled by hand in
//! the original workflow; here it is an explicit, user-selectable parameter.

use serde::{Deserialize, Serialize};

/// mol/m² → molecules/cm²: NA · 1e-4, as used for the trend figures.
const MOL_M2_TO_MOLEC_CM2: f64 = 6.02214e19;

/// Unit of a vertical column amount, with explicit conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnUnit {
    /// Moles per square meter (native TROPOMI export unit).
    #[default]
    MolPerM2,
    /// Molecules per square centimeter.
    MoleculesPerCm2,
}

impl ColumnUnit {
    /// Convert a value in this unit to molecules/cm².
    pub fn to_molecules_cm2(&self, value: f64) -> f64 {
        match self {
            ColumnUnit::MolPerM2 => value * MOL_M2_TO_MOLEC_CM2,
            ColumnUnit::MoleculesPerCm2 => value,
        }
    }

    /// Convert a value in this unit to mol/m².
    pub fn to_mol_m2(&self, value: f64) -> f64 {
        match self {
            ColumnUnit::MolPerM2 => value,
            ColumnUnit::MoleculesPerCm2 => value / MOL_M2_TO_MOLEC_CM2,
        }
    }

    /// NetCDF `units` attribute string.
    pub fn attribute(&self) -> &'static str {
        match self {
            ColumnUnit::MolPerM2 => "mol m-2",
            ColumnUnit::MoleculesPerCm2 => "molecules cm-2",
        }
    }
}

impl std::str::FromStr for ColumnUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mol_m2" | "mol/m2" | "mol-m2" => Ok(ColumnUnit::MolPerM2),
            "molec_cm2" | "molecules_cm2" | "molec/cm2" => Ok(ColumnUnit::MoleculesPerCm2),
            other => Err(format!("unknown column unit: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mol_m2_conversion() {
        let unit = ColumnUnit::MolPerM2;
        let molec = unit.to_molecules_cm2(1.0);
        assert!((molec - 6.02214e19).abs() / 6.02214e19 < 1e-6);
        // Round trip back to mol/m²
        let back = ColumnUnit::MoleculesPerCm2.to_mol_m2(molec);
        assert!((back - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_molecules_is_identity() {
        let unit = ColumnUnit::MoleculesPerCm2;
        assert_eq!(unit.to_molecules_cm2(3.5e15), 3.5e15);
    }

    #[test]
    fn test_parse() {
        assert_eq!("mol/m2".parse::<ColumnUnit>().unwrap(), ColumnUnit::MolPerM2);
        assert_eq!(
            "molec_cm2".parse::<ColumnUnit>().unwrap(),
            ColumnUnit::MoleculesPerCm2
        );
        assert!("ppb".parse::<ColumnUnit>().is_err());
    }
}
