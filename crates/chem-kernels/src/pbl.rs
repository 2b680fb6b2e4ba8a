//! Boundary-layer-mean mixing ratios.
//!
//! A satellite vertical column density is converted into a mean mixing
//! ratio inside the boundary layer by dividing by the number of air
//! molecules in a boundary-layer-deep column, computed from the ideal gas
//! law at a fixed reference surface state.

/// Avogadro constant (molecules per mole).
pub const AVOGADRO: f64 = 6.022e23;

/// Universal gas constant (J/(mol·K)).
pub const GAS_CONSTANT: f64 = 8.314;

/// Reference surface state for the ideal-gas air density.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AirMass {
    /// Surface temperature (K).
    pub surface_temperature_k: f64,
    /// Surface pressure (Pa).
    pub surface_pressure_pa: f64,
}

impl Default for AirMass {
    fn default() -> Self {
        // Multi-year station means for the study area
        Self {
            surface_temperature_k: 12.38 + 273.15,
            surface_pressure_pa: 99587.0,
        }
    }
}

impl AirMass {
    /// Create a reference state from a temperature in °C and pressure in Pa.
    pub fn new(surface_temperature_c: f64, surface_pressure_pa: f64) -> Self {
        Self {
            surface_temperature_k: surface_temperature_c + 273.15,
            surface_pressure_pa,
        }
    }

    /// Air number density at the surface (molecules/m³): p·NA/(R·T).
    pub fn surface_number_density(&self) -> f64 {
        self.surface_pressure_pa * AVOGADRO / (GAS_CONSTANT * self.surface_temperature_k)
    }

    /// Number of air molecules in a boundary-layer-deep column
    /// (molecules/cm²) for a boundary-layer height in meters.
    ///
    /// NaN heights propagate.
    pub fn pbl_air_column(&self, pblh_m: f64) -> f64 {
        pblh_m * self.surface_number_density() * 1e-4
    }
}

/// Boundary-layer-mean mixing ratio in ppbv.
///
/// `column` is the trace-gas column in molecules/cm², `air_column` the air
/// column from [`AirMass::pbl_air_column`]. A zero (or NaN) air column gives
/// NaN, never an error.
pub fn mixing_ratio_ppbv(column: f64, air_column: f64) -> f64 {
    if air_column == 0.0 || air_column.is_nan() {
        return f64::NAN;
    }
    column / air_column * 1e9
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_number_density() {
        let air = AirMass::default();
        let n = air.surface_number_density();
        // 99587 · 6.022e23 / (8.314 · 285.53) ≈ 2.526e25 molecules/m³
        assert!((n / 2.526e25 - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_pbl_air_column_scales_with_height() {
        let air = AirMass::default();
        let shallow = air.pbl_air_column(500.0);
        let deep = air.pbl_air_column(1000.0);
        assert!((deep / shallow - 2.0).abs() < 1e-12);
        // ~1000 m of air is on the order of 2.5e24 molecules/cm²
        assert!(deep > 1e24 && deep < 1e26);
    }

    #[test]
    fn test_mixing_ratio() {
        let air = AirMass::default();
        let air_column = air.pbl_air_column(800.0);
        // A typical HCHO column of 1e16 molecules/cm²
        let ppbv = mixing_ratio_ppbv(1e16, air_column);
        assert!(ppbv > 0.0 && ppbv < 100.0);
    }

    #[test]
    fn test_zero_air_column_is_nan() {
        assert!(mixing_ratio_ppbv(1e16, 0.0).is_nan());
        assert!(mixing_ratio_ppbv(1e16, f64::NAN).is_nan());
    }

    #[test]
    fn test_nan_height_propagates() {
        let air = AirMass::default();
        assert!(air.pbl_air_column(f64::NAN).is_nan());
    }
}
