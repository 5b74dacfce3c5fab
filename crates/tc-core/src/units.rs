// tc-core/src/units.rs

use uom::si::f64::{
    MolarEnergy as UomMolarEnergy, MolarHeatCapacity as UomMolarHeatCapacity,
    ThermodynamicTemperature as UomThermodynamicTemperature,
};

// Public canonical unit types (SI, f64)
pub type Temperature = UomThermodynamicTemperature;
/// Molar enthalpy / Gibbs energy [J/mol].
pub type MolarEnergy = UomMolarEnergy;
/// Molar heat capacity and molar entropy share a dimension [J/(mol·K)].
pub type MolarHeatCapacity = UomMolarHeatCapacity;
pub type MolarEntropy = UomMolarHeatCapacity;

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn j_per_mol(v: f64) -> MolarEnergy {
    use uom::si::molar_energy::joule_per_mole;
    MolarEnergy::new::<joule_per_mole>(v)
}

#[inline]
pub fn j_per_mol_k(v: f64) -> MolarHeatCapacity {
    use uom::si::molar_heat_capacity::joule_per_kelvin_mole;
    MolarHeatCapacity::new::<joule_per_kelvin_mole>(v)
}

/// Kelvin value of a temperature.
#[inline]
pub fn kelvin_of(t: Temperature) -> f64 {
    use uom::si::thermodynamic_temperature::kelvin;
    t.get::<kelvin>()
}

/// kJ/mol value of a molar energy (database tables quote kJ/mol).
#[inline]
pub fn kj_per_mol_of(e: MolarEnergy) -> f64 {
    use uom::si::molar_energy::kilojoule_per_mole;
    e.get::<kilojoule_per_mole>()
}
