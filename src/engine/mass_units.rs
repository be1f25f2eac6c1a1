// ==========================================
// CAERS Core - Mass Unit Conversion
// ==========================================
// Used only to derive calculated_emissions_tons.
// A unit outside this table (curies, volumes) yields None.
// ==========================================

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

/// Mass units with a fixed factor in pounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MassUomConversion {
    Lb,
    Ton,
    Kg,
    G,
    Mg,
    Ug,
    Mton,
}

impl MassUomConversion {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "LB" => Some(MassUomConversion::Lb),
            "TON" => Some(MassUomConversion::Ton),
            "KG" => Some(MassUomConversion::Kg),
            "G" => Some(MassUomConversion::G),
            "MG" => Some(MassUomConversion::Mg),
            "UG" => Some(MassUomConversion::Ug),
            "MTON" => Some(MassUomConversion::Mton),
            _ => None,
        }
    }

    /// Pounds per unit
    pub fn conversion_factor(&self) -> Decimal {
        match self {
            MassUomConversion::Lb => dec!(1),
            MassUomConversion::Ton => dec!(2000),
            MassUomConversion::Kg => dec!(2.20462262185),
            MassUomConversion::G => dec!(0.00220462262185),
            MassUomConversion::Mg => dec!(0.00000220462262185),
            MassUomConversion::Ug => dec!(0.00000000220462262185),
            MassUomConversion::Mton => dec!(2204.62262185),
        }
    }
}

pub fn convert_mass_units(value: Decimal, source: MassUomConversion, target: MassUomConversion) -> Decimal {
    value * source.conversion_factor() / target.conversion_factor()
}

/// Converts a total in the given UoM code to short tons, if the code is a mass unit
pub fn convert_to_tons(value: Decimal, uom_code: &str) -> Option<Decimal> {
    match MassUomConversion::from_code(uom_code) {
        Some(source) => Some(convert_mass_units(value, source, MassUomConversion::Ton)),
        None => {
            debug!(uom_code, "no mass conversion for unit, tons left unset");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pounds_to_tons() {
        assert_eq!(convert_to_tons(dec!(4000), "LB"), Some(dec!(2)));
        assert_eq!(convert_to_tons(dec!(3), "TON"), Some(dec!(3)));
    }

    #[test]
    fn test_kilograms_to_tons() {
        let tons = convert_to_tons(dec!(1000), "KG").unwrap();
        assert_eq!(tons, dec!(1.102311310925));
    }

    #[test]
    fn test_non_mass_unit_is_none() {
        assert_eq!(convert_to_tons(dec!(10), "CURIE"), None);
        assert_eq!(convert_to_tons(dec!(10), "GAL"), None);
    }
}
