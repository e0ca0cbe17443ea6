use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const ELECTRICITY_KG_CO2_PER_KWH: f64 = 0.5;
pub const WATER_KG_CO2_PER_LITER: f64 = 0.001;

const ELECTRICITY_UNITS: &[&str] = &["kwh", "kw", "kilowatt-hours", "units"];
const WATER_UNITS: &[&str] = &["liters", "litres", "gallons", "cubic meters", "m3", "l", "gal"];

/// The two billable utilities. The CO2 factor is fixed per variant and the
/// derived value is always recomputed server-side from the billed amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UtilityType {
    Electricity,
    Water,
}

impl UtilityType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "electricity" => Some(Self::Electricity),
            "water" => Some(Self::Water),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Electricity => "electricity",
            Self::Water => "water",
        }
    }

    pub fn factor_kg_per_unit(&self) -> f64 {
        match self {
            Self::Electricity => ELECTRICITY_KG_CO2_PER_KWH,
            Self::Water => WATER_KG_CO2_PER_LITER,
        }
    }

    pub fn canonical_unit(&self) -> &'static str {
        match self {
            Self::Electricity => "kWh",
            Self::Water => "liters",
        }
    }

    /// Human-readable factor string used in reports, e.g.
    /// "0.5 kg CO2 per kWh".
    pub fn factor_label(&self) -> String {
        format!(
            "{} kg CO2 per {}",
            self.factor_kg_per_unit(),
            match self {
                Self::Electricity => "kWh",
                Self::Water => "liter",
            }
        )
    }

    /// Accepted unit spellings vary per utility (case-insensitive).
    pub fn accepts_unit(&self, unit: &str) -> bool {
        let unit = unit.to_ascii_lowercase();
        match self {
            Self::Electricity => ELECTRICITY_UNITS.contains(&unit.as_str()),
            Self::Water => WATER_UNITS.contains(&unit.as_str()),
        }
    }

    pub fn accepted_units(&self) -> &'static [&'static str] {
        match self {
            Self::Electricity => ELECTRICITY_UNITS,
            Self::Water => WATER_UNITS,
        }
    }
}

/// Parse a billed consumption amount. Rejects anything that is not a finite
/// non-negative number before it can reach the ledger.
pub fn parse_amount(raw: &str) -> AppResult<f64> {
    let amount: f64 = raw.trim().parse().map_err(|_| {
        AppError::InvalidInput(format!("bill amount must be a number, got '{raw}'"))
    })?;
    if !amount.is_finite() {
        return Err(AppError::InvalidInput(
            "bill amount must be a finite number".to_string(),
        ));
    }
    if amount < 0.0 {
        return Err(AppError::InvalidInput(
            "bill amount must be non-negative".to_string(),
        ));
    }
    Ok(amount)
}

/// CO2 kilograms for a billed amount: amount * factor(utility). Pure and
/// exact over its valid domain.
pub fn co2_kg(utility: UtilityType, amount: f64) -> AppResult<f64> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(AppError::InvalidInput(
            "consumption amount must be non-negative".to_string(),
        ));
    }
    Ok(amount * utility.factor_kg_per_unit())
}

#[cfg(test)]
mod tests {
    use super::{co2_kg, parse_amount, UtilityType};

    #[test]
    fn electricity_matches_rate_card() {
        let kg = co2_kg(UtilityType::Electricity, 1450.75).expect("co2");
        assert_eq!(kg, 725.375);
    }

    #[test]
    fn water_matches_rate_card() {
        let kg = co2_kg(UtilityType::Water, 2500.0).expect("co2");
        assert_eq!(kg, 2.5);
    }

    #[test]
    fn zero_amount_is_zero_co2() {
        assert_eq!(co2_kg(UtilityType::Electricity, 0.0).expect("co2"), 0.0);
        assert_eq!(co2_kg(UtilityType::Water, 0.0).expect("co2"), 0.0);
    }

    #[test]
    fn negative_amount_rejected() {
        assert!(co2_kg(UtilityType::Electricity, -1.0).is_err());
        assert!(parse_amount("-450").is_err());
    }

    #[test]
    fn non_numeric_amount_rejected() {
        assert!(parse_amount("a lot").is_err());
        assert!(parse_amount("NaN").is_err());
        assert!(parse_amount("inf").is_err());
    }

    #[test]
    fn amount_parses_decimals_and_whitespace() {
        assert_eq!(parse_amount(" 1250.75 ").expect("parse"), 1250.75);
        assert_eq!(parse_amount("450").expect("parse"), 450.0);
    }

    #[test]
    fn utility_parse_round_trips() {
        assert_eq!(
            UtilityType::parse("electricity"),
            Some(UtilityType::Electricity)
        );
        assert_eq!(UtilityType::parse("water"), Some(UtilityType::Water));
        assert_eq!(UtilityType::parse("gas"), None);
        assert_eq!(UtilityType::Electricity.as_str(), "electricity");
    }

    #[test]
    fn unit_allowlist_is_per_type_and_case_insensitive() {
        assert!(UtilityType::Electricity.accepts_unit("kWh"));
        assert!(UtilityType::Electricity.accepts_unit("KWH"));
        assert!(!UtilityType::Electricity.accepts_unit("liters"));
        assert!(UtilityType::Water.accepts_unit("Litres"));
        assert!(UtilityType::Water.accepts_unit("m3"));
        assert!(!UtilityType::Water.accepts_unit("kWh"));
    }

    #[test]
    fn factor_labels_name_unit() {
        assert_eq!(
            UtilityType::Electricity.factor_label(),
            "0.5 kg CO2 per kWh"
        );
        assert_eq!(UtilityType::Water.factor_label(), "0.001 kg CO2 per liter");
    }
}
