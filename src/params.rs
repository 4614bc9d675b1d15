//! Management-regime parameters and the biology constants shared by every run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::herd::Compartment;

const FIELD_COUNT: usize = 22;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    /// Kilograms.
    Magnitude,
    /// Kilograms per day; zero or negative stalls maturation.
    Gain,
    /// Probability-like share in `[0, 1]`.
    Fraction,
    /// Annual rate; may exceed 1 for very harsh regimes.
    AnnualRate,
}

const FIELDS: [(&str, FieldKind); FIELD_COUNT] = [
    ("initial_weight_female_calf", FieldKind::Magnitude),
    ("daily_gain_female_calf", FieldKind::Gain),
    ("initial_weight_heifer", FieldKind::Magnitude),
    ("target_weight_heifer", FieldKind::Magnitude),
    ("daily_gain_heifer", FieldKind::Gain),
    ("initial_weight_male_calf", FieldKind::Magnitude),
    ("daily_gain_male_calf", FieldKind::Gain),
    ("daily_gain_steer", FieldKind::Gain),
    ("daily_gain_bull", FieldKind::Gain),
    ("pregnancy_rate_heifers", FieldKind::Fraction),
    ("pregnancy_rate_cows", FieldKind::Fraction),
    ("calving_rate_heifers", FieldKind::Fraction),
    ("calving_rate_cows", FieldKind::Fraction),
    ("female_birth_ratio", FieldKind::Fraction),
    ("cull_rate_open_heifers", FieldKind::AnnualRate),
    ("cull_rate_cows", FieldKind::AnnualRate),
    ("mortality_female_calves", FieldKind::AnnualRate),
    ("mortality_heifers", FieldKind::AnnualRate),
    ("mortality_cows", FieldKind::AnnualRate),
    ("mortality_male_calves", FieldKind::AnnualRate),
    ("mortality_steers", FieldKind::AnnualRate),
    ("mortality_bulls", FieldKind::AnnualRate),
];

/// Demographic and growth inputs describing one management regime.
///
/// Weights are in kilograms, gains in kilograms per day, culling and
/// mortality rates per year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScenarioParameters {
    pub initial_weight_female_calf: f64,
    pub daily_gain_female_calf: f64,
    pub initial_weight_heifer: f64,
    pub target_weight_heifer: f64,
    pub daily_gain_heifer: f64,
    pub initial_weight_male_calf: f64,
    pub daily_gain_male_calf: f64,
    pub daily_gain_steer: f64,
    pub daily_gain_bull: f64,
    pub pregnancy_rate_heifers: f64,
    pub pregnancy_rate_cows: f64,
    pub calving_rate_heifers: f64,
    pub calving_rate_cows: f64,
    pub female_birth_ratio: f64,
    pub cull_rate_open_heifers: f64,
    pub cull_rate_cows: f64,
    pub mortality_female_calves: f64,
    pub mortality_heifers: f64,
    pub mortality_cows: f64,
    pub mortality_male_calves: f64,
    pub mortality_steers: f64,
    pub mortality_bulls: f64,
}

impl ScenarioParameters {
    pub fn field_names() -> impl Iterator<Item = &'static str> {
        FIELDS.iter().map(|(name, _)| *name)
    }

    /// Builds a parameter set from a name-keyed map, rejecting unknown and
    /// missing names before any value is used.
    pub fn from_map(map: &BTreeMap<String, f64>) -> Result<Self, ConfigurationError> {
        if let Some(unknown) = map
            .keys()
            .find(|key| !FIELDS.iter().any(|(name, _)| *name == key.as_str()))
        {
            return Err(ConfigurationError::UnknownField {
                field: unknown.clone(),
            });
        }
        let mut values = [0.0; FIELD_COUNT];
        for (slot, (name, _)) in values.iter_mut().zip(FIELDS.iter()) {
            *slot = *map
                .get(*name)
                .ok_or(ConfigurationError::MissingField { field: *name })?;
        }
        let params = Self::from_values(values);
        params.validate()?;
        Ok(params)
    }

    pub fn to_map(&self) -> BTreeMap<String, f64> {
        Self::field_names()
            .map(str::to_string)
            .zip(self.values())
            .collect()
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for ((name, kind), value) in FIELDS.iter().zip(self.values()) {
            if *kind == FieldKind::Gain {
                if !value.is_finite() {
                    return Err(ConfigurationError::NonFiniteValue {
                        field: *name,
                        value,
                    });
                }
                continue;
            }
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigurationError::InvalidValue {
                    field: *name,
                    value,
                });
            }
            if *kind == FieldKind::Fraction && value > 1.0 {
                return Err(ConfigurationError::FractionOutOfRange {
                    field: *name,
                    value,
                });
            }
        }
        Ok(())
    }

    /// Combines two parameter sets field by field.
    pub fn zip_with(&self, other: &Self, mut f: impl FnMut(f64, f64) -> f64) -> Self {
        let mut values = self.values();
        for (value, rhs) in values.iter_mut().zip(other.values()) {
            *value = f(*value, rhs);
        }
        Self::from_values(values)
    }

    fn values(&self) -> [f64; FIELD_COUNT] {
        [
            self.initial_weight_female_calf,
            self.daily_gain_female_calf,
            self.initial_weight_heifer,
            self.target_weight_heifer,
            self.daily_gain_heifer,
            self.initial_weight_male_calf,
            self.daily_gain_male_calf,
            self.daily_gain_steer,
            self.daily_gain_bull,
            self.pregnancy_rate_heifers,
            self.pregnancy_rate_cows,
            self.calving_rate_heifers,
            self.calving_rate_cows,
            self.female_birth_ratio,
            self.cull_rate_open_heifers,
            self.cull_rate_cows,
            self.mortality_female_calves,
            self.mortality_heifers,
            self.mortality_cows,
            self.mortality_male_calves,
            self.mortality_steers,
            self.mortality_bulls,
        ]
    }

    fn from_values(values: [f64; FIELD_COUNT]) -> Self {
        let [
            initial_weight_female_calf,
            daily_gain_female_calf,
            initial_weight_heifer,
            target_weight_heifer,
            daily_gain_heifer,
            initial_weight_male_calf,
            daily_gain_male_calf,
            daily_gain_steer,
            daily_gain_bull,
            pregnancy_rate_heifers,
            pregnancy_rate_cows,
            calving_rate_heifers,
            calving_rate_cows,
            female_birth_ratio,
            cull_rate_open_heifers,
            cull_rate_cows,
            mortality_female_calves,
            mortality_heifers,
            mortality_cows,
            mortality_male_calves,
            mortality_steers,
            mortality_bulls,
        ] = values;
        Self {
            initial_weight_female_calf,
            daily_gain_female_calf,
            initial_weight_heifer,
            target_weight_heifer,
            daily_gain_heifer,
            initial_weight_male_calf,
            daily_gain_male_calf,
            daily_gain_steer,
            daily_gain_bull,
            pregnancy_rate_heifers,
            pregnancy_rate_cows,
            calving_rate_heifers,
            calving_rate_cows,
            female_birth_ratio,
            cull_rate_open_heifers,
            cull_rate_cows,
            mortality_female_calves,
            mortality_heifers,
            mortality_cows,
            mortality_male_calves,
            mortality_steers,
            mortality_bulls,
        }
    }

    /// Pasture-based regime of the reference study.
    pub fn extensive() -> Self {
        Self {
            initial_weight_female_calf: 28.0,
            daily_gain_female_calf: 0.50,
            initial_weight_heifer: 190.0,
            target_weight_heifer: 450.0,
            daily_gain_heifer: 0.25,
            initial_weight_male_calf: 28.0,
            daily_gain_male_calf: 0.50,
            daily_gain_steer: 0.25,
            daily_gain_bull: 0.50,
            pregnancy_rate_heifers: 0.65,
            pregnancy_rate_cows: 0.65,
            calving_rate_heifers: 0.85,
            calving_rate_cows: 0.85,
            female_birth_ratio: 0.50,
            cull_rate_open_heifers: 0.35,
            cull_rate_cows: 0.35,
            mortality_female_calves: 0.05,
            mortality_heifers: 0.05,
            mortality_cows: 0.05,
            mortality_male_calves: 0.05,
            mortality_steers: 0.05,
            mortality_bulls: 0.02,
        }
    }

    /// Supplemented-feeding regime of the reference study.
    pub fn intensive() -> Self {
        Self {
            initial_weight_female_calf: 40.0,
            daily_gain_female_calf: 0.70,
            initial_weight_heifer: 190.0,
            target_weight_heifer: 450.0,
            daily_gain_heifer: 0.50,
            initial_weight_male_calf: 40.0,
            daily_gain_male_calf: 0.70,
            daily_gain_steer: 0.50,
            daily_gain_bull: 0.75,
            pregnancy_rate_heifers: 0.70,
            pregnancy_rate_cows: 0.70,
            calving_rate_heifers: 0.90,
            calving_rate_cows: 0.90,
            female_birth_ratio: 0.50,
            cull_rate_open_heifers: 0.30,
            cull_rate_cows: 0.30,
            mortality_female_calves: 0.02,
            mortality_heifers: 0.02,
            mortality_cows: 0.02,
            mortality_male_calves: 0.02,
            mortality_steers: 0.02,
            mortality_bulls: 0.02,
        }
    }
}

fn default_sale_weight_heifers() -> f64 {
    380.0
}

fn default_sale_weight_cows() -> f64 {
    450.0
}

fn default_dressing_yield() -> f64 {
    0.52
}

fn default_target_weight_female_calf() -> f64 {
    190.0
}

fn default_cows_per_bull() -> f64 {
    25.0
}

fn default_target_weight_male_calf() -> f64 {
    230.0
}

fn default_initial_weight_steer() -> f64 {
    230.0
}

fn default_target_weight_steer() -> f64 {
    300.0
}

fn default_initial_weight_bull() -> f64 {
    300.0
}

fn default_target_weight_bull() -> f64 {
    530.0
}

/// Biology and carcass constants that do not vary between regimes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GlobalConstants {
    #[serde(default = "default_sale_weight_heifers")]
    pub sale_weight_heifers: f64,
    #[serde(default = "default_sale_weight_cows")]
    pub sale_weight_cows: f64,
    #[serde(default = "default_dressing_yield")]
    pub dressing_yield_heifers: f64,
    #[serde(default = "default_dressing_yield")]
    pub dressing_yield_cows: f64,
    #[serde(default = "default_dressing_yield")]
    pub dressing_yield_bulls: f64,
    #[serde(default = "default_target_weight_female_calf")]
    pub target_weight_female_calf: f64,
    /// Breeding cows one bull can serve.
    #[serde(default = "default_cows_per_bull")]
    pub cows_per_bull: f64,
    #[serde(default = "default_target_weight_male_calf")]
    pub target_weight_male_calf: f64,
    #[serde(default = "default_initial_weight_steer")]
    pub initial_weight_steer: f64,
    #[serde(default = "default_target_weight_steer")]
    pub target_weight_steer: f64,
    #[serde(default = "default_initial_weight_bull")]
    pub initial_weight_bull: f64,
    /// Finishing weight of a fattened bull, also its sale weight.
    #[serde(default = "default_target_weight_bull")]
    pub target_weight_bull: f64,
    #[serde(default)]
    pub emission_factors: EmissionFactors,
}

impl GlobalConstants {
    fn values(&self) -> [(&'static str, f64); 12] {
        [
            ("sale_weight_heifers", self.sale_weight_heifers),
            ("sale_weight_cows", self.sale_weight_cows),
            ("dressing_yield_heifers", self.dressing_yield_heifers),
            ("dressing_yield_cows", self.dressing_yield_cows),
            ("dressing_yield_bulls", self.dressing_yield_bulls),
            ("target_weight_female_calf", self.target_weight_female_calf),
            ("cows_per_bull", self.cows_per_bull),
            ("target_weight_male_calf", self.target_weight_male_calf),
            ("initial_weight_steer", self.initial_weight_steer),
            ("target_weight_steer", self.target_weight_steer),
            ("initial_weight_bull", self.initial_weight_bull),
            ("target_weight_bull", self.target_weight_bull),
        ]
    }

    /// Weights, yields and the bull ratio must be positive; yields at most 1.
    /// Emission factors may be zero but not negative.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for (field, value) in self.values() {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigurationError::InvalidConstant {
                    field,
                    value,
                    requirement: "positive",
                });
            }
            if field.starts_with("dressing_yield") && value > 1.0 {
                return Err(ConfigurationError::InvalidConstant {
                    field,
                    value,
                    requirement: "at most 1",
                });
            }
        }
        for compartment in Compartment::ALL {
            let value = self.emission_factors.get(compartment);
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigurationError::InvalidConstant {
                    field: compartment.name(),
                    value,
                    requirement: "non-negative",
                });
            }
        }
        Ok(())
    }
}

impl Default for GlobalConstants {
    fn default() -> Self {
        Self {
            sale_weight_heifers: default_sale_weight_heifers(),
            sale_weight_cows: default_sale_weight_cows(),
            dressing_yield_heifers: default_dressing_yield(),
            dressing_yield_cows: default_dressing_yield(),
            dressing_yield_bulls: default_dressing_yield(),
            target_weight_female_calf: default_target_weight_female_calf(),
            cows_per_bull: default_cows_per_bull(),
            target_weight_male_calf: default_target_weight_male_calf(),
            initial_weight_steer: default_initial_weight_steer(),
            target_weight_steer: default_target_weight_steer(),
            initial_weight_bull: default_initial_weight_bull(),
            target_weight_bull: default_target_weight_bull(),
            emission_factors: EmissionFactors::default(),
        }
    }
}

/// Greenhouse-gas emissions per head per day, in kg CO2-eq.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmissionFactors {
    pub female_calves: f64,
    pub heifers: f64,
    pub cows: f64,
    pub male_calves: f64,
    pub steers: f64,
    pub bulls: f64,
}

impl EmissionFactors {
    pub fn get(&self, compartment: Compartment) -> f64 {
        match compartment {
            Compartment::FemaleCalves => self.female_calves,
            Compartment::Heifers => self.heifers,
            Compartment::Cows => self.cows,
            Compartment::MaleCalves => self.male_calves,
            Compartment::Steers => self.steers,
            Compartment::Bulls => self.bulls,
        }
    }
}

impl Default for EmissionFactors {
    fn default() -> Self {
        Self {
            female_calves: 2.31,
            heifers: 3.68,
            cows: 4.41,
            male_calves: 2.50,
            steers: 4.45,
            bulls: 6.06,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_conversion_preserves_every_field() {
        let params = ScenarioParameters::intensive();
        let map = params.to_map();
        assert_eq!(map.len(), FIELD_COUNT);
        assert_eq!(map["daily_gain_bull"], 0.75);
        assert_eq!(ScenarioParameters::from_map(&map), Ok(params));
    }

    #[test]
    fn unknown_field_is_a_configuration_error() {
        let mut map = ScenarioParameters::extensive().to_map();
        map.insert("milk_yield".into(), 12.0);
        assert_eq!(
            ScenarioParameters::from_map(&map),
            Err(ConfigurationError::UnknownField {
                field: "milk_yield".into()
            })
        );
    }

    #[test]
    fn missing_field_is_a_configuration_error() {
        let mut map = ScenarioParameters::extensive().to_map();
        map.remove("mortality_steers");
        assert_eq!(
            ScenarioParameters::from_map(&map),
            Err(ConfigurationError::MissingField {
                field: "mortality_steers"
            })
        );
    }

    #[test]
    fn fractions_above_one_are_rejected() {
        let params = ScenarioParameters {
            female_birth_ratio: 1.2,
            ..ScenarioParameters::extensive()
        };
        assert!(matches!(
            params.validate(),
            Err(ConfigurationError::FractionOutOfRange {
                field: "female_birth_ratio",
                ..
            })
        ));
    }

    #[test]
    fn negative_growth_rate_is_accepted() {
        let params = ScenarioParameters {
            daily_gain_bull: -0.2,
            daily_gain_heifer: -1.0,
            ..ScenarioParameters::extensive()
        };
        assert!(params.validate().is_ok());
        let params = ScenarioParameters {
            daily_gain_steer: f64::NAN,
            ..ScenarioParameters::extensive()
        };
        assert!(matches!(
            params.validate(),
            Err(ConfigurationError::NonFiniteValue {
                field: "daily_gain_steer",
                ..
            })
        ));
    }

    #[test]
    fn negative_rates_are_still_rejected() {
        let params = ScenarioParameters {
            mortality_cows: -0.01,
            ..ScenarioParameters::extensive()
        };
        assert!(matches!(
            params.validate(),
            Err(ConfigurationError::InvalidValue {
                field: "mortality_cows",
                ..
            })
        ));
    }

    #[test]
    fn default_constants_are_valid() {
        assert_eq!(GlobalConstants::default().validate(), Ok(()));
    }

    #[test]
    fn nonsensical_constants_are_rejected() {
        let zero_ratio = GlobalConstants {
            cows_per_bull: 0.0,
            ..GlobalConstants::default()
        };
        assert!(matches!(
            zero_ratio.validate(),
            Err(ConfigurationError::InvalidConstant {
                field: "cows_per_bull",
                ..
            })
        ));

        let negative_yield = GlobalConstants {
            dressing_yield_cows: -0.5,
            ..GlobalConstants::default()
        };
        assert!(matches!(
            negative_yield.validate(),
            Err(ConfigurationError::InvalidConstant {
                field: "dressing_yield_cows",
                ..
            })
        ));

        let oversized_yield = GlobalConstants {
            dressing_yield_bulls: 1.5,
            ..GlobalConstants::default()
        };
        assert!(matches!(
            oversized_yield.validate(),
            Err(ConfigurationError::InvalidConstant {
                requirement: "at most 1",
                ..
            })
        ));

        let mut negative_factor = GlobalConstants::default();
        negative_factor.emission_factors.bulls = -6.06;
        assert!(matches!(
            negative_factor.validate(),
            Err(ConfigurationError::InvalidConstant { field: "bulls", .. })
        ));
    }

    #[test]
    fn zero_growth_rate_is_accepted() {
        let params = ScenarioParameters {
            daily_gain_steer: 0.0,
            ..ScenarioParameters::extensive()
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn constants_deserialize_with_defaults() {
        let constants: GlobalConstants =
            serde_yaml::from_str("cows_per_bull: 30\nemission_factors:\n  cows: 5.0\n").unwrap();
        assert_eq!(constants.cows_per_bull, 30.0);
        assert_eq!(constants.emission_factors.cows, 5.0);
        assert_eq!(constants.emission_factors.bulls, 6.06);
        assert_eq!(constants.target_weight_bull, 530.0);
    }
}
