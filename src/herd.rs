use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// One of the six population sub-groups tracked by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compartment {
    FemaleCalves,
    Heifers,
    Cows,
    MaleCalves,
    Steers,
    Bulls,
}

impl Compartment {
    pub const ALL: [Compartment; 6] = [
        Compartment::FemaleCalves,
        Compartment::Heifers,
        Compartment::Cows,
        Compartment::MaleCalves,
        Compartment::Steers,
        Compartment::Bulls,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Compartment::FemaleCalves => "female_calves",
            Compartment::Heifers => "heifers",
            Compartment::Cows => "cows",
            Compartment::MaleCalves => "male_calves",
            Compartment::Steers => "steers",
            Compartment::Bulls => "bulls",
        }
    }
}

impl fmt::Display for Compartment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Head counts per compartment on a given day.
///
/// Counts are real-valued: the flows are daily rates and the model never
/// rounds to whole animals.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PopulationState {
    pub female_calves: f64,
    pub heifers: f64,
    pub cows: f64,
    pub male_calves: f64,
    pub steers: f64,
    pub bulls: f64,
}

impl PopulationState {
    /// Herd census the reference runs start from.
    pub fn historical() -> Self {
        Self {
            female_calves: 2_372_988.0,
            heifers: 2_372_988.0,
            cows: 10_915_744.0,
            male_calves: 2_847_585.0,
            steers: 2_372_988.0,
            bulls: 2_847_585.0,
        }
    }

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

    pub fn get_mut(&mut self, compartment: Compartment) -> &mut f64 {
        match compartment {
            Compartment::FemaleCalves => &mut self.female_calves,
            Compartment::Heifers => &mut self.heifers,
            Compartment::Cows => &mut self.cows,
            Compartment::MaleCalves => &mut self.male_calves,
            Compartment::Steers => &mut self.steers,
            Compartment::Bulls => &mut self.bulls,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Compartment, f64)> + '_ {
        Compartment::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    pub fn total(&self) -> f64 {
        self.female_calves + self.heifers + self.cows + self.male_calves + self.steers + self.bulls
    }

    pub fn clamp_non_negative(&mut self) {
        for compartment in Compartment::ALL {
            let stock = self.get_mut(compartment);
            *stock = stock.max(0.0);
        }
    }

    pub fn to_map(&self) -> BTreeMap<Compartment, f64> {
        self.iter().collect()
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for (compartment, value) in self.iter() {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigurationError::InvalidInitialStock {
                    compartment: compartment.name(),
                    value,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn historical_herd_totals_match_census() {
        let herd = PopulationState::historical();
        assert_eq!(herd.total(), 23_729_878.0);
        assert_eq!(herd.get(Compartment::Cows), 10_915_744.0);
    }

    #[test]
    fn clamping_only_touches_negative_compartments() {
        let mut herd = PopulationState {
            female_calves: -3.0,
            heifers: 4.0,
            cows: -0.5,
            male_calves: 0.0,
            steers: 7.0,
            bulls: -1e-9,
        };
        herd.clamp_non_negative();
        assert_eq!(herd.female_calves, 0.0);
        assert_eq!(herd.heifers, 4.0);
        assert_eq!(herd.cows, 0.0);
        assert_eq!(herd.steers, 7.0);
        assert_eq!(herd.bulls, 0.0);
    }

    #[test]
    fn map_keys_follow_compartment_order() {
        let keys: Vec<_> = PopulationState::historical().to_map().into_keys().collect();
        assert_eq!(keys, Compartment::ALL.to_vec());
    }

    #[test]
    fn negative_initial_stock_is_rejected() {
        let herd = PopulationState {
            steers: -1.0,
            ..PopulationState::historical()
        };
        assert_eq!(
            herd.validate(),
            Err(ConfigurationError::InvalidInitialStock {
                compartment: "steers",
                value: -1.0
            })
        );
    }
}
