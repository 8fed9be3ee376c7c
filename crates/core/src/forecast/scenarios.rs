use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

use super::validate_percent;

/// Month-end figures under a symmetric variance band.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScenarioSet {
    pub pessimistic: f64,
    pub realistic: f64,
    pub optimistic: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScenarioGenerator;

impl ScenarioGenerator {
    pub fn generate(&self, base_projection: f64, variance_percent: f64) -> ScenarioSet {
        let variance = variance_percent / 100.0;
        ScenarioSet {
            pessimistic: (base_projection * (1.0 - variance)).round(),
            realistic: base_projection.round(),
            optimistic: (base_projection * (1.0 + variance)).round(),
        }
    }
}

/// Validates the variance and derives the scenario band around `base_projection`.
pub fn generate_scenarios(
    base_projection: f64,
    variance_percent: f64,
) -> Result<ScenarioSet, DomainError> {
    validate_percent("variance_percent", variance_percent)?;
    Ok(ScenarioGenerator.generate(base_projection, variance_percent))
}
