use crate::params::ScenarioParameters;

/// Share of the transition completed when `step` (1-based) is computed.
///
/// Step 1 sees pure start parameters; the last step stops one increment
/// short of the end parameters.
pub fn progress(step: u64, total_steps: u64) -> f64 {
    if total_steps == 0 {
        return 0.0;
    }
    step.saturating_sub(1) as f64 / total_steps as f64
}

/// Linear blend `start + (end - start) * progress`, field by field.
pub fn interpolate(
    start: &ScenarioParameters,
    end: &ScenarioParameters,
    progress: f64,
) -> ScenarioParameters {
    start.zip_with(end, |from, to| from + (to - from) * progress)
}
