//! Analysis-level engine calls.
//!
//! Each call snapshots the analysis (graph plus released values) and hands
//! both descriptions to the engine.

use tracing::info;
use yr_core::PrivacyUsage;
use yr_graph::{Analysis, AnalysisDescription, ReleaseDescription};

use crate::engine::Engine;
use crate::error::EngineResult;

fn snapshot(analysis: &Analysis) -> EngineResult<(AnalysisDescription, ReleaseDescription)> {
    Ok((analysis.describe(), analysis.describe_release()?))
}

/// Ask the engine whether the analysis is well formed.
pub fn validate(engine: &(impl Engine + ?Sized), analysis: &Analysis) -> EngineResult<bool> {
    let (description, release) = snapshot(analysis)?;
    info!(operation = "validate", nodes = analysis.len(), "engine call");
    let valid = engine.validate_analysis(&description, &release)?;
    info!(operation = "validate", valid, "engine call finished");
    Ok(valid)
}

/// Total privacy usage the engine computes for the analysis.
pub fn privacy_usage(
    engine: &(impl Engine + ?Sized),
    analysis: &Analysis,
) -> EngineResult<PrivacyUsage> {
    let (description, release) = snapshot(analysis)?;
    info!(operation = "privacy_usage", nodes = analysis.len(), "engine call");
    engine.compute_privacy_usage(&description, &release)
}

/// Execute the analysis and replace its released values with the result.
///
/// The released table is left untouched if the engine fails or the result
/// does not decode.
pub fn release(engine: &(impl Engine + ?Sized), analysis: &Analysis) -> EngineResult<()> {
    let (description, release) = snapshot(analysis)?;
    info!(operation = "release", nodes = analysis.len(), "engine call");
    let result = engine.compute_release(&description, &release)?;
    analysis.apply_release(&result)?;
    info!(
        operation = "release",
        released = result.values.len(),
        "engine call finished"
    );
    Ok(())
}

/// The engine's report, parsed from its JSON text.
pub fn report(
    engine: &(impl Engine + ?Sized),
    analysis: &Analysis,
) -> EngineResult<serde_json::Value> {
    let (description, release) = snapshot(analysis)?;
    info!(operation = "report", nodes = analysis.len(), "engine call");
    let text = engine.generate_report(&description, &release)?;
    Ok(serde_json::from_str(&text)?)
}
