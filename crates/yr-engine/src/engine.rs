//! The engine seam.

use yr_core::PrivacyUsage;
use yr_graph::{AnalysisDescription, ReleaseDescription};

use crate::error::EngineResult;

/// Validates, accounts for and executes an analysis.
///
/// Every call receives the full graph description together with the
/// currently released values.
pub trait Engine {
    fn validate_analysis(
        &self,
        analysis: &AnalysisDescription,
        release: &ReleaseDescription,
    ) -> EngineResult<bool>;

    fn compute_privacy_usage(
        &self,
        analysis: &AnalysisDescription,
        release: &ReleaseDescription,
    ) -> EngineResult<PrivacyUsage>;

    fn compute_release(
        &self,
        analysis: &AnalysisDescription,
        release: &ReleaseDescription,
    ) -> EngineResult<ReleaseDescription>;

    /// JSON report text.
    fn generate_report(
        &self,
        analysis: &AnalysisDescription,
        release: &ReleaseDescription,
    ) -> EngineResult<String>;
}

impl<E: Engine + ?Sized> Engine for &E {
    fn validate_analysis(
        &self,
        analysis: &AnalysisDescription,
        release: &ReleaseDescription,
    ) -> EngineResult<bool> {
        (**self).validate_analysis(analysis, release)
    }

    fn compute_privacy_usage(
        &self,
        analysis: &AnalysisDescription,
        release: &ReleaseDescription,
    ) -> EngineResult<PrivacyUsage> {
        (**self).compute_privacy_usage(analysis, release)
    }

    fn compute_release(
        &self,
        analysis: &AnalysisDescription,
        release: &ReleaseDescription,
    ) -> EngineResult<ReleaseDescription> {
        (**self).compute_release(analysis, release)
    }

    fn generate_report(
        &self,
        analysis: &AnalysisDescription,
        release: &ReleaseDescription,
    ) -> EngineResult<String> {
        (**self).generate_report(analysis, release)
    }
}
