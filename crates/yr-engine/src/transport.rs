//! JSON over a byte transport.
//!
//! A native engine library is reached through a single entry point taking a
//! method name and a request buffer. [`JsonEngine`] encodes each request as
//! `{"analysis": .., "release": ..}` and decodes the method's response.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use yr_core::{PrivacyUsage, YrError};
use yr_graph::{AnalysisDescription, ReleaseDescription};

use crate::engine::Engine;
use crate::error::{EngineError, EngineResult};

/// Engine entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    ValidateAnalysis,
    ComputePrivacyUsage,
    ComputeRelease,
    GenerateReport,
}

impl Method {
    pub const ALL: [Method; 4] = [
        Method::ValidateAnalysis,
        Method::ComputePrivacyUsage,
        Method::ComputeRelease,
        Method::GenerateReport,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Method::ValidateAnalysis => "validate_analysis",
            Method::ComputePrivacyUsage => "compute_privacy_usage",
            Method::ComputeRelease => "compute_release",
            Method::GenerateReport => "generate_report",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = YrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| YrError::configuration(format!("unknown engine method '{s}'")))
    }
}

/// Moves request bytes to the engine and response bytes back.
///
/// An `Err` carries the engine's own error message.
pub trait Transport {
    fn call(&self, method: Method, request: &[u8]) -> Result<Vec<u8>, String>;
}

impl<F> Transport for F
where
    F: Fn(Method, &[u8]) -> Result<Vec<u8>, String>,
{
    fn call(&self, method: Method, request: &[u8]) -> Result<Vec<u8>, String> {
        self(method, request)
    }
}

#[derive(Serialize)]
struct Request<'a> {
    analysis: &'a AnalysisDescription,
    release: &'a ReleaseDescription,
}

#[derive(Deserialize)]
struct Wrapped<T> {
    value: T,
}

/// [`Engine`] speaking JSON through a [`Transport`].
pub struct JsonEngine<T> {
    transport: T,
}

impl<T: Transport> JsonEngine<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    fn request<R: DeserializeOwned>(
        &self,
        method: Method,
        analysis: &AnalysisDescription,
        release: &ReleaseDescription,
    ) -> EngineResult<R> {
        let body = serde_json::to_vec(&Request { analysis, release })?;
        debug!(method = method.name(), bytes = body.len(), "engine request");
        let response = self
            .transport
            .call(method, &body)
            .map_err(EngineError::backend)?;
        Ok(serde_json::from_slice(&response)?)
    }
}

impl<T: Transport> Engine for JsonEngine<T> {
    fn validate_analysis(
        &self,
        analysis: &AnalysisDescription,
        release: &ReleaseDescription,
    ) -> EngineResult<bool> {
        let response: Wrapped<bool> = self.request(Method::ValidateAnalysis, analysis, release)?;
        Ok(response.value)
    }

    fn compute_privacy_usage(
        &self,
        analysis: &AnalysisDescription,
        release: &ReleaseDescription,
    ) -> EngineResult<PrivacyUsage> {
        self.request(Method::ComputePrivacyUsage, analysis, release)
    }

    fn compute_release(
        &self,
        analysis: &AnalysisDescription,
        release: &ReleaseDescription,
    ) -> EngineResult<ReleaseDescription> {
        self.request(Method::ComputeRelease, analysis, release)
    }

    fn generate_report(
        &self,
        analysis: &AnalysisDescription,
        release: &ReleaseDescription,
    ) -> EngineResult<String> {
        let response: Wrapped<String> = self.request(Method::GenerateReport, analysis, release)?;
        Ok(response.value)
    }
}

impl<T> fmt::Debug for JsonEngine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonEngine").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use yr_graph::{Analysis, Component};

    fn described() -> (AnalysisDescription, ReleaseDescription) {
        let analysis = Analysis::default();
        analysis
            .scope(|_| Component::constant(vec![1.0, 2.0])?.negative())
            .unwrap();
        (analysis.describe(), analysis.describe_release().unwrap())
    }

    #[test]
    fn method_names() {
        for method in Method::ALL {
            assert_eq!(method.name().parse::<Method>().unwrap(), method);
        }
        assert!("release".parse::<Method>().is_err());
        assert_eq!(Method::ComputeRelease.to_string(), "compute_release");
    }

    #[test]
    fn request_carries_both_descriptions() {
        let seen = RefCell::new(Vec::new());
        let engine = JsonEngine::new(|method: Method, body: &[u8]| -> Result<Vec<u8>, String> {
            let json: serde_json::Value = serde_json::from_slice(body).unwrap();
            seen.borrow_mut().push((method, json));
            Ok(br#"{"value": true}"#.to_vec())
        });

        let (analysis, release) = described();
        assert!(engine.validate_analysis(&analysis, &release).unwrap());

        let seen = seen.into_inner();
        assert_eq!(seen.len(), 1);
        let (method, json) = &seen[0];
        assert_eq!(*method, Method::ValidateAnalysis);
        assert_eq!(json["analysis"]["computation_graph"]["value"]["1"]["arguments"]["data"], 0);
        assert!(json["release"]["values"]["0"]["value"]["array_nd"].is_object());
    }

    #[test]
    fn responses_are_decoded_per_method() {
        let engine = JsonEngine::new(|method: Method, _: &[u8]| -> Result<Vec<u8>, String> {
            let body = match method {
                Method::ValidateAnalysis => r#"{"value": false}"#,
                Method::ComputePrivacyUsage => r#"{"distance_pure": {"epsilon": 0.25}}"#,
                Method::ComputeRelease => r#"{"values": {}}"#,
                Method::GenerateReport => r#"{"value": "[]"}"#,
            };
            Ok(body.as_bytes().to_vec())
        });
        let (analysis, release) = described();

        assert!(!engine.validate_analysis(&analysis, &release).unwrap());
        assert_eq!(
            engine.compute_privacy_usage(&analysis, &release).unwrap(),
            PrivacyUsage::Pure { epsilon: 0.25 }
        );
        assert!(engine.compute_release(&analysis, &release).unwrap().values.is_empty());
        assert_eq!(engine.generate_report(&analysis, &release).unwrap(), "[]");
    }

    #[test]
    fn backend_message_is_kept() {
        let engine = JsonEngine::new(|_: Method, _: &[u8]| -> Result<Vec<u8>, String> {
            Err("node 3: missing bounds".to_owned())
        });
        let (analysis, release) = described();
        let err = engine.validate_analysis(&analysis, &release).unwrap_err();
        assert!(matches!(err, EngineError::Backend { ref message } if message == "node 3: missing bounds"));
    }

    #[test]
    fn malformed_response_is_a_json_error() {
        let engine = JsonEngine::new(|_: Method, _: &[u8]| -> Result<Vec<u8>, String> {
            Ok(b"not json".to_vec())
        });
        let (analysis, release) = described();
        let err = engine.compute_release(&analysis, &release).unwrap_err();
        assert!(matches!(err, EngineError::Json(_)));
    }
}
