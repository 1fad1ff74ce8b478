//! Service calls against a recording fake engine.

use std::cell::RefCell;

use yr_core::{PrivacyUsage, YrError};
use yr_engine::{Engine, EngineError, EngineResult, JsonEngine, Method, service};
use yr_graph::{
    Analysis, AnalysisDescription, Component, Constraints, Dataset, DatasetSource,
    ReleaseDescription, ReleaseNode, stats,
};
use yr_value::Native;

/// Records every call and answers from canned values.
#[derive(Default)]
struct RecordingEngine {
    calls: RefCell<Vec<(&'static str, usize, usize)>>,
    release: ReleaseDescription,
    report: String,
    fail_with: Option<String>,
}

impl RecordingEngine {
    fn record(
        &self,
        method: &'static str,
        analysis: &AnalysisDescription,
        release: &ReleaseDescription,
    ) -> EngineResult<()> {
        self.calls.borrow_mut().push((
            method,
            analysis.computation_graph.value.len(),
            release.values.len(),
        ));
        match &self.fail_with {
            Some(message) => Err(EngineError::backend(message.clone())),
            None => Ok(()),
        }
    }

    fn methods(&self) -> Vec<&'static str> {
        self.calls.borrow().iter().map(|(m, _, _)| *m).collect()
    }
}

impl Engine for RecordingEngine {
    fn validate_analysis(
        &self,
        analysis: &AnalysisDescription,
        release: &ReleaseDescription,
    ) -> EngineResult<bool> {
        self.record("validate_analysis", analysis, release)?;
        Ok(!analysis.computation_graph.value.is_empty())
    }

    fn compute_privacy_usage(
        &self,
        analysis: &AnalysisDescription,
        release: &ReleaseDescription,
    ) -> EngineResult<PrivacyUsage> {
        self.record("compute_privacy_usage", analysis, release)?;
        Ok(PrivacyUsage::Approximate {
            epsilon: 1.0,
            delta: 1e-6,
        })
    }

    fn compute_release(
        &self,
        analysis: &AnalysisDescription,
        release: &ReleaseDescription,
    ) -> EngineResult<ReleaseDescription> {
        self.record("compute_release", analysis, release)?;
        Ok(self.release.clone())
    }

    fn generate_report(
        &self,
        analysis: &AnalysisDescription,
        release: &ReleaseDescription,
    ) -> EngineResult<String> {
        self.record("generate_report", analysis, release)?;
        Ok(self.report.clone())
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Dataset -> column -> bounded mean -> Laplace.
fn private_mean(analysis: &Analysis) -> Component {
    analysis
        .scope(|_| {
            let data = Dataset::new(DatasetSource::Path("data.csv".into()), true)?;
            let age = data.column("age")?;
            let constraints = Constraints::new()
                .with("data_min", 0.0)
                .with("data_max", 100.0)
                .with("data_n", 500_i64);
            let mean = stats::mean(&age, &constraints)?;
            stats::laplace_mechanism(&mean, vec![PrivacyUsage::Pure { epsilon: 0.1 }])
        })
        .unwrap()
}

#[test]
fn every_service_sends_the_full_snapshot() {
    init_tracing();
    let analysis = Analysis::default();
    private_mean(&analysis);
    let nodes = analysis.len();
    let literals = analysis.released_ids().len();

    let engine = RecordingEngine {
        report: "[]".to_owned(),
        ..Default::default()
    };
    assert!(service::validate(&engine, &analysis).unwrap());
    service::privacy_usage(&engine, &analysis).unwrap();
    service::report(&engine, &analysis).unwrap();

    assert_eq!(
        engine.methods(),
        vec!["validate_analysis", "compute_privacy_usage", "generate_report"]
    );
    assert!(
        engine
            .calls
            .borrow()
            .iter()
            .all(|&(_, n, r)| n == nodes && r == literals)
    );
}

#[test]
fn release_replaces_the_table() {
    init_tracing();
    let analysis = Analysis::default();
    let noisy = private_mean(&analysis);
    let id = noisy.id().unwrap();

    let mut result = ReleaseDescription::default();
    result.values.insert(
        id,
        ReleaseNode {
            value: Some(yr_value::encode(&Native::from(37.5), None).unwrap()),
            privacy_usage: vec![PrivacyUsage::Pure { epsilon: 0.1 }],
        },
    );
    let engine = RecordingEngine {
        release: result,
        ..Default::default()
    };

    service::release(&engine, &analysis).unwrap();
    assert_eq!(analysis.released_ids(), vec![id]);
    assert_eq!(noisy.value(), Some(Native::from(37.5)));
    assert_eq!(
        noisy.actual_privacy_usage(),
        Some(vec![PrivacyUsage::Pure { epsilon: 0.1 }])
    );
}

#[test]
fn backend_failure_leaves_release_alone() {
    let analysis = Analysis::default();
    let constant = analysis.scope(|_| Component::constant(5_i64)).unwrap();

    let engine = RecordingEngine {
        fail_with: Some("engine unavailable".to_owned()),
        ..Default::default()
    };
    let err = service::release(&engine, &analysis).unwrap_err();
    assert!(matches!(err, EngineError::Backend { .. }));
    assert_eq!(err.to_string(), "Backend error: engine unavailable");
    assert_eq!(constant.value(), Some(Native::from(5_i64)));
}

#[test]
fn report_must_be_json() {
    let analysis = Analysis::default();
    private_mean(&analysis);

    let engine = RecordingEngine {
        report: r#"[{"mechanism": "Laplace", "epsilon": 0.1}]"#.to_owned(),
        ..Default::default()
    };
    let report = service::report(&engine, &analysis).unwrap();
    assert_eq!(report[0]["mechanism"], "Laplace");

    let broken = RecordingEngine {
        report: "{".to_owned(),
        ..Default::default()
    };
    assert!(matches!(
        service::report(&broken, &analysis),
        Err(EngineError::Json(_))
    ));
}

#[test]
fn services_accept_trait_objects() {
    let analysis = Analysis::default();
    analysis.scope(|_| Component::constant(1.0)).unwrap();

    let engine = RecordingEngine::default();
    let dynamic: &dyn Engine = &engine;
    assert!(service::validate(dynamic, &analysis).unwrap());
    assert!(!service::validate(&engine, &Analysis::default()).unwrap());
}

#[test]
fn unencodable_release_is_a_graph_error() {
    let analysis = Analysis::default();
    analysis.scope(|_| Component::constant(1.0)).unwrap();
    let id = analysis.released_ids()[0];

    let mut result = ReleaseDescription::default();
    result.values.insert(
        id,
        ReleaseNode {
            value: Some(yr_value::Value::ArrayNd(yr_value::ArrayNd {
                shape: vec![2, 2],
                order: vec![0, 1],
                flattened: yr_value::Array1d::I64(vec![1, 2, 3].into()),
            })),
            privacy_usage: vec![],
        },
    );
    let engine = RecordingEngine {
        release: result,
        ..Default::default()
    };
    let err = service::release(&engine, &analysis).unwrap_err();
    assert!(matches!(err, EngineError::Graph(YrError::Configuration { .. })));
    assert_eq!(analysis.component(id).unwrap().value(), Some(Native::from(1.0)));
}

#[test]
fn json_engine_round_trips_a_release() {
    let analysis = Analysis::default();
    let noisy = private_mean(&analysis);
    let id = noisy.id().unwrap();

    let engine = JsonEngine::new(move |method: Method, _: &[u8]| -> Result<Vec<u8>, String> {
        match method {
            Method::ComputeRelease => Ok(format!(
                r#"{{"values": {{"{id}": {{"value": {{"array_nd": {{"shape": [], "order": [], "flattened": {{"f64": {{"data": [12.0]}}}}}}}}}}}}}}"#
            )
            .into_bytes()),
            other => Err(format!("{other} not supported")),
        }
    });

    service::release(&engine, &analysis).unwrap();
    assert_eq!(noisy.value(), Some(Native::from(12.0)));
    assert_eq!(noisy.actual_privacy_usage(), None);

    let err = service::validate(&engine, &analysis).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Backend error: validate_analysis not supported"
    );
}
