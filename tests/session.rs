use std::path::Path;

use hpnn::{
    SessionErr,
    config::{Adapter, BackendConfig, LawConfig, RunConfig},
    session, train,
};
use ndarray::Array2;

fn config(workers: usize, backend: BackendConfig, momentum: Option<f64>) -> RunConfig {
    let mut config = RunConfig::parse(
        r#"{
            "network": { "inputs": 3, "hiddens": [5, 4], "outputs": 3 },
            "seed": 4321,
            "training": { "threshold": 1e-4, "max_iterations": 300 },
            "samples": [
                { "input": [0.5, -0.2, 0.9], "target": [0.0, 0.0, 1.0] },
                { "input": [-0.7, 0.4, 0.1], "target": [1.0, 0.0, 0.0] },
                { "input": [0.2, 0.8, -0.6], "target": [0.0, 1.0, 0.0] }
            ]
        }"#,
    )
    .unwrap();

    config.workers = workers;
    config.backend = backend;
    config.training.momentum = momentum;
    config
}

fn weights(report: &session::Report) -> Vec<Array2<f64>> {
    report
        .network
        .layers()
        .iter()
        .map(|l| l.weights().to_owned())
        .collect()
}

#[test]
fn every_sample_gets_an_outcome() {
    let report = train(config(1, BackendConfig::Reference, None)).unwrap();

    assert_eq!(report.outcomes.len(), 3);
    for outcome in &report.outcomes {
        assert!((1..=300).contains(&outcome.iterations));
        assert!(outcome.initial_error.is_finite());
        assert!(outcome.error.is_finite());
    }
    assert!(report.matched() <= 3);
}

#[test]
fn workers_train_the_same_network_as_a_single_one() {
    for momentum in [None, Some(0.2)] {
        let solo = train(config(1, BackendConfig::Reference, momentum)).unwrap();

        for workers in [2, 3, 4] {
            let report = train(config(workers, BackendConfig::Reference, momentum)).unwrap();

            for (a, b) in report.outcomes.iter().zip(&solo.outcomes) {
                assert_eq!(a.iterations, b.iterations, "{workers} workers");
                assert_eq!(a.matched, b.matched, "{workers} workers");
                assert!((a.error - b.error).abs() < 1e-12);
                assert!((a.initial_error - b.initial_error).abs() < 1e-12);
            }
            assert_eq!(weights(&report), weights(&solo), "{workers} workers");
        }
    }
}

#[test]
fn backends_end_up_close() {
    // Every backend runs to the iteration cap so rounding can't change when a sample stops.
    let run = |backend| {
        let mut config = config(3, backend, None);
        config.training.threshold = 0.0;
        train(config).unwrap()
    };
    let reference = run(BackendConfig::Reference);

    for backend in [BackendConfig::Vector, BackendConfig::Matrix] {
        let report = run(backend);

        let diff = weights(&report)
            .iter()
            .zip(weights(&reference).iter())
            .flat_map(|(a, b)| a.iter().zip(b).map(|(x, y)| (x - y).abs()))
            .fold(0., f64::max);
        assert!(diff < 1e-8, "{backend:?}: {diff}");
    }
}

#[test]
fn softmax_session_outputs_a_distribution() {
    let mut config = config(2, BackendConfig::Matrix, None);
    config.network.law = LawConfig::Softmax;
    config.threads = Some(2);

    let report = train(config).unwrap();
    let sum: f64 = report.network.output().sum();
    assert!((sum - 1.0).abs() < 1e-12);
}

#[test]
fn invalid_config_is_refused_before_training() {
    let mut config = config(2, BackendConfig::Vector, None);
    config.samples[1].target.push(0.0);

    assert!(matches!(train(config), Err(SessionErr::InvalidConfig(_))));
}

#[test]
fn bundled_config_is_valid() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("configs/two_class.json");
    let config = RunConfig::from_path(path).unwrap();

    let plan = Adapter::new().adapt(config).unwrap();
    assert!(plan.workers.get() > 1);
    assert!(!plan.samples.is_empty());
}
