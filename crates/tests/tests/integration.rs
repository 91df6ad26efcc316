//! Integration tests for end-to-end galton execution.
//!
//! These tests verify the full pipeline:
//! Definition → Validate/Build → Execute → Analyze → Verify

use std::thread;
use std::time::Duration;

use galton_distributions::{DistributionSpec, Marginal};
use galton_model::{template, template_catalog, ConfigError};
use galton_runtime::{run, CancelToken, OutputState, RunOptions, RunStatus};
use galton_tests::TestHarness;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len() as f64;
    let mx = xs.iter().sum::<f64>() / n;
    let my = ys.iter().sum::<f64>() / n;
    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        cov += (x - mx) * (y - my);
        vx += (x - mx) * (x - mx);
        vy += (y - my) * (y - my);
    }
    cov / (vx.sqrt() * vy.sqrt())
}

/// Sample moments track closed-form moments for every supported kind.
///
/// Law-of-large-numbers check: fixed seed, 100k draws, tolerance scaled
/// to each distribution (2% of scale on the mean, 5% on the variance).
#[test]
fn test_all_marginals_recover_their_moments() {
    let cases = [
        Marginal::Normal {
            mean: 100.0,
            std: 10.0,
        },
        Marginal::LogNormal {
            location: 2.0,
            scale: 0.5,
        },
        Marginal::Uniform {
            low: -5.0,
            high: 15.0,
        },
        Marginal::Exponential { rate: 0.25 },
        Marginal::Gamma {
            shape: 3.0,
            rate: 0.5,
        },
        Marginal::Beta {
            alpha: 2.0,
            beta: 5.0,
        },
        Marginal::Weibull {
            shape: 1.5,
            scale: 4.0,
        },
        Marginal::Poisson { lambda: 6.0 },
    ];

    for marginal in cases {
        let spec = DistributionSpec::new(marginal.clone()).unwrap();
        let moments = spec.moments().unwrap();
        let sampler = spec.sampler().unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1234);
        let draws = sampler.sample(100_000, &mut rng);

        let n = draws.len() as f64;
        let mean = draws.iter().sum::<f64>() / n;
        let var = draws.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / (n - 1.0);

        let scale = moments.variance.sqrt().max(moments.mean.abs()).max(1e-9);
        assert!(
            (mean - moments.mean).abs() < 0.02 * scale,
            "{}: sample mean {mean} vs closed-form {}",
            marginal.kind_name(),
            moments.mean
        );
        assert!(
            (var - moments.variance).abs() < 0.05 * moments.variance,
            "{}: sample variance {var} vs closed-form {}",
            marginal.kind_name(),
            moments.variance
        );
    }
}

/// A target correlation between two normal variables survives the whole
/// pipeline within ±0.02 at 100k trials.
#[test]
fn test_pipeline_recovers_target_correlation() {
    let harness = TestHarness::new();
    let scenario = harness.build_ok(
        r#"{
            "name": "corr",
            "variables": [
                {"name": "a", "distribution": {"kind": "normal", "mean": 0.0, "std": 1.0}},
                {"name": "b", "distribution": {"kind": "normal", "mean": 0.0, "std": 2.0}}
            ],
            "correlations": [{"a": "a", "b": "b", "rho": 0.6}],
            "outputs": [{"name": "sum", "expression": "a + b"}],
            "iterations": 100000,
            "seed": 99
        }"#,
    );
    let result = harness.run_with(
        &scenario,
        &RunOptions {
            parallel: true,
            ..Default::default()
        },
    );

    let xs = result.ensemble.variable_column(0);
    let ys = result.ensemble.variable_column(1);
    let rho = pearson(&xs, &ys);
    assert!((rho - 0.6).abs() < 0.02, "sample correlation {rho}");
}

/// Correlation imposed via the copula must not distort the marginals:
/// sample moments of each variable still match the specification.
#[test]
fn test_correlated_non_normal_marginals_are_preserved() {
    let harness = TestHarness::new();
    let scenario = harness.build_ok(
        r#"{
            "name": "marginals",
            "variables": [
                {"name": "load", "distribution": {"kind": "gamma", "shape": 2.0, "rate": 0.25}},
                {"name": "demand", "distribution": {"kind": "lognormal", "location": 1.0, "scale": 0.4}}
            ],
            "correlations": [{"a": "load", "b": "demand", "rho": 0.7}],
            "outputs": [{"name": "strain", "expression": "load * demand"}],
            "iterations": 100000,
            "seed": 5
        }"#,
    );
    let report = harness.simulate(&scenario);

    for (name, summary) in &report.variables {
        let sample = summary.sample.expect("variable has samples");
        let scale = summary.spec_std.max(summary.spec_mean.abs());
        assert!(
            (sample.mean - summary.spec_mean).abs() < 0.02 * scale,
            "{name}: sample mean {} vs spec {}",
            sample.mean,
            summary.spec_mean
        );
        assert!(
            (sample.std - summary.spec_std).abs() < 0.05 * summary.spec_std.max(1e-9),
            "{name}: sample std {} vs spec {}",
            sample.std,
            summary.spec_std
        );
    }
}

/// Same seed, sequential vs parallel: byte-identical per-trial values.
#[test]
fn test_sequential_and_parallel_are_bit_identical_end_to_end() {
    let harness = TestHarness::new();
    let scenario = harness.build_ok(
        r#"{
            "name": "repro",
            "variables": [
                {"name": "x", "distribution": {"kind": "weibull", "shape": 1.2, "scale": 3.0}},
                {"name": "y", "distribution": {"kind": "beta", "alpha": 2.0, "beta": 2.0}},
                {"name": "k", "distribution": {"kind": "poisson", "lambda": 4.0}}
            ],
            "correlations": [{"a": "x", "b": "y", "rho": -0.4}],
            "outputs": [{"name": "blend", "expression": "x * y + k"}],
            "iterations": 20000,
            "seed": 2024
        }"#,
    );

    let sequential = harness.run(&scenario);
    let parallel = harness.run_with(
        &scenario,
        &RunOptions {
            parallel: true,
            ..Default::default()
        },
    );

    assert_eq!(sequential.ensemble.trials(), parallel.ensemble.trials());
    assert_eq!(sequential.metadata.seed, parallel.metadata.seed);
}

/// The 95% CI for an output mean shrinks strictly as iterations grow
/// (100 → 2 500 → 62 500 keeps the spec's ×25 growth ratio).
#[test]
fn test_confidence_interval_width_shrinks_with_iterations() {
    let harness = TestHarness::new();
    let scenario = harness.build_ok(
        r#"{
            "name": "ci",
            "variables": [
                {"name": "x", "distribution": {"kind": "normal", "mean": 50.0, "std": 12.0}}
            ],
            "outputs": [{"name": "echo", "expression": "x"}],
            "iterations": 100,
            "seed": 31
        }"#,
    );

    let mut widths = Vec::new();
    for iterations in [100_u64, 2_500, 62_500] {
        let result = harness.run_with(
            &scenario,
            &RunOptions {
                iterations: Some(iterations),
                ..Default::default()
            },
        );
        let report = galton_runtime::analyze(&result, &scenario);
        let stats = report.outputs["echo"].stats.as_ref().unwrap();
        let (lo, hi) = stats.confidence_interval;
        widths.push(hi - lo);
    }

    assert!(
        widths[0] > widths[1] && widths[1] > widths[2],
        "CI widths did not shrink: {widths:?}"
    );
}

/// An out-of-range correlation entry is rejected at build time; no
/// simulation work is possible.
#[test]
fn test_invalid_correlation_entry_fails_validation() {
    let harness = TestHarness::new();
    let errors = harness
        .build(
            r#"{
                "name": "bad",
                "variables": [
                    {"name": "a", "distribution": {"kind": "normal", "mean": 0.0, "std": 1.0}},
                    {"name": "b", "distribution": {"kind": "normal", "mean": 0.0, "std": 1.0}}
                ],
                "correlations": [{"a": "a", "b": "b", "rho": 1.5}],
                "outputs": [{"name": "s", "expression": "a + b"}],
                "iterations": 1000
            }"#,
        )
        .unwrap_err();
    assert!(errors
        .errors
        .iter()
        .any(|e| matches!(e, ConfigError::CorrelationOutOfRange { rho, .. } if *rho == 1.5)));
}

const NON_PSD: &str = r#"{
    "name": "threeway",
    "variables": [
        {"name": "a", "distribution": {"kind": "normal", "mean": 0.0, "std": 1.0}},
        {"name": "b", "distribution": {"kind": "normal", "mean": 0.0, "std": 1.0}},
        {"name": "c", "distribution": {"kind": "normal", "mean": 0.0, "std": 1.0}}
    ],
    "correlations": [
        {"a": "a", "b": "b", "rho": -0.9},
        {"a": "b", "b": "c", "rho": -0.9},
        {"a": "a", "b": "c", "rho": -0.9}
    ],
    "outputs": [{"name": "s", "expression": "a + b + c"}],
    "iterations": 2000,
    "seed": 8
    PSD_POLICY
}"#;

/// Three mutual correlations of -0.9 cannot coexist: lenient mode
/// corrects and reports, strict mode rejects.
#[test]
fn test_non_psd_matrix_policies() {
    let harness = TestHarness::new();

    // Lenient (default): corrected, flagged in metadata, run completes.
    let lenient = harness.build_ok(&NON_PSD.replace("PSD_POLICY", ""));
    assert!(lenient.transform().corrected());
    let report = harness.simulate(&lenient);
    assert!(report.metadata.correlation_corrected);
    assert_eq!(report.status, RunStatus::Complete);

    // Strict: hard configuration error.
    let errors = harness
        .build(&NON_PSD.replace("PSD_POLICY", r#", "psd_policy": "strict""#))
        .unwrap_err();
    assert!(errors
        .errors
        .iter()
        .any(|e| matches!(e, ConfigError::Correlation(_))));
}

/// Division by a variable that takes the value zero produces NaN-sentinel
/// outputs on those trials only; the run completes and the analyzer
/// reports the count.
#[test]
fn test_division_by_zero_yields_counted_sentinels() {
    let harness = TestHarness::new();
    // Poisson(1) is zero on roughly 37% of trials.
    let scenario = harness.build_ok(
        r#"{
            "name": "sentinel",
            "variables": [
                {"name": "revenue", "distribution": {"kind": "normal", "mean": 100.0, "std": 10.0}},
                {"name": "events", "distribution": {"kind": "poisson", "lambda": 1.0}}
            ],
            "outputs": [{"name": "per_event", "expression": "revenue / events"}],
            "iterations": 10000,
            "seed": 77
        }"#,
    );
    let report = harness.simulate(&scenario);

    let summary = &report.outputs["per_event"];
    assert_eq!(report.status, RunStatus::Complete);
    assert_eq!(report.metadata.failed_trials, 0);
    assert!(summary.degenerate_trials > 2_000, "{}", summary.degenerate_trials);
    assert!(summary.degenerate_trials < 5_000, "{}", summary.degenerate_trials);
    assert_eq!(
        summary.valid_trials + summary.degenerate_trials,
        10_000
    );
    assert_eq!(summary.state, OutputState::Ok);
}

/// The spec's reference scenario: profit = revenue − cost with
/// correlation 0.3, 10k trials, seed 42.
#[test]
fn test_profit_reference_scenario() {
    let harness = TestHarness::new();
    let json = r#"{
        "name": "profit",
        "variables": [
            {"name": "revenue", "distribution": {"kind": "normal", "mean": 100.0, "std": 10.0}},
            {"name": "cost", "distribution": {"kind": "normal", "mean": 80.0, "std": 5.0}}
        ],
        "correlations": [{"a": "revenue", "b": "cost", "rho": 0.3}],
        "outputs": [
            {"name": "profit", "expression": "revenue - cost", "risk": {"threshold": 0.0, "direction": "below"}}
        ],
        "iterations": 10000,
        "seed": 42
    }"#;
    let scenario = harness.build_ok(json);
    let report = harness.simulate(&scenario);

    let stats = report.outputs["profit"].stats.as_ref().unwrap();
    assert!((stats.mean - 20.0).abs() < 1.0, "mean {}", stats.mean);
    // Var = 10² + 5² − 2·0.3·10·5 = 95
    let expected_std = 95.0_f64.sqrt();
    assert!(
        (stats.std - expected_std).abs() < 1.0,
        "std {} vs {expected_std}",
        stats.std
    );

    // Risk of a loss is small but defined.
    let risk = stats.risk.unwrap();
    assert!(risk.probability < 0.05);
    assert!(risk.score <= 1.0 && risk.score >= 0.0);

    // Revenue (std 10) drives profit harder than cost (std 5).
    let drivers = &report.sensitivity["profit"];
    assert_eq!(drivers[0].variable, "revenue");

    // Same seed: the CI is reproducible to the bit.
    let again = harness.simulate(&scenario);
    let again_stats = again.outputs["profit"].stats.as_ref().unwrap();
    assert_eq!(stats.confidence_interval, again_stats.confidence_interval);
}

/// Cancelling a long run returns the completed prefix, flagged, with a
/// trial count matching what actually finished.
#[test]
fn test_cancellation_returns_partial_ensemble() {
    let harness = TestHarness::new();
    let scenario = harness.build_ok(
        r#"{
            "name": "marathon",
            "variables": [
                {"name": "a", "distribution": {"kind": "gamma", "shape": 2.0, "rate": 1.0}},
                {"name": "b", "distribution": {"kind": "lognormal", "location": 0.0, "scale": 1.0}},
                {"name": "c", "distribution": {"kind": "weibull", "shape": 1.5, "scale": 2.0}}
            ],
            "correlations": [{"a": "a", "b": "b", "rho": 0.5}],
            "outputs": [{"name": "s", "expression": "a * b + c ^ 2"}],
            "iterations": 1000000,
            "seed": 13
        }"#,
    );

    let cancel = CancelToken::new();
    let trigger = cancel.clone();
    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(40));
        trigger.cancel();
    });

    let result = run(
        &scenario,
        &RunOptions {
            cancel,
            ..Default::default()
        },
    )
    .unwrap();
    canceller.join().unwrap();

    assert_eq!(result.metadata.status, RunStatus::Cancelled);
    let completed = result.metadata.iterations_completed;
    assert!(completed > 0, "no chunks completed");
    assert!(completed < 1_000_000, "run was not actually cut short");
    assert_eq!(completed % result.metadata.chunk_size, 0);
    assert_eq!(result.ensemble.trials().len() as u64, completed);

    // A cancelled prefix still analyzes normally.
    let report = galton_runtime::analyze(&result, &scenario);
    assert_eq!(report.status, RunStatus::Cancelled);
    assert!(!report.is_degenerate());
}

/// Scenarios without correlations reduce to independent sampling, as an
/// explicit special case.
#[test]
fn test_independent_scenario_has_near_zero_cross_correlation() {
    let harness = TestHarness::new();
    let scenario = harness.build_ok(
        r#"{
            "name": "indep",
            "variables": [
                {"name": "a", "distribution": {"kind": "normal", "mean": 0.0, "std": 1.0}},
                {"name": "b", "distribution": {"kind": "exponential", "rate": 1.0}}
            ],
            "outputs": [{"name": "s", "expression": "a + b"}],
            "iterations": 50000,
            "seed": 3
        }"#,
    );
    assert!(!scenario.transform().corrected());

    let result = harness.run(&scenario);
    let rho = pearson(
        &result.ensemble.variable_column(0),
        &result.ensemble.variable_column(1),
    );
    assert!(rho.abs() < 0.02, "cross correlation {rho}");
}

/// Every built-in template instantiates by name and simulates end to end
/// through the same path as user scenarios.
#[test]
fn test_templates_simulate_end_to_end() {
    let harness = TestHarness::new();
    for info in template_catalog() {
        let mut def = template(info.name).unwrap();
        def.seed = Some(1);
        def.iterations = Some(2_000);
        let scenario = galton_model::Scenario::build(def, harness.config())
            .unwrap_or_else(|e| panic!("{}: {:?}", info.name, e.errors));
        let report = harness.simulate(&scenario);

        assert_eq!(report.status, RunStatus::Complete, "{}", info.name);
        assert!(!report.is_degenerate(), "{}", info.name);
        for (name, summary) in &report.outputs {
            assert!(
                summary.valid_trials > 0,
                "{}.{name} has no valid trials",
                info.name
            );
        }
    }
}
