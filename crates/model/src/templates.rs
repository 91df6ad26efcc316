//! Predefined scenario templates
//!
//! Six built-in scenarios stored as data (serialized [`ScenarioDef`]
//! documents) and instantiated through the exact same deserialize →
//! build path as user-supplied scenarios. Templates get no special engine
//! behavior.

use crate::def::ScenarioDef;
use crate::error::ConfigError;

/// Catalog entry for one built-in template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateInfo {
    pub name: &'static str,
    pub description: &'static str,
}

const TEMPLATES: [(&str, &str, &str); 6] = [
    (
        "risk_assessment",
        "Annualized security-incident loss from threat frequency, impact cost, and mitigations",
        RISK_ASSESSMENT,
    ),
    (
        "project_planning",
        "Project duration across design/build/test phases with rework",
        PROJECT_PLANNING,
    ),
    (
        "supply_chain",
        "Procurement cost and stock-out exposure under demand and lead-time uncertainty",
        SUPPLY_CHAIN,
    ),
    (
        "technology_risk",
        "Revenue loss from outages, recovery time, and failover reliability",
        TECHNOLOGY_RISK,
    ),
    (
        "environmental",
        "Environmental impact index from emissions, containment, and climate drivers",
        ENVIRONMENTAL,
    ),
    (
        "compliance",
        "Compliance cost from audit findings, remediation, and fine exposure",
        COMPLIANCE,
    ),
];

/// List the built-in templates.
pub fn template_catalog() -> Vec<TemplateInfo> {
    TEMPLATES
        .iter()
        .map(|(name, description, _)| TemplateInfo { name, description })
        .collect()
}

/// Instantiate a built-in template by name.
///
/// The returned definition is ordinary data; callers may adjust it (seed,
/// iterations, parameters) before building.
pub fn template(name: &str) -> Result<ScenarioDef, ConfigError> {
    let Some((_, _, json)) = TEMPLATES.iter().find(|(n, _, _)| *n == name) else {
        return Err(ConfigError::UnknownTemplate {
            name: name.to_string(),
        });
    };
    serde_json::from_str(json).map_err(|e| ConfigError::MalformedTemplate {
        name: name.to_string(),
        message: e.to_string(),
    })
}

const RISK_ASSESSMENT: &str = r#"{
    "name": "risk_assessment",
    "description": "Annualized security-incident loss",
    "variables": [
        {"name": "threat_frequency", "distribution": {"kind": "poisson", "lambda": 3.0}},
        {"name": "mitigation_effectiveness", "distribution": {"kind": "beta", "alpha": 4.0, "beta": 2.0}},
        {"name": "incident_cost", "distribution": {"kind": "lognormal", "location": 10.5, "scale": 0.8}},
        {"name": "detection_days", "distribution": {"kind": "gamma", "shape": 2.0, "rate": 0.5}}
    ],
    "correlations": [
        {"a": "threat_frequency", "b": "incident_cost", "rho": 0.2},
        {"a": "detection_days", "b": "incident_cost", "rho": 0.35}
    ],
    "outputs": [
        {
            "name": "annual_loss",
            "expression": "threat_frequency * incident_cost * (1 - mitigation_effectiveness)",
            "risk": {"threshold": 100000.0, "direction": "above"}
        },
        {
            "name": "exposure_days",
            "expression": "threat_frequency * detection_days"
        }
    ],
    "iterations": 10000
}"#;

const PROJECT_PLANNING: &str = r#"{
    "name": "project_planning",
    "description": "Project duration with rework",
    "variables": [
        {"name": "design_days", "distribution": {"kind": "normal", "mean": 30.0, "std": 5.0, "bounds": {"lower": 0.0}}},
        {"name": "build_days", "distribution": {"kind": "normal", "mean": 60.0, "std": 10.0, "bounds": {"lower": 0.0}}},
        {"name": "test_days", "distribution": {"kind": "normal", "mean": 20.0, "std": 5.0, "bounds": {"lower": 0.0}}},
        {"name": "rework_factor", "distribution": {"kind": "beta", "alpha": 2.0, "beta": 5.0}}
    ],
    "correlations": [
        {"a": "design_days", "b": "build_days", "rho": 0.3},
        {"a": "build_days", "b": "test_days", "rho": 0.4}
    ],
    "outputs": [
        {
            "name": "total_days",
            "expression": "design_days + build_days + test_days + build_days * rework_factor",
            "risk": {"threshold": 140.0, "direction": "above"}
        }
    ],
    "iterations": 10000
}"#;

const SUPPLY_CHAIN: &str = r#"{
    "name": "supply_chain",
    "description": "Procurement cost and stock-out exposure",
    "variables": [
        {"name": "demand", "distribution": {"kind": "normal", "mean": 1000.0, "std": 150.0, "bounds": {"lower": 0.0}}},
        {"name": "lead_time_days", "distribution": {"kind": "gamma", "shape": 4.0, "rate": 0.5}},
        {"name": "unit_cost", "distribution": {"kind": "uniform", "low": 8.0, "high": 12.0}},
        {"name": "disruption_days", "distribution": {"kind": "exponential", "rate": 0.1}}
    ],
    "correlations": [
        {"a": "demand", "b": "unit_cost", "rho": 0.3},
        {"a": "lead_time_days", "b": "disruption_days", "rho": 0.25}
    ],
    "outputs": [
        {
            "name": "procurement_cost",
            "expression": "demand * unit_cost",
            "risk": {"threshold": 12500.0, "direction": "above"}
        },
        {
            "name": "stockout_exposure",
            "expression": "demand * (lead_time_days + disruption_days) / 30"
        }
    ],
    "iterations": 10000
}"#;

const TECHNOLOGY_RISK: &str = r#"{
    "name": "technology_risk",
    "description": "Outage-driven revenue loss",
    "variables": [
        {"name": "outage_count", "distribution": {"kind": "poisson", "lambda": 2.0}},
        {"name": "recovery_hours", "distribution": {"kind": "weibull", "shape": 1.5, "scale": 4.0}},
        {"name": "hourly_loss", "distribution": {"kind": "lognormal", "location": 8.0, "scale": 0.5}},
        {"name": "failover_success", "distribution": {"kind": "beta", "alpha": 8.0, "beta": 2.0}}
    ],
    "correlations": [
        {"a": "outage_count", "b": "recovery_hours", "rho": 0.2}
    ],
    "outputs": [
        {
            "name": "downtime_loss",
            "expression": "outage_count * recovery_hours * hourly_loss * (1 - failover_success)",
            "risk": {"threshold": 50000.0, "direction": "above"}
        }
    ],
    "iterations": 10000
}"#;

const ENVIRONMENTAL: &str = r#"{
    "name": "environmental",
    "description": "Environmental impact index",
    "variables": [
        {"name": "rainfall_mm", "distribution": {"kind": "gamma", "shape": 3.0, "rate": 0.02}},
        {"name": "temperature_anomaly", "distribution": {"kind": "normal", "mean": 1.2, "std": 0.4}},
        {"name": "emission_rate", "distribution": {"kind": "lognormal", "location": 3.0, "scale": 0.3}},
        {"name": "containment", "distribution": {"kind": "beta", "alpha": 6.0, "beta": 2.0}}
    ],
    "correlations": [
        {"a": "rainfall_mm", "b": "temperature_anomaly", "rho": -0.3}
    ],
    "outputs": [
        {
            "name": "impact_index",
            "expression": "emission_rate * (1 - containment) * (1 + temperature_anomaly / 10)",
            "risk": {"threshold": 12.0, "direction": "above"}
        },
        {
            "name": "runoff_load",
            "expression": "rainfall_mm * emission_rate / 100"
        }
    ],
    "iterations": 10000
}"#;

const COMPLIANCE: &str = r#"{
    "name": "compliance",
    "description": "Audit and fine exposure",
    "variables": [
        {"name": "audit_findings", "distribution": {"kind": "poisson", "lambda": 5.0}},
        {"name": "remediation_cost", "distribution": {"kind": "lognormal", "location": 9.0, "scale": 0.6}},
        {"name": "fine_exposure", "distribution": {"kind": "uniform", "low": 0.0, "high": 250000.0}},
        {"name": "control_strength", "distribution": {"kind": "beta", "alpha": 5.0, "beta": 3.0}}
    ],
    "correlations": [
        {"a": "audit_findings", "b": "remediation_cost", "rho": 0.4},
        {"a": "audit_findings", "b": "control_strength", "rho": -0.35}
    ],
    "outputs": [
        {
            "name": "compliance_cost",
            "expression": "remediation_cost * audit_findings + fine_exposure * (1 - control_strength)",
            "risk": {"threshold": 500000.0, "direction": "above"}
        }
    ],
    "iterations": 10000
}"#;
