//! Distribution catalog
//!
//! Static description of the supported kinds and their parameters, for
//! callers that generate help text or input forms. The engine itself is a
//! closed set: anything not listed here fails at deserialization.

/// A single parameter of a distribution kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamInfo {
    pub name: &'static str,
    pub constraint: &'static str,
}

/// Description of one supported distribution kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionInfo {
    pub kind: &'static str,
    pub params: &'static [ParamInfo],
}

/// List every supported kind with its parameter names and constraints.
pub fn catalog() -> Vec<DistributionInfo> {
    vec![
        DistributionInfo {
            kind: "normal",
            params: &[
                ParamInfo {
                    name: "mean",
                    constraint: "finite",
                },
                ParamInfo {
                    name: "std",
                    constraint: ">= 0",
                },
            ],
        },
        DistributionInfo {
            kind: "lognormal",
            params: &[
                ParamInfo {
                    name: "location",
                    constraint: "finite",
                },
                ParamInfo {
                    name: "scale",
                    constraint: "> 0",
                },
            ],
        },
        DistributionInfo {
            kind: "uniform",
            params: &[
                ParamInfo {
                    name: "low",
                    constraint: "< high",
                },
                ParamInfo {
                    name: "high",
                    constraint: "> low",
                },
            ],
        },
        DistributionInfo {
            kind: "exponential",
            params: &[ParamInfo {
                name: "rate",
                constraint: "> 0",
            }],
        },
        DistributionInfo {
            kind: "gamma",
            params: &[
                ParamInfo {
                    name: "shape",
                    constraint: "> 0",
                },
                ParamInfo {
                    name: "rate",
                    constraint: "> 0",
                },
            ],
        },
        DistributionInfo {
            kind: "beta",
            params: &[
                ParamInfo {
                    name: "alpha",
                    constraint: "> 0",
                },
                ParamInfo {
                    name: "beta",
                    constraint: "> 0",
                },
            ],
        },
        DistributionInfo {
            kind: "weibull",
            params: &[
                ParamInfo {
                    name: "shape",
                    constraint: "> 0",
                },
                ParamInfo {
                    name: "scale",
                    constraint: "> 0",
                },
            ],
        },
        DistributionInfo {
            kind: "poisson",
            params: &[ParamInfo {
                name: "lambda",
                constraint: "> 0",
            }],
        },
    ]
}
