use thiserror::Error;

/// Invalid simulation input, reported before the first step runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("unknown scenario parameter '{field}'")]
    UnknownField { field: String },

    #[error("scenario parameter '{field}' is missing")]
    MissingField { field: &'static str },

    #[error("scenario parameter '{field}' must be finite and non-negative, got {value}")]
    InvalidValue { field: &'static str, value: f64 },

    #[error("scenario parameter '{field}' must be finite, got {value}")]
    NonFiniteValue { field: &'static str, value: f64 },

    #[error("scenario parameter '{field}' is a fraction and must not exceed 1, got {value}")]
    FractionOutOfRange { field: &'static str, value: f64 },

    #[error("constant '{field}' must be finite and {requirement}, got {value}")]
    InvalidConstant {
        field: &'static str,
        value: f64,
        requirement: &'static str,
    },

    #[error("carrying capacity must be positive, got {0}")]
    NonPositiveCapacity(f64),

    #[error("simulation horizon must cover at least one day")]
    EmptyHorizon,

    #[error(
        "initial herd compartment '{compartment}' must be finite and non-negative, got {value}"
    )]
    InvalidInitialStock {
        compartment: &'static str,
        value: f64,
    },

    #[error("regime '{0}' is not defined in the scenario file")]
    UnknownRegime(String),
}

/// Failures while deriving comparison figures from finished runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReportError {
    #[error("year {year} is not a complete simulated year (available: {first}..={last})")]
    YearNotSimulated { year: i32, first: i32, last: i32 },

    #[error("no complete simulated year is available")]
    NoCompleteYears,
}
