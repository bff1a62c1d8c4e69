//! Errors raised while loading fluid rules.

use thiserror::Error;

use crate::fluids::FluidKind;

/// Failures when building a [`FluidRegistry`](crate::FluidRegistry) from configuration.
#[derive(Debug, Error)]
pub enum FluidRulesError {
    #[error("failed to parse fluid table: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown fluid kind `{0}`")]
    UnknownFluid(String),

    #[error("{kind} {field} must be positive and finite (got {value})")]
    InvalidDefinition {
        kind: FluidKind,
        field: &'static str,
        value: f32,
    },
}

pub type FluidRulesResult<T> = Result<T, FluidRulesError>;
