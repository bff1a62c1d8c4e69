//! Engine errors.
//!
//! Only malformed input is an error. Running out of room, hitting a
//! deformation ceiling or meeting a closed gate are reported through return
//! values instead.

use fluid_rules::FluidRulesError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrganError {
    #[error("invalid argument `{name}`: {value}")]
    InvalidArgument { name: &'static str, value: f32 },

    #[error("failed to parse organ config: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Fluids(#[from] FluidRulesError),
}

pub type OrganResult<T> = Result<T, OrganError>;
