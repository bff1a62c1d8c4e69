//! Fluid kinds and their physical definitions.

mod registry;

pub use registry::*;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::FluidRulesError;

/// Every fluid the simulation knows how to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FluidKind {
    Water,
    Saline,
    Blood,
    Mucus,
    Lubricant,
    Milk,
    Oil,
    Honey,
    Slime,
}

impl FluidKind {
    pub const ALL: [FluidKind; 9] = [
        FluidKind::Water,
        FluidKind::Saline,
        FluidKind::Blood,
        FluidKind::Mucus,
        FluidKind::Lubricant,
        FluidKind::Milk,
        FluidKind::Oil,
        FluidKind::Honey,
        FluidKind::Slime,
    ];

    /// Lowercase name used in configuration tables.
    pub fn name(&self) -> &'static str {
        match self {
            FluidKind::Water => "water",
            FluidKind::Saline => "saline",
            FluidKind::Blood => "blood",
            FluidKind::Mucus => "mucus",
            FluidKind::Lubricant => "lubricant",
            FluidKind::Milk => "milk",
            FluidKind::Oil => "oil",
            FluidKind::Honey => "honey",
            FluidKind::Slime => "slime",
        }
    }
}

impl std::fmt::Display for FluidKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FluidKind {
    type Err = FluidRulesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        FluidKind::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| FluidRulesError::UnknownFluid(s.to_string()))
    }
}

/// Physical properties of one fluid kind.
///
/// Viscosity is relative to water (water = 1.0). Density is in g/ml.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FluidDefinition {
    pub viscosity: f32,
    pub density: f32,
}

impl FluidDefinition {
    pub const fn new(viscosity: f32, density: f32) -> Self {
        Self { viscosity, density }
    }
}

impl Default for FluidDefinition {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}
