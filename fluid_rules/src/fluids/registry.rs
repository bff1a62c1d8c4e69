//! Lookup table from fluid kind to physical definition.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{FluidDefinition, FluidKind};
use crate::error::{FluidRulesError, FluidRulesResult};

/// Physical definitions for every fluid kind.
///
/// Kinds missing from the table fall back to water-like behaviour, so a
/// lookup never fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FluidRegistry {
    definitions: HashMap<FluidKind, FluidDefinition>,
}

impl Default for FluidRegistry {
    fn default() -> Self {
        let definitions = [
            (FluidKind::Water, FluidDefinition::new(1.0, 1.0)),
            (FluidKind::Saline, FluidDefinition::new(1.02, 1.005)),
            (FluidKind::Blood, FluidDefinition::new(3.5, 1.06)),
            (FluidKind::Mucus, FluidDefinition::new(8.0, 1.02)),
            (FluidKind::Lubricant, FluidDefinition::new(5.0, 1.01)),
            (FluidKind::Milk, FluidDefinition::new(2.0, 1.03)),
            (FluidKind::Oil, FluidDefinition::new(10.0, 0.92)),
            (FluidKind::Honey, FluidDefinition::new(20.0, 1.42)),
            (FluidKind::Slime, FluidDefinition::new(12.0, 1.1)),
        ]
        .into_iter()
        .collect();

        Self { definitions }
    }
}

impl FluidRegistry {
    /// Create the built-in registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with no entries; every kind reads as water.
    pub fn empty() -> Self {
        Self {
            definitions: HashMap::new(),
        }
    }

    /// Build the built-in registry, then overlay definitions from a TOML
    /// document whose tables are named after fluid kinds:
    ///
    /// ```toml
    /// [honey]
    /// viscosity = 30.0
    /// density = 1.4
    /// ```
    pub fn from_toml_str(source: &str) -> FluidRulesResult<Self> {
        let overrides: HashMap<String, FluidDefinition> = toml::from_str(source)?;
        let mut registry = Self::default();
        for (name, definition) in overrides {
            let kind: FluidKind = name.parse()?;
            registry.insert(kind, definition)?;
        }
        Ok(registry)
    }

    /// Add or replace the definition for a kind.
    pub fn insert(&mut self, kind: FluidKind, definition: FluidDefinition) -> FluidRulesResult<()> {
        validate(kind, "viscosity", definition.viscosity)?;
        validate(kind, "density", definition.density)?;
        self.definitions.insert(kind, definition);
        Ok(())
    }

    /// Get the definition of a kind.
    pub fn get(&self, kind: FluidKind) -> FluidDefinition {
        self.definitions.get(&kind).copied().unwrap_or_default()
    }

    pub fn viscosity(&self, kind: FluidKind) -> f32 {
        self.get(kind).viscosity
    }

    pub fn density(&self, kind: FluidKind) -> f32 {
        self.get(kind).density
    }
}

fn validate(kind: FluidKind, field: &'static str, value: f32) -> FluidRulesResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(FluidRulesError::InvalidDefinition { kind, field, value })
    }
}
