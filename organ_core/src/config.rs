//! Anatomical starting values, loadable from TOML.
//!
//! Every section is optional; missing keys keep their defaults.
//!
//! ```toml
//! [cavity]
//! base_capacity = 60.0
//! tube_fill_ratio = 0.2
//!
//! [gland]
//! follicle_sizes = [0.4, 0.8, 1.2]
//!
//! [fluids.honey]
//! viscosity = 30.0
//! density = 1.4
//! ```

use fluid_rules::{FluidDefinition, FluidKind, FluidRegistry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::OrganResult;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganConfig {
    pub cavity: CavityConfig,
    pub sphincter: SphincterConfig,
    pub wall: WallConfig,
    pub duct: DuctConfig,
    pub gland: GlandConfig,
    /// Overrides for fluid definitions, keyed by fluid name.
    pub fluids: BTreeMap<String, FluidDefinition>,
}

impl OrganConfig {
    /// Parse a TOML document. Unknown fluid names are rejected here rather
    /// than at cavity construction.
    pub fn from_toml_str(source: &str) -> OrganResult<Self> {
        let config: OrganConfig = toml::from_str(source)?;
        config.fluid_registry()?;
        Ok(config)
    }

    /// The built-in fluid table with this config's overrides applied.
    pub fn fluid_registry(&self) -> OrganResult<FluidRegistry> {
        let mut registry = FluidRegistry::new();
        for (name, definition) in &self.fluids {
            let kind: FluidKind = name.parse()?;
            registry.insert(kind, *definition)?;
        }
        Ok(registry)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CavityConfig {
    /// Undeformed capacity in ml.
    pub base_capacity: f32,
    pub ligament_integrity: f32,
    pub pelvic_floor_strength: f32,
    pub muscle_tone: f32,
    pub peristalsis_strength: f32,
    /// Share of every intake routed on to the ducts.
    pub tube_fill_ratio: f32,
    /// Share of peristaltic flow each duct passes on to its gland.
    pub ovary_fill_ratio: f32,
    /// Whether the intake search may inflate before stretching the wall.
    pub auto_inflate: bool,
}

impl Default for CavityConfig {
    fn default() -> Self {
        Self {
            base_capacity: 80.0,
            ligament_integrity: 1.0,
            pelvic_floor_strength: 1.0,
            muscle_tone: 0.8,
            peristalsis_strength: 0.1,
            tube_fill_ratio: 0.3,
            ovary_fill_ratio: 0.5,
            auto_inflate: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SphincterConfig {
    /// Diameter in cm.
    pub rest_diameter: f32,
    /// Maximum dilation in cm.
    pub max_dilation: f32,
}

impl Default for SphincterConfig {
    fn default() -> Self {
        Self {
            rest_diameter: 3.0,
            max_dilation: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WallConfig {
    /// Thickness in cm.
    pub thickness: f32,
    pub elasticity: f32,
    pub plasticity: f32,
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            thickness: 1.5,
            elasticity: 0.8,
            plasticity: 0.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DuctConfig {
    /// Length in cm.
    pub base_length: f32,
    /// Lumen diameter in cm.
    pub base_diameter: f32,
    /// Capacity in ml before inflation.
    pub base_capacity: f32,
    pub max_stretch_ratio: f32,
    pub max_inflation_ratio: f32,
    pub backflow_resistance: f32,
    /// Diameter of the gland-side opening in cm, before stretch.
    pub ovarian_opening: f32,
}

impl Default for DuctConfig {
    fn default() -> Self {
        Self {
            base_length: 10.0,
            base_diameter: 0.5,
            base_capacity: 2.0,
            max_stretch_ratio: 3.0,
            max_inflation_ratio: 5.0,
            backflow_resistance: 0.3,
            ovarian_opening: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlandConfig {
    /// Dimensions in cm.
    pub length: f32,
    pub width: f32,
    pub thickness: f32,
    /// Fluid capacity in ml before deformation.
    pub base_fluid_capacity: f32,
    pub elasticity: f32,
    pub max_stretch_ratio: f32,
    pub max_inflation_ratio: f32,
    /// Starting follicle diameters in cm. The count stays fixed.
    pub follicle_sizes: Vec<f32>,
    pub hormone_level: f32,
}

impl Default for GlandConfig {
    fn default() -> Self {
        Self {
            length: 3.0,
            width: 2.0,
            thickness: 1.0,
            base_fluid_capacity: 5.0,
            elasticity: 0.7,
            max_stretch_ratio: 3.0,
            max_inflation_ratio: 4.0,
            follicle_sizes: vec![0.3, 0.5, 0.7, 0.9, 1.1],
            hormone_level: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OrganError;

    #[test]
    fn test_empty_document_is_default() {
        let config = OrganConfig::from_toml_str("").unwrap();
        assert_eq!(config.cavity.base_capacity, 80.0);
        assert_eq!(config.gland.follicle_sizes.len(), 5);
        assert!(config.cavity.auto_inflate);
    }

    #[test]
    fn test_partial_sections() {
        let config = OrganConfig::from_toml_str(
            r#"
            [cavity]
            base_capacity = 60.0
            auto_inflate = false

            [duct]
            backflow_resistance = 0.9

            [fluids.honey]
            viscosity = 30.0
            density = 1.4
            "#,
        )
        .unwrap();

        assert_eq!(config.cavity.base_capacity, 60.0);
        assert!(!config.cavity.auto_inflate);
        // Unset keys in a present section keep defaults
        assert_eq!(config.cavity.tube_fill_ratio, 0.3);
        assert_eq!(config.duct.backflow_resistance, 0.9);
        assert_eq!(config.duct.base_capacity, 2.0);

        let registry = config.fluid_registry().unwrap();
        assert_eq!(registry.viscosity(FluidKind::Honey), 30.0);
    }

    #[test]
    fn test_unknown_fluid_rejected() {
        let result = OrganConfig::from_toml_str("[fluids.tar]\nviscosity = 50.0\ndensity = 1.2\n");
        assert!(matches!(result, Err(OrganError::Fluids(_))));
    }

    #[test]
    fn test_malformed_document() {
        let result = OrganConfig::from_toml_str("[cavity\nbase_capacity = ");
        assert!(matches!(result, Err(OrganError::Config(_))));
    }
}
