//! Multi-component fluid ledger.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::fluids::{FluidKind, FluidRegistry};

/// Amounts below this are treated as empty.
pub const FLUID_EPSILON: f32 = 1e-6;

/// A volume of fluid made of one or more kinds, in ml.
///
/// Removal is always proportional across every kind present, so the
/// composition of what stays and what leaves is the same.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FluidMixture {
    components: BTreeMap<FluidKind, f32>,
}

impl FluidMixture {
    /// Create an empty mixture.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mixture holding a single kind.
    pub fn of(kind: FluidKind, amount: f32) -> Self {
        let mut mixture = Self::new();
        mixture.add(kind, amount);
        mixture
    }

    /// Add an amount of one kind. Non-positive or non-finite amounts are ignored.
    pub fn add(&mut self, kind: FluidKind, amount: f32) {
        if !amount.is_finite() || amount <= 0.0 {
            return;
        }
        *self.components.entry(kind).or_insert(0.0) += amount;
    }

    /// Remove up to `amount` proportionally and return how much was removed.
    pub fn remove(&mut self, amount: f32) -> f32 {
        self.split_off(amount).total()
    }

    /// Remove up to `amount` proportionally and return the removed portion.
    pub fn split_off(&mut self, amount: f32) -> FluidMixture {
        let total = self.total();
        if !amount.is_finite() || amount <= 0.0 || total <= FLUID_EPSILON {
            return FluidMixture::new();
        }
        if amount >= total - FLUID_EPSILON {
            return self.drain();
        }

        let fraction = amount / total;
        let mut taken = FluidMixture::new();
        for (kind, volume) in self.components.iter_mut() {
            let share = *volume * fraction;
            *volume -= share;
            taken.add(*kind, share);
        }
        self.prune();
        taken
    }

    /// Move everything out of this mixture.
    pub fn drain(&mut self) -> FluidMixture {
        std::mem::take(self)
    }

    /// Pour another mixture into this one.
    pub fn merge(&mut self, other: FluidMixture) {
        for (kind, volume) in other.components {
            self.add(kind, volume);
        }
    }

    pub fn total(&self) -> f32 {
        self.components.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() <= FLUID_EPSILON
    }

    /// Volume of a single kind.
    pub fn amount_of(&self, kind: FluidKind) -> f32 {
        self.components.get(&kind).copied().unwrap_or(0.0)
    }

    /// Iterate over `(kind, volume)` pairs.
    pub fn components(&self) -> impl Iterator<Item = (FluidKind, f32)> + '_ {
        self.components.iter().map(|(kind, volume)| (*kind, *volume))
    }

    /// Volume-weighted viscosity. An empty mixture reads as water (1.0).
    pub fn viscosity(&self, registry: &FluidRegistry) -> f32 {
        self.weighted(|kind| registry.viscosity(kind))
    }

    /// Volume-weighted density. An empty mixture reads as water (1.0).
    pub fn density(&self, registry: &FluidRegistry) -> f32 {
        self.weighted(|kind| registry.density(kind))
    }

    /// Mass in grams.
    pub fn mass(&self, registry: &FluidRegistry) -> f32 {
        self.total() * self.density(registry)
    }

    fn weighted(&self, property: impl Fn(FluidKind) -> f32) -> f32 {
        let total = self.total();
        if total <= FLUID_EPSILON {
            return 1.0;
        }
        self.components
            .iter()
            .map(|(kind, volume)| property(*kind) * volume)
            .sum::<f32>()
            / total
    }

    fn prune(&mut self) {
        self.components.retain(|_, volume| *volume > FLUID_EPSILON);
    }
}
