//! Elastic/plastic wall shared by the hollow organs.
//!
//! A wall stretches up to a limit set by its elasticity and remaining
//! integrity. On recovery the elastic part of the stretch relaxes back while
//! the plastic part, a fixed share of the peak stretch, stays for good.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::WallConfig;
use crate::constants::wall::*;

/// A stretch request the wall could not take.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("stretch to {attempted:.2} exceeds wall limit {max_allowed:.2}")]
pub struct StretchFailure {
    pub attempted: f32,
    pub max_allowed: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeformableWall {
    /// Thickness in cm at rest.
    pub thickness: f32,
    pub elasticity: f32,
    pub plasticity: f32,
    integrity: f32,
    stretch_ratio: f32,
    fatigue: f32,
    peak_stretch: f32,
    permanently_stretched: bool,
}

impl Default for DeformableWall {
    fn default() -> Self {
        Self::from_config(&WallConfig::default())
    }
}

impl DeformableWall {
    /// Create an unstretched, intact wall.
    pub fn new(thickness: f32, elasticity: f32, plasticity: f32) -> Self {
        Self {
            thickness: thickness.max(0.0),
            elasticity: elasticity.clamp(0.0, 1.0),
            plasticity: plasticity.clamp(0.0, 1.0),
            integrity: 1.0,
            stretch_ratio: 1.0,
            fatigue: 0.0,
            peak_stretch: 1.0,
            permanently_stretched: false,
        }
    }

    pub fn from_config(config: &WallConfig) -> Self {
        Self::new(config.thickness, config.elasticity, config.plasticity)
    }

    pub fn integrity(&self) -> f32 {
        self.integrity
    }

    pub fn stretch_ratio(&self) -> f32 {
        self.stretch_ratio
    }

    pub fn fatigue(&self) -> f32 {
        self.fatigue
    }

    pub fn peak_stretch(&self) -> f32 {
        self.peak_stretch
    }

    pub fn permanently_stretched(&self) -> bool {
        self.permanently_stretched
    }

    /// Largest stretch the wall can currently take.
    pub fn max_allowed(&self) -> f32 {
        BASE_STRETCH_LIMIT * self.elasticity * self.integrity
    }

    /// Stretch ratio the wall can never relax below.
    pub fn plastic_floor(&self) -> f32 {
        1.0 + self.plasticity * (self.peak_stretch - 1.0)
    }

    /// Stretch to `target`. Overreaching costs integrity even though nothing
    /// else changes.
    pub fn try_stretch(&mut self, target: f32) -> Result<(), StretchFailure> {
        let max_allowed = self.max_allowed();
        if !target.is_finite() || target > max_allowed {
            self.integrity = (self.integrity - STRETCH_FAIL_PENALTY).max(0.0);
            return Err(StretchFailure {
                attempted: target,
                max_allowed,
            });
        }

        let target = target.max(1.0);
        self.stretch_ratio = target;
        self.peak_stretch = self.peak_stretch.max(target);
        self.fatigue = (self.fatigue + (target - 1.0) * FATIGUE_PER_STRETCH).min(1.0);
        if target > self.permanent_threshold() {
            self.permanently_stretched = true;
        }
        Ok(())
    }

    /// Relax the elastic part of the stretch and shed fatigue.
    pub fn recover(&mut self, dt: f32) {
        self.recover_above(dt, 1.0);
    }

    /// Like [`recover`](Self::recover), but the stretch never drops below
    /// `held_open`, the ratio the organ's contents are holding the wall at.
    /// A wall already below that mark is left where it is.
    pub fn recover_above(&mut self, dt: f32, held_open: f32) {
        let floor = self.plastic_floor();
        if self.stretch_ratio > floor {
            let decay = (-RECOVERY_RATE * self.elasticity * dt).exp();
            let relaxed = floor + (self.stretch_ratio - floor) * decay;
            self.stretch_ratio = relaxed.max(held_open.min(self.stretch_ratio));
        }
        self.fatigue = (self.fatigue - FATIGUE_DECAY_RATE * dt).max(0.0);
    }

    /// Set stretch and fatigue directly, bypassing the limit. Used when the
    /// organ turns inside out and the wall has no say in the matter.
    pub fn force_deform(&mut self, stretch_ratio: f32, fatigue: f32) {
        self.stretch_ratio = stretch_ratio.max(1.0);
        self.peak_stretch = self.peak_stretch.max(self.stretch_ratio);
        self.fatigue = fatigue.clamp(0.0, 1.0);
        if self.stretch_ratio > self.permanent_threshold() {
            self.permanently_stretched = true;
        }
    }

    /// Lose integrity without stretching.
    pub fn degrade(&mut self, amount: f32) {
        self.integrity = (self.integrity - amount.max(0.0)).max(0.0);
    }

    /// Record a permanent mark. The flag never clears.
    pub fn mark_permanently_stretched(&mut self) {
        self.permanently_stretched = true;
    }

    fn permanent_threshold(&self) -> f32 {
        1.0 + PERMANENT_STRETCH_FACTOR * self.elasticity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stretch_within_limit() {
        let mut wall = DeformableWall::new(1.0, 0.8, 0.2);
        assert!((wall.max_allowed() - 4.0).abs() < 1e-5);

        wall.try_stretch(2.0).unwrap();

        assert_eq!(wall.stretch_ratio(), 2.0);
        assert_eq!(wall.peak_stretch(), 2.0);
        assert!((wall.fatigue() - 0.05).abs() < 1e-5);
        assert!(!wall.permanently_stretched());
        assert_eq!(wall.integrity(), 1.0);
    }

    #[test]
    fn test_overstretch_only_costs_integrity() {
        let mut wall = DeformableWall::new(1.0, 0.8, 0.2);
        wall.try_stretch(1.5).unwrap();
        let before = wall.clone();

        let err = wall.try_stretch(4.5).unwrap_err();

        assert_eq!(err.attempted, 4.5);
        assert!((wall.integrity() - (1.0 - STRETCH_FAIL_PENALTY)).abs() < 1e-5);
        assert_eq!(wall.stretch_ratio(), before.stretch_ratio());
        assert_eq!(wall.fatigue(), before.fatigue());
        assert_eq!(wall.peak_stretch(), before.peak_stretch());
    }

    #[test]
    fn test_limit_shrinks_with_integrity() {
        let mut wall = DeformableWall::new(1.0, 0.8, 0.2);
        wall.degrade(0.5);
        assert!((wall.max_allowed() - 2.0).abs() < 1e-5);
        assert!(wall.try_stretch(2.5).is_err());
    }

    #[test]
    fn test_permanent_stretch_threshold() {
        let mut wall = DeformableWall::new(1.0, 0.8, 0.2);
        // Threshold is 1 + 2 * 0.8 = 2.6
        wall.try_stretch(2.5).unwrap();
        assert!(!wall.permanently_stretched());
        wall.try_stretch(2.7).unwrap();
        assert!(wall.permanently_stretched());

        wall.try_stretch(1.0).unwrap();
        assert!(wall.permanently_stretched());
    }

    #[test]
    fn test_recovery_keeps_plastic_component() {
        let mut wall = DeformableWall::new(1.0, 0.8, 0.25);
        wall.try_stretch(3.0).unwrap();
        let floor = wall.plastic_floor();
        assert!((floor - 1.5).abs() < 1e-5);

        for _ in 0..500 {
            wall.recover(1.0);
        }

        assert!(wall.stretch_ratio() >= floor);
        assert!((wall.stretch_ratio() - floor).abs() < 0.01);
        assert_eq!(wall.fatigue(), 0.0);
    }

    #[test]
    fn test_recovery_is_gradual() {
        let mut wall = DeformableWall::new(1.0, 0.8, 0.0);
        wall.try_stretch(2.0).unwrap();
        wall.recover(1.0);
        assert!(wall.stretch_ratio() < 2.0);
        assert!(wall.stretch_ratio() > 1.5);
    }

    #[test]
    fn test_recovery_held_by_contents() {
        let mut wall = DeformableWall::new(1.0, 0.8, 0.0);
        wall.try_stretch(3.0).unwrap();
        for _ in 0..100 {
            wall.recover_above(1.0, 2.0);
        }
        assert!((wall.stretch_ratio() - 2.0).abs() < 1e-5);
        assert_eq!(wall.fatigue(), 0.0);

        // A mark above the current stretch never pushes the wall out
        wall.recover_above(1.0, 5.0);
        assert!((wall.stretch_ratio() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_force_deform_bypasses_limit() {
        let mut wall = DeformableWall::new(1.0, 0.5, 0.2);
        wall.force_deform(3.0, 0.9);
        assert_eq!(wall.stretch_ratio(), 3.0);
        assert_eq!(wall.fatigue(), 0.9);
        assert!(wall.permanently_stretched());
        assert_eq!(wall.integrity(), 1.0);
    }
}
