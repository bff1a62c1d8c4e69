//! Fluid intake, removal and routing into the ducts.

use fluid_rules::{FluidKind, FluidMixture, FLUID_EPSILON};
use log::{trace, warn};

use super::{Cavity, CavityState};
use crate::anatomy::{Organ, Side};
use crate::constants::cavity::*;
use crate::events::OrganEvent;
use crate::outcome::FluidTransfer;

impl Cavity {
    /// Take in `amount` ml of `kind`.
    ///
    /// Whatever fits is placed at once. For the rest the cavity looks for the
    /// smallest deformation that would hold it, inflating first and stretching
    /// the wall only once inflation is spent, then tries again. Every placed
    /// portion sends its `tube_fill_ratio` share on toward the ducts.
    pub fn add_fluid(&mut self, kind: FluidKind, amount: f32) -> FluidTransfer {
        let mut remaining = FluidMixture::of(kind, amount);
        let requested = remaining.total();
        if requested <= FLUID_EPSILON {
            return FluidTransfer::default();
        }

        if self.state != CavityState::Everted {
            for _ in 0..MAX_INTAKE_ROUNDS {
                let placed = remaining.split_off(self.available_volume());
                let placed_amount = placed.total();
                if placed_amount > FLUID_EPSILON {
                    self.fluid_buffer.merge(placed);
                    self.distribute_to_ducts(placed_amount * self.tube_fill_ratio);
                }
                if remaining.total() <= FLUID_EPSILON || !self.expand_for(remaining.total()) {
                    break;
                }
            }
        }

        let overflow = remaining.total();
        let applied = requested - overflow;
        if applied > FLUID_EPSILON {
            self.events.emit(OrganEvent::FluidAdded {
                organ: Organ::Cavity,
                kind,
                amount: applied,
            });
        }
        if overflow > FLUID_EPSILON {
            warn!("{:.2} ml of {} could not be placed", overflow, kind);
            self.events.emit(OrganEvent::Overflow {
                organ: Organ::Cavity,
                amount: overflow,
            });
        }
        self.refresh_state();
        FluidTransfer::new(applied, overflow)
    }

    /// Take out up to `amount` ml, proportionally across fluid kinds.
    /// `overflow` reports the shortfall.
    pub fn remove_fluid(&mut self, amount: f32) -> FluidTransfer {
        if !amount.is_finite() || amount <= 0.0 {
            return FluidTransfer::default();
        }
        let removed = self.fluid_buffer.remove(amount);
        if removed > FLUID_EPSILON {
            self.events.emit(OrganEvent::FluidRemoved {
                organ: Organ::Cavity,
                amount: removed,
            });
        }
        self.refresh_state();
        FluidTransfer::new(removed, (amount - removed).max(0.0))
    }

    /// Move up to `amount` from the cavity into the ducts, split evenly.
    /// Each duct forwards its own excess on to its gland; whatever neither
    /// can hold comes back. Returns the volume each side accepted.
    pub(super) fn distribute_to_ducts(&mut self, amount: f32) -> [f32; 2] {
        let mut accepted = [0.0; 2];
        if amount <= FLUID_EPSILON {
            return accepted;
        }
        let mut outgoing = self.fluid_buffer.split_off(amount);
        let half = outgoing.total() / 2.0;

        for side in Side::BOTH {
            let share = match side {
                Side::Left => outgoing.split_off(half),
                Side::Right => outgoing.drain(),
            };
            let offered = share.total();
            let (duct, gland) = self.pair_mut(side);
            let rejected = duct.add_mixture(share, Some(gland));
            accepted[side.index()] = offered - rejected.total();
            self.fluid_buffer.merge(rejected);
        }
        trace!(
            "routed {:.3} ml left, {:.3} ml right",
            accepted[0],
            accepted[1]
        );
        accepted
    }

    /// Deform just enough to hold `remaining` more. Returns false when
    /// neither inflation nor the wall can give any more room.
    fn expand_for(&mut self, remaining: f32) -> bool {
        let current = self.total_stretch();
        if current >= TOTAL_DEFORMATION_CEILING {
            return false;
        }
        let needed = self.filled() + self.objects_volume() + remaining;
        let target = (needed / self.base_capacity)
            .cbrt()
            .max(current + DEFORMATION_EPSILON)
            .min(TOTAL_DEFORMATION_CEILING);

        if self.auto_inflate && self.inflation_ratio < AUTO_INFLATION_LIMIT {
            let wanted = (target / self.wall.stretch_ratio()).min(AUTO_INFLATION_LIMIT);
            if wanted > self.inflation_ratio {
                self.set_inflation(wanted);
                return true;
            }
        }

        let wall_limit = (self.wall.elasticity * WALL_STRETCH_FACTOR).min(self.wall.max_allowed());
        let wanted = (target / self.inflation_ratio).min(wall_limit);
        if wanted <= self.wall.stretch_ratio() {
            return false;
        }
        match self.wall.try_stretch(wanted) {
            Ok(()) => {
                self.events.emit(OrganEvent::Stretched {
                    organ: Organ::Cavity,
                    ratio: wanted,
                });
                true
            }
            Err(failure) => {
                warn!("cavity wall: {}", failure);
                self.events.emit(OrganEvent::StretchFailed {
                    organ: Organ::Cavity,
                    attempted: failure.attempted,
                });
                false
            }
        }
    }
}
