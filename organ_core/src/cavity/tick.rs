//! The per-interval update.

use fluid_rules::FLUID_EPSILON;
use log::{trace, warn};

use super::{Cavity, CavityState};
use crate::anatomy::{Organ, Side};
use crate::constants::cavity::PERISTALSIS_RATE;
use crate::constants::prolapse::{SPONTANEOUS_FORCE, SPONTANEOUS_RISK};
use crate::constants::sphincter::YIELD_PRESSURE;
use crate::error::{OrganError, OrganResult};
use crate::events::OrganEvent;
use crate::outcome::TickReport;

impl Cavity {
    /// Advance the whole organ network by `dt`.
    ///
    /// Order matters: recovery, backflow, peristalsis, pressure, sphincter
    /// response, state, leak, inflation status, gland aging, sphincter
    /// contraction, and finally the spontaneous prolapse check.
    pub fn tick(&mut self, dt: f32) -> OrganResult<TickReport> {
        if !dt.is_finite() || dt <= 0.0 {
            warn!("tick rejected dt {}", dt);
            return Err(OrganError::InvalidArgument {
                name: "dt",
                value: dt,
            });
        }

        self.recover(dt);
        let backflow = self.aggregate_backflow(dt);
        let peristalsis = self.apply_peristalsis(dt);

        let pressure = self.pressure();
        self.sphincter.respond_to_pressure(pressure, dt);
        let state = self.determine_state(pressure);
        self.set_state(state, pressure);
        let leaked = self.apply_leak(pressure, dt);

        self.refresh_inflation_status(dt);
        for gland in &mut self.glands {
            gland.age(dt);
        }
        if !self.sphincter.held_open && pressure <= YIELD_PRESSURE {
            self.sphincter.contract();
        }

        if self.state == CavityState::Normal {
            let risk = self.calculate_prolapse_risk();
            if risk > SPONTANEOUS_RISK {
                self.progress_prolapse(risk * SPONTANEOUS_FORCE * dt);
            }
        }

        Ok(TickReport {
            pressure: self.pressure(),
            leaked,
            backflow,
            peristalsis,
            state: self.state,
            inflation_status: self.inflation_status,
        })
    }

    fn recover(&mut self, dt: f32) {
        if self.state != CavityState::Everted {
            let held_open = self.wall_stretch_for_contents();
            self.wall.recover_above(dt, held_open);
        }
        for duct in &mut self.ducts {
            duct.recover(dt);
        }
        for gland in &mut self.glands {
            gland.recover(dt);
        }
    }

    /// Wall stretch at which capacity just fits the current fluid and objects.
    fn wall_stretch_for_contents(&self) -> f32 {
        let needed = self.filled() + self.objects_volume();
        if needed <= FLUID_EPSILON || self.base_capacity <= 0.0 {
            return 1.0;
        }
        (needed / self.base_capacity).cbrt() / self.inflation_ratio
    }

    /// Glands leak into their ducts, then full ducts spill into the cavity.
    /// An everted cavity has no lumen, so the spill stays in the ducts.
    /// Returns the volume that reached the cavity.
    fn aggregate_backflow(&mut self, dt: f32) -> f32 {
        let mut returned = 0.0;
        for side in Side::BOTH {
            let index = side.index();
            let duct = &mut self.ducts[index];
            let gland = &mut self.glands[index];
            let viscosity = gland.viscosity(&self.fluids);
            let rate = gland.calculate_leak_rate(gland.calculate_pressure(viscosity), duct.pressure());
            if rate > 0.0 {
                gland.leak_to_duct(duct, viscosity, Some(rate * dt));
            }

            let room = if self.state == CavityState::Everted {
                0.0
            } else {
                self.available_volume()
            };
            let spill = self.ducts[index].cascade_to_cavity(room);
            let amount = spill.total();
            if amount > FLUID_EPSILON {
                self.fluid_buffer.merge(spill);
                self.events.emit(OrganEvent::Backflow {
                    from: Organ::Duct(side),
                    to: Organ::Cavity,
                    amount,
                });
                returned += amount;
            }
        }
        returned
    }

    /// Push a share of the cavity's fluid into the ducts and part of that on
    /// to the glands, regardless of pressure. Returns the volume that left
    /// the cavity.
    fn apply_peristalsis(&mut self, dt: f32) -> f32 {
        if self.state == CavityState::Everted {
            return 0.0;
        }
        let amount = self.filled() * self.peristalsis_strength * PERISTALSIS_RATE * dt;
        let accepted = self.distribute_to_ducts(amount);

        let onward = self.ovary_fill_ratio;
        for side in Side::BOTH {
            let share = accepted[side.index()] * onward;
            if share > FLUID_EPSILON {
                let (duct, gland) = self.pair_mut(side);
                duct.transfer_to_gland(share, gland);
            }
        }
        let total = accepted[0] + accepted[1];
        trace!("peristalsis moved {:.4} ml", total);
        total
    }

    /// Let fluid out through the sphincter. Never more than the cavity holds.
    fn apply_leak(&mut self, pressure: f32, dt: f32) -> f32 {
        if !self.sphincter.is_open() {
            return 0.0;
        }
        let amount = (self.leak_rate(pressure) * dt).min(self.filled());
        if amount <= FLUID_EPSILON {
            return 0.0;
        }
        let leaked = self.fluid_buffer.remove(amount);
        trace!("leaked {:.4} ml at pressure {:.2}", leaked, pressure);
        self.events.emit(OrganEvent::Leak { amount: leaked });
        leaked
    }
}
