//! Descent, prolapse, complete eversion and inversion.
//!
//! Descent accumulates from strain in proportion to the prolapse risk and
//! passes through `Descended` and `Prolapsed` before the cavity turns fully
//! inside out. Eversion is sticky: reducing it takes a large corrective
//! amount and only ever brings the cavity back to `Prolapsed`.

use fluid_rules::FLUID_EPSILON;
use log::info;

use super::{Cavity, CavityState};
use crate::constants::prolapse::*;
use crate::events::OrganEvent;

impl Cavity {
    /// Weighted sum of everything pulling the cavity down.
    pub fn calculate_prolapse_risk(&self) -> f32 {
        let ligament = (1.0 - self.ligament_integrity).max(0.0) * LIGAMENT_WEIGHT;
        let pelvic_floor = (1.0 - self.pelvic_floor_strength).max(0.0) * PELVIC_FLOOR_WEIGHT;
        let excess_stretch =
            (self.wall.stretch_ratio() - EXCESS_STRETCH_BASE).max(0.0) * EXCESS_STRETCH_WEIGHT;
        let fill = self.fill_ratio() * FILL_WEIGHT;
        let fatigue = self.wall.fatigue() * FATIGUE_WEIGHT;
        let glands: f32 = self.glands.iter().map(|g| g.weight(&self.fluids)).sum::<f32>()
            * GLAND_WEIGHT_PER_ML;
        ligament + pelvic_floor + excess_stretch + fill + fatigue + glands
    }

    /// Bear down with `force`. Moves the cavity only if `force * risk`
    /// clears the strain threshold.
    pub fn apply_strain(&mut self, force: f32) -> bool {
        if !force.is_finite() || force <= 0.0 {
            return false;
        }
        let strain = force * self.calculate_prolapse_risk();
        if strain <= STRAIN_THRESHOLD {
            return false;
        }
        self.progress_prolapse(strain)
    }

    /// Reduce descent by `amount`. Returns false when nothing moved.
    pub fn reduce_prolapse(&mut self, amount: f32) -> bool {
        if !amount.is_finite() || amount <= 0.0 {
            return false;
        }
        match self.state {
            CavityState::Everted => {
                if amount < EVERSION_REDUCTION_FORCE {
                    return false;
                }
                self.descent_position = POST_EVERSION_DESCENT;
                self.sphincter.restore();
                let pressure = self.pressure();
                self.set_state(CavityState::Prolapsed, pressure);
            }
            CavityState::Inverted => {
                if amount < INVERSION_CORRECTION_FORCE {
                    return false;
                }
                let pressure = self.pressure();
                let state = self.fluid_state(pressure);
                self.set_state(state, pressure);
            }
            CavityState::Prolapsed | CavityState::Descended => {
                self.descent_position = (self.descent_position - amount).max(0.0);
                self.reclassify_descent();
            }
            _ => return false,
        }

        self.events.emit(OrganEvent::ProlapseReduced {
            descent: self.descent_position,
            state: self.state,
        });
        true
    }

    /// Turn the cavity in on itself. Only a settled cavity can invert, and
    /// only under a strong push on an already weak support.
    pub fn invert(&mut self, force: f32) -> bool {
        if self.state != CavityState::Normal || !force.is_finite() || force < INVERSION_MIN_FORCE {
            return false;
        }
        if force * self.calculate_prolapse_risk() <= INVERSION_THRESHOLD {
            return false;
        }

        let pressure = self.pressure();
        self.set_state(CavityState::Inverted, pressure);
        info!("cavity inverted under force {:.2}", force);
        self.events.emit(OrganEvent::Inverted { force });
        true
    }

    /// Advance descent by a damped share of `amount`, dragging the ducts with
    /// it. Crossing the eversion threshold everts the cavity.
    pub(super) fn progress_prolapse(&mut self, amount: f32) -> bool {
        if matches!(self.state, CavityState::Everted | CavityState::Inverted) || amount <= 0.0 {
            return false;
        }
        let damping = 1.0 - self.muscle_tone * MUSCLE_TONE_DAMPING;
        let step = amount * DESCENT_RATE * damping;
        if step <= FLUID_EPSILON {
            return false;
        }
        self.descent_position = (self.descent_position + step).min(1.0);
        self.events.emit(OrganEvent::Prolapse {
            descent: self.descent_position,
        });

        let descent = self.descent_position;
        for duct in &mut self.ducts {
            let target = (1.0 + descent * DUCT_DESCENT_STRETCH).min(duct.max_stretch_ratio);
            if target > duct.current_stretch() {
                duct.stretch(target);
            }
            if descent >= PROLAPSED {
                duct.set_prolapsed(true);
            }
        }

        if descent >= EVERTED {
            self.complete_eversion();
        } else {
            self.reclassify_descent();
        }
        true
    }

    /// Turn fully inside out: all fluid and every object is expelled, the
    /// wall is forced to a high stretch and fatigue, the ducts are dragged
    /// out. Happens at most once until reduced.
    fn complete_eversion(&mut self) {
        if self.state == CavityState::Everted {
            return;
        }
        let ejected_fluid = self.fluid_buffer.drain().total();
        let objects: Vec<_> = self.inserted_objects.drain(..).collect();
        let ejected_objects = objects.len();
        for mut object in objects {
            object.set_inserted(false, 0.0);
            self.events.emit(OrganEvent::ObjectEjected { id: object.id() });
            self.ejected_objects.push(object);
        }
        self.sphincter.held_open = false;

        self.wall.force_deform(EVERSION_WALL_STRETCH, EVERSION_WALL_FATIGUE);
        self.sphincter.evert();
        for duct in &mut self.ducts {
            duct.set_prolapsed(true);
        }
        self.descent_position = 1.0;

        let pressure = self.pressure();
        self.set_state(CavityState::Everted, pressure);
        info!(
            "complete eversion: {:.1} ml and {} objects expelled",
            ejected_fluid, ejected_objects
        );
        self.events.emit(OrganEvent::CompleteEversion {
            ejected_fluid,
            ejected_objects,
        });
    }

    /// Re-derive the state from descent. Fully reduced descent hands control
    /// back to pressure and lets the ducts go.
    fn reclassify_descent(&mut self) {
        let pressure = self.pressure();
        let state = if self.descent_position >= PROLAPSED {
            CavityState::Prolapsed
        } else if self.descent_position >= DESCENDED {
            CavityState::Descended
        } else {
            for duct in &mut self.ducts {
                duct.set_prolapsed(false);
            }
            self.fluid_state(pressure)
        };
        self.set_state(state, pressure);
    }
}
