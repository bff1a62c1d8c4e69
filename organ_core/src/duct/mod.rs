//! Slender duct between the cavity and one gland.
//!
//! A duct can be stretched (length) and inflated (diameter) independently.
//! It buffers a little fluid of its own, passes the excess on to its gland,
//! and takes backflow from the gland when the gland is under pressure.
//!
//! The duct never owns its gland. Operations that involve both take the
//! gland as an argument and check it is the one this duct is linked to.

use fluid_rules::{FluidKind, FluidMixture, FLUID_EPSILON};
use serde::{Deserialize, Serialize};

use crate::anatomy::{Organ, Side};
use crate::config::DuctConfig;
use crate::constants::duct::*;
use crate::events::{EventBus, OrganEvent};
use crate::gland::Gland;
use crate::outcome::FluidTransfer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuctState {
    Normal,
    Dilated,
    /// A stretch beyond the limit shut the lumen; no fluid enters until it recovers.
    Blocked,
    /// Dragged down with a descending cavity.
    Prolapsed,
    /// Turned out together with its gland.
    EvertedWithOvary,
}

#[derive(Debug)]
pub struct Duct {
    pub side: Side,
    /// Length in cm at rest.
    pub base_length: f32,
    /// Lumen diameter in cm at rest.
    pub base_diameter: f32,
    /// Capacity in ml at rest.
    pub base_capacity: f32,
    pub max_stretch_ratio: f32,
    pub max_inflation_ratio: f32,
    /// Share of gland backflow the duct refuses.
    pub backflow_resistance: f32,
    /// Gland-side opening in cm at rest.
    pub base_ovarian_opening: f32,
    current_stretch: f32,
    inflation_ratio: f32,
    fluid_buffer: FluidMixture,
    state: DuctState,
    linked_gland: Option<Side>,
    events: EventBus,
}

impl Duct {
    /// Create an unlinked duct at rest.
    pub fn new(side: Side, config: &DuctConfig) -> Self {
        Self {
            side,
            base_length: config.base_length.max(0.0),
            base_diameter: config.base_diameter.max(0.0),
            base_capacity: config.base_capacity.max(0.0),
            max_stretch_ratio: config.max_stretch_ratio.max(1.0),
            max_inflation_ratio: config.max_inflation_ratio.max(1.0),
            backflow_resistance: config.backflow_resistance.clamp(0.0, 1.0),
            base_ovarian_opening: config.ovarian_opening.max(0.0),
            current_stretch: 1.0,
            inflation_ratio: 1.0,
            fluid_buffer: FluidMixture::new(),
            state: DuctState::Normal,
            linked_gland: None,
            events: EventBus::new(),
        }
    }

    pub fn state(&self) -> DuctState {
        self.state
    }

    pub fn current_stretch(&self) -> f32 {
        self.current_stretch
    }

    pub fn inflation_ratio(&self) -> f32 {
        self.inflation_ratio
    }

    pub fn linked_gland(&self) -> Option<Side> {
        self.linked_gland
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn current_length(&self) -> f32 {
        self.base_length * self.current_stretch
    }

    pub fn current_diameter(&self) -> f32 {
        self.base_diameter * self.inflation_ratio
    }

    /// The gland-side opening widens as the duct is stretched.
    pub fn ovarian_opening(&self) -> f32 {
        self.base_ovarian_opening * self.current_stretch
    }

    pub fn max_capacity(&self) -> f32 {
        self.base_capacity * self.inflation_ratio.powi(2)
    }

    pub fn filled(&self) -> f32 {
        self.fluid_buffer.total()
    }

    pub fn amount_of(&self, kind: FluidKind) -> f32 {
        self.fluid_buffer.amount_of(kind)
    }

    pub fn available_volume(&self) -> f32 {
        (self.max_capacity() - self.filled()).max(0.0)
    }

    pub fn fill_ratio(&self) -> f32 {
        let capacity = self.max_capacity();
        if capacity <= 0.0 {
            0.0
        } else {
            self.filled() / capacity
        }
    }

    pub fn pressure(&self) -> f32 {
        self.fill_ratio() * PRESSURE_SCALE / self.inflation_ratio.sqrt()
    }

    pub fn is_linked_to(&self, gland: &Gland) -> bool {
        self.linked_gland == Some(gland.side)
    }

    pub(crate) fn link_gland(&mut self, side: Side) {
        self.linked_gland = Some(side);
    }

    /// Lengthen to `ratio` times rest length. Beyond the limit the duct
    /// blocks and nothing else changes.
    pub fn stretch(&mut self, ratio: f32) -> bool {
        if !ratio.is_finite() || ratio > self.max_stretch_ratio {
            self.events.emit(OrganEvent::StretchFailed {
                organ: Organ::Duct(self.side),
                attempted: ratio,
            });
            if matches!(self.state, DuctState::Normal | DuctState::Dilated) {
                self.set_state(DuctState::Blocked);
            }
            return false;
        }

        self.current_stretch = ratio.max(1.0);
        self.events.emit(OrganEvent::Stretched {
            organ: Organ::Duct(self.side),
            ratio: self.current_stretch,
        });
        self.refresh_state();
        true
    }

    /// Widen to `ratio` times rest diameter, independent of stretch.
    pub fn inflate(&mut self, ratio: f32) -> bool {
        let fits = ratio.is_finite()
            && (1.0..=self.max_inflation_ratio).contains(&ratio)
            && self.base_capacity * ratio.powi(2) >= self.filled();
        if !fits {
            self.events.emit(OrganEvent::InflateFailed {
                organ: Organ::Duct(self.side),
                attempted: ratio,
            });
            return false;
        }

        self.inflation_ratio = ratio;
        self.events.emit(OrganEvent::Inflated {
            organ: Organ::Duct(self.side),
            ratio,
        });
        true
    }

    /// Add fluid, passing anything above the forwarding threshold on to the
    /// linked gland.
    pub fn add_fluid(&mut self, kind: FluidKind, amount: f32, gland: Option<&mut Gland>) -> FluidTransfer {
        let incoming = FluidMixture::of(kind, amount);
        let requested = incoming.total();
        let rejected = self.add_mixture(incoming, gland).total();
        let applied = requested - rejected;

        if applied > FLUID_EPSILON {
            self.events.emit(OrganEvent::FluidAdded {
                organ: Organ::Duct(self.side),
                kind,
                amount: applied,
            });
        }
        if rejected > FLUID_EPSILON {
            self.events.emit(OrganEvent::Overflow {
                organ: Organ::Duct(self.side),
                amount: rejected,
            });
        }
        FluidTransfer::new(applied, rejected)
    }

    /// Place a mixture and return whatever neither the duct nor its gland
    /// could hold.
    pub fn add_mixture(&mut self, mut incoming: FluidMixture, gland: Option<&mut Gland>) -> FluidMixture {
        if self.state == DuctState::Blocked {
            return incoming;
        }
        let linked = self.linked_gland;
        let mut gland = gland.filter(|g| linked == Some(g.side));

        if let Some(g) = gland.as_deref_mut() {
            self.forward_excess(g);
        }

        let below_threshold =
            (self.max_capacity() * FORWARD_THRESHOLD - self.filled()).max(0.0);
        let first = incoming.split_off(below_threshold);
        self.fluid_buffer.merge(first);

        if let Some(g) = gland {
            if !incoming.is_empty() {
                incoming = g.add_mixture(incoming);
            }
        }

        let rest = incoming.split_off(self.available_volume());
        self.fluid_buffer.merge(rest);
        incoming
    }

    /// Push up to `amount` of the buffer into the gland. Returns the volume moved.
    pub fn transfer_to_gland(&mut self, amount: f32, gland: &mut Gland) -> f32 {
        if !self.is_linked_to(gland) {
            return 0.0;
        }
        let outgoing = self.fluid_buffer.split_off(amount);
        let offered = outgoing.total();
        let returned = gland.add_mixture(outgoing);
        let moved = offered - returned.total();
        self.fluid_buffer.merge(returned);
        moved
    }

    /// Take fluid pushed back from the gland. Only `1 - backflow_resistance`
    /// of it is admitted, bounded by free space; the rest is handed back.
    pub fn receive_backflow(&mut self, mut incoming: FluidMixture) -> FluidMixture {
        if self.state == DuctState::Blocked {
            return incoming;
        }
        let admitted =
            (incoming.total() * (1.0 - self.backflow_resistance)).min(self.available_volume());
        let accepted = incoming.split_off(admitted);
        let amount = accepted.total();
        self.fluid_buffer.merge(accepted);

        if amount > FLUID_EPSILON {
            self.events.emit(OrganEvent::Backflow {
                from: Organ::Gland(self.linked_gland.unwrap_or(self.side)),
                to: Organ::Duct(self.side),
                amount,
            });
        }
        incoming
    }

    /// Release fluid above the cascade threshold toward the cavity, bounded
    /// by the room the cavity has.
    pub fn cascade_to_cavity(&mut self, room: f32) -> FluidMixture {
        let excess = self.filled() - self.max_capacity() * CASCADE_THRESHOLD;
        let amount = excess.min(room);
        if amount <= FLUID_EPSILON {
            return FluidMixture::new();
        }
        let outgoing = self.fluid_buffer.split_off(amount);
        self.events.emit(OrganEvent::Backflow {
            from: Organ::Duct(self.side),
            to: Organ::Cavity,
            amount: outgoing.total(),
        });
        outgoing
    }

    /// A loose, over-stretched duct with a small gland can let the gland through.
    pub fn can_prolapse_gland(&self, gland: &Gland) -> bool {
        self.is_linked_to(gland)
            && self.current_stretch > GLAND_PROLAPSE_STRETCH
            && gland.calculate_volume() < self.ovarian_opening() * GLAND_PASSAGE_FACTOR
    }

    /// Turn the duct out together with its gland.
    pub fn evert_with_gland(&mut self, gland: &mut Gland) -> bool {
        if self.state == DuctState::EvertedWithOvary || !self.can_prolapse_gland(gland) {
            return false;
        }
        gland.evert(1.0);
        self.set_state(DuctState::EvertedWithOvary);
        true
    }

    /// Undo [`evert_with_gland`](Self::evert_with_gland). Fails if the gland
    /// refuses to move back.
    pub fn reposition(&mut self, gland: &mut Gland, amount: f32) -> bool {
        if self.state != DuctState::EvertedWithOvary || !self.is_linked_to(gland) {
            return false;
        }
        if !gland.reposition(amount) {
            return false;
        }
        let state = self.deformation_state();
        self.set_state(state);
        true
    }

    /// Relax stretch toward rest. A prolapsed or everted duct is held in place.
    pub fn recover(&mut self, dt: f32) {
        if matches!(self.state, DuctState::Prolapsed | DuctState::EvertedWithOvary) {
            return;
        }
        let decay = (-RECOVERY_RATE * dt).exp();
        self.current_stretch = 1.0 + (self.current_stretch - 1.0) * decay;
        self.refresh_state();
    }

    pub(crate) fn set_prolapsed(&mut self, prolapsed: bool) {
        match (prolapsed, self.state) {
            (true, DuctState::EvertedWithOvary) | (true, DuctState::Prolapsed) => {}
            (true, _) => self.set_state(DuctState::Prolapsed),
            (false, DuctState::Prolapsed) => {
                let state = self.deformation_state();
                self.set_state(state);
            }
            (false, _) => {}
        }
    }

    fn forward_excess(&mut self, gland: &mut Gland) -> f32 {
        let excess = self.filled() - self.max_capacity() * FORWARD_THRESHOLD;
        if excess <= FLUID_EPSILON {
            return 0.0;
        }
        self.transfer_to_gland(excess, gland)
    }

    fn deformation_state(&self) -> DuctState {
        if self.current_stretch > DILATED_STRETCH {
            DuctState::Dilated
        } else {
            DuctState::Normal
        }
    }

    fn refresh_state(&mut self) {
        if matches!(
            self.state,
            DuctState::Normal | DuctState::Dilated | DuctState::Blocked
        ) {
            let state = self.deformation_state();
            self.set_state(state);
        }
    }

    fn set_state(&mut self, state: DuctState) {
        if state != self.state {
            let from = self.state;
            self.state = state;
            self.events.emit(OrganEvent::DuctStateChanged {
                side: self.side,
                from,
                to: state,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GlandConfig;

    fn linked_pair() -> (Duct, Gland) {
        let mut duct = Duct::new(Side::Left, &DuctConfig::default());
        let mut gland = Gland::new(Side::Left, &GlandConfig::default());
        duct.link_gland(Side::Left);
        gland.link_duct(Side::Left);
        (duct, gland)
    }

    #[test]
    fn test_stretch_and_dilate() {
        let (mut duct, _) = linked_pair();
        assert!(duct.stretch(1.4));
        assert_eq!(duct.state(), DuctState::Normal);
        assert!(duct.stretch(1.8));
        assert_eq!(duct.state(), DuctState::Dilated);
        assert!((duct.current_length() - 18.0).abs() < 1e-4);
    }

    #[test]
    fn test_overstretch_blocks_without_changing_numbers() {
        let (mut duct, _) = linked_pair();
        duct.stretch(2.0);

        assert!(!duct.stretch(3.5));

        assert_eq!(duct.state(), DuctState::Blocked);
        assert_eq!(duct.current_stretch(), 2.0);
        let rejected = duct.add_mixture(FluidMixture::of(FluidKind::Water, 1.0), None);
        assert!((rejected.total() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_blocked_duct_clears_on_recovery() {
        let (mut duct, _) = linked_pair();
        duct.stretch(3.5);
        duct.recover(1.0);
        assert_eq!(duct.state(), DuctState::Normal);
    }

    #[test]
    fn test_inflate_scales_capacity_quadratically() {
        let (mut duct, _) = linked_pair();
        assert!(duct.inflate(2.0));
        assert!((duct.max_capacity() - 8.0).abs() < 1e-5);
        assert!((duct.current_diameter() - 1.0).abs() < 1e-5);
        // Stretch is untouched
        assert_eq!(duct.current_stretch(), 1.0);

        assert!(!duct.inflate(6.0));
        assert!(!duct.inflate(0.5));
        assert_eq!(duct.inflation_ratio(), 2.0);
    }

    #[test]
    fn test_inflate_refuses_to_squeeze_contents() {
        let (mut duct, _) = linked_pair();
        duct.inflate(2.0);
        duct.add_fluid(FluidKind::Water, 6.0, None);
        assert!(!duct.inflate(1.0));
    }

    #[test]
    fn test_add_fluid_without_gland_is_bounded() {
        let (mut duct, _) = linked_pair();
        let transfer = duct.add_fluid(FluidKind::Water, 5.0, None);
        assert!((transfer.applied - 2.0).abs() < 1e-5);
        assert!((transfer.overflow - 3.0).abs() < 1e-5);
        assert!((duct.filled() - 2.0).abs() < 1e-5);
        assert_eq!(duct.available_volume(), 0.0);
    }

    #[test]
    fn test_add_fluid_forwards_excess_to_gland() {
        let (mut duct, mut gland) = linked_pair();
        let transfer = duct.add_fluid(FluidKind::Water, 6.0, Some(&mut gland));

        assert!(transfer.is_complete());
        assert!((duct.filled() - 1.5).abs() < 1e-4);
        assert!((gland.filled() - 4.5).abs() < 1e-4);
    }

    #[test]
    fn test_unlinked_gland_is_ignored() {
        let mut duct = Duct::new(Side::Left, &DuctConfig::default());
        duct.link_gland(Side::Left);
        let mut other = Gland::new(Side::Right, &GlandConfig::default());

        let transfer = duct.add_fluid(FluidKind::Water, 3.0, Some(&mut other));

        assert_eq!(other.filled(), 0.0);
        assert!((transfer.overflow - 1.0).abs() < 1e-5);
        assert_eq!(duct.transfer_to_gland(1.0, &mut other), 0.0);
    }

    #[test]
    fn test_receive_backflow_applies_resistance() {
        let (mut duct, _) = linked_pair();
        let rejected = duct.receive_backflow(FluidMixture::of(FluidKind::Blood, 1.0));

        // 30% resisted
        assert!((duct.filled() - 0.7).abs() < 1e-5);
        assert!((rejected.total() - 0.3).abs() < 1e-5);
        assert!((duct.amount_of(FluidKind::Blood) - 0.7).abs() < 1e-5);
    }

    #[test]
    fn test_receive_backflow_bounded_by_room() {
        let (mut duct, _) = linked_pair();
        duct.add_fluid(FluidKind::Water, 1.8, None);
        let rejected = duct.receive_backflow(FluidMixture::of(FluidKind::Water, 2.0));
        assert!((duct.filled() - 2.0).abs() < 1e-5);
        assert!((rejected.total() - 1.8).abs() < 1e-5);
    }

    #[test]
    fn test_cascade_to_cavity() {
        let (mut duct, _) = linked_pair();
        duct.add_fluid(FluidKind::Water, 2.0, None);

        let none = duct.cascade_to_cavity(0.0);
        assert!(none.is_empty());

        let out = duct.cascade_to_cavity(10.0);
        assert!((out.total() - 0.2).abs() < 1e-4);
        assert!((duct.fill_ratio() - CASCADE_THRESHOLD).abs() < 1e-4);
    }

    #[test]
    fn test_can_prolapse_gland() {
        let (mut duct, gland) = linked_pair();
        duct.stretch(2.6);
        assert!(gland.calculate_volume() < duct.ovarian_opening() * GLAND_PASSAGE_FACTOR);
        assert!(duct.can_prolapse_gland(&gland));

        duct.stretch(1.8);
        assert!(!duct.can_prolapse_gland(&gland));
    }

    #[test]
    fn test_large_gland_cannot_prolapse() {
        let (mut duct, mut gland) = linked_pair();
        duct.stretch(2.6);
        gland.inflate(4.0);
        // Volume grows with inflation^2: ~50ml against a 26 limit
        assert!(!duct.can_prolapse_gland(&gland));
    }

    #[test]
    fn test_evert_and_reposition_with_gland() {
        let (mut duct, mut gland) = linked_pair();
        assert!(!duct.evert_with_gland(&mut gland));

        duct.stretch(2.8);
        assert!(duct.evert_with_gland(&mut gland));
        assert_eq!(duct.state(), DuctState::EvertedWithOvary);
        assert_eq!(gland.state(), crate::gland::GlandState::Everted);

        assert!(!duct.reposition(&mut gland, 0.4));
        assert_eq!(duct.state(), DuctState::EvertedWithOvary);

        assert!(duct.reposition(&mut gland, 0.8));
        assert_eq!(duct.state(), DuctState::Dilated);
        assert_eq!(gland.state(), crate::gland::GlandState::Normal);
    }

    #[test]
    fn test_prolapsed_duct_holds_stretch() {
        let (mut duct, _) = linked_pair();
        duct.stretch(2.0);
        duct.set_prolapsed(true);
        duct.recover(10.0);
        assert_eq!(duct.current_stretch(), 2.0);
        assert_eq!(duct.state(), DuctState::Prolapsed);

        duct.set_prolapsed(false);
        assert_eq!(duct.state(), DuctState::Dilated);
    }
}
