//! The central cavity and everything it owns.
//!
//! A [`Cavity`] owns its sphincter, its wall, both ducts and both glands.
//! Ducts and glands refer to each other only by [`Side`], so every
//! cross-organ operation goes through the cavity, which hands out the two
//! halves of a pair as disjoint borrows.

mod inflation;
mod intake;
mod objects;
mod pairs;
mod prolapse;
mod tick;

pub use inflation::*;

use fluid_rules::{FluidKind, FluidMixture, FluidRegistry, Insertable, FLUID_EPSILON};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::anatomy::Side;
use crate::config::OrganConfig;
use crate::constants::pressure::*;
use crate::duct::Duct;
use crate::error::OrganResult;
use crate::events::{EventBus, OrganEvent};
use crate::gland::Gland;
use crate::sphincter::Sphincter;
use crate::wall::DeformableWall;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CavityState {
    Empty,
    Normal,
    Tense,
    Overpressured,
    Leaking,
    Descended,
    Prolapsed,
    Everted,
    Inverted,
}

impl CavityState {
    /// Positional states override the pressure-driven ones until reduced.
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            CavityState::Descended
                | CavityState::Prolapsed
                | CavityState::Everted
                | CavityState::Inverted
        )
    }
}

pub struct Cavity {
    /// Undeformed capacity in ml.
    pub base_capacity: f32,
    pub ligament_integrity: f32,
    pub pelvic_floor_strength: f32,
    pub muscle_tone: f32,
    pub peristalsis_strength: f32,
    /// Share of every intake routed on toward the ducts.
    pub tube_fill_ratio: f32,
    /// Share of peristaltic flow passed from the ducts on to the glands.
    pub ovary_fill_ratio: f32,
    /// Let intake inflate the cavity before stretching the wall.
    pub auto_inflate: bool,
    sphincter: Sphincter,
    wall: DeformableWall,
    ducts: [Duct; 2],
    glands: [Gland; 2],
    fluid_buffer: FluidMixture,
    fluids: FluidRegistry,
    inflation_ratio: f32,
    descent_position: f32,
    state: CavityState,
    inflation_status: InflationStatus,
    inserted_objects: Vec<Box<dyn Insertable>>,
    ejected_objects: Vec<Box<dyn Insertable>>,
    events: EventBus,
}

impl std::fmt::Debug for Cavity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cavity")
            .field("state", &self.state)
            .field("inflation_status", &self.inflation_status)
            .field("filled", &self.filled())
            .field("capacity", &self.capacity())
            .field("inflation_ratio", &self.inflation_ratio)
            .field("descent_position", &self.descent_position)
            .field("inserted_objects", &self.inserted_objects.len())
            .finish_non_exhaustive()
    }
}

impl Default for Cavity {
    fn default() -> Self {
        Self::new()
    }
}

impl Cavity {
    /// A cavity with default anatomy and the built-in fluid table.
    pub fn new() -> Self {
        Self::build(&OrganConfig::default(), FluidRegistry::new())
    }

    /// A cavity built from `config`. Fails only on bad fluid overrides.
    pub fn with_config(config: &OrganConfig) -> OrganResult<Self> {
        let fluids = config.fluid_registry()?;
        Ok(Self::build(config, fluids))
    }

    fn build(config: &OrganConfig, fluids: FluidRegistry) -> Self {
        let mut ducts = Side::BOTH.map(|side| Duct::new(side, &config.duct));
        let mut glands = Side::BOTH.map(|side| Gland::new(side, &config.gland));
        for side in Side::BOTH {
            ducts[side.index()].link_gland(side);
            glands[side.index()].link_duct(side);
        }

        let cavity = &config.cavity;
        Self {
            base_capacity: cavity.base_capacity.max(FLUID_EPSILON),
            ligament_integrity: cavity.ligament_integrity.clamp(0.0, 1.0),
            pelvic_floor_strength: cavity.pelvic_floor_strength.clamp(0.0, 1.0),
            muscle_tone: cavity.muscle_tone.clamp(0.0, 1.0),
            peristalsis_strength: cavity.peristalsis_strength.max(0.0),
            tube_fill_ratio: cavity.tube_fill_ratio.clamp(0.0, 1.0),
            ovary_fill_ratio: cavity.ovary_fill_ratio.clamp(0.0, 1.0),
            auto_inflate: cavity.auto_inflate,
            sphincter: Sphincter::from_config(&config.sphincter),
            wall: DeformableWall::from_config(&config.wall),
            ducts,
            glands,
            fluid_buffer: FluidMixture::new(),
            fluids,
            inflation_ratio: 1.0,
            descent_position: 0.0,
            state: CavityState::Empty,
            inflation_status: InflationStatus::Normal,
            inserted_objects: Vec::new(),
            ejected_objects: Vec::new(),
            events: EventBus::new(),
        }
    }

    pub fn state(&self) -> CavityState {
        self.state
    }

    pub fn inflation_status(&self) -> InflationStatus {
        self.inflation_status
    }

    pub fn inflation_ratio(&self) -> f32 {
        self.inflation_ratio
    }

    pub fn descent_position(&self) -> f32 {
        self.descent_position
    }

    pub fn sphincter(&self) -> &Sphincter {
        &self.sphincter
    }

    pub fn sphincter_mut(&mut self) -> &mut Sphincter {
        &mut self.sphincter
    }

    pub fn wall(&self) -> &DeformableWall {
        &self.wall
    }

    pub fn duct(&self, side: Side) -> &Duct {
        &self.ducts[side.index()]
    }

    pub fn gland(&self, side: Side) -> &Gland {
        &self.glands[side.index()]
    }

    /// The gland on `side`, for direct manipulation and listener registration.
    pub fn gland_mut(&mut self, side: Side) -> &mut Gland {
        &mut self.glands[side.index()]
    }

    /// The duct on `side`, for direct manipulation and listener registration.
    pub fn duct_mut(&mut self, side: Side) -> &mut Duct {
        &mut self.ducts[side.index()]
    }

    pub fn fluids(&self) -> &FluidRegistry {
        &self.fluids
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    /// Combined deformation of the cavity, `inflation * wall stretch`.
    pub fn total_stretch(&self) -> f32 {
        self.inflation_ratio * self.wall.stretch_ratio()
    }

    /// Capacity in ml. Both deformation axes scale every dimension, so
    /// capacity grows with the cube of the total stretch.
    pub fn capacity(&self) -> f32 {
        self.capacity_at(self.total_stretch())
    }

    pub fn filled(&self) -> f32 {
        self.fluid_buffer.total()
    }

    pub fn amount_of(&self, kind: FluidKind) -> f32 {
        self.fluid_buffer.amount_of(kind)
    }

    /// Volume taken up by inserted objects.
    pub fn objects_volume(&self) -> f32 {
        self.inserted_objects.iter().map(|o| o.volume().max(0.0)).sum()
    }

    pub fn available_volume(&self) -> f32 {
        (self.capacity() - self.filled() - self.objects_volume()).max(0.0)
    }

    pub fn fill_ratio(&self) -> f32 {
        let capacity = self.capacity();
        if capacity <= 0.0 {
            0.0
        } else {
            self.filled() / capacity
        }
    }

    /// Fluid held by the cavity, both ducts and both glands.
    pub fn network_fluid_total(&self) -> f32 {
        self.filled()
            + self.ducts.iter().map(Duct::filled).sum::<f32>()
            + self.glands.iter().map(Gland::filled).sum::<f32>()
    }

    pub fn viscosity(&self) -> f32 {
        self.fluid_buffer.viscosity(&self.fluids)
    }

    /// Internal pressure from fill, fluid thickness, wall stiffness and
    /// stretch. Inflation relieves it.
    pub fn pressure(&self) -> f32 {
        let base = self.fill_ratio() * FILL_FACTOR;
        let viscous = base * (1.0 + VISCOSITY_WEIGHT * self.viscosity());
        let stiff = viscous / self.wall.elasticity.max(FLUID_EPSILON);
        let relieved = stiff / self.inflation_ratio.sqrt();
        relieved + (self.wall.stretch_ratio() - 1.0) * STRETCH_PENALTY
    }

    /// Outflow through the sphincter per unit of time at `pressure`.
    pub fn leak_rate(&self, pressure: f32) -> f32 {
        if pressure <= LEAK_FLOOR {
            return 0.0;
        }
        let radius = self.sphincter.effective_gape() / 2.0;
        let area = std::f32::consts::PI * radius * radius;
        let flow = area * (pressure - LEAK_FLOOR) * FLOW_EFFICIENCY / self.viscosity();
        flow * LEAK_FACTOR * (1.0 + (1.0 - self.muscle_tone))
    }

    fn capacity_at(&self, total_stretch: f32) -> f32 {
        self.base_capacity * total_stretch.powi(3)
    }

    /// Pressure-driven state, ignoring position.
    fn fluid_state(&self, pressure: f32) -> CavityState {
        if self.filled() <= FLUID_EPSILON {
            CavityState::Empty
        } else if pressure >= OVERPRESSURED {
            CavityState::Overpressured
        } else if self.sphincter.is_open() && pressure > LEAK_FLOOR {
            CavityState::Leaking
        } else if pressure >= TENSE {
            CavityState::Tense
        } else {
            CavityState::Normal
        }
    }

    fn determine_state(&self, pressure: f32) -> CavityState {
        if self.state.is_structural() {
            self.state
        } else {
            self.fluid_state(pressure)
        }
    }

    /// Re-derive the pressure state after fluid moved outside a tick.
    fn refresh_state(&mut self) {
        let pressure = self.pressure();
        let state = self.determine_state(pressure);
        self.set_state(state, pressure);
    }

    fn set_state(&mut self, state: CavityState, pressure: f32) {
        if state == self.state {
            return;
        }
        let from = self.state;
        self.state = state;
        debug!("cavity {:?} -> {:?} at pressure {:.2}", from, state, pressure);
        self.events.emit(OrganEvent::CavityStateChanged { from, to: state });

        if from == CavityState::Leaking {
            self.events.emit(OrganEvent::LeakStopped);
        }
        if state == CavityState::Leaking {
            let rate = self.leak_rate(pressure);
            self.events.emit(OrganEvent::LeakStarted { rate });
        }
    }

    /// Borrow the duct and gland of one side together.
    fn pair_mut(&mut self, side: Side) -> (&mut Duct, &mut Gland) {
        let index = side.index();
        (&mut self.ducts[index], &mut self.glands[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use fluid_rules::Probe;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_new_cavity_is_wired() {
        let cavity = Cavity::new();
        assert_eq!(cavity.state(), CavityState::Empty);
        assert_eq!(cavity.capacity(), 80.0);
        for side in Side::BOTH {
            assert_eq!(cavity.duct(side).linked_gland(), Some(side));
            assert_eq!(cavity.gland(side).linked_duct(), Some(side));
        }
    }

    #[test]
    fn test_with_config() {
        let config = OrganConfig::from_toml_str(
            r#"
            [cavity]
            base_capacity = 50.0
            auto_inflate = false

            [fluids.water]
            viscosity = 2.0
            density = 1.0
            "#,
        )
        .unwrap();
        let cavity = Cavity::with_config(&config).unwrap();

        assert_eq!(cavity.capacity(), 50.0);
        assert!(!cavity.auto_inflate);
        assert_eq!(cavity.fluids().viscosity(FluidKind::Water), 2.0);
    }

    #[test]
    fn test_intake_splits_toward_ducts() {
        let mut cavity = Cavity::new();
        let transfer = cavity.add_fluid(FluidKind::Water, 40.0);

        assert!(transfer.is_complete());
        assert!((cavity.filled() - 28.0).abs() < 1e-3);
        let routed: f32 = Side::BOTH
            .iter()
            .map(|&side| cavity.duct(side).filled() + cavity.gland(side).filled())
            .sum();
        assert!((routed - 12.0).abs() < 1e-3);
        for side in Side::BOTH {
            let share = cavity.duct(side).filled() + cavity.gland(side).filled();
            assert!((share - 6.0).abs() < 1e-3);
        }
        assert!((cavity.network_fluid_total() - 40.0).abs() < 1e-3);
    }

    #[test]
    fn test_pressure_formula() {
        let mut cavity = Cavity::new();
        cavity.add_fluid(FluidKind::Water, 40.0);

        // fill 28/80, water viscosity 1, elasticity 0.8, no deformation
        let expected = 28.0 / 80.0 * 2.0 * 1.5 / 0.8;
        assert!((cavity.pressure() - expected).abs() < 1e-3);
        assert_eq!(cavity.state(), CavityState::Normal);
    }

    #[test]
    fn test_thick_fluid_raises_pressure() {
        let mut water = Cavity::new();
        let mut honey = Cavity::new();
        water.add_fluid(FluidKind::Water, 40.0);
        honey.add_fluid(FluidKind::Honey, 40.0);
        assert!(honey.pressure() > water.pressure());
    }

    #[test]
    fn test_leak_rate_needs_open_gate() {
        let mut cavity = Cavity::new();
        cavity.add_fluid(FluidKind::Water, 40.0);
        let pressure = cavity.pressure();
        assert!(pressure > LEAK_FLOOR);
        assert_eq!(cavity.leak_rate(pressure), 0.0);

        cavity.sphincter_mut().dilate(2.0);
        assert!(cavity.leak_rate(pressure) > 0.0);
        assert_eq!(cavity.leak_rate(LEAK_FLOOR), 0.0);
    }

    #[test]
    fn test_conservation_across_operations() {
        let mut cavity = Cavity::new();
        cavity.peristalsis_strength = 1.0;
        cavity.add_fluid(FluidKind::Water, 60.0);
        cavity.add_fluid(FluidKind::Mucus, 20.0);
        let mut expected = cavity.network_fluid_total();
        assert!((expected - 80.0).abs() < 1e-2);

        for _ in 0..50 {
            let report = cavity.tick(1.0).unwrap();
            expected -= report.leaked;
        }
        assert!((cavity.network_fluid_total() - expected).abs() < 1e-2);

        let removed = cavity.remove_fluid(10.0);
        expected -= removed.applied;
        assert!((cavity.network_fluid_total() - expected).abs() < 1e-2);
    }

    #[test]
    fn test_available_volume_never_negative() {
        let mut cavity = Cavity::new();
        cavity.add_fluid(FluidKind::Water, 500.0);
        assert!(cavity.available_volume() >= 0.0);
        for _ in 0..100 {
            cavity.tick(1.0).unwrap();
            assert!(cavity.available_volume() >= 0.0);
            for side in Side::BOTH {
                assert!(cavity.duct(side).available_volume() >= 0.0);
                assert!(cavity.gland(side).available_volume() >= 0.0);
            }
        }
    }

    #[test]
    fn test_leaking_state_events() {
        let mut cavity = Cavity::new();
        let kinds = Rc::new(RefCell::new(Vec::new()));
        let sink = kinds.clone();
        cavity
            .events_mut()
            .on_any(move |event| sink.borrow_mut().push(event.kind()));

        cavity.add_fluid(FluidKind::Water, 40.0);
        cavity.sphincter_mut().dilate(3.0);
        cavity.tick(0.1).unwrap();
        assert_eq!(cavity.state(), CavityState::Leaking);
        assert!(kinds.borrow().contains(&EventKind::LeakStart));
        assert!(kinds.borrow().contains(&EventKind::Leak));

        cavity.remove_fluid(1000.0);
        assert_eq!(cavity.state(), CavityState::Empty);
        assert!(kinds.borrow().contains(&EventKind::LeakStop));
    }

    #[test]
    fn test_debug_does_not_expose_objects() {
        let mut cavity = Cavity::new();
        cavity.insert_object(Box::new(Probe::new("probe", 5.0, 0.1)));
        let text = format!("{:?}", cavity);
        assert!(text.contains("inserted_objects: 1"));
    }
}
