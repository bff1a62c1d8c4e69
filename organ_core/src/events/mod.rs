//! Organ events and the observer bus that delivers them.
//!
//! Every organ owns an [`EventBus`]. Events are delivered synchronously, in
//! emission order, at the moment the change happens, so a listener always
//! sees the organ mid-operation rather than after the fact.

mod bus;

pub use bus::*;

use fluid_rules::{FluidKind, ObjectId};
use serde::{Deserialize, Serialize};

use crate::anatomy::{Organ, Side};
use crate::cavity::{CavityState, InflationStatus};
use crate::duct::DuctState;
use crate::gland::GlandState;
use crate::sphincter::SphincterState;

/// Something that happened to an organ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OrganEvent {
    CavityStateChanged {
        from: CavityState,
        to: CavityState,
    },
    SphincterStateChanged {
        from: SphincterState,
        to: SphincterState,
    },
    DuctStateChanged {
        side: Side,
        from: DuctState,
        to: DuctState,
    },
    GlandStateChanged {
        side: Side,
        from: GlandState,
        to: GlandState,
    },

    FluidAdded {
        organ: Organ,
        kind: FluidKind,
        amount: f32,
    },
    FluidRemoved {
        organ: Organ,
        amount: f32,
    },
    /// Fluid that could not be placed anywhere.
    Overflow {
        organ: Organ,
        amount: f32,
    },
    Backflow {
        from: Organ,
        to: Organ,
        amount: f32,
    },
    LeakStarted {
        rate: f32,
    },
    Leak {
        amount: f32,
    },
    LeakStopped,

    Inflated {
        organ: Organ,
        ratio: f32,
    },
    InflateFailed {
        organ: Organ,
        attempted: f32,
    },
    Stretched {
        organ: Organ,
        ratio: f32,
    },
    StretchFailed {
        organ: Organ,
        attempted: f32,
    },
    InflationStatusChanged {
        from: InflationStatus,
        to: InflationStatus,
    },
    Ruptured {
        total_stretch: f32,
    },

    Prolapse {
        descent: f32,
    },
    CompleteEversion {
        ejected_fluid: f32,
        ejected_objects: usize,
    },
    Inverted {
        force: f32,
    },
    ProlapseReduced {
        descent: f32,
        state: CavityState,
    },

    OvaryEverted {
        side: Side,
        degree: f32,
    },
    EvertFailed {
        side: Side,
    },
    OvaryRepositioned {
        side: Side,
        degree: f32,
    },
    RepositionFailed {
        side: Side,
        amount: f32,
    },
    Torsion {
        side: Side,
        blood_supply: f32,
    },
    Ovulated {
        side: Side,
        follicle_size: f32,
    },

    ObjectInserted {
        id: ObjectId,
        depth: f32,
    },
    ObjectRemoved {
        id: ObjectId,
    },
    ObjectEjected {
        id: ObjectId,
    },
}

/// Event categories listeners can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    StateChange,
    FluidAdded,
    FluidRemoved,
    Overflow,
    Backflow,
    LeakStart,
    Leak,
    LeakStop,
    Inflated,
    InflateFailed,
    Stretched,
    StretchFailed,
    InflationStatus,
    Ruptured,
    Prolapse,
    CompleteEversion,
    Inverted,
    ProlapseReduced,
    OvaryEverted,
    EvertFailed,
    OvaryRepositioned,
    RepositionFailed,
    Torsion,
    Ovulated,
    ObjectInserted,
    ObjectRemoved,
    ObjectEjected,
}

impl OrganEvent {
    /// The category this event is delivered under.
    pub fn kind(&self) -> EventKind {
        match self {
            OrganEvent::CavityStateChanged { .. }
            | OrganEvent::SphincterStateChanged { .. }
            | OrganEvent::DuctStateChanged { .. }
            | OrganEvent::GlandStateChanged { .. } => EventKind::StateChange,
            OrganEvent::FluidAdded { .. } => EventKind::FluidAdded,
            OrganEvent::FluidRemoved { .. } => EventKind::FluidRemoved,
            OrganEvent::Overflow { .. } => EventKind::Overflow,
            OrganEvent::Backflow { .. } => EventKind::Backflow,
            OrganEvent::LeakStarted { .. } => EventKind::LeakStart,
            OrganEvent::Leak { .. } => EventKind::Leak,
            OrganEvent::LeakStopped => EventKind::LeakStop,
            OrganEvent::Inflated { .. } => EventKind::Inflated,
            OrganEvent::InflateFailed { .. } => EventKind::InflateFailed,
            OrganEvent::Stretched { .. } => EventKind::Stretched,
            OrganEvent::StretchFailed { .. } => EventKind::StretchFailed,
            OrganEvent::InflationStatusChanged { .. } => EventKind::InflationStatus,
            OrganEvent::Ruptured { .. } => EventKind::Ruptured,
            OrganEvent::Prolapse { .. } => EventKind::Prolapse,
            OrganEvent::CompleteEversion { .. } => EventKind::CompleteEversion,
            OrganEvent::Inverted { .. } => EventKind::Inverted,
            OrganEvent::ProlapseReduced { .. } => EventKind::ProlapseReduced,
            OrganEvent::OvaryEverted { .. } => EventKind::OvaryEverted,
            OrganEvent::EvertFailed { .. } => EventKind::EvertFailed,
            OrganEvent::OvaryRepositioned { .. } => EventKind::OvaryRepositioned,
            OrganEvent::RepositionFailed { .. } => EventKind::RepositionFailed,
            OrganEvent::Torsion { .. } => EventKind::Torsion,
            OrganEvent::Ovulated { .. } => EventKind::Ovulated,
            OrganEvent::ObjectInserted { .. } => EventKind::ObjectInserted,
            OrganEvent::ObjectRemoved { .. } => EventKind::ObjectRemoved,
            OrganEvent::ObjectEjected { .. } => EventKind::ObjectEjected,
        }
    }

    /// Structural failures worth surfacing above debug level.
    pub fn is_structural(&self) -> bool {
        matches!(
            self.kind(),
            EventKind::CompleteEversion
                | EventKind::Ruptured
                | EventKind::Inverted
                | EventKind::OvaryEverted
                | EventKind::Torsion
        )
    }
}
