//! Plain result structs returned by organ operations.

use fluid_rules::Insertable;
use serde::{Deserialize, Serialize};

use crate::cavity::{CavityState, InflationStatus};

/// How much of a requested fluid movement happened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FluidTransfer {
    /// Volume actually placed or removed, in ml.
    pub applied: f32,
    /// Volume that could not be placed or was not there to remove, in ml.
    pub overflow: f32,
}

impl FluidTransfer {
    pub fn new(applied: f32, overflow: f32) -> Self {
        Self { applied, overflow }
    }

    pub fn is_complete(&self) -> bool {
        self.overflow <= fluid_rules::FLUID_EPSILON
    }
}

/// Result of trying to place an object in the cavity.
#[derive(Debug)]
pub enum InsertOutcome {
    Inserted,
    /// The object is handed back untouched.
    Rejected {
        object: Box<dyn Insertable>,
        reason: RejectReason,
    },
}

impl InsertOutcome {
    pub fn is_inserted(&self) -> bool {
        matches!(self, InsertOutcome::Inserted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// Wider than the outlet can dilate.
    TooWide,
    /// Not enough free volume.
    NoRoom,
    /// The cavity is everted or inverted.
    Displaced,
}

/// Summary of one [`Cavity::tick`](crate::Cavity::tick).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub pressure: f32,
    pub leaked: f32,
    /// Fluid returned to the cavity from the ducts.
    pub backflow: f32,
    /// Fluid pushed from the cavity into the ducts.
    pub peristalsis: f32,
    pub state: CavityState,
    pub inflation_status: InflationStatus,
}
