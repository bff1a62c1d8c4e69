//! The insertable capability and a plain implementation of it.

use serde::{Deserialize, Serialize};

use super::ObjectId;

/// Anything that can occupy space inside a cavity.
///
/// Organs only read geometry through this trait and write back the
/// insertion flag. Every method except [`id`](Insertable::id) has a default,
/// so a type only overrides what it actually tracks.
pub trait Insertable: std::fmt::Debug {
    fn id(&self) -> ObjectId;

    /// Displaced volume in ml.
    fn volume(&self) -> f32 {
        0.0
    }

    /// Widest cross-section in cm.
    fn diameter(&self) -> f32 {
        0.0
    }

    fn is_inserted(&self) -> bool {
        false
    }

    /// Called by the holding organ on insertion (`true`, depth in cm) and on
    /// removal or ejection (`false`, 0.0).
    fn set_inserted(&mut self, _inserted: bool, _depth: f32) {}
}

/// A rigid object with fixed geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Probe {
    pub id: ObjectId,
    pub name: String,
    pub volume: f32,
    pub diameter: f32,
    pub is_inserted: bool,
    pub inserted_depth: f32,
}

impl Probe {
    /// Create a new probe with the given geometry.
    pub fn new(name: impl Into<String>, volume: f32, diameter: f32) -> Self {
        Self {
            id: ObjectId::new(),
            name: name.into(),
            volume: volume.max(0.0),
            diameter: diameter.max(0.0),
            is_inserted: false,
            inserted_depth: 0.0,
        }
    }
}

impl Insertable for Probe {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn diameter(&self) -> f32 {
        self.diameter
    }

    fn is_inserted(&self) -> bool {
        self.is_inserted
    }

    fn set_inserted(&mut self, inserted: bool, depth: f32) {
        self.is_inserted = inserted;
        self.inserted_depth = if inserted { depth } else { 0.0 };
    }
}
