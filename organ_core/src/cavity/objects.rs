//! Objects held in the cavity.

use fluid_rules::{Insertable, ObjectId};
use log::debug;

use super::{Cavity, CavityState};
use crate::constants::cavity::CAVITY_DEPTH;
use crate::events::OrganEvent;
use crate::outcome::{InsertOutcome, RejectReason};

impl Cavity {
    /// Place an object. The sphincter dilates to let it through and is held
    /// open while anything is inside. A rejected object is handed back.
    pub fn insert_object(&mut self, mut object: Box<dyn Insertable>) -> InsertOutcome {
        if matches!(self.state, CavityState::Everted | CavityState::Inverted) {
            return InsertOutcome::Rejected {
                object,
                reason: RejectReason::Displaced,
            };
        }
        if object.volume() > self.available_volume() {
            return InsertOutcome::Rejected {
                object,
                reason: RejectReason::NoRoom,
            };
        }
        if !self.sphincter.accommodate(object.diameter()) {
            return InsertOutcome::Rejected {
                object,
                reason: RejectReason::TooWide,
            };
        }

        object.set_inserted(true, CAVITY_DEPTH);
        debug!("{} placed at depth {}", object.id(), CAVITY_DEPTH);
        self.sphincter.held_open = true;
        self.events.emit(OrganEvent::ObjectInserted {
            id: object.id(),
            depth: CAVITY_DEPTH,
        });
        self.inserted_objects.push(object);
        InsertOutcome::Inserted
    }

    /// Take an object back out. The sphincter is released once the cavity
    /// holds nothing.
    pub fn remove_object(&mut self, id: ObjectId) -> Option<Box<dyn Insertable>> {
        let index = self.inserted_objects.iter().position(|o| o.id() == id)?;
        let mut object = self.inserted_objects.remove(index);
        object.set_inserted(false, 0.0);
        debug!("{} taken out", id);
        if self.inserted_objects.is_empty() {
            self.sphincter.held_open = false;
        }
        self.events.emit(OrganEvent::ObjectRemoved { id });
        Some(object)
    }

    pub fn inserted_objects(&self) -> &[Box<dyn Insertable>] {
        &self.inserted_objects
    }

    /// Hand over everything expelled by eversion since the last call.
    pub fn take_ejected_objects(&mut self) -> Vec<Box<dyn Insertable>> {
        std::mem::take(&mut self.ejected_objects)
    }
}
