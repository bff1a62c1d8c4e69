//! Dilating gate at the cavity outlet.
//!
//! The gate decides how much fluid can leave and how wide an object can pass.

use serde::{Deserialize, Serialize};

use crate::config::SphincterConfig;
use crate::constants::sphincter::*;
use crate::events::{EventBus, OrganEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SphincterState {
    Closed,
    Dilated,
    FullyOpen,
    /// Turned out with the cavity; dilation no longer changes the state.
    Everted,
}

#[derive(Debug)]
pub struct Sphincter {
    /// Structural diameter in cm.
    pub rest_diameter: f32,
    /// Widest possible dilation in cm.
    pub max_dilation: f32,
    /// Set while something is lodged in the opening; suppresses auto-contraction.
    pub held_open: bool,
    current_dilation: f32,
    state: SphincterState,
    events: EventBus,
}

impl Default for Sphincter {
    fn default() -> Self {
        Self::from_config(&SphincterConfig::default())
    }
}

impl Sphincter {
    /// Create a closed gate.
    pub fn new(rest_diameter: f32, max_dilation: f32) -> Self {
        Self {
            rest_diameter: rest_diameter.max(MIN_GAPE),
            max_dilation: max_dilation.max(MIN_GAPE),
            held_open: false,
            current_dilation: 0.0,
            state: SphincterState::Closed,
            events: EventBus::new(),
        }
    }

    pub fn from_config(config: &SphincterConfig) -> Self {
        Self::new(config.rest_diameter, config.max_dilation)
    }

    pub fn state(&self) -> SphincterState {
        self.state
    }

    pub fn current_dilation(&self) -> f32 {
        self.current_dilation
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    /// Opening width, clamped to `[MIN_GAPE, max_dilation]`.
    pub fn gape_diameter(&self) -> f32 {
        self.current_dilation.clamp(MIN_GAPE, self.max_dilation)
    }

    /// How far toward fully open the gate is, in `[0, 1]`.
    pub fn openness(&self) -> f32 {
        (self.current_dilation / (self.rest_diameter * FULLY_OPEN_FRACTION)).clamp(0.0, 1.0)
    }

    /// Width that actually passes fluid.
    pub fn effective_gape(&self) -> f32 {
        let gape = self.gape_diameter();
        if gape <= MIN_EFFECTIVE_GAPE {
            0.0
        } else {
            gape * self.openness()
        }
    }

    pub fn is_open(&self) -> bool {
        self.state != SphincterState::Closed
    }

    /// Widest object that passes without further dilation.
    pub fn effective_diameter(&self) -> f32 {
        match self.state {
            SphincterState::Everted => {
                (self.rest_diameter + self.current_dilation) * EVERTED_DIAMETER_FACTOR
            }
            _ => self.gape_diameter(),
        }
    }

    /// Open further by `amount` cm. Returns false if nothing changed.
    pub fn dilate(&mut self, amount: f32) -> bool {
        if !amount.is_finite() || amount <= 0.0 || self.current_dilation >= self.max_dilation {
            return false;
        }
        self.current_dilation = (self.current_dilation + amount).min(self.max_dilation);
        self.refresh_state();
        true
    }

    /// Close by one step, snapping shut near zero.
    pub fn contract(&mut self) {
        if self.state == SphincterState::Everted {
            return;
        }
        self.current_dilation = (self.current_dilation - CONTRACT_STEP).max(0.0);
        if self.current_dilation < CLOSE_THRESHOLD {
            self.current_dilation = 0.0;
        }
        self.refresh_state();
    }

    /// Dilate enough to pass an object of `diameter` cm. Returns false if the
    /// object is wider than the gate can ever open.
    pub fn accommodate(&mut self, diameter: f32) -> bool {
        if diameter <= self.effective_diameter() {
            return true;
        }
        if diameter > self.max_dilation {
            return false;
        }
        self.dilate(diameter - self.current_dilation)
    }

    /// Yield to cavity pressure above the yield point.
    pub fn respond_to_pressure(&mut self, pressure: f32, dt: f32) {
        if pressure > YIELD_PRESSURE {
            self.dilate((pressure - YIELD_PRESSURE) * PRESSURE_DILATION_RATE * dt);
        }
    }

    pub(crate) fn evert(&mut self) {
        self.set_state(SphincterState::Everted);
    }

    /// Leave the everted state, keeping current dilation.
    pub(crate) fn restore(&mut self) {
        if self.state == SphincterState::Everted {
            let state = self.classify();
            self.set_state(state);
        }
    }

    fn classify(&self) -> SphincterState {
        if self.current_dilation >= self.rest_diameter * FULLY_OPEN_FRACTION {
            SphincterState::FullyOpen
        } else if self.current_dilation >= self.rest_diameter * DILATED_FRACTION {
            SphincterState::Dilated
        } else {
            SphincterState::Closed
        }
    }

    fn refresh_state(&mut self) {
        if self.state != SphincterState::Everted {
            let state = self.classify();
            self.set_state(state);
        }
    }

    fn set_state(&mut self, state: SphincterState) {
        if state != self.state {
            let from = self.state;
            self.state = state;
            self.events
                .emit(OrganEvent::SphincterStateChanged { from, to: state });
        }
    }
}
