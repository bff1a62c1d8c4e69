//! Inflation-status ladder and explicit inflation.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::Cavity;
use crate::anatomy::Organ;
use crate::constants::cavity::{INFLATION_FAIL_PENALTY, MAX_INFLATION_RATIO, TOTAL_DEFORMATION_CEILING};
use crate::constants::ladder::*;
use crate::events::OrganEvent;

/// How far the cavity is blown up, by total stretch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InflationStatus {
    Normal,
    Stretched,
    Distended,
    Hyperdistended,
    RuptureRisk,
    UltraDistended,
    MegaDistended,
    GigaDistended,
    TeraDistended,
    PetaDistended,
    ExaDistended,
    ZettaDistended,
    Ruptured,
}

impl InflationStatus {
    pub const ALL: [InflationStatus; 13] = [
        InflationStatus::Normal,
        InflationStatus::Stretched,
        InflationStatus::Distended,
        InflationStatus::Hyperdistended,
        InflationStatus::RuptureRisk,
        InflationStatus::UltraDistended,
        InflationStatus::MegaDistended,
        InflationStatus::GigaDistended,
        InflationStatus::TeraDistended,
        InflationStatus::PetaDistended,
        InflationStatus::ExaDistended,
        InflationStatus::ZettaDistended,
        InflationStatus::Ruptured,
    ];

    /// Band for `inflation * wall stretch`.
    pub fn from_total_stretch(total_stretch: f32) -> Self {
        const EDGES: [(f32, InflationStatus); 12] = [
            (NORMAL, InflationStatus::Normal),
            (STRETCHED, InflationStatus::Stretched),
            (DISTENDED, InflationStatus::Distended),
            (HYPERDISTENDED, InflationStatus::Hyperdistended),
            (RUPTURE_RISK, InflationStatus::RuptureRisk),
            (ULTRA, InflationStatus::UltraDistended),
            (MEGA, InflationStatus::MegaDistended),
            (GIGA, InflationStatus::GigaDistended),
            (TERA, InflationStatus::TeraDistended),
            (PETA, InflationStatus::PetaDistended),
            (EXA, InflationStatus::ExaDistended),
            (ZETTA, InflationStatus::ZettaDistended),
        ];
        EDGES
            .iter()
            .find(|(edge, _)| total_stretch < *edge)
            .map(|(_, status)| *status)
            .unwrap_or(InflationStatus::Ruptured)
    }

    /// Wall integrity lost per unit of time while in this band.
    pub fn integrity_drain(self) -> f32 {
        match self {
            InflationStatus::UltraDistended => ULTRA_DRAIN,
            InflationStatus::MegaDistended => MEGA_DRAIN,
            InflationStatus::GigaDistended => GIGA_DRAIN,
            InflationStatus::TeraDistended => TERA_DRAIN,
            InflationStatus::PetaDistended => PETA_DRAIN,
            InflationStatus::ExaDistended => EXA_DRAIN,
            InflationStatus::ZettaDistended => ZETTA_DRAIN,
            InflationStatus::Ruptured => RUPTURED_DRAIN,
            _ => 0.0,
        }
    }

    /// Bands that leave a permanent mark on the wall.
    pub fn is_damaging(self) -> bool {
        self > InflationStatus::RuptureRisk
    }
}

impl Cavity {
    /// Inflate to `ratio` directly, bypassing the intake search.
    ///
    /// Going past the hard ceiling costs wall integrity. Deflating below
    /// what the current contents need is refused without penalty.
    pub fn inflate(&mut self, ratio: f32) -> bool {
        if !ratio.is_finite() || ratio < 1.0 {
            return false;
        }
        let total = ratio * self.wall.stretch_ratio();
        if ratio > MAX_INFLATION_RATIO || total > TOTAL_DEFORMATION_CEILING {
            self.wall.degrade(INFLATION_FAIL_PENALTY);
            warn!("inflation to {:.1} refused, total stretch {:.1} over ceiling", ratio, total);
            self.events.emit(OrganEvent::InflateFailed {
                organ: Organ::Cavity,
                attempted: ratio,
            });
            return false;
        }
        if self.capacity_at(total) < self.filled() + self.objects_volume() {
            self.events.emit(OrganEvent::InflateFailed {
                organ: Organ::Cavity,
                attempted: ratio,
            });
            return false;
        }

        self.set_inflation(ratio);
        self.refresh_inflation_status(0.0);
        self.refresh_state();
        true
    }

    pub(super) fn set_inflation(&mut self, ratio: f32) {
        self.inflation_ratio = ratio;
        self.events.emit(OrganEvent::Inflated {
            organ: Organ::Cavity,
            ratio,
        });
    }

    /// Move to the band for the current total stretch and apply its wear
    /// over `dt`.
    pub(super) fn refresh_inflation_status(&mut self, dt: f32) {
        let total_stretch = self.total_stretch();
        let status = InflationStatus::from_total_stretch(total_stretch);

        if status.is_damaging() {
            self.wall.degrade(status.integrity_drain() * dt);
            self.wall.mark_permanently_stretched();
        }
        if status == self.inflation_status {
            return;
        }

        let from = self.inflation_status;
        self.inflation_status = status;
        self.events.emit(OrganEvent::InflationStatusChanged { from, to: status });
        if status == InflationStatus::Ruptured {
            info!("cavity ruptured at total stretch {:.1}", total_stretch);
            self.events.emit(OrganEvent::Ruptured { total_stretch });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use fluid_rules::FluidKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_band_edges() {
        assert_eq!(InflationStatus::from_total_stretch(1.0), InflationStatus::Normal);
        assert_eq!(InflationStatus::from_total_stretch(1.3), InflationStatus::Stretched);
        assert_eq!(InflationStatus::from_total_stretch(2.9), InflationStatus::Hyperdistended);
        assert_eq!(InflationStatus::from_total_stretch(3.0), InflationStatus::RuptureRisk);
        assert_eq!(InflationStatus::from_total_stretch(7.0), InflationStatus::UltraDistended);
        assert_eq!(InflationStatus::from_total_stretch(499.0), InflationStatus::ZettaDistended);
        assert_eq!(InflationStatus::from_total_stretch(500.0), InflationStatus::Ruptured);
    }

    #[test]
    fn test_ladder_monotonic() {
        let mut previous = InflationStatus::Normal;
        let mut ratio = 1.0_f32;
        while ratio < 600.0 {
            let status = InflationStatus::from_total_stretch(ratio);
            assert!(status >= previous);
            previous = status;
            ratio *= 1.05;
        }
        assert_eq!(previous, InflationStatus::Ruptured);
    }

    #[test]
    fn test_every_band_reachable() {
        let probes = [
            1.0, 1.5, 2.0, 2.5, 4.0, 6.0, 12.0, 30.0, 60.0, 150.0, 250.0, 400.0, 600.0,
        ];
        for (probe, expected) in probes.iter().zip(InflationStatus::ALL) {
            assert_eq!(InflationStatus::from_total_stretch(*probe), expected);
        }
    }

    #[test]
    fn test_drain_only_above_rupture_risk() {
        for status in InflationStatus::ALL {
            assert_eq!(status.integrity_drain() > 0.0, status.is_damaging());
        }
    }

    #[test]
    fn test_explicit_inflate_moves_band() {
        let mut cavity = Cavity::new();
        assert!(cavity.inflate(2.0));
        assert_eq!(cavity.inflation_status(), InflationStatus::Distended);
        assert!(!cavity.wall().permanently_stretched());

        assert!(cavity.inflate(20.0));
        assert_eq!(cavity.inflation_status(), InflationStatus::MegaDistended);
        assert!(cavity.wall().permanently_stretched());

        // Deflating moves the band back but the mark stays
        assert!(cavity.inflate(1.0));
        assert_eq!(cavity.inflation_status(), InflationStatus::Normal);
        assert!(cavity.wall().permanently_stretched());
    }

    #[test]
    fn test_inflate_past_ceiling_costs_integrity() {
        let mut cavity = Cavity::new();
        assert!(!cavity.inflate(501.0));
        assert_eq!(cavity.inflation_ratio(), 1.0);
        assert!((cavity.wall().integrity() - 0.95).abs() < 1e-5);
        assert!(!cavity.inflate(0.5));
    }

    #[test]
    fn test_inflate_refuses_to_squeeze_contents() {
        let mut cavity = Cavity::new();
        cavity.add_fluid(FluidKind::Water, 200.0);
        let ratio = cavity.inflation_ratio();
        assert!(ratio > 1.0);

        assert!(!cavity.inflate(1.0));
        assert_eq!(cavity.inflation_ratio(), ratio);
        assert_eq!(cavity.wall().integrity(), 1.0);
    }

    #[test]
    fn test_rupture_event_and_drain() {
        let mut cavity = Cavity::new();
        let ruptures = Rc::new(RefCell::new(0));
        let sink = ruptures.clone();
        cavity.events_mut().on(EventKind::Ruptured, move |_| *sink.borrow_mut() += 1);

        assert!(cavity.inflate(500.0));
        assert_eq!(cavity.inflation_status(), InflationStatus::Ruptured);
        assert_eq!(*ruptures.borrow(), 1);

        let before = cavity.wall().integrity();
        cavity.tick(1.0).unwrap();
        assert!(cavity.wall().integrity() < before);
        assert_eq!(*ruptures.borrow(), 1);
    }
}
