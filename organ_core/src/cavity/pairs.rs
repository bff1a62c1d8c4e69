//! Manipulation of the duct and gland pairs through the cavity.

use log::info;

use super::Cavity;
use crate::anatomy::Side;
use crate::events::OrganEvent;

impl Cavity {
    pub fn stretch_tube(&mut self, side: Side, ratio: f32) -> bool {
        self.ducts[side.index()].stretch(ratio)
    }

    pub fn inflate_tube(&mut self, side: Side, ratio: f32) -> bool {
        self.ducts[side.index()].inflate(ratio)
    }

    pub fn stretch_ovary(&mut self, side: Side, ratio: f32) -> bool {
        self.glands[side.index()].stretch(ratio)
    }

    pub fn inflate_ovary(&mut self, side: Side, ratio: f32) -> bool {
        self.glands[side.index()].inflate(ratio)
    }

    /// Push the gland on `side` out through its duct. Only a loose duct with
    /// a small enough gland lets it through.
    pub fn evert_ovary(&mut self, side: Side) -> bool {
        let (duct, gland) = self.pair_mut(side);
        if !duct.evert_with_gland(gland) {
            self.events.emit(OrganEvent::EvertFailed { side });
            return false;
        }

        let degree = self.glands[side.index()].prolapse_degree();
        info!("{:?} gland everted through its duct", side);
        self.events.emit(OrganEvent::OvaryEverted { side, degree });
        true
    }

    /// Work an everted gland back in by `amount`.
    pub fn reposition_ovary(&mut self, side: Side, amount: f32) -> bool {
        let (duct, gland) = self.pair_mut(side);
        if !duct.reposition(gland, amount) {
            self.events.emit(OrganEvent::RepositionFailed { side, amount });
            return false;
        }

        let degree = self.glands[side.index()].prolapse_degree();
        self.events.emit(OrganEvent::OvaryRepositioned { side, degree });
        true
    }

    /// Rupture the largest mature follicle on `side`.
    pub fn ovulate(&mut self, side: Side) -> Option<f32> {
        let size = self.glands[side.index()].ovulate()?;
        self.events.emit(OrganEvent::Ovulated {
            side,
            follicle_size: size,
        });
        Some(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OrganConfig;
    use crate::duct::DuctState;
    use crate::events::EventKind;
    use crate::gland::GlandState;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn record(cavity: &mut Cavity) -> Rc<RefCell<Vec<EventKind>>> {
        let kinds = Rc::new(RefCell::new(Vec::new()));
        let sink = kinds.clone();
        cavity
            .events_mut()
            .on_any(move |event| sink.borrow_mut().push(event.kind()));
        kinds
    }

    #[test]
    fn test_tight_duct_keeps_gland() {
        let mut cavity = Cavity::new();
        let kinds = record(&mut cavity);

        assert!(cavity.stretch_tube(Side::Left, 1.8));
        assert!(!cavity.duct(Side::Left).can_prolapse_gland(cavity.gland(Side::Left)));
        assert!(!cavity.evert_ovary(Side::Left));
        assert_eq!(kinds.borrow().as_slice(), &[EventKind::EvertFailed]);
    }

    #[test]
    fn test_loose_duct_small_gland() {
        let mut cavity = Cavity::new();
        assert!(cavity.stretch_tube(Side::Right, 2.6));
        let gland_volume = cavity.gland(Side::Right).calculate_volume();
        assert!(gland_volume < cavity.duct(Side::Right).ovarian_opening() * 10.0);
        assert!(cavity.duct(Side::Right).can_prolapse_gland(cavity.gland(Side::Right)));

        let kinds = record(&mut cavity);
        assert!(cavity.evert_ovary(Side::Right));
        assert!(kinds.borrow().contains(&EventKind::OvaryEverted));
        assert_eq!(cavity.gland(Side::Right).state(), GlandState::Everted);
        assert_eq!(cavity.duct(Side::Right).state(), DuctState::EvertedWithOvary);
        // The other side is untouched
        assert_eq!(cavity.gland(Side::Left).state(), GlandState::Normal);
    }

    #[test]
    fn test_reposition_ovary_needs_force() {
        let mut cavity = Cavity::new();
        cavity.stretch_tube(Side::Left, 2.6);
        cavity.evert_ovary(Side::Left);

        assert!(!cavity.reposition_ovary(Side::Left, 0.5));
        assert_eq!(cavity.gland(Side::Left).state(), GlandState::Everted);

        assert!(cavity.reposition_ovary(Side::Left, 1.0));
        assert_eq!(cavity.gland(Side::Left).state(), GlandState::Normal);
        assert_eq!(cavity.duct(Side::Left).state(), DuctState::Dilated);
    }

    #[test]
    fn test_ovulate_through_cavity() {
        let mut config = OrganConfig::default();
        config.gland.follicle_sizes = vec![2.0, 0.5];
        let mut cavity = Cavity::with_config(&config).unwrap();
        let kinds = record(&mut cavity);

        assert_eq!(cavity.ovulate(Side::Left), Some(2.0));
        assert_eq!(cavity.ovulate(Side::Left), None);
        assert_eq!(cavity.ovulate(Side::Right), Some(2.0));
        assert_eq!(cavity.gland(Side::Left).ruptured_follicle_count(), 1);
        assert_eq!(kinds.borrow().len(), 2);
    }

    #[test]
    fn test_gland_deformation_through_cavity() {
        let mut cavity = Cavity::new();
        assert!(cavity.stretch_ovary(Side::Left, 2.0));
        assert!(cavity.inflate_ovary(Side::Left, 2.0));
        assert!(!cavity.inflate_ovary(Side::Left, 10.0));
        assert!(cavity.inflate_tube(Side::Right, 2.0));
        assert!((cavity.duct(Side::Right).max_capacity() - 8.0).abs() < 1e-4);
        assert_eq!(cavity.gland(Side::Left).state(), GlandState::Enlarged);
    }
}
