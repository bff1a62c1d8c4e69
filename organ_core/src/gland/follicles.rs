//! Follicle growth and ovulation.

use super::*;

impl Gland {
    /// Rupture the largest mature follicle. Returns its size at rupture.
    pub fn ovulate(&mut self) -> Option<f32> {
        let size = self.mature_follicle()?;
        let index = self.follicle_sizes.iter().position(|s| *s == size)?;

        self.follicle_sizes[index] = POST_OVULATION_SIZE;
        self.ruptured_follicle_count += 1;
        self.hormone_level = (self.hormone_level + OVULATION_HORMONE_BOOST).min(1.0);
        self.events.emit(OrganEvent::Ovulated {
            side: self.side,
            follicle_size: size,
        });
        Some(size)
    }

    /// Largest follicle ready to rupture, if any.
    pub fn mature_follicle(&self) -> Option<f32> {
        self.follicle_sizes
            .iter()
            .copied()
            .filter(|size| *size >= OVULATION_SIZE)
            .max_by(f32::total_cmp)
    }

    /// Pressure from a nearly full buffer swells every follicle.
    pub(super) fn enlarge_follicles(&mut self) {
        let growth = 1.0 + FOLLICLE_PRESSURE_GROWTH * self.fill_ratio();
        for size in &mut self.follicle_sizes {
            *size = (*size * growth).min(MAX_FOLLICLE_SIZE);
        }
    }

    pub(super) fn mature_follicles(&mut self, dt: f32) {
        let step = FOLLICLE_MATURATION_RATE * self.hormone_level * dt;
        for size in &mut self.follicle_sizes {
            *size = (*size + step).min(MAX_FOLLICLE_SIZE);
        }
    }
}
