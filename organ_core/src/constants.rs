//! Tuning constants for the organ simulation.
//!
//! Every threshold, rate and band edge used by the organs lives here, grouped
//! by the organ or mechanism that reads it. Anatomical starting values
//! (dimensions, default coefficients) are in [`crate::config`] instead, since
//! those are expected to vary per body.

/// Elastic/plastic wall model.
pub mod wall {
    /// `max_allowed = BASE_STRETCH_LIMIT * elasticity * integrity`.
    pub const BASE_STRETCH_LIMIT: f32 = 5.0;
    /// Integrity lost on every rejected stretch attempt.
    pub const STRETCH_FAIL_PENALTY: f32 = 0.05;
    /// Fatigue gained per unit of stretch above 1.0.
    pub const FATIGUE_PER_STRETCH: f32 = 0.05;
    /// Fatigue lost per unit of time.
    pub const FATIGUE_DECAY_RATE: f32 = 0.01;
    /// Exponential relaxation rate of the elastic component, scaled by elasticity.
    pub const RECOVERY_RATE: f32 = 0.1;
    /// A stretch above `1 + PERMANENT_STRETCH_FACTOR * elasticity` leaves a permanent mark.
    pub const PERMANENT_STRETCH_FACTOR: f32 = 2.0;
}

/// Outlet gate.
pub mod sphincter {
    /// Smallest reported gape, even when closed.
    pub const MIN_GAPE: f32 = 0.1;
    /// Gapes at or below this do not pass fluid.
    pub const MIN_EFFECTIVE_GAPE: f32 = 0.2;
    /// Dilation (as a fraction of rest diameter) at which the gate counts as dilated.
    pub const DILATED_FRACTION: f32 = 0.1;
    /// Dilation (as a fraction of rest diameter) at which the gate counts as fully open.
    pub const FULLY_OPEN_FRACTION: f32 = 0.9;
    pub const CONTRACT_STEP: f32 = 0.1;
    /// Dilation below this snaps shut on contraction.
    pub const CLOSE_THRESHOLD: f32 = 0.05;
    pub const EVERTED_DIAMETER_FACTOR: f32 = 2.0;
    /// Cavity pressure above which the gate is forced open.
    pub const YIELD_PRESSURE: f32 = 3.0;
    /// Dilation per unit of excess pressure per unit of time.
    pub const PRESSURE_DILATION_RATE: f32 = 0.2;
}

/// Slender ducts between the cavity and the glands.
pub mod duct {
    /// Stretch above which a duct counts as dilated.
    pub const DILATED_STRETCH: f32 = 1.5;
    /// Stretch above which a small gland can slip through the duct opening.
    pub const GLAND_PROLAPSE_STRETCH: f32 = 2.5;
    /// A gland passes when its volume is below `opening * GLAND_PASSAGE_FACTOR`.
    pub const GLAND_PASSAGE_FACTOR: f32 = 10.0;
    /// Fill ratio above which the excess is forwarded to the gland.
    pub const FORWARD_THRESHOLD: f32 = 0.75;
    /// Fill ratio above which the excess cascades back to the cavity.
    pub const CASCADE_THRESHOLD: f32 = 0.9;
    pub const PRESSURE_SCALE: f32 = 1.0;
    /// Exponential relaxation rate of duct stretch.
    pub const RECOVERY_RATE: f32 = 0.05;
}

/// Paired secretory glands.
pub mod gland {
    pub const OVERSTRETCH_PENALTY: f32 = 0.05;
    /// Inflation beyond `FRAGILE_INFLATION_LIMIT` is refused below this integrity.
    pub const FRAGILE_INTEGRITY: f32 = 0.5;
    pub const FRAGILE_INFLATION_LIMIT: f32 = 2.5;
    pub const WIDTH_STRETCH_EXPONENT: f32 = 0.3;
    pub const THICKNESS_STRETCH_EXPONENT: f32 = 0.2;
    /// Per-axis growth under inflation, so volume grows with `inflation^2`.
    pub const INFLATION_AXIS_EXPONENT: f32 = 2.0 / 3.0;
    /// Stretch or inflation above this marks the gland enlarged.
    pub const ENLARGED_THRESHOLD: f32 = 1.5;

    pub const PRESSURE_FILL_FACTOR: f32 = 1.5;
    pub const PRESSURE_VISCOSITY_WEIGHT: f32 = 0.3;
    pub const PRESSURE_INFLATION_EXPONENT: f32 = 0.3;
    pub const PRESSURE_STRETCH_PENALTY: f32 = 0.2;
    /// Gland-over-duct pressure differential below which nothing leaks.
    pub const LEAK_DIFFERENTIAL: f32 = 0.5;
    pub const LEAK_COEFFICIENT: f32 = 0.5;

    pub const FOLLICLE_TRIGGER_FILL: f32 = 0.8;
    pub const AUTO_STRETCH_FILL: f32 = 0.9;
    pub const AUTO_STRETCH_STEP: f32 = 1.1;
    pub const FOLLICLE_PRESSURE_GROWTH: f32 = 0.05;
    pub const FOLLICLE_MATURATION_RATE: f32 = 0.01;
    pub const MAX_FOLLICLE_SIZE: f32 = 2.5;
    pub const OVULATION_SIZE: f32 = 1.8;
    pub const POST_OVULATION_SIZE: f32 = 0.1;
    pub const OVULATION_HORMONE_BOOST: f32 = 0.2;

    pub const PROLAPSED_DEGREE: f32 = 0.3;
    pub const EVERTED_DEGREE: f32 = 0.7;
    /// Minimum corrective amount that moves an everted gland back.
    pub const EVERTED_REPOSITION_FORCE: f32 = 0.7;

    pub const HORMONE_DECAY_RATE: f32 = 0.01;
    pub const BLOOD_SUPPLY_DECAY_RATE: f32 = 0.02;
    pub const BLOOD_SUPPLY_RECOVERY_RATE: f32 = 0.01;
    /// An everted gland whose blood supply drops below this twists.
    pub const TORSION_BLOOD_SUPPLY: f32 = 0.5;
    pub const INTEGRITY_RECOVERY_RATE: f32 = 0.001;
    pub const STRETCH_RECOVERY_RATE: f32 = 0.02;
}

/// Cavity intake, routing and deformation search.
pub mod cavity {
    /// Inflation the intake search may reach on its own.
    pub const AUTO_INFLATION_LIMIT: f32 = 4.0;
    /// Wall stretch the intake search may reach is `elasticity * WALL_STRETCH_FACTOR`.
    pub const WALL_STRETCH_FACTOR: f32 = 4.0;
    /// Hard ceiling for explicit inflation.
    pub const MAX_INFLATION_RATIO: f32 = 500.0;
    /// Hard ceiling for `inflation_ratio * wall.stretch_ratio`.
    pub const TOTAL_DEFORMATION_CEILING: f32 = 500.0;
    /// Integrity lost when an explicit inflation beyond the ceiling is attempted.
    pub const INFLATION_FAIL_PENALTY: f32 = 0.05;
    /// Smallest deformation step the intake search counts as progress.
    pub const DEFORMATION_EPSILON: f32 = 1e-4;
    pub const MAX_INTAKE_ROUNDS: usize = 16;
    /// Share of cavity fluid pushed into the ducts per unit of peristalsis per unit of time.
    pub const PERISTALSIS_RATE: f32 = 0.05;
    /// Depth reported to inserted objects, in cm.
    pub const CAVITY_DEPTH: f32 = 7.0;
}

/// Cavity pressure bands and outlet flow.
pub mod pressure {
    pub const FILL_FACTOR: f32 = 2.0;
    pub const VISCOSITY_WEIGHT: f32 = 0.5;
    pub const STRETCH_PENALTY: f32 = 0.3;
    pub const TENSE: f32 = 2.0;
    pub const OVERPRESSURED: f32 = 4.0;
    /// No outflow at or below this pressure.
    pub const LEAK_FLOOR: f32 = 1.0;
    pub const FLOW_EFFICIENCY: f32 = 5.0;
    pub const LEAK_FACTOR: f32 = 1.0;
}

/// Upper edges of the inflation-status bands, in units of total stretch.
pub mod ladder {
    pub const NORMAL: f32 = 1.3;
    pub const STRETCHED: f32 = 1.8;
    pub const DISTENDED: f32 = 2.4;
    pub const HYPERDISTENDED: f32 = 3.0;
    pub const RUPTURE_RISK: f32 = 5.0;
    pub const ULTRA: f32 = 10.0;
    pub const MEGA: f32 = 25.0;
    pub const GIGA: f32 = 50.0;
    pub const TERA: f32 = 100.0;
    pub const PETA: f32 = 200.0;
    pub const EXA: f32 = 350.0;
    pub const ZETTA: f32 = 500.0;

    /// Wall integrity drained per unit of time while in each band above rupture risk.
    pub const ULTRA_DRAIN: f32 = 0.001;
    pub const MEGA_DRAIN: f32 = 0.002;
    pub const GIGA_DRAIN: f32 = 0.004;
    pub const TERA_DRAIN: f32 = 0.008;
    pub const PETA_DRAIN: f32 = 0.016;
    pub const EXA_DRAIN: f32 = 0.03;
    pub const ZETTA_DRAIN: f32 = 0.05;
    pub const RUPTURED_DRAIN: f32 = 0.1;
}

/// Descent, prolapse, eversion and inversion.
pub mod prolapse {
    pub const LIGAMENT_WEIGHT: f32 = 0.3;
    pub const PELVIC_FLOOR_WEIGHT: f32 = 0.3;
    pub const EXCESS_STRETCH_BASE: f32 = 2.0;
    pub const EXCESS_STRETCH_WEIGHT: f32 = 0.2;
    pub const FILL_WEIGHT: f32 = 0.2;
    pub const FATIGUE_WEIGHT: f32 = 0.1;
    pub const GLAND_WEIGHT_PER_ML: f32 = 0.001;

    /// `force * risk` must exceed this for strain to move anything.
    pub const STRAIN_THRESHOLD: f32 = 0.5;
    pub const DESCENT_RATE: f32 = 0.1;
    /// Share of muscle tone that resists descent.
    pub const MUSCLE_TONE_DAMPING: f32 = 0.5;
    /// Descent below this counts as fully reduced.
    pub const DESCENDED: f32 = 0.05;
    pub const PROLAPSED: f32 = 0.3;
    pub const EVERTED: f32 = 0.7;
    /// Duct stretch gained per unit of descent.
    pub const DUCT_DESCENT_STRETCH: f32 = 2.0;

    pub const EVERSION_WALL_STRETCH: f32 = 3.0;
    pub const EVERSION_WALL_FATIGUE: f32 = 0.9;
    /// Minimum reduction that moves a fully everted cavity back.
    pub const EVERSION_REDUCTION_FORCE: f32 = 0.5;
    /// Descent left after reducing a full eversion.
    pub const POST_EVERSION_DESCENT: f32 = 0.5;

    pub const SPONTANEOUS_RISK: f32 = 0.8;
    pub const SPONTANEOUS_FORCE: f32 = 0.5;

    pub const INVERSION_MIN_FORCE: f32 = 1.0;
    pub const INVERSION_THRESHOLD: f32 = 0.8;
    pub const INVERSION_CORRECTION_FORCE: f32 = 0.3;
}
