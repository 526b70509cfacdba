use bitflags::bitflags;
use crate::math::Vector2;

bitflags! {
    /// Toggles that change how the impulse solver behaves
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SolverFlags: u32 {
        /// Clamp accumulated impulses instead of per-iteration increments
        const ACCUMULATE_IMPULSES = 0x01;

        /// Carry accumulated impulses over to the next frame and re-apply them
        const WARM_STARTING = 0x02;

        /// Inject a Baumgarte bias velocity to push out penetration and joint drift
        const POSITION_CORRECTION = 0x04;

        /// Solve contact position bias on separate pseudo velocities
        const SPLIT_IMPULSES = 0x08;

        /// Treat every contact as frictionless
        const FRICTIONLESS = 0x10;
    }
}

impl Default for SolverFlags {
    fn default() -> Self {
        Self::ACCUMULATE_IMPULSES | Self::WARM_STARTING | Self::POSITION_CORRECTION
    }
}

/// Configuration parameters for the physics simulation
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Constant acceleration applied to every dynamic body
    pub gravity: Vector2,

    /// The number of solver iterations per step
    pub iterations: u32,

    /// Solver behavior toggles
    pub flags: SolverFlags,

    /// The bias factor for contact position correction (Baumgarte stabilization)
    pub contact_bias_factor: f32,

    /// Penetration depth tolerated before contact position correction kicks in
    pub allowed_penetration: f32,

    /// Largest separation at which two boxes still count as touching
    pub touching_tolerance: f32,
}

impl SimulationConfig {
    /// Creates a configuration with the given gravity and iteration count
    pub fn new(gravity: Vector2, iterations: u32) -> Self {
        Self {
            gravity,
            iterations,
            ..Self::default()
        }
    }

    /// Replaces the solver flags
    pub fn with_flags(mut self, flags: SolverFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Turns a single flag on or off
    pub fn set_flag(&mut self, flag: SolverFlags, enabled: bool) {
        self.flags.set(flag, enabled);
    }

    #[inline]
    pub fn accumulate_impulses(&self) -> bool {
        self.flags.contains(SolverFlags::ACCUMULATE_IMPULSES)
    }

    #[inline]
    pub fn warm_starting(&self) -> bool {
        self.flags.contains(SolverFlags::WARM_STARTING)
    }

    #[inline]
    pub fn position_correction(&self) -> bool {
        self.flags.contains(SolverFlags::POSITION_CORRECTION)
    }

    #[inline]
    pub fn split_impulses(&self) -> bool {
        self.flags.contains(SolverFlags::SPLIT_IMPULSES)
    }

    #[inline]
    pub fn frictionless(&self) -> bool {
        self.flags.contains(SolverFlags::FRICTIONLESS)
    }

    /// Whether carried-over impulses are both kept and re-applied
    #[inline]
    pub(crate) fn uses_warm_start(&self) -> bool {
        self.accumulate_impulses() && self.warm_starting()
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            gravity: Vector2::new(0.0, -10.0),
            iterations: 10,
            flags: SolverFlags::default(),
            contact_bias_factor: 0.2,
            allowed_penetration: 0.01,
            touching_tolerance: 0.0,
        }
    }
}
