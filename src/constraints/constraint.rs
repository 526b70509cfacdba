use crate::core::{BodyHandle, BodyStorage, SimulationConfig};
use crate::Result;

/// Something the sequential impulse solver iterates over.
///
/// Each step the world calls [`pre_step`](Constraint::pre_step) once on every
/// constraint, then [`apply_impulse`](Constraint::apply_impulse) once per
/// iteration. Contact arbiters and joints both implement it.
pub trait Constraint {
    /// Returns the two bodies involved in the constraint
    fn get_bodies(&self) -> [BodyHandle; 2];

    /// Checks if the constraint involves a specific body
    fn involves_body(&self, body: BodyHandle) -> bool {
        self.get_bodies().contains(&body)
    }

    /// Computes effective masses and bias terms for this step and applies
    /// warm-start impulses when enabled
    fn pre_step(&mut self, bodies: &mut BodyStorage, inv_dt: f32, config: &SimulationConfig) -> Result<()>;

    /// Runs one solver iteration
    fn apply_impulse(&mut self, bodies: &mut BodyStorage, config: &SimulationConfig) -> Result<()>;
}
