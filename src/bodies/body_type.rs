/// Type of rigid body, determining how it behaves in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RigidBodyType {
    /// Dynamic bodies are fully simulated (affected by gravity, forces and impulses)
    Dynamic,

    /// Static bodies have infinite mass; they never move and two of them never collide
    Static,
}

impl RigidBodyType {
    /// Classifies a body by its inverse mass
    #[inline]
    pub fn from_inverse_mass(inv_mass: f32) -> Self {
        if inv_mass == 0.0 {
            Self::Static
        } else {
            Self::Dynamic
        }
    }
}
