pub mod world;
pub mod config;
pub mod storage;
pub mod events;

pub use self::world::PhysicsWorld;
pub use self::config::{SimulationConfig, SolverFlags};
pub use self::storage::{Handle, Storage, BodyStorage, JointStorage};
pub use self::events::{EventQueue, CollisionEvent, CollisionEventType, BodyEvent, BodyEventType};

/// A unique identifier for a body in the physics world.
///
/// Handles are assigned in increasing order as bodies are added and are never
/// reused, so ordering by handle is ordering by creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub(crate) u32);

/// A unique identifier for a joint in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JointHandle(pub(crate) u32);

impl BodyHandle {
    /// Returns the raw creation index
    pub fn index(self) -> u32 {
        self.0
    }
}

impl JointHandle {
    /// Returns the raw creation index
    pub fn index(self) -> u32 {
        self.0
    }
}

impl Handle for BodyHandle {
    fn from_raw(id: u32) -> Self {
        Self(id)
    }
}

impl Handle for JointHandle {
    fn from_raw(id: u32) -> Self {
        Self(id)
    }
}
