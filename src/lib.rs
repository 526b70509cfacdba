//! A 2D rigid-body physics engine for oriented boxes.
//!
//! Bodies are boxes; contacts come from a separating-axis test with edge
//! clipping and are kept per body pair in an [`Arbiter`](collision::Arbiter)
//! so accumulated impulses can warm-start the next frame. Contacts and
//! point-to-point joints are resolved by a sequential impulse solver driven
//! from [`PhysicsWorld::step`].

pub mod math;
pub mod core;
pub mod bodies;
pub mod collision;
pub mod constraints;

/// Re-export common types for easier usage
pub use crate::core::{PhysicsWorld, SimulationConfig, SolverFlags, BodyHandle, JointHandle};
pub use crate::bodies::{RigidBody, RigidBodyType};
pub use crate::constraints::Joint;
pub use crate::math::{Vector2, Matrix2};

/// Error types for the physics engine
pub mod error {
    use thiserror::Error;

    #[derive(Error, Debug, Clone, PartialEq)]
    pub enum PhysicsError {
        #[error("Invalid parameter: {0}")]
        InvalidParameter(String),

        #[error("Resource not found: {0}")]
        ResourceNotFound(String),

        #[error("Singular matrix (determinant {determinant}) cannot be inverted")]
        SingularMatrix { determinant: f32 },
    }
}

/// Result type for physics engine operations
pub type Result<T> = std::result::Result<T, error::PhysicsError>;

/// Engine version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
