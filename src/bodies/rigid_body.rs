use crate::bodies::RigidBodyType;
use crate::error::PhysicsError;
use crate::math::{Vector2, Transform};
use crate::Result;

/// Friction coefficient given to newly created bodies
pub const DEFAULT_FRICTION: f32 = 0.2;

/// A box-shaped rigid body for physics simulation
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    /// The body's position in world space
    position: Vector2,

    /// The body's rotation in radians
    rotation: f32,

    /// The body's linear velocity
    linear_velocity: Vector2,

    /// The body's angular velocity
    angular_velocity: f32,

    /// Pseudo velocities produced by split-impulse position correction.
    /// Only applied to positions and cleared after every step.
    bias_velocity: Vector2,
    bias_angular_velocity: f32,

    /// Force accumulated since the last step
    force: Vector2,

    /// Torque accumulated since the last step
    torque: f32,

    /// Half the width and height of the box
    half_extents: Vector2,

    /// Coulomb friction coefficient
    friction: f32,

    /// The body's mass
    mass: f32,

    /// Inverse of the body's mass, zero for static bodies
    inv_mass: f32,

    /// Rotational inertia about the center
    inertia: f32,

    /// Inverse of the body's inertia, zero for static bodies
    inv_inertia: f32,
}

impl RigidBody {
    /// Creates a box with the given half extents and mass.
    ///
    /// A mass of `f32::INFINITY`, zero or a negative value produces a static body.
    pub fn new(half_extents: Vector2, mass: f32) -> Self {
        let mut body = Self::default();
        body.set_box(half_extents, mass);
        body
    }

    /// Creates a dynamic box at the given position
    pub fn new_dynamic(half_extents: Vector2, mass: f32, position: Vector2) -> Self {
        let mut body = Self::new(half_extents, mass);
        body.position = position;
        body
    }

    /// Creates a static box at the given position
    pub fn new_static(half_extents: Vector2, position: Vector2) -> Self {
        let mut body = Self::new(half_extents, f32::INFINITY);
        body.position = position;
        body
    }

    /// Sets the box shape and mass, recomputing the mass properties.
    ///
    /// Inertia is that of a solid rectangle, `m * (w² + h²) / 12` with `w`
    /// and `h` the full side lengths.
    pub fn set_box(&mut self, half_extents: Vector2, mass: f32) {
        self.half_extents = half_extents;
        self.mass = mass;

        if mass.is_finite() && mass > 0.0 {
            let width = 2.0 * half_extents.x;
            let height = 2.0 * half_extents.y;
            self.inv_mass = 1.0 / mass;
            self.inertia = mass * (width * width + height * height) / 12.0;
            self.inv_inertia = if self.inertia > 0.0 { 1.0 / self.inertia } else { 0.0 };
        } else {
            self.mass = f32::INFINITY;
            self.inv_mass = 0.0;
            self.inertia = f32::INFINITY;
            self.inv_inertia = 0.0;
        }
    }

    /// Checks that the body describes a usable box
    pub fn validate(&self) -> Result<()> {
        if !(self.half_extents.x > 0.0 && self.half_extents.y > 0.0) || !self.half_extents.is_finite() {
            return Err(PhysicsError::InvalidParameter(format!(
                "box half extents must be positive and finite, got {}",
                self.half_extents
            )));
        }
        if !self.position.is_finite() || !self.rotation.is_finite() {
            return Err(PhysicsError::InvalidParameter(
                "body pose must be finite".to_string(),
            ));
        }
        if !(self.friction >= 0.0) {
            return Err(PhysicsError::InvalidParameter(format!(
                "friction must be non-negative, got {}",
                self.friction
            )));
        }
        Ok(())
    }

    /// Returns the body's transform
    pub fn get_transform(&self) -> Transform {
        Transform::from_pose(self.position, self.rotation)
    }

    /// Returns the body's position
    pub fn get_position(&self) -> Vector2 {
        self.position
    }

    /// Sets the body's position
    pub fn set_position(&mut self, position: Vector2) {
        self.position = position;
    }

    /// Returns the body's rotation in radians
    pub fn get_rotation(&self) -> f32 {
        self.rotation
    }

    /// Sets the body's rotation in radians
    pub fn set_rotation(&mut self, rotation: f32) {
        self.rotation = rotation;
    }

    /// Returns the body's linear velocity
    pub fn get_linear_velocity(&self) -> Vector2 {
        self.linear_velocity
    }

    /// Sets the body's linear velocity
    pub fn set_linear_velocity(&mut self, velocity: Vector2) {
        self.linear_velocity = velocity;
    }

    /// Returns the body's angular velocity
    pub fn get_angular_velocity(&self) -> f32 {
        self.angular_velocity
    }

    /// Sets the body's angular velocity
    pub fn set_angular_velocity(&mut self, velocity: f32) {
        self.angular_velocity = velocity;
    }

    /// Returns the half extents of the box
    pub fn get_half_extents(&self) -> Vector2 {
        self.half_extents
    }

    /// Returns the friction coefficient
    pub fn get_friction(&self) -> f32 {
        self.friction
    }

    /// Sets the friction coefficient
    pub fn set_friction(&mut self, friction: f32) {
        self.friction = friction.max(0.0);
    }

    /// Returns the body's mass (`f32::INFINITY` for static bodies)
    pub fn get_mass(&self) -> f32 {
        self.mass
    }

    /// Returns the body's inverse mass
    pub fn get_inverse_mass(&self) -> f32 {
        self.inv_mass
    }

    /// Returns the body's rotational inertia
    pub fn get_inertia(&self) -> f32 {
        self.inertia
    }

    /// Returns the body's inverse rotational inertia
    pub fn get_inverse_inertia(&self) -> f32 {
        self.inv_inertia
    }

    /// Returns the body type
    pub fn get_body_type(&self) -> RigidBodyType {
        RigidBodyType::from_inverse_mass(self.inv_mass)
    }

    /// Returns whether the body has infinite mass
    pub fn is_static(&self) -> bool {
        self.inv_mass == 0.0
    }

    /// Returns the force accumulated since the last step
    pub fn get_force(&self) -> Vector2 {
        self.force
    }

    /// Returns the torque accumulated since the last step
    pub fn get_torque(&self) -> f32 {
        self.torque
    }

    /// Accumulates a force at the center of mass until the next step
    pub fn apply_force(&mut self, force: Vector2) {
        self.force += force;
    }

    /// Accumulates a torque until the next step
    pub fn apply_torque(&mut self, torque: f32) {
        self.torque += torque;
    }

    /// Returns the four corners of the box in world space, counter-clockwise
    /// starting from the bottom-left corner
    pub fn vertices(&self) -> [Vector2; 4] {
        let transform = self.get_transform();
        let h = self.half_extents;
        [
            transform.transform_point(Vector2::new(-h.x, -h.y)),
            transform.transform_point(Vector2::new(h.x, -h.y)),
            transform.transform_point(Vector2::new(h.x, h.y)),
            transform.transform_point(Vector2::new(-h.x, h.y)),
        ]
    }

    /// Velocity of a point attached to the body, given its offset from the center
    #[inline]
    pub(crate) fn velocity_at(&self, r: Vector2) -> Vector2 {
        self.linear_velocity + Vector2::scalar_cross(self.angular_velocity, &r)
    }

    /// Bias velocity of a point attached to the body
    #[inline]
    pub(crate) fn bias_velocity_at(&self, r: Vector2) -> Vector2 {
        self.bias_velocity + Vector2::scalar_cross(self.bias_angular_velocity, &r)
    }

    /// Applies an impulse at offset `r` from the center
    #[inline]
    pub(crate) fn apply_impulse_at(&mut self, impulse: Vector2, r: Vector2) {
        self.linear_velocity += self.inv_mass * impulse;
        self.angular_velocity += self.inv_inertia * r.cross(&impulse);
    }

    /// Applies a position-correction impulse at offset `r` from the center
    #[inline]
    pub(crate) fn apply_bias_impulse_at(&mut self, impulse: Vector2, r: Vector2) {
        self.bias_velocity += self.inv_mass * impulse;
        self.bias_angular_velocity += self.inv_inertia * r.cross(&impulse);
    }

    /// Integrates gravity and the accumulated force and torque into velocity
    pub(crate) fn integrate_forces(&mut self, gravity: Vector2, dt: f32) {
        if self.is_static() {
            return;
        }

        self.linear_velocity += dt * (gravity + self.inv_mass * self.force);
        self.angular_velocity += dt * self.inv_inertia * self.torque;
    }

    /// Integrates velocity into position and clears the per-step accumulators
    pub(crate) fn integrate_velocity(&mut self, dt: f32) {
        if !self.is_static() {
            self.position += dt * (self.linear_velocity + self.bias_velocity);
            self.rotation += dt * (self.angular_velocity + self.bias_angular_velocity);
        }

        self.bias_velocity = Vector2::zero();
        self.bias_angular_velocity = 0.0;
        self.force = Vector2::zero();
        self.torque = 0.0;
    }
}

impl Default for RigidBody {
    /// A static unit box at the origin
    fn default() -> Self {
        Self {
            position: Vector2::zero(),
            rotation: 0.0,
            linear_velocity: Vector2::zero(),
            angular_velocity: 0.0,
            bias_velocity: Vector2::zero(),
            bias_angular_velocity: 0.0,
            force: Vector2::zero(),
            torque: 0.0,
            half_extents: Vector2::new(0.5, 0.5),
            friction: DEFAULT_FRICTION,
            mass: f32::INFINITY,
            inv_mass: 0.0,
            inertia: f32::INFINITY,
            inv_inertia: 0.0,
        }
    }
}
