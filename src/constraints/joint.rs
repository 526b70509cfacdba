use tracing::warn;

use crate::bodies::RigidBody;
use crate::constraints::Constraint;
use crate::core::{BodyHandle, BodyStorage, SimulationConfig};
use crate::error::PhysicsError;
use crate::math::{Matrix2, Vector2};
use crate::Result;

/// Default fraction of joint drift corrected per step
pub const DEFAULT_JOINT_BIAS_FACTOR: f32 = 0.2;

/// A point-to-point joint pinning an anchor on one body to an anchor on another.
///
/// Both anchors start at the same world point. The joint can be softened with
/// [`set_softness`](Joint::set_softness) or configured as a damped spring with
/// [`set_spring`](Joint::set_spring).
#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    body_a: BodyHandle,
    body_b: BodyHandle,

    /// Anchor in each body's local frame
    local_anchor_a: Vector2,
    local_anchor_b: Vector2,

    /// World-space anchor offsets, refreshed in pre_step
    r1: Vector2,
    r2: Vector2,

    /// Inverse of the effective mass matrix
    mass: Matrix2,

    /// Velocity target for drift correction
    bias: Vector2,

    /// Accumulated impulse
    impulse: Vector2,

    bias_factor: f32,
    softness: f32,
}

impl Joint {
    /// Joins two bodies at a world-space anchor point
    pub fn new(
        handle_a: BodyHandle,
        body_a: &RigidBody,
        handle_b: BodyHandle,
        body_b: &RigidBody,
        anchor: Vector2,
    ) -> Result<Self> {
        if handle_a == handle_b {
            return Err(PhysicsError::InvalidParameter(format!(
                "joint needs two distinct bodies, got {:?} twice",
                handle_a
            )));
        }

        let local_anchor_a = body_a.get_transform().inverse_transform_point(anchor);
        let local_anchor_b = body_b.get_transform().inverse_transform_point(anchor);

        Ok(Self {
            body_a: handle_a,
            body_b: handle_b,
            local_anchor_a,
            local_anchor_b,
            r1: Vector2::zero(),
            r2: Vector2::zero(),
            mass: Matrix2::zero(),
            bias: Vector2::zero(),
            impulse: Vector2::zero(),
            bias_factor: DEFAULT_JOINT_BIAS_FACTOR,
            softness: 0.0,
        })
    }

    /// The first body
    pub fn body_a(&self) -> BodyHandle {
        self.body_a
    }

    /// The second body
    pub fn body_b(&self) -> BodyHandle {
        self.body_b
    }

    /// Anchor in the first body's local frame
    pub fn local_anchor_a(&self) -> Vector2 {
        self.local_anchor_a
    }

    /// Anchor in the second body's local frame
    pub fn local_anchor_b(&self) -> Vector2 {
        self.local_anchor_b
    }

    /// Current world positions of both anchors
    pub fn world_anchors(&self, bodies: &BodyStorage) -> Result<(Vector2, Vector2)> {
        let a = bodies.fetch(self.body_a)?;
        let b = bodies.fetch(self.body_b)?;
        Ok((
            a.get_transform().transform_point(self.local_anchor_a),
            b.get_transform().transform_point(self.local_anchor_b),
        ))
    }

    /// Accumulated impulse
    pub fn impulse(&self) -> Vector2 {
        self.impulse
    }

    pub fn get_softness(&self) -> f32 {
        self.softness
    }

    /// Sets the softness, added to the diagonal of the effective mass.
    /// Zero makes the joint rigid.
    pub fn set_softness(&mut self, softness: f32) {
        self.softness = softness.max(0.0);
    }

    pub fn get_bias_factor(&self) -> f32 {
        self.bias_factor
    }

    /// Sets the fraction of positional drift removed per step
    pub fn set_bias_factor(&mut self, bias_factor: f32) {
        self.bias_factor = bias_factor.max(0.0);
    }

    /// Tunes softness and bias factor so the joint behaves like a damped
    /// spring of the given frequency (Hz) and damping ratio, for a body of
    /// `mass` stepped at `dt`.
    pub fn set_spring(&mut self, mass: f32, frequency: f32, damping_ratio: f32, dt: f32) -> Result<()> {
        if !(mass > 0.0 && frequency > 0.0 && damping_ratio >= 0.0 && dt > 0.0) {
            return Err(PhysicsError::InvalidParameter(format!(
                "spring needs positive mass, frequency and dt and a non-negative damping ratio \
                 (mass {}, frequency {}, damping ratio {}, dt {})",
                mass, frequency, damping_ratio, dt
            )));
        }

        let omega = 2.0 * std::f32::consts::PI * frequency;
        let damping = 2.0 * mass * damping_ratio * omega;
        let stiffness = mass * omega * omega;
        let denominator = damping + dt * stiffness;

        self.softness = 1.0 / denominator;
        self.bias_factor = dt * stiffness / denominator;
        Ok(())
    }
}

impl Constraint for Joint {
    fn get_bodies(&self) -> [BodyHandle; 2] {
        [self.body_a, self.body_b]
    }

    fn pre_step(&mut self, bodies: &mut BodyStorage, inv_dt: f32, config: &SimulationConfig) -> Result<()> {
        let (b1, b2) = bodies.fetch_pair_mut(self.body_a, self.body_b)?;

        // Pre-compute anchors, mass matrix, and bias
        let rot1 = Matrix2::from_angle(b1.get_rotation());
        let rot2 = Matrix2::from_angle(b2.get_rotation());
        self.r1 = rot1 * self.local_anchor_a;
        self.r2 = rot2 * self.local_anchor_b;

        // K = [(1/m1 + 1/m2) * eye(2) - skew(r1) * invI1 * skew(r1) - skew(r2) * invI2 * skew(r2)]
        let inv_mass = b1.get_inverse_mass() + b2.get_inverse_mass();
        let k1 = Matrix2::from_diagonal(inv_mass, inv_mass);
        let k2 = angular_mass(b1.get_inverse_inertia(), self.r1);
        let k3 = angular_mass(b2.get_inverse_inertia(), self.r2);

        let mut k = k1 + k2 + k3;
        k.col1.x += self.softness;
        k.col2.y += self.softness;

        self.mass = k.inverse().map_err(|err| {
            warn!(
                body_a = self.body_a.index(),
                body_b = self.body_b.index(),
                "joint effective mass is singular: {}",
                err
            );
            err
        })?;

        let p1 = b1.get_position() + self.r1;
        let p2 = b2.get_position() + self.r2;
        let drift = p2 - p1;

        self.bias = if config.position_correction() {
            -self.bias_factor * inv_dt * drift
        } else {
            Vector2::zero()
        };

        if config.warm_starting() {
            // Apply accumulated impulse
            b1.apply_impulse_at(-self.impulse, self.r1);
            b2.apply_impulse_at(self.impulse, self.r2);
        } else {
            self.impulse = Vector2::zero();
        }

        Ok(())
    }

    fn apply_impulse(&mut self, bodies: &mut BodyStorage, _config: &SimulationConfig) -> Result<()> {
        let (b1, b2) = bodies.fetch_pair_mut(self.body_a, self.body_b)?;

        let dv = b2.velocity_at(self.r2) - b1.velocity_at(self.r1);
        let impulse = self.mass * (self.bias - dv - self.softness * self.impulse);

        b1.apply_impulse_at(-impulse, self.r1);
        b2.apply_impulse_at(impulse, self.r2);

        self.impulse += impulse;
        Ok(())
    }
}

/// Rotational contribution `invI * [[ry², -rx*ry], [-rx*ry, rx²]]` to the
/// effective mass
fn angular_mass(inv_inertia: f32, r: Vector2) -> Matrix2 {
    Matrix2::new(
        Vector2::new(inv_inertia * r.y * r.y, -inv_inertia * r.x * r.y),
        Vector2::new(-inv_inertia * r.x * r.y, inv_inertia * r.x * r.x),
    )
}
