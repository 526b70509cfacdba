use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, trace};

use crate::bodies::RigidBody;
use crate::collision::{collide, Arbiter, BroadPhase, BruteForceBroadPhase, CollisionPair};
use crate::constraints::{Constraint, Joint};
use crate::core::events::{BodyEventType, CollisionEventType};
use crate::core::{
    BodyEvent, BodyHandle, BodyStorage, CollisionEvent, EventQueue, JointHandle, JointStorage,
    SimulationConfig, SolverFlags,
};
use crate::error::PhysicsError;
use crate::math::Vector2;
use crate::Result;

/// The main physics world that owns all bodies, joints and contact arbiters
/// and advances them through time
#[derive(Debug)]
pub struct PhysicsWorld {
    /// All rigid bodies in the world
    bodies: BodyStorage,

    /// All joints in the world
    joints: JointStorage,

    /// Live contact state, keyed by canonical body pair
    arbiters: BTreeMap<CollisionPair, Arbiter>,

    broad_phase: BruteForceBroadPhase,

    /// Configuration for the simulation
    config: SimulationConfig,

    /// Queue of physics events
    events: EventQueue,

    /// The total elapsed simulation time
    time: f32,
}

impl PhysicsWorld {
    /// Creates a world with the given gravity and solver iteration count
    pub fn new(gravity: Vector2, iterations: u32) -> Self {
        Self::with_config(SimulationConfig::new(gravity, iterations))
    }

    /// Creates a new physics world with the given configuration
    pub fn with_config(config: SimulationConfig) -> Self {
        Self {
            bodies: BodyStorage::new(),
            joints: JointStorage::new(),
            arbiters: BTreeMap::new(),
            broad_phase: BruteForceBroadPhase::with_margin(config.touching_tolerance),
            config,
            events: EventQueue::new(),
            time: 0.0,
        }
    }

    /// Returns the current simulation time
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Sets the gravity for the simulation
    pub fn set_gravity(&mut self, gravity: Vector2) {
        self.config.gravity = gravity;
    }

    /// Gets the current gravity
    pub fn get_gravity(&self) -> Vector2 {
        self.config.gravity
    }

    /// Returns a reference to the simulation configuration
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Returns a mutable reference to the simulation configuration
    pub fn config_mut(&mut self) -> &mut SimulationConfig {
        &mut self.config
    }

    /// Turns a single solver flag on or off
    pub fn set_flag(&mut self, flag: SolverFlags, enabled: bool) {
        self.config.set_flag(flag, enabled);
    }

    /// Adds a rigid body to the world and returns its handle
    pub fn add_body(&mut self, body: RigidBody) -> Result<BodyHandle> {
        body.validate()?;
        let handle = self.bodies.add(body);
        debug!(body = handle.index(), "body added");

        self.events.add_body_event(BodyEvent {
            event_type: BodyEventType::Added,
            body: handle,
        });

        Ok(handle)
    }

    /// Removes a rigid body from the world, together with every joint and
    /// arbiter that references it
    pub fn remove_body(&mut self, handle: BodyHandle) -> Result<RigidBody> {
        let body = self
            .bodies
            .remove(handle)
            .ok_or_else(|| PhysicsError::ResourceNotFound(format!("{:?} not found", handle)))?;

        self.joints.retain(|_, joint| !joint.involves_body(handle));

        let stale: Vec<CollisionPair> = self
            .arbiters
            .keys()
            .filter(|pair| pair.contains(handle))
            .copied()
            .collect();
        for pair in stale {
            self.erase_arbiter(pair);
        }

        debug!(body = handle.index(), "body removed");
        self.events.add_body_event(BodyEvent {
            event_type: BodyEventType::Removed,
            body: handle,
        });

        Ok(body)
    }

    /// Gets a reference to a rigid body by its handle
    pub fn get_body(&self, handle: BodyHandle) -> Result<&RigidBody> {
        self.bodies.fetch(handle)
    }

    /// Gets a mutable reference to a rigid body by its handle
    pub fn get_body_mut(&mut self, handle: BodyHandle) -> Result<&mut RigidBody> {
        self.bodies.fetch_mut(handle)
    }

    /// Returns the body storage, in insertion order
    pub fn bodies(&self) -> &BodyStorage {
        &self.bodies
    }

    /// Adds a joint whose bodies are already in the world
    pub fn add_joint(&mut self, joint: Joint) -> Result<JointHandle> {
        for body in joint.get_bodies() {
            if !self.bodies.contains(body) {
                return Err(PhysicsError::ResourceNotFound(format!(
                    "joint references {:?}, which is not in the world",
                    body
                )));
            }
        }

        let handle = self.joints.add(joint);
        debug!(joint = handle.index(), "joint added");
        Ok(handle)
    }

    /// Joins two bodies at a world-space anchor, using their current poses
    pub fn create_joint(&mut self, body_a: BodyHandle, body_b: BodyHandle, anchor: Vector2) -> Result<JointHandle> {
        let joint = Joint::new(
            body_a,
            self.bodies.fetch(body_a)?,
            body_b,
            self.bodies.fetch(body_b)?,
            anchor,
        )?;
        self.add_joint(joint)
    }

    /// Removes a joint from the world
    pub fn remove_joint(&mut self, handle: JointHandle) -> Result<Joint> {
        let joint = self
            .joints
            .remove(handle)
            .ok_or_else(|| PhysicsError::ResourceNotFound(format!("{:?} not found", handle)))?;
        debug!(joint = handle.index(), "joint removed");
        Ok(joint)
    }

    /// Gets a reference to a joint by its handle
    pub fn get_joint(&self, handle: JointHandle) -> Result<&Joint> {
        self.joints.fetch(handle)
    }

    /// Gets a mutable reference to a joint by its handle
    pub fn get_joint_mut(&mut self, handle: JointHandle) -> Result<&mut Joint> {
        self.joints.fetch_mut(handle)
    }

    /// Returns the joint storage, in insertion order
    pub fn joints(&self) -> &JointStorage {
        &self.joints
    }

    /// Iterates the live arbiters in body-pair order
    pub fn arbiters(&self) -> impl Iterator<Item = &Arbiter> + '_ {
        self.arbiters.values()
    }

    /// Looks up the arbiter for a pair of bodies, in either order
    pub fn arbiter(&self, body_a: BodyHandle, body_b: BodyHandle) -> Option<&Arbiter> {
        self.arbiters.get(&CollisionPair::new(body_a, body_b))
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// A zero or negative `dt` is a paused step: nothing moves, but the solver
    /// still runs on the current velocities without position bias.
    pub fn step(&mut self, dt: f32) -> Result<()> {
        if !dt.is_finite() {
            return Err(PhysicsError::InvalidParameter(format!(
                "time step must be finite, got {}",
                dt
            )));
        }

        let dt = dt.max(0.0);
        let inv_dt = if dt > 0.0 { 1.0 / dt } else { 0.0 };

        // Clear events from previous step
        self.events.clear();

        self.broad_phase_update();

        // Integrate forces
        let gravity = self.config.gravity;
        for (_, body) in self.bodies.iter_mut() {
            body.integrate_forces(gravity, dt);
        }

        // Perform pre-steps
        for arbiter in self.arbiters.values_mut() {
            arbiter.pre_step(&mut self.bodies, inv_dt, &self.config)?;
        }
        for (_, joint) in self.joints.iter_mut() {
            joint.pre_step(&mut self.bodies, inv_dt, &self.config)?;
        }

        // Perform iterations
        for _ in 0..self.config.iterations {
            for arbiter in self.arbiters.values_mut() {
                if self.config.split_impulses() {
                    arbiter.apply_bias_impulse(&mut self.bodies, &self.config)?;
                }
                arbiter.apply_impulse(&mut self.bodies, &self.config)?;
            }

            for (_, joint) in self.joints.iter_mut() {
                joint.apply_impulse(&mut self.bodies, &self.config)?;
            }
        }

        // Integrate velocities
        for (_, body) in self.bodies.iter_mut() {
            body.integrate_velocity(dt);
        }

        self.time += dt;

        trace!(
            bodies = self.bodies.len(),
            joints = self.joints.len(),
            arbiters = self.arbiters.len(),
            iterations = self.config.iterations,
            "step complete"
        );

        Ok(())
    }

    /// Determines overlapping bodies and creates, updates or erases arbiters
    fn broad_phase_update(&mut self) {
        let tolerance = self.config.touching_tolerance;
        self.broad_phase.set_margin(tolerance);

        let proxies: Vec<(BodyHandle, &RigidBody)> = self.bodies.iter().collect();
        self.broad_phase.update(&proxies);

        let mut touching = BTreeSet::new();
        for pair in self.broad_phase.get_collision_pairs() {
            let (Some(body_a), Some(body_b)) = (self.bodies.get(pair.body_a), self.bodies.get(pair.body_b)) else {
                continue;
            };

            let contacts = collide(body_a, body_b, tolerance);
            if contacts.is_empty() {
                continue;
            }
            touching.insert(pair);

            match self.arbiters.get_mut(&pair) {
                Some(arbiter) => arbiter.update(contacts, body_a, body_b, &self.config),
                None => {
                    debug!(
                        body_a = pair.body_a.index(),
                        body_b = pair.body_b.index(),
                        contacts = contacts.len(),
                        "arbiter created"
                    );
                    self.events.add_collision_event(CollisionEvent {
                        event_type: CollisionEventType::Begin,
                        body_a: pair.body_a,
                        body_b: pair.body_b,
                        contacts: contacts.iter().map(|c| c.position).collect(),
                    });
                    self.arbiters.insert(pair, Arbiter::new(pair, contacts, body_a, body_b));
                }
            }
        }

        let separated: Vec<CollisionPair> = self
            .arbiters
            .keys()
            .filter(|pair| !touching.contains(*pair))
            .copied()
            .collect();
        for pair in separated {
            self.erase_arbiter(pair);
        }
    }

    fn erase_arbiter(&mut self, pair: CollisionPair) {
        if self.arbiters.remove(&pair).is_some() {
            debug!(
                body_a = pair.body_a.index(),
                body_b = pair.body_b.index(),
                "arbiter removed"
            );
            self.events.add_collision_event(CollisionEvent {
                event_type: CollisionEventType::End,
                body_a: pair.body_a,
                body_b: pair.body_b,
                contacts: Vec::new(),
            });
        }
    }

    /// Returns a reference to the event queue
    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    /// Returns a mutable reference to the event queue
    pub fn events_mut(&mut self) -> &mut EventQueue {
        &mut self.events
    }

    /// Clears the world of all bodies, joints and arbiters
    pub fn clear(&mut self) {
        debug!(
            bodies = self.bodies.len(),
            joints = self.joints.len(),
            "world cleared"
        );
        self.bodies.clear();
        self.joints.clear();
        self.arbiters.clear();
        self.events.clear();
        self.time = 0.0;
    }

    /// Returns the number of bodies in the world
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Returns the number of joints in the world
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Returns the number of live arbiters
    pub fn arbiter_count(&self) -> usize {
        self.arbiters.len()
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::with_config(SimulationConfig::default())
    }
}
