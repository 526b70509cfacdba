use crate::bodies::RigidBody;
use crate::collision::{CollisionPair, Contact};
use crate::constraints::Constraint;
use crate::core::{BodyHandle, BodyStorage, SimulationConfig};
use crate::math::{clamp, Vector2};
use crate::Result;

/// The persistent contact state between two touching bodies.
///
/// An arbiter lives for as long as the narrow phase keeps reporting contacts
/// for its pair. Contacts are matched frame to frame by [`FeaturePair`], which
/// lets accumulated impulses carry over and warm-start the solver.
///
/// [`FeaturePair`]: crate::collision::FeaturePair
#[derive(Debug, Clone)]
pub struct Arbiter {
    pair: CollisionPair,
    contacts: Vec<Contact>,

    /// Combined friction coefficient of the two bodies
    friction: f32,
}

impl Arbiter {
    /// Creates an arbiter for a freshly touching pair
    pub fn new(pair: CollisionPair, contacts: Vec<Contact>, body_a: &RigidBody, body_b: &RigidBody) -> Self {
        Self {
            pair,
            contacts,
            friction: combined_friction(body_a, body_b),
        }
    }

    /// Replaces the contacts with a new frame's set and recombines friction.
    ///
    /// A new contact whose feature matches an old one inherits its
    /// accumulated impulses, but only when warm starting is in use.
    pub fn update(
        &mut self,
        new_contacts: Vec<Contact>,
        body_a: &RigidBody,
        body_b: &RigidBody,
        config: &SimulationConfig,
    ) {
        let warm_start = config.uses_warm_start();
        self.friction = combined_friction(body_a, body_b);

        let merged = new_contacts
            .into_iter()
            .map(|mut contact| {
                if warm_start {
                    if let Some(old) = self.contacts.iter().find(|old| old.feature == contact.feature) {
                        contact.warm_start_from(old);
                    }
                }
                contact
            })
            .collect();

        self.contacts = merged;
    }

    /// The pair of bodies this arbiter resolves
    pub fn pair(&self) -> CollisionPair {
        self.pair
    }

    /// The current contact points
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Combined friction coefficient, the geometric mean of both bodies'
    pub fn friction(&self) -> f32 {
        self.friction
    }

    /// Number of contact points
    pub fn num_contacts(&self) -> usize {
        self.contacts.len()
    }

    fn effective_friction(&self, config: &SimulationConfig) -> f32 {
        if config.frictionless() {
            0.0
        } else {
            self.friction
        }
    }

    /// One iteration of the split position pass.
    ///
    /// Pushes the bodies apart using bias velocities only, so position
    /// correction never adds real momentum.
    pub fn apply_bias_impulse(&mut self, bodies: &mut BodyStorage, config: &SimulationConfig) -> Result<()> {
        let (b1, b2) = bodies.fetch_pair_mut(self.pair.body_a, self.pair.body_b)?;

        for c in &mut self.contacts {
            let dv = b2.bias_velocity_at(c.r2) - b1.bias_velocity_at(c.r1);
            let vn = dv.dot(&c.normal);

            let mut d_pnb = c.mass_normal * (-vn + c.bias);
            if config.accumulate_impulses() {
                let pnb0 = c.bias_impulse;
                c.bias_impulse = (pnb0 + d_pnb).max(0.0);
                d_pnb = c.bias_impulse - pnb0;
            } else {
                d_pnb = d_pnb.max(0.0);
            }

            let pb = d_pnb * c.normal;
            b1.apply_bias_impulse_at(-pb, c.r1);
            b2.apply_bias_impulse_at(pb, c.r2);
        }

        Ok(())
    }
}

fn combined_friction(body_a: &RigidBody, body_b: &RigidBody) -> f32 {
    (body_a.get_friction() * body_b.get_friction()).sqrt()
}

impl Constraint for Arbiter {
    fn get_bodies(&self) -> [BodyHandle; 2] {
        [self.pair.body_a, self.pair.body_b]
    }

    fn pre_step(&mut self, bodies: &mut BodyStorage, inv_dt: f32, config: &SimulationConfig) -> Result<()> {
        let (b1, b2) = bodies.fetch_pair_mut(self.pair.body_a, self.pair.body_b)?;

        let bias_factor = if config.position_correction() {
            config.contact_bias_factor
        } else {
            0.0
        };

        for c in &mut self.contacts {
            c.r1 = c.position - b1.get_position();
            c.r2 = c.position - b2.get_position();

            // Precompute normal mass, tangent mass, and bias
            let rn1 = c.r1.dot(&c.normal);
            let rn2 = c.r2.dot(&c.normal);
            let k_normal = b1.get_inverse_mass()
                + b2.get_inverse_mass()
                + b1.get_inverse_inertia() * (c.r1.dot(&c.r1) - rn1 * rn1)
                + b2.get_inverse_inertia() * (c.r2.dot(&c.r2) - rn2 * rn2);
            c.mass_normal = 1.0 / k_normal;

            let tangent = c.tangent();
            let rt1 = c.r1.dot(&tangent);
            let rt2 = c.r2.dot(&tangent);
            let k_tangent = b1.get_inverse_mass()
                + b2.get_inverse_mass()
                + b1.get_inverse_inertia() * (c.r1.dot(&c.r1) - rt1 * rt1)
                + b2.get_inverse_inertia() * (c.r2.dot(&c.r2) - rt2 * rt2);
            c.mass_tangent = 1.0 / k_tangent;

            c.bias = -bias_factor * inv_dt * (c.separation + config.allowed_penetration).min(0.0);

            if config.uses_warm_start() {
                // Apply normal + friction impulse
                let p = c.normal_impulse * c.normal + c.tangent_impulse * tangent;
                b1.apply_impulse_at(-p, c.r1);
                b2.apply_impulse_at(p, c.r2);

                if config.split_impulses() {
                    let pb = c.bias_impulse * c.normal;
                    b1.apply_bias_impulse_at(-pb, c.r1);
                    b2.apply_bias_impulse_at(pb, c.r2);
                }
            }

            if !config.split_impulses() {
                c.bias_impulse = 0.0;
            }
        }

        Ok(())
    }

    fn apply_impulse(&mut self, bodies: &mut BodyStorage, config: &SimulationConfig) -> Result<()> {
        let friction = self.effective_friction(config);
        let (b1, b2) = bodies.fetch_pair_mut(self.pair.body_a, self.pair.body_b)?;

        for c in &mut self.contacts {
            // Relative velocity at contact
            let dv = b2.velocity_at(c.r2) - b1.velocity_at(c.r1);

            // Compute normal impulse
            let vn = dv.dot(&c.normal);
            let bias = if config.split_impulses() { 0.0 } else { c.bias };
            let mut d_pn = c.mass_normal * (-vn + bias);

            if config.accumulate_impulses() {
                // Clamp the accumulated impulse
                let pn0 = c.normal_impulse;
                c.normal_impulse = (pn0 + d_pn).max(0.0);
                d_pn = c.normal_impulse - pn0;
            } else {
                d_pn = d_pn.max(0.0);
            }

            let pn = d_pn * c.normal;
            b1.apply_impulse_at(-pn, c.r1);
            b2.apply_impulse_at(pn, c.r2);

            // Relative velocity again, now for friction
            let dv = b2.velocity_at(c.r2) - b1.velocity_at(c.r1);

            let tangent = c.tangent();
            let vt = dv.dot(&tangent);
            let mut d_pt = c.mass_tangent * -vt;

            if config.accumulate_impulses() {
                let max_pt = friction * c.normal_impulse;

                // Clamp friction
                let old_tangent_impulse = c.tangent_impulse;
                c.tangent_impulse = clamp(old_tangent_impulse + d_pt, -max_pt, max_pt);
                d_pt = c.tangent_impulse - old_tangent_impulse;
            } else {
                let max_pt = friction * d_pn;
                d_pt = clamp(d_pt, -max_pt, max_pt);
            }

            let pt: Vector2 = d_pt * tangent;
            b1.apply_impulse_at(-pt, c.r1);
            b2.apply_impulse_at(pt, c.r2);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::narrow_phase::collide;
    use crate::core::SolverFlags;
    use approx::assert_relative_eq;

    fn resting_pair(config: &SimulationConfig) -> (BodyStorage, Arbiter) {
        let mut bodies = BodyStorage::new();
        let ground = bodies.add(RigidBody::new_static(Vector2::new(50.0, 10.0), Vector2::new(0.0, -10.0)));
        let block = bodies.add(RigidBody::new_dynamic(Vector2::new(0.5, 0.5), 1.0, Vector2::new(0.0, 0.48)));

        let pair = CollisionPair::new(ground, block);
        let (a, b) = (bodies.get(ground).unwrap(), bodies.get(block).unwrap());
        let contacts = collide(a, b, config.touching_tolerance);
        let arbiter = Arbiter::new(pair, contacts, a, b);
        (bodies, arbiter)
    }

    #[test]
    fn friction_is_geometric_mean() {
        let mut a = RigidBody::new_dynamic(Vector2::new(0.5, 0.5), 1.0, Vector2::zero());
        let mut b = a.clone();
        a.set_friction(0.25);
        b.set_friction(1.0);
        let arbiter = Arbiter::new(CollisionPair::new(BodyHandle(1), BodyHandle(2)), Vec::new(), &a, &b);
        assert_relative_eq!(arbiter.friction(), 0.5);
    }

    #[test]
    fn update_recombines_friction() {
        let config = SimulationConfig::default();
        let (mut bodies, mut arbiter) = resting_pair(&config);
        assert_relative_eq!(arbiter.friction(), 0.2);

        let (ground, block) = (arbiter.pair().body_a, arbiter.pair().body_b);
        bodies.get_mut(ground).unwrap().set_friction(0.8);
        bodies.get_mut(block).unwrap().set_friction(0.8);

        let (a, b) = (bodies.get(ground).unwrap(), bodies.get(block).unwrap());
        arbiter.update(collide(a, b, config.touching_tolerance), a, b, &config);
        assert_relative_eq!(arbiter.friction(), 0.8);
    }

    #[test]
    fn impulses_stay_within_cone() {
        let config = SimulationConfig::default();
        let (mut bodies, mut arbiter) = resting_pair(&config);
        let block = arbiter.pair().body_b;
        bodies.get_mut(block).unwrap().set_linear_velocity(Vector2::new(3.0, -2.0));

        arbiter.pre_step(&mut bodies, 60.0, &config).unwrap();
        for _ in 0..config.iterations {
            arbiter.apply_impulse(&mut bodies, &config).unwrap();
            for c in arbiter.contacts() {
                assert!(c.normal_impulse() >= 0.0);
                assert!(c.tangent_impulse().abs() <= arbiter.friction() * c.normal_impulse() + 1e-6);
            }
        }

        // Approach along the normal has been removed
        let v = bodies.get(block).unwrap().get_linear_velocity();
        assert!(v.y > -1e-3);
    }

    #[test]
    fn update_carries_impulses_by_feature() {
        let config = SimulationConfig::default();
        let (mut bodies, mut arbiter) = resting_pair(&config);
        arbiter.pre_step(&mut bodies, 60.0, &config).unwrap();
        arbiter.apply_impulse(&mut bodies, &config).unwrap();

        let before: Vec<f32> = arbiter.contacts().iter().map(|c| c.normal_impulse()).collect();
        assert!(before.iter().any(|pn| *pn > 0.0));

        let fresh = arbiter.contacts().iter().map(|c| Contact::new(c.position, c.normal, c.separation, c.feature)).collect();
        let (ground, block) = (arbiter.pair().body_a, arbiter.pair().body_b);
        arbiter.update(fresh, bodies.get(ground).unwrap(), bodies.get(block).unwrap(), &config);
        let after: Vec<f32> = arbiter.contacts().iter().map(|c| c.normal_impulse()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn update_without_warm_start_resets_impulses() {
        let config = SimulationConfig::default().with_flags(SolverFlags::ACCUMULATE_IMPULSES);
        let (mut bodies, mut arbiter) = resting_pair(&config);
        arbiter.pre_step(&mut bodies, 60.0, &config).unwrap();
        arbiter.apply_impulse(&mut bodies, &config).unwrap();

        let fresh = arbiter.contacts().iter().map(|c| Contact::new(c.position, c.normal, c.separation, c.feature)).collect();
        let (ground, block) = (arbiter.pair().body_a, arbiter.pair().body_b);
        arbiter.update(fresh, bodies.get(ground).unwrap(), bodies.get(block).unwrap(), &config);
        assert!(arbiter.contacts().iter().all(|c| c.normal_impulse() == 0.0));
    }

    #[test]
    fn frictionless_flag_removes_tangent_impulse() {
        let config = SimulationConfig::default().with_flags(SolverFlags::default() | SolverFlags::FRICTIONLESS);
        let (mut bodies, mut arbiter) = resting_pair(&config);
        let block = arbiter.pair().body_b;
        bodies.get_mut(block).unwrap().set_linear_velocity(Vector2::new(3.0, 0.0));

        arbiter.pre_step(&mut bodies, 60.0, &config).unwrap();
        arbiter.apply_impulse(&mut bodies, &config).unwrap();

        assert!(arbiter.contacts().iter().all(|c| c.tangent_impulse() == 0.0));
        assert_relative_eq!(bodies.get(block).unwrap().get_linear_velocity().x, 3.0, epsilon = 1e-5);
    }

    #[test]
    fn split_pass_moves_only_bias_velocity() {
        let config = SimulationConfig::default().with_flags(SolverFlags::default() | SolverFlags::SPLIT_IMPULSES);
        let (mut bodies, mut arbiter) = resting_pair(&config);
        let block = arbiter.pair().body_b;

        arbiter.pre_step(&mut bodies, 60.0, &config).unwrap();
        arbiter.apply_bias_impulse(&mut bodies, &config).unwrap();

        let body = bodies.get(block).unwrap();
        assert_eq!(body.get_linear_velocity(), Vector2::zero());
        assert!(body.bias_velocity_at(Vector2::zero()).y > 0.0);
        assert!(arbiter.contacts().iter().all(|c| c.bias_impulse() >= 0.0));
    }
}
