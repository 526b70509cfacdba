use crate::bodies::RigidBody;
use crate::collision::collision_pair::CollisionPair;
use crate::core::BodyHandle;
use crate::math::Aabb;

/// Trait for broad-phase collision detection algorithms
pub trait BroadPhase {
    /// Updates the broad-phase with the current body states
    fn update(&mut self, bodies: &[(BodyHandle, &RigidBody)]);

    /// Gets all potential collision pairs, in ascending handle order
    fn get_collision_pairs(&self) -> Vec<CollisionPair>;
}

/// Tests every pair of bodies, skipping pairs where both are static.
///
/// Bounding boxes are only a prefilter: boxes whose AABBs are further apart
/// than the touching tolerance cannot produce contacts, so dropping them
/// never changes what the narrow phase reports.
#[derive(Debug, Default)]
pub struct BruteForceBroadPhase {
    /// Margin added around every bounding box
    margin: f32,

    /// The bodies in the broad-phase
    bodies: Vec<Proxy>,
}

#[derive(Debug, Clone, Copy)]
struct Proxy {
    handle: BodyHandle,
    aabb: Aabb,
    is_static: bool,
}

impl BruteForceBroadPhase {
    /// Creates a new brute-force broad-phase
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a broad-phase that keeps pairs up to `margin` apart
    pub fn with_margin(margin: f32) -> Self {
        Self {
            margin: margin.max(0.0),
            bodies: Vec::new(),
        }
    }

    /// Sets the margin added around every bounding box
    pub fn set_margin(&mut self, margin: f32) {
        self.margin = margin.max(0.0);
    }
}

impl BroadPhase for BruteForceBroadPhase {
    fn update(&mut self, bodies: &[(BodyHandle, &RigidBody)]) {
        self.bodies.clear();
        let margin = self.margin;
        self.bodies.extend(bodies.iter().filter_map(|(handle, body)| {
            let aabb = Aabb::from_points(&body.vertices())?;
            Some(Proxy {
                handle: *handle,
                aabb: aabb.expand(margin),
                is_static: body.is_static(),
            })
        }));
        self.bodies.sort_by_key(|proxy| proxy.handle);
    }

    fn get_collision_pairs(&self) -> Vec<CollisionPair> {
        let mut pairs = Vec::new();

        for (i, a) in self.bodies.iter().enumerate() {
            for b in &self.bodies[i + 1..] {
                if a.is_static && b.is_static {
                    continue;
                }

                if a.aabb.intersects(&b.aabb) {
                    pairs.push(CollisionPair::new(a.handle, b.handle));
                }
            }
        }

        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vector2;

    #[test]
    fn static_pairs_are_skipped() {
        let ground = RigidBody::new_static(Vector2::new(5.0, 0.5), Vector2::zero());
        let wall = RigidBody::new_static(Vector2::new(0.5, 5.0), Vector2::zero());
        let crate_box = RigidBody::new_dynamic(Vector2::new(0.5, 0.5), 1.0, Vector2::new(0.0, 0.9));

        let mut broad_phase = BruteForceBroadPhase::new();
        broad_phase.update(&[
            (BodyHandle(1), &ground),
            (BodyHandle(2), &wall),
            (BodyHandle(3), &crate_box),
        ]);

        let pairs = broad_phase.get_collision_pairs();
        assert_eq!(
            pairs,
            vec![
                CollisionPair::new(BodyHandle(1), BodyHandle(3)),
                CollisionPair::new(BodyHandle(2), BodyHandle(3)),
            ]
        );
    }

    #[test]
    fn margin_keeps_nearly_touching_pairs() {
        let a = RigidBody::new_dynamic(Vector2::new(0.5, 0.5), 1.0, Vector2::zero());
        let b = RigidBody::new_dynamic(Vector2::new(0.5, 0.5), 1.0, Vector2::new(1.05, 0.0));

        let mut broad_phase = BruteForceBroadPhase::new();
        broad_phase.update(&[(BodyHandle(1), &a), (BodyHandle(2), &b)]);
        assert!(broad_phase.get_collision_pairs().is_empty());

        broad_phase.set_margin(0.05);
        broad_phase.update(&[(BodyHandle(1), &a), (BodyHandle(2), &b)]);
        assert_eq!(broad_phase.get_collision_pairs().len(), 1);
    }
}
