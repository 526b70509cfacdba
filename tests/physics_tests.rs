use phys2d_engine::{
    collision::{collide, Arbiter, CollisionPair},
    constraints::Constraint,
    core::{BodyStorage, CollisionEventType},
    BodyHandle, PhysicsWorld, RigidBody, SimulationConfig, SolverFlags, Vector2,
};
use approx::assert_relative_eq;
use rand::{rngs::StdRng, Rng, SeedableRng};

const DT: f32 = 1.0 / 60.0;

fn ground() -> RigidBody {
    RigidBody::new_static(Vector2::new(50.0, 10.0), Vector2::new(0.0, -10.0))
}

/// A single 200 kg unit box dropped onto the ground from a height of 4
fn drop_scene(flags: SolverFlags) -> (PhysicsWorld, BodyHandle, BodyHandle) {
    let config = SimulationConfig::default().with_flags(flags);
    let mut world = PhysicsWorld::with_config(config);
    let ground = world.add_body(ground()).unwrap();
    let block = world
        .add_body(RigidBody::new_dynamic(Vector2::new(0.5, 0.5), 200.0, Vector2::new(0.0, 4.0)))
        .unwrap();
    (world, ground, block)
}

/// A column of unit boxes resting on the ground
fn stack_scene(flags: SolverFlags, height: usize) -> (PhysicsWorld, Vec<BodyHandle>) {
    let config = SimulationConfig::default().with_flags(flags);
    let mut world = PhysicsWorld::with_config(config);
    world.add_body(ground()).unwrap();

    let handles = (0..height)
        .map(|i| {
            let y = 0.5 + i as f32 * 1.01;
            world
                .add_body(RigidBody::new_dynamic(Vector2::new(0.5, 0.5), 1.0, Vector2::new(0.0, y)))
                .unwrap()
        })
        .collect();
    (world, handles)
}

fn max_speed(world: &PhysicsWorld, handles: &[BodyHandle]) -> f32 {
    handles
        .iter()
        .map(|h| world.get_body(*h).unwrap().get_linear_velocity().length())
        .fold(0.0, f32::max)
}

#[test]
fn test_box_comes_to_rest_on_ground() {
    let (mut world, _, block) = drop_scene(SolverFlags::default());

    for _ in 0..120 {
        world.step(DT).unwrap();
    }

    let slop = world.config().allowed_penetration;
    let body = world.get_body(block).unwrap();
    // Position correction stops once penetration is down to the slop
    assert_relative_eq!(body.get_position().y, 0.5 - slop, epsilon = 1e-3);
    assert!(body.get_linear_velocity().length() < 0.05);
    assert_relative_eq!(body.get_rotation(), 0.0, epsilon = 1e-3);
}

#[test]
fn test_free_fall_matches_symplectic_euler() {
    let (mut world, _, block) = drop_scene(SolverFlags::default());
    let mut expected_velocity = 0.0;
    let mut expected_y = 4.0;

    for _ in 0..30 {
        world.step(DT).unwrap();
        expected_velocity -= 10.0 * DT;
        expected_y += expected_velocity * DT;
    }

    let body = world.get_body(block).unwrap();
    assert_relative_eq!(body.get_linear_velocity().y, expected_velocity, epsilon = 1e-4);
    assert_relative_eq!(body.get_position().y, expected_y, epsilon = 1e-4);
    assert_eq!(world.arbiter_count(), 0);
}

#[test]
fn test_static_bodies_never_move() {
    let (mut world, ground, _) = drop_scene(SolverFlags::default());
    let wall = world
        .add_body(RigidBody::new_static(Vector2::new(0.5, 5.0), Vector2::new(3.0, 5.0)))
        .unwrap();
    let before = [world.get_body(ground).unwrap().clone(), world.get_body(wall).unwrap().clone()];

    for _ in 0..200 {
        world.step(DT).unwrap();
    }

    for (handle, before) in [ground, wall].into_iter().zip(before.iter()) {
        let after = world.get_body(handle).unwrap();
        assert_eq!(after.get_position(), before.get_position());
        assert_eq!(after.get_rotation(), before.get_rotation());
        assert_eq!(after.get_linear_velocity(), Vector2::zero());
        assert_eq!(after.get_angular_velocity(), 0.0);
    }

    // Ground and wall overlap but never get an arbiter
    assert!(world.arbiter(ground, wall).is_none());
}

#[test]
fn test_joint_drift_stays_bounded() {
    let mut world = PhysicsWorld::new(Vector2::zero(), 10);
    let a = world
        .add_body(RigidBody::new_dynamic(Vector2::new(0.5, 0.5), 1.0, Vector2::new(-1.0, 0.0)))
        .unwrap();
    let b = world
        .add_body(RigidBody::new_dynamic(Vector2::new(0.5, 0.5), 1.0, Vector2::new(1.0, 0.0)))
        .unwrap();
    let joint = world.create_joint(a, b, Vector2::zero()).unwrap();

    world.get_body_mut(a).unwrap().set_linear_velocity(Vector2::new(-2.0, 0.0));
    world.get_body_mut(b).unwrap().set_linear_velocity(Vector2::new(2.0, 0.0));

    let mut max_drift: f32 = 0.0;
    for _ in 0..500 {
        world.step(DT).unwrap();
        let (anchor_a, anchor_b) = world.get_joint(joint).unwrap().world_anchors(world.bodies()).unwrap();
        max_drift = max_drift.max(anchor_a.distance(&anchor_b));
    }

    assert!(max_drift < 0.1, "max drift {}", max_drift);
    let (anchor_a, anchor_b) = world.get_joint(joint).unwrap().world_anchors(world.bodies()).unwrap();
    assert!(anchor_a.distance(&anchor_b) < 0.01);
}

#[test]
fn test_pendulum_swings_on_fixed_radius() {
    let mut world = PhysicsWorld::default();
    let support = world.add_body(ground()).unwrap();
    let bob = world
        .add_body(RigidBody::new_dynamic(Vector2::new(0.5, 0.5), 100.0, Vector2::new(9.0, 11.0)))
        .unwrap();
    let pivot = Vector2::new(0.0, 11.0);
    world.create_joint(support, bob, pivot).unwrap();

    for _ in 0..200 {
        world.step(DT).unwrap();
        let position = world.get_body(bob).unwrap().get_position();
        assert!((position.distance(&pivot) - 9.0).abs() < 0.2);
    }
    assert!(world.get_body(bob).unwrap().get_position().y < 11.0);
}

#[test]
fn test_soft_joint_drifts_more_than_rigid() {
    let max_drift = |softness: f32| {
        let mut world = PhysicsWorld::default();
        let support = world.add_body(ground()).unwrap();
        let bob = world
            .add_body(RigidBody::new_dynamic(Vector2::new(0.5, 0.5), 100.0, Vector2::new(9.0, 11.0)))
            .unwrap();
        let joint = world.create_joint(support, bob, Vector2::new(0.0, 11.0)).unwrap();
        world.get_joint_mut(joint).unwrap().set_softness(softness);

        let mut max_drift: f32 = 0.0;
        for _ in 0..120 {
            world.step(DT).unwrap();
            let (anchor_a, anchor_b) = world.get_joint(joint).unwrap().world_anchors(world.bodies()).unwrap();
            max_drift = max_drift.max(anchor_a.distance(&anchor_b));
        }
        max_drift
    };

    let rigid = max_drift(0.0);
    let soft = max_drift(1.0);
    assert!(soft > 0.1, "soft {}", soft);
    assert!(soft > 2.0 * rigid, "soft {} rigid {}", soft, rigid);
}

#[test]
fn test_warm_starting_settles_stack_faster() {
    // A single resting box settles within the same number of steps with or
    // without warm starting, so convergence is compared on a stack
    let cold_flags = SolverFlags::ACCUMULATE_IMPULSES | SolverFlags::POSITION_CORRECTION;

    let jitter = |flags: SolverFlags| {
        let (mut world, handles) = stack_scene(flags, 6);
        let mut total = 0.0;
        for step in 0..300 {
            world.step(DT).unwrap();
            if step >= 60 {
                total += handles
                    .iter()
                    .map(|h| world.get_body(*h).unwrap().get_linear_velocity().length())
                    .sum::<f32>();
            }
        }
        total
    };

    let warm = jitter(SolverFlags::default());
    let cold = jitter(cold_flags);
    assert!(warm < cold, "warm {} cold {}", warm, cold);
}

#[test]
fn test_paused_step_is_idempotent() {
    let (mut world, _, block) = drop_scene(SolverFlags::ACCUMULATE_IMPULSES | SolverFlags::WARM_STARTING);
    for _ in 0..120 {
        world.step(DT).unwrap();
    }
    let before = world.get_body(block).unwrap().clone();

    for _ in 0..20 {
        world.step(0.0).unwrap();
    }

    let after = world.get_body(block).unwrap();
    assert_eq!(after.get_position(), before.get_position());
    assert_eq!(after.get_rotation(), before.get_rotation());
    assert_relative_eq!(after.get_linear_velocity(), before.get_linear_velocity(), epsilon = 1e-3);
    assert_relative_eq!(after.get_angular_velocity(), before.get_angular_velocity(), epsilon = 1e-3);
}

#[test]
fn test_random_stacks_respect_impulse_clamps() {
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..5 {
        let mut world = PhysicsWorld::default();
        world.add_body(ground()).unwrap();

        let mut y = 0.0;
        for _ in 0..rng.gen_range(2..8) {
            let half = Vector2::new(rng.gen_range(0.2..1.5), rng.gen_range(0.2..0.8));
            let x = rng.gen_range(-0.3..0.3);
            let mut body = RigidBody::new_dynamic(half, rng.gen_range(0.5..50.0), Vector2::new(x, y + half.y));
            body.set_friction(rng.gen_range(0.0..1.0));
            body.set_rotation(rng.gen_range(-0.1..0.1));
            world.add_body(body).unwrap();
            y += 2.0 * half.y + 0.05;
        }

        for _ in 0..120 {
            world.step(DT).unwrap();
            for arbiter in world.arbiters() {
                assert!(arbiter.num_contacts() <= 2);
                for contact in arbiter.contacts() {
                    assert!(contact.normal_impulse() >= 0.0);
                    assert!(
                        contact.tangent_impulse().abs() <= arbiter.friction() * contact.normal_impulse() + 1e-4,
                        "friction {} pt {} pn {}",
                        arbiter.friction(),
                        contact.tangent_impulse(),
                        contact.normal_impulse()
                    );
                }
            }
        }

        for (_, body) in world.bodies().iter() {
            assert!(body.get_position().is_finite());
            assert!(body.get_rotation().is_finite());
        }
    }
}

#[test]
fn test_feature_ids_and_warm_start_carry_over() {
    let config = SimulationConfig::default();
    let mut bodies = BodyStorage::new();
    let ground = bodies.add(ground());
    let block = bodies.add(RigidBody::new_dynamic(Vector2::new(0.5, 0.5), 1.0, Vector2::new(0.2, 0.48)));
    let pair = CollisionPair::new(ground, block);

    let contacts = collide(bodies.get(ground).unwrap(), bodies.get(block).unwrap(), 0.0);
    let mut arbiter = Arbiter::new(pair, contacts, bodies.get(ground).unwrap(), bodies.get(block).unwrap());

    arbiter.pre_step(&mut bodies, 1.0 / DT, &config).unwrap();
    for _ in 0..config.iterations {
        arbiter.apply_impulse(&mut bodies, &config).unwrap();
    }
    let first: Vec<_> = arbiter.contacts().iter().map(|c| (c.feature, c.normal_impulse())).collect();

    // Geometry is unchanged because positions were never integrated
    let contacts = collide(bodies.get(ground).unwrap(), bodies.get(block).unwrap(), 0.0);
    arbiter.update(contacts, bodies.get(ground).unwrap(), bodies.get(block).unwrap(), &config);
    arbiter.pre_step(&mut bodies, 1.0 / DT, &config).unwrap();
    let second: Vec<_> = arbiter.contacts().iter().map(|c| (c.feature, c.normal_impulse())).collect();

    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
}

#[test]
fn test_collision_events_follow_contact() {
    let (mut world, ground, block) = drop_scene(SolverFlags::default());

    let mut begin_step = None;
    for step in 0..120 {
        world.step(DT).unwrap();
        if !world.events().get_collision_events_of_type(CollisionEventType::Begin).is_empty() {
            assert!(begin_step.is_none(), "contact began twice");
            begin_step = Some(step);
        }
        assert!(world.events().get_collision_events_of_type(CollisionEventType::End).is_empty());
    }

    assert!(begin_step.is_some());
    assert_eq!(world.events().get_collision_events_for_body(block).len(), 0);
    assert!(world.arbiter(block, ground).is_some());
}

#[test]
fn test_stack_holds_with_default_settings() {
    let (mut world, handles) = stack_scene(SolverFlags::default(), 5);
    for _ in 0..300 {
        world.step(DT).unwrap();
    }

    assert!(max_speed(&world, &handles) < 0.05);
    for (i, handle) in handles.iter().enumerate() {
        let position = world.get_body(*handle).unwrap().get_position();
        assert!(position.x.abs() < 0.05);
        assert!((position.y - (0.5 + i as f32)).abs() < 0.1);
    }
}

#[test]
fn test_split_impulses_recover_penetration_without_bounce() {
    let (mut world, _, block) = drop_scene(SolverFlags::default() | SolverFlags::SPLIT_IMPULSES);

    for _ in 0..180 {
        world.step(DT).unwrap();
    }

    let body = world.get_body(block).unwrap();
    assert!((body.get_position().y - 0.5).abs() < 0.02, "y = {}", body.get_position().y);
    assert!(body.get_linear_velocity().length() < 0.05);
}

#[test]
fn test_frictionless_contact_keeps_sliding() {
    let (mut world, _, block) = drop_scene(SolverFlags::default() | SolverFlags::FRICTIONLESS);
    world.get_body_mut(block).unwrap().set_position(Vector2::new(0.0, 0.5));
    world.get_body_mut(block).unwrap().set_linear_velocity(Vector2::new(2.0, 0.0));

    for _ in 0..60 {
        world.step(DT).unwrap();
    }
    assert_relative_eq!(world.get_body(block).unwrap().get_linear_velocity().x, 2.0, epsilon = 1e-3);

    // Same slide with friction stops the box
    world.set_flag(SolverFlags::FRICTIONLESS, false);
    for _ in 0..120 {
        world.step(DT).unwrap();
    }
    assert!(world.get_body(block).unwrap().get_linear_velocity().x.abs() < 1e-3);
}
