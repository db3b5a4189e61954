//! Motion integrator.
//!
//! This is the per-step entry point. It samples the ground, integrates
//! velocity from input, friction, grip-gated force/impulse and gravity, asks
//! the body mover to move, then resolves Grounded/Falling from the outcome.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::body::{yaw_only, AgentBody};
use crate::collision::{Hit, QueryFilter, TraceShape};
use crate::query::{BodyMover, GroundQuery, InputSource};
use crate::sensing::{GroundSample, GroundSensor};

use super::config::MotionConfig;
use super::slide_move::project_onto_plane;
use super::state::{MotionState, SupportEvent, SupportTransition};

/// What happened during one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    /// Step length after clamping.
    pub delta_time: f32,

    /// Ground sample taken at the start of the step.
    pub ground: GroundSample,

    /// Orientation the body was blended toward.
    pub target_rotation: Quat,

    /// Orientation the body was moved with.
    pub rotation: Quat,

    /// Net acceleration from input and friction.
    pub acceleration: Vec3,

    /// Displacement requested from the mover.
    pub displacement: Vec3,

    /// Result of the main move.
    pub move_hit: Hit,

    /// Fraction of the slide applied after a blocking hit.
    pub slide_fraction: Option<f32>,

    /// Ground hit the body was snapped onto, if a snap happened.
    pub snap: Option<Hit>,

    /// Result of the move onto the snap hit. Blocking when something sat
    /// between the body and the ground.
    pub snap_move: Option<Hit>,

    /// Support changes, in the order they happened.
    pub transitions: Vec<SupportTransition>,
}

impl StepReport {
    #[inline]
    pub fn snapped(&self) -> bool {
        self.snap.is_some()
    }
}

/// Steps agents over terrain.
///
/// The integrator holds only configuration, so one instance can drive any
/// number of agents. Each agent brings its own [`MotionState`], input and
/// body mover.
///
/// # Example
///
/// ```ignore
/// let integrator = MotionIntegrator::new(MotionConfig::default());
/// let mut state = MotionState::new();
/// let mut body = KinematicBody::new(spawn, 10.0);
///
/// // Each tick:
/// integrator.step(&mut state, delta_time, &mut input, &world, &mut body.mover(&world));
/// ```
#[derive(Debug, Clone)]
pub struct MotionIntegrator {
    pub config: MotionConfig,
    pub sensor: GroundSensor,
}

impl Default for MotionIntegrator {
    fn default() -> Self {
        Self::new(MotionConfig::default())
    }
}

impl MotionIntegrator {
    /// Create an integrator; the sensor uses `config.sensor`.
    pub fn new(config: MotionConfig) -> Self {
        let sensor = GroundSensor::new(config.sensor);
        Self { config, sensor }
    }

    /// Advance one agent by `delta_time` seconds.
    ///
    /// `delta_time` is used as given, bounded by `max_delta_time` only when
    /// one is configured. Negative or non-finite steps count as zero.
    ///
    /// The step never fails: missed probes fall back locally and a lost
    /// ground snap simply makes the agent fall.
    pub fn step<Q, M, I>(
        &self,
        state: &mut MotionState,
        delta_time: f32,
        input: &mut I,
        world: &Q,
        mover: &mut M,
    ) -> StepReport
    where
        Q: GroundQuery + ?Sized,
        M: BodyMover + ?Sized,
        I: InputSource + ?Sized,
    {
        let config = &self.config;
        let dt = config.effective_delta_time(delta_time);
        let mut transitions = Vec::new();

        let input = input.consume_input_vector().clamp_length_max(1.0);
        let filter = self.ground_filter(mover.owner());

        // ====================================================================
        // Orientation
        // ====================================================================
        let body = *mover.body();
        let ground = self.sensor.sample(&body, world, &filter);

        let target_rotation = if state.is_falling() {
            yaw_only(ground.orientation)
        } else {
            ground.orientation
        };
        let rotation = config.orientation_blend.blend(body.rotation, target_rotation, dt);

        // ====================================================================
        // Acceleration and friction
        // ====================================================================
        let up = body.up();
        let friction = project_onto_plane(state.velocity * config.friction_coefficient, up);
        let acceleration = input * config.input_acceleration - friction * dt;
        state.acceleration = acceleration;

        // ====================================================================
        // Grip gate
        // ====================================================================
        let (impulse, force) = state.take_pending();
        if (impulse + force).length() > config.grip_strength {
            state.velocity += impulse + force * dt;
            transitions.extend(state.apply(SupportEvent::GripOvercome, config.regrounding_speed));
        }

        // ====================================================================
        // Integration
        // ====================================================================
        if state.is_falling() && config.enable_gravity {
            state.velocity += Vec3::new(0.0, 0.0, config.gravity_z) * dt;
        }

        state.velocity = (state.velocity + acceleration * dt).clamp_length_max(config.velocity_clamp);
        let displacement = state.velocity * dt;

        // ====================================================================
        // Move and resolve support
        // ====================================================================
        let move_hit = mover.move_with_collision(displacement, rotation);
        let mut slide_fraction = None;
        let mut snap = None;
        let mut snap_move = None;

        if move_hit.blocking {
            let speed = state.velocity.length();
            transitions.extend(state.apply(SupportEvent::BlockingHit { speed }, config.regrounding_speed));

            let normal = move_hit.normal_or_up();
            state.velocity = project_onto_plane(state.velocity, normal);
            slide_fraction = Some(mover.slide_along_surface(displacement, 1.0 - move_hit.time, normal));
        } else if !state.is_falling() {
            match self.probe_ground(world, mover.body(), &filter) {
                Some(ground_hit) => {
                    let position = mover.body().position;
                    let hold = mover.body().rotation;
                    let snap_hit = mover.move_with_collision(ground_hit.location - position, hold);
                    state.velocity = project_onto_plane(state.velocity, ground_hit.normal_or_up());
                    if snap_hit.blocking {
                        state.velocity = project_onto_plane(state.velocity, snap_hit.normal_or_up());
                    }
                    snap_move = Some(snap_hit);

                    transitions.extend(state.apply(SupportEvent::Snapped, config.regrounding_speed));
                    snap = Some(ground_hit);
                }
                None => {
                    transitions.extend(state.apply(SupportEvent::SnapMissed, config.regrounding_speed));
                }
            }
        }

        log::trace!(
            "step dt={:.4} pos={:?} vel={:?} support={:?} hit={} snapped={}",
            dt,
            mover.body().position,
            state.velocity,
            state.support,
            move_hit.blocking,
            snap.is_some()
        );

        StepReport {
            delta_time: dt,
            ground,
            target_rotation,
            rotation,
            acceleration,
            displacement,
            move_hit,
            slide_fraction,
            snap,
            snap_move,
            transitions,
        }
    }

    /// Sweep a small sphere down from the body and return the blocking hit.
    fn probe_ground<Q>(&self, world: &Q, body: &AgentBody, filter: &QueryFilter) -> Option<Hit>
    where
        Q: GroundQuery + ?Sized,
    {
        let start = body.position;
        let end = start - body.up() * self.config.snap_probe_depth;
        let shape = TraceShape::sphere(self.config.snap_probe_radius);

        world
            .sweep_multi(shape, start, end, filter)
            .into_iter()
            .rev()
            .find(|hit| hit.blocking)
    }

    fn ground_filter(&self, owner: Option<u32>) -> QueryFilter {
        match owner {
            Some(owner) => self.config.filter.ignoring(owner),
            None => self.config.filter,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{CollisionWorld, ContentFlags};
    use crate::movement::{KinematicBody, Support};

    const DT: f32 = 0.016;
    const TOLERANCE: f32 = 1e-3;

    fn floor_world() -> CollisionWorld {
        let mut world = CollisionWorld::new();
        world.add_box(
            Vec3::new(0.0, 0.0, -50.0),
            Vec3::new(5000.0, 5000.0, 50.0),
            ContentFlags::SOLID,
        );
        world
    }

    fn resting_body() -> KinematicBody {
        KinematicBody::new(Vec3::new(0.0, 0.0, 10.5), 10.0)
    }

    fn step(
        integrator: &MotionIntegrator,
        state: &mut MotionState,
        input: Vec3,
        world: &CollisionWorld,
        body: &mut KinematicBody,
        dt: f32,
    ) -> StepReport {
        let mut input = input;
        integrator.step(state, dt, &mut input, world, &mut body.mover(world))
    }

    /// Mover that records requests and reports a fixed hit, or `snap_hit`
    /// for every move after the first.
    struct ScriptedMover {
        body: AgentBody,
        hit: Hit,
        snap_hit: Option<Hit>,
        moves: Vec<Vec3>,
        slides: Vec<(Vec3, f32, Vec3)>,
    }

    impl ScriptedMover {
        fn new(hit: Hit) -> Self {
            Self {
                body: AgentBody::new(Vec3::new(0.0, 0.0, 500.0)),
                hit,
                snap_hit: None,
                moves: Vec::new(),
                slides: Vec::new(),
            }
        }
    }

    impl BodyMover for ScriptedMover {
        fn body(&self) -> &AgentBody {
            &self.body
        }

        fn move_with_collision(&mut self, delta: Vec3, rotation: Quat) -> Hit {
            self.moves.push(delta);
            self.body.rotation = rotation;
            match self.snap_hit {
                Some(hit) if self.moves.len() > 1 => hit,
                _ => self.hit,
            }
        }

        fn slide_along_surface(&mut self, delta: Vec3, time: f32, normal: Vec3) -> f32 {
            self.slides.push((delta, time, normal));
            1.0
        }
    }

    // ========================================================================
    // Grip gate
    // ========================================================================

    #[test]
    fn test_grip_absorbs_small_force() {
        let world = floor_world();
        let integrator = MotionIntegrator::default();

        for (impulse, force) in [
            (Vec3::new(50.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -40.0)),
            (Vec3::ZERO, Vec3::new(0.0, 0.0, -100.0)),
            (Vec3::new(60.0, 0.0, 0.0), Vec3::new(0.0, 80.0, 0.0)),
        ] {
            let mut state = MotionState::new();
            let mut body = resting_body();
            state.add_impulse(impulse);
            state.add_force(force);

            let report = step(&integrator, &mut state, Vec3::ZERO, &world, &mut body, DT);

            assert!(state.velocity().length() < TOLERANCE, "velocity={:?}", state.velocity());
            assert!(!state.is_falling());
            assert!(!report.transitions.iter().any(|t| t.event == SupportEvent::GripOvercome));
        }
    }

    #[test]
    fn test_grip_overcome_detaches() {
        let world = CollisionWorld::new();
        let integrator = MotionIntegrator::new(MotionConfig {
            enable_gravity: false,
            ..Default::default()
        });
        let mut state = MotionState::new();
        let mut body = resting_body();

        state.add_impulse(Vec3::new(150.0, 0.0, 0.0));
        state.add_force(Vec3::new(0.0, 0.0, 1000.0));
        let report = step(&integrator, &mut state, Vec3::ZERO, &world, &mut body, DT);

        assert!(state.is_falling());
        assert_eq!(report.transitions[0].event, SupportEvent::GripOvercome);
        let expected = Vec3::new(150.0, 0.0, 1000.0 * DT);
        assert!((state.velocity() - expected).length() < TOLERANCE, "velocity={:?}", state.velocity());
    }

    #[test]
    fn test_pending_buffers_cleared_every_step() {
        let world = floor_world();
        let integrator = MotionIntegrator::default();

        for force in [Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 5000.0)] {
            let mut state = MotionState::new();
            let mut body = resting_body();
            state.add_force(force);
            state.add_impulse(force * 0.5);

            step(&integrator, &mut state, Vec3::ZERO, &world, &mut body, DT);

            assert_eq!(state.pending_force(), Vec3::ZERO);
            assert_eq!(state.pending_impulse(), Vec3::ZERO);
        }
    }

    // ========================================================================
    // Integration
    // ========================================================================

    #[test]
    fn test_speed_clamped() {
        let world = CollisionWorld::new();
        let integrator = MotionIntegrator::default();

        for impulse in [
            Vec3::new(10_000.0, 0.0, 0.0),
            Vec3::new(-4000.0, 4000.0, 4000.0),
            Vec3::new(0.0, 0.0, -1.0e6),
        ] {
            let mut state = MotionState::new();
            let mut body = resting_body();
            state.add_impulse(impulse);

            step(&integrator, &mut state, Vec3::X, &world, &mut body, DT);

            assert!(
                state.velocity().length() <= 3000.0 + TOLERANCE,
                "speed={}",
                state.velocity().length()
            );
        }
    }

    #[test]
    fn test_at_rest_on_flat_ground() {
        let world = floor_world();
        let integrator = MotionIntegrator::default();
        let mut state = MotionState::new();
        let mut body = resting_body();
        let start = body.position();

        let report = step(&integrator, &mut state, Vec3::ZERO, &world, &mut body, DT);

        assert!(report.displacement.length() < TOLERANCE);
        assert!(!state.is_falling());
        assert!(report.snapped());
        assert!((body.position() - start).length() < 1.0, "position={:?}", body.position());
        assert!(body.body.rotation.angle_between(Quat::IDENTITY) < TOLERANCE);
    }

    #[test]
    fn test_airborne_gravity() {
        let world = CollisionWorld::new();
        let integrator = MotionIntegrator::default();
        let mut state = MotionState::with_support(Support::Falling);
        let mut body = KinematicBody::new(Vec3::new(0.0, 0.0, 1000.0), 10.0);

        let report = step(&integrator, &mut state, Vec3::ZERO, &world, &mut body, DT);

        assert!((state.velocity().z + 980.0 * DT).abs() < TOLERANCE, "vz={}", state.velocity().z);
        assert!(state.velocity().truncate().length() < TOLERANCE);
        assert!(state.is_falling());
        assert!(!report.snapped());
    }

    #[test]
    fn test_knockback_detaches_and_falls() {
        let world = CollisionWorld::new();
        let integrator = MotionIntegrator::default();
        let mut state = MotionState::new();
        let mut body = KinematicBody::new(Vec3::new(0.0, 0.0, 1000.0), 10.0);

        state.add_force(Vec3::new(0.0, 0.0, -5000.0));
        step(&integrator, &mut state, Vec3::ZERO, &world, &mut body, DT);

        assert!(state.is_falling());
        // Knockback plus the gravity of the step it started falling in
        let expected = -5000.0 * DT - 980.0 * DT;
        assert!((state.velocity().z - expected).abs() < TOLERANCE, "vz={}", state.velocity().z);
    }

    #[test]
    fn test_knockback_without_gravity_is_exact() {
        let world = CollisionWorld::new();
        let integrator = MotionIntegrator::new(MotionConfig {
            enable_gravity: false,
            ..Default::default()
        });
        let mut state = MotionState::new();
        let mut body = KinematicBody::new(Vec3::new(0.0, 0.0, 1000.0), 10.0);

        state.add_force(Vec3::new(0.0, 0.0, -5000.0));
        step(&integrator, &mut state, Vec3::ZERO, &world, &mut body, DT);

        assert!(state.is_falling());
        assert!((state.velocity() - Vec3::new(0.0, 0.0, -80.0)).length() < TOLERANCE);
    }

    #[test]
    fn test_input_is_clamped_and_consumed() {
        let world = floor_world();
        let integrator = MotionIntegrator::default();
        let mut state = MotionState::new();
        let mut body = resting_body();
        let mut input = Vec3::new(3.0, 4.0, 0.0);

        let report = integrator.step(&mut state, DT, &mut input, &world, &mut body.mover(&world));

        assert_eq!(input, Vec3::ZERO);
        let expected = Vec3::new(0.6, 0.8, 0.0) * 10_000.0;
        assert!((report.acceleration - expected).length() < 0.1, "acc={:?}", report.acceleration);
    }

    #[test]
    fn test_friction_only_acts_in_ground_plane() {
        let world = CollisionWorld::new();
        let integrator = MotionIntegrator::new(MotionConfig {
            enable_gravity: false,
            ..Default::default()
        });
        let mut state = MotionState::with_support(Support::Falling);
        state.set_velocity(Vec3::new(100.0, 0.0, 50.0));
        let mut body = KinematicBody::new(Vec3::new(0.0, 0.0, 1000.0), 10.0);

        let report = step(&integrator, &mut state, Vec3::ZERO, &world, &mut body, DT);

        assert!((report.acceleration.x + 100.0 * 1000.0 * DT).abs() < 0.1);
        assert_eq!(report.acceleration.z, 0.0);
        assert!((state.velocity().z - 50.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_walking_reaches_steady_speed() {
        let world = floor_world();
        let integrator = MotionIntegrator::default();
        let mut state = MotionState::new();
        let mut body = resting_body();

        for _ in 0..240 {
            step(&integrator, &mut state, Vec3::X, &world, &mut body, DT);
        }

        // Input and friction balance at input_acceleration / (friction * dt)
        let steady = 10_000.0 / (1000.0 * DT);
        assert!((state.velocity().x - steady).abs() < 1.0, "vx={}", state.velocity().x);
        assert!(!state.is_falling());
        assert!((body.position().z - 10.0).abs() < 0.1, "z={}", body.position().z);
    }

    #[test]
    fn test_long_step_uses_full_delta_time() {
        let world = CollisionWorld::new();
        let integrator = MotionIntegrator::default();
        let mut state = MotionState::with_support(Support::Falling);
        let mut body = KinematicBody::new(Vec3::new(0.0, 0.0, 1000.0), 10.0);

        let report = step(&integrator, &mut state, Vec3::ZERO, &world, &mut body, 0.05);

        assert_eq!(report.delta_time, 0.05);
        assert!((state.velocity().z + 49.0).abs() < TOLERANCE, "vz={}", state.velocity().z);
        assert!((body.position().z - (1000.0 - 49.0 * 0.05)).abs() < 0.01, "z={}", body.position().z);
    }

    #[test]
    fn test_long_step_knockback_scales_with_delta_time() {
        let world = CollisionWorld::new();
        let integrator = MotionIntegrator::new(MotionConfig {
            enable_gravity: false,
            ..Default::default()
        });
        let mut state = MotionState::new();
        let mut body = KinematicBody::new(Vec3::new(0.0, 0.0, 1000.0), 10.0);

        state.add_force(Vec3::new(0.0, 0.0, -5000.0));
        step(&integrator, &mut state, Vec3::ZERO, &world, &mut body, 0.05);

        assert!(state.is_falling());
        assert!((state.velocity().z + 250.0).abs() < TOLERANCE, "vz={}", state.velocity().z);
    }

    #[test]
    fn test_delta_time_clamped_when_bounded() {
        let world = CollisionWorld::new();
        let integrator = MotionIntegrator::new(MotionConfig {
            max_delta_time: Some(0.04),
            ..Default::default()
        });
        let mut state = MotionState::with_support(Support::Falling);
        let mut body = KinematicBody::new(Vec3::new(0.0, 0.0, 1000.0), 10.0);

        let report = step(&integrator, &mut state, Vec3::ZERO, &world, &mut body, 5.0);
        assert_eq!(report.delta_time, 0.04);
        assert!((state.velocity().z + 980.0 * 0.04).abs() < TOLERANCE);

        let report = step(&integrator, &mut state, Vec3::ZERO, &world, &mut body, -1.0);
        assert_eq!(report.delta_time, 0.0);

        let report = step(&integrator, &mut state, Vec3::ZERO, &world, &mut body, f32::NAN);
        assert_eq!(report.delta_time, 0.0);
    }

    // ========================================================================
    // Collision response
    // ========================================================================

    #[test]
    fn test_slow_landing_regrounds() {
        let world = floor_world();
        let integrator = MotionIntegrator::default();
        let mut state = MotionState::with_support(Support::Falling);
        state.set_velocity(Vec3::new(0.0, 0.0, -500.0));
        let mut body = KinematicBody::new(Vec3::new(0.0, 0.0, 12.0), 10.0);

        let report = step(&integrator, &mut state, Vec3::ZERO, &world, &mut body, DT);

        assert!(report.move_hit.blocking);
        assert!(!state.is_falling());
        assert_eq!(report.transitions.last().map(|t| t.to), Some(Support::Grounded));
        assert!(state.velocity().z.abs() < TOLERANCE, "velocity along the floor normal is removed");
        assert!(body.position().z >= 10.0);
    }

    #[test]
    fn test_fast_landing_stays_falling() {
        let world = floor_world();
        let integrator = MotionIntegrator::default();
        let mut state = MotionState::with_support(Support::Falling);
        state.set_velocity(Vec3::new(1500.0, 0.0, -1500.0));
        let mut body = KinematicBody::new(Vec3::new(0.0, 0.0, 12.0), 10.0);

        let report = step(&integrator, &mut state, Vec3::ZERO, &world, &mut body, DT);

        assert!(report.move_hit.blocking);
        assert!(state.is_falling());
        assert!(report.transitions.is_empty());
    }

    #[test]
    fn test_fast_hit_keeps_grounded_agent_grounded() {
        let integrator = MotionIntegrator::default();
        let mut state = MotionState::new();
        state.set_velocity(Vec3::new(2000.0, 0.0, 0.0));
        let mut mover = ScriptedMover::new(Hit::blocking(0.25, Vec3::ZERO, Vec3::NEG_X));
        let world = CollisionWorld::new();
        let mut input = Vec3::ZERO;

        integrator.step(&mut state, DT, &mut input, &world, &mut mover);

        assert!(!state.is_falling());
    }

    #[test]
    fn test_blocking_hit_requests_slide() {
        let integrator = MotionIntegrator::new(MotionConfig {
            friction_coefficient: 0.0,
            ..Default::default()
        });
        let mut state = MotionState::with_support(Support::Falling);
        state.set_velocity(Vec3::new(500.0, 300.0, 0.0));
        let mut mover = ScriptedMover::new(Hit::blocking(0.25, Vec3::ZERO, Vec3::NEG_X));
        let world = CollisionWorld::new();
        let mut input = Vec3::ZERO;

        let report = integrator.step(&mut state, DT, &mut input, &world, &mut mover);

        assert_eq!(mover.slides.len(), 1);
        let (delta, time, normal) = mover.slides[0];
        assert_eq!(delta, report.displacement);
        assert!((time - 0.75).abs() < 1e-6);
        assert_eq!(normal, Vec3::NEG_X);
        assert_eq!(report.slide_fraction, Some(1.0));
        assert!(state.velocity().x.abs() < TOLERANCE);
        assert!((state.velocity().y - 300.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_slide_along_wall() {
        let mut world = floor_world();
        world.add_box(Vec3::new(110.0, 0.0, 50.0), Vec3::new(10.0, 1000.0, 50.0), ContentFlags::SOLID);
        let integrator = MotionIntegrator::default();
        let mut state = MotionState::new();
        let mut body = KinematicBody::new(Vec3::new(60.0, 0.0, 10.5), 10.0);

        let diagonal = Vec3::new(1.0, 1.0, 0.0).normalize();
        for _ in 0..60 {
            step(&integrator, &mut state, diagonal, &world, &mut body, DT);
        }

        let position = body.position();
        assert!(position.x < 90.0, "x={}", position.x);
        assert!(position.y > 100.0, "y={}", position.y);
        assert!(!state.is_falling());
    }

    // ========================================================================
    // Ground snap
    // ========================================================================

    #[test]
    fn test_snap_follows_step_down() {
        let mut world = CollisionWorld::new();
        // Upper floor ending at x=0, lower floor 15 below
        world.add_box(Vec3::new(-500.0, 0.0, -50.0), Vec3::new(500.0, 500.0, 50.0), ContentFlags::SOLID);
        world.add_box(Vec3::new(500.0, 0.0, -65.0), Vec3::new(500.0, 500.0, 50.0), ContentFlags::SOLID);
        let integrator = MotionIntegrator::default();
        let mut state = MotionState::new();
        let mut body = KinematicBody::new(Vec3::new(-30.0, 0.0, 10.5), 10.0);

        for _ in 0..30 {
            step(&integrator, &mut state, Vec3::X, &world, &mut body, DT);
            assert!(!state.is_falling(), "fell at {:?}", body.position());
        }

        assert!(body.position().x > 20.0);
        assert!((body.position().z + 5.0).abs() < 0.5, "z={}", body.position().z);
    }

    #[test]
    fn test_snap_miss_without_ground_below_falls() {
        let world = floor_world();
        let integrator = MotionIntegrator::default();
        let mut state = MotionState::new();
        // Grounded, but the floor is out of reach of the snap sweep
        let mut body = KinematicBody::new(Vec3::new(0.0, 0.0, 100.0), 10.0);
        let start = body.position();

        let report = step(&integrator, &mut state, Vec3::ZERO, &world, &mut body, DT);

        assert!(!report.move_hit.blocking);
        assert!(!report.snapped());
        assert!(state.is_falling());
        assert_eq!(report.transitions.len(), 1);
        assert_eq!(report.transitions[0].event, SupportEvent::SnapMissed);
        assert_eq!(report.transitions[0].from, Support::Grounded);
        assert_eq!(report.transitions[0].to, Support::Falling);
        assert_eq!(body.position(), start);
    }

    #[test]
    fn test_edge_wraps_over_cliff_face() {
        let mut world = CollisionWorld::new();
        world.add_box(Vec3::new(-500.0, 0.0, -50.0), Vec3::new(500.0, 500.0, 50.0), ContentFlags::SOLID);
        let integrator = MotionIntegrator::default();
        let mut state = MotionState::new();
        let mut body = KinematicBody::new(Vec3::new(-30.0, 0.0, 10.5), 10.0);

        for _ in 0..60 {
            let report = step(&integrator, &mut state, Vec3::X, &world, &mut body, DT);
            assert!(report.transitions.is_empty(), "transitions={:?}", report.transitions);
        }

        // The feet keep finding the vertical face, so the body turns onto it
        // and climbs down instead of falling
        assert!(!state.is_falling());
        let up = body.body.up();
        assert!(up.x > 0.7, "up={up:?}");
        assert!(body.position().z < 0.0, "position={:?}", body.position());
    }

    #[test]
    fn test_blocked_snap_move_is_reported() {
        let world = floor_world();
        let integrator = MotionIntegrator::new(MotionConfig {
            friction_coefficient: 0.0,
            ..Default::default()
        });
        let mut state = MotionState::new();
        state.set_velocity(Vec3::new(100.0, 50.0, 0.0));

        // A lip stops the snap move before it reaches the floor
        let mut mover = ScriptedMover::new(Hit::miss(Vec3::ZERO));
        mover.body.position = Vec3::new(0.0, 0.0, 10.5);
        mover.snap_hit = Some(Hit::blocking(0.5, Vec3::new(0.0, 0.0, 10.5), Vec3::NEG_X));
        let mut input = Vec3::ZERO;

        let report = integrator.step(&mut state, DT, &mut input, &world, &mut mover);

        assert!(report.snapped());
        assert_eq!(mover.moves.len(), 2);
        assert_eq!(report.snap_move.map(|hit| hit.blocking), Some(true));
        assert!(state.velocity().x.abs() < TOLERANCE, "velocity={:?}", state.velocity());
        assert!((state.velocity().y - 50.0).abs() < 0.1, "velocity={:?}", state.velocity());
        assert!(!state.is_falling());
        assert!(report.transitions.is_empty());
    }

    #[test]
    fn test_falling_agent_never_snaps() {
        let world = floor_world();
        let integrator = MotionIntegrator::default();
        let mut state = MotionState::with_support(Support::Falling);
        // Close enough for the snap probe, too far for one step of gravity
        let mut body = KinematicBody::new(Vec3::new(0.0, 0.0, 25.0), 10.0);

        let report = step(&integrator, &mut state, Vec3::ZERO, &world, &mut body, DT);

        assert!(!report.move_hit.blocking);
        assert!(!report.snapped());
        assert!(state.is_falling());
    }

    // ========================================================================
    // Orientation
    // ========================================================================

    #[test]
    fn test_blend_moves_part_way_to_ramp() {
        let angle = 20.0_f32.to_radians();
        let normal = Vec3::new(-angle.sin(), 0.0, angle.cos());
        let mut world = CollisionWorld::new();
        world.add_oriented_box(
            -normal * 10.0,
            Vec3::new(1000.0, 1000.0, 10.0),
            Quat::from_rotation_y(-angle),
            ContentFlags::SOLID,
        );
        let integrator = MotionIntegrator::default();
        let mut state = MotionState::new();
        let mut body = KinematicBody::new(normal * 10.5, 10.0);

        let report = step(&integrator, &mut state, Vec3::ZERO, &world, &mut body, DT);

        let full = report.target_rotation.angle_between(Quat::IDENTITY);
        let blended = report.rotation.angle_between(Quat::IDENTITY);
        assert!((full - angle).abs() < 1e-2, "target angle={full}");
        assert!((blended - full * 0.15).abs() < 1e-3, "blended={blended}");

        for _ in 0..120 {
            step(&integrator, &mut state, Vec3::ZERO, &world, &mut body, DT);
        }
        let up = body.body.up();
        assert!((up - normal).length() < 1e-2, "up={up:?}");
    }

    #[test]
    fn test_falling_strips_pitch_and_roll() {
        let world = CollisionWorld::new();
        let integrator = MotionIntegrator::new(MotionConfig {
            orientation_blend: crate::movement::OrientationBlend::PerStep { factor: 1.0 },
            ..Default::default()
        });
        let mut state = MotionState::with_support(Support::Falling);
        let tilted = Quat::from_rotation_z(0.7) * Quat::from_rotation_y(0.4) * Quat::from_rotation_x(0.3);
        let mut body = KinematicBody::new(Vec3::new(0.0, 0.0, 1000.0), 10.0);
        body.body.rotation = tilted;

        let report = step(&integrator, &mut state, Vec3::ZERO, &world, &mut body, DT);

        assert!(report.target_rotation.angle_between(Quat::from_rotation_z(0.7)) < TOLERANCE);
        let up = body.body.up();
        assert!((up - Vec3::Z).length() < TOLERANCE, "up={up:?}");
    }

    #[test]
    fn test_sensing_skips_own_colliders() {
        let mut world = floor_world();
        let shell = world.add_box(Vec3::new(0.0, 0.0, 15.0), Vec3::new(60.0, 60.0, 1.0), ContentFlags::AGENT_BODY);
        world.set_owner(shell, Some(4));
        let integrator = MotionIntegrator::default();
        let mut state = MotionState::new();
        let mut body = resting_body().owned_by(4);

        let report = step(&integrator, &mut state, Vec3::ZERO, &world, &mut body, DT);

        for contact in &report.ground.feet {
            assert!(contact.point.z.abs() < 0.01, "z={}", contact.point.z);
        }
    }
}
