//! Fixed-tick simulation loop.
//!
//! The simulation owns the terrain and every agent, and advances them with a
//! single shared [`MotionIntegrator`]. Ticks are deterministic: the same
//! config, terrain and inputs always produce the same states.

use antgrip_physics::{MotionConfig, MotionIntegrator, SupportTransition};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::agent::{Agent, EntityId};
use crate::error::SimError;
use crate::input::MoveKeys;
use crate::terrain::Terrain;

/// Simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulation tick rate (ticks per second).
    pub tick_rate: u32,

    /// Motion physics configuration shared by all agents.
    pub motion: MotionConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            motion: MotionConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Parse a config from JSON and validate it.
    ///
    /// Missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the tick rate and motion config, including that one tick fits
    /// within `motion.max_delta_time` when a bound is set.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.tick_rate == 0 {
            return Err(SimError::ZeroTickRate);
        }
        self.motion.validate()?;
        self.motion.validate_step(self.delta_time())?;
        Ok(())
    }

    /// Get the time step per tick in seconds.
    pub fn delta_time(&self) -> f32 {
        1.0 / self.tick_rate as f32
    }
}

/// A support change reported by a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentTransition {
    pub agent: EntityId,
    pub frame: u64,
    pub transition: SupportTransition,
}

/// The simulation: terrain, agents and the integrator stepping them.
#[derive(Debug)]
pub struct Simulation {
    /// Current frame/tick number.
    pub frame: u64,

    /// Simulation configuration.
    pub config: SimulationConfig,

    /// Terrain agents walk on.
    pub terrain: Terrain,

    /// All agents, in spawn order.
    pub agents: Vec<Agent>,

    integrator: MotionIntegrator,
    next_entity_id: EntityId,
}

impl Simulation {
    /// Create a simulation, validating the configuration.
    pub fn new(config: SimulationConfig, terrain: Terrain) -> Result<Self, SimError> {
        config.validate()?;
        if !config.motion.friction_stable(config.delta_time()) {
            log::warn!(
                "friction {} oscillates at {} Hz; raise tick_rate or lower friction_coefficient",
                config.motion.friction_coefficient,
                config.tick_rate
            );
        }
        Ok(Self::build(config, terrain))
    }

    /// Create a simulation with default configuration on the test course.
    pub fn test() -> Self {
        Self::build(SimulationConfig::default(), Terrain::test_course())
    }

    fn build(config: SimulationConfig, terrain: Terrain) -> Self {
        let integrator = MotionIntegrator::new(config.motion.clone());

        Self {
            frame: 0,
            config,
            terrain,
            agents: Vec::new(),
            integrator,
            next_entity_id: 1,
        }
    }

    /// Add an agent at the next spawn point.
    ///
    /// Returns the agent's ID.
    pub fn add_agent(&mut self, name: &str) -> EntityId {
        let id = self.next_entity_id;
        self.next_entity_id += 1;

        let spawn = self.terrain.get_spawn(self.agents.len());
        let position = spawn.map(|s| s.position).unwrap_or(Vec3::Z * Agent::RADIUS);
        let facing = spawn.map(|s| s.facing).unwrap_or(0.0);

        log::debug!("agent {} '{}' spawned at {:?}", id, name, position);
        self.agents.push(Agent::new(id, name.to_string(), position, facing));
        id
    }

    /// Remove an agent from the simulation.
    pub fn remove_agent(&mut self, agent_id: EntityId) -> Result<Agent, SimError> {
        let index = self
            .agents
            .iter()
            .position(|a| a.id == agent_id)
            .ok_or(SimError::UnknownAgent(agent_id))?;
        Ok(self.agents.remove(index))
    }

    /// Get an agent by ID.
    pub fn get_agent(&self, agent_id: EntityId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == agent_id)
    }

    /// Get a mutable reference to an agent by ID.
    pub fn get_agent_mut(&mut self, agent_id: EntityId) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|a| a.id == agent_id)
    }

    /// Queue an impulse on an agent for the next tick.
    pub fn apply_impulse(&mut self, agent_id: EntityId, impulse: Vec3) -> Result<(), SimError> {
        self.agent_mut(agent_id)?.add_impulse(impulse);
        Ok(())
    }

    /// Queue a force on an agent for the next tick.
    pub fn apply_force(&mut self, agent_id: EntityId, force: Vec3) -> Result<(), SimError> {
        self.agent_mut(agent_id)?.add_force(force);
        Ok(())
    }

    /// Advance the simulation by one tick.
    ///
    /// `keys` are indexed by agent position in `agents`; agents without an
    /// entry only move from input added directly to them.
    ///
    /// Returns every support change that happened this tick.
    pub fn tick(&mut self, keys: &[MoveKeys]) -> Vec<AgentTransition> {
        let delta_time = self.config.delta_time();
        let world = &self.terrain.collision;
        let mut changes = Vec::new();

        for (i, agent) in self.agents.iter_mut().enumerate() {
            if let Some(keys) = keys.get(i).filter(|k| k.any()) {
                let direction = keys.world_direction(agent.transform());
                agent.add_input(direction);
            }

            let report = self.integrator.step(
                &mut agent.motion,
                delta_time,
                &mut agent.input,
                world,
                &mut agent.body.mover(world),
            );

            for transition in report.transitions {
                log::debug!(
                    "frame {}: agent {} {:?} -> {:?} ({:?})",
                    self.frame,
                    agent.id,
                    transition.from,
                    transition.to,
                    transition.event
                );
                changes.push(AgentTransition {
                    agent: agent.id,
                    frame: self.frame,
                    transition,
                });
            }
        }

        self.frame += 1;
        changes
    }

    /// Get the delta time for this simulation.
    pub fn delta_time(&self) -> f32 {
        self.config.delta_time()
    }

    fn agent_mut(&mut self, agent_id: EntityId) -> Result<&mut Agent, SimError> {
        self.get_agent_mut(agent_id).ok_or(SimError::UnknownAgent(agent_id))
    }
}

// ============================================================================
// Tests
// ============================================================================
