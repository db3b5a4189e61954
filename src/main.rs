//! Antgrip - Headless Demo
//!
//! Walks one agent across the test course, knocks it into the air partway
//! and logs every support change.
//!
//! Usage: `antgrip [config.json] [ticks]`

use anyhow::{Context, Result};
use antgrip_sim::{MoveKeys, Simulation, SimulationConfig, Terrain};
use glam::Vec3;

const DEFAULT_TICKS: u64 = 600;

/// Impulse applied partway through the run.
const KNOCKBACK: Vec3 = Vec3::new(-150.0, 250.0, 450.0);

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);

    let config = match args.next() {
        Some(path) => {
            let json = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            SimulationConfig::from_json(&json).with_context(|| format!("loading {path}"))?
        }
        None => SimulationConfig::default(),
    };

    let ticks = match args.next() {
        Some(value) => value.parse().with_context(|| format!("invalid tick count '{value}'"))?,
        None => DEFAULT_TICKS,
    };

    let mut simulation = Simulation::new(config, Terrain::test_course())?;
    let agent_id = simulation.add_agent("Walker");
    let knockback_frame = ticks / 3;

    log::info!(
        "running {} ticks at {} Hz on '{}'",
        ticks,
        simulation.config.tick_rate,
        simulation.terrain.name
    );

    let mut detachments = 0;
    let mut landings = 0;

    for _ in 0..ticks {
        if simulation.frame == knockback_frame {
            log::info!("frame {}: knockback {:?}", simulation.frame, KNOCKBACK);
            simulation.apply_impulse(agent_id, KNOCKBACK)?;
        }

        for change in simulation.tick(&[MoveKeys::FORWARD]) {
            let transition = change.transition;
            if transition.to.is_falling() {
                detachments += 1;
            } else {
                landings += 1;
            }
            log::info!(
                "frame {}: {:?} -> {:?} ({:?})",
                change.frame,
                transition.from,
                transition.to,
                transition.event
            );
        }

        if simulation.frame % 60 == 0 {
            if let Some(agent) = simulation.get_agent(agent_id) {
                log::info!(
                    "frame {}: pos={:.1?} vel={:.1?} {:?}",
                    simulation.frame,
                    agent.position(),
                    agent.velocity(),
                    agent.support()
                );
            }
        }
    }

    let agent = simulation
        .get_agent(agent_id)
        .context("agent missing after run")?;

    println!("frames:      {}", simulation.frame);
    println!("position:    {:.1?}", agent.position());
    println!("velocity:    {:.1?}", agent.velocity());
    println!("support:     {:?}", agent.support());
    println!("detachments: {detachments}");
    println!("landings:    {landings}");

    Ok(())
}
