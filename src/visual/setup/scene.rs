use bevy::prelude::*;

use crate::{
    game::{demo::intro_bubble, session::SandboxSession},
    sim::{SimParams, World, WorldSnapshot},
};

const PHYSICS_JSON: &str = include_str!("../../../assets/physics.json");
const START_WORLD_JSON: &str = include_str!("../../../assets/demo_world.json");

/// Physics from the embedded config, or the defaults if it is rejected
pub fn load_params() -> SimParams {
    SimParams::from_json(PHYSICS_JSON).unwrap_or_else(|e| {
        warn!("Rejected physics config, using defaults: {}", e);
        SimParams::default()
    })
}

/// The session the app opens with: the embedded starting world, or just the
/// intro bubble when that can't be loaded.
pub fn starting_session() -> SandboxSession {
    let params = load_params();

    let (world, params) = match WorldSnapshot::from_json(START_WORLD_JSON) {
        Ok(snapshot) => {
            // a saved world brings its own physics
            let params = snapshot.world.clone().unwrap_or(params);
            (snapshot.to_world(&params), params)
        }
        Err(e) => {
            warn!("Could not load the starting world: {}", e);
            (World::new(), params)
        }
    };

    let mut session = SandboxSession::new(world, params);
    if session.world().is_empty() {
        let bubble = intro_bubble(session.params());
        if let Err(e) = session.world_mut().add(bubble) {
            warn!("Could not add the intro bubble: {}", e);
        }
    }
    session
}

pub fn setup_scene(mut commands: Commands) {
    let session = starting_session();
    info!(
        "Scene setup: {} bubbles, world radius {}",
        session.world().len(),
        session.params().world_radius
    );
    commands.insert_resource(session);
}
