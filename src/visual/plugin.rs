use crate::visual::draw::{draw_bubbles, draw_selection, draw_seek_links, draw_springs, draw_world};
use crate::visual::interactions::{DragState, handle_keyboard, handle_pointer_input};
use crate::visual::pop_effects::{PopBursts, draw_pop_bursts, spawn_pop_bursts, update_pop_bursts};
use crate::visual::setup::setup_scene;
use crate::visual::simulation::{DemoTimer, FRAME_SECONDS, run_demo, step_simulation};
use bevy::prelude::*;

pub struct BubblePlugin;

impl Plugin for BubblePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DragState>()
            .init_resource::<PopBursts>()
            .init_resource::<DemoTimer>()
            .insert_resource(Time::<Fixed>::from_seconds(FRAME_SECONDS))
            .add_systems(Startup, setup_scene)
            // One simulation frame per fixed tick
            .add_systems(
                FixedUpdate,
                (step_simulation, spawn_pop_bursts, update_pop_bursts).chain(),
            )
            .add_systems(
                Update,
                (
                    // Input
                    handle_pointer_input,
                    handle_keyboard,
                    run_demo,
                    // Drawing
                    draw_world,
                    draw_springs,
                    draw_seek_links,
                    draw_bubbles,
                    draw_selection,
                    draw_pop_bursts,
                )
                    .chain(),
            );
    }
}
