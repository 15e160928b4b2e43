use bevy::prelude::*;

use crate::game::session::SandboxSession;
use crate::visual::setup::starting_session;

/// Spring length change per bracket key press
const SPRING_STEP: f32 = 2.0;

/// System: keyboard shortcuts acting on the world and the selection
pub fn handle_keyboard(keys: Res<ButtonInput<KeyCode>>, mut session: ResMut<SandboxSession>) {
    if keys.just_pressed(KeyCode::Space) {
        if let Some(id) = session.spawn_random(&mut rand::rng()) {
            debug!("Spawned bubble {}", id);
        }
    }
    if keys.just_pressed(KeyCode::Tab) {
        session.cycle_preset();
    }
    if keys.just_pressed(KeyCode::KeyD) {
        *session = if session.is_demo() {
            starting_session()
        } else {
            SandboxSession::demo(&mut rand::rng(), session.params().clone())
        };
        info!("Demo mode: {}", session.is_demo());
        return;
    }
    if keys.just_pressed(KeyCode::KeyS) {
        match session.snapshot().to_json() {
            Ok(json) => info!("World snapshot:\n{}", json),
            Err(e) => warn!("Could not save the world: {}", e),
        }
    }
    if keys.just_pressed(KeyCode::Escape) {
        session.select(None);
    }

    let Some(id) = session.selected().cloned() else {
        return;
    };

    if keys.any_just_pressed([KeyCode::Delete, KeyCode::Backspace]) {
        session.pop(&id);
        return;
    }
    if keys.any_just_pressed([KeyCode::Equal, KeyCode::NumpadAdd]) {
        session.resize(&id, 1.0);
    }
    if keys.any_just_pressed([KeyCode::Minus, KeyCode::NumpadSubtract]) {
        session.resize(&id, -1.0);
    }
    if keys.just_pressed(KeyCode::KeyP) {
        if let Some(fixed) = session.toggle_pinned(&id) {
            debug!("Bubble {} pinned: {}", id, fixed);
        }
    }
    if keys.just_pressed(KeyCode::KeyU) && session.world_mut().unstick(&id) {
        debug!("Bubble {} unstuck", id);
    }

    let spring_delta = match (
        keys.just_pressed(KeyCode::BracketLeft),
        keys.just_pressed(KeyCode::BracketRight),
    ) {
        (true, false) => -SPRING_STEP,
        (false, true) => SPRING_STEP,
        _ => return,
    };
    if let Some(length) = session.world_mut().adjust_spring(&id, spring_delta) {
        debug!("Bubble {} spring length {}", id, length);
    }
}
