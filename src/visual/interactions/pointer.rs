use bevy::prelude::*;

use crate::{
    camera::{GameCamera, MainCamera},
    game::session::SandboxSession,
    input::{PointerButton, PointerEvent, PointerEventType},
    sim::{clamp_to_world, Bubble, BubbleId, BubbleSpec, World},
};

/// Two clicks closer than this (ms) make a double click
const DOUBLE_CLICK_MS: f64 = 350.0;
/// ...and no further apart than this (screen pixels)
const DOUBLE_CLICK_SLOP: f32 = 5.0;
/// Radius of bubbles created by double clicking
const NEW_BUBBLE_RADIUS: f32 = 50.0;
const DRAG_EDGE_MARGIN: f32 = 10.0;

/// A pointer position in screen pixels at a time in milliseconds
#[derive(Debug, Clone, Copy)]
struct Sample {
    screen: Vec2,
    at_ms: f64,
}

#[derive(Resource, Default)]
pub struct DragState {
    /// Pointer (mouse or touch id) that started the current drag
    active: Option<u64>,
    /// Bubble being dragged and the grab point relative to its center
    grabbed: Option<(BubbleId, Vec2)>,
    /// Dragging empty space pans: pointer and pan at the start
    panning: Option<(Vec2, Vec2)>,
    /// The two most recent distinct pointer positions, oldest first
    recent: [Option<Sample>; 2],
    last_click: Option<Sample>,
}

impl DragState {
    fn record_move(&mut self, sample: Sample) {
        let moved = self.recent[1].is_none_or(|last| last.screen != sample.screen);
        if moved {
            self.recent = [self.recent[1], Some(sample)];
        }
    }

    /// Screen movement and its duration over the last recorded move
    fn last_motion(&self) -> Option<(Vec2, f32)> {
        let [Some(a), Some(b)] = self.recent else {
            return None;
        };
        Some((b.screen - a.screen, (b.at_ms - a.at_ms) as f32))
    }

    /// The held bubble and grab offset; lets go of bubbles that were
    /// popped or removed while held
    fn held<'w>(&mut self, world: &'w mut World) -> Option<(&'w mut Bubble, Vec2)> {
        let (id, offset) = self.grabbed.clone()?;
        match world.get_mut(&id) {
            Some(bubble) if !bubble.is_popping() => Some((bubble, offset)),
            _ => {
                self.grabbed = None;
                None
            }
        }
    }

    /// Whether an event comes from a pointer other than the one dragging
    fn is_other_pointer(&self, id: u64) -> bool {
        self.active.is_some_and(|active| active != id)
    }

    fn is_double_click(&self, sample: Sample) -> bool {
        self.last_click.is_some_and(|last| {
            sample.at_ms - last.at_ms < DOUBLE_CLICK_MS
                && sample.screen.distance(last.screen) < DOUBLE_CLICK_SLOP
        })
    }
}

/// System: select, drag, throw, pan, pop and stick with the pointer
pub fn handle_pointer_input(
    mut pointer_events: MessageReader<PointerEvent>,
    camera_query: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut session: ResMut<SandboxSession>,
    mut drag_state: ResMut<DragState>,
    mut game_camera: ResMut<GameCamera>,
) {
    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };
    let shift = keys.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]);
    let now_ms = time.elapsed_secs_f64() * 1000.0;

    for event in pointer_events.read() {
        let Some(world_pos) = event.to_world_position(camera, camera_transform) else {
            continue;
        };
        let sample = Sample {
            screen: event.position,
            at_ms: now_ms,
        };

        if drag_state.is_other_pointer(event.id) {
            continue;
        }

        match (event.event_type, event.button) {
            (PointerEventType::Down, PointerButton::Secondary) => {
                if let Some(id) = session.world().bubble_at(world_pos).cloned() {
                    session.pop(&id);
                }
            }

            (PointerEventType::Down, PointerButton::Primary) => {
                let hit = session.world().bubble_at(world_pos).cloned();
                let selected = session.selected().cloned();

                // shift-click sticks the selection to another bubble
                if let (true, Some(source), Some(target)) = (shift, &selected, &hit) {
                    if source != target {
                        if let Err(err) = session.stick(source, target) {
                            warn!("Could not stick bubbles: {}", err);
                        }
                        continue;
                    }
                }

                if hit.is_none() && drag_state.is_double_click(sample) {
                    drag_state.last_click = None;
                    create_bubble(&mut session, world_pos);
                    continue;
                }
                drag_state.last_click = Some(sample);

                if hit.is_some() && hit == selected {
                    session.select(None);
                } else {
                    session.select(hit.as_ref());
                }

                drag_state.active = Some(event.id);
                drag_state.recent = [None, Some(sample)];
                match hit {
                    Some(id) => {
                        if let Some(bubble) = session.world_mut().get_mut(&id) {
                            bubble.dragging = true;
                            bubble.vel = Vec2::ZERO;
                            let offset = world_pos - bubble.pos;
                            drag_state.grabbed = Some((id, offset));
                        }
                    }
                    None => {
                        drag_state.panning = Some((event.position, game_camera.pan));
                    }
                }
            }

            (PointerEventType::Move, _) => {
                drag_state.record_move(sample);

                let world_radius = session.params().world_radius;
                if drag_state.grabbed.is_some() {
                    if let Some((bubble, offset)) = drag_state.held(session.world_mut()) {
                        let margin = bubble.r() + DRAG_EDGE_MARGIN;
                        bubble.pos = clamp_to_world(world_pos - offset, margin, world_radius);
                    }
                } else if let Some((start, start_pan)) = drag_state.panning {
                    // screen y grows downward
                    let delta = event.position - start;
                    let zoom = game_camera.zoom;
                    game_camera.pan_to(start_pan + Vec2::new(-delta.x, delta.y) / zoom, world_radius);
                }
            }

            (PointerEventType::Up, _) => {
                if let Some((id, _)) = drag_state.grabbed.take() {
                    let motion = drag_state.last_motion();
                    if let Some(bubble) = session.world_mut().get_mut(&id) {
                        bubble.dragging = false;
                        if let Some((delta, elapsed_ms)) = motion {
                            bubble.throw(Vec2::new(delta.x, -delta.y), elapsed_ms);
                        }
                    }
                }
                drag_state.active = None;
                drag_state.panning = None;
                drag_state.recent = [None, None];
            }
        }
    }
}

/// A new bubble with a random color, selected right away
fn create_bubble(session: &mut SandboxSession, at: Vec2) {
    let palette = &crate::game::demo::PALETTE;
    let (color, _) = palette[rand::random_range(0..palette.len())];
    let spec = BubbleSpec {
        color: color.to_string(),
        ..BubbleSpec::new(at, NEW_BUBBLE_RADIUS)
    };
    match session.spawn(spec) {
        Ok(id) => {
            info!("Created bubble {} at {}", id, at);
            session.select(Some(&id));
        }
        Err(err) => warn!("Could not create bubble: {}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(x: f32, y: f32, at_ms: f64) -> Sample {
        Sample {
            screen: Vec2::new(x, y),
            at_ms,
        }
    }

    #[test]
    fn test_motion_ignores_repeated_positions() {
        let mut drag = DragState::default();
        drag.record_move(sample(0.0, 0.0, 0.0));
        drag.record_move(sample(10.0, 5.0, 40.0));
        drag.record_move(sample(10.0, 5.0, 80.0));

        assert_eq!(drag.last_motion(), Some((Vec2::new(10.0, 5.0), 40.0)));
    }

    #[test]
    fn test_no_motion_without_two_samples() {
        let mut drag = DragState::default();
        assert_eq!(drag.last_motion(), None);

        drag.record_move(sample(3.0, 3.0, 10.0));
        assert_eq!(drag.last_motion(), None);
    }

    #[test]
    fn test_popped_bubble_is_let_go() {
        let params = crate::sim::SimParams::default();
        let mut world = World::new();
        let id = world
            .add(Bubble::new(BubbleSpec::new(Vec2::ZERO, 40.0), &params))
            .unwrap()
            .clone();
        let mut drag = DragState {
            grabbed: Some((id.clone(), Vec2::new(5.0, 0.0))),
            ..default()
        };

        assert!(drag.held(&mut world).is_some_and(|(_, offset)| offset == Vec2::new(5.0, 0.0)));

        world.pop(&id);
        assert!(drag.held(&mut world).is_none());
        assert!(drag.grabbed.is_none());
    }

    #[test]
    fn test_second_pointer_is_ignored_while_dragging() {
        let mut drag = DragState::default();
        assert!(!drag.is_other_pointer(3));

        drag.active = Some(0);
        assert!(!drag.is_other_pointer(0));
        assert!(drag.is_other_pointer(3));
    }

    #[test]
    fn test_double_click_window() {
        let mut drag = DragState::default();
        drag.last_click = Some(sample(100.0, 100.0, 1000.0));

        assert!(drag.is_double_click(sample(102.0, 101.0, 1200.0)));
        assert!(!drag.is_double_click(sample(102.0, 101.0, 1400.0)));
        assert!(!drag.is_double_click(sample(140.0, 100.0, 1100.0)));
    }
}
