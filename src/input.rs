use bevy::input::touch::{TouchInput, TouchPhase};
use bevy::prelude::*;
use bevy::window::CursorMoved;

pub struct InputPlugin;
impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CursorPos>()
            .add_message::<PointerEvent>()
            .add_systems(Update, (track_cursor_pos, collect_pointer_events).chain());
    }
}

#[derive(Message, Debug, Clone)]
pub struct PointerEvent {
    /// Viewport (logical) coordinates: pixels from top-left
    pub position: Vec2,
    pub event_type: PointerEventType,
    pub button: PointerButton,
    /// 0 = mouse, >0 = touch id
    pub id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEventType {
    Down,
    Move,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Left mouse button or a touch
    Primary,
    Secondary,
}

impl PointerEvent {
    /// Convert viewport coords to the world plane using a 2D camera
    pub fn to_world_position(
        &self,
        camera: &Camera,
        camera_transform: &GlobalTransform,
    ) -> Option<Vec2> {
        camera
            .viewport_to_world_2d(camera_transform, self.position)
            .ok()
    }
}

#[derive(Resource, Default, Debug, Clone, Copy)]
struct CursorPos(pub Option<Vec2>);

fn track_cursor_pos(mut ev_cursor: MessageReader<CursorMoved>, mut pos: ResMut<CursorPos>) {
    for e in ev_cursor.read() {
        // last event wins
        pos.0 = Some(e.position);
    }
}

fn collect_pointer_events(
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    cursor: Res<CursorPos>,
    mut touch_events: MessageReader<TouchInput>,
    mut out: MessageWriter<PointerEvent>,
) {
    if let Some(p) = cursor.0 {
        let mouse_event = |event_type, button| PointerEvent {
            position: p,
            event_type,
            button,
            id: 0,
        };

        if mouse_buttons.just_pressed(MouseButton::Left) {
            out.write(mouse_event(PointerEventType::Down, PointerButton::Primary));
        }
        if mouse_buttons.pressed(MouseButton::Left) {
            out.write(mouse_event(PointerEventType::Move, PointerButton::Primary));
        }
        if mouse_buttons.just_released(MouseButton::Left) {
            out.write(mouse_event(PointerEventType::Up, PointerButton::Primary));
        }
        if mouse_buttons.just_pressed(MouseButton::Right) {
            out.write(mouse_event(PointerEventType::Down, PointerButton::Secondary));
        }
    }

    for ev in touch_events.read() {
        let event_type = match ev.phase {
            TouchPhase::Started => PointerEventType::Down,
            TouchPhase::Moved => PointerEventType::Move,
            TouchPhase::Ended | TouchPhase::Canceled => PointerEventType::Up,
        };
        out.write(PointerEvent {
            position: ev.position,
            event_type,
            button: PointerButton::Primary,
            id: ev.id,
        });
    }
}
