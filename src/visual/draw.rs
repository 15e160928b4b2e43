use bevy::prelude::*;
use std::f32::consts::TAU;

use crate::{
    camera::GameCamera,
    game::{demo::color_rgb, session::SandboxSession},
    sim::{Attachment, Bubble},
};

/// Inset of the drawn outline from the simulated one
const WALL_INSET: f32 = 2.5;
/// Spacing of the polar grid rings
const GRID_RING_SPACING: f32 = 1000.0;
const GRID_SPOKES: usize = 12;
/// Screen-space radius of the selection ring at rest
const SELECTION_RADIUS: f32 = 50.0;
const SELECTION_WOBBLE: f32 = 5.0;
const SELECTION_TICKS: usize = 40;

const WORLD_EDGE_COLOR: Color = Color::srgb(0.88, 0.88, 0.88);
const GRID_COLOR: Color = Color::srgba(0.88, 0.88, 0.88, 0.25);
const SELECTION_COLOR: Color = Color::srgba(1.0, 1.0, 0.5, 0.5);
const PIN_COLOR: Color = Color::WHITE;

/// Display color for a bubble's color name (gray when unknown)
pub fn bubble_color(name: &str) -> Color {
    match color_rgb(name) {
        Some([r, g, b]) => Color::srgb_u8(r, g, b),
        None => Color::srgb(0.5, 0.5, 0.5),
    }
}

/// System: world boundary and a polar grid inside it
pub fn draw_world(session: Res<SandboxSession>, mut gizmos: Gizmos) {
    let world_radius = session.params().world_radius;

    gizmos.circle_2d(Isometry2d::IDENTITY, world_radius, WORLD_EDGE_COLOR);

    let mut ring = GRID_RING_SPACING;
    while ring < world_radius {
        gizmos.circle_2d(Isometry2d::IDENTITY, ring, GRID_COLOR);
        ring += GRID_RING_SPACING;
    }
    for n in 0..GRID_SPOKES {
        let dir = Vec2::from_angle(n as f32 * TAU / GRID_SPOKES as f32);
        gizmos.line_2d(Vec2::ZERO, dir * world_radius, GRID_COLOR);
    }
}

/// System: every bubble's deformed outline
pub fn draw_bubbles(session: Res<SandboxSession>, mut gizmos: Gizmos) {
    for bubble in session.world().bubbles() {
        if bubble.visible_radius() < WALL_INSET {
            continue;
        }
        let color = bubble_color(&bubble.color);
        draw_outline(&mut gizmos, bubble, WALL_INSET, color);

        if bubble.fixed && !bubble.is_popping() {
            draw_outline(&mut gizmos, bubble, WALL_INSET * 3.0, PIN_COLOR);
        }
    }
}

fn draw_outline(gizmos: &mut Gizmos, bubble: &Bubble, inset: f32, color: Color) {
    let points: Vec<Vec2> = bubble.outline_points(inset).collect();
    let Some(&first) = points.first() else {
        return;
    };
    gizmos.linestrip_2d(points.into_iter().chain(std::iter::once(first)), color);
}

/// System: springs, drawn as a line between outlines plus a pointer at the
/// source in the target's color
pub fn draw_springs(session: Res<SandboxSession>, mut gizmos: Gizmos) {
    let world = session.world();
    for bubble in world.bubbles() {
        let Attachment::SpringTo { target, .. } = &bubble.attachment else {
            continue;
        };
        let Some(other) = world.get(target) else {
            continue;
        };
        if bubble.is_popping() || other.is_popping() {
            continue;
        }

        let color = bubble_color(&other.color);
        let from_r = bubble.radius_toward(other.pos);
        let to_r = other.radius_toward(bubble.pos);
        let a = (other.pos - bubble.pos).to_angle();

        let tip = bubble.polar(a, from_r);
        gizmos.line_2d(tip, other.polar(a + TAU / 2.0, to_r), color.with_alpha(0.6));

        // small pointer inside the source
        let left = bubble.polar(a - 0.1, from_r * 0.85);
        let right = bubble.polar(a + 0.1, from_r * 0.85);
        gizmos.linestrip_2d([tip, left, right, tip], color);
    }
}

/// System: faint lines from seekers to what they are looking for
pub fn draw_seek_links(session: Res<SandboxSession>, mut gizmos: Gizmos) {
    let world = session.world();
    for link in session.seek_links() {
        let (Some(seeker), Some(target)) = (world.get(&link.seeker), world.get(&link.target))
        else {
            continue;
        };
        let alpha = (0.15 * link.score as f32).min(0.6);
        gizmos.line_2d(seeker.pos, target.pos, Color::srgba(0.2, 0.2, 0.2, alpha));
    }
}

/// System: pulsing ring and a spinning tick wheel around the selection
pub fn draw_selection(
    time: Res<Time>,
    session: Res<SandboxSession>,
    game_camera: Res<GameCamera>,
    mut gizmos: Gizmos,
) {
    let Some(bubble) = session
        .selected()
        .and_then(|id| session.world().get(id))
    else {
        return;
    };

    let t = time.elapsed_secs();
    let zoom = game_camera.zoom;
    let wobble = (t % 2.0 / 2.0 * TAU).sin() * SELECTION_WOBBLE;

    gizmos.circle_2d(
        Isometry2d::from_translation(bubble.pos),
        (SELECTION_RADIUS + wobble) / zoom,
        SELECTION_COLOR,
    );

    let spin = t * 0.1 * TAU;
    for n in 0..SELECTION_TICKS {
        let a = spin + n as f32 * TAU / SELECTION_TICKS as f32;
        gizmos.line_2d(
            bubble.polar(a, 60.0 / zoom),
            bubble.polar(a, 67.0 / zoom),
            Color::srgb(0.5, 0.5, 0.5),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_colors_fall_back_to_gray() {
        assert_eq!(bubble_color("no such color"), Color::srgb(0.5, 0.5, 0.5));
        assert_eq!(bubble_color("red"), Color::srgb_u8(255, 0, 0));
    }
}
