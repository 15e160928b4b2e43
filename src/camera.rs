use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;

use crate::sim::clamp_to_world;

/// Allowed zoom factors (screen pixels per world unit)
pub const ZOOM_RANGE: (f32, f32) = (0.08, 9.0);
/// Zoom change per wheel notch
const ZOOM_STEP: f32 = 1.25;
/// Pixel-precise scrolling reports roughly this much per notch
const PIXELS_PER_NOTCH: f32 = 100.0;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameCamera>()
            .add_systems(Startup, setup_camera)
            .add_systems(Update, (zoom_with_wheel, sync_camera).chain());
    }
}

/// Where the view looks and how close
#[derive(Resource, Debug, Clone)]
pub struct GameCamera {
    /// World point at the center of the screen
    pub pan: Vec2,
    pub zoom: f32,
}

impl Default for GameCamera {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl GameCamera {
    /// Multiply the zoom, staying inside `ZOOM_RANGE`
    pub fn zoom_by(&mut self, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        self.zoom = (self.zoom * factor).clamp(ZOOM_RANGE.0, ZOOM_RANGE.1);
    }

    /// Look at `pan`, but never past the edge of the world
    pub fn pan_to(&mut self, pan: Vec2, world_radius: f32) {
        if pan.is_finite() {
            self.pan = clamp_to_world(pan, 0.0, world_radius);
        }
    }
}

#[derive(Component)]
pub struct MainCamera;

/// Orthographic 2D camera; world units map to pixels at zoom 1
fn setup_camera(mut commands: Commands, game_camera: Res<GameCamera>) {
    commands.spawn((
        Camera2d,
        Projection::Orthographic(OrthographicProjection {
            scale: 1.0 / game_camera.zoom,
            ..OrthographicProjection::default_2d()
        }),
        Transform::from_translation(game_camera.pan.extend(0.0)),
        MainCamera,
    ));
}

fn zoom_with_wheel(mut wheel: MessageReader<MouseWheel>, mut game_camera: ResMut<GameCamera>) {
    for ev in wheel.read() {
        let notches = match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y / PIXELS_PER_NOTCH,
        };
        if notches != 0.0 {
            game_camera.zoom_by(ZOOM_STEP.powf(notches));
        }
    }
}

/// Push pan and zoom into the camera entity when they change
fn sync_camera(
    game_camera: Res<GameCamera>,
    mut cameras: Query<(&mut Transform, &mut Projection), With<MainCamera>>,
) {
    if !game_camera.is_changed() {
        return;
    }

    for (mut transform, mut projection) in &mut cameras {
        transform.translation = game_camera.pan.extend(transform.translation.z);
        if let Projection::Orthographic(ortho) = projection.as_mut() {
            ortho.scale = 1.0 / game_camera.zoom;
        }
    }
}
