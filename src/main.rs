use bevy::prelude::*;

mod camera;
mod clock;
mod game;
mod input;
mod sim;
mod visual;

use bevy::window::WindowResolution;
use camera::CameraPlugin;
use input::InputPlugin;

use crate::visual::plugin::BubblePlugin;

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Bubble Sandbox".into(),
            resolution: WindowResolution::new(1280, 800),
            resizable: true,
            ..default()
        }),
        ..default()
    }))
    .insert_resource(ClearColor(Color::srgb_u8(0x80, 0xa0, 0xc0)))
    .add_plugins(CameraPlugin)
    .add_plugins(InputPlugin)
    .add_plugins(BubblePlugin);

    app.run();
}
